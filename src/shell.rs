//! Interactive shell
//!
//! A line-oriented loop over the same clients the CLI subcommands use. The
//! shell keeps one chain index snapshot in memory and swaps it wholesale on
//! `refresh`, so commands in between always see a consistent registry.

use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::data::{defillama, ChainlistClient, DefiLlamaClient, Identifier, RpcTransport};
use crate::http::HttpError;
use crate::output;

pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let chainlist = ChainlistClient::new(config);
    let defillama = DefiLlamaClient::new(config);
    let date_format = config.display.date_format.clone();
    let limit = config.display.default_limit;
    let max_history = config.display.max_history_entries;

    output::print_info("ChainData interactive shell. Type 'help' for commands, 'exit' to quit.");
    let mut index = chainlist.refresh(false).await;
    if index.is_empty() {
        output::print_warning("no chain data available; run 'refresh' once the network is back");
    }

    let stdin = io::stdin();
    loop {
        print!("chaindata> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match command {
            "help" => print_help(),
            "exit" | "quit" => {
                output::print_info("Goodbye!");
                break;
            }
            "list" => println!("{}", output::format_chain_table(index.chains())),
            "search" => {
                if args.is_empty() {
                    output::print_error("usage: search <query>");
                    continue;
                }
                let query = args.join(" ");

                let chains = index.search(&query);
                if !chains.is_empty() {
                    output::print_info("Matching chains:");
                    println!("{}", output::format_chain_table(chains.iter().copied()));
                }

                match defillama.search_protocols(&query).await {
                    Ok(protocols) if !protocols.is_empty() => {
                        output::print_info("Matching protocols:");
                        println!("{}", output::format_protocol_table(&protocols));
                    }
                    Ok(_) if chains.is_empty() => {
                        output::print_warning(&format!("No results found for '{query}'"));
                    }
                    Ok(_) => {}
                    Err(err) => output::print_error(&err.to_string()),
                }
            }
            "chain" => {
                if args.is_empty() {
                    output::print_error("usage: chain <id or name>");
                    continue;
                }
                let identifier = Identifier::parse(&args.join(" "));
                match index.get(&identifier) {
                    Some(chain) => println!("{}", output::format_chain_info(chain)),
                    None => output::print_error("chain not found"),
                }
            }
            "rpcs" => {
                if args.is_empty() {
                    output::print_error("usage: rpcs <id or name>");
                    continue;
                }
                let identifier = Identifier::parse(&args.join(" "));
                match index.get(&identifier) {
                    Some(chain) => {
                        let urls = chain.rpc_urls(RpcTransport::Https, false);
                        println!("{}", output::format_rpc_list(&urls));
                    }
                    None => output::print_error("chain not found"),
                }
            }
            "protocol" => {
                if args.is_empty() {
                    output::print_error("usage: protocol <slug>");
                    continue;
                }
                match defillama.protocol_info(&args.join(" ")).await {
                    Ok(info) => println!(
                        "{}",
                        output::format_protocol_info(&info, &date_format, max_history)
                    ),
                    Err(err) => output::print_error(&err.to_string()),
                }
            }
            "tvl" => {
                if args.is_empty() {
                    output::print_error("usage: tvl <slug>");
                    continue;
                }
                let protocol = args.join(" ");
                match defillama.current_tvl(&protocol).await {
                    Ok(tvl) => output::print_success(&format!(
                        "Current TVL for {protocol}: {}",
                        output::format_number(tvl)
                    )),
                    Err(err) => output::print_error(&err.to_string()),
                }
            }
            "prices" => {
                if args.is_empty() {
                    output::print_error("usage: prices <tokens...>");
                    continue;
                }
                let coins: Vec<String> = args
                    .iter()
                    .map(|token| defillama::token_identifier(token))
                    .collect();
                match defillama.current_prices(&coins).await {
                    Ok(prices) => println!("{}", output::format_price_table(&prices)),
                    Err(err) => output::print_error(&err.to_string()),
                }
            }
            "stablecoins" => match defillama.stablecoins().await {
                Ok(assets) => {
                    let shown = &assets[..assets.len().min(limit)];
                    println!("{}", output::format_stablecoin_table(shown));
                }
                Err(err) => output::print_error(&err.to_string()),
            },
            "pools" | "yields" => match defillama.pools().await {
                Ok(pools) => {
                    let shown = &pools[..pools.len().min(limit)];
                    println!("{}", output::format_pool_table(shown));
                }
                Err(err) => output::print_error(&err.to_string()),
            },
            "dex" => {
                print_overview(
                    defillama.dex_overview(args.first().copied()).await,
                    "DEX Volume Overview",
                    limit,
                );
            }
            "fees" => {
                print_overview(
                    defillama.fees_overview(args.first().copied()).await,
                    "Fees Overview",
                    limit,
                );
            }
            "refresh" => {
                index = chainlist.refresh(true).await;
                if index.is_empty() {
                    output::print_warning("refresh failed; no chain data available");
                } else {
                    output::print_success(&format!("Loaded {} chains", index.len()));
                }
            }
            other => output::print_error(&format!("Unknown command: {other}")),
        }
    }
    Ok(())
}

fn print_overview(result: Result<serde_json::Value, HttpError>, title: &str, limit: usize) {
    match result {
        Ok(overview) => println!(
            "{}",
            output::format_volume_overview(title, &overview, Some(limit))
        ),
        Err(err) => output::print_error(&err.to_string()),
    }
}

fn print_help() {
    output::print_info("Available commands:");
    output::print_info("  help                 - Show this help message");
    output::print_info("  exit                 - Exit the shell");
    output::print_info("  list                 - List all chains");
    output::print_info("  search <query>       - Search chains and protocols");
    output::print_info("  chain <id/name>      - Show chain details");
    output::print_info("  rpcs <id/name>       - Show https RPC endpoints for a chain");
    output::print_info("  protocol <slug>      - Show protocol TVL and history");
    output::print_info("  tvl <slug>           - Show current TVL for a protocol");
    output::print_info("  prices <tokens...>   - Show current token prices");
    output::print_info("  stablecoins          - List stablecoins");
    output::print_info("  pools                - List yield pools");
    output::print_info("  dex [chain]          - DEX volume overview");
    output::print_info("  fees [chain]         - Protocol fees overview");
    output::print_info("  refresh              - Re-fetch the chain registry");
}
