//! ChainData - blockchain and DeFi metadata from the command line
//!
//! Fetches the public chain registry, DeFi analytics, and block-explorer
//! data, caches responses on disk, and renders them as tables or JSON.

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use chaindata::cache::CacheStore;
use chaindata::cli::{
    CacheCommand, ChainlistCommand, Cli, Command, DefillamaCommand, EtherscanCommand, NamespaceArg,
};
use chaindata::config::Config;
use chaindata::data::{
    defillama, ChainRecord, ChainlistClient, DefiLlamaClient, EtherscanClient, Identifier,
};
use chaindata::output::{self, OutputFormat};
use chaindata::shell;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(dir) = &cli.cache_dir {
        config.cache.directory = Some(dir.clone());
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Chainlist { command } => run_chainlist(command, cli.refresh, config).await,
        Command::Defillama { command } => run_defillama(command, config).await,
        Command::Etherscan { command } => run_etherscan(command, config).await,
        Command::Shell => shell::run(config).await,
        Command::Cache { command } => run_cache(command, config),
    }
}

/// Runs chain registry subcommands against one index snapshot
async fn run_chainlist(
    command: ChainlistCommand,
    force_refresh: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ChainlistClient::new(config);
    let index = client.refresh(force_refresh).await;
    if index.is_empty() {
        return Err("no chain data available".into());
    }

    match command {
        ChainlistCommand::List { format } => {
            let mut chains: Vec<&ChainRecord> = index.chains().iter().collect();
            chains.sort_by_key(|chain| chain.chain_id);
            match format.format {
                OutputFormat::Table => println!("{}", output::format_chain_table(chains)),
                OutputFormat::Json => println!("{}", output::to_json(&chains)),
            }
        }
        ChainlistCommand::Search { query, format } => {
            let results = index.search(&query);
            if results.is_empty() {
                output::print_warning(&format!("No results found for '{query}'"));
                return Ok(());
            }
            match format.format {
                OutputFormat::Table => {
                    println!("{}", output::format_chain_table(results.iter().copied()));
                }
                OutputFormat::Json => println!("{}", output::to_json(&results)),
            }
        }
        ChainlistCommand::Info { chain, format } => {
            let record = index
                .get(&Identifier::parse(&chain))
                .ok_or_else(|| format!("chain '{chain}' not found"))?;
            match format.format {
                OutputFormat::Table => println!("{}", output::format_chain_info(record)),
                OutputFormat::Json => println!("{}", output::to_json(record)),
            }
        }
        ChainlistCommand::Rpcs {
            chain,
            rpc_type,
            no_tracking,
            format,
        } => {
            let record = index
                .get(&Identifier::parse(&chain))
                .ok_or_else(|| format!("chain '{chain}' not found"))?;
            let urls = record.rpc_urls(rpc_type.transport(), no_tracking);
            match format.format {
                OutputFormat::Table => println!("{}", output::format_rpc_list(&urls)),
                OutputFormat::Json => println!("{}", output::to_json(&urls)),
            }
        }
    }
    Ok(())
}

/// Runs DeFi analytics subcommands
async fn run_defillama(
    command: DefillamaCommand,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = DefiLlamaClient::new(config);
    let default_limit = config.display.default_limit;

    match command {
        DefillamaCommand::Protocols {
            search,
            chain,
            limit,
            format,
        } => {
            let mut protocols = if let Some(query) = &search {
                client.search_protocols(query).await?
            } else if let Some(chain) = &chain {
                client.chain_protocols(chain).await?
            } else {
                client.protocols().await?
            };
            protocols.truncate(limit.unwrap_or(default_limit));
            match format.format {
                OutputFormat::Table => println!("{}", output::format_protocol_table(&protocols)),
                OutputFormat::Json => println!("{}", output::to_json(&protocols)),
            }
        }
        DefillamaCommand::Protocol { protocol, format } => {
            let info = client.protocol_info(&protocol).await?;
            match format.format {
                OutputFormat::Table => println!(
                    "{}",
                    output::format_protocol_info(
                        &info,
                        &config.display.date_format,
                        config.display.max_history_entries,
                    )
                ),
                OutputFormat::Json => println!("{}", output::to_json(&info)),
            }
        }
        DefillamaCommand::Prices {
            coins,
            historical,
            timestamp,
            format,
        } => {
            let coins: Vec<String> = coins
                .iter()
                .map(|token| defillama::token_identifier(token))
                .collect();
            let prices = if historical {
                let timestamp = timestamp.ok_or("--historical requires --timestamp")?;
                client.historical_prices(&coins, timestamp).await?
            } else {
                client.current_prices(&coins).await?
            };
            match format.format {
                OutputFormat::Table => println!("{}", output::format_price_table(&prices)),
                OutputFormat::Json => println!("{}", output::to_json(&prices)),
            }
        }
        DefillamaCommand::Pools { limit, format } => {
            let mut pools = client.pools().await?;
            pools.truncate(limit.unwrap_or(default_limit));
            match format.format {
                OutputFormat::Table => println!("{}", output::format_pool_table(&pools)),
                OutputFormat::Json => println!("{}", output::to_json(&pools)),
            }
        }
        DefillamaCommand::Stablecoins { limit, format } => {
            let mut assets = client.stablecoins().await?;
            assets.truncate(limit.unwrap_or(default_limit));
            match format.format {
                OutputFormat::Table => println!("{}", output::format_stablecoin_table(&assets)),
                OutputFormat::Json => println!("{}", output::to_json(&assets)),
            }
        }
        DefillamaCommand::Dex {
            chain,
            limit,
            format,
        } => {
            let overview = client.dex_overview(chain.as_deref()).await?;
            print_overview(
                "DEX Volume Overview",
                &overview,
                limit.unwrap_or(default_limit),
                format.format,
            );
        }
        DefillamaCommand::Options {
            chain,
            limit,
            format,
        } => {
            let overview = client.options_overview(chain.as_deref()).await?;
            print_overview(
                "Options Volume Overview",
                &overview,
                limit.unwrap_or(default_limit),
                format.format,
            );
        }
        DefillamaCommand::Fees {
            chain,
            limit,
            format,
        } => {
            let overview = client.fees_overview(chain.as_deref()).await?;
            print_overview(
                "Fees Overview",
                &overview,
                limit.unwrap_or(default_limit),
                format.format,
            );
        }
    }
    Ok(())
}

/// Runs block-explorer subcommands; fails up front without an API key
async fn run_etherscan(
    command: EtherscanCommand,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = EtherscanClient::from_env(config)?;
    let date_format = &config.display.date_format;

    match command {
        EtherscanCommand::Transactions {
            address,
            start_block,
            end_block,
            page,
            offset,
            format,
        } => {
            let transactions = client
                .transactions(&address, start_block, end_block, page, offset)
                .await?;
            match format.format {
                OutputFormat::Table => {
                    println!("{}", output::format_transactions(&transactions, date_format));
                }
                OutputFormat::Json => println!("{}", output::to_json(&transactions)),
            }
        }
        EtherscanCommand::Transfers {
            address,
            contract,
            page,
            offset,
            format,
        } => {
            let transfers = client
                .token_transfers(&address, contract.as_deref(), page, offset)
                .await?;
            match format.format {
                OutputFormat::Table => {
                    println!("{}", output::format_token_transfers(&transfers, date_format));
                }
                OutputFormat::Json => println!("{}", output::to_json(&transfers)),
            }
        }
        EtherscanCommand::Contract { address, format } => {
            let contract = client
                .contract_source(&address)
                .await?
                .ok_or_else(|| format!("no contract found at {address}"))?;
            match format.format {
                OutputFormat::Table => println!("{}", output::format_contract_source(&contract)),
                OutputFormat::Json => println!("{}", output::to_json(&contract)),
            }
        }
    }
    Ok(())
}

/// Clears one cache namespace, or all of them
fn run_cache(command: CacheCommand, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CacheCommand::Clear { namespace } => {
            let cache = &config.cache;
            let root = cache.root();
            let mut cleared = Vec::new();

            if namespace.is_none() || namespace == Some(NamespaceArg::Blockchain) {
                CacheStore::new(&root, &cache.blockchain_subdir, cache.blockchain_expiry())
                    .clear()?;
                cleared.push(cache.blockchain_subdir.as_str());
            }
            if namespace.is_none() || namespace == Some(NamespaceArg::Defillama) {
                CacheStore::new(&root, &cache.defillama_subdir, cache.expiry()).clear()?;
                cleared.push(cache.defillama_subdir.as_str());
            }

            output::print_success(&format!("Cleared cache: {}", cleared.join(", ")));
        }
    }
    Ok(())
}

fn print_overview(title: &str, overview: &Value, limit: usize, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!(
            "{}",
            output::format_volume_overview(title, overview, Some(limit))
        ),
        OutputFormat::Json => println!("{}", output::to_json(overview)),
    }
}
