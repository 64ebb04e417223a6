//! Colorized terminal output and table rendering
//!
//! All operator-facing rendering lives here. Formatters are pure functions
//! returning strings; only the `print_*` status helpers write directly, and
//! they write to stderr so piped stdout stays machine-readable.

use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::data::{ChainRecord, ContractSource, Protocol, ProtocolInfo, TokenTransfer, Transaction};

/// Output format selected by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message.red());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message.yellow());
}

pub fn print_info(message: &str) {
    eprintln!("{}", message.blue());
}

pub fn print_success(message: &str) {
    eprintln!("{}", message.green());
}

/// Pretty JSON for `--format json` output
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Renders chains as an aligned id / name / short-name table
pub fn format_chain_table<'a>(chains: impl IntoIterator<Item = &'a ChainRecord>) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!("{:<8} {:<30} {:<15}", "ID", "Name", "Short Name")
            .cyan()
            .to_string(),
    );
    lines.push("-".repeat(55));
    for chain in chains {
        lines.push(format!(
            "{:<8} {:<30} {:<15}",
            chain.chain_id,
            chain.name,
            chain.short_name.as_deref().unwrap_or("N/A")
        ));
    }
    lines.join("\n")
}

/// Renders the detail card for one chain
pub fn format_chain_info(chain: &ChainRecord) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", "Chain:".cyan(), chain.name));
    lines.push(format!("{} {}", "Chain ID:".cyan(), chain.chain_id));
    lines.push(format!(
        "{} {}",
        "Short Name:".cyan(),
        chain.short_name.as_deref().unwrap_or("N/A")
    ));

    if let Some(currency) = &chain.native_currency {
        lines.push(format!(
            "{} {} ({}), {} decimals",
            "Native Currency:".cyan(),
            currency.name,
            currency.symbol,
            currency.decimals
        ));
    }
    if let Some(tvl) = chain.tvl {
        lines.push(format!("{} {}", "TVL:".cyan(), format_number(tvl)));
    }

    lines.push(format!(
        "{} {}",
        "RPC Endpoints:".cyan(),
        chain.rpc.len()
    ));
    if !chain.explorers.is_empty() {
        lines.push("Explorers:".cyan().to_string());
        for url in chain.explorer_urls(None) {
            lines.push(format!("  - {url}"));
        }
    }

    let eips = chain.eips();
    if !eips.is_empty() {
        lines.push(format!("{} {}", "EIPs:".cyan(), eips.join(", ")));
    }
    lines.join("\n")
}

/// Renders RPC URLs as a bulleted list
pub fn format_rpc_list(urls: &[&str]) -> String {
    let mut lines = vec!["RPC Endpoints:".cyan().to_string()];
    for url in urls {
        lines.push(format!("  - {url}"));
    }
    lines.join("\n")
}

/// Renders protocols with TVL and change columns
pub fn format_protocol_table(protocols: &[Protocol]) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!(
            "{:<30} {:>15} {:>12} {:>12} {:>12}",
            "Name", "TVL", "1h Change", "24h Change", "7d Change"
        )
        .cyan()
        .to_string(),
    );
    lines.push("-".repeat(85));
    for protocol in protocols {
        let name: String = protocol.name.chars().take(30).collect();
        lines.push(format!(
            "{:<30} {:>15} {} {} {}",
            name,
            format_number(protocol.tvl.unwrap_or(0.0)),
            format_change(protocol.change_1h, 12),
            format_change(protocol.change_1d, 12),
            format_change(protocol.change_7d, 12),
        ));
    }
    lines.join("\n")
}

/// Renders one protocol's current TVL plus its most recent history rows
pub fn format_protocol_info(info: &ProtocolInfo, date_format: &str, max_entries: usize) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", "Protocol:".cyan(), info.name));
    lines.push(format!(
        "{} {}",
        "Current TVL:".cyan(),
        format_number(info.current_tvl)
    ));

    let history = history_rows(&info.tvl_history);
    if !history.is_empty() {
        lines.push("Recent TVL:".cyan().to_string());
        // The service reports history oldest-first; show the newest entries
        for row in history.iter().rev().take(max_entries) {
            let date = row
                .get("date")
                .and_then(Value::as_i64)
                .map(|secs| format_timestamp(secs, date_format))
                .unwrap_or_else(|| "N/A".to_string());
            let tvl = row
                .get("totalLiquidityUSD")
                .or_else(|| row.get("tvl"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            lines.push(format!("  {date}  {}", format_number(tvl)));
        }
    }
    lines.join("\n")
}

/// Renders current or historical price lookups
///
/// Walks the `coins` map of the price response; entries missing a price are
/// skipped rather than rendered as zero.
pub fn format_price_table(prices: &Value) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!("{:<15} {:<20}", "Token", "Price (USD)")
            .cyan()
            .to_string(),
    );
    lines.push("-".repeat(35));

    if let Some(coins) = prices.get("coins").and_then(Value::as_object) {
        for (identifier, data) in coins {
            let Some(price) = data.get("price").and_then(Value::as_f64) else {
                continue;
            };
            let name = data
                .get("symbol")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| clean_token_name(identifier));
            lines.push(format!("{name:<15} ${price:.4}"));
        }
    }
    lines.join("\n")
}

/// Renders yield pools with color-coded APY
pub fn format_pool_table(pools: &[Value]) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!(
            "{:<18} | {:<12} | {:<10} | {:<12} | {}",
            "Project", "Chain", "Symbol", "APY", "TVL (USD)"
        )
        .cyan()
        .to_string(),
    );
    lines.push("-".repeat(75));

    for pool in pools {
        let project = truncated(pool, "project", 18);
        let chain = truncated(pool, "chain", 12);
        let symbol = truncated(pool, "symbol", 10);
        let apy = pool.get("apy").and_then(Value::as_f64).unwrap_or(0.0);
        let tvl = pool.get("tvlUsd").and_then(Value::as_f64).unwrap_or(0.0);

        let apy_text = format!("{:<12}", format!("{apy:.2}%"));
        let apy_colored = if apy >= 10.0 {
            apy_text.green()
        } else if apy >= 5.0 {
            apy_text.yellow()
        } else {
            apy_text.red()
        };

        lines.push(format!(
            "{project:<18} | {chain:<12} | {symbol:<10} | {apy_colored} | {}",
            format_number(tvl)
        ));
    }
    lines.join("\n")
}

/// Renders stablecoins with their peg type and price
pub fn format_stablecoin_table(assets: &[Value]) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!("{:<24} {:<10} {:<14} {:>10}", "Name", "Symbol", "Peg", "Price")
            .cyan()
            .to_string(),
    );
    lines.push("-".repeat(60));

    for asset in assets {
        let name = truncated(asset, "name", 24);
        let symbol = truncated(asset, "symbol", 10);
        let peg = truncated(asset, "pegType", 14);
        let price = match asset.get("price").and_then(Value::as_f64) {
            Some(price) => format!("${price:.4}"),
            None => "N/A".to_string(),
        };
        lines.push(format!("{name:<24} {symbol:<10} {peg:<14} {price:>10}"));
    }
    lines.join("\n")
}

/// Renders a volume or fees overview: totals, then per-protocol rows
///
/// Works for the DEX, options, and fees overviews, which all share the same
/// response shape. Totals come straight from the response; rows render in
/// the order the service returned them.
pub fn format_volume_overview(title: &str, overview: &Value, limit: Option<usize>) -> String {
    let mut lines = Vec::new();
    lines.push(title.cyan().to_string());

    for (label, key) in [
        ("Total 24h:", "total24h"),
        ("Total 7d:", "total7d"),
        ("Total 30d:", "total30d"),
    ] {
        if let Some(total) = overview.get(key).and_then(Value::as_f64) {
            lines.push(format!("{label} {}", format_number(total)));
        }
    }

    lines.push(String::new());
    lines.push(
        format!(
            "{:<24} {:>15} {:>12} {:>15} {:>15}",
            "Name", "24h Volume", "24h Change", "7d Volume", "30d Volume"
        )
        .cyan()
        .to_string(),
    );
    lines.push("-".repeat(85));

    let rows = overview
        .get("protocols")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let shown = limit.unwrap_or(rows.len());
    for row in rows.iter().take(shown) {
        let name = truncated(row, "name", 24);
        let volume_24h = row.get("total24h").and_then(Value::as_f64).unwrap_or(0.0);
        let volume_7d = row.get("total7d").and_then(Value::as_f64).unwrap_or(0.0);
        let volume_30d = row.get("total30d").and_then(Value::as_f64).unwrap_or(0.0);
        lines.push(format!(
            "{:<24} {:>15} {} {:>15} {:>15}",
            name,
            format_number(volume_24h),
            format_change(row.get("change_1d").and_then(Value::as_f64), 12),
            format_number(volume_7d),
            format_number(volume_30d),
        ));
    }
    lines.join("\n")
}

/// Renders account transactions with values scaled to ether
pub fn format_transactions(transactions: &[Transaction], date_format: &str) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!(
            "{:<66} {:<42} {:<42} {:>14} {:<19}",
            "Hash", "From", "To", "Value (ETH)", "Time"
        )
        .cyan()
        .to_string(),
    );
    lines.push("-".repeat(186));

    for tx in transactions {
        let value_eth = tx.value.parse::<f64>().unwrap_or(0.0) / 1e18;
        let time = tx
            .time_stamp
            .parse::<i64>()
            .map(|secs| format_timestamp(secs, date_format))
            .unwrap_or_else(|_| "N/A".to_string());
        lines.push(format!(
            "{:<66} {:<42} {:<42} {:>14.6} {:<19}",
            tx.hash, tx.from_address, tx.to_address, value_eth, time
        ));
    }
    lines.join("\n")
}

/// Renders token transfers with amounts scaled by the token's decimals
pub fn format_token_transfers(transfers: &[TokenTransfer], date_format: &str) -> String {
    let mut lines = Vec::new();
    lines.push(
        format!(
            "{:<66} {:<10} {:>18} {:<42} {:<42} {:<19}",
            "Hash", "Token", "Amount", "From", "To", "Time"
        )
        .cyan()
        .to_string(),
    );
    lines.push("-".repeat(200));

    for transfer in transfers {
        let decimals = transfer.token_decimal.parse::<u32>().unwrap_or(18);
        let amount =
            transfer.value.parse::<f64>().unwrap_or(0.0) / 10f64.powi(decimals as i32);
        let time = transfer
            .time_stamp
            .parse::<i64>()
            .map(|secs| format_timestamp(secs, date_format))
            .unwrap_or_else(|_| "N/A".to_string());
        lines.push(format!(
            "{:<66} {:<10} {:>18.6} {:<42} {:<42} {:<19}",
            transfer.hash, transfer.token_symbol, amount, transfer.from_address,
            transfer.to_address, time
        ));
    }
    lines.join("\n")
}

/// Renders verified-contract metadata; the full source stays in JSON output
pub fn format_contract_source(contract: &ContractSource) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        "Contract:".cyan(),
        if contract.contract_name.is_empty() {
            "(unverified)"
        } else {
            &contract.contract_name
        }
    ));
    lines.push(format!(
        "{} {}",
        "Compiler:".cyan(),
        contract.compiler_version
    ));
    lines.push(format!(
        "{} {}",
        "Optimization:".cyan(),
        contract.optimization_used
    ));
    lines.push(format!("{} {}", "License:".cyan(), contract.license_type));
    lines.push(format!("{} {}", "Proxy:".cyan(), contract.proxy));
    if contract.is_verified() {
        lines.push(format!(
            "{} {} lines (use --format json for the full source)",
            "Source:".cyan(),
            contract.source_code.lines().count()
        ));
    } else {
        lines.push(format!("{} not verified", "Source:".cyan()));
    }
    lines.join("\n")
}

/// Formats dollar amounts with K/M/B suffixes
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${value:.2}")
    }
}

/// Formats a signed percentage, green for gains and red for losses
///
/// The text is padded to `width` before coloring so escape codes do not
/// break column alignment.
pub fn format_change(value: Option<f64>, width: usize) -> String {
    let Some(value) = value else {
        return format!("{:>width$}", "N/A");
    };
    let text = format!("{:>width$}", format!("{value:+.2}%"));
    if value >= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Renders a unix timestamp with the configured date format
fn format_timestamp(secs: i64, date_format: &str) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format(date_format).to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Shortens a coin identifier for display
///
/// Drops the source prefix, truncates addresses, and capitalizes slugs.
fn clean_token_name(identifier: &str) -> String {
    let name = identifier.rsplit(':').next().unwrap_or(identifier);
    if name.starts_with("0x") && name.len() > 12 {
        format!("{}...", &name[..10])
    } else {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// String field of a JSON row, truncated for its column
fn truncated(row: &Value, key: &str, width: usize) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .chars()
        .take(width)
        .collect()
}

/// Extracts history rows from a protocol TVL response
///
/// The protocol endpoint wraps history under `tvl`; older cached responses
/// may already be bare arrays.
fn history_rows(history: &Value) -> &[Value] {
    match history {
        Value::Array(rows) => rows,
        Value::Object(obj) => obj
            .get("tvl")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number_suffixes() {
        assert_eq!(format_number(12_345_678_900.0), "$12.35B");
        assert_eq!(format_number(7_654_321.0), "$7.65M");
        assert_eq!(format_number(54_321.0), "$54.32K");
        assert_eq!(format_number(999.99), "$999.99");
        assert_eq!(format_number(0.0), "$0.00");
    }

    #[test]
    fn test_format_change_signs_and_missing_values() {
        assert!(format_change(Some(5.25), 12).contains("+5.25%"));
        assert!(format_change(Some(-3.1), 12).contains("-3.10%"));
        assert!(format_change(Some(0.0), 12).contains("+0.00%"));
        assert!(format_change(None, 12).contains("N/A"));
    }

    #[test]
    fn test_format_timestamp_uses_the_configured_pattern() {
        assert_eq!(
            format_timestamp(1_700_000_000, "%Y-%m-%d %H:%M:%S"),
            "2023-11-14 22:13:20"
        );
        assert_eq!(format_timestamp(1_700_000_000, "%Y-%m-%d"), "2023-11-14");
    }

    #[test]
    fn test_clean_token_name_variants() {
        assert_eq!(clean_token_name("coingecko:bitcoin"), "Bitcoin");
        assert_eq!(clean_token_name("solana"), "Solana");
        assert_eq!(
            clean_token_name("ethereum:0xdac17f958d2ee523a2206206994597c13d831ec7"),
            "0xdac17f95..."
        );
    }

    #[test]
    fn test_chain_table_lists_rows_in_given_order() {
        let chains: Vec<ChainRecord> = serde_json::from_value(json!([
            {"chainId": 42161, "name": "Arbitrum One", "shortName": "arb1"},
            {"chainId": 1, "name": "Ethereum Mainnet", "shortName": "eth"},
        ]))
        .expect("Fixture should deserialize");

        let table = format_chain_table(&chains);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("ID"));
        assert!(lines[2].contains("Arbitrum One"));
        assert!(lines[3].contains("Ethereum Mainnet"));
    }

    #[test]
    fn test_chain_info_includes_currency_and_eips() {
        let chain: ChainRecord = serde_json::from_value(json!({
            "chainId": 1,
            "name": "Ethereum Mainnet",
            "shortName": "eth",
            "nativeCurrency": {"name": "Ether", "symbol": "ETH", "decimals": 18},
            "features": [{"name": "EIP155"}, {"name": "EIP1559"}],
            "explorers": [{"name": "etherscan", "url": "https://etherscan.io"}],
            "tvl": 5.0e10
        }))
        .expect("Fixture should deserialize");

        let info = format_chain_info(&chain);

        assert!(info.contains("Ethereum Mainnet"));
        assert!(info.contains("Ether (ETH), 18 decimals"));
        assert!(info.contains("EIP155, EIP1559"));
        assert!(info.contains("https://etherscan.io"));
        assert!(info.contains("$50.00B"));
    }

    #[test]
    fn test_price_table_skips_entries_without_price() {
        let prices = json!({
            "coins": {
                "coingecko:bitcoin": {"price": 43250.1234, "symbol": "BTC"},
                "coingecko:unknowncoin": {"confidence": 0.5}
            }
        });

        let table = format_price_table(&prices);

        assert!(table.contains("BTC"));
        assert!(table.contains("$43250.1234"));
        assert!(!table.contains("Unknowncoin"));
    }

    #[test]
    fn test_pool_table_renders_apy_and_tvl() {
        let pools = vec![json!({
            "project": "lido",
            "chain": "Ethereum",
            "symbol": "STETH",
            "apy": 3.4,
            "tvlUsd": 2.1e10
        })];

        let table = format_pool_table(&pools);

        assert!(table.contains("lido"));
        assert!(table.contains("STETH"));
        assert!(table.contains("3.40%"));
        assert!(table.contains("$21.00B"));
    }

    #[test]
    fn test_volume_overview_renders_totals_and_limited_rows() {
        let overview = json!({
            "total24h": 2.5e9,
            "total7d": 1.4e10,
            "total30d": 6.0e10,
            "protocols": [
                {"name": "Uniswap", "total24h": 1.2e9, "total7d": 7.0e9,
                 "total30d": 3.0e10, "change_1d": 4.2},
                {"name": "Curve", "total24h": 0.4e9, "total7d": 2.0e9,
                 "total30d": 9.0e9, "change_1d": -1.1},
            ]
        });

        let table = format_volume_overview("DEX Volume Overview", &overview, Some(1));

        assert!(table.contains("DEX Volume Overview"));
        assert!(table.contains("Total 24h: $2.50B"));
        assert!(table.contains("Uniswap"));
        assert!(table.contains("+4.20%"));
        assert!(!table.contains("Curve"), "Limit should cap the rows");
    }

    #[test]
    fn test_transactions_scale_wei_to_ether() {
        let txs: Vec<Transaction> = serde_json::from_value(json!([{
            "hash": "0xaaa",
            "from": "0x111",
            "to": "0x222",
            "value": "1500000000000000000",
            "timeStamp": "1700000000"
        }]))
        .expect("Fixture should deserialize");

        let table = format_transactions(&txs, "%Y-%m-%d %H:%M:%S");

        assert!(table.contains("0xaaa"));
        assert!(table.contains("1.500000"));
        assert!(table.contains("2023-11-14"));
    }

    #[test]
    fn test_token_transfers_scale_by_token_decimals() {
        let transfers: Vec<TokenTransfer> = serde_json::from_value(json!([{
            "hash": "0xbbb",
            "from": "0x111",
            "to": "0x222",
            "value": "2500000",
            "tokenSymbol": "USDC",
            "tokenDecimal": "6",
            "timeStamp": "1700000000"
        }]))
        .expect("Fixture should deserialize");

        let table = format_token_transfers(&transfers, "%Y-%m-%d %H:%M:%S");

        assert!(table.contains("USDC"));
        assert!(table.contains("2.500000"));
    }

    #[test]
    fn test_contract_source_reports_unverified() {
        let contract: ContractSource = serde_json::from_value(json!({
            "ContractName": "",
            "SourceCode": "",
            "ABI": "Contract source code not verified"
        }))
        .expect("Fixture should deserialize");

        let card = format_contract_source(&contract);

        assert!(card.contains("(unverified)"));
        assert!(card.contains("not verified"));
    }

    #[test]
    fn test_protocol_info_shows_newest_history_first() {
        let info = ProtocolInfo {
            name: "aave".to_string(),
            current_tvl: 1.2e10,
            tvl_history: json!({
                "tvl": [
                    {"date": 1_600_000_000, "totalLiquidityUSD": 1.0e9},
                    {"date": 1_700_000_000, "totalLiquidityUSD": 1.2e10},
                ]
            }),
        };

        let card = format_protocol_info(&info, "%Y-%m-%d", 5);
        let newest = card.find("2023-11-14").expect("Newest entry shown");
        let oldest = card.find("2020-09-13").expect("Oldest entry shown");

        assert!(card.contains("$12.00B"));
        assert!(newest < oldest, "History should render newest first");
    }

    #[test]
    fn test_protocol_info_caps_history_at_max_entries() {
        let info = ProtocolInfo {
            name: "aave".to_string(),
            current_tvl: 1.2e10,
            tvl_history: json!({
                "tvl": [
                    {"date": 1_500_000_000, "totalLiquidityUSD": 1.0e8},
                    {"date": 1_600_000_000, "totalLiquidityUSD": 1.0e9},
                    {"date": 1_700_000_000, "totalLiquidityUSD": 1.2e10},
                ]
            }),
        };

        let card = format_protocol_info(&info, "%Y-%m-%d", 2);

        assert!(card.contains("2023-11-14"));
        assert!(card.contains("2020-09-13"));
        assert!(!card.contains("2017-07-14"), "Oldest entry should be cut");
    }
}
