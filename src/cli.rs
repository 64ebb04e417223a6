//! Command-line interface parsing for ChainData
//!
//! This module defines the clap command tree: one subcommand group per
//! upstream service, plus the interactive shell and cache maintenance.
//! Runtime wiring lives in `main`; everything here is pure argument shape.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::data::RpcTransport;
use crate::output::OutputFormat;

/// ChainData - fetch, cache, and explore blockchain and DeFi metadata
#[derive(Parser, Debug)]
#[command(name = "chaindata")]
#[command(about = "Blockchain and DeFi metadata from Chainlist, DefiLlama, and Etherscan")]
#[command(version)]
pub struct Cli {
    /// Refresh cached data from the network before running the command
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Override the cache directory
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chain registry lookups
    Chainlist {
        #[command(subcommand)]
        command: ChainlistCommand,
    },
    /// DeFi analytics
    Defillama {
        #[command(subcommand)]
        command: DefillamaCommand,
    },
    /// Block-explorer queries (requires ETHERSCAN_API_KEY)
    Etherscan {
        #[command(subcommand)]
        command: EtherscanCommand,
    },
    /// Interactive shell
    Shell,
    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

/// Output format selector shared by every data subcommand
#[derive(Args, Debug, Clone, Copy)]
pub struct FormatArg {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum ChainlistCommand {
    /// List all chains
    List {
        #[command(flatten)]
        format: FormatArg,
    },
    /// Search chains by name, short name, or numeric id
    Search {
        /// Search query
        query: String,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Show details for one chain
    Info {
        /// Chain id or full name
        chain: String,
        #[command(flatten)]
        format: FormatArg,
    },
    /// List RPC endpoints for a chain
    Rpcs {
        /// Chain id or full name
        chain: String,
        /// RPC transport to list
        #[arg(long = "type", value_enum, default_value = "http")]
        rpc_type: RpcTypeArg,
        /// Only endpoints whose operator reports no tracking
        #[arg(long)]
        no_tracking: bool,
        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum DefillamaCommand {
    /// List protocols, optionally filtered
    Protocols {
        /// Substring search over names and slugs
        #[arg(long, conflicts_with = "chain")]
        search: Option<String>,
        /// Only protocols deployed on this chain
        #[arg(long)]
        chain: Option<String>,
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Show current TVL and recent history for one protocol
    Protocol {
        /// Protocol slug, e.g. aave
        protocol: String,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Token prices
    Prices {
        /// Token symbols or chain:address identifiers
        #[arg(required = true)]
        coins: Vec<String>,
        /// Look up prices at --timestamp instead of now
        #[arg(long, requires = "timestamp")]
        historical: bool,
        /// Unix timestamp for historical prices
        #[arg(long, requires = "historical")]
        timestamp: Option<i64>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Yield pools
    Pools {
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Stablecoins with current prices
    Stablecoins {
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// DEX volume overview
    Dex {
        /// Restrict to one chain
        #[arg(long)]
        chain: Option<String>,
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Options volume overview
    Options {
        /// Restrict to one chain
        #[arg(long)]
        chain: Option<String>,
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Protocol fees overview
    Fees {
        /// Restrict to one chain
        #[arg(long)]
        chain: Option<String>,
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum EtherscanCommand {
    /// Transactions for an address, newest first
    Transactions {
        /// Account address
        address: String,
        /// Earliest block to include
        #[arg(long)]
        start_block: Option<u64>,
        /// Latest block to include
        #[arg(long)]
        end_block: Option<u64>,
        /// Result page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Results per page
        #[arg(long, default_value_t = 10)]
        offset: u32,
        #[command(flatten)]
        format: FormatArg,
    },
    /// ERC-20 transfers for an address, newest first
    Transfers {
        /// Account address
        address: String,
        /// Restrict to one token contract
        #[arg(long)]
        contract: Option<String>,
        /// Result page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Results per page
        #[arg(long, default_value_t = 10)]
        offset: u32,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Verified contract source metadata
    Contract {
        /// Contract address
        address: String,
        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove cached entries
    Clear {
        /// Clear only this namespace instead of all of them
        #[arg(long, value_enum)]
        namespace: Option<NamespaceArg>,
    },
}

/// Cache namespace selector for maintenance commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamespaceArg {
    Blockchain,
    Defillama,
}

/// RPC transport selector as it appears on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RpcTypeArg {
    Http,
    Wss,
}

impl RpcTypeArg {
    /// The transport this flag selects; `http` means https endpoints
    pub fn transport(self) -> RpcTransport {
        match self {
            RpcTypeArg::Http => RpcTransport::Https,
            RpcTypeArg::Wss => RpcTransport::Wss,
        }
    }
}
