//! Data models and upstream clients
//!
//! This module contains the typed models shared across the aggregator (chain
//! records and the identifiers used to look them up) along with one client
//! submodule per upstream service.

pub mod chainlist;
pub mod defillama;
pub mod etherscan;
pub mod index;

pub use chainlist::ChainlistClient;
pub use defillama::{DefiLlamaClient, Protocol, ProtocolInfo};
pub use etherscan::{ContractSource, EtherscanClient, EtherscanError, TokenTransfer, Transaction};
pub use index::ChainIndex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single chain entry from the chain registry
///
/// Only the fields the lookup index and the derived accessors touch are
/// typed; everything else the registry publishes rides along in `extra` so
/// cached snapshots and JSON output keep the upstream payload intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    /// Unique numeric chain identifier, the primary lookup key
    pub chain_id: u64,
    /// Display name, a case-insensitive secondary lookup key
    pub name: String,
    /// Short name, a case-insensitive tertiary lookup key when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// RPC endpoints in registry order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc: Vec<RpcEndpoint>,
    /// Block explorers in registry order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explorers: Vec<Explorer>,
    /// Native currency metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,
    /// Feature tags, usually EIP support markers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Value>,
    /// Total value locked as reported by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvl: Option<f64>,
    /// Remaining registry fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One RPC endpoint with its tracking policy
///
/// The registry publishes most endpoints as objects carrying a `tracking`
/// tag; a few chains still list bare URL strings, which normalize to an
/// endpoint with no tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RpcEntry")]
pub struct RpcEndpoint {
    pub url: String,
    /// Tracking policy tag; `"none"` means the operator reports no tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RpcEntry {
    Tagged {
        url: String,
        #[serde(default)]
        tracking: Option<String>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    Plain(String),
}

impl From<RpcEntry> for RpcEndpoint {
    fn from(entry: RpcEntry) -> Self {
        match entry {
            RpcEntry::Tagged {
                url,
                tracking,
                extra,
            } => Self {
                url,
                tracking,
                extra,
            },
            RpcEntry::Plain(url) => Self {
                url,
                tracking: None,
                extra: serde_json::Map::new(),
            },
        }
    }
}

/// One block-explorer entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explorer {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Native currency metadata for a chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// RPC transport selector for endpoint filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcTransport {
    Https,
    Wss,
}

impl RpcTransport {
    /// URL scheme prefix this transport matches
    fn scheme_prefix(self) -> &'static str {
        match self {
            RpcTransport::Https => "https://",
            RpcTransport::Wss => "wss://",
        }
    }
}

/// How a caller names a chain: by numeric id or by display name
///
/// Parsed once at the input boundary so lookups never re-inspect strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(u64),
    Name(String),
}

impl Identifier {
    /// Digits parse as an id; anything else becomes a name lookup
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<u64>() {
            Ok(id) => Identifier::Id(id),
            Err(_) => Identifier::Name(trimmed.to_string()),
        }
    }
}

impl ChainRecord {
    /// RPC URLs matching `transport`, optionally restricted to endpoints
    /// whose operator reports no tracking
    ///
    /// Transport matching is a case-insensitive scheme-prefix check, not URL
    /// parsing, and the returned URLs keep their original casing. An
    /// endpoint with no tracking tag counts as tracked.
    pub fn rpc_urls(&self, transport: RpcTransport, no_tracking: bool) -> Vec<&str> {
        self.rpc
            .iter()
            .filter(|rpc| {
                rpc.url
                    .to_ascii_lowercase()
                    .starts_with(transport.scheme_prefix())
            })
            .filter(|rpc| {
                !no_tracking
                    || rpc
                        .tracking
                        .as_deref()
                        .is_some_and(|tag| tag.eq_ignore_ascii_case("none"))
            })
            .map(|rpc| rpc.url.as_str())
            .collect()
    }

    /// Explorer URLs, optionally restricted to explorers named `kind`
    pub fn explorer_urls(&self, kind: Option<&str>) -> Vec<&str> {
        self.explorers
            .iter()
            .filter(|explorer| kind.map_or(true, |k| explorer.name == k))
            .map(|explorer| explorer.url.as_str())
            .collect()
    }

    /// Link to `address` on the chain's etherscan-family explorer, if any
    pub fn explorer_address_link(&self, address: &str) -> Option<String> {
        self.explorers
            .iter()
            .find(|explorer| explorer.name == "etherscan")
            .map(|explorer| format!("{}/address/{}", explorer.url, address))
    }

    /// Flattened feature tags, usually EIP support strings
    pub fn eips(&self) -> Vec<String> {
        self.features
            .iter()
            .filter_map(|feature| feature.as_object())
            .flat_map(|obj| obj.values())
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
