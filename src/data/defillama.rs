//! DeFi analytics client
//!
//! Wraps the DefiLlama TVL, coins, stablecoins, and yields services with
//! read-through disk caching. Every endpoint response is cached under a key
//! derived from the URL and query parameters, so repeated invocations within
//! the expiry window never touch the network.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{self, CacheStore};
use crate::config::Config;
use crate::http::{HttpClient, HttpError};
use crate::output;

/// A DeFi protocol entry from the protocol listing
///
/// Only the fields the table formatter and the filters read are typed; the
/// rest of the listing entry rides along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_1h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_1d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_7d: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Combined current TVL and TVL history for one protocol
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolInfo {
    pub name: String,
    pub current_tvl: f64,
    pub tvl_history: Value,
}

/// Client for the DeFi analytics services
#[derive(Debug, Clone)]
pub struct DefiLlamaClient {
    http: HttpClient,
    cache: CacheStore,
    base_url: String,
    coins_url: String,
    stablecoins_url: String,
    yields_url: String,
}

impl DefiLlamaClient {
    /// Creates a client from the aggregator configuration
    pub fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(&config.http),
            cache: CacheStore::new(
                &config.cache.root(),
                &config.cache.defillama_subdir,
                config.cache.expiry(),
            ),
            base_url: config.services.defillama_url.clone(),
            coins_url: config.services.defillama_coins_url.clone(),
            stablecoins_url: config.services.defillama_stablecoins_url.clone(),
            yields_url: config.services.defillama_yields_url.clone(),
        }
    }

    /// GET with read-through caching
    ///
    /// Serves a fresh cached copy when one exists; otherwise fetches, caches
    /// the response, and returns it. A failed cache write is reported but
    /// never fails the request.
    async fn request<T>(&self, url: &str, params: &[(&str, String)]) -> Result<T, HttpError>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = cache::request_key(url, params);
        if let Some(cached) = self.cache.get::<T>(&key) {
            return Ok(cached);
        }

        let data: T = self.http.get_json(url, params).await?;
        if let Err(err) = self.cache.put(&key, &data) {
            output::print_warning(&format!("could not cache response: {err}"));
        }
        Ok(data)
    }

    /// All protocols with their TVL
    pub async fn protocols(&self) -> Result<Vec<Protocol>, HttpError> {
        self.request(&format!("{}/protocols", self.base_url), &[])
            .await
    }

    /// Case-insensitive substring search over protocol names and slugs
    pub async fn search_protocols(&self, query: &str) -> Result<Vec<Protocol>, HttpError> {
        let query = query.to_lowercase();
        let protocols = self.protocols().await?;
        Ok(protocols
            .into_iter()
            .filter(|protocol| {
                protocol.name.to_lowercase().contains(&query)
                    || protocol
                        .slug
                        .as_deref()
                        .is_some_and(|slug| slug.to_lowercase().contains(&query))
            })
            .collect())
    }

    /// Protocols deployed on the given chain
    pub async fn chain_protocols(&self, chain: &str) -> Result<Vec<Protocol>, HttpError> {
        let chain = chain.to_lowercase();
        let protocols = self.protocols().await?;
        Ok(protocols
            .into_iter()
            .filter(|protocol| {
                protocol
                    .chains
                    .iter()
                    .any(|deployed| deployed.to_lowercase() == chain)
            })
            .collect())
    }

    /// Historical TVL of a protocol, as the service reports it
    pub async fn protocol_tvl(&self, protocol: &str) -> Result<Value, HttpError> {
        self.request(&format!("{}/protocol/{}", self.base_url, protocol), &[])
            .await
    }

    /// Current TVL of a protocol
    pub async fn current_tvl(&self, protocol: &str) -> Result<f64, HttpError> {
        self.request(&format!("{}/tvl/{}", self.base_url, protocol), &[])
            .await
    }

    /// Combined current TVL and history for a protocol
    ///
    /// The two upstream calls are independent, so they run concurrently.
    pub async fn protocol_info(&self, protocol: &str) -> Result<ProtocolInfo, HttpError> {
        let (history, current) =
            futures::future::join(self.protocol_tvl(protocol), self.current_tvl(protocol)).await;
        Ok(ProtocolInfo {
            name: protocol.to_string(),
            current_tvl: current?,
            tvl_history: history?,
        })
    }

    /// Current prices for DefiLlama coin identifiers
    pub async fn current_prices(&self, coins: &[String]) -> Result<Value, HttpError> {
        let url = format!("{}/prices/current/{}", self.coins_url, coins.join(","));
        self.request(&url, &search_width()).await
    }

    /// Prices for coin identifiers at a past unix timestamp
    pub async fn historical_prices(
        &self,
        coins: &[String],
        timestamp: i64,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/prices/historical/{}/{}",
            self.coins_url,
            timestamp,
            coins.join(",")
        );
        self.request(&url, &search_width()).await
    }

    /// Latest data for all yield pools
    pub async fn pools(&self) -> Result<Vec<Value>, HttpError> {
        let url = format!("{}/pools", self.yields_url);
        let response: Value = self.request(&url, &[]).await?;
        Ok(unwrap_list(response, "data"))
    }

    /// All stablecoins with current prices
    pub async fn stablecoins(&self) -> Result<Vec<Value>, HttpError> {
        let url = format!("{}/stablecoins", self.stablecoins_url);
        let params = [("includePrices", "true".to_string())];
        let response: Value = self.request(&url, &params).await?;
        Ok(unwrap_list(response, "peggedAssets"))
    }

    /// DEX volume overview, optionally restricted to one chain
    pub async fn dex_overview(&self, chain: Option<&str>) -> Result<Value, HttpError> {
        let url = overview_url(&self.base_url, "dexs", chain);
        let params = [
            ("excludeTotalDataChart", "true".to_string()),
            ("excludeTotalDataChartBreakdown", "true".to_string()),
        ];
        self.request(&url, &params).await
    }

    /// Options volume overview, optionally restricted to one chain
    pub async fn options_overview(&self, chain: Option<&str>) -> Result<Value, HttpError> {
        let url = overview_url(&self.base_url, "options", chain);
        let params = [
            ("excludeTotalDataChart", "false".to_string()),
            ("excludeTotalDataChartBreakdown", "false".to_string()),
            ("dataType", "dailyNotionalVolume".to_string()),
        ];
        self.request(&url, &params).await
    }

    /// Protocol fees overview, optionally restricted to one chain
    pub async fn fees_overview(&self, chain: Option<&str>) -> Result<Value, HttpError> {
        let url = overview_url(&self.base_url, "fees", chain);
        let params = [
            ("excludeTotalDataChart", "false".to_string()),
            ("excludeTotalDataChartBreakdown", "false".to_string()),
            ("dataType", "dailyFees".to_string()),
        ];
        self.request(&url, &params).await
    }
}

fn search_width() -> [(&'static str, String); 1] {
    [("searchWidth", "6h".to_string())]
}

fn overview_url(base: &str, market: &str, chain: Option<&str>) -> String {
    match chain {
        Some(chain) => format!("{base}/overview/{market}/{chain}"),
        None => format!("{base}/overview/{market}"),
    }
}

/// Unwraps `{"<key>": [...]}` envelopes, passing bare arrays through
///
/// Older cached copies of the yields listing are bare arrays; current
/// responses wrap the rows in an envelope.
fn unwrap_list(response: Value, key: &str) -> Vec<Value> {
    match response {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => match envelope.remove(key) {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Maps a ticker symbol to the DefiLlama coin identifier format
///
/// Identifiers already in `chain:address` or `coingecko:slug` form pass
/// through unchanged; well-known tickers map to their coingecko ids; any
/// other bare symbol is assumed to be a coingecko slug.
pub fn token_identifier(token: &str) -> String {
    if token.contains(':') {
        return token.to_string();
    }
    let known = match token.to_uppercase().as_str() {
        "BTC" => Some("coingecko:bitcoin"),
        "ETH" => Some("coingecko:ethereum"),
        "SOL" => Some("coingecko:solana"),
        "BNB" => Some("coingecko:binancecoin"),
        "XRP" => Some("coingecko:ripple"),
        "ADA" => Some("coingecko:cardano"),
        "DOGE" => Some("coingecko:dogecoin"),
        "MATIC" => Some("coingecko:matic-network"),
        "DOT" => Some("coingecko:polkadot"),
        "AVAX" => Some("coingecko:avalanche-2"),
        "LINK" => Some("coingecko:chainlink"),
        "UNI" => Some("coingecko:uniswap"),
        "USDT" => Some("coingecko:tether"),
        "USDC" => Some("coingecko:usd-coin"),
        "DAI" => Some("coingecko:dai"),
        _ => None,
    };
    match known {
        Some(id) => id.to_string(),
        None => format!("coingecko:{}", token.to_lowercase()),
    }
}
