//! Chain registry client
//!
//! Fetches the full chain list from chainlist.org, persists the snapshot
//! through the cache store, and builds `ChainIndex` lookups from whichever
//! copy (cached or fresh) ends up being used.

use crate::cache::CacheStore;
use crate::config::Config;
use crate::http::{HttpClient, HttpError};
use crate::output;

use super::{ChainIndex, ChainRecord};

/// Cache key for the full registry snapshot
const SNAPSHOT_KEY: &str = "blockchain_data";

/// Client for the chain registry with a disk-cached snapshot
#[derive(Debug, Clone)]
pub struct ChainlistClient {
    http: HttpClient,
    cache: CacheStore,
    url: String,
}

impl ChainlistClient {
    /// Creates a client from the aggregator configuration
    pub fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(&config.http),
            cache: CacheStore::new(
                &config.cache.root(),
                &config.cache.blockchain_subdir,
                config.cache.blockchain_expiry(),
            ),
            url: config.services.chainlist_url.clone(),
        }
    }

    /// Replaces the registry URL, for tests or self-hosted mirrors
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Loads the registry snapshot and builds the lookup index
    ///
    /// Without `force_refresh` a fresh cached snapshot is served without
    /// touching the network. A forced refresh always fetches; if the fetch
    /// fails the result is an empty index, never a stale snapshot.
    pub async fn refresh(&self, force_refresh: bool) -> ChainIndex {
        if !force_refresh {
            if let Some(chains) = self.cache.get::<Vec<ChainRecord>>(SNAPSHOT_KEY) {
                output::print_info("Using cached chain data");
                return ChainIndex::build(chains);
            }
        }

        output::print_info("Fetching chain data from the registry...");
        match self.fetch_chains().await {
            Ok(chains) => {
                if let Err(err) = self.cache.put(SNAPSHOT_KEY, &chains) {
                    output::print_warning(&format!("could not cache chain data: {err}"));
                }
                ChainIndex::build(chains)
            }
            Err(err) => {
                output::print_warning(&format!("failed to fetch chain data: {err}"));
                ChainIndex::default()
            }
        }
    }

    /// One full-list fetch from the registry
    async fn fetch_chains(&self) -> Result<Vec<ChainRecord>, HttpError> {
        self.http.get_json(&self.url, &[]).await
    }
}
