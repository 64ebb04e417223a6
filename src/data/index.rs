//! In-memory lookup index over a chain registry snapshot
//!
//! The index is immutable once built: a refresh constructs a whole new
//! `ChainIndex` and the holder swaps its copy, so lookups never observe a
//! partially rebuilt state.

use std::collections::HashMap;

use super::{ChainRecord, Identifier};

/// Multi-key index over the chain registry
///
/// Owns the records in registry order plus three lookup maps keyed by
/// numeric id, lowercased name, and lowercased short name. All point-lookups
/// are O(1); `search` scans.
#[derive(Debug, Default)]
pub struct ChainIndex {
    chains: Vec<ChainRecord>,
    by_id: HashMap<u64, usize>,
    by_name: HashMap<String, usize>,
    by_short_name: HashMap<String, usize>,
}

impl ChainIndex {
    /// Builds the lookup maps from a full registry snapshot in one pass
    ///
    /// Later records win on duplicate ids or names, matching registry order.
    pub fn build(chains: Vec<ChainRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(chains.len());
        let mut by_name = HashMap::with_capacity(chains.len());
        let mut by_short_name = HashMap::new();

        for (pos, chain) in chains.iter().enumerate() {
            by_id.insert(chain.chain_id, pos);
            by_name.insert(chain.name.to_lowercase(), pos);
            if let Some(short) = chain.short_name.as_deref() {
                if !short.is_empty() {
                    by_short_name.insert(short.to_lowercase(), pos);
                }
            }
        }

        Self {
            chains,
            by_id,
            by_name,
            by_short_name,
        }
    }

    /// All records in registry order
    pub fn chains(&self) -> &[ChainRecord] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Lookup by numeric chain id
    pub fn get_by_id(&self, chain_id: u64) -> Option<&ChainRecord> {
        self.by_id.get(&chain_id).map(|&pos| &self.chains[pos])
    }

    /// Case-insensitive lookup by full display name
    pub fn get_by_name(&self, name: &str) -> Option<&ChainRecord> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&pos| &self.chains[pos])
    }

    /// Case-insensitive lookup by short name
    pub fn get_by_short_name(&self, short_name: &str) -> Option<&ChainRecord> {
        self.by_short_name
            .get(&short_name.to_lowercase())
            .map(|&pos| &self.chains[pos])
    }

    /// Lookup by a parsed identifier
    ///
    /// Name identifiers consult the full-name map only; short names are
    /// reachable solely through `get_by_short_name` or `search`.
    pub fn get(&self, identifier: &Identifier) -> Option<&ChainRecord> {
        match identifier {
            Identifier::Id(id) => self.get_by_id(*id),
            Identifier::Name(name) => self.get_by_name(name),
        }
    }

    /// Case-insensitive search by id, name, or short name
    ///
    /// An exact id match (the query parsed as an integer) comes first,
    /// followed by every record whose name or short name contains the query
    /// as a substring, in registry order. The two lists are concatenated
    /// without de-duplication, so an id match can reappear among the
    /// substring hits.
    pub fn search(&self, query: &str) -> Vec<&ChainRecord> {
        let query = query.trim().to_lowercase();
        let mut results = Vec::new();

        if let Ok(chain_id) = query.parse::<u64>() {
            if let Some(chain) = self.get_by_id(chain_id) {
                results.push(chain);
            }
        }

        for chain in &self.chains {
            let name_hit = chain.name.to_lowercase().contains(&query);
            let short_hit = chain
                .short_name
                .as_deref()
                .is_some_and(|short| short.to_lowercase().contains(&query));
            if name_hit || short_hit {
                results.push(chain);
            }
        }

        results
    }
}
