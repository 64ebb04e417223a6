//! Cache module for storing API responses to disk
//!
//! This module provides a namespaced cache store that persists API responses
//! to the filesystem with configurable expiry windows. Expired or unreadable
//! entries read as absent, so callers always fall through to a fresh fetch
//! rather than operating on stale data.

mod store;

pub use store::{request_key, CacheError, CacheStore};
