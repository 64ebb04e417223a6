//! ChainData Library
//!
//! This module exposes the cache, client, and formatting modules for use in
//! integration tests and the chaindata binary.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod http;
pub mod output;
pub mod shell;
