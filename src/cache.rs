//! In-memory caching for clean filesystem blocks.
//!
//! This module holds the client's block cache: a bounded LRU transient
//! tier and an unbounded pinned permanent tier sharing one byte
//! budget, plus a plaintext-hash index used to deduplicate freshly
//! written file contents.

mod block_cache;
mod byte_budget;
mod dedup;
mod error;

pub use block_cache::{
    BlockCache, Lifetime, DEFAULT_CLEAN_BYTES_CAPACITY, DEFAULT_TRANSIENT_CAPACITY,
};
pub use error::CacheError;
