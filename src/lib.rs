//! vaultfs - block layer for a distributed encrypted filesystem client
//!
//! This library provides the content-addressed block data model and the
//! in-memory block caching that sits between the client's write
//! pipeline and its remote block server, amortizing network and
//! decryption cost.
//!
//! # Modules
//!
//! - [`block`] - Block identifiers, pointers, and the block variants
//! - [`cache`] - In-memory block cache with LRU eviction and shared
//!   byte accounting

pub mod block;
pub mod cache;

pub use block::{
    Block, BlockId, BlockPointer, CommonBlock, DirBlock, FileBlock, FolderId, PlaintextHash,
    RefNonce,
};
pub use cache::{BlockCache, CacheError, Lifetime};
