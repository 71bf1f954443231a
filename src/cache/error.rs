use thiserror::Error;

use crate::block::BlockId;

/// Errors surfaced by the block cache.
///
/// All of these are local to a single operation: the cache never
/// retries on the caller's behalf, and its structures remain
/// consistent after any error return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A get probed both tiers without a hit. Callers fetch from the
    /// next tier down.
    #[error("no such block in cache: {0}")]
    NoSuchBlock(BlockId),

    /// A transient put could not evict enough to fit within the byte
    /// capacity.
    #[error("cache capacity exhausted putting block {0}")]
    CapacityExhausted(BlockId),

    /// A cache entry held a payload of an unexpected shape. Callers
    /// treat this as corruption: log it and handle it as a miss.
    #[error("bad cached data for block {0}")]
    BadData(BlockId),

    /// A dedup operation was handed an indirect file block; only
    /// direct file blocks carry plaintext to hash.
    #[error("not a direct file block")]
    NotDirectFileBlock,

    /// A put was handed a block of a kind the cache cannot hold.
    #[error("attempted to cache an unknown block kind: {0}")]
    UnknownBlockKind(&'static str),

    /// A put was handed a bare common block rather than a concrete
    /// directory or file block.
    #[error("attempted to cache a common block")]
    AttemptedCommonBlock,
}
