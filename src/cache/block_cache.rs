use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use super::byte_budget::ByteBudget;
use super::dedup::{DedupIndex, DedupKey};
use super::error::CacheError;
use crate::block::{Block, BlockId, BlockPointer, FileBlock, FolderId};

/// Default entry capacity for the transient store and dedup index.
pub const DEFAULT_TRANSIENT_CAPACITY: usize = 10_000;

/// Default shared byte budget for the clean tiers (256 MiB).
pub const DEFAULT_CLEAN_BYTES_CAPACITY: u64 = 256 * 1024 * 1024;

/// Storage tier chosen for a block at put time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lifetime {
    /// Do not cache the block at all.
    None,
    /// Bounded LRU residency; the entry may be evicted at any time.
    Transient,
    /// Pinned until explicitly deleted. Used for blocks this client is
    /// authoring, which must not be lost before they are flushed to
    /// the block server.
    Permanent,
}

/// A transient entry: the block plus the prefetch hint that travels
/// with it.
#[derive(Clone)]
struct CachedEntry {
    block: Block,
    has_prefetched: bool,
}

/// The number of bytes a block counts against the byte budget.
///
/// Direct file blocks count their plaintext length; every other kind
/// approximates plaintext size with the recorded on-wire size.
fn cached_block_size(block: &Block) -> u64 {
    match block {
        Block::File(file) => match file.contents() {
            Some(contents) => contents.len() as u64,
            None => u64::from(file.encoded_size()),
        },
        _ => u64::from(block.encoded_size()),
    }
}

/// In-memory cache for clean, decrypted blocks.
///
/// Two residency tiers share one byte budget: a bounded LRU *transient*
/// tier for blocks read from the server, and an unbounded *permanent*
/// tier for blocks this client is authoring. A plaintext-hash index
/// over transient direct file blocks lets writers discover an existing
/// pointer for identical contents instead of uploading again.
///
/// Transient inserts evict least-recently-used entries until the new
/// block fits under the byte capacity, and fail if eviction cannot make
/// enough room; permanent inserts always succeed, even past capacity.
///
/// # Example
///
/// ```
/// use vaultfs::block::{BlockId, BlockPointer, FileBlock, FolderId};
/// use vaultfs::cache::{BlockCache, Lifetime};
///
/// let cache = BlockCache::new(1024, 64 * 1024 * 1024);
/// let ptr = BlockPointer::initial(BlockId::from_bytes([1; 32]));
/// let folder = FolderId::from_bytes([0; 16]);
///
/// cache.put(ptr, folder, FileBlock::direct(&b"contents"[..]).into(), Lifetime::Transient)?;
/// let block = cache.get(ptr)?;
/// assert_eq!(cache.used_bytes(), 8);
/// # Ok::<(), vaultfs::cache::CacheError>(())
/// ```
pub struct BlockCache {
    /// Bounded LRU of blocks read from the server, keyed by block ID.
    transient: Option<Mutex<LruCache<BlockId, CachedEntry>>>,
    /// Unbounded pinned store for blocks this client is authoring.
    permanent: RwLock<HashMap<BlockId, Block>>,
    /// Plaintext hash → pointer index for write deduplication.
    dedup: Option<DedupIndex>,
    /// Shared byte accounting for both tiers.
    budget: ByteBudget,
}

impl BlockCache {
    /// Creates a cache with the given transient entry capacity and
    /// shared clean-bytes capacity.
    ///
    /// A `transient_capacity` of zero disables the transient store and
    /// the dedup index together; permanent-only operation remains
    /// supported (and goes unaccounted, since the byte budget exists
    /// to police the transient tier).
    pub fn new(transient_capacity: usize, clean_bytes_capacity: u64) -> Arc<Self> {
        let (transient, dedup) = match NonZeroUsize::new(transient_capacity) {
            Some(capacity) => (
                Some(Mutex::new(LruCache::new(capacity))),
                Some(DedupIndex::new(capacity)),
            ),
            None => (None, None),
        };
        Arc::new(Self {
            transient,
            permanent: RwLock::new(HashMap::new()),
            dedup,
            budget: ByteBudget::new(clean_bytes_capacity),
        })
    }

    /// Looks up a block by pointer, probing the transient tier first.
    pub fn get(&self, ptr: BlockPointer) -> Result<Block, CacheError> {
        let (block, _, _) = self.get_with_prefetch(ptr)?;
        Ok(block)
    }

    /// Looks up a block by pointer, also reporting whether a prefetch
    /// has been scheduled for it and which tier it came from.
    pub fn get_with_prefetch(
        &self,
        ptr: BlockPointer,
    ) -> Result<(Block, bool, Lifetime), CacheError> {
        if let Some(transient) = self.transient.as_ref() {
            let mut lru = transient.lock();
            if let Some(entry) = lru.get(&ptr.id) {
                return Ok((
                    entry.block.clone(),
                    entry.has_prefetched,
                    Lifetime::Transient,
                ));
            }
        }

        if let Some(block) = self.permanent.read().get(&ptr.id) {
            // A permanent entry only exists while this client is
            // authoring the block, and the writer already holds any
            // children it references, so it counts as prefetched.
            return Ok((block.clone(), true, Lifetime::Permanent));
        }

        Err(CacheError::NoSuchBlock(ptr.id))
    }

    /// Caches a block under the given lifetime, assuming any follow-on
    /// prefetch has already happened.
    ///
    /// Callers that initiated the read themselves use
    /// [`put_with_prefetch`](Self::put_with_prefetch) with
    /// `has_prefetched = false` so that a later get can still trigger
    /// prefetching.
    pub fn put(
        &self,
        ptr: BlockPointer,
        folder: FolderId,
        block: Block,
        lifetime: Lifetime,
    ) -> Result<(), CacheError> {
        self.put_with_prefetch(ptr, folder, block, lifetime, true)
    }

    /// Caches a block under the given lifetime, carrying an explicit
    /// prefetch hint.
    ///
    /// Re-putting a pointer that is already transient OR-merges the
    /// hint with the cached one and refreshes recency. This method is
    /// idempotent per pointer as long as the block's size does not
    /// change between puts.
    pub fn put_with_prefetch(
        &self,
        ptr: BlockPointer,
        folder: FolderId,
        block: Block,
        lifetime: Lifetime,
        mut has_prefetched: bool,
    ) -> Result<(), CacheError> {
        // Only concrete directory and file blocks are cacheable.
        match &block {
            Block::Dir(_) | Block::File(_) => {}
            Block::Common(_) => return Err(CacheError::AttemptedCommonBlock),
        }

        let size = cached_block_size(&block);

        match lifetime {
            Lifetime::None => Ok(()),

            Lifetime::Transient => {
                // Direct file contents get a hash → pointer entry so a
                // later identical write can reuse this pointer. The
                // stored nonce is zeroed so differently-refcounted
                // pointers to the same plaintext collide.
                if let Block::File(file) = &block {
                    if let (Some(hash), Some(dedup)) = (file.plaintext_hash(), self.dedup.as_ref())
                    {
                        dedup.record(DedupKey::new(folder, hash), ptr.with_zero_ref_nonce());
                    }
                }
                let Some(transient) = self.transient.as_ref() else {
                    return Ok(());
                };
                let was_in_cache = {
                    // `get` rather than `contains`: refreshing recency
                    // makes it less likely another thread evicts this
                    // entry between the probe and the insert below.
                    let mut lru = transient.lock();
                    match lru.get(&ptr.id) {
                        Some(entry) => {
                            has_prefetched = has_prefetched || entry.has_prefetched;
                            true
                        }
                        None => false,
                    }
                };
                if !was_in_cache && !self.make_room_for(size, lifetime) {
                    tracing::debug!("no room in transient cache for block {}", ptr.id);
                    return Err(CacheError::CapacityExhausted(ptr.id));
                }
                self.insert_transient(
                    transient,
                    ptr.id,
                    CachedEntry {
                        block,
                        has_prefetched,
                    },
                );
                Ok(())
            }

            Lifetime::Permanent => {
                let was_in_cache = self.permanent.write().insert(ptr.id, block).is_some();
                if !was_in_cache {
                    // The result is deliberately ignored: a permanent
                    // entry is stored even when its bytes overflow the
                    // budget.
                    self.make_room_for(size, lifetime);
                }
                Ok(())
            }
        }
    }

    /// Returns an existing pointer for a direct file block with
    /// identical plaintext, if one is indexed for this folder.
    ///
    /// Directory and common blocks simply have no index entry; asking
    /// about an indirect file block is a caller error, since there is
    /// no plaintext to hash.
    pub fn lookup_by_hash(
        &self,
        folder: FolderId,
        block: &Block,
    ) -> Result<Option<BlockPointer>, CacheError> {
        let Block::File(file) = block else {
            return Ok(None);
        };
        let Some(hash) = file.plaintext_hash() else {
            return Err(CacheError::NotDirectFileBlock);
        };
        let Some(dedup) = self.dedup.as_ref() else {
            return Ok(None);
        };
        Ok(dedup.lookup(&DedupKey::new(folder, hash)))
    }

    /// Removes a transient entry, releasing its bytes and forgetting
    /// its dedup-index entry for direct file contents. Absent pointers
    /// are a no-op.
    pub fn delete_transient(&self, ptr: BlockPointer, folder: FolderId) {
        let Some(transient) = self.transient.as_ref() else {
            return;
        };
        let removed = transient.lock().pop(&ptr.id);
        if let Some(entry) = removed {
            if let Block::File(file) = &entry.block {
                if let (Some(hash), Some(dedup)) = (file.plaintext_hash(), self.dedup.as_ref()) {
                    dedup.forget(&DedupKey::new(folder, hash));
                }
            }
            self.budget.release(cached_block_size(&entry.block));
        }
    }

    /// Removes a permanent entry, releasing its bytes. Absent IDs are
    /// a no-op.
    pub fn delete_permanent(&self, id: BlockId) {
        let removed = self.permanent.write().remove(&id);
        if let Some(block) = removed {
            self.budget.release(cached_block_size(&block));
        }
    }

    /// Forgets only the dedup-index entry for a direct file block's
    /// plaintext, leaving any cached block in place.
    pub fn delete_known_ptr(&self, folder: FolderId, block: &FileBlock) -> Result<(), CacheError> {
        let Some(hash) = block.plaintext_hash() else {
            return Err(CacheError::NotDirectFileBlock);
        };
        if let Some(dedup) = self.dedup.as_ref() {
            dedup.forget(&DedupKey::new(folder, hash));
        }
        Ok(())
    }

    /// Total bytes currently charged for resident clean blocks.
    pub fn used_bytes(&self) -> u64 {
        self.budget.used()
    }

    /// Number of entries in the transient store (zero when disabled).
    pub fn transient_len(&self) -> usize {
        self.transient.as_ref().map_or(0, |t| t.lock().len())
    }

    /// The shared byte capacity for the clean tiers.
    pub fn clean_bytes_capacity(&self) -> u64 {
        self.budget.capacity()
    }

    /// Replaces the shared byte capacity.
    ///
    /// Shrinking does not evict retroactively; the new value applies
    /// to subsequent inserts.
    pub fn set_clean_bytes_capacity(&self, capacity: u64) {
        self.budget.set_capacity(capacity);
    }

    /// Evicts transient entries until `size` more bytes fit under the
    /// byte capacity, then charges them.
    ///
    /// Returns whether the charge succeeded. Permanent callers are
    /// charged even on failure, since their blocks are stored
    /// regardless; `false` tells a transient caller to report capacity
    /// exhaustion. Without a transient store there is nothing to evict
    /// or account, and the answer is always `false`.
    fn make_room_for(&self, size: u64, lifetime: Lifetime) -> bool {
        let Some(transient) = self.transient.as_ref() else {
            return false;
        };
        let cap = self.budget.capacity();
        // The budget lock is confined to `try_charge`; eviction
        // re-enters the budget to release bytes, so it must run with
        // the lock dropped. A transient length unchanged since the
        // previous pass means eviction stopped making progress.
        let mut prev_len = transient.lock().len() + 1;
        loop {
            if self.budget.try_charge(size, cap) {
                return true;
            }
            let len = transient.lock().len();
            if len == prev_len {
                break;
            }
            prev_len = len;
            self.evict_oldest(transient);
        }
        if lifetime == Lifetime::Permanent {
            self.budget.charge(size);
        }
        false
    }

    fn evict_oldest(&self, transient: &Mutex<LruCache<BlockId, CachedEntry>>) {
        let evicted = transient.lock().pop_lru();
        if let Some((id, entry)) = evicted {
            let size = cached_block_size(&entry.block);
            tracing::trace!("evicted transient block {} ({} bytes)", id, size);
            self.budget.release(size);
        }
    }

    fn insert_transient(
        &self,
        transient: &Mutex<LruCache<BlockId, CachedEntry>>,
        id: BlockId,
        entry: CachedEntry,
    ) {
        let evicted = transient.lock().push(id, entry);
        match evicted {
            // A same-key replacement keeps its original byte charge;
            // block sizes are assumed stable across re-puts of one
            // pointer.
            Some((old_id, old)) if old_id != id => {
                let size = cached_block_size(&old.block);
                tracing::trace!("evicted transient block {} ({} bytes)", old_id, size);
                self.budget.release(size);
            }
            _ => {}
        }
    }
}
