use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::block::{BlockPointer, FolderId, PlaintextHash};

/// Key for the dedup index: identical plaintext in two different
/// folders must not alias to one pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct DedupKey {
    pub folder: FolderId,
    pub hash: PlaintextHash,
}

impl DedupKey {
    pub fn new(folder: FolderId, hash: PlaintextHash) -> Self {
        Self { folder, hash }
    }
}

/// Reverse lookup from plaintext hash to an existing block pointer.
///
/// Lets a writer discover that a freshly written direct file block
/// already has a pointer, instead of uploading it again. The index is
/// a bounded LRU sized together with the transient store; its entries
/// are pointer-sized and are not charged against the byte budget.
pub(crate) struct DedupIndex {
    ptrs: Mutex<LruCache<DedupKey, BlockPointer>>,
}

impl DedupIndex {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            ptrs: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up a pointer, refreshing its recency.
    pub fn lookup(&self, key: &DedupKey) -> Option<BlockPointer> {
        self.ptrs.lock().get(key).copied()
    }

    pub fn record(&self, key: DedupKey, ptr: BlockPointer) {
        self.ptrs.lock().push(key, ptr);
    }

    /// Erases an entry; absent keys are fine.
    pub fn forget(&self, key: &DedupKey) {
        self.ptrs.lock().pop(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;

    fn key(folder: u8, contents: &[u8]) -> DedupKey {
        DedupKey::new(FolderId::from_bytes([folder; 16]), PlaintextHash::of(contents))
    }

    #[test]
    fn test_record_lookup_forget() {
        let index = DedupIndex::new(NonZeroUsize::new(4).unwrap());
        let ptr = BlockPointer::initial(BlockId::from_bytes([1; 32]));

        assert_eq!(index.lookup(&key(0, b"data")), None);
        index.record(key(0, b"data"), ptr);
        assert_eq!(index.lookup(&key(0, b"data")), Some(ptr));

        // Same plaintext, different folder: no aliasing.
        assert_eq!(index.lookup(&key(1, b"data")), None);

        index.forget(&key(0, b"data"));
        assert_eq!(index.lookup(&key(0, b"data")), None);
        // Forgetting again is a no-op.
        index.forget(&key(0, b"data"));
    }

    #[test]
    fn test_index_is_bounded() {
        let index = DedupIndex::new(NonZeroUsize::new(2).unwrap());
        let ptr = BlockPointer::initial(BlockId::from_bytes([1; 32]));

        index.record(key(0, b"a"), ptr);
        index.record(key(0, b"b"), ptr);
        index.record(key(0, b"c"), ptr);

        // Oldest entry fell out.
        assert_eq!(index.lookup(&key(0, b"a")), None);
        assert_eq!(index.lookup(&key(0, b"c")), Some(ptr));
    }
}
