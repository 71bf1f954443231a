use std::fmt;

use super::id::BlockId;

/// A reference nonce disambiguating distinct logical references to the
/// same content.
///
/// Content addressing means one block can be referenced from many
/// places; each non-initial reference carries a fresh nonce so the
/// block server can count them separately. The zero nonce marks the
/// initial reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RefNonce(pub [u8; 8]);

impl RefNonce {
    /// The zero nonce, marking a block's initial reference.
    pub const ZERO: RefNonce = RefNonce([0u8; 8]);

    /// Creates a nonce from raw bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns `true` for the zero nonce.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 8]
    }
}

impl fmt::Debug for RefNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefNonce(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// A locator for a block: its content ID plus the reference nonce of
/// this particular logical reference.
///
/// # Examples
///
/// ```
/// use vaultfs::block::{BlockId, BlockPointer, RefNonce};
///
/// let ptr = BlockPointer::new(
///     BlockId::from_bytes([1; 32]),
///     RefNonce::from_bytes([7; 8]),
/// );
/// assert!(ptr.with_zero_ref_nonce().ref_nonce.is_zero());
/// assert_eq!(ptr.with_zero_ref_nonce().id, ptr.id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockPointer {
    /// The content hash identifying the block.
    pub id: BlockId,
    /// The reference nonce for this logical reference.
    pub ref_nonce: RefNonce,
}

impl BlockPointer {
    /// Creates a pointer from an ID and a reference nonce.
    pub fn new(id: BlockId, ref_nonce: RefNonce) -> Self {
        Self { id, ref_nonce }
    }

    /// Creates a pointer for a block's initial (zero-nonce) reference.
    pub fn initial(id: BlockId) -> Self {
        Self {
            id,
            ref_nonce: RefNonce::ZERO,
        }
    }

    /// Returns the same pointer with its reference nonce zeroed.
    ///
    /// This is the canonical form stored in the dedup index, so that
    /// differently-refcounted pointers to the same plaintext collide.
    pub fn with_zero_ref_nonce(&self) -> Self {
        Self {
            id: self.id,
            ref_nonce: RefNonce::ZERO,
        }
    }
}
