use std::fmt;

use sha2::{Digest, Sha256};

/// A content-derived block identifier (32-byte SHA256).
///
/// Block IDs are computed over a block's encrypted on-wire form, so
/// equality of IDs defines block identity everywhere in the client:
/// two pointers that carry the same ID refer to the same immutable
/// content.
///
/// # Examples
///
/// ```
/// use vaultfs::block::BlockId;
///
/// let id = BlockId::from_bytes([0xab; 32]);
/// assert_eq!(id.to_hex().len(), 64);
/// assert_eq!(BlockId::from_hex(&id.to_hex()), Some(id));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub [u8; 32]);

impl BlockId {
    /// Creates a block ID from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a block ID by hashing a block's on-wire bytes.
    pub fn from_encoded_bytes(encoded: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(encoded);
        Self(hasher.finalize().into())
    }

    /// Parses a block ID from a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex_decode(s)?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Returns the raw bytes of the ID.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Converts to a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.to_hex())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An opaque identifier for a top-level folder.
///
/// The dedup index is qualified by folder so that identical plaintext
/// written into two different folders never aliases to one pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub [u8; 16]);

impl FolderId {
    /// Creates a folder ID from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the ID.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl fmt::Debug for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FolderId({})", self.to_hex())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A SHA256 digest of a direct file block's plaintext contents.
///
/// Keys the dedup index together with [`FolderId`]. Unlike
/// [`BlockId`], this hash covers the decrypted payload, so two writes
/// of the same plaintext produce the same digest regardless of how
/// they were encrypted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaintextHash(pub [u8; 32]);

impl PlaintextHash {
    /// Hashes plaintext contents.
    pub fn of(contents: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(contents);
        Self(hasher.finalize().into())
    }

    /// Returns the raw bytes of the digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Converts to a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl fmt::Debug for PlaintextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaintextHash({})", self.to_hex())
    }
}

impl fmt::Display for PlaintextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{:02x}", b);
            s
        })
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
