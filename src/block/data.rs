use std::collections::BTreeMap;

use bytes::Bytes;

use super::id::PlaintextHash;
use super::pointer::BlockPointer;

/// Envelope bookkeeping shared by every block.
///
/// A `CommonBlock` on its own is a placeholder for a block whose
/// concrete kind is not yet known (for example, one whose envelope has
/// been read but whose body has not been decoded). It is never
/// cacheable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonBlock {
    encoded_size: u32,
}

impl CommonBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoded_size(&self) -> u32 {
        self.encoded_size
    }

    pub fn set_encoded_size(&mut self, size: u32) {
        self.encoded_size = size;
    }
}

/// A directory block: named entries pointing at child blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirBlock {
    children: BTreeMap<String, BlockPointer>,
    encoded_size: u32,
}

impl DirBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &BTreeMap<String, BlockPointer> {
        &self.children
    }

    /// Adds or replaces a named child entry.
    pub fn insert_child(&mut self, name: impl Into<String>, ptr: BlockPointer) {
        self.children.insert(name.into(), ptr);
    }

    pub fn encoded_size(&self) -> u32 {
        self.encoded_size
    }

    /// Records the block's on-wire size, as observed at encode or
    /// decode time.
    pub fn set_encoded_size(&mut self, size: u32) {
        self.encoded_size = size;
    }
}

/// The body of a file block: either plaintext contents or, for large
/// files, pointers to child blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
enum FileBody {
    Direct(Bytes),
    Indirect(Vec<BlockPointer>),
}

/// A file block.
///
/// Direct file blocks hold a contiguous run of plaintext; indirect
/// blocks hold an ordered list of child pointers covering the file's
/// extent. Only direct blocks participate in plaintext deduplication.
///
/// # Examples
///
/// ```
/// use vaultfs::block::FileBlock;
///
/// let direct = FileBlock::direct(&b"hello"[..]);
/// assert!(!direct.is_indirect());
/// assert_eq!(direct.contents().unwrap().as_ref(), b"hello");
///
/// let indirect = FileBlock::indirect(vec![]);
/// assert!(indirect.is_indirect());
/// assert!(indirect.contents().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileBlock {
    body: FileBody,
    encoded_size: u32,
}

impl FileBlock {
    /// Creates a direct file block from plaintext contents.
    pub fn direct(contents: impl Into<Bytes>) -> Self {
        Self {
            body: FileBody::Direct(contents.into()),
            encoded_size: 0,
        }
    }

    /// Creates an indirect file block from child pointers.
    pub fn indirect(children: Vec<BlockPointer>) -> Self {
        Self {
            body: FileBody::Indirect(children),
            encoded_size: 0,
        }
    }

    pub fn is_indirect(&self) -> bool {
        matches!(self.body, FileBody::Indirect(_))
    }

    /// Returns the plaintext contents of a direct block, `None` for
    /// indirect blocks.
    pub fn contents(&self) -> Option<&Bytes> {
        match &self.body {
            FileBody::Direct(contents) => Some(contents),
            FileBody::Indirect(_) => None,
        }
    }

    /// Returns the child pointers of an indirect block, `None` for
    /// direct blocks.
    pub fn child_pointers(&self) -> Option<&[BlockPointer]> {
        match &self.body {
            FileBody::Direct(_) => None,
            FileBody::Indirect(children) => Some(children),
        }
    }

    /// Hashes a direct block's plaintext, `None` for indirect blocks.
    pub fn plaintext_hash(&self) -> Option<PlaintextHash> {
        self.contents().map(|c| PlaintextHash::of(c))
    }

    pub fn encoded_size(&self) -> u32 {
        self.encoded_size
    }

    pub fn set_encoded_size(&mut self, size: u32) {
        self.encoded_size = size;
    }
}

/// An immutable, content-addressed unit of the filesystem's data
/// plane.
///
/// Blocks are plain values: cloning shares the underlying payload
/// (`Bytes`), and once a block has been handed to the cache it is
/// never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Envelope-only placeholder; not cacheable.
    Common(CommonBlock),
    /// A directory block.
    Dir(DirBlock),
    /// A file block, direct or indirect.
    File(FileBlock),
}

impl Block {
    /// The block's on-wire size, as recorded at encode or decode time.
    pub fn encoded_size(&self) -> u32 {
        match self {
            Block::Common(b) => b.encoded_size(),
            Block::Dir(b) => b.encoded_size(),
            Block::File(b) => b.encoded_size(),
        }
    }

    /// A short name for the block's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Common(_) => "common",
            Block::Dir(_) => "dir",
            Block::File(b) if b.is_indirect() => "file-indirect",
            Block::File(_) => "file-direct",
        }
    }
}

impl From<CommonBlock> for Block {
    fn from(b: CommonBlock) -> Self {
        Block::Common(b)
    }
}

impl From<DirBlock> for Block {
    fn from(b: DirBlock) -> Self {
        Block::Dir(b)
    }
}

impl From<FileBlock> for Block {
    fn from(b: FileBlock) -> Self {
        Block::File(b)
    }
}
