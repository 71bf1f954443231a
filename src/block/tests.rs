use super::*;

#[test]
fn test_block_id_hex_roundtrip() {
    let id = BlockId::from_bytes([0xab; 32]);
    let hex = id.to_hex();
    assert_eq!(hex.len(), 64);
    assert_eq!(BlockId::from_hex(&hex), Some(id));
}

#[test]
fn test_block_id_from_hex_rejects_bad_input() {
    assert!(BlockId::from_hex("abcd").is_none());
    assert!(BlockId::from_hex(&"zz".repeat(32)).is_none());
}

#[test]
fn test_block_id_from_encoded_bytes_is_stable() {
    let a = BlockId::from_encoded_bytes(b"some encoded block");
    let b = BlockId::from_encoded_bytes(b"some encoded block");
    let c = BlockId::from_encoded_bytes(b"different bytes");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_plaintext_hash_matches_contents_not_identity() {
    let h1 = PlaintextHash::of(&[0xaa; 32]);
    let h2 = PlaintextHash::of(&[0xaa; 32]);
    let h3 = PlaintextHash::of(&[0xbb; 32]);
    assert_eq!(h1, h2);
    assert_ne!(h1, h3);
}

#[test]
fn test_pointer_zero_ref_nonce() {
    let ptr = BlockPointer::new(
        BlockId::from_bytes([1; 32]),
        RefNonce::from_bytes([0xde; 8]),
    );
    assert!(!ptr.ref_nonce.is_zero());

    let zeroed = ptr.with_zero_ref_nonce();
    assert_eq!(zeroed.id, ptr.id);
    assert!(zeroed.ref_nonce.is_zero());
    assert_eq!(zeroed, BlockPointer::initial(ptr.id));
}

#[test]
fn test_file_block_direct_accessors() {
    let block = FileBlock::direct(vec![1u8, 2, 3]);
    assert!(!block.is_indirect());
    assert_eq!(block.contents().unwrap().as_ref(), &[1, 2, 3]);
    assert!(block.child_pointers().is_none());
    assert_eq!(
        block.plaintext_hash(),
        Some(PlaintextHash::of(&[1u8, 2, 3]))
    );
}

#[test]
fn test_file_block_indirect_accessors() {
    let child = BlockPointer::initial(BlockId::from_bytes([9; 32]));
    let block = FileBlock::indirect(vec![child]);
    assert!(block.is_indirect());
    assert!(block.contents().is_none());
    assert!(block.plaintext_hash().is_none());
    assert_eq!(block.child_pointers().unwrap(), &[child]);
}

#[test]
fn test_encoded_size_dispatch() {
    let mut dir = DirBlock::new();
    dir.set_encoded_size(123);
    assert_eq!(Block::from(dir).encoded_size(), 123);

    let mut file = FileBlock::indirect(vec![]);
    file.set_encoded_size(456);
    assert_eq!(Block::from(file).encoded_size(), 456);

    let mut common = CommonBlock::new();
    common.set_encoded_size(7);
    assert_eq!(Block::from(common).encoded_size(), 7);
}

#[test]
fn test_dir_block_children() {
    let mut dir = DirBlock::new();
    let ptr = BlockPointer::initial(BlockId::from_bytes([3; 32]));
    dir.insert_child("a.txt", ptr);
    assert_eq!(dir.children().get("a.txt"), Some(&ptr));
}

#[test]
fn test_block_kind_names() {
    assert_eq!(Block::from(CommonBlock::new()).kind_name(), "common");
    assert_eq!(Block::from(DirBlock::new()).kind_name(), "dir");
    assert_eq!(
        Block::from(FileBlock::direct(&b"x"[..])).kind_name(),
        "file-direct"
    );
    assert_eq!(
        Block::from(FileBlock::indirect(vec![])).kind_name(),
        "file-indirect"
    );
}
