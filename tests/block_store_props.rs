//! Property tests for the block store and the page accessors.

use proptest::prelude::*;

use minnowdb::storage::BlockStore;
use minnowdb::{BlockId, Error, Page, BLOCK_SIZE};

proptest! {
    /// Any appended block round-trips arbitrary content byte-for-byte.
    #[test]
    fn append_then_write_round_trips(data in proptest::collection::vec(any::<u8>(), BLOCK_SIZE)) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BlockStore::create(dir.path().join("t.tbl")).unwrap();

        let block = store.append_block().unwrap();
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(&data);
        store.write_block(block, &buf).unwrap();

        let mut out = [0u8; BLOCK_SIZE];
        prop_assert_eq!(store.read_block(block, &mut out).unwrap(), BLOCK_SIZE);
        prop_assert_eq!(&out[..], &buf[..]);
    }

    /// Appends hand out dense, sequential ids and grow the file by
    /// exactly one block each.
    #[test]
    fn append_assigns_dense_ids(count in 1u32..8) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BlockStore::create(dir.path().join("t.tbl")).unwrap();

        for expected in 0..count {
            let before = store.file_length().unwrap();
            prop_assert_eq!(store.append_block().unwrap(), BlockId::new(expected));
            prop_assert_eq!(store.file_length().unwrap(), before + BLOCK_SIZE as u64);
        }
        prop_assert_eq!(store.block_count().unwrap(), u64::from(count));
    }

    /// Writes succeed exactly on already-allocated blocks; anything at or
    /// past the extent is rejected without touching the file.
    #[test]
    fn write_requires_allocation(allocated in 1u32..5, beyond in 0u32..4) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BlockStore::create(dir.path().join("t.tbl")).unwrap();

        for _ in 0..allocated {
            store.append_block().unwrap();
        }

        let data = [0x5Au8; BLOCK_SIZE];
        for n in 0..allocated {
            prop_assert!(store.write_block(BlockId::new(n), &data).is_ok());
        }

        let bad = BlockId::new(allocated + beyond);
        let err = store.write_block(bad, &data).unwrap_err();
        prop_assert!(matches!(err, Error::InvalidBlock(b) if b == bad));
        prop_assert_eq!(
            store.file_length().unwrap(),
            u64::from(allocated) * BLOCK_SIZE as u64
        );
    }

    /// The strict bounds rule for int accessors: valid iff
    /// `offset + 4 < BLOCK_SIZE`, and a valid write round-trips.
    #[test]
    fn int_accessor_respects_strict_bounds(
        offset in 0usize..BLOCK_SIZE + 8,
        value in any::<i32>(),
    ) {
        let mut page = Page::new();
        let result = page.set_int(offset, value);

        if offset + 4 < BLOCK_SIZE {
            prop_assert!(result.is_ok());
            prop_assert_eq!(page.get_int(offset).unwrap(), value);
        } else {
            prop_assert!(matches!(result, Err(Error::OutOfBounds { .. })), "expected OutOfBounds error");
            // Nothing was mutated.
            prop_assert!(page.as_slice().iter().all(|&b| b == 0));
        }
    }

    /// Byte accessors honor the same rule for arbitrary lengths.
    #[test]
    fn byte_accessor_respects_strict_bounds(
        offset in 0usize..BLOCK_SIZE + 8,
        data in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut page = Page::new();
        let result = page.set_bytes(offset, &data);

        if offset + data.len() < BLOCK_SIZE {
            prop_assert!(result.is_ok());
            prop_assert_eq!(page.get_bytes(offset, data.len()).unwrap(), data);
        } else {
            prop_assert!(matches!(result, Err(Error::OutOfBounds { .. })), "expected OutOfBounds error");
        }
    }
}
