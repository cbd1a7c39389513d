//! Block store - low-level file I/O for database blocks.
//!
//! The [`BlockStore`] handles all direct file operations:
//! - Reading and writing fixed-size blocks
//! - Appending new blocks
//! - Managing a table's backing file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::BLOCK_SIZE;
use crate::common::{BlockId, Error, Result};

/// Manages block I/O for a single backing file.
///
/// # File Layout
/// The file is a flat sequence of fixed-size blocks with no header and no
/// embedded metadata:
/// ```text
/// ┌──────────┬──────────┬──────────┬─────────┬──────────┐
/// │ Block 0  │ Block 1  │ Block 2  │  ...    │ Block N  │
/// └──────────┴──────────┴──────────┴─────────┴──────────┘
/// Offset:  0       200       400     ...    N×200
/// ```
///
/// Block *n* is located at file offset `n × BLOCK_SIZE`, and the file
/// length is always an exact multiple of `BLOCK_SIZE`.
///
/// # Allocation Policy
/// Blocks come into existence only through [`BlockStore::append_block`],
/// which zero-fills one block at the end of the file. A write to a block
/// at or beyond the current end of file is rejected with
/// [`Error::InvalidBlock`] instead of implicitly extending the file: a
/// block must first exist via append before it can be written. This
/// append-then-write policy is deliberate and load-bearing for the
/// usage pattern of the layers above.
///
/// # Thread Safety
/// `BlockStore` is **single-threaded**. The owning [`Table`] wraps it in a
/// mutex, and the buffer pool serializes access through that.
///
/// [`Table`]: crate::table::Table
pub struct BlockStore {
    file: File,
}

impl BlockStore {
    /// Create a new backing file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self { file })
    }

    /// Open an existing backing file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Open an existing backing file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Current length of the backing file in bytes.
    pub fn file_length(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Number of blocks in the backing file.
    pub fn block_count(&self) -> Result<u64> {
        Ok(self.file_length()? / BLOCK_SIZE as u64)
    }

    /// File offset at which the given block starts.
    #[inline]
    pub fn block_offset(block: BlockId) -> u64 {
        u64::from(block.0) * BLOCK_SIZE as u64
    }

    /// Read one block into `data`.
    ///
    /// Returns the number of bytes read, which on success is always
    /// `BLOCK_SIZE`. A short read (block at or beyond the end of file, or
    /// a truncated file) is reported as [`Error::ShortIo`] carrying the
    /// transferred count - never silently zero-filled.
    pub fn read_block(&mut self, block: BlockId, data: &mut [u8; BLOCK_SIZE]) -> Result<usize> {
        self.file.seek(SeekFrom::Start(Self::block_offset(block)))?;

        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.file.read(&mut data[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        if filled < BLOCK_SIZE {
            return Err(Error::ShortIo {
                expected: BLOCK_SIZE,
                transferred: filled,
            });
        }

        Ok(filled)
    }

    /// Write one block from `data`.
    ///
    /// The block must have been previously allocated with
    /// [`BlockStore::append_block`]: the write is rejected with
    /// [`Error::InvalidBlock`] when `block_offset(block)` is at or beyond
    /// the current end of file. Writes never extend the file.
    pub fn write_block(&mut self, block: BlockId, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        if Self::block_offset(block) >= self.file_length()? {
            return Err(Error::InvalidBlock(block));
        }

        self.file.seek(SeekFrom::Start(Self::block_offset(block)))?;
        self.write_fully(data)
    }

    /// Append a zero-filled block at the end of the file.
    ///
    /// Returns the `BlockId` of the new block, computed as
    /// `file_length / BLOCK_SIZE` before the append. Afterward the file is
    /// exactly one block longer and the new block's content is all-zero.
    pub fn append_block(&mut self) -> Result<BlockId> {
        let length = self.file_length()?;
        let block = BlockId::new((length / BLOCK_SIZE as u64) as u32);

        self.file.seek(SeekFrom::End(0))?;
        let zeros = [0u8; BLOCK_SIZE];
        self.write_fully(&zeros)?;

        Ok(block)
    }

    /// Flush file content to stable storage.
    ///
    /// Block writes themselves do not sync; callers that need durability
    /// at a particular point call this explicitly.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Write exactly one block's worth of bytes at the current position.
    ///
    /// A short write is reported as [`Error::ShortIo`], not success.
    fn write_fully(&mut self, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        let mut written = 0;
        while written < BLOCK_SIZE {
            match self.file.write(&data[written..])? {
                0 => break,
                n => written += n,
            }
        }

        if written < BLOCK_SIZE {
            return Err(Error::ShortIo {
                expected: BLOCK_SIZE,
                transferred: written,
            });
        }

        Ok(())
    }
}
