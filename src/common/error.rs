//! Error types for minnowdb.

use thiserror::Error;

use crate::common::{BlockId, TableId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write
/// `Result<T>`. This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in minnowdb.
///
/// Every fallible operation in the crate reports through this enum;
/// callers are expected to check and propagate. Allocation failure is the
/// one condition not represented here: it aborts the process, which is
/// Rust's default and the intended policy for that unrecoverable state.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A write addressed a block that has not been appended yet.
    ///
    /// Writes are only permitted to blocks whose start lies strictly
    /// before the current end of file; they never extend the file.
    #[error("{0} has not been allocated")]
    InvalidBlock(BlockId),

    /// A read or write transferred fewer than `BLOCK_SIZE` bytes.
    #[error("short transfer: {transferred} of {expected} bytes")]
    ShortIo { expected: usize, transferred: usize },

    /// The addressed block is not resident in the buffer pool.
    #[error("{block} of table {table} is not resident")]
    NotResident { table: TableId, block: BlockId },

    /// The buffer pool was initialized a second time.
    #[error("buffer pool is already initialized")]
    AlreadyInitialized,

    /// The buffer pool has not been initialized, or has been destroyed.
    #[error("buffer pool is not initialized")]
    Uninitialized,

    /// Unpin was called on a frame whose pin count is already zero.
    #[error("pin count underflow on {block} of table {table}")]
    PinUnderflow { table: TableId, block: BlockId },

    /// A page access violated the block bounds rule.
    ///
    /// An access at `offset` with `len` bytes is valid only when
    /// `offset + len < BLOCK_SIZE`.
    #[error("access at offset {offset} with length {len} is out of bounds")]
    OutOfBounds { offset: usize, len: usize },
}
