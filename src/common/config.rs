//! Configuration constants for minnowdb.

/// Size of a block in bytes.
///
/// Every on-disk block, every frame buffer, and every I/O transfer is
/// exactly this size. The database file grows only by whole-block appends,
/// so its length is always an exact multiple of `BLOCK_SIZE`.
///
/// Records live entirely inside a single block; nothing may span the
/// boundary between two blocks.
pub const BLOCK_SIZE: usize = 200;

/// Default number of frames in a buffer pool.
pub const DEFAULT_POOL_CAPACITY: usize = 10;
