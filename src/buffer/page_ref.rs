//! Handles for page access.
//!
//! Two ways to reach a resident frame's bytes:
//! - [`PageRef`] - a plain handle from `pin`/`find`; every accessor takes
//!   the frame's content lock for the duration of that one call.
//! - [`PageGuard`] - the RAII result of `lock`; holds the content lock for
//!   its whole lifetime and releases it (plus its internal pin) on drop,
//!   on every exit path.

use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::RawMutex;

use super::buffer_pool::BufferPool;
use super::frame::Frame;
use crate::common::{BlockId, Result, TableId};
use crate::storage::page::Page;

/// A handle to a resident frame.
///
/// Returned by [`BufferPool::pin`] and [`BufferPool::find`]. The handle
/// itself carries no pin: pinning is the pool's explicit protocol, and a
/// handle kept after its frame was unpinned and evicted will observe
/// whatever block occupies the frame afterwards. Getters return owned
/// copies, so stale use is never unsound - just stale.
///
/// Each accessor acquires the frame's content lock for that single call,
/// so individual reads and writes are never torn. Do not call these while
/// the same thread holds a [`PageGuard`] on the same frame; the content
/// lock is not reentrant.
pub struct PageRef {
    frame: Arc<Frame>,
}

impl std::fmt::Debug for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRef")
            .field("table_id", &self.table_id())
            .field("block", &self.block())
            .field("pin_count", &self.pin_count())
            .field("is_dirty", &self.is_dirty())
            .finish()
    }
}

impl PageRef {
    pub(crate) fn new(frame: Arc<Frame>) -> Self {
        Self { frame }
    }

    /// Identity of the table this frame currently holds, if any.
    pub fn table_id(&self) -> Option<TableId> {
        self.frame.resident().map(|r| r.table.id().clone())
    }

    /// Block number this frame currently holds, if any.
    pub fn block(&self) -> Option<BlockId> {
        self.frame.resident().map(|r| r.block)
    }

    /// Current pin count of the frame.
    pub fn pin_count(&self) -> u32 {
        self.frame.pin_count()
    }

    /// Whether the frame has unflushed modifications.
    pub fn is_dirty(&self) -> bool {
        self.frame.is_dirty()
    }

    /// Read an integer at `offset`.
    pub fn get_int(&self, offset: usize) -> Result<i32> {
        self.frame.data().lock().get_int(offset)
    }

    /// Read a float at `offset`.
    pub fn get_float(&self, offset: usize) -> Result<f64> {
        self.frame.data().lock().get_float(offset)
    }

    /// Read `len` bytes at `offset` as an owned copy.
    pub fn get_bytes(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.frame.data().lock().get_bytes(offset, len)
    }

    /// Write an integer at `offset`, marking the frame dirty on success.
    pub fn set_int(&self, offset: usize, value: i32) -> Result<()> {
        let mut page = self.frame.data().lock();
        page.set_int(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }

    /// Write a float at `offset`, marking the frame dirty on success.
    pub fn set_float(&self, offset: usize, value: f64) -> Result<()> {
        let mut page = self.frame.data().lock();
        page.set_float(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }

    /// Write `value` at `offset`, marking the frame dirty on success.
    pub fn set_bytes(&self, offset: usize, value: &[u8]) -> Result<()> {
        let mut page = self.frame.data().lock();
        page.set_bytes(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }
}

/// Exclusive access to a frame's content.
///
/// Returned by [`BufferPool::lock`]. The guard holds the frame's content
/// lock and an internal pin (so the frame cannot be evicted out from
/// under the lock); both are released when the guard drops. The lock is
/// not reentrant: a thread holding a guard must not lock the same frame
/// again, nor touch it through a [`PageRef`] accessor.
pub struct PageGuard<'a> {
    pool: &'a BufferPool,
    frame: Arc<Frame>,
    page: ArcMutexGuard<RawMutex, Page>,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        frame: Arc<Frame>,
        page: ArcMutexGuard<RawMutex, Page>,
    ) -> Self {
        Self { pool, frame, page }
    }

    /// Identity of the table this frame holds, if any.
    pub fn table_id(&self) -> Option<TableId> {
        self.frame.resident().map(|r| r.table.id().clone())
    }

    /// Block number this frame holds, if any.
    pub fn block(&self) -> Option<BlockId> {
        self.frame.resident().map(|r| r.block)
    }

    /// The raw page bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.page.as_slice()
    }

    /// Read an integer at `offset`.
    pub fn get_int(&self, offset: usize) -> Result<i32> {
        self.page.get_int(offset)
    }

    /// Read a float at `offset`.
    pub fn get_float(&self, offset: usize) -> Result<f64> {
        self.page.get_float(offset)
    }

    /// Read `len` bytes at `offset` as an owned copy.
    pub fn get_bytes(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.page.get_bytes(offset, len)
    }

    /// Write an integer at `offset`, marking the frame dirty on success.
    pub fn set_int(&mut self, offset: usize, value: i32) -> Result<()> {
        self.page.set_int(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }

    /// Write a float at `offset`, marking the frame dirty on success.
    pub fn set_float(&mut self, offset: usize, value: f64) -> Result<()> {
        self.page.set_float(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }

    /// Write `value` at `offset`, marking the frame dirty on success.
    pub fn set_bytes(&mut self, offset: usize, value: &[u8]) -> Result<()> {
        self.page.set_bytes(offset, value)?;
        self.frame.mark_dirty();
        Ok(())
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        // The content lock itself is released when `page` drops; here we
        // return the internal pin taken by `lock`.
        self.pool.release_lock_pin(&self.frame);
    }
}
