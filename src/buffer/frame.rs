//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus the metadata needed for buffer
//! management:
//! - Which block of which table is loaded (if any)
//! - Pin count for eviction protection
//! - Dirty flag for write-back tracking
//! - An in-flight I/O marker used by the pool's load protocol

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::BlockId;
use crate::storage::page::Page;
use crate::table::Table;

/// The block a frame currently holds.
#[derive(Clone)]
pub(crate) struct ResidentBlock {
    /// The owning table; kept so the frame can be flushed back to the
    /// right file even after the caller's handle is gone.
    pub table: Arc<Table>,
    /// Block number within the table's file.
    pub block: BlockId,
}

/// A frame in the buffer pool.
///
/// Frames are the "slots" in the buffer pool; the pool allocates a fixed
/// number of them at init and reuses their buffers across evictions.
///
/// # Thread Safety
/// - `data`: a mutex over the page bytes. This is the per-frame content
///   lock: it serializes buffer access so no read is torn by a concurrent
///   write. It is exclusive and not reentrant.
/// - `resident`, `pin_count`, `dirty`, `io_in_progress`: interior-mutable
///   metadata. Cross-field consistency is maintained by the pool, which
///   only changes them under its own lock.
///
/// Pinning and locking are orthogonal: the pin count controls eviction
/// eligibility, the content lock controls byte access. A frame can be
/// pinned and unlocked, or unpinned and locked.
pub(crate) struct Frame {
    /// The page data behind the content lock. `Arc` so guards can own the
    /// lock without borrowing the frame.
    data: Arc<Mutex<Page>>,

    /// Which block is currently loaded, or None if the frame is
    /// unassigned.
    resident: Mutex<Option<ResidentBlock>>,

    /// Number of active references preventing eviction.
    pin_count: AtomicU32,

    /// Whether the page has been modified since it was loaded or last
    /// flushed.
    dirty: AtomicBool,

    /// True while the pool is flushing or loading this frame's buffer.
    /// Such a frame is invisible to lookups and never a victim.
    io_in_progress: AtomicBool,
}

impl Frame {
    /// Create a new unassigned frame.
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Page::new())),
            resident: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
            io_in_progress: AtomicBool::new(false),
        }
    }

    /// The page data behind its content lock.
    #[inline]
    pub fn data(&self) -> &Arc<Mutex<Page>> {
        &self.data
    }

    /// The block this frame holds, if any.
    #[inline]
    pub fn resident(&self) -> Option<ResidentBlock> {
        self.resident.lock().clone()
    }

    /// Assign or clear the frame's identity.
    #[inline]
    pub fn set_resident(&self, resident: Option<ResidentBlock>) {
        *self.resident.lock() = resident;
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0; the pool checks for underflow
    /// before calling.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    /// Overwrite the pin count; used when a frame is reassigned.
    #[inline]
    pub fn set_pin_count(&self, count: u32) {
        self.pin_count.store(count, Ordering::Relaxed);
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Mark the frame as modified.
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Clear the dirty flag.
    #[inline]
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    /// Check if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    /// Mark the frame as undergoing flush or load I/O.
    #[inline]
    pub fn begin_io(&self) {
        self.io_in_progress.store(true, Ordering::Relaxed);
    }

    /// Clear the I/O marker.
    #[inline]
    pub fn end_io(&self) {
        self.io_in_progress.store(false, Ordering::Relaxed);
    }

    /// Check if a flush or load is in flight on this frame.
    #[inline]
    pub fn io_in_progress(&self) -> bool {
        self.io_in_progress.load(Ordering::Relaxed)
    }

    /// Check if the frame may be chosen as an eviction victim.
    ///
    /// Unassigned frames qualify; a frame is never a victim while pinned
    /// or while an I/O is in flight on it.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        !self.is_pinned() && !self.io_in_progress()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
