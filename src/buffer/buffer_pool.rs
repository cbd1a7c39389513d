//! Buffer pool - the core block caching layer.
//!
//! The [`BufferPool`] provides:
//! - Block caching between disk and memory, keyed by `(table, block)`
//! - Pin-based eviction protection with blocking waits on exhaustion
//! - Automatic dirty write-back before a frame's buffer is reused
//! - Per-frame content locks, independent of pinning

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::frame::{Frame, ResidentBlock};
use super::page_ref::{PageGuard, PageRef};
use super::stats::BufferPoolStats;
use crate::common::{BlockId, Error, Result, TableId};
use crate::table::Table;

/// Lookup key for a resident frame: table identity plus block number.
///
/// Both components compare by value, so two callers naming the same table
/// through different handles resolve to the same frame.
#[derive(Clone, PartialEq, Eq, Hash)]
struct FrameKey {
    table: TableId,
    block: BlockId,
}

impl FrameKey {
    fn new(table: &Table, block: BlockId) -> Self {
        Self {
            table: table.id().clone(),
            block,
        }
    }
}

/// The initialized portion of a pool: its frames and the residency map.
struct PoolState {
    /// Fixed set of frames allocated at init, never resized.
    frames: Vec<Arc<Frame>>,

    /// Maps resident `(table, block)` identities to frame indices. At any
    /// instant no two resident frames share an identity.
    resident: HashMap<FrameKey, usize>,
}

impl PoolState {
    fn new(capacity: usize) -> Self {
        Self {
            frames: (0..capacity).map(|_| Arc::new(Frame::new())).collect(),
            resident: HashMap::new(),
        }
    }

    /// First frame that is unpinned with no I/O in flight, if any.
    ///
    /// The policy is deliberately just "some unpinned frame": nothing may
    /// depend on which qualifying frame is chosen.
    fn victim(&self) -> Option<usize> {
        self.frames.iter().position(|frame| frame.is_evictable())
    }
}

/// A fixed-capacity cache of disk blocks in pinned, lockable frames.
///
/// # Lifecycle
/// A pool starts uninitialized. [`init`](BufferPool::init) allocates the
/// frames (failing with [`Error::AlreadyInitialized`] on a second call,
/// leaving existing state untouched); [`destroy`](BufferPool::destroy)
/// flushes every dirty frame and resets to uninitialized. Between destroy
/// and a fresh init every operation fails with [`Error::Uninitialized`].
///
/// # Synchronization
/// One pool-level mutex covers identity lookup and pin-count changes, so
/// there is no window between finding a frame and pinning it in which an
/// eviction could reclaim it. The mutex is never held across disk I/O:
/// loads and flushes run under the affected frame's content lock only,
/// with the frame marked in-flight so lookups wait and the victim search
/// skips it. Long-running I/O therefore never stalls pin/unpin/lock
/// traffic on other frames.
///
/// # Waiting
/// A pin that finds every frame pinned blocks on a condition variable
/// until some frame's pin count returns to zero, re-running the victim
/// search on each wakeup. There is no timeout: unbounded blocking on pool
/// exhaustion is the contract, by design rather than oversight.
///
/// # Usage
/// ```ignore
/// let pool = BufferPool::with_capacity(10);
/// let block = table.append_block()?;
///
/// let page = pool.pin(&table, block)?;
/// page.set_int(0, 42)?;                  // marks the frame dirty
/// pool.unpin(&table, block)?;
///
/// pool.destroy()?;                       // flushes everything
/// ```
pub struct BufferPool {
    /// `None` until init, `None` again after destroy.
    state: Mutex<Option<PoolState>>,

    /// Signaled on unpin-to-zero and on I/O completion; waited on by
    /// loaders that found no victim and by lookups that hit an in-flight
    /// frame.
    available: Condvar,

    /// Performance statistics.
    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create an uninitialized pool.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
            available: Condvar::new(),
            stats: BufferPoolStats::new(),
        }
    }

    /// Create a pool and initialize it with `capacity` frames.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be > 0");
        Self {
            state: Mutex::new(Some(PoolState::new(capacity))),
            available: Condvar::new(),
            stats: BufferPoolStats::new(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Allocate `capacity` frames, each starting unassigned, unpinned and
    /// clean.
    ///
    /// # Errors
    /// `Error::AlreadyInitialized` if the pool is already initialized; the
    /// existing state is left completely untouched.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn init(&self, capacity: usize) -> Result<()> {
        assert!(capacity > 0, "pool capacity must be > 0");

        let mut state = self.state.lock();
        if state.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        *state = Some(PoolState::new(capacity));
        Ok(())
    }

    /// Flush every dirty frame and reset the pool to uninitialized.
    ///
    /// Waits out in-flight loads first. Every frame is flushed even when a
    /// write fails; the first error is reported after all frames were
    /// attempted. The pool is unusable until re-initialized.
    pub fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.is_none() {
            return Err(Error::Uninitialized);
        }
        while state
            .as_ref()
            .is_some_and(|pool| pool.frames.iter().any(|f| f.io_in_progress()))
        {
            self.available.wait(&mut state);
        }
        let Some(pool) = state.take() else {
            return Err(Error::Uninitialized);
        };
        drop(state);

        let mut first_err = None;
        for frame in &pool.frames {
            if let Err(err) = self.flush_frame(frame) {
                first_err.get_or_insert(err);
            }
        }

        // Wake anything blocked on the pool; it will observe Uninitialized.
        self.available.notify_all();

        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Whether the pool is currently initialized.
    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Number of frames, or 0 when uninitialized.
    pub fn capacity(&self) -> usize {
        self.state.lock().as_ref().map_or(0, |p| p.frames.len())
    }

    /// Number of blocks currently resident, or 0 when uninitialized.
    pub fn resident_count(&self) -> usize {
        self.state.lock().as_ref().map_or(0, |p| p.resident.len())
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    // ========================================================================
    // Public API: residency and pinning
    // ========================================================================

    /// Look up a resident frame by value identity.
    ///
    /// Returns `None` when the block is not resident or the pool is
    /// uninitialized. Frames with a load or flush in flight are in
    /// transition and treated as not resident. The returned handle does
    /// not pin the frame; use [`pin`](BufferPool::pin) before relying on
    /// its content.
    pub fn find(&self, table: &Table, block: BlockId) -> Option<PageRef> {
        let key = FrameKey::new(table, block);
        let state = self.state.lock();
        let pool = state.as_ref()?;
        let &index = pool.resident.get(&key)?;
        let frame = &pool.frames[index];
        if frame.io_in_progress() {
            return None;
        }
        Some(PageRef::new(Arc::clone(frame)))
    }

    /// Pin a block, loading it first if it is not resident.
    ///
    /// A resident block's frame has its pin count incremented and is
    /// returned directly. Otherwise a victim frame is selected among the
    /// unpinned frames (blocking until one exists), flushed if dirty,
    /// reloaded with the requested block, and returned with a pin count
    /// of 1. Concurrent pins of the same absent block coalesce onto a
    /// single load and observe the same frame.
    ///
    /// # Errors
    /// - `Error::Uninitialized` if the pool is not initialized
    /// - `Error::ShortIo` when the block lies beyond the file's extent
    /// - I/O errors from the flush or the load
    pub fn pin(&self, table: &Arc<Table>, block: BlockId) -> Result<PageRef> {
        let key = FrameKey::new(table, block);
        let mut state = self.state.lock();

        loop {
            let pool = state.as_mut().ok_or(Error::Uninitialized)?;

            if let Some(&index) = pool.resident.get(&key) {
                let frame = Arc::clone(&pool.frames[index]);
                if frame.io_in_progress() {
                    // Another caller is loading this block (or flushing the
                    // frame's previous occupant); wait and re-resolve.
                    self.available.wait(&mut state);
                    continue;
                }
                frame.pin();
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(PageRef::new(frame));
            }

            let Some(index) = pool.victim() else {
                // Every frame is pinned or mid-I/O; wait for an unpin.
                self.available.wait(&mut state);
                continue;
            };

            // Claim the victim while still holding the pool lock: mapping
            // the new key now makes concurrent pins of this block wait on
            // us instead of starting a second load.
            let frame = Arc::clone(&pool.frames[index]);
            frame.begin_io();
            pool.resident.insert(key.clone(), index);
            let evicted = frame.resident();
            drop(state);

            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return self.load_into(frame, &key, table, block, evicted);
        }
    }

    /// Decrement a resident block's pin count.
    ///
    /// # Errors
    /// - `Error::NotResident` if no resident frame matches
    /// - `Error::PinUnderflow` if the pin count is already zero; the count
    ///   is never driven negative
    pub fn unpin(&self, table: &Table, block: BlockId) -> Result<()> {
        let key = FrameKey::new(table, block);
        let mut state = self.state.lock();
        let pool = state.as_mut().ok_or(Error::Uninitialized)?;

        let Some(&index) = pool.resident.get(&key) else {
            return Err(Error::NotResident {
                table: key.table,
                block,
            });
        };

        let frame = &pool.frames[index];
        if frame.pin_count() == 0 {
            return Err(Error::PinUnderflow {
                table: key.table,
                block,
            });
        }

        let remaining = frame.unpin();
        drop(state);

        if remaining == 0 {
            self.available.notify_all();
        }
        Ok(())
    }

    // ========================================================================
    // Public API: content locking and dirty tracking
    // ========================================================================

    /// Acquire exclusive access to a resident block's content, blocking
    /// until the frame's content lock is free.
    ///
    /// The guard holds an internal pin so the frame cannot be evicted
    /// while the caller waits for or holds the lock; lock and pin are both
    /// released when the guard drops. Not reentrant.
    ///
    /// # Errors
    /// `Error::NotResident` if no resident frame matches.
    pub fn lock(&self, table: &Table, block: BlockId) -> Result<PageGuard<'_>> {
        let key = FrameKey::new(table, block);
        let mut state = self.state.lock();

        let frame = loop {
            let pool = state.as_mut().ok_or(Error::Uninitialized)?;
            let Some(&index) = pool.resident.get(&key) else {
                return Err(Error::NotResident {
                    table: key.table,
                    block,
                });
            };
            let frame = Arc::clone(&pool.frames[index]);
            if frame.io_in_progress() {
                self.available.wait(&mut state);
                continue;
            }
            frame.pin();
            break frame;
        };
        drop(state);

        let page = frame.data().lock_arc();
        Ok(PageGuard::new(self, frame, page))
    }

    /// Mark a resident block's frame dirty.
    ///
    /// The page setters mark the same flag as a side effect of a
    /// successful mutation; this is the explicit path for callers that
    /// modified content some other way.
    ///
    /// # Errors
    /// `Error::NotResident` if no resident frame matches.
    pub fn mark_dirty(&self, table: &Table, block: BlockId) -> Result<()> {
        let key = FrameKey::new(table, block);
        let mut state = self.state.lock();
        let pool = state.as_mut().ok_or(Error::Uninitialized)?;

        let Some(&index) = pool.resident.get(&key) else {
            return Err(Error::NotResident {
                table: key.table,
                block,
            });
        };
        pool.frames[index].mark_dirty();
        Ok(())
    }

    /// Write back every dirty frame.
    ///
    /// Every frame is attempted; the first error is reported afterwards.
    pub fn flush_all(&self) -> Result<()> {
        let frames: Vec<Arc<Frame>> = {
            let state = self.state.lock();
            let pool = state.as_ref().ok_or(Error::Uninitialized)?;
            pool.frames.iter().map(Arc::clone).collect()
        };

        let mut first_err = None;
        for frame in &frames {
            if let Err(err) = self.flush_frame(frame) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    // ========================================================================
    // Internal: called by PageGuard on drop
    // ========================================================================

    /// Return the internal pin taken by `lock`.
    pub(crate) fn release_lock_pin(&self, frame: &Frame) {
        let state = self.state.lock();
        let remaining = frame.unpin();
        drop(state);

        if remaining == 0 {
            self.available.notify_all();
        }
    }

    // ========================================================================
    // Internal: load and flush
    // ========================================================================

    /// Finish a load whose victim frame was claimed under the pool lock.
    ///
    /// The frame carries the in-flight marker and the residency map
    /// already points the new key at it, so every concurrent lookup of
    /// either the old or the new identity waits until this completes.
    fn load_into(
        &self,
        frame: Arc<Frame>,
        key: &FrameKey,
        table: &Arc<Table>,
        block: BlockId,
        evicted: Option<ResidentBlock>,
    ) -> Result<PageRef> {
        // Write back the victim's content before the old identity is
        // retired: a concurrent re-pin of the evicted block must read the
        // flushed bytes from disk, never a stale pre-flush image.
        if evicted.is_some() {
            if let Err(err) = self.flush_frame(&frame) {
                // The victim keeps its old identity and its dirty flag.
                self.abort_load(key, &frame, false);
                return Err(err);
            }
        }

        {
            let mut state = self.state.lock();
            if let Some(pool) = state.as_mut() {
                if let Some(old) = &evicted {
                    pool.resident
                        .remove(&FrameKey::new(&old.table, old.block));
                    self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                }
            }
            frame.set_resident(Some(ResidentBlock {
                table: Arc::clone(table),
                block,
            }));
            frame.clear_dirty();
            frame.set_pin_count(1);
        }

        let read_result = {
            let mut page = frame.data().lock();
            let mut store = table.store();
            store.read_block(block, page.as_mut_array()).map(|_| ())
        };

        match read_result {
            Ok(()) => {
                let state = self.state.lock();
                frame.end_io();
                drop(state);

                self.stats.loads.fetch_add(1, Ordering::Relaxed);
                self.available.notify_all();
                Ok(PageRef::new(frame))
            }
            Err(err) => {
                // Unwind the reservation: the frame goes back to
                // unassigned and other callers retry from scratch.
                self.abort_load(key, &frame, true);
                Err(err)
            }
        }
    }

    /// Undo a claimed-but-failed load and wake waiters.
    fn abort_load(&self, key: &FrameKey, frame: &Frame, clear_identity: bool) {
        let mut state = self.state.lock();
        if let Some(pool) = state.as_mut() {
            pool.resident.remove(key);
        }
        if clear_identity {
            frame.set_resident(None);
            frame.set_pin_count(0);
        }
        frame.end_io();
        drop(state);

        self.available.notify_all();
    }

    /// Write a frame's content back to its block if dirty.
    ///
    /// Clears the dirty flag only on a successful write; a failed write
    /// leaves it set so the content is retried on the next flush.
    fn flush_frame(&self, frame: &Frame) -> Result<()> {
        if !frame.is_dirty() {
            return Ok(());
        }
        let Some(resident) = frame.resident() else {
            return Ok(());
        };

        let page = frame.data().lock();
        {
            let mut store = resident.table.store();
            store.write_block(resident.block, page.as_array())?;
        }
        frame.clear_dirty();
        drop(page);

        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
