//! minnowdb - the storage core of a small single-file database engine.
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Table Layer (table/)                                    │
//! │     Table + Schema + Value decoding                      │
//! └──────────────────────────────────────────────────────────┘
//!                            ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  Buffer Pool (buffer/)                                   │
//! │     BufferPool + Frame + PageRef/PageGuard + Stats       │
//! │     pinning · per-frame locks · dirty write-back         │
//! └──────────────────────────────────────────────────────────┘
//!                            ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  Storage Layer (storage/)                                │
//! │     BlockStore + Page                                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A client pins a `(table, block)` pair; the pool either returns the
//! already-resident frame or evicts an unpinned victim (flushing it if
//! dirty), loads the block, and hands the frame out pinned once. Content
//! is read and written through typed page accessors, which mark frames
//! dirty; clients unpin when done. Destroying the pool flushes every
//! dirty frame.
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, TableId, Error, config)
//! - [`storage`] - Block file I/O and the page buffer
//! - [`buffer`] - Buffer pool management
//! - [`table`] - Table handles, schemas, and field decoding
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use minnowdb::table::{Field, Schema, Table};
//! use minnowdb::BufferPool;
//!
//! let schema = Schema::new(vec![Field::int(), Field::chars(20)]);
//! let table = Arc::new(Table::create(".", "persons", "mydb", schema).unwrap());
//! let block = table.append_block().unwrap();
//!
//! let pool = BufferPool::with_capacity(10);
//! let page = pool.pin(&table, block).unwrap();
//! page.set_int(0, 42).unwrap();
//! pool.unpin(&table, block).unwrap();
//! pool.destroy().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::BLOCK_SIZE;
pub use common::{BlockId, Error, Result, TableId};

pub use buffer::{BufferPool, BufferPoolStats, PageGuard, PageRef, StatsSnapshot};
pub use storage::page::Page;
pub use storage::BlockStore;
