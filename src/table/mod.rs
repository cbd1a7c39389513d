//! Table handles, schemas, and field decoding.
//!
//! This layer supplies the `(table identity, file handle)` pairs the
//! buffer pool keys on and interprets the bytes pages expose as typed
//! field values. It consumes the pool's page interface; the storage core
//! never persists anything defined here.
//!
//! # Components
//! - [`Table`] - Identity plus backing [`BlockStore`](crate::storage::BlockStore)
//! - [`Schema`] / [`Field`] / [`FieldType`] - Fixed-length record layouts
//! - [`Value`] - Decoded field values

mod schema;
#[allow(clippy::module_inception)]
mod table;
mod value;

pub use schema::{Field, FieldType, Schema};
pub use table::Table;
pub use value::Value;

pub use crate::common::TableId;
