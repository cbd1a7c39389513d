//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw block-sized data container with typed accessors

#[allow(clippy::module_inception)]
mod page;

pub use page::{Page, FLOAT_SIZE, INT_SIZE};
