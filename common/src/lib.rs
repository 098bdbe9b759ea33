//! Common substrate for the Ember grid client.
//!
//! This crate provides the pieces shared by every layer above: structured
//! values with canonical deep equality, the per-partition entry store, and
//! the common error type.

pub mod error;
pub mod store;
pub mod value;

pub use error::{CommonError, Result};
pub use store::{EntryStore, StoreStats};
pub use value::{CacheEntry, CanonicalKey, DataValue};
