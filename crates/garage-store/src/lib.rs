//! Per-owner record storage for the garage.
//!
//! Every owner has exactly one document holding their
//! [`OwnerRecordCollection`](garage_types::OwnerRecordCollection). The store
//! is a dumb load/save layer: it knows the on-disk layout and how to tell a
//! missing document from a damaged one, and nothing about capacity or
//! retrieval rules.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`FileRecordStore`] -- one `<key>.json` file per owner in a data directory
//! - [`InMemoryRecordStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Rules
//!
//! 1. A missing document loads as an empty collection, never as an error.
//! 2. A document that exists but cannot be parsed (or belongs to a different
//!    owner, or breaks record invariants) is [`StoreError::Corrupt`]. Callers
//!    must not treat it as empty.
//! 3. Saves replace the whole document atomically; readers see either the old
//!    or the new content.
//! 4. The storage key is a function of the owner id alone, and distinct owners
//!    never share a key (see [`keys::storage_key`]).

pub mod document;
pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileRecordStore, ScanEntry, DEFAULT_DATA_DIR};
pub use keys::storage_key;
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
