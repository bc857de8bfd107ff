//! Foundation types for the vehicle garage.
//!
//! This crate provides the data model shared by every other garage crate:
//! who owns a record, what a stored record looks like on disk, and the small
//! amount of world geometry the engine needs to place an asset.
//!
//! # Key Types
//!
//! - [`OwnerId`] -- Stable, non-empty player identifier used as the storage key
//! - [`StoredAssetRecord`] -- One persisted vehicle: template, manifest, key credential
//! - [`OwnerRecordCollection`] -- The full persisted unit for one owner
//! - [`Manifest`] -- Coalesced `template -> count` contents of a container
//! - [`KeyCredential`] -- `key_id` / `key_code` pair tying a key item to a lock
//! - [`EntityId`], [`Vec3`], [`Transform`] -- World references and placement

pub mod error;
pub mod geometry;
pub mod identity;
pub mod manifest;
pub mod record;

pub use error::TypeError;
pub use geometry::{EntityId, Transform, Vec3};
pub use identity::OwnerId;
pub use manifest::{Manifest, ManifestEntry};
pub use record::{KeyCredential, OwnerRecordCollection, StoredAssetRecord};
