//! Container state codec for the garage.
//!
//! Maps the items inside a vehicle's storage to a flat, serializable
//! [`Manifest`](garage_types::Manifest) and back. The codec knows nothing
//! about the world: callers hand it anything implementing [`ContainedItem`]
//! and receive plain [`SpawnInstruction`]s on the way back.
//!
//! # Laws
//!
//! 1. Capture is order independent: any permutation of the same items yields
//!    the same manifest (entries sorted by template).
//! 2. Restore inverts capture in per-template counts. Item instances are
//!    fungible, so instance identity is not preserved.
//! 3. A weapon anywhere in the container fails the capture; no partial
//!    manifest is ever produced.

pub mod codec;
pub mod error;

pub use codec::{capture, restore, ContainedItem, SpawnInstruction};
pub use error::CodecError;
