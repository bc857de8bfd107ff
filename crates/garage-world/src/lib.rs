//! The garage's view of the simulated world.
//!
//! The engine never touches entities directly. Everything it needs (sphere
//! queries, capability lookups, inventories, spawning) goes through the
//! [`World`] trait, and the candidate search is built on top of it in
//! [`SpatialLocator`].
//!
//! # Modules
//!
//! - [`world`] -- The [`World`] trait and the value types it hands out
//! - [`locator`] -- [`SpatialLocator`] and the [`AssetPredicate`]s it runs
//! - [`inventory`] -- First-match inventory queries and key gathering
//! - [`memory`] -- [`InMemoryWorld`], a reference world for tests and tools
//! - [`error`] -- Error types for world operations

pub mod error;
pub mod inventory;
pub mod locator;
pub mod memory;
pub mod world;

pub use error::{WorldError, WorldResult};
pub use inventory::{find_first, held_key_ids};
pub use locator::{AnyVehicle, AssetPredicate, CandidateAsset, DepositMatch, SpatialLocator};
pub use memory::{InMemoryWorld, TemplateSpec};
pub use world::{EntityKind, ItemInfo, VehicleHandle, World};
