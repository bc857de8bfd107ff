//! Garage controller: store keyed vehicles out of the world and bring them
//! back later.
//!
//! A [`GarageEngine`] ties a [`World`](garage_world::World) to a
//! [`RecordStore`](garage_store::RecordStore). Players deposit a vehicle they
//! hold a key for, list what they have stored, and retrieve a record to have
//! the vehicle rebuilt on the garage's spawn point with its cargo, its lock,
//! and a fresh key.
//!
//! # Quick Start
//!
//! ```rust
//! use garage_engine::{GarageConfig, GarageEngine};
//! use garage_store::InMemoryRecordStore;
//! use garage_types::{OwnerId, Transform};
//! use garage_world::{InMemoryWorld, TemplateSpec, World};
//!
//! let world = InMemoryWorld::new();
//! world.register_template("Garage.et", TemplateSpec::prop());
//! world.register_template("Player.et", TemplateSpec::character());
//! let site = world.instantiate("Garage.et", &Transform::default()).unwrap();
//! let player = world.instantiate("Player.et", &Transform::default()).unwrap();
//!
//! let engine = GarageEngine::new(
//!     world,
//!     InMemoryRecordStore::new(),
//!     GarageConfig::default(),
//!     site,
//! )
//! .unwrap();
//! let owner = OwnerId::new("76561198000000000").unwrap();
//! assert!(engine.list_records(&owner).unwrap().is_empty());
//! assert!(!engine.deposit(&owner, player).unwrap().is_stored());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod locks;
pub mod outcome;
pub mod records;

pub use config::{GarageConfig, DEFAULT_KEY_TEMPLATE};
pub use engine::GarageEngine;
pub use error::{EngineError, EngineResult};
pub use locks::OwnerLocks;
pub use outcome::{DepositOutcome, DiscardOutcome, RetrieveOutcome, Unchanged};
pub use records::RecordBook;
