use serde::{Deserialize, Serialize};

use garage_types::Transform;

use crate::error::EngineError;

/// Template of the physical car key item.
pub const DEFAULT_KEY_TEMPLATE: &str = "{CCFD8AA837B9611A}Prefabs/Items/CarKey/CarKey.et";

/// Tunables for one garage controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarageConfig {
    /// Maximum number of vehicles one owner may keep stored.
    pub max_per_owner: usize,
    /// Search radius (meters) around the garage for vehicles to store.
    pub store_radius: f32,
    /// Radius (meters) around the spawn point that must be free of vehicles.
    pub site_clear_radius: f32,
    /// Spawn point relative to the garage controller. `None` spawns on the
    /// controller itself.
    pub spawn_anchor: Option<Transform>,
    /// Template of the key item carried by players and issued on retrieval.
    pub key_template: String,
}

impl Default for GarageConfig {
    fn default() -> Self {
        Self {
            max_per_owner: 10,
            store_radius: 10.0,
            site_clear_radius: 1.0,
            spawn_anchor: None,
            key_template: DEFAULT_KEY_TEMPLATE.to_string(),
        }
    }
}

impl GarageConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_per_owner == 0 {
            return Err(EngineError::Config("max_per_owner must be at least 1".into()));
        }
        for (name, radius) in [
            ("store_radius", self.store_radius),
            ("site_clear_radius", self.site_clear_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(EngineError::Config(format!(
                    "{name} must be a positive number, got {radius}"
                )));
            }
        }
        if self.key_template.is_empty() {
            return Err(EngineError::Config("key_template must not be empty".into()));
        }
        Ok(())
    }
}
