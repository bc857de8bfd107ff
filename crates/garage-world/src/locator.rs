//! Candidate search around a point.
//!
//! [`SpatialLocator::find_nearest`] is a first-match search: it returns the
//! first entity the world visits inside the sphere that the predicate
//! accepts. Despite the name, nothing is sorted by distance; callers may only
//! rely on "some match within radius".

use std::collections::HashSet;
use std::ops::ControlFlow;

use garage_types::{EntityId, KeyCredential, Vec3};
use tracing::debug;

use crate::world::{VehicleHandle, World};

/// A matched world asset plus the credential that matched it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateAsset {
    pub vehicle: VehicleHandle,
    /// The vehicle's lock credential when the predicate matched on a key.
    pub matched_key: Option<KeyCredential>,
}

impl CandidateAsset {
    pub fn entity(&self) -> EntityId {
        self.vehicle.entity
    }
}

/// Acceptance rule evaluated against each entity in the search sphere.
pub trait AssetPredicate {
    /// Return the candidate if `entity` is acceptable.
    fn accept(&self, world: &dyn World, entity: EntityId) -> Option<CandidateAsset>;
}

/// Deposit rule: a vehicle whose lock id is among the keys the requester is
/// carrying.
#[derive(Debug, Clone, Copy)]
pub struct DepositMatch<'a> {
    held_keys: &'a HashSet<String>,
}

impl<'a> DepositMatch<'a> {
    pub fn new(held_keys: &'a HashSet<String>) -> Self {
        Self { held_keys }
    }
}

impl AssetPredicate for DepositMatch<'_> {
    fn accept(&self, world: &dyn World, entity: EntityId) -> Option<CandidateAsset> {
        let vehicle = world.vehicle(entity)?;
        let lock = world.lock(entity)?;
        if lock.key_id.is_empty() || !self.held_keys.contains(&lock.key_id) {
            return None;
        }
        Some(CandidateAsset {
            vehicle,
            matched_key: Some(lock),
        })
    }
}

/// Site-clear rule: any vehicle at all, whoever owns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyVehicle;

impl AssetPredicate for AnyVehicle {
    fn accept(&self, world: &dyn World, entity: EntityId) -> Option<CandidateAsset> {
        world.vehicle(entity).map(|vehicle| CandidateAsset {
            vehicle,
            matched_key: None,
        })
    }
}

/// Runs [`AssetPredicate`]s over sphere queries on a [`World`].
pub struct SpatialLocator<'w> {
    world: &'w dyn World,
}

impl<'w> SpatialLocator<'w> {
    pub fn new(world: &'w dyn World) -> Self {
        Self { world }
    }

    /// First entity within `radius` of `anchor` accepted by `predicate`.
    pub fn find_nearest<P>(
        &self,
        anchor: Vec3,
        radius: f32,
        predicate: &P,
    ) -> Option<CandidateAsset>
    where
        P: AssetPredicate + ?Sized,
    {
        let mut found = None;
        let mut scanned = 0usize;
        self.world.query_sphere(anchor, radius, &mut |entity| {
            scanned += 1;
            match predicate.accept(self.world, entity) {
                Some(candidate) => {
                    found = Some(candidate);
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        });
        debug!(
            scanned,
            radius,
            matched = ?found.as_ref().map(CandidateAsset::entity),
            "sphere scan"
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryWorld, TemplateSpec};
    use garage_types::Transform;

    fn world() -> InMemoryWorld {
        let w = InMemoryWorld::new();
        w.register_template("veh/Car.et", TemplateSpec::vehicle());
        w.register_template("prop/Barrel.et", TemplateSpec::prop());
        w
    }

    fn keys(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn deposit_match_requires_held_key() {
        let w = world();
        let car = w
            .instantiate("veh/Car.et", &Transform::at(Vec3::new(3.0, 0.0, 0.0)))
            .unwrap();
        w.set_credential(car, &KeyCredential::new("K1", "0001")).unwrap();

        let locator = SpatialLocator::new(&w);
        let held = keys(&["K9"]);
        assert!(locator
            .find_nearest(Vec3::ZERO, 10.0, &DepositMatch::new(&held))
            .is_none());

        let held = keys(&["K9", "K1"]);
        let found = locator
            .find_nearest(Vec3::ZERO, 10.0, &DepositMatch::new(&held))
            .unwrap();
        assert_eq!(found.entity(), car);
        assert_eq!(found.vehicle.template_ref, "veh/Car.et");
        assert_eq!(found.matched_key, Some(KeyCredential::new("K1", "0001")));
    }

    #[test]
    fn deposit_match_respects_radius() {
        let w = world();
        let car = w
            .instantiate("veh/Car.et", &Transform::at(Vec3::new(30.0, 0.0, 0.0)))
            .unwrap();
        w.set_credential(car, &KeyCredential::new("K1", "0001")).unwrap();

        let held = keys(&["K1"]);
        let locator = SpatialLocator::new(&w);
        assert!(locator
            .find_nearest(Vec3::ZERO, 10.0, &DepositMatch::new(&held))
            .is_none());
        assert!(locator
            .find_nearest(Vec3::ZERO, 30.0, &DepositMatch::new(&held))
            .is_some());
    }

    #[test]
    fn empty_key_set_matches_nothing() {
        let w = world();
        let car = w.instantiate("veh/Car.et", &Transform::default()).unwrap();
        w.set_credential(car, &KeyCredential::default()).unwrap();

        let held = HashSet::new();
        assert!(SpatialLocator::new(&w)
            .find_nearest(Vec3::ZERO, 10.0, &DepositMatch::new(&held))
            .is_none());
    }

    #[test]
    fn any_vehicle_ignores_non_vehicles() {
        let w = world();
        w.instantiate("prop/Barrel.et", &Transform::default()).unwrap();
        let locator = SpatialLocator::new(&w);
        assert!(locator.find_nearest(Vec3::ZERO, 1.0, &AnyVehicle).is_none());

        let car = w
            .instantiate("veh/Car.et", &Transform::at(Vec3::new(0.5, 0.0, 0.0)))
            .unwrap();
        let found = locator.find_nearest(Vec3::ZERO, 1.0, &AnyVehicle).unwrap();
        assert_eq!(found.entity(), car);
        assert!(found.matched_key.is_none());
    }
}
