use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a live entity in the world.
///
/// Only meaningful to the world that issued it; never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space position in meters. `y` is up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if `other` lies inside the closed sphere of `radius`
    /// around `self`.
    pub fn within(&self, other: &Vec3, radius: f32) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Placement of an entity: a position plus a heading around the up axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Heading in degrees, clockwise when viewed from above.
    #[serde(default)]
    pub yaw_degrees: f32,
}

impl Transform {
    pub const fn new(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            yaw_degrees,
        }
    }

    pub const fn at(position: Vec3) -> Self {
        Self::new(position, 0.0)
    }

    /// Convert a transform expressed relative to `self` into world space.
    pub fn compose(&self, local: &Transform) -> Transform {
        let (sin, cos) = self.yaw_degrees.to_radians().sin_cos();
        let offset = Vec3::new(
            local.position.x * cos + local.position.z * sin,
            local.position.y,
            -local.position.x * sin + local.position.z * cos,
        );
        Transform {
            position: self.position + offset,
            yaw_degrees: (self.yaw_degrees + local.yaw_degrees).rem_euclid(360.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn within_is_inclusive() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!(approx(a.distance(&b), 5.0));
        assert!(a.within(&b, 5.0));
        assert!(!a.within(&b, 4.99));
    }

    #[test]
    fn compose_without_rotation_translates() {
        let parent = Transform::at(Vec3::new(10.0, 0.0, 10.0));
        let local = Transform::new(Vec3::new(2.0, 0.5, -1.0), 45.0);
        let world = parent.compose(&local);
        assert_eq!(world.position, Vec3::new(12.0, 0.5, 9.0));
        assert!(approx(world.yaw_degrees, 45.0));
    }

    #[test]
    fn compose_rotates_offset_by_parent_yaw() {
        let parent = Transform::new(Vec3::ZERO, 90.0);
        let local = Transform::at(Vec3::new(0.0, 0.0, 5.0));
        let world = parent.compose(&local);
        assert!(approx(world.position.x, 5.0));
        assert!(approx(world.position.z, 0.0));
        assert!(approx(world.yaw_degrees, 90.0));
    }

    #[test]
    fn compose_wraps_yaw() {
        let parent = Transform::new(Vec3::ZERO, 300.0);
        let local = Transform::new(Vec3::ZERO, 90.0);
        assert!(approx(parent.compose(&local).yaw_degrees, 30.0));
    }
}
