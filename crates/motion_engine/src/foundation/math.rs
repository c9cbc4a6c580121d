//! Math utilities and types
//!
//! Provides the fundamental math types used by the property model, the scene
//! tree geometry queries, and the physics integration.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Tolerance below which a direction vector is treated as degenerate
pub const EPSILON: f32 = 1.0e-6;

/// Coordinate system of a scene node, relative to world space
///
/// Node coordinate systems are translation-only: a node's local frame is the
/// world frame offset by the accumulated positions along its parent chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Origin of this coordinate system in world space
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create the identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
        }
    }

    /// Create a transform with the given origin
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }

    /// Map a point from this coordinate system into world space
    pub fn apply(&self, point: Vec3) -> Vec3 {
        point + self.position
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Self {
        Self {
            position: -self.position,
        }
    }

    /// Combine this transform with another (this applied after `other`)
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            position: self.position + other.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_round_trip() {
        let transform = Transform::from_position(Vec3::new(1.0, -2.0, 3.0));
        let local = Vec3::new(0.5, 0.5, 0.5);
        let world = transform.apply(local);
        let back = transform.inverse().apply(world);
        assert_relative_eq!(back, local, epsilon = EPSILON);
    }

    #[test]
    fn test_transform_combine() {
        let outer = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let inner = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let combined = outer.combine(&inner);
        assert_relative_eq!(
            combined.apply(Vec3::zeros()),
            Vec3::new(1.0, 2.0, 0.0),
            epsilon = EPSILON
        );
    }
}
