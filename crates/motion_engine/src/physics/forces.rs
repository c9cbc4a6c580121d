//! Force and torque accumulation
//!
//! Accelerations are converted to forces by scaling with the node's mass, so
//! every accumulation path is uniformly force-based.

use crate::action::ActionError;
use crate::foundation::math::Vec3;
use crate::physics::{FORCE, MASS, TORQUE};
use crate::scene::{NodeKey, SceneTree};

pub(crate) fn read_scalar(
    tree: &SceneTree,
    node: NodeKey,
    name: &str,
) -> Result<f32, ActionError> {
    let property = tree
        .property(node, name)
        .ok_or_else(|| ActionError::MissingProperty(name.to_owned()))?;
    property
        .as_scalar()
        .ok_or_else(|| ActionError::PropertyKind(name.to_owned()))
}

pub(crate) fn read_vector(
    tree: &SceneTree,
    node: NodeKey,
    name: &str,
) -> Result<Vec3, ActionError> {
    let property = tree
        .property(node, name)
        .ok_or_else(|| ActionError::MissingProperty(name.to_owned()))?;
    property
        .as_vector()
        .ok_or_else(|| ActionError::PropertyKind(name.to_owned()))
}

pub(crate) fn write_scalar(
    tree: &mut SceneTree,
    node: NodeKey,
    name: &str,
    value: f32,
) -> Result<(), ActionError> {
    tree.property_mut(node, name)
        .ok_or_else(|| ActionError::MissingProperty(name.to_owned()))?
        .set_scalar(value);
    Ok(())
}

pub(crate) fn write_vector(
    tree: &mut SceneTree,
    node: NodeKey,
    name: &str,
    value: Vec3,
) -> Result<(), ActionError> {
    tree.property_mut(node, name)
        .ok_or_else(|| ActionError::MissingProperty(name.to_owned()))?
        .set_vector(value);
    Ok(())
}

/// Accumulate a force into the node's force accumulator
pub fn apply_force(tree: &mut SceneTree, node: NodeKey, force: Vec3) -> Result<(), ActionError> {
    let accumulated = read_vector(tree, node, FORCE)? + force;
    write_vector(tree, node, FORCE, accumulated)
}

/// Accumulate an acceleration, scaled by the node's mass
pub fn apply_acceleration(
    tree: &mut SceneTree,
    node: NodeKey,
    acceleration: Vec3,
) -> Result<(), ActionError> {
    let mass = read_scalar(tree, node, MASS)?;
    apply_force(tree, node, acceleration * mass)
}

/// Accumulate a torque into the node's torque accumulator
pub fn apply_torque(tree: &mut SceneTree, node: NodeKey, torque: f32) -> Result<(), ActionError> {
    let accumulated = read_scalar(tree, node, TORQUE)? + torque;
    write_scalar(tree, node, TORQUE, accumulated)
}

/// Accumulate an angular acceleration, scaled by the node's mass
pub fn apply_angular_acceleration(
    tree: &mut SceneTree,
    node: NodeKey,
    acceleration: f32,
) -> Result<(), ActionError> {
    let mass = read_scalar(tree, node, MASS)?;
    apply_torque(tree, node, acceleration * mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::EPSILON;
    use crate::physics::default_properties;

    fn physics_node() -> (SceneTree, NodeKey) {
        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();
        tree.init_properties(node, &default_properties()).unwrap();
        (tree, node)
    }

    #[test]
    fn test_force_round_trip_cancels() {
        let (mut tree, node) = physics_node();
        let force = Vec3::new(3.0, -1.0, 0.5);

        apply_force(&mut tree, node, force).unwrap();
        apply_force(&mut tree, node, -force).unwrap();

        let accumulated = read_vector(&tree, node, FORCE).unwrap();
        assert_relative_eq!(accumulated, Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_acceleration_scales_by_mass() {
        let (mut tree, node) = physics_node();
        tree.property_mut(node, MASS).unwrap().set_scalar(4.0);

        apply_acceleration(&mut tree, node, Vec3::new(1.0, 0.0, 0.0)).unwrap();

        let accumulated = read_vector(&tree, node, FORCE).unwrap();
        assert_relative_eq!(accumulated, Vec3::new(4.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_torque_accumulates() {
        let (mut tree, node) = physics_node();
        apply_torque(&mut tree, node, 0.5).unwrap();
        apply_torque(&mut tree, node, 0.25).unwrap();
        assert_relative_eq!(
            read_scalar(&tree, node, TORQUE).unwrap(),
            0.75,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_missing_property_is_fatal() {
        let mut tree = SceneTree::new();
        let bare = tree.attach_leaf(tree.root(), None).unwrap();
        let result = apply_force(&mut tree, bare, Vec3::zeros());
        assert_eq!(
            result,
            Err(ActionError::MissingProperty(FORCE.to_owned()))
        );
    }
}
