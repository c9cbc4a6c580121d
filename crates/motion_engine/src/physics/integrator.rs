//! Force integration and ambient force actions

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::foundation::math::{Vec3, EPSILON};
use crate::physics::forces::{read_scalar, read_vector, write_scalar, write_vector};
use crate::physics::{self, ANGULAR_VELOCITY, FORCE, MASS, ROTATION, TORQUE, VELOCITY};
use crate::property::Property;
use crate::scene::{NodeKey, POSITION};

/// Semi-implicit Euler integrator over the physics property convention
///
/// Once per step per node: acceleration is derived from the accumulated
/// force and the node's mass, velocity and position are advanced, the
/// angular pair is advanced the same way, and both accumulators are zeroed.
/// Zero mass means immovable: the accumulators are still cleared but
/// velocity and position are left untouched.
#[derive(Debug, Clone, Copy)]
pub struct Integrate {
    timestep: f32,
}

impl Default for Integrate {
    fn default() -> Self {
        Self { timestep: 1.0 }
    }
}

impl Integrate {
    /// Integrate with the given timestep per simulation step
    pub fn new(timestep: f32) -> Self {
        Self { timestep }
    }
}

impl Action for Integrate {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let dt = self.timestep;
        let mass = read_scalar(ctx.tree, node, MASS)?;

        if mass > 0.0 {
            let force = read_vector(ctx.tree, node, FORCE)?;
            let velocity = read_vector(ctx.tree, node, VELOCITY)? + force / mass * dt;
            write_vector(ctx.tree, node, VELOCITY, velocity)?;

            let position = read_vector(ctx.tree, node, POSITION)? + velocity * dt;
            write_vector(ctx.tree, node, POSITION, position)?;

            let torque = read_scalar(ctx.tree, node, TORQUE)?;
            let angular = read_scalar(ctx.tree, node, ANGULAR_VELOCITY)? + torque / mass * dt;
            write_scalar(ctx.tree, node, ANGULAR_VELOCITY, angular)?;

            let rotation = read_scalar(ctx.tree, node, ROTATION)? + angular * dt;
            write_scalar(ctx.tree, node, ROTATION, rotation)?;
        }

        // Zeroing the accumulators is the contract that lets independent
        // actions apply forces any number of times per step.
        write_vector(ctx.tree, node, FORCE, Vec3::zeros())?;
        write_scalar(ctx.tree, node, TORQUE, 0.0)?;

        Ok(ActionResult::CONTINUE.with_changed())
    }

    fn required_properties(&self) -> Vec<Property> {
        physics::default_properties()
    }
}

/// Applies a constant acceleration (gravity-style) as weight every step
#[derive(Debug, Clone, Copy)]
pub struct ConstantForce {
    acceleration: Vec3,
}

impl ConstantForce {
    /// Accelerate every node by `acceleration`, independent of mass
    pub fn new(acceleration: Vec3) -> Self {
        Self { acceleration }
    }
}

impl Action for ConstantForce {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        physics::apply_acceleration(ctx.tree, node, self.acceleration)?;
        Ok(ActionResult::CONTINUE.with_changed())
    }

    fn required_properties(&self) -> Vec<Property> {
        physics::default_properties()
    }
}

/// Velocity-proportional damping force
#[derive(Debug, Clone, Copy)]
pub struct Drag {
    coefficient: f32,
}

impl Drag {
    /// Oppose velocity with `coefficient` times its magnitude
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }
}

impl Action for Drag {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let velocity = read_vector(ctx.tree, node, VELOCITY)?;
        if velocity.norm() <= EPSILON {
            return Ok(ActionResult::CONTINUE);
        }
        physics::apply_force(ctx.tree, node, -velocity * self.coefficient)?;
        Ok(ActionResult::CONTINUE.with_changed())
    }

    fn required_properties(&self) -> Vec<Property> {
        physics::default_properties()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::scene::SceneTree;

    fn physics_node() -> (SceneTree, NodeKey) {
        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();
        tree.init_properties(node, &physics::default_properties())
            .unwrap();
        (tree, node)
    }

    fn step(action: &mut dyn Action, tree: &mut SceneTree, node: NodeKey, frame: u64) {
        let mut ctx = ActionContext { tree, frame };
        action.behave(&mut ctx, node).unwrap();
    }

    #[test]
    fn test_integration_moves_node_and_zeroes_force() {
        let (mut tree, node) = physics_node();
        physics::apply_force(&mut tree, node, Vec3::new(2.0, 0.0, 0.0)).unwrap();

        let mut integrate = Integrate::default();
        step(&mut integrate, &mut tree, node, 1);

        assert_relative_eq!(
            read_vector(&tree, node, VELOCITY).unwrap(),
            Vec3::new(2.0, 0.0, 0.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            read_vector(&tree, node, POSITION).unwrap(),
            Vec3::new(2.0, 0.0, 0.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            read_vector(&tree, node, FORCE).unwrap(),
            Vec3::zeros(),
            epsilon = EPSILON
        );

        // No new force: velocity persists, position keeps advancing.
        step(&mut integrate, &mut tree, node, 2);
        assert_relative_eq!(
            read_vector(&tree, node, POSITION).unwrap(),
            Vec3::new(4.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_angular_integration() {
        let (mut tree, node) = physics_node();
        physics::apply_torque(&mut tree, node, 0.5).unwrap();

        let mut integrate = Integrate::default();
        step(&mut integrate, &mut tree, node, 1);

        assert_relative_eq!(
            read_scalar(&tree, node, ANGULAR_VELOCITY).unwrap(),
            0.5,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            read_scalar(&tree, node, ROTATION).unwrap(),
            0.5,
            epsilon = EPSILON
        );
        assert_relative_eq!(read_scalar(&tree, node, TORQUE).unwrap(), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_zero_mass_is_immovable() {
        let (mut tree, node) = physics_node();
        tree.property_mut(node, MASS).unwrap().set_scalar(0.0);
        physics::apply_force(&mut tree, node, Vec3::new(5.0, 0.0, 0.0)).unwrap();

        let mut integrate = Integrate::default();
        step(&mut integrate, &mut tree, node, 1);

        assert_relative_eq!(
            read_vector(&tree, node, POSITION).unwrap(),
            Vec3::zeros(),
            epsilon = EPSILON
        );
        // Accumulator still cleared so forces never pile up across steps.
        assert_relative_eq!(
            read_vector(&tree, node, FORCE).unwrap(),
            Vec3::zeros(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let (mut tree, node) = physics_node();
        tree.property_mut(node, VELOCITY)
            .unwrap()
            .set_vector(Vec3::new(4.0, 0.0, 0.0));

        let mut drag = Drag::new(0.5);
        step(&mut drag, &mut tree, node, 1);

        assert_relative_eq!(
            read_vector(&tree, node, FORCE).unwrap(),
            Vec3::new(-2.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_constant_force_scales_with_mass() {
        let (mut tree, node) = physics_node();
        tree.property_mut(node, MASS).unwrap().set_scalar(2.0);

        let mut gravity = ConstantForce::new(Vec3::new(0.0, -9.8, 0.0));
        step(&mut gravity, &mut tree, node, 1);

        assert_relative_eq!(
            read_vector(&tree, node, FORCE).unwrap(),
            Vec3::new(0.0, -19.6, 0.0),
            epsilon = 1.0e-4
        );
    }
}
