//! Physics backend abstraction.
//!
//! The controller never talks to a physics engine directly. It reads and
//! writes linear velocity through this trait, and a backend plugin feeds it
//! contacts (see [`MotionController::evaluate_contacts`]).
//!
//! [`MotionController::evaluate_contacts`]: crate::controller::MotionController::evaluate_contacts

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// A backend is responsible for:
/// - exposing the body's linear velocity to the step systems,
/// - reporting contacts of controlled bodies once per fixed step, from a
///   system in [`MotionControllerSet::Contacts`](crate::MotionControllerSet::Contacts),
/// - integrating gravity and resolving collisions itself.
///
/// See the `rapier` module's `Rapier3dBackend` for the bundled implementation.
pub trait MotionPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    ///
    /// Returns zero if the entity has no velocity component.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .filter(|&dt| dt > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
