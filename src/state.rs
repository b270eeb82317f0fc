//! State marker components.
//!
//! Mirror the ground state of the last state refresh so other systems can
//! filter with `With<Grounded>` instead of reading the controller.

use bevy::prelude::*;

/// Marker component indicating the sphere stood on ground last step.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use sphere_motion_controller::prelude::*;
///
/// fn count_grounded(query: Query<(), With<Grounded>>) -> usize {
///     query.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the sphere had no ground last step.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;
