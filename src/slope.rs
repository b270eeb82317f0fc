//! Contact-plane vector algebra.
//!
//! Stateless helpers used by the controller to work in the plane of the
//! surface it stands on. Nothing here touches controller state, so every
//! function can be tested on its own.

use bevy::prelude::*;

/// World "up". Ground classification compares contact normals against it.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// World "right". Projected onto the contact plane to build the X control axis.
pub const WORLD_RIGHT: Vec3 = Vec3::X;

/// World "back". Projected onto the contact plane to build the Z control axis.
pub const WORLD_BACK: Vec3 = Vec3::Z;

/// Remove the component of `vector` that lies along `normal`.
///
/// `normal` is expected to be unit length (or zero, in which case the
/// vector is returned unchanged).
#[inline]
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - normal * vector.dot(normal)
}

/// Build the X/Z control axes for a contact plane.
///
/// World right and world back are projected onto the plane and normalized.
/// A world axis parallel to the normal has no projection; its control
/// axis collapses to zero and contributes no velocity change.
#[inline]
pub fn contact_plane_axes(normal: Vec3) -> (Vec3, Vec3) {
    let x_axis = project_on_plane(WORLD_RIGHT, normal).normalize_or_zero();
    let z_axis = project_on_plane(WORLD_BACK, normal).normalize_or_zero();
    (x_axis, z_axis)
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let difference = target - current;
    if difference.abs() <= max_delta {
        target
    } else {
        current + difference.signum() * max_delta
    }
}

/// Launch speed needed to reach `height` against `gravity_magnitude`.
///
/// From `v² = 2 g h`. Non-positive inputs give zero.
#[inline]
pub fn jump_speed_for_height(gravity_magnitude: f32, height: f32) -> f32 {
    (2.0 * gravity_magnitude * height).max(0.0).sqrt()
}

/// Speed to add along the contact normal for a jump.
///
/// When the body already moves away from the surface (`aligned_speed > 0`)
/// that speed is subtracted so impulses don't stack; the result is floored
/// at zero.
#[inline]
pub fn jump_impulse_speed(jump_speed: f32, aligned_speed: f32) -> f32 {
    if aligned_speed > 0.0 {
        (jump_speed - aligned_speed).max(0.0)
    } else {
        jump_speed
    }
}
