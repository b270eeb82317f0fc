//! Movement intent component.
//!
//! Intents carry what the player (or an AI) wants. The input intake system
//! turns them into the controller's desired velocity and jump request once
//! per frame.

use bevy::prelude::*;

/// Desired movement for a controlled sphere.
///
/// You handle input devices; the controller only sees this component.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use sphere_motion_controller::prelude::*;
///
/// let mut intent = MotionIntent::new();
/// intent.set_axis(Vec2::new(0.0, 1.0));
/// assert!(intent.is_moving());
///
/// intent.set_jump_pressed(true);
/// assert!(intent.take_jump_edge());
/// // Holding the button is not a new press.
/// assert!(!intent.take_jump_edge());
///
/// intent.clear();
/// assert!(!intent.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotionIntent {
    /// Planar input axis. `x` is right, `y` is forward. Each component is
    /// kept within -1.0..=1.0; the controller clamps the total length.
    pub axis: Vec2,
    /// Whether the jump button is currently held.
    ///
    /// A jump is requested when this changes from `false` to `true`.
    /// ```rust,ignore
    /// intent.set_jump_pressed(keyboard.pressed(KeyCode::Space));
    /// ```
    pub jump_pressed: bool,
    /// Held state seen by the last edge check.
    pub(crate) jump_pressed_prev: bool,
    /// One-shot request from [`MotionIntent::request_jump`].
    pub(crate) jump_queued: bool,
}

impl MotionIntent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planar input axis.
    pub fn set_axis(&mut self, axis: Vec2) {
        self.axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set the held state of the jump button.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Request a single jump regardless of the held state (AI, scripts).
    pub fn request_jump(&mut self) {
        self.jump_queued = true;
    }

    /// Clear the movement axis.
    pub fn clear(&mut self) {
        self.axis = Vec2::ZERO;
    }

    /// Check if there is active movement input.
    pub fn is_moving(&self) -> bool {
        self.axis.length_squared() > 1e-6
    }

    /// Whether a jump was pressed since the last call, consuming it.
    pub fn take_jump_edge(&mut self) -> bool {
        let edge = self.jump_pressed && !self.jump_pressed_prev;
        self.jump_pressed_prev = self.jump_pressed;
        edge | std::mem::take(&mut self.jump_queued)
    }
}
