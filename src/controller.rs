//! The motion controller component.
//!
//! [`MotionController`] owns the actor's motion state and implements the
//! per-step algorithm as four phases:
//!
//! 1. [`refresh_state`](MotionController::refresh_state): adopt the engine's
//!    velocity, reset the jump chain when grounded and settle the contact
//!    normal.
//! 2. [`adjust_velocity`](MotionController::adjust_velocity): steer the
//!    velocity in the contact plane toward the desired velocity under the
//!    acceleration budget.
//! 3. [`resolve_jump`](MotionController::resolve_jump): consume a pending
//!    jump request and add an impulse along the contact normal.
//! 4. [`commit`](MotionController::commit): hand the velocity back and clear
//!    the per-step contact state.
//!
//! Between steps, [`receive_input`](MotionController::receive_input) and
//! [`evaluate_contacts`](MotionController::evaluate_contacts) feed it from
//! the input and collision sides.

use bevy::prelude::*;

use crate::config::MotionConfig;
use crate::contact::{GroundContact, SurfaceContact};
use crate::slope::{self, WORLD_UP};

/// Result of the jump phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpOutcome {
    /// No jump was pending.
    NotRequested,
    /// A jump was pending but the jump budget was spent. The request is gone.
    Rejected,
    /// A jump happened; `speed` was added along the contact normal.
    Performed {
        /// Speed added along the contact normal (never negative).
        speed: f32,
    },
}

impl JumpOutcome {
    /// Whether a jump actually happened.
    pub fn performed(&self) -> bool {
        matches!(self, Self::Performed { .. })
    }
}

/// Motion state of a controlled sphere.
///
/// # Shared state
///
/// Input intake and the fixed step run at independent cadences. The only
/// values crossing that boundary are `desired_velocity` (last write wins)
/// and `desired_jump` (OR-accumulated, consumed once per step), so no jump
/// press is lost however the two interleave.
///
/// # Transient contact state
///
/// `on_ground` and the contact normal only mean something from contact
/// evaluation until the end of the step. [`commit`](Self::commit) is the one
/// place they are reset.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct MotionController {
    /// Gravity acting on the actor. Used for the jump launch speed.
    pub gravity: Vec3,

    velocity: Vec3,
    desired_velocity: Vec3,
    desired_jump: bool,
    jump_phase: u32,

    ground: GroundContact,
    contact_normal: Vec3,
    grounded_last_step: bool,
}

impl Default for MotionController {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            velocity: Vec3::ZERO,
            desired_velocity: Vec3::ZERO,
            desired_jump: false,
            jump_phase: 0,
            ground: GroundContact::default(),
            contact_normal: Vec3::ZERO,
            grounded_last_step: false,
        }
    }
}

impl MotionController {
    /// Create a controller with Earth gravity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with custom gravity.
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..default()
        }
    }

    // === Accessors ===

    /// Velocity as of the last phase that ran.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current input target, in world coordinates on the horizontal plane.
    #[inline]
    pub fn desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    /// Whether a jump request is waiting for the next step.
    #[inline]
    pub fn desired_jump(&self) -> bool {
        self.desired_jump
    }

    /// Jumps taken since the actor was last grounded.
    #[inline]
    pub fn jump_phase(&self) -> u32 {
        self.jump_phase
    }

    /// Whether grounding contacts have been seen in the current step.
    ///
    /// Always `false` between steps.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.ground.on_ground()
    }

    /// The contact normal of the current step.
    ///
    /// Before [`refresh_state`](Self::refresh_state) this is zero; after it,
    /// the averaged ground normal or world up.
    #[inline]
    pub fn contact_normal(&self) -> Vec3 {
        self.contact_normal
    }

    /// Grounding contacts gathered since the last clear.
    #[inline]
    pub fn ground_contact_count(&self) -> u32 {
        self.ground.count()
    }

    /// Ground state observed by the most recent state refresh.
    ///
    /// Unlike [`on_ground`](Self::on_ground) this survives the end-of-step
    /// clear, so observers can read it between steps.
    #[inline]
    pub fn grounded_last_step(&self) -> bool {
        self.grounded_last_step
    }

    // === Input side ===

    /// Take one frame of input.
    ///
    /// `axis` is clamped to unit length, scaled by `max_speed` and stored as
    /// the desired velocity `(x, 0, -y) * max_speed` in world coordinates.
    /// Bevy's forward is `-Z`, so forward input lands on negative Z, and the
    /// Z control axis compares against it along world back (`+Z`).
    /// `jump_pressed` is OR-ed into the pending jump request.
    pub fn receive_input(&mut self, axis: Vec2, jump_pressed: bool, config: &MotionConfig) {
        let axis = axis.clamp_length_max(1.0);
        self.desired_velocity = Vec3::new(axis.x, 0.0, -axis.y) * config.max_speed;
        self.desired_jump |= jump_pressed;
    }

    /// Overwrite the desired velocity directly (world coordinates).
    ///
    /// Only the X and Z components steer the actor.
    pub fn set_desired_velocity(&mut self, desired: Vec3) {
        self.desired_velocity = desired;
    }

    /// Queue a jump request for the next step.
    pub fn request_jump(&mut self) {
        self.desired_jump = true;
    }

    // === Collision side ===

    /// Classify contacts reported by the collision system.
    ///
    /// May be called any number of times per step; grounding contacts add
    /// to what earlier calls gathered. Returns how many of these contacts
    /// counted as ground.
    pub fn evaluate_contacts<I>(&mut self, contacts: I, config: &MotionConfig) -> u32
    where
        I: IntoIterator<Item = SurfaceContact>,
    {
        self.ground
            .accumulate(contacts, config.min_ground_dot_product())
    }

    // === Step phases ===

    /// Phase 1: adopt the engine velocity and settle the contact plane.
    pub fn refresh_state(&mut self, engine_velocity: Vec3) {
        self.velocity = engine_velocity;
        self.grounded_last_step = self.ground.on_ground();
        if self.ground.on_ground() {
            self.jump_phase = 0;
            // Opposing normals can only cancel with a 90 degree limit.
            self.contact_normal = self.ground.normal_sum().normalize_or(WORLD_UP);
        } else {
            self.contact_normal = WORLD_UP;
        }
    }

    /// Phase 2: steer the in-plane velocity toward the desired velocity.
    ///
    /// Each of the two contact-plane components moves by at most
    /// `acceleration * dt`. Velocity along the contact normal is untouched.
    pub fn adjust_velocity(&mut self, config: &MotionConfig, dt: f32) {
        let (x_axis, z_axis) = slope::contact_plane_axes(self.contact_normal);

        let current_x = self.velocity.dot(x_axis);
        let current_z = self.velocity.dot(z_axis);

        let max_speed_change = config.acceleration(self.ground.on_ground()) * dt;

        let new_x = slope::move_towards(current_x, self.desired_velocity.x, max_speed_change);
        let new_z = slope::move_towards(current_z, self.desired_velocity.z, max_speed_change);

        self.velocity += x_axis * (new_x - current_x) + z_axis * (new_z - current_z);
    }

    /// Phase 3: consume a pending jump request.
    ///
    /// The request is cleared whether or not the jump is allowed. A jump is
    /// allowed on the ground, or in the air while `jump_phase` is below
    /// `max_air_jumps`.
    pub fn resolve_jump(&mut self, config: &MotionConfig) -> JumpOutcome {
        if !self.desired_jump {
            return JumpOutcome::NotRequested;
        }
        self.desired_jump = false;

        if !(self.ground.on_ground() || self.jump_phase < config.max_air_jumps) {
            return JumpOutcome::Rejected;
        }

        self.jump_phase += 1;
        let jump_speed = slope::jump_speed_for_height(self.gravity.length(), config.jump_height);
        let aligned_speed = self.velocity.dot(self.contact_normal);
        let speed = slope::jump_impulse_speed(jump_speed, aligned_speed);
        self.velocity += self.contact_normal * speed;

        JumpOutcome::Performed { speed }
    }

    /// Phase 4: return the velocity for the engine and clear the step.
    pub fn commit(&mut self) -> Vec3 {
        self.clear_state();
        self.velocity
    }

    /// Reset the per-step contact state.
    pub fn clear_state(&mut self) {
        self.ground.clear();
        self.contact_normal = Vec3::ZERO;
    }

    /// Run all four phases for one fixed step.
    ///
    /// Contacts for this step must already have been passed to
    /// [`evaluate_contacts`](Self::evaluate_contacts). Returns the velocity
    /// to write back to the engine.
    pub fn step(&mut self, engine_velocity: Vec3, config: &MotionConfig, dt: f32) -> Vec3 {
        self.refresh_state(engine_velocity);
        self.adjust_velocity(config, dt);
        self.resolve_jump(config);
        self.commit()
    }
}
