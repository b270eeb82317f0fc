//! # `sphere_motion_controller`
//!
//! A slope-aware velocity controller for rolling sphere actors, with a
//! physics backend abstraction.
//!
//! The controller:
//! - Turns planar input into a desired velocity at up to `max_speed`
//! - Classifies contacts as ground by a configurable slope limit
//! - Steers velocity in the plane of the ground, so slopes are climbed
//!   rather than pushed into
//! - Jumps along the ground normal, with an optional air jump budget
//! - Leaves gravity and collision response to the physics engine
//!   (Rapier3D included)
//!
//! ## Step
//!
//! Every fixed step runs four phases, in order:
//! 1. **State refresh**: read the engine velocity, settle the contact normal
//! 2. **Velocity adjust**: move toward the desired velocity, rate limited
//! 3. **Jump resolve**: consume a pending jump request
//! 4. **Commit**: write the velocity back, clear per-step contact state
//!
//! Contacts are evaluated before the phases; input is taken every frame.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use sphere_motion_controller::prelude::*;
//!
//! let controller = MotionController::new();
//! let config = MotionConfig::agile();
//! let intent = MotionIntent::default();
//!
//! // Spawn these with a physics body and a ball collider.
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod contact;
pub mod controller;
pub mod intent;
pub mod slope;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::MotionPhysicsBackend;
    pub use crate::config::MotionConfig;
    pub use crate::contact::SurfaceContact;
    pub use crate::controller::{JumpOutcome, MotionController};
    pub use crate::intent::MotionIntent;
    pub use crate::state::{Airborne, Grounded};
    pub use crate::{MotionControllerPlugin, MotionControllerSet};

    #[cfg(feature = "serialize")]
    pub use crate::config::{load_motion_config, ConfigLoadError};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dSphereBundle};
}

/// System sets for the fixed step, run in this order.
///
/// Backends put their contact reporting in [`MotionControllerSet::Contacts`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionControllerSet {
    /// Config upkeep and backend synchronisation.
    Preparation,
    /// Contact evaluation.
    Contacts,
    /// State refresh, velocity adjust and jump resolve.
    Step,
    /// Velocity write-back and state clear.
    Commit,
}

/// Main plugin for the motion controller.
///
/// Generic over a physics backend `B` that owns velocity, gravity and
/// contacts.
///
/// # Examples
///
/// With the Rapier3D backend. Rapier has to step in the fixed schedule so
/// that every fixed step sees the contacts of exactly one physics step:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use sphere_motion_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(MotionControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct MotionControllerPlugin<B: backend::MotionPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::MotionPhysicsBackend> Default for MotionControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::MotionPhysicsBackend> Plugin for MotionControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<controller::MotionController>();
        app.register_type::<config::MotionConfig>();
        app.register_type::<intent::MotionIntent>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();

        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                MotionControllerSet::Preparation,
                MotionControllerSet::Contacts,
                MotionControllerSet::Step,
                MotionControllerSet::Commit,
            )
                .chain(),
        );

        app.add_systems(Update, systems::intake_motion_input);

        app.add_systems(
            FixedUpdate,
            systems::refresh_ground_thresholds.in_set(MotionControllerSet::Preparation),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::refresh_motion_state::<B>,
                systems::sync_state_markers,
                systems::adjust_motion_velocity::<B>,
                systems::resolve_motion_jump,
            )
                .chain()
                .in_set(MotionControllerSet::Step),
        );

        app.add_systems(
            FixedUpdate,
            systems::commit_motion_velocity::<B>.in_set(MotionControllerSet::Commit),
        );
    }
}
