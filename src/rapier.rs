//! Rapier3D physics backend implementation.
//!
//! Velocity goes through the `Velocity` component, contacts are read from
//! the Rapier narrow phase and gravity is taken from `RapierConfiguration`.
//! Enable with the `rapier3d` feature.
//!
//! Rapier must step once per fixed step, after the controller has committed:
//!
//! ```rust,ignore
//! app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
//! ```
//!
//! With the default `PostUpdate` schedule a frame running two fixed steps
//! would evaluate the same contacts twice, and a frame running none would
//! still integrate.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::backend::MotionPhysicsBackend;
use crate::config::MotionConfig;
use crate::contact::SurfaceContact;
use crate::controller::MotionController;

/// Rapier3D physics backend for the motion controller.
pub struct Rapier3dBackend;

impl MotionPhysicsBackend for Rapier3dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the motion controller.
///
/// Expects `RapierPhysicsPlugin` in a fixed schedule
/// (`in_fixed_schedule()`), so each fixed step runs: contacts, the four
/// phases, then one Rapier step.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::MotionControllerSet;

        // Only matters when Rapier is scheduled into FixedUpdate itself;
        // with `in_fixed_schedule()` it already runs in FixedPostUpdate.
        app.configure_sets(
            FixedUpdate,
            MotionControllerSet::Commit.before(PhysicsSet::SyncBackend),
        );

        app.add_systems(
            FixedUpdate,
            sync_rapier_gravity.in_set(MotionControllerSet::Preparation),
        );

        app.add_systems(
            FixedUpdate,
            rapier_contact_evaluation.in_set(MotionControllerSet::Contacts),
        );
    }
}

/// Copy the Rapier world gravity into each controller.
///
/// A `GravityScale` on the body scales it, so the jump height matches the
/// gravity the body actually falls with.
pub fn sync_rapier_gravity(
    q_rapier_config: Query<&RapierConfiguration>,
    mut q_controllers: Query<(&mut MotionController, Option<&GravityScale>)>,
) {
    let Ok(rapier_config) = q_rapier_config.single() else {
        return;
    };

    for (mut controller, gravity_scale) in &mut q_controllers {
        let gravity = rapier_config.gravity * gravity_scale.map_or(1.0, |s| s.0);
        if controller.gravity != gravity {
            controller.gravity = gravity;
        }
    }
}

/// Feed the contacts of each controlled collider to its controller.
///
/// Rapier reports one normal per manifold; it is flipped when needed so it
/// points from the contact point toward the body centre, which is the
/// orientation ground classification expects.
fn rapier_contact_evaluation(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(Entity, &GlobalTransform, &MotionConfig, &mut MotionController)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut controller) in &mut q_controllers {
        let centre = transform.translation();
        let mut contacts = Vec::new();

        for pair in context.contact_pairs_with(entity) {
            if !pair.has_any_active_contact() {
                continue;
            }
            for manifold in pair.manifolds() {
                let normal = manifold.normal();
                for solver_contact in manifold.solver_contacts() {
                    let point = solver_contact.point();
                    contacts.push(SurfaceContact::new(
                        point,
                        normal_toward_centre(normal, point, centre),
                    ));
                }
            }
        }

        if contacts.is_empty() {
            continue;
        }

        let grounded = controller.evaluate_contacts(contacts.iter().copied(), config);
        trace!(
            "Contacts: entity={:?}, total={}, ground={}",
            entity,
            contacts.len(),
            grounded
        );
    }
}

/// Orient `normal` so it points from `point` toward `centre`.
fn normal_toward_centre(normal: Vec3, point: Vec3, centre: Vec3) -> Vec3 {
    if normal.dot(centre - point) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Bundle of Rapier components for a controlled sphere.
///
/// Add a `Collider::ball` next to it. The body keeps its rotation free so
/// the sphere rolls; the controller only ever sets linear velocity. Run
/// `RapierPhysicsPlugin` with `in_fixed_schedule()`, see
/// [`Rapier3dBackendPlugin`].
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `damping`: Linear 0.0, Angular 0.5
/// - `sleeping`: Disabled, a resting sphere must keep reporting contacts
/// - `ccd`: Enabled, for fast spheres against thin geometry
#[derive(Bundle)]
pub struct Rapier3dSphereBundle {
    /// The rigid body type.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Written by the controller each step.
    pub velocity: Velocity,
    /// Damping coefficients. Linear damping fights the acceleration budget.
    pub damping: Damping,
    /// Sleep state.
    pub sleeping: Sleeping,
    /// Continuous collision detection.
    pub ccd: Ccd,
}

impl Default for Rapier3dSphereBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dSphereBundle {
    /// Create a sphere bundle with the defaults listed above.
    ///
    /// ```ignore
    /// commands.spawn((
    ///     MotionController::new(),
    ///     MotionConfig::default(),
    ///     MotionIntent::default(),
    ///     Rapier3dSphereBundle::new(),
    ///     Collider::ball(0.5),
    ///     Transform::from_xyz(0.0, 1.0, 0.0),
    /// ));
    /// ```
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.5,
            },
            sleeping: Sleeping::disabled(),
            ccd: Ccd::enabled(),
        }
    }

    /// Set the rigid body type.
    ///
    /// [`RigidBody::KinematicVelocityBased`] works too, but then nothing
    /// but the controller moves the body and gravity is not applied.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Enable or disable continuous collision detection.
    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = if enabled {
            Ccd::enabled()
        } else {
            Ccd::disabled()
        };
        self
    }
}
