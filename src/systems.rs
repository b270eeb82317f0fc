//! Core controller systems.
//!
//! One system per phase of the motion step, plus input intake and marker
//! sync. Systems that touch velocity are generic over the physics backend.

use bevy::prelude::*;

use crate::backend::MotionPhysicsBackend;
use crate::config::MotionConfig;
use crate::controller::{JumpOutcome, MotionController};
use crate::intent::MotionIntent;
use crate::state::{Airborne, Grounded};

/// Feed [`MotionIntent`] into the controller's desired velocity and jump
/// request.
///
/// Runs every frame in `Update`. A jump pressed between two fixed steps is
/// kept until a step consumes it.
pub fn intake_motion_input(
    mut q_controllers: Query<(Entity, &mut MotionIntent, &mut MotionController, &MotionConfig)>,
) {
    for (entity, mut intent, mut controller, config) in &mut q_controllers {
        let jump_pressed = intent.take_jump_edge();
        controller.receive_input(intent.axis, jump_pressed, config);
        if jump_pressed {
            trace!("Jump requested: entity={:?}", entity);
        }
    }
}

/// Refresh cached ground thresholds after a config edit.
///
/// Writes go through `bypass_change_detection` so the refresh itself does
/// not mark the config changed again.
pub fn refresh_ground_thresholds(mut q_configs: Query<&mut MotionConfig, Changed<MotionConfig>>) {
    for mut config in &mut q_configs {
        if config.bypass_change_detection().refresh_ground_threshold() {
            debug!(
                "Ground threshold refreshed: max_ground_angle={:.1}deg",
                config.max_ground_angle.to_degrees()
            );
        }
    }
}

/// Phase 1: adopt the engine velocity and settle the contact normal.
pub fn refresh_motion_state<B: MotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, (With<MotionController>, With<MotionConfig>)>()
        .iter(world)
        .collect();

    for entity in entities {
        let velocity = B::get_velocity(world, entity);
        let Some(mut controller) = world.get_mut::<MotionController>(entity) else {
            continue;
        };

        let was_grounded = controller.grounded_last_step();
        controller.refresh_state(velocity);

        if controller.on_ground() && !was_grounded {
            debug!(
                "Landed: entity={:?}, contacts={}, normal={:?}",
                entity,
                controller.ground_contact_count(),
                controller.contact_normal()
            );
        } else if !controller.on_ground() && was_grounded {
            debug!("Left ground: entity={:?}, velocity={:?}", entity, velocity);
        }
    }
}

/// Phase 2: steer the in-plane velocity toward the desired velocity.
pub fn adjust_motion_velocity<B: MotionPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let mut query = world.query::<(&mut MotionController, &MotionConfig)>();
    for (mut controller, config) in query.iter_mut(world) {
        controller.adjust_velocity(config, dt);
    }
}

/// Phase 3: consume pending jump requests.
pub fn resolve_motion_jump(
    mut q_controllers: Query<(Entity, &mut MotionController, &MotionConfig)>,
) {
    for (entity, mut controller, config) in &mut q_controllers {
        match controller.resolve_jump(config) {
            JumpOutcome::NotRequested => {}
            JumpOutcome::Rejected => {
                trace!(
                    "Jump rejected: entity={:?}, jump_phase={}, max_air_jumps={}",
                    entity,
                    controller.jump_phase(),
                    config.max_air_jumps
                );
            }
            JumpOutcome::Performed { speed } => {
                debug!(
                    "Jump: entity={:?}, speed={:.2}, on_ground={}, jump_phase={}",
                    entity,
                    speed,
                    controller.on_ground(),
                    controller.jump_phase()
                );
            }
        }
    }
}

/// Phase 4: write the velocity back and clear per-step contact state.
pub fn commit_motion_velocity<B: MotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, (With<MotionController>, With<MotionConfig>)>()
        .iter(world)
        .collect();

    for entity in entities {
        let Some(mut controller) = world.get_mut::<MotionController>(entity) else {
            continue;
        };
        let velocity = controller.commit();
        B::set_velocity(world, entity, velocity);
    }
}

/// Sync [`Grounded`]/[`Airborne`] markers with the last state refresh.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &MotionController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_controllers {
        let grounded = controller.grounded_last_step();
        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !grounded && has_grounded {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        } else if !grounded && !has_airborne {
            commands.entity(entity).insert(Airborne);
        }
    }
}
