//! Schedule-level tests for the motion controller.
//!
//! A scripted backend stands in for the physics engine: it stores velocity
//! on a plain component and reports whatever contacts the test sets. This
//! makes every fixed step exactly reproducible.

use bevy::prelude::*;
use sphere_motion_controller::backend::NoOpBackendPlugin;
use sphere_motion_controller::prelude::*;

const EPSILON: f32 = 1e-4;

/// Body velocity owned by the scripted backend.
#[derive(Component, Default)]
struct TestBody {
    velocity: Vec3,
}

/// Contacts the scripted backend reports every fixed step.
#[derive(Component, Default)]
struct TestContacts(Vec<SurfaceContact>);

struct TestBackend;

impl MotionPhysicsBackend for TestBackend {
    type VelocityComponent = TestBody;

    fn plugin() -> impl Plugin {
        TestBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<TestBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.velocity = velocity;
        }
    }
}

struct TestBackendPlugin;

impl Plugin for TestBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(NoOpBackendPlugin);
        app.add_systems(
            FixedUpdate,
            report_test_contacts.in_set(MotionControllerSet::Contacts),
        );
    }
}

fn report_test_contacts(
    mut q_bodies: Query<(&TestContacts, &MotionConfig, &mut MotionController)>,
) {
    for (contacts, config, mut controller) in &mut q_bodies {
        controller.evaluate_contacts(contacts.0.iter().copied(), config);
    }
}

fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(MotionControllerPlugin::<TestBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

fn spawn_sphere(app: &mut App, config: MotionConfig) -> Entity {
    app.world_mut()
        .spawn((
            MotionController::new(),
            config,
            MotionIntent::default(),
            TestBody::default(),
            TestContacts::default(),
        ))
        .id()
}

fn flat_ground() -> Vec<SurfaceContact> {
    vec![SurfaceContact::new(Vec3::ZERO, Vec3::Y)]
}

fn slope(degrees: f32) -> Vec<SurfaceContact> {
    let angle = degrees.to_radians();
    vec![SurfaceContact::new(
        Vec3::ZERO,
        Vec3::new(-angle.sin(), angle.cos(), 0.0),
    )]
}

fn set_contacts(app: &mut App, entity: Entity, contacts: Vec<SurfaceContact>) {
    app.world_mut()
        .get_mut::<TestContacts>(entity)
        .unwrap()
        .0 = contacts;
}

fn intent_mut(app: &mut App, entity: Entity) -> Mut<'_, MotionIntent> {
    app.world_mut().get_mut::<MotionIntent>(entity).unwrap()
}

/// Run input intake once, as one rendered frame would.
fn frame(app: &mut App) {
    app.world_mut().run_schedule(Update);
}

/// Run one fixed step.
fn step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn body_velocity(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<TestBody>(entity).unwrap().velocity
}

fn controller(app: &App, entity: Entity) -> &MotionController {
    app.world().get::<MotionController>(entity).unwrap()
}

fn dt() -> f32 {
    Time::<Fixed>::from_hz(60.0).timestep().as_secs_f32()
}

// ==================== Velocity Tests ====================

mod velocity {
    use super::*;

    #[test]
    fn grounded_step_uses_ground_acceleration() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_max_speed(5.0)
            .with_acceleration(60.0, 6.0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, flat_ground());

        intent_mut(&mut app, sphere).set_axis(Vec2::new(1.0, 0.0));
        frame(&mut app);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        println!("PROOF: grounded velocity after one step = {:?}", velocity);
        assert!((velocity.x - 60.0 * dt()).abs() < EPSILON);
        assert!(velocity.y.abs() < EPSILON);
    }

    #[test]
    fn airborne_step_uses_air_acceleration() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_max_speed(5.0)
            .with_acceleration(60.0, 6.0);
        let sphere = spawn_sphere(&mut app, config);

        intent_mut(&mut app, sphere).set_axis(Vec2::new(0.0, 1.0));
        frame(&mut app);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        println!("PROOF: airborne velocity after one step = {:?}", velocity);
        assert!((velocity.z + 6.0 * dt()).abs() < EPSILON);
    }

    #[test]
    fn engine_velocity_is_adopted_each_step() {
        let mut app = create_test_app();
        let sphere = spawn_sphere(&mut app, MotionConfig::default());

        // Something else (gravity, a collision) changed the body between steps.
        app.world_mut().get_mut::<TestBody>(sphere).unwrap().velocity = Vec3::new(0.0, -4.0, 0.0);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        assert!((velocity.y + 4.0).abs() < EPSILON);
    }

    #[test]
    fn uphill_motion_follows_slope() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_max_speed(5.0)
            .with_acceleration(60.0, 6.0)
            .with_max_ground_angle_degrees(25.0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, slope(20.0));

        intent_mut(&mut app, sphere).set_axis(Vec2::new(1.0, 0.0));
        frame(&mut app);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        println!("PROOF: uphill velocity = {:?}", velocity);
        assert!(velocity.y > 0.0);
        assert!((velocity.length() - 60.0 * dt()).abs() < EPSILON);
    }

    #[test]
    fn steep_slope_is_treated_as_air() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_max_speed(5.0)
            .with_acceleration(60.0, 6.0)
            .with_max_ground_angle_degrees(25.0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, slope(30.0));

        intent_mut(&mut app, sphere).set_axis(Vec2::new(1.0, 0.0));
        frame(&mut app);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        assert!((velocity.x - 6.0 * dt()).abs() < EPSILON);
        assert!(app.world().get::<Airborne>(sphere).is_some());
    }

    #[test]
    fn reaches_max_speed_and_holds() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_max_speed(3.0)
            .with_acceleration(30.0, 30.0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, flat_ground());

        intent_mut(&mut app, sphere).set_axis(Vec2::new(1.0, 0.0));
        frame(&mut app);
        for _ in 0..30 {
            step(&mut app);
        }

        let velocity = body_velocity(&app, sphere);
        assert!((velocity.x - 3.0).abs() < EPSILON);
    }
}

// ==================== Jump Tests ====================

mod jumping {
    use super::*;

    #[test]
    fn ground_jump_launches_along_normal() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump(2.0, 0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, flat_ground());

        intent_mut(&mut app, sphere).set_jump_pressed(true);
        frame(&mut app);
        step(&mut app);

        let velocity = body_velocity(&app, sphere);
        let expected = (2.0 * 9.81 * 2.0_f32).sqrt();
        println!("PROOF: jump velocity = {:?}, expected y = {}", velocity, expected);
        assert!((velocity.y - expected).abs() < EPSILON);
        assert_eq!(controller(&app, sphere).jump_phase(), 1);
    }

    #[test]
    fn press_between_steps_is_not_lost() {
        let mut app = create_test_app();
        let sphere = spawn_sphere(&mut app, MotionConfig::default());
        set_contacts(&mut app, sphere, flat_ground());

        // Pressed and released within frames that run no fixed step.
        intent_mut(&mut app, sphere).set_jump_pressed(true);
        frame(&mut app);
        intent_mut(&mut app, sphere).set_jump_pressed(false);
        frame(&mut app);
        frame(&mut app);

        assert!(controller(&app, sphere).desired_jump());
        step(&mut app);

        assert!(body_velocity(&app, sphere).y > 0.0);
        assert!(!controller(&app, sphere).desired_jump());
    }

    #[test]
    fn held_button_jumps_once() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump(1.0, 5);
        let sphere = spawn_sphere(&mut app, config);

        intent_mut(&mut app, sphere).set_jump_pressed(true);
        for _ in 0..4 {
            frame(&mut app);
            step(&mut app);
        }

        assert_eq!(controller(&app, sphere).jump_phase(), 1);
    }

    #[test]
    fn air_jump_budget_is_enforced() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump(1.0, 1);
        let sphere = spawn_sphere(&mut app, config);

        for _ in 0..3 {
            intent_mut(&mut app, sphere).request_jump();
            frame(&mut app);
            step(&mut app);
        }

        assert_eq!(controller(&app, sphere).jump_phase(), 1);
        assert!(!controller(&app, sphere).desired_jump());
    }

    #[test]
    fn landing_restores_budget() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump(1.0, 1);
        let sphere = spawn_sphere(&mut app, config);

        intent_mut(&mut app, sphere).request_jump();
        frame(&mut app);
        step(&mut app);
        assert_eq!(controller(&app, sphere).jump_phase(), 1);

        set_contacts(&mut app, sphere, flat_ground());
        step(&mut app);
        assert_eq!(controller(&app, sphere).jump_phase(), 0);
    }
}

// ==================== State Tests ====================

mod state {
    use super::*;

    #[test]
    fn markers_follow_ground_state() {
        let mut app = create_test_app();
        let sphere = spawn_sphere(&mut app, MotionConfig::default());

        step(&mut app);
        assert!(app.world().get::<Airborne>(sphere).is_some());
        assert!(app.world().get::<Grounded>(sphere).is_none());

        set_contacts(&mut app, sphere, flat_ground());
        step(&mut app);
        println!(
            "PROOF: grounded_last_step={}",
            controller(&app, sphere).grounded_last_step()
        );
        assert!(app.world().get::<Grounded>(sphere).is_some());
        assert!(app.world().get::<Airborne>(sphere).is_none());

        set_contacts(&mut app, sphere, Vec::new());
        step(&mut app);
        assert!(app.world().get::<Airborne>(sphere).is_some());
        assert!(app.world().get::<Grounded>(sphere).is_none());
    }

    #[test]
    fn contact_state_is_cleared_after_step() {
        let mut app = create_test_app();
        let sphere = spawn_sphere(&mut app, MotionConfig::default());
        set_contacts(&mut app, sphere, flat_ground());

        step(&mut app);

        let controller = controller(&app, sphere);
        assert!(!controller.on_ground());
        assert_eq!(controller.contact_normal(), Vec3::ZERO);
        assert_eq!(controller.ground_contact_count(), 0);
        assert!(controller.grounded_last_step());
    }

    #[test]
    fn edited_ground_angle_takes_effect_next_step() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_ground_angle_degrees(25.0);
        let sphere = spawn_sphere(&mut app, config);
        set_contacts(&mut app, sphere, slope(30.0));

        step(&mut app);
        assert!(!controller(&app, sphere).grounded_last_step());

        // Direct field write, as an inspector would do it.
        app.world_mut()
            .get_mut::<MotionConfig>(sphere)
            .unwrap()
            .max_ground_angle = 40.0_f32.to_radians();
        step(&mut app);

        let config = app.world().get::<MotionConfig>(sphere).unwrap();
        assert!(!config.ground_threshold_is_stale());
        assert!(controller(&app, sphere).grounded_last_step());
    }

    #[test]
    fn controller_without_config_is_left_alone() {
        let mut app = create_test_app();
        let sphere = app
            .world_mut()
            .spawn((
                MotionController::new(),
                TestBody {
                    velocity: Vec3::new(1.0, 2.0, 3.0),
                },
            ))
            .id();

        step(&mut app);

        assert_eq!(body_velocity(&app, sphere), Vec3::new(1.0, 2.0, 3.0));
    }
}
