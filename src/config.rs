//! Controller configuration.
//!
//! [`MotionConfig`] is the configuration surface of a controlled sphere:
//! speed and acceleration budgets, jump tuning and the ground slope limit.
//! The slope limit is cached as a cosine so contact classification is a
//! single dot product.

use bevy::prelude::*;

/// Tuning for a [`MotionController`](crate::controller::MotionController).
///
/// Set once or rarely, never during a step. Whenever `max_ground_angle`
/// changes the cached ground threshold must be refreshed; the builders and
/// setters do it immediately and the
/// [`refresh_ground_thresholds`](crate::systems::refresh_ground_thresholds)
/// system catches edits made through change detection (inspectors,
/// reflection, direct field writes).
///
/// Valid values are non-negative speeds, accelerations and jump height, and
/// a ground angle between 0 and 90 degrees. Other values are not rejected,
/// the resulting motion is just unspecified.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct MotionConfig {
    // === Movement Settings ===
    /// Speed reached at full input deflection (units/second).
    pub max_speed: f32,

    /// Velocity change budget while grounded (units/second^2).
    pub max_acceleration: f32,

    /// Velocity change budget while airborne (units/second^2).
    pub max_air_acceleration: f32,

    // === Jump Settings ===
    /// Height a jump from rest reaches (units).
    pub jump_height: f32,

    /// Extra jumps allowed before touching ground again.
    pub max_air_jumps: u32,

    // === Slope Settings ===
    /// Steepest surface still treated as ground (radians).
    pub max_ground_angle: f32,

    /// `cos(max_ground_angle)`. Cached, see [`MotionConfig::refresh_ground_threshold`].
    #[cfg_attr(feature = "serialize", serde(skip))]
    min_ground_dot_product: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new(10.0, 10.0, 1.0, 2.0, 0, 25.0_f32.to_radians())
    }
}

impl MotionConfig {
    /// Create a config from explicit values.
    pub fn new(
        max_speed: f32,
        max_acceleration: f32,
        max_air_acceleration: f32,
        jump_height: f32,
        max_air_jumps: u32,
        max_ground_angle: f32,
    ) -> Self {
        Self {
            max_speed,
            max_acceleration,
            max_air_acceleration,
            jump_height,
            max_air_jumps,
            max_ground_angle,
            min_ground_dot_product: max_ground_angle.cos(),
        }
    }

    /// A nimble sphere: quicker turns, real air control and a double jump.
    pub fn agile() -> Self {
        Self {
            max_acceleration: 30.0,
            max_air_acceleration: 10.0,
            max_air_jumps: 2,
            ..default()
        }
        .refreshed()
    }

    /// A sluggish sphere that hardly steers in the air and climbs less.
    pub fn heavy() -> Self {
        Self {
            max_speed: 6.0,
            max_acceleration: 5.0,
            max_air_acceleration: 0.5,
            jump_height: 1.0,
            ..default()
        }
        .with_max_ground_angle_degrees(15.0)
    }

    /// Cosine of the steepest walkable slope.
    ///
    /// A contact normal whose dot product with world up is at least this
    /// value counts as ground.
    #[inline]
    pub fn min_ground_dot_product(&self) -> f32 {
        self.min_ground_dot_product
    }

    /// Recompute the cached ground threshold from `max_ground_angle`.
    ///
    /// Returns `true` if the cached value changed.
    pub fn refresh_ground_threshold(&mut self) -> bool {
        let threshold = self.max_ground_angle.cos();
        if threshold == self.min_ground_dot_product {
            return false;
        }
        self.min_ground_dot_product = threshold;
        true
    }

    /// Whether the cached threshold is out of date.
    pub fn ground_threshold_is_stale(&self) -> bool {
        self.max_ground_angle.cos() != self.min_ground_dot_product
    }

    /// Set the ground angle (radians) and refresh the threshold.
    pub fn set_max_ground_angle(&mut self, angle: f32) {
        self.max_ground_angle = angle;
        self.refresh_ground_threshold();
    }

    /// Acceleration budget for the given support state.
    #[inline]
    pub fn acceleration(&self, on_ground: bool) -> f32 {
        if on_ground {
            self.max_acceleration
        } else {
            self.max_air_acceleration
        }
    }

    fn refreshed(mut self) -> Self {
        self.refresh_ground_threshold();
        self
    }

    /// Builder: set max speed.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Builder: set ground and air acceleration.
    pub fn with_acceleration(mut self, ground: f32, air: f32) -> Self {
        self.max_acceleration = ground;
        self.max_air_acceleration = air;
        self
    }

    /// Builder: set jump height and air jump budget.
    pub fn with_jump(mut self, height: f32, air_jumps: u32) -> Self {
        self.jump_height = height;
        self.max_air_jumps = air_jumps;
        self
    }

    /// Builder: set the ground angle in radians.
    pub fn with_max_ground_angle(mut self, angle: f32) -> Self {
        self.set_max_ground_angle(angle);
        self
    }

    /// Builder: set the ground angle in degrees.
    pub fn with_max_ground_angle_degrees(self, degrees: f32) -> Self {
        self.with_max_ground_angle(degrees.to_radians())
    }
}

#[cfg(feature = "serialize")]
pub use self::loading::{load_motion_config, ConfigLoadError};

#[cfg(feature = "serialize")]
mod loading {
    use std::fs;
    use std::path::Path;

    use super::MotionConfig;

    /// Error raised when a config cannot be read or parsed.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ConfigLoadError {
        /// File path or other label for where the config came from.
        pub source_name: String,
        /// What went wrong, prefixed with the failing stage (IO or parse).
        pub message: String,
    }

    impl std::fmt::Display for ConfigLoadError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Failed to load {}: {}", self.source_name, self.message)
        }
    }

    impl std::error::Error for ConfigLoadError {}

    impl MotionConfig {
        /// Parse a config from RON. Missing fields keep their defaults.
        ///
        /// ```
        /// # use sphere_motion_controller::config::MotionConfig;
        /// let config = MotionConfig::from_ron_str("(max_speed: 4.0, max_air_jumps: 1)").unwrap();
        /// assert_eq!(config.max_speed, 4.0);
        /// assert_eq!(config.max_air_jumps, 1);
        /// ```
        pub fn from_ron_str(source: &str) -> Result<Self, ConfigLoadError> {
            parse(source, "<inline>")
        }
    }

    /// Load a config from a RON file.
    pub fn load_motion_config(path: impl AsRef<Path>) -> Result<MotionConfig, ConfigLoadError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| ConfigLoadError {
            source_name: source_name.clone(),
            message: format!("IO error: {}", e),
        })?;

        parse(&contents, &source_name)
    }

    fn parse(source: &str, source_name: &str) -> Result<MotionConfig, ConfigLoadError> {
        let mut config: MotionConfig = ron::from_str(source).map_err(|e| ConfigLoadError {
            source_name: source_name.to_string(),
            message: format!("Parse error: {}", e),
        })?;
        config.refresh_ground_threshold();
        Ok(config)
    }
}
