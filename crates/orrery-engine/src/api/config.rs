use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;

/// Engine configuration, provided by the system definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    /// Simulated tick units per second of clock time (default: 60).
    /// Rates in the body registry are radians per tick unit.
    pub ticks_per_second: f64,
    /// Segments per orbit-path guide (default: 64).
    pub orbit_segments: usize,
    /// Name of the body that receives `ring` at registry build time.
    pub ringed_body: Option<String>,
    /// Ring attached to `ringed_body`, in multiples of the body's visual radius.
    pub ring: RingConfig,
    /// Gap between a body's surface and its label (world units).
    pub label_offset: f64,
    /// Stroke width of orbit guides (world units).
    pub orbit_guide_width: f32,
    /// Sky texture drawn behind the scene.
    pub background_asset: String,
    /// Maximum object instances in one frame (default: 64).
    pub max_objects: usize,
    /// Maximum orbit-guide vertices (default: 16384).
    pub max_guide_vertices: usize,
    pub camera: CameraConfig,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60.0,
            orbit_segments: 64,
            ringed_body: Some("Saturn".to_string()),
            ring: RingConfig::default(),
            label_offset: 2.0,
            orbit_guide_width: 0.3,
            background_asset: "stars-background".to_string(),
            max_objects: 64,
            max_guide_vertices: 16384,
            camera: CameraConfig::default(),
        }
    }
}

impl OrreryConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return Err(invalid("ticks_per_second", "must be finite and > 0"));
        }
        if self.orbit_segments < 3 {
            return Err(invalid("orbit_segments", "an orbit path needs at least 3 segments"));
        }
        if !(self.label_offset.is_finite() && self.label_offset >= 0.0) {
            return Err(invalid("label_offset", "must be finite and >= 0"));
        }
        if self.max_objects == 0 {
            return Err(invalid("max_objects", "must be > 0"));
        }
        self.camera.validate()
    }
}

/// Ring proportions for the default name-matched ring attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub inner_scale: f64,
    pub outer_scale: f64,
    /// Tilt about the body's X axis, radians. The ring otherwise lies in
    /// the body's equatorial (local XZ) plane.
    pub tilt: f64,
    pub asset: String,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            inner_scale: 1.25,
            outer_scale: 2.0,
            tilt: 0.47,
            asset: "ring".to_string(),
        }
    }
}

/// Orbit-camera defaults and input sensitivities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the remaining distance to the target covered per tick.
    pub damping_factor: f32,
    /// Maximum polar angle from the +Y axis, radians. PI/2 keeps the
    /// camera on or above the orbital plane.
    pub polar_angle_limit: f32,
    pub distance: f32,
    pub azimuth: f32,
    pub polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per zoom unit.
    pub zoom_speed: f32,
    /// World units per pixel of pan, per unit of distance.
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 2000.0,
            damping_factor: 0.05,
            polar_angle_limit: std::f32::consts::FRAC_PI_2,
            distance: 220.0,
            azimuth: -0.6,
            polar: 1.0,
            min_distance: 20.0,
            max_distance: 800.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(invalid("camera.damping_factor", "must be in (0, 1]"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(invalid("camera.near/far", "need 0 < near < far"));
        }
        if !(self.polar_angle_limit >= 0.0 && self.polar_angle_limit <= std::f32::consts::PI) {
            return Err(invalid("camera.polar_angle_limit", "must be in [0, PI]"));
        }
        if !(self.min_distance > 0.0 && self.max_distance >= self.min_distance) {
            return Err(invalid("camera.min/max_distance", "need 0 < min <= max"));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(invalid("camera.fov_y_degrees", "must be in (0, 180)"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        field,
        reason: reason.to_string(),
    }
}
