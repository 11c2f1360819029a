use std::f32::consts::FRAC_PI_2;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::api::config::CameraConfig;

/// Size of the host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Drawing buffer size in device pixels.
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).round() as u32,
            (self.height * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Zero, negative and non-finite sizes cannot be drawn to.
    pub fn is_drawable(&self) -> bool {
        [self.width, self.height, self.device_pixel_ratio]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

/// Rendered camera. Written only by `CameraController::tick_damp` and
/// `CameraController::on_resize` (aspect).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub orientation: Quat,
    pub target: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub damping_factor: f32,
    pub polar_angle_limit: f32,
}

impl CameraState {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (w = 1), for lighting.
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub const FLOATS: usize = 20;
}

/// Orbit coordinates around a target point. Polar is measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    azimuth: f32,
    polar: f32,
    distance: f32,
    target: Vec3,
}

impl Spherical {
    fn from_config(config: &CameraConfig) -> Self {
        Self {
            azimuth: config.azimuth,
            polar: config.polar,
            distance: config.distance,
            target: Vec3::ZERO,
        }
    }

    /// Camera looks down its local -Z; local +Z points from target to eye.
    fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.azimuth) * Quat::from_rotation_x(self.polar - FRAC_PI_2)
    }

    fn eye(&self) -> Vec3 {
        self.target + self.orientation() * Vec3::Z * self.distance
    }
}

/// Orbit-style camera with damped motion.
///
/// Input handlers write the goal only. `tick_damp` moves the current
/// coordinates toward the goal and is the only writer of the rendered
/// position and orientation.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    current: Spherical,
    goal: Spherical,
    state: CameraState,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
}

impl CameraController {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        let mut start = Spherical::from_config(config);
        start.polar = start.polar.clamp(0.0, config.polar_angle_limit);
        start.distance = start.distance.clamp(config.min_distance, config.max_distance);
        let state = CameraState {
            position: start.eye(),
            orientation: start.orientation(),
            target: start.target,
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect: viewport.aspect(),
            damping_factor: config.damping_factor,
            polar_angle_limit: config.polar_angle_limit,
        };
        Self {
            config: config.clone(),
            current: start,
            goal: start,
            state,
            viewport,
            pending_resize: None,
        }
    }

    /// Rotate the goal around the target by a pointer delta.
    pub fn on_drag_input(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.goal.azimuth -= dx * self.config.rotate_speed;
        self.goal.polar = (self.goal.polar - dy * self.config.rotate_speed)
            .clamp(0.0, self.config.polar_angle_limit);
    }

    /// Scale the goal distance. Positive deltas move away from the target.
    pub fn on_zoom_input(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        let factor = (1.0 + delta * self.config.zoom_speed).max(0.0);
        self.goal.distance = (self.goal.distance * factor)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Slide the goal target in the view plane.
    pub fn on_pan_input(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        // Scale pan speed by distance for consistent feel
        let scale = self.goal.distance * self.config.pan_speed;
        let orientation = self.goal.orientation();
        let right = orientation * Vec3::X;
        let up = orientation * Vec3::Y;
        self.goal.target += (up * dy - right * dx) * scale;
    }

    /// Record a new surface size. Position and orientation are untouched.
    pub fn on_resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        let viewport = Viewport::new(width, height, device_pixel_ratio);
        if !viewport.is_drawable() {
            log::warn!("ignoring resize to {width}x{height} @{device_pixel_ratio}");
            return;
        }
        if viewport == self.viewport {
            return;
        }
        log::debug!("viewport resized to {width}x{height} @{device_pixel_ratio}");
        self.viewport = viewport;
        self.state.aspect = viewport.aspect();
        self.pending_resize = Some(viewport);
    }

    /// Hand the latest unapplied resize to the caller, once.
    pub fn take_resize(&mut self) -> Option<Viewport> {
        self.pending_resize.take()
    }

    /// Restore the configured view as the goal; motion stays damped.
    pub fn reset_view(&mut self) {
        let mut home = Spherical::from_config(&self.config);
        home.polar = home.polar.clamp(0.0, self.config.polar_angle_limit);
        home.distance = home.distance.clamp(self.config.min_distance, self.config.max_distance);
        self.goal = home;
    }

    /// Advance one tick of damped motion and recompute the rendered state.
    pub fn tick_damp(&mut self) {
        let k = self.config.damping_factor;
        let c = &mut self.current;
        let g = &self.goal;
        c.azimuth += (g.azimuth - c.azimuth) * k;
        c.polar += (g.polar - c.polar) * k;
        c.distance += (g.distance - c.distance) * k;
        c.target += (g.target - c.target) * k;

        c.polar = c.polar.clamp(0.0, self.config.polar_angle_limit);
        c.distance = c.distance.clamp(self.config.min_distance, self.config.max_distance);

        self.state.position = c.eye();
        self.state.orientation = c.orientation();
        self.state.target = c.target;
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current polar angle (from +Y), radians.
    pub fn polar(&self) -> f32 {
        self.current.polar
    }

    pub fn distance(&self) -> f32 {
        self.current.distance
    }

    pub fn uniform(&self) -> CameraUniform {
        let p = self.state.position;
        CameraUniform {
            view_proj: self.state.view_projection().to_cols_array_2d(),
            eye: [p.x, p.y, p.z, 1.0],
        }
    }
}
