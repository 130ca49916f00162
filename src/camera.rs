use macroquad::prelude::*;

use crate::config;

/// Orbit camera around the tree. Left-drag orbits; zoom and pan are disabled and
/// the camera never dips below the ground plane.
pub struct OrbitCamera {
    pub target: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
    pub smooth_azimuth: f32,
    pub smooth_polar: f32,
    is_dragging: bool,
    drag_start: Vec2,
    drag_angles_start: Vec2,
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);
        Self {
            target,
            radius,
            azimuth,
            polar,
            smooth_azimuth: azimuth,
            smooth_polar: polar,
            is_dragging: false,
            drag_start: Vec2::ZERO,
            drag_angles_start: Vec2::ZERO,
        }
    }

    pub fn scene_default() -> Self {
        Self::new(Vec3::from_array(config::CAMERA_POSITION), Vec3::ZERO)
    }

    /// Read mouse input and ease toward the requested angles. Skipped while
    /// `pointer_captured` (the UI owns the mouse).
    pub fn update(&mut self, dt: f32, pointer_captured: bool) {
        if !pointer_captured && is_mouse_button_pressed(MouseButton::Left) {
            self.is_dragging = true;
            self.drag_start = Vec2::from(mouse_position());
            self.drag_angles_start = vec2(self.azimuth, self.polar);
        }
        if is_mouse_button_released(MouseButton::Left) {
            self.is_dragging = false;
        }
        if self.is_dragging {
            let delta = Vec2::from(mouse_position()) - self.drag_start;
            self.set_angles(self.drag_angles_start, delta);
        }

        self.smooth(dt);
    }

    /// Angles after dragging `delta` pixels from `start` (azimuth, polar).
    fn set_angles(&mut self, start: Vec2, delta: Vec2) {
        self.azimuth = start.x - delta.x * config::CAMERA_ORBIT_SPEED;
        self.polar = (start.y - delta.y * config::CAMERA_ORBIT_SPEED)
            .clamp(0.01, config::CAMERA_MAX_POLAR);
    }

    fn smooth(&mut self, dt: f32) {
        let smooth = 1.0 - (-config::CAMERA_SMOOTH_SPEED * dt).exp();
        self.smooth_azimuth += (self.azimuth - self.smooth_azimuth) * smooth;
        self.smooth_polar += (self.polar - self.smooth_polar) * smooth;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.smooth_polar.sin_cos();
        let (sin_a, cos_a) = self.smooth_azimuth.sin_cos();
        self.target + vec3(sin_p * sin_a, cos_p, sin_p * cos_a) * self.radius
    }

    pub fn to_macroquad_camera(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            target: self.target,
            up: Vec3::Y,
            fovy: config::CAMERA_FOV_DEGREES.to_radians(),
            ..Default::default()
        }
    }

    /// Project a world position to screen pixels; `None` when behind the camera.
    pub fn world_to_screen(&self, world: Vec3, screen: Vec2) -> Option<Vec2> {
        let clip = self.to_macroquad_camera().matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(vec2(
            (ndc.x + 1.0) * 0.5 * screen.x,
            (1.0 - ndc.y) * 0.5 * screen.y,
        ))
    }
}
