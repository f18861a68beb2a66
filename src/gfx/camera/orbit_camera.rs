//! An eye orbiting a target point on a sphere.
//!
//! Yaw and pitch place the eye on the sphere, `distance` is its radius. The
//! eye position is derived state and is refreshed whenever one of them moves.

use std::f32::consts::FRAC_PI_2;

use cgmath::{perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use super::camera_utils::Camera;
use crate::config::CameraConfig;

/// Pitch stops just short of the poles, where `look_at` loses its up vector
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,
    pub eye: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Allowed `distance` range, inclusive
    pub distance_range: (f32, f32),
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for OrbitCamera {
    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            yaw,
            target,
            eye: target,
            up: Vector3::unit_y(),
            distance_range: (f32::EPSILON, f32::MAX),
            aspect,
            fovy: Deg(45.0).into(),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.place_eye();
        camera
    }

    /// Build the camera described by the viewer configuration
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(
            config.distance,
            config.pitch,
            config.yaw,
            Vector3::from(config.target),
            aspect,
        );
        camera.fovy = Deg(config.fovy_degrees).into();
        camera.znear = config.znear;
        camera.zfar = config.zfar;
        camera.distance_range = (config.min_distance, config.max_distance);
        camera.set_distance(config.distance);
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        let (near, far) = self.distance_range;
        self.distance = distance.clamp(near, far);
        self.place_eye();
    }

    /// Move toward (negative) or away from (positive) the target by a
    /// fraction of the current distance
    pub fn zoom(&mut self, amount: f32) {
        self.set_distance(self.distance * (1.0 + amount));
    }

    /// Swing the eye around the target; pitch is clamped short of the poles
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.place_eye();
    }

    /// Slide eye and target together across the view plane.
    ///
    /// Offsets are in units of the current distance, so a drag covers the
    /// same share of the screen at any zoom level.
    pub fn pan(&mut self, right_amount: f32, up_amount: f32) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let view_up = right.cross(forward);

        let offset = (right * right_amount + view_up * up_amount) * self.distance;
        self.target += offset;
        self.eye += offset;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn place_eye(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vector3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);
        self.eye = self.target + offset * self.distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_eye_sits_on_orbit() {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        assert!((camera.eye - Vector3::new(0.0, 0.0, 5.0)).magnitude() < 1e-6);

        let mut turned = camera;
        turned.orbit(FRAC_PI_2, 0.0);
        assert!((turned.eye - Vector3::new(5.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_pitch_stops_short_of_the_pole() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        assert!(camera.eye.y < 5.0);
        camera.orbit(0.0, -20.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_distance_respects_configured_range() {
        let config = CameraConfig::default();
        let mut camera = OrbitCamera::from_config(&config, 1.5);
        camera.set_distance(100.0);
        assert_eq!(camera.distance, config.max_distance);
        camera.zoom(-0.99);
        camera.zoom(-0.99);
        assert_eq!(camera.distance, config.min_distance);
    }

    #[test]
    fn test_pan_keeps_view_direction() {
        let mut camera = OrbitCamera::new(4.0, 0.3, 0.2, Vector3::new(0.0, 1.0, 0.0), 1.0);
        let before = camera.eye - camera.target;
        camera.pan(0.25, -0.1);

        assert!((camera.eye - camera.target - before).magnitude() < 1e-5);
        assert!((camera.target - Vector3::new(0.0, 1.0, 0.0)).magnitude() > 0.5);
        assert_eq!(camera.distance, 4.0);
    }

    #[test]
    fn test_resize_ignores_zero_height() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.resize_projection(800, 0);
        assert_eq!(camera.aspect, 1.0);
        camera.resize_projection(800, 400);
        assert_eq!(camera.aspect, 2.0);
    }
}
