use winit::{
    event::{DeviceEvent, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Trackpads report pixels; this many count as one wheel notch
const PIXELS_PER_LINE: f32 = 20.0;

/// What moving the mouse currently does to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    None,
    Orbit,
    Pan,
}

/// Turns raw device input into orbit camera motion.
///
/// Left drag orbits the target, shift + left drag pans, the wheel zooms.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    button_down: bool,
    shift_down: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32, pan_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed,
            button_down: false,
            shift_down: false,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.rotate_speed, config.zoom_speed, config.pan_speed)
    }

    pub fn drag_mode(&self) -> DragMode {
        match (self.button_down, self.shift_down) {
            (false, _) => DragMode::None,
            (true, false) => DragMode::Orbit,
            (true, true) => DragMode::Pan,
        }
    }

    /// Apply `event` to `camera`, requesting a redraw when it moved
    pub fn process_events(&mut self, event: &DeviceEvent, window: &Window, camera: &mut OrbitCamera) {
        if self.apply(event, camera) {
            window.request_redraw();
        }
    }

    /// Apply `event` to `camera`; returns whether the camera moved
    pub fn apply(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::Button { button: 0, state } => {
                self.button_down = state.is_pressed();
                false
            }
            DeviceEvent::MouseWheel { delta } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => *lines,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                // Scrolling up moves closer
                camera.zoom(-notches * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta: (dx, dy) } => {
                let (dx, dy) = (*dx as f32, *dy as f32);
                match self.drag_mode() {
                    DragMode::None => false,
                    DragMode::Orbit => {
                        camera.orbit(-dx * self.rotate_speed, dy * self.rotate_speed);
                        true
                    }
                    DragMode::Pan => {
                        camera.pan(-dx * self.pan_speed, dy * self.pan_speed);
                        true
                    }
                }
            }
            _ => false,
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight) = event.physical_key {
            self.set_shift(event.state.is_pressed());
        }
    }

    fn set_shift(&mut self, down: bool) {
        if self.shift_down != down {
            log::trace!("Shift {}", if down { "held" } else { "released" });
        }
        self.shift_down = down;
    }
}
