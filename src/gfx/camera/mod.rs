pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::{CameraController, DragMode};
pub use camera_utils::{Camera, CameraManager};
pub use orbit_camera::OrbitCamera;
