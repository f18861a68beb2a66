//! Viewer configuration.
//!
//! Every section uses `#[serde(default)]`, so a TOML file only needs the keys
//! it wants to change.
//!
//! ```toml
//! [deform]
//! delta_scale = 0.5
//! duration_ms = 400
//!
//! [selection]
//! indicator_offset = 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::deform::Axis;
use crate::error::ConfigError;

/// Top-level configuration container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub deform: DeformConfig,
    pub selection: SelectionConfig,
    pub scene: SceneConfig,
}

impl ViewerConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "axisview".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Initial orbit camera and its control limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Fraction of the distance per wheel notch
    pub zoom_speed: f32,
    /// Fraction of the distance per pixel of shift-drag
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 3.0,
            pitch: 0.35,
            yaw: 0.0,
            target: [0.0, 1.0, 0.0],
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 100.0,
            min_distance: 2.0,
            max_distance: 10.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
        }
    }
}

/// What a single deform request does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformConfig {
    pub axis: Axis,
    /// Added to the mesh's current scale on every request
    pub delta_scale: f32,
    pub duration_ms: f64,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            delta_scale: 1.0,
            duration_ms: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Height of the indicator above the selected object's top face
    pub indicator_offset: f32,
    pub indicator_radius: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            indicator_offset: 0.2,
            indicator_radius: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub ground_size: f32,
    /// Lift newly added objects so their bounds rest on y = 0
    pub place_on_floor: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_size: 5.0,
            place_on_floor: true,
        }
    }
}
