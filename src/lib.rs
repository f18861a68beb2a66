// src/lib.rs
//! axisview
//!
//! An interactive 3D model viewer core: ray-cast object picking against a
//! registry of selectable objects, and reversible axis-stretch deformation
//! animated over time.

pub mod app;
pub mod config;
pub mod controller;
pub mod deform;
pub mod error;
pub mod events;
pub mod gfx;
pub mod importer;
pub mod selection;

// Re-export main types for convenience
pub use app::AxisviewApp;
pub use config::ViewerConfig;
pub use controller::{ImportOutcome, SceneController};
pub use error::{ConfigError, ImportError};
pub use events::ViewerIntent;

/// Creates a viewer application with the default configuration
pub fn default() -> AxisviewApp {
    AxisviewApp::new(ViewerConfig::default())
}
