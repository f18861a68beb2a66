//! # Graphics Module
//!
//! Everything the viewer knows about 3D space: the camera, the scene graph,
//! procedural geometry and ray-cast picking. Drawing itself sits behind the
//! [`render::Renderer`] seam.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with mouse controls
//! - **Scene Management** ([`scene`]) - Node hierarchy and the selectable registry
//! - **Geometry** ([`geometry`]) - Procedural cube, sphere and plane
//! - **Picking** ([`picking`]) - Screen-to-world rays and hit testing
//! - **Rendering** ([`render`]) - Renderer trait and a headless implementation

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod render;
pub mod scene;

// Re-export commonly used types
pub use camera::OrbitCamera;
pub use picking::{ObjectPicker, PickResult};
pub use render::{HeadlessRenderer, Renderer};
