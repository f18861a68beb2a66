//! # Procedural Geometry Generation
//!
//! This module provides functions to generate the shapes the viewer builds
//! its default scene from, without needing external model files.
//!
//! ## Supported Primitives
//!
//! - **Cube**: Unit cube with per-face normals
//! - **Sphere**: UV sphere with configurable radius and resolution
//! - **Plane**: Flat ground plane lying in XZ
//!
//! ## Usage
//!
//! ```rust
//! use axisview::gfx::geometry::{generate_cube, generate_plane, generate_sphere};
//!
//! let cube_data = generate_cube();
//! let sphere_data = generate_sphere(0.5, 16, 16);
//! let ground = generate_plane(5.0, 5.0, 1, 1);
//! assert_eq!(ground.triangle_count(), 2);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::deform::GeometryBuffer;

/// Generated geometry, not yet wrapped in a mesh
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flatten into the buffer type meshes deform and render from
    pub fn into_geometry_buffer(self) -> GeometryBuffer {
        let positions = self.vertices.into_iter().flatten().collect();
        let normals = self.normals.into_iter().flatten().collect();
        GeometryBuffer::new(positions, normals, self.indices)
    }
}
