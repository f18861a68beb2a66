//! # Vertex Data Structures
//!
//! This module defines the vertex layout stored in every mesh's live vertex
//! buffer. The layout is plain old data so the buffer can be handed to a
//! renderer as raw bytes whenever it is marked dirty.

/// A 3D vertex with position and normal data.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required to cast the buffer into bytes for upload.
///
/// # Examples
///
/// ```no_run
/// use axisview::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0]);
/// assert_eq!(vertex.position[1], 1.0);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Size of one vertex in bytes, as seen by the renderer
    pub const STRIDE: usize = std::mem::size_of::<Vertex3D>();

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}
