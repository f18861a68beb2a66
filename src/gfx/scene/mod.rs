//! # Scene Management Module
//!
//! The scene graph the viewer picks from and deforms: nodes that own their
//! children, meshes carrying a deformable [`GeometryBuffer`], and the registry
//! of top-level nodes that may be selected.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns all nodes, the selectable registry and the camera
//! - [`SceneNode`] - A node with a local transform, optional mesh and children
//! - [`Mesh`] - Geometry plus the scale its last deformation reached
//! - [`NodeId`] - Identity used for selection and deformation bookkeeping
//! - [`Vertex3D`] - Vertex layout handed to the renderer
//!
//! [`GeometryBuffer`]: crate::deform::GeometryBuffer

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{Mesh, NodeId, SceneNode};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
