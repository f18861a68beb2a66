//! # Object Picking System
//!
//! This module provides 3D object picking using mouse ray-casting. It lets
//! users click on objects in the scene to select them for deformation.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a 3D ray in world space
//! 2. **Broad phase**: Reject meshes whose world bounding sphere or box the ray misses
//! 3. **Narrow phase**: Test the ray against every triangle of the remaining meshes
//! 4. **Selection**: Return the closest struck mesh, descending into child nodes
//!
//! ## Usage
//!
//! ```no_run
//! use axisview::gfx::picking::ObjectPicker;
//! # fn demo(scene: &axisview::gfx::scene::Scene) {
//! let picker = ObjectPicker::new();
//! let camera = &scene.camera_manager.camera;
//! if let Some(hit) = picker.pick_object((400.0, 300.0), (800.0, 600.0), camera, scene) {
//!     println!("Selected mesh {} at distance {}", hit.object, hit.distance);
//! }
//! # }
//! ```

pub mod bounds;
pub mod ray;

pub use bounds::{BoundingSphere, AABB};
pub use ray::Ray;

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::Camera;
use crate::gfx::scene::{NodeId, Scene, SceneNode};

/// Result of an object picking operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// The mesh node the ray actually struck
    pub object: NodeId,
    /// The registered selectable object that mesh belongs to
    pub root: NodeId,
    /// Ray parameter of the intersection, smaller is closer
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Object picker for 3D mouse selection
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectPicker;

impl ObjectPicker {
    /// Create a new object picker
    pub fn new() -> Self {
        Self
    }

    /// Convert screen coordinates to a world-space ray.
    ///
    /// Returns `None` for an empty viewport or a degenerate camera.
    pub fn screen_to_ray<C: Camera>(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &C,
    ) -> Option<Ray> {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = screen_size;
        if screen_width <= 0.0 || screen_height <= 0.0 {
            return None;
        }

        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = mouse_x / screen_width * 2.0 - 1.0;
        let ndc_y = -(mouse_y / screen_height) * 2.0 + 1.0; // Flip Y axis

        let inv_view_proj = camera.build_view_projection_matrix().invert()?;

        let near_3d = unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, -1.0, 1.0));
        let far_3d = unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, 1.0, 1.0));

        Some(Ray::new(near_3d, far_3d - near_3d))
    }

    /// Pick the nearest registered object under the mouse
    pub fn pick_object<C: Camera>(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &C,
        scene: &Scene,
    ) -> Option<PickResult> {
        let ray = self.screen_to_ray(screen_pos, screen_size, camera)?;
        scene.intersect(&ray).into_iter().next()
    }
}

fn unproject(inv_view_proj: &Matrix4<f32>, ndc: Vector4<f32>) -> Vector3<f32> {
    let world = inv_view_proj * ndc;
    Vector3::new(world.x / world.w, world.y / world.w, world.z / world.w)
}

/// Collect one intersection per struck mesh in `node`'s subtree.
///
/// `root` is the selectable object the subtree was registered under.
pub fn intersect_node(
    node: &SceneNode,
    root: NodeId,
    parent: &Matrix4<f32>,
    ray: &Ray,
    hits: &mut Vec<PickResult>,
) {
    node.visit_meshes(parent, &mut |mesh_node, mesh, world| {
        let geometry = &mesh.geometry;
        let (Some(sphere), Some(local_box)) = (geometry.bounding_sphere(), geometry.bounding_box())
        else {
            // No positions, nothing to hit
            return;
        };
        if !sphere.transform(world).intersects_ray(ray) {
            return;
        }
        if local_box.transform(world).intersect_ray(ray).is_none() {
            return;
        }

        let nearest = geometry
            .triangles()
            .filter_map(|[a, b, c]| {
                let corner = |p: [f32; 3]| Vector3::from(bounds::transform_point(world, p));
                ray.intersect_triangle(corner(a), corner(b), corner(c))
            })
            .min_by(f32::total_cmp);

        if let Some(distance) = nearest {
            hits.push(PickResult {
                object: mesh_node.id(),
                root,
                distance,
                intersection_point: ray.point_at(distance),
            });
        }
    });
}

/// Intersect `ray` with each candidate subtree, nearest first.
///
/// Ties keep candidate order, so identical inputs give identical results.
pub fn intersect_objects<'a, I>(candidates: I, ray: &Ray) -> Vec<PickResult>
where
    I: IntoIterator<Item = &'a SceneNode>,
{
    let mut hits = Vec::new();
    for candidate in candidates {
        intersect_node(candidate, candidate.id(), &Matrix4::identity(), ray, &mut hits);
    }
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}
