//! # Geometry Buffer
//!
//! Owns a mesh's live vertex buffer together with the pristine snapshot that
//! every axis-scale deformation is computed from.
//!
//! The snapshot is taken lazily, on the first deformation, and is never
//! overwritten afterwards. Because each call recomputes from the snapshot
//! instead of the already deformed buffer, applying the same scale twice gives
//! the same result and errors never compound. A scale of `1.0` copies the
//! snapshot back verbatim.

use serde::{Deserialize, Serialize};

use crate::gfx::picking::{BoundingSphere, AABB};
use crate::gfx::scene::vertex::Vertex3D;

/// Coordinate axis a deformation stretches along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis inside a `[f32; 3]`
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Vertex buffer of one mesh plus its pristine backup and derived bounds
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    pristine: Option<Vec<[f32; 3]>>,
    bounding_box: Option<AABB>,
    bounding_sphere: Option<BoundingSphere>,
    dirty: bool,
}

impl GeometryBuffer {
    /// Build a buffer from flat position/normal arrays (three floats per vertex).
    ///
    /// Missing normals are filled with `+Y`. Bounds are computed immediately.
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .enumerate()
            .map(|(i, p)| {
                let normal = normals
                    .get(i * 3..i * 3 + 3)
                    .map(|n| [n[0], n[1], n[2]])
                    .unwrap_or([0.0, 1.0, 0.0]);
                Vertex3D::new([p[0], p[1], p[2]], normal)
            })
            .collect();
        Self::from_vertices(vertices, indices)
    }

    pub fn from_vertices(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let mut buffer = Self {
            vertices,
            indices,
            pristine: None,
            bounding_box: None,
            bounding_sphere: None,
            dirty: true,
        };
        buffer.compute_bounding_box();
        buffer.compute_bounding_sphere();
        buffer
    }

    /// Stretch the live buffer along `axis`, anchored at the pristine minimum.
    ///
    /// Every vertex coordinate on `axis` becomes
    /// `(pristine - axis_min) * scale_factor + axis_min`; the other two
    /// coordinates are left alone. Returns `false` without touching anything
    /// when the buffer has no positions.
    pub fn apply_axis_scale(&mut self, axis: Axis, scale_factor: f32) -> bool {
        if self.vertices.is_empty() {
            return false;
        }

        let vertices = &self.vertices;
        let pristine = self
            .pristine
            .get_or_insert_with(|| vertices.iter().map(|v| v.position).collect());

        let component = axis.index();
        if scale_factor == 1.0 {
            for (vertex, original) in self.vertices.iter_mut().zip(pristine.iter()) {
                vertex.position[component] = original[component];
            }
        } else {
            let axis_min = pristine
                .iter()
                .map(|p| p[component])
                .fold(f32::INFINITY, f32::min);
            for (vertex, original) in self.vertices.iter_mut().zip(pristine.iter()) {
                vertex.position[component] =
                    (original[component] - axis_min) * scale_factor + axis_min;
            }
        }

        self.dirty = true;
        self.compute_bounding_box();
        self.compute_bounding_sphere();
        true
    }

    /// Recompute the local-space bounding box from the live positions
    pub fn compute_bounding_box(&mut self) {
        self.bounding_box = AABB::from_vertices(self.vertices.iter().map(|v| &v.position));
    }

    /// Recompute the bounding sphere; needs an up to date bounding box
    pub fn compute_bounding_sphere(&mut self) {
        self.bounding_sphere = self.bounding_box.map(|bounds| {
            BoundingSphere::from_vertices(&bounds, self.vertices.iter().map(|v| &v.position))
        });
    }

    pub fn bounding_box(&self) -> Option<AABB> {
        self.bounding_box
    }

    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bounding_sphere
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn has_positions(&self) -> bool {
        !self.vertices.is_empty()
    }

    /// The snapshot taken before the first deformation, if any
    pub fn pristine_positions(&self) -> Option<&[[f32; 3]]> {
        self.pristine.as_deref()
    }

    /// Triangles in local space; unindexed buffers are read as consecutive triples
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        let indexed = !self.indices.is_empty();
        let count = if indexed {
            self.indices.len() / 3
        } else {
            self.vertices.len() / 3
        };

        (0..count).filter_map(move |tri| {
            let corner = |k: usize| -> Option<[f32; 3]> {
                let index = if indexed {
                    self.indices[tri * 3 + k] as usize
                } else {
                    tri * 3 + k
                };
                self.vertices.get(index).map(|v| v.position)
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles().count()
    }

    /// True when the buffer changed since the renderer last uploaded it
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Raw vertex bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Smooth per-vertex normals for position data that ships without any
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; vertex_count * 3];
        let position = |i: usize| {
            cgmath::Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0.max(i1).max(i2) >= vertex_count {
                continue;
            }

            let edge1 = position(i1) - position(i0);
            let edge2 = position(i2) - position(i0);
            let face_normal = edge1.cross(edge2);

            for vertex_idx in [i0, i1, i2] {
                normals[vertex_idx * 3] += face_normal.x;
                normals[vertex_idx * 3 + 1] += face_normal.y;
                normals[vertex_idx * 3 + 2] += face_normal.z;
            }
        }

        for normal in normals.chunks_exact_mut(3) {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|n| *n /= length);
            }
        }

        normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// 8 corners of a unit cube centered at the origin
    fn unit_cube() -> GeometryBuffer {
        let mut positions = Vec::new();
        for x in [-0.5f32, 0.5] {
            for y in [-0.5f32, 0.5] {
                for z in [-0.5f32, 0.5] {
                    positions.extend_from_slice(&[x, y, z]);
                }
            }
        }
        GeometryBuffer::new(positions, Vec::new(), Vec::new())
    }

    /// Irregular positions so floating point rounding actually shows up
    fn random_buffer(rng: &mut StdRng, count: usize) -> GeometryBuffer {
        let positions = (0..count * 3).map(|_| rng.random_range(-10.0f32..10.0)).collect();
        GeometryBuffer::new(positions, Vec::new(), Vec::new())
    }

    fn positions(buffer: &GeometryBuffer) -> Vec<[f32; 3]> {
        buffer.vertices().iter().map(|v| v.position).collect()
    }

    #[test]
    fn test_unit_cube_stretch_keeps_min_face_fixed() {
        let mut cube = unit_cube();
        assert!(cube.apply_axis_scale(Axis::X, 2.0));

        for (vertex, original) in cube.vertices().iter().zip(cube.pristine_positions().unwrap()) {
            let expected_x = (original[0] + 0.5) * 2.0 - 0.5;
            assert_eq!(vertex.position[0], expected_x);
            assert_eq!(vertex.position[1], original[1]);
            assert_eq!(vertex.position[2], original[2]);
            if original[0] == 0.5 {
                assert_eq!(vertex.position[0], 1.5);
            } else {
                assert_eq!(vertex.position[0], -0.5);
            }
        }

        let bounds = cube.bounding_box().unwrap();
        assert_eq!(bounds.min.x, -0.5);
        assert_eq!(bounds.max.x, 1.5);
    }

    #[test]
    fn test_scale_one_restores_pristine_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let mut buffer = random_buffer(&mut rng, 50);
            let before = positions(&buffer);

            let scale = rng.random_range(-4.0f32..4.0);
            buffer.apply_axis_scale(Axis::X, scale);
            buffer.apply_axis_scale(Axis::X, 1.0);

            assert_eq!(positions(&buffer), before);
            assert_eq!(buffer.pristine_positions().unwrap(), before.as_slice());
        }
    }

    #[test]
    fn test_repeated_scales_do_not_compound() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let mut sequenced = random_buffer(&mut rng, 40);
            let mut direct = sequenced.clone();

            let first = rng.random_range(0.1f32..5.0);
            let second = rng.random_range(0.1f32..5.0);
            sequenced.apply_axis_scale(Axis::Y, first);
            sequenced.apply_axis_scale(Axis::Y, second);
            direct.apply_axis_scale(Axis::Y, second);

            assert_eq!(positions(&sequenced), positions(&direct));
        }
    }

    #[test]
    fn test_pristine_snapshot_is_taken_once() {
        let mut cube = unit_cube();
        assert!(cube.pristine_positions().is_none());

        cube.apply_axis_scale(Axis::X, 3.0);
        let snapshot = cube.pristine_positions().unwrap().to_vec();
        cube.apply_axis_scale(Axis::X, 0.5);
        assert_eq!(cube.pristine_positions().unwrap(), snapshot.as_slice());
    }

    #[test]
    fn test_empty_buffer_is_a_no_op() {
        let mut empty = GeometryBuffer::new(Vec::new(), Vec::new(), Vec::new());
        empty.take_dirty();

        assert!(!empty.apply_axis_scale(Axis::X, 2.0));
        assert!(!empty.is_dirty());
        assert!(empty.pristine_positions().is_none());
        assert!(empty.bounding_box().is_none());
    }

    #[test]
    fn test_deformation_marks_dirty_and_refreshes_sphere() {
        let mut cube = unit_cube();
        assert!(cube.take_dirty());
        assert!(!cube.is_dirty());
        let radius_before = cube.bounding_sphere().unwrap().radius;

        cube.apply_axis_scale(Axis::X, 4.0);
        assert!(cube.is_dirty());
        assert_eq!(cube.as_bytes().len(), 8 * Vertex3D::STRIDE);

        let sphere = cube.bounding_sphere().unwrap();
        assert!(sphere.radius > radius_before);
        assert!((sphere.center.x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_triangles_indexed_and_unindexed() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let unindexed = GeometryBuffer::new(positions.clone(), Vec::new(), Vec::new());
        assert_eq!(unindexed.triangle_count(), 1);

        let indexed = GeometryBuffer::new(positions, Vec::new(), vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(indexed.triangle_count(), 2);
    }

    #[test]
    fn test_calculated_normals_point_out_of_triangle() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = GeometryBuffer::calculate_face_normals(&positions, &[0, 1, 2]);
        for normal in normals.chunks_exact(3) {
            assert_eq!(normal, &[0.0, 0.0, 1.0]);
        }
    }
}
