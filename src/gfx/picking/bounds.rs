//! Bounding volumes used for picking and indicator placement.

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use super::ray::Ray;

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertex positions.
    ///
    /// Returns `None` for an empty set, there is no meaningful extent to report.
    pub fn from_vertices<'a, I>(vertices: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        let mut iter = vertices.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(Vector3::from(*first), Vector3::from(*first));
        for vertex in iter {
            bounds.expand_to(Vector3::from(*vertex));
        }
        Some(bounds)
    }

    /// Grow the box so it contains `point`
    pub fn expand_to(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &AABB) -> Self {
        let mut merged = *self;
        merged.expand_to(other.min);
        merged.expand_to(other.max);
        merged
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Center of the top face (+Y)
    pub fn top_center(&self) -> Vector3<f32> {
        let center = self.center();
        Vector3::new(center.x, self.max.y, center.z)
    }

    /// Slab test against the box.
    ///
    /// Returns the distance to the entry point, or to the exit point when the
    /// origin is inside. An axis the ray runs parallel to only constrains the
    /// origin, which must lie within that slab (faces included).
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if direction == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let t0 = (lo - origin) * inv;
            let t1 = (hi - origin) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.min.y, self.min.z],
            [self.min.x, self.max.y, self.min.z],
            [self.min.x, self.min.y, self.max.z],
            [self.max.x, self.max.y, self.min.z],
            [self.max.x, self.min.y, self.max.z],
            [self.min.x, self.max.y, self.max.z],
            [self.max.x, self.max.y, self.max.z],
        ];

        let transformed: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| transform_point(matrix, *corner))
            .collect();

        // Eight corners in, so the box is never empty
        Self::from_vertices(&transformed).unwrap_or(*self)
    }
}

/// Sphere enclosing a mesh, centered on its bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vector3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere around `bounds.center()` reaching the farthest vertex
    pub fn from_vertices<'a, I>(bounds: &AABB, vertices: I) -> Self
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        let center = bounds.center();
        let radius_sq = vertices
            .into_iter()
            .map(|v| (Vector3::from(*v) - center).magnitude2())
            .fold(0.0f32, f32::max);
        Self::new(center, radius_sq.sqrt())
    }

    /// Sphere after applying `matrix`, radius grown by the largest axis scale
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let center = Vector3::from(transform_point(
            matrix,
            [self.center.x, self.center.y, self.center.z],
        ));
        let max_scale = matrix
            .x
            .truncate()
            .magnitude()
            .max(matrix.y.truncate().magnitude())
            .max(matrix.z.truncate().magnitude());
        Self::new(center, self.radius * max_scale)
    }

    /// True if the ray passes within `radius` of the center in front of its origin
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let to_center = self.center - ray.origin;
        let along = to_center.dot(ray.direction);
        let closest_sq = to_center.magnitude2() - along * along;
        let radius_sq = self.radius * self.radius;
        if closest_sq > radius_sq {
            return false;
        }
        // Behind the origin only counts when the origin sits inside the sphere
        along >= 0.0 || to_center.magnitude2() <= radius_sq
    }
}

/// Transform a point, dividing through by w
pub fn transform_point(matrix: &Matrix4<f32>, point: [f32; 3]) -> [f32; 3] {
    let transformed = matrix * Vector4::new(point[0], point[1], point[2], 1.0);
    [
        transformed.x / transformed.w,
        transformed.y / transformed.w,
        transformed.z / transformed.w,
    ]
}
