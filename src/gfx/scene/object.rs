use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::deform::GeometryBuffer;
use crate::gfx::geometry::GeometryData;
use crate::gfx::picking::AABB;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a scene node.
///
/// Every node gets a fresh id at construction, so two nodes compare equal
/// only if they are the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderable geometry attached to a node
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: GeometryBuffer,
    /// Scale reached by the last deformation tick, `None` if never deformed
    pub current_scale: Option<f32>,
}

impl Mesh {
    pub fn new(geometry: GeometryBuffer) -> Self {
        Self {
            geometry,
            current_scale: None,
        }
    }
}

impl From<GeometryData> for Mesh {
    fn from(data: GeometryData) -> Self {
        Self::new(data.into_geometry_buffer())
    }
}

/// A node in the scene graph.
///
/// Nodes own their children. A node may carry a mesh, or be a pure grouping
/// node (the root of an imported model, for instance).
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Matrix4<f32>, // local transform relative to the parent
    pub mesh: Option<Mesh>,
    pub children: Vec<SceneNode>,
    pub visible: bool,
}

impl SceneNode {
    /// Create an empty grouping node with identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: Matrix4::identity(),
            mesh: None,
            children: Vec::new(),
            visible: true,
        }
    }

    /// Create a node carrying `mesh`
    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let mut node = Self::new(name);
        node.mesh = Some(mesh);
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn add_child(&mut self, child: SceneNode) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Set translation
    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.transform = Matrix4::from_translation(translation);
    }

    /// Apply translation (multiplies with existing transform)
    pub fn translate(&mut self, translation: Vector3<f32>) {
        self.transform = self.transform * Matrix4::from_translation(translation);
    }

    /// Translation part of the local transform
    pub fn translation(&self) -> Vector3<f32> {
        self.transform.w.truncate()
    }

    /// Overwrite only the Y component of the translation
    pub fn set_translation_y(&mut self, y: f32) {
        self.transform.w.y = y;
    }

    /// Find `id` in this subtree
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Find `id` together with the world transform of its parent
    pub fn find_with_parent_transform(
        &self,
        id: NodeId,
        parent: &Matrix4<f32>,
    ) -> Option<(&SceneNode, Matrix4<f32>)> {
        if self.id == id {
            return Some((self, *parent));
        }
        let world = parent * self.transform;
        self.children
            .iter()
            .find_map(|child| child.find_with_parent_transform(id, &world))
    }

    /// World transform of `id`, given this node's parent world transform
    pub fn world_transform_of(&self, id: NodeId, parent: &Matrix4<f32>) -> Option<Matrix4<f32>> {
        self.find_with_parent_transform(id, parent)
            .map(|(node, parent_world)| parent_world * node.transform)
    }

    /// Visit every mesh in the subtree with its world transform, depth first
    pub fn visit_meshes<F>(&self, parent: &Matrix4<f32>, visit: &mut F)
    where
        F: FnMut(&SceneNode, &Mesh, &Matrix4<f32>),
    {
        let world = parent * self.transform;
        if let Some(mesh) = &self.mesh {
            visit(self, mesh, &world);
        }
        for child in &self.children {
            child.visit_meshes(&world, visit);
        }
    }

    pub fn visit_meshes_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(NodeId, &mut Mesh),
    {
        let id = self.id;
        if let Some(mesh) = self.mesh.as_mut() {
            visit(id, mesh);
        }
        for child in &mut self.children {
            child.visit_meshes_mut(visit);
        }
    }

    /// World-space bounds of every mesh in the subtree
    pub fn world_bounds(&self, parent: &Matrix4<f32>) -> Option<AABB> {
        let mut bounds: Option<AABB> = None;
        self.visit_meshes(parent, &mut |_, mesh, world| {
            if let Some(local) = mesh.geometry.bounding_box() {
                let world_box = local.transform(world);
                bounds = Some(match bounds {
                    Some(existing) => existing.union(&world_box),
                    None => world_box,
                });
            }
        });
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_node_ids_are_unique() {
        let a = SceneNode::new("a");
        let b = SceneNode::new("a");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_find_and_world_transform_through_children() {
        let mut root = SceneNode::new("root");
        root.set_translation(Vector3::new(1.0, 0.0, 0.0));

        let mut child = SceneNode::with_mesh("cube", Mesh::from(generate_cube()));
        child.set_translation(Vector3::new(0.0, 2.0, 0.0));
        let child_id = root.add_child(child);

        assert!(root.contains(child_id));
        let world = root
            .world_transform_of(child_id, &Matrix4::identity())
            .unwrap();
        assert_eq!(world.w.truncate(), Vector3::new(1.0, 2.0, 0.0));

        let bounds = root.world_bounds(&Matrix4::identity()).unwrap();
        assert_eq!(bounds.min, Vector3::new(0.5, 1.5, -0.5));
        assert_eq!(bounds.max, Vector3::new(1.5, 2.5, 0.5));
    }

    #[test]
    fn test_grouping_node_has_no_bounds() {
        let root = SceneNode::new("empty");
        assert!(root.world_bounds(&Matrix4::identity()).is_none());
        assert_eq!(root.translation(), Vector3::new(0.0, 0.0, 0.0));
    }
}
