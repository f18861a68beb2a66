use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::{
    camera::camera_utils::CameraManager,
    picking::{self, PickResult, Ray, AABB},
};

use super::object::{Mesh, NodeId, SceneNode};

/// Main scene containing the node graph, the selectable registry and camera.
///
/// The scene owns every node. The registry only records which top-level
/// nodes may be picked, in registration order.
pub struct Scene {
    pub camera_manager: CameraManager,
    nodes: Vec<SceneNode>,
    selectable: Vec<NodeId>,
}

impl Scene {
    /// Creates a new, empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            nodes: Vec::new(),
            selectable: Vec::new(),
        }
    }

    /// Adds a node that is drawn but never picked (ground, helpers)
    pub(crate) fn add_node(&mut self, node: SceneNode) -> NodeId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Adds a node and registers it as selectable
    pub(crate) fn register(&mut self, node: SceneNode) -> NodeId {
        let id = self.add_node(node);
        self.selectable.push(id);
        log::debug!("Registered selectable object {}", id);
        id
    }

    /// Removes a top-level node from the scene and the registry.
    ///
    /// Returns the removed subtree. The caller must clear a selection that lay
    /// inside it, as [`crate::SceneController::remove_object`] does.
    pub(crate) fn unregister(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|node| node.id() == id)?;
        self.selectable.retain(|candidate| *candidate != id);
        let removed = self.nodes.remove(index);
        log::debug!("Removed object {} ({})", id, removed.name);
        Some(removed)
    }

    /// Registered selectable ids, in registration order
    pub fn selectable(&self) -> &[NodeId] {
        &self.selectable
    }

    pub fn is_selectable(&self, id: NodeId) -> bool {
        self.selectable.contains(&id)
    }

    /// Top-level nodes
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Finds any node in the graph
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }

    /// The top-level node whose subtree contains `id`
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.contains(id))
            .map(SceneNode::id)
    }

    /// The mesh carried by `id`, if the node exists and has one
    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        self.node_mut(id).and_then(|node| node.mesh.as_mut())
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let identity = Matrix4::identity();
        self.nodes
            .iter()
            .find_map(|node| node.world_transform_of(id, &identity))
    }

    /// Current world-space bounds of `id`'s subtree
    pub fn world_bounds(&self, id: NodeId) -> Option<AABB> {
        let identity = Matrix4::identity();
        let (node, parent) = self
            .nodes
            .iter()
            .find_map(|node| node.find_with_parent_transform(id, &identity))?;
        node.world_bounds(&parent)
    }

    /// Intersect `ray` with every registered object, nearest first
    pub fn intersect(&self, ray: &Ray) -> Vec<PickResult> {
        let candidates = self.selectable.iter().filter_map(|id| {
            self.nodes.iter().find(|node| node.id() == *id)
        });
        picking::intersect_objects(candidates, ray)
    }

    /// Calls `visit` for every mesh in the scene
    pub fn for_each_mesh_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(NodeId, &mut Mesh),
    {
        for node in &mut self.nodes {
            node.visit_meshes_mut(&mut visit);
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let mut stats = SceneStatistics {
            object_count: self.nodes.len(),
            selectable_count: self.selectable.len(),
            total_triangles: 0,
            total_vertices: 0,
        };
        let identity = Matrix4::identity();
        for node in &self.nodes {
            node.visit_meshes(&identity, &mut |_, mesh, _| {
                stats.total_triangles += mesh.geometry.triangle_count();
                stats.total_vertices += mesh.geometry.vertex_count();
            });
        }
        stats
    }
}

/// Scene statistics for debugging and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub selectable_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}
