//! Single-object selection and its on-screen indicator.

use cgmath::Vector3;

use crate::config::SelectionConfig;
use crate::gfx::picking::PickResult;
use crate::gfx::scene::{NodeId, Scene, SceneNode};

/// Marker drawn above the selected object.
///
/// It exists for the whole session; only its visibility and position change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionIndicator {
    pub visible: bool,
    pub position: Vector3<f32>,
    pub radius: f32,
    /// Vertical gap between the object's top face and the indicator
    pub offset: f32,
}

impl SelectionIndicator {
    pub fn new(radius: f32, offset: f32) -> Self {
        Self {
            visible: false,
            position: Vector3::new(0.0, 0.0, 0.0),
            radius,
            offset,
        }
    }
}

type SelectionObserver = Box<dyn FnMut(Option<NodeId>)>;

/// Holds at most one selected mesh and tells observers when it is set.
pub struct SelectionState {
    selected: Option<NodeId>,
    indicator: SelectionIndicator,
    observers: Vec<SelectionObserver>,
}

impl SelectionState {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            selected: None,
            indicator: SelectionIndicator::new(config.indicator_radius, config.indicator_offset),
            observers: Vec::new(),
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn indicator(&self) -> &SelectionIndicator {
        &self.indicator
    }

    /// Register a callback fired with the new selection on every pick result
    pub fn on_selection_change<F>(&mut self, observer: F)
    where
        F: FnMut(Option<NodeId>) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Apply a pick result: select the struck mesh, or clear on a miss.
    ///
    /// Observers fire exactly once per call, even when the selection did not
    /// change.
    pub fn on_pick_result(&mut self, hit: Option<&PickResult>, scene: &Scene) {
        self.selected = hit.map(|hit| hit.object);
        self.reposition_indicator(scene);
        match self.selected {
            Some(id) => log::debug!("Selected {}", id),
            None => log::debug!("Selection cleared"),
        }
        self.notify();
    }

    /// Move the indicator to the selected mesh's current bounds.
    ///
    /// Does not notify observers.
    pub fn reposition_indicator(&mut self, scene: &Scene) {
        let bounds = self.selected.and_then(|id| scene.world_bounds(id));
        match bounds {
            Some(bounds) => {
                let top = bounds.top_center();
                self.indicator.position = Vector3::new(top.x, top.y + self.indicator.offset, top.z);
                self.indicator.visible = true;
            }
            None => {
                self.indicator.visible = false;
            }
        }
    }

    /// Drop the selection if it lives inside `removed`.
    ///
    /// Returns `true` when the selection was cleared; observers are notified
    /// once in that case.
    pub fn clear_if_removed(&mut self, removed: &SceneNode) -> bool {
        match self.selected {
            Some(id) if removed.contains(id) => {
                log::debug!("Selection {} cleared: object {} was removed", id, removed.id());
                self.selected = None;
                self.indicator.visible = false;
                self.notify();
                true
            }
            _ => false,
        }
    }

    fn notify(&mut self) {
        let selected = self.selected;
        for observer in &mut self.observers {
            observer(selected);
        }
    }
}

impl std::fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionState")
            .field("selected", &self.selected)
            .field("indicator", &self.indicator)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::camera::CameraManager;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::scene::Mesh;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene_with_cube(at: Vector3<f32>) -> (Scene, NodeId) {
        let mut scene = Scene::new(CameraManager::from_config(&ViewerConfig::default().camera, 1.0));
        let mut node = SceneNode::with_mesh("cube", Mesh::from(generate_cube()));
        node.set_translation(at);
        let id = scene.register(node);
        (scene, id)
    }

    fn hit(object: NodeId) -> PickResult {
        PickResult {
            object,
            root: object,
            distance: 1.0,
            intersection_point: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    fn recorded(selection: &mut SelectionState) -> Rc<RefCell<Vec<Option<NodeId>>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        selection.on_selection_change(move |selected| sink.borrow_mut().push(selected));
        calls
    }

    #[test]
    fn test_indicator_sits_above_top_face() {
        let (scene, cube) = scene_with_cube(Vector3::new(1.0, 2.0, 3.0));
        let mut selection = SelectionState::new(&SelectionConfig::default());
        assert!(!selection.indicator().visible);

        selection.on_pick_result(Some(&hit(cube)), &scene);

        let indicator = selection.indicator();
        assert!(indicator.visible);
        assert!((indicator.position.x - 1.0).abs() < 1e-6);
        assert!((indicator.position.y - 2.7).abs() < 1e-6);
        assert!((indicator.position.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_miss_clears_and_hides() {
        let (scene, cube) = scene_with_cube(Vector3::new(0.0, 0.0, 0.0));
        let mut selection = SelectionState::new(&SelectionConfig::default());

        selection.on_pick_result(Some(&hit(cube)), &scene);
        selection.on_pick_result(None, &scene);

        assert_eq!(selection.selected(), None);
        assert!(!selection.indicator().visible);
    }

    #[test]
    fn test_every_pick_notifies_once_without_dedup() {
        let (scene, cube) = scene_with_cube(Vector3::new(0.0, 0.0, 0.0));
        let mut selection = SelectionState::new(&SelectionConfig::default());
        let calls = recorded(&mut selection);

        selection.on_pick_result(Some(&hit(cube)), &scene);
        selection.on_pick_result(Some(&hit(cube)), &scene);
        selection.on_pick_result(None, &scene);
        selection.on_pick_result(None, &scene);

        assert_eq!(*calls.borrow(), vec![Some(cube), Some(cube), None, None]);
    }

    #[test]
    fn test_reposition_is_silent() {
        let (mut scene, cube) = scene_with_cube(Vector3::new(0.0, 0.0, 0.0));
        let mut selection = SelectionState::new(&SelectionConfig::default());
        selection.on_pick_result(Some(&hit(cube)), &scene);
        let calls = recorded(&mut selection);

        scene.node_mut(cube).unwrap().set_translation(Vector3::new(0.0, 1.0, 0.0));
        selection.reposition_indicator(&scene);

        assert!(calls.borrow().is_empty());
        assert!((selection.indicator().position.y - 1.7).abs() < 1e-6);
    }

    #[test]
    fn test_removal_of_selected_subtree_clears_selection() {
        let (mut scene, cube) = scene_with_cube(Vector3::new(0.0, 0.0, 0.0));
        let other = scene.register(SceneNode::new("other"));
        let mut selection = SelectionState::new(&SelectionConfig::default());
        selection.on_pick_result(Some(&hit(cube)), &scene);
        let calls = recorded(&mut selection);

        let removed_other = scene.unregister(other).unwrap();
        assert!(!selection.clear_if_removed(&removed_other));
        assert_eq!(selection.selected(), Some(cube));

        let removed = scene.unregister(cube).unwrap();
        assert!(selection.clear_if_removed(&removed));
        assert_eq!(selection.selected(), None);
        assert!(!selection.indicator().visible);
        assert_eq!(*calls.borrow(), vec![None]);
    }
}
