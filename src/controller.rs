//! The interaction coordinator.
//!
//! [`SceneController`] owns every piece of mutable viewer state (scene,
//! selection, running deformations, in-flight imports) and is the only thing
//! event handlers talk to. Time comes from an injected [`Clock`] and frames
//! are requested through an injected [`FrameScheduler`].

use std::path::PathBuf;
use std::task::{Context, Poll};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::ViewerConfig;
use crate::deform::{Clock, Deformer, FrameScheduler, SystemClock};
use crate::error::ImportError;
use crate::events::ViewerIntent;
use crate::gfx::camera::CameraManager;
use crate::gfx::geometry::{generate_plane, generate_sphere};
use crate::gfx::picking::{ObjectPicker, PickResult};
use crate::gfx::render::Renderer;
use crate::gfx::scene::{Mesh, NodeId, Scene, SceneNode};
use crate::importer::{ImportFuture, ImportPayload, Importer, ObjImporter};
use crate::selection::SelectionState;

/// Result of one finished import, as seen by the UI
pub type ImportOutcome = Result<NodeId, ImportError>;

pub struct SceneController {
    config: ViewerConfig,
    scene: Scene,
    picker: ObjectPicker,
    selection: SelectionState,
    deformer: Deformer,
    importer: Box<dyn Importer>,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn FrameScheduler>,
    pending_imports: FuturesUnordered<ImportFuture>,
    viewport: (u32, u32),
}

impl SceneController {
    pub fn new(
        config: ViewerConfig,
        importer: Box<dyn Importer>,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        let viewport = (config.window.width, config.window.height);
        let aspect = viewport.0 as f32 / viewport.1.max(1) as f32;
        let scene = Scene::new(CameraManager::from_config(&config.camera, aspect));
        let selection = SelectionState::new(&config.selection);

        Self {
            config,
            scene,
            picker: ObjectPicker::new(),
            selection,
            deformer: Deformer::new(),
            importer,
            clock,
            scheduler,
            pending_imports: FuturesUnordered::new(),
            viewport,
        }
    }

    /// OBJ importer and wall clock
    pub fn with_scheduler(config: ViewerConfig, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self::new(
            config,
            Box::new(ObjImporter::new()),
            Box::new(SystemClock::new()),
            scheduler,
        )
    }

    /// Add the ground plane and the sample sphere
    pub fn initialize_scene(&mut self) {
        let size = self.config.scene.ground_size;
        self.scene.add_node(SceneNode::with_mesh(
            "ground",
            Mesh::from(generate_plane(size, size, 1, 1)),
        ));

        let mut sphere = SceneNode::with_mesh("sphere", Mesh::from(generate_sphere(0.5, 32, 16)));
        sphere.set_translation(Vector3::new(-1.0, 0.5, 0.0));
        self.scene.register(sphere);

        // The first frame draws the initial scene
        self.scheduler.schedule_next_frame();
        log::info!("Scene initialized: {:?}", self.scene.get_statistics());
    }

    pub fn handle_intent(&mut self, intent: ViewerIntent) {
        match intent {
            ViewerIntent::PointerDown { x, y } => {
                self.pick_at(x, y);
            }
            ViewerIntent::ImportRequested(payload) => self.request_import(payload),
            ViewerIntent::ImportFileRequested(path) => self.request_import_file(path),
            ViewerIntent::DeformRequested => {
                self.request_deform();
            }
            ViewerIntent::RemoveSelectedRequested => {
                self.remove_selected();
            }
            ViewerIntent::ViewportResized { width, height } => self.resize(width, height),
        }
    }

    /// Pick under a viewport position and update the selection with the result
    pub fn pick_at(&mut self, x: f32, y: f32) -> Option<PickResult> {
        let screen_size = (self.viewport.0 as f32, self.viewport.1 as f32);
        let hit = self.picker.pick_object(
            (x, y),
            screen_size,
            &self.scene.camera_manager.camera,
            &self.scene,
        );
        self.selection.on_pick_result(hit.as_ref(), &self.scene);
        self.scheduler.schedule_next_frame();
        hit
    }

    /// Start deforming the selected mesh with the configured axis and step.
    ///
    /// Returns `false` when nothing is selected or the selection has no
    /// geometry; the request is dropped in both cases.
    pub fn request_deform(&mut self) -> bool {
        let Some(selected) = self.selection.selected() else {
            log::debug!("Deform request dropped: nothing selected");
            return false;
        };

        let deform = &self.config.deform;
        let started = self.deformer.begin_deformation(
            &mut self.scene,
            selected,
            deform.axis,
            deform.delta_scale,
            deform.duration_ms,
            self.clock.now_ms(),
        );
        if started {
            self.scheduler.schedule_next_frame();
        }
        started
    }

    /// Queue a payload for asynchronous import
    pub fn request_import(&mut self, payload: ImportPayload) {
        log::info!("Importing {} ({} bytes)", payload.name, payload.bytes.len());
        self.pending_imports
            .push(self.importer.import_from_payload(payload));
        self.scheduler.schedule_next_frame();
    }

    /// Queue a file for asynchronous import; the importer does the reading
    pub fn request_import_file(&mut self, path: PathBuf) {
        log::info!("Importing {}", path.display());
        self.pending_imports.push(self.importer.import_from_path(path));
        self.scheduler.schedule_next_frame();
    }

    /// Register every import that finished since the last call.
    ///
    /// Never waits: imports still in flight are left for a later frame, and
    /// another frame is requested while any remain. Completed imports are
    /// registered in completion order, which need not match request order.
    pub fn poll_imports(&mut self) -> Vec<ImportOutcome> {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut outcomes = Vec::new();

        while let Poll::Ready(Some(result)) = self.pending_imports.poll_next_unpin(&mut cx) {
            match result {
                Ok(root) => {
                    let name = root.name.clone();
                    let id = self.add_object(root);
                    log::info!("Imported {} as {}", name, id);
                    outcomes.push(Ok(id));
                }
                Err(err) => {
                    log::warn!("Import failed: {}", err);
                    outcomes.push(Err(err));
                }
            }
        }

        if !self.pending_imports.is_empty() {
            self.scheduler.schedule_next_frame();
        }
        outcomes
    }

    /// Advance deformations to `timestamp_ms`.
    ///
    /// Moves the indicator when the selected mesh changed shape and keeps
    /// frames coming while any deformation is running. Once the last session
    /// finishes, finished states are dropped. Returns the meshes mutated this
    /// frame.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Vec<NodeId> {
        let animated = self.deformer.tick(&mut self.scene, timestamp_ms);

        if let Some(selected) = self.selection.selected() {
            if animated.contains(&selected) {
                self.selection.reposition_indicator(&self.scene);
            }
        }

        if self.deformer.is_animating() {
            self.scheduler.schedule_next_frame();
        } else {
            self.deformer.prune_finished();
        }
        animated
    }

    /// [`Self::on_frame`] at the controller clock's current time
    pub fn advance(&mut self) -> Vec<NodeId> {
        let now = self.clock.now_ms();
        self.on_frame(now)
    }

    /// Hand the current frame to `renderer`
    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        renderer.render_frame(&mut self.scene, self.selection.indicator());
    }

    /// Register a new top-level object, resting it on the floor if configured
    pub fn add_object(&mut self, mut node: SceneNode) -> NodeId {
        if self.config.scene.place_on_floor {
            if let Some(bounds) = node.world_bounds(&Matrix4::identity()) {
                node.set_translation_y(bounds.size().y / 2.0);
            }
        }
        let id = self.scene.register(node);
        self.scheduler.schedule_next_frame();
        id
    }

    /// Remove a top-level object.
    ///
    /// Clears the selection if it was inside the removed subtree and drops
    /// any deformation state held for its meshes.
    pub fn remove_object(&mut self, id: NodeId) -> bool {
        let Some(mut removed) = self.scene.unregister(id) else {
            return false;
        };
        self.selection.clear_if_removed(&removed);

        let deformer = &mut self.deformer;
        removed.visit_meshes_mut(&mut |mesh, _| {
            if deformer.forget(mesh) {
                log::debug!("Stopped deformation of removed mesh {}", mesh);
            }
        });

        self.scheduler.schedule_next_frame();
        true
    }

    /// Remove the object the selected mesh belongs to
    pub fn remove_selected(&mut self) -> bool {
        let root = self
            .selection
            .selected()
            .and_then(|selected| self.scene.root_of(selected));
        match root {
            Some(root) => self.remove_object(root),
            None => {
                log::debug!("Remove request dropped: nothing selected");
                false
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.scene.camera_manager.camera.resize_projection(width, height);
        self.scheduler.schedule_next_frame();
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Camera input only; scene contents change through the controller
    pub fn camera_manager_mut(&mut self) -> &mut CameraManager {
        &mut self.scene.camera_manager
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Mutable selection, for registering observers
    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn deformer(&self) -> &Deformer {
        &self.deformer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn pending_imports(&self) -> usize {
        self.pending_imports.len()
    }

    pub fn is_animating(&self) -> bool {
        self.deformer.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::{DeformState, ManualClock, ManualScheduler};

    fn controller() -> (SceneController, ManualClock, ManualScheduler) {
        let clock = ManualClock::new(0.0);
        let scheduler = ManualScheduler::new();
        let controller = SceneController::new(
            ViewerConfig::default(),
            Box::new(ObjImporter::new()),
            Box::new(clock.clone()),
            Box::new(scheduler.clone()),
        );
        (controller, clock, scheduler)
    }

    #[test]
    fn test_initial_scene_has_one_selectable_sphere() {
        let (mut controller, _, scheduler) = controller();
        controller.initialize_scene();

        let stats = controller.scene().get_statistics();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.selectable_count, 1);
        assert!(scheduler.pending());

        let sphere = controller.scene().selectable()[0];
        let bounds = controller.scene().world_bounds(sphere).unwrap();
        assert!(bounds.min.y.abs() < 1e-5);
    }

    #[test]
    fn test_add_object_rests_on_floor() {
        let (mut controller, _, _) = controller();
        let node = SceneNode::with_mesh("cube", Mesh::from(crate::gfx::geometry::generate_cube()));
        let id = controller.add_object(node);

        let bounds = controller.scene().world_bounds(id).unwrap();
        assert!(bounds.min.y.abs() < 1e-6);
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_deform_without_selection_is_dropped() {
        let (mut controller, _, scheduler) = controller();
        controller.initialize_scene();
        scheduler.take_requests();

        assert!(!controller.request_deform());
        assert!(!controller.is_animating());
        assert_eq!(scheduler.take_requests(), 0);
    }

    #[test]
    fn test_frames_requested_until_session_completes() {
        let (mut controller, clock, scheduler) = controller();
        let node = SceneNode::with_mesh("cube", Mesh::from(crate::gfx::geometry::generate_cube()));
        let cube = controller.add_object(node);
        select(&mut controller, cube);
        scheduler.take_requests();

        assert!(controller.request_deform());
        assert_eq!(scheduler.take_requests(), 1);

        clock.set(100.0);
        assert_eq!(controller.advance(), vec![cube]);
        assert_eq!(scheduler.take_requests(), 1);

        clock.set(200.0);
        assert_eq!(controller.advance(), vec![cube]);
        assert_eq!(scheduler.take_requests(), 0);

        // The finished session is dropped, the reached scale stays on the mesh
        assert_eq!(controller.deformer().state(cube), DeformState::Idle);
        assert_eq!(controller.deformer().tracked(), 0);
        let mesh = controller.scene().node(cube).unwrap().mesh.as_ref().unwrap();
        assert_eq!(mesh.current_scale, Some(2.0));
    }

    fn select(controller: &mut SceneController, id: NodeId) {
        controller.selection.on_pick_result(
            Some(&PickResult {
                object: id,
                root: id,
                distance: 1.0,
                intersection_point: Vector3::new(0.0, 0.0, 0.0),
            }),
            &controller.scene,
        );
    }

    #[test]
    fn test_removed_objects_leave_no_deformation_state() {
        let (mut controller, clock, _) = controller();

        for round in 0..50 {
            let node = SceneNode::with_mesh("cube", Mesh::from(crate::gfx::geometry::generate_cube()));
            let cube = controller.add_object(node);
            select(&mut controller, cube);
            assert!(controller.request_deform());

            // Half of them are removed mid-animation, the rest after finishing
            clock.advance(if round % 2 == 0 { 50.0 } else { 500.0 });
            controller.advance();
            assert!(controller.remove_object(cube));

            assert_eq!(controller.deformer().state(cube), DeformState::Idle);
            assert_eq!(controller.deformer().tracked(), 0);
            assert!(!controller.is_animating());
        }
    }

    #[test]
    fn test_removing_a_mesh_inside_a_group_forgets_its_session() {
        let (mut controller, clock, _) = controller();
        let mut group = SceneNode::new("group");
        let part = group.add_child(SceneNode::with_mesh(
            "part",
            Mesh::from(crate::gfx::geometry::generate_cube()),
        ));
        let group = controller.add_object(group);
        let other = controller.add_object(SceneNode::with_mesh(
            "other",
            Mesh::from(crate::gfx::geometry::generate_cube()),
        ));

        select(&mut controller, other);
        controller.request_deform();
        select(&mut controller, part);
        controller.request_deform();
        assert_eq!(controller.deformer().tracked(), 2);

        assert!(controller.remove_object(group));
        assert_eq!(controller.deformer().state(part), DeformState::Idle);
        assert!(matches!(controller.deformer().state(other), DeformState::Running(_)));

        clock.set(1000.0);
        controller.advance();
        assert_eq!(controller.deformer().tracked(), 0);
    }

    #[test]
    fn test_removing_selected_object_hides_indicator() {
        let (mut controller, _, _) = controller();
        let cube = controller.add_object(SceneNode::with_mesh(
            "cube",
            Mesh::from(crate::gfx::geometry::generate_cube()),
        ));
        select(&mut controller, cube);
        assert!(controller.selection().indicator().visible);

        assert!(controller.remove_object(cube));
        controller.advance();

        assert_eq!(controller.selection().selected(), None);
        assert!(!controller.selection().indicator().visible);
        assert!(controller.scene().node(cube).is_none());
    }

    #[test]
    fn test_resize_updates_viewport_and_ignores_zero() {
        let (mut controller, _, _) = controller();
        controller.handle_intent(ViewerIntent::ViewportResized {
            width: 640,
            height: 480,
        });
        assert_eq!(controller.viewport(), (640, 480));
        assert!((controller.scene().camera_manager.camera.aspect - 640.0 / 480.0).abs() < 1e-6);

        controller.resize(0, 100);
        assert_eq!(controller.viewport(), (640, 480));
    }
}
