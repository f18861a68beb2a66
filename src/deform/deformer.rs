//! Time-driven axis-scale animation.
//!
//! Each mesh is in one of three states: [`DeformState::Idle`] until a request
//! arrives, [`DeformState::Running`] while its session interpolates, and
//! [`DeformState::Done`] once the session reached its target (or its mesh
//! disappeared). A single [`Deformer::tick`] advances every running session.
//! Finished states are dropped by [`Deformer::prune_finished`], and removed
//! meshes are dropped with [`Deformer::forget`], so the table only holds
//! meshes that are still in play.

use std::collections::BTreeMap;

use crate::gfx::scene::{NodeId, Scene};

use super::buffer::Axis;

/// One bounded deformation run on one mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformationSession {
    pub mesh: NodeId,
    pub axis: Axis,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub start_scale: f32,
    pub target_scale: f32,
}

impl DeformationSession {
    /// Normalized progress in `[0, 1]`; zero or negative durations finish at once
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Linearly interpolated scale at `now_ms`
    pub fn scale_at(&self, now_ms: f64) -> f32 {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.target_scale;
        }
        self.start_scale + (self.target_scale - self.start_scale) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DeformState {
    #[default]
    Idle,
    Running(DeformationSession),
    Done,
}

/// Drives every active deformation session
#[derive(Debug, Default)]
pub struct Deformer {
    states: BTreeMap<NodeId, DeformState>,
}

impl Deformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `mesh` from its last recorded scale to that plus `delta_scale`.
    ///
    /// A session already running on the same mesh is superseded: it gets no
    /// further ticks and the new one starts from wherever the old one got to.
    /// Returns `false` (and changes nothing) when `mesh` carries no geometry.
    pub fn begin_deformation(
        &mut self,
        scene: &mut Scene,
        mesh: NodeId,
        axis: Axis,
        delta_scale: f32,
        duration_ms: f64,
        now_ms: f64,
    ) -> bool {
        let Some(target) = scene.mesh_mut(mesh) else {
            log::debug!("Deform request for {} dropped: no geometry", mesh);
            return false;
        };
        if !target.geometry.has_positions() {
            log::debug!("Deform request for {} dropped: no positions", mesh);
            return false;
        }

        let start_scale = target.current_scale.unwrap_or(1.0);
        let session = DeformationSession {
            mesh,
            axis,
            start_ms: now_ms,
            duration_ms,
            start_scale,
            target_scale: start_scale + delta_scale,
        };

        if let Some(DeformState::Running(previous)) = self.states.get(&mesh) {
            log::debug!(
                "Superseding deformation of {} at scale {} (was heading to {})",
                mesh,
                start_scale,
                previous.target_scale
            );
        }
        log::info!(
            "Deforming {} along {:?}: {} -> {} over {}ms",
            mesh,
            axis,
            session.start_scale,
            session.target_scale,
            duration_ms
        );

        self.states.insert(mesh, DeformState::Running(session));
        true
    }

    /// Advance all running sessions to `now_ms`.
    ///
    /// Returns the meshes that were mutated this tick, in id order. Sessions
    /// whose mesh no longer exists end without mutating anything.
    pub fn tick(&mut self, scene: &mut Scene, now_ms: f64) -> Vec<NodeId> {
        let mut animated = Vec::new();

        for (id, state) in self.states.iter_mut() {
            let DeformState::Running(session) = *state else {
                continue;
            };

            let Some(mesh) = scene.mesh_mut(*id) else {
                log::debug!("Deformation of {} ended: mesh is gone", id);
                *state = DeformState::Done;
                continue;
            };

            let scale = session.scale_at(now_ms);
            mesh.geometry.apply_axis_scale(session.axis, scale);
            mesh.current_scale = Some(scale);
            animated.push(*id);
            log::trace!("Deformation of {} at scale {}", id, scale);

            if session.progress(now_ms) >= 1.0 {
                *state = DeformState::Done;
            }
        }

        animated
    }

    pub fn state(&self, mesh: NodeId) -> DeformState {
        self.states.get(&mesh).copied().unwrap_or_default()
    }

    /// True while any session still needs frames
    pub fn is_animating(&self) -> bool {
        self.states
            .values()
            .any(|state| matches!(state, DeformState::Running(_)))
    }

    /// Forget every state that is not running
    pub fn prune_finished(&mut self) {
        self.states
            .retain(|_, state| matches!(state, DeformState::Running(_)));
    }

    /// Drop whatever is known about `mesh`, running or not.
    ///
    /// Returns `true` when a session was still running on it.
    pub fn forget(&mut self, mesh: NodeId) -> bool {
        matches!(self.states.remove(&mesh), Some(DeformState::Running(_)))
    }

    /// Number of meshes with a recorded state
    pub fn tracked(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::camera::CameraManager;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::scene::{Mesh, SceneNode};

    fn scene_with_cube() -> (Scene, NodeId) {
        let mut scene = Scene::new(CameraManager::from_config(&ViewerConfig::default().camera, 1.0));
        let cube = scene.register(SceneNode::with_mesh("cube", Mesh::from(generate_cube())));
        (scene, cube)
    }

    fn max_x(scene: &Scene, id: NodeId) -> f32 {
        scene.world_bounds(id).unwrap().max.x
    }

    #[test]
    fn test_session_interpolation_endpoints() {
        let session = DeformationSession {
            mesh: SceneNode::new("m").id(),
            axis: Axis::X,
            start_ms: 100.0,
            duration_ms: 200.0,
            start_scale: 1.0,
            target_scale: 2.0,
        };

        assert_eq!(session.scale_at(100.0), 1.0);
        assert_eq!(session.scale_at(50.0), 1.0);
        assert_eq!(session.scale_at(200.0), 1.5);
        assert_eq!(session.scale_at(300.0), 2.0);
        assert_eq!(session.scale_at(10_000.0), 2.0);

        let mut previous = session.scale_at(100.0);
        for step in 1..=20 {
            let scale = session.scale_at(100.0 + step as f64 * 10.0);
            assert!(scale >= previous);
            previous = scale;
        }
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let session = DeformationSession {
            mesh: SceneNode::new("m").id(),
            axis: Axis::X,
            start_ms: 0.0,
            duration_ms: 0.0,
            start_scale: 1.0,
            target_scale: 3.0,
        };
        assert_eq!(session.scale_at(0.0), 3.0);
    }

    #[test]
    fn test_session_runs_to_done() {
        let (mut scene, cube) = scene_with_cube();
        let mut deformer = Deformer::new();
        assert_eq!(deformer.state(cube), DeformState::Idle);

        assert!(deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 0.0));
        assert!(deformer.is_animating());

        assert_eq!(deformer.tick(&mut scene, 100.0), vec![cube]);
        assert!((max_x(&scene, cube) - 1.0).abs() < 1e-6);
        assert!(matches!(deformer.state(cube), DeformState::Running(_)));

        assert_eq!(deformer.tick(&mut scene, 250.0), vec![cube]);
        assert!((max_x(&scene, cube) - 1.5).abs() < 1e-6);
        assert_eq!(deformer.state(cube), DeformState::Done);
        assert!(!deformer.is_animating());

        // Done sessions are not ticked again
        assert!(deformer.tick(&mut scene, 300.0).is_empty());
        assert_eq!(scene.mesh_mut(cube).unwrap().current_scale, Some(2.0));
    }

    #[test]
    fn test_second_request_continues_from_recorded_scale() {
        let (mut scene, cube) = scene_with_cube();
        let mut deformer = Deformer::new();

        deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 0.0);
        deformer.tick(&mut scene, 200.0);
        deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 500.0);

        match deformer.state(cube) {
            DeformState::Running(session) => {
                assert_eq!(session.start_scale, 2.0);
                assert_eq!(session.target_scale, 3.0);
            }
            other => panic!("expected a running session, got {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_request_supersedes_running_session() {
        let (mut scene, cube) = scene_with_cube();
        let mut deformer = Deformer::new();

        deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 0.0);
        deformer.tick(&mut scene, 100.0); // halfway, scale 1.5
        deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 100.0);

        let DeformState::Running(session) = deformer.state(cube) else {
            panic!("expected a running session");
        };
        assert_eq!(session.start_scale, 1.5);
        assert_eq!(session.target_scale, 2.5);

        // Only the new session is driven
        deformer.tick(&mut scene, 300.0);
        assert_eq!(scene.mesh_mut(cube).unwrap().current_scale, Some(2.5));
        assert_eq!(deformer.state(cube), DeformState::Done);
    }

    #[test]
    fn test_node_without_mesh_is_ignored() {
        let (mut scene, _) = scene_with_cube();
        let group = scene.register(SceneNode::new("group"));
        let mut deformer = Deformer::new();

        assert!(!deformer.begin_deformation(&mut scene, group, Axis::X, 1.0, 200.0, 0.0));
        assert_eq!(deformer.state(group), DeformState::Idle);
        assert!(!deformer.is_animating());
    }

    #[test]
    fn test_removed_mesh_ends_session_quietly() {
        let (mut scene, cube) = scene_with_cube();
        let mut deformer = Deformer::new();

        deformer.begin_deformation(&mut scene, cube, Axis::X, 1.0, 200.0, 0.0);
        scene.unregister(cube);

        assert!(deformer.tick(&mut scene, 50.0).is_empty());
        assert_eq!(deformer.state(cube), DeformState::Done);
        deformer.prune_finished();
        assert_eq!(deformer.state(cube), DeformState::Idle);
        assert_eq!(deformer.tracked(), 0);
    }

    #[test]
    fn test_forget_drops_running_and_finished_states() {
        let (mut scene, cube) = scene_with_cube();
        let other = scene.register(SceneNode::with_mesh("other", Mesh::from(generate_cube())));
        let mut deformer = Deformer::new();

        deformer.begin_deformation(&mut scene, cube, Axis::Y, 1.0, 200.0, 0.0);
        deformer.begin_deformation(&mut scene, other, Axis::Y, 1.0, 0.0, 0.0);
        deformer.tick(&mut scene, 10.0);
        assert_eq!(deformer.state(other), DeformState::Done);
        assert_eq!(deformer.tracked(), 2);

        assert!(deformer.forget(cube));
        assert!(!deformer.forget(other));
        assert!(!deformer.forget(cube));
        assert_eq!(deformer.tracked(), 0);
        assert!(!deformer.is_animating());
    }
}
