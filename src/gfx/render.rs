//! Renderer seam.
//!
//! Drawing is left to whatever backend the host plugs in. The viewer only
//! guarantees that every frame hands the renderer the scene with dirty vertex
//! buffers still flagged, and the current selection indicator.

use crate::gfx::scene::Scene;
use crate::selection::SelectionIndicator;

pub trait Renderer {
    /// Draw one frame, uploading any vertex buffer that changed since the last one
    fn render_frame(&mut self, scene: &mut Scene, indicator: &SelectionIndicator);
}

/// Renderer that draws nothing but keeps upload bookkeeping.
///
/// Used by the windowed shell when no GPU backend is attached, and by tests
/// to check that deformations reach the upload path.
#[derive(Debug, Default, Clone)]
pub struct HeadlessRenderer {
    frames: u64,
    uploads: usize,
    uploaded_bytes: usize,
    indicator_frames: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of mesh buffer uploads performed so far
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }

    /// Frames in which the selection indicator was visible
    pub fn indicator_frames(&self) -> u64 {
        self.indicator_frames
    }
}

impl Renderer for HeadlessRenderer {
    fn render_frame(&mut self, scene: &mut Scene, indicator: &SelectionIndicator) {
        let mut uploads = 0;
        let mut bytes = 0;
        scene.for_each_mesh_mut(|id, mesh| {
            if mesh.geometry.take_dirty() {
                uploads += 1;
                bytes += mesh.geometry.as_bytes().len();
                log::trace!("Uploading vertex buffer of {}", id);
            }
        });

        self.frames += 1;
        self.uploads += uploads;
        self.uploaded_bytes += bytes;
        if indicator.visible {
            self.indicator_frames += 1;
        }
    }
}
