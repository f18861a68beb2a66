//! Input events the UI layer hands to the controller.

use std::path::PathBuf;

use crate::importer::ImportPayload;

/// Something the user asked for. Intents carry no mutation logic of their own;
/// [`crate::SceneController::handle_intent`] decides what they do.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerIntent {
    /// Primary button pressed at a viewport position in physical pixels
    PointerDown { x: f32, y: f32 },
    /// Model content already in memory was chosen for import
    ImportRequested(ImportPayload),
    /// A model file on disk was chosen (dropped or named on the command line)
    ImportFileRequested(PathBuf),
    /// Stretch the selected object
    DeformRequested,
    /// Remove the object the current selection belongs to
    RemoveSelectedRequested,
    ViewportResized { width: u32, height: u32 },
}
