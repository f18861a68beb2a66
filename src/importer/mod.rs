//! Model import.
//!
//! An [`Importer`] turns a named byte payload into a scene subtree without
//! blocking: it hands back a future that the controller polls once per frame.
//! [`ObjImporter`] is the Wavefront OBJ implementation used by the viewer. It
//! reads and decodes on a worker thread and reports back through a oneshot
//! channel, so imports finish in whatever order their workers do.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::deform::GeometryBuffer;
use crate::error::ImportError;
use crate::gfx::scene::{Mesh, SceneNode};

/// A file as delivered by the UI: its name and raw content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportPayload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a payload from disk, named after the file
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            name: file_name(path),
            bytes,
        })
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }

    fn has_extension(&self, extension: &str) -> bool {
        has_extension(&self.name, extension)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub type ImportFuture = BoxFuture<'static, Result<SceneNode, ImportError>>;

/// Asynchronously decodes payloads into a root node
pub trait Importer {
    fn import_from_payload(&self, payload: ImportPayload) -> ImportFuture;

    /// Import a file by path. The file is read inside the returned future's
    /// work, never on the calling thread.
    fn import_from_path(&self, path: PathBuf) -> ImportFuture;
}

/// Wavefront OBJ importer.
///
/// The root node is named after the file and gets one child mesh per model
/// in the file. Material libraries are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ObjImporter {
    pub fn new() -> Self {
        Self
    }

    /// Decode on the calling thread
    pub fn decode(payload: &ImportPayload) -> Result<SceneNode, ImportError> {
        if !payload.has_extension("obj") {
            return Err(ImportError::InvalidFormat {
                name: payload.name.clone(),
            });
        }

        let mut reader = Cursor::new(payload.bytes.as_slice());
        let (models, _materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|source| ImportError::Decode {
            name: payload.name.clone(),
            source,
        })?;

        let mut root = SceneNode::new(payload.stem());
        for (index, model) in models.into_iter().enumerate() {
            let mesh = model.mesh;
            if mesh.positions.is_empty() {
                continue;
            }

            // Use normals from OBJ if available, otherwise calculate them
            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
            } else {
                GeometryBuffer::calculate_face_normals(&mesh.positions, &mesh.indices)
            };

            let name = if model.name.is_empty() {
                format!("{}_{}", payload.stem(), index)
            } else {
                model.name
            };
            let geometry = GeometryBuffer::new(mesh.positions, normals, mesh.indices);
            root.add_child(SceneNode::with_mesh(name, Mesh::new(geometry)));
        }

        if root.children.is_empty() {
            return Err(ImportError::EmptyModel {
                name: payload.name.clone(),
            });
        }
        Ok(root)
    }

    /// Run `job` on its own thread; the future resolves when the job is done.
    ///
    /// A worker that dies without sending (a panic inside `tobj`, or a thread
    /// that could not be started) resolves to [`ImportError::Interrupted`].
    fn spawn_worker<F>(name: String, job: F) -> ImportFuture
    where
        F: FnOnce() -> Result<SceneNode, ImportError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("obj-import".into())
            .spawn(move || {
                // Nobody is listening once the controller dropped the import
                let _ = tx.send(job());
            });

        if let Err(err) = spawned {
            log::error!("Failed to start import worker for {}: {}", name, err);
            return future::ready(Err(ImportError::Interrupted { name })).boxed();
        }
        rx.map(move |received| {
            received.unwrap_or_else(|_canceled| Err(ImportError::Interrupted { name }))
        })
        .boxed()
    }
}

impl Importer for ObjImporter {
    fn import_from_payload(&self, payload: ImportPayload) -> ImportFuture {
        // Unknown extensions resolve without a worker
        if !payload.has_extension("obj") {
            let name = payload.name;
            return future::ready(Err(ImportError::InvalidFormat { name })).boxed();
        }
        let name = payload.name.clone();
        Self::spawn_worker(name, move || Self::decode(&payload))
    }

    fn import_from_path(&self, path: PathBuf) -> ImportFuture {
        let name = file_name(&path);
        if !has_extension(&name, "obj") {
            return future::ready(Err(ImportError::InvalidFormat { name })).boxed();
        }
        Self::spawn_worker(name, move || {
            let payload = ImportPayload::from_path(&path).map_err(|source| ImportError::Read {
                path: path.clone(),
                source,
            })?;
            Self::decode(&payload)
        })
    }
}
