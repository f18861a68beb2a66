//! Error types.
//!
//! Only the importer and configuration loading can fail. Deforming or picking
//! something without geometry, and deforming with nothing selected, are not
//! errors: those requests are dropped.

use std::path::PathBuf;

use thiserror::Error;

/// Why an import request produced no object
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not a container this importer understands
    #[error("`{name}` is not a supported model file, expected a .obj file")]
    InvalidFormat { name: String },

    /// The container was recognised but its content could not be decoded
    #[error("failed to decode `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: tobj::LoadError,
    },

    /// Decoding worked but produced no geometry to place in the scene
    #[error("`{name}` contains no meshes")]
    EmptyModel { name: String },

    /// The model file could not be read
    #[error("failed to read model {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker decoding `name` went away without handing back a result
    #[error("import of `{name}` stopped before it finished")]
    Interrupted { name: String },
}

impl ImportError {
    /// True for errors raised before the payload was decoded
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, ImportError::InvalidFormat { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
