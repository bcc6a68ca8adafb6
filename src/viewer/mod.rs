pub mod asset;
pub mod automation;
pub mod ibl;
pub mod model;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to import {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("failed to load {path}: {reason}")]
    Asset { path: PathBuf, reason: String },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("no file ending in {suffix} inside {path}")]
    MissingCubemap { path: PathBuf, suffix: &'static str },
}
