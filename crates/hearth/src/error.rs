//! Error types.
//!
//! Every fallible engine operation returns one of these. None of them escape a
//! system: systems log the error and skip the entity that produced it.

use std::path::PathBuf;

/// Failures reported by a [`Renderer`](crate::render::Renderer).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load mesh '{path}': {reason}")]
    MeshLoad { path: PathBuf, reason: String },
    #[error("failed to create procedural mesh: {0}")]
    MeshCreation(String),
    #[error("unknown mesh handle {0}")]
    UnknownMesh(u32),
}

/// Failures reported by the physics layer.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("physics backend failed to initialize: {0}")]
    InitFailed(String),
    #[error("physics backend is not available")]
    Unavailable,
    #[error("unsupported collider shape: {0}")]
    UnsupportedShape(String),
    #[error("invalid collider dimensions: {0}")]
    InvalidShape(String),
    #[error("unknown shape handle {0}")]
    UnknownShape(u32),
    #[error("body creation failed: {0}")]
    BodyCreation(String),
}

/// Failures while building or loading new system code.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to run build command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("build failed (exit code {code:?}):\n{output}")]
    BuildFailed { code: Option<i32>, output: String },
    #[error("failed to load system unit: {0}")]
    Load(String),
    #[error("failed to watch '{path}': {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Failures while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Failure parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color '{0}'")]
pub struct ColorParseError(pub String);
