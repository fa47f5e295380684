use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("could not determine config directory")]
    NoConfigDir,
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("outline needs at least 3 points, got {0}")]
    DegenerateOutline(usize),

    #[error("cap tessellation failed: {0}")]
    Tessellation(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("no audio device attached")]
    NoDevice,

    #[error("playback blocked: {0}")]
    Blocked(String),
}
