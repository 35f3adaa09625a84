use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or validating gameplay tuning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Scene integrity failures. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("scene node not found: {0}")]
    MissingNode(String),
    #[error("expecting scene to have exactly one camera, but it has {0}")]
    CameraCount(usize),
}

/// Audio output failures. The host falls back to a silent engine on these.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Device(#[from] rodio::StreamError),
    #[error("failed to open audio sink: {0}")]
    Sink(#[from] rodio::PlayError),
    #[error("failed to decode {sample}: {source}")]
    Decode {
        sample: &'static str,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

/// Everything that can stop the native host from getting to its first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
