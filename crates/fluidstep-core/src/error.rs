use std::error::Error;
use std::fmt;

/// Core-wide error.
///
/// Only setup mistakes and host teardown surface here. The per-frame hot path never produces one.
#[derive(Debug)]
pub enum FluidError {
    /// Graceful shutdown was requested.
    ExitRequested,

    /// The host reported itself disposed while a step was running.
    HostDisposed,

    /// Rejected configuration (non-positive rate, unusable interval, bad TOML).
    Config(String),

    /// An object was tracked under a kind with no registered accessor.
    UnsupportedKind(&'static str),

    /// Error produced by a module during a known lifecycle stage.
    Module {
        module_id: &'static str,
        stage: ModuleStage,
        cause: Box<FluidError>,
    },

    /// Generic error (fallback).
    Other(String),
}

/// Module lifecycle stage used for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStage {
    Init,
    FixedUpdate,
    Render,
    Shutdown,
}

impl FluidError {
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[inline]
    pub fn with_module_stage(module_id: &'static str, stage: ModuleStage, err: FluidError) -> Self {
        match err {
            FluidError::ExitRequested => FluidError::ExitRequested,
            FluidError::HostDisposed => FluidError::HostDisposed,
            other => FluidError::Module {
                module_id,
                stage,
                cause: Box::new(other),
            },
        }
    }

    /// True for the errors that end a run without being a failure.
    #[inline]
    pub fn is_exit(&self) -> bool {
        matches!(self, FluidError::ExitRequested)
    }
}

impl fmt::Display for FluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidError::ExitRequested => write!(f, "exit requested"),
            FluidError::HostDisposed => write!(f, "host disposed during update"),
            FluidError::Config(s) => write!(f, "configuration error: {s}"),
            FluidError::UnsupportedKind(kind) => {
                write!(f, "no accessor registered for object kind '{kind}'")
            }
            FluidError::Other(s) => write!(f, "{s}"),
            FluidError::Module {
                module_id,
                stage,
                cause,
            } => write!(f, "module '{module_id}' stage {stage:?}: {cause}"),
        }
    }
}

impl Error for FluidError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FluidError::Module { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<&str> for FluidError {
    #[inline]
    fn from(value: &str) -> Self {
        FluidError::Other(value.to_string())
    }
}

impl From<String> for FluidError {
    #[inline]
    fn from(value: String) -> Self {
        FluidError::Other(value)
    }
}

pub type FluidResult<T> = Result<T, FluidError>;
