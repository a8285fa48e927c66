//! Error types for drawing, planning and configuration

use thiserror::Error;

/// Rejected shape parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{shape} needs at least {min} samples, got {got}")]
    TooFewSamples {
        shape: &'static str,
        min: usize,
        got: usize,
    },

    #[error("invalid {name} for {shape}: {value}")]
    InvalidParameter {
        shape: &'static str,
        name: &'static str,
        value: f64,
    },
}

/// Failure talking to the motion backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("motion backend unavailable: {0}")]
    Unavailable(String),

    #[error("motion backend request failed: {0}")]
    Request(String),
}

/// Failure handing a marker to the display channel
#[derive(Debug, Error)]
#[error("failed to publish marker {id}: {reason}")]
pub struct DisplayError {
    pub id: i32,
    pub reason: String,
}

/// Failure running a single trajectory
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("cannot execute an empty trajectory")]
    EmptyTrajectory,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure composing a drawing
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("shape {index} of group '{group}': {source}")]
    Geometry {
        group: String,
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("no shape group named '{0}'")]
    UnknownGroup(String),
}

/// Failure loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: f64 },
}
