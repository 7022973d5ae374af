// src/error.rs
//! Error taxonomy for the scorers.
//!
//! - [`ConfigError`]: a calibration table that breaks `upper > lower > 0`
//!   or can't be read. Raised at load time, never per call.
//! - [`PayloadError`]: the worker payload or request config doesn't have
//!   the shape a domain needs. Propagated untouched.
//!
//! Degenerate inputs (empty text, zero embeddings, unknown task) are not
//! errors; they map to a defined `SpeedScore`.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::Task;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("calibration for {task}: {reason}")]
    InvalidConstants { task: String, reason: String },

    #[error("reading calibration from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{var} points to non-existent path {path}")]
    MissingPath { var: &'static str, path: PathBuf },

    #[error("unsupported calibration format in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("{task} is listed under the {section} section but belongs to the {domain} domain")]
    WrongSection {
        task: Task,
        section: &'static str,
        domain: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("unknown task `{0}`")]
    UnknownTask(String),

    #[error("response_time must be finite and >= 0, got {0}")]
    InvalidResponseTime(f64),

    #[error("request_config.steps must be a positive integer, got {0}")]
    InvalidSteps(serde_json::Value),

    #[error("malformed embeddings payload: {0}")]
    Embeddings(#[source] serde_json::Error),

    #[error("malformed chat payload: {0}")]
    Chat(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
