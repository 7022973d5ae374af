// src/lib.rs
//! Speed scoring for answered inference queries.
//!
//! A score is `speed_modifier * work_bonus`: how close the per-unit latency
//! sits to a calibrated fast/slow band, times a sub-linear reward for the
//! amount of work requested. Three domains (image steps, chat characters,
//! embedding vectors) share the two curves in [`curves`].

pub mod config;
pub mod curves;
pub mod error;
pub mod payload;
pub mod scoring;
pub mod task;

// ---- Re-exports for stable public API ----
pub use crate::config::calibration::{CalibrationTable, TaskConstants};
pub use crate::curves::{speed_modifier, work_bonus};
pub use crate::error::{ConfigError, PayloadError, ScoringError};
pub use crate::payload::{QueryResult, RequestConfig, ScoreRequest};
pub use crate::scoring::{
    score_chat, score_embeddings, score_image, ScoreReport, ScorerSet, SpeedScore, SpeedScorer,
};
pub use crate::task::{Domain, Task};
