// src/payload.rs
//! Typed views of what a worker sent back and what was asked of it.
//!
//! The scorers only need plain counts: steps from the request config,
//! characters from chat fragments, vectors from an embeddings payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::task::Task;

/// Request parameters as forwarded to the worker (`{"steps": 30, ...}`).
pub type RequestConfig = Map<String, Value>;

/// One answered query: wall-clock latency plus the raw formatted payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Seconds.
    pub response_time: f64,
    #[serde(default)]
    pub formatted_response: Value,
}

impl QueryResult {
    pub fn new(response_time: f64, formatted_response: Value) -> Self {
        Self {
            response_time,
            formatted_response,
        }
    }

    /// Latency, rejected when negative or non-finite.
    pub fn checked_response_time(&self) -> Result<f64, PayloadError> {
        let t = self.response_time;
        if t.is_finite() && t >= 0.0 {
            Ok(t)
        } else {
            Err(PayloadError::InvalidResponseTime(t))
        }
    }
}

/// Everything one scoring call needs, as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub task: Task,
    pub result: QueryResult,
    #[serde(default)]
    pub request_config: RequestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFragment {
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsPayload {
    clip_embeddings: Vec<Vec<f32>>,
}

/// Requested step count; `1` when the config doesn't say.
pub fn steps(cfg: &RequestConfig) -> Result<u64, PayloadError> {
    match cfg.get("steps") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 => Ok(n),
            _ => Err(PayloadError::InvalidSteps(v.clone())),
        },
    }
}

/// `{"clip_embeddings": [[f32, ..], ..]}` → the vectors.
pub fn decode_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, PayloadError> {
    EmbeddingsPayload::deserialize(payload)
        .map(|p| p.clip_embeddings)
        .map_err(PayloadError::Embeddings)
}

/// Chat records, either as a JSON array or as a string holding one.
pub fn decode_chat(payload: &Value) -> Result<Vec<ChatFragment>, PayloadError> {
    match payload {
        Value::String(raw) => serde_json::from_str(raw).map_err(PayloadError::Chat),
        other => Vec::<ChatFragment>::deserialize(other).map_err(PayloadError::Chat),
    }
}

/// Length of all fragments concatenated, in chars.
pub fn char_count(fragments: &[ChatFragment]) -> u64 {
    fragments.iter().map(|f| f.text.chars().count() as u64).sum()
}
