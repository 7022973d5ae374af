//! Embedding generation: units are the vectors in the `clip_embeddings` payload.
//!
//! Unlike image and chat, the bonus here is linear (`count * lower + overhead`)
//! and the normalization credits 0.1 s per vector before dividing.

use async_trait::async_trait;
use std::sync::Arc;

use super::{count_scored, note_fallback, SpeedScore, SpeedScorer, MIN_WORK_TIME};
use crate::config::calibration::CalibrationTable;
use crate::curves::speed_modifier;
use crate::error::ScoringError;
use crate::payload::{self, QueryResult, RequestConfig};
use crate::task::{Domain, Task};
use tracing::debug;

/// Per-vector time credited back before normalizing.
const PER_EMBEDDING_CREDIT: f64 = 0.1;

/// Score an embeddings response. Zero vectors is [`SpeedScore::NEUTRAL`].
pub fn score_embeddings(
    result: &QueryResult,
    _request_config: &RequestConfig,
    task: Task,
    table: &CalibrationTable,
) -> Result<SpeedScore, ScoringError> {
    let count = payload::decode_embeddings(&result.formatted_response)?.len() as u64;
    let response_time = result.checked_response_time()?;

    if count == 0 {
        note_fallback(Domain::Embedding, task, "no_embeddings");
        return Ok(SpeedScore::NEUTRAL);
    }

    let c = table.embedding();
    let n = count as f64;
    let normalized =
        (response_time - c.overhead + PER_EMBEDDING_CREDIT * n).max(MIN_WORK_TIME) / n;
    let speed = speed_modifier(normalized, c.lower_bound, c.upper_bound);
    let bonus = n * c.lower_bound + c.overhead;
    let score = speed * bonus;

    debug!(
        target: "speed_scoring",
        domain = %Domain::Embedding, %task, units = count,
        per_unit = normalized, speed, bonus, score,
        "scored"
    );
    count_scored(Domain::Embedding);

    Ok(SpeedScore::Score(score))
}

#[derive(Debug, Clone)]
pub struct EmbeddingScorer {
    table: Arc<CalibrationTable>,
}

impl EmbeddingScorer {
    pub fn new(table: Arc<CalibrationTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl SpeedScorer for EmbeddingScorer {
    fn domain(&self) -> Domain {
        Domain::Embedding
    }

    async fn score(
        &self,
        result: &QueryResult,
        request_config: &RequestConfig,
        task: Task,
    ) -> Result<SpeedScore, ScoringError> {
        score_embeddings(result, request_config, task, &self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn vectors(n: usize) -> Value {
        let v = vec![vec![0.0_f32; 4]; n];
        json!({ "clip_embeddings": v })
    }

    fn run(rt: f64, payload: Value) -> Result<SpeedScore, ScoringError> {
        let table = CalibrationTable::default_seed();
        score_embeddings(
            &QueryResult::new(rt, payload),
            &RequestConfig::new(),
            Task::ClipImageEmbeddings,
            &table,
        )
    }

    #[test]
    fn quick_batch_gets_linear_bonus() {
        // (1 - 1 + 0.4) / 4 = 0.1 s/vector < 0.5
        let s = run(1.0, vectors(4)).unwrap().value().unwrap();
        assert!((s - (4.0 * 0.5 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn slow_batch_is_fully_penalized() {
        // (13 - 1 + 0.2) / 2 = 6.1 s/vector > 3
        assert_eq!(run(13.0, vectors(2)).unwrap(), SpeedScore::Score(0.0));
    }

    #[test]
    fn partial_penalty() {
        // (2.65 - 1 + 0.1) / 1 = 1.75 → t = 0.5 → 0.75 * 1.5
        let s = run(2.65, vectors(1)).unwrap().value().unwrap();
        assert!((s - 0.75 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn zero_embeddings_is_neutral() {
        assert_eq!(run(5.0, vectors(0)).unwrap(), SpeedScore::NEUTRAL);
    }

    #[test]
    fn wrong_shape_is_payload_error() {
        let err = run(1.0, json!([[0.1, 0.2]])).unwrap_err();
        assert!(matches!(err, ScoringError::Payload(_)));
    }
}
