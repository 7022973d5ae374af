// src/scoring/mod.rs
//! Speed scoring entry: one scorer per domain, a shared pacing step, and a
//! router that picks the scorer for a task.
//!
//! Every scorer is a pure function of `(result, request_config, task, table)`.
//! The async [`SpeedScorer`] wrappers exist so callers can hold them next to
//! I/O-bound scorers; they never suspend.

pub mod chat;
pub mod embedding;
pub mod image;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::calibration::{self, CalibrationTable, TaskConstants};
use crate::curves::{speed_modifier, work_bonus};
use crate::error::{ConfigError, ScoringError};
use crate::payload::{QueryResult, RequestConfig, ScoreRequest};
use crate::task::{Domain, Task};

// Re-export convenient entry points.
pub use chat::{score_chat, ChatScorer};
pub use embedding::{score_embeddings, EmbeddingScorer};
pub use image::{score_image, ImageScorer};

/// Latency floor after subtracting overhead, in seconds.
pub const MIN_WORK_TIME: f64 = 0.1;

/// Outcome of a scorer.
///
/// `NotApplicable` means "this scorer does not cover the task" and must not be
/// read as zero or as neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedScore {
    Score(f64),
    NotApplicable,
}

impl SpeedScore {
    /// No penalty, no bonus.
    pub const NEUTRAL: SpeedScore = SpeedScore::Score(1.0);

    pub fn value(self) -> Option<f64> {
        match self {
            SpeedScore::Score(v) => Some(v),
            SpeedScore::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, SpeedScore::Score(_))
    }
}

/// Speed and bonus for a job of `units`, paced against `c`.
///
/// Shared by the image and chat scorers: overhead comes off the latency
/// (floored at [`MIN_WORK_TIME`]), the remainder is spread over the units.
/// `units` must be non-zero.
pub(crate) fn paced_score(response_time: f64, units: u64, c: &TaskConstants) -> Paced {
    let time_without_overhead = (response_time - c.overhead).max(MIN_WORK_TIME);
    let per_unit = time_without_overhead / units as f64;
    let speed = speed_modifier(per_unit, c.lower_bound, c.upper_bound);
    let bonus = work_bonus(units, c.overhead, c.lower_bound);
    Paced {
        per_unit,
        speed,
        bonus,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Paced {
    pub per_unit: f64,
    pub speed: f64,
    pub bonus: f64,
}

impl Paced {
    pub(crate) fn finish(self, domain: Domain, task: Task, units: u64) -> SpeedScore {
        let score = self.speed * self.bonus;
        debug!(
            target: "speed_scoring",
            %domain, %task, units,
            per_unit = self.per_unit,
            speed = self.speed,
            bonus = self.bonus,
            score,
            "scored"
        );
        count_scored(domain);
        SpeedScore::Score(score)
    }
}

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "speed_scoring_scored_total",
            "Responses scored from calibrated speed and work bonus."
        );
        describe_counter!(
            "speed_scoring_fallback_total",
            "Responses given a neutral or not-applicable outcome."
        );
    });
}

pub(crate) fn count_scored(domain: Domain) {
    ensure_metrics_described();
    counter!("speed_scoring_scored_total", "domain" => domain.as_str()).increment(1);
}

/// Record a defined non-error fallback (neutral score or not applicable).
pub(crate) fn note_fallback(domain: Domain, task: Task, reason: &'static str) {
    warn!(target: "speed_scoring", %domain, %task, reason, "fallback");
    ensure_metrics_described();
    counter!(
        "speed_scoring_fallback_total",
        "domain" => domain.as_str(),
        "reason" => reason
    )
    .increment(1);
}

/// Uniform async face of the three domain scorers.
#[async_trait]
pub trait SpeedScorer: Send + Sync {
    fn domain(&self) -> Domain;

    async fn score(
        &self,
        result: &QueryResult,
        request_config: &RequestConfig,
        task: Task,
    ) -> Result<SpeedScore, ScoringError>;
}

/// All three scorers over one calibration table.
#[derive(Debug, Clone)]
pub struct ScorerSet {
    image: ImageScorer,
    chat: ChatScorer,
    embedding: EmbeddingScorer,
}

impl ScorerSet {
    pub fn new(table: Arc<CalibrationTable>) -> Self {
        Self {
            image: ImageScorer::new(Arc::clone(&table)),
            chat: ChatScorer::new(Arc::clone(&table)),
            embedding: EmbeddingScorer::new(table),
        }
    }

    /// Scorers over the process-wide table; fails when the calibration is rejected.
    pub fn from_global() -> Result<Self, ConfigError> {
        Ok(Self::new(calibration::global()?))
    }

    pub fn for_domain(&self, domain: Domain) -> &dyn SpeedScorer {
        match domain {
            Domain::Image => &self.image,
            Domain::Chat => &self.chat,
            Domain::Embedding => &self.embedding,
        }
    }

    /// Route to the scorer covering `task`'s domain.
    pub async fn score_for_task(
        &self,
        result: &QueryResult,
        request_config: &RequestConfig,
        task: Task,
    ) -> Result<SpeedScore, ScoringError> {
        self.for_domain(task.domain())
            .score(result, request_config, task)
            .await
    }
}

/// One line of CLI output: `score` is `null` when the task isn't covered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub task: Task,
    pub domain: Domain,
    pub score: Option<f64>,
    pub applicable: bool,
}

impl ScoreReport {
    pub fn new(task: Task, outcome: SpeedScore) -> Self {
        Self {
            task,
            domain: task.domain(),
            score: outcome.value(),
            applicable: outcome.is_applicable(),
        }
    }
}

impl ScorerSet {
    /// Score a full request and shape the outcome for output.
    pub async fn report(&self, req: &ScoreRequest) -> Result<ScoreReport, ScoringError> {
        let outcome = self
            .score_for_task(&req.result, &req.request_config, req.task)
            .await?;
        Ok(ScoreReport::new(req.task, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_and_not_applicable_differ() {
        assert_eq!(SpeedScore::NEUTRAL.value(), Some(1.0));
        assert_eq!(SpeedScore::NotApplicable.value(), None);
        assert!(!SpeedScore::NotApplicable.is_applicable());
        assert_ne!(SpeedScore::NEUTRAL, SpeedScore::NotApplicable);
    }

    #[test]
    fn serializes_distinguishably() {
        assert_eq!(
            serde_json::to_string(&SpeedScore::Score(2.5)).unwrap(),
            r#"{"score":2.5}"#
        );
        assert_eq!(
            serde_json::to_string(&SpeedScore::NotApplicable).unwrap(),
            r#""not_applicable""#
        );
    }

    #[test]
    fn paced_floors_work_time() {
        let c = TaskConstants::new(3.0, 0.5, 1.5);
        // 1s latency < overhead → 0.1s / 10 steps
        let p = paced_score(1.0, 10, &c);
        assert!((p.per_unit - 0.01).abs() < 1e-12);
        assert_eq!(p.speed, 1.0);
    }

    #[tokio::test]
    async fn global_set_scores_with_process_table() {
        calibration::global().unwrap().validate().unwrap();
        let set = ScorerSet::from_global().unwrap();
        let s = set
            .score_for_task(
                &QueryResult::new(30.0, serde_json::Value::Null),
                &RequestConfig::new(),
                Task::Upscale,
            )
            .await
            .unwrap();
        assert_eq!(s, SpeedScore::NEUTRAL);
    }

    #[test]
    fn report_serializes_null_score_when_not_applicable() {
        let r = ScoreReport::new(Task::ChatLlama3, SpeedScore::NotApplicable);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            serde_json::json!({
                "task": "chat_llama_3",
                "domain": "chat",
                "score": null,
                "applicable": false
            })
        );
    }

    #[test]
    fn fallbacks_and_scores_are_counted_by_domain() {
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let table = CalibrationTable::default_seed();

        metrics::with_local_recorder(&recorder, || {
            let empty = QueryResult::new(2.0, serde_json::json!([{ "text": "" }]));
            score_chat(&empty, &RequestConfig::new(), Task::ChatMixtral, &table).unwrap();
            let cfg = serde_json::json!({ "steps": 10 }).as_object().cloned().unwrap();
            let fast = QueryResult::new(4.0, serde_json::Value::Null);
            score_image(&fast, &cfg, Task::ProteusTextToImage, &table).unwrap();
        });

        let counted = |name: &str, label: (&str, &str)| {
            snapshotter
                .snapshot()
                .into_vec()
                .into_iter()
                .find(|(key, ..)| {
                    key.key().name() == name
                        && key
                            .key()
                            .labels()
                            .any(|l| l.key() == label.0 && l.value() == label.1)
                })
                .map(|(.., v)| v)
        };
        assert_eq!(
            counted("speed_scoring_fallback_total", ("reason", "empty_text")),
            Some(DebugValue::Counter(1))
        );
        assert_eq!(
            counted("speed_scoring_scored_total", ("domain", "image")),
            Some(DebugValue::Counter(1))
        );
    }

    #[test]
    fn router_picks_domain_scorer() {
        let set = ScorerSet::new(Arc::new(CalibrationTable::default_seed()));
        for t in Task::ALL {
            assert_eq!(set.for_domain(t.domain()).domain(), t.domain());
        }
    }
}
