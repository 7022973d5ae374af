//! Chat / text generation: units are characters across all returned fragments.

use async_trait::async_trait;
use std::sync::Arc;

use super::{note_fallback, paced_score, SpeedScore, SpeedScorer};
use crate::config::calibration::CalibrationTable;
use crate::error::ScoringError;
use crate::payload::{self, QueryResult, RequestConfig};
use crate::task::{Domain, Task};

/// Score a chat response.
///
/// Order matters: the payload is decoded first (shape errors propagate),
/// empty text is [`SpeedScore::NEUTRAL`] for any task, then a task without
/// chat calibration is [`SpeedScore::NotApplicable`] before latency is checked.
pub fn score_chat(
    result: &QueryResult,
    _request_config: &RequestConfig,
    task: Task,
    table: &CalibrationTable,
) -> Result<SpeedScore, ScoringError> {
    let fragments = payload::decode_chat(&result.formatted_response)?;
    let chars = payload::char_count(&fragments);

    if chars == 0 {
        note_fallback(Domain::Chat, task, "empty_text");
        return Ok(SpeedScore::NEUTRAL);
    }

    let Some(c) = table.chat(task) else {
        note_fallback(Domain::Chat, task, "not_applicable");
        return Ok(SpeedScore::NotApplicable);
    };

    let response_time = result.checked_response_time()?;

    Ok(paced_score(response_time, chars, c).finish(Domain::Chat, task, chars))
}

#[derive(Debug, Clone)]
pub struct ChatScorer {
    table: Arc<CalibrationTable>,
}

impl ChatScorer {
    pub fn new(table: Arc<CalibrationTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl SpeedScorer for ChatScorer {
    fn domain(&self) -> Domain {
        Domain::Chat
    }

    async fn score(
        &self,
        result: &QueryResult,
        request_config: &RequestConfig,
        task: Task,
    ) -> Result<SpeedScore, ScoringError> {
        score_chat(result, request_config, task, &self.table)
    }
}
