//! Image generation: units are diffusion steps from `request_config.steps`.

use async_trait::async_trait;
use std::sync::Arc;

use super::{note_fallback, paced_score, SpeedScore, SpeedScorer};
use crate::config::calibration::CalibrationTable;
use crate::error::ScoringError;
use crate::payload::{self, QueryResult, RequestConfig};
use crate::task::{Domain, Task};

/// Score an image response.
///
/// A task without image calibration scores [`SpeedScore::NEUTRAL`] (1.0).
pub fn score_image(
    result: &QueryResult,
    request_config: &RequestConfig,
    task: Task,
    table: &CalibrationTable,
) -> Result<SpeedScore, ScoringError> {
    let Some(c) = table.image(task) else {
        note_fallback(Domain::Image, task, "uncalibrated_task");
        return Ok(SpeedScore::NEUTRAL);
    };

    let response_time = result.checked_response_time()?;
    let steps = payload::steps(request_config)?;

    Ok(paced_score(response_time, steps, c).finish(Domain::Image, task, steps))
}

#[derive(Debug, Clone)]
pub struct ImageScorer {
    table: Arc<CalibrationTable>,
}

impl ImageScorer {
    pub fn new(table: Arc<CalibrationTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl SpeedScorer for ImageScorer {
    fn domain(&self) -> Domain {
        Domain::Image
    }

    async fn score(
        &self,
        result: &QueryResult,
        request_config: &RequestConfig,
        task: Task,
    ) -> Result<SpeedScore, ScoringError> {
        score_image(result, request_config, task, &self.table)
    }
}
