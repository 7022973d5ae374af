//! speed-score — score one answered query.
//!
//! Reads a `ScoreRequest` JSON document from the path given as the first
//! argument (stdin when omitted) and prints the outcome as one JSON line.
//!
//! Calibration comes from `$SPEED_CALIBRATION_PATH` or `config/`, see
//! `config::calibration`. `.env` is honoured for local runs.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use speed_scoring::{CalibrationTable, ScoreRequest, ScorerSet};

/// Logs go to stderr so stdout stays a clean JSON line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("speed_scoring=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

async fn read_input(path: Option<String>) -> Result<String> {
    match path {
        Some(p) => tokio::fs::read_to_string(&p)
            .await
            .with_context(|| format!("reading request from {p}")),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading request from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // No-op when there is no .env.
    let _ = dotenvy::dotenv();
    init_tracing();

    let table = CalibrationTable::load_default().context("loading speed calibration")?;
    let scorers = ScorerSet::new(Arc::new(table));

    let raw = read_input(std::env::args().nth(1)).await?;
    let req: ScoreRequest = serde_json::from_str(&raw).context("parsing score request")?;

    let report = scorers
        .report(&req)
        .await
        .with_context(|| format!("scoring {}", req.task))?;
    info!(task = %req.task, score = ?report.score, "done");

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
