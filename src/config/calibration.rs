// src/config/calibration.rs
//! # Calibration table
//!
//! Per-task constants `{overhead, lower_bound, upper_bound}` for every scorer,
//! keyed by task wire name.
//!
//! - Built-in `default_seed()` mirrors the production-tuned values.
//! - Optional override file in TOML or JSON (see `load_default`).
//! - Every table is validated once when built; scorers never re-check.
//!
//! TOML shape:
//! ```toml
//! [embedding]
//! overhead = 1.0
//! lower_bound = 0.5
//! upper_bound = 3.0
//!
//! [image.proteus_text_to_image]
//! overhead = 3.0
//! lower_bound = 0.5
//! upper_bound = 1.5
//!
//! [chat.chat_mixtral]
//! overhead = 1.0
//! lower_bound = 0.0142857
//! upper_bound = 0.0333333
//! ```
//! An omitted section keeps the seeded values; a present section replaces the
//! seeded one wholesale (a task left out of it scores as "no calibration").

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::ConfigError;
use crate::task::{Domain, Task};

pub const ENV_CALIBRATION_PATH: &str = "SPEED_CALIBRATION_PATH";
pub const DEFAULT_CALIBRATION_TOML: &str = "config/speed_calibration.toml";
pub const DEFAULT_CALIBRATION_JSON: &str = "config/speed_calibration.json";

/// Calibration for one task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskConstants {
    /// Fixed setup cost in seconds, subtracted before normalizing.
    pub overhead: f64,
    /// Per-unit time at or below which there is no penalty.
    pub lower_bound: f64,
    /// Per-unit time at or above which the speed modifier is zero.
    pub upper_bound: f64,
}

impl TaskConstants {
    pub const fn new(overhead: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            overhead,
            lower_bound,
            upper_bound,
        }
    }

    /// Check `overhead >= 0` and `upper_bound > lower_bound > 0`, all finite.
    pub fn validate(&self, label: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidConstants {
            task: label.to_string(),
            reason,
        };
        if ![self.overhead, self.lower_bound, self.upper_bound]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(invalid("constants must be finite".into()));
        }
        if self.overhead < 0.0 {
            return Err(invalid(format!("overhead {} < 0", self.overhead)));
        }
        if self.lower_bound <= 0.0 {
            return Err(invalid(format!("lower_bound {} <= 0", self.lower_bound)));
        }
        if self.upper_bound <= self.lower_bound {
            return Err(invalid(format!(
                "upper_bound {} <= lower_bound {}",
                self.upper_bound, self.lower_bound
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    image: BTreeMap<Task, TaskConstants>,
    chat: BTreeMap<Task, TaskConstants>,
    embedding: TaskConstants,
}

impl CalibrationTable {
    /// Build and validate a table.
    pub fn new(
        image: BTreeMap<Task, TaskConstants>,
        chat: BTreeMap<Task, TaskConstants>,
        embedding: TaskConstants,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            image,
            chat,
            embedding,
        };
        table.validate()?;
        Ok(table)
    }

    /// Constants for an image task, if it is calibrated.
    pub fn image(&self, task: Task) -> Option<&TaskConstants> {
        self.image.get(&task)
    }

    /// Constants for a chat task, if it is calibrated.
    pub fn chat(&self, task: Task) -> Option<&TaskConstants> {
        self.chat.get(&task)
    }

    pub fn embedding(&self) -> &TaskConstants {
        &self.embedding
    }

    /// Validate every entry; reports the first offender.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_section(&self.image, "image", Domain::Image)?;
        check_section(&self.chat, "chat", Domain::Chat)?;
        self.embedding.validate("embedding")
    }

    /// Built-in calibration.
    ///
    /// Chat bounds are seconds per character: 1/70 ≈ 17 tokens/s,
    /// 1/30 ≈ 7 tokens/s, 1/40 ≈ 10 tokens/s.
    pub fn default_seed() -> Self {
        const T2I_OVERHEAD: f64 = 3.0;
        const I2I_OVERHEAD: f64 = 3.0;
        const INPAINTING_OVERHEAD: f64 = 4.0;
        const AVATAR_OVERHEAD: f64 = 21.0;
        const CHAT_OVERHEAD: f64 = 1.0;

        let image = BTreeMap::from([
            (Task::ProteusTextToImage, TaskConstants::new(T2I_OVERHEAD, 0.5, 1.5)),
            (Task::DreamshaperTextToImage, TaskConstants::new(T2I_OVERHEAD, 0.5, 1.5)),
            (Task::PlaygroundTextToImage, TaskConstants::new(T2I_OVERHEAD, 0.2, 0.8)),
            (Task::ProteusImageToImage, TaskConstants::new(I2I_OVERHEAD, 0.6, 1.6)),
            (Task::DreamshaperImageToImage, TaskConstants::new(I2I_OVERHEAD, 0.6, 1.6)),
            (Task::PlaygroundImageToImage, TaskConstants::new(I2I_OVERHEAD, 0.3, 0.9)),
            (Task::JuggerInpainting, TaskConstants::new(INPAINTING_OVERHEAD, 0.5, 1.5)),
            (Task::Avatar, TaskConstants::new(AVATAR_OVERHEAD, 0.5, 1.5)),
        ]);

        let chat = BTreeMap::from([
            (Task::ChatMixtral, TaskConstants::new(CHAT_OVERHEAD, 1.0 / 70.0, 1.0 / 30.0)),
            (Task::ChatLlama3, TaskConstants::new(CHAT_OVERHEAD, 1.0 / 70.0, 1.0 / 40.0)),
        ]);

        Self {
            image,
            chat,
            embedding: TaskConstants::new(1.0, 0.5, 3.0),
        }
    }

    /// Load a table from an explicit path (TOML or JSON), seeded defaults
    /// filling any omitted section.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file = parse_calibration(&content, ext.as_str()).map_err(|reason| {
            ConfigError::Format {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        let table = Self::default_seed().merged(file)?;
        info!(
            path = %path.display(),
            image_tasks = table.image.len(),
            chat_tasks = table.chat.len(),
            "calibration loaded"
        );
        Ok(table)
    }

    /// Resolve the table using env var + fallbacks:
    /// 1) $SPEED_CALIBRATION_PATH
    /// 2) config/speed_calibration.toml
    /// 3) config/speed_calibration.json
    /// 4) built-in seed
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_CALIBRATION_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(ConfigError::MissingPath {
                var: ENV_CALIBRATION_PATH,
                path: pb,
            });
        }
        for candidate in [DEFAULT_CALIBRATION_TOML, DEFAULT_CALIBRATION_JSON] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
        }
        let seed = Self::default_seed();
        seed.validate()?;
        Ok(seed)
    }

    fn merged(mut self, file: CalibrationFile) -> Result<Self, ConfigError> {
        if let Some(image) = file.image {
            self.image = keyed_by_task(image)?;
        }
        if let Some(chat) = file.chat {
            self.chat = keyed_by_task(chat)?;
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        self.validate()?;
        Ok(self)
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

static GLOBAL: OnceCell<Arc<CalibrationTable>> = OnceCell::new();

/// Process-wide table, resolved on first successful use.
///
/// A rejected calibration is returned to the caller and not cached, so the
/// next call retries the load.
pub fn global() -> Result<Arc<CalibrationTable>, ConfigError> {
    GLOBAL
        .get_or_try_init(|| {
            CalibrationTable::load_default().map(Arc::new).map_err(|e| {
                error!(error = %e, "calibration rejected");
                e
            })
        })
        .map(Arc::clone)
}

/* ----------------------------
File schema
---------------------------- */

#[derive(Debug, Default, Deserialize)]
struct CalibrationFile {
    #[serde(default)]
    image: Option<HashMap<String, TaskConstants>>,
    #[serde(default)]
    chat: Option<HashMap<String, TaskConstants>>,
    #[serde(default)]
    embedding: Option<TaskConstants>,
}

fn parse_calibration(s: &str, hint_ext: &str) -> Result<CalibrationFile, String> {
    if hint_ext == "toml" {
        return toml::from_str(s).map_err(|e| e.to_string());
    }
    match serde_json::from_str(s) {
        Ok(f) => Ok(f),
        Err(json_err) => toml::from_str(s).map_err(|_| json_err.to_string()),
    }
}

fn keyed_by_task(
    raw: HashMap<String, TaskConstants>,
) -> Result<BTreeMap<Task, TaskConstants>, ConfigError> {
    raw.into_iter()
        .map(|(name, c)| {
            let task = name
                .parse::<Task>()
                .map_err(|e| ConfigError::InvalidConstants {
                    task: name.clone(),
                    reason: e.to_string(),
                })?;
            Ok::<_, ConfigError>((task, c))
        })
        .collect()
}

fn check_section(
    section: &BTreeMap<Task, TaskConstants>,
    name: &'static str,
    domain: Domain,
) -> Result<(), ConfigError> {
    for (task, c) in section {
        if task.domain() != domain {
            return Err(ConfigError::WrongSection {
                task: *task,
                section: name,
                domain: task.domain().as_str(),
            });
        }
        c.validate(task.as_str())?;
    }
    Ok(())
}
