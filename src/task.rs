//! Task variants and the domain each one is scored under.
//!
//! Wire names are snake_case and stable; they are also the keys used in the
//! calibration files (`config/speed_calibration.toml`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PayloadError;

/// Which scorer covers a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Image,
    Chat,
    Embedding,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Image => "image",
            Domain::Chat => "chat",
            Domain::Embedding => "embedding",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    ProteusTextToImage,
    DreamshaperTextToImage,
    PlaygroundTextToImage,
    ProteusImageToImage,
    DreamshaperImageToImage,
    PlaygroundImageToImage,
    JuggerInpainting,
    Avatar,
    Upscale,
    ChatMixtral,
    #[serde(rename = "chat_llama_3")]
    ChatLlama3,
    ClipImageEmbeddings,
}

impl Task {
    pub const ALL: [Task; 12] = [
        Task::ProteusTextToImage,
        Task::DreamshaperTextToImage,
        Task::PlaygroundTextToImage,
        Task::ProteusImageToImage,
        Task::DreamshaperImageToImage,
        Task::PlaygroundImageToImage,
        Task::JuggerInpainting,
        Task::Avatar,
        Task::Upscale,
        Task::ChatMixtral,
        Task::ChatLlama3,
        Task::ClipImageEmbeddings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Task::ProteusTextToImage => "proteus_text_to_image",
            Task::DreamshaperTextToImage => "dreamshaper_text_to_image",
            Task::PlaygroundTextToImage => "playground_text_to_image",
            Task::ProteusImageToImage => "proteus_image_to_image",
            Task::DreamshaperImageToImage => "dreamshaper_image_to_image",
            Task::PlaygroundImageToImage => "playground_image_to_image",
            Task::JuggerInpainting => "jugger_inpainting",
            Task::Avatar => "avatar",
            Task::Upscale => "upscale",
            Task::ChatMixtral => "chat_mixtral",
            Task::ChatLlama3 => "chat_llama_3",
            Task::ClipImageEmbeddings => "clip_image_embeddings",
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            Task::ProteusTextToImage
            | Task::DreamshaperTextToImage
            | Task::PlaygroundTextToImage
            | Task::ProteusImageToImage
            | Task::DreamshaperImageToImage
            | Task::PlaygroundImageToImage
            | Task::JuggerInpainting
            | Task::Avatar
            | Task::Upscale => Domain::Image,
            Task::ChatMixtral | Task::ChatLlama3 => Domain::Chat,
            Task::ClipImageEmbeddings => Domain::Embedding,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| PayloadError::UnknownTask(s.to_string()))
    }
}
