//! Emotion label set
//!
//! The classifier reports exactly one score per label. Declaration order is
//! the canonical order used to break ranking ties, so `Ord` on
//! [`EmotionLabel`] follows it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the seven fixed emotion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fear,
    Disgust,
    Neutral,
}

impl EmotionLabel {
    /// Number of labels in the set
    pub const COUNT: usize = 7;

    /// All labels in canonical order
    pub const ALL: [EmotionLabel; Self::COUNT] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Surprised,
        EmotionLabel::Fear,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    /// Position in the canonical order (0-based)
    pub fn canonical_index(self) -> usize {
        self as usize
    }

    /// Lowercase name as reported by the classifier
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Surprised => "surprised",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Display colour used for chart bars and the avatar glow
    pub fn color_hex(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "#10B981",
            EmotionLabel::Sad => "#3B82F6",
            EmotionLabel::Angry => "#EF4444",
            EmotionLabel::Surprised => "#F59E0B",
            EmotionLabel::Fear => "#8B5CF6",
            EmotionLabel::Disgust => "#EC4899",
            EmotionLabel::Neutral => "#6B7280",
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown emotion label: '{}'", s)))
    }
}
