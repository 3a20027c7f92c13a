//! # Emotion Mirror Common Library
//!
//! Shared code for the emotion mirror workspace including:
//! - The fixed emotion label set
//! - Per-label scores, normalization and deterministic ranking
//! - Session snapshots and event types (EmotionEvent, EventBus)
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod labels;
pub mod scores;

pub use error::{Error, Result};
pub use labels::EmotionLabel;
pub use scores::{normalize, normalize_and_rank, rank, EmotionScore, NormalizedDistribution};
