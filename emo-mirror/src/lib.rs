//! # Emotion Mirror Engine (emo-mirror)
//!
//! Score pipeline and reactive fan-out for single-image emotion analysis.
//!
//! **Purpose:** Run an image through an asynchronous classifier, normalize
//! and rank the raw scores, publish the resulting session, and let
//! independent consumers derive their own state from it.
//!
//! **Architecture:** classifier → normalizer → ranker → publisher →
//! {avatar, environment, bias feedback}. Consumers only read snapshots; none
//! writes back into the publisher or into another consumer.

pub mod avatar;
pub mod bias;
pub mod classifier;
pub mod consumer;
pub mod environment;
pub mod publisher;

pub use emo_common::{Error, Result};
pub use publisher::EmotionStatePublisher;
