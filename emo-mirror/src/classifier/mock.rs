//! Mock classifier standing in for a real emotion model
//!
//! Waits a simulated inference latency, then draws each label's raw score
//! uniformly from a fixed range. The scores are deliberately not normalized.

use super::{EmotionClassifier, ImageData};
use async_trait::async_trait;
use emo_common::config::ClassifierConfig;
use emo_common::{EmotionLabel, EmotionScore, Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Raw score range `[low, high)` per label
const SCORE_RANGES: [(EmotionLabel, f64, f64); EmotionLabel::COUNT] = [
    (EmotionLabel::Happy, 0.30, 0.70),
    (EmotionLabel::Sad, 0.10, 0.40),
    (EmotionLabel::Angry, 0.05, 0.25),
    (EmotionLabel::Surprised, 0.10, 0.35),
    (EmotionLabel::Neutral, 0.20, 0.50),
    (EmotionLabel::Fear, 0.05, 0.20),
    (EmotionLabel::Disgust, 0.02, 0.12),
];

pub struct MockClassifier {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl MockClassifier {
    /// Random scores on every call
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible score sequence for a given seed
    pub fn with_seed(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(config.latency(), seed),
            None => Self::new(config.latency()),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn draw_scores(&self) -> Result<Vec<EmotionScore>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::ClassifierFailure("mock RNG lock poisoned".to_string()))?;

        Ok(SCORE_RANGES
            .iter()
            .map(|&(label, low, high)| EmotionScore::new(label, rng.gen_range(low..high)))
            .collect())
    }
}

#[async_trait]
impl EmotionClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, image: &ImageData) -> Result<Vec<EmotionScore>> {
        debug!(
            "Mock classifier analyzing {} bytes of {}",
            image.len(),
            image.mime_type()
        );
        tokio::time::sleep(self.latency).await;
        self.draw_scores()
    }
}
