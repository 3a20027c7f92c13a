//! Deterministic classifiers for pipeline tests

use async_trait::async_trait;
use emo_common::{EmotionLabel, EmotionScore, Error, Result};
use emo_mirror::classifier::{EmotionClassifier, ImageData};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Raw scores where `winner` gets `share` and the rest split the remainder
pub fn scores_with_winner(winner: EmotionLabel, share: f64) -> Vec<EmotionScore> {
    let rest = (1.0 - share) / (EmotionLabel::COUNT - 1) as f64;
    EmotionLabel::ALL
        .iter()
        .map(|&label| EmotionScore::new(label, if label == winner { share } else { rest }))
        .collect()
}

/// Returns queued results in order; fails once the queue is empty
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<Vec<EmotionScore>>>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<Result<Vec<EmotionScore>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn analyze(&self, _image: &ImageData) -> Result<Vec<EmotionScore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::ClassifierFailure("script exhausted".into())))
    }
}

/// Blocks inside `analyze` until `release` is called
pub struct GatedClassifier {
    winner: EmotionLabel,
    gate: Arc<Notify>,
    entered: Arc<Notify>,
}

impl GatedClassifier {
    pub fn new(winner: EmotionLabel) -> Self {
        Self {
            winner,
            gate: Arc::new(Notify::new()),
            entered: Arc::new(Notify::new()),
        }
    }

    /// Let one waiting (or the next) analysis finish
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until an analysis is blocked inside the classifier
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl EmotionClassifier for GatedClassifier {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn analyze(&self, _image: &ImageData) -> Result<Vec<EmotionScore>> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(scores_with_winner(self.winner, 0.7))
    }
}
