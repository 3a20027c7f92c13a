//! Test helpers for emo-mirror integration tests
//!
//! - ScriptedClassifier: replays a fixed queue of classifier results
//! - GatedClassifier: holds each analysis until the test releases it

#![allow(dead_code)]

pub mod classifiers;

pub use classifiers::{scores_with_winner, GatedClassifier, ScriptedClassifier};

use emo_mirror::classifier::ImageData;

pub fn test_image() -> ImageData {
    ImageData::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap()
}
