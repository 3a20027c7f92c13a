//! Emotion scores, normalization and ranking
//!
//! Raw classifier output is one [`EmotionScore`] per label with confidences
//! that need not sum to 1. [`normalize`] turns that into a
//! [`NormalizedDistribution`] summing to 1 (uniform when every raw score is
//! zero), and [`rank`] orders it descending by confidence with ties broken by
//! canonical label order.

use crate::{EmotionLabel, Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Allowed deviation of a normalized distribution's sum from 1.0
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Confidence attached to a single label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: EmotionLabel,
    pub confidence: f64,
}

impl EmotionScore {
    pub fn new(label: EmotionLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// Confidence as a percentage (0.8 → 80.0)
    pub fn percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Distribution over the full label set, summing to 1 within [`SUM_TOLERANCE`]
///
/// Only produced by [`normalize`], [`rank`] or validated deserialization, so
/// a value of this type always holds every label exactly once. Deserialization
/// keeps the given order: a distribution read back on its own is not
/// necessarily ranked (see [`Self::is_ranked`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EmotionScore>", into = "Vec<EmotionScore>")]
pub struct NormalizedDistribution {
    scores: Vec<EmotionScore>,
}

impl NormalizedDistribution {
    /// Every label at `1/7`, in canonical order
    pub fn uniform() -> Self {
        let share = 1.0 / EmotionLabel::COUNT as f64;
        Self {
            scores: EmotionLabel::ALL
                .iter()
                .map(|&label| EmotionScore::new(label, share))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmotionScore> {
        self.scores.iter()
    }

    pub fn as_slice(&self) -> &[EmotionScore] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// First entry; the top emotion once the distribution is ranked
    pub fn top(&self) -> EmotionScore {
        // Never empty: every constructor covers the full label set
        self.scores[0]
    }

    /// Confidence assigned to `label`
    pub fn confidence_of(&self, label: EmotionLabel) -> f64 {
        self.scores
            .iter()
            .find(|score| score.label == label)
            .map(|score| score.confidence)
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().map(|score| score.confidence).sum()
    }

    /// True when entries are in descending confidence with canonical tie order
    pub fn is_ranked(&self) -> bool {
        self.scores
            .windows(2)
            .all(|pair| ranking_order(&pair[0], &pair[1]) != Ordering::Greater)
    }
}

impl TryFrom<Vec<EmotionScore>> for NormalizedDistribution {
    type Error = Error;

    fn try_from(scores: Vec<EmotionScore>) -> Result<Self> {
        validate_score_set(&scores)?;
        let total: f64 = scores.iter().map(|score| score.confidence).sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(Error::InvalidScoreSet(format!(
                "distribution sums to {}, expected 1.0",
                total
            )));
        }
        Ok(Self { scores })
    }
}

impl From<NormalizedDistribution> for Vec<EmotionScore> {
    fn from(distribution: NormalizedDistribution) -> Self {
        distribution.scores
    }
}

/// Check that `scores` holds every label exactly once with finite, non-negative confidences
fn validate_score_set(scores: &[EmotionScore]) -> Result<()> {
    let mut seen = [false; EmotionLabel::COUNT];

    for score in scores {
        let slot = &mut seen[score.label.canonical_index()];
        if *slot {
            return Err(Error::InvalidScoreSet(format!(
                "duplicate label '{}'",
                score.label
            )));
        }
        *slot = true;

        if !score.confidence.is_finite() || score.confidence < 0.0 {
            return Err(Error::InvalidScoreSet(format!(
                "confidence for '{}' must be a non-negative number, got {}",
                score.label, score.confidence
            )));
        }
    }

    let missing: Vec<&str> = EmotionLabel::ALL
        .iter()
        .filter(|label| !seen[label.canonical_index()])
        .map(|label| label.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(Error::InvalidScoreSet(format!(
            "missing labels: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Normalize raw classifier scores so they sum to 1
///
/// Input order is preserved. An all-zero score set falls back to the uniform
/// distribution instead of dividing by zero. Scores are scaled by the largest
/// confidence before summing, so any finite input normalizes without overflow.
///
/// # Errors
/// [`Error::InvalidScoreSet`] when a label is missing or duplicated, or a
/// confidence is negative or non-finite.
pub fn normalize(raw: &[EmotionScore]) -> Result<NormalizedDistribution> {
    validate_score_set(raw)?;

    let max = raw
        .iter()
        .map(|score| score.confidence)
        .fold(0.0_f64, f64::max);
    if max == 0.0 {
        debug!("All raw scores are zero, using uniform distribution");
        return Ok(NormalizedDistribution::uniform());
    }

    // Each scaled value is in [0, 1], so the sum is at most the label count
    let total: f64 = raw.iter().map(|score| score.confidence / max).sum();

    Ok(NormalizedDistribution {
        scores: raw
            .iter()
            .map(|score| EmotionScore::new(score.label, score.confidence / max / total))
            .collect(),
    })
}

/// Descending confidence, then canonical label order
fn ranking_order(a: &EmotionScore, b: &EmotionScore) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.label.cmp(&b.label))
}

/// Order a distribution descending by confidence
///
/// Equal confidences keep canonical label order
/// (`happy, sad, angry, surprised, fear, disgust, neutral`), so the uniform
/// fallback ranks in exactly that order.
pub fn rank(mut distribution: NormalizedDistribution) -> NormalizedDistribution {
    distribution.scores.sort_by(ranking_order);
    distribution
}

/// [`normalize`] followed by [`rank`]
pub fn normalize_and_rank(raw: &[EmotionScore]) -> Result<NormalizedDistribution> {
    normalize(raw).map(rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use EmotionLabel::*;

    fn raw(values: [(EmotionLabel, f64); 7]) -> Vec<EmotionScore> {
        values
            .iter()
            .map(|&(label, confidence)| EmotionScore::new(label, confidence))
            .collect()
    }

    fn happy_sad_example() -> Vec<EmotionScore> {
        raw([
            (Happy, 0.8),
            (Sad, 0.2),
            (Angry, 0.0),
            (Surprised, 0.0),
            (Neutral, 0.0),
            (Fear, 0.0),
            (Disgust, 0.0),
        ])
    }

    #[test]
    fn test_normalize_already_unit_sum() {
        let dist = normalize(&happy_sad_example()).unwrap();
        assert!((dist.total() - 1.0).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Happy) - 0.8).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Sad) - 0.2).abs() < SUM_TOLERANCE);
        assert_eq!(dist.confidence_of(Fear), 0.0);
    }

    #[test]
    fn test_normalize_scales_by_total() {
        let dist = normalize(&raw([
            (Happy, 0.6),
            (Sad, 0.3),
            (Angry, 0.1),
            (Surprised, 0.2),
            (Fear, 0.1),
            (Disgust, 0.1),
            (Neutral, 0.6),
        ]))
        .unwrap();

        assert!((dist.total() - 1.0).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Happy) - 0.3).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Angry) - 0.05).abs() < SUM_TOLERANCE);
        // Input order preserved until ranked
        assert_eq!(dist.as_slice()[0].label, Happy);
        assert_eq!(dist.as_slice()[6].label, Neutral);
    }

    #[test]
    fn test_all_zero_falls_back_to_uniform() {
        let zeros: Vec<EmotionScore> = EmotionLabel::ALL
            .iter()
            .rev()
            .map(|&label| EmotionScore::new(label, 0.0))
            .collect();

        let dist = normalize(&zeros).unwrap();
        assert_eq!(dist, NormalizedDistribution::uniform());
        for score in dist.iter() {
            assert!((score.confidence - 1.0 / 7.0).abs() < SUM_TOLERANCE);
        }
    }

    #[test]
    fn test_missing_label_is_rejected() {
        let mut scores = happy_sad_example();
        scores.retain(|score| score.label != Disgust);

        let err = normalize(&scores).unwrap_err();
        match err {
            Error::InvalidScoreSet(message) => assert!(message.contains("disgust")),
            other => panic!("expected InvalidScoreSet, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let mut scores = happy_sad_example();
        scores[6] = EmotionScore::new(Happy, 0.1);

        assert!(matches!(normalize(&scores), Err(Error::InvalidScoreSet(_))));
    }

    #[test]
    fn test_negative_and_nan_confidence_rejected() {
        let mut negative = happy_sad_example();
        negative[2].confidence = -0.1;
        assert!(matches!(normalize(&negative), Err(Error::InvalidScoreSet(_))));

        let mut nan = happy_sad_example();
        nan[3].confidence = f64::NAN;
        assert!(matches!(normalize(&nan), Err(Error::InvalidScoreSet(_))));
    }

    #[test]
    fn test_huge_scores_normalize_without_overflow() {
        let mut huge = happy_sad_example();
        huge[0].confidence = f64::MAX;
        huge[1].confidence = f64::MAX;

        let dist = normalize(&huge).unwrap();
        assert!((dist.total() - 1.0).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Happy) - 0.5).abs() < SUM_TOLERANCE);
        assert!((dist.confidence_of(Sad) - 0.5).abs() < SUM_TOLERANCE);
        for label in [Angry, Surprised, Fear, Disgust, Neutral] {
            assert_eq!(dist.confidence_of(label), 0.0);
        }

        let mut infinite = happy_sad_example();
        infinite[0].confidence = f64::INFINITY;
        assert!(matches!(normalize(&infinite), Err(Error::InvalidScoreSet(_))));
    }

    #[test]
    fn test_rank_example_top_is_happy() {
        let dist = normalize_and_rank(&happy_sad_example()).unwrap();
        assert!(dist.is_ranked());
        assert_eq!(dist.top().label, Happy);
        assert_eq!(dist.as_slice()[1].label, Sad);

        // Zero-confidence tail in canonical order
        let tail: Vec<EmotionLabel> = dist.iter().skip(2).map(|s| s.label).collect();
        assert_eq!(tail, vec![Angry, Surprised, Fear, Disgust, Neutral]);
    }

    #[test]
    fn test_rank_uniform_is_canonical_order() {
        let ranked = rank(NormalizedDistribution::uniform());
        let labels: Vec<EmotionLabel> = ranked.iter().map(|s| s.label).collect();
        assert_eq!(labels, EmotionLabel::ALL.to_vec());
        assert_eq!(ranked.top().label, Happy);
    }

    #[test]
    fn test_rank_breaks_partial_ties_canonically() {
        let dist = normalize_and_rank(&raw([
            (Neutral, 0.3),
            (Fear, 0.3),
            (Sad, 0.1),
            (Happy, 0.1),
            (Angry, 0.1),
            (Surprised, 0.05),
            (Disgust, 0.05),
        ]))
        .unwrap();

        let labels: Vec<EmotionLabel> = dist.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![Fear, Neutral, Happy, Sad, Angry, Surprised, Disgust]
        );
    }

    #[test]
    fn test_deserialize_validates_distribution() {
        let dist = normalize_and_rank(&happy_sad_example()).unwrap();
        let json = serde_json::to_string(&dist).unwrap();
        let parsed: NormalizedDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dist);

        let not_unit = r#"[{"label":"happy","confidence":0.9},{"label":"sad","confidence":0.9},
            {"label":"angry","confidence":0.0},{"label":"surprised","confidence":0.0},
            {"label":"fear","confidence":0.0},{"label":"disgust","confidence":0.0},
            {"label":"neutral","confidence":0.0}]"#;
        assert!(serde_json::from_str::<NormalizedDistribution>(not_unit).is_err());
    }

    #[test]
    fn test_percent() {
        assert!((EmotionScore::new(Happy, 0.123).percent() - 12.3).abs() < 1e-9);
    }
}
