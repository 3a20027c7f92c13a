//! Analysis session type definitions
//!
//! Supporting types for the publisher's per-analysis state machine
//! (`Idle → Analyzing → Idle`) and the snapshots handed to consumers.

use crate::{EmotionScore, Error, NormalizedDistribution, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publisher status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum AnalysisStatus {
    /// No classification in flight
    #[default]
    Idle,
    /// A classification is in flight; new submissions are rejected
    Analyzing,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Idle => write!(f, "Idle"),
            AnalysisStatus::Analyzing => write!(f, "Analyzing"),
        }
    }
}

/// A completed analysis
///
/// Built in one step from a ranked distribution, so a published session is
/// never partially computed. Deserialization rejects an unranked distribution
/// or a `top_emotion` that is not its first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct AnalysisSession {
    /// Completed-analysis counter value (1 for the first success)
    pub session_id: u64,
    /// Ranked distribution (descending confidence)
    pub distribution: NormalizedDistribution,
    /// Highest-ranked entry of `distribution`
    pub top_emotion: EmotionScore,
    /// When the classifier resolved
    pub completed_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn new(
        session_id: u64,
        distribution: NormalizedDistribution,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let top_emotion = distribution.top();
        Self {
            session_id,
            distribution,
            top_emotion,
            completed_at,
        }
    }
}

/// Unchecked wire form of [`AnalysisSession`]
#[derive(Deserialize)]
struct SessionRecord {
    session_id: u64,
    distribution: NormalizedDistribution,
    top_emotion: EmotionScore,
    completed_at: DateTime<Utc>,
}

impl TryFrom<SessionRecord> for AnalysisSession {
    type Error = Error;

    fn try_from(record: SessionRecord) -> Result<Self> {
        if !record.distribution.is_ranked() {
            return Err(Error::InvalidScoreSet(format!(
                "session {} distribution is not ranked",
                record.session_id
            )));
        }
        if record.top_emotion != record.distribution.top() {
            return Err(Error::InvalidScoreSet(format!(
                "session {} top emotion does not match its distribution",
                record.session_id
            )));
        }
        Ok(Self::new(
            record.session_id,
            record.distribution,
            record.completed_at,
        ))
    }
}

/// What consumers see on every publisher transition
///
/// `latest` is the most recent completed session. While `status` is
/// `Analyzing` it still holds the previous result (or `None` before the first
/// success).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: AnalysisStatus,
    pub latest: Option<AnalysisSession>,
}

impl SessionSnapshot {
    pub fn is_analyzing(&self) -> bool {
        self.status == AnalysisStatus::Analyzing
    }

    pub fn top_emotion(&self) -> Option<EmotionScore> {
        self.latest.as_ref().map(|session| session.top_emotion)
    }

    pub fn session_id(&self) -> Option<u64> {
        self.latest.as_ref().map(|session| session.session_id)
    }

    /// Number of successful analyses so far
    pub fn analyses_completed(&self) -> u64 {
        self.session_id().unwrap_or(0)
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            total_analyses: self.analyses_completed(),
            top_confidence_percent: self
                .top_emotion()
                .map(|top| top.percent())
                .unwrap_or(0.0),
        }
    }
}

/// Summary figures for the session statistics panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_analyses: u64,
    /// Top emotion confidence × 100, 0 before the first analysis
    pub top_confidence_percent: f64,
}
