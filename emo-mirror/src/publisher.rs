//! Emotion state publisher
//!
//! Owns the current analysis state and the completed-analysis counter, runs
//! each submission through classifier → normalizer → ranker, and publishes
//! a [`SessionSnapshot`] on every transition.
//!
//! State machine per cycle: `Idle → Analyzing → Idle`
//! - Submissions while `Analyzing` are rejected ([`Error::ReentrantAnalysis`])
//! - Success: new session, counter + 1
//! - Failure: previous session retained, counter unchanged, error returned
//!
//! The classifier call is the only await point. State changes and their
//! events happen under one lock, so subscribers see transitions in order and
//! never see a half-built session.

use crate::classifier::{EmotionClassifier, ImageData};
use chrono::Utc;
use emo_common::events::{
    AnalysisSession, AnalysisStatus, EmotionEvent, EventBus, SessionSnapshot, Subscription,
};
use emo_common::{normalize_and_rank, EmotionScore, Error, NormalizedDistribution, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct PublisherState {
    status: AnalysisStatus,
    latest: Option<AnalysisSession>,
}

impl PublisherState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            latest: self.latest.clone(),
        }
    }
}

pub struct EmotionStatePublisher {
    classifier: Arc<dyn EmotionClassifier>,
    bus: EventBus,
    // Never held across an await
    state: Mutex<PublisherState>,
}

impl EmotionStatePublisher {
    pub fn new(classifier: Arc<dyn EmotionClassifier>, bus: EventBus) -> Self {
        Self {
            classifier,
            bus,
            state: Mutex::new(PublisherState::default()),
        }
    }

    /// Publisher with its own EventBus of the given capacity
    pub fn with_capacity(classifier: Arc<dyn EmotionClassifier>, capacity: usize) -> Self {
        Self::new(classifier, EventBus::new(capacity))
    }

    fn lock_state(&self) -> MutexGuard<'_, PublisherState> {
        // State is only replaced wholesale, so a poisoned lock still holds consistent data
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: EmotionEvent) {
        let event_type = event.event_type().to_string();
        match self.bus.emit(event) {
            Ok(receivers) => debug!("Published {} to {} subscribers", event_type, receivers),
            Err(_) => debug!("Published {} with no subscribers", event_type),
        }
    }

    /// Subscribe to future transitions
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    pub fn status(&self) -> AnalysisStatus {
        self.lock_state().status
    }

    pub fn latest_session(&self) -> Option<AnalysisSession> {
        self.lock_state().latest.clone()
    }

    pub fn top_emotion(&self) -> Option<EmotionScore> {
        self.lock_state().latest.as_ref().map(|s| s.top_emotion)
    }

    /// Number of successful analyses (the latest session id)
    pub fn analyses_completed(&self) -> u64 {
        self.lock_state().snapshot().analyses_completed()
    }

    /// Classify an image and publish the resulting session
    ///
    /// # Errors
    /// - [`Error::ReentrantAnalysis`] if another analysis is in flight; that
    ///   analysis is not affected
    /// - [`Error::ClassifierFailure`] if the classifier rejected the image
    /// - [`Error::InvalidScoreSet`] if the classifier output is malformed
    pub async fn submit(&self, image: &ImageData) -> Result<AnalysisSession> {
        let in_flight = self.begin_analysis()?;

        let outcome = self
            .classifier
            .analyze(image)
            .await
            .map_err(|e| match e {
                Error::ClassifierFailure(_) => e,
                other => Error::ClassifierFailure(other.to_string()),
            })
            .and_then(|raw| normalize_and_rank(&raw));

        in_flight.settle(outcome)
    }

    fn begin_analysis(&self) -> Result<InFlight<'_>> {
        let mut state = self.lock_state();
        if state.status == AnalysisStatus::Analyzing {
            warn!("Rejected submission: analysis already in progress");
            return Err(Error::ReentrantAnalysis);
        }

        state.status = AnalysisStatus::Analyzing;
        info!(
            "Analysis started with {} classifier (completed so far: {})",
            self.classifier.name(),
            state.snapshot().analyses_completed()
        );
        self.publish(EmotionEvent::AnalysisStarted {
            snapshot: state.snapshot(),
            timestamp: Utc::now(),
        });

        Ok(InFlight {
            publisher: self,
            settled: false,
        })
    }
}

/// Marks one analysis as in flight
///
/// If the `submit` future is dropped before the classifier settles, the
/// status goes back to `Idle` so later submissions are not locked out.
struct InFlight<'a> {
    publisher: &'a EmotionStatePublisher,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: Result<NormalizedDistribution>) -> Result<AnalysisSession> {
        self.settled = true;
        let mut state = self.publisher.lock_state();
        state.status = AnalysisStatus::Idle;

        match outcome {
            Ok(distribution) => {
                let session_id = state.snapshot().analyses_completed() + 1;
                let session = AnalysisSession::new(session_id, distribution, Utc::now());
                info!(
                    "Analysis {} complete: top emotion {} ({:.1}%)",
                    session_id,
                    session.top_emotion.label,
                    session.top_emotion.percent()
                );
                state.latest = Some(session.clone());
                self.publisher.publish(EmotionEvent::AnalysisCompleted {
                    snapshot: state.snapshot(),
                    timestamp: session.completed_at,
                });
                Ok(session)
            }
            Err(e) => {
                error!("Analysis failed, keeping previous results: {}", e);
                self.publisher.publish(EmotionEvent::AnalysisFailed {
                    snapshot: state.snapshot(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Analysis abandoned before the classifier settled, returning to Idle");
            self.publisher.lock_state().status = AnalysisStatus::Idle;
        }
    }
}
