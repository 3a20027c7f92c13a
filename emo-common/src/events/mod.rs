//! Event types for the emotion mirror event system
//!
//! Provides the publisher → consumer event definitions and the EventBus
//! that carries them.

mod session_types;

pub use session_types::{AnalysisSession, AnalysisStatus, SessionSnapshot, SessionStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

/// Publisher transition events
///
/// Every variant carries the full [`SessionSnapshot`] taken at the
/// transition, so a consumer can rebuild its derived state from the event
/// alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmotionEvent {
    /// Idle → Analyzing: an image was accepted for classification
    ///
    /// Triggers:
    /// - Avatar: show busy indicator
    /// - Bias reporting: block new reports until the analysis settles
    AnalysisStarted {
        snapshot: SessionSnapshot,
        timestamp: DateTime<Utc>,
    },

    /// Analyzing → Idle with a new session
    ///
    /// Triggers:
    /// - Avatar: display new top emotion and pulse
    /// - Environment: recompute lighting/audio profile
    /// - Bias reporting: new session becomes the report target
    AnalysisCompleted {
        snapshot: SessionSnapshot,
        timestamp: DateTime<Utc>,
    },

    /// Analyzing → Idle after a classifier failure or invalid score set
    ///
    /// The snapshot still holds the previous session.
    AnalysisFailed {
        snapshot: SessionSnapshot,
        /// Error message surfaced to the caller
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl EmotionEvent {
    /// Variant name, matching the serialized `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            EmotionEvent::AnalysisStarted { .. } => "AnalysisStarted",
            EmotionEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            EmotionEvent::AnalysisFailed { .. } => "AnalysisFailed",
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        match self {
            EmotionEvent::AnalysisStarted { snapshot, .. }
            | EmotionEvent::AnalysisCompleted { snapshot, .. }
            | EmotionEvent::AnalysisFailed { snapshot, .. } => snapshot,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EmotionEvent::AnalysisStarted { timestamp, .. }
            | EmotionEvent::AnalysisCompleted { timestamp, .. }
            | EmotionEvent::AnalysisFailed { timestamp, .. } => *timestamp,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Distribution bus for publisher events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the publisher)
/// - Multiple independent subscribers
/// - Automatic cleanup when a [`Subscription`] drops
/// - Lagged message detection for slow subscribers
///
/// Events reach every subscriber in emit order.
///
/// # Examples
///
/// ```
/// use emo_common::events::{EmotionEvent, EventBus, SessionSnapshot};
///
/// let event_bus = EventBus::new(100);
/// let mut subscription = event_bus.subscribe();
///
/// event_bus.emit(EmotionEvent::AnalysisStarted {
///     snapshot: SessionSnapshot::default(),
///     timestamp: chrono::Utc::now(),
/// }).ok();
///
/// let event = subscription.try_recv().expect("event queued synchronously");
/// assert_eq!(event.event_type(), "AnalysisStarted");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EmotionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    ///
    /// # Panics
    /// If `capacity` is zero (tokio::broadcast requirement). Configuration
    /// loading rejects a zero capacity before it gets here.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received. Dropping the
    /// returned handle (or calling [`Subscription::unsubscribe`]) ends it.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: EmotionEvent,
    ) -> Result<usize, broadcast::error::SendError<EmotionEvent>> {
        self.tx.send(event)
    }

    /// Current number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured per-subscriber buffer size
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Handle for one subscriber's event stream
///
/// Lagged events (subscriber fell more than `capacity` behind) are skipped
/// with a warning; the stream resumes at the oldest retained event, so
/// session ids stay increasing.
pub struct Subscription {
    rx: broadcast::Receiver<EmotionEvent>,
}

impl Subscription {
    /// Wait for the next event; `None` once every publisher is gone
    pub async fn recv(&mut self) -> Option<EmotionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Subscription lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-queued event, without waiting
    pub fn try_recv(&mut self) -> Option<EmotionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Subscription lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving events
    pub fn unsubscribe(self) {}
}
