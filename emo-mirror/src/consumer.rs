//! Consumer tasks driven by publisher events
//!
//! Each consumer owns its derived state and only reads snapshots. A consumer
//! runs as its own background task ([`run_consumer`]) or is driven inline
//! from already-queued events ([`drain_pending`]).

use crate::avatar::AvatarReactor;
use crate::bias::BiasFeedbackCollector;
use crate::environment::EnvironmentAdapter;
use emo_common::events::{EmotionEvent, Subscription};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Something that derives state from publisher events
pub trait SessionConsumer: Send {
    fn name(&self) -> &'static str;

    /// Apply one event received at `now`
    fn on_event(&mut self, event: &EmotionEvent, now: Instant);
}

impl SessionConsumer for AvatarReactor {
    fn name(&self) -> &'static str {
        "avatar"
    }

    fn on_event(&mut self, event: &EmotionEvent, now: Instant) {
        self.apply(event, now);
    }
}

impl SessionConsumer for EnvironmentAdapter {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn on_event(&mut self, event: &EmotionEvent, _now: Instant) {
        self.apply(event);
    }
}

impl SessionConsumer for BiasFeedbackCollector {
    fn name(&self) -> &'static str {
        "bias-feedback"
    }

    fn on_event(&mut self, event: &EmotionEvent, _now: Instant) {
        self.apply(event);
    }
}

/// Feed a shared consumer until the publisher goes away
///
/// Lagged events are skipped inside [`Subscription::recv`]; the loop ends
/// when every publisher handle has been dropped.
pub async fn run_consumer<C>(mut subscription: Subscription, consumer: Arc<Mutex<C>>)
where
    C: SessionConsumer,
{
    let name = consumer.lock().await.name();
    debug!("Consumer '{}' started", name);

    while let Some(event) = subscription.recv().await {
        let now = Instant::now();
        debug!("Consumer '{}' received {}", name, event.event_type());
        consumer.lock().await.on_event(&event, now);
    }

    debug!("Consumer '{}' stopped", name);
}

/// Apply every already-queued event; returns how many were applied
pub fn drain_pending<C>(subscription: &mut Subscription, consumer: &mut C) -> usize
where
    C: SessionConsumer + ?Sized,
{
    let mut applied = 0;
    while let Some(event) = subscription.try_recv() {
        consumer.on_event(&event, Instant::now());
        applied += 1;
    }
    applied
}
