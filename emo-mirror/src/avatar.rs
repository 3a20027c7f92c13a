//! Avatar mirror reactor
//!
//! Derives the avatar's presentation from publisher events:
//!
//! ```text
//! Idle ──start──▶ Analyzing ──complete──▶ Pulse(label) ──pulse expires──▶ Displaying(label)
//!                     ▲                                                        │
//!                     └───────────────────────────start────────────────────────┘
//! ```
//!
//! Pulse is decorative. It starts whenever a new session id is seen (every
//! completed analysis, or the first event after a missed completion) and
//! expires a fixed duration later whatever else happens. A failed analysis drops back
//! to the previous top emotion (or `Idle` if there is none).

use emo_common::events::EmotionEvent;
use emo_common::{EmotionLabel, EmotionScore};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Message shown while a classification is in flight
pub const ANALYZING_MESSAGE: &str = "Reading your emotions...";

/// Default pulse length after a new top emotion
pub const DEFAULT_PULSE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "label")]
pub enum AvatarState {
    /// No session yet
    Idle,
    /// Classification in flight (busy indicator)
    Analyzing,
    /// Showing the most recent top emotion
    Displaying(EmotionLabel),
    /// Just switched to a new top emotion
    Pulse(EmotionLabel),
}

impl AvatarState {
    pub fn label(&self) -> Option<EmotionLabel> {
        match self {
            AvatarState::Displaying(label) | AvatarState::Pulse(label) => Some(*label),
            AvatarState::Idle | AvatarState::Analyzing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarIcon {
    Smile,
    Frown,
    Angry,
    Surprise,
    Fearful,
    Disgusted,
    Meh,
}

/// Face and caption for a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvatarPresentation {
    pub message: &'static str,
    pub icon: AvatarIcon,
}

/// Presentation for a label; `None` gets the neutral face with the fallback message
pub fn presentation_for(label: Option<EmotionLabel>) -> AvatarPresentation {
    let (message, icon) = match label {
        Some(EmotionLabel::Happy) => ("I'm feeling joyful! 😊", AvatarIcon::Smile),
        Some(EmotionLabel::Sad) => ("I sense some sadness... 😢", AvatarIcon::Frown),
        Some(EmotionLabel::Angry) => ("There's some anger here! 😠", AvatarIcon::Angry),
        Some(EmotionLabel::Surprised) => ("Wow, that's surprising! 😲", AvatarIcon::Surprise),
        Some(EmotionLabel::Fear) => ("I detect some fear... 😨", AvatarIcon::Fearful),
        Some(EmotionLabel::Disgust) => ("Something seems off... 🤢", AvatarIcon::Disgusted),
        Some(EmotionLabel::Neutral) => ("I'm feeling neutral 😐", AvatarIcon::Meh),
        None => ("Analyzing emotions...", AvatarIcon::Meh),
    };
    AvatarPresentation { message, icon }
}

/// Everything the avatar panel renders at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarView {
    pub state: AvatarState,
    pub message: &'static str,
    pub icon: AvatarIcon,
    /// Glow colour of the displayed emotion
    pub glow_color: Option<&'static str>,
    /// Displayed emotion's confidence, rounded to a whole percent
    pub intensity_percent: Option<u8>,
    /// e.g. "happy (80.0% confident)"
    pub caption: Option<String>,
}

#[derive(Debug)]
pub struct AvatarReactor {
    pulse_duration: Duration,
    analyzing: bool,
    current: Option<EmotionScore>,
    current_session: Option<u64>,
    pulse_until: Option<Instant>,
}

impl Default for AvatarReactor {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE)
    }
}

impl AvatarReactor {
    pub fn new(pulse_duration: Duration) -> Self {
        Self {
            pulse_duration,
            analyzing: false,
            current: None,
            current_session: None,
            pulse_until: None,
        }
    }

    /// Update from a publisher event received at `now`
    pub fn apply(&mut self, event: &EmotionEvent, now: Instant) {
        let snapshot = event.snapshot();
        self.analyzing = snapshot.is_analyzing();
        self.current = snapshot.top_emotion();

        let session_id = snapshot.session_id();
        if session_id.is_some() && session_id != self.current_session {
            self.pulse_until = Some(now + self.pulse_duration);
        }
        self.current_session = session_id;
    }

    pub fn state_at(&self, now: Instant) -> AvatarState {
        if self.analyzing {
            return AvatarState::Analyzing;
        }
        match self.current {
            None => AvatarState::Idle,
            Some(top) if self.pulse_until.is_some_and(|until| now < until) => {
                AvatarState::Pulse(top.label)
            }
            Some(top) => AvatarState::Displaying(top.label),
        }
    }

    pub fn view_at(&self, now: Instant) -> AvatarView {
        let state = self.state_at(now);
        let presentation = presentation_for(state.label());
        let message = if state == AvatarState::Analyzing {
            ANALYZING_MESSAGE
        } else if state == AvatarState::Idle {
            // Idle shows the neutral face until a first result arrives
            presentation_for(Some(EmotionLabel::Neutral)).message
        } else {
            presentation.message
        };

        let shown = self.current.filter(|_| state != AvatarState::Analyzing);
        AvatarView {
            state,
            message,
            icon: presentation.icon,
            glow_color: shown.map(|top| top.label.color_hex()),
            intensity_percent: shown.map(|top| top.percent().round().clamp(0.0, 100.0) as u8),
            caption: shown.map(|top| format!("{} ({:.1}% confident)", top.label, top.percent())),
        }
    }
}
