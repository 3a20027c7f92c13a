//! Smart environment adapter
//!
//! Maps the published top emotion to a lighting/audio profile. Actuation is
//! simulated: the adapter only tracks device state and logs each change.
//!
//! Gating: a device reacts only while both the link (`connected`) and its own
//! `enabled` toggle are on. Turning a toggle off freezes that device at its
//! last state; turning one on re-applies the current top emotion at once.

use emo_common::events::EmotionEvent;
use emo_common::EmotionLabel;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const MIN_BRIGHTNESS: u8 = 10;
pub const MAX_BRIGHTNESS: u8 = 100;
pub const MAX_VOLUME: u8 = 100;

const INITIAL_BRIGHTNESS: u8 = 70;
const INITIAL_VOLUME: u8 = 50;
const NO_TRACK: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightColor {
    White,
    WarmYellow,
    SoftBlue,
    SoftRed,
    SoftPurple,
    Orange,
    AliceBlue,
}

impl LightColor {
    pub fn hex(self) -> &'static str {
        match self {
            LightColor::White => "#FFFFFF",
            LightColor::WarmYellow => "#FFD700",
            LightColor::SoftBlue => "#4169E1",
            LightColor::SoftRed => "#FF6B6B",
            LightColor::SoftPurple => "#DDA0DD",
            LightColor::Orange => "#FFA500",
            LightColor::AliceBlue => "#F0F8FF",
        }
    }
}

impl std::fmt::Display for LightColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LightColor::White => "white",
            LightColor::WarmYellow => "warm yellow",
            LightColor::SoftBlue => "soft blue",
            LightColor::SoftRed => "soft red",
            LightColor::SoftPurple => "soft purple",
            LightColor::Orange => "orange",
            LightColor::AliceBlue => "alice blue",
        };
        write!(f, "{} ({})", name, self.hex())
    }
}

/// Lighting and audio settings for one emotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    pub light_color: LightColor,
    /// 10..=100
    pub brightness: u8,
    pub track_label: String,
}

/// Profile for a top emotion
///
/// Total: disgust, neutral and "no emotion" share the calm default.
pub fn profile_for(label: Option<EmotionLabel>) -> EnvironmentProfile {
    let (light_color, brightness, track) = match label {
        Some(EmotionLabel::Happy) => (LightColor::WarmYellow, 90, "Upbeat Pop Playlist"),
        Some(EmotionLabel::Sad) => (LightColor::SoftBlue, 40, "Calming Piano Music"),
        Some(EmotionLabel::Angry) => (LightColor::SoftRed, 60, "Meditation & Breathing"),
        Some(EmotionLabel::Fear) => (LightColor::SoftPurple, 30, "Peaceful Nature Sounds"),
        Some(EmotionLabel::Surprised) => (LightColor::Orange, 80, "Energetic Instrumental"),
        Some(EmotionLabel::Disgust) | Some(EmotionLabel::Neutral) | None => {
            (LightColor::AliceBlue, 60, "Ambient Background")
        }
    };
    EnvironmentProfile {
        light_color,
        brightness,
        track_label: track.to_string(),
    }
}

/// Recommendation text shown next to the device controls
pub fn recommendation_for(label: Option<EmotionLabel>) -> &'static str {
    match label {
        Some(EmotionLabel::Happy) => "Bright, warm lighting and upbeat music to enhance your joy!",
        Some(EmotionLabel::Sad) => "Soft blue lighting and calming music to provide comfort.",
        Some(EmotionLabel::Angry) => "Gentle lighting and meditation sounds to help you relax.",
        Some(EmotionLabel::Fear) => "Warm, dim lighting and peaceful sounds for reassurance.",
        Some(EmotionLabel::Surprised) => "Bright, energetic lighting to match your excitement!",
        Some(EmotionLabel::Neutral) => "Balanced lighting and ambient sounds for focus.",
        Some(EmotionLabel::Disgust) | None => "Adjusting environment to match your mood...",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub enabled: bool,
    pub brightness: u8,
    pub color: LightColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioState {
    pub enabled: bool,
    pub volume: u8,
    pub current_track: String,
}

/// Active/Inactive summary for the status panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub connected: bool,
    pub lights_active: bool,
    pub audio_active: bool,
}

#[derive(Debug)]
pub struct EnvironmentAdapter {
    connected: bool,
    lights: LightState,
    audio: AudioState,
    top: Option<EmotionLabel>,
    // Session whose top emotion was last pushed to the devices
    applied_session: Option<u64>,
}

impl Default for EnvironmentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentAdapter {
    /// Disconnected, both devices disabled
    pub fn new() -> Self {
        Self {
            connected: false,
            lights: LightState {
                enabled: false,
                brightness: INITIAL_BRIGHTNESS,
                color: LightColor::White,
            },
            audio: AudioState {
                enabled: false,
                volume: INITIAL_VOLUME,
                current_track: NO_TRACK.to_string(),
            },
            top: None,
            applied_session: None,
        }
    }

    /// Track the published top emotion; re-actuate whenever the session changes
    ///
    /// Keyed on the snapshot's session id, not the event kind: a subscriber
    /// that lagged past a completion catches up on its next event.
    pub fn apply(&mut self, event: &EmotionEvent) {
        let snapshot = event.snapshot();
        self.top = snapshot.top_emotion().map(|top| top.label);

        let session_id = snapshot.session_id();
        if session_id != self.applied_session {
            self.applied_session = session_id;
            self.actuate_lights();
            self.actuate_audio();
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        info!("Environment devices {}", if connected { "connected" } else { "disconnected" });
        if connected {
            self.actuate_lights();
            self.actuate_audio();
        }
    }

    pub fn set_lights_enabled(&mut self, enabled: bool) {
        self.lights.enabled = enabled;
        if enabled {
            self.actuate_lights();
        }
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio.enabled = enabled;
        if enabled {
            self.actuate_audio();
        }
    }

    /// Manual brightness, clamped to 10..=100
    pub fn set_brightness(&mut self, brightness: u8) {
        self.lights.brightness = brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
    }

    /// Manual volume, clamped to 0..=100
    pub fn set_volume(&mut self, volume: u8) {
        self.audio.volume = volume.min(MAX_VOLUME);
    }

    fn gated_top(&self, device_enabled: bool) -> Option<EmotionLabel> {
        if self.connected && device_enabled {
            self.top
        } else {
            None
        }
    }

    fn actuate_lights(&mut self) {
        let Some(label) = self.gated_top(self.lights.enabled) else {
            return;
        };
        let profile = profile_for(Some(label));
        self.lights.color = profile.light_color;
        self.lights.brightness = profile.brightness;
        info!(
            "Lights set to {} at {}% for {}",
            profile.light_color, profile.brightness, label
        );
    }

    fn actuate_audio(&mut self) {
        let Some(label) = self.gated_top(self.audio.enabled) else {
            return;
        };
        let profile = profile_for(Some(label));
        info!("Now playing '{}' for {}", profile.track_label, label);
        self.audio.current_track = profile.track_label;
    }

    /// Current device output as a profile
    pub fn profile(&self) -> EnvironmentProfile {
        EnvironmentProfile {
            light_color: self.lights.color,
            brightness: self.lights.brightness,
            track_label: self.audio.current_track.clone(),
        }
    }

    /// Recommendation for the current top emotion, shown only while connected
    pub fn recommendation(&self) -> Option<&'static str> {
        match (self.connected, self.top) {
            (true, Some(label)) => Some(recommendation_for(Some(label))),
            _ => None,
        }
    }

    pub fn device_status(&self) -> DeviceStatus {
        DeviceStatus {
            connected: self.connected,
            lights_active: self.lights.enabled,
            audio_active: self.audio.enabled,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn lights(&self) -> &LightState {
        &self.lights
    }

    pub fn audio(&self) -> &AudioState {
        &self.audio
    }

    pub fn top_emotion(&self) -> Option<EmotionLabel> {
        self.top
    }
}
