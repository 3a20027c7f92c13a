//! Bias feedback collection
//!
//! Users can flag a prediction as wrong and attach the emotion they were
//! actually expressing plus optional demographic context. Reports copy the
//! predicted label and confidence by value, so later analyses never change a
//! submitted report.
//!
//! Known limitation: [`accuracy_rate`] counts every unreported analysis as
//! correct, so "no feedback" and "confirmed correct" are indistinguishable.

use chrono::{DateTime, Utc};
use emo_common::events::{AnalysisSession, EmotionEvent, SessionSnapshot};
use emo_common::{EmotionLabel, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// Defines a demographic option enum with display names used both for
/// serialization and parsing.
macro_rules! demographic_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let needle = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|option| option.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| Error::InvalidInput(format!(
                        "Unknown {}: '{}'", stringify!($name), s
                    )))
            }
        }
    };
}

demographic_enum!(
    /// Self-reported age bracket
    AgeGroup {
        From18To25 => "18-25",
        From26To35 => "26-35",
        From36To45 => "36-45",
        From46To55 => "46-55",
        From56To65 => "56-65",
        Over65 => "65+",
    }
);

demographic_enum!(
    SkinTone {
        VeryLight => "Very Light",
        Light => "Light",
        MediumLight => "Medium Light",
        Medium => "Medium",
        MediumDark => "Medium Dark",
        Dark => "Dark",
        VeryDark => "Very Dark",
    }
);

demographic_enum!(
    /// Lighting when the image was captured
    LightingCondition {
        BrightNatural => "Bright Natural",
        DimNatural => "Dim Natural",
        BrightArtificial => "Bright Artificial",
        DimArtificial => "Dim Artificial",
        Mixed => "Mixed Lighting",
    }
);

demographic_enum!(
    Gender {
        Male => "Male",
        Female => "Female",
        NonBinary => "Non-binary",
        PreferNotToSay => "Prefer not to say",
    }
);

/// Optional demographic context; every field may be left unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicTags {
    pub age_group: Option<AgeGroup>,
    pub skin_tone: Option<SkinTone>,
    pub lighting: Option<LightingCondition>,
    pub gender: Option<Gender>,
}

/// A submitted correction; never modified after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub report_id: Uuid,
    /// Session the prediction came from
    pub session_id: u64,
    pub predicted_label: EmotionLabel,
    pub actual_label: EmotionLabel,
    /// Predicted label's confidence at submission time
    pub confidence: f64,
    pub demographics: DemographicTags,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

/// Input held by the open report form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub actual_label: Option<EmotionLabel>,
    pub demographics: DemographicTags,
    pub feedback: String,
}

impl ReportForm {
    pub fn set_actual_label(&mut self, label: EmotionLabel) {
        self.actual_label = Some(label);
    }

    pub fn set_age_group(&mut self, age_group: Option<AgeGroup>) {
        self.demographics.age_group = age_group;
    }

    pub fn set_skin_tone(&mut self, skin_tone: Option<SkinTone>) {
        self.demographics.skin_tone = skin_tone;
    }

    pub fn set_lighting(&mut self, lighting: Option<LightingCondition>) {
        self.demographics.lighting = lighting;
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.demographics.gender = gender;
    }

    pub fn set_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback = feedback.into();
    }
}

/// `(analyses - reports) / analyses`, or 0 with no analyses
///
/// Clamped at 0 when reports outnumber analyses (several reports may target
/// the same session).
pub fn accuracy_rate(total_analyses: u64, total_reports: u64) -> f64 {
    if total_analyses == 0 {
        return 0.0;
    }
    let unreported = total_analyses.saturating_sub(total_reports);
    unreported as f64 / total_analyses as f64
}

#[derive(Debug, Default)]
pub struct BiasFeedbackCollector {
    snapshot: SessionSnapshot,
    reports: Vec<BiasReport>,
    form: Option<ReportForm>,
}

impl BiasFeedbackCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the latest publisher snapshot
    pub fn apply(&mut self, event: &EmotionEvent) {
        self.snapshot = event.snapshot().clone();
    }

    /// Session a report would reference right now
    fn active_session(&self) -> Result<&AnalysisSession> {
        if self.snapshot.is_analyzing() {
            return Err(Error::NoActiveSession(
                "an analysis is in progress".to_string(),
            ));
        }
        self.snapshot
            .latest
            .as_ref()
            .ok_or_else(|| Error::NoActiveSession("no analysis has completed yet".to_string()))
    }

    /// Record that the current prediction was wrong
    ///
    /// Clears the report form on success.
    ///
    /// # Errors
    /// [`Error::NoActiveSession`] before the first completed analysis or
    /// while one is in flight; the form is left as it was.
    pub fn submit_report(
        &mut self,
        actual_label: EmotionLabel,
        demographics: DemographicTags,
        feedback: impl Into<String>,
    ) -> Result<BiasReport> {
        let session = match self.active_session() {
            Ok(session) => session,
            Err(e) => {
                warn!("Bias report rejected: {}", e);
                return Err(e);
            }
        };

        let report = BiasReport {
            report_id: Uuid::new_v4(),
            session_id: session.session_id,
            predicted_label: session.top_emotion.label,
            actual_label,
            confidence: session.top_emotion.confidence,
            demographics,
            feedback: feedback.into(),
            timestamp: Utc::now(),
        };

        info!(
            "Bias report for session {}: predicted {}, actual {}",
            report.session_id, report.predicted_label, report.actual_label
        );
        self.reports.push(report.clone());
        self.form = None;
        Ok(report)
    }

    /// Open an empty report form for the current session
    pub fn open_form(&mut self) -> Result<()> {
        self.active_session()?;
        self.form = Some(ReportForm::default());
        Ok(())
    }

    /// Discard the form and its input
    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form(&self) -> Option<&ReportForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ReportForm> {
        self.form.as_mut()
    }

    /// Submit the open form
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] if no form is open
    /// - [`Error::MissingActualLabel`] if the actual emotion is not selected
    /// - [`Error::NoActiveSession`] as for [`Self::submit_report`]
    ///
    /// On any error the form stays open with its input.
    pub fn submit_form(&mut self) -> Result<BiasReport> {
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("report form is not open".to_string()))?;
        let actual_label = form.actual_label.ok_or(Error::MissingActualLabel)?;
        let demographics = form.demographics.clone();
        let feedback = form.feedback.clone();
        self.submit_report(actual_label, demographics, feedback)
    }

    pub fn reports(&self) -> &[BiasReport] {
        &self.reports
    }

    pub fn total_reports(&self) -> u64 {
        self.reports.len() as u64
    }

    pub fn total_analyses(&self) -> u64 {
        self.snapshot.analyses_completed()
    }

    pub fn accuracy_rate(&self) -> f64 {
        accuracy_rate(self.total_analyses(), self.total_reports())
    }
}
