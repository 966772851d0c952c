//! Mapping of collector and prediction effects to user-facing alerts.

use crate::collector::{CollectionPhase, FrameEffect, PostureClass, PredictionEffect};

/// Visual weight of an alert banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Plain,
    Secondary,
    Info,
    Success,
    Warning,
    Danger,
}

/// Heading and text shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub heading: String,
    pub text: String,
}

impl Alert {
    fn new(level: AlertLevel, heading: &str, text: impl Into<String>) -> Self {
        Self {
            level,
            heading: heading.to_string(),
            text: text.into(),
        }
    }

    /// Camera could not be opened
    #[must_use]
    pub fn video_unavailable() -> Self {
        Self::new(
            AlertLevel::Danger,
            "Video not supported",
            "This device does not support video capture, or it does not have a camera",
        )
    }

    /// Alert for a collector step; `None` when there is nothing new to say
    #[must_use]
    pub fn from_frame_effect(effect: &FrameEffect) -> Option<Self> {
        match effect {
            FrameEffect::MissingPart(part) => Some(missing_part(*part)),
            FrameEffect::Progress { class, percent } => Some(Self::new(
                AlertLevel::Info,
                match class {
                    PostureClass::Slouching => "Show me how you slouch",
                    PostureClass::Straight => "Now sit up straight",
                },
                format!("Collecting {class} samples: {percent}%"),
            )),
            FrameEffect::PhaseChanged(phase) => match phase {
                CollectionPhase::CollectingSlouching => Some(Self::new(
                    AlertLevel::Info,
                    "Show me how you slouch",
                    "Slouch in front of the camera until collection completes",
                )),
                CollectionPhase::CollectingStraight => Some(Self::new(
                    AlertLevel::Info,
                    "Now sit up straight",
                    "Keep a straight posture until collection completes",
                )),
                CollectionPhase::Training => Some(Self::new(AlertLevel::Info, "Training", "Hold still...")),
                CollectionPhase::Idle => None,
            },
            FrameEffect::TrainingComplete(report) => Some(Self::new(
                AlertLevel::Success,
                "All set",
                format!("Trained on {} samples, watching your posture now", report.samples),
            )),
            FrameEffect::Idle => None,
        }
    }

    /// Alert for a classified frame
    #[must_use]
    pub fn from_prediction(effect: &PredictionEffect) -> Self {
        match effect {
            PredictionEffect::MissingPart(part) => missing_part(*part),
            PredictionEffect::Verdict { slouching: true, .. } => {
                Self::new(AlertLevel::Warning, "Don't give up now", "You can do it!")
            }
            PredictionEffect::Verdict { slouching: false, .. } => {
                Self::new(AlertLevel::Plain, "You are doing great", "Keep it up!")
            }
        }
    }
}

fn missing_part(part: crate::keypoints::BodyPart) -> Alert {
    Alert::new(
        AlertLevel::Secondary,
        "Well, this is embarrassing but...",
        format!("It looks like I can't see your {part}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FitReport;
    use crate::keypoints::BodyPart;

    #[test]
    fn test_missing_part_alert() {
        let alert = Alert::from_frame_effect(&FrameEffect::MissingPart(BodyPart::RightShoulder)).unwrap();
        assert_eq!(alert.level, AlertLevel::Secondary);
        assert_eq!(alert.text, "It looks like I can't see your rightShoulder");
        assert_eq!(
            Alert::from_prediction(&PredictionEffect::MissingPart(BodyPart::RightShoulder)),
            alert
        );
    }

    #[test]
    fn test_verdict_alerts() {
        let slouching = Alert::from_prediction(&PredictionEffect::Verdict {
            slouching: true,
            raw_score: 1.0,
            probability: 0.73,
        });
        assert_eq!(slouching.level, AlertLevel::Warning);
        assert_eq!(slouching.heading, "Don't give up now");

        let straight = Alert::from_prediction(&PredictionEffect::Verdict {
            slouching: false,
            raw_score: 0.0,
            probability: 0.5,
        });
        assert_eq!(straight.heading, "You are doing great");
    }

    #[test]
    fn test_collection_alerts() {
        let progress = Alert::from_frame_effect(&FrameEffect::Progress {
            class: PostureClass::Straight,
            percent: 40,
        })
        .unwrap();
        assert_eq!(progress.text, "Collecting straight samples: 40%");

        let done = Alert::from_frame_effect(&FrameEffect::TrainingComplete(FitReport {
            epochs: 50,
            samples: 100,
            final_loss: 0.01,
        }))
        .unwrap();
        assert_eq!(done.level, AlertLevel::Success);

        assert!(Alert::from_frame_effect(&FrameEffect::Idle).is_none());
        assert_eq!(Alert::video_unavailable().level, AlertLevel::Danger);
    }
}
