//! One pass of the per-frame loop, independent of camera and window.
//!
//! Collection phases route keypoints to the collector; the idle phase routes
//! them to the classifier for a posture verdict.

use crate::classifier::Classifier;
use crate::collector::{CollectionPhase, CollectorState, FrameEffect, PredictionEffect, SampleCollector};
use crate::keypoints::Pose;
use crate::presentation::Alert;
use crate::Result;

/// What a cycle produced
#[derive(Debug, Clone, PartialEq)]
pub enum CycleEffect {
    Collection(FrameEffect),
    Prediction(PredictionEffect),
}

/// Effect of one cycle and the alert it maps to
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub effect: CycleEffect,
    pub alert: Option<Alert>,
}

impl CycleOutcome {
    /// Whether this cycle concluded the user is slouching
    #[must_use]
    pub fn slouching(&self) -> bool {
        matches!(
            self.effect,
            CycleEffect::Prediction(PredictionEffect::Verdict { slouching: true, .. })
        )
    }
}

/// Pick the pose to classify: the first one scoring at least `min_pose_confidence`
#[must_use]
pub fn primary_pose(poses: &[Pose], min_pose_confidence: f32) -> Option<&Pose> {
    poses.iter().find(|pose| pose.score >= min_pose_confidence)
}

/// Route one frame's poses through the collector or the predictor.
///
/// A frame without a usable pose is treated like a frame missing every
/// required part.
///
/// # Errors
///
/// Propagates classifier failures, including a failing training call
pub fn run_cycle(
    collector: &SampleCollector,
    state: &mut CollectorState,
    poses: &[Pose],
    min_pose_confidence: f32,
    classifier: &mut dyn Classifier,
) -> Result<CycleOutcome> {
    let keypoints = primary_pose(poses, min_pose_confidence)
        .map(|pose| pose.keypoints.as_slice())
        .unwrap_or_default();

    let effect = if state.phase() == CollectionPhase::Idle {
        CycleEffect::Prediction(collector.predict(keypoints, classifier)?)
    } else {
        CycleEffect::Collection(collector.submit_frame(state, keypoints, classifier)?)
    };

    let alert = match &effect {
        CycleEffect::Collection(frame_effect) => Alert::from_frame_effect(frame_effect),
        CycleEffect::Prediction(prediction) => Some(Alert::from_prediction(prediction)),
    };

    Ok(CycleOutcome { effect, alert })
}
