//! Live posture sample collection and classifier training.
//!
//! The collector is a small state machine over an explicitly owned
//! [`CollectorState`]:
//!
//! ```text
//! Idle --start_collection--> CollectingSlouching --bucket full--> CollectingStraight
//!   ^                                                                   |
//!   +------------ fit done <-- Training <----------- bucket full -------+
//! ```
//!
//! Every frame first goes through the required keypoint gate. A frame that
//! misses a required part produces [`FrameEffect::MissingPart`] and leaves the
//! state untouched; the caller simply submits the next frame. Transitions never
//! touch the presentation layer: they return effect values instead.

use crate::classifier::{sigmoid, Classifier, FitOptions, FitReport};
use crate::config::Config;
use crate::keypoints::{BodyPart, Keypoint, KeypointCheck, RequiredKeypointSet, SampleVector};
use crate::{Error, Result};
use log::{debug, info};
use ndarray::{Array1, Array2};
use std::fmt;

/// Posture class of a training bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureClass {
    Slouching,
    Straight,
}

impl PostureClass {
    /// Training label: 1 for slouching, 0 for straight
    #[must_use]
    pub fn label(self) -> f32 {
        match self {
            PostureClass::Slouching => 1.0,
            PostureClass::Straight => 0.0,
        }
    }
}

impl fmt::Display for PostureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureClass::Slouching => f.write_str("slouching"),
            PostureClass::Straight => f.write_str("straight"),
        }
    }
}

/// Which bucket, if any, receives the next sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionPhase {
    /// Steady-state inference
    #[default]
    Idle,
    CollectingSlouching,
    CollectingStraight,
    /// Both buckets full; the next usable frame trains the classifier
    Training,
}

/// Append-only samples of one posture class, capped at the target size
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingBucket {
    class: PostureClass,
    target: usize,
    samples: Vec<SampleVector>,
}

impl TrainingBucket {
    #[must_use]
    pub fn new(class: PostureClass, target: usize) -> Self {
        Self {
            class,
            target,
            samples: Vec::with_capacity(target),
        }
    }

    #[must_use]
    pub fn class(&self) -> PostureClass {
        self.class
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.target
    }

    #[must_use]
    pub fn samples(&self) -> &[SampleVector] {
        &self.samples
    }

    /// Completion in whole percent
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.target == 0 {
            return 100;
        }
        u32::try_from(self.samples.len() * 100 / self.target).unwrap_or(100)
    }

    /// Append a sample, returning the new length
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket is already full
    pub fn push(&mut self, sample: SampleVector) -> Result<usize> {
        if self.is_full() {
            return Err(Error::InvalidInput(format!(
                "{} bucket already holds {} samples",
                self.class, self.target
            )));
        }
        self.samples.push(sample);
        Ok(self.samples.len())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Mutable collection state, owned by the caller and passed to every operation
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorState {
    phase: CollectionPhase,
    slouching: TrainingBucket,
    straight: TrainingBucket,
}

impl CollectorState {
    /// Obtained through [`SampleCollector::new_state`] so bucket sizes match the collector
    #[must_use]
    pub(crate) fn new(target_size: usize) -> Self {
        Self {
            phase: CollectionPhase::Idle,
            slouching: TrainingBucket::new(PostureClass::Slouching, target_size),
            straight: TrainingBucket::new(PostureClass::Straight, target_size),
        }
    }

    #[must_use]
    pub fn phase(&self) -> CollectionPhase {
        self.phase
    }

    #[must_use]
    pub fn slouching(&self) -> &TrainingBucket {
        &self.slouching
    }

    #[must_use]
    pub fn straight(&self) -> &TrainingBucket {
        &self.straight
    }

    fn clear(&mut self) {
        self.slouching.clear();
        self.straight.clear();
    }
}

/// Feedback produced by one collector step
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEffect {
    /// Frame dropped; names the first required part not confidently visible
    MissingPart(BodyPart),
    /// Sample appended to the bucket of `class`
    Progress { class: PostureClass, percent: u32 },
    /// The collector moved to a new phase
    PhaseChanged(CollectionPhase),
    /// Classifier trained, buckets cleared, back to inference
    TrainingComplete(FitReport),
    /// Nothing to collect in the current phase
    Idle,
}

/// Result of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionEffect {
    MissingPart(BodyPart),
    Verdict {
        slouching: bool,
        /// Unsquashed classifier output
        raw_score: f32,
        /// Logistic of `raw_score`
        probability: f32,
    },
}

/// Fixed parameters of the collector
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub required: RequiredKeypointSet,
    /// Keypoints must score strictly above this
    pub min_part_confidence: f32,
    /// Normalization scale applied to both coordinates
    pub frame_width: f32,
    pub target_size: usize,
    pub fit_options: FitOptions,
    /// Probability at or above which a frame reads as slouching
    pub threshold: f32,
}

impl CollectorSettings {
    /// Derive settings from the application configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the required keypoint list is invalid
    #[allow(clippy::cast_precision_loss)] // Frame widths are small
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            required: config.required_set()?,
            min_part_confidence: config.pose.min_part_confidence,
            frame_width: config.video.width as f32,
            target_size: config.collection.target_size,
            fit_options: config.classifier.fit_options(),
            threshold: config.classifier.threshold,
        })
    }
}

/// Sample collector and trainer
pub struct SampleCollector {
    settings: CollectorSettings,
}

impl SampleCollector {
    /// Create a collector
    ///
    /// # Errors
    ///
    /// Returns an error if the frame width or target size is not positive
    pub fn new(settings: CollectorSettings) -> Result<Self> {
        if !(settings.frame_width.is_finite() && settings.frame_width > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Frame width must be positive, got {}",
                settings.frame_width
            )));
        }
        if settings.target_size == 0 {
            return Err(Error::InvalidInput("Target sample size must be positive".to_string()));
        }
        Ok(Self { settings })
    }

    #[must_use]
    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Fresh idle state sized for this collector
    #[must_use]
    pub fn new_state(&self) -> CollectorState {
        CollectorState::new(self.settings.target_size)
    }

    /// Begin a new collection cycle with empty buckets
    pub fn start_collection(&self, state: &mut CollectorState) -> FrameEffect {
        state.clear();
        state.phase = CollectionPhase::CollectingSlouching;
        info!(
            "Collecting {} slouching samples",
            self.settings.target_size
        );
        FrameEffect::PhaseChanged(CollectionPhase::CollectingSlouching)
    }

    /// Abandon any collection and return to inference
    pub fn reset(&self, state: &mut CollectorState) {
        state.clear();
        state.phase = CollectionPhase::Idle;
        info!("Collection reset");
    }

    /// Gate, flatten and route one frame's keypoints.
    ///
    /// # Errors
    ///
    /// Propagates a failing training call; the state then stays in
    /// [`CollectionPhase::Training`] with both buckets intact.
    pub fn submit_frame(
        &self,
        state: &mut CollectorState,
        keypoints: &[Keypoint],
        classifier: &mut dyn Classifier,
    ) -> Result<FrameEffect> {
        let sample = match self
            .settings
            .required
            .check(keypoints, self.settings.min_part_confidence)
        {
            KeypointCheck::Complete(sample) => sample,
            KeypointCheck::Missing(part) => return Ok(FrameEffect::MissingPart(part)),
        };

        match state.phase {
            CollectionPhase::Idle => Ok(FrameEffect::Idle),
            CollectionPhase::CollectingSlouching => {
                state.slouching.push(sample)?;
                if state.slouching.is_full() {
                    state.phase = CollectionPhase::CollectingStraight;
                    info!("Slouching samples complete, collecting straight samples");
                    Ok(FrameEffect::PhaseChanged(CollectionPhase::CollectingStraight))
                } else {
                    let percent = state.slouching.percent();
                    debug!("slouching samples {}%", percent);
                    Ok(FrameEffect::Progress {
                        class: PostureClass::Slouching,
                        percent,
                    })
                }
            }
            CollectionPhase::CollectingStraight => {
                state.straight.push(sample)?;
                let percent = state.straight.percent();
                debug!("straight samples {}%", percent);
                if state.straight.is_full() {
                    state.phase = CollectionPhase::Training;
                    info!("Straight samples complete, training on next frame");
                }
                Ok(FrameEffect::Progress {
                    class: PostureClass::Straight,
                    percent,
                })
            }
            CollectionPhase::Training => {
                let (inputs, labels) = self.build_dataset(state)?;
                info!(
                    "Training classifier on {} samples ({} epochs, batch {})",
                    labels.len(),
                    self.settings.fit_options.epochs,
                    self.settings.fit_options.batch_size
                );
                let report = classifier.fit(inputs, labels, &self.settings.fit_options)?;
                state.clear();
                state.phase = CollectionPhase::Idle;
                info!("Training complete, final loss {:.5}", report.final_loss);
                Ok(FrameEffect::TrainingComplete(report))
            }
        }
    }

    /// Labeled dataset from both buckets: slouching rows first, labels 1 then 0.
    ///
    /// Every coordinate is divided by the frame width.
    ///
    /// # Errors
    ///
    /// Returns an error if stored samples have inconsistent lengths
    pub fn build_dataset(&self, state: &CollectorState) -> Result<(Array2<f32>, Array1<f32>)> {
        let cols = self.settings.required.vector_len();
        let buckets = [&state.slouching, &state.straight];
        let rows: usize = buckets.iter().map(|b| b.len()).sum();

        let mut data = Vec::with_capacity(rows * cols);
        let mut labels = Vec::with_capacity(rows);
        for bucket in buckets {
            for sample in bucket.samples() {
                data.extend(sample.normalized(self.settings.frame_width));
                labels.push(bucket.class().label());
            }
        }

        let inputs = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to build training inputs: {e}")))?;
        Ok((inputs, Array1::from(labels)))
    }

    /// Classify one frame without touching any collection state
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier rejects the input
    pub fn predict(&self, keypoints: &[Keypoint], classifier: &dyn Classifier) -> Result<PredictionEffect> {
        let sample = match self
            .settings
            .required
            .check(keypoints, self.settings.min_part_confidence)
        {
            KeypointCheck::Complete(sample) => sample,
            KeypointCheck::Missing(part) => return Ok(PredictionEffect::MissingPart(part)),
        };

        let row = sample.normalized(self.settings.frame_width);
        let inputs = Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to build input row: {e}")))?;
        let raw_score = classifier
            .predict(inputs.view())?
            .get(0)
            .copied()
            .ok_or_else(|| Error::ModelOutputError("Classifier returned no score".to_string()))?;
        let probability = sigmoid(raw_score);

        Ok(PredictionEffect::Verdict {
            slouching: probability >= self.settings.threshold,
            raw_score,
            probability,
        })
    }
}
