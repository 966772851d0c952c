//! Configuration management for the slouch detector

use crate::classifier::{Activation, FitOptions};
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_HIDDEN_UNITS, DEFAULT_LEARNING_RATE,
    DEFAULT_MIN_PART_CONFIDENCE, DEFAULT_MIN_POSE_CONFIDENCE, DEFAULT_POSE_INPUT_SIZE, DEFAULT_PREDICTION_THRESHOLD,
    DEFAULT_SLOUCHNESS_THRESHOLD, DEFAULT_TARGET_SAMPLES, DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH,
};
use crate::keypoints::{BodyPart, RequiredKeypointSet, DEFAULT_REQUIRED_PARTS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Pose detection configuration
    pub pose: PoseConfig,

    /// Capture and scheduling configuration
    pub video: VideoConfig,

    /// Live sample collection configuration
    pub collection: CollectionConfig,

    /// Classifier head configuration
    pub classifier: ClassifierConfig,

    /// Training-free slouchness gauge
    pub heuristic: HeuristicConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the single-pose ONNX model
    pub pose_model: PathBuf,
}

/// Pose detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Poses scoring below this are ignored (0.0-1.0)
    pub min_pose_confidence: f32,

    /// Keypoints must score strictly above this to be used (0.0-1.0)
    pub min_part_confidence: f32,

    /// Square model input size in pixels
    pub input_size: i32,

    /// Mirror keypoint x coordinates
    pub flip_pose_horizontal: bool,
}

/// Capture and cycle scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Requested capture width; also the normalization scale of classifier input
    pub width: i32,

    /// Requested capture height
    pub height: i32,

    /// Run the next cycle immediately instead of waiting `frame_interval_ms`
    pub realtime: bool,

    /// Delay between cycles when not in real time
    pub frame_interval_ms: u64,
}

/// Live sample collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Ordered parts that must all be visible; defines the sample layout
    pub required_keypoints: Vec<BodyPart>,

    /// Samples collected per posture class
    pub target_size: usize,
}

/// Classifier head parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Units in the hidden dense layer
    pub hidden_units: usize,

    /// Hidden layer activation
    pub activation: Activation,

    /// Training epochs per collection cycle
    pub epochs: usize,

    /// Mini-batch size
    pub batch_size: usize,

    /// Adam learning rate
    pub learning_rate: f32,

    /// Shuffle samples every epoch
    pub shuffle: bool,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,

    /// Squashed score at or above which a frame reads as slouching
    pub threshold: f32,
}

/// Nose-to-shoulder slouchness gauge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Shoulder measured against the nose
    pub shoulder: BodyPart,

    /// Squared horizontal distance (pixels²) at or above which the gauge reads slouching
    pub threshold: f32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the camera window
    pub gui: bool,

    /// Draw keypoint dots
    pub show_points: bool,

    /// Draw skeleton segments
    pub show_skeleton: bool,

    /// Draw the pose bounding box
    pub show_bounding_box: bool,

    /// Mirror the camera image like a webcam preview
    pub mirror: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_model: PathBuf::from("assets/pose_estimation.onnx"),
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            min_pose_confidence: DEFAULT_MIN_POSE_CONFIDENCE,
            min_part_confidence: DEFAULT_MIN_PART_CONFIDENCE,
            input_size: DEFAULT_POSE_INPUT_SIZE,
            flip_pose_horizontal: false,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
            realtime: true,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            required_keypoints: DEFAULT_REQUIRED_PARTS.to_vec(),
            target_size: DEFAULT_TARGET_SAMPLES,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            hidden_units: DEFAULT_HIDDEN_UNITS,
            activation: Activation::Linear,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            shuffle: true,
            seed: None,
            threshold: DEFAULT_PREDICTION_THRESHOLD,
        }
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            shoulder: BodyPart::RightShoulder,
            threshold: DEFAULT_SLOUCHNESS_THRESHOLD,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gui: true,
            show_points: true,
            show_skeleton: true,
            show_bounding_box: false,
            mirror: true,
        }
    }
}

impl ClassifierConfig {
    /// Training schedule for [`crate::classifier::Classifier::fit`]
    #[must_use]
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs: self.epochs,
            batch_size: self.batch_size,
            shuffle: self.shuffle,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Build the required keypoint set
    ///
    /// # Errors
    ///
    /// Returns an error if the configured list is empty or has duplicates
    pub fn required_set(&self) -> Result<RequiredKeypointSet> {
        RequiredKeypointSet::new(self.collection.required_keypoints.clone())
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        // Validate thresholds
        if !(0.0..=1.0).contains(&self.pose.min_pose_confidence) {
            return Err(Error::ConfigError(
                "Minimum pose confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pose.min_part_confidence) {
            return Err(Error::ConfigError(
                "Minimum part confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.threshold) {
            return Err(Error::ConfigError(
                "Prediction threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.pose.input_size <= 0 {
            return Err(Error::ConfigError("Pose input size must be greater than 0".to_string()));
        }

        // Width is the normalization scale, it must never be zero
        if self.video.width <= 0 || self.video.height <= 0 {
            return Err(Error::ConfigError("Video dimensions must be greater than 0".to_string()));
        }

        self.required_set()?;
        if self.collection.target_size == 0 {
            return Err(Error::ConfigError("Target sample size must be greater than 0".to_string()));
        }

        if self.classifier.hidden_units == 0 {
            return Err(Error::ConfigError("Hidden units must be greater than 0".to_string()));
        }
        if self.classifier.epochs == 0 || self.classifier.batch_size == 0 {
            return Err(Error::ConfigError(
                "Epochs and batch size must be greater than 0".to_string(),
            ));
        }
        if !(self.classifier.learning_rate.is_finite() && self.classifier.learning_rate > 0.0) {
            return Err(Error::ConfigError("Learning rate must be positive".to_string()));
        }

        if !(self.heuristic.threshold.is_finite() && self.heuristic.threshold > 0.0) {
            return Err(Error::ConfigError("Slouchness threshold must be positive".to_string()));
        }
        if self.heuristic.shoulder != BodyPart::LeftShoulder && self.heuristic.shoulder != BodyPart::RightShoulder {
            return Err(Error::ConfigError(format!(
                "Slouchness shoulder must be leftShoulder or rightShoulder, got {}",
                self.heuristic.shoulder
            )));
        }

        Ok(())
    }

    /// Check that model files exist
    ///
    /// # Errors
    ///
    /// Returns an `Upstream` error naming the missing model
    pub fn validate_paths(&self) -> Result<()> {
        if !self.models.pose_model.exists() {
            return Err(Error::Upstream(format!(
                "Pose model not found: {}",
                self.models.pose_model.display()
            )));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Slouch Detector Configuration

# Model paths
models:
  pose_model: "assets/pose_estimation.onnx"

# Pose detection parameters
pose:
  min_pose_confidence: 0.1
  min_part_confidence: 0.6
  input_size: 192
  flip_pose_horizontal: false

# Capture and scheduling
video:
  width: 600
  height: 500
  realtime: true
  frame_interval_ms: 1000

# Live sample collection
collection:
  required_keypoints:
    - leftShoulder
    - leftEye
    - nose
    - rightEye
    - rightShoulder
  target_size: 50

# Classifier head
classifier:
  hidden_units: 24
  activation: linear
  epochs: 50
  batch_size: 32
  learning_rate: 0.001
  shuffle: true
  seed: null
  threshold: 0.6

# Nose-to-shoulder slouchness gauge (squared pixels)
heuristic:
  shoulder: rightShoulder
  threshold: 20000.0

# Display settings
display:
  gui: true
  show_points: true
  show_skeleton: true
  show_bounding_box: false
  mirror: true
"#;
