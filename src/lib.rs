//! Real-time posture monitoring with a live-trained slouching classifier.
//!
//! This library provides:
//! - ONNX Runtime single-pose estimation on camera frames
//! - A sample collector that gathers labeled "slouching" and "straight"
//!   keypoint vectors and trains a small dense classifier head
//! - Posture prediction and user-facing alerts
//!
//! The per-frame pipeline:
//! 1. Pose estimation to locate body keypoints
//! 2. Required keypoint gate (shoulders, eyes, nose by default)
//! 3. Either sample collection/training or classification, by phase
//! 4. Effects mapped to alerts and drawn onto the frame
//!
//! # Examples
//!
//! ## Collecting samples and training
//!
//! ```no_run
//! use slouch_detector::{
//!     classifier::{dense::DenseClassifier, Activation, FitOptions},
//!     collector::{CollectorSettings, FrameEffect, SampleCollector},
//!     keypoints::{BodyPart, Keypoint, RequiredKeypointSet},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let required = RequiredKeypointSet::default();
//! let mut classifier = DenseClassifier::new(required.vector_len(), 24, Activation::Linear, 0.001, None)?;
//! let collector = SampleCollector::new(CollectorSettings {
//!     required,
//!     min_part_confidence: 0.6,
//!     frame_width: 600.0,
//!     target_size: 50,
//!     fit_options: FitOptions::default(),
//!     threshold: 0.6,
//! })?;
//!
//! let mut state = collector.new_state();
//! collector.start_collection(&mut state);
//!
//! // Keypoints come from a pose source, one set per frame
//! let keypoints = vec![Keypoint::new(BodyPart::Nose, 300.0, 180.0, 0.9)];
//! match collector.submit_frame(&mut state, &keypoints, &mut classifier)? {
//!     FrameEffect::MissingPart(part) => println!("Can't see your {part}"),
//!     effect => println!("{effect:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Predicting posture
//!
//! ```no_run
//! use slouch_detector::{
//!     collector::{CollectorSettings, PredictionEffect, SampleCollector},
//!     config::Config,
//!     classifier::dense::DenseClassifier,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let collector = SampleCollector::new(CollectorSettings::from_config(&config)?)?;
//! let classifier = DenseClassifier::new(10, 24, config.classifier.activation, 0.001, Some(7))?;
//!
//! # let keypoints: Vec<slouch_detector::keypoints::Keypoint> = Vec::new();
//! if let PredictionEffect::Verdict { slouching, probability, .. } = collector.predict(&keypoints, &classifier)? {
//!     println!("slouching: {slouching} ({probability:.2})");
//! }
//! # Ok(())
//! # }
//! ```

/// Body keypoints and the required keypoint set
pub mod keypoints;

/// Sample collection and training state machine
pub mod collector;

/// Classifier runtime and dense network head
pub mod classifier;

/// Pose estimation with ONNX Runtime
pub mod pose_detection;

/// Training-free nose-to-shoulder slouchness gauge
pub mod heuristic;

/// Per-frame routing independent of camera and window
pub mod cycle;

/// User-facing alerts derived from effects
pub mod presentation;

/// Drawing of poses and alerts onto frames
pub mod overlay;

/// Utility functions for keypoint geometry and coordinate conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Command line arguments
pub mod cli;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
