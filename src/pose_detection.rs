//! Single-person pose estimation with `ONNX` Runtime.
//!
//! The expected model takes one NHWC float RGB image scaled to `[0, 1]` and
//! returns `[1, 1, 17, 3]` rows of `(y, x, score)` normalized to the input,
//! in COCO keypoint order.

use crate::constants::{NUM_BODY_KEYPOINTS, POSE_OUTPUT_STRIDE};
use crate::keypoints::{BodyPart, Keypoint, Pose};
use crate::utils::safe_cast::usize_to_i32;
use crate::{Error, Result};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Source of per-frame poses
pub trait PoseSource {
    /// Detect poses in a BGR frame; keypoint positions are frame pixels
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    fn estimate(&mut self, frame: &Mat) -> Result<Vec<Pose>>;
}

/// Pose estimator backed by an `ONNX` single-pose model
pub struct OnnxPoseEstimator {
    session: Session,
    input_size: i32,
    flip_horizontal: bool,
}

impl OnnxPoseEstimator {
    /// Load a pose model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs or outputs
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: i32, flip_horizontal: bool) -> Result<Self> {
        log::info!(
            "Initializing pose estimator with model: {}",
            model_path.as_ref().display()
        );
        if input_size <= 0 {
            return Err(Error::ModelInputError(format!("Invalid model input size {input_size}")));
        }

        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_estimator")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let model_path = model_path.as_ref();
        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)
            .map_err(|e| Error::ModelError(format!("Failed to load {}: {e}", model_path.display())))?;

        if session.inputs.is_empty() {
            return Err(Error::ModelInputError("Model has no inputs".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_size,
            flip_horizontal,
        })
    }

    /// Resize, convert to RGB float and pack as a `(1, size, size, 3)` array
    #[allow(clippy::cast_sign_loss)] // Input size validated positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                let base = (row * size + col) * channels;
                for ch in 0..channels {
                    data[base + ch] = pixel[ch];
                }
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to create array: {e}")))
    }

    /// Run the model and return its flat output
    fn forward(&self, inputs: Array4<f32>) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let keypoints_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let tensor = keypoints_output.try_extract::<f32>()?;
        let view = tensor.view();
        let data = view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?;

        Ok(data.to_vec())
    }
}

impl PoseSource for OnnxPoseEstimator {
    #[allow(clippy::cast_precision_loss)] // Frame dimensions fit in f32
    fn estimate(&mut self, frame: &Mat) -> Result<Vec<Pose>> {
        if frame.empty() {
            return Ok(Vec::new());
        }
        let inputs = self.preprocess(frame)?;
        let output = self.forward(inputs)?;
        let pose = decode_pose(&output, frame.cols() as f32, frame.rows() as f32, self.flip_horizontal)?;
        Ok(vec![pose])
    }
}

/// Decode `(y, x, score)` rows normalized to `[0, 1]` into a pose in frame pixels.
///
/// The pose score is the mean keypoint score.
///
/// # Errors
///
/// Returns an error if `output` holds fewer than 17 keypoint rows
#[allow(clippy::cast_precision_loss)] // Keypoint count is 17
pub fn decode_pose(output: &[f32], frame_width: f32, frame_height: f32, flip_horizontal: bool) -> Result<Pose> {
    let expected = NUM_BODY_KEYPOINTS * POSE_OUTPUT_STRIDE;
    if output.len() < expected {
        return Err(Error::ModelDataFormatError(format!(
            "Expected {expected} pose values, got {}",
            output.len()
        )));
    }

    let keypoints: Vec<Keypoint> = output
        .chunks_exact(POSE_OUTPUT_STRIDE)
        .take(NUM_BODY_KEYPOINTS)
        .zip(BodyPart::ALL)
        .map(|(row, part)| {
            let x = row[1] * frame_width;
            let x = if flip_horizontal { frame_width - x } else { x };
            Keypoint::new(part, x, row[0] * frame_height, row[2])
        })
        .collect();

    let score = keypoints.iter().map(|kp| kp.score).sum::<f32>() / keypoints.len() as f32;
    Ok(Pose { score, keypoints })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_output() -> Vec<f32> {
        (0..NUM_BODY_KEYPOINTS)
            .flat_map(|i| [0.5, 0.25, if i % 2 == 0 { 0.8 } else { 0.4 }])
            .collect()
    }

    #[test]
    fn test_decode_scales_to_frame() {
        let pose = decode_pose(&model_output(), 600.0, 500.0, false).unwrap();
        assert_eq!(pose.keypoints.len(), NUM_BODY_KEYPOINTS);
        assert_eq!(pose.keypoints[0].part, BodyPart::Nose);
        assert_eq!(pose.keypoints[16].part, BodyPart::RightAnkle);
        assert!((pose.keypoints[0].position.x - 150.0).abs() < 1e-4);
        assert!((pose.keypoints[0].position.y - 250.0).abs() < 1e-4);
        // 9 keypoints at 0.8, 8 at 0.4
        assert!((pose.score - (9.0 * 0.8 + 8.0 * 0.4) / 17.0).abs() < 1e-5);
    }

    #[test]
    fn test_decode_flips_x() {
        let pose = decode_pose(&model_output(), 600.0, 500.0, true).unwrap();
        assert!((pose.keypoints[3].position.x - 450.0).abs() < 1e-4);
    }

    #[test]
    fn test_decode_rejects_short_output() {
        assert!(decode_pose(&[0.0; 10], 600.0, 500.0, false).is_err());
    }
}
