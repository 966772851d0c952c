//! Drawing of poses and alerts onto camera frames.

use crate::constants::{KEYPOINT_RADIUS, OVERLAY_LINE_WIDTH};
use crate::heuristic::SlouchnessReading;
use crate::keypoints::{adjacent_keypoints, Keypoint, Position};
use crate::presentation::{Alert, AlertLevel};
use crate::utils::bounding_box;
use crate::utils::safe_cast::f32_to_i32_clamp;
use crate::Result;
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

/// Skeleton and keypoint color (aqua, BGR)
fn pose_color() -> Scalar {
    Scalar::new(255.0, 255.0, 0.0, 0.0)
}

/// Bounding box color (red, BGR)
fn box_color() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn alert_color(level: AlertLevel) -> Scalar {
    match level {
        AlertLevel::Plain => Scalar::new(255.0, 255.0, 255.0, 0.0),
        AlertLevel::Secondary => Scalar::new(180.0, 180.0, 180.0, 0.0),
        AlertLevel::Info => Scalar::new(255.0, 200.0, 0.0, 0.0),
        AlertLevel::Success => Scalar::new(0.0, 200.0, 0.0, 0.0),
        AlertLevel::Warning => Scalar::new(0.0, 200.0, 255.0, 0.0),
        AlertLevel::Danger => Scalar::new(0.0, 0.0, 255.0, 0.0),
    }
}

fn to_point(frame: &Mat, position: Position) -> Point {
    Point::new(
        f32_to_i32_clamp(position.x, 0, frame.cols()),
        f32_to_i32_clamp(position.y, 0, frame.rows()),
    )
}

/// Dots for every keypoint scoring above `min_confidence`
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_keypoints(frame: &mut Mat, keypoints: &[Keypoint], min_confidence: f32) -> Result<()> {
    for keypoint in keypoints.iter().filter(|kp| kp.score > min_confidence) {
        let center = to_point(frame, keypoint.position);
        imgproc::circle(frame, center, KEYPOINT_RADIUS, pose_color(), -1, LINE_8, 0)?;
    }
    Ok(())
}

/// Segments between adjacent keypoints
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_skeleton(frame: &mut Mat, keypoints: &[Keypoint], min_confidence: f32) -> Result<()> {
    for (a, b) in adjacent_keypoints(keypoints, min_confidence) {
        let from = to_point(frame, a.position);
        let to = to_point(frame, b.position);
        imgproc::line(frame, from, to, pose_color(), OVERLAY_LINE_WIDTH, LINE_8, 0)?;
    }
    Ok(())
}

/// Box around all confident keypoints
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_bounding_box(frame: &mut Mat, keypoints: &[Keypoint], min_confidence: f32) -> Result<()> {
    if let Some(bbox) = bounding_box(keypoints, min_confidence) {
        let rect = bbox.to_rect(frame.cols(), frame.rows());
        imgproc::rectangle(frame, rect, box_color(), OVERLAY_LINE_WIDTH, LINE_8, 0)?;
    }
    Ok(())
}

/// Alert heading and text in the top-left corner, plus a banner while slouching
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_alert(frame: &mut Mat, alert: &Alert, slouching: bool) -> Result<()> {
    let color = alert_color(alert.level);
    imgproc::put_text(
        frame,
        &alert.heading,
        Point::new(10, 60),
        FONT_HERSHEY_SIMPLEX,
        0.7,
        color,
        2,
        LINE_8,
        false,
    )?;
    imgproc::put_text(
        frame,
        &alert.text,
        Point::new(10, 85),
        FONT_HERSHEY_SIMPLEX,
        0.5,
        color,
        1,
        LINE_8,
        false,
    )?;

    if slouching {
        let y = (frame.rows() - 20).max(0);
        imgproc::put_text(
            frame,
            "SLOUCHING",
            Point::new(10, y),
            FONT_HERSHEY_SIMPLEX,
            1.0,
            alert_color(AlertLevel::Danger),
            2,
            LINE_8,
            false,
        )?;
    }
    Ok(())
}

/// Frame rate, collection phase and the slouchness reading
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_status(frame: &mut Mat, fps: f64, status: &str, slouchness: Option<&SlouchnessReading>) -> Result<()> {
    let text = format!("FPS: {fps:.1}  {status}");
    imgproc::put_text(
        frame,
        &text,
        Point::new(10, 30),
        FONT_HERSHEY_SIMPLEX,
        0.7,
        Scalar::new(0.0, 255.0, 0.0, 0.0),
        2,
        LINE_8,
        false,
    )?;

    let (text, level) = match slouchness {
        Some(reading) if reading.over_threshold => (format!("slouchness: {:.0}", reading.distance), AlertLevel::Warning),
        Some(reading) => (format!("slouchness: {:.0}", reading.distance), AlertLevel::Plain),
        None => ("slouchness: -".to_string(), AlertLevel::Secondary),
    };
    let x = (frame.cols() - 220).max(0);
    imgproc::put_text(
        frame,
        &text,
        Point::new(x, 30),
        FONT_HERSHEY_SIMPLEX,
        0.6,
        alert_color(level),
        1,
        LINE_8,
        false,
    )?;
    Ok(())
}
