//! Tests for command-line argument parsing and config overrides

use clap::Parser;
use slouch_detector::{app::VideoSource, cli::Args, config::Config};
use std::path::PathBuf;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("slouch-detector").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_defaults_leave_config_untouched() {
    let args = parse(&[]);
    let app_config = args.app_config(Config::default());
    let defaults = Config::default();

    assert!(matches!(app_config.video_source, VideoSource::Camera(0)));
    assert!(!app_config.start_collecting);
    assert_eq!(app_config.config.collection.target_size, defaults.collection.target_size);
    assert_eq!(app_config.config.classifier.threshold, defaults.classifier.threshold);
    assert!(app_config.config.video.realtime);
    assert!(app_config.config.display.gui);
}

#[test]
fn test_interval_disables_realtime() {
    let mut config = Config::default();
    parse(&["--interval-ms", "250"]).apply(&mut config);
    assert!(!config.video.realtime);
    assert_eq!(config.video.frame_interval_ms, 250);
}

#[test]
fn test_headless_disables_gui() {
    let mut config = Config::default();
    parse(&["--headless"]).apply(&mut config);
    assert!(!config.display.gui);
}

#[test]
fn test_flags_override_file_values() {
    let mut config = Config::from_yaml("collection:\n  target_size: 80\nclassifier:\n  threshold: 0.9\n").unwrap();
    parse(&["--samples", "12", "--threshold", "0.7", "--model", "models/pose.onnx"]).apply(&mut config);

    assert_eq!(config.collection.target_size, 12);
    assert_eq!(config.classifier.threshold, 0.7);
    assert_eq!(config.models.pose_model, PathBuf::from("models/pose.onnx"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_unset_flags_keep_file_values() {
    let mut config = Config::from_yaml("collection:\n  target_size: 80\nvideo:\n  realtime: false\n").unwrap();
    parse(&["--cam", "1"]).apply(&mut config);
    assert_eq!(config.collection.target_size, 80);
    assert!(!config.video.realtime);
}

#[test]
fn test_collect_and_video_source() {
    let args = parse(&["--collect", "--video", "clip.mp4"]);
    let app_config = args.app_config(Config::default());
    assert!(app_config.start_collecting);
    assert!(matches!(app_config.video_source, VideoSource::File(ref path) if path == "clip.mp4"));

    let args = parse(&["--cam", "2"]);
    assert!(matches!(args.video_source(), VideoSource::Camera(2)));
}

#[test]
fn test_invalid_arguments_are_rejected() {
    assert!(Args::try_parse_from(["slouch-detector", "--samples", "many"]).is_err());
    assert!(Args::try_parse_from(["slouch-detector", "--cam", "1", "--video", "clip.mp4"]).is_err());
    assert!(Args::try_parse_from(["slouch-detector", "--unknown"]).is_err());
}

#[test]
fn test_out_of_range_threshold_fails_validation() {
    let app_config = parse(&["--threshold", "1.5"]).app_config(Config::default());
    assert!(app_config.config.validate().is_err());
}
