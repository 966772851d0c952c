//! Configuration files on disk

use slouch_detector::{
    classifier::Activation,
    collector::{CollectorSettings, SampleCollector},
    config::{Config, EXAMPLE_CONFIG},
    keypoints::BodyPart,
    Error,
};
use tempfile::TempDir;

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("slouch.yaml");

    let mut config = Config::default();
    config.collection.target_size = 12;
    config.collection.required_keypoints = vec![BodyPart::Nose, BodyPart::LeftShoulder, BodyPart::RightShoulder];
    config.classifier.activation = Activation::Relu;
    config.classifier.seed = Some(42);
    config.video.realtime = false;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.collection.target_size, 12);
    assert_eq!(loaded.collection.required_keypoints, config.collection.required_keypoints);
    assert_eq!(loaded.classifier.activation, Activation::Relu);
    assert_eq!(loaded.classifier.seed, Some(42));
    assert!(!loaded.video.realtime);

    let settings = CollectorSettings::from_config(&loaded).unwrap();
    assert_eq!(settings.required.vector_len(), 6);
    assert!(SampleCollector::new(settings).is_ok());
}

#[test]
fn test_example_config_file_is_loadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.yaml");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.collection.required_keypoints[0], BodyPart::LeftShoulder);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::from_file(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_unknown_body_part_in_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "collection:\n  required_keypoints:\n    - leftShoulder\n    - tail\n").unwrap();

    assert!(matches!(Config::from_file(&path), Err(Error::ConfigError(_))));
}

#[test]
fn test_missing_model_is_upstream_error() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.models.pose_model = dir.path().join("missing.onnx");
    assert!(matches!(config.validate_paths(), Err(Error::Upstream(_))));

    let model = dir.path().join("present.onnx");
    std::fs::write(&model, b"onnx").unwrap();
    config.models.pose_model = model;
    assert!(config.validate_paths().is_ok());
}
