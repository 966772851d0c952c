//! Dense classifier training and end-to-end posture classification


use ndarray::{Array1, Array2};
use slouch_detector::{
    classifier::{dense::DenseClassifier, sigmoid, Activation, Classifier, FitOptions},
    collector::{CollectionPhase, CollectorSettings, FrameEffect, PredictionEffect, SampleCollector},
    keypoints::RequiredKeypointSet,
};
use test_helpers::{complete_frame, SCENARIO_PARTS};

/// Rows whose first feature separates the classes, other features constant
fn separable_dataset() -> (Array2<f32>, Array1<f32>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..20 {
        let offset = i as f32 * 0.015;
        rows.extend([0.6 + offset, 0.3, 0.5, 0.2]);
        labels.push(1.0);
        rows.extend([0.1 + offset, 0.3, 0.5, 0.2]);
        labels.push(0.0);
    }
    (
        Array2::from_shape_vec((40, 4), rows).unwrap(),
        Array1::from(labels),
    )
}

fn mse(model: &DenseClassifier, inputs: &Array2<f32>, labels: &Array1<f32>) -> f32 {
    let predictions = model.predict(inputs.view()).unwrap();
    (&predictions - labels).mapv(|d| d * d).mean().unwrap()
}

#[test]
fn test_fit_reduces_loss_and_separates_classes() {
    let (inputs, labels) = separable_dataset();
    let mut model = DenseClassifier::new(4, 24, Activation::Linear, 0.01, Some(11)).unwrap();
    let initial_loss = mse(&model, &inputs, &labels);

    let options = FitOptions {
        epochs: 300,
        batch_size: 8,
        shuffle: true,
    };
    let report = model.fit(inputs.clone(), labels.clone(), &options).unwrap();
    assert_eq!(report.epochs, 300);
    assert_eq!(report.samples, 40);
    assert!(report.final_loss < initial_loss);

    let far_slouching = Array2::from_shape_vec((1, 4), vec![0.85, 0.3, 0.5, 0.2]).unwrap();
    let far_straight = Array2::from_shape_vec((1, 4), vec![0.12, 0.3, 0.5, 0.2]).unwrap();
    let high = model.predict(far_slouching.view()).unwrap()[0];
    let low = model.predict(far_straight.view()).unwrap()[0];
    assert!(high > 0.5, "slouching score {high}");
    assert!(low < 0.5, "straight score {low}");
}

#[test]
fn test_relu_hidden_layer_trains() {
    let (inputs, labels) = separable_dataset();
    let mut model = DenseClassifier::new(4, 16, Activation::Relu, 0.01, Some(5)).unwrap();
    let initial_loss = mse(&model, &inputs, &labels);
    let report = model.fit(inputs, labels, &FitOptions::default()).unwrap();
    assert!(report.final_loss.is_finite());
    assert!(report.final_loss < initial_loss);
}

#[test]
fn test_wrong_input_width_is_rejected() {
    let mut model = DenseClassifier::new(10, 24, Activation::Linear, 0.001, Some(1)).unwrap();
    let inputs = Array2::<f32>::zeros((4, 8));
    let labels = Array1::from(vec![1.0, 1.0, 0.0, 0.0]);
    assert!(model.fit(inputs, labels, &FitOptions::default()).is_err());
}

#[test]
fn test_collect_train_predict() {
    let required = RequiredKeypointSet::new(SCENARIO_PARTS.to_vec()).unwrap();
    let mut classifier =
        DenseClassifier::new(required.vector_len(), 24, Activation::Linear, 0.01, Some(3)).unwrap();
    let collector = SampleCollector::new(CollectorSettings {
        required,
        min_part_confidence: 0.5,
        frame_width: 600.0,
        target_size: 20,
        fit_options: FitOptions {
            epochs: 200,
            batch_size: 8,
            shuffle: true,
        },
        threshold: 0.6,
    })
    .unwrap();

    let mut state = collector.new_state();
    collector.start_collection(&mut state);

    // Slouching drops the head and shoulders by 120-150 pixels
    for i in 0..20 {
        collector
            .submit_frame(&mut state, &complete_frame(120.0 + i as f32 * 1.5), &mut classifier)
            .unwrap();
    }
    for i in 0..20 {
        collector
            .submit_frame(&mut state, &complete_frame(i as f32 * 1.5), &mut classifier)
            .unwrap();
    }
    assert_eq!(state.phase(), CollectionPhase::Training);

    let effect = collector.submit_frame(&mut state, &complete_frame(0.0), &mut classifier).unwrap();
    assert!(matches!(effect, FrameEffect::TrainingComplete(_)));
    assert_eq!(state.phase(), CollectionPhase::Idle);

    match collector.predict(&complete_frame(140.0), &classifier).unwrap() {
        PredictionEffect::Verdict {
            raw_score, probability, ..
        } => {
            assert!(raw_score > 0.5, "slouching raw score {raw_score}");
            assert!((probability - sigmoid(raw_score)).abs() < 1e-6);
        }
        PredictionEffect::MissingPart(part) => panic!("missing {part}"),
    }
    match collector.predict(&complete_frame(5.0), &classifier).unwrap() {
        PredictionEffect::Verdict { raw_score, .. } => {
            assert!(raw_score < 0.5, "straight raw score {raw_score}");
        }
        PredictionEffect::MissingPart(part) => panic!("missing {part}"),
    }
}
