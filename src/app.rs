//! Main application module for the slouch detector.

use crate::{
    classifier::{dense::DenseClassifier, Classifier},
    collector::{CollectionPhase, CollectorSettings, CollectorState, SampleCollector},
    config::Config,
    cycle::{primary_pose, run_cycle},
    error::{Error, Result},
    heuristic::{SlouchnessGauge, SlouchnessReading},
    overlay,
    pose_detection::{OnnxPoseEstimator, PoseSource},
    presentation::Alert,
};
use log::{debug, error, info, warn};
use opencv::{
    core::Mat,
    highgui::{self, WINDOW_NORMAL},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::time::{Duration, Instant};

const WINDOW_NAME: &str = "Slouch Detector";

/// Video source type
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Loaded and validated configuration
    pub config: Config,
    /// Start collecting slouching samples right away
    pub start_collecting: bool,
}

/// Main application struct
pub struct SlouchApp {
    app_config: AppConfig,
    pose_source: Box<dyn PoseSource>,
    classifier: Box<dyn Classifier>,
    collector: SampleCollector,
    state: CollectorState,
    video_capture: VideoCapture,
    gauge: SlouchnessGauge,
    alert: Option<Alert>,
    slouching: bool,
    slouchness: Option<SlouchnessReading>,
}

impl SlouchApp {
    /// Open the video source, load the pose model and build the classifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` if the camera or the pose model is unavailable;
    /// the run cannot proceed without them.
    pub fn new(app_config: AppConfig) -> Result<Self> {
        info!("Initializing Slouch Detector application");
        let config = &app_config.config;
        config.validate()?;

        let video_capture = open_video(&app_config.video_source, config).map_err(|e| {
            let alert = Alert::video_unavailable();
            error!("{}: {}", alert.heading, alert.text);
            Error::Upstream(format!("Cannot open video source: {e}"))
        })?;

        config.validate_paths()?;
        let pose_source = OnnxPoseEstimator::new(
            &config.models.pose_model,
            config.pose.input_size,
            config.pose.flip_pose_horizontal,
        )
        .map_err(|e| Error::Upstream(format!("Cannot load pose model: {e}")))?;

        let required = config.required_set()?;
        let classifier = DenseClassifier::new(
            required.vector_len(),
            config.classifier.hidden_units,
            config.classifier.activation,
            config.classifier.learning_rate,
            config.classifier.seed,
        )?;
        info!(
            "Classifier head: {} inputs, {} hidden units ({:?})",
            required.vector_len(),
            classifier.hidden_units(),
            config.classifier.activation
        );

        let collector = SampleCollector::new(CollectorSettings::from_config(config)?)?;
        let mut state = collector.new_state();
        let alert = if app_config.start_collecting {
            let effect = collector.start_collection(&mut state);
            Alert::from_frame_effect(&effect)
        } else {
            None
        };

        let gauge = SlouchnessGauge::from_config(config);

        if config.display.gui {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        Ok(Self {
            app_config,
            pose_source: Box::new(pose_source),
            classifier: Box::new(classifier),
            collector,
            state,
            video_capture,
            gauge,
            alert,
            slouching: false,
            slouchness: None,
        })
    }

    /// Run the main application loop
    ///
    /// # Errors
    ///
    /// Returns an error if capture, inference or training fails
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop (c: collect, r: reset, q: quit)");

        let mut frame_count = 0u64;
        let start_time = Instant::now();
        let interval = Duration::from_millis(self.app_config.config.video.frame_interval_ms);

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.app_config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            if self.app_config.config.display.mirror {
                let temp = frame.clone();
                opencv::core::flip(&temp, &mut frame, 1)?;
            }

            self.process_frame(&mut frame)?;

            frame_count += 1;
            let fps = frame_count as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);

            if self.app_config.config.display.gui {
                overlay::draw_status(
                    &mut frame,
                    fps,
                    phase_label(self.state.phase()),
                    self.slouchness.as_ref(),
                )?;
                highgui::imshow(WINDOW_NAME, &frame)?;

                let key = highgui::wait_key(1)?;
                if key == 27 || key == i32::from(b'q') {
                    info!("Exit requested by user");
                    break;
                }
                self.handle_key(key);
            }

            if !self.app_config.config.video.realtime {
                std::thread::sleep(interval);
            }
        }

        info!("Application shutting down");
        Ok(())
    }

    fn handle_key(&mut self, key: i32) {
        if key == i32::from(b'c') {
            let effect = self.collector.start_collection(&mut self.state);
            self.alert = Alert::from_frame_effect(&effect);
        } else if key == i32::from(b'r') {
            self.collector.reset(&mut self.state);
            self.alert = None;
        }
    }

    /// Estimate poses, route them and draw the result onto `frame`
    fn process_frame(&mut self, frame: &mut Mat) -> Result<()> {
        let poses = self.pose_source.estimate(frame)?;
        let pose_cfg = &self.app_config.config.pose;
        let display = &self.app_config.config.display;

        self.slouchness = primary_pose(&poses, pose_cfg.min_pose_confidence)
            .and_then(|pose| self.gauge.measure(&pose.keypoints));
        if let Some(reading) = &self.slouchness {
            debug!("slouchness {:.0} (over threshold: {})", reading.distance, reading.over_threshold);
        }

        if display.gui {
            if let Some(pose) = primary_pose(&poses, pose_cfg.min_pose_confidence) {
                if display.show_points {
                    overlay::draw_keypoints(frame, &pose.keypoints, pose_cfg.min_part_confidence)?;
                }
                if display.show_skeleton {
                    overlay::draw_skeleton(frame, &pose.keypoints, pose_cfg.min_part_confidence)?;
                }
                if display.show_bounding_box {
                    overlay::draw_bounding_box(frame, &pose.keypoints, pose_cfg.min_part_confidence)?;
                }
            }
        }

        let outcome = run_cycle(
            &self.collector,
            &mut self.state,
            &poses,
            pose_cfg.min_pose_confidence,
            self.classifier.as_mut(),
        )
        .map_err(|e| {
            error!("Cycle failed in phase {:?}: {}", self.state.phase(), e);
            e
        })?;
        debug!("cycle effect: {:?}", outcome.effect);

        self.slouching = outcome.slouching();
        if let Some(alert) = outcome.alert {
            if self.alert.as_ref() != Some(&alert) {
                info!("{} {}", alert.heading, alert.text);
            }
            self.alert = Some(alert);
        }

        if display.gui {
            if let Some(alert) = &self.alert {
                overlay::draw_alert(frame, alert, self.slouching)?;
            }
        }

        Ok(())
    }
}

fn open_video(source: &VideoSource, config: &Config) -> Result<VideoCapture> {
    let cap = match source {
        VideoSource::Camera(index) => {
            info!("Opening camera {}", index);
            let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
            cap.set(CAP_PROP_FRAME_WIDTH, f64::from(config.video.width))?;
            cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(config.video.height))?;

            // Reduce buffer size for lower latency (webcam only)
            cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
            cap
        }
        VideoSource::File(path) => {
            info!("Opening video file: {}", path);
            VideoCapture::from_file(path, videoio::CAP_ANY)?
        }
    };

    if !cap.is_opened()? {
        return Err(Error::Upstream(format!("{source:?} could not be opened")));
    }
    Ok(cap)
}

fn phase_label(phase: CollectionPhase) -> &'static str {
    match phase {
        CollectionPhase::Idle => "watching",
        CollectionPhase::CollectingSlouching => "collecting: slouching",
        CollectionPhase::CollectingStraight => "collecting: straight",
        CollectionPhase::Training => "training",
    }
}
