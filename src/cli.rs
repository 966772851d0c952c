//! Command line arguments and how they override the configuration file.

use crate::app::{AppConfig, VideoSource};
use crate::config::Config;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "slouch-detector", author, version, about, long_about = None)]
pub struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    pub cam: i32,

    /// Video file to process
    #[arg(short, long, conflicts_with = "cam")]
    pub video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    pub config: Option<String>,

    /// Path to the pose estimation ONNX model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Samples to collect per posture class
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Slouching probability threshold (0.0-1.0)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Start collecting slouching samples immediately
    #[arg(long)]
    pub collect: bool,

    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Wait between frames instead of running in real time
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Print an example configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Apply command line flags on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.models.pose_model = model.into();
        }
        if let Some(samples) = self.samples {
            config.collection.target_size = samples;
        }
        if let Some(threshold) = self.threshold {
            config.classifier.threshold = threshold;
        }
        if let Some(interval) = self.interval_ms {
            config.video.realtime = false;
            config.video.frame_interval_ms = interval;
        }
        if self.headless {
            config.display.gui = false;
        }
    }

    #[must_use]
    pub fn video_source(&self) -> VideoSource {
        match &self.video {
            Some(path) => VideoSource::File(path.clone()),
            None => VideoSource::Camera(self.cam),
        }
    }

    /// Application settings from `config` with these flags applied
    #[must_use]
    pub fn app_config(&self, mut config: Config) -> AppConfig {
        self.apply(&mut config);
        AppConfig {
            video_source: self.video_source(),
            config,
            start_collecting: self.collect,
        }
    }
}
