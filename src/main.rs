//! Gaze parallax demo: runs the tracking pipeline headless against a
//! simulated viewer and logs the resulting camera motion.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gaze_parallax::{
    app::ParallaxApp,
    config::Config,
    follower::FollowMode,
    simulation::{LogSurface, OrbitingFace, OrbitingFaceConfig, SyntheticCapture},
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Camera follows the viewer's eyes
    Gaze,
    /// Camera orbits under pointer control; gaze is ignored
    Orbit,
}

impl From<Mode> for FollowMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Gaze => Self::Gaze,
            Mode::Orbit => Self::Orbit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Run the detector on every Nth frame
    #[arg(short = 's', long)]
    frame_skip: Option<u32>,

    /// Position smoothing factor in (0, 1]
    #[arg(short, long)]
    alpha: Option<f64>,

    /// Camera interaction mode
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Stop after this many seconds (runs until Ctrl-C when omitted)
    #[arg(short = 't', long, value_parser = parse_seconds)]
    duration: Option<Duration>,

    /// Simulate losing the face on every Nth detection
    #[arg(long)]
    dropout: Option<u64>,

    /// Capture surface size as WIDTHxHEIGHT
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    size: (u32, u32),

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Write the example configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn parse_size(raw: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok((w, h))
}

fn parse_seconds(raw: &str) -> std::result::Result<Duration, String> {
    let seconds = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid duration '{raw}': {e}"))
}

impl Args {
    /// Layer command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(frame_skip) = self.frame_skip {
            config.scheduler.frame_skip = frame_skip;
        }
        if let Some(alpha) = self.alpha {
            config.conditioning.position_alpha = alpha;
        }
        if let Some(mode) = self.mode {
            config.camera.mode = mode.into();
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Some(path) = &args.write_config {
        std::fs::write(path, gaze_parallax::config::EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Example configuration written to {}", path.display());
        return Ok(());
    }

    info!("Gaze Parallax - simulated viewer");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    args.apply(&mut config);

    let options = config.detector_options();
    info!(
        "Detector input {}px, score threshold {:.2}",
        options.input_size, options.score_threshold
    );

    let detector = OrbitingFace::new(OrbitingFaceConfig {
        dropout_every: args.dropout,
        ..OrbitingFaceConfig::default()
    });
    let capture = SyntheticCapture::new(args.size.0, args.size.1);
    // Log roughly once per second of rendering
    let log_every = config.render.target_fps.round().max(1.0) as u64;

    let app = ParallaxApp::new(
        config,
        Arc::new(detector),
        Box::new(capture),
        Box::new(LogSurface::new(log_every)),
    )?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let summary = runtime.block_on(app.run(args.duration, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }))?;

    let p = summary.final_pose.position;
    info!(
        "Rendered {} frames in {:.1}s, final camera ({:.3}, {:.3}, {:.3})",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        p.x,
        p.y,
        p.z
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["gaze-parallax"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.size, (640, 480));
        assert!(!args.debug);
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args::try_parse_from([
            "gaze-parallax",
            "--frame-skip",
            "3",
            "--alpha",
            "0.2",
            "--mode",
            "orbit",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.scheduler.frame_skip, 3);
        assert_eq!(config.conditioning.position_alpha, 0.2);
        assert_eq!(config.camera.mode, FollowMode::Orbit);
    }

    #[test]
    fn test_rejects_bad_size_and_mode() {
        assert!(Args::try_parse_from(["gaze-parallax", "--size", "640"]).is_err());
        assert!(Args::try_parse_from(["gaze-parallax", "--mode", "sideways"]).is_err());
    }

    #[test]
    fn test_duration_must_be_representable() {
        let args = Args::try_parse_from(["gaze-parallax", "--duration", "1.5"]).unwrap();
        assert_eq!(args.duration, Some(Duration::from_millis(1500)));
        assert!(Args::try_parse_from(["gaze-parallax", "--duration=-1"]).is_err());
        assert!(Args::try_parse_from(["gaze-parallax", "--duration", "inf"]).is_err());
    }
}
