//! MRZ Scanner - replay driver
//!
//! Runs the scanning pipeline against recorded engine responses, using image
//! files or synthetic frames in place of a live camera.

use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mrz_scanner::capture::{CameraFormat, CameraPermission, CaptureConfig, CapturedFrame};
use mrz_scanner::config::{self, AppConfig};
use mrz_scanner::geometry::WindowOrientation;
use mrz_scanner::overlay::{self, ProjectionTarget};
use mrz_scanner::shared::CapturedScan;
use mrz_scanner::storage;
use mrz_scanner::vision::ScriptedEngine;
use mrz_scanner::MrzScannerApp;

/// MRZ Scanner - replay a scanning session
#[derive(Parser, Debug)]
#[command(name = "mrz-scanner")]
#[command(about = "Scan two-line MRZ text from camera frames")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON script of recorded engine responses
    #[arg(short, long, required_unless_present = "print_default_config")]
    script: Option<PathBuf>,

    /// Directory of frame images, replayed in file name order
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Number of synthetic frames when no frame directory is given
    #[arg(long, default_value = "30")]
    frame_count: usize,

    /// Time between replayed frames in milliseconds
    #[arg(long, default_value = "100")]
    frame_interval_ms: u64,

    /// Treat the preview window as portrait
    #[arg(long)]
    portrait_window: bool,

    /// Write the review snapshot with character markers to this path
    #[arg(long)]
    review_image: Option<PathBuf>,

    /// Write a live-preview rendering with the scan region to this path
    #[arg(long)]
    live_image: Option<PathBuf>,

    /// Seconds to wait for a capture
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", toml::to_string_pretty(&AppConfig::default())?);
        return Ok(());
    }

    let Some(script) = args.script.as_deref() else {
        // clap enforces --script unless --print-default-config is given
        return Ok(());
    };
    let config = load_or_create_config(args.config.as_deref())?;
    let engine = Arc::new(ScriptedEngine::from_file(script)?);
    let capture = config.capture_config();

    let frames = match &args.frames {
        Some(dir) => load_frames(dir, args.frame_interval_ms)?,
        None => synthetic_frames(&capture, args.frame_count, args.frame_interval_ms),
    };
    info!("Replaying {} frames", frames.len());

    let window = WindowOrientation::from_portrait_flag(args.portrait_window);
    let mut app = MrzScannerApp::start(
        &config,
        engine,
        CameraPermission::Granted,
        &offered_formats(&frames),
        window,
    )?;

    let sender = app
        .frame_sender()
        .context("Frame pipeline is not running")?;
    let feeder = std::thread::spawn(move || {
        for frame in frames {
            if sender.send(frame).is_err() {
                break;
            }
        }
    });

    let captured = app
        .review_mut()
        .wait_for_commit(Duration::from_secs(args.timeout_secs))
        .cloned();

    match captured {
        Some(scan) => {
            report_scan(&scan);
            if let Some(path) = &args.review_image {
                write_review_image(&config, &scan, path)?;
            }
            if let Some(path) = &args.live_image {
                write_live_image(&config, &scan, path)?;
            }
            app.review_mut().dismiss();
        }
        None => info!("No MRZ captured"),
    }

    app.stop();
    let _ = feeder.join();

    let stats = app.stats();
    info!(
        "Frames admitted: {}, skipped: {}, engine failures: {}, rejected: {}, commits: {}",
        stats.frames_admitted,
        stats.frames_skipped,
        stats.engine_failures,
        stats.rejected_cycles,
        stats.commits
    );

    info!("MRZ Scanner shutdown complete");
    Ok(())
}

/// Load configuration from an explicit path, the config directory, or defaults
fn load_or_create_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            let config = config::load_config(&config_path)?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }
    info!("Using default configuration");
    Ok(AppConfig::default())
}

/// Decode every image in `dir` into a frame, spaced `interval_ms` apart
fn load_frames(dir: &Path, interval_ms: u64) -> Result<Vec<CapturedFrame>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let start = Instant::now();
    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let image = match image::open(&path) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };
        let (width, height) = image.dimensions();
        let timestamp = start + Duration::from_millis(interval_ms * frames.len() as u64);
        frames.push(CapturedFrame::with_timestamp(image.into_raw(), width, height, timestamp));
    }
    Ok(frames)
}

/// Blank frames at the preferred camera resolution
fn synthetic_frames(capture: &CaptureConfig, count: usize, interval_ms: u64) -> Vec<CapturedFrame> {
    let start = Instant::now();
    let size = capture.preferred_resolution;
    (0..count)
        .map(|i| {
            CapturedFrame::blank(
                size.width,
                size.height,
                start + Duration::from_millis(interval_ms * i as u64),
            )
        })
        .collect()
}

/// The replayed frame sizes stand in for the formats a camera would offer
fn offered_formats(frames: &[CapturedFrame]) -> Vec<CameraFormat> {
    let mut formats: Vec<CameraFormat> = Vec::new();
    for frame in frames {
        let format = CameraFormat::new(frame.width, frame.height);
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    formats
}

fn report_scan(scan: &CapturedScan) {
    info!(
        "Captured scan {} on {}x{} frame",
        scan.id, scan.geometry.frame.width, scan.geometry.frame.height
    );
    for (index, line) in scan.lines.iter().enumerate() {
        let low_confidence = line
            .characters
            .iter()
            .filter(|c| c.confidence < 50.0)
            .count();
        info!(
            "Line {}: {} ({} characters, {} low confidence)",
            index + 1,
            line.text,
            line.characters.len(),
            low_confidence
        );
    }
    println!("{}", mrz_scanner::shared::copy_text(&scan.lines));
}

fn write_review_image(config: &AppConfig, scan: &CapturedScan, path: &Path) -> Result<()> {
    let Some(snapshot) = &scan.snapshot else {
        warn!("Engine returned no snapshot, review image not written");
        return Ok(());
    };
    let mut image = snapshot.decode()?;
    let offset = overlay::projection_offset(
        ProjectionTarget::CroppedSnapshot,
        config.scan.engine_coordinates,
        scan.geometry.crop_offset,
    );
    let style = config.overlay_style();
    let markers = overlay::project_lines(&scan.lines, offset, style.marker_bias);
    overlay::annotate_review(&mut image, &markers, &style);
    image
        .save(path)
        .with_context(|| format!("Failed to write review image {:?}", path))?;
    info!("Review image written to {:?}", path);
    Ok(())
}

fn write_live_image(config: &AppConfig, scan: &CapturedScan, path: &Path) -> Result<()> {
    let frame = scan.geometry.frame;
    let mut image = RgbaImage::from_pixel(frame.width, frame.height, Rgba([32, 32, 32, 255]));
    let offset = overlay::projection_offset(
        ProjectionTarget::LiveFrame,
        config.scan.engine_coordinates,
        scan.geometry.crop_offset,
    );
    let style = config.overlay_style();
    let markers = overlay::project_lines(&scan.lines, offset, style.marker_bias);
    overlay::annotate_frame(&mut image, scan.geometry.region, &markers, &style);
    image
        .save(path)
        .with_context(|| format!("Failed to write live image {:?}", path))?;
    info!("Live image written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_script_required_for_replay() {
        let err = Args::try_parse_from(["mrz-scanner"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        assert!(Args::try_parse_from(["mrz-scanner", "--print-default-config"]).is_ok());
        let args = Args::try_parse_from(["mrz-scanner", "--script", "session.json"]).unwrap();
        assert_eq!(args.script, Some(PathBuf::from("session.json")));
    }

    #[test]
    fn test_offered_formats_deduplicates_frame_sizes() {
        let start = Instant::now();
        let frames = vec![
            CapturedFrame::blank(1280, 720, start),
            CapturedFrame::blank(640, 480, start),
            CapturedFrame::blank(1280, 720, start),
        ];
        assert_eq!(
            offered_formats(&frames),
            vec![CameraFormat::new(1280, 720), CameraFormat::new(640, 480)]
        );
    }
}
