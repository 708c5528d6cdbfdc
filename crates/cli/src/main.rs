use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use crossbeam_channel::Receiver;

use facetrack_core::detection::domain::face_detector::FaceDetector;
use facetrack_core::encryption::encryptor::Encryptor;
use facetrack_core::export::domain::export_sink::ExportFormat;
use facetrack_core::export::infrastructure::directory_export_sink::DirectoryExportSink;
use facetrack_core::identity::domain::identity_hasher::IdentityHasher;
use facetrack_core::pipeline::export_faces_use_case::ExportFacesUseCase;
use facetrack_core::pipeline::frame_processor::FrameProcessor;
use facetrack_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facetrack_core::pipeline::target_source::{FileTarget, FixedTarget, TargetSource};
use facetrack_core::pipeline::watch_session_use_case::{
    SessionConfig, SessionEvent, WatchSessionUseCase,
};
use facetrack_core::shared::face_image::FaceImage;
use facetrack_core::shared::settings::Settings;
use facetrack_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Watch a stream of frames for distinct faces and a target identity.
#[derive(Parser, Debug)]
#[command(name = "facetrack")]
struct Cli {
    /// Image file or directory of frames. With --identify, a single face crop.
    input: PathBuf,

    /// Identity hash to watch for.
    #[arg(long)]
    target: Option<String>,

    /// File holding the identity hash to watch for, re-read every tick.
    #[arg(long)]
    target_file: Option<PathBuf>,

    /// Write the distinct faces to this directory when the session ends.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Encrypt exported faces with this run's session key.
    #[arg(long)]
    encrypt: bool,

    /// Print the identity hash of the face image in INPUT and exit.
    #[arg(long)]
    identify: bool,

    /// ONNX face detection model.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Mean pixel difference below which two faces count as the same (0-255).
    #[arg(long)]
    similarity_threshold: Option<f64>,

    /// Pause between frames in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Settings file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    if cli.identify {
        return run_identify(&cli);
    }

    let settings = resolve_settings(&cli)?;
    let encryptor = Encryptor::with_session_key()?;
    let detector = build_detector(&settings)?;

    let source = ImageSequenceSource::open(&cli.input)?;
    if source.is_empty() {
        return Err(format!("No images found in {}", cli.input.display()).into());
    }
    let target = build_target(&cli);

    let (tx, rx) = crossbeam_channel::unbounded();
    let consumer = thread::spawn(move || consume_events(rx));

    let progress: Box<dyn Fn(usize) -> bool + Send> = Box::new(|frames| {
        eprint!("\rProcessed {frames} frames");
        true
    });

    let mut session = WatchSessionUseCase::new(
        Box::new(source),
        FrameProcessor::with_detector(detector, settings.similarity_threshold),
        target,
        Box::new(StdoutPipelineLogger::default()),
        Some(tx),
        SessionConfig::from(&settings),
        Some(progress),
        None,
    );
    let summary = session.execute();
    eprintln!();
    let entries = session.processor().gallery().snapshot();
    drop(session);
    if consumer.join().is_err() {
        log::warn!("Event consumer panicked");
    }

    log::info!(
        "{} frames, {} distinct faces, {} alerts ({} idle ticks, {} detection failures, {} faces rejected)",
        summary.frames_processed,
        summary.gallery_size,
        summary.alerts,
        summary.idle_ticks,
        summary.detection_failures,
        summary.faces_rejected
    );

    if let Some(dir) = &cli.export {
        let format = if cli.encrypt {
            ExportFormat::Encrypted
        } else {
            settings.export_format
        };
        if format == ExportFormat::Encrypted {
            log::warn!("Encrypted exports can only be read by this process; the key is not saved");
        }
        let mut export = ExportFacesUseCase::new(Box::new(DirectoryExportSink::new(dir)), encryptor);
        let written = export.execute(&entries, format)?;
        log::info!("Exported {written} face(s) to {}", dir.display());
    }

    Ok(())
}

fn run_identify(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let face = FaceImage::open(&cli.input)?;
    let identity = IdentityHasher::new().hash(&face)?;
    println!("{identity}");
    Ok(())
}

fn consume_events(rx: Receiver<SessionEvent>) {
    for event in rx {
        match event {
            SessionEvent::FaceAdmitted(entry) => {
                log::info!(
                    "New face {} ({}x{})",
                    entry.identity(),
                    entry.face().width(),
                    entry.face().height()
                );
            }
            SessionEvent::Alert(alert) => {
                let b = alert.bounding_box;
                eprintln!();
                println!(
                    "ALERT frame {}: target {} at x={} y={} {}x{}",
                    alert.frame_index, alert.identity, b.x, b.y, b.width, b.height
                );
            }
        }
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    apply_overrides(cli, &mut settings);
    settings.validate()?;
    Ok(settings)
}

fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    if let Some(model) = &cli.model {
        settings.model_path = Some(model.clone());
    }
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    if let Some(threshold) = cli.similarity_threshold {
        settings.similarity_threshold = threshold;
    }
    if let Some(ms) = cli.interval_ms {
        settings.tick_interval_ms = ms;
    }
}

#[cfg(feature = "onnx")]
fn build_detector(settings: &Settings) -> Result<Box<dyn FaceDetector>, Box<dyn Error>> {
    use facetrack_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;

    let model = settings
        .model_path
        .as_ref()
        .ok_or("No face detection model: pass --model or set model_path in the settings file")?;
    log::info!("Loading model: {}", model.display());
    let detector =
        OnnxYoloDetector::new(model, settings.confidence).map_err(|e| e as Box<dyn Error>)?;
    Ok(Box::new(detector))
}

#[cfg(not(feature = "onnx"))]
fn build_detector(_settings: &Settings) -> Result<Box<dyn FaceDetector>, Box<dyn Error>> {
    Err("Built without the `onnx` feature; no face detector is available".into())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.target.is_some() && cli.target_file.is_some() {
        return Err("--target and --target-file are mutually exclusive".into());
    }
    if cli.encrypt && cli.export.is_none() {
        return Err("--encrypt requires --export".into());
    }
    if cli.identify && (cli.export.is_some() || cli.target.is_some() || cli.target_file.is_some()) {
        return Err("--identify cannot be combined with --export or a target".into());
    }
    if cli.identify && !cli.input.is_file() {
        return Err("--identify expects a single image file".into());
    }
    if let Some(c) = cli.confidence {
        if !(0.0..=1.0).contains(&c) {
            return Err(format!("Confidence must be between 0.0 and 1.0, got {c}").into());
        }
    }
    if let Some(t) = cli.similarity_threshold {
        if !(t > 0.0 && t <= 255.0) {
            return Err(format!("Similarity threshold must be in (0, 255], got {t}").into());
        }
    }
    Ok(())
}

/// An empty or blank `--target` leaves the watcher disarmed.
fn build_target(cli: &Cli) -> Box<dyn TargetSource> {
    match (&cli.target, &cli.target_file) {
        (Some(t), _) => Box::new(FixedTarget::new(t.trim())),
        (None, Some(path)) => Box::new(FileTarget::new(path)),
        (None, None) => Box::new(FixedTarget::none()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["facetrack"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    fn existing_input() -> String {
        env!("CARGO_MANIFEST_DIR").to_string()
    }

    #[test]
    fn test_target_flags_are_exclusive() {
        let input = existing_input();
        let cli = parse(&[&input, "--target", "abc", "--target-file", "t.txt"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_encrypt_needs_export() {
        let input = existing_input();
        assert!(validate(&parse(&[&input, "--encrypt"])).is_err());
        assert!(validate(&parse(&[&input, "--encrypt", "--export", "out"])).is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let input = existing_input();
        assert!(validate(&parse(&[&input, "--confidence", "1.5"])).is_err());
        assert!(validate(&parse(&[&input, "--similarity-threshold", "0"])).is_err());
        assert!(validate(&parse(&[&input, "--similarity-threshold", "300"])).is_err());
    }

    #[test]
    fn test_missing_input_rejected() {
        assert!(validate(&parse(&["/definitely/not/here"])).is_err());
    }

    #[test]
    fn test_identify_needs_a_file() {
        let input = existing_input();
        assert!(validate(&parse(&[&input, "--identify"])).is_err());
    }

    #[test]
    fn test_empty_target_is_accepted_and_disarms() {
        let input = existing_input();
        for value in ["", "   "] {
            let cli = parse(&[&input, "--target", value]);
            assert!(validate(&cli).is_ok());
            assert_eq!(build_target(&cli).sample(), "");
        }
    }

    #[test]
    fn test_target_is_trimmed() {
        let input = existing_input();
        let cli = parse(&[&input, "--target", " abc\n"]);
        assert_eq!(build_target(&cli).sample(), "abc");
    }

    #[test]
    fn test_flags_override_settings() {
        let input = existing_input();
        let cli = parse(&[
            &input,
            "--confidence",
            "0.7",
            "--similarity-threshold",
            "12",
            "--interval-ms",
            "0",
            "--model",
            "m.onnx",
        ]);
        let mut settings = Settings::default();
        apply_overrides(&cli, &mut settings);
        assert_eq!(settings.confidence, 0.7);
        assert_eq!(settings.similarity_threshold, 12.0);
        assert_eq!(settings.tick_interval_ms, 0);
        assert_eq!(settings.model_path, Some(PathBuf::from("m.onnx")));
    }
}
