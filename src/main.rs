use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use eyedir::cursor::{self, CursorDriver, CursorIntegrator, XdotoolPointer};
use eyedir::detection::{self, build_localizer};
use eyedir::source::{self, FrameSource, ImageSequence};
use eyedir::{AppConfig, GazePipeline, LocalizerStrategy, logging, run_loop};

#[derive(Parser)]
#[command(name = "eyedir")]
#[command(about = "Estimate gaze direction from a camera feed and optionally steer the cursor")]
struct Cli {
    /// JSON configuration file overriding the built-in defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replay frames from a directory of images instead of opening a camera
    #[arg(long, value_name = "DIR")]
    frames: Option<PathBuf>,

    /// Capture device index
    #[arg(long, value_name = "INDEX")]
    camera: Option<u32>,

    /// Pupil localization strategy
    #[arg(long, value_enum)]
    strategy: Option<LocalizerStrategy>,

    /// Face template model
    #[arg(long, value_name = "FILE")]
    face_model: Option<PathBuf>,

    /// Eye template model
    #[arg(long, value_name = "FILE")]
    eye_model: Option<PathBuf>,

    /// Move the system pointer with the gaze
    #[arg(long)]
    cursor: bool,

    /// Report the last known pupil on frames where none is found
    #[arg(long)]
    track_pupil: bool,

    /// Show the camera feed in a window (Escape stops)
    #[arg(long)]
    display: bool,

    /// Save per-frame eye crops and blobs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("--(!)Error: {:#}", e);
            -1
        }
    };

    std::process::exit(code);
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(index) = cli.camera {
        config.camera.index = index;
    }
    if let Some(strategy) = cli.strategy {
        config.localizer.strategy = strategy;
    }
    if let Some(path) = &cli.face_model {
        config.detector.face_model = path.clone();
    }
    if let Some(path) = &cli.eye_model {
        config.detector.eye_model = path.clone();
    }
    if cli.cursor {
        config.cursor.enabled = true;
    }
    if cli.track_pupil {
        config.tracking.track_pupil = true;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    logging::init_logging(&config.logging);

    let (faces, eyes) =
        detection::load_detectors(&config.detector).context("Error loading detector models")?;

    let mut pipeline = GazePipeline::new(&faces, &eyes, build_localizer(&config.localizer))
        .with_pupil_tracking(config.tracking.track_pupil);

    if config.cursor.enabled {
        let (width, height) = match config.screen_override() {
            Some(dims) => dims,
            None => cursor::query_screen_size().context("Failed to query screen size")?,
        };
        let pointer = XdotoolPointer::connect().context("Failed to open pointer backend")?;
        tracing::info!(width, height, gain = config.cursor.gain, "Cursor control enabled");

        pipeline = pipeline.with_cursor(CursorDriver::new(
            CursorIntegrator::new(width, height, config.cursor.gain),
            Box::new(pointer),
        ));
    }

    if let Some(debug_dir) = cli.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let mut frame_source: Box<dyn FrameSource> = match &cli.frames {
        Some(dir) => Box::new(ImageSequence::open(dir).context("Error opening frame directory")?),
        None => source::open_camera(config.camera.index).context("Error opening video capture")?,
    };

    let mut display = if cli.display {
        Some(source::open_display("Eyes Tracker").context("Error opening display")?)
    } else {
        None
    };

    tracing::info!(
        source = %frame_source.name(),
        localizer = pipeline.localizer_name(),
        "Starting gaze pipeline"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let reported = run_loop(
        frame_source.as_mut(),
        &mut pipeline,
        display.as_deref_mut(),
        &mut out,
    )?;

    tracing::info!(frames = reported, "Finished");
    Ok(())
}
