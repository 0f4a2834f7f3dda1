use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clubhead::io::{load_params, load_poses, FramePose, FrameReport};
use clubhead::{detect, ClubHeadDetector, ClubheadError, DetectorParams};

#[cfg(not(feature = "tracing"))]
use log::{debug, info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

#[cfg(feature = "tracing")]
use clubhead::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use clubhead::core::init_with_level;

/// Locate the golf club head in an ordered sequence of frames.
#[derive(Parser, Debug)]
#[command(
    name = "clubhead",
    version,
    about = "Club-head localization from video frames and body pose",
    long_about = "Runs one detector over the frames in the given order, so tracking, \
        interpolation and shaft calibration carry over from frame to frame. \
        Prints one JSON object per frame to stdout."
)]
struct Args {
    /// Frame images, in playback order.
    #[arg(required_unless_present = "print_config")]
    frames: Vec<PathBuf>,

    /// JSON array with one pose entry per frame.
    #[arg(short, long, required_unless_present = "print_config")]
    poses: Option<PathBuf>,

    /// Detector config (JSON); missing fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print each result instead of one line per frame.
    #[arg(long)]
    pretty: bool,

    /// Print the effective detector config and exit.
    #[arg(long)]
    print_config: bool,

    /// Log level (error, warn, info, debug, trace).
    #[cfg_attr(feature = "tracing", allow(dead_code))]
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit tracing output as JSON.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_trace: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    #[cfg(not(feature = "tracing"))]
    {
        let level = args.log_level.parse().unwrap_or(LevelFilter::Warn);
        if let Err(e) = init_with_level(level) {
            eprintln!("failed to install logger: {e}");
        }
    }
    #[cfg(feature = "tracing")]
    init_tracing(args.json_trace);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ClubheadError> {
    let params = match &args.config {
        Some(path) => load_params(path)?,
        None => DetectorParams::default(),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.print_config {
        let json = to_json(&params, true)?;
        return write_line(&mut out, &json);
    }

    let poses: Vec<FramePose> = match &args.poses {
        Some(path) => load_poses(path)?,
        None => Vec::new(),
    };
    if poses.len() < args.frames.len() {
        return Err(ClubheadError::MissingPoses {
            frames: args.frames.len(),
            poses: poses.len(),
        });
    }

    let min_visibility = params.roi.min_visibility;
    let mut detector = ClubHeadDetector::new(params)?;
    info!("processing {} frames", args.frames.len());

    for (i, (path, entry)) in args.frames.iter().zip(&poses).enumerate() {
        let img = image::open(path).map_err(|source| ClubheadError::Image {
            path: path.clone(),
            source,
        })?;
        let (width, height) = (img.width() as usize, img.height() as usize);
        detector.init(width, height)?;

        let result = detect::detect_image(
            &mut detector,
            &img,
            &entry.pose,
            entry.wrist_separation(min_visibility),
        )?;
        debug!("frame {i}: {} ({:.2})", result.method, result.confidence);

        let report = FrameReport {
            frame: i,
            path: path.display().to_string(),
            width,
            height,
            result,
        };
        write_line(&mut out, &to_json(&report, args.pretty)?)?;
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, ClubheadError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.map_err(|source| ClubheadError::Json {
        path: PathBuf::from("<stdout>"),
        source,
    })
}

fn write_line(out: &mut impl Write, line: &str) -> Result<(), ClubheadError> {
    writeln!(out, "{line}").map_err(|source| ClubheadError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })
}
