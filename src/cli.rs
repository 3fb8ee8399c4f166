// syno-thumbs CLI binary - thumbnails for one directory

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use syno_thumbs_lib::constants::{EA_DIR_NAME, RENDER_TIMEOUT_SECS};
use syno_thumbs_lib::init_logging;
use syno_thumbs_lib::jobs::runner::run_directory;
use syno_thumbs_lib::jobs::{FileReport, JobOptions, SizeOutcome, ThumbJob};
use syno_thumbs_lib::metadata::probe::ExternalProber;
use syno_thumbs_lib::thumbs::render::{ExternalRenderer, PhotoEngine};
use syno_thumbs_lib::thumbs::ThumbSize;

#[derive(Parser)]
#[command(name = "syno-thumbs")]
#[command(about = "Generate Synology-style @eaDir thumbnails for photos and videos", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing media files (defaults to current directory)
    directory: Option<PathBuf>,

    /// Override @eaDir location (defaults to <DIRECTORY>/@eaDir)
    #[arg(long)]
    ea_dir: Option<PathBuf>,

    /// Seek position in seconds for video thumbnails
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    video_seek: f64,

    /// Only print what would be done
    #[arg(long)]
    dry_run: bool,

    /// Print each created thumbnail or .fail file
    #[arg(long)]
    debug: bool,

    /// Regenerate thumbnails even if they already exist
    #[arg(long)]
    force: bool,

    /// Renderer timeout per thumbnail
    #[arg(long, value_name = "SECONDS", default_value_t = RENDER_TIMEOUT_SECS)]
    timeout: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let directory = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let directory = directory.canonicalize().unwrap_or(directory);
    if !directory.is_dir() {
        anyhow::bail!("Not a directory: {}", directory.display());
    }

    if !cli.video_seek.is_finite() || cli.video_seek < 0.0 {
        anyhow::bail!("--video-seek must be a non-negative number of seconds");
    }

    let ea_dir = cli.ea_dir.unwrap_or_else(|| directory.join(EA_DIR_NAME));
    let ea_dir = ea_dir.canonicalize().unwrap_or(ea_dir);

    let renderer = ExternalRenderer::detect(Duration::from_secs(cli.timeout))?;
    let prober = ExternalProber::default();

    if cli.debug && !cli.dry_run {
        let photos = match renderer.photo_engine() {
            PhotoEngine::ImageMagick(convert) => convert.display().to_string(),
            PhotoEngine::Ffmpeg => "ffmpeg".to_string(),
        };
        println!("Using: {} (photos: {})", renderer.ffmpeg().display(), photos);
        println!();
    }

    let options = JobOptions {
        video_seek: cli.video_seek,
        dry_run: cli.dry_run,
        force: cli.force,
    };
    let job = ThumbJob::new(&ea_dir, &prober, &renderer, options);

    let summary = run_directory(&directory, &job, |report| {
        if cli.dry_run {
            print_planned(report);
        } else if cli.debug {
            print_outcomes(report);
        }
    })?;

    if cli.dry_run {
        println!("Would process {} file(s).", summary.files);
    } else {
        if cli.debug {
            println!();
            println!(
                "Thumbnails: {} created, {} already present, {} failed",
                summary.created, summary.present, summary.failed
            );
        }
        println!("Processed {} file(s). Thumbnails in {}", summary.files, ea_dir.display());
    }

    Ok(())
}

// --- Helper Functions ---

fn print_planned(report: &FileReport) {
    println!("[dry-run] {}:", report.file_name());
    for (size, outcome) in &report.outcomes {
        let action = match outcome {
            SizeOutcome::Planned(dims) => format!("would create {}", dims),
            SizeOutcome::AlreadyPresent => "exists, skipped".to_string(),
            SizeOutcome::Failed(reason) => format!("would fail ({})", reason),
            SizeOutcome::Created => "created".to_string(),
        };
        println!("    {}: {}", thumb_name(report, *size, false), action);
    }
}

fn print_outcomes(report: &FileReport) {
    println!("{}:", report.file_name());
    for (size, outcome) in &report.outcomes {
        match outcome {
            SizeOutcome::Created => println!("    created: {}", thumb_name(report, *size, false)),
            SizeOutcome::AlreadyPresent => println!("    exists: {}", thumb_name(report, *size, false)),
            SizeOutcome::Failed(reason) => println!(
                "    created: {} (thumbnail failed: {})",
                thumb_name(report, *size, true),
                reason
            ),
            SizeOutcome::Planned(dims) => println!("    planned: {} {}", thumb_name(report, *size, false), dims),
        }
    }
}

fn thumb_name(report: &FileReport, size: ThumbSize, fail: bool) -> String {
    let file = if fail { size.fail_file_name() } else { size.file_name() };
    format!("{}/{}", report.file_name(), file)
}
