// syno-thumbs-tree CLI binary - walks a photo tree, one syno-thumbs run per directory

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use syno_thumbs_lib::constants::VERSION_CHECK_TIMEOUT_SECS;
use syno_thumbs_lib::driver::{run_tree, ToolRunner};
use syno_thumbs_lib::init_logging;
use syno_thumbs_lib::tools::{run_with_timeout, thumb_tool_path};

#[derive(Parser)]
#[command(name = "syno-thumbs-tree")]
#[command(about = "Run syno-thumbs in every directory of a photo tree, skipping @eaDir", long_about = None)]
#[command(version)]
struct Cli {
    /// Photo root (defaults to current directory)
    root: Option<PathBuf>,

    /// Passed to syno-thumbs: only print what would be done
    #[arg(long)]
    dry_run: bool,

    /// Passed to syno-thumbs: print each created thumbnail or .fail file
    #[arg(long)]
    debug: bool,

    /// Passed to syno-thumbs: regenerate existing thumbnails
    #[arg(long)]
    force: bool,

    /// Passed to syno-thumbs: video seek position
    #[arg(long, value_name = "SECONDS")]
    video_seek: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let root = match cli.root.clone() {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = root.canonicalize().unwrap_or(root);
    if !root.is_dir() {
        anyhow::bail!("Photo root not found: {}", root.display());
    }

    let tool = thumb_tool_path();
    if !tool_runs(&tool) {
        anyhow::bail!(
            "syno-thumbs not found (tried: {}). Install it next to this binary or set SYNOTHUMBS_TOOL_PATH.",
            tool.display()
        );
    }

    let mut runner = ToolRunner::new(tool, forwarded_args(&cli));
    println!("Generating thumbnails under {} with {}", root.display(), runner.tool().display());

    let summary = run_tree(&root, &mut runner);

    println!();
    println!("Visited {} director(ies), {} with errors", summary.directories, summary.failed);

    Ok(())
}

// --- Helper Functions ---

fn tool_runs(tool: &Path) -> bool {
    let mut cmd = Command::new(tool);
    cmd.arg("--version");
    run_with_timeout(&mut cmd, Duration::from_secs(VERSION_CHECK_TIMEOUT_SECS))
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn forwarded_args(cli: &Cli) -> Vec<OsString> {
    let mut args = Vec::new();
    if cli.dry_run {
        args.push(OsString::from("--dry-run"));
    }
    if cli.debug {
        args.push(OsString::from("--debug"));
    }
    if cli.force {
        args.push(OsString::from("--force"));
    }
    if let Some(seek) = cli.video_seek {
        args.push(OsString::from("--video-seek"));
        args.push(OsString::from(seek.to_string()));
    }
    args
}
