// Tree driver - runs the single-directory tool once per directory

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::discover::walk_directories;
use crate::error::{Result, ThumbError};

/// Handles one directory of the walk.
pub trait DirectoryRunner {
    fn run_dir(&mut self, dir: &Path) -> Result<()>;
}

/// Spawns `syno-thumbs <dir> [args...]`, output goes straight to our terminal.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    tool: PathBuf,
    args: Vec<OsString>,
}

impl ToolRunner {
    pub fn new(tool: PathBuf, args: Vec<OsString>) -> Self {
        Self { tool, args }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl DirectoryRunner for ToolRunner {
    fn run_dir(&mut self, dir: &Path) -> Result<()> {
        let status = Command::new(&self.tool)
            .arg(dir)
            .args(&self.args)
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ThumbError::ToolNotFound(self.tool.display().to_string())
                }
                _ => ThumbError::Io(e),
            })?;

        if !status.success() {
            return Err(ThumbError::Other(format!(
                "{} exited with code {} for {}",
                self.tool.display(),
                status.code().unwrap_or(-1),
                dir.display()
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub directories: usize,
    pub failed: usize,
}

/// Walk `root`, skipping @eaDir, and hand every directory to `runner`.
/// A failing directory is logged and the walk continues.
pub fn run_tree(root: &Path, runner: &mut dyn DirectoryRunner) -> TreeSummary {
    let mut summary = TreeSummary::default();

    for dir in walk_directories(root) {
        log::debug!("Processing directory {}", dir.display());
        summary.directories += 1;

        if let Err(e) = runner.run_dir(&dir) {
            log::error!("Failed to process {}: {}", dir.display(), e);
            summary.failed += 1;
        }
    }

    summary
}
