// Per-file thumbnail job
//
// For one media file: decide which sizes need work, probe once, render each
// missing size independently and record the result as thumbnail or .fail.
// Nothing here aborts on a single failure; the caller always gets a report.

pub mod runner;


use std::path::{Path, PathBuf};

use crate::metadata::probe::Prober;
use crate::metadata::{Dimensions, MediaKind};
use crate::thumbs::plan::plan;
use crate::thumbs::render::{RenderRequest, Renderer};
use crate::thumbs::sentinel::{self, ThumbStatus};
use crate::thumbs::{ThumbDir, ThumbSize};

#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Video frame offset in seconds
    pub video_seek: f64,
    /// Decide and report only; no renderer calls, no filesystem changes
    pub dry_run: bool,
    /// Regenerate thumbnails that already exist
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SizeOutcome {
    Created,
    AlreadyPresent,
    Failed(String),
    /// Dry-run: would render at these dimensions
    Planned(Dimensions),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub outcomes: Vec<(ThumbSize, SizeOutcome)>,
}

impl FileReport {
    fn new(path: &Path, kind: MediaKind) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            outcomes: Vec::with_capacity(ThumbSize::ALL.len()),
        }
    }

    pub fn count(&self, pred: impl Fn(&SizeOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SizeOutcome::Created))
    }

    pub fn present(&self) -> usize {
        self.count(|o| matches!(o, SizeOutcome::AlreadyPresent))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SizeOutcome::Failed(_)))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, SizeOutcome::Planned(_)))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Thumbnail job bound to one @eaDir root and its collaborators.
pub struct ThumbJob<'a> {
    ea_dir: &'a Path,
    prober: &'a dyn Prober,
    renderer: &'a dyn Renderer,
    options: JobOptions,
}

impl<'a> ThumbJob<'a> {
    pub fn new(
        ea_dir: &'a Path,
        prober: &'a dyn Prober,
        renderer: &'a dyn Renderer,
        options: JobOptions,
    ) -> Self {
        Self {
            ea_dir,
            prober,
            renderer,
            options,
        }
    }

    /// Process one file. Returns None for files that are not photos or videos.
    pub fn process(&self, media_path: &Path) -> Option<FileReport> {
        let kind = MediaKind::from_path(media_path);
        if !kind.is_supported() {
            return None;
        }
        let dir = ThumbDir::for_media(self.ea_dir, media_path)?;

        let mut report = FileReport::new(media_path, kind);
        let mut todo = Vec::new();

        for size in ThumbSize::ALL {
            match sentinel::status(&dir, size) {
                ThumbStatus::Ready if !self.options.force => {
                    report.outcomes.push((size, SizeOutcome::AlreadyPresent));
                }
                // Present thumbnail: the sentinel beside it is stale
                ThumbStatus::Failed if !self.options.force && dir.has_thumb(size) => {
                    if !self.options.dry_run {
                        if let Err(e) = sentinel::mark_ready(&dir, size) {
                            log::warn!("Could not clear {}: {}", dir.fail_path(size).display(), e);
                        }
                    }
                    report.outcomes.push((size, SizeOutcome::AlreadyPresent));
                }
                _ => todo.push(size),
            }
        }

        // All present: no probe, no renderer
        if todo.is_empty() {
            return Some(report);
        }

        let source = match self.prober.probe(media_path, kind) {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Could not get dimensions for {}: {}", media_path.display(), e);
                for size in todo {
                    self.record_failure(&dir, size, e.to_string(), &mut report);
                }
                report.outcomes.sort_by_key(|(s, _)| *s);
                return Some(report);
            }
        };

        for size in todo {
            let target = match plan(source, size, kind) {
                Ok(t) => t,
                Err(e) => {
                    self.record_failure(&dir, size, e.to_string(), &mut report);
                    continue;
                }
            };
            log::debug!("{} {}: {} -> {}", report.file_name(), size, source, target);

            if self.options.dry_run {
                report.outcomes.push((size, SizeOutcome::Planned(target)));
                continue;
            }

            let output = dir.thumb_path(size);
            let request = RenderRequest {
                source: media_path,
                output: &output,
                kind,
                target,
                seek_seconds: self.options.video_seek,
            };

            match self.renderer.render(&request) {
                Ok(()) => {
                    if let Err(e) = sentinel::mark_ready(&dir, size) {
                        log::warn!("Could not clear {}: {}", dir.fail_path(size).display(), e);
                    }
                    report.outcomes.push((size, SizeOutcome::Created));
                }
                Err(e) => {
                    log::warn!("{} thumbnail failed for {}: {}", size, media_path.display(), e);
                    self.record_failure(&dir, size, e.to_string(), &mut report);
                }
            }
        }

        report.outcomes.sort_by_key(|(s, _)| *s);
        Some(report)
    }

    fn record_failure(&self, dir: &ThumbDir, size: ThumbSize, reason: String, report: &mut FileReport) {
        if !self.options.dry_run {
            if let Err(e) = sentinel::mark_failed(dir, size) {
                log::error!("Could not write {}: {}", dir.fail_path(size).display(), e);
            }
        }
        report.outcomes.push((size, SizeOutcome::Failed(reason)));
    }
}
