// Single-directory runner - executes the thumbnail job for every media file

use std::path::Path;

use crate::discover::list_media_files;
use crate::error::Result;
use crate::jobs::{FileReport, ThumbJob};

/// Totals across one directory run. Counts are per thumbnail size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub created: usize,
    pub present: usize,
    pub failed: usize,
    pub planned: usize,
}

impl RunSummary {
    fn add(&mut self, report: &FileReport) {
        self.files += 1;
        self.created += report.created();
        self.present += report.present();
        self.failed += report.failed();
        self.planned += report.planned();
    }
}

/// Run `job` over the media files directly inside `directory`, in name order.
/// `on_file` sees each report as soon as the file is done.
pub fn run_directory(
    directory: &Path,
    job: &ThumbJob<'_>,
    mut on_file: impl FnMut(&FileReport),
) -> Result<RunSummary> {
    let files = list_media_files(directory)?;
    let mut summary = RunSummary::default();

    for file in &files {
        if let Some(report) = job.process(file) {
            on_file(&report);
            summary.add(&report);
        }
    }

    Ok(summary)
}
