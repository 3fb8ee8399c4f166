// Thumbnail rendering via external tools
//
// Videos: one frame via ffmpeg at the requested seek offset.
// Photos: ImageMagick convert (auto-orient) when installed, else ffmpeg.
// Output is written to a temp file and renamed, so a failed or interrupted
// render never replaces an existing thumbnail.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::constants::{PHOTO_THUMB_QUALITY, VIDEO_THUMB_QSCALE};
use crate::error::{Result, ThumbError};
use crate::metadata::{Dimensions, MediaKind};
use crate::tools;

/// One thumbnail to produce.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub kind: MediaKind,
    pub target: Dimensions,
    /// Frame offset for videos, ignored for photos
    pub seek_seconds: f64,
}

/// Produces a thumbnail file. On `Ok`, `request.output` exists and is non-empty.
pub trait Renderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<()>;
}

/// Photo backend chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoEngine {
    ImageMagick(PathBuf),
    Ffmpeg,
}

#[derive(Debug, Clone)]
pub struct ExternalRenderer {
    ffmpeg: PathBuf,
    photo_engine: PhotoEngine,
    timeout: Duration,
}

impl ExternalRenderer {
    /// Resolve tools. A missing ffmpeg is a setup error.
    pub fn detect(timeout: Duration) -> Result<Self> {
        let ffmpeg = tools::ffmpeg_path();
        if !tools::is_tool_available(&ffmpeg) {
            return Err(ThumbError::ToolNotFound(format!(
                "ffmpeg is required (tried: {})",
                ffmpeg.display()
            )));
        }

        let convert = tools::convert_path();
        let photo_engine = if tools::is_tool_available(&convert) {
            PhotoEngine::ImageMagick(convert)
        } else {
            log::info!("ImageMagick convert not found, photos will be rendered with ffmpeg");
            PhotoEngine::Ffmpeg
        };

        Ok(Self {
            ffmpeg,
            photo_engine,
            timeout,
        })
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn photo_engine(&self) -> &PhotoEngine {
        &self.photo_engine
    }

    fn build_command(&self, request: &RenderRequest<'_>, tmp_path: &Path) -> Result<Command> {
        let cmd = match (request.kind, &self.photo_engine) {
            (MediaKind::Video, _) => ffmpeg_frame_command(
                &self.ffmpeg,
                request.source,
                tmp_path,
                request.target,
                Some(request.seek_seconds),
            ),
            (MediaKind::Photo, PhotoEngine::ImageMagick(convert)) => {
                convert_command(convert, request.source, tmp_path, request.target)
            }
            (MediaKind::Photo, PhotoEngine::Ffmpeg) => ffmpeg_frame_command(
                &self.ffmpeg,
                request.source,
                tmp_path,
                request.target,
                None,
            ),
            (MediaKind::Unsupported, _) => {
                return Err(ThumbError::Render(format!(
                    "unsupported media type: {}",
                    request.source.display()
                )))
            }
        };
        Ok(cmd)
    }
}

impl Renderer for ExternalRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        if let Some(parent) = request.output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Temp file for atomic write; keeps the .jpg suffix so tools pick JPEG
        let tmp_path = request.output.with_extension("tmp.jpg");
        let mut cmd = self.build_command(request, &tmp_path)?;

        let output = match tools::run_with_timeout(&mut cmd, self.timeout) {
            Ok(output) => output,
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(e);
            }
        };

        if !output.status.success() {
            let _ = std::fs::remove_file(&tmp_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbError::Render(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let size = std::fs::metadata(&tmp_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(ThumbError::Render("thumbnail file is empty or missing".to_string()));
        }

        // Atomic rename
        std::fs::rename(&tmp_path, request.output)?;

        Ok(())
    }
}

fn ffmpeg_frame_command(
    ffmpeg: &Path,
    source: &Path,
    output: &Path,
    target: Dimensions,
    seek_seconds: Option<f64>,
) -> Command {
    let scale_filter = format!(
        "scale={}:{}:force_original_aspect_ratio=decrease",
        target.width, target.height
    );

    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
    if let Some(seek) = seek_seconds {
        cmd.args(["-ss", &format_seek(seek)]); // Seek before input (faster)
    }
    cmd.arg("-i")
        .arg(source)
        .args(["-frames:v", "1", "-update", "1"])
        .args(["-vf", &scale_filter])
        .args(["-q:v", &VIDEO_THUMB_QSCALE.to_string()])
        .arg(output);
    cmd
}

fn convert_command(convert: &Path, source: &Path, output: &Path, target: Dimensions) -> Command {
    // [0] selects the first frame of animated GIFs and multi-page TIFFs
    let mut input = OsString::from(source.as_os_str());
    input.push("[0]");

    let mut cmd = Command::new(convert);
    cmd.arg(input)
        .arg("-auto-orient")
        .args(["-thumbnail", &format!("{}x{}", target.width, target.height)])
        .args(["-quality", &PHOTO_THUMB_QUALITY.to_string()])
        .arg(output);
    cmd
}

/// Format seconds as HH:MM:SS.mmm for ffmpeg.
fn format_seek(seconds: f64) -> String {
    // Split whole milliseconds so the seconds field never rounds up to 60
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis % 1000)
}
