// Dimension probing via external tools
//
// Photos: identify -> heif-info -> ffprobe -> ffmpeg -i
// Videos: ffprobe -> ffmpeg -i
// The first tool reporting a positive width and height wins. Synology's bundled
// ffmpeg is often built with --disable-ffprobe, hence the stderr fallback.
// Sizes are reported as displayed: EXIF orientation and video rotation
// side data swap width and height for quarter turns, matching what
// `convert -auto-orient` and ffmpeg's autorotate actually render.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::constants::PROBE_TIMEOUT_SECS;
use crate::error::{Result, ThumbError};
use crate::metadata::{Dimensions, MediaKind};
use crate::tools;

/// Source of natural width/height for a media file.
pub trait Prober {
    fn probe(&self, path: &Path, kind: MediaKind) -> Result<Dimensions>;
}

/// Prober backed by ImageMagick, libheif and ffmpeg command-line tools.
#[derive(Debug, Clone)]
pub struct ExternalProber {
    timeout: Duration,
}

impl Default for ExternalProber {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
        }
    }
}

type ProbeStep = fn(&ExternalProber, &Path) -> Result<Option<Dimensions>>;

const PHOTO_STEPS: &[(&str, ProbeStep)] = &[
    ("identify", ExternalProber::with_identify),
    ("heif-info", ExternalProber::with_heif_info),
    ("ffprobe", ExternalProber::with_ffprobe),
    ("ffmpeg", ExternalProber::with_ffmpeg),
];

const VIDEO_STEPS: &[(&str, ProbeStep)] = &[
    ("ffprobe", ExternalProber::with_ffprobe),
    ("ffmpeg", ExternalProber::with_ffmpeg),
];

impl Prober for ExternalProber {
    fn probe(&self, path: &Path, kind: MediaKind) -> Result<Dimensions> {
        let steps = match kind {
            MediaKind::Photo => PHOTO_STEPS,
            MediaKind::Video => VIDEO_STEPS,
            MediaKind::Unsupported => {
                return Err(ThumbError::Probe(format!(
                    "unsupported media type: {}",
                    path.display()
                )))
            }
        };

        for (name, step) in steps {
            match step(self, path) {
                Ok(Some(dims)) => {
                    log::debug!("  {} reports {} for {}", name, dims, path.display());
                    return Ok(dims);
                }
                Ok(None) => log::debug!("  {} could not size {}", name, path.display()),
                Err(e) => log::debug!("  {} failed on {}: {}", name, path.display(), e),
            }
        }

        Err(ThumbError::Probe(format!(
            "could not determine dimensions for {}",
            path.display()
        )))
    }
}

impl ExternalProber {
    fn run(&self, cmd: &mut Command) -> Result<Option<String>> {
        let output = tools::run_with_timeout(cmd, self.timeout)?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
    }

    fn with_identify(&self, path: &Path) -> Result<Option<Dimensions>> {
        let mut cmd = Command::new(tools::identify_path());
        cmd.args(["-format", "%w,%h,%[orientation]\n"]).arg(path);
        Ok(self.run(&mut cmd)?.as_deref().and_then(parse_identify_output))
    }

    fn with_heif_info(&self, path: &Path) -> Result<Option<Dimensions>> {
        let mut cmd = Command::new(tools::heif_info_path());
        cmd.arg(path);
        Ok(self.run(&mut cmd)?.as_deref().and_then(parse_heif_info_output))
    }

    fn with_ffprobe(&self, path: &Path) -> Result<Option<Dimensions>> {
        let mut cmd = Command::new(tools::ffprobe_path());
        cmd.args([
            "-v", "quiet",
            "-print_format", "json",
            "-select_streams", "v:0",
            "-show_streams",
        ])
        .arg(path);

        match self.run(&mut cmd)? {
            Some(stdout) => parse_ffprobe_json(&stdout),
            None => Ok(None),
        }
    }

    fn with_ffmpeg(&self, path: &Path) -> Result<Option<Dimensions>> {
        // ffmpeg -i without an output exits non-zero; the stream summary is on stderr
        let mut cmd = Command::new(tools::ffmpeg_path());
        cmd.arg("-hide_banner").arg("-i").arg(path);
        let output = tools::run_with_timeout(&mut cmd, self.timeout)?;

        let mut text = String::from_utf8_lossy(&output.stderr).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(parse_ffmpeg_stream_info(&text))
    }
}

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    tags: Option<FFprobeTags>,
    side_data_list: Option<Vec<FFprobeSideData>>,
}

#[derive(Debug, Deserialize)]
struct FFprobeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeSideData {
    rotation: Option<f64>,
}

impl FFprobeStream {
    /// Display rotation in degrees: side data first, then the legacy `rotate` tag.
    fn rotation(&self) -> f64 {
        self.side_data_list
            .iter()
            .flatten()
            .find_map(|d| d.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|t| t.rotate.as_deref())
                    .and_then(|r| r.trim().parse().ok())
            })
            .unwrap_or(0.0)
    }
}

/// Rotations of 90 or 270 degrees (either sign) display the frame transposed.
fn is_quarter_turn(degrees: f64) -> bool {
    let angle = degrees.round().rem_euclid(180.0);
    angle > 45.0 && angle < 135.0
}

/// EXIF orientations 5-8, as ImageMagick names them.
fn is_transposing_orientation(orientation: &str) -> bool {
    matches!(
        orientation.trim(),
        "LeftTop" | "RightTop" | "RightBottom" | "LeftBottom" | "5" | "6" | "7" | "8"
    )
}

/// Parse `identify -format "%w,%h,%[orientation]\n"` output. Multi-frame files
/// print one line per frame.
fn parse_identify_output(stdout: &str) -> Option<Dimensions> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut fields = line.split(',');
    let w = fields.next()?.trim().parse().ok()?;
    let h = fields.next()?.trim().parse().ok()?;
    let dims = positive(w, h)?;
    match fields.next() {
        Some(orientation) if is_transposing_orientation(orientation) => Some(dims.transposed()),
        _ => Some(dims),
    }
}

/// Parse heif-info's "image: 4032x3024 (id=1), primary" style lines.
fn parse_heif_info_output(stdout: &str) -> Option<Dimensions> {
    let size_re = Regex::new(r"(\d+)\s*x\s*(\d+)").ok()?;
    stdout
        .lines()
        .filter(|l| {
            let lower = l.to_lowercase();
            lower.contains("image:") || lower.contains("size:")
        })
        .find_map(|l| {
            let caps = size_re.captures(l)?;
            positive(caps[1].parse().ok()?, caps[2].parse().ok()?)
        })
}

fn parse_ffprobe_json(stdout: &str) -> Result<Option<Dimensions>> {
    let probe_output: FFprobeOutput = serde_json::from_str(stdout)?;

    Ok(probe_output
        .streams
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .find_map(|s| {
            let dims = positive(s.width?, s.height?)?;
            Some(if is_quarter_turn(s.rotation()) { dims.transposed() } else { dims })
        }))
}

/// Parse the first "Stream #0:0: Video: h264 ..., 1920x1080 ..." line, plus the
/// "displaymatrix: rotation of -90.00 degrees" side data printed beneath it.
fn parse_ffmpeg_stream_info(text: &str) -> Option<Dimensions> {
    let size_re = Regex::new(r"(\d{2,})\s*x\s*(\d{2,})").ok()?;
    let rotation_re = Regex::new(r"rotation of (-?\d+(?:\.\d+)?) degrees").ok()?;

    let mut lines = text.lines().skip_while(|l| !(l.contains("Video:") || l.contains("video:")));
    let line = lines.next()?;
    let caps = size_re.captures(line)?;
    let dims = positive(caps[1].parse().ok()?, caps[2].parse().ok()?)?;

    // Side data belongs to this stream until the next "Stream #" line
    let rotation = lines
        .take_while(|l| !l.contains("Stream #"))
        .find_map(|l| rotation_re.captures(l)?[1].parse::<f64>().ok())
        .unwrap_or(0.0);
    Some(if is_quarter_turn(rotation) { dims.transposed() } else { dims })
}

fn positive(width: u32, height: u32) -> Option<Dimensions> {
    (width > 0 && height > 0).then(|| Dimensions::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identify() {
        assert_eq!(parse_identify_output("4032,3024"), Some(Dimensions::new(4032, 3024)));
        assert_eq!(
            parse_identify_output("500,400\n500,400\n"),
            Some(Dimensions::new(500, 400))
        );
        assert_eq!(parse_identify_output("0,400"), None);
        assert_eq!(parse_identify_output("garbage"), None);
        assert_eq!(parse_identify_output(""), None);
    }

    #[test]
    fn test_parse_identify_applies_orientation() {
        // Portrait phone shot stored landscape with Orientation=6
        assert_eq!(
            parse_identify_output("4032,3024,RightTop\n"),
            Some(Dimensions::new(3024, 4032))
        );
        assert_eq!(
            parse_identify_output("4032,3024,LeftBottom\n"),
            Some(Dimensions::new(3024, 4032))
        );
        assert_eq!(
            parse_identify_output("4032,3024,TopLeft\n"),
            Some(Dimensions::new(4032, 3024))
        );
        assert_eq!(
            parse_identify_output("4032,3024,BottomRight\n"),
            Some(Dimensions::new(4032, 3024))
        );
        assert_eq!(
            parse_identify_output("4032,3024,Undefined\n"),
            Some(Dimensions::new(4032, 3024))
        );
    }

    #[test]
    fn test_oriented_probe_keeps_xl_short_edge() {
        use crate::thumbs::plan::plan;
        use crate::thumbs::ThumbSize;

        let dims = parse_identify_output("4032,3024,RightTop\n").unwrap();
        let xl = plan(dims, ThumbSize::Xl, MediaKind::Photo).unwrap();
        assert_eq!(xl, Dimensions::new(1280, 1707));
        assert_eq!(xl.short_edge(), 1280);
    }

    #[test]
    fn test_parse_heif_info() {
        let out = "MIME type: image/heic\nmain brand: heic\nimage: 4032x3024 (id=49), primary\n";
        assert_eq!(parse_heif_info_output(out), Some(Dimensions::new(4032, 3024)));
        assert_eq!(parse_heif_info_output("MIME type: image/heic\n"), None);
    }

    #[test]
    fn test_parse_ffprobe_json() {
        let json = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080}]}"#;
        assert_eq!(parse_ffprobe_json(json).unwrap(), Some(Dimensions::new(1920, 1080)));

        let audio_only = r#"{"streams":[{"codec_type":"audio"}]}"#;
        assert_eq!(parse_ffprobe_json(audio_only).unwrap(), None);

        assert_eq!(parse_ffprobe_json("{}").unwrap(), None);
        assert!(parse_ffprobe_json("not json").is_err());
    }

    #[test]
    fn test_parse_ffprobe_json_applies_rotation() {
        let side_data = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,
            "side_data_list":[{"side_data_type":"Display Matrix","rotation":-90}]}]}"#;
        assert_eq!(parse_ffprobe_json(side_data).unwrap(), Some(Dimensions::new(1080, 1920)));

        let tag = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,
            "tags":{"rotate":"270"}}]}"#;
        assert_eq!(parse_ffprobe_json(tag).unwrap(), Some(Dimensions::new(1080, 1920)));

        let upside_down = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,
            "side_data_list":[{"rotation":180}]}]}"#;
        assert_eq!(parse_ffprobe_json(upside_down).unwrap(), Some(Dimensions::new(1920, 1080)));
    }

    #[test]
    fn test_parse_ffmpeg_stream_info() {
        let stderr = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'CLIP_0002.MOV':\n  \
            Duration: 00:00:05.00, start: 0.000000, bitrate: 15000 kb/s\n  \
            Stream #0:0[0x1](und): Video: hevc (Main) (hvc1 / 0x31637668), yuv420p(tv), 1920x1080, 14000 kb/s, 30 fps\n  \
            Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 44100 Hz, stereo\n";
        assert_eq!(parse_ffmpeg_stream_info(stderr), Some(Dimensions::new(1920, 1080)));
        assert_eq!(parse_ffmpeg_stream_info("No such file or directory"), None);
    }

    #[test]
    fn test_parse_ffmpeg_stream_info_applies_rotation() {
        let stderr = "  Stream #0:0[0x1](und): Video: hevc (Main), yuv420p(tv), 1920x1080, 30 fps\n    \
            Side data:\n      \
            displaymatrix: rotation of -90.00 degrees\n  \
            Stream #0:1[0x2](und): Audio: aac (LC), 44100 Hz, stereo\n";
        assert_eq!(parse_ffmpeg_stream_info(stderr), Some(Dimensions::new(1080, 1920)));

        // Rotation on a later stream does not apply to the video stream
        let other = "  Stream #0:0: Video: h264, yuv420p, 1920x1080\n  \
            Stream #0:1: Video: mjpeg, 320x240\n    \
            displaymatrix: rotation of 90.00 degrees\n";
        assert_eq!(parse_ffmpeg_stream_info(other), Some(Dimensions::new(1920, 1080)));
    }

    #[test]
    fn test_quarter_turns() {
        assert!(is_quarter_turn(90.0));
        assert!(is_quarter_turn(-90.0));
        assert!(is_quarter_turn(270.0));
        assert!(is_quarter_turn(-270.0));
        assert!(!is_quarter_turn(0.0));
        assert!(!is_quarter_turn(180.0));
        assert!(!is_quarter_turn(-180.0));
    }

    #[test]
    fn test_unsupported_kind_is_probe_error() {
        let prober = ExternalProber::default();
        let err = prober
            .probe(Path::new("notes.txt"), MediaKind::Unsupported)
            .unwrap_err();
        assert!(matches!(err, ThumbError::Probe(_)));
    }
}
