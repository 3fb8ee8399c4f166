// External tool resolver and runner for ffmpeg/ffprobe/ImageMagick/heif-info
//
// Resolution order:
// 1) Environment variable override (SYNOTHUMBS_FFMPEG_PATH, etc.)
// 2) Synology ffmpeg7 package (ffmpeg/ffprobe only)
// 3) Sidecar next to the executable, or in its bin/ subdirectory
// 4) PATH fallback

use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{
    SYNO_FFMPEG7_BIN, SYNO_FFPROBE7_BIN, THUMB_TOOL_NAME, VERSION_CHECK_TIMEOUT_SECS,
    WAIT_POLL_INTERVAL_MS,
};
use crate::error::{Result, ThumbError};

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resolve a tool path. `preferred` is checked after the env override.
fn resolve_tool(env_key: &str, preferred: Option<&str>, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
    }

    if let Some(p) = preferred.map(Path::new) {
        if p.is_file() {
            return p.to_path_buf();
        }
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    PathBuf::from(default_name)
}

/// Get path to ffmpeg binary
pub fn ffmpeg_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_FFMPEG_PATH", Some(SYNO_FFMPEG7_BIN), "ffmpeg")
}

/// Get path to ffprobe binary
pub fn ffprobe_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_FFPROBE_PATH", Some(SYNO_FFPROBE7_BIN), "ffprobe")
}

/// Get path to ImageMagick convert
pub fn convert_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_CONVERT_PATH", None, "convert")
}

/// Get path to ImageMagick identify
pub fn identify_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_IDENTIFY_PATH", None, "identify")
}

/// Get path to libheif's heif-info
pub fn heif_info_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_HEIF_INFO_PATH", None, "heif-info")
}

/// Get path to the single-directory thumbnail tool (used by the tree driver)
pub fn thumb_tool_path() -> PathBuf {
    resolve_tool("SYNOTHUMBS_TOOL_PATH", None, THUMB_TOOL_NAME)
}

/// Check whether a tool answers `-version` successfully
pub fn is_tool_available(path: &Path) -> bool {
    let mut cmd = Command::new(path);
    cmd.arg("-version");
    run_with_timeout(&mut cmd, Duration::from_secs(VERSION_CHECK_TIMEOUT_SECS))
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a command to completion, killing it once `timeout` elapses.
///
/// stdout and stderr are drained on helper threads so a chatty child
/// can never block on a full pipe while we poll.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output> {
    let program = cmd.get_program().to_string_lossy().to_string();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ThumbError::ToolNotFound(program.clone()),
        _ => ThumbError::Io(e),
    })?;

    let stdout = child.stdout.take().map(|s| thread::spawn(move || drain(s)));
    let stderr = child.stderr.take().map(|s| thread::spawn(move || drain(s)));

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ThumbError::Timeout {
                tool: program,
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS));
    };

    Ok(Output {
        status,
        stdout: stdout.map(|h| h.join().unwrap_or_default()).unwrap_or_default(),
        stderr: stderr.map(|h| h.join().unwrap_or_default()).unwrap_or_default(),
    })
}

fn drain(mut reader: impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf);
    buf
}
