// syno-thumbs constants
// File names and sizes must match what Synology Photos reads. Do not change them.

// Media extensions (lowercase, compared case-insensitively)
pub const PHOTO_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg", "png", "heic", "gif", "bmp", "tiff", "tif"
];

pub const VIDEO_EXTENSIONS: [&str; 7] = [
    "mov", "mp4", "avi", "mkv", "m4v", "webm", "wmv"
];

// Paths
pub const EA_DIR_NAME: &str = "@eaDir";
pub const THUMB_PREFIX: &str = "SYNOPHOTO_THUMB_";
pub const THUMB_EXTENSION: &str = "jpg";
pub const FAIL_EXTENSION: &str = "fail";

// Photo thumbnail targets
pub const PHOTO_SM_LONG_EDGE: u32 = 320;   // 4032x3024 -> 320x240
pub const PHOTO_M_SHORT_EDGE: u32 = 320;   // 4032x3024 -> 427x320
pub const PHOTO_XL_SHORT_EDGE: u32 = 1280; // 4032x3024 -> 1707x1280

// Video thumbnail targets (XL keeps the source resolution)
pub const VIDEO_SM_LONG_EDGE: u32 = 427;   // 1920x1080 -> 427x240
pub const VIDEO_M_LONG_EDGE: u32 = 640;    // 1920x1080 -> 640x360

// Encoder quality. FFmpeg mjpeg qscale is 2-31 where 2 is best
pub const VIDEO_THUMB_QSCALE: u32 = 3;
pub const PHOTO_THUMB_QUALITY: u32 = 85;

// Subprocess timeouts
pub const RENDER_TIMEOUT_SECS: u64 = 60;
pub const PROBE_TIMEOUT_SECS: u64 = 30;
pub const VERSION_CHECK_TIMEOUT_SECS: u64 = 5;
pub const WAIT_POLL_INTERVAL_MS: u64 = 25;

// Synology ffmpeg7 package (full codec support, HEVC etc.)
pub const SYNO_FFMPEG7_BIN: &str = "/var/packages/ffmpeg7/target/bin/ffmpeg";
pub const SYNO_FFPROBE7_BIN: &str = "/var/packages/ffmpeg7/target/bin/ffprobe";

// Name of the single-directory tool the tree driver spawns
pub const THUMB_TOOL_NAME: &str = "syno-thumbs";
