//! Configuration for the bot
//!
//! Every value is read once from the environment on first access.

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
/// Empty when neither is set; `main` refuses to start in that case
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Custom Bot API server URL (local telegram-bot-api)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok().filter(|s| !s.is_empty()));

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Cached ffmpeg binary path
/// Read once at startup from FFMPEG_BIN environment variable or defaults to "ffmpeg"
pub static FFMPEG_BIN: Lazy<String> = Lazy::new(|| env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()));

/// Root directory for per-job workspaces
/// Read from TEMP_FILES_DIR environment variable, defaults to the system temp dir
pub static TEMP_FILES_DIR: Lazy<PathBuf> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: doraboost.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "doraboost.log".to_string()));

/// Log level name (error, warn, info, debug, trace)
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Alternate host tried once when a YouTube retrieval fails (e.g. an Invidious instance)
/// Read from YTDL_MIRROR_HOST environment variable
/// Unset by default: no fallback is attempted
pub static YTDL_MIRROR_HOST: Lazy<Option<String>> =
    Lazy::new(|| env::var("YTDL_MIRROR_HOST").ok().filter(|s| !s.trim().is_empty()));

/// Maximum video height requested from yt-dlp for audio+video jobs
/// Read from VIDEO_MAX_HEIGHT environment variable
/// Default: 240
pub static VIDEO_MAX_HEIGHT: Lazy<u32> = Lazy::new(|| {
    env::var("VIDEO_MAX_HEIGHT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(media::DEFAULT_VIDEO_MAX_HEIGHT)
});

/// Media processing constants
pub mod media {
    /// Bitrate yt-dlp uses when extracting the mp3 track
    pub const AUDIO_QUALITY: &str = "192K";

    /// AAC bitrate ffmpeg uses when re-encoding the audio stream of a video
    pub const AUDIO_BITRATE: &str = "192k";

    /// Default cap for the video height selector
    pub const DEFAULT_VIDEO_MAX_HEIGHT: u32 = 240;

    /// Upload limit of the public Bot API (50 MB)
    pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

    /// Upload limit of a self-hosted telegram-bot-api server (2000 MB)
    pub const LOCAL_API_MAX_UPLOAD_BYTES: u64 = 2000 * 1024 * 1024;

    /// Upload limit for the configured Bot API endpoint.
    pub fn upload_limit(custom_api_url: bool) -> u64 {
        if custom_api_url {
            LOCAL_API_MAX_UPLOAD_BYTES
        } else {
            MAX_UPLOAD_BYTES
        }
    }

    /// Prefix of job workspace directories
    pub const WORKSPACE_PREFIX: &str = "doraboost-";
}

/// Network configuration
pub mod network {
    use std::time::Duration;

    /// Request timeout for Bot API requests (in seconds)
    /// Uploads of boosted videos can take a while on slow links
    pub const REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
