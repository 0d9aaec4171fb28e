//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - External tool configuration logging

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Parses a level name, falling back to `Info` for anything unrecognised.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `level` - Level name from configuration (e.g. "info", "debug")
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already installed
pub fn init_logger(log_file_path: &str, level: &str) -> Result<()> {
    let level = parse_level(level);
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which external tools and directories the bot is going to use.
pub fn log_tool_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🔧 External tools");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp: {}", config::YTDL_BIN.as_str());
    log::info!("ffmpeg: {}", config::FFMPEG_BIN.as_str());
    log::info!("workspaces under: {}", config::TEMP_FILES_DIR.display());
    log::info!("video height cap: {}p", *config::VIDEO_MAX_HEIGHT);

    match config::YTDL_MIRROR_HOST.as_deref() {
        Some(host) => log::info!("mirror fallback: {} (one retry per failed download)", host),
        None => log::info!("mirror fallback: disabled"),
    }

    if let Some(url) = config::BOT_API_URL.as_deref() {
        log::info!("Bot API server: {}", url);
    }
    log::info!(
        "upload limit: {} MB",
        config::media::upload_limit(config::BOT_API_URL.is_some()) / (1024 * 1024)
    );
}
