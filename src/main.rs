use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use doraboost::core::{config, init_logger, log_tool_configuration};
use doraboost::download::ffmpeg::check_ffmpeg;
use doraboost::download::ytdlp::ytdlp_version;
use doraboost::download::{AdmissionGuard, JobRunner};
use doraboost::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, SessionStore};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation).
/// A missing token is logged and ends the process without an error.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Set up global panic handler so panics in job tasks end up in the log
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH, &config::LOG_LEVEL)?;

    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        log::error!("BOT_TOKEN is not set. Export BOT_TOKEN (or TELOXIDE_TOKEN) and restart.");
        return Ok(());
    }

    run_bot(token).await
}

async fn run_bot(token: &str) -> Result<()> {
    log_tool_configuration();
    check_external_tools().await;

    let bot = create_bot(token)?;

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            let username = me.user.username.clone();
            log::info!("Logged in as @{}", username.as_deref().unwrap_or("?"));
            username
        }
        Err(e) => {
            log::warn!("getMe failed, @mentions of the bot won't be checked: {}", e);
            None
        }
    };

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let sessions = Arc::new(SessionStore::new(AdmissionGuard::new()));
    let runner = Arc::new(JobRunner::from_config());
    let deps = HandlerDeps::new(sessions, runner, bot_username);

    log::info!("Starting long polling");
    Dispatcher::builder(bot, schema(deps))
        .default_handler(|upd| async move {
            log::debug!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher stopped");
    Ok(())
}

/// Logs whether yt-dlp and ffmpeg can be started; jobs fail without them.
async fn check_external_tools() {
    match ytdlp_version(&config::YTDL_BIN).await {
        Some(version) => log::info!("yt-dlp version: {}", version),
        None => log::error!("yt-dlp not runnable at '{}', every download will fail", config::YTDL_BIN.as_str()),
    }

    if check_ffmpeg(&config::FFMPEG_BIN).await {
        log::info!("ffmpeg is available");
    } else {
        log::error!("ffmpeg not runnable at '{}', every job will fail", config::FFMPEG_BIN.as_str());
    }
}
