//! Doraboost - Telegram bot that returns YouTube media with boosted audio
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, process and URL helpers
//! - `download`: admission control, yt-dlp/ffmpeg steps and the job runner
//! - `telegram`: conversation state, dispatcher schema and Bot API glue

pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{AdmissionGuard, JobRunner};
pub use telegram::{schema, HandlerDeps, SessionStore};
