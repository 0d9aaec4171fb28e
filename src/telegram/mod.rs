//! Telegram bot integration and handlers

pub mod bot;
pub mod flow;
pub mod handlers;
pub mod keyboard;
pub mod session;
pub mod sink;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use session::{ChatState, SessionStore};
pub use sink::TelegramSink;
