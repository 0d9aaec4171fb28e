//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "приветствие и подсказка")]
    Start,
    #[command(description = "отменить текущий запрос")]
    Cancel,
}

/// Parses `/start`, `/cancel` and their `@botname` forms.
///
/// Mentions of another bot are not ours and yield `None`.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let (name, mention) = match name.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (name, None),
    };

    if let (Some(mention), Some(username)) = (mention, bot_username) {
        if !mention.eq_ignore_ascii_case(username) {
            return None;
        }
    }

    match name.to_lowercase().as_str() {
        "start" => Some(Command::Start),
        "cancel" => Some(Command::Cancel),
        _ => None,
    }
}

/// Creates a Bot instance with custom or default API URL
///
/// # Arguments
/// * `token` - Bot API token
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid BOT_API_URL or HTTP client failure
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
