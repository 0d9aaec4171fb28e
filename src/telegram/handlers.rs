//! Dispatcher schema and message handlers

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{KeyboardRemove, Message};

use crate::download::job::JobRunner;
use crate::telegram::bot::{parse_command, Command};
use crate::telegram::flow::{self, TextOutcome};
use crate::telegram::keyboard::{choice_label, format_keyboard};
use crate::telegram::session::{CancelOutcome, SessionStore};
use crate::telegram::sink::TelegramSink;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub sessions: Arc<SessionStore>,
    pub runner: Arc<JobRunner>,
    pub bot_username: Option<String>,
}

impl HandlerDeps {
    pub fn new(sessions: Arc<SessionStore>, runner: Arc<JobRunner>, bot_username: Option<String>) -> Self {
        Self {
            sessions,
            runner,
            bot_username,
        }
    }
}

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; any other text message goes through the
/// conversation flow.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let username = deps.bot_username.clone();
    Update::filter_message()
        .filter_map(move |msg: Message| msg.text().and_then(|text| parse_command(text, username.as_deref())))
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                match cmd {
                    Command::Start => handle_start(&bot, &msg).await,
                    Command::Cancel => handle_cancel(&bot, &msg, &deps.sessions).await,
                }
            }
        })
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| !text.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_text(&bot, &msg, &deps).await }
        })
}

/// `/start`: static greeting.
pub async fn handle_start(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, flow::START_MESSAGE).await?;
    Ok(())
}

/// `/cancel`: drops a pending choice or frees a running job's slot.
pub async fn handle_cancel(bot: &Bot, msg: &Message, sessions: &SessionStore) -> Result<(), HandlerError> {
    let text = match sessions.cancel(msg.chat.id) {
        CancelOutcome::RunningReleased => flow::CANCELLED_RUNNING_MESSAGE,
        CancelOutcome::ChoiceDropped | CancelOutcome::NothingToCancel => flow::CANCELLED_MESSAGE,
    };
    bot.send_message(msg.chat.id, text)
        .reply_markup(KeyboardRemove::new())
        .await?;
    Ok(())
}

/// Any non-command text: a link, a format choice, or noise.
pub async fn handle_text(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    match flow::on_text(&deps.sessions, chat_id, text) {
        TextOutcome::NoUrl => {
            bot.send_message(chat_id, flow::NO_URL_MESSAGE).await?;
        }
        TextOutcome::Busy => {
            bot.send_message(chat_id, flow::BUSY_MESSAGE).await?;
        }
        TextOutcome::AskFormat => {
            if let Err(e) = bot
                .send_message(chat_id, flow::ASK_FORMAT_MESSAGE)
                .reply_markup(format_keyboard())
                .await
            {
                // the user never saw the keyboard; don't leave the chat stuck
                deps.sessions.cancel(chat_id);
                return Err(e.into());
            }
        }
        TextOutcome::ChoiceExpected => {
            bot.send_message(chat_id, flow::CHOICE_EXPECTED_MESSAGE)
                .reply_markup(format_keyboard())
                .await?;
        }
        TextOutcome::Start(request, slot) => {
            let label = choice_label(request.options.kind, request.options.gain);
            if let Err(e) = bot
                .send_message(chat_id, format!("✅ {}", label))
                .reply_markup(KeyboardRemove::new())
                .await
            {
                log::warn!("Failed to acknowledge choice in chat {}: {}", chat_id.0, e);
            }

            // Dispatcher handles one update per chat at a time; run the job
            // off the handler so /cancel still gets through.
            let runner = Arc::clone(&deps.runner);
            let sink = TelegramSink::new(bot.clone());
            tokio::spawn(async move {
                if let Err(e) = runner.run(request, slot, &sink).await {
                    log::debug!("Job task finished with error: {}", e);
                }
            });
        }
    }

    Ok(())
}
