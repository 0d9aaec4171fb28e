//! Conversation decisions, independent of the Bot API
//!
//! Handlers feed incoming text here and render the returned [`TextOutcome`].

use teloxide::types::ChatId;

use crate::core::validation::extract_youtube_url;
use crate::download::admission::ChatSlot;
use crate::download::job::JobRequest;
use crate::download::options::ProcessingOptions;
use crate::telegram::keyboard::parse_choice;
use crate::telegram::session::{ChatBusy, ChatState, SessionStore};

pub const START_MESSAGE: &str = "Привет! Пришли ссылку на YouTube-видео, и я спрошу формат обработки.\n\n\
     Я усилю звук на 10 или 20 dB и верну готовый файл.";
pub const NO_URL_MESSAGE: &str = "❌ Пожалуйста, отправьте корректную ссылку на YouTube.";
pub const BUSY_MESSAGE: &str = "❌ Я уже обрабатываю ваш предыдущий запрос. Пожалуйста, дождитесь результата.";
pub const ASK_FORMAT_MESSAGE: &str = "Выберите, что вы хотите получить:";
pub const CHOICE_EXPECTED_MESSAGE: &str = "Выберите вариант на клавиатуре или отправьте /cancel.";
pub const CANCELLED_MESSAGE: &str = "Отменено.";
pub const CANCELLED_RUNNING_MESSAGE: &str =
    "Отменено. Текущая обработка доработает в фоне, но новую ссылку можно отправить уже сейчас.";

/// What to do with a plain text message.
#[derive(Debug)]
pub enum TextOutcome {
    /// No YouTube link; nothing changed
    NoUrl,
    /// Chat already has a job; nothing changed
    Busy,
    /// Link stored, show the format keyboard
    AskFormat,
    /// Waiting for a choice and the text is neither a choice nor a link
    ChoiceExpected,
    /// Choice made: run this job while holding the slot
    Start(JobRequest, ChatSlot),
}

/// Decides what a text message means for the chat's current state.
pub fn on_text(sessions: &SessionStore, chat_id: ChatId, text: &str) -> TextOutcome {
    match sessions.state(chat_id) {
        ChatState::AwaitingChoice => {
            let Some((kind, gain)) = parse_choice(text) else {
                // the chat already holds its slot for the pending link
                if extract_youtube_url(text).is_some() {
                    log::info!("Chat {} is waiting for a choice, rejecting new link", chat_id.0);
                    return TextOutcome::Busy;
                }
                return TextOutcome::ChoiceExpected;
            };
            // /cancel may have raced us between the state check and here
            let Some(pending) = sessions.take(chat_id) else {
                return TextOutcome::NoUrl;
            };
            let (url, slot) = pending.into_parts();
            let request = JobRequest {
                chat_id,
                url,
                options: ProcessingOptions::new(kind, gain),
            };
            TextOutcome::Start(request, slot)
        }
        ChatState::Running | ChatState::Idle => {
            let Some(url) = extract_youtube_url(text) else {
                return TextOutcome::NoUrl;
            };
            match sessions.begin(chat_id, url.to_string()) {
                Ok(()) => {
                    log::info!("Chat {} sent {}", chat_id.0, url);
                    TextOutcome::AskFormat
                }
                Err(ChatBusy) => {
                    log::info!("Chat {} is busy, rejecting {}", chat_id.0, url);
                    TextOutcome::Busy
                }
            }
        }
    }
}
