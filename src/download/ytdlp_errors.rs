//! Classification of yt-dlp failures
//!
//! yt-dlp reports everything through stderr text, so failures are sorted
//! by well-known phrases into the two cases the user is told about.

/// Why a retrieval failed, as far as the user is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalFailure {
    /// Sign-in, age verification, private or members-only content
    AccessRestricted,
    /// Everything else: removed video, network trouble, extractor errors
    Unavailable,
}

const ACCESS_RESTRICTED_MARKERS: &[&str] = &[
    "sign in to confirm your age",
    "age-restricted",
    "age restricted",
    "inappropriate for some users",
    "sign in to confirm you're not a bot",
    "sign in to confirm you’re not a bot",
    "please sign in",
    "login required",
    "use --cookies",
    "private video",
    "video is private",
    "members-only",
    "join this channel",
];

/// Sorts yt-dlp stderr into a [`RetrievalFailure`].
pub fn classify_ytdlp_error(stderr: &str) -> RetrievalFailure {
    let stderr_lower = stderr.to_lowercase();

    if ACCESS_RESTRICTED_MARKERS
        .iter()
        .any(|marker| stderr_lower.contains(marker))
    {
        return RetrievalFailure::AccessRestricted;
    }

    RetrievalFailure::Unavailable
}

impl RetrievalFailure {
    /// Message shown to the user in the chat.
    pub fn user_message(&self) -> &'static str {
        match self {
            RetrievalFailure::AccessRestricted => {
                "❌ Видео требует входа в аккаунт или подтверждения возраста.\n\nТакие видео я скачать не могу."
            }
            RetrievalFailure::Unavailable => "❌ Видео недоступно. Проверь ссылку или попробуй позже.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalFailure::AccessRestricted => "access_restricted",
            RetrievalFailure::Unavailable => "unavailable",
        }
    }
}

/// First `ERROR:` line of yt-dlp stderr, or its last non-empty line, for logs.
pub fn summarize_stderr(stderr: &str) -> &str {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("")
}
