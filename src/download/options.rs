//! Processing options chosen by the user and the tool arguments derived from them

use std::fmt;

use crate::core::config;

/// What the user gets back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// mp3 track only
    Audio,
    /// mp4 with the boosted audio stream
    AudioVideo,
}

impl OutputKind {
    /// Extension of the file produced by both the retrieval and the gain step.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Audio => "mp3",
            OutputKind::AudioVideo => "mp4",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Audio => "audio",
            OutputKind::AudioVideo => "audio+video",
        }
    }
}

/// Gain boost in decibels.
///
/// Applied as a flat `volume` filter, not loudness normalisation: loud sources clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gain {
    Db10,
    #[default]
    Db20,
}

impl Gain {
    pub fn db(&self) -> u8 {
        match self {
            Gain::Db10 => 10,
            Gain::Db20 => 20,
        }
    }

    /// ffmpeg audio filter expression, e.g. `volume=20dB`.
    pub fn filter(&self) -> String {
        format!("volume={}dB", self.db())
    }
}

/// Everything the job runner needs to know about the user's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub kind: OutputKind,
    pub gain: Gain,
    /// Height cap for the video selector; ignored for audio.
    pub max_height: u32,
}

impl ProcessingOptions {
    pub fn new(kind: OutputKind, gain: Gain) -> Self {
        Self {
            kind,
            gain,
            max_height: *config::VIDEO_MAX_HEIGHT,
        }
    }

    pub fn with_max_height(mut self, max_height: u32) -> Self {
        self.max_height = max_height;
        self
    }

    /// yt-dlp `-f` selector.
    pub fn format_selector(&self) -> String {
        match self.kind {
            OutputKind::Audio => "bestaudio".to_string(),
            OutputKind::AudioVideo => format!(
                "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
                h = self.max_height
            ),
        }
    }

    /// yt-dlp arguments that shape the downloaded container.
    pub fn ytdlp_postprocess_args(&self) -> Vec<String> {
        match self.kind {
            OutputKind::Audio => vec![
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
                "--audio-quality".to_string(),
                config::media::AUDIO_QUALITY.to_string(),
            ],
            OutputKind::AudioVideo => vec!["--merge-output-format".to_string(), "mp4".to_string()],
        }
    }

    /// ffmpeg codec arguments placed between the filter and the output path.
    pub fn ffmpeg_codec_args(&self) -> Vec<String> {
        match self.kind {
            // default mp3 encoder for the container
            OutputKind::Audio => Vec::new(),
            OutputKind::AudioVideo => vec![
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                config::media::AUDIO_BITRATE.to_string(),
            ],
        }
    }

    /// File name of the boosted output for a given media id.
    pub fn output_file_name(&self, media_id: &str) -> String {
        format!("boosted_{}.{}", media_id, self.kind.extension())
    }
}

impl fmt::Display for ProcessingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} +{}dB", self.kind.as_str(), self.gain.db())?;
        if self.kind == OutputKind::AudioVideo {
            write!(f, " ≤{}p", self.max_height)?;
        }
        Ok(())
    }
}
