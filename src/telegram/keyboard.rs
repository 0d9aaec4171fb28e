//! Reply keyboard for the format/gain choice

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::download::options::{Gain, OutputKind};

/// Buttons offered to the user, row by row.
const CHOICES: [(&str, OutputKind, Gain); 4] = [
    ("🎵 Аудио +10 dB", OutputKind::Audio, Gain::Db10),
    ("🎵 Аудио +20 dB", OutputKind::Audio, Gain::Db20),
    ("🎬 Аудио + Видео +10 dB", OutputKind::AudioVideo, Gain::Db10),
    ("🎬 Аудио + Видео +20 dB", OutputKind::AudioVideo, Gain::Db20),
];

/// Older two-button labels; they keep the fixed 20 dB boost.
const LEGACY_CHOICES: [(&str, OutputKind); 2] = [("Аудио только", OutputKind::Audio), ("Аудио + Видео", OutputKind::AudioVideo)];

/// Maps a button label back to the choice it stands for.
pub fn parse_choice(text: &str) -> Option<(OutputKind, Gain)> {
    let text = text.trim();
    CHOICES
        .iter()
        .find(|(label, _, _)| *label == text)
        .map(|(_, kind, gain)| (*kind, *gain))
        .or_else(|| {
            LEGACY_CHOICES
                .iter()
                .find(|(label, _)| *label == text)
                .map(|(_, kind)| (*kind, Gain::default()))
        })
}

/// Label of the button for a choice.
pub fn choice_label(kind: OutputKind, gain: Gain) -> &'static str {
    CHOICES
        .iter()
        .find(|(_, k, g)| *k == kind && *g == gain)
        .map(|(label, _, _)| *label)
        .unwrap_or("")
}

/// One-time keyboard with a row per output kind.
pub fn format_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(CHOICES[0].0), KeyboardButton::new(CHOICES[1].0)],
        vec![KeyboardButton::new(CHOICES[2].0), KeyboardButton::new(CHOICES[3].0)],
    ])
    .resize_keyboard()
    .one_time_keyboard()
}
