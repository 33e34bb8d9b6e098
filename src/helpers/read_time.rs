//! Reading-time estimation

use super::html::strip_html;
use crate::config::{ReadTimeConfig, ReadTimeMode};
use crate::content::ContentSection;

const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Concatenated text of every section with markup removed
pub fn section_text(sections: &[ContentSection]) -> String {
    let mut text = String::new();
    for section in sections {
        text.push_str(&strip_html(&section.heading));
        text.push_str(&strip_html(&section.body));
    }
    text
}

/// Size of the text in the configured counting unit
pub fn text_units(text: &str, mode: ReadTimeMode) -> usize {
    match mode {
        // Published pages show this figure: the text with single spaces removed,
        // measured in characters. It approximates, not equals, a word count.
        ReadTimeMode::Parity => text.split(' ').map(|part| part.chars().count()).sum(),
        ReadTimeMode::Words => text.split_whitespace().count(),
    }
}

/// Estimated reading time in whole minutes, rounded up
pub fn estimate_minutes(sections: &[ContentSection], config: &ReadTimeConfig) -> u32 {
    let per_minute = match config.words_per_minute {
        0 => DEFAULT_WORDS_PER_MINUTE,
        n => n,
    } as usize;

    let units = text_units(&section_text(sections), config.mode);
    units.div_ceil(per_minute) as u32
}
