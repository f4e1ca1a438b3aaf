//! Estimated reading time of a post

use super::post::Section;
use super::rich_text::RichTextRenderer;

/// Reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Minutes shown while a post has no body to measure
pub const DEFAULT_MINUTES: u32 = 4;

/// Reading-time estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    words_per_minute: u32,
    default_minutes: u32,
}

impl Default for ReadingTime {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            default_minutes: DEFAULT_MINUTES,
        }
    }
}

impl ReadingTime {
    /// A zero reading speed falls back to the default speed
    pub fn new(words_per_minute: u32, default_minutes: u32) -> Self {
        Self {
            words_per_minute: if words_per_minute == 0 {
                DEFAULT_WORDS_PER_MINUTE
            } else {
                words_per_minute
            },
            default_minutes,
        }
    }

    /// Estimate whole minutes to read `sections`.
    ///
    /// Missing or empty sections give the default. Otherwise the result is
    /// `round(words / words_per_minute) + 1`, so it is never below one.
    pub fn estimate<R>(&self, sections: Option<&[Section]>, renderer: &R) -> u32
    where
        R: RichTextRenderer + ?Sized,
    {
        let sections = match sections {
            Some(sections) if !sections.is_empty() => sections,
            _ => return self.default_minutes,
        };

        let words: usize = sections
            .iter()
            .map(|section| count_words(&renderer.to_plain_text(&section.body)))
            .sum();

        (words as f64 / self.words_per_minute as f64).round() as u32 + 1
    }
}

/// Estimate with the default speed and fallback
pub fn estimate<R>(sections: Option<&[Section]>, renderer: &R) -> u32
where
    R: RichTextRenderer + ?Sized,
{
    ReadingTime::default().estimate(sections, renderer)
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
