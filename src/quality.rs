//! Content quality scoring and the readability bucket.
//!
//! The score is an additive point scale capped at [`MAX_SCORE`]. Every band
//! boundary and award is a named constant so the banding table can be checked
//! value for value.

use crate::models::{PageImage, Readability};

pub const MAX_SCORE: f64 = 100.0;

// Word count bands
pub const IDEAL_WORDS_MIN: usize = 800;
pub const IDEAL_WORDS_MAX: usize = 2500;
pub const ADEQUATE_WORDS_MIN: usize = 500;
pub const THIN_WORDS_BELOW: usize = 300;

pub const IDEAL_WORDS_POINTS: f64 = 25.0;
pub const LONG_WORDS_POINTS: f64 = 20.0;
pub const ADEQUATE_WORDS_POINTS: f64 = 15.0;
pub const SHORT_WORDS_POINTS: f64 = 10.0;

// Images
pub const MANY_IMAGES: usize = 3;
pub const MANY_IMAGES_POINTS: f64 = 20.0;
pub const SOME_IMAGES_POINTS: f64 = 15.0;
pub const ALL_ALT_POINTS: f64 = 10.0;
pub const SOME_ALT_POINTS: f64 = 5.0;

// Headings
pub const MANY_HEADINGS: usize = 3;
pub const MANY_HEADINGS_POINTS: f64 = 15.0;
pub const SOME_HEADINGS_POINTS: f64 = 10.0;

// Structure
pub const MANY_PARAGRAPHS: usize = 5;
pub const SOME_PARAGRAPHS: usize = 3;
pub const MANY_PARAGRAPHS_POINTS: f64 = 10.0;
pub const SOME_PARAGRAPHS_POINTS: f64 = 5.0;
pub const MANY_LISTS: usize = 2;
pub const MANY_LISTS_POINTS: f64 = 10.0;
pub const ONE_LIST_POINTS: f64 = 5.0;

// Internal links
pub const MANY_INTERNAL_LINKS: usize = 3;
pub const MANY_INTERNAL_LINKS_POINTS: f64 = 10.0;
pub const SOME_INTERNAL_LINKS_POINTS: f64 = 5.0;

// Readability
pub const EASY_SENTENCE_LENGTH: f64 = 15.0;
pub const EASY_WORD_LENGTH: f64 = 5.0;
pub const MEDIUM_SENTENCE_LENGTH: f64 = 20.0;
pub const MEDIUM_WORD_LENGTH: f64 = 6.0;

/// Inputs of the quality score, all taken from one parsed page.
#[derive(Debug, Clone, Copy)]
pub struct QualitySignals<'a> {
    pub word_count: usize,
    pub images: &'a [PageImage],
    pub heading_count: usize,
    pub paragraph_count: usize,
    pub list_count: usize,
    pub internal_link_count: usize,
}

pub fn word_count_points(word_count: usize) -> f64 {
    if (IDEAL_WORDS_MIN..=IDEAL_WORDS_MAX).contains(&word_count) {
        IDEAL_WORDS_POINTS
    } else if (ADEQUATE_WORDS_MIN..IDEAL_WORDS_MIN).contains(&word_count) {
        ADEQUATE_WORDS_POINTS
    } else if word_count > IDEAL_WORDS_MAX {
        LONG_WORDS_POINTS
    } else if word_count < THIN_WORDS_BELOW {
        0.0
    } else {
        SHORT_WORDS_POINTS
    }
}

pub fn image_points(images: &[PageImage]) -> f64 {
    if images.is_empty() {
        return 0.0;
    }

    let count_points = if images.len() >= MANY_IMAGES {
        MANY_IMAGES_POINTS
    } else {
        SOME_IMAGES_POINTS
    };

    let with_alt = images.iter().filter(|image| image.has_alt()).count();
    let alt_points = if with_alt == images.len() {
        ALL_ALT_POINTS
    } else if with_alt > 0 {
        SOME_ALT_POINTS
    } else {
        0.0
    };

    count_points + alt_points
}

pub fn heading_points(heading_count: usize) -> f64 {
    match heading_count {
        0 => 0.0,
        n if n >= MANY_HEADINGS => MANY_HEADINGS_POINTS,
        _ => SOME_HEADINGS_POINTS,
    }
}

pub fn structure_points(paragraph_count: usize, list_count: usize) -> f64 {
    let paragraphs = if paragraph_count >= MANY_PARAGRAPHS {
        MANY_PARAGRAPHS_POINTS
    } else if paragraph_count >= SOME_PARAGRAPHS {
        SOME_PARAGRAPHS_POINTS
    } else {
        0.0
    };

    let lists = match list_count {
        0 => 0.0,
        n if n >= MANY_LISTS => MANY_LISTS_POINTS,
        _ => ONE_LIST_POINTS,
    };

    paragraphs + lists
}

pub fn internal_link_points(internal_link_count: usize) -> f64 {
    match internal_link_count {
        0 => 0.0,
        n if n >= MANY_INTERNAL_LINKS => MANY_INTERNAL_LINKS_POINTS,
        _ => SOME_INTERNAL_LINKS_POINTS,
    }
}

/// Bounded 0-100 content quality score.
pub fn quality_score(signals: &QualitySignals<'_>) -> f64 {
    let score = word_count_points(signals.word_count)
        + image_points(signals.images)
        + heading_points(signals.heading_count)
        + structure_points(signals.paragraph_count, signals.list_count)
        + internal_link_points(signals.internal_link_count);

    score.clamp(0.0, MAX_SCORE)
}

/// Buckets text by average sentence length (words per `.!?`-delimited
/// segment) and average word length.
pub fn readability(text: &str) -> Readability {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Readability::Unknown;
    }

    let avg_sentence_length = words.len() as f64 / sentence_segments(text) as f64;
    let avg_word_length =
        words.iter().map(|word| word.chars().count()).sum::<usize>() as f64 / words.len() as f64;

    if avg_sentence_length < EASY_SENTENCE_LENGTH && avg_word_length < EASY_WORD_LENGTH {
        Readability::Easy
    } else if avg_sentence_length < MEDIUM_SENTENCE_LENGTH
        && avg_word_length < MEDIUM_WORD_LENGTH
    {
        Readability::Medium
    } else {
        Readability::Hard
    }
}

/// Number of pieces the text splits into on runs of `.`, `!` or `?`,
/// counting empty leading and trailing pieces.
fn sentence_segments(text: &str) -> usize {
    let mut segments = 1;
    let mut in_delimiter = false;
    for c in text.chars() {
        let is_delimiter = matches!(c, '.' | '!' | '?');
        if is_delimiter && !in_delimiter {
            segments += 1;
        }
        in_delimiter = is_delimiter;
    }
    segments
}
