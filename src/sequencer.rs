use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chapter as the reader sees it, detached from the catalog's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub chapter: Option<String>,
    pub volume: Option<String>,
    pub title: Option<String>,
    pub translated_language: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages: u32,
}

impl Chapter {
    /// Parsed chapter number, `None` when absent or not a finite decimal.
    pub fn number(&self) -> Option<f64> {
        self.chapter.as_deref().and_then(parse_chapter_number)
    }

    fn sort_key(&self) -> f64 {
        self.number().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Index `cursor - 1`: the newer, higher-numbered neighbour.
    Next,
    /// Index `cursor + 1`: the older, lower-numbered neighbour.
    Previous,
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Previous),
            other => anyhow::bail!("unsupported direction: {other} (expected next or previous)"),
        }
    }
}

/// Chapters of one translated language, newest first.
///
/// Ordering is descending by parsed chapter number; chapters without a usable
/// number sort as chapter 0. Equal numbers keep their arrival order. An id
/// appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageGroup {
    language: String,
    chapters: Vec<Chapter>,
}

impl LanguageGroup {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn locate(&self, chapter_id: &str) -> Option<usize> {
        locate_cursor(self, chapter_id)
    }

    pub fn adjacent(&self, cursor: Option<usize>, direction: Direction) -> Option<&Chapter> {
        adjacent(self, cursor, direction)
    }
}

pub fn build_language_group(chapters: &[Chapter], language: &str) -> LanguageGroup {
    let mut seen = HashSet::new();
    let mut group: Vec<Chapter> = chapters
        .iter()
        .filter(|ch| ch.translated_language == language)
        .filter(|ch| seen.insert(ch.id.as_str()))
        .cloned()
        .collect();

    // `sort_by` is stable, which is what keeps ties in arrival order.
    group.sort_by(|a, b| {
        b.sort_key()
            .partial_cmp(&a.sort_key())
            .unwrap_or(Ordering::Equal)
    });

    LanguageGroup {
        language: language.to_owned(),
        chapters: group,
    }
}

pub fn locate_cursor(group: &LanguageGroup, chapter_id: &str) -> Option<usize> {
    group.chapters.iter().position(|ch| ch.id == chapter_id)
}

pub fn adjacent(
    group: &LanguageGroup,
    cursor: Option<usize>,
    direction: Direction,
) -> Option<&Chapter> {
    let cursor = cursor?;
    let target = match direction {
        Direction::Next => cursor.checked_sub(1)?,
        Direction::Previous => cursor.checked_add(1)?,
    };
    group.chapters.get(target)
}

/// Whether moving between the two chapters skips published chapters.
///
/// Only meaningful when both numbers parse; fractional steps such as
/// 5 → 5.5 are not gaps.
pub fn has_gap(current: &Chapter, candidate: &Chapter) -> bool {
    match (current.number(), candidate.number()) {
        (Some(a), Some(b)) => (a - b).abs() > 1.0,
        _ => false,
    }
}

pub fn parse_chapter_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Distinct language codes in the order they first appear.
pub fn available_languages(chapters: &[Chapter]) -> Vec<String> {
    let mut seen = HashSet::new();
    chapters
        .iter()
        .filter(|ch| seen.insert(ch.translated_language.as_str()))
        .map(|ch| ch.translated_language.clone())
        .collect()
}

pub fn preferred_language(languages: &[String]) -> Option<&str> {
    languages
        .iter()
        .find(|lang| lang.as_str() == "en")
        .or_else(|| languages.first())
        .map(String::as_str)
}
