//! Section splitter — guesses CV headings from ALL-CAPS lines and groups the lines below them.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Label for text that appears before the first detected heading.
pub const OTHER_SECTION: &str = "Other";

const MAX_HEADING_WORDS: usize = 4;
const MIN_HEADING_CHARS: usize = 3;

/// Ordered heading → body mapping. Keys keep the position of their first appearance;
/// every stored body is trimmed and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn get(&self, heading: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, body)| body.as_str())
    }

    pub fn contains(&self, heading: &str) -> bool {
        self.get(heading).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, b)| (h.as_str(), b.as_str()))
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (heading, body) in &self.entries {
            map.serialize_entry(heading, body)?;
        }
        map.end()
    }
}

/// A line starts a new section when its trimmed form:
/// - is longer than two characters
/// - has at most four whitespace-separated words
/// - contains an upper-case letter and no lower-case letter
///
/// Lines without letters ("----", "2019 2021") are never headings.
pub fn is_heading(trimmed: &str) -> bool {
    trimmed.chars().count() >= MIN_HEADING_CHARS
        && trimmed.split_whitespace().count() <= MAX_HEADING_WORDS
        && trimmed.chars().any(char::is_uppercase)
        && !trimmed.chars().any(char::is_lowercase)
}

/// Splits extracted CV text into sections keyed by heading.
///
/// Text before the first heading goes under [`OTHER_SECTION`]. A heading seen twice
/// starts over: only the body after its last occurrence survives. Headings with no body
/// are dropped. If nothing survives but the input has content, the whole trimmed input is
/// returned under [`OTHER_SECTION`].
pub fn split_sections(text: &str) -> SectionMap {
    let mut acc: Vec<(String, String)> = vec![(OTHER_SECTION.to_string(), String::new())];
    let mut current = 0usize;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_heading(trimmed) {
            current = match acc.iter().position(|(h, _)| h == trimmed) {
                Some(idx) => {
                    acc[idx].1.clear();
                    idx
                }
                None => {
                    acc.push((trimmed.to_string(), String::new()));
                    acc.len() - 1
                }
            };
        } else {
            let body = &mut acc[current].1;
            body.push_str(trimmed);
            body.push('\n');
        }
    }

    let entries: Vec<(String, String)> = acc
        .into_iter()
        .filter_map(|(heading, body)| {
            let body = body.trim();
            (!body.is_empty()).then(|| (heading, body.to_string()))
        })
        .collect();

    if entries.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            return SectionMap {
                entries: vec![(OTHER_SECTION.to_string(), whole.to_string())],
            };
        }
    }
    SectionMap { entries }
}
