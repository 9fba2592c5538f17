//! Sectioned `.mis` text parser. Keeps every content line verbatim; only comments and blank lines are lost.

mod section;

pub use section::Section;

use crate::config::MAX_MISSION_FILE_BYTES;
use std::collections::HashMap;
use std::str::FromStr;

/// How to treat lines that start with `[` but are not a well-formed `[name]` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Anything not matching the exact header pattern is content (legacy behavior).
    #[default]
    Lenient,
    /// Reject malformed or empty headers.
    Strict,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("invalid integer for {key}: {value:?}")]
    InvalidInteger { key: String, value: String },
    #[error("invalid number for {key}: {value:?}")]
    InvalidFloat { key: String, value: String },
    #[error("malformed section header on line {line_no}: {line:?}")]
    MalformedHeader { line_no: usize, line: String },
    #[error("input exceeds maximum size ({max} bytes)")]
    InputTooLarge { max: usize },
}

/// Ordered arena of sections, addressable by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionStore {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse in [`ParseMode::Lenient`].
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Self::parse_with(text, ParseMode::Lenient)
    }

    pub fn parse_with(text: &str, mode: ParseMode) -> Result<Self, FormatError> {
        if text.len() > MAX_MISSION_FILE_BYTES {
            return Err(FormatError::InputTooLarge {
                max: MAX_MISSION_FILE_BYTES,
            });
        }
        let mut store = SectionStore::new();
        let mut current: Option<usize> = None;
        let mut orphans = 0usize;
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(name) = header_name(line) {
                if mode == ParseMode::Strict
                    && (name.is_empty() || name.contains(['[', ']']))
                {
                    return Err(FormatError::MalformedHeader {
                        line_no: i + 1,
                        line: line.to_string(),
                    });
                }
                current = Some(store.ensure_section(name));
                continue;
            }
            if mode == ParseMode::Strict && line.starts_with('[') {
                return Err(FormatError::MalformedHeader {
                    line_no: i + 1,
                    line: line.to_string(),
                });
            }
            match current {
                Some(idx) => store.sections[idx].lines.push(line.to_string()),
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            tracing::debug!("dropped {} line(s) before the first section header", orphans);
        }
        Ok(store)
    }

    /// Emit every section as `[name]` followed by its lines, in first-insertion order.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for s in &self.sections {
            out.push('[');
            out.push_str(&s.name);
            out.push_str("]\n");
            for line in &s.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.section(name).map(|s| s.lines.as_slice())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&i| &self.sections[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Replace the first line matching `pred`. Returns false when nothing matched.
    pub fn set_line(
        &mut self,
        name: &str,
        pred: impl Fn(&str) -> bool,
        new_line: impl Into<String>,
    ) -> bool {
        let Some(s) = self.section_mut(name) else {
            return false;
        };
        match s.position(pred) {
            Some(i) => {
                s.lines[i] = new_line.into();
                true
            }
            None => false,
        }
    }

    /// Replace the last line matching `pred`. Returns false when nothing matched.
    pub fn set_last_line(
        &mut self,
        name: &str,
        pred: impl Fn(&str) -> bool,
        new_line: impl Into<String>,
    ) -> bool {
        let Some(s) = self.section_mut(name) else {
            return false;
        };
        match s.rposition(pred) {
            Some(i) => {
                s.lines[i] = new_line.into();
                true
            }
            None => false,
        }
    }

    /// Append a line, creating the section at the end of the store if needed.
    pub fn push_line(&mut self, name: &str, line: impl Into<String>) {
        let idx = self.ensure_section(name);
        self.sections[idx].lines.push(line.into());
    }

    /// Drop every line matching `pred`. Returns the number removed.
    pub fn remove_lines(&mut self, name: &str, pred: impl Fn(&str) -> bool) -> usize {
        let Some(s) = self.section_mut(name) else {
            return 0;
        };
        let before = s.lines.len();
        s.lines.retain(|l| !pred(l));
        before - s.lines.len()
    }

    /// Overwrite all lines of a section, creating it if needed.
    pub fn replace_section(&mut self, name: &str, lines: Vec<String>) {
        let idx = self.ensure_section(name);
        self.sections[idx].lines = lines;
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        let idx = *self.index.get(name)?;
        self.sections.get_mut(idx)
    }

    fn ensure_section(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.sections.len();
        self.sections.push(Section::new(name));
        self.index.insert(name.to_string(), i);
        i
    }
}

/// `[name]` -> `Some("name")` (trimmed). Anything else is content.
fn header_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Split `Key value...` on the first whitespace run. `None` when there is no value.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (key, value) = line.split_once(char::is_whitespace)?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// First whitespace-delimited token of a line.
pub fn line_key(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// Strict base-10 integer.
pub fn parse_int(key: &str, value: &str) -> Result<i32, FormatError> {
    i32::from_str(value.trim()).map_err(|_| FormatError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Locale-invariant decimal or scientific notation. Non-finite values are rejected.
pub fn parse_float(key: &str, value: &str) -> Result<f64, FormatError> {
    match f64::from_str(value.trim()) {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FormatError::InvalidFloat {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[MAIN]\nMAP Smolensk/load.ini\nTIME 12.0\nCloudType 1\n[Wing]\nr0100\n[r0100]\nPlanes 4\n";

    #[test]
    fn round_trip_is_exact_for_canonical_text() {
        let store = SectionStore::parse(SAMPLE).unwrap();
        assert_eq!(store.serialize(), SAMPLE);
        let again = SectionStore::parse(&store.serialize()).unwrap();
        assert_eq!(again, store);
    }

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let text = "; header comment\n[MAIN]\n\n  ; indented comment\nMAP x\n\n";
        let store = SectionStore::parse(text).unwrap();
        assert_eq!(store.serialize(), "[MAIN]\nMAP x\n");
    }

    #[test]
    fn lines_before_first_header_are_dropped() {
        let store = SectionStore::parse("orphan\n[MAIN]\nMAP x\n").unwrap();
        assert_eq!(store.get("MAIN").unwrap(), ["MAP x"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reopened_section_appends() {
        let store = SectionStore::parse("[A]\n1\n[B]\n2\n[A]\n3\n").unwrap();
        assert_eq!(store.get("A").unwrap(), ["1", "3"]);
        assert_eq!(store.section_names().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(store.serialize(), "[A]\n1\n3\n[B]\n2\n");
    }

    #[test]
    fn crlf_and_padding_are_normalized() {
        let store = SectionStore::parse("  [ MAIN ]  \r\n  MAP x  \r\n").unwrap();
        assert_eq!(store.get("MAIN").unwrap(), ["MAP x"]);
    }

    #[test]
    fn section_names_are_case_sensitive() {
        let store = SectionStore::parse("[Wing]\na\n[WING]\nb\n").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn lenient_mode_keeps_malformed_header_as_content() {
        let store = SectionStore::parse("[MAIN]\n[incomplete\nMAP x\n").unwrap();
        assert_eq!(store.get("MAIN").unwrap(), ["[incomplete", "MAP x"]);
        assert!(!store.contains("incomplete"));
    }

    #[test]
    fn strict_mode_rejects_malformed_header() {
        let err = SectionStore::parse_with("[MAIN]\n[incomplete\n", ParseMode::Strict).unwrap_err();
        assert_eq!(
            err,
            FormatError::MalformedHeader {
                line_no: 2,
                line: "[incomplete".to_string()
            }
        );
        assert!(SectionStore::parse_with("[]\n", ParseMode::Strict).is_err());
        assert!(SectionStore::parse_with("[A]]\n", ParseMode::Strict).is_err());
        assert!(SectionStore::parse_with("[[MAIN]]\n", ParseMode::Strict).is_err());
        assert!(SectionStore::parse_with("[MAIN]\nMAP x\n", ParseMode::Strict).is_ok());
    }

    #[test]
    fn set_line_replaces_first_match_only() {
        let mut store = SectionStore::parse("[A]\nk 1\nk 2\n").unwrap();
        assert!(store.set_line("A", |l| line_key(l) == "k", "k 9"));
        assert_eq!(store.get("A").unwrap(), ["k 9", "k 2"]);
        assert!(store.set_last_line("A", |l| line_key(l) == "k", "k 7"));
        assert_eq!(store.get("A").unwrap(), ["k 9", "k 7"]);
    }

    #[test]
    fn set_line_is_noop_without_match_or_section() {
        let mut store = SectionStore::parse("[A]\nk 1\n").unwrap();
        assert!(!store.set_line("A", |l| l.starts_with("z"), "z"));
        assert!(!store.set_line("B", |_| true, "z"));
        assert_eq!(store.serialize(), "[A]\nk 1\n");
    }

    #[test]
    fn push_remove_and_replace() {
        let mut store = SectionStore::new();
        store.push_line("A", "x 1");
        store.push_line("A", "y 2");
        assert_eq!(store.remove_lines("A", |l| l.starts_with('x')), 1);
        store.replace_section("B", vec!["z".to_string()]);
        assert_eq!(store.serialize(), "[A]\ny 2\n[B]\nz\n");
    }

    #[test]
    fn split_key_value_on_first_whitespace_run() {
        assert_eq!(split_key_value("MAP  Smolensk/load.ini"), Some(("MAP", "Smolensk/load.ini")));
        assert_eq!(split_key_value("weapons\tdefault 2"), Some(("weapons", "default 2")));
        assert_eq!(split_key_value("Lonely"), None);
    }

    #[test]
    fn numeric_parsing() {
        assert_eq!(parse_int("Gust", "8"), Ok(8));
        assert!(parse_int("Gust", "8.0").is_err());
        assert_eq!(parse_float("TIME", "1.25e1"), Ok(12.5));
        assert_eq!(parse_float("TIME", "12"), Ok(12.0));
        assert_eq!(
            parse_float("CloudHeight", "abc"),
            Err(FormatError::InvalidFloat {
                key: "CloudHeight".to_string(),
                value: "abc".to_string()
            })
        );
        assert!(parse_float("x", "1,5").is_err());
        assert!(parse_float("x", "NaN").is_err());
    }

    #[test]
    fn oversized_input_is_rejected() {
        let big = "a".repeat(MAX_MISSION_FILE_BYTES + 1);
        assert!(matches!(
            SectionStore::parse(&big),
            Err(FormatError::InputTooLarge { .. })
        ));
    }
}
