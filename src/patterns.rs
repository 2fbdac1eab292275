//! Pattern matchers shared by all rules
//!
//! Rules look at raw text, never at a syntax tree. Everything here is total:
//! a missing match is `false` or an empty `Vec`, never an error.

use regex::Regex;

/// File content with a lowercase copy computed once per run
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    raw: &'a str,
    lower: String,
}

impl<'a> SourceText<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Case-sensitive substring test
    pub fn contains(&self, needle: &str) -> bool {
        self.raw.contains(needle)
    }

    /// Case-insensitive substring test
    pub fn contains_ci(&self, needle: &str) -> bool {
        self.lower.contains(&needle.to_lowercase())
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.contains(n))
    }

    pub fn contains_any_ci(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.contains_ci(n))
    }

    /// Needles that do not occur (case-sensitive), in the given order
    pub fn missing<'n>(&self, needles: &[&'n str]) -> Vec<&'n str> {
        needles
            .iter()
            .copied()
            .filter(|n| !self.contains(n))
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.raw.lines().count()
    }

    /// 1-based line number of a byte offset into the raw text
    pub fn line_of(&self, offset: usize) -> u32 {
        let end = offset.min(self.raw.len());
        let prefix = self.raw.get(..end).unwrap_or(self.raw);
        prefix.bytes().filter(|b| *b == b'\n').count() as u32 + 1
    }

    /// Line of the first regex match in the raw text
    pub fn first_match_line(&self, re: &Regex) -> Option<u32> {
        re.find(self.raw).map(|m| self.line_of(m.start()))
    }
}

/// A single matcher over a `SourceText`
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Case-sensitive literal substring
    Literal(&'static str),
    /// Case-insensitive literal substring
    Insensitive(&'static str),
    /// Regular expression over the raw text
    Regex(&'static Regex),
}

impl Pattern {
    pub fn is_match(&self, text: &SourceText<'_>) -> bool {
        match self {
            Pattern::Literal(s) => text.contains(s),
            Pattern::Insensitive(s) => text.contains_ci(s),
            Pattern::Regex(re) => re.is_match(text.raw()),
        }
    }
}

/// True if any pattern matches
pub fn any_match(patterns: &[Pattern], text: &SourceText<'_>) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// All values of capture group `group` across non-overlapping matches
pub fn capture_all<'t>(re: &Regex, text: &'t str, group: usize) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(group).map(|m| m.as_str()))
        .collect()
}

/// Capture group values paired with the byte offset of the captured text
pub fn capture_all_with_offset<'t>(re: &Regex, text: &'t str, group: usize) -> Vec<(&'t str, usize)> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(group).map(|m| (m.as_str(), m.start())))
        .collect()
}

/// Number of non-overlapping matches
pub fn count_matches(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}

/// Compile a pattern built at runtime; a bad pattern simply never matches
pub fn dynamic_regex(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!("Skipping invalid runtime pattern {:?}: {}", pattern, e);
            None
        }
    }
}
