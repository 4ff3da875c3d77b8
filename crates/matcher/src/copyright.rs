//! Copyright statement matcher.
//!
//! Matches a typical copyright header line: a copyright token (`(C)`, `©`,
//! or the word itself, any case), then optionally a year or year range and
//! an owner, in either order. Example lines matched with owner `FooBar`:
//!
//! ```text
//! * Copyright 2010 FooBar. *
//! * Copyright 2010-2012 FooBar. *
//! *copyright 2012 foobar*
//! ```
//!
//! The owner is appended to a pattern, so it may itself contain pattern
//! syntax and must be escaped where a literal is meant, e.g.
//! `FooBar \(www\.foobar\.com\)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

static COPYRIGHT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(c\)|©|\bcopyright\b").unwrap());

/// A compiled copyright matcher.
#[derive(Debug, Clone)]
pub struct CopyrightPattern {
    start: Option<String>,
    end: Option<String>,
    owner: Option<String>,
    date: Option<Regex>,
    owner_pattern: Option<Regex>,
}

impl CopyrightPattern {
    /// Compile a matcher from its optional parts.
    ///
    /// `start`/`end` are year fragments (`end` requires `start`); `owner` is
    /// a pattern fragment matched case-insensitively. With no parts at all
    /// the bare copyright token matches.
    pub fn new(
        start: Option<&str>,
        end: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if end.is_some() && start.is_none() {
            return Err(ConfigError::InvalidMatcher(
                "copyright matcher has an end year without a start year".into(),
            ));
        }
        let date = match (start, end) {
            (Some(start), Some(end)) => Some(compile(&format!(r"\b{start}\s?-\s?{end}\b"))?),
            (Some(start), None) => Some(compile(&format!(r"\b{start}\b"))?),
            (None, _) => None,
        };
        let owner_pattern = match owner {
            Some(owner) => Some(compile(&format!("(?i){owner}"))?),
            None => None,
        };
        Ok(CopyrightPattern {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            owner: owner.map(str::to_string),
            date,
            owner_pattern,
        })
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether this line completes the copyright statement.
    pub(crate) fn check(&self, line: &str) -> bool {
        let Some(token) = COPYRIGHT_TOKEN.find(line) else {
            return false;
        };
        let rest = line[token.end()..].trim_start();
        match (&self.date, &self.owner_pattern) {
            (None, None) => true,
            (Some(date), None) => starts_with(date, rest).is_some(),
            (None, Some(owner)) => starts_with(owner, rest).is_some(),
            (Some(date), Some(owner)) => {
                // "date owner" or "owner date", whichever the header uses.
                if let Some(after) = starts_with(date, rest) {
                    starts_with(owner, after.trim_start()).is_some()
                } else if let Some(after) = starts_with(owner, rest) {
                    starts_with(date, after.trim_start()).is_some()
                } else {
                    false
                }
            }
        }
    }
}

/// Match `pattern` at the very start of `text`, returning the remainder.
fn starts_with<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .find(text)
        .filter(|found| found.start() == 0)
        .map(|found| &text[found.end()..])
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}
