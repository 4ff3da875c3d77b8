//! Text-based leaf matchers.
//!
//! [`FullText`] compares a whole license text against the header, after
//! reducing both sides to lowercase ASCII letters and digits. Headers arrive
//! one line at a time, so the matcher keeps an accumulation buffer in its
//! scan slot and only starts accumulating once a short probe derived from the
//! first line of the target text has been seen. [`PhraseSet`] is the simple
//! case: any configured literal occurring anywhere in a line matches.

use crate::error::ConfigError;

/// Number of target characters assumed to fit on the first header line when
/// the text has no line break of its own.
const PROBE_LENGTH: usize = 20;

/// Reduce text to its lowercase ASCII letters and digits.
///
/// Comparison assumes US-ASCII content; anything else (punctuation,
/// whitespace, comment decoration) carries no signal for license
/// identification and is dropped.
pub fn prune(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// A full license text target.
#[derive(Debug, Clone)]
pub struct FullText {
    raw: String,
    full: String,
    probe: String,
}

/// Accumulation state for one [`FullText`] node within a scan.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextState {
    pub(crate) buffer: String,
    pub(crate) seen_probe: bool,
    pub(crate) matched: bool,
    pub(crate) line: u64,
}

impl FullText {
    pub fn new(text: &str) -> Result<Self, ConfigError> {
        let full = prune(text);
        if full.is_empty() {
            return Err(ConfigError::InvalidMatcher(
                "full-text matcher requires non-empty text".into(),
            ));
        }
        let first = match text.find('\n') {
            Some(offset) => &text[..offset],
            None => text,
        };
        let mut probe = prune(first);
        probe.truncate(PROBE_LENGTH);
        FullText::from_parts(text.to_string(), full, probe)
    }

    fn from_parts(raw: String, full: String, probe: String) -> Result<Self, ConfigError> {
        if probe.is_empty() {
            return Err(ConfigError::InvalidMatcher(
                "full-text matcher first line carries no letters or digits".into(),
            ));
        }
        Ok(FullText { raw, full, probe })
    }

    /// The original text as configured, for serialization.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Advance the accumulation state by one already-pruned line.
    ///
    /// The buffer starts at the first occurrence of the probe. Once the
    /// buffer is long enough but does not contain the target, the prefix up
    /// to a later probe occurrence is discarded so a false start (a header
    /// quoting the first line without the rest) cannot block a genuine match
    /// further down; with no later occurrence the state rewinds entirely.
    pub(crate) fn step(&self, state: &mut TextState, pruned_line: &str) {
        if state.matched {
            return;
        }
        if state.seen_probe {
            state.buffer.push_str(pruned_line);
        } else {
            match pruned_line.find(&self.probe) {
                Some(offset) => {
                    state.buffer.push_str(&pruned_line[offset..]);
                    state.seen_probe = true;
                }
                None => return,
            }
        }
        if state.buffer.len() >= self.full.len() {
            if state.buffer.contains(&self.full) {
                state.matched = true;
            } else if let Some(offset) = state.buffer[1..].find(&self.probe) {
                state.buffer.drain(..offset + 1);
            } else {
                state.buffer.clear();
                state.seen_probe = false;
            }
        }
    }
}

/// A set of literal phrases; a line containing any of them matches.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    pub fn new(phrases: Vec<String>) -> Result<Self, ConfigError> {
        if phrases.is_empty() || phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidMatcher(
                "phrase matcher requires at least one non-empty phrase".into(),
            ));
        }
        Ok(PhraseSet { phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub(crate) fn check(&self, line: &str) -> bool {
        self.phrases.iter().any(|phrase| line.contains(phrase))
    }
}
