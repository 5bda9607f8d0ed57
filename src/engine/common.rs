//! Common utilities for rule evaluation
//!
//! Shared functionality used by the evaluator and resolver.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::{Result, SveError};

/// Escape sequences like `\s` or `\b`, or an identifier
static OPTION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\.|([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// The full text of one service's configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigText {
    text: String,
}

impl ConfigText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a config file fully; the handle is closed before returning
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SveError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `(line_number, line)` pairs, 1-based
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text.lines().enumerate().map(|(i, line)| (i + 1, line))
    }
}

/// Line numbers on which `regex` matches
pub fn matching_lines(regex: &Regex, text: &ConfigText) -> Vec<usize> {
    text.lines()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(n, _)| n)
        .collect()
}

/// Extract the bare option name from a pattern
pub fn option_name(pattern: &str) -> Option<&str> {
    OPTION_TOKEN
        .captures_iter(pattern)
        .find_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}
