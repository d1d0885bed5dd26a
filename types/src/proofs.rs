//! Proof types for validated caller-supplied text.
//!
//! These types enforce invariants at construction time. Once you hold a value,
//! you know it satisfies all required constraints.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mention::is_mention;

/// Character budget for one kind of caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimit {
    field: &'static str,
    max_chars: usize,
}

impl TextLimit {
    #[must_use]
    pub const fn new(field: &'static str, max_chars: usize) -> Self {
        assert!(max_chars > 0, "TextLimit must allow at least one character");
        Self { field, max_chars }
    }

    #[must_use]
    pub const fn field(self) -> &'static str {
        self.field
    }

    #[must_use]
    pub const fn max_chars(self) -> usize {
        self.max_chars
    }
}

pub const VOTE_TEXT_LIMIT: TextLimit = TextLimit::new("vote", 400);
pub const ACCUSATION_LIMIT: TextLimit = TextLimit::new("accusation", 900);
pub const DEFENSE_LIMIT: TextLimit = TextLimit::new("defense", 900);
pub const ALIAS_LIMIT: TextLimit = TextLimit::new("alias", 100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} is too long ({actual} characters, at most {max} allowed)")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{field} must not be a mention: {value}")]
    Mention { field: &'static str, value: String },
}

/// Non-empty text that fits inside a [`TextLimit`].
///
/// # Invariants
///
/// - Content is never empty after `trim()`
/// - Content has at most `limit.max_chars()` characters (counted as `char`s)
///
/// Serializes as a plain string. Limits are a construction-time concern, so
/// deserialization only re-checks non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedText(String);

impl BoundedText {
    pub fn new(value: impl Into<String>, limit: TextLimit) -> Result<Self, TextError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TextError::Empty {
                field: limit.field(),
            });
        }
        let actual = value.chars().count();
        if actual > limit.max_chars() {
            return Err(TextError::TooLong {
                field: limit.field(),
                max: limit.max_chars(),
                actual,
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for BoundedText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for BoundedText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<BoundedText> for String {
    fn from(value: BoundedText) -> Self {
        value.0
    }
}

/// A display alias: bounded, and never shaped like a platform mention so it
/// cannot shadow another participant's explicit reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias(BoundedText);

impl Alias {
    pub fn new(value: impl Into<String>) -> Result<Self, TextError> {
        let text = BoundedText::new(value, ALIAS_LIMIT)?;
        if is_mention(text.as_str()) {
            return Err(TextError::Mention {
                field: ALIAS_LIMIT.field(),
                value: text.into_inner(),
            });
        }
        Ok(Self(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0.into_inner()
    }
}
