// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Field rules for contact form submissions.
//!
//! Lengths are counted in characters on the normalised value, which is the
//! exact text that survives sanitization. Measuring the normalised value
//! means sanitizing a valid field can never push it out of bounds.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// `local@domain.tld` as a mail header accepts it: a dot-atom local part and
/// at least two hostname labels of up to 63 characters.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$",
    ))
    .unwrap()
});

pub const INVALID_EMAIL: &str = "Please enter a valid email address";

/// A contact form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Wire name, as used in JSON bodies and error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        }
    }

    /// Minimum length in characters.
    pub fn min_len(self) -> usize {
        match self {
            Self::Name => 2,
            Self::Email => 1,
            Self::Subject => 3,
            Self::Message => 10,
        }
    }

    /// Maximum length in characters.
    pub fn max_len(self) -> usize {
        match self {
            Self::Name => 100,
            Self::Email => 255,
            Self::Subject => 200,
            Self::Message => 2000,
        }
    }

    /// Normalise a raw value the way sanitization will.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Self::Email => raw.trim().to_lowercase(),
            _ => strip_angle_brackets(raw).trim().to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_angle_brackets(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// The value was present but not a JSON string.
    pub fn not_a_string(field: Field) -> Self {
        Self::new(field, format!("{} must be a string", field.label()))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Validation failed")]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The error reported for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Check one field in isolation.
///
/// `None` as the value means the field was absent from the submission.
/// Returns at most one error: the first rule the value breaks.
pub fn validate_field(field: Field, value: Option<&str>) -> Option<FieldError> {
    let label = field.label();

    let normalized = match value {
        Some(raw) => field.normalize(raw),
        None => return Some(FieldError::new(field, format!("{label} is required"))),
    };
    let len = normalized.chars().count();

    if len == 0 {
        return Some(FieldError::new(field, format!("{label} is required")));
    }

    if len < field.min_len() {
        return Some(FieldError::new(
            field,
            format!("{label} must be at least {} characters", field.min_len()),
        ));
    }

    if len > field.max_len() {
        return Some(FieldError::new(
            field,
            format!("{label} must be less than {} characters", field.max_len()),
        ));
    }

    if field == Field::Email && !EMAIL_REGEX.is_match(&normalized) {
        return Some(FieldError::new(field, INVALID_EMAIL));
    }

    None
}
