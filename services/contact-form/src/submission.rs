// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form submissions: raw, validated, sanitized.

use crate::rules::{validate_field, Field, FieldError, ValidationErrors};
use serde::{Deserialize, Serialize};

/// One field value as sent. Anything that is not a JSON string is kept so
/// it can be reported against its own field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Other(serde_json::Value),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Other(_) => None,
        }
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// A contact form exactly as the client sent it.
///
/// Fields are optional and loosely typed so that a missing or mistyped
/// field is reported as a field error instead of failing the whole body.
/// `null` counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: Option<FormValue>,
    pub email: Option<FormValue>,
    pub subject: Option<FormValue>,
    pub message: Option<FormValue>,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(FormValue::Text(name.into())),
            email: Some(FormValue::Text(email.into())),
            subject: Some(FormValue::Text(subject.into())),
            message: Some(FormValue::Text(message.into())),
        }
    }

    pub fn raw(&self, field: Field) -> Option<&FormValue> {
        match field {
            Field::Name => self.name.as_ref(),
            Field::Email => self.email.as_ref(),
            Field::Subject => self.subject.as_ref(),
            Field::Message => self.message.as_ref(),
        }
    }

    /// The text of `field`, if it was sent as a string.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.raw(field).and_then(FormValue::as_text)
    }

    /// Run every field rule and collect all failures.
    pub fn validate(&self) -> Result<ContactSubmission, ValidationErrors> {
        let errors: Vec<_> = Field::ALL
            .into_iter()
            .filter_map(|field| match self.raw(field) {
                Some(FormValue::Other(_)) => Some(FieldError::not_a_string(field)),
                value => validate_field(field, value.and_then(FormValue::as_text)),
            })
            .collect();

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        let text = |field| self.value(field).unwrap_or_default().to_owned();
        Ok(ContactSubmission {
            name: text(Field::Name),
            email: text(Field::Email),
            subject: text(Field::Subject),
            message: text(Field::Message),
        })
    }
}

/// A submission that passed every rule. Only [`ContactForm::validate`]
/// produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trim whitespace, strip `<` and `>`, lower-case the email.
    pub fn sanitize(self) -> SanitizedSubmission {
        SanitizedSubmission {
            name: Field::Name.normalize(&self.name),
            email: Field::Email.normalize(&self.email),
            subject: Field::Subject.normalize(&self.subject),
            message: Field::Message.normalize(&self.message),
        }
    }
}

/// A validated submission that is safe to embed in outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedSubmission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl SanitizedSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
