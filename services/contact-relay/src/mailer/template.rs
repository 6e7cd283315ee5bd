// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML body of the contact notification.
//!
//! Rendered by askama with HTML escaping on every interpolation, so text
//! from the submitter can never become markup in the delivered mail.

use askama::Template;
use chrono::{DateTime, Utc};
use contact_form::SanitizedSubmission;

#[derive(Debug, Template)]
#[template(path = "contact_email.html")]
pub struct ContactEmailTemplate<'a> {
    pub site_name: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub sent_at: String,
}

impl<'a> ContactEmailTemplate<'a> {
    pub fn new(
        submission: &'a SanitizedSubmission,
        site_name: &'a str,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            site_name,
            name: submission.name(),
            email: submission.email(),
            subject: submission.subject(),
            message: submission.message(),
            sent_at: format_timestamp(sent_at),
        }
    }
}

/// `Thursday, October 15, 2026 at 03:04 PM UTC`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d, %Y at %I:%M %p UTC").to_string()
}
