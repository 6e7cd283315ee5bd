// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Rules
//!
//! The single source of truth for what a contact form submission must look
//! like. The portfolio front-end uses it for inline field errors and the
//! contact relay uses it as the authoritative gate before anything is mailed:
//!
//! - Name: 2-100 characters
//! - Email: 1-255 characters, `local@domain.tld` shape that a mail header
//!   can carry
//! - Subject: 3-200 characters
//! - Message: 10-2000 characters
//!
//! Every field is checked on its own, so a form with several problems
//! reports all of them at once.

pub mod rules;
pub mod submission;

pub use rules::{validate_field, Field, FieldError, ValidationErrors, INVALID_EMAIL};
pub use submission::{ContactForm, ContactSubmission, FormValue, SanitizedSubmission};
