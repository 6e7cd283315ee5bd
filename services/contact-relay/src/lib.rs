// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Library
//!
//! Accepts contact form submissions over HTTP, throttles them per client,
//! validates and sanitizes the fields with [`contact_form`], and relays each
//! accepted submission to the site owner as an HTML email.

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;

pub use config::Config;
pub use error::ApiError;
pub use handlers::{router, AppState};
pub use limiter::{RateLimitResult, RateLimiter, SweepTask};
pub use mailer::{DispatchError, EmailDispatcher, MailTransport, OutgoingEmail, SmtpMailer};
