// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Everything can be set from environment variables; see [`Config::from_env`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest request body the endpoint will read (default: 64 KiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outgoing mail server
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Contact notification settings
    #[serde(default)]
    pub mail: MailConfig,
}

/// Fixed-window rate limiting per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window (default: 3)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// SMTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host (default: smtp.gmail.com)
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP server port; 465 means implicit TLS, anything else STARTTLS
    /// (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Sender address (default: the SMTP username)
    #[serde(default)]
    pub from: Option<String>,

    /// Connection and command timeout in seconds (default: 30)
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where contact notifications go and how they are labelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Recipient of contact notifications (default: the SMTP username)
    #[serde(default)]
    pub contact_email: Option<String>,

    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Shown in the notification header
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_max_requests() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    60
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

fn default_subject_prefix() -> String {
    "Portfolio Contact: ".to_string()
}

fn default_site_name() -> String {
    "Portfolio Website".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            rate_limit: RateLimitConfig::default(),
            smtp: SmtpConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            contact_email: None,
            subject_prefix: default_subject_prefix(),
            site_name: default_site_name(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// - `BIND_ADDR`, `MAX_BODY_BYTES`
    /// - `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_SECS`
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`, `SMTP_FROM`,
    ///   `SMTP_TIMEOUT_SECS`
    /// - `CONTACT_EMAIL`, `CONTACT_SUBJECT_PREFIX`, `CONTACT_SITE_NAME`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset, empty or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| non_empty(lookup(key));

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(default_bind_addr),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES")
                .unwrap_or_else(default_max_body_bytes),
            rate_limit: RateLimitConfig {
                max_requests: parse_var(&lookup, "RATE_LIMIT_MAX")
                    .unwrap_or_else(default_max_requests),
                window_secs: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(default_window_secs),
            },
            smtp: SmtpConfig {
                host: var("SMTP_HOST").unwrap_or_else(default_smtp_host),
                port: parse_var(&lookup, "SMTP_PORT").unwrap_or_else(default_smtp_port),
                username: var("SMTP_USER"),
                password: var("SMTP_PASS"),
                from: var("SMTP_FROM"),
                timeout_secs: parse_var(&lookup, "SMTP_TIMEOUT_SECS")
                    .unwrap_or_else(default_smtp_timeout_secs),
            },
            mail: MailConfig {
                contact_email: var("CONTACT_EMAIL"),
                // An empty prefix is a legitimate choice here
                subject_prefix: lookup("CONTACT_SUBJECT_PREFIX")
                    .unwrap_or_else(default_subject_prefix),
                site_name: var("CONTACT_SITE_NAME").unwrap_or_else(default_site_name),
            },
        }
    }

    /// Address contact notifications are delivered to.
    pub fn contact_recipient(&self) -> Option<&str> {
        self.mail
            .contact_email
            .as_deref()
            .or(self.smtp.username.as_deref())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    non_empty(lookup(key)).and_then(|v| v.trim().parse().ok())
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl SmtpConfig {
    /// Port 465 speaks TLS from the first byte; other ports upgrade with STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sender address for outgoing mail.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}
