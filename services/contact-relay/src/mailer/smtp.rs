// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SMTP delivery through lettre.

use super::{parse_mailbox, DispatchError, MailTransport, OutgoingEmail};
use crate::config::SmtpConfig;
use anyhow::{anyhow, Context};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

/// Authenticated SMTP relay.
///
/// Without credentials the mailer still constructs, so the HTTP service can
/// come up, but every delivery fails with
/// [`DispatchError::MissingCredentials`] before touching the network.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Option<String>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let sender = config.sender().map(str::to_owned);

        let (Some(username), Some(password)) = (&config.username, &config.password) else {
            warn!(
                smtp_host = %config.host,
                "SMTP credentials not configured, contact submissions will fail"
            );
            return Ok(Self {
                transport: None,
                sender,
            });
        };

        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .with_context(|| format!("Invalid SMTP relay host {}", config.host))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .timeout(Some(config.timeout()))
            .build();

        info!(
            smtp_host = %config.host,
            smtp_port = config.port,
            implicit_tls = config.implicit_tls(),
            "SMTP transport initialized"
        );

        Ok(Self {
            transport: Some(transport),
            sender,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Open a connection and check the server greets us.
    pub async fn ping(&self) -> Result<(), DispatchError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(DispatchError::MissingCredentials)?;

        transport
            .test_connection()
            .await
            .context("SMTP connection test failed")?
            .then_some(())
            .ok_or_else(|| anyhow!("SMTP server refused the connection test").into())
    }
}

impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: OutgoingEmail) -> Result<(), DispatchError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(DispatchError::MissingCredentials)?;
        let sender = self
            .sender
            .as_deref()
            .ok_or(DispatchError::MissingCredentials)?;

        let message = email.into_message(parse_mailbox(sender)?)?;

        let response = transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        if !response.is_positive() {
            return Err(anyhow!("SMTP server answered {}", response.code()).into());
        }

        Ok(())
    }
}
