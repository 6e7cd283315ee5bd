// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact notification email.
//!
//! [`EmailDispatcher`] turns a sanitized submission into an HTML email and
//! hands it to a [`MailTransport`]. Delivery is attempted once; retrying is
//! the caller's business.

pub mod smtp;
pub mod template;

use crate::config::MailConfig;
use askama::Template;
use chrono::Utc;
use contact_form::SanitizedSubmission;
use lettre::address::AddressError;
use lettre::message::{header, Mailbox};
use lettre::Message;
use std::future::Future;
use thiserror::Error;
use tracing::info;

pub use smtp::SmtpMailer;
pub use template::ContactEmailTemplate;

/// Why a contact notification could not be sent.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("SMTP credentials are not configured")]
    MissingCredentials,

    #[error("No contact address configured (set CONTACT_EMAIL or SMTP_USER)")]
    MissingRecipient,

    #[error("Invalid mailbox {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Submitter address {address:?} cannot be used as Reply-To: {source}")]
    ReplyTo {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Failed to render email template: {0}")]
    Template(#[from] askama::Error),

    #[error("Failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Body format of an [`OutgoingEmail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

/// A fully addressed email, minus the sender which belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
}

impl OutgoingEmail {
    /// Build the wire message sent from `from`.
    pub fn into_message(self, from: Mailbox) -> Result<Message, DispatchError> {
        let mut builder = Message::builder()
            .from(from)
            .to(self.recipient)
            .subject(self.subject);

        if let Some(reply_to) = self.reply_to {
            builder = builder.reply_to(reply_to);
        }

        builder
            .header(match self.content_type {
                ContentType::Text => header::ContentType::TEXT_PLAIN,
                ContentType::Html => header::ContentType::TEXT_HTML,
            })
            .body(self.body)
            .map_err(Into::into)
    }
}

/// Something that can put an email on the wire.
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync + 'static {
    fn deliver(
        &self,
        email: OutgoingEmail,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .parse()
        .map_err(|source| DispatchError::Address {
            address: address.to_owned(),
            source,
        })
}

/// Renders contact notifications and sends them through `T`.
#[derive(Debug, Clone)]
pub struct EmailDispatcher<T> {
    transport: T,
    recipient: Mailbox,
    subject_prefix: String,
    site_name: String,
}

impl<T: MailTransport> EmailDispatcher<T> {
    pub fn new(transport: T, recipient: Mailbox, config: &MailConfig) -> Self {
        Self {
            transport,
            recipient,
            subject_prefix: config.subject_prefix.clone(),
            site_name: config.site_name.clone(),
        }
    }

    /// Resolve the recipient from configuration.
    pub fn from_config(transport: T, config: &crate::Config) -> Result<Self, DispatchError> {
        let recipient = config
            .contact_recipient()
            .ok_or(DispatchError::MissingRecipient)?;
        Ok(Self::new(transport, parse_mailbox(recipient)?, &config.mail))
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.recipient
    }

    /// Send the notification for one submission. Replies go to the submitter.
    pub async fn send(&self, submission: &SanitizedSubmission) -> Result<(), DispatchError> {
        let reply_to = submission
            .email()
            .parse::<Mailbox>()
            .map_err(|source| DispatchError::ReplyTo {
                address: submission.email().to_owned(),
                source,
            })?;
        let body = ContactEmailTemplate::new(submission, &self.site_name, Utc::now()).render()?;

        let email = OutgoingEmail {
            recipient: self.recipient.clone(),
            reply_to: Some(reply_to),
            subject: format!("{}{}", self.subject_prefix, single_line(submission.subject())),
            body,
            content_type: ContentType::Html,
        };

        self.transport.deliver(email).await?;

        info!(
            recipient = %self.recipient,
            reply_to = submission.email(),
            "Contact notification sent"
        );
        Ok(())
    }

    /// Send a plain-text message to the contact address to prove the
    /// transport works end to end.
    pub async fn send_test(&self) -> Result<(), DispatchError> {
        self.transport
            .deliver(OutgoingEmail {
                recipient: self.recipient.clone(),
                reply_to: None,
                subject: "Test Email".to_string(),
                body: "This is a test message from portfolio.".to_string(),
                content_type: ContentType::Text,
            })
            .await
    }
}

/// Collapse line breaks and runs of whitespace for use in a header.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
