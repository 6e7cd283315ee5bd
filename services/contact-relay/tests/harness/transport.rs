// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory mail transport.

use contact_relay::mailer::{DispatchError, MailTransport, OutgoingEmail};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default)]
enum Behavior {
    #[default]
    Deliver,
    Fail,
    Panic,
}

/// Records every delivered email, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    behavior: Behavior,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery fails with a transport error naming the relay.
    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::default()
        }
    }

    /// Every delivery panics.
    pub fn panicking() -> Self {
        Self {
            behavior: Behavior::Panic,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailTransport for RecordingTransport {
    async fn deliver(&self, email: OutgoingEmail) -> Result<(), DispatchError> {
        match self.behavior {
            Behavior::Deliver => {
                self.sent.lock().unwrap().push(email);
                Ok(())
            }
            Behavior::Fail => Err(DispatchError::Transport(anyhow::anyhow!(
                "connection refused by smtp.internal.example:587"
            ))),
            Behavior::Panic => panic!("mail transport blew up"),
        }
    }
}
