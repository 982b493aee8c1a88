use std::sync::{Arc, Mutex};

use tracing::info;

use super::domain::EmailMessage;

/// Outbound delivery seam. SMTP or queue adapters live outside this crate.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), TransportError>;
}

/// Delivery failure reported by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// Writes each message to the tracing subscriber instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, message: &EmailMessage) -> Result<(), TransportError> {
        info!(
            kind = message.kind.label(),
            to = %message.to.join(", "),
            subject = %message.subject,
            "email queued"
        );
        info!(body = %message.body, "email body");
        Ok(())
    }
}

/// Captures messages in memory; used by the demo server and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTransport {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl InMemoryTransport {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

impl MailTransport for InMemoryTransport {
    fn send(&self, message: &EmailMessage) -> Result<(), TransportError> {
        let mut guard = self.sent.lock().expect("transport mutex poisoned");
        guard.push(message.clone());
        Ok(())
    }
}
