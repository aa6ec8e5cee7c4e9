//! Outbound email.

use std::future::Future;

use clubhouse_common::error::ClubResult;

/// Delivers one-time codes to a mailbox.
pub trait Mailer: Send + Sync {
    fn send_otp(&self, to: &str, name: &str, code: &str) -> impl Future<Output = ClubResult<()>> + Send;
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, name: &str, code: &str) -> ClubResult<()> {
        tracing::info!(from = %self.from, to, "Sending OTP email");
        tracing::debug!(to, name, code, "OTP email body");
        Ok(())
    }
}
