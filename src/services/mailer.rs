//! Outgoing mail
//!
//! Only the login OTP is ever sent. Delivery sits behind the [`Mailer`]
//! trait so the transport can be swapped without touching the auth flow;
//! [`LogMailer`] writes the message to the log, which is enough for local
//! development and for a relay that tails structured logs.

use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, username: &str, code: &str) -> AppResult<()>;
}

pub fn otp_subject() -> &'static str {
    "Your Login OTP"
}

pub fn otp_body(username: &str, code: &str) -> String {
    format!(
        "Hello {},\n\nYour one-time password is {}.\nIt is valid for a single login.\n",
        username, code
    )
}

pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, username: &str, code: &str) -> AppResult<()> {
        tracing::info!(
            from = %self.from,
            to,
            subject = otp_subject(),
            body = %otp_body(username, code),
            "Sending OTP email"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_carries_code() {
        let body = otp_body("ana", "483920");
        assert!(body.starts_with("Hello ana,"));
        assert!(body.contains("483920"));
    }

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        let mailer = LogMailer::new("shop@example.com");
        assert!(mailer.send_otp("ana@example.com", "ana", "123456").await.is_ok());
    }
}
