//! Outgoing email.
//!
//! SYSTEM CONTEXT
//! ==============
//! Signup sends a verification link through a `Mailer`. Production uses
//! Resend; without an API key the server falls back to `LogMailer`, which
//! writes the message to the tracing log so local signups stay usable.

use std::sync::Arc;

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::config::EmailConfig;

const VERIFY_EMAIL_TEMPLATE: &str = include_str!("../../templates/verify_email.html");

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email transport. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`MailerError`] if the provider rejects the message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}

/// Resend-backed transport.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(api_key: &str, from: &str) -> Self {
        Self { client: Resend::new(api_key), from: from.to_owned() }
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let to = [email.to.as_str()];
        let options = CreateEmailBaseOptions::new(&self.from, to, &email.subject).with_html(&email.html);
        self.client
            .emails
            .send(options)
            .await
            .map_err(|e| MailerError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/// Development transport that logs instead of sending.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        tracing::info!(to = %email.to, subject = %email.subject, body = %email.html, "email not sent (no provider configured)");
        Ok(())
    }
}

/// Pick the transport for this configuration.
#[must_use]
pub fn from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key, &config.from)),
        None => {
            tracing::warn!("RESEND_API_KEY not set; verification emails will be logged");
            Arc::new(LogMailer)
        }
    }
}

// =============================================================================
// VERIFICATION EMAIL
// =============================================================================

#[must_use]
pub fn verification_url(public_base_url: &str, token: &str) -> String {
    format!("{}/api/auth/verify-email?token={token}", public_base_url.trim_end_matches('/'))
}

#[must_use]
pub fn render_verify_email_template(site_name: &str, email: &str, url: &str) -> String {
    VERIFY_EMAIL_TEMPLATE
        .replace("{{SITE_NAME}}", site_name)
        .replace("{{EMAIL}}", email)
        .replace("{{URL}}", url)
}

/// Build the verification message for a new account.
#[must_use]
pub fn verification_email(config: &EmailConfig, to: &str, token: &str) -> OutgoingEmail {
    let url = verification_url(&config.public_base_url, token);
    OutgoingEmail {
        to: to.to_owned(),
        subject: format!("How to verify email address on {}", config.site_name),
        html: render_verify_email_template(&config.site_name, to, &url),
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
