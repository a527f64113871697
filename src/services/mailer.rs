use serde::Serialize;

/// Outbound mail, delivered through an opaque webhook. Delivery failures
/// are logged and never fail the calling request.
pub struct Mailer {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl Mailer {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    pub async fn send_verification(&self, to: &str, token: &str) {
        let body = format!(
            "Welcome to the yoga program. Verify your email with this token: {}",
            token
        );
        self.send(to, "Verify your email", &body).await;
    }

    pub async fn send_reset_otp(&self, to: &str, otp: &str) {
        let body = format!(
            "Your password reset code is {}. It expires in 15 minutes.",
            otp
        );
        self.send(to, "Password reset code", &body).await;
    }

    async fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::info!(to, subject, "mail webhook not configured, skipping delivery");
            return;
        };

        let payload = MailPayload { to, subject, body };
        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(to, subject, "mail dispatched");
            }
            Ok(resp) => {
                tracing::warn!(to, status = %resp.status(), "mail webhook rejected message");
            }
            Err(e) => {
                tracing::warn!(to, "failed to reach mail webhook: {}", e);
            }
        }
    }
}
