//! Outbound transactional mail.

use crate::utils::{config::MailConfig, ApiError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const VERIFICATION_SUBJECT: &str = "Homey - Email Verification";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid verification link: {0}")]
    Link(#[from] url::ParseError),
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail delivery failed: {}", err);
        ApiError::internal_error("Failed to send verification email").with_error(err.to_string())
    }
}

/// A plain-text message ready to hand to a [`Mailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers mail through an HTTP mail API with a bearer key
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, from: impl Into<String>) -> Result<Self, MailError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(15))
            .user_agent(format!("homey-api/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let payload = MailPayload {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Sent \"{}\" to {}", email.subject, email.to);
        Ok(())
    }
}

/// Logs messages instead of sending them; used when no mail API is configured
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Mail not sent (no mail API configured):\n{}", email.body);
        Ok(())
    }
}

/// Picks the HTTP transport when a mail API is configured
pub fn mailer_from_config(config: &MailConfig) -> Result<Box<dyn Mailer>, MailError> {
    match &config.api_url {
        Some(url) => Ok(Box::new(HttpMailer::new(
            url.clone(),
            config.api_key.clone(),
            config.from.clone(),
        )?)),
        None => {
            tracing::warn!("MAIL_API_URL is not set; verification emails will only be logged");
            Ok(Box::new(LogMailer))
        }
    }
}

/// `<base>/api/users/verify?token=<token>`
pub fn verification_link(base_url: &str, token: &str) -> Result<Url, MailError> {
    let mut link = Url::parse(base_url)?.join("/api/users/verify")?;
    link.query_pairs_mut().append_pair("token", token);
    Ok(link)
}

pub fn verification_email(to: &str, first_name: &str, link: &Url) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        body: format!(
            "Hi {first_name},\n\
             Thanks for registering! Please verify your email by clicking the link below:\n\
             {link}\n\
             If you did not sign up for Homey, you can safely ignore this message."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn link_points_at_verify_route() {
        let link = verification_link("http://localhost:8080", "abc.def").unwrap();
        assert_eq!(link.as_str(), "http://localhost:8080/api/users/verify?token=abc.def");
    }

    #[test]
    fn email_body_greets_user_and_carries_link() {
        let link = verification_link("https://homey.example", "t0k").unwrap();
        let email = verification_email("sam@example.com", "Sam", &link);
        assert_eq!(email.subject, VERIFICATION_SUBJECT);
        assert!(email.body.starts_with("Hi Sam,\n"));
        assert!(email.body.contains("https://homey.example/api/users/verify?token=t0k"));
    }

    #[tokio::test]
    async fn http_mailer_posts_json_with_bearer_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .match_header("authorization", "Bearer secret-key")
            .match_body(Matcher::PartialJson(json!({
                "from": "no-reply@homey.app",
                "to": "sam@example.com",
                "subject": VERIFICATION_SUBJECT,
            })))
            .with_status(202)
            .create_async()
            .await;

        let mailer = HttpMailer::new(
            format!("{}/send", server.url()),
            Some("secret-key".into()),
            "no-reply@homey.app",
        )
        .unwrap();
        let link = verification_link("http://localhost:8080", "tok").unwrap();
        mailer
            .send(&verification_email("sam@example.com", "Sam", &link))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_send_reports_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/send")
            .with_status(503)
            .with_body("down for maintenance")
            .create_async()
            .await;

        let mailer = HttpMailer::new(format!("{}/send", server.url()), None, "no-reply@homey.app").unwrap();
        let email = OutgoingEmail {
            to: "sam@example.com".into(),
            subject: "hello".into(),
            body: "hi".into(),
        };

        match mailer.send(&email).await {
            Err(MailError::Rejected { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
