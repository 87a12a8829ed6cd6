//! Outbound email transport for the digest.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use std::future::Future;

use crate::error::{DigestError, DigestResult};

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub trait Mailer {
    fn send(&self, email: &OutgoingEmail) -> impl Future<Output = DigestResult<()>> + Send;
}

/// Sends through the Resend HTTP API
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> DigestResult<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| DigestError::Provider(format!("bad api key header: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(DigestError::Provider(format!("{status} {txt}")));
        }
        Ok(())
    }
}

/// Dry run: logs what would be sent
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> DigestResult<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "dry run, weekly summary not sent"
        );
        tracing::debug!(body = %email.text);
        Ok(())
    }
}
