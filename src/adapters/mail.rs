use crate::domain::ports::{Mailer, OutgoingMail};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts one JSON message per recipient to an HTTP mail relay. Any non-2xx
/// response counts as a delivery failure for that recipient.
#[derive(Debug, Clone)]
pub struct HttpRelayMailer {
    client: Client,
    relay_url: String,
}

impl HttpRelayMailer {
    pub fn new(relay_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, relay_url })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&RelayRequest {
                from: &mail.from,
                to: &mail.to,
                subject: &mail.subject,
                body: &mail.body,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DashboardError::DeliveryError {
                reason: format!("relay returned {} for {}", response.status(), mail.to),
            });
        }
        Ok(())
    }
}
