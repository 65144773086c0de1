use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{PaymentCheck, PaymentProvider};

/// Payment-status checks against an external UPI gateway. One HTTP call per
/// check; no retries here, the caller decides when to check again.
pub struct UpiGatewayProvider {
    base_url: String,
    client: reqwest::Client,
}

impl UpiGatewayProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

#[async_trait]
impl PaymentProvider for UpiGatewayProvider {
    async fn check_status(&self, reference: &str, amount: f64) -> anyhow::Result<PaymentCheck> {
        let url = format!("{}/v1/payments/{reference}/status", self.base_url);

        let response: StatusResponse = self
            .client
            .get(&url)
            .query(&[("amount", format!("{amount:.2}"))])
            .send()
            .await
            .context("failed to reach payment gateway")?
            .error_for_status()
            .context("payment gateway returned error")?
            .json()
            .await
            .context("invalid payment gateway response")?;

        match response.status.as_str() {
            "success" => Ok(PaymentCheck::Success),
            _ => Ok(PaymentCheck::Pending),
        }
    }
}
