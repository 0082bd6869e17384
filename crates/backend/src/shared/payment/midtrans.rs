use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use super::{GatewayError, PaymentGateway, SnapToken, SnapTransaction, TransactionStatus};
use crate::shared::config::MidtransConfig;

const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";
const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
const PRODUCTION_API_URL: &str = "https://api.midtrans.com";

/// Script the browser loads to show the Snap popup
pub fn snap_js_url(is_production: bool) -> String {
    let base = if is_production {
        PRODUCTION_BASE_URL
    } else {
        SANDBOX_BASE_URL
    };
    format!("{}/snap/snap.js", base)
}

/// Midtrans Snap client
pub struct MidtransSnapClient {
    client: reqwest::Client,
    server_key: String,
    base_url: String,
    api_url: String,
}

/// Snap reports failures as a list of messages
#[derive(Debug, Deserialize)]
struct SnapErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
}

/// The status API answers unknown orders with `status_code: "404"` in the body
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status_code: Option<String>,
    #[serde(default)]
    status_message: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    transaction_status: Option<String>,
    #[serde(default)]
    fraud_status: Option<String>,
}

fn parse_status(
    order_id: &str,
    http_status: u16,
    body: &str,
) -> Result<TransactionStatus, GatewayError> {
    let parsed = serde_json::from_str::<StatusBody>(body)
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    if http_status == 404 || parsed.status_code.as_deref() == Some("404") {
        return Err(GatewayError::TransactionNotFound(order_id.to_string()));
    }
    match parsed.transaction_status {
        Some(transaction_status) => Ok(TransactionStatus {
            order_id: parsed.order_id.unwrap_or_else(|| order_id.to_string()),
            transaction_status,
            fraud_status: parsed.fraud_status,
        }),
        None => Err(GatewayError::Api(parsed.status_message.unwrap_or_else(|| {
            format!("Midtrans API error: HTTP {}", http_status)
        }))),
    }
}

impl MidtransSnapClient {
    pub fn new(config: &MidtransConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let (base_url, api_url) = if config.is_production {
            (PRODUCTION_BASE_URL, PRODUCTION_API_URL)
        } else {
            (SANDBOX_BASE_URL, SANDBOX_API_URL)
        };
        if config.server_key.trim().is_empty() {
            tracing::warn!("MIDTRANS_SERVER_KEY is empty, checkout will fail until it is set");
        }
        Ok(Self {
            client,
            server_key: config.server_key.clone(),
            base_url: base_url.to_string(),
            api_url: api_url.to_string(),
        })
    }

    fn transactions_url(&self) -> String {
        format!("{}/snap/v1/transactions", self.base_url)
    }

    fn status_url(&self, order_id: &str) -> String {
        format!("{}/v2/{}/status", self.api_url, urlencoding::encode(order_id))
    }

    /// Basic auth with the server key as user and an empty password
    fn authorization(&self) -> String {
        let credentials = format!("{}:", self.server_key);
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }
}

#[async_trait]
impl PaymentGateway for MidtransSnapClient {
    async fn create_transaction(&self, params: &SnapTransaction) -> Result<SnapToken, GatewayError> {
        let url = self.transactions_url();
        tracing::debug!(
            "Midtrans create transaction {} -> {}",
            params.transaction_details.order_id,
            url
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .json(params)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<SnapErrorBody>(&body)
                .ok()
                .filter(|b| !b.error_messages.is_empty())
                .map(|b| b.error_messages.join(", "))
                .unwrap_or_else(|| format!("Midtrans API error: HTTP {}", status.as_u16()));
            tracing::error!(
                "Midtrans rejected order {}: {}",
                params.transaction_details.order_id,
                message
            );
            return Err(GatewayError::Api(message));
        }

        serde_json::from_str::<SnapToken>(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn transaction_status(&self, order_id: &str) -> Result<TransactionStatus, GatewayError> {
        let url = self.status_url(order_id);
        tracing::debug!("Midtrans status {} -> {}", order_id, url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let result = parse_status(order_id, status.as_u16(), &body);
        if let Err(GatewayError::Api(message)) = &result {
            tracing::error!("Midtrans status for {} failed: {}", order_id, message);
        }
        result
    }

    fn provider_name(&self) -> &str {
        "midtrans"
    }
}
