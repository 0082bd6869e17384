pub mod midtrans;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use midtrans::MidtransSnapClient;

/// Payment gateway errors. Messages are surfaced to the caller verbatim.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
}

// ============================================================================
// Snap transaction parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: i64,
    pub quantity: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callbacks {
    pub finish: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapTransaction {
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetail>,
    pub customer_details: CustomerDetails,
    pub callbacks: Callbacks,
}

/// What checkout needs back from the gateway
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapToken {
    pub token: String,
    pub redirect_url: String,
}

/// Gateway view of one order, from the status API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionStatus {
    pub order_id: String,
    /// pending, capture, settlement, deny, cancel, expire, refund, ...
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

impl TransactionStatus {
    /// Money has been received. A card capture only counts once fraud review accepted it.
    pub fn is_paid(&self) -> bool {
        match self.transaction_status.as_str() {
            "settlement" => true,
            "capture" => matches!(self.fraud_status.as_deref(), None | Some("accept")),
            _ => false,
        }
    }
}

/// Hosted-checkout payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a transaction and return its payment token and redirect URL
    async fn create_transaction(&self, params: &SnapTransaction) -> Result<SnapToken, GatewayError>;

    /// Current status of an order as the provider sees it
    async fn transaction_status(&self, order_id: &str) -> Result<TransactionStatus, GatewayError>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}
