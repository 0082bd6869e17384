use serde::{Deserialize, Serialize};

/// Buyer details forwarded to the payment gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Body of `POST /api/create-transaction`.
/// Both fields are optional at the wire level so a missing field maps to 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub package_type: Option<String>,
    pub customer_info: Option<CustomerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionResponse {
    pub token: String,
    pub redirect_url: String,
    pub order_id: String,
}

/// Public settings the landing page needs to open the Snap popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapClientConfig {
    pub client_key: String,
    pub is_production: bool,
    pub snap_js_url: String,
}

/// Error body shared by all JSON endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
