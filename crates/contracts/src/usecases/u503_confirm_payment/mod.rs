use serde::{Deserialize, Serialize};

use crate::domain::a005_voucher::aggregate::Voucher;

/// Sent by the checkout page once the gateway reports success.
/// Customer details come from the stored order, not from this body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub package_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub voucher: Voucher,
    /// True when the order already had a voucher and nothing new was written
    pub already_issued: bool,
}
