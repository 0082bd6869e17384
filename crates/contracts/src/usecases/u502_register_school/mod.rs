use serde::{Deserialize, Serialize};

use crate::domain::a001_package::PackageId;
use crate::domain::a002_school::aggregate::PaymentStatus;

/// Landing page registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub package_type: String,
}

/// The access code is returned once and never stored in clear
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user_id: String,
    pub school_name: String,
    pub package: PackageId,
    pub price: i64,
    pub payment_status: PaymentStatus,
    pub access_code: String,
}
