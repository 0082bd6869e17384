use serde::{Deserialize, Serialize};

use crate::domain::a004_user::aggregate::UserRecord;

/// Returned after provisioning an account. `access_code` is shown once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedUser {
    pub user: UserRecord,
    pub access_code: String,
}
