use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a001_package::{Package, PackageId};
use crate::usecases::u501_create_transaction::CustomerInfo;

pub const VOUCHER_PREFIX: &str = "AHA";
pub const VOUCHER_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const VOUCHER_BLOCK_LEN: usize = 4;

/// True for codes shaped `AHA-XXXX-XXXX` with X in [A-Z0-9]
pub fn is_valid_voucher_code(code: &str) -> bool {
    let mut parts = code.split('-');
    let prefix_ok = parts.next() == Some(VOUCHER_PREFIX);
    let blocks: Vec<&str> = parts.collect();
    prefix_ok
        && blocks.len() == 2
        && blocks.iter().all(|b| {
            b.len() == VOUCHER_BLOCK_LEN && b.bytes().all(|c| VOUCHER_ALPHABET.contains(&c))
        })
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Redemption code minted after a confirmed payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub code: String,
    #[serde(rename = "package")]
    pub package_id: PackageId,
    pub package_name: String,
    pub price: i64,
    pub accounts: u32,
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub redeemed: bool,
    pub redeemed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    /// Denormalizes the package fields at issue time
    pub fn new_for_insert(
        code: String,
        order_id: String,
        package: &Package,
        customer: &CustomerInfo,
    ) -> Self {
        Self {
            code,
            package_id: package.id,
            package_name: package.name.to_string(),
            price: package.price,
            accounts: package.account_quota,
            order_id,
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            customer_phone: customer.phone.clone(),
            redeemed: false,
            redeemed_by: None,
            created_at: Utc::now(),
        }
    }

    /// false -> true exactly once. In-memory transition only; storage goes
    /// through the repository's conditional update.
    pub fn redeem(&mut self, school_name: &str) -> Result<(), String> {
        if self.redeemed {
            return Err(format!("Voucher {} has already been redeemed", self.code));
        }
        self.redeemed = true;
        self.redeemed_by = Some(school_name.to_string());
        Ok(())
    }
}
