use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a001_package::{Package, PackageId};
use crate::usecases::u501_create_transaction::CustomerInfo;

pub const ORDER_PREFIX: &str = "AHA";
/// Exclusive upper bound of the random order suffix
pub const ORDER_SUFFIX_BOUND: u32 = 10_000;

/// `AHA-<millisecond-epoch>-<0..9999>`
pub fn format_order_id(epoch_millis: i64, suffix: u32) -> String {
    format!("{}-{}-{}", ORDER_PREFIX, epoch_millis, suffix)
}

pub fn is_valid_order_id(order_id: &str) -> bool {
    let mut parts = order_id.splitn(3, '-');
    let (Some(prefix), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    prefix == ORDER_PREFIX
        && digits(millis)
        && digits(suffix)
        && suffix.parse::<u32>().map(|n| n < ORDER_SUFFIX_BOUND).unwrap_or(false)
}

/// One checkout attempt. Persisting it is what keeps order ids single-use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    pub package_id: PackageId,
    pub gross_amount: i64,
    pub customer: CustomerInfo,
    pub created_at: DateTime<Utc>,
}

impl PaymentOrder {
    pub fn new_for_insert(order_id: String, package: &Package, customer: CustomerInfo) -> Self {
        Self {
            order_id,
            package_id: package.id,
            gross_amount: package.price,
            customer,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_order_id() {
        assert_eq!(
            format_order_id(1_700_000_000_000, 1234),
            "AHA-1700000000000-1234"
        );
        assert!(is_valid_order_id("AHA-1700000000000-1234"));
        assert!(is_valid_order_id("AHA-1700000000000-0"));
    }

    #[test]
    fn test_invalid_order_ids() {
        assert!(!is_valid_order_id("AHA-1700000000000-10000"));
        assert!(!is_valid_order_id("AHA-1700000000000"));
        assert!(!is_valid_order_id("AHA--12"));
        assert!(!is_valid_order_id("XYZ-1700000000000-12"));
        assert!(!is_valid_order_id("AHA-17000x0000000-12"));
        assert!(!is_valid_order_id("AHA-1700000000000-1-2"));
    }
}
