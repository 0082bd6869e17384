//! Random identifiers handed to users: access codes, voucher codes, order ids.

use chrono::Utc;
use contracts::domain::a005_voucher::aggregate::{
    VOUCHER_ALPHABET, VOUCHER_BLOCK_LEN, VOUCHER_PREFIX,
};
use contracts::domain::a007_payment_order::aggregate::{format_order_id, ORDER_SUFFIX_BOUND};
use rand::rngs::OsRng;
use rand::Rng;

pub const ACCESS_CODE_LEN: usize = 8;

/// 8 uniform decimal digits from the OS CSPRNG
pub fn generate_access_code() -> String {
    let mut rng = OsRng;
    (0..ACCESS_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// `AHA-XXXX-XXXX`, X drawn uniformly from [A-Z0-9]
pub fn generate_voucher_code() -> String {
    let mut rng = rand::thread_rng();
    let mut block = || -> String {
        (0..VOUCHER_BLOCK_LEN)
            .map(|_| char::from(VOUCHER_ALPHABET[rng.gen_range(0..VOUCHER_ALPHABET.len())]))
            .collect()
    };
    let first = block();
    let second = block();
    format!("{}-{}-{}", VOUCHER_PREFIX, first, second)
}

/// `AHA-<millisecond-epoch>-<0..9999>` for the current instant
pub fn generate_order_id() -> String {
    let suffix = rand::thread_rng().gen_range(0..ORDER_SUFFIX_BOUND);
    format_order_id(Utc::now().timestamp_millis(), suffix)
}
