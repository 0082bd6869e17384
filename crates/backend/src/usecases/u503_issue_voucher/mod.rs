//! Voucher issuing after a confirmed payment.
//!
//! The gateway's status API is the only proof of payment; the client's
//! confirm call just asks the backend to look.
//!
//! Issuing is idempotent on the order id: the unique index on
//! `a005_voucher.order_id` decides, and a conflicting insert is answered by
//! reading back the voucher that won.

use contracts::domain::a001_package::{lookup, Package, PackageId, PackageNotFound};
use contracts::domain::a005_voucher::aggregate::Voucher;
use contracts::usecases::u501_create_transaction::CustomerInfo;
use contracts::usecases::u503_confirm_payment::{ConfirmPaymentRequest, ConfirmPaymentResponse};
use sea_orm::ConnectionTrait;
use thiserror::Error;

use crate::domain::a002_school::repository as school_repository;
use crate::domain::a005_voucher::repository as voucher_repository;
use crate::domain::a007_payment_order::repository as order_repository;
use crate::shared::codes::generate_voucher_code;
use crate::shared::data::db::is_unique_violation_any;
use crate::shared::payment::{GatewayError, PaymentGateway};

/// Voucher code collisions tolerated before giving up
const CODE_ATTEMPTS: usize = 5;

pub const CONTACT_SUPPORT_MESSAGE: &str =
    "Pembayaran berhasil, tetapi terjadi kesalahan saat membuat voucher. Silakan hubungi support.";

#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("{0}")]
    Validation(String),

    #[error("Order '{0}' not found")]
    OrderNotFound(String),

    #[error("Invalid package type")]
    UnknownPackage(#[source] PackageNotFound),

    #[error("Package '{requested}' does not match order {order_id} ({ordered})")]
    PackageMismatch {
        order_id: String,
        requested: PackageId,
        ordered: PackageId,
    },

    /// The gateway has not received the money for this order
    #[error("Payment for order {order_id} is not completed ({status})")]
    PaymentNotCompleted { order_id: String, status: String },

    #[error("Could not verify payment: {0}")]
    Gateway(#[source] GatewayError),

    /// The store failed; nothing is retried and the buyer must contact support
    #[error("Voucher for order {order_id} could not be saved: {cause}")]
    Persistence {
        order_id: String,
        cause: anyhow::Error,
    },
}

impl VoucherError {
    fn persistence(order_id: &str, cause: anyhow::Error) -> Self {
        VoucherError::Persistence {
            order_id: order_id.to_string(),
            cause,
        }
    }
}

/// Outcome of [`issue`]. A repeated order id is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issuance {
    Issued(Voucher),
    AlreadyIssued(Voucher),
}

impl Issuance {
    pub fn voucher(&self) -> &Voucher {
        match self {
            Issuance::Issued(v) | Issuance::AlreadyIssued(v) => v,
        }
    }

    pub fn into_voucher(self) -> Voucher {
        match self {
            Issuance::Issued(v) | Issuance::AlreadyIssued(v) => v,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Issuance::Issued(_))
    }
}

/// Mints and stores one voucher per order id
pub async fn issue<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
    package: &Package,
    customer: &CustomerInfo,
) -> Result<Issuance, VoucherError> {
    let existing = voucher_repository::get_by_order_id(db, order_id)
        .await
        .map_err(|e| VoucherError::persistence(order_id, e))?;
    if let Some(voucher) = existing {
        tracing::info!("Order {} already has voucher {}", order_id, voucher.code);
        return Ok(Issuance::AlreadyIssued(voucher));
    }

    for attempt in 1..=CODE_ATTEMPTS {
        let voucher =
            Voucher::new_for_insert(generate_voucher_code(), order_id.to_string(), package, customer);
        match voucher_repository::insert(db, &voucher).await {
            Ok(()) => {
                tracing::info!(
                    "Issued voucher {} for order {} ({})",
                    voucher.code,
                    order_id,
                    package.id
                );
                return Ok(Issuance::Issued(voucher));
            }
            Err(e) if is_unique_violation_any(&e) => {
                // Either a concurrent confirm won the order id or the code collided
                let winner = voucher_repository::get_by_order_id(db, order_id)
                    .await
                    .map_err(|e| VoucherError::persistence(order_id, e))?;
                if let Some(voucher) = winner {
                    return Ok(Issuance::AlreadyIssued(voucher));
                }
                tracing::warn!(
                    "Voucher code {} collided (attempt {}/{})",
                    voucher.code,
                    attempt,
                    CODE_ATTEMPTS
                );
            }
            Err(e) => {
                tracing::error!("Failed to save voucher for order {}: {}", order_id, e);
                return Err(VoucherError::persistence(order_id, e));
            }
        }
    }

    Err(VoucherError::persistence(
        order_id,
        anyhow::anyhow!("no free voucher code after {} attempts", CODE_ATTEMPTS),
    ))
}

/// Issues the voucher for a paid checkout order and settles the buyer's school
pub async fn confirm_payment<C: ConnectionTrait>(
    db: &C,
    gateway: &dyn PaymentGateway,
    request: ConfirmPaymentRequest,
) -> Result<ConfirmPaymentResponse, VoucherError> {
    let order_id = request.order_id.trim();
    if order_id.is_empty() || request.package_type.is_empty() {
        return Err(VoucherError::Validation("Missing required fields".into()));
    }

    let order = order_repository::get(db, order_id)
        .await
        .map_err(|e| VoucherError::persistence(order_id, e))?
        .ok_or_else(|| VoucherError::OrderNotFound(order_id.to_string()))?;

    let package = lookup(&request.package_type).map_err(VoucherError::UnknownPackage)?;
    if package.id != order.package_id {
        return Err(VoucherError::PackageMismatch {
            order_id: order.order_id,
            requested: package.id,
            ordered: order.package_id,
        });
    }

    verify_paid(gateway, &order.order_id).await?;

    let issuance = issue(db, &order.order_id, package, &order.customer).await?;
    settle_school(db, &order.order_id, package.id, &order.customer).await?;

    let already_issued = !issuance.is_new();
    Ok(ConfirmPaymentResponse {
        voucher: issuance.into_voucher(),
        already_issued,
    })
}

async fn verify_paid(gateway: &dyn PaymentGateway, order_id: &str) -> Result<(), VoucherError> {
    let status = match gateway.transaction_status(order_id).await {
        Ok(status) => status,
        Err(GatewayError::TransactionNotFound(_)) => {
            return Err(VoucherError::PaymentNotCompleted {
                order_id: order_id.to_string(),
                status: "not_found".to_string(),
            })
        }
        Err(e) => {
            tracing::error!(
                "{} status check for {} failed: {}",
                gateway.provider_name(),
                order_id,
                e
            );
            return Err(VoucherError::Gateway(e));
        }
    };
    if !status.is_paid() {
        tracing::warn!(
            "Confirm for order {} refused, gateway status is {}",
            order_id,
            status.transaction_status
        );
        return Err(VoucherError::PaymentNotCompleted {
            order_id: order_id.to_string(),
            status: status.transaction_status,
        });
    }
    Ok(())
}

/// Marks the buyer's registered school paid when it ordered this package
async fn settle_school<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
    package: PackageId,
    customer: &CustomerInfo,
) -> Result<(), VoucherError> {
    if customer.email.trim().is_empty() {
        return Ok(());
    }
    let school = school_repository::find_by_admin_email(db, &customer.email)
        .await
        .map_err(|e| VoucherError::persistence(order_id, e))?;
    let Some(school) = school else {
        return Ok(());
    };
    if school.is_paid() || school.selected_package != package {
        return Ok(());
    }
    let changed = school_repository::mark_paid(db, &school.school_name)
        .await
        .map_err(|e| VoucherError::persistence(order_id, e))?;
    if changed {
        tracing::info!("School '{}' marked paid by order {}", school.school_name, order_id);
    }
    Ok(())
}
