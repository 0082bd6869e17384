//! Checkout: resolve the package, reserve an order id and open a hosted
//! payment session with the gateway.

use contracts::domain::a001_package::{lookup, Package, PackageNotFound};
use contracts::domain::a007_payment_order::aggregate::PaymentOrder;
use contracts::usecases::u501_create_transaction::{
    CreateTransactionRequest, CreateTransactionResponse, CustomerInfo,
};
use sea_orm::ConnectionTrait;
use thiserror::Error;

use crate::domain::a007_payment_order::repository as order_repository;
use crate::shared::codes::generate_order_id;
use crate::shared::data::db::is_unique_violation_any;
use crate::shared::payment::{
    Callbacks, CustomerDetails, GatewayError, ItemDetail, PaymentGateway, SnapTransaction,
    TransactionDetails,
};

/// Order id collisions tolerated before giving up
const ORDER_ID_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid package type")]
    UnknownPackage(#[source] PackageNotFound),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to record order: {0}")]
    Persistence(anyhow::Error),
}

/// Callback the gateway sends the buyer back to
pub fn finish_url(frontend_url: &str, order_id: &str, package: &Package) -> String {
    format!(
        "{}?payment=success&order_id={}&package={}",
        frontend_url,
        urlencoding::encode(order_id),
        urlencoding::encode(package.id.as_str())
    )
}

pub fn build_snap_transaction(
    order_id: &str,
    package: &Package,
    customer: &CustomerInfo,
    frontend_url: &str,
) -> SnapTransaction {
    SnapTransaction {
        transaction_details: TransactionDetails {
            order_id: order_id.to_string(),
            gross_amount: package.price,
        },
        item_details: vec![ItemDetail {
            id: package.id.as_str().to_string(),
            price: package.price,
            quantity: 1,
            name: package.item_name(),
        }],
        customer_details: CustomerDetails {
            first_name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        },
        callbacks: Callbacks {
            finish: finish_url(frontend_url, order_id, package),
        },
    }
}

/// Persists a fresh order, regenerating the id on collision
async fn reserve_order<C: ConnectionTrait>(
    db: &C,
    package: &Package,
    customer: &CustomerInfo,
) -> Result<PaymentOrder, CheckoutError> {
    let mut last_err = None;
    for _ in 0..ORDER_ID_ATTEMPTS {
        let order = PaymentOrder::new_for_insert(generate_order_id(), package, customer.clone());
        match order_repository::insert(db, &order).await {
            Ok(()) => return Ok(order),
            Err(e) if is_unique_violation_any(&e) => {
                tracing::warn!("Order id {} already used, regenerating", order.order_id);
                last_err = Some(e);
            }
            Err(e) => return Err(CheckoutError::Persistence(e)),
        }
    }
    Err(CheckoutError::Persistence(last_err.unwrap_or_else(|| {
        anyhow::anyhow!("no order id available after {} attempts", ORDER_ID_ATTEMPTS)
    })))
}

pub async fn create_transaction<C: ConnectionTrait>(
    db: &C,
    gateway: &dyn PaymentGateway,
    frontend_url: &str,
    request: CreateTransactionRequest,
) -> Result<CreateTransactionResponse, CheckoutError> {
    let package_type = request
        .package_type
        .filter(|p| !p.is_empty())
        .ok_or(CheckoutError::MissingFields)?;
    let customer = request.customer_info.ok_or(CheckoutError::MissingFields)?;
    let package = lookup(&package_type).map_err(CheckoutError::UnknownPackage)?;

    let order = reserve_order(db, package, &customer).await?;
    let params = build_snap_transaction(&order.order_id, package, &customer, frontend_url);

    tracing::info!(
        "Creating {} transaction {} for package {} ({})",
        gateway.provider_name(),
        order.order_id,
        package.id,
        package.price
    );
    let token = gateway.create_transaction(&params).await.map_err(|e| {
        tracing::error!("Error creating transaction {}: {}", order.order_id, e);
        CheckoutError::Gateway(e)
    })?;

    Ok(CreateTransactionResponse {
        token: token.token,
        redirect_url: token.redirect_url,
        order_id: order.order_id,
    })
}
