use axum::extract::State;
use axum::Json;
use contracts::usecases::u503_confirm_payment::{ConfirmPaymentRequest, ConfirmPaymentResponse};

use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::usecases::u503_issue_voucher;

/// POST /api/payments/confirm
///
/// Public, so nothing here is taken on trust: the order must exist and the
/// gateway must report it paid.
pub async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    let response =
        u503_issue_voucher::confirm_payment(&state.db, state.gateway.as_ref(), request).await?;
    Ok(Json(response))
}
