use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Json;
use contracts::usecases::u501_create_transaction::{
    CreateTransactionRequest, CreateTransactionResponse, ErrorResponse, SnapClientConfig,
};
use serde_json::{json, Value};

use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::shared::payment::midtrans::snap_js_url;
use crate::usecases::u501_create_transaction;

/// POST /api/create-transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<Json<CreateTransactionResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!("Rejected checkout body: {}", rejection.body_text());
        ApiError::BadRequest("Missing required fields".into())
    })?;

    let response = u501_create_transaction::create_transaction(
        &state.db,
        state.gateway.as_ref(),
        &state.config.frontend.url,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/payments/client-config
pub async fn client_config(State(state): State<AppState>) -> Json<SnapClientConfig> {
    let midtrans = &state.config.midtrans;
    Json(SnapClientConfig {
        client_key: midtrans.client_key.clone(),
        is_production: midtrans.is_production,
        snap_js_url: snap_js_url(midtrans.is_production),
    })
}

/// OPTIONS /api/create-transaction
pub async fn preflight() -> Json<Value> {
    Json(json!({}))
}

/// Any other method on /api/create-transaction
pub async fn method_not_allowed() -> (axum::http::StatusCode, Json<ErrorResponse>) {
    (
        axum::http::StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".into(),
            message: None,
        }),
    )
}

/// CORS headers for the checkout route. OPTIONS is answered by [`preflight`]
/// with a `{}` body, so this is a response mapper rather than a `CorsLayer`.
pub async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
