use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a001_package::DenyReason;
use contracts::usecases::u501_create_transaction::ErrorResponse;
use thiserror::Error;

use crate::usecases::u501_create_transaction::CheckoutError;
use crate::usecases::u502_register_school::RegistrationError;
use crate::usecases::u503_issue_voucher::{VoucherError, CONTACT_SUPPORT_MESSAGE};
use crate::usecases::u504_provision::ProvisioningError;

/// Error type returned by every HTTP handler; renders as `{ error, message? }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Denied(DenyReason),

    #[error("Payment not completed")]
    PaymentRequired(String),

    #[error("{error}: {message}")]
    Failed { error: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::Denied(_) => StatusCode::FORBIDDEN,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Failed { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Failed { error, message } => ErrorResponse {
                error: error.clone(),
                message: Some(message.clone()),
            },
            ApiError::Denied(reason) => ErrorResponse {
                error: match reason {
                    DenyReason::LimitReached { .. } => "Limit reached",
                    DenyReason::QuotaExceeded { .. } => "Quota exceeded",
                }
                .to_string(),
                message: Some(reason.to_string()),
            },
            ApiError::PaymentRequired(message) => ErrorResponse {
                error: self.to_string(),
                message: Some(message.clone()),
            },
            ApiError::Internal(_) => ErrorResponse {
                error: "Internal server error".to_string(),
                message: None,
            },
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!("Request failed: {:#}", e);
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::MissingFields | CheckoutError::UnknownPackage(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CheckoutError::Gateway(e) => ApiError::Failed {
                error: "Failed to create transaction".to_string(),
                message: e.to_string(),
            },
            CheckoutError::Persistence(e) => ApiError::Internal(e),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(_) | RegistrationError::UnknownPackage(_) => {
                ApiError::BadRequest(err.to_string())
            }
            RegistrationError::SchoolTaken(_) | RegistrationError::EmailTaken(_) => {
                ApiError::Conflict(err.to_string())
            }
            RegistrationError::Persistence(e) => ApiError::Internal(e),
        }
    }
}

impl From<VoucherError> for ApiError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::Validation(_)
            | VoucherError::UnknownPackage(_)
            | VoucherError::PackageMismatch { .. } => ApiError::BadRequest(err.to_string()),
            VoucherError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            VoucherError::PaymentNotCompleted { .. } => ApiError::PaymentRequired(err.to_string()),
            VoucherError::Gateway(e) => ApiError::Failed {
                error: "Failed to verify payment".to_string(),
                message: e.to_string(),
            },
            VoucherError::Persistence { order_id, cause } => {
                tracing::error!("Voucher for order {} not saved: {:#}", order_id, cause);
                ApiError::Failed {
                    error: "Failed to issue voucher".to_string(),
                    message: format!("{} (Order ID: {})", CONTACT_SUPPORT_MESSAGE, order_id),
                }
            }
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Denied(reason) => ApiError::Denied(reason),
            ProvisioningError::Validation(_) | ProvisioningError::RoleNotAllowed(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ProvisioningError::SchoolNotFound(_) => ApiError::NotFound(err.to_string()),
            ProvisioningError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            ProvisioningError::Persistence(e) => ApiError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::payment::GatewayError;
    use contracts::domain::a001_package::PackageId;

    #[test]
    fn test_gateway_message_is_passed_through() {
        let err: ApiError =
            CheckoutError::Gateway(GatewayError::Api("Access denied".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error, "Failed to create transaction");
        assert_eq!(body.message.as_deref(), Some("Access denied"));
    }

    #[test]
    fn test_voucher_persistence_asks_for_support() {
        let err: ApiError = VoucherError::Persistence {
            order_id: "AHA-1-2".into(),
            cause: anyhow::anyhow!("disk full"),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = err.body().message.unwrap_or_default();
        assert!(message.starts_with(CONTACT_SUPPORT_MESSAGE));
        assert!(message.contains("AHA-1-2"));
        assert!(!message.contains("disk full"));
    }

    #[test]
    fn test_denied_is_forbidden_with_reason() {
        let err: ApiError = ProvisioningError::Denied(DenyReason::LimitReached {
            package: PackageId::Siswa,
            limit: 0,
        })
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body().error, "Limit reached");
        assert!(err.body().message.unwrap_or_default().contains("kelas"));
    }

    #[test]
    fn test_quota_denial_has_its_own_label() {
        let err: ApiError = ProvisioningError::Denied(DenyReason::QuotaExceeded {
            package: PackageId::Siswa,
            quota: 1,
        })
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let body = err.body();
        assert_eq!(body.error, "Quota exceeded");
        assert!(body.message.unwrap_or_default().contains("akun"));
    }

    #[test]
    fn test_unpaid_and_unverifiable_confirms() {
        let err: ApiError = VoucherError::PaymentNotCompleted {
            order_id: "AHA-1-2".into(),
            status: "pending".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
        let body = err.body();
        assert_eq!(body.error, "Payment not completed");
        assert!(body.message.unwrap_or_default().contains("pending"));

        let err: ApiError =
            VoucherError::Gateway(GatewayError::Network("timed out".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error, "Failed to verify payment");
        assert!(!body.message.unwrap_or_default().contains(CONTACT_SUPPORT_MESSAGE));
    }
}
