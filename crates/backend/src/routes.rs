use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::shared::app_state::AppState;
use crate::system::middleware::request_logger::request_logger;
use crate::{handlers, system};

fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}

/// All application routes
pub fn configure_routes(state: AppState) -> Router {
    let checkout = Router::new()
        .route(
            "/api/create-transaction",
            post(handlers::u501_create_transaction::create_transaction)
                .options(handlers::u501_create_transaction::preflight)
                .fallback(handlers::u501_create_transaction::method_not_allowed),
        )
        // Called straight from the landing page: any origin, POST only
        .layer(middleware::map_response(
            handlers::u501_create_transaction::cors_headers,
        ));

    let api = Router::new()
        // ========================================
        // PUBLIC
        // ========================================
        .route("/api/packages", get(handlers::a001_package::list_all))
        .route(
            "/api/registrations",
            post(handlers::u502_register_school::register),
        )
        .route(
            "/api/payments/confirm",
            post(handlers::u503_confirm_payment::confirm),
        )
        .route(
            "/api/payments/client-config",
            get(handlers::u501_create_transaction::client_config),
        )
        // ========================================
        // AUTH
        // ========================================
        .route("/api/auth/login", post(system::handlers::auth::login))
        .route("/api/auth/logout", post(system::handlers::auth::logout))
        .route("/api/auth/me", get(system::handlers::auth::current_user))
        // ========================================
        // SCHOOL DASHBOARD
        // ========================================
        .route(
            "/api/classes",
            get(handlers::a003_class::list).post(handlers::a003_class::create),
        )
        .route(
            "/api/users",
            get(handlers::a004_user::list).post(handlers::a004_user::create),
        )
        .route("/api/habit-logs", post(handlers::a006_habit_log::create))
        .route(
            "/api/monitoring/daily",
            get(handlers::p900_habit_monitoring::daily),
        )
        .route(
            "/api/monitoring/monthly",
            get(handlers::p900_habit_monitoring::monthly),
        )
        .route(
            "/api/monitoring/detail",
            get(handlers::p900_habit_monitoring::detail),
        )
        // ========================================
        // SUPER ADMIN
        // ========================================
        .route("/api/admin/schools", get(handlers::admin::list_schools))
        .route("/api/admin/classes", get(handlers::admin::list_classes))
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route("/api/admin/vouchers", get(handlers::admin::list_vouchers))
        .route(
            "/api/admin/vouchers/:code",
            get(handlers::admin::get_voucher),
        )
        .route(
            "/api/admin/schools/:name/package",
            put(handlers::admin::change_package),
        )
        .layer(api_cors());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(checkout)
        .merge(api)
        .layer(middleware::from_fn(request_logger))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::payment::fake::FakeGateway;
    use crate::shared::payment::PaymentGateway;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app_with(gateway: FakeGateway) -> Router {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(gateway);
        configure_routes(AppState::for_tests(gateway).await)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn checkout_body(package: &str) -> Value {
        json!({
            "packageType": package,
            "customerInfo": {
                "name": "Bu Sari",
                "email": "sari@sdn1.id",
                "phone": "081234567890"
            }
        })
    }

    #[tokio::test]
    async fn test_checkout_preflight_and_wrong_method() {
        let app = app_with(FakeGateway::ok()).await;

        let (status, body) =
            send(&app, Method::OPTIONS, "/api/create-transaction", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/create-transaction")
                    .header(header::ORIGIN, "https://anakhebat.id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");

        let (status, body) = send(&app, Method::GET, "/api/create-transaction", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_checkout_validation() {
        let app = app_with(FakeGateway::ok()).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(json!({ "packageType": "kelas" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(checkout_body("premium")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid package type");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(json!("not an object")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_success_and_gateway_failure() {
        let app = app_with(FakeGateway::ok()).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(checkout_body("kelas")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let order_id = body["orderId"].as_str().unwrap().to_string();
        assert!(order_id.starts_with("AHA-"));
        assert_eq!(body["token"], format!("tok-{}", order_id));

        let app = app_with(FakeGateway::failing("Access denied due to unauthorized transaction")).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(checkout_body("kelas")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create transaction");
        assert_eq!(
            body["message"],
            "Access denied due to unauthorized transaction"
        );
    }

    #[tokio::test]
    async fn test_register_login_and_class_limit() {
        let app = app_with(FakeGateway::ok()).await;

        let (status, _) = send(&app, Method::GET, "/api/classes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, registration) = send(
            &app,
            Method::POST,
            "/api/registrations",
            None,
            Some(json!({
                "name": "Bu Sari",
                "email": "sari@sdn1.id",
                "school": "SD Negeri 1",
                "packageType": "kelas"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let code = registration["accessCode"].as_str().unwrap().to_string();

        let (status, login) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "sari@sdn1.id", "accessCode": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/classes",
            Some(&token),
            Some(json!({ "name": "1A" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/classes",
            Some(&token),
            Some(json!({ "name": "1B" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Limit reached");

        let (status, classes) = send(&app, Method::GET, "/api/classes", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(classes.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, Method::GET, "/api/admin/schools", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_confirm_unknown_order_is_not_found() {
        let app = app_with(FakeGateway::ok()).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/payments/confirm",
            None,
            Some(json!({ "orderId": "AHA-1700000000000-1234", "packageType": "kelas" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_packages_carry_price_labels() {
        let app = app_with(FakeGateway::ok()).await;
        let (status, body) = send(&app, Method::GET, "/api/packages", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let kelas = body
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == "kelas")
            .cloned()
            .unwrap();
        assert_eq!(kelas["price"], 100000);
        assert_eq!(kelas["priceLabel"], "Rp 100.000");
    }

    async fn register(app: &Router, school: &str, package: &str) {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/registrations",
            None,
            Some(json!({
                "name": "Bu Sari",
                "email": "sari@sdn1.id",
                "school": school,
                "packageType": package
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn checkout(app: &Router, package: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/create-transaction",
            None,
            Some(checkout_body(package)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["orderId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_confirm_without_payment_is_refused() {
        let state = AppState::for_tests(Arc::new(FakeGateway::ok().with_status("pending"))).await;
        let db = state.db.clone();
        let app = configure_routes(state);

        register(&app, "SD X", "sekolah").await;
        let order_id = checkout(&app, "sekolah").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/payments/confirm",
            None,
            Some(json!({ "orderId": order_id, "packageType": "sekolah" })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"], "Payment not completed");

        assert_eq!(
            crate::domain::a005_voucher::repository::count_by_order_id(&db, &order_id)
                .await
                .unwrap(),
            0
        );
        let school = crate::domain::a002_school::repository::get_by_name(&db, "SD X")
            .await
            .unwrap()
            .unwrap();
        assert!(!school.is_paid());
    }

    #[tokio::test]
    async fn test_paid_confirm_is_visible_to_super_admin() {
        let state = AppState::for_tests(Arc::new(FakeGateway::paid())).await;
        let code = system::initialization::ensure_super_admin(&state.db, Some("root@anakhebat.id"))
            .await
            .unwrap()
            .unwrap();
        let app = configure_routes(state);

        register(&app, "SD X", "sekolah").await;
        let order_id = checkout(&app, "sekolah").await;
        let (status, confirmed) = send(
            &app,
            Method::POST,
            "/api/payments/confirm",
            None,
            Some(json!({ "orderId": order_id, "packageType": "sekolah" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["alreadyIssued"], false);
        let voucher_code = confirmed["voucher"]["code"].as_str().unwrap().to_string();

        let (_, login) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "root@anakhebat.id", "accessCode": code })),
        )
        .await;
        let token = login["token"].as_str().unwrap().to_string();

        let (status, vouchers) =
            send(&app, Method::GET, "/api/admin/vouchers", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vouchers.as_array().map(Vec::len), Some(1));

        let uri = format!("/api/admin/vouchers/{}", voucher_code);
        let (status, voucher) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(voucher["orderId"], order_id.as_str());

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/admin/vouchers/AHA-ZZZZ-ZZZZ",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_config_exposes_snap_settings() {
        let app = app_with(FakeGateway::ok()).await;
        let (status, body) =
            send(&app, Method::GET, "/api/payments/client-config", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clientKey"], "");
        assert_eq!(body["isProduction"], false);
        assert_eq!(
            body["snapJsUrl"],
            "https://app.sandbox.midtrans.com/snap/snap.js"
        );
    }
}
