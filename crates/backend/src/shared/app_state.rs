use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::shared::config::Config;
use crate::shared::payment::PaymentGateway;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Arc<Config>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        config: Config,
        jwt_secret: String,
    ) -> Self {
        Self {
            db,
            gateway,
            config: Arc::new(config),
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    /// In-memory database, default config and the given gateway
    #[cfg(test)]
    pub async fn for_tests(gateway: Arc<dyn PaymentGateway>) -> Self {
        let db = crate::shared::data::db::connect_in_memory().await;
        Self::new(
            db,
            gateway,
            crate::shared::config::default_config(),
            "test-secret".to_string(),
        )
    }
}
