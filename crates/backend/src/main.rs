use std::net::SocketAddr;
use std::sync::Arc;

use backend::shared::app_state::AppState;
use backend::shared::config::{get_database_path, load_config};
use backend::shared::data::db::initialize_database;
use backend::shared::payment::{MidtransSnapClient, PaymentGateway};
use backend::system;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;
    let db_path = get_database_path(&config)?;
    let db = initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let jwt_secret =
        system::auth::jwt::get_or_create_jwt_secret(&db, config.auth.jwt_secret.as_deref())
            .await?;

    // Ensure a super admin exists
    system::initialization::ensure_super_admin(&db, config.auth.super_admin_email.as_deref())
        .await?;

    let removed = system::auth::session_repository::purge_expired(&db).await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    let gateway: Arc<dyn PaymentGateway> = Arc::new(MidtransSnapClient::new(&config.midtrans)?);

    let port = config.server.port;
    let state = AppState::new(db, gateway, config, jwt_secret);
    let app = backend::routes::configure_routes(state);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
