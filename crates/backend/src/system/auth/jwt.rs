use anyhow::{Context, Result};
use chrono::Utc;
use contracts::domain::a004_user::aggregate::UserRecord;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

pub const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;

const JWT_SECRET_KEY: &str = "jwt_secret";

/// Generate JWT access token bound to a session row
pub fn generate_access_token(secret: &str, user: &UserRecord, session_id: &str) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: user.id.to_string(),
        sid: session_id.to_string(),
        role: user.role(),
        school: user.school_name.clone(),
        exp,
        iat,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")?;

    Ok(token)
}

/// Validate JWT token and extract claims
pub fn validate_token(secret: &str, token: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Configured secret, else the one stored in sys_settings, else a new one
pub async fn get_or_create_jwt_secret<C: ConnectionTrait>(
    db: &C,
    configured: Option<&str>,
) -> Result<String> {
    if let Some(secret) = configured.filter(|s| !s.trim().is_empty()) {
        return Ok(secret.to_string());
    }
    if let Some(secret) = get_jwt_secret_from_db(db).await? {
        return Ok(secret);
    }
    let secret = generate_jwt_secret();
    save_jwt_secret_to_db(db, &secret).await?;
    tracing::info!("Generated a new JWT secret");
    Ok(secret)
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db<C: ConnectionTrait>(db: &C) -> Result<Option<String>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db<C: ConnectionTrait>(db: &C, secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            JWT_SECRET_KEY.into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a004_user::aggregate::{Profile, Role};

    #[tokio::test]
    async fn test_secret_is_created_once() {
        let db = connect_in_memory().await;
        let first = get_or_create_jwt_secret(&db, None).await.unwrap();
        let second = get_or_create_jwt_secret(&db, None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            get_or_create_jwt_secret(&db, Some("from-config")).await.unwrap(),
            "from-config"
        );
    }

    #[test]
    fn test_token_round_trip_carries_session() {
        let user = UserRecord::new_for_insert(
            Some("SD 1".into()),
            "Bu Sari".into(),
            "sari@sd1.id".into(),
            None,
            Profile::SchoolAdmin,
        );
        let token = generate_access_token("secret", &user, "sid-1").unwrap();
        let claims = validate_token("secret", &token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.sid, "sid-1");
        assert_eq!(claims.role, Role::SchoolAdmin);
        assert_eq!(claims.school.as_deref(), Some("SD 1"));
        assert!(validate_token("other", &token).is_err());
    }
}
