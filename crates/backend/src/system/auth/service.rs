use anyhow::Result;
use chrono::Utc;
use contracts::system::auth::{LoginResponse, Session};
use sea_orm::ConnectionTrait;

use super::{jwt, password, session_repository};
use crate::domain::a004_user::repository as user_repository;

/// Verify email + access code; on success open a session and sign a token.
/// Returns None for unknown email, inactive account or wrong code.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    jwt_secret: &str,
    email: &str,
    access_code: &str,
) -> Result<Option<LoginResponse>> {
    let Some((user, hash)) = user_repository::get_by_email_with_hash(db, email).await? else {
        return Ok(None);
    };
    if !password::verify_access_code(access_code.trim(), &hash)? {
        tracing::warn!("Wrong access code for {}", user.email);
        return Ok(None);
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let expires_at = Utc::now() + chrono::Duration::hours(jwt::ACCESS_TOKEN_LIFETIME_HOURS);
    session_repository::create(db, &session_id, &user.id.to_string(), expires_at).await?;

    let token = jwt::generate_access_token(jwt_secret, &user, &session_id)?;
    tracing::info!("{} signed in as {}", user.email, user.role());

    Ok(Some(LoginResponse {
        token,
        session: Session {
            session_id,
            user_id: user.id.to_string(),
            role: user.role(),
            school_name: user.school_name,
        },
    }))
}

pub async fn logout<C: ConnectionTrait>(db: &C, session: &Session) -> Result<()> {
    session_repository::revoke(db, &session.session_id).await?;
    tracing::info!("Session {} closed", session.session_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a004_user::aggregate::{Profile, Role, UserRecord};

    async fn seed_admin<C: ConnectionTrait>(db: &C) -> UserRecord {
        let user = UserRecord::new_for_insert(
            Some("SD 1".into()),
            "Bu Sari".into(),
            "sari@sd1.id".into(),
            None,
            Profile::SchoolAdmin,
        );
        let hash = password::hash_access_code("12345678").unwrap();
        user_repository::insert(db, &user, &hash).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_login_opens_session_and_logout_closes_it() {
        let db = connect_in_memory().await;
        let user = seed_admin(&db).await;

        let response = login(&db, "secret", "SARI@sd1.id", "12345678")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.session.role, Role::SchoolAdmin);
        assert_eq!(response.session.school_name.as_deref(), Some("SD 1"));
        let user_id = user.id.to_string();
        assert!(
            session_repository::is_active(&db, &response.session.session_id, &user_id)
                .await
                .unwrap()
        );

        let claims = jwt::validate_token("secret", &response.token).unwrap();
        assert_eq!(claims.sid, response.session.session_id);

        logout(&db, &response.session).await.unwrap();
        assert!(
            !session_repository::is_active(&db, &response.session.session_id, &user_id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_wrong_code_or_email_is_rejected() {
        let db = connect_in_memory().await;
        seed_admin(&db).await;
        assert!(login(&db, "secret", "sari@sd1.id", "00000000")
            .await
            .unwrap()
            .is_none());
        assert!(login(&db, "secret", "nobody@sd1.id", "12345678")
            .await
            .unwrap()
            .is_none());
    }
}
