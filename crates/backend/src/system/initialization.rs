use anyhow::Result;
use contracts::domain::a004_user::aggregate::{Profile, Role, UserRecord};
use sea_orm::ConnectionTrait;

use crate::domain::a004_user::repository as user_repository;
use crate::shared::codes::generate_access_code;
use crate::system::auth::password::hash_access_code;

/// Ensure a super admin exists (create one if none).
/// Returns the access code when an account was created; it is shown only once.
pub async fn ensure_super_admin<C: ConnectionTrait>(
    db: &C,
    email: Option<&str>,
) -> Result<Option<String>> {
    if user_repository::count_by_role(db, Role::SuperAdmin).await? > 0 {
        return Ok(None);
    }
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        tracing::warn!("No super admin exists and auth.super_admin_email is not set");
        return Ok(None);
    };

    let user = UserRecord::new_for_insert(
        None,
        "Super Admin".to_string(),
        email.to_string(),
        None,
        Profile::SuperAdmin,
    );
    user.validate().map_err(anyhow::Error::msg)?;

    let code = generate_access_code();
    let hash = hash_access_code(&code)?;
    user_repository::insert(db, &user, &hash).await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Super admin created: {}", user.email);
    tracing::warn!("  Access code: {}", code);
    tracing::warn!("  This code is shown once; store it now.");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use crate::system::auth::service;

    #[tokio::test]
    async fn test_super_admin_is_seeded_once() {
        let db = connect_in_memory().await;
        assert!(ensure_super_admin(&db, None).await.unwrap().is_none());

        let code = ensure_super_admin(&db, Some("root@anakhebat.id"))
            .await
            .unwrap()
            .unwrap();
        assert!(ensure_super_admin(&db, Some("other@anakhebat.id"))
            .await
            .unwrap()
            .is_none());

        let login = service::login(&db, "secret", "root@anakhebat.id", &code)
            .await
            .unwrap()
            .unwrap();
        assert!(login.session.is_super_admin());
        assert!(login.session.school_name.is_none());
    }
}
