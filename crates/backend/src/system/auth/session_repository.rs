use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// Fixed-width UTC timestamps so `expires_at` compares as text
fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    session_id: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_session (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        [
            session_id.into(),
            user_id.into(),
            stamp(Utc::now()).into(),
            stamp(expires_at).into(),
        ],
    ))
    .await?;
    Ok(())
}

/// Session row exists, belongs to `user_id` and has not expired
pub async fn is_active<C: ConnectionTrait>(db: &C, session_id: &str, user_id: &str) -> Result<bool> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT id FROM sys_session WHERE id = ? AND user_id = ? AND expires_at > ?",
            [session_id.into(), user_id.into(), stamp(Utc::now()).into()],
        ))
        .await?;
    Ok(row.is_some())
}

pub async fn revoke<C: ConnectionTrait>(db: &C, session_id: &str) -> Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_session WHERE id = ?",
            [session_id.into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Drops expired rows; returns how many were removed
pub async fn purge_expired<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_session WHERE expires_at <= ?",
            [stamp(Utc::now()).into()],
        ))
        .await?;
    Ok(result.rows_affected())
}
