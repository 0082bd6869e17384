use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use std::path::Path;

/// Schema bootstrap, one statement per entry. Safe to run on every start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sys_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS sys_session (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS a002_school (
        school_name TEXT PRIMARY KEY NOT NULL,
        admin_email TEXT NOT NULL,
        package_id TEXT NOT NULL,
        payment_status TEXT NOT NULL DEFAULT 'unpaid',
        class_count INTEGER NOT NULL DEFAULT 0,
        user_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS a003_class (
        id TEXT PRIMARY KEY NOT NULL,
        school_name TEXT NOT NULL,
        name TEXT NOT NULL,
        capacity INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (school_name, name)
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS a004_user (
        id TEXT PRIMARY KEY NOT NULL,
        school_name TEXT,
        role TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        class_ref TEXT,
        nis TEXT,
        parent_email TEXT,
        nip TEXT,
        phone TEXT,
        child_nis TEXT,
        access_code_hash TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_a004_user_school_role ON a004_user (school_name, role)",
    r#"
    CREATE TABLE IF NOT EXISTS a005_voucher (
        code TEXT PRIMARY KEY NOT NULL,
        order_id TEXT NOT NULL UNIQUE,
        package_id TEXT NOT NULL,
        package_name TEXT NOT NULL,
        price INTEGER NOT NULL,
        accounts INTEGER NOT NULL,
        customer_name TEXT NOT NULL,
        customer_email TEXT NOT NULL,
        customer_phone TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'paid',
        redeemed INTEGER NOT NULL DEFAULT 0,
        redeemed_by TEXT,
        created_at TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS a006_habit_log (
        id TEXT PRIMARY KEY NOT NULL,
        school_name TEXT NOT NULL,
        date TEXT NOT NULL,
        class_name TEXT NOT NULL,
        student_id TEXT NOT NULL,
        student_name TEXT NOT NULL,
        completed_count INTEGER NOT NULL DEFAULT 0,
        habits TEXT NOT NULL DEFAULT '{}',
        notes TEXT,
        created_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_a006_habit_log_school_date ON a006_habit_log (school_name, date)",
    r#"
    CREATE TABLE IF NOT EXISTS a007_payment_order (
        order_id TEXT PRIMARY KEY NOT NULL,
        package_id TEXT NOT NULL,
        gross_amount INTEGER NOT NULL,
        customer_name TEXT NOT NULL,
        customer_email TEXT NOT NULL,
        customer_phone TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
];

/// Open (or create) the SQLite file and make sure every table exists
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database at {}", absolute_path.display());
    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    // Writers queue on the WAL write lock instead of failing while readers are open
    conn.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for sql in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    tracing::info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}

/// SQLite reports both primary key and UNIQUE index conflicts this way
pub fn is_unique_violation(err: &DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

/// Same check for errors already wrapped by a repository
pub fn is_unique_violation_any(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.to_string().contains("UNIQUE constraint failed"))
}

/// Single-connection in-memory database with the full schema
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    bootstrap_schema(&conn).await.expect("schema bootstrap");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = connect_in_memory().await;
        bootstrap_schema(&conn).await.unwrap();
        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name".to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.try_get::<String>("", "name").unwrap())
            .collect();
        for expected in [
            "a002_school",
            "a003_class",
            "a004_user",
            "a005_voucher",
            "a006_habit_log",
            "a007_payment_order",
            "sys_session",
            "sys_settings",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[tokio::test]
    async fn test_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = initialize_database(&dir.path().join("nested/app.db"))
            .await
            .unwrap();
        let row = conn
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "PRAGMA journal_mode".to_string(),
            ))
            .await
            .unwrap()
            .unwrap();
        let mode: String = row.try_get("", "journal_mode").unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn test_unique_violation_detection() {
        let conn = connect_in_memory().await;
        let insert = "INSERT INTO sys_settings (key, value, created_at, updated_at) VALUES ('k', 'v', 'now', 'now')";
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, insert.to_string()))
            .await
            .unwrap();
        let err = conn
            .execute(Statement::from_string(DatabaseBackend::Sqlite, insert.to_string()))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
