use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement,
};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_CATEGORY_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a001_category (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        image TEXT,
        parent_id TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    );
"#;

const CREATE_CATEGORY_PARENT_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_a001_category_parent ON a001_category (parent_id);
"#;

const CREATE_PAGE_SECTION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a002_page_section (
        page_id TEXT PRIMARY KEY NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        max_categories_to_display INTEGER NOT NULL DEFAULT 0,
        layout TEXT NOT NULL DEFAULT 'grid',
        show_subcategories_on_hover INTEGER NOT NULL DEFAULT 1,
        entries_json TEXT NOT NULL DEFAULT '[]',
        modified_by TEXT,
        last_modified TEXT NOT NULL
    );
"#;

const CREATE_SYSTEM_LOG_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS system_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        source TEXT NOT NULL,
        category TEXT NOT NULL,
        message TEXT NOT NULL
    );
"#;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Opening database: {}", db_url);

    let conn = Database::connect(&db_url).await?;
    ensure_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Create tables that do not exist yet. Safe to call repeatedly.
pub async fn ensure_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    for sql in [
        CREATE_CATEGORY_TABLE,
        CREATE_CATEGORY_PARENT_INDEX,
        CREATE_PAGE_SECTION_TABLE,
        CREATE_SYSTEM_LOG_TABLE,
    ] {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// In-memory database with the full schema, one connection so every query
/// sees the same data.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    ensure_schema(&conn).await.expect("schema");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/db/app.db")),
            "sqlite:///var/db/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let conn = test_connection().await;
        ensure_schema(&conn).await.unwrap();
    }
}
