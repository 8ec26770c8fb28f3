use contracts::domain::a001_vehicle::aggregate::Vehicle;
use contracts::domain::a002_sale::aggregate::Sale;
use contracts::domain::common::AggregateRoot;
use once_cell::sync::{Lazy, OnceCell};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use tokio::sync::{Mutex, MutexGuard};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Пишущие сценарии выполняются по одному, у SQLite один писатель
static WRITE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    // Минимальный bootstrap схемы
    let vehicle_table = Vehicle::full_name();
    ensure_table(
        &conn,
        &vehicle_table,
        &format!(
            r#"
            CREATE TABLE {} (
                id TEXT PRIMARY KEY NOT NULL,
                code TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL,
                comment TEXT,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                price REAL NOT NULL DEFAULT 0,
                color TEXT NOT NULL DEFAULT '',
                vin TEXT,
                status TEXT NOT NULL DEFAULT 'available',
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
            "#,
            vehicle_table
        ),
    )
    .await?;

    let sale_table = Sale::full_name();
    ensure_table(
        &conn,
        &sale_table,
        &format!(
            r#"
            CREATE TABLE {} (
                id TEXT PRIMARY KEY NOT NULL,
                code TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL,
                comment TEXT,
                customer_name TEXT NOT NULL,
                sale_date TEXT NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'active',
                lines_json TEXT,
                total REAL NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
            "#,
            sale_table
        ),
    )
    .await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Создать таблицу, если её ещё нет в sqlite_master
async fn ensure_table(
    conn: &DatabaseConnection,
    table_name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    let check_sql = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        table_name
    );
    let existing = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check_sql))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table_name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    } else {
        tracing::debug!("Table {} already exists", table_name);
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Захват права на запись. Держать до `commit()` транзакции.
pub async fn lock_writes() -> MutexGuard<'static, ()> {
    WRITE_LOCK.lock().await
}
