//! Database bootstrap: opens the sea-orm connection pool from settings and
//! applies module-contributed migrations.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use stacks_kernel::settings::DatabaseSettings;
use stacks_kernel::Migration;

const MIGRATION_LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS _migrations ( \
     id VARCHAR(255) PRIMARY KEY, \
     applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP \
     )";

/// Open a connection pool against the configured Postgres instance.
///
/// Returns an error instead of exiting so the caller decides whether a
/// failed bootstrap is fatal.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    settings.validate_for_postgres()?;

    let mut opts = ConnectOptions::new(settings.url());
    opts.max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .sqlx_logging(cfg!(debug_assertions));

    let conn = Database::connect(opts)
        .await
        .with_context(|| format!("cannot connect to database at {}:{}", settings.host, settings.port))?;

    conn.ping()
        .await
        .with_context(|| "database connection did not answer ping")?;

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "database connection established"
    );

    Ok(conn)
}

/// Apply every migration that is not yet recorded in the `_migrations`
/// ledger. Entries are keyed `{module}:{migration id}`.
pub async fn migrate(
    conn: &DatabaseConnection,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    conn.execute_unprepared(MIGRATION_LEDGER_DDL)
        .await
        .with_context(|| "failed to create migration ledger table")?;

    let applied = applied_ids(conn).await?;

    for (module, migration) in migrations {
        let key = format!("{}:{}", module, migration.id);
        if applied.contains(&key) {
            tracing::debug!(migration = %key, "migration already applied");
            continue;
        }

        tracing::info!(migration = %key, "applying migration");

        conn.execute_unprepared(migration.up)
            .await
            .with_context(|| format!("migration '{}' failed", key))?;

        // Keys are compile-time constants, so inline SQL is safe here and
        // keeps the statement portable across backends.
        conn.execute_unprepared(&format!("INSERT INTO _migrations (id) VALUES ('{}')", key))
            .await
            .with_context(|| format!("failed to record migration '{}'", key))?;
    }

    Ok(())
}

async fn applied_ids(conn: &DatabaseConnection) -> anyhow::Result<HashSet<String>> {
    let rows = conn
        .query_all(Statement::from_string(
            conn.get_database_backend(),
            "SELECT id FROM _migrations".to_string(),
        ))
        .await
        .with_context(|| "failed to read migration ledger")?;

    let mut ids = HashSet::new();
    for row in rows {
        ids.insert(row.try_get::<String>("", "id")?);
    }
    Ok(ids)
}
