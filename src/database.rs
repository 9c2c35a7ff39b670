use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

pub struct Database {
    pub(crate) conn: DatabaseConnection,
}

/// Outcome of a lookup that expects at most one matching row.
///
/// `Many` means the table holds rows that should have been unique and is
/// treated as a data error by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleRow<T> {
    NotFound,
    One(T),
    Many(usize),
}

impl<T> SingleRow<T> {
    pub fn from_rows(mut rows: Vec<T>) -> Self {
        match rows.len() {
            0 => SingleRow::NotFound,
            1 => match rows.pop() {
                Some(row) => SingleRow::One(row),
                None => SingleRow::NotFound,
            },
            n => SingleRow::Many(n),
        }
    }
}

impl Database {
    /// Open or create a database at the given path and bring its schema up to date
    pub async fn open(path: &Path) -> Result<Self> {
        let database = Self::connect(path).await?;
        database.run_migrations().await?;
        log::info!("Database ready at: {}", path.display());
        Ok(database)
    }

    /// Open or create a database at the given path without running migrations
    pub async fn connect(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(60))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        conn.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .context("Failed to enable foreign keys")?;

        Ok(Database { conn })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        log::debug!("Running database migrations");
        migration::Migrator::up(&self.conn, None)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Names of migrations that have not been applied yet
    pub async fn pending_migrations(&self) -> Result<Vec<String>> {
        let pending = migration::Migrator::get_pending_migrations(&self.conn)
            .await
            .context("Failed to read migration status")?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    }
}
