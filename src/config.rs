//! Runtime configuration
//!
//! The database location is the only setting; logging reads `RUST_LOG`.

use std::path::PathBuf;

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "MEOKPT_DATABASE_PATH";

/// Get the database path from environment or use default
///
/// The default is `<project>/data/meokpt.db`, found by walking up from
/// `target/release` or `target/debug` when run from a cargo build.
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("meokpt.db");
            path
        })
}

/// Open the database at the configured path, creating the directory and
/// applying migrations
pub fn open_database() -> Result<(PathBuf, crate::db::Database), Box<dyn std::error::Error>> {
    let db_path = database_path();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = crate::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        crate::db::migrations::run_migrations(conn)?;
        let version = crate::db::migrations::get_schema_version(conn)?;
        tracing::info!(version, path = %db_path.display(), "Database ready");
        Ok(())
    })?;

    Ok((db_path, database))
}
