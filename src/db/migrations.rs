//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- DIETS
        -- A named group of foods eaten in one meal slot
        -- ============================================
        CREATE TABLE diets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            meal_slot TEXT NOT NULL DEFAULT 'unspecified'
                CHECK(meal_slot IN ('breakfast', 'lunch', 'dinner', 'snack', 'unspecified')),
            is_shared INTEGER NOT NULL DEFAULT 0, -- boolean, published to the community feed

            -- Metadata
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_diets_date ON diets(date);
        CREATE INDEX idx_diets_slot ON diets(meal_slot);

        -- ============================================
        -- DIET FOODS
        -- Foods in a diet, with the snapshot amounts rescale from
        -- ============================================
        CREATE TABLE diet_foods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            diet_id INTEGER NOT NULL REFERENCES diets(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,           -- display order within the diet
            name TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'manual' CHECK(source IN ('database', 'manual')),
            amount_g REAL NOT NULL,

            -- Snapshot (never touched by amount edits); NULL = not provided
            original_amount_g REAL NOT NULL,
            original_energy_kcal REAL NOT NULL DEFAULT 0,
            original_carb_g REAL,
            original_protein_g REAL,
            original_fat_g REAL,
            original_fiber_g REAL,
            original_sugar_g REAL,
            original_sodium_mg REAL,

            -- Values for amount_g; NULL = not provided
            energy_kcal REAL NOT NULL DEFAULT 0,
            carb_g REAL,
            protein_g REAL,
            fat_g REAL,
            fiber_g REAL,
            sugar_g REAL,
            sodium_mg REAL,

            -- Metadata
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_diet_foods_diet ON diet_foods(diet_id, position);

        -- ============================================
        -- BODY PROFILE
        -- Single row: body metrics and the daily target
        -- ============================================
        CREATE TABLE body_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            weight_kg REAL NOT NULL,
            height_cm REAL NOT NULL,
            age INTEGER NOT NULL,
            sex TEXT NOT NULL CHECK(sex IN ('male', 'female')),
            activity_level TEXT NOT NULL
                CHECK(activity_level IN ('very_low', 'low', 'medium', 'high', 'very_high')),
            goal TEXT NOT NULL CHECK(goal IN ('lose_weight', 'gain_muscle', 'maintain_weight')),

            -- Daily target, derived from the metrics unless entered by hand
            target_energy_kcal REAL NOT NULL,
            target_carb_g REAL NOT NULL,
            target_protein_g REAL NOT NULL,
            target_fat_g REAL NOT NULL,
            target_fiber_g REAL NOT NULL,
            target_sugar_g REAL NOT NULL,
            target_sodium_mg REAL NOT NULL,
            target_is_manual INTEGER NOT NULL DEFAULT 0, -- boolean

            -- Metadata
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_schema_has_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('diets', 'diet_foods', 'body_profile')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }
}
