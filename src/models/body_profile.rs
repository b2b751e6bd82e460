//! Body profile model
//!
//! Single-row store for body metrics and the daily target derived from them.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{calculate, ActivityLevel, BodyMetrics, Goal, Sex, TargetProfile};

/// Stored body metrics and daily target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyProfile {
    pub metrics: BodyMetrics,
    pub target: TargetProfile,
    /// Target was entered by hand; metric-driven recomputation is off until
    /// the metrics change again
    pub target_is_manual: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Read a text column through a parser, failing on values it does not know
fn parse_column<T>(row: &Row, column: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let value: String = row.get(column)?;
    match parse(&value) {
        Some(parsed) => Ok(parsed),
        None => Err(rusqlite::Error::FromSqlConversionFailure(
            row.as_ref().column_index(column)?,
            Type::Text,
            format!("unknown {} '{}'", column, value).into(),
        )),
    }
}

impl BodyProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let metrics = BodyMetrics {
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            age: row.get("age")?,
            sex: parse_column(row, "sex", Sex::from_str)?,
            activity_level: parse_column(row, "activity_level", ActivityLevel::from_str)?,
            goal: parse_column(row, "goal", Goal::from_str)?,
        };

        Ok(Self {
            metrics,
            target: TargetProfile {
                energy_kcal: row.get("target_energy_kcal")?,
                carb_g: row.get("target_carb_g")?,
                protein_g: row.get("target_protein_g")?,
                fat_g: row.get("target_fat_g")?,
                fiber_g: row.get("target_fiber_g")?,
                sugar_g: row.get("target_sugar_g")?,
                sodium_mg: row.get("target_sodium_mg")?,
            },
            target_is_manual: row.get::<_, i64>("target_is_manual")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM body_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store body metrics and replace the target with a freshly derived one
    ///
    /// This always clears a manual target.
    pub fn set_metrics(conn: &Connection, metrics: &BodyMetrics) -> DbResult<Self> {
        let target = calculate(metrics);
        conn.execute(
            r#"
            INSERT INTO body_profile (
                id, weight_kg, height_cm, age, sex, activity_level, goal,
                target_energy_kcal, target_carb_g, target_protein_g, target_fat_g,
                target_fiber_g, target_sugar_g, target_sodium_mg, target_is_manual
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0)
            ON CONFLICT(id) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age = excluded.age,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                goal = excluded.goal,
                target_energy_kcal = excluded.target_energy_kcal,
                target_carb_g = excluded.target_carb_g,
                target_protein_g = excluded.target_protein_g,
                target_fat_g = excluded.target_fat_g,
                target_fiber_g = excluded.target_fiber_g,
                target_sugar_g = excluded.target_sugar_g,
                target_sodium_mg = excluded.target_sodium_mg,
                target_is_manual = 0,
                updated_at = datetime('now')
            "#,
            params![
                metrics.weight_kg,
                metrics.height_cm,
                metrics.age,
                metrics.sex.as_str(),
                metrics.activity_level.as_str(),
                metrics.goal.as_str(),
                target.energy_kcal,
                target.carb_g,
                target.protein_g,
                target.fat_g,
                target.fiber_g,
                target.sugar_g,
                target.sodium_mg,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| DbError::NotFound("Body profile".to_string()))
    }

    /// Overwrite the target by hand
    ///
    /// Requires stored metrics; returns `Ok(None)` when there is no profile yet.
    pub fn set_manual_target(conn: &Connection, target: &TargetProfile) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE body_profile SET
                target_energy_kcal = ?1,
                target_carb_g = ?2,
                target_protein_g = ?3,
                target_fat_g = ?4,
                target_fiber_g = ?5,
                target_sugar_g = ?6,
                target_sodium_mg = ?7,
                target_is_manual = 1,
                updated_at = datetime('now')
            WHERE id = 1
            "#,
            params![
                target.energy_kcal,
                target.carb_g,
                target.protein_g,
                target.fat_g,
                target.fiber_g,
                target.sugar_g,
                target.sodium_mg,
            ],
        )?;

        Self::get(conn)
    }

    /// Re-derive the target from the stored metrics unless it is manual
    ///
    /// Returns whether the target was rewritten.
    pub fn recompute(conn: &Connection) -> DbResult<bool> {
        match Self::get(conn)? {
            Some(profile) if !profile.target_is_manual => {
                Self::set_metrics(conn, &profile.metrics)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn metrics() -> BodyMetrics {
        BodyMetrics {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 30,
            sex: Sex::Male,
            activity_level: ActivityLevel::Medium,
            goal: Goal::MaintainWeight,
        }
    }

    #[test]
    fn test_empty_profile() {
        let conn = setup();
        assert!(BodyProfile::get(&conn).unwrap().is_none());
        assert!(BodyProfile::set_manual_target(&conn, &TargetProfile::default()).unwrap().is_none());
        assert!(!BodyProfile::recompute(&conn).unwrap());
    }

    #[test]
    fn test_set_metrics_derives_target() {
        let conn = setup();
        let profile = BodyProfile::set_metrics(&conn, &metrics()).unwrap();

        assert_eq!(profile.metrics, metrics());
        assert_eq!(profile.target, calculate(&metrics()));
        assert!(!profile.target_is_manual);
    }

    #[test]
    fn test_manual_target_until_metrics_change() {
        let conn = setup();
        BodyProfile::set_metrics(&conn, &metrics()).unwrap();

        let manual = TargetProfile {
            energy_kcal: 1800.0,
            carb_g: 200.0,
            protein_g: 120.0,
            fat_g: 50.0,
            fiber_g: 28.0,
            sugar_g: 20.0,
            sodium_mg: 2000.0,
        };
        let profile = BodyProfile::set_manual_target(&conn, &manual).unwrap().unwrap();
        assert!(profile.target_is_manual);
        assert_eq!(profile.target, manual);

        // Recompute leaves a manual target alone
        assert!(!BodyProfile::recompute(&conn).unwrap());
        assert_eq!(BodyProfile::get(&conn).unwrap().unwrap().target, manual);

        // New metrics replace it wholesale
        let mut heavier = metrics();
        heavier.weight_kg = 80.0;
        let profile = BodyProfile::set_metrics(&conn, &heavier).unwrap();
        assert!(!profile.target_is_manual);
        assert_eq!(profile.target, calculate(&heavier));
    }

    #[test]
    fn test_unknown_stored_values_are_errors() {
        let conn = setup();
        BodyProfile::set_metrics(&conn, &metrics()).unwrap();

        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             UPDATE body_profile SET goal = 'bulk' WHERE id = 1;
             PRAGMA ignore_check_constraints = OFF;",
        )
        .unwrap();

        let err = BodyProfile::get(&conn).unwrap_err();
        assert!(err.to_string().contains("bulk"), "unexpected error: {}", err);
        assert!(BodyProfile::recompute(&conn).is_err());
    }
}
