//! Diet model
//!
//! A named group of foods eaten in one meal slot on one date.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{aggregate, DailyAggregate, FoodItem, MealSlot, NutrientProfile};
use super::DietFood;

/// A stored diet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diet {
    pub id: i64,
    pub title: String,
    pub date: String,  // ISO date: "2025-01-09"
    pub meal_slot: MealSlot,
    pub is_shared: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a diet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietCreate {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub meal_slot: MealSlot,
    #[serde(default)]
    pub is_shared: bool,
    pub notes: Option<String>,
}

/// Data for updating a diet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietUpdate {
    pub title: Option<String>,
    pub date: Option<String>,
    pub meal_slot: Option<MealSlot>,
    pub is_shared: Option<bool>,
    pub notes: Option<String>,
}

impl Diet {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let slot: String = row.get("meal_slot")?;
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            date: row.get("date")?,
            meal_slot: MealSlot::from_str(&slot),
            is_shared: row.get::<_, i64>("is_shared")? != 0,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new diet
    pub fn create(conn: &Connection, data: &DietCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO diets (title, date, meal_slot, is_shared, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.title,
                data.date,
                data.meal_slot.as_str(),
                data.is_shared as i64,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Diet {}", id)))
    }

    /// Get a diet by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diets WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(diet) => Ok(Some(diet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All diets on a date, in meal slot order
    pub fn list_for_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM diets WHERE date = ?1
            ORDER BY CASE meal_slot
                WHEN 'breakfast' THEN 0
                WHEN 'lunch' THEN 1
                WHEN 'dinner' THEN 2
                WHEN 'snack' THEN 3
                ELSE 4
            END, id
            "#
        )?;

        let diets = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(diets)
    }

    /// List diets with optional date range and shared filter
    pub fn list(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
        shared_only: bool,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM diets WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        if shared_only {
            sql.push_str(" AND is_shared = 1");
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        params_vec.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let diets = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(diets)
    }

    /// Count diets with optional date range and shared filter
    pub fn count(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
        shared_only: bool,
    ) -> DbResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM diets WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        if shared_only {
            sql.push_str(" AND is_shared = 1");
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Update a diet
    pub fn update(conn: &Connection, id: i64, data: &DietUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = data.title {
            updates.push(format!("title = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(title.clone()));
        }
        if let Some(ref date) = data.date {
            updates.push(format!("date = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(date.clone()));
        }
        if let Some(slot) = data.meal_slot {
            updates.push(format!("meal_slot = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(slot.as_str().to_string()));
        }
        if let Some(shared) = data.is_shared {
            updates.push(format!("is_shared = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(shared as i64));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE diets SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a diet and its foods
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diets WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Foods in display order, as engine food items
    pub fn foods(conn: &Connection, id: i64) -> DbResult<Vec<FoodItem>> {
        let rows = DietFood::list_for_diet(conn, id)?;
        Ok(rows.into_iter().map(DietFood::into_food_item).collect())
    }

    /// Computed nutrient total for a diet
    pub fn total(conn: &Connection, id: i64) -> DbResult<NutrientProfile> {
        Ok(aggregate(&Self::foods(conn, id)?))
    }
}

/// Collect every diet on a date into a daily aggregate
pub fn load_daily_aggregate(conn: &Connection, date: &str) -> DbResult<(Vec<Diet>, DailyAggregate)> {
    let diets = Diet::list_for_date(conn, date)?;

    let mut day = DailyAggregate::new();
    for diet in &diets {
        day.add_foods(diet.meal_slot, Diet::foods(conn, diet.id)?);
    }

    Ok((diets, day))
}
