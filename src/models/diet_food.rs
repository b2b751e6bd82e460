//! Diet food model
//!
//! A food stored in a diet, together with the snapshot its amount rescales from.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{Channel, FoodItem, FoodSource, NutrientProfile};

/// A stored diet food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietFood {
    pub id: i64,
    pub diet_id: i64,
    pub position: i64,
    pub food: FoodItem,
    pub created_at: String,
    pub updated_at: String,
}

/// Read a nutrient profile from columns sharing a prefix ("" or "original_")
fn profile_from_row(row: &Row, prefix: &str) -> rusqlite::Result<NutrientProfile> {
    let col = |name: &str| format!("{}{}", prefix, name);
    Ok(NutrientProfile {
        energy_kcal: row.get(col("energy_kcal").as_str())?,
        carb_g: row.get(col("carb_g").as_str())?,
        protein_g: row.get(col("protein_g").as_str())?,
        fat_g: row.get(col("fat_g").as_str())?,
        fiber_g: row.get(col("fiber_g").as_str())?,
        sugar_g: row.get(col("sugar_g").as_str())?,
        sodium_mg: row.get(col("sodium_mg").as_str())?,
    })
}

impl DietFood {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let source: String = row.get("source")?;
        Ok(Self {
            id: row.get("id")?,
            diet_id: row.get("diet_id")?,
            position: row.get("position")?,
            food: FoodItem {
                id: row.get("id")?,
                name: row.get("name")?,
                source: FoodSource::from_str(&source),
                amount_g: row.get("amount_g")?,
                nutrients: profile_from_row(row, "")?,
                original_amount_g: row.get("original_amount_g")?,
                original_nutrients: profile_from_row(row, "original_")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The engine food item, carrying the stored row id
    pub fn into_food_item(self) -> FoodItem {
        self.food
    }

    /// Append a food to the end of a diet
    pub fn add(conn: &Connection, diet_id: i64, food: &FoodItem) -> DbResult<Self> {
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM diet_foods WHERE diet_id = ?1",
            [diet_id],
            |row| row.get(0),
        )?;

        let n = &food.nutrients;
        let o = &food.original_nutrients;
        conn.execute(
            r#"
            INSERT INTO diet_foods (
                diet_id, position, name, source, amount_g,
                original_amount_g, original_energy_kcal, original_carb_g, original_protein_g,
                original_fat_g, original_fiber_g, original_sugar_g, original_sodium_mg,
                energy_kcal, carb_g, protein_g, fat_g, fiber_g, sugar_g, sodium_mg
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                diet_id,
                position,
                food.name,
                food.source.as_str(),
                food.amount_g,
                food.original_amount_g,
                o.energy_kcal,
                o.carb_g,
                o.protein_g,
                o.fat_g,
                o.fiber_g,
                o.sugar_g,
                o.sodium_mg,
                n.energy_kcal,
                n.carb_g,
                n.protein_g,
                n.fat_g,
                n.fiber_g,
                n.sugar_g,
                n.sodium_mg,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Diet food {}", id)))
    }

    /// Get a diet food by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diet_foods WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(food) => Ok(Some(food)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All foods of a diet in display order
    pub fn list_for_diet(conn: &Connection, diet_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM diet_foods WHERE diet_id = ?1 ORDER BY position, id"
        )?;

        let foods = stmt
            .query_map([diet_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(foods)
    }

    /// Write name, amount, snapshot and current values back to the row
    fn save(conn: &Connection, id: i64, food: &FoodItem) -> DbResult<()> {
        let n = &food.nutrients;
        let o = &food.original_nutrients;
        conn.execute(
            r#"
            UPDATE diet_foods SET
                name = ?1,
                amount_g = ?2,
                original_amount_g = ?3,
                original_energy_kcal = ?4,
                original_carb_g = ?5,
                original_protein_g = ?6,
                original_fat_g = ?7,
                original_fiber_g = ?8,
                original_sugar_g = ?9,
                original_sodium_mg = ?10,
                energy_kcal = ?11,
                carb_g = ?12,
                protein_g = ?13,
                fat_g = ?14,
                fiber_g = ?15,
                sugar_g = ?16,
                sodium_mg = ?17,
                updated_at = datetime('now')
            WHERE id = ?18
            "#,
            params![
                food.name,
                food.amount_g,
                food.original_amount_g,
                o.energy_kcal,
                o.carb_g,
                o.protein_g,
                o.fat_g,
                o.fiber_g,
                o.sugar_g,
                o.sodium_mg,
                n.energy_kcal,
                n.carb_g,
                n.protein_g,
                n.fat_g,
                n.fiber_g,
                n.sugar_g,
                n.sodium_mg,
                id,
            ],
        )?;
        Ok(())
    }

    /// Change the amount, rescaling from the stored snapshot
    pub fn set_amount(conn: &Connection, id: i64, amount_g: f64) -> DbResult<Option<Self>> {
        let Some(mut row) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        row.food.set_amount(amount_g);
        Self::save(conn, id, &row.food)?;

        Self::get_by_id(conn, id)
    }

    /// Overwrite one nutrient for the current amount
    pub fn set_nutrient(
        conn: &Connection,
        id: i64,
        channel: Channel,
        value: Option<f64>,
    ) -> DbResult<Option<Self>> {
        let Some(mut row) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        row.food.set_nutrient(channel, value);
        Self::save(conn, id, &row.food)?;

        Self::get_by_id(conn, id)
    }

    /// Recompute every food of a diet from its snapshot at its current amount
    ///
    /// Returns the number of rows rewritten.
    pub fn rescale_all_for_diet(conn: &Connection, diet_id: i64) -> DbResult<usize> {
        let rows = Self::list_for_diet(conn, diet_id)?;
        for row in &rows {
            let mut food = row.food.clone();
            food.set_amount(food.amount_g);
            Self::save(conn, row.id, &food)?;
        }
        Ok(rows.len())
    }

    /// Remove a food from its diet
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diet_foods WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Diet, DietCreate};
    use crate::nutrition::MealSlot;

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let diet = Diet::create(&conn, &DietCreate {
            title: "lunch".to_string(),
            date: "2025-03-01".to_string(),
            meal_slot: MealSlot::Lunch,
            is_shared: false,
            notes: None,
        })
        .unwrap();
        (conn, diet.id)
    }

    fn tofu_per_100g() -> NutrientProfile {
        NutrientProfile {
            energy_kcal: 76.0,
            carb_g: Some(1.9),
            protein_g: Some(8.0),
            fat_g: Some(4.8),
            fiber_g: None,
            sugar_g: None,
            sodium_mg: Some(7.0),
        }
    }

    #[test]
    fn test_add_round_trips_absent_channels() {
        let (conn, diet_id) = setup();
        let food = FoodItem::from_per_100g("tofu", tofu_per_100g(), 150.0);
        let stored = DietFood::add(&conn, diet_id, &food).unwrap();

        assert_eq!(stored.position, 0);
        assert_eq!(stored.food.id, stored.id);
        assert_eq!(stored.food.source, FoodSource::Database);
        assert_eq!(stored.food.nutrients.fiber_g, None);
        assert!((stored.food.nutrients.energy_kcal - 114.0).abs() < 1e-9);
        assert_eq!(stored.food.original_nutrients, tofu_per_100g());
    }

    #[test]
    fn test_positions_append() {
        let (conn, diet_id) = setup();
        let a = DietFood::add(&conn, diet_id, &FoodItem::manual("a", 10.0, NutrientProfile::empty())).unwrap();
        let b = DietFood::add(&conn, diet_id, &FoodItem::manual("b", 10.0, NutrientProfile::empty())).unwrap();
        assert_eq!((a.position, b.position), (0, 1));

        let names: Vec<String> = DietFood::list_for_diet(&conn, diet_id)
            .unwrap()
            .into_iter()
            .map(|f| f.food.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_set_amount_rescales_from_snapshot() {
        let (conn, diet_id) = setup();
        let stored = DietFood::add(&conn, diet_id, &FoodItem::from_per_100g("tofu", tofu_per_100g(), 100.0)).unwrap();

        DietFood::set_amount(&conn, stored.id, 150.0).unwrap();
        DietFood::set_amount(&conn, stored.id, 33.0).unwrap();
        let back = DietFood::set_amount(&conn, stored.id, 100.0).unwrap().unwrap();

        for channel in Channel::ALL {
            let (a, b) = (back.food.nutrients.get(channel), tofu_per_100g().get(channel));
            match (a, b) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9),
                (None, None) => {}
                _ => panic!("presence changed for {:?}", channel),
            }
        }
        assert!(DietFood::set_amount(&conn, 999, 1.0).unwrap().is_none());
    }

    #[test]
    fn test_set_nutrient_persists_snapshot() {
        let (conn, diet_id) = setup();
        let stored = DietFood::add(&conn, diet_id, &FoodItem::from_per_100g("tofu", tofu_per_100g(), 200.0)).unwrap();

        DietFood::set_nutrient(&conn, stored.id, Channel::Fiber, Some(1.2)).unwrap();
        let rescaled = DietFood::set_amount(&conn, stored.id, 100.0).unwrap().unwrap();
        assert!((rescaled.food.nutrients.fiber_g.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_delete_cascades_with_diet() {
        let (conn, diet_id) = setup();
        let stored = DietFood::add(&conn, diet_id, &FoodItem::manual("kimchi", 50.0, NutrientProfile::empty())).unwrap();

        Diet::delete(&conn, diet_id).unwrap();
        assert!(DietFood::get_by_id(&conn, stored.id).unwrap().is_none());
    }

    #[test]
    fn test_diet_total_uses_stored_foods() {
        let (conn, diet_id) = setup();
        DietFood::add(&conn, diet_id, &FoodItem::from_per_100g("tofu", tofu_per_100g(), 100.0)).unwrap();
        DietFood::add(&conn, diet_id, &FoodItem::manual(
            "bad entry",
            10.0,
            NutrientProfile { energy_kcal: -40.0, fiber_g: Some(2.0), ..Default::default() },
        ))
        .unwrap();

        let total = Diet::total(&conn, diet_id).unwrap();
        assert_eq!(total.energy_kcal, 76.0);
        assert_eq!(total.fiber_g, Some(2.0));
        assert_eq!(total.protein_g, Some(8.0));
    }
}
