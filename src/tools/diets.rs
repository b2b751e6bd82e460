//! Diet MCP Tools
//!
//! Tools for creating diets and editing the foods in them.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Diet, DietCreate, DietFood, DietUpdate};
use crate::nutrition::{aggregate, Channel, FoodItem, MealSlot, NutrientProfile};

/// Diet with its foods and computed total
#[derive(Debug, Serialize)]
pub struct DietDetail {
    #[serde(flatten)]
    pub diet: Diet,
    pub foods: Vec<FoodItem>,
    pub total: NutrientProfile,
    /// Total rounded for display
    pub total_rounded: NutrientProfile,
}

/// Diet summary for listing
#[derive(Debug, Serialize)]
pub struct DietSummary {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub meal_slot: String,
    pub is_shared: bool,
    pub food_count: usize,
    pub total_energy_kcal: f64,
}

/// Response for list_diets
#[derive(Debug, Serialize)]
pub struct ListDietsResponse {
    pub diets: Vec<DietSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for food edits: the changed food and the new diet total
#[derive(Debug, Serialize)]
pub struct FoodChangeResponse {
    pub diet_id: i64,
    pub food: FoodItem,
    pub diet_total: NutrientProfile,
}

/// Response for remove_food
#[derive(Debug, Serialize)]
pub struct RemoveFoodResponse {
    pub removed: bool,
    pub diet_id: i64,
    pub diet_total: NutrientProfile,
}

/// Validate an ISO date string ("2025-01-09")
pub(crate) fn validate_date(date: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

fn validate_amount(amount_g: f64) -> Result<(), String> {
    if !amount_g.is_finite() || amount_g < 0.0 {
        return Err("amount_g must be a non-negative number".to_string());
    }
    Ok(())
}

fn validate_nutrients(nutrients: &NutrientProfile) -> Result<(), String> {
    for channel in Channel::ALL {
        if let Some(value) = nutrients.get(channel) {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number", channel.as_str()));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Diet Tools
// ============================================================================

/// Create an empty diet
pub fn create_diet(
    db: &Database,
    title: &str,
    date: &str,
    meal_slot: Option<&str>,
    is_shared: bool,
    notes: Option<String>,
) -> Result<DietDetail, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title must not be empty".to_string());
    }
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = DietCreate {
        title: title.to_string(),
        date: date.to_string(),
        meal_slot: meal_slot.map(MealSlot::from_str).unwrap_or_default(),
        is_shared,
        notes,
    };

    let diet = Diet::create(&conn, &data)
        .map_err(|e| format!("Failed to create diet: {}", e))?;

    tracing::info!(diet_id = diet.id, date = %diet.date, "Created diet");

    Ok(DietDetail {
        diet,
        foods: Vec::new(),
        total: NutrientProfile::empty(),
        total_rounded: NutrientProfile::empty(),
    })
}

/// Get a diet with its foods and total
pub fn get_diet(db: &Database, id: i64) -> Result<Option<DietDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let diet = Diet::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get diet: {}", e))?;

    match diet {
        Some(diet) => {
            let foods = Diet::foods(&conn, diet.id)
                .map_err(|e| format!("Failed to get foods: {}", e))?;
            let total = aggregate(&foods);

            Ok(Some(DietDetail {
                diet,
                foods,
                total_rounded: total.rounded(),
                total,
            }))
        }
        None => Ok(None),
    }
}

/// List diets with optional date range
pub fn list_diets(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    shared_only: bool,
    limit: i64,
    offset: i64,
) -> Result<ListDietsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let diets = Diet::list(&conn, start_date, end_date, shared_only, limit, offset)
        .map_err(|e| format!("Failed to list diets: {}", e))?;

    let total = Diet::count(&conn, start_date, end_date, shared_only)
        .map_err(|e| format!("Failed to count diets: {}", e))?;

    let mut summaries = Vec::new();
    for diet in diets {
        let foods = Diet::foods(&conn, diet.id)
            .map_err(|e| format!("Failed to get foods: {}", e))?;

        summaries.push(DietSummary {
            id: diet.id,
            title: diet.title,
            date: diet.date,
            meal_slot: diet.meal_slot.as_str().to_string(),
            is_shared: diet.is_shared,
            food_count: foods.len(),
            total_energy_kcal: aggregate(&foods).energy_kcal,
        });
    }

    Ok(ListDietsResponse {
        diets: summaries,
        total,
        limit,
        offset,
    })
}

/// Update diet fields
pub fn update_diet(
    db: &Database,
    id: i64,
    title: Option<String>,
    date: Option<String>,
    meal_slot: Option<&str>,
    is_shared: Option<bool>,
    notes: Option<String>,
) -> Result<Option<DietDetail>, String> {
    if let Some(ref title) = title {
        if title.trim().is_empty() {
            return Err("Title must not be empty".to_string());
        }
    }
    if let Some(ref date) = date {
        validate_date(date)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = DietUpdate {
        title: title.map(|t| t.trim().to_string()),
        date,
        meal_slot: meal_slot.map(MealSlot::from_str),
        is_shared,
        notes,
    };

    let updated = Diet::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update diet: {}", e))?;

    match updated {
        Some(_) => {
            // Return full diet detail after update
            drop(conn);
            get_diet(db, id)
        }
        None => Ok(None),
    }
}

/// Delete a diet and its foods
pub fn delete_diet(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Diet::delete(&conn, id)
        .map_err(|e| format!("Failed to delete diet: {}", e))?;

    if deleted {
        tracing::info!(diet_id = id, "Deleted diet");
    }
    Ok(deleted)
}

// ============================================================================
// Food Tools
// ============================================================================

/// Store a food in a diet and report the new total
fn store_food(db: &Database, diet_id: i64, food: FoodItem) -> Result<FoodChangeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let diet = Diet::get_by_id(&conn, diet_id)
        .map_err(|e| format!("Database error checking diet: {}", e))?;
    if diet.is_none() {
        return Err(format!("Diet not found with id: {}", diet_id));
    }

    let stored = DietFood::add(&conn, diet_id, &food)
        .map_err(|e| format!("Failed to add food: {}", e))?;

    let diet_total = Diet::total(&conn, diet_id)
        .map_err(|e| format!("Failed to total diet: {}", e))?;

    tracing::debug!(diet_id, food_id = stored.id, "Added food");

    Ok(FoodChangeResponse {
        diet_id,
        food: stored.into_food_item(),
        diet_total,
    })
}

/// Add a food looked up in a food database (values per 100 g)
pub fn add_database_food(
    db: &Database,
    diet_id: i64,
    name: &str,
    per_100g: NutrientProfile,
    amount_g: f64,
) -> Result<FoodChangeResponse, String> {
    validate_amount(amount_g)?;
    validate_nutrients(&per_100g)?;

    store_food(db, diet_id, FoodItem::from_per_100g(name.trim(), per_100g, amount_g))
}

/// Add a food with values entered by hand for the amount eaten
pub fn add_manual_food(
    db: &Database,
    diet_id: i64,
    name: &str,
    amount_g: f64,
    nutrients: NutrientProfile,
) -> Result<FoodChangeResponse, String> {
    validate_amount(amount_g)?;
    validate_nutrients(&nutrients)?;

    store_food(db, diet_id, FoodItem::manual(name.trim(), amount_g, nutrients))
}

/// Change a food's amount, rescaling its nutrients from the original snapshot
pub fn update_food_amount(
    db: &Database,
    food_id: i64,
    amount_g: f64,
) -> Result<Option<FoodChangeResponse>, String> {
    validate_amount(amount_g)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = DietFood::set_amount(&conn, food_id, amount_g)
        .map_err(|e| format!("Failed to update amount: {}", e))?;

    match updated {
        Some(row) => {
            let diet_total = Diet::total(&conn, row.diet_id)
                .map_err(|e| format!("Failed to total diet: {}", e))?;
            Ok(Some(FoodChangeResponse {
                diet_id: row.diet_id,
                food: row.into_food_item(),
                diet_total,
            }))
        }
        None => Ok(None),
    }
}

/// Overwrite one nutrient of a food; `None` marks it as not provided
pub fn update_food_nutrient(
    db: &Database,
    food_id: i64,
    nutrient: &str,
    value: Option<f64>,
) -> Result<Option<FoodChangeResponse>, String> {
    let channel = Channel::from_str(nutrient)
        .ok_or_else(|| format!("Unknown nutrient '{}'", nutrient))?;
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(format!("{} must be a finite number", channel.as_str()));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = DietFood::set_nutrient(&conn, food_id, channel, value)
        .map_err(|e| format!("Failed to update nutrient: {}", e))?;

    match updated {
        Some(row) => {
            let diet_total = Diet::total(&conn, row.diet_id)
                .map_err(|e| format!("Failed to total diet: {}", e))?;
            Ok(Some(FoodChangeResponse {
                diet_id: row.diet_id,
                food: row.into_food_item(),
                diet_total,
            }))
        }
        None => Ok(None),
    }
}

/// Remove a food from its diet
pub fn remove_food(db: &Database, food_id: i64) -> Result<Option<RemoveFoodResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let row = DietFood::get_by_id(&conn, food_id)
        .map_err(|e| format!("Failed to get food: {}", e))?;

    match row {
        Some(row) => {
            let removed = DietFood::delete(&conn, food_id)
                .map_err(|e| format!("Failed to remove food: {}", e))?;
            let diet_total = Diet::total(&conn, row.diet_id)
                .map_err(|e| format!("Failed to total diet: {}", e))?;
            Ok(Some(RemoveFoodResponse {
                removed,
                diet_id: row.diet_id,
                diet_total,
            }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn rice_per_100g() -> NutrientProfile {
        NutrientProfile {
            energy_kcal: 130.0,
            carb_g: Some(28.0),
            protein_g: Some(2.7),
            fat_g: Some(0.3),
            ..NutrientProfile::empty()
        }
    }

    #[test]
    fn test_create_diet_validates_input() {
        let db = setup();
        assert!(create_diet(&db, "  ", "2025-01-09", None, false, None).is_err());
        assert!(create_diet(&db, "Lunch", "09/01/2025", None, false, None).is_err());

        let detail = create_diet(&db, "Lunch", "2025-01-09", Some("lunch"), false, None).unwrap();
        assert_eq!(detail.diet.meal_slot, MealSlot::Lunch);
        assert!(detail.foods.is_empty());
        assert_eq!(detail.total, NutrientProfile::empty());
    }

    #[test]
    fn test_add_foods_and_total() {
        let db = setup();
        let diet = create_diet(&db, "Lunch", "2025-01-09", Some("lunch"), false, None).unwrap();

        let rice = add_database_food(&db, diet.diet.id, "Rice", rice_per_100g(), 200.0).unwrap();
        assert!((rice.food.nutrients.energy_kcal - 260.0).abs() < 1e-9);

        let egg = NutrientProfile {
            energy_kcal: 78.0,
            protein_g: Some(6.3),
            ..NutrientProfile::empty()
        };
        let added = add_manual_food(&db, diet.diet.id, "Egg", 50.0, egg).unwrap();
        assert!((added.diet_total.energy_kcal - 338.0).abs() < 1e-9);
        assert!((added.diet_total.protein_g.unwrap() - 11.7).abs() < 1e-9);
        // Only rice provided carbs
        assert!((added.diet_total.carb_g.unwrap() - 56.0).abs() < 1e-9);
        assert_eq!(added.diet_total.sodium_mg, None);

        let detail = get_diet(&db, diet.diet.id).unwrap().unwrap();
        assert_eq!(detail.foods.len(), 2);
        assert_eq!(detail.foods[0].name, "Rice");
        assert_eq!(detail.total, added.diet_total);
    }

    #[test]
    fn test_add_food_rejects_bad_input() {
        let db = setup();
        let diet = create_diet(&db, "Lunch", "2025-01-09", None, false, None).unwrap();

        assert!(add_manual_food(&db, diet.diet.id, "Egg", -1.0, NutrientProfile::empty()).is_err());
        assert!(add_database_food(&db, 999, "Rice", rice_per_100g(), 100.0).is_err());
    }

    #[test]
    fn test_amount_edits_rescale_from_snapshot() {
        let db = setup();
        let diet = create_diet(&db, "Lunch", "2025-01-09", None, false, None).unwrap();
        let rice = add_database_food(&db, diet.diet.id, "Rice", rice_per_100g(), 100.0).unwrap();

        update_food_amount(&db, rice.food.id, 0.0).unwrap().unwrap();
        let back = update_food_amount(&db, rice.food.id, 100.0).unwrap().unwrap();
        assert!((back.food.nutrients.energy_kcal - 130.0).abs() < 1e-9);
        assert!((back.food.nutrients.carb_g.unwrap() - 28.0).abs() < 1e-9);

        assert!(update_food_amount(&db, 999, 10.0).unwrap().is_none());
    }

    #[test]
    fn test_update_food_nutrient() {
        let db = setup();
        let diet = create_diet(&db, "Lunch", "2025-01-09", None, false, None).unwrap();
        let rice = add_database_food(&db, diet.diet.id, "Rice", rice_per_100g(), 100.0).unwrap();

        assert!(update_food_nutrient(&db, rice.food.id, "vitamin_c", Some(1.0)).is_err());

        let changed = update_food_nutrient(&db, rice.food.id, "sodium", Some(5.0)).unwrap().unwrap();
        assert_eq!(changed.food.nutrients.sodium_mg, Some(5.0));
        assert_eq!(changed.diet_total.sodium_mg, Some(5.0));

        let cleared = update_food_nutrient(&db, rice.food.id, "fat", None).unwrap().unwrap();
        assert_eq!(cleared.diet_total.fat_g, None);
    }

    #[test]
    fn test_remove_food_and_delete_diet() {
        let db = setup();
        let diet = create_diet(&db, "Lunch", "2025-01-09", None, false, None).unwrap();
        let rice = add_database_food(&db, diet.diet.id, "Rice", rice_per_100g(), 100.0).unwrap();

        let removed = remove_food(&db, rice.food.id).unwrap().unwrap();
        assert!(removed.removed);
        assert_eq!(removed.diet_total, NutrientProfile::empty());
        assert!(remove_food(&db, rice.food.id).unwrap().is_none());

        assert!(delete_diet(&db, diet.diet.id).unwrap());
        assert!(get_diet(&db, diet.diet.id).unwrap().is_none());
    }

    #[test]
    fn test_list_and_update_diets() {
        let db = setup();
        let a = create_diet(&db, "Breakfast", "2025-01-08", Some("breakfast"), true, None).unwrap();
        create_diet(&db, "Dinner", "2025-01-09", Some("dinner"), false, None).unwrap();

        let all = list_diets(&db, None, None, false, 50, 0).unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.diets[0].date, "2025-01-09");

        let shared = list_diets(&db, None, None, true, 50, 0).unwrap();
        assert_eq!(shared.total, 1);

        let updated = update_diet(&db, a.diet.id, Some("Brunch".into()), None, Some("lunch"), None, None)
            .unwrap()
            .unwrap();
        assert_eq!(updated.diet.title, "Brunch");
        assert_eq!(updated.diet.meal_slot, MealSlot::Lunch);
        assert!(update_diet(&db, 999, Some("x".into()), None, None, None, None).unwrap().is_none());
    }
}
