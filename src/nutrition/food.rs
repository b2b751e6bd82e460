//! Food items
//!
//! A single consumable entry with an amount and the nutrients for that amount.

use serde::{Deserialize, Serialize};

use super::profile::{Channel, NutrientProfile};

/// Grams that food database values are expressed per
pub const DATABASE_BASE_AMOUNT_G: f64 = 100.0;

/// Where a food's nutrient values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    /// Looked up in a food database, values given per 100 g
    Database,
    /// Entered by hand for the amount eaten
    #[default]
    Manual,
}

impl FoodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodSource::Database => "database",
            FoodSource::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "database" => FoodSource::Database,
            _ => FoodSource::Manual,
        }
    }
}

/// A food logged into a diet
///
/// `nutrients` always reflects `amount_g`. The original snapshot is what every
/// amount change rescales from, so repeated edits never accumulate drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Stable id; 0 until the item has been stored
    pub id: i64,
    pub name: String,
    pub source: FoodSource,
    pub amount_g: f64,
    pub nutrients: NutrientProfile,
    pub original_amount_g: f64,
    pub original_nutrients: NutrientProfile,
}

impl FoodItem {
    /// Build a food from per-100 g database values, scaled to `amount_g`
    pub fn from_per_100g(name: impl Into<String>, per_100g: NutrientProfile, amount_g: f64) -> Self {
        let nutrients = per_100g.scale(amount_g / DATABASE_BASE_AMOUNT_G);
        Self {
            id: 0,
            name: name.into(),
            source: FoodSource::Database,
            amount_g,
            nutrients,
            original_amount_g: DATABASE_BASE_AMOUNT_G,
            original_nutrients: per_100g,
        }
    }

    /// Build a food from values entered directly for `amount_g`; no scaling
    pub fn manual(name: impl Into<String>, amount_g: f64, nutrients: NutrientProfile) -> Self {
        Self {
            id: 0,
            name: name.into(),
            source: FoodSource::Manual,
            amount_g,
            nutrients: nutrients.clone(),
            original_amount_g: amount_g,
            original_nutrients: nutrients,
        }
    }

    /// Factor applied to the snapshot for a given amount
    ///
    /// A zero-amount snapshot yields 0 rather than dividing by zero.
    pub fn scale_factor(&self, amount_g: f64) -> f64 {
        if self.original_amount_g > 0.0 {
            amount_g / self.original_amount_g
        } else {
            0.0
        }
    }

    /// Change the amount, recomputing every channel from the original snapshot
    pub fn set_amount(&mut self, amount_g: f64) {
        let factor = self.scale_factor(amount_g);
        self.amount_g = amount_g;
        self.nutrients = self.original_nutrients.scale(factor);
    }

    /// Overwrite one channel for the current amount
    ///
    /// The snapshot is rebased for that channel only, so a later amount change
    /// keeps the edited value proportional and leaves the other channels on
    /// their original values.
    pub fn set_nutrient(&mut self, channel: Channel, value: Option<f64>) {
        self.nutrients.set(channel, value);

        if self.amount_g > 0.0 && self.original_amount_g > 0.0 {
            let back = self.original_amount_g / self.amount_g;
            self.original_nutrients.set(channel, value.map(|v| v * back));
        } else {
            // No usable ratio between snapshot and display: current values become the snapshot
            self.original_amount_g = self.amount_g;
            self.original_nutrients = self.nutrients.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice_per_100g() -> NutrientProfile {
        NutrientProfile {
            energy_kcal: 130.0,
            carb_g: Some(28.2),
            protein_g: Some(2.7),
            fat_g: Some(0.3),
            fiber_g: Some(0.4),
            sugar_g: None,
            sodium_mg: Some(1.0),
        }
    }

    fn assert_close(a: Option<f64>, b: Option<f64>) {
        match (a, b) {
            (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9, "{} != {}", x, y),
            (None, None) => {}
            _ => panic!("presence mismatch: {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn test_database_food_scales_from_100g() {
        let food = FoodItem::from_per_100g("rice", rice_per_100g(), 210.0);
        assert_eq!(food.source, FoodSource::Database);
        assert!((food.nutrients.energy_kcal - 273.0).abs() < 1e-9);
        assert_close(food.nutrients.carb_g, Some(59.22));
        assert_close(food.nutrients.sugar_g, None);
    }

    #[test]
    fn test_manual_food_is_not_scaled() {
        let nutrients = NutrientProfile { energy_kcal: 350.0, protein_g: Some(20.0), ..Default::default() };
        let food = FoodItem::manual("kimbap", 230.0, nutrients.clone());
        assert_eq!(food.nutrients, nutrients);
        assert_eq!(food.original_amount_g, 230.0);
    }

    #[test]
    fn test_rescale_round_trip_returns_original_values() {
        let mut food = FoodItem::from_per_100g("rice", rice_per_100g(), 100.0);
        let before = food.nutrients.clone();

        food.set_amount(150.0);
        food.set_amount(37.3);
        food.set_amount(100.0);

        for channel in Channel::ALL {
            assert_close(food.nutrients.get(channel), before.get(channel));
        }
    }

    #[test]
    fn test_rescale_manual_food() {
        let nutrients = NutrientProfile { energy_kcal: 300.0, fat_g: Some(12.0), ..Default::default() };
        let mut food = FoodItem::manual("tteokbokki", 200.0, nutrients);
        food.set_amount(300.0);
        assert!((food.nutrients.energy_kcal - 450.0).abs() < 1e-9);
        assert_close(food.nutrients.fat_g, Some(18.0));
    }

    #[test]
    fn test_zero_original_amount_scales_to_zero() {
        let nutrients = NutrientProfile { energy_kcal: 80.0, carb_g: Some(5.0), ..Default::default() };
        let mut food = FoodItem::manual("sauce", 0.0, nutrients);
        food.set_amount(50.0);
        assert_eq!(food.nutrients.energy_kcal, 0.0);
        assert_close(food.nutrients.carb_g, Some(0.0));
    }

    #[test]
    fn test_nutrient_edit_survives_rescale() {
        let mut food = FoodItem::from_per_100g("rice", rice_per_100g(), 200.0);
        food.set_nutrient(Channel::Sugar, Some(1.0));
        food.set_amount(400.0);

        assert_close(food.nutrients.sugar_g, Some(2.0));
        // Untouched channels still follow the database values
        assert_close(food.nutrients.carb_g, Some(112.8));
    }

    #[test]
    fn test_nutrient_edit_at_zero_amount_rebases_snapshot() {
        let mut food = FoodItem::from_per_100g("rice", rice_per_100g(), 0.0);
        food.set_nutrient(Channel::Energy, Some(10.0));
        assert_eq!(food.original_amount_g, 0.0);
        assert_eq!(food.original_nutrients.energy_kcal, 10.0);
    }
}
