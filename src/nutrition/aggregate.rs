//! Nutrient aggregation
//!
//! Sums foods into diet totals and diet totals into day totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::food::FoodItem;
use super::profile::{Channel, NutrientProfile};

/// Meal slot a diet is eaten in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Unspecified,
}

impl MealSlot {
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
        MealSlot::Unspecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
            MealSlot::Unspecified => "unspecified",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "breakfast" => MealSlot::Breakfast,
            "lunch" => MealSlot::Lunch,
            "dinner" => MealSlot::Dinner,
            "snack" => MealSlot::Snack,
            _ => MealSlot::Unspecified,
        }
    }
}

/// Sum values in ascending order so any permutation gives the same bits
fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Sum one optional channel: absent only when every contribution is absent
fn sum_present<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(ordered_sum(present))
    }
}

/// Sum profiles channel by channel
///
/// Energy is floored at 0 per contribution. The other channels are summed as
/// given; negative values there pass through unchanged.
pub fn sum_profiles<'a, I>(profiles: I) -> NutrientProfile
where
    I: IntoIterator<Item = &'a NutrientProfile>,
{
    let profiles: Vec<&NutrientProfile> = profiles.into_iter().collect();

    let mut total = NutrientProfile {
        energy_kcal: ordered_sum(profiles.iter().map(|p| p.energy_kcal.max(0.0)).collect()),
        ..NutrientProfile::empty()
    };

    for channel in Channel::ALL.into_iter().filter(|c| *c != Channel::Energy) {
        total.set(channel, sum_present(profiles.iter().map(|p| p.get(channel))));
    }

    total
}

/// Total nutrients for a list of foods
pub fn aggregate(foods: &[FoodItem]) -> NutrientProfile {
    sum_profiles(foods.iter().map(|f| &f.nutrients))
}

/// An ordered list of foods making up one diet or meal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DietAggregate {
    pub foods: Vec<FoodItem>,
}

impl DietAggregate {
    pub fn new(foods: Vec<FoodItem>) -> Self {
        Self { foods }
    }

    pub fn push(&mut self, food: FoodItem) {
        self.foods.push(food);
    }

    /// Remove the food with the given id, returning it if present
    pub fn remove(&mut self, id: i64) -> Option<FoodItem> {
        let index = self.foods.iter().position(|f| f.id == id)?;
        Some(self.foods.remove(index))
    }

    /// Computed total; never stored
    pub fn total(&self) -> NutrientProfile {
        aggregate(&self.foods)
    }
}

/// One day's foods grouped by meal slot
#[derive(Debug, Clone, Default)]
pub struct DailyAggregate {
    slots: BTreeMap<MealSlot, Vec<FoodItem>>,
}

impl DailyAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diet's foods under a meal slot
    pub fn add_diet(&mut self, slot: MealSlot, diet: &DietAggregate) {
        self.add_foods(slot, diet.foods.iter().cloned());
    }

    pub fn add_foods<I: IntoIterator<Item = FoodItem>>(&mut self, slot: MealSlot, foods: I) {
        self.slots.entry(slot).or_default().extend(foods);
    }

    /// Slots that have at least one food logged, in display order
    pub fn slots(&self) -> impl Iterator<Item = MealSlot> + '_ {
        self.slots.iter().filter(|(_, f)| !f.is_empty()).map(|(s, _)| *s)
    }

    /// Total for one slot; an empty slot has zero energy and absent channels
    pub fn slot_total(&self, slot: MealSlot) -> NutrientProfile {
        self.slots
            .get(&slot)
            .map(|foods| aggregate(foods))
            .unwrap_or_default()
    }

    /// Per-slot totals for every populated slot
    pub fn slot_totals(&self) -> BTreeMap<MealSlot, NutrientProfile> {
        self.slots().map(|s| (s, self.slot_total(s))).collect()
    }

    /// Day total: the sum of the slot totals
    ///
    /// Summed over the foods directly so moving a food between slots cannot
    /// change the result.
    pub fn total(&self) -> NutrientProfile {
        sum_profiles(self.slots.values().flatten().map(|f| &f.nutrients))
    }

    pub fn food_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }
}
