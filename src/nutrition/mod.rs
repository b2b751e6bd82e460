//! Nutrition engine
//!
//! Pure aggregation, recommended-intake and compliance calculations.
//! Nothing in this module touches storage or does I/O.

pub mod aggregate;
pub mod calculator;
pub mod compliance;
pub mod food;
pub mod format;
pub mod profile;

pub use aggregate::{aggregate, sum_profiles, DailyAggregate, DietAggregate, MealSlot};
pub use calculator::{
    calculate, calculate_breakdown, calculate_bmi, calculate_bmr, calculate_tdee, macro_ratio,
    ActivityLevel, BmiBand, BodyMetrics, Goal, IntakeBreakdown, MacroRatio, Sex,
};
pub use compliance::{evaluate, summarize, ComplianceBucket, ComplianceResult, ComplianceSummary};
pub use food::{FoodItem, FoodSource};
pub use format::{format_ratio, format_value, round_for_display, round_to};
pub use profile::{Channel, NutrientProfile, TargetProfile};
