//! Recommended intake calculator
//!
//! Derives a daily target profile from body metrics:
//! BMR -> TDEE -> goal-adjusted calories -> macro split -> per-nutrient targets.
//!
//! BMR uses the Mifflin-St Jeor equation:
//! - Men: `10 x weight_kg + 6.25 x height_cm - 5 x age + 5`
//! - Women: `10 x weight_kg + 6.25 x height_cm - 5 x age - 161`
//!
//! Protein is set from body weight first; the remaining calories are split
//! between fat and carbohydrate using the relative fat:carb share of the
//! macro table row. Nothing here fails: degenerate input is clamped.

use serde::{Deserialize, Serialize};

use super::profile::TargetProfile;

/// Calories per gram of protein and carbohydrate
const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;

/// Calories per gram of fat
const KCAL_PER_G_FAT: f64 = 9.0;

/// Share of carbohydrate grams allowed as sugar
const SUGAR_SHARE_OF_CARB: f64 = 0.10;

/// Upper bound for the sugar target (g)
const SUGAR_CAP_G: f64 = 50.0;

/// Fixed sodium target (mg)
const SODIUM_TARGET_MG: f64 = 1500.0;

/// Calorie floor for weight loss, women
const FEMALE_CALORIE_FLOOR: f64 = 1200.0;

/// Calorie floor for weight loss, men
const MALE_CALORIE_FLOOR: f64 = 1500.0;

/// Activity multiplier at which protein needs step up
const ACTIVE_PROTEIN_THRESHOLD: f64 = 1.55;

/// Biological sex, used by BMR and the macro table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Activity level; each carries a fixed TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ActivityLevel {
    /// All levels from least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::VeryLow,
        ActivityLevel::Low,
        ActivityLevel::Medium,
        ActivityLevel::High,
        ActivityLevel::VeryHigh,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::VeryLow => 1.2,
            ActivityLevel::Low => 1.375,
            ActivityLevel::Medium => 1.55,
            ActivityLevel::High => 1.725,
            ActivityLevel::VeryHigh => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::VeryLow => "very_low",
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
            ActivityLevel::VeryHigh => "very_high",
        }
    }

    /// Parse a level name or a multiplier written as a number ("1.55")
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "very_low" | "sedentary" => Some(ActivityLevel::VeryLow),
            "low" | "light" => Some(ActivityLevel::Low),
            "medium" | "moderate" => Some(ActivityLevel::Medium),
            "high" | "active" => Some(ActivityLevel::High),
            "very_high" | "very_active" => Some(ActivityLevel::VeryHigh),
            other => other.parse::<f64>().ok().and_then(Self::from_multiplier),
        }
    }

    /// Level whose multiplier matches exactly (within float noise)
    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.multiplier() - multiplier).abs() < 1e-9)
    }

    /// Short display title
    pub fn title(&self) -> &'static str {
        match self {
            ActivityLevel::VeryLow => "Very low",
            ActivityLevel::Low => "Low",
            ActivityLevel::Medium => "Medium",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very high",
        }
    }

    /// Display description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::VeryLow => "Mostly sitting, little or no exercise",
            ActivityLevel::Low => "Light exercise 1-3 days a week",
            ActivityLevel::Medium => "Moderate exercise 3-5 days a week",
            ActivityLevel::High => "Hard exercise 6-7 days a week",
            ActivityLevel::VeryHigh => "Physical job or training twice a day",
        }
    }
}

/// Dietary goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    GainMuscle,
    MaintainWeight,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::LoseWeight, Goal::GainMuscle, Goal::MaintainWeight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::LoseWeight => "lose_weight",
            Goal::GainMuscle => "gain_muscle",
            Goal::MaintainWeight => "maintain_weight",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "lose_weight" | "lose" | "loseweight" => Some(Goal::LoseWeight),
            "gain_muscle" | "gain" | "gainmuscle" => Some(Goal::GainMuscle),
            "maintain_weight" | "maintain" | "maintainweight" => Some(Goal::MaintainWeight),
            _ => None,
        }
    }
}

/// BMI range used to pick goal adjustments and macro ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiBand {
    /// BMI < 18.5
    Underweight,
    /// 18.5 <= BMI < 25
    Normal,
    /// 25 <= BMI < 30
    Overweight,
    /// BMI >= 30
    Obese,
}

impl BmiBand {
    pub const ALL: [BmiBand; 4] = [
        BmiBand::Underweight,
        BmiBand::Normal,
        BmiBand::Overweight,
        BmiBand::Obese,
    ];

    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiBand::Underweight
        } else if bmi < 25.0 {
            BmiBand::Normal
        } else if bmi < 30.0 {
            BmiBand::Overweight
        } else {
            BmiBand::Obese
        }
    }
}

/// Body metrics the target is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// Macro split for one table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    pub carb_percent: f64,
    pub protein_percent: f64,
    pub fat_percent: f64,
    pub fiber_g: f64,
}

impl MacroRatio {
    const fn new(carb_percent: f64, protein_percent: f64, fat_percent: f64, fiber_g: f64) -> Self {
        Self { carb_percent, protein_percent, fat_percent, fiber_g }
    }

    /// Make the three shares sum to 1.0, spreading the slack equally
    pub fn normalized(&self) -> Self {
        let slack = 1.0 - (self.carb_percent + self.protein_percent + self.fat_percent);
        let share = slack / 3.0;
        Self {
            carb_percent: self.carb_percent + share,
            protein_percent: self.protein_percent + share,
            fat_percent: self.fat_percent + share,
            fiber_g: self.fiber_g,
        }
    }

    /// Fat's share of the calories left after protein
    pub fn fat_share(&self) -> f64 {
        let denominator = self.carb_percent + self.fat_percent;
        if denominator > 0.0 {
            self.fat_percent / denominator
        } else {
            0.0
        }
    }
}

/// Raw macro table row for a goal, BMI band and sex (before normalization)
pub fn macro_table(goal: Goal, band: BmiBand, sex: Sex) -> MacroRatio {
    use BmiBand::*;
    use Sex::*;

    match (goal, band, sex) {
        (Goal::MaintainWeight, Underweight, Male) => MacroRatio::new(0.55, 0.20, 0.25, 30.0),
        (Goal::MaintainWeight, Underweight, Female) => MacroRatio::new(0.55, 0.20, 0.25, 25.0),
        (Goal::MaintainWeight, Normal, Male) => MacroRatio::new(0.50, 0.25, 0.25, 30.0),
        (Goal::MaintainWeight, Normal, Female) => MacroRatio::new(0.50, 0.20, 0.30, 25.0),
        (Goal::MaintainWeight, Overweight, Male) => MacroRatio::new(0.45, 0.25, 0.30, 33.0),
        (Goal::MaintainWeight, Overweight, Female) => MacroRatio::new(0.45, 0.25, 0.30, 28.0),
        (Goal::MaintainWeight, Obese, Male) => MacroRatio::new(0.40, 0.30, 0.30, 35.0),
        (Goal::MaintainWeight, Obese, Female) => MacroRatio::new(0.40, 0.30, 0.30, 30.0),

        (Goal::LoseWeight, Underweight, Male) => MacroRatio::new(0.50, 0.25, 0.25, 30.0),
        (Goal::LoseWeight, Underweight, Female) => MacroRatio::new(0.50, 0.25, 0.25, 25.0),
        (Goal::LoseWeight, Normal, Male) => MacroRatio::new(0.40, 0.30, 0.30, 30.0),
        (Goal::LoseWeight, Normal, Female) => MacroRatio::new(0.40, 0.30, 0.30, 25.0),
        (Goal::LoseWeight, Overweight, Male) => MacroRatio::new(0.35, 0.35, 0.30, 33.0),
        (Goal::LoseWeight, Overweight, Female) => MacroRatio::new(0.35, 0.35, 0.30, 28.0),
        (Goal::LoseWeight, Obese, Male) => MacroRatio::new(0.33, 0.33, 0.33, 35.0),
        (Goal::LoseWeight, Obese, Female) => MacroRatio::new(0.33, 0.33, 0.33, 30.0),

        (Goal::GainMuscle, Underweight, Male) => MacroRatio::new(0.55, 0.25, 0.20, 30.0),
        (Goal::GainMuscle, Underweight, Female) => MacroRatio::new(0.55, 0.20, 0.25, 25.0),
        (Goal::GainMuscle, Normal, Male) => MacroRatio::new(0.50, 0.30, 0.20, 30.0),
        (Goal::GainMuscle, Normal, Female) => MacroRatio::new(0.50, 0.25, 0.25, 25.0),
        (Goal::GainMuscle, Overweight, Male) => MacroRatio::new(0.45, 0.30, 0.25, 33.0),
        (Goal::GainMuscle, Overweight, Female) => MacroRatio::new(0.45, 0.30, 0.25, 28.0),
        (Goal::GainMuscle, Obese, Male) => MacroRatio::new(0.40, 0.35, 0.25, 35.0),
        (Goal::GainMuscle, Obese, Female) => MacroRatio::new(0.40, 0.35, 0.25, 30.0),
    }
}

/// Normalized macro ratios for a goal, BMI band and sex
pub fn macro_ratio(goal: Goal, band: BmiBand, sex: Sex) -> MacroRatio {
    macro_table(goal, band, sex).normalized()
}

/// Basal metabolic rate (Mifflin-St Jeor), kcal/day
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Total daily energy expenditure, kcal/day
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Body mass index; 0 when height is not positive
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Daily deficit for weight loss by BMI band
fn weight_loss_deficit(band: BmiBand) -> f64 {
    match band {
        BmiBand::Underweight => 200.0,
        BmiBand::Normal => 500.0,
        BmiBand::Overweight => 600.0,
        BmiBand::Obese => 700.0,
    }
}

/// Daily surplus for muscle gain by BMI band
fn muscle_gain_surplus(band: BmiBand) -> f64 {
    match band {
        BmiBand::Underweight => 400.0,
        BmiBand::Normal => 300.0,
        BmiBand::Overweight | BmiBand::Obese => 200.0,
    }
}

/// Lowest calorie target allowed when losing weight
pub fn calorie_floor(sex: Sex) -> f64 {
    match sex {
        Sex::Male => MALE_CALORIE_FLOOR,
        Sex::Female => FEMALE_CALORIE_FLOOR,
    }
}

/// Apply the goal's deficit or surplus to TDEE
pub fn adjust_calories(tdee: f64, goal: Goal, band: BmiBand, sex: Sex) -> f64 {
    match goal {
        Goal::LoseWeight => (tdee - weight_loss_deficit(band)).max(calorie_floor(sex)),
        Goal::GainMuscle => tdee + muscle_gain_surplus(band),
        Goal::MaintainWeight => tdee,
    }
}

/// Protein grams per kg of body weight for a goal and activity level
pub fn protein_per_kg(goal: Goal, activity_level: ActivityLevel) -> f64 {
    let active = activity_level.multiplier() >= ACTIVE_PROTEIN_THRESHOLD;
    match (goal, active) {
        (Goal::LoseWeight, true) => 2.0,
        (Goal::LoseWeight, false) => 1.6,
        (Goal::GainMuscle, true) => 2.2,
        (Goal::GainMuscle, false) => 1.8,
        (Goal::MaintainWeight, true) => 1.2,
        (Goal::MaintainWeight, false) => 1.0,
    }
}

/// Every intermediate value of a target calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeBreakdown {
    pub metrics: BodyMetrics,
    pub bmr: f64,
    pub tdee: f64,
    pub bmi: f64,
    pub bmi_band: BmiBand,
    pub adjusted_calories: f64,
    pub macro_ratio: MacroRatio,
    pub protein_per_kg: f64,
    pub target: TargetProfile,
}

/// Derive the recommended daily intake with all intermediate values
pub fn calculate_breakdown(metrics: &BodyMetrics) -> IntakeBreakdown {
    let bmr = calculate_bmr(metrics.weight_kg, metrics.height_cm, metrics.age, metrics.sex);
    let tdee = calculate_tdee(bmr, metrics.activity_level);
    let bmi = calculate_bmi(metrics.weight_kg, metrics.height_cm);
    let band = BmiBand::from_bmi(bmi);

    let calories = adjust_calories(tdee, metrics.goal, band, metrics.sex).max(0.0);
    let ratio = macro_ratio(metrics.goal, band, metrics.sex);

    // Protein first, from body weight
    let per_kg = protein_per_kg(metrics.goal, metrics.activity_level);
    let protein_g = (metrics.weight_kg * per_kg).max(0.0);

    // Fat and carbs share what is left, by their relative ratio
    let remaining = (calories - protein_g * KCAL_PER_G_PROTEIN_CARB).max(0.0);
    let fat_share = ratio.fat_share();
    let fat_g = remaining * fat_share / KCAL_PER_G_FAT;
    let carb_g = remaining * (1.0 - fat_share) / KCAL_PER_G_PROTEIN_CARB;

    let target = TargetProfile {
        energy_kcal: calories,
        carb_g,
        protein_g,
        fat_g,
        fiber_g: ratio.fiber_g,
        sugar_g: (carb_g * SUGAR_SHARE_OF_CARB).min(SUGAR_CAP_G),
        sodium_mg: SODIUM_TARGET_MG,
    };

    IntakeBreakdown {
        metrics: *metrics,
        bmr,
        tdee,
        bmi,
        bmi_band: band,
        adjusted_calories: calories,
        macro_ratio: ratio,
        protein_per_kg: per_kg,
        target,
    }
}

/// Derive the recommended daily intake from body metrics
pub fn calculate(metrics: &BodyMetrics) -> TargetProfile {
    calculate_breakdown(metrics).target
}
