//! Daily Summary MCP Tool
//!
//! Totals every diet on a date per meal slot and compares the day to the target.

use serde::Serialize;

use crate::db::Database;
use crate::models::{load_daily_aggregate, BodyProfile};
use crate::nutrition::{
    evaluate, format_ratio, format_value, summarize, ComplianceResult, ComplianceSummary,
    NutrientProfile, TargetProfile,
};

use super::diets::validate_date;

/// Totals for one meal slot
#[derive(Debug, Serialize)]
pub struct SlotTotal {
    pub meal_slot: String,
    pub diet_ids: Vec<i64>,
    pub total: NutrientProfile,
}

/// One compliance row with display strings
#[derive(Debug, Serialize)]
pub struct ComplianceLine {
    #[serde(flatten)]
    pub result: ComplianceResult,
    pub consumed_display: String,
    pub target_display: String,
    pub percent_display: String,
}

/// Response for get_daily_summary
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub diet_count: usize,
    pub food_count: usize,
    pub slots: Vec<SlotTotal>,
    pub total: NutrientProfile,
    /// None until body metrics or a manual target have been stored
    pub target: Option<TargetProfile>,
    pub target_is_manual: bool,
    pub compliance: Vec<ComplianceLine>,
    pub compliance_summary: Option<ComplianceSummary>,
}

/// Attach display strings to compliance results
pub(crate) fn compliance_lines(results: &[ComplianceResult]) -> Vec<ComplianceLine> {
    results
        .iter()
        .map(|r| ComplianceLine {
            consumed_display: format_value(r.channel, Some(r.consumed)),
            target_display: format_value(r.channel, Some(r.target)),
            percent_display: format_ratio(r.ratio),
            result: r.clone(),
        })
        .collect()
}

/// Build the summary for a date
pub fn get_daily_summary(db: &Database, date: &str) -> Result<DailySummary, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let (diets, day) = load_daily_aggregate(&conn, date)
        .map_err(|e| format!("Failed to load diets: {}", e))?;

    let profile = BodyProfile::get(&conn)
        .map_err(|e| format!("Failed to get body profile: {}", e))?;

    let slots = day
        .slot_totals()
        .into_iter()
        .map(|(slot, total)| SlotTotal {
            meal_slot: slot.as_str().to_string(),
            diet_ids: diets
                .iter()
                .filter(|d| d.meal_slot == slot)
                .map(|d| d.id)
                .collect(),
            total,
        })
        .collect();

    let total = day.total();

    let (target, target_is_manual, compliance, compliance_summary) = match profile {
        Some(profile) => {
            let results = evaluate(&total, &profile.target);
            let summary = summarize(&results);
            (
                Some(profile.target),
                profile.target_is_manual,
                compliance_lines(&results),
                Some(summary),
            )
        }
        None => (None, false, Vec::new(), None),
    };

    tracing::debug!(date, diets = diets.len(), "Built daily summary");

    Ok(DailySummary {
        date: date.to_string(),
        diet_count: diets.len(),
        food_count: day.food_count(),
        slots,
        total,
        target,
        target_is_manual,
        compliance,
        compliance_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::{ActivityLevel, BodyMetrics, ComplianceBucket, Goal, Sex};
    use crate::tools::diets::{add_manual_food, create_diet};

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn food(kcal: f64, protein: f64) -> NutrientProfile {
        NutrientProfile {
            energy_kcal: kcal,
            protein_g: Some(protein),
            ..NutrientProfile::empty()
        }
    }

    #[test]
    fn test_empty_day() {
        let db = setup();
        let summary = get_daily_summary(&db, "2025-01-09").unwrap();

        assert_eq!(summary.diet_count, 0);
        assert!(summary.slots.is_empty());
        assert_eq!(summary.total, NutrientProfile::empty());
        assert!(summary.target.is_none());
        assert!(summary.compliance.is_empty());
    }

    #[test]
    fn test_rejects_bad_date() {
        let db = setup();
        assert!(get_daily_summary(&db, "yesterday").is_err());
    }

    #[test]
    fn test_slots_and_day_total() {
        let db = setup();
        let breakfast = create_diet(&db, "Oats", "2025-01-09", Some("breakfast"), false, None).unwrap();
        let lunch = create_diet(&db, "Bowl", "2025-01-09", Some("lunch"), false, None).unwrap();
        let other_day = create_diet(&db, "Late", "2025-01-10", Some("dinner"), false, None).unwrap();

        add_manual_food(&db, breakfast.diet.id, "Oats", 80.0, food(300.0, 10.0)).unwrap();
        add_manual_food(&db, lunch.diet.id, "Chicken", 150.0, food(250.0, 45.0)).unwrap();
        add_manual_food(&db, lunch.diet.id, "Rice", 200.0, food(260.0, 5.0)).unwrap();
        add_manual_food(&db, other_day.diet.id, "Pizza", 300.0, food(800.0, 30.0)).unwrap();

        let summary = get_daily_summary(&db, "2025-01-09").unwrap();
        assert_eq!(summary.diet_count, 2);
        assert_eq!(summary.food_count, 3);
        assert_eq!(summary.slots.len(), 2);
        assert_eq!(summary.slots[0].meal_slot, "breakfast");
        assert_eq!(summary.slots[1].diet_ids, vec![lunch.diet.id]);
        assert!((summary.slots[1].total.energy_kcal - 510.0).abs() < 1e-9);
        assert!((summary.total.energy_kcal - 810.0).abs() < 1e-9);
        assert!((summary.total.protein_g.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_compliance_against_stored_target() {
        let db = setup();
        db.with_conn(|conn| {
            BodyProfile::set_metrics(
                conn,
                &BodyMetrics {
                    weight_kg: 70.0,
                    height_cm: 175.0,
                    age: 30,
                    sex: Sex::Male,
                    activity_level: ActivityLevel::Medium,
                    goal: Goal::MaintainWeight,
                },
            )
        })
        .unwrap();

        let diet = create_diet(&db, "Day", "2025-01-09", None, false, None).unwrap();
        add_manual_food(&db, diet.diet.id, "Everything", 1000.0, food(2400.0, 80.0)).unwrap();

        let summary = get_daily_summary(&db, "2025-01-09").unwrap();
        assert!(summary.target.is_some());
        assert_eq!(summary.compliance.len(), 7);

        let energy = &summary.compliance[0].result;
        assert_eq!(energy.bucket, ComplianceBucket::OnTarget);

        let protein = summary
            .compliance
            .iter()
            .find(|l| l.result.channel == crate::nutrition::Channel::Protein)
            .unwrap();
        assert_eq!(protein.result.bucket, ComplianceBucket::OnTarget);
        assert_eq!(protein.percent_display, "95%");

        // Channels nobody provided count as zero consumed
        let sodium = summary
            .compliance
            .iter()
            .find(|l| l.result.channel == crate::nutrition::Channel::Sodium)
            .unwrap();
        assert_eq!(sodium.result.bucket, ComplianceBucket::Under);

        let counts = summary.compliance_summary.unwrap();
        assert_eq!(counts.on_target + counts.under + counts.over + counts.far_over, 7);
    }
}
