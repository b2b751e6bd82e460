//! Feedback Payload MCP Tool
//!
//! Serializes a day's totals, target and compliance into the plain JSON object
//! a text-generation service takes as its prompt input.

use serde::Serialize;

use crate::db::Database;
use crate::nutrition::{
    evaluate, round_for_display, round_to, summarize, ComplianceBucket, ComplianceSummary,
    NutrientProfile, TargetProfile,
};

use super::daily::get_daily_summary;

/// Compact compliance entry
#[derive(Debug, Serialize)]
pub struct FeedbackChannel {
    pub channel: String,
    pub consumed: f64,
    pub target: f64,
    /// Whole percent of target; None when the target is 0
    pub percent: Option<f64>,
    pub bucket: ComplianceBucket,
}

/// Payload for a feedback request
#[derive(Debug, Serialize)]
pub struct FeedbackPayload {
    pub date: String,
    pub diet_count: usize,
    /// Rounded day total; absent channels serialize as null
    pub consumed: NutrientProfile,
    pub target: TargetProfile,
    pub channels: Vec<FeedbackChannel>,
    pub summary: ComplianceSummary,
}

/// Build the payload from totals and a target
pub fn feedback_payload(
    date: &str,
    diet_count: usize,
    consumed: &NutrientProfile,
    target: &TargetProfile,
) -> FeedbackPayload {
    // Ratios come from unrounded values
    let results = evaluate(consumed, target);
    let summary = summarize(&results);

    let channels = results
        .iter()
        .map(|r| FeedbackChannel {
            channel: r.channel.as_str().to_string(),
            consumed: round_for_display(r.channel, r.consumed),
            target: round_for_display(r.channel, r.target),
            percent: r.ratio.map(|ratio| round_to(ratio * 100.0, 0)),
            bucket: r.bucket,
        })
        .collect();

    FeedbackPayload {
        date: date.to_string(),
        diet_count,
        consumed: consumed.rounded(),
        target: target.rounded(),
        channels,
        summary,
    }
}

/// Build the payload for a stored date
///
/// Fails when there are no diets on the date or no target yet; the service
/// has nothing useful to say about either.
pub fn build_feedback_payload(db: &Database, date: &str) -> Result<FeedbackPayload, String> {
    let summary = get_daily_summary(db, date)?;

    if summary.diet_count == 0 {
        return Err(format!("No diets logged on {}", date));
    }
    let target = summary
        .target
        .ok_or_else(|| "Body metrics or a manual target must be set first".to_string())?;

    Ok(feedback_payload(date, summary.diet_count, &summary.total, &target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::{ActivityLevel, BodyMetrics, Goal, Sex};
    use crate::tools::diets::{add_manual_food, create_diet};
    use crate::tools::profile::set_body_metrics;

    fn target() -> TargetProfile {
        TargetProfile {
            energy_kcal: 2000.0,
            carb_g: 250.0,
            protein_g: 100.0,
            fat_g: 60.0,
            fiber_g: 30.0,
            sugar_g: 25.0,
            sodium_mg: 0.0,
        }
    }

    #[test]
    fn test_payload_shape() {
        let consumed = NutrientProfile {
            energy_kcal: 1234.56,
            protein_g: Some(90.04),
            ..NutrientProfile::empty()
        };
        let payload = feedback_payload("2025-01-09", 2, &consumed, &target());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["consumed"]["energy_kcal"], 1235.0);
        assert_eq!(json["consumed"]["protein_g"], 90.0);
        assert!(json["consumed"]["carb_g"].is_null());
        assert_eq!(json["channels"].as_array().unwrap().len(), 7);

        // Zero sodium target cannot be evaluated
        let sodium = &payload.channels[6];
        assert_eq!(sodium.channel, "sodium");
        assert_eq!(sodium.percent, None);
        assert_eq!(sodium.bucket, ComplianceBucket::Undetermined);
        assert_eq!(payload.summary.undetermined, 1);
    }

    #[test]
    fn test_build_requires_diets_and_target() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();

        assert!(build_feedback_payload(&db, "2025-01-09").is_err());

        let diet = create_diet(&db, "Lunch", "2025-01-09", Some("lunch"), false, None).unwrap();
        add_manual_food(&db, diet.diet.id, "Bowl", 400.0, NutrientProfile {
            energy_kcal: 650.0,
            ..NutrientProfile::empty()
        })
        .unwrap();
        assert!(build_feedback_payload(&db, "2025-01-09").is_err());

        set_body_metrics(&db, &BodyMetrics {
            weight_kg: 60.0,
            height_cm: 165.0,
            age: 28,
            sex: Sex::Female,
            activity_level: ActivityLevel::Low,
            goal: Goal::LoseWeight,
        })
        .unwrap();

        let payload = build_feedback_payload(&db, "2025-01-09").unwrap();
        assert_eq!(payload.diet_count, 1);
        assert_eq!(payload.consumed.energy_kcal, 650.0);
        assert_eq!(payload.channels[0].channel, "energy");
    }
}
