//! Body Profile MCP Tools
//!
//! Tools for storing body metrics and the daily intake target.

use serde::Serialize;

use crate::db::Database;
use crate::models::BodyProfile;
use crate::nutrition::{
    calculate_breakdown, ActivityLevel, BodyMetrics, Channel, Goal, IntakeBreakdown, Sex,
    TargetProfile,
};

/// Response for profile reads and writes
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: BodyProfile,
    /// Target rounded for display
    pub target_rounded: TargetProfile,
    /// Intermediate values of the derived target; absent when the target is manual
    pub breakdown: Option<IntakeBreakdown>,
}

/// Response for preview_intake
#[derive(Debug, Serialize)]
pub struct PreviewIntakeResponse {
    #[serde(flatten)]
    pub breakdown: IntakeBreakdown,
    pub target_rounded: TargetProfile,
}

/// Response for recalculate_target
#[derive(Debug, Serialize)]
pub struct RecalculateTargetResponse {
    pub recalculated: bool,
    pub profile: ProfileResponse,
}

/// One activity level for pickers
#[derive(Debug, Serialize)]
pub struct ActivityLevelInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub multiplier: f64,
}

impl From<BodyProfile> for ProfileResponse {
    fn from(profile: BodyProfile) -> Self {
        let breakdown = if profile.target_is_manual {
            None
        } else {
            Some(calculate_breakdown(&profile.metrics))
        };
        Self {
            target_rounded: profile.target.rounded(),
            profile,
            breakdown,
        }
    }
}

/// Parse and range-check body metrics from tool input
pub fn parse_metrics(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: &str,
    activity_level: &str,
    goal: &str,
) -> Result<BodyMetrics, String> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > 500.0 {
        return Err("weight_kg must be between 0 and 500".to_string());
    }
    if !height_cm.is_finite() || height_cm <= 0.0 || height_cm > 300.0 {
        return Err("height_cm must be between 0 and 300".to_string());
    }
    if age == 0 || age > 150 {
        return Err("age must be between 1 and 150".to_string());
    }

    let sex = Sex::from_str(sex)
        .ok_or_else(|| format!("Unknown sex '{}', expected male or female", sex))?;
    let activity_level = ActivityLevel::from_str(activity_level).ok_or_else(|| {
        format!(
            "Unknown activity level '{}', expected one of: very_low, low, medium, high, very_high",
            activity_level
        )
    })?;
    let goal = Goal::from_str(goal).ok_or_else(|| {
        format!(
            "Unknown goal '{}', expected one of: lose_weight, gain_muscle, maintain_weight",
            goal
        )
    })?;

    Ok(BodyMetrics {
        weight_kg,
        height_cm,
        age,
        sex,
        activity_level,
        goal,
    })
}

/// Store body metrics and derive the target from them
pub fn set_body_metrics(db: &Database, metrics: &BodyMetrics) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = BodyProfile::set_metrics(&conn, metrics)
        .map_err(|e| format!("Failed to set body metrics: {}", e))?;

    tracing::info!(
        energy_kcal = profile.target.energy_kcal,
        goal = metrics.goal.as_str(),
        "Stored body metrics and derived target"
    );

    Ok(profile.into())
}

/// Override target channels by hand
///
/// Channels not listed keep their stored value. The merged target is marked
/// manual as a whole.
pub fn set_manual_target(
    db: &Database,
    entries: &[(Channel, f64)],
) -> Result<ProfileResponse, String> {
    if entries.is_empty() {
        return Err("At least one target channel must be given".to_string());
    }
    for (channel, value) in entries {
        if !value.is_finite() || *value < 0.0 {
            return Err(format!("{} must be a non-negative number", channel.as_str()));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut target = BodyProfile::get(&conn)
        .map_err(|e| format!("Failed to get body profile: {}", e))?
        .ok_or_else(|| "Body metrics must be set before a manual target".to_string())?
        .target;
    for (channel, value) in entries {
        target.set(*channel, *value);
    }

    let profile = BodyProfile::set_manual_target(&conn, &target)
        .map_err(|e| format!("Failed to set target: {}", e))?
        .ok_or_else(|| "Body metrics must be set before a manual target".to_string())?;

    tracing::info!(
        channels = entries.len(),
        energy_kcal = target.energy_kcal,
        "Stored manual target"
    );

    Ok(profile.into())
}

/// Re-derive the stored target from the stored metrics
///
/// A manual target is left untouched; `recalculated` reports which happened.
pub fn recalculate_target(db: &Database) -> Result<RecalculateTargetResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recalculated = BodyProfile::recompute(&conn)
        .map_err(|e| format!("Failed to recalculate target: {}", e))?;

    let profile = BodyProfile::get(&conn)
        .map_err(|e| format!("Failed to get body profile: {}", e))?
        .ok_or_else(|| "Body metrics have not been set".to_string())?;

    Ok(RecalculateTargetResponse {
        recalculated,
        profile: profile.into(),
    })
}

/// Get the stored profile
pub fn get_body_profile(db: &Database) -> Result<Option<ProfileResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = BodyProfile::get(&conn)
        .map_err(|e| format!("Failed to get body profile: {}", e))?;

    Ok(profile.map(ProfileResponse::from))
}

/// Calculate a target without storing anything
pub fn preview_intake(metrics: &BodyMetrics) -> PreviewIntakeResponse {
    let breakdown = calculate_breakdown(metrics);
    PreviewIntakeResponse {
        target_rounded: breakdown.target.rounded(),
        breakdown,
    }
}

/// Activity levels with their multipliers
pub fn list_activity_levels() -> Vec<ActivityLevelInfo> {
    ActivityLevel::ALL
        .iter()
        .map(|level| ActivityLevelInfo {
            name: level.as_str(),
            title: level.title(),
            description: level.description(),
            multiplier: level.multiplier(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::{calculate, BmiBand};

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn metrics() -> BodyMetrics {
        parse_metrics(70.0, 175.0, 30, "male", "1.55", "maintain").unwrap()
    }

    #[test]
    fn test_parse_metrics() {
        let m = metrics();
        assert_eq!(m.sex, Sex::Male);
        assert_eq!(m.activity_level, ActivityLevel::Medium);
        assert_eq!(m.goal, Goal::MaintainWeight);

        assert!(parse_metrics(-1.0, 175.0, 30, "male", "medium", "maintain").is_err());
        assert!(parse_metrics(70.0, 175.0, 0, "male", "medium", "maintain").is_err());
        assert!(parse_metrics(70.0, 175.0, 30, "other", "medium", "maintain").is_err());
        assert!(parse_metrics(70.0, 175.0, 30, "male", "1.6", "maintain").is_err());
        assert!(parse_metrics(70.0, 175.0, 30, "male", "medium", "bulk").is_err());
    }

    #[test]
    fn test_preview_intake() {
        let preview = preview_intake(&metrics());
        assert!((preview.breakdown.bmr - 1648.75).abs() < 1e-9);
        assert!((preview.breakdown.tdee - 2555.5625).abs() < 1e-9);
        assert_eq!(preview.breakdown.bmi_band, BmiBand::Normal);
        assert_eq!(preview.target_rounded.energy_kcal, 2556.0);
    }

    #[test]
    fn test_profile_lifecycle() {
        let db = setup();
        assert!(get_body_profile(&db).unwrap().is_none());
        assert!(recalculate_target(&db).is_err());
        assert!(set_manual_target(&db, &[(Channel::Energy, 2000.0)]).is_err());

        let stored = set_body_metrics(&db, &metrics()).unwrap();
        assert_eq!(stored.profile.target, calculate(&metrics()));
        assert!(stored.breakdown.is_some());

        let updated = set_manual_target(&db, &[(Channel::Energy, 2000.0)]).unwrap();
        assert!(updated.profile.target_is_manual);
        assert!(updated.breakdown.is_none());

        assert!(set_manual_target(&db, &[(Channel::Sodium, -1.0)]).is_err());
        assert!(set_manual_target(&db, &[]).is_err());

        let fetched = get_body_profile(&db).unwrap().unwrap();
        assert_eq!(fetched.profile.target.energy_kcal, 2000.0);

        // Manual targets survive a recalculation
        let kept = recalculate_target(&db).unwrap();
        assert!(!kept.recalculated);
        assert_eq!(kept.profile.profile.target.energy_kcal, 2000.0);

        set_body_metrics(&db, &metrics()).unwrap();
        assert!(recalculate_target(&db).unwrap().recalculated);
    }

    #[test]
    fn test_manual_target_merges_single_channel() {
        let db = setup();
        let derived = set_body_metrics(&db, &metrics()).unwrap().profile.target;

        let first = set_manual_target(&db, &[(Channel::Protein, 120.0)]).unwrap();
        let mut expected = derived.clone();
        expected.protein_g = 120.0;
        assert_eq!(first.profile.target, expected);

        // A second edit builds on the first
        let second = set_manual_target(&db, &[(Channel::Sugar, 20.0), (Channel::Fiber, 35.0)]).unwrap();
        expected.sugar_g = 20.0;
        expected.fiber_g = 35.0;
        assert_eq!(second.profile.target, expected);
        assert_eq!(second.profile.target.energy_kcal, derived.energy_kcal);
    }

    #[test]
    fn test_list_activity_levels() {
        let levels = list_activity_levels();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].name, "very_low");
        assert_eq!(levels[2].multiplier, 1.55);
    }
}
