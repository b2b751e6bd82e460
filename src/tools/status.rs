//! MeokPT Status Tool
//!
//! Runtime status of the service plus the usage guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Diet logging instructions for AI assistants
pub const DIET_INSTRUCTIONS: &str = r#"
# MeokPT Diet Logging Instructions

## Overview

- **Diet** - a titled group of foods eaten on one date in one meal slot
  (`breakfast`, `lunch`, `dinner`, `snack`, `unspecified`)
- **Food** - one item in a diet with an amount in grams and nutrient values
  for that amount
- **Body profile** - weight, height, age, sex, activity level and goal; the
  daily target is derived from it

Dates are ISO format: YYYY-MM-DD.

---

## Adding Foods

### From a food database: `add_database_food`
Pass the values **per 100 g** exactly as the database lists them, plus the
amount eaten. Values are scaled to the amount.

### Entered by hand: `add_manual_food`
Pass the values **for the amount eaten**.

### Nutrient fields

| Field | Unit |
|-------|------|
| energy_kcal | kcal (required) |
| carb_g | g |
| protein_g | g |
| fat_g | g |
| fiber_g | g |
| sugar_g | g |
| sodium_mg | mg |

Leave a field out (or null) when the value is unknown. **Do not send 0 for
unknown.** Unknown stays unknown in totals; 0 means "none".

---

## Editing Foods

- `update_food_amount` rescales every nutrient from the values the food was
  first added with. Going to 0 g and back restores the original values.
- `update_food_nutrient` overwrites one nutrient for the current amount.
  Later amount changes scale from the corrected value.
- `remove_food` deletes one food.

---

## Targets

1. `set_body_metrics` stores metrics and derives the target (BMR by
   Mifflin-St Jeor, TDEE by activity multiplier, goal adjustment, macros).
2. `set_manual_target` overrides the listed target channels until metrics are set again.
3. `preview_intake` calculates without storing anything.
4. `list_activity_levels` explains the five activity levels.

---

## Daily Summary

`get_daily_summary` totals each meal slot and the day, then compares the day
to the target per nutrient:

| Bucket | Consumed / target |
|--------|-------------------|
| under | below 80% |
| on_target | 80% - 100% |
| over | above 100%, up to 120% |
| far_over | above 120% |
| undetermined | target is 0 |

`build_feedback_payload` packages the same data for a text-generation service.
"#;

/// Runtime status of the MeokPT service
#[derive(Debug, Clone, Serialize)]
pub struct MeokptStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> MeokptStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MeokptStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
