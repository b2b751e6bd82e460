//! Target compliance
//!
//! Compares consumed nutrients against a target, channel by channel.

use serde::{Deserialize, Serialize};

use super::profile::{Channel, NutrientProfile, TargetProfile};

/// Ratio below which a channel is under target
pub const UNDER_THRESHOLD: f64 = 0.8;

/// Highest ratio still counted as on target
pub const ON_TARGET_MAX: f64 = 1.0;

/// Highest ratio counted as over rather than far over
pub const OVER_MAX: f64 = 1.2;

/// Status of one channel against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceBucket {
    Under,
    OnTarget,
    Over,
    FarOver,
    /// Target missing or zero; no ratio can be formed
    Undetermined,
}

impl ComplianceBucket {
    /// Bucket for a consumed/target ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < UNDER_THRESHOLD {
            ComplianceBucket::Under
        } else if ratio <= ON_TARGET_MAX {
            ComplianceBucket::OnTarget
        } else if ratio <= OVER_MAX {
            ComplianceBucket::Over
        } else {
            ComplianceBucket::FarOver
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceBucket::Under => "under",
            ComplianceBucket::OnTarget => "on_target",
            ComplianceBucket::Over => "over",
            ComplianceBucket::FarOver => "far_over",
            ComplianceBucket::Undetermined => "undetermined",
        }
    }
}

/// Compliance of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub channel: Channel,
    pub consumed: f64,
    pub target: f64,
    /// `None` when the target is zero
    pub ratio: Option<f64>,
    pub bucket: ComplianceBucket,
}

/// Evaluate a single channel; absent consumption counts as 0
pub fn evaluate_channel(channel: Channel, consumed: Option<f64>, target: f64) -> ComplianceResult {
    let consumed = consumed.unwrap_or(0.0);
    let ratio = if target > 0.0 { Some(consumed / target) } else { None };
    let bucket = ratio.map_or(ComplianceBucket::Undetermined, ComplianceBucket::from_ratio);

    ComplianceResult { channel, consumed, target, ratio, bucket }
}

/// Evaluate every channel of `consumed` against `target`
pub fn evaluate(consumed: &NutrientProfile, target: &TargetProfile) -> Vec<ComplianceResult> {
    Channel::ALL
        .iter()
        .map(|c| evaluate_channel(*c, consumed.get(*c), target.get(*c)))
        .collect()
}

/// Bucket counts over a set of results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub under: usize,
    pub on_target: usize,
    pub over: usize,
    pub far_over: usize,
    pub undetermined: usize,
    /// On-target share of the determined channels (0.0 - 1.0)
    pub score: f64,
}

/// Count results per bucket and score the on-target share
pub fn summarize(results: &[ComplianceResult]) -> ComplianceSummary {
    let mut summary = ComplianceSummary::default();
    for result in results {
        match result.bucket {
            ComplianceBucket::Under => summary.under += 1,
            ComplianceBucket::OnTarget => summary.on_target += 1,
            ComplianceBucket::Over => summary.over += 1,
            ComplianceBucket::FarOver => summary.far_over += 1,
            ComplianceBucket::Undetermined => summary.undetermined += 1,
        }
    }

    let determined = results.len() - summary.undetermined;
    summary.score = if determined > 0 {
        summary.on_target as f64 / determined as f64
    } else {
        0.0
    };
    summary
}
