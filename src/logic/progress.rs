use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    Early,
    Mid,
    Late,
}

/// Percentage of the planting-to-harvest window elapsed at `today`, clamped
/// to 0..=100. A zero or negative window reports 100: the crop is at or past
/// its expected harvest no matter how the dates were entered.
pub fn growth_progress(planting: NaiveDate, expected_harvest: NaiveDate, today: NaiveDate) -> f64 {
    let total = (expected_harvest - planting).num_days();
    if total <= 0 {
        return 100.0;
    }
    let elapsed = (today - planting).num_days();
    let pct = elapsed as f64 / total as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

pub fn progress_tier(progress: f64) -> ProgressTier {
    if progress < 30.0 {
        ProgressTier::Early
    } else if progress <= 70.0 {
        ProgressTier::Mid
    } else {
        ProgressTier::Late
    }
}
