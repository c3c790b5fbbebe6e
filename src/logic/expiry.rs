use chrono::NaiveDate;
use serde::Serialize;

/// Items expiring within this many days (inclusive) count as expiring-soon.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

impl ExpiryStatus {
    /// Canonical label, identical to the serde form; CSV rows use this so
    /// the two surfaces cannot diverge.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::ExpiringSoon => "expiring_soon",
            ExpiryStatus::Valid => "valid",
        }
    }
}

/// Signed day count until `expiry`; negative once the date has passed.
pub fn days_remaining(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Single source of truth for expiry bucketing. Row highlighting, summary
/// counts and CSV rows must all go through here so they cannot drift.
pub fn classify_expiry(expiry: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    let days = days_remaining(expiry, today);
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= EXPIRING_SOON_WINDOW_DAYS {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpirySummary {
    pub expired: i64,
    pub expiring_soon: i64,
    pub valid: i64,
}

pub fn summarize<'a, I>(expiries: I, today: NaiveDate) -> ExpirySummary
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let mut summary = ExpirySummary::default();
    for expiry in expiries {
        match classify_expiry(*expiry, today) {
            ExpiryStatus::Expired => summary.expired += 1,
            ExpiryStatus::ExpiringSoon => summary.expiring_soon += 1,
            ExpiryStatus::Valid => summary.valid += 1,
        }
    }
    summary
}
