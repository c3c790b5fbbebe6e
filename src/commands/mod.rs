use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::FarmResult;
use crate::logic::filter::DateRange;

pub mod config;
pub mod crops;
pub mod environment;
pub mod inventory;
pub mod notifications;
pub mod purchases;
pub mod reports;
pub mod soil;
pub mod staff;
pub mod stock_requests;
pub mod usage;
pub mod utility;
pub mod waste;

/// Query-string shape shared by every filtered listing endpoint: free-text
/// search, category/type equality, and a date range given either as a named
/// preset (`range=this_week`) or explicit `from`/`to` bounds.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub field_id: Option<i32>,
    pub range: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ListQuery {
    pub fn date_range(&self) -> FarmResult<Option<DateRange>> {
        DateRange::from_query(self.range.as_deref(), self.from, self.to)
    }
}
