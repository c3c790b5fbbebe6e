use chrono::{Datelike, Duration, NaiveDate};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::error::{FarmError, FarmResult};

/// A bound value produced by [`FilterSpec::build`]. Keeping the params as
/// data (instead of binding eagerly) lets the same clause drive both the
/// listing query and the CSV export query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    Date(NaiveDate),
}

/// Date-range filter shared by every listing page. Presets resolve against
/// an explicitly passed reference date so the builder stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisYear,
    Explicit {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateRange {
    pub fn from_query(
        preset: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> FarmResult<Option<DateRange>> {
        match preset {
            Some("today") => Ok(Some(DateRange::Today)),
            Some("yesterday") => Ok(Some(DateRange::Yesterday)),
            Some("this_week") => Ok(Some(DateRange::ThisWeek)),
            Some("this_month") => Ok(Some(DateRange::ThisMonth)),
            Some("this_year") => Ok(Some(DateRange::ThisYear)),
            Some(other) => Err(FarmError::Validation(format!(
                "Unknown date range preset: {}",
                other
            ))),
            None => {
                if from.is_none() && to.is_none() {
                    Ok(None)
                } else {
                    Ok(Some(DateRange::Explicit { from, to }))
                }
            }
        }
    }

    /// Inclusive (from, to) bounds. Weeks are ISO weeks starting Monday.
    pub fn resolve(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            DateRange::Today => (Some(today), Some(today)),
            DateRange::Yesterday => {
                let y = today - Duration::days(1);
                (Some(y), Some(y))
            }
            DateRange::ThisWeek => {
                let monday =
                    today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (Some(monday), Some(today))
            }
            DateRange::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                (Some(first), Some(today))
            }
            DateRange::ThisYear => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (Some(first), Some(today))
            }
            DateRange::Explicit { from, to } => (from, to),
        }
    }
}

/// The filtered-query contract every listing page shares: free-text search
/// over designated columns (case-insensitive substring), optional category
/// equality, optional date window. `build` emits a WHERE fragment plus the
/// params to bind, identical for the HTML/JSON view and the CSV export.
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    search_columns: &'static [&'static str],
    category_column: Option<&'static str>,
    date_column: Option<&'static str>,
}

impl FilterSpec {
    pub const fn new(search_columns: &'static [&'static str]) -> Self {
        FilterSpec {
            search_columns,
            category_column: None,
            date_column: None,
        }
    }

    pub const fn with_category(mut self, column: &'static str) -> Self {
        self.category_column = Some(column);
        self
    }

    pub const fn with_date(mut self, column: &'static str) -> Self {
        self.date_column = Some(column);
        self
    }

    /// Builds the conjunction (without the leading `WHERE`/`AND`) and its
    /// bound params. Placeholders are numbered from `first_placeholder` so
    /// the fragment can follow fixed binds in the base query. Returns an
    /// empty clause when no filter is active.
    pub fn build(
        &self,
        search: Option<&str>,
        category_id: Option<i32>,
        range: Option<DateRange>,
        today: NaiveDate,
        first_placeholder: usize,
    ) -> (String, Vec<SqlParam>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<SqlParam> = Vec::new();
        let mut next = first_placeholder;

        if let Some(term) = search {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("%{}%", escape_like(term));
                let alts: Vec<String> = self
                    .search_columns
                    .iter()
                    .map(|col| format!("{} ILIKE ${}", col, next))
                    .collect();
                conditions.push(format!("({})", alts.join(" OR ")));
                params.push(SqlParam::Text(pattern));
                next += 1;
            }
        }

        if let (Some(col), Some(id)) = (self.category_column, category_id) {
            conditions.push(format!("{} = ${}", col, next));
            params.push(SqlParam::Int(id));
            next += 1;
        }

        if let (Some(col), Some(range)) = (self.date_column, range) {
            let (from, to) = range.resolve(today);
            if let Some(from) = from {
                conditions.push(format!("{} >= ${}", col, next));
                params.push(SqlParam::Date(from));
                next += 1;
            }
            if let Some(to) = to {
                conditions.push(format!("{} <= ${}", col, next));
                params.push(SqlParam::Date(to));
                next += 1;
            }
        }

        (conditions.join(" AND "), params)
    }
}

/// Escape LIKE metacharacters so user input stays a plain substring match.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Appends `WHERE <clause>` (or `AND <clause>` when the base query already
/// has a WHERE) to `sql`, skipping empty clauses.
pub fn append_clause(sql: &mut String, clause: &str, has_where: bool) {
    if clause.is_empty() {
        return;
    }
    sql.push_str(if has_where { " AND " } else { " WHERE " });
    sql.push_str(clause);
}

/// Folds filter params onto a typed sqlx query in order.
pub fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Date(d) => query.bind(*d),
        };
    }
    query
}
