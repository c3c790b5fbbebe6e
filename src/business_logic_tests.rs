#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod expiry {
        use super::date;
        use crate::logic::expiry::{classify_expiry, days_remaining, summarize, ExpiryStatus};

        #[test]
        fn test_classification_boundaries() {
            let today = date(2025, 6, 15);

            // The day before today is expired; today itself is not.
            assert_eq!(
                classify_expiry(date(2025, 6, 14), today),
                ExpiryStatus::Expired
            );
            assert_eq!(
                classify_expiry(today, today),
                ExpiryStatus::ExpiringSoon
            );

            // Day 30 is still expiring-soon; day 31 is valid.
            assert_eq!(
                classify_expiry(date(2025, 7, 15), today),
                ExpiryStatus::ExpiringSoon
            );
            assert_eq!(
                classify_expiry(date(2025, 7, 16), today),
                ExpiryStatus::Valid
            );
        }

        #[test]
        fn test_days_remaining_is_signed() {
            let today = date(2025, 6, 15);
            assert_eq!(days_remaining(date(2025, 6, 10), today), -5);
            assert_eq!(days_remaining(date(2025, 6, 15), today), 0);
            assert_eq!(days_remaining(date(2025, 6, 20), today), 5);
        }

        #[test]
        fn test_summary_counts() {
            let today = date(2025, 6, 15);
            let expiries = [
                date(2025, 6, 1),  // expired
                date(2025, 6, 14), // expired
                date(2025, 6, 15), // expiring soon
                date(2025, 7, 15), // expiring soon (day 30)
                date(2025, 12, 1), // valid
            ];
            let summary = summarize(expiries.iter(), today);
            assert_eq!(summary.expired, 2);
            assert_eq!(summary.expiring_soon, 2);
            assert_eq!(summary.valid, 1);
        }

        #[test]
        fn test_status_label_matches_json_form() {
            // CSV cells use as_str(); JSON responses use serde. Both must
            // render the same label for every variant.
            for status in [
                ExpiryStatus::Expired,
                ExpiryStatus::ExpiringSoon,
                ExpiryStatus::Valid,
            ] {
                let json = serde_json::to_value(status).unwrap();
                assert_eq!(json, serde_json::Value::String(status.as_str().to_string()));
            }
            assert_eq!(ExpiryStatus::ExpiringSoon.as_str(), "expiring_soon");
        }
    }

    mod progress {
        use super::date;
        use crate::logic::progress::{growth_progress, progress_tier, ProgressTier};

        #[test]
        fn test_midpoint_is_fifty_percent() {
            let p = growth_progress(date(2025, 1, 1), date(2025, 1, 11), date(2025, 1, 6));
            assert_eq!(p, 50.0);
        }

        #[test]
        fn test_harvest_day_is_hundred() {
            let p = growth_progress(date(2025, 1, 1), date(2025, 1, 11), date(2025, 1, 11));
            assert_eq!(p, 100.0);
        }

        #[test]
        fn test_before_planting_clamps_to_zero() {
            let p = growth_progress(date(2025, 1, 1), date(2025, 1, 11), date(2024, 12, 31));
            assert_eq!(p, 0.0);
        }

        #[test]
        fn test_after_harvest_clamps_to_hundred() {
            let p = growth_progress(date(2025, 1, 1), date(2025, 1, 11), date(2025, 3, 1));
            assert_eq!(p, 100.0);
        }

        #[test]
        fn test_zero_duration_window_reports_hundred() {
            let day = date(2025, 1, 1);
            assert_eq!(growth_progress(day, day, day), 100.0);
            // Inverted dates behave the same as zero duration.
            assert_eq!(
                growth_progress(date(2025, 2, 1), date(2025, 1, 1), day),
                100.0
            );
        }

        #[test]
        fn test_tier_boundaries() {
            assert_eq!(progress_tier(0.0), ProgressTier::Early);
            assert_eq!(progress_tier(29.9), ProgressTier::Early);
            assert_eq!(progress_tier(30.0), ProgressTier::Mid);
            assert_eq!(progress_tier(70.0), ProgressTier::Mid);
            assert_eq!(progress_tier(70.1), ProgressTier::Late);
            assert_eq!(progress_tier(100.0), ProgressTier::Late);
        }
    }

    mod filter {
        use super::date;
        use crate::logic::filter::{DateRange, FilterSpec, SqlParam};

        const SPEC: FilterSpec = FilterSpec::new(&["i.item_name", "i.sku"])
            .with_category("i.category_id")
            .with_date("i.expiry_date");

        #[test]
        fn test_empty_inputs_build_empty_clause() {
            let today = date(2025, 6, 15);
            let (clause, params) = SPEC.build(None, None, None, today, 1);
            assert!(clause.is_empty());
            assert!(params.is_empty());
        }

        #[test]
        fn test_search_uses_one_param_for_all_columns() {
            let today = date(2025, 6, 15);
            let (clause, params) = SPEC.build(Some("seed"), None, None, today, 1);
            assert_eq!(clause, "(i.item_name ILIKE $1 OR i.sku ILIKE $1)");
            assert_eq!(params, vec![SqlParam::Text("%seed%".to_string())]);
        }

        #[test]
        fn test_full_filter_numbers_placeholders_in_order() {
            let today = date(2025, 6, 15);
            let range = DateRange::Explicit {
                from: Some(date(2025, 6, 1)),
                to: Some(date(2025, 6, 30)),
            };
            let (clause, params) = SPEC.build(Some("seed"), Some(3), Some(range), today, 1);
            assert_eq!(
                clause,
                "(i.item_name ILIKE $1 OR i.sku ILIKE $1) AND i.category_id = $2 \
                 AND i.expiry_date >= $3 AND i.expiry_date <= $4"
            );
            assert_eq!(
                params,
                vec![
                    SqlParam::Text("%seed%".to_string()),
                    SqlParam::Int(3),
                    SqlParam::Date(date(2025, 6, 1)),
                    SqlParam::Date(date(2025, 6, 30)),
                ]
            );
        }

        #[test]
        fn test_builder_is_deterministic() {
            let today = date(2025, 6, 15);
            let range = Some(DateRange::ThisMonth);
            let first = SPEC.build(Some("npk"), Some(1), range, today, 1);
            let second = SPEC.build(Some("npk"), Some(1), range, today, 1);
            assert_eq!(first, second);
        }

        #[test]
        fn test_like_metacharacters_are_escaped() {
            let today = date(2025, 6, 15);
            let (_, params) = SPEC.build(Some("50%_mix"), None, None, today, 1);
            assert_eq!(params, vec![SqlParam::Text("%50\\%\\_mix%".to_string())]);
        }

        #[test]
        fn test_placeholder_offset() {
            let today = date(2025, 6, 15);
            let (clause, _) = SPEC.build(Some("seed"), None, None, today, 5);
            assert_eq!(clause, "(i.item_name ILIKE $5 OR i.sku ILIKE $5)");
        }

        #[test]
        fn test_preset_resolution() {
            // Sunday 2025-06-15; ISO week starts Monday 2025-06-09.
            let today = date(2025, 6, 15);

            assert_eq!(
                DateRange::Today.resolve(today),
                (Some(today), Some(today))
            );
            assert_eq!(
                DateRange::Yesterday.resolve(today),
                (Some(date(2025, 6, 14)), Some(date(2025, 6, 14)))
            );
            assert_eq!(
                DateRange::ThisWeek.resolve(today),
                (Some(date(2025, 6, 9)), Some(today))
            );
            assert_eq!(
                DateRange::ThisMonth.resolve(today),
                (Some(date(2025, 6, 1)), Some(today))
            );
            assert_eq!(
                DateRange::ThisYear.resolve(today),
                (Some(date(2025, 1, 1)), Some(today))
            );
        }

        #[test]
        fn test_preset_parsing() {
            assert_eq!(
                DateRange::from_query(Some("this_week"), None, None).unwrap(),
                Some(DateRange::ThisWeek)
            );
            assert_eq!(DateRange::from_query(None, None, None).unwrap(), None);
            assert!(DateRange::from_query(Some("fortnight"), None, None).is_err());

            let from = Some(date(2025, 1, 1));
            assert_eq!(
                DateRange::from_query(None, from, None).unwrap(),
                Some(DateRange::Explicit { from, to: None })
            );
        }
    }

    mod charts {
        use super::date;
        use crate::logic::charts::{count_by, count_by_ordered, monthly_histogram};

        #[test]
        fn test_count_by_sorts_labels() {
            let series = count_by(["pest", "drought", "pest", "frost"]);
            assert_eq!(series.labels, vec!["drought", "frost", "pest"]);
            assert_eq!(series.values, vec![1, 1, 2]);
        }

        #[test]
        fn test_count_by_ordered_keeps_domain_order() {
            let order = ["seedling", "vegetative", "flowering", "fruiting", "mature"];
            let series = count_by_ordered(["mature", "seedling", "mature"], &order);
            assert_eq!(series.labels.len(), 5);
            assert_eq!(series.values, vec![1, 0, 0, 0, 2]);
        }

        #[test]
        fn test_monthly_histogram_buckets_by_month_within_year() {
            let dates = [
                date(2025, 1, 10),
                date(2025, 1, 20),
                date(2025, 12, 31),
                date(2024, 1, 5), // other year, dropped
            ];
            let series = monthly_histogram(dates.iter(), 2025);
            assert_eq!(series.labels[0], "Jan");
            assert_eq!(series.values[0], 2);
            assert_eq!(series.values[11], 1);
            assert_eq!(series.values.iter().sum::<i64>(), 3);
        }
    }

    mod stock_request_ordering {
        use crate::commands::stock_requests::{
            listing_order_clause, priority_rank, status_rank, PRIORITY_ORDER, STATUS_ORDER,
        };

        #[test]
        fn test_status_rank_order() {
            assert!(status_rank("pending") < status_rank("approved"));
            assert!(status_rank("approved") < status_rank("fulfilled"));
            assert!(status_rank("fulfilled") < status_rank("rejected"));
            // Unknown statuses sort after everything.
            assert!(status_rank("garbage") > status_rank("rejected"));
        }

        #[test]
        fn test_priority_rank_order() {
            assert!(priority_rank("urgent") < priority_rank("high"));
            assert!(priority_rank("high") < priority_rank("medium"));
            assert!(priority_rank("medium") < priority_rank("low"));
        }

        #[test]
        fn test_order_clause_reflects_ranks() {
            // Every CASE arm in the listing SQL must carry the rank the
            // corresponding rank function reports.
            let clause = listing_order_clause();
            for status in STATUS_ORDER {
                let arm = format!("WHEN '{}' THEN {}", status, status_rank(status));
                assert!(clause.contains(&arm), "missing arm: {}", arm);
            }
            for priority in PRIORITY_ORDER {
                let arm = format!("WHEN '{}' THEN {}", priority, priority_rank(priority));
                assert!(clause.contains(&arm), "missing arm: {}", arm);
            }
            assert!(clause.ends_with("r.requested_at DESC"));
        }
    }

    mod growth_stages {
        use crate::commands::crops::is_valid_stage;

        #[test]
        fn test_stage_validation() {
            for stage in ["seedling", "vegetative", "flowering", "fruiting", "mature"] {
                assert!(is_valid_stage(stage));
            }
            assert!(!is_valid_stage("germinating"));
            assert!(!is_valid_stage(""));
        }
    }
}
