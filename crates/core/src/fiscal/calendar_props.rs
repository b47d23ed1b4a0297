//! Property-based tests for fiscal calendar generation.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use super::calendar::PeriodLedger;

/// Strategy for a year start between 2000 and 2049 on any day.
fn year_start() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2050, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* fiscal year, generated periods cover every day exactly once.
    #[test]
    fn prop_periods_tile_the_year(start in year_start(), length in 30i64..800) {
        let end = start + Duration::days(length);
        let mut ledger = PeriodLedger::new();
        let (_, periods) = ledger.create_fiscal_year("FY", start, end).unwrap();

        prop_assert_eq!(periods.first().unwrap().start_date, start);
        prop_assert_eq!(periods.last().unwrap().end_date, end);
        for pair in periods.windows(2) {
            prop_assert_eq!(pair[0].end_date + Duration::days(1), pair[1].start_date);
            prop_assert_eq!(pair[0].period_number + 1, pair[1].period_number);
        }
    }

    /// *For any* date inside the year, `period_for` returns the one period containing it.
    #[test]
    fn prop_period_for_contains_date(start in year_start(), offset in 0i64..365) {
        let end = start + Duration::days(364);
        let mut ledger = PeriodLedger::new();
        let (_, periods) = ledger.create_fiscal_year("FY", start, end).unwrap();

        let date = start + Duration::days(offset);
        let found = ledger.period_for(date).unwrap();
        prop_assert!(found.contains_date(date));
        prop_assert_eq!(periods.iter().filter(|p| p.contains_date(date)).count(), 1);
    }
}
