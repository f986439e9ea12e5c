use chrono::{DateTime, FixedOffset, NaiveDate};

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    let offset = FixedOffset::east_opt(7 * 60 * 60).unwrap(); // +0700
    datetime
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime?;
    let offset = FixedOffset::east_opt(7 * 60 * 60).unwrap(); // +0700
    Some(
        datetime
            .unwrap()
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Number of calendar days in the range, both endpoints counted.
pub fn inclusive_day_count(from: NaiveDate, to: NaiveDate) -> i32 {
    (to - from).num_days() as i32 + 1
}

#[cfg(test)]
mod test_inclusive_day_count {
    use chrono::NaiveDate;

    use super::inclusive_day_count;

    #[test]
    fn test_single_day() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(inclusive_day_count(day, day), 1);
    }

    #[test]
    fn test_multi_day_range() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        assert_eq!(inclusive_day_count(from, to), 3);
    }

    #[test]
    fn test_crosses_month_boundary() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        assert_eq!(inclusive_day_count(from, to), 4);
    }
}
