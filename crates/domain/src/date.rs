use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidDateError {
    #[error("Date: `{0}` is malformed, expected the format YYYY-MM-DD")]
    Malformed(String),
    #[error("Date: `{0}` is out of the supported range")]
    OutOfRange(String),
}

/// Parses a calendar date on the form `YYYY-MM-DD`. Leading zeros on
/// month and day are optional.
pub fn parse_date(datestr: &str) -> Result<NaiveDate, InvalidDateError> {
    let malformed = || InvalidDateError::Malformed(datestr.to_string());

    let parts = datestr.trim().split('-').collect::<Vec<_>>();
    if parts.len() != 3 {
        return Err(malformed());
    }
    let year = parts[0].parse::<i32>().map_err(|_| malformed())?;
    let month = parts[1].parse::<u32>().map_err(|_| malformed())?;
    let day = parts[2].parse::<u32>().map_err(|_| malformed())?;

    if !(1970..=2100).contains(&year) {
        return Err(InvalidDateError::OutOfRange(datestr.to_string()));
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%F").to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_accepts_valid_dates() {
        let valid_dates = vec![
            "2018-1-1",
            "2025-12-31",
            "2020-1-12",
            "2020-2-29",
            "2020-02-2",
            "2020-02-02",
            "2020-2-09",
        ];

        for date in &valid_dates {
            assert!(parse_date(date).is_ok(), "{} should be valid", date);
        }
    }

    #[test]
    fn it_rejects_invalid_dates() {
        let invalid_dates = vec![
            "2018--1-1",
            "2020-1-32",
            "2020-2-30",
            "2021-2-29",
            "2020-0-1",
            "2020-1-0",
            "",
            "tomorrow",
        ];

        for date in &invalid_dates {
            assert!(parse_date(date).is_err(), "{} should be invalid", date);
        }
    }

    #[test]
    fn it_rejects_dates_out_of_range() {
        assert_eq!(
            parse_date("1960-1-1"),
            Err(InvalidDateError::OutOfRange("1960-1-1".into()))
        );
    }

    #[test]
    fn it_formats_dates_with_padding() {
        let date = parse_date("2025-6-3").unwrap();
        assert_eq!(format_date(&date), "2025-06-03");
    }
}
