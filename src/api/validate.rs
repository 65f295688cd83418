//! Request parameter parsing. All failures are `ApiError::Validation`.

use chrono::NaiveDate;

use crate::api::error::ApiError;
use crate::domain::DateRange;

/// Treat missing and blank parameters alike.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some).map_err(|_| {
        ApiError::Validation(format!("Invalid {name} format '{raw}'. Expected YYYY-MM-DD format"))
    })
}

pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, ApiError> {
    let start = parse_date_param("start_date", start)?;
    let end = parse_date_param("end_date", end)?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ApiError::Validation(format!(
                "start_date ({s}) must be less than or equal to end_date ({e})"
            )));
        }
    }
    Ok(DateRange::new(start, end))
}

pub fn parse_window(value: Option<&str>, default: usize) -> Result<usize, ApiError> {
    let Some(raw) = non_empty(value) else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(ApiError::Validation(format!(
            "Invalid window '{raw}'. Expected a positive integer"
        ))),
    }
}

pub fn parse_alpha(value: Option<&str>, default: f64) -> Result<f64, ApiError> {
    let Some(raw) = non_empty(value) else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(a) if a > 0.0 && a < 1.0 => Ok(a),
        _ => Err(ApiError::Validation(format!(
            "Invalid alpha '{raw}'. Expected a number between 0 and 1"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_parameters_are_absent() {
        assert_eq!(parse_date_param("start_date", Some("  ")).unwrap(), None);
        assert_eq!(parse_window(Some(""), 30).unwrap(), 30);
        assert_eq!(parse_alpha(None, 0.05).unwrap(), 0.05);
    }

    #[test]
    fn dates_must_be_iso() {
        let err = parse_date_param("start_date", Some("01/02/2020")).unwrap_err();
        assert_eq!(
            message(err),
            "Invalid start_date format '01/02/2020'. Expected YYYY-MM-DD format"
        );
        assert!(parse_date_param("end_date", Some("2020-02-30")).is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = parse_date_range(Some("2021-01-01"), Some("2020-01-01")).unwrap_err();
        assert_eq!(
            message(err),
            "start_date (2021-01-01) must be less than or equal to end_date (2020-01-01)"
        );
        let same = parse_date_range(Some("2020-01-01"), Some("2020-01-01")).unwrap();
        assert_eq!(same.start, same.end);
    }

    #[test]
    fn window_and_alpha_bounds() {
        assert!(parse_window(Some("0"), 30).is_err());
        assert!(parse_window(Some("-5"), 30).is_err());
        assert_eq!(parse_window(Some("60"), 30).unwrap(), 60);
        assert!(parse_alpha(Some("1"), 0.05).is_err());
        assert!(parse_alpha(Some("abc"), 0.05).is_err());
        assert_eq!(parse_alpha(Some("0.01"), 0.05).unwrap(), 0.01);
    }
}
