//! Date argument parsing and date-range queries

use chrono::{Days, Months, NaiveDate};

/// A date argument that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid <date> format: {0:?}")]
pub struct DateArgError(pub String);

/// Resolve a date argument to an absolute date relative to `today`.
///
/// Accepted forms (case-insensitive):
/// - `YYYY-MM-DD`
/// - `today`, `yesterday`
/// - `N d|day|days ago`
/// - `N w|wk|wks|week|weeks ago`
/// - `N y|yr|yrs|year|years ago`
pub fn parse_date_arg(arg: &str, today: NaiveDate) -> Result<NaiveDate, DateArgError> {
    let invalid = || DateArgError(arg.to_string());
    let words: Vec<String> = arg.split_whitespace().map(str::to_lowercase).collect();

    match words.as_slice() {
        [word] if word == "today" => return Ok(today),
        [word] if word == "yesterday" => {
            return today.checked_sub_days(Days::new(1)).ok_or_else(invalid);
        }
        [count, unit, ago] if ago == "ago" => {
            let n: u32 = count.parse().map_err(|_| invalid())?;
            let date = match unit.as_str() {
                "d" | "day" | "days" => today.checked_sub_days(Days::new(n.into())),
                "w" | "wk" | "wks" | "week" | "weeks" => {
                    today.checked_sub_days(Days::new(u64::from(n) * 7))
                }
                // Feb 29 lands on Feb 28 in non-leap years
                "y" | "yr" | "yrs" | "year" | "years" => n
                    .checked_mul(12)
                    .and_then(|months| today.checked_sub_months(Months::new(months))),
                _ => None,
            };
            return date.ok_or_else(invalid);
        }
        _ => {}
    }

    NaiveDate::parse_from_str(arg.trim(), "%Y-%m-%d").map_err(|_| invalid())
}

/// Build the search query restricting results to `[since, until)`.
///
/// Returns `None` when neither bound is given.
pub fn date_query(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Option<String> {
    let mut filters = Vec::new();
    if let Some(since) = since {
        filters.push(format!("after:{}", since.format("%Y-%m-%d")));
    }
    if let Some(until) = until {
        filters.push(format!("before:{}", until.format("%Y-%m-%d")));
    }
    (!filters.is_empty()).then(|| filters.join(" "))
}
