use chrono::{DateTime, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::str::FromStr;

use crate::error::{BillingError, Result};

/// Reporting window, measured back from the start of today in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Quarter,
    Year,
    All,
    /// Inclusive calendar dates
    Custom { from: NaiveDate, to: NaiveDate },
}

impl Period {
    /// Build a period from CLI input. Giving `from`/`to` without a name means a
    /// custom range.
    pub fn parse(name: Option<&str>, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let name = match name {
            Some(n) => n.to_ascii_lowercase(),
            None if from.is_some() || to.is_some() => "custom".to_string(),
            None => return Ok(Period::All),
        };
        match name.as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            "custom" => match (from, to) {
                (Some(from), Some(to)) => Ok(Period::Custom {
                    from: parse_date(from)?,
                    to: parse_date(to)?,
                }),
                _ => Err(BillingError::IncompleteCustomPeriod),
            },
            _ => Err(BillingError::InvalidPeriod(name)),
        }
    }

    pub fn includes(&self, at: DateTime<Utc>) -> bool {
        self.includes_at(at.with_timezone(&Local).naive_local(), Local::now().naive_local())
    }

    /// Whether local time `at` falls in the period as seen from local time `now`.
    pub fn includes_at(&self, at: NaiveDateTime, now: NaiveDateTime) -> bool {
        let today = now.date();
        let start = match self {
            Period::All => return true,
            Period::Custom { from, to } => {
                let day = at.date();
                return day >= *from && day <= *to;
            }
            Period::Today => Some(today),
            Period::Week => today.checked_sub_days(Days::new(7)),
            Period::Month => today.checked_sub_months(Months::new(1)),
            Period::Quarter => today.checked_sub_months(Months::new(3)),
            Period::Year => today.checked_sub_months(Months::new(12)),
        };
        match start {
            Some(start) => at >= start.and_time(NaiveTime::MIN),
            None => true,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::Today => "Today".to_string(),
            Period::Week => "This Week".to_string(),
            Period::Month => "This Month".to_string(),
            Period::Quarter => "This Quarter".to_string(),
            Period::Year => "This Year".to_string(),
            Period::All => "All Time".to_string(),
            Period::Custom { from, to } => format!("{from} to {to}"),
        }
    }
}

impl FromStr for Period {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(Some(s), None, None)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| BillingError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn today_starts_at_local_midnight() {
        let now = at("2026-03-15 10:00:00");
        assert!(Period::Today.includes_at(at("2026-03-15 00:00:00"), now));
        assert!(!Period::Today.includes_at(at("2026-03-14 23:59:59"), now));
    }

    #[test]
    fn rolling_windows() {
        let now = at("2026-03-15 10:00:00");
        assert!(Period::Week.includes_at(at("2026-03-08 00:00:00"), now));
        assert!(!Period::Week.includes_at(at("2026-03-07 23:00:00"), now));
        assert!(Period::Month.includes_at(at("2026-02-15 08:00:00"), now));
        assert!(!Period::Month.includes_at(at("2026-02-14 08:00:00"), now));
        assert!(Period::Quarter.includes_at(at("2025-12-15 00:00:00"), now));
        assert!(Period::Year.includes_at(at("2025-03-15 00:00:00"), now));
        assert!(!Period::Year.includes_at(at("2025-03-14 00:00:00"), now));
        assert!(Period::All.includes_at(at("1999-01-01 00:00:00"), now));
    }

    #[test]
    fn custom_range_includes_whole_end_day() {
        let period = Period::parse(None, Some("2026-01-01"), Some("2026-01-31")).unwrap();
        let now = at("2026-03-15 10:00:00");
        assert!(period.includes_at(at("2026-01-31 23:59:59"), now));
        assert!(period.includes_at(at("2026-01-01 00:00:00"), now));
        assert!(!period.includes_at(at("2026-02-01 00:00:00"), now));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            "fortnight".parse::<Period>(),
            Err(BillingError::InvalidPeriod(_))
        ));
        assert!(matches!(
            Period::parse(Some("custom"), Some("2026-01-01"), None),
            Err(BillingError::IncompleteCustomPeriod)
        ));
        assert!(matches!(
            Period::parse(None, Some("01/01/2026"), Some("2026-01-31")),
            Err(BillingError::InvalidDate(_))
        ));
        assert_eq!(Period::parse(None, None, None).unwrap(), Period::All);
    }
}
