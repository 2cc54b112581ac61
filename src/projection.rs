use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of trailing months averaged into the projection.
pub const WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("malformed month label '{0}' (expected MM/YYYY)")]
    Malformed(String),

    #[error("invalid month {month} in label (must be 1..=12)")]
    InvalidMonth { month: u32 },

    #[error("invalid year {year} in label (must be 1..=9999)")]
    InvalidYear { year: i32 },
}

/// A calendar month as the backend labels it: `MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthLabel {
    year: i32,
    month: u32,
}

impl MonthLabel {
    pub fn new(year: i32, month: u32) -> Result<Self, LabelError> {
        if !(1..=12).contains(&month) {
            return Err(LabelError::InvalidMonth { month });
        }
        if !(1..=9999).contains(&year) {
            return Err(LabelError::InvalidYear { year });
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// The following calendar month, rolling December over into January.
    /// `None` after December 9999, which has no representable successor.
    pub fn next(self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1).ok()
        } else {
            Self::new(self.year, self.month + 1).ok()
        }
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl FromStr for MonthLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LabelError::Malformed(s.to_string());
        let (month, year) = s.trim().split_once('/').ok_or_else(malformed)?;
        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(month, 2) || !digits(year, 4) {
            return Err(malformed());
        }
        let month: u32 = month.parse().map_err(|_| malformed())?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthLabel {
    type Error = LabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MonthLabel> for String {
    fn from(label: MonthLabel) -> Self {
        label.to_string()
    }
}

/// Observed reservations for one month, as returned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: MonthLabel,
    pub count: u32,
}

/// Estimated reservations for the month after the last observed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedMonth {
    pub month: MonthLabel,
    pub count: u32,
}

/// Project next month's reservations from the trailing average of the last
/// [`WINDOW`] months. Returns `None` when there is no history or the last
/// month has no successor label.
///
/// The mean is rounded half-up. The label is taken from the literal last
/// entry; contiguity of the history is not checked.
pub fn project_next_month(history: &[MonthlyCount]) -> Option<ProjectedMonth> {
    let last = history.last()?;
    let month = last.month.next()?;
    let window = &history[history.len().saturating_sub(WINDOW)..];

    let n = window.len() as u64;
    let sum: u64 = window.iter().map(|m| u64::from(m.count)).sum();
    // floor((sum / n) + 1/2) without leaving integers
    let rounded = (2 * sum + n) / (2 * n);

    Some(ProjectedMonth {
        month,
        // mean of u32 values always fits in u32
        count: rounded as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u32)]) -> Vec<MonthlyCount> {
        entries
            .iter()
            .map(|(m, c)| MonthlyCount {
                month: m.parse().unwrap(),
                count: *c,
            })
            .collect()
    }

    #[test]
    fn test_three_months_average() {
        let history = counts(&[("01/2025", 10), ("02/2025", 20), ("03/2025", 30)]);
        let p = project_next_month(&history).unwrap();
        assert_eq!(p.month.to_string(), "04/2025");
        assert_eq!(p.count, 20);
    }

    #[test]
    fn test_single_month() {
        let history = counts(&[("11/2024", 5)]);
        let p = project_next_month(&history).unwrap();
        assert_eq!(p.month.to_string(), "12/2024");
        assert_eq!(p.count, 5);
    }

    #[test]
    fn test_empty_history_has_no_projection() {
        assert_eq!(project_next_month(&[]), None);
    }

    #[test]
    fn test_only_last_three_months_count() {
        let a = counts(&[("01/2025", 1000), ("02/2025", 3), ("03/2025", 4), ("04/2025", 5)]);
        let b = counts(&[("01/2025", 0), ("02/2025", 3), ("03/2025", 4), ("04/2025", 5)]);
        assert_eq!(project_next_month(&a), project_next_month(&b));
        assert_eq!(project_next_month(&a).unwrap().count, 4);
    }

    #[test]
    fn test_rounds_half_up() {
        // 1.5 -> 2
        let p = project_next_month(&counts(&[("01/2025", 1), ("02/2025", 2)])).unwrap();
        assert_eq!(p.count, 2);
        // 4/3 -> 1
        let p = project_next_month(&counts(&[("01/2025", 1), ("02/2025", 1), ("03/2025", 2)]))
            .unwrap();
        assert_eq!(p.count, 1);
        // 5/3 -> 2
        let p = project_next_month(&counts(&[("01/2025", 1), ("02/2025", 2), ("03/2025", 2)]))
            .unwrap();
        assert_eq!(p.count, 2);
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        let history = counts(&[("01/2025", u32::MAX), ("02/2025", u32::MAX), ("03/2025", u32::MAX)]);
        assert_eq!(project_next_month(&history).unwrap().count, u32::MAX);
    }

    #[test]
    fn test_year_rollover() {
        let p = project_next_month(&counts(&[("12/2024", 7)])).unwrap();
        assert_eq!(p.month.to_string(), "01/2025");
    }

    #[test]
    fn test_last_representable_month_has_no_successor() {
        let last: MonthLabel = "12/9999".parse().unwrap();
        assert_eq!(last.next(), None);
        assert_eq!(
            "11/9999".parse::<MonthLabel>().unwrap().next(),
            Some(MonthLabel::new(9999, 12).unwrap())
        );
        assert_eq!(project_next_month(&counts(&[("12/9999", 4)])), None);
    }

    #[test]
    fn test_label_parse_and_display() {
        let label: MonthLabel = "3/2025".parse().unwrap();
        assert_eq!(label.month(), 3);
        assert_eq!(label.year(), 2025);
        assert_eq!(label.to_string(), "03/2025");
    }

    #[test]
    fn test_label_rejects_garbage() {
        assert!(matches!("2025-03".parse::<MonthLabel>(), Err(LabelError::Malformed(_))));
        assert!(matches!("/2025".parse::<MonthLabel>(), Err(LabelError::Malformed(_))));
        assert!(matches!("-1/2025".parse::<MonthLabel>(), Err(LabelError::Malformed(_))));
        assert_eq!(
            "13/2025".parse::<MonthLabel>(),
            Err(LabelError::InvalidMonth { month: 13 })
        );
        assert_eq!(
            "01/0000".parse::<MonthLabel>(),
            Err(LabelError::InvalidYear { year: 0 })
        );
    }

    #[test]
    fn test_monthly_count_serde() {
        let parsed: Vec<MonthlyCount> =
            serde_json::from_str(r#"[{"month":"09/2024","count":12}]"#).unwrap();
        assert_eq!(parsed[0].month, MonthLabel::new(2024, 9).unwrap());
        assert_eq!(parsed[0].count, 12);

        let json = serde_json::to_string(&parsed[0]).unwrap();
        assert_eq!(json, r#"{"month":"09/2024","count":12}"#);

        let bad: Result<Vec<MonthlyCount>, _> =
            serde_json::from_str(r#"[{"month":"September","count":12}]"#);
        assert!(bad.is_err());
        let negative: Result<Vec<MonthlyCount>, _> =
            serde_json::from_str(r#"[{"month":"09/2024","count":-1}]"#);
        assert!(negative.is_err());
    }
}
