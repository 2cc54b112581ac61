use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Color used for occupied-date shading unless the config overrides it.
pub const DEFAULT_BLOCK_COLOR: &str = "#ff9f89";

/// Blocks are painted behind the grid and never take clicks.
pub const BLOCK_DISPLAY: &str = "background";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("occupied interval {index} ends on {end}, the last representable date")]
    DateOverflow { index: usize, end: NaiveDate },

    #[error("invalid calendar month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// A closed date range during which a room is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedInterval {
    #[serde(alias = "startDate", alias = "start_date", deserialize_with = "date_prefix")]
    pub start: NaiveDate,
    #[serde(alias = "endDate", alias = "end_date", deserialize_with = "date_prefix")]
    pub end: NaiveDate,
}

impl OccupiedInterval {
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// Accepts `YYYY-MM-DD` as well as datetimes (`T` or space after the date)
/// by reading the date prefix. Any other trailing text is rejected.
fn date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date = match raw.as_bytes().get(10) {
        None => raw.as_str(),
        Some(b'T') | Some(b' ') => &raw[..10],
        Some(_) => {
            return Err(serde::de::Error::custom(format!(
                "invalid date '{raw}': unexpected text after the date"
            )))
        }
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{raw}': {e}")))
}

/// Half-open date range painted as background shading on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarBlock {
    pub id: usize,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub display: &'static str,
    pub color: String,
}

impl CalendarBlock {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

/// Convert inclusive occupied intervals into exclusive-end calendar blocks,
/// one per interval, in input order.
///
/// Overlaps and inverted ranges are passed through unchanged; inverted ones
/// are logged.
pub fn to_calendar_blocks(
    intervals: &[OccupiedInterval],
    color: &str,
) -> Result<Vec<CalendarBlock>, CalendarError> {
    intervals
        .iter()
        .enumerate()
        .map(|(index, interval)| {
            if interval.is_inverted() {
                warn!(
                    "Occupied interval {} ends before it starts ({} > {})",
                    index, interval.start, interval.end
                );
            }
            let end = interval
                .end
                .succ_opt()
                .ok_or(CalendarError::DateOverflow {
                    index,
                    end: interval.end,
                })?;
            Ok(CalendarBlock {
                id: index,
                start: interval.start,
                end,
                display: BLOCK_DISPLAY,
                color: color.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub occupied: bool,
}

/// One month laid out in Monday-first weeks. Cells outside the month are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub first: NaiveDate,
    pub weeks: Vec<[Option<GridDay>; 7]>,
}

impl MonthGrid {
    pub fn build(year: i32, month: u32, blocks: &[CalendarBlock]) -> Result<Self, CalendarError> {
        let invalid = CalendarError::InvalidMonth { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
        let next_first = next_month_start(first).ok_or(invalid)?;

        let mut weeks = Vec::new();
        let mut week: [Option<GridDay>; 7] = [None; 7];
        let mut day = first;
        while day < next_first {
            let col = day.weekday().num_days_from_monday() as usize;
            week[col] = Some(GridDay {
                date: day,
                occupied: blocks.iter().any(|b| b.covers(day)),
            });
            if col == 6 {
                weeks.push(week);
                week = [None; 7];
            }
            day += Duration::days(1);
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }

        Ok(Self { first, weeks })
    }

    pub fn previous_month(&self) -> Option<NaiveDate> {
        self.first.pred_opt().map(|d| d.with_day(1).unwrap_or(d))
    }

    pub fn next_month(&self) -> Option<NaiveDate> {
        next_month_start(self.first)
    }

    pub fn occupied_days(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .filter(|d| d.occupied)
            .count()
    }
}

fn next_month_start(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
}
