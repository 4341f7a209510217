use super::is_missing;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parses a `Time` cell into seconds: Unix seconds for full timestamps,
/// seconds since midnight for a bare time of day.
pub fn parse_time(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp() as f64);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp() as f64);
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(t.num_seconds_from_midnight() as f64);
        }
    }
    None
}

/// X coordinates for a time column.
///
/// Missing cells give `None` and drop out of the plot. Every other cell must
/// parse for the column to be treated as time; otherwise all rows are placed
/// at their ordinal position.
pub fn time_axis(cells: &[&str]) -> (Vec<Option<f64>>, bool) {
    let ordinals = || (0..cells.len()).map(|i| Some(i as f64)).collect();

    let mut xs = Vec::with_capacity(cells.len());
    for cell in cells {
        if is_missing(cell) {
            xs.push(None);
            continue;
        }
        match parse_time(cell) {
            Some(x) => xs.push(Some(x)),
            None => return (ordinals(), false),
        }
    }

    if xs.iter().all(Option::is_none) {
        return (ordinals(), false);
    }
    (xs, true)
}
