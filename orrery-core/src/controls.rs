//! Validation of user control inputs before they reach the clock
//!
//! Each check stops at the first failing field; messages are shown to the
//! user verbatim.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Year must be a number")]
    YearNotNumeric,
    #[error("Year must be a value from 1 to 9999")]
    YearOutOfRange,
    #[error("Month must be a number")]
    MonthNotNumeric,
    #[error("Month must be a value from 1 to 12")]
    MonthOutOfRange,
    #[error("Day must be a number")]
    DayNotNumeric,
    #[error("Day must be a value from 1 to 31")]
    DayOutOfRange,
    #[error("Day ({day}) does not exist in month {month}/{year}")]
    DayNotInMonth {
        year: String,
        month: String,
        day: String,
    },
    #[error("Speed must be a value from 1 to 60")]
    SpeedOutOfRange,
    #[error("Days per frame must be a value from 1 to 50")]
    StepsPerFrameOutOfRange,
}

pub const SPEED_RANGE: (f64, f64) = (1.0, 60.0);
pub const STEPS_PER_FRAME_RANGE: (u32, u32) = (1, 50);

/// Parse a target date from three text fields. Surrounding whitespace is
/// ignored.
pub fn validate_target_date(year: &str, month: &str, day: &str) -> Result<NaiveDate, InputError> {
    let (year, month, day) = (year.trim(), month.trim(), day.trim());
    let y = parse_field(year, 1, 9999, InputError::YearNotNumeric, InputError::YearOutOfRange)?;
    let m = parse_field(month, 1, 12, InputError::MonthNotNumeric, InputError::MonthOutOfRange)?;
    let d = parse_field(day, 1, 31, InputError::DayNotNumeric, InputError::DayOutOfRange)?;

    // y <= 9999 always fits in i32
    NaiveDate::from_ymd_opt(y as i32, m, d).ok_or_else(|| InputError::DayNotInMonth {
        year: year.to_string(),
        month: month.to_string(),
        day: day.to_string(),
    })
}

/// Animation speed in frames per second, within [1, 60]
pub fn parse_speed(text: &str) -> Result<f64, InputError> {
    let (min, max) = SPEED_RANGE;
    match text.trim().parse::<f64>() {
        Ok(speed) if (min..=max).contains(&speed) => Ok(speed),
        _ => Err(InputError::SpeedOutOfRange),
    }
}

/// Days per frame within [1, 50], rounded to the nearest whole day
pub fn parse_steps_per_frame(text: &str) -> Result<u32, InputError> {
    let (min, max) = STEPS_PER_FRAME_RANGE;
    match text.trim().parse::<f64>() {
        Ok(value) if (f64::from(min)..=f64::from(max)).contains(&value) => Ok(value.round() as u32),
        _ => Err(InputError::StepsPerFrameOutOfRange),
    }
}

fn parse_field(
    text: &str,
    min: u32,
    max: u32,
    not_numeric: InputError,
    out_of_range: InputError,
) -> Result<u32, InputError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric);
    }
    // digits that overflow u32 are out of range too
    match text.parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(out_of_range),
    }
}
