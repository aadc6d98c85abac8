//! Calendar fields used to shape and group hourly series
//!
//! Hours, weekdays and ordinal days are read in a caller-supplied time zone so
//! that "local" bands (morning ramp, evening peak, weekends) line up with the
//! site being modelled rather than with UTC.

use crate::{MathError, Result};
use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Days used for the yearly seasonal cycle
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Local calendar position of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    /// Hour of day, 0..=23
    pub hour: u32,
    /// Day of week, 0 = Sunday ..= 6 = Saturday
    pub weekday: u32,
    /// Ordinal day of year, 1-based
    pub day_of_year: u32,
}

impl CalendarFields {
    /// Read the calendar fields of `timestamp` in `zone`
    pub fn at<Tz: TimeZone>(timestamp: &DateTime<Utc>, zone: &Tz) -> Self {
        let local = timestamp.with_timezone(zone);
        Self {
            hour: local.hour(),
            weekday: local.weekday().num_days_from_sunday(),
            day_of_year: local.ordinal(),
        }
    }

    /// Read the calendar fields of `timestamp` in UTC
    pub fn utc(timestamp: &DateTime<Utc>) -> Self {
        Self::at(timestamp, &Utc)
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        self.weekday == 0 || self.weekday == 6
    }

    /// Angle of the day within the yearly cycle, `2π·doy/365`
    pub fn year_phase(&self) -> f64 {
        2.0 * PI * self.day_of_year as f64 / DAYS_PER_YEAR
    }
}

/// Build a fixed UTC offset from whole hours
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            MathError::InvalidInput(format!(
                "utc offset must be within ±23 hours, got {}",
                hours
            ))
        })
}
