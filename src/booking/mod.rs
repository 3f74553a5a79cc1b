//! Raw booking attributes as entered by a customer, before any encoding.

use crate::error::{Error, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Low-cardinality categoricals that are expanded into indicator columns.
pub trait IndicatorLevel: Copy + Sized + 'static {
    /// Field name, also the prefix of its indicator columns
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn column_name(&self) -> String {
        format!("{}_{}", Self::FIELD, self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesChannel {
    Internet,
    Mobile,
}

impl IndicatorLevel for SalesChannel {
    const FIELD: &'static str = "sales_channel";
    const ALL: &'static [Self] = &[SalesChannel::Internet, SalesChannel::Mobile];

    fn label(&self) -> &'static str {
        match self {
            SalesChannel::Internet => "Internet",
            SalesChannel::Mobile => "Mobile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripType {
    RoundTrip,
    OneWay,
    CircleTrip,
}

impl IndicatorLevel for TripType {
    const FIELD: &'static str = "trip_type";
    const ALL: &'static [Self] = &[TripType::RoundTrip, TripType::OneWay, TripType::CircleTrip];

    fn label(&self) -> &'static str {
        match self {
            TripType::RoundTrip => "RoundTrip",
            TripType::OneWay => "OneWay",
            TripType::CircleTrip => "CircleTrip",
        }
    }
}

fn parse_level<T: IndicatorLevel>(s: &str) -> Result<T> {
    T::ALL
        .iter()
        .copied()
        .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| {
            let known: Vec<&str> = T::ALL.iter().map(|l| l.label()).collect();
            Error::invalid(T::FIELD, format!("'{}' is not one of {}", s, known.join(", ")))
        })
}

impl FromStr for SalesChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_level(s)
    }
}

impl FromStr for TripType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_level(s)
    }
}

impl fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookingAttributes {
    pub num_passengers: u32,
    pub sales_channel: SalesChannel,
    pub trip_type: TripType,
    /// Days between purchase and departure
    pub purchase_lead: u32,
    /// Days
    pub length_of_stay: u32,
    /// 0-23
    pub flight_hour: u8,
    /// Serialized as Mon..Sun
    pub flight_day: Weekday,
    pub route: String,
    pub booking_origin: String,
    pub wants_extra_baggage: bool,
    pub wants_preferred_seat: bool,
    pub wants_in_flight_meals: bool,
    /// Hours
    pub flight_duration: f64,
}

impl RawBookingAttributes {
    /// Domain checks on the numeric fields. Categorical membership is the encoders' job.
    pub fn validate(&self) -> Result<()> {
        if self.num_passengers == 0 {
            return Err(Error::invalid("num_passengers", "must be at least 1"));
        }
        if self.flight_hour > 23 {
            return Err(Error::invalid(
                "flight_hour",
                format!("{} is outside 0-23", self.flight_hour),
            ));
        }
        if !self.flight_duration.is_finite() || self.flight_duration < 0.0 {
            return Err(Error::invalid(
                "flight_duration",
                format!("{} is not a non-negative number of hours", self.flight_duration),
            ));
        }
        Ok(())
    }
}

/// Monday=1 .. Sunday=7
pub fn day_number(day: Weekday) -> u32 {
    day.number_from_monday()
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
