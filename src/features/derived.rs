//! Stage one: sparse named fields derived from one raw record.

use super::columns::*;
use crate::artifacts::LabelEncoder;
use crate::booking::{day_number, is_weekend, IndicatorLevel, RawBookingAttributes};
use crate::error::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Variable-shape record: only the fields this booking produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    fields: BTreeMap<String, f64>,
    indicators: BTreeSet<String>,
}

impl DerivedFeatures {
    fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            indicators: BTreeSet::new(),
        }
    }

    fn set(&mut self, name: &str, value: f64) {
        self.fields.insert(name.to_string(), value);
    }

    fn indicator<T: IndicatorLevel>(&mut self, level: T) {
        let name = level.column_name();
        self.fields.insert(name.clone(), 1.0);
        self.indicators.insert(name);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_indicator(&self, name: &str) -> bool {
        self.indicators.contains(name)
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Day mapping, weekend flag, label encoding and indicator expansion.
///
/// Every level of an expanded field emits its own `{field}_{level}` column here;
/// the reference level's column is absent from the training schema and is dropped
/// at alignment, which leaves its block all zero.
pub fn derive(
    raw: &RawBookingAttributes,
    routes: &LabelEncoder,
    origins: &LabelEncoder,
) -> Result<DerivedFeatures> {
    let route = routes.transform(&raw.route)?;
    let origin = origins.transform(&raw.booking_origin)?;

    let mut d = DerivedFeatures::new();
    d.set(NUM_PASSENGERS, raw.num_passengers as f64);
    d.set(PURCHASE_LEAD, raw.purchase_lead as f64);
    d.set(LENGTH_OF_STAY, raw.length_of_stay as f64);
    d.set(FLIGHT_HOUR, raw.flight_hour as f64);
    d.set(FLIGHT_DAY, day_number(raw.flight_day) as f64);
    d.set(ROUTE, route as f64);
    d.set(BOOKING_ORIGIN, origin as f64);
    d.set(WANTS_EXTRA_BAGGAGE, flag(raw.wants_extra_baggage));
    d.set(WANTS_PREFERRED_SEAT, flag(raw.wants_preferred_seat));
    d.set(WANTS_IN_FLIGHT_MEALS, flag(raw.wants_in_flight_meals));
    d.set(FLIGHT_DURATION, raw.flight_duration);
    d.set(IS_WEEKEND, flag(is_weekend(raw.flight_day)));
    d.indicator(raw.sales_channel);
    d.indicator(raw.trip_type);
    Ok(d)
}
