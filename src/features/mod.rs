//! Feature reconstruction: raw booking attributes → derived named fields →
//! aligned training-schema vector → scaled classifier input.

mod align;
mod derived;
mod pipeline;

pub use align::align;
pub use derived::{derive, DerivedFeatures};
pub use pipeline::{FeatureReconstructor, Reconstruction};

use std::marker::PhantomData;
use std::sync::Arc;

/// Derived field names, matching the training frame's columns
pub mod columns {
    pub const NUM_PASSENGERS: &str = "num_passengers";
    pub const PURCHASE_LEAD: &str = "purchase_lead";
    pub const LENGTH_OF_STAY: &str = "length_of_stay";
    pub const FLIGHT_HOUR: &str = "flight_hour";
    pub const FLIGHT_DAY: &str = "flight_day";
    pub const ROUTE: &str = "route";
    pub const BOOKING_ORIGIN: &str = "booking_origin";
    pub const WANTS_EXTRA_BAGGAGE: &str = "wants_extra_baggage";
    pub const WANTS_PREFERRED_SEAT: &str = "wants_preferred_seat";
    pub const WANTS_IN_FLIGHT_MEALS: &str = "wants_in_flight_meals";
    pub const FLIGHT_DURATION: &str = "flight_duration";
    pub const IS_WEEKEND: &str = "is_weekend";
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aligned;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled;

/// Dense vector in training column order. `S` records which stage produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<S> {
    columns: Arc<[String]>,
    values: Vec<f64>,
    _stage: PhantomData<S>,
}

pub type AlignedFeatures = FeatureVector<Aligned>;
pub type ScaledFeatures = FeatureVector<Scaled>;

impl<S> FeatureVector<S> {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            columns,
            values,
            _stage: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// (column, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
