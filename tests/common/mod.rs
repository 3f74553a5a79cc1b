//! Shared fixtures: the checked-in bundle and a baseline booking.

#![allow(dead_code)]

use chrono::Weekday;
use skycast::artifacts::ArtifactBundle;
use skycast::booking::{RawBookingAttributes, SalesChannel, TripType};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flight_booking_model.json")
}

pub fn load_fixture() -> Arc<ArtifactBundle> {
    ArtifactBundle::load(&fixture_path()).unwrap()
}

/// Bundle document as JSON, for tests that edit it before loading
pub fn fixture_json() -> serde_json::Value {
    let data = std::fs::read_to_string(fixture_path()).unwrap();
    serde_json::from_str(&data).unwrap()
}

pub fn bundle_from(value: &serde_json::Value) -> skycast::Result<ArtifactBundle> {
    ArtifactBundle::from_json(&value.to_string(), Path::new("edited.json"))
}

/// Monday, Internet, RoundTrip, known route and origin, no add-ons
pub fn monday_booking() -> RawBookingAttributes {
    RawBookingAttributes {
        num_passengers: 1,
        sales_channel: SalesChannel::Internet,
        trip_type: TripType::RoundTrip,
        purchase_lead: 30,
        length_of_stay: 7,
        flight_hour: 10,
        flight_day: Weekday::Mon,
        route: "AAA-BBB".to_string(),
        booking_origin: "Indonesia".to_string(),
        wants_extra_baggage: false,
        wants_preferred_seat: false,
        wants_in_flight_meals: false,
        flight_duration: 5.0,
    }
}
