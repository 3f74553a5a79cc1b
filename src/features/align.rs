//! Stage two: reindex derived fields against the training schema.

use super::{AlignedFeatures, DerivedFeatures};
use crate::artifacts::Schema;
use crate::booking::{IndicatorLevel, SalesChannel, TripType};
use crate::error::{Error, Result};
use tracing::debug;

fn is_indicator_column(name: &str) -> bool {
    SalesChannel::ALL.iter().any(|l| l.column_name() == name)
        || TripType::ALL.iter().any(|l| l.column_name() == name)
}

/// Output follows schema order exactly: each training column takes the derived
/// value of the same name, or 0 when absent. Derived fields outside the schema
/// are dropped.
///
/// In strict mode the only tolerated differences are indicator columns (a
/// reference level's indicator is never a training column, and unselected levels
/// are never derived). Anything else means the bundle and this reconstructor
/// disagree about the schema.
pub fn align(derived: &DerivedFeatures, schema: &Schema, strict: bool) -> Result<AlignedFeatures> {
    let values: Vec<f64> = schema
        .columns()
        .iter()
        .map(|c| derived.get(c).unwrap_or(0.0))
        .collect();

    let dropped: Vec<&str> = derived
        .names()
        .filter(|n| !schema.contains(n) && !derived.is_indicator(n))
        .collect();
    let unfilled: Vec<&str> = schema
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| derived.get(c).is_none() && !is_indicator_column(c))
        .collect();

    if !dropped.is_empty() || !unfilled.is_empty() {
        if strict {
            return Err(Error::SchemaAlignment(format!(
                "derived fields not in training schema: [{}]; training columns never derived: [{}]",
                dropped.join(", "),
                unfilled.join(", ")
            )));
        }
        debug!(?dropped, ?unfilled, "schema differences zero-filled or dropped");
    }

    Ok(AlignedFeatures::new(schema.shared_columns(), values))
}
