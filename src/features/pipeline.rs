//! Reconstruction pipeline: raw attributes → derived → aligned → scaled.

use super::{align, derive, AlignedFeatures, DerivedFeatures, ScaledFeatures};
use crate::artifacts::ArtifactBundle;
use crate::booking::RawBookingAttributes;
use crate::error::Result;
use std::sync::Arc;

/// Every intermediate representation of one request, for review output
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub derived: DerivedFeatures,
    pub aligned: AlignedFeatures,
    pub scaled: ScaledFeatures,
}

/// Pure function of (raw record, bundle): no I/O, no shared mutable state.
#[derive(Debug, Clone)]
pub struct FeatureReconstructor {
    bundle: Arc<ArtifactBundle>,
    strict: bool,
}

impl FeatureReconstructor {
    pub fn new(bundle: Arc<ArtifactBundle>, strict: bool) -> Self {
        Self { bundle, strict }
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn reconstruct(&self, raw: &RawBookingAttributes) -> Result<ScaledFeatures> {
        self.stages(raw).map(|r| r.scaled)
    }

    pub fn stages(&self, raw: &RawBookingAttributes) -> Result<Reconstruction> {
        raw.validate()?;
        let derived = derive(
            raw,
            self.bundle.route_encoder(),
            self.bundle.origin_encoder(),
        )?;
        let aligned = align(&derived, self.bundle.schema(), self.strict)?;
        let scaled = self.scale(&aligned)?;
        Ok(Reconstruction {
            derived,
            aligned,
            scaled,
        })
    }

    pub fn scale(&self, aligned: &AlignedFeatures) -> Result<ScaledFeatures> {
        let values = self.bundle.scaler().transform(aligned.as_slice())?;
        Ok(ScaledFeatures::new(aligned.columns.clone(), values))
    }
}
