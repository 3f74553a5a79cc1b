//! Probability of completion from the classifier, then one threshold for both
//! the label and the verdict shown to the user.

use crate::artifacts::ArtifactBundle;
use crate::booking::RawBookingAttributes;
use crate::config::PredictionConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureReconstructor, Reconstruction, ScaledFeatures};
use crate::model::Classifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Label is 1 exactly when the normalized P(complete) is strictly above the threshold.
///
/// The comparison runs on the raw class pair as `(1 - t) * p1 > t * p0`, which
/// never divides. At 0.5 both sides are halved exactly, so the label is the
/// classifier's own argmax even when the pair does not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidConfig(format!(
                "decision threshold {} is outside [0, 1]",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Config override, else the bundle's recorded threshold, else 0.5
    pub fn resolve(configured: Option<f64>, bundle: &ArtifactBundle) -> Result<Self> {
        Self::new(
            configured
                .or(bundle.decision_threshold())
                .unwrap_or(DEFAULT_THRESHOLD),
        )
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// `proba` is `[P(incomplete), P(complete)]` as the classifier returned it
    pub fn label(&self, proba: [f64; 2]) -> u8 {
        let [p0, p1] = proba;
        u8::from((1.0 - self.0) * p1 > self.0 * p0)
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for DecisionThreshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DecisionThreshold> for f64 {
    fn from(t: DecisionThreshold) -> f64 {
        t.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Complete,
    Incomplete,
}

impl Verdict {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Verdict::Complete
        } else {
            Verdict::Incomplete
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Complete => "Booking complete",
            Verdict::Incomplete => "Booking incomplete",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            Verdict::Complete => "This customer is predicted to finish payment.",
            Verdict::Incomplete => "This customer is predicted NOT to finish payment.",
        }
    }

    pub fn recommendation(&self) -> Option<&'static str> {
        match self {
            Verdict::Complete => None,
            Verdict::Incomplete => Some(
                "Offer a discount on extra baggage or in-flight meals to raise this customer's interest.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 = booking completed
    pub label: u8,
    /// P(booking completed), in [0, 1]
    pub probability: f64,
}

impl Prediction {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_label(self.label)
    }

    /// Probability as a percentage rounded to two decimals
    pub fn percent(&self) -> f64 {
        (self.probability * 10_000.0).round() / 100.0
    }
}

/// Probability is computed once; the label comes from the same value and threshold.
pub fn predict(
    vector: &ScaledFeatures,
    classifier: &dyn Classifier,
    threshold: DecisionThreshold,
) -> Result<Prediction> {
    let [p0, p1] = classifier.predict_proba(vector.as_slice())?;
    if !(p0.is_finite() && p1.is_finite()) || p0 < 0.0 || p1 < 0.0 {
        return Err(Error::Inference(format!(
            "classifier returned probabilities [{}, {}]",
            p0, p1
        )));
    }
    let total = p0 + p1;
    let probability = if total > 0.0 { p1 / total } else { p1 };
    Ok(Prediction {
        label: threshold.label([p0, p1]),
        probability: probability.clamp(0.0, 1.0),
    })
}

/// What the presentation layer renders or logs for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub label: u8,
    pub probability: f64,
    pub probability_pct: f64,
    pub threshold: f64,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl PredictionRecord {
    pub fn new(prediction: Prediction, threshold: DecisionThreshold) -> Self {
        let verdict = prediction.verdict();
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            label: prediction.label,
            probability: prediction.probability,
            probability_pct: prediction.percent(),
            threshold: threshold.value(),
            verdict,
            recommendation: verdict.recommendation().map(str::to_string),
        }
    }
}

/// Loaded bundle plus the request-independent settings; one per process.
#[derive(Debug, Clone)]
pub struct Predictor {
    reconstructor: FeatureReconstructor,
    threshold: DecisionThreshold,
}

impl Predictor {
    pub fn new(bundle: Arc<ArtifactBundle>, config: &PredictionConfig) -> Result<Self> {
        let threshold = DecisionThreshold::resolve(config.decision_threshold, &bundle)?;
        Ok(Self {
            reconstructor: FeatureReconstructor::new(bundle, config.strict_schema),
            threshold,
        })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        self.reconstructor.bundle()
    }

    pub fn reconstructor(&self) -> &FeatureReconstructor {
        &self.reconstructor
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn predict_vector(&self, vector: &ScaledFeatures) -> Result<Prediction> {
        predict(vector, self.bundle().classifier(), self.threshold)
    }

    pub fn predict(&self, raw: &RawBookingAttributes) -> Result<PredictionRecord> {
        self.explain(raw).map(|(record, _)| record)
    }

    /// Prediction together with every intermediate feature representation
    pub fn explain(&self, raw: &RawBookingAttributes) -> Result<(PredictionRecord, Reconstruction)> {
        let stages = self.reconstructor.stages(raw)?;
        let prediction = self.predict_vector(&stages.scaled)?;
        debug!(
            label = prediction.label,
            probability = prediction.probability,
            threshold = self.threshold.value(),
            "prediction"
        );
        Ok((PredictionRecord::new(prediction, self.threshold), stages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict_and_bounded() {
        let t = DecisionThreshold::new(0.4).unwrap();
        assert_eq!(t.label([0.59, 0.41]), 1);
        assert_eq!(t.label([0.6, 0.4]), 0);
        assert_eq!(DecisionThreshold::default().label([0.5, 0.5]), 0);
        assert_eq!(DecisionThreshold::new(0.0).unwrap().label([1.0, 0.0]), 0);
        assert_eq!(DecisionThreshold::new(1.0).unwrap().label([0.0, 1.0]), 0);
        assert!(DecisionThreshold::new(1.5).is_err());
        assert!(DecisionThreshold::new(f64::NAN).is_err());
    }

    #[test]
    fn default_threshold_is_argmax_when_pair_is_off_by_an_ulp() {
        // mean of [4,4], [2,1], [2,4] normalized leaves
        let pair = [0.49999999999999994, 0.5];
        assert_eq!(DecisionThreshold::default().label(pair), 1);
        assert_eq!(DecisionThreshold::default().label([0.5, 0.49999999999999994]), 0);
    }

    #[test]
    fn verdict_follows_label_only() {
        let p = Prediction {
            label: 0,
            probability: 0.45,
        };
        assert_eq!(p.verdict(), Verdict::Incomplete);
        assert!(p.verdict().recommendation().is_some());
        assert_eq!(p.percent(), 45.0);

        let record = PredictionRecord::new(
            Prediction {
                label: 1,
                probability: 0.123456,
            },
            DecisionThreshold::new(0.1).unwrap(),
        );
        assert_eq!(record.verdict, Verdict::Complete);
        assert!(record.recommendation.is_none());
        assert_eq!(record.probability_pct, 12.35);
    }
}
