//! Prediction wrapper over the loaded bundle.

mod engine;

pub use engine::{
    predict, DecisionThreshold, Prediction, PredictionRecord, Predictor, Verdict,
    DEFAULT_THRESHOLD,
};
