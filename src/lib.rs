//! SkyCast — flight booking completion predictor.
//!
//! Modular structure:
//! - [`booking`] — Raw booking attributes and their closed categoricals
//! - [`artifacts`] — Fitted artifact bundle: encoders, scaler, schema, classifier
//! - [`features`] — Feature reconstruction against the training schema
//! - [`model`] — Classifier seam (random forest, optional ONNX)
//! - [`prediction`] — Probability, label and verdict under one threshold
//! - [`logging`] — Structured logging

pub mod artifacts;
pub mod booking;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod prediction;

pub use artifacts::ArtifactBundle;
pub use booking::{RawBookingAttributes, SalesChannel, TripType};
pub use config::PredictorConfig;
pub use error::{Error, ErrorCategory, Result};
pub use features::{FeatureReconstructor, ScaledFeatures};
pub use logging::StructuredLogger;
pub use model::Classifier;
pub use prediction::{Prediction, PredictionRecord, Predictor, Verdict};
