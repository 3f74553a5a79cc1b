//! Model artifact bundle: classifier, scaler, label encoders and the ordered
//! training schema. Loaded once, then shared read-only behind an `Arc`.

mod encoder;
mod scaler;

pub use encoder::{EncoderFile, LabelEncoder};
pub use scaler::{Scaler, ScalerFile, ScalerTransform};

use crate::booking::{IndicatorLevel, SalesChannel, TripType};
use crate::error::{Error, Result};
use crate::model::{Classifier, ClassifierArtifact};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const FORMAT_VERSION: u32 = 1;

/// Bundle document as written by the training job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFile {
    pub format_version: u32,
    pub model: ClassifierArtifact,
    pub scaler: ScalerFile,
    pub le_route: EncoderFile,
    pub le_origin: EncoderFile,
    pub feature_columns: Vec<String>,
    /// Threshold the classifier was evaluated with, if recorded
    #[serde(default)]
    pub decision_threshold: Option<f64>,
}

/// Ordered training column names
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Arc<[String]>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> std::result::Result<Self, String> {
        if columns.is_empty() {
            return Err("feature_columns is empty".into());
        }
        let mut index = HashMap::with_capacity(columns.len());
        for (i, c) in columns.iter().enumerate() {
            if index.insert(c.clone(), i).is_some() {
                return Err(format!("feature column '{}' appears twice", c));
            }
        }
        Ok(Self {
            columns: columns.into(),
            index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Levels of `T` whose indicator column is absent from the schema
fn missing_levels<T: IndicatorLevel>(schema: &Schema) -> Vec<T> {
    T::ALL
        .iter()
        .copied()
        .filter(|l| !schema.contains(&l.column_name()))
        .collect()
}

/// An expanded block must name only known levels and omit exactly one (the reference).
fn check_indicator_block<T: IndicatorLevel>(schema: &Schema) -> std::result::Result<(), String> {
    let prefix = format!("{}_", T::FIELD);
    let known: Vec<String> = T::ALL.iter().map(|l| l.column_name()).collect();
    let mut present = 0;
    for col in schema.columns().iter().filter(|c| c.starts_with(&prefix)) {
        if !known.contains(col) {
            return Err(format!("indicator column '{}' names no {} level", col, T::FIELD));
        }
        present += 1;
    }
    if present > 0 && missing_levels::<T>(schema).len() != 1 {
        return Err(format!(
            "{} indicators must omit exactly one reference level",
            T::FIELD
        ));
    }
    Ok(())
}

pub struct ArtifactBundle {
    format_version: u32,
    classifier: Box<dyn Classifier>,
    scaler: Scaler,
    le_route: LabelEncoder,
    le_origin: LabelEncoder,
    schema: Schema,
    decision_threshold: Option<f64>,
    source: PathBuf,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("format_version", &self.format_version)
            .field("source", &self.source)
            .field("columns", &self.schema.len())
            .field("routes", &self.le_route.classes().len())
            .field("origins", &self.le_origin.classes().len())
            .finish()
    }
}

impl ArtifactBundle {
    /// Read, parse and validate the bundle at `path`. Any failure is `ArtifactLoad`.
    pub fn load(path: &Path) -> Result<Arc<Self>> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::artifact(path, e.to_string()))?;
        let bundle = Self::from_json(&data, path)?;
        info!(
            path = %path.display(),
            columns = bundle.schema.len(),
            routes = bundle.le_route.classes().len(),
            origins = bundle.le_origin.classes().len(),
            "artifact bundle loaded"
        );
        Ok(Arc::new(bundle))
    }

    /// Parse a bundle document; `source` names it in errors and anchors relative model paths.
    pub fn from_json(data: &str, source: &Path) -> Result<Self> {
        let file: BundleFile =
            serde_json::from_str(data).map_err(|e| Error::artifact(source, e.to_string()))?;
        Self::from_file(file, source)
    }

    pub fn from_file(file: BundleFile, source: &Path) -> Result<Self> {
        let fail = |reason: String| Error::artifact(source, reason);

        if file.format_version != FORMAT_VERSION {
            return Err(fail(format!(
                "format_version {} is not supported (expected {})",
                file.format_version, FORMAT_VERSION
            )));
        }
        if let Some(t) = file.decision_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(fail(format!("decision_threshold {} is outside [0, 1]", t)));
            }
        }

        let schema = Schema::new(file.feature_columns).map_err(fail)?;
        check_indicator_block::<SalesChannel>(&schema).map_err(fail)?;
        check_indicator_block::<TripType>(&schema).map_err(fail)?;

        let scaler = Scaler::resolve(file.scaler, &schema).map_err(fail)?;
        let le_route = LabelEncoder::new("route", file.le_route).map_err(fail)?;
        let le_origin = LabelEncoder::new("booking_origin", file.le_origin).map_err(fail)?;

        if file.model.n_features() != schema.len() {
            return Err(fail(format!(
                "classifier takes {} features but the schema has {} columns",
                file.model.n_features(),
                schema.len()
            )));
        }
        let base_dir = source.parent().unwrap_or_else(|| Path::new("."));
        let classifier = file.model.build(base_dir).map_err(fail)?;

        Ok(Self {
            format_version: file.format_version,
            classifier,
            scaler,
            le_route,
            le_origin,
            schema,
            decision_threshold: file.decision_threshold,
            source: source.to_path_buf(),
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn route_encoder(&self) -> &LabelEncoder {
        &self.le_route
    }

    pub fn origin_encoder(&self) -> &LabelEncoder {
        &self.le_origin
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn decision_threshold(&self) -> Option<f64> {
        self.decision_threshold
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Known routes, in encoder order
    pub fn route_options(&self) -> &[String] {
        self.le_route.classes()
    }

    /// Known booking origins, in encoder order
    pub fn origin_options(&self) -> &[String] {
        self.le_origin.classes()
    }

    /// The level of `T` that has no indicator column, if the block was expanded at all
    pub fn reference_level<T: IndicatorLevel>(&self) -> Option<T> {
        match missing_levels::<T>(&self.schema).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(cols: &[&str]) -> Schema {
        Schema::new(cols.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn schema_rejects_duplicates() {
        assert!(Schema::new(vec!["a".into(), "a".into()]).is_err());
        assert!(Schema::new(Vec::new()).is_err());
        let s = schema(&["a", "b"]);
        assert_eq!(s.position("b"), Some(1));
        assert!(!s.contains("c"));
    }

    #[test]
    fn indicator_block_needs_exactly_one_reference() {
        assert!(check_indicator_block::<TripType>(&schema(&["trip_type_OneWay", "trip_type_CircleTrip"])).is_ok());
        assert!(check_indicator_block::<TripType>(&schema(&["trip_type_OneWay"])).is_err());
        assert!(check_indicator_block::<TripType>(&schema(&[
            "trip_type_OneWay",
            "trip_type_CircleTrip",
            "trip_type_RoundTrip"
        ]))
        .is_err());
        assert!(check_indicator_block::<SalesChannel>(&schema(&["sales_channel_Phone"])).is_err());
        // never expanded
        assert!(check_indicator_block::<SalesChannel>(&schema(&["num_passengers"])).is_ok());
    }
}
