//! Binary booking-completion classifiers.
//!
//! - [`ForestClassifier`]: random forest carried inline in the artifact bundle
//! - `OnnxClassifier`: ONNX export next to the bundle (cargo feature `onnx`)

mod forest;
#[cfg(feature = "onnx")]
mod onnx;

pub use forest::{ForestClassifier, Node, Tree};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Fitted binary classifier over the scaled training columns.
pub trait Classifier: Send + Sync {
    /// Input width the classifier was trained on
    fn n_features(&self) -> usize;

    /// `[P(incomplete), P(complete)]`
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;

    /// The classifier's own decision: the more probable class, ties to class 0.
    fn predict(&self, features: &[f64]) -> Result<u8> {
        let [p0, p1] = self.predict_proba(features)?;
        Ok(u8::from(p1 > p0))
    }
}

/// Classifier section of the bundle file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest {
        n_features: usize,
        trees: Vec<Tree>,
    },
    Onnx {
        /// Relative paths resolve against the bundle's directory
        path: PathBuf,
        n_features: usize,
        /// Hex sha256 of the model file
        #[serde(default)]
        sha256: Option<String>,
        /// Output holding class probabilities; defaults to the last output
        #[serde(default)]
        probability_output: Option<String>,
    },
}

impl ClassifierArtifact {
    pub fn n_features(&self) -> usize {
        match self {
            ClassifierArtifact::RandomForest { n_features, .. } => *n_features,
            ClassifierArtifact::Onnx { n_features, .. } => *n_features,
        }
    }

    pub fn build(self, base_dir: &Path) -> std::result::Result<Box<dyn Classifier>, String> {
        match self {
            ClassifierArtifact::RandomForest { n_features, trees } => {
                let forest = ForestClassifier::new(n_features, trees)?;
                tracing::debug!(trees = forest.n_trees(), n_features, "random forest loaded");
                Ok(Box::new(forest))
            }
            ClassifierArtifact::Onnx {
                path,
                n_features,
                sha256,
                probability_output,
            } => {
                let path = if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                };
                if let Some(expected) = sha256 {
                    verify_sha256(&path, &expected)?;
                }
                load_onnx(&path, n_features, probability_output)
            }
        }
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(
    path: &Path,
    n_features: usize,
    probability_output: Option<String>,
) -> std::result::Result<Box<dyn Classifier>, String> {
    Ok(Box::new(OnnxClassifier::load(path, n_features, probability_output)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(
    path: &Path,
    _n_features: usize,
    _probability_output: Option<String>,
) -> std::result::Result<Box<dyn Classifier>, String> {
    Err(format!(
        "{} is an ONNX model but this build has no `onnx` feature",
        path.display()
    ))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn verify_sha256(path: &Path, expected: &str) -> std::result::Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let actual = sha256_hex(&bytes);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(format!(
            "{} sha256 mismatch: expected {}, got {}",
            path.display(),
            expected,
            actual
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn onnx_digest_mismatch_fails_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"not really onnx").unwrap();
        let artifact = ClassifierArtifact::Onnx {
            path: PathBuf::from("model.onnx"),
            n_features: 3,
            sha256: Some("00".repeat(32)),
            probability_output: None,
        };
        let err = artifact.build(dir.path()).err().unwrap();
        assert!(err.contains("sha256 mismatch"), "{}", err);
    }
}
