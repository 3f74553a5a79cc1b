//! ONNX Runtime classifier. Input: [1, n_features] f32, output: class probabilities.

use super::Classifier;
use crate::error::{Error, Result};
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::OnceLock;

static ORT_ENV: OnceLock<bool> = OnceLock::new();

fn init_env() -> bool {
    *ORT_ENV.get_or_init(|| ort::init().with_name("skycast").commit().is_ok())
}

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    probability_output: String,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn load(
        path: &Path,
        n_features: usize,
        probability_output: Option<String>,
    ) -> std::result::Result<Self, String> {
        if !init_env() {
            tracing::warn!("ONNX Runtime environment init failed; using defaults");
        }
        let session = Session::builder()
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| format!("{}: {}", path.display(), e))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| format!("{} declares no inputs", path.display()))?;
        let probability_output = match probability_output {
            Some(name) => name,
            None => session
                .outputs
                .last()
                .map(|o| o.name.clone())
                .ok_or_else(|| format!("{} declares no outputs", path.display()))?,
        };

        tracing::info!(
            path = %path.display(),
            input = %input_name,
            output = %probability_output,
            "ONNX classifier loaded"
        );
        Ok(Self {
            session,
            input_name,
            probability_output,
            n_features,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        let infer = |e: ort::Error| Error::Inference(e.to_string());
        if features.len() != self.n_features {
            return Err(Error::Inference(format!(
                "model expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let data: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let arr = Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| Error::Inference(e.to_string()))?;
        let input = Tensor::from_array(arr).map_err(infer)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input].map_err(infer)?)
            .map_err(infer)?;
        let out = outputs
            .get(self.probability_output.as_str())
            .ok_or_else(|| Error::Inference(format!("no output '{}'", self.probability_output)))?;
        let view = out.try_extract_tensor::<f32>().map_err(infer)?;
        let probs: Vec<f32> = view.iter().copied().collect();
        match probs.as_slice() {
            [p0, p1, ..] => Ok([*p0 as f64, *p1 as f64]),
            _ => Err(Error::Inference(format!(
                "output '{}' has {} values, expected 2",
                self.probability_output,
                probs.len()
            ))),
        }
    }
}
