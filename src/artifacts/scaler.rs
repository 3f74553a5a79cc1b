//! Fitted numeric scaler resolved against the training schema.

use super::Schema;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters as exported at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerTransform {
    /// `(x - mean) / scale`; either part may be absent when it was disabled in training
    Standard {
        #[serde(default)]
        mean: Option<Vec<f64>>,
        #[serde(default)]
        scale: Option<Vec<f64>>,
    },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    /// Columns the scaler was fit on, in fit order. Absent means every training column.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    pub transform: ScalerTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnTransform {
    Standardize { mean: f64, scale: f64 },
    MinMax { min: f64, scale: f64 },
    Passthrough,
}

impl ColumnTransform {
    // Same operation order as the fitted transformer so results match bit for bit.
    fn apply(&self, x: f64) -> f64 {
        match *self {
            ColumnTransform::Standardize { mean, scale } => (x - mean) / scale,
            ColumnTransform::MinMax { min, scale } => x * scale + min,
            ColumnTransform::Passthrough => x,
        }
    }
}

/// One transform per training column, in schema order
#[derive(Debug, Clone)]
pub struct Scaler {
    per_column: Vec<ColumnTransform>,
    fitted: Vec<String>,
}

impl Scaler {
    pub fn resolve(file: ScalerFile, schema: &Schema) -> std::result::Result<Self, String> {
        let fitted: Vec<String> = match file.columns {
            Some(cols) => cols,
            None => schema.columns().to_vec(),
        };
        let n = fitted.len();

        let mut positions = Vec::with_capacity(n);
        for name in &fitted {
            let pos = schema
                .position(name)
                .ok_or_else(|| format!("scaler column '{}' is not a training column", name))?;
            if positions.contains(&pos) {
                return Err(format!("scaler lists column '{}' twice", name));
            }
            positions.push(pos);
        }

        let check = |what: &str, v: &[f64]| -> std::result::Result<(), String> {
            if v.len() != n {
                return Err(format!(
                    "scaler {} has {} entries for {} fitted columns",
                    what,
                    v.len(),
                    n
                ));
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(format!("scaler {} contains a non-finite value", what));
            }
            Ok(())
        };

        let mut per_column = vec![ColumnTransform::Passthrough; schema.len()];
        match file.transform {
            ScalerTransform::Standard { mean, scale } => {
                if let Some(ref m) = mean {
                    check("mean", m.as_slice())?;
                }
                if let Some(ref s) = scale {
                    check("scale", s.as_slice())?;
                }
                for (i, &pos) in positions.iter().enumerate() {
                    let center = mean.as_ref().map_or(0.0, |m| m[i]);
                    // zero-variance columns were fit with unit scale
                    let divisor = scale
                        .as_ref()
                        .map_or(1.0, |s| if s[i] == 0.0 { 1.0 } else { s[i] });
                    per_column[pos] = ColumnTransform::Standardize {
                        mean: center,
                        scale: divisor,
                    };
                }
            }
            ScalerTransform::MinMax { min, scale } => {
                check("min", min.as_slice())?;
                check("scale", scale.as_slice())?;
                for (i, &pos) in positions.iter().enumerate() {
                    per_column[pos] = ColumnTransform::MinMax {
                        min: min[i],
                        scale: scale[i],
                    };
                }
            }
            ScalerTransform::Identity => {}
        }

        Ok(Self { per_column, fitted })
    }

    /// Training columns the scaler touches
    pub fn fitted_columns(&self) -> &[String] {
        &self.fitted
    }

    pub fn width(&self) -> usize {
        self.per_column.len()
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.per_column.len() {
            return Err(Error::SchemaAlignment(format!(
                "scaler expects {} columns, got {}",
                self.per_column.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(&self.per_column)
            .map(|(&x, t)| t.apply(x))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(vec!["a".into(), "b".into(), "flag".into()]).unwrap()
    }

    #[test]
    fn standard_scaler_on_subset_leaves_other_columns() {
        let file = ScalerFile {
            columns: Some(vec!["b".into(), "a".into()]),
            transform: ScalerTransform::Standard {
                mean: Some(vec![10.0, 2.0]),
                scale: Some(vec![5.0, 0.0]),
            },
        };
        let scaler = Scaler::resolve(file, &schema()).unwrap();
        let out = scaler.transform(&[4.0, 20.0, 1.0]).unwrap();
        // a: (4 - 2) / 1 (zero scale), b: (20 - 10) / 5, flag untouched
        assert_eq!(out, vec![2.0, 2.0, 1.0]);
    }

    #[test]
    fn min_max_covers_every_column_by_default() {
        let file = ScalerFile {
            columns: None,
            transform: ScalerTransform::MinMax {
                min: vec![0.0, -1.0, 0.0],
                scale: vec![0.5, 0.1, 1.0],
            },
        };
        let scaler = Scaler::resolve(file, &schema()).unwrap();
        assert_eq!(scaler.fitted_columns().len(), 3);
        let out = scaler.transform(&[2.0, 10.0, 1.0]).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_parameters_are_rejected() {
        let short = ScalerFile {
            columns: None,
            transform: ScalerTransform::Standard {
                mean: Some(vec![0.0]),
                scale: None,
            },
        };
        assert!(Scaler::resolve(short, &schema()).is_err());

        let foreign = ScalerFile {
            columns: Some(vec!["nope".into()]),
            transform: ScalerTransform::Identity,
        };
        assert!(Scaler::resolve(foreign, &schema()).is_err());
    }

    #[test]
    fn wrong_width_is_a_schema_error() {
        let file = ScalerFile {
            columns: None,
            transform: ScalerTransform::Identity,
        };
        let scaler = Scaler::resolve(file, &schema()).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(Error::SchemaAlignment(_))
        ));
    }
}
