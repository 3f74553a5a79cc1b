//! Fitted label encoder: category string -> integer code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderFile {
    /// Sorted unique training values; a value's code is its position
    pub classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: &'static str,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn new(field: &'static str, file: EncoderFile) -> std::result::Result<Self, String> {
        if file.classes.is_empty() {
            return Err(format!("{} encoder has no classes", field));
        }
        let mut codes = HashMap::with_capacity(file.classes.len());
        for (i, class) in file.classes.iter().enumerate() {
            if codes.insert(class.clone(), i as u32).is_some() {
                return Err(format!("{} encoder lists class '{}' twice", field, class));
            }
        }
        Ok(Self {
            field,
            classes: file.classes,
            codes,
        })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// Unknown values are an error, never a fallback code.
    pub fn transform(&self, value: &str) -> Result<u32> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| Error::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            })
    }
}
