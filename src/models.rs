use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassLabel {
    pub class_name: String,
    pub description: String,
}

/// ImageNet labels in model output order, read from `imagenet_class_index.json`.
#[derive(Debug, Clone)]
pub struct ClassIndex {
    labels: Vec<ClassLabel>,
}

impl ClassIndex {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading class index {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parses `{"0": ["n01440764", "tench"], ...}`. Keys must cover `0..n` exactly.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<usize, [String; 2]> = serde_json::from_str(json)
            .map_err(|e| ClassifierError::ClassIndex(e.to_string()))?;
        if raw.is_empty() {
            return Err(ClassifierError::ClassIndex("no classes".to_string()).into());
        }
        let mut labels = Vec::with_capacity(raw.len());
        for index in 0..raw.len() {
            let [class_name, description] = raw.get(&index).cloned().ok_or_else(|| {
                ClassifierError::ClassIndex(format!("missing entry for class {index}"))
            })?;
            labels.push(ClassLabel { class_name, description });
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, index: usize) -> Option<&ClassLabel> {
        self.labels.get(index)
    }
}

/// Top-1 result as printed to the terminal.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub class_name: String,
    pub description: String,
    pub score: f32,
}
