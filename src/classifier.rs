use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::DynamicImage;
use tract_onnx::prelude::*;
use tract_onnx::WithOnnx;

use crate::error::ClassifierError;
use crate::models::{ClassIndex, Prediction};
use crate::preprocess::to_input_tensor;
use crate::settings::{CHANNELS, CLASS_INDEX_FILE, INPUT_SIZE, MODEL_DIR};

/// Slack allowed on a softmax output before it is treated as logits.
const TOLERANCE: f32 = 1e-3;

/// A typed, decluttered graph carrying pretrained weights, ready to be exported.
pub struct PretrainedModel {
    model: TypedModel,
}

impl PretrainedModel {
    /// Reads the ONNX export and pins its input to f32 `[1, 224, 224, 3]`.
    pub fn from_onnx<P: AsRef<Path>>(weights: P) -> Result<Self> {
        let weights = weights.as_ref();
        if !weights.exists() {
            return Err(ClassifierError::MissingWeights(weights.to_path_buf()).into());
        }
        let side = INPUT_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(weights)
            .with_context(|| format!("loading ONNX model {}", weights.display()))?
            .with_input_fact(0, f32::fact([1, side, side, CHANNELS]).into())?
            .into_typed()?
            .into_decluttered()?;
        tracing::info!(
            path = %weights.display(),
            nodes = model.nodes().len(),
            "loaded pretrained weights"
        );
        Ok(Self::from_typed(model))
    }

    pub fn from_typed(model: TypedModel) -> Self {
        Self { model }
    }

    /// Writes `export_dir/model/` as NNEF, replacing any previous export, and
    /// copies the class index next to it.
    pub fn save(&self, export_dir: &Path, class_index: &Path) -> Result<()> {
        let model_dir = export_dir.join(MODEL_DIR);
        if model_dir.exists() {
            std::fs::remove_dir_all(&model_dir)
                .with_context(|| format!("removing previous export {}", model_dir.display()))?;
        }
        std::fs::create_dir_all(export_dir)
            .with_context(|| format!("creating {}", export_dir.display()))?;

        tract_nnef::nnef()
            .with_onnx()
            .write_to_dir(&self.model, &model_dir)
            .with_context(|| format!("writing NNEF model to {}", model_dir.display()))?;
        let target = class_index_path(export_dir);
        if same_file(class_index, &target) {
            tracing::debug!(path = %target.display(), "class index already in export");
        } else {
            std::fs::copy(class_index, &target)
                .with_context(|| format!("copying class index {}", class_index.display()))?;
        }

        tracing::info!(path = %export_dir.display(), "saved model");
        Ok(())
    }
}

/// One score per class, in class index order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores(Vec<f32>);

impl Scores {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// True when every score is in `[0, 1]` and they sum to one, both up to rounding.
    pub fn is_distribution(&self) -> bool {
        let in_range = self.0.iter().all(|s| (-TOLERANCE..=1.0 + TOLERANCE).contains(s));
        let sum: f32 = self.0.iter().sum();
        in_range && (sum - 1.0).abs() <= TOLERANCE
    }

    /// Leaves softmax outputs untouched and converts anything else (logits) with a softmax.
    /// NaN or infinite scores are rejected.
    pub fn probabilities(&self) -> Result<Scores, ClassifierError> {
        if let Some(index) = self.0.iter().position(|s| !s.is_finite()) {
            return Err(ClassifierError::NonFinite { index, value: self.0[index] });
        }
        if self.is_distribution() {
            return Ok(self.clone());
        }
        let max = self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = self.0.iter().map(|&s| (s - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        Ok(Scores(exps.into_iter().map(|e| e / sum).collect()))
    }

    /// Top-1 `(index, probability)`, the probability clamped into `[0, 1]`.
    pub fn best(&self) -> Result<(usize, f32), ClassifierError> {
        let (index, score) = self
            .probabilities()?
            .top(1)
            .first()
            .copied()
            .ok_or(ClassifierError::EmptyPrediction)?;
        Ok((index, score.clamp(0.0, 1.0)))
    }

    /// The `k` best `(index, score)` pairs, highest first. Ties keep the lower index first.
    pub fn top(&self, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.0.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    pub fn argmax(&self) -> Option<usize> {
        self.top(1).first().map(|&(index, _)| index)
    }
}

/// Runnable classifier loaded back from an export directory.
pub struct ImageClassifier {
    model: TypedRunnableModel<TypedModel>,
    classes: ClassIndex,
}

impl ImageClassifier {
    pub fn load<P: AsRef<Path>>(export_dir: P) -> Result<Self> {
        let export_dir = export_dir.as_ref();
        let model_dir = export_dir.join(MODEL_DIR);
        if !model_dir.join("graph.nnef").exists() {
            return Err(ClassifierError::MissingExport(export_dir.to_path_buf()).into());
        }

        let model = tract_nnef::nnef()
            .with_onnx()
            .model_for_path(&model_dir)
            .with_context(|| format!("loading NNEF model {}", model_dir.display()))?
            .into_optimized()?
            .into_runnable()?;
        let classes = ClassIndex::load(class_index_path(export_dir))?;
        tracing::info!(path = %export_dir.display(), classes = classes.len(), "loaded classifier");

        Ok(Self { model, classes })
    }

    pub fn classes(&self) -> &ClassIndex {
        &self.classes
    }

    /// One forward pass. The output must be `[1, n]` or `[n]` with `n` matching the class index.
    pub fn scores(&self, input: Tensor) -> Result<Scores> {
        let result = self.model.run(tvec!(input.into()))?;
        let output = result
            .first()
            .ok_or_else(|| ClassifierError::Shape("model has no output".to_string()))?
            .to_array_view::<f32>()?;

        let values: Vec<f32> = match output.shape() {
            [_] | [1, _] => output.iter().copied().collect(),
            shape => {
                return Err(ClassifierError::Shape(format!(
                    "expected a single row of scores, got {shape:?}"
                ))
                .into())
            }
        };
        if values.len() != self.classes.len() {
            return Err(ClassifierError::ClassCount {
                expected: self.classes.len(),
                actual: values.len(),
            }
            .into());
        }
        Ok(Scores::new(values))
    }

    /// Top-1 label for an image of any size.
    pub fn classify(&self, image: &DynamicImage) -> Result<Prediction> {
        let (index, score) = self.scores(to_input_tensor(image))?.best()?;
        let label = self.classes.get(index).ok_or(ClassifierError::ClassCount {
            expected: self.classes.len(),
            actual: index + 1,
        })?;
        tracing::debug!(index, score, "top-1");

        Ok(Prediction {
            index,
            class_name: label.class_name.clone(),
            description: label.description.clone(),
            score,
        })
    }
}

fn class_index_path(export_dir: &Path) -> PathBuf {
    export_dir.join(CLASS_INDEX_FILE)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
