//! Classifies one image with a pretrained MobileNetV3-Small and reports the top-1 ImageNet label.
//!
//! The run is linear: build the classifier from its pretrained weights, export it
//! as NNEF, load the export back, decode the image, run one forward pass and
//! print the best class.

pub mod classifier;
pub mod error;
pub mod models;
pub mod preprocess;
pub mod report;
pub mod settings;

use anyhow::Result;

use crate::classifier::{ImageClassifier, PretrainedModel};
use crate::models::Prediction;
use crate::settings::Settings;

/// Full run from the pretrained weights named in `settings`.
pub fn run(settings: &Settings) -> Result<Prediction> {
    let model = PretrainedModel::from_onnx(&settings.weights)?;
    pipeline(model, settings)
}

/// Export, reload and classify `settings.image`.
pub fn pipeline(model: PretrainedModel, settings: &Settings) -> Result<Prediction> {
    model.save(&settings.export_dir, &settings.class_index)?;
    let classifier = ImageClassifier::load(&settings.export_dir)?;
    let image = preprocess::load_png(&settings.image)?;
    classifier.classify(&image)
}
