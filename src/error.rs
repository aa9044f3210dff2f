use std::path::PathBuf;

use thiserror::Error;

/// Failures specific to building, persisting and running the classifier.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Pretrained weights are not on disk.
    #[error(
        "pretrained weights not found at {}; export Keras MobileNetV3Small(weights=\"imagenet\") \
         to ONNX there (for example `python -m tf2onnx.convert --keras <saved model> --output <path>`) \
         and put the matching imagenet_class_index.json next to it",
        .0.display()
    )]
    MissingWeights(PathBuf),

    /// The export directory has not been written yet.
    #[error("no saved model in {}; run the classifier once to export it", .0.display())]
    MissingExport(PathBuf),

    /// Malformed class index file.
    #[error("invalid class index: {0}")]
    ClassIndex(String),

    /// Model output and class index disagree on the number of classes.
    #[error("model predicts {actual} classes but the class index has {expected}")]
    ClassCount { expected: usize, actual: usize },

    /// Unexpected tensor shape.
    #[error("invalid shape: {0}")]
    Shape(String),

    /// NaN or infinite score in the model output.
    #[error("model output holds a non-finite score {value} at class {index}")]
    NonFinite { index: usize, value: f32 },

    /// The model produced no scores at all.
    #[error("model returned an empty prediction")]
    EmptyPrediction,
}
