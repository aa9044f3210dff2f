use std::path::PathBuf;

/// Side of the square image the network expects.
pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

/// Name of the class index file, both next to the weights and inside the export.
pub const CLASS_INDEX_FILE: &str = "imagenet_class_index.json";

/// Sub-directory of the export holding the NNEF graph.
pub const MODEL_DIR: &str = "model";

/// Every path the run touches. `Default` is the only configuration the binary uses.
#[derive(Debug, Clone)]
pub struct Settings {
    pub weights: PathBuf,
    pub class_index: PathBuf,
    pub export_dir: PathBuf,
    pub image: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights: PathBuf::from("weights/mobilenet_v3_small.onnx"),
            class_index: PathBuf::from("weights").join(CLASS_INDEX_FILE),
            export_dir: PathBuf::from("mobilenetv3"),
            image: PathBuf::from("data/macaque.png"),
        }
    }
}
