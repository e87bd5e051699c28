use thiserror::Error;

use crate::landmarks::LandmarkGroup;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("no face detected in the image")]
    NoFaceDetected,

    #[error("no landmarks found for group '{0}'")]
    MissingLandmarkGroup(LandmarkGroup),

    #[error("unsupported landmark layout: expected 68 or 81 points, got {0}")]
    UnsupportedLayout(usize),

    #[error("detector error: {0}")]
    Detector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
