//! # dental-face
//!
//! Facial midline, face shape and ideal anterior tooth proportions from
//! facial landmarks.
//!
//! This crate provides:
//! - **Analysis**: midline estimation, face-shape classification and dental
//!   proportions from a set of named keypoints
//! - **Visualization**: an annotated overlay painted through a [`Renderer`]
//! - **Reporting**: a flat storage record and recommendation sentences
//!
//! Landmark detection itself is external. Detectors plug in through the
//! [`LandmarkDetector`] trait; their keypoints must follow the MediaPipe-style
//! naming (`noseTip`, `chin`, `jawline_*`, `lips_*`, ...), or be translated
//! from the iBUG 68/81-point layout with [`from_ibug`].
//!
//! ## Quick Start
//!
//! ```rust
//! use dental_face::{analyze, generate_recommendations, Keypoint, ShapeKind};
//!
//! let mut keypoints = vec![
//!     Keypoint::new("foreheadCenter", 100.0, 0.0),
//!     Keypoint::new("nasion", 100.0, 60.0),
//!     Keypoint::new("chin", 100.0, 200.0),
//! ];
//! for (i, x) in [40.0, 60.0, 100.0, 140.0, 160.0].into_iter().enumerate() {
//!     let y = if x == 100.0 { 200.0 } else { 150.0 };
//!     keypoints.push(Keypoint::new(format!("jawline_{}", i), x, y));
//! }
//!
//! let result = analyze(&keypoints);
//! assert!(result.success);
//! assert_eq!(result.midline.as_ref().unwrap().confidence, 0.95);
//!
//! // Without forehead points the face shape is unknown, but the analysis
//! // still succeeds.
//! assert_eq!(result.face_shape.unwrap().shape, ShapeKind::Unknown);
//!
//! for line in generate_recommendations(&result) {
//!     println!("{}", line);
//! }
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use dental_face::{analyze, CanvasRenderer, Visualizer};
//! use image::RgbaImage;
//!
//! let result = analyze(&[]);
//! let mut canvas = CanvasRenderer::new(640, 480);
//! Visualizer::default().render(&mut canvas, &RgbaImage::new(320, 240), &result);
//! // A failed analysis leaves just the stretched image on the canvas.
//! assert_eq!(canvas.image().dimensions(), (640, 480));
//! ```

mod analyzer;
mod config;
mod detector;
mod error;
mod font;
mod landmarks;
mod render;
mod report;
mod types;
mod visualizer;

pub use analyzer::{
    analyze, classify_face_shape, compute_dental_proportions, compute_midline,
    proportions_for_mouth_width, tooth_ratios, Analyzer, PROCESSING_FAILED,
};
pub use config::{Config, OverlayConfig, SurfaceConfig};
pub use detector::{KeypointLayout, LandmarkDetector, StaticDetector};
pub use error::{Error, Result};
pub use landmarks::{from_ibug, LandmarkGroup, LandmarkRole, LandmarkSet};
pub use render::{CanvasRenderer, Color, DrawCommand, RecordingRenderer, Rect, Renderer};
pub use report::{
    format_for_storage, format_for_storage_at, generate_recommendations, StoredAnalysis,
    MIDLINE_DEVIATION_THRESHOLD,
};
pub use types::{
    AnalysisResult, DentalProportions, FaceShape, Keypoint, Midline, Point, ShapeKind,
};
pub use visualizer::{info_lines, Visualizer};
