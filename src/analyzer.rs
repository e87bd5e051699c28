//! Midline, face shape and dental proportion analysis.
//!
//! Everything here is a pure function of the keypoint set. Missing landmark
//! groups degrade the affected measurement to its unknown/zero state; only an
//! empty keypoint set (or an unusable midline) fails the whole analysis.

use image::DynamicImage;
use tracing::{debug, warn};

use crate::detector::LandmarkDetector;
use crate::error::{Error, Result};
use crate::landmarks::{LandmarkGroup, LandmarkRole, LandmarkSet};
use crate::types::{
    AnalysisResult, DentalProportions, FaceShape, Keypoint, Midline, Point, ShapeKind,
};

/// Error message reported when an unexpected failure happens during analysis.
pub const PROCESSING_FAILED: &str = "processing failed";

const NAMED_MIDLINE_CONFIDENCE: f32 = 0.95;
const CENTROID_MIDLINE_CONFIDENCE: f32 = 0.8;

const MIN_JAWLINE_POINTS: usize = 5;
const MIN_FOREHEAD_POINTS: usize = 3;
const MIN_LIP_POINTS: usize = 4;

/// Scales the face-shape confidence into the proportions confidence.
const PROPORTIONS_CONFIDENCE_FACTOR: f32 = 0.85;

/// Runs the injected landmark detector and analyzes the first detected face.
#[derive(Debug, Clone)]
pub struct Analyzer<D> {
    detector: D,
}

impl<D: LandmarkDetector> Analyzer<D> {
    /// Create an analyzer around an initialized detector.
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Detect landmarks in `image` and analyze them.
    ///
    /// Never fails: a missing face or a detector error is reported through
    /// [`AnalysisResult::failure`].
    pub fn analyze_image(&self, image: &DynamicImage) -> AnalysisResult {
        let faces = match self.detector.detect(image) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("landmark detection failed: {}", e);
                return AnalysisResult::failure(PROCESSING_FAILED);
            }
        };

        debug!("detector found {} face(s)", faces.len());

        match faces.into_iter().next() {
            Some(face) => analyze(&face),
            None => AnalysisResult::failure(Error::NoFaceDetected.to_string()),
        }
    }
}

/// Analyze one face's keypoints.
pub fn analyze(keypoints: &[Keypoint]) -> AnalysisResult {
    if keypoints.is_empty() {
        return AnalysisResult::failure(Error::NoFaceDetected.to_string());
    }

    let landmarks = LandmarkSet::new(keypoints);

    let midline = match compute_midline(&landmarks) {
        Ok(midline) => midline,
        Err(e) => {
            debug!("midline unavailable: {}", e);
            return AnalysisResult::failure(e.to_string());
        }
    };
    let face_shape = classify_face_shape(&landmarks);
    let dental_proportions = compute_dental_proportions(&landmarks, &face_shape);

    debug!(
        angle = midline.angle,
        shape = %face_shape.shape,
        ratio = face_shape.ratio,
        "analysis complete"
    );

    AnalysisResult::success(midline, face_shape, dental_proportions, keypoints.to_vec())
}

/// Estimate the facial symmetry axis.
///
/// Uses `foreheadCenter`, `nasion` (or `noseTip`) and `chin` when all are
/// present. Otherwise falls back to the centroids of the eye, nose and mouth
/// groups, which fails if any of those groups is empty.
pub fn compute_midline(landmarks: &LandmarkSet) -> Result<Midline> {
    let nose = landmarks
        .role(LandmarkRole::Nasion)
        .or_else(|| landmarks.role(LandmarkRole::NoseTip));
    let named = (
        landmarks.role(LandmarkRole::ForeheadCenter),
        nose,
        landmarks.role(LandmarkRole::Chin),
    );

    if let (Some(forehead), Some(nose), Some(chin)) = named {
        return Ok(Midline {
            points: vec![forehead, nose, chin],
            angle: forehead.angle_to(&chin),
            confidence: NAMED_MIDLINE_CONFIDENCE,
        });
    }

    debug!("named midline landmarks missing, using group centroids");

    let left_eye = landmarks.group_centroid(LandmarkGroup::LeftEye)?;
    let right_eye = landmarks.group_centroid(LandmarkGroup::RightEye)?;
    let nose = landmarks.group_centroid(LandmarkGroup::Nose)?;
    let mouth = landmarks.group_centroid(LandmarkGroup::Mouth)?;

    let eyes = left_eye.midpoint(&right_eye);

    Ok(Midline {
        points: vec![eyes, nose, mouth],
        angle: eyes.angle_to(&mouth),
        confidence: CENTROID_MIDLINE_CONFIDENCE,
    })
}

/// Classify the face silhouette from the jawline extent and forehead height.
pub fn classify_face_shape(landmarks: &LandmarkSet) -> FaceShape {
    let jawline = landmarks.group(LandmarkGroup::Jawline);
    let forehead = landmarks.group(LandmarkGroup::Forehead);

    if jawline.len() < MIN_JAWLINE_POINTS || forehead.len() < MIN_FOREHEAD_POINTS {
        debug!(
            jawline = jawline.len(),
            forehead = forehead.len(),
            "not enough points to classify face shape"
        );
        return FaceShape::unknown();
    }

    let min_x = jawline.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let max_x = jawline.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    let face_width = max_x - min_x;

    // Lowest point in image coordinates, i.e. the chin region.
    let lowest = jawline
        .iter()
        .copied()
        .reduce(|a, b| if b.y > a.y { b } else { a });
    let (Some(forehead_center), Some(lowest)) = (Point::centroid(forehead), lowest) else {
        return FaceShape::unknown();
    };
    let face_height = forehead_center.distance(&lowest);

    if face_height <= 0.0 {
        debug!("degenerate face height, shape unknown");
        return FaceShape::unknown();
    }

    FaceShape::from_ratio(face_width / face_height)
}

/// Width ratios (central, lateral, canine) relative to the mouth width.
pub fn tooth_ratios(shape: ShapeKind) -> (f32, f32, f32) {
    match shape {
        ShapeKind::Oval => (0.15, 0.10, 0.08),
        ShapeKind::Round => (0.16, 0.11, 0.09),
        ShapeKind::Square => (0.15, 0.10, 0.08),
        ShapeKind::Long => (0.17, 0.12, 0.09),
        ShapeKind::Unknown => (0.15, 0.10, 0.08),
    }
}

/// Ideal anterior tooth widths from the mouth width and face shape.
pub fn compute_dental_proportions(landmarks: &LandmarkSet, face_shape: &FaceShape) -> DentalProportions {
    let jawline = landmarks.group(LandmarkGroup::Jawline);
    let lips = landmarks.group(LandmarkGroup::Lips);

    if jawline.len() < MIN_JAWLINE_POINTS || lips.len() < MIN_LIP_POINTS {
        debug!(
            jawline = jawline.len(),
            lips = lips.len(),
            "not enough points for dental proportions"
        );
        return DentalProportions::zero();
    }

    let corners = (
        landmarks.role(LandmarkRole::LipCornerLeft),
        landmarks.role(LandmarkRole::LipCornerRight),
    );
    let mouth_width = match corners {
        (Some(left), Some(right)) => left.distance(&right),
        _ => {
            debug!("lip corners missing, dental proportions unavailable");
            return DentalProportions::zero();
        }
    };

    proportions_for_mouth_width(mouth_width, face_shape)
}

/// Tooth widths for a given mouth width. Linear in `mouth_width`.
pub fn proportions_for_mouth_width(mouth_width: f32, face_shape: &FaceShape) -> DentalProportions {
    let (central, lateral, canine) = tooth_ratios(face_shape.shape);

    DentalProportions {
        central_incisors_width: mouth_width * central,
        lateral_incisors_width: mouth_width * lateral,
        canines_width: mouth_width * canine,
        confidence: PROPORTIONS_CONFIDENCE_FACTOR * face_shape.confidence,
    }
}
