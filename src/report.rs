//! Adapters from an [`AnalysisResult`] to its downstream consumers: the
//! storage record and the recommendation text shown to the practitioner.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisResult, ShapeKind};

/// Midline tilt, in degrees, above which a deviation note is added.
pub const MIDLINE_DEVIATION_THRESHOLD: f32 = 2.0;

/// Flat record persisted for each analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub midline_angle: f32,
    pub midline_confidence: f32,
    pub face_shape: ShapeKind,
    pub face_ratio: f32,
    pub face_shape_confidence: f32,
    pub central_incisors_width: f32,
    pub lateral_incisors_width: f32,
    pub canines_width: f32,
    pub proportions_confidence: f32,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Flatten a successful analysis for storage, stamped with the current time.
pub fn format_for_storage(result: &AnalysisResult) -> Option<StoredAnalysis> {
    format_for_storage_at(result, SystemTime::now())
}

pub fn format_for_storage_at(result: &AnalysisResult, at: SystemTime) -> Option<StoredAnalysis> {
    let (midline, face_shape, proportions) = result.measurements()?;

    let created_at = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Some(StoredAnalysis {
        midline_angle: midline.angle,
        midline_confidence: midline.confidence,
        face_shape: face_shape.shape,
        face_ratio: face_shape.ratio,
        face_shape_confidence: face_shape.confidence,
        central_incisors_width: proportions.central_incisors_width,
        lateral_incisors_width: proportions.lateral_incisors_width,
        canines_width: proportions.canines_width,
        proportions_confidence: proportions.confidence,
        created_at,
    })
}

fn shape_advice(shape: ShapeKind) -> Option<&'static str> {
    match shape {
        ShapeKind::Round => Some(
            "Round face: slightly longer central incisors with vertical emphasis help elongate the smile.",
        ),
        ShapeKind::Square => Some(
            "Square face: softened incisal angles and rounded contours balance the strong jawline.",
        ),
        ShapeKind::Long => Some(
            "Long face: wider central incisors with a flatter incisal plane reduce the vertical emphasis.",
        ),
        ShapeKind::Oval => Some(
            "Oval face: balanced proportions allow a classic anterior arrangement.",
        ),
        ShapeKind::Unknown => None,
    }
}

/// Recommendation sentences for a successful analysis, in a fixed order:
/// face-shape advice, midline deviation (only above the threshold), then the
/// ideal central and lateral incisor widths.
pub fn generate_recommendations(result: &AnalysisResult) -> Vec<String> {
    let Some((midline, face_shape, proportions)) = result.measurements() else {
        return Vec::new();
    };

    let mut recommendations = Vec::new();

    if let Some(advice) = shape_advice(face_shape.shape) {
        recommendations.push(advice.to_string());
    }

    if midline.angle.abs() > MIDLINE_DEVIATION_THRESHOLD {
        recommendations.push(format!(
            "Facial midline deviation of {:.1}° detected; check the dental midline alignment.",
            midline.angle
        ));
    }

    recommendations.push(format!(
        "Ideal central incisor width: {:.1} mm",
        proportions.central_incisors_width
    ));
    recommendations.push(format!(
        "Ideal lateral incisor width: {:.1} mm",
        proportions.lateral_incisors_width
    ));

    recommendations
}
