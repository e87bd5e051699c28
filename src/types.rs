use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Angle of the vector from `self` to `other`, in degrees, measured from the +x axis.
    pub fn angle_to(&self, other: &Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Arithmetic mean of the given points. Returns `None` for an empty slice.
    pub fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Point::zero(), |acc, p| acc + *p);
        let n = points.len() as f32;
        Some(Point::new(sum.x / n, sum.y / n))
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// A named facial landmark as produced by the external detector.
///
/// Names follow the MediaPipe face-mesh convention (`noseTip`, `chin`,
/// `jawline_3`, `lips_7`, ...). The optional depth coordinate is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Estimated vertical axis of facial symmetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Midline {
    /// Two or three points ordered top to bottom.
    pub points: Vec<Point>,
    /// Direction of the line in degrees (atan2 of dy, dx).
    pub angle: f32,
    pub confidence: f32,
}

impl Midline {
    /// Deviation of the midline from a perfectly vertical axis, in degrees.
    pub fn tilt_from_vertical(&self) -> f32 {
        self.angle.rem_euclid(180.0) - 90.0
    }
}

/// Coarse face silhouette category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Round,
    Oval,
    Square,
    Long,
    Unknown,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Round => "round",
            ShapeKind::Oval => "oval",
            ShapeKind::Square => "square",
            ShapeKind::Long => "long",
            ShapeKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Face shape classification. The confidence is a fixed constant per band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceShape {
    pub shape: ShapeKind,
    /// Face width divided by face height.
    pub ratio: f32,
    pub confidence: f32,
}

impl FaceShape {
    pub const fn unknown() -> Self {
        Self {
            shape: ShapeKind::Unknown,
            ratio: 0.0,
            confidence: 0.0,
        }
    }

    /// Classify a width/height ratio.
    ///
    /// Bands are checked in order: round `(0.9, 1.1)`, oval `[0.8, 0.9]`,
    /// long `< 0.8`, and square for everything else (including exactly 1.1).
    pub fn from_ratio(ratio: f32) -> Self {
        let (shape, confidence) = if ratio > 0.9 && ratio < 1.1 {
            (ShapeKind::Round, 0.8)
        } else if (0.8..=0.9).contains(&ratio) {
            (ShapeKind::Oval, 0.9)
        } else if ratio < 0.8 {
            (ShapeKind::Long, 0.85)
        } else {
            (ShapeKind::Square, 0.75)
        };

        Self {
            shape,
            ratio,
            confidence,
        }
    }
}

/// Suggested anterior tooth widths.
///
/// Widths are expressed in the coordinate unit of the input keypoints. They are
/// labeled millimeters downstream, but no pixel-to-mm calibration is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DentalProportions {
    pub central_incisors_width: f32,
    pub lateral_incisors_width: f32,
    pub canines_width: f32,
    pub confidence: f32,
}

impl DentalProportions {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Half-width of the six anterior teeth laid side by side.
    pub fn half_span(&self) -> f32 {
        self.central_incisors_width + self.lateral_incisors_width + self.canines_width
    }
}

/// Output of one analysis call.
///
/// A failed analysis carries only `error`; a successful one carries every
/// derived measurement plus the input landmarks for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midline: Option<Midline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_shape: Option<FaceShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dental_proportions: Option<DentalProportions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Keypoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn success(
        midline: Midline,
        face_shape: FaceShape,
        dental_proportions: DentalProportions,
        landmarks: Vec<Keypoint>,
    ) -> Self {
        Self {
            success: true,
            midline: Some(midline),
            face_shape: Some(face_shape),
            dental_proportions: Some(dental_proportions),
            landmarks: Some(landmarks),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            midline: None,
            face_shape: None,
            dental_proportions: None,
            landmarks: None,
            error: Some(error.into()),
        }
    }

    /// The three derived measurements, if the analysis succeeded.
    pub fn measurements(&self) -> Option<(&Midline, &FaceShape, &DentalProportions)> {
        if !self.success {
            return None;
        }
        match (&self.midline, &self.face_shape, &self.dental_proportions) {
            (Some(m), Some(f), Some(d)) => Some((m, f, d)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midline_at(angle: f32) -> Midline {
        Midline {
            points: vec![Point::zero(), Point::new(0.0, 1.0)],
            angle,
            confidence: 0.95,
        }
    }

    #[test]
    fn tilt_from_vertical() {
        assert_eq!(midline_at(90.0).tilt_from_vertical(), 0.0);
        assert_eq!(midline_at(-90.0).tilt_from_vertical(), 0.0);
        assert!((midline_at(92.0).tilt_from_vertical() - 2.0).abs() < 1e-5);
        assert!((midline_at(88.0).tilt_from_vertical() + 2.0).abs() < 1e-5);
    }

    #[test]
    fn half_span_sums_one_side() {
        let p = DentalProportions {
            central_incisors_width: 6.0,
            lateral_incisors_width: 4.0,
            canines_width: 3.5,
            confidence: 0.8,
        };
        assert_eq!(p.half_span(), 13.5);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
    }

    #[test]
    fn centroid_of_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 6.0),
        ];
        let c = Point::centroid(&points).unwrap();
        assert!((c.x - 2.0).abs() < 1e-6);
        assert!((c.y - 2.0).abs() < 1e-6);

        assert!(Point::centroid(&[]).is_none());
    }

    #[test]
    fn angle_points_down_is_ninety_degrees() {
        let top = Point::new(50.0, 0.0);
        let bottom = Point::new(50.0, 100.0);
        assert!((top.angle_to(&bottom) - 90.0).abs() < 1e-5);
    }

    #[test]
    fn face_shape_bands() {
        let cases = [
            (1.0, ShapeKind::Round, 0.8),
            (0.85, ShapeKind::Oval, 0.9),
            (0.9, ShapeKind::Oval, 0.9),
            (0.8, ShapeKind::Oval, 0.9),
            (0.5, ShapeKind::Long, 0.85),
            (1.5, ShapeKind::Square, 0.75),
            (1.1, ShapeKind::Square, 0.75),
        ];

        for (ratio, shape, confidence) in cases {
            let face = FaceShape::from_ratio(ratio);
            assert_eq!(face.shape, shape, "ratio {}", ratio);
            assert_eq!(face.confidence, confidence, "ratio {}", ratio);
            assert_eq!(face.ratio, ratio);
        }
    }

    #[test]
    fn failure_has_no_measurements() {
        let result = AnalysisResult::failure("no face detected in the image");
        assert!(!result.success);
        assert!(result.measurements().is_none());
        assert_eq!(result.error.as_deref(), Some("no face detected in the image"));
    }

    #[test]
    fn keypoint_json_accepts_optional_depth() {
        let kp: Keypoint = serde_json::from_str(r#"{"name":"chin","x":1.5,"y":2.0,"z":-0.3}"#).unwrap();
        assert_eq!(kp.name, "chin");
        assert_eq!(kp.z, Some(-0.3));

        let kp: Keypoint = serde_json::from_str(r#"{"name":"noseTip","x":1,"y":2}"#).unwrap();
        assert_eq!(kp.z, None);
        assert_eq!(kp.point(), Point::new(1.0, 2.0));
    }
}
