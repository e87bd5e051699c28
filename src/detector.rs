use std::fs;
use std::path::Path;

use image::DynamicImage;
use serde::Deserialize;

use crate::error::Result;
use crate::landmarks::from_ibug;
use crate::types::{Keypoint, Point};

/// An external facial landmark detector.
///
/// Implementations are constructed already initialized (models loaded) and
/// are handed to [`Analyzer::new`](crate::Analyzer::new). Each call returns
/// one keypoint set per detected face; an empty vector means no face.
pub trait LandmarkDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Vec<Keypoint>>>;
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for &D {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Vec<Keypoint>>> {
        (**self).detect(image)
    }
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for Box<D> {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Vec<Keypoint>>> {
        (**self).detect(image)
    }
}

/// Layout of a keypoint file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeypointLayout {
    /// `{name, x, y}` objects: one array per face, or a single array.
    #[default]
    Named,
    /// `[x, y]` pairs in iBUG 68/81 order: one array per face, or a single array.
    Ibug,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedFile {
    Faces(Vec<Vec<Keypoint>>),
    Single(Vec<Keypoint>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IbugFile {
    Faces(Vec<Vec<[f32; 2]>>),
    Single(Vec<[f32; 2]>),
}

/// Replays landmarks that were detected ahead of time, regardless of the
/// image it is asked about.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    faces: Vec<Vec<Keypoint>>,
}

impl StaticDetector {
    pub fn new(faces: Vec<Vec<Keypoint>>) -> Self {
        Self { faces }
    }

    /// A detector that never finds a face.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str, layout: KeypointLayout) -> Result<Self> {
        let faces = match layout {
            KeypointLayout::Named => match serde_json::from_str::<NamedFile>(json)? {
                NamedFile::Faces(faces) => faces,
                NamedFile::Single(face) if face.is_empty() => Vec::new(),
                NamedFile::Single(face) => vec![face],
            },
            KeypointLayout::Ibug => {
                let raw = match serde_json::from_str::<IbugFile>(json)? {
                    IbugFile::Faces(faces) => faces,
                    IbugFile::Single(face) if face.is_empty() => Vec::new(),
                    IbugFile::Single(face) => vec![face],
                };
                raw.iter()
                    .map(|face| {
                        let points: Vec<Point> =
                            face.iter().map(|[x, y]| Point::new(*x, *y)).collect();
                        from_ibug(&points)
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(Self::new(faces))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P, layout: KeypointLayout) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json, layout)
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

impl LandmarkDetector for StaticDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Vec<Keypoint>>> {
        Ok(self.faces.clone())
    }
}
