//! Typed access to named facial keypoints.
//!
//! Detectors hand us a flat list of named points. The analysis needs two kinds
//! of lookup over that list:
//! - **roles**: a single anatomical point matched by its exact name (`chin`)
//! - **groups**: every point whose name contains a pattern (`jawline`)
//!
//! [`LandmarkSet`] resolves both once per keypoint set so the analysis code
//! works with typed fields instead of re-scanning strings.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{Keypoint, Point};

/// A single landmark identified by its exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkRole {
    Nasion,
    NoseTip,
    Chin,
    ForeheadCenter,
    LipCornerLeft,
    LipCornerRight,
}

impl LandmarkRole {
    pub const ALL: [LandmarkRole; 6] = [
        LandmarkRole::Nasion,
        LandmarkRole::NoseTip,
        LandmarkRole::Chin,
        LandmarkRole::ForeheadCenter,
        LandmarkRole::LipCornerLeft,
        LandmarkRole::LipCornerRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkRole::Nasion => "nasion",
            LandmarkRole::NoseTip => "noseTip",
            LandmarkRole::Chin => "chin",
            LandmarkRole::ForeheadCenter => "foreheadCenter",
            LandmarkRole::LipCornerLeft => "lipCornerLeft",
            LandmarkRole::LipCornerRight => "lipCornerRight",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }
}

/// A family of landmarks identified by a substring of their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkGroup {
    LeftEye,
    RightEye,
    Nose,
    Mouth,
    Jawline,
    Forehead,
    Lips,
}

impl LandmarkGroup {
    pub const ALL: [LandmarkGroup; 7] = [
        LandmarkGroup::LeftEye,
        LandmarkGroup::RightEye,
        LandmarkGroup::Nose,
        LandmarkGroup::Mouth,
        LandmarkGroup::Jawline,
        LandmarkGroup::Forehead,
        LandmarkGroup::Lips,
    ];

    pub fn pattern(&self) -> &'static str {
        match self {
            LandmarkGroup::LeftEye => "leftEye",
            LandmarkGroup::RightEye => "rightEye",
            LandmarkGroup::Nose => "nose",
            LandmarkGroup::Mouth => "mouth",
            LandmarkGroup::Jawline => "jawline",
            LandmarkGroup::Forehead => "forehead",
            LandmarkGroup::Lips => "lips",
        }
    }
}

impl std::fmt::Display for LandmarkGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pattern())
    }
}

/// Keypoints indexed by role and by group.
#[derive(Debug, Clone, Default)]
pub struct LandmarkSet {
    roles: HashMap<LandmarkRole, Point>,
    groups: HashMap<LandmarkGroup, Vec<Point>>,
    len: usize,
}

impl LandmarkSet {
    /// Index a keypoint list. When several keypoints share a role name the
    /// first one wins; a keypoint can belong to any number of groups.
    pub fn new(keypoints: &[Keypoint]) -> Self {
        let mut roles = HashMap::new();
        let mut groups: HashMap<LandmarkGroup, Vec<Point>> = HashMap::new();

        for kp in keypoints {
            if let Some(role) = LandmarkRole::from_name(&kp.name) {
                roles.entry(role).or_insert_with(|| kp.point());
            }
            for group in LandmarkGroup::ALL {
                if kp.name.contains(group.pattern()) {
                    groups.entry(group).or_default().push(kp.point());
                }
            }
        }

        Self {
            roles,
            groups,
            len: keypoints.len(),
        }
    }

    pub fn role(&self, role: LandmarkRole) -> Option<Point> {
        self.roles.get(&role).copied()
    }

    /// Points of a group, in input order. Empty if none matched.
    pub fn group(&self, group: LandmarkGroup) -> &[Point] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Centroid of a group, or an error naming the empty group.
    pub fn group_centroid(&self, group: LandmarkGroup) -> Result<Point> {
        Point::centroid(self.group(group)).ok_or(Error::MissingLandmarkGroup(group))
    }

    /// Number of keypoints the set was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Translate an iBUG-indexed shape (68 points, or 81 with forehead) into
/// named keypoints.
///
/// "Left" and "right" follow image coordinates: points 36-41 become
/// `leftEye_*` and point 48 becomes `lipCornerLeft`. Role points are emitted
/// as aliases next to their indexed name so that, for example, the chin stays
/// part of the jawline group. An alias whose name would itself match a group
/// (`noseTip`, `foreheadCenter`) is never emitted alongside its indexed copy,
/// so every point counts once per group centroid. `nasion` is always present,
/// so `noseTip` is left out. Eyebrows are named `*Brow_*` so they stay out of
/// the eye groups.
pub fn from_ibug(points: &[Point]) -> Result<Vec<Keypoint>> {
    if points.len() != 68 && points.len() != 81 {
        return Err(Error::UnsupportedLayout(points.len()));
    }

    let mut keypoints = Vec::with_capacity(points.len() + 6);
    let mut push_range = |prefix: &str, range: std::ops::RangeInclusive<usize>| {
        for (i, idx) in range.enumerate() {
            let p = points[idx];
            keypoints.push(Keypoint::new(format!("{}_{}", prefix, i), p.x, p.y));
        }
    };

    push_range("jawline", 0..=16);
    push_range("leftBrow", 17..=21);
    push_range("rightBrow", 22..=26);
    push_range("nose", 27..=35);
    push_range("leftEye", 36..=41);
    push_range("rightEye", 42..=47);
    push_range("lips", 48..=59);
    push_range("mouth", 60..=67);

    let aliases = [
        (LandmarkRole::Chin, points[8]),
        (LandmarkRole::Nasion, points[27]),
        (LandmarkRole::LipCornerLeft, points[48]),
        (LandmarkRole::LipCornerRight, points[54]),
    ];
    for (role, p) in aliases {
        keypoints.push(Keypoint::new(role.name(), p.x, p.y));
    }

    if points.len() == 81 {
        // Hairline point most directly above the nose bridge. It joins the
        // forehead group under its role name instead of as forehead_*.
        let nasion_x = points[27].x;
        let center = (68..=80)
            .min_by(|&a, &b| {
                (points[a].x - nasion_x)
                    .abs()
                    .total_cmp(&(points[b].x - nasion_x).abs())
            })
            .unwrap_or(68);
        for (i, idx) in (68..=80).filter(|&idx| idx != center).enumerate() {
            let p = points[idx];
            keypoints.push(Keypoint::new(format!("forehead_{}", i), p.x, p.y));
        }
        let p = points[center];
        keypoints.push(Keypoint::new(LandmarkRole::ForeheadCenter.name(), p.x, p.y));
    }

    Ok(keypoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(name: &str, x: f32, y: f32) -> Keypoint {
        Keypoint::new(name, x, y)
    }

    #[test]
    fn exact_and_substring_lookups_are_distinct() {
        let set = LandmarkSet::new(&[
            kp("noseTip", 1.0, 1.0),
            kp("nose_2", 2.0, 2.0),
            kp("chin", 3.0, 3.0),
            kp("chinLeft", 4.0, 4.0),
        ]);

        assert_eq!(set.role(LandmarkRole::NoseTip), Some(Point::new(1.0, 1.0)));
        assert_eq!(set.role(LandmarkRole::Chin), Some(Point::new(3.0, 3.0)));
        assert_eq!(set.role(LandmarkRole::Nasion), None);

        // noseTip contains "nose", so it is part of the nose group too.
        assert_eq!(set.group(LandmarkGroup::Nose).len(), 2);
        assert!(set.group(LandmarkGroup::Jawline).is_empty());
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn first_role_match_wins() {
        let set = LandmarkSet::new(&[kp("chin", 1.0, 1.0), kp("chin", 9.0, 9.0)]);
        assert_eq!(set.role(LandmarkRole::Chin), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn empty_group_centroid_is_an_error() {
        let set = LandmarkSet::new(&[kp("leftEye_0", 0.0, 0.0)]);
        assert!(set.group_centroid(LandmarkGroup::LeftEye).is_ok());
        let err = set.group_centroid(LandmarkGroup::RightEye).unwrap_err();
        assert!(matches!(err, Error::MissingLandmarkGroup(LandmarkGroup::RightEye)));
    }

    fn ibug_points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f32, (i * 2) as f32)).collect()
    }

    #[test]
    fn ibug_68_translation() {
        let keypoints = from_ibug(&ibug_points(68)).unwrap();
        let set = LandmarkSet::new(&keypoints);

        assert_eq!(set.group(LandmarkGroup::Jawline).len(), 17);
        assert_eq!(set.group(LandmarkGroup::LeftEye).len(), 6);
        assert_eq!(set.group(LandmarkGroup::RightEye).len(), 6);
        assert_eq!(set.group(LandmarkGroup::Lips).len(), 12);
        assert_eq!(set.group(LandmarkGroup::Mouth).len(), 8);
        assert!(set.group(LandmarkGroup::Forehead).is_empty());

        assert_eq!(set.role(LandmarkRole::Chin), Some(Point::new(8.0, 16.0)));
        assert_eq!(set.role(LandmarkRole::LipCornerLeft), Some(Point::new(48.0, 96.0)));
        assert_eq!(set.role(LandmarkRole::LipCornerRight), Some(Point::new(54.0, 108.0)));
        assert_eq!(set.role(LandmarkRole::ForeheadCenter), None);
    }

    #[test]
    fn ibug_81_adds_forehead() {
        let mut points = ibug_points(81);
        points[27] = Point::new(100.0, 50.0);
        points[74] = Point::new(101.0, 0.0);

        let keypoints = from_ibug(&points).unwrap();
        let set = LandmarkSet::new(&keypoints);

        // 13 hairline points, one of them named foreheadCenter.
        assert_eq!(set.group(LandmarkGroup::Forehead).len(), 13);
        assert_eq!(set.role(LandmarkRole::ForeheadCenter), Some(Point::new(101.0, 0.0)));
        let forehead = set.group(LandmarkGroup::Forehead);
        assert_eq!(forehead.iter().filter(|p| **p == Point::new(101.0, 0.0)).count(), 1);
    }

    #[test]
    fn ibug_points_count_once_per_group() {
        let keypoints = from_ibug(&ibug_points(68)).unwrap();
        let set = LandmarkSet::new(&keypoints);

        assert_eq!(set.group(LandmarkGroup::Nose).len(), 9);
        assert_eq!(set.role(LandmarkRole::NoseTip), None);
        let centroid = set.group_centroid(LandmarkGroup::Nose).unwrap();
        // Mean of points 27..=35.
        assert!((centroid.x - 31.0).abs() < 1e-4);
        assert!((centroid.y - 62.0).abs() < 1e-4);
    }

    #[test]
    fn ibug_rejects_other_sizes() {
        let err = from_ibug(&ibug_points(5)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLayout(5)));
    }
}
