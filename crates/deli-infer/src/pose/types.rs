use crate::InferError;
use deli_base::Vec2;
use std::fmt;
use std::str::FromStr;

/// Number of body parts in the COCO pose vocabulary
pub const BODY_PART_COUNT: usize = 17;

/// COCO body parts, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    pub const ALL: [BodyPart; BODY_PART_COUNT] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// camelCase label, e.g. `leftShoulder`.
    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "leftEye",
            BodyPart::RightEye => "rightEye",
            BodyPart::LeftEar => "leftEar",
            BodyPart::RightEar => "rightEar",
            BodyPart::LeftShoulder => "leftShoulder",
            BodyPart::RightShoulder => "rightShoulder",
            BodyPart::LeftElbow => "leftElbow",
            BodyPart::RightElbow => "rightElbow",
            BodyPart::LeftWrist => "leftWrist",
            BodyPart::RightWrist => "rightWrist",
            BodyPart::LeftHip => "leftHip",
            BodyPart::RightHip => "rightHip",
            BodyPart::LeftKnee => "leftKnee",
            BodyPart::RightKnee => "rightKnee",
            BodyPart::LeftAnkle => "leftAnkle",
            BodyPart::RightAnkle => "rightAnkle",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|part| part.name() == s)
            .ok_or_else(|| InferError::UnknownBodyPart(s.to_string()))
    }
}

impl TryFrom<usize> for BodyPart {
    type Error = InferError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        BodyPart::ALL
            .get(value)
            .copied()
            .ok_or_else(|| InferError::UnknownBodyPart(format!("index {value}")))
    }
}

/// A body part located in frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: Vec2<f32>,
    /// Confidence in [0.0, 1.0].
    pub score: f32,
}

impl Keypoint {
    pub fn new(part: BodyPart, position: Vec2<f32>, score: f32) -> Self {
        Self {
            part,
            position,
            score,
        }
    }
}

/// One subject's keypoints, always the full vocabulary in `BodyPart::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub keypoints: [Keypoint; BODY_PART_COUNT],
    /// Detection confidence for the subject as a whole.
    pub score: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self::empty()
    }
}

impl Pose {
    /// The pose reported when no subject is found: every part at the origin with score 0.
    pub fn empty() -> Self {
        Self {
            keypoints: BodyPart::ALL.map(|part| Keypoint::new(part, Vec2::zero(), 0.0)),
            score: 0.0,
        }
    }

    /// Build a pose from sparse keypoints; parts not listed get score 0.
    pub fn from_keypoints(keypoints: impl IntoIterator<Item = Keypoint>, score: f32) -> Self {
        let mut pose = Self::empty();
        pose.score = score;
        for keypoint in keypoints {
            pose.keypoints[keypoint.part.index()] = keypoint;
        }
        pose
    }

    pub fn keypoint(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter()
    }

    /// Reflect every x coordinate across a frame of the given width.
    ///
    /// Labels are kept; the left shoulder stays `LeftShoulder` on the other side.
    pub fn mirrored(&self, width: usize) -> Pose {
        let max_x = width.saturating_sub(1) as f32;
        let mut pose = self.clone();
        for keypoint in pose.keypoints.iter_mut() {
            keypoint.position.x = max_x - keypoint.position.x;
        }
        pose
    }
}

/// Letterbox transformation parameters for coordinate rescaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied to the image (min(640/H, 640/W))
    pub scale: f32,
    /// Horizontal padding added (in pixels)
    pub pad_x: f32,
    /// Vertical padding added (in pixels)
    pub pad_y: f32,
}
