use super::types::{BodyPart, Keypoint, Pose};
use crate::InferError;
use std::path::Path;

/// Two anatomically adjacent body parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from: BodyPart,
    pub to: BodyPart,
}

impl Connection {
    pub fn new(from: BodyPart, to: BodyPart) -> Self {
        Self { from, to }
    }

    /// True if this connection joins `a` and `b`, in either order.
    pub fn joins(&self, a: BodyPart, b: BodyPart) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

const DEFAULT_PAIRS: [(BodyPart, BodyPart); 12] = [
    (BodyPart::LeftHip, BodyPart::LeftShoulder),
    (BodyPart::LeftElbow, BodyPart::LeftShoulder),
    (BodyPart::LeftElbow, BodyPart::LeftWrist),
    (BodyPart::LeftHip, BodyPart::LeftKnee),
    (BodyPart::LeftKnee, BodyPart::LeftAnkle),
    (BodyPart::RightHip, BodyPart::RightShoulder),
    (BodyPart::RightElbow, BodyPart::RightShoulder),
    (BodyPart::RightElbow, BodyPart::RightWrist),
    (BodyPart::RightHip, BodyPart::RightKnee),
    (BodyPart::RightKnee, BodyPart::RightAnkle),
    (BodyPart::LeftShoulder, BodyPart::RightShoulder),
    (BodyPart::LeftHip, BodyPart::RightHip),
];

/// Static table of skeleton connections.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionTable {
    connections: Vec<Connection>,
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self {
            connections: DEFAULT_PAIRS
                .iter()
                .map(|&(from, to)| Connection::new(from, to))
                .collect(),
        }
    }
}

impl ConnectionTable {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self { connections }
    }

    /// Build a table from label pairs, failing on the first unknown label.
    pub fn from_names<S: AsRef<str>>(pairs: &[(S, S)]) -> Result<Self, InferError> {
        let connections = pairs
            .iter()
            .map(|(from, to)| Ok(Connection::new(from.as_ref().parse()?, to.as_ref().parse()?)))
            .collect::<Result<Vec<_>, InferError>>()?;
        Ok(Self { connections })
    }

    /// Parse `[["leftShoulder", "rightShoulder"], ...]`.
    pub fn from_json(json: &str) -> Result<Self, InferError> {
        let pairs: Vec<(String, String)> = serde_json::from_str(json)?;
        if pairs.is_empty() {
            return Err(InferError::Skeleton("connection table is empty".to_string()));
        }
        Self::from_names(&pairs)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, a: BodyPart, b: BodyPart) -> bool {
        self.connections.iter().any(|c| c.joins(a, b))
    }

    /// Keypoint pairs for every connection whose endpoints both reach `min_confidence`.
    pub fn adjacent_keypoints(&self, pose: &Pose, min_confidence: f32) -> Vec<(Keypoint, Keypoint)> {
        self.connections
            .iter()
            .filter_map(|c| {
                let from = *pose.keypoint(c.from);
                let to = *pose.keypoint(c.to);
                (from.score >= min_confidence && to.score >= min_confidence).then_some((from, to))
            })
            .collect()
    }
}
