use crate::surface::{Canvas, Color};
use deli_image::Frame;
use deli_infer::{BodyPart, ConnectionTable, Pose};

/// Overlay drawing parameters.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    min_confidence: f32,
    shoulder_confidence: f32,
    keypoint_radius: f32,
    skeleton_width: u32,
    shoulder_width: u32,
    color: Color,
    connections: ConnectionTable,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            shoulder_confidence: 0.5,
            keypoint_radius: 5.0,
            skeleton_width: 2,
            shoulder_width: 4,
            color: [255, 0, 0],
            connections: ConnectionTable::default(),
        }
    }
}

impl RenderConfig {
    /// Minimum score for keypoint markers and skeleton lines.
    pub fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold;
        self
    }

    /// Minimum score for both shoulders before the shoulder line is emphasized.
    pub fn with_shoulder_confidence(mut self, threshold: f32) -> Self {
        self.shoulder_confidence = threshold;
        self
    }

    pub fn with_keypoint_radius(mut self, radius: f32) -> Self {
        self.keypoint_radius = radius;
        self
    }

    pub fn with_skeleton_width(mut self, width: u32) -> Self {
        self.skeleton_width = width;
        self
    }

    pub fn with_shoulder_width(mut self, width: u32) -> Self {
        self.shoulder_width = width;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_connections(mut self, connections: ConnectionTable) -> Self {
        self.connections = connections;
        self
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    pub fn shoulder_confidence(&self) -> f32 {
        self.shoulder_confidence
    }

    pub fn keypoint_radius(&self) -> f32 {
        self.keypoint_radius
    }

    pub fn skeleton_width(&self) -> u32 {
        self.skeleton_width
    }

    pub fn shoulder_width(&self) -> u32 {
        self.shoulder_width
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }
}

/// Draws a frame with its pose overlay.
///
/// Holds no drawing state; every `render` starts from a cleared canvas.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    config: RenderConfig,
}

impl OverlayRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, canvas: &mut impl Canvas, frame: &Frame, pose: &Pose) {
        let config = &self.config;

        canvas.resize(frame.width(), frame.height());
        canvas.clear();
        canvas.draw_frame(frame);

        for keypoint in pose.iter().filter(|k| k.score >= config.min_confidence) {
            canvas.fill_circle(keypoint.position, config.keypoint_radius, config.color);
        }

        for (from, to) in config.connections.adjacent_keypoints(pose, config.min_confidence) {
            canvas.stroke_line(from.position, to.position, config.skeleton_width, config.color);
        }

        let left = pose.keypoint(BodyPart::LeftShoulder);
        let right = pose.keypoint(BodyPart::RightShoulder);
        if left.score >= config.shoulder_confidence && right.score >= config.shoulder_confidence {
            canvas.stroke_line(left.position, right.position, config.shoulder_width, config.color);
        }
    }
}
