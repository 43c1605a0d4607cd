use crate::InferError;
use deli_base::{Tensor, Vec2};

use super::types::{BODY_PART_COUNT, BodyPart, Keypoint, LetterboxInfo, Pose};

/// Rows per candidate: box (4), score (1), keypoints (17 x 3)
pub const OUTPUT_ROWS: usize = 5 + BODY_PART_COUNT * 3;

/// Post-process YOLO pose model output into a single pose
///
/// Takes raw model output with shape [1, 56, N], keeps the highest-scoring
/// candidate at or above `conf_threshold` and maps its keypoints from model
/// space back to frame pixels. With no such candidate the result is
/// `Pose::empty()`.
pub fn postprocess(
    output: &Tensor<f32>,
    letterbox: &LetterboxInfo,
    conf_threshold: f32,
) -> Result<Pose, InferError> {
    if output.shape.len() != 3 || output.shape[0] != 1 || output.shape[1] != OUTPUT_ROWS {
        return Err(InferError::Shape(format!(
            "expected [1, {OUTPUT_ROWS}, N] output, got {:?}",
            output.shape
        )));
    }

    // element [0, row, i] lives at row * n + i
    let n = output.shape[2];
    let at = |row: usize, i: usize| output.data[row * n + i];

    let best = (0..n)
        .filter(|&i| at(4, i) >= conf_threshold)
        .max_by(|&a, &b| at(4, a).total_cmp(&at(4, b)));

    let Some(i) = best else {
        return Ok(Pose::empty());
    };

    let keypoints = BodyPart::ALL.map(|part| {
        let base = 5 + part.index() * 3;
        let x = (at(base, i) - letterbox.pad_x) / letterbox.scale;
        let y = (at(base + 1, i) - letterbox.pad_y) / letterbox.scale;
        Keypoint::new(part, Vec2::new(x, y), at(base + 2, i))
    });

    Ok(Pose {
        keypoints,
        score: at(4, i),
    })
}
