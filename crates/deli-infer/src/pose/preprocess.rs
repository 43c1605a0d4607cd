use crate::InferError;
use deli_base::Tensor;
use deli_image::Frame;

use super::types::LetterboxInfo;

pub const TARGET_SIZE: usize = 640;
const PAD_COLOR: f32 = 114.0 / 255.0; // Gray padding in normalized range

/// Preprocess a frame for YOLO pose inference
///
/// Returns a tensor in NCHW format (1, 3, 640, 640) with values in [0.0, 1.0]:
/// - Letterbox resize to 640x640 maintaining aspect ratio (nearest-neighbor)
/// - HWC -> NCHW transpose
/// - Rescale from [0, 255] to [0.0, 1.0]
///
/// Also returns the letterbox info needed to map detections back to the frame.
pub fn preprocess(frame: &Frame) -> Result<(Tensor<f32>, LetterboxInfo), InferError> {
    if !frame.is_valid() {
        return Err(InferError::Shape(format!(
            "cannot preprocess a {}x{} frame",
            frame.width(),
            frame.height()
        )));
    }
    let (w, h) = (frame.width(), frame.height());
    let pixels = frame.data();

    let scale = (TARGET_SIZE as f32 / w as f32).min(TARGET_SIZE as f32 / h as f32);

    let new_w = ((w as f32 * scale) as usize).clamp(1, TARGET_SIZE);
    let new_h = ((h as f32 * scale) as usize).clamp(1, TARGET_SIZE);

    let pad_x = (TARGET_SIZE - new_w) / 2;
    let pad_y = (TARGET_SIZE - new_h) / 2;

    let plane = TARGET_SIZE * TARGET_SIZE;
    let mut nchw = vec![PAD_COLOR; 3 * plane];

    for out_y in 0..new_h {
        let src_y = ((out_y as f32 / scale) as usize).min(h - 1);
        for out_x in 0..new_w {
            let src_x = ((out_x as f32 / scale) as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst = (out_y + pad_y) * TARGET_SIZE + out_x + pad_x;
            for ch in 0..3 {
                nchw[ch * plane + dst] = pixels[src + ch] as f32 / 255.0;
            }
        }
    }

    let tensor = Tensor::new(vec![1, 3, TARGET_SIZE, TARGET_SIZE], nchw)?;

    let letterbox = LetterboxInfo {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
    };

    Ok((tensor, letterbox))
}
