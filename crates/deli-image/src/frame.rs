use crate::ImageError;
use deli_base::Tensor;
use std::sync::Arc;

/// Handle to one RGB8 camera image.
///
/// Cloning is cheap; the pixels are shared and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Arc<Tensor<u8>>,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// The zero-sized frame a stream exposes before it has produced data.
    pub fn empty() -> Self {
        Self {
            pixels: Arc::new(Tensor {
                shape: vec![0, 0, Self::CHANNELS],
                data: Vec::new(),
            }),
        }
    }

    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let tensor = Tensor::new(vec![height, width, Self::CHANNELS], data)?;
        Ok(Self {
            pixels: Arc::new(tensor),
        })
    }

    /// Wrap an HWC tensor, which must have exactly 3 channels and as many
    /// elements as its shape describes.
    pub fn from_tensor(tensor: Tensor<u8>) -> Result<Self, ImageError> {
        if tensor.shape.len() != 3 || tensor.shape[2] != Self::CHANNELS {
            return Err(ImageError::Layout(format!(
                "expected [H, W, 3] frame, got {:?}",
                tensor.shape
            )));
        }
        let Tensor { shape, data } = tensor;
        let tensor = Tensor::new(shape, data)?;
        Ok(Self {
            pixels: Arc::new(tensor),
        })
    }

    pub fn width(&self) -> usize {
        self.pixels.shape[1]
    }

    pub fn height(&self) -> usize {
        self.pixels.shape[0]
    }

    /// A frame is usable once both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    pub fn data(&self) -> &[u8] {
        &self.pixels.data
    }

    pub fn tensor(&self) -> &Tensor<u8> {
        &self.pixels
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = (y * self.width() + x) * Self::CHANNELS;
        let px = &self.pixels.data[idx..idx + Self::CHANNELS];
        Some([px[0], px[1], px[2]])
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}
