use deli_base::Vec2;
use deli_image::Frame;

pub type Color = [u8; 3];

/// Drawing target for the overlay renderer.
pub trait Canvas {
    fn resize(&mut self, width: usize, height: usize);
    fn size(&self) -> (usize, usize);
    fn clear(&mut self);
    /// Draw `frame` scaled to fill the whole canvas.
    fn draw_frame(&mut self, frame: &Frame);
    fn fill_circle(&mut self, center: Vec2<f32>, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2<f32>, to: Vec2<f32>, width: u32, color: Color);
}

/// RGB8 raster canvas, row-major.
#[derive(Clone, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

// keeps the clipping arithmetic far from overflow
const COORD_LIMIT: f32 = 1_000_000.0;

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Packed `0xFFRRGGBB` pixels for window buffers.
    pub fn to_u32(&self) -> Vec<u32> {
        deli_image::rgb_to_u32(&self.pixels)
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let idx = (y * self.width + x) * 3;
        self.pixels[idx..idx + 3].copy_from_slice(&color);
    }

    /// Draw a 1px line using Bresenham's algorithm with clipping
    fn draw_line(&mut self, mut x0: i32, mut y0: i32, mut x1: i32, mut y1: i32, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (width, height) = (self.width as i32, self.height as i32);

        // Cohen-Sutherland line clipping to bounds
        loop {
            let outcode0 = compute_outcode(x0, y0, width, height);
            let outcode1 = compute_outcode(x1, y1, width, height);

            if (outcode0 | outcode1) == 0 {
                break;
            } else if (outcode0 & outcode1) != 0 {
                return;
            } else {
                let outcode = if outcode0 != 0 { outcode0 } else { outcode1 };
                let (x, y) = clip_point(x0, y0, x1, y1, outcode, width, height);

                if outcode == outcode0 {
                    x0 = x;
                    y0 = y;
                } else {
                    x1 = x;
                    y1 = y;
                }
            }
        }

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            self.set_pixel(x0 as usize, y0 as usize, color);

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

impl Canvas for Surface {
    fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Surface::new(width, height);
        }
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_frame(&mut self, frame: &Frame) {
        if !frame.is_valid() || self.width == 0 || self.height == 0 {
            return;
        }
        let (fw, fh) = (frame.width(), frame.height());
        let src = frame.data();

        // nearest-neighbour, a straight copy when sizes match
        for y in 0..self.height {
            let sy = y * fh / self.height;
            for x in 0..self.width {
                let sx = x * fw / self.width;
                let s = (sy * fw + sx) * 3;
                let d = (y * self.width + x) * 3;
                self.pixels[d..d + 3].copy_from_slice(&src[s..s + 3]);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2<f32>, radius: f32, color: Color) {
        let c = clamp_point(center);
        let radius = radius.round().max(0.0) as i32;
        let r2 = radius * radius;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    let x = c.x + dx;
                    let y = c.y + dy;

                    if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                        self.set_pixel(x as usize, y as usize, color);
                    }
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2<f32>, to: Vec2<f32>, width: u32, color: Color) {
        let a = clamp_point(from);
        let b = clamp_point(to);
        let width = width.max(1) as i32;

        // thick strokes are parallel 1px lines, offset across the major axis
        let steep = (b.y - a.y).abs() > (b.x - a.x).abs();
        for offset in -((width - 1) / 2)..=(width / 2) {
            let (ox, oy) = if steep { (offset, 0) } else { (0, offset) };
            self.draw_line(a.x + ox, a.y + oy, b.x + ox, b.y + oy, color);
        }
    }
}

fn clamp_point(p: Vec2<f32>) -> Vec2<i32> {
    let clamp = |v: f32| {
        if v.is_nan() {
            0.0
        } else {
            v.clamp(-COORD_LIMIT, COORD_LIMIT)
        }
    };
    Vec2::new(clamp(p.x), clamp(p.y)).to_pixel()
}

// Cohen-Sutherland clipping helpers
const INSIDE: u8 = 0; // 0000
const LEFT: u8 = 1; // 0001
const RIGHT: u8 = 2; // 0010
const BOTTOM: u8 = 4; // 0100
const TOP: u8 = 8; // 1000

fn compute_outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

fn clip_point(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    outcode: u8,
    width: i32,
    height: i32,
) -> (i32, i32) {
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let (width, height) = (width as i64, height as i64);
    let dx = x1 - x0;
    let dy = y1 - y0;

    let (x, y) = if outcode & TOP != 0 {
        (x0 + dx * (0 - y0) / dy, 0)
    } else if outcode & BOTTOM != 0 {
        (x0 + dx * (height - 1 - y0) / dy, height - 1)
    } else if outcode & LEFT != 0 {
        (0, y0 + dy * (0 - x0) / dx)
    } else {
        (width - 1, y0 + dy * (width - 1 - x0) / dx)
    };
    (x as i32, y as i32)
}
