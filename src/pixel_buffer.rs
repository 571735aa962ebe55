use image::RgbaImage;
use std::fmt;

use crate::color::Color;
use crate::error::{CanvasError, CanvasResult};

/// Largest canvas side. Every stack, and therefore every saved project,
/// stays within it.
pub const MAX_DIMENSION: u32 = 16384;

/// Rejects empty canvases and sides over `MAX_DIMENSION`
pub fn check_dimensions(width: u32, height: u32) -> CanvasResult<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CanvasError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// How `PixelBuffer::resize` maps old pixels onto the new grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ResizePolicy {
    /// Keep the top-left region; new pixels repeat the nearest edge pixel
    #[default]
    CropOrPad,
    /// Resample with nearest-neighbour lookup
    NearestNeighbor,
}

/// A fixed-size grid of RGBA pixels backing a single layer
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PixelBuffer {
    /// Creates a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color.into()),
        }
    }

    /// Wraps raw row-major RGBA bytes
    pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> CanvasResult<Self> {
        let len = bytes.len();
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(len) {
            return Err(CanvasError::corrupt(format!(
                "{len} pixel bytes do not match a {width}x{height} canvas"
            )));
        }
        RgbaImage::from_raw(width, height, bytes)
            .map(|image| Self { image })
            .ok_or_else(|| CanvasError::corrupt("pixel data does not fit the canvas"))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    fn check_bounds(&self, x: u32, y: u32) -> CanvasResult<()> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    pub fn get(&self, x: u32, y: u32) -> CanvasResult<Color> {
        self.check_bounds(x, y)?;
        Ok((*self.image.get_pixel(x, y)).into())
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) -> CanvasResult<()> {
        self.check_bounds(x, y)?;
        self.image.put_pixel(x, y, color.into());
        Ok(())
    }

    pub fn fill(&mut self, color: Color) {
        let px: image::Rgba<u8> = color.into();
        self.image.pixels_mut().for_each(|p| *p = px);
    }

    /// Raw row-major RGBA bytes
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.image.get_pixel(x, y)).into()
    }

    pub(crate) fn put(&mut self, x: u32, y: u32, color: Color) {
        self.image.put_pixel(x, y, color.into());
    }

    /// Returns a resized copy; the original is left as is
    pub fn resize(&self, new_width: u32, new_height: u32, policy: ResizePolicy) -> CanvasResult<Self> {
        check_dimensions(new_width, new_height)?;
        let (w, h) = self.size();
        if w == 0 || h == 0 {
            return Ok(Self::new(new_width, new_height));
        }
        let image = match policy {
            ResizePolicy::CropOrPad => RgbaImage::from_fn(new_width, new_height, |x, y| {
                *self.image.get_pixel(x.min(w - 1), y.min(h - 1))
            }),
            ResizePolicy::NearestNeighbor => RgbaImage::from_fn(new_width, new_height, |x, y| {
                let sx = (x as u64 * w as u64 / new_width as u64) as u32;
                let sy = (y as u64 * h as u64 / new_height as u64) as u32;
                *self.image.get_pixel(sx, sy)
            }),
        };
        Ok(Self { image })
    }

    /// Doubles both dimensions, each pixel becoming a 2x2 block
    pub fn upscale(&self) -> Self {
        let image = RgbaImage::from_fn(self.width() * 2, self.height() * 2, |x, y| {
            *self.image.get_pixel(x / 2, y / 2)
        });
        Self { image }
    }

    /// Halves both dimensions (never below 1). Each new pixel is the average
    /// of the non-transparent pixels of its 2x2 source block.
    pub fn downscale(&self) -> Self {
        let (w, h) = self.size();
        let image = RgbaImage::from_fn((w / 2).max(1), (h / 2).max(1), |x, y| {
            let block = (2 * y..(2 * y + 2).min(h))
                .flat_map(|sy| (2 * x..(2 * x + 2).min(w)).map(move |sx| (sx, sy)))
                .map(|(sx, sy)| self.pixel(sx, sy));
            average_opaque(block).into()
        });
        Self { image }
    }
}

/// Rounded average of the non-transparent colours; transparent when none are
fn average_opaque(colors: impl Iterator<Item = Color>) -> Color {
    let mut sum = [0u32; 4];
    let mut count = 0u32;
    for c in colors.filter(|c| !c.is_transparent()) {
        for (s, v) in sum.iter_mut().zip(c.to_array()) {
            *s += v as u32;
        }
        count += 1;
    }
    if count == 0 {
        return Color::TRANSPARENT;
    }
    // ties round to even
    let avg = |s: u32| (s as f32 / count as f32).round_ties_even() as u8;
    Color::rgba(avg(sum[0]), avg(sum[1]), avg(sum[2]), avg(sum[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut buf = PixelBuffer::new(4, 3);
        let red = Color::rgb(255, 0, 0);
        for y in 0..3 {
            for x in 0..4 {
                buf.set(x, y, red).unwrap();
                assert_eq!(buf.get(x, y).unwrap(), red);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut buf = PixelBuffer::new(4, 3);
        assert!(matches!(buf.get(4, 0), Err(CanvasError::OutOfBounds { x: 4, y: 0, .. })));
        assert!(matches!(buf.set(0, 3, Color::BLACK), Err(CanvasError::OutOfBounds { .. })));
    }

    #[test]
    fn test_fill() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.fill(Color::WHITE);
        assert!(buf.as_raw().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_from_rgba_length_mismatch() {
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 17]).is_err());
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_crop_or_pad_repeats_edge() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(0, 0, Color::BLACK).unwrap();
        buf.set(1, 0, Color::WHITE).unwrap();

        let padded = buf.resize(4, 2, ResizePolicy::CropOrPad).unwrap();
        assert_eq!(padded.size(), (4, 2));
        assert_eq!(padded.get(0, 0).unwrap(), Color::BLACK);
        assert_eq!(padded.get(3, 0).unwrap(), Color::WHITE);
        assert_eq!(padded.get(0, 1).unwrap(), Color::BLACK);

        let cropped = buf.resize(1, 1, ResizePolicy::CropOrPad).unwrap();
        assert_eq!(cropped.get(0, 0).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_nearest_neighbor_is_deterministic() {
        let mut buf = PixelBuffer::new(3, 3);
        buf.set(1, 1, Color::rgb(1, 2, 3)).unwrap();
        let a = buf.resize(7, 5, ResizePolicy::NearestNeighbor).unwrap();
        let b = buf.resize(7, 5, ResizePolicy::NearestNeighbor).unwrap();
        assert_eq!(a, b);
        // 7/3 scale: source x=1 covers destination x in 3..=4
        assert_eq!(a.get(3, 2).unwrap(), Color::rgb(1, 2, 3));
        assert_eq!(a.get(0, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_resize_to_zero_fails() {
        let buf = PixelBuffer::new(3, 3);
        assert!(matches!(
            buf.resize(0, 3, ResizePolicy::CropOrPad),
            Err(CanvasError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_resize_past_limit_fails() {
        let buf = PixelBuffer::new(2, 1);
        assert!(matches!(
            buf.resize(MAX_DIMENSION + 1, 1, ResizePolicy::NearestNeighbor),
            Err(CanvasError::InvalidDimensions { width, .. }) if width == MAX_DIMENSION + 1
        ));
    }

    #[test]
    fn test_upscale_copies_blocks() {
        let buf = PixelBuffer::filled(1, 1, Color::rgb(255, 0, 255));
        let big = buf.upscale();
        assert_eq!(big.size(), (2, 2));
        assert_eq!(big.get(1, 1).unwrap(), Color::rgb(255, 0, 255));
    }

    #[test]
    fn test_downscale_ignores_transparent() {
        let mut buf = PixelBuffer::filled(4, 4, Color::rgb(212, 153, 185));
        buf.set(3, 0, Color::TRANSPARENT).unwrap();
        buf.set(0, 2, Color::TRANSPARENT).unwrap();
        buf.set(2, 2, Color::rgb(88, 129, 87)).unwrap();

        let small = buf.downscale();
        assert_eq!(small.size(), (2, 2));
        assert_eq!(small.get(0, 0).unwrap(), Color::rgb(212, 153, 185));
        assert_eq!(small.get(1, 0).unwrap(), Color::rgb(212, 153, 185));
        assert_eq!(small.get(0, 1).unwrap(), Color::rgb(212, 153, 185));
        assert_eq!(small.get(1, 1).unwrap(), Color::rgb(181, 147, 160));

        let empty = PixelBuffer::new(2, 2).downscale();
        assert_eq!(empty.get(0, 0).unwrap(), Color::TRANSPARENT);
    }
}
