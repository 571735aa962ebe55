use super::raster::{self, PixelPos};
use super::Tool;
use crate::color::Color;
use crate::error::CanvasResult;
use crate::pixel_buffer::PixelBuffer;

/// Paints a disc of the current colour along the pointer path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrushTool;

impl BrushTool {
    pub const NAME: &'static str = "Brush";
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply_stroke(
        &self,
        buffer: &mut PixelBuffer,
        points: &[PixelPos],
        color: Color,
        size: u32,
    ) -> CanvasResult<()> {
        raster::stamp_path(buffer, points, color, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_fills_gaps_between_samples() {
        let mut buf = PixelBuffer::new(8, 1);
        let red = Color::rgb(255, 0, 0);
        BrushTool
            .apply_stroke(&mut buf, &[PixelPos::new(0, 0), PixelPos::new(7, 0)], red, 1)
            .unwrap();
        for x in 0..8 {
            assert_eq!(buf.get(x, 0).unwrap(), red);
        }
    }

    #[test]
    fn test_brush_size_three_covers_neighbours() {
        let mut buf = PixelBuffer::new(5, 5);
        BrushTool
            .apply_stroke(&mut buf, &[PixelPos::new(2, 2)], Color::BLACK, 3)
            .unwrap();
        assert_eq!(buf.get(1, 1).unwrap(), Color::BLACK);
        assert_eq!(buf.get(3, 3).unwrap(), Color::BLACK);
        assert_eq!(buf.get(0, 2).unwrap(), Color::TRANSPARENT);
    }
}
