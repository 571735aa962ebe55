use super::raster::{self, PixelPos};
use super::Tool;
use crate::color::Color;
use crate::error::CanvasResult;
use crate::pixel_buffer::PixelBuffer;

/// The eraser tool: same path as the brush but writes full transparency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EraserTool;

impl EraserTool {
    pub const NAME: &'static str = "Eraser";
}

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply_stroke(
        &self,
        buffer: &mut PixelBuffer,
        points: &[PixelPos],
        _color: Color,
        size: u32,
    ) -> CanvasResult<()> {
        raster::stamp_path(buffer, points, Color::TRANSPARENT, size);
        Ok(())
    }
}
