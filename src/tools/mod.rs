use crate::color::Color;
use crate::error::CanvasResult;
use crate::pixel_buffer::PixelBuffer;

mod brush;
mod eraser;
mod fill;
pub mod raster;

pub use brush::BrushTool;
pub use eraser::EraserTool;
pub use fill::{CancelToken, FillTool, flood_fill};
pub use raster::PixelPos;

/// Tool trait defines the interface for all drawing tools
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Whether pointer movement while the button is held extends the stroke.
    /// Tools that act once per click return false.
    fn follows_path(&self) -> bool {
        true
    }

    /// Applies one stroke segment to `buffer`. `points` are consecutive
    /// pointer samples in canvas pixels and may fall outside the buffer.
    fn apply_stroke(
        &self,
        buffer: &mut PixelBuffer,
        points: &[PixelPos],
        color: Color,
        size: u32,
    ) -> CanvasResult<()>;
}

/// Enum representing all available tool types
#[derive(Debug, Clone, PartialEq)]
pub enum ToolType {
    Brush(BrushTool),
    Eraser(EraserTool),
    Fill(FillTool),
}

impl Default for ToolType {
    fn default() -> Self {
        Self::Brush(BrushTool)
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Brush(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
            Self::Fill(tool) => tool.name(),
        }
    }

    fn follows_path(&self) -> bool {
        match self {
            Self::Brush(tool) => tool.follows_path(),
            Self::Eraser(tool) => tool.follows_path(),
            Self::Fill(tool) => tool.follows_path(),
        }
    }

    fn apply_stroke(
        &self,
        buffer: &mut PixelBuffer,
        points: &[PixelPos],
        color: Color,
        size: u32,
    ) -> CanvasResult<()> {
        match self {
            Self::Brush(tool) => tool.apply_stroke(buffer, points, color, size),
            Self::Eraser(tool) => tool.apply_stroke(buffer, points, color, size),
            Self::Fill(tool) => tool.apply_stroke(buffer, points, color, size),
        }
    }
}

/// Names of the tools offered in the tools panel, in display order
pub const TOOL_NAMES: [&str; 3] = [BrushTool::NAME, EraserTool::NAME, FillTool::NAME];

// Factory function to create a new tool of the specified type
pub fn new_tool(name: &str) -> Option<ToolType> {
    match name {
        BrushTool::NAME => Some(ToolType::Brush(BrushTool)),
        EraserTool::NAME => Some(ToolType::Eraser(EraserTool)),
        FillTool::NAME => Some(ToolType::Fill(FillTool::default())),
        _ => None,
    }
}
