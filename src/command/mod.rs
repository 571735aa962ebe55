mod history;

pub use history::HistoryManager;

use crate::color::Color;
use crate::error::CanvasResult;
use crate::layer::{LayerId, LayerStack};
use crate::pixel_buffer::ResizePolicy;

/// Structural edits to the layer stack. Each executed command is one undo
/// step; pixel edits from tools are recorded separately by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Adds a layer above the active one
    AddLayer { name: String },
    RemoveLayer { layer_id: LayerId },
    ReorderLayer { layer_id: LayerId, new_index: usize },
    MoveLayerUp { layer_id: LayerId },
    MoveLayerDown { layer_id: LayerId },
    SetVisible { layer_id: LayerId, visible: bool },
    SetOpacity { layer_id: LayerId, opacity: f32 },
    RenameLayer { layer_id: LayerId, name: String },
    /// Clears the active layer to fully transparent
    ClearLayer,
    Resize { width: u32, height: u32, policy: ResizePolicy },
    /// Doubles the canvas resolution, up to `max_dimension`
    Refine { max_dimension: u32 },
    /// Halves the canvas resolution, down to 1x1
    Coarsen,
}

impl Command {
    pub fn execute(&self, stack: &mut LayerStack) -> CanvasResult<()> {
        match self {
            Command::AddLayer { name } => {
                stack.add_layer(name);
            }
            Command::RemoveLayer { layer_id } => {
                stack.remove_layer(*layer_id)?;
            }
            Command::ReorderLayer { layer_id, new_index } => stack.reorder(*layer_id, *new_index)?,
            Command::MoveLayerUp { layer_id } => stack.move_up(*layer_id)?,
            Command::MoveLayerDown { layer_id } => stack.move_down(*layer_id)?,
            Command::SetVisible { layer_id, visible } => stack.set_visible(*layer_id, *visible)?,
            Command::SetOpacity { layer_id, opacity } => stack.set_opacity(*layer_id, *opacity)?,
            Command::RenameLayer { layer_id, name } => stack.rename(*layer_id, name)?,
            Command::ClearLayer => stack.active_layer_mut().buffer_mut().fill(Color::TRANSPARENT),
            Command::Resize { width, height, policy } => stack.resize(*width, *height, *policy)?,
            Command::Refine { max_dimension } => {
                if stack.width().max(stack.height()).saturating_mul(2) <= *max_dimension {
                    stack.upscale()?;
                } else {
                    log::debug!("Canvas already at maximum resolution");
                }
            }
            Command::Coarsen => {
                if stack.width() > 1 || stack.height() > 1 {
                    stack.downscale();
                }
            }
        }
        Ok(())
    }

    /// Short label for history and log output
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddLayer { .. } => "Add Layer",
            Command::RemoveLayer { .. } => "Remove Layer",
            Command::ReorderLayer { .. } => "Reorder Layer",
            Command::MoveLayerUp { .. } => "Raise Layer",
            Command::MoveLayerDown { .. } => "Lower Layer",
            Command::SetVisible { .. } => "Toggle Visibility",
            Command::SetOpacity { .. } => "Set Opacity",
            Command::RenameLayer { .. } => "Rename Layer",
            Command::ClearLayer => "Clear Layer",
            Command::Resize { .. } => "Resize Canvas",
            Command::Refine { .. } => "Refine",
            Command::Coarsen => "Coarsen",
        }
    }
}
