use std::path::Path;

use crate::color::Color;
use crate::command::{Command, HistoryManager};
use crate::config::EditorConfig;
use crate::error::CanvasResult;
use crate::file_io;
use crate::layer::{LayerId, LayerStack};
use crate::palette::Palette;
use crate::tools::{PixelPos, Tool, ToolType};

/// Progress of the current pointer interaction
#[derive(Debug, Clone, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    /// Pointer is held down; `before` is the canvas as it was at pointer-down
    Drawing {
        before: LayerStack,
        last: PixelPos,
    },
}

/// All application state the UI handlers operate on. Kept free of any GUI
/// types so editing and history can be driven directly from tests.
#[derive(Debug, Clone)]
pub struct EditorState {
    stack: LayerStack,
    history: HistoryManager,
    tool: ToolType,
    color: Color,
    brush_size: u32,
    palette: Palette,
    stroke: StrokeState,
    config: EditorConfig,
    /// Bumped whenever the canvas content may have changed
    revision: u64,
    /// Layers added since the canvas was created or loaded; never decreases,
    /// so generated names stay unique after deletions
    layers_created: usize,
}

impl EditorState {
    /// Starts with a blank canvas sized by `config`
    pub fn new(config: EditorConfig) -> CanvasResult<Self> {
        let stack = LayerStack::blank(config.canvas_width, config.canvas_height, config.initial_layers)?;
        Ok(Self::with_stack(stack, config))
    }

    pub fn with_stack(stack: LayerStack, config: EditorConfig) -> Self {
        Self {
            layers_created: stack.len(),
            stack,
            history: HistoryManager::new(config.history_depth),
            tool: ToolType::default(),
            color: Color::BLACK,
            brush_size: config.default_brush_size.max(1),
            palette: Palette::new(config.max_recent_colours),
            stroke: StrokeState::Idle,
            config,
            revision: 0,
        }
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.stroke, StrokeState::Drawing { .. })
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Switches tools, finishing any stroke in progress first
    pub fn select_tool(&mut self, tool: ToolType) {
        self.pointer_up();
        log::debug!("Tool activated: {}", tool.name());
        self.tool = tool;
    }

    /// Sets the drawing colour and records it in the recent colours
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.palette.record(color);
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.max(1);
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> CanvasResult<()> {
        self.stack.set_active(id)
    }

    /// Starts a stroke at `pos` on the active layer
    pub fn pointer_down(&mut self, pos: PixelPos) -> CanvasResult<()> {
        if self.is_drawing() {
            self.pointer_up();
        }
        let before = self.stack.clone();
        let result = self.apply(&[pos]);
        self.stroke = StrokeState::Drawing { before, last: pos };
        result
    }

    /// Extends the current stroke to `pos`. Ignored when no stroke is in
    /// progress or the tool acts once per click.
    pub fn pointer_move(&mut self, pos: PixelPos) -> CanvasResult<()> {
        let StrokeState::Drawing { last, .. } = &mut self.stroke else {
            return Ok(());
        };
        if !self.tool.follows_path() || *last == pos {
            return Ok(());
        }
        let segment = [*last, pos];
        *last = pos;
        self.apply(&segment)
    }

    /// Ends the current stroke, recording one undo step if anything changed
    pub fn pointer_up(&mut self) {
        if let StrokeState::Drawing { before, .. } = std::mem::take(&mut self.stroke) {
            if before != self.stack {
                self.history.commit(before);
            }
        }
    }

    /// Abandons the stroke in progress, restoring the canvas as it was at
    /// pointer-down. Nothing is recorded in the history.
    pub fn cancel_stroke(&mut self) -> bool {
        let StrokeState::Drawing { before, .. } = std::mem::take(&mut self.stroke) else {
            return false;
        };
        if before != self.stack {
            self.stack = before;
            self.touch();
        }
        log::debug!("Stroke cancelled");
        true
    }

    fn apply(&mut self, points: &[PixelPos]) -> CanvasResult<()> {
        let buffer = self.stack.active_layer_mut().buffer_mut();
        self.tool.apply_stroke(buffer, points, self.color, self.brush_size)?;
        self.touch();
        Ok(())
    }

    /// Name the next added layer gets
    pub fn next_layer_name(&self) -> String {
        format!("Layer {}", self.layers_created + 1)
    }

    /// Adds an empty layer above the active one with a generated name
    pub fn add_layer(&mut self) -> CanvasResult<()> {
        let name = self.next_layer_name();
        self.execute(Command::AddLayer { name })?;
        self.layers_created += 1;
        Ok(())
    }

    /// Runs a structural command as one undo step. On error the canvas is
    /// left unchanged.
    pub fn execute(&mut self, command: Command) -> CanvasResult<()> {
        self.pointer_up();
        let before = self.stack.clone();
        if let Err(err) = command.execute(&mut self.stack) {
            log::warn!("{} failed: {}", command.name(), err);
            self.stack = before;
            return Err(err);
        }
        if before != self.stack {
            log::debug!("Executed {}", command.name());
            self.history.commit(before);
            self.touch();
        }
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.pointer_up();
        let undone = self.history.undo(&mut self.stack);
        if undone {
            self.touch();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.pointer_up();
        let redone = self.history.redo(&mut self.stack);
        if redone {
            self.touch();
        }
        redone
    }

    /// Swaps in a freshly loaded canvas and forgets the old history
    pub fn replace_stack(&mut self, stack: LayerStack) {
        self.stroke = StrokeState::Idle;
        self.layers_created = stack.len();
        self.stack = stack;
        self.history.clear();
        self.touch();
    }

    /// Loads a file, leaving the current canvas untouched on failure
    pub fn open(&mut self, path: &Path) -> CanvasResult<()> {
        let stack = file_io::open_path(path)?;
        self.replace_stack(stack);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> CanvasResult<()> {
        file_io::save_path(&self.stack, path)
    }

    /// Starts over with a blank canvas of the configured size
    pub fn new_canvas(&mut self) -> CanvasResult<()> {
        let stack = LayerStack::blank(
            self.config.canvas_width,
            self.config.canvas_height,
            self.config.initial_layers,
        )?;
        self.replace_stack(stack);
        Ok(())
    }
}
