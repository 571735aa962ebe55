use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

use crate::tools::PixelPos;

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in screen coordinates
    pub position: Pos2,
    /// The canvas pixel under the pointer; may lie outside the canvas
    pub pixel: PixelPos,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

/// Input events in canvas terms, produced once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button was pressed
    PointerDown { location: InputLocation },
    /// Pointer moved while the primary button is held
    PointerMove { location: InputLocation },
    /// Primary button was released
    PointerUp { location: Option<InputLocation> },
    Undo,
    Redo,
    /// Abandon the stroke in progress
    Cancel,
}

impl InputEvent {
    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        match self {
            InputEvent::PointerDown { location } | InputEvent::PointerMove { location } => {
                location.is_in_canvas
            }
            InputEvent::PointerUp { location } => location.is_some_and(|l| l.is_in_canvas),
            InputEvent::Undo | InputEvent::Redo | InputEvent::Cancel => false,
        }
    }
}

/// Handles converting raw egui input into canvas InputEvents
#[derive(Debug)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    canvas_size: (u32, u32),
    /// Whether the current press started on the canvas
    pressed_on_canvas: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING, (1, 1))
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect, canvas_size: (u32, u32)) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            canvas_size,
            pressed_on_canvas: false,
        }
    }

    /// Update where the canvas is drawn and how many pixels it has
    pub fn set_canvas(&mut self, rect: Rect, canvas_size: (u32, u32)) {
        self.canvas_rect = rect;
        self.canvas_size = canvas_size;
    }

    /// Ignores the rest of the current press, so no further move or release
    /// events are produced for it
    pub fn cancel_press(&mut self) {
        self.pressed_on_canvas = false;
    }

    /// Maps a screen position to the canvas pixel beneath it
    pub fn to_pixel(&self, pos: Pos2) -> PixelPos {
        let (w, h) = self.canvas_size;
        let cell_w = self.canvas_rect.width() / w.max(1) as f32;
        let cell_h = self.canvas_rect.height() / h.max(1) as f32;
        if cell_w <= 0.0 || cell_h <= 0.0 {
            return PixelPos::new(-1, -1);
        }
        let rel = pos - self.canvas_rect.min;
        PixelPos::new((rel.x / cell_w).floor() as i32, (rel.y / cell_h).floor() as i32)
    }

    /// Creates an InputLocation from a position
    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: pos,
            pixel: self.to_pixel(pos),
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let pos = input.pointer.interact_pos().or(input.pointer.hover_pos());

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = pos {
                    let location = self.make_location(pos);
                    self.pressed_on_canvas = location.is_in_canvas;
                    if self.pressed_on_canvas {
                        events.push(InputEvent::PointerDown { location });
                    }
                }
            } else if self.pressed_on_canvas && input.pointer.primary_down() {
                if let Some(pos) = pos.filter(|p| Some(*p) != self.last_pointer_pos) {
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                    });
                }
            }

            if self.pressed_on_canvas && input.pointer.button_released(PointerButton::Primary) {
                events.push(InputEvent::PointerUp {
                    location: pos.map(|p| self.make_location(p)),
                });
                self.pressed_on_canvas = false;
            }

            self.last_pointer_pos = pos;
        });

        if !ctx.wants_keyboard_input() {
            ctx.input_mut(|input| {
                // redo shortcuts first: the undo shortcut also matches with shift held
                if input.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                    || input.consume_key(Modifiers::COMMAND, Key::Y)
                {
                    events.push(InputEvent::Redo);
                } else if input.consume_key(Modifiers::COMMAND, Key::Z) {
                    events.push(InputEvent::Undo);
                }
                if input.consume_key(Modifiers::NONE, Key::Escape) {
                    events.push(InputEvent::Cancel);
                }
            });
        }

        events
    }
}
