use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::command::Command;
use crate::config::EditorConfig;
use crate::error::{CanvasError, CanvasResult};
use crate::file_handler::FileHandler;
use crate::input::{InputEvent, InputHandler};
use crate::layer::LayerId;
use crate::panels::{central_panel, layers_panel, menu_bar, tools_panel};
use crate::renderer::Renderer;
use crate::state::EditorState;

/// A layer field being edited in the layers panel. Applied as a single
/// command once editing finishes so a drag or typing session is one undo step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingEdit {
    Rename { layer_id: LayerId, name: String },
    Opacity { layer_id: LayerId, opacity: f32 },
}

pub struct PaintApp {
    state: EditorState,
    renderer: Renderer,
    input_handler: InputHandler,
    file_handler: FileHandler,
    /// Contents of the path field in the menu bar
    pub(crate) path_input: String,
    /// Colour shown in the picker; applied once the picker closes
    pub(crate) picker_color: [u8; 4],
    pub(crate) pending_edit: Option<PendingEdit>,
    // Message shown in the error modal
    error_message: Option<String>,
}

impl PaintApp {
    /// Called once before the first frame. Settings come from eframe storage,
    /// then from the file named by `PIXEL_CANVAS_CONFIG`.
    pub fn new(cc: &eframe::CreationContext<'_>, initial_path: Option<PathBuf>) -> CanvasResult<Self> {
        let config: EditorConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut app = Self::with_state(EditorState::new(config.with_env_override())?);

        if let Some(path) = initial_path {
            app.path_input = path.display().to_string();
            app.open_path(&path);
        }
        Ok(app)
    }

    pub fn with_state(state: EditorState) -> Self {
        let picker_color = state.color().to_array();
        Self {
            state,
            renderer: Renderer::new(),
            input_handler: InputHandler::default(),
            file_handler: FileHandler::new(),
            path_input: String::new(),
            picker_color,
            pending_edit: None,
            error_message: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub(crate) fn renderer_and_state(&mut self) -> (&mut Renderer, &EditorState) {
        (&mut self.renderer, &self.state)
    }

    pub fn input_handler_mut(&mut self) -> &mut InputHandler {
        &mut self.input_handler
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Logs a failed operation and shows it in the error modal.
    /// Cancellation is not an error worth interrupting the user for.
    pub fn report(&mut self, action: &str, result: CanvasResult<()>) {
        match result {
            Ok(()) => {}
            Err(CanvasError::Cancelled) => log::info!("{} cancelled", action),
            Err(err) => {
                log::error!("{} failed: {}", action, err);
                self.error_message = Some(format!("{action} failed: {err}"));
            }
        }
    }

    pub fn execute(&mut self, command: Command) {
        let name = command.name();
        let result = self.state.execute(command);
        self.report(name, result);
    }

    pub fn set_color(&mut self, color: Color) {
        self.picker_color = color.to_array();
        self.state.set_color(color);
    }

    pub fn undo(&mut self) {
        self.finish_pending_edit();
        self.state.undo();
    }

    pub fn redo(&mut self) {
        self.finish_pending_edit();
        self.state.redo();
    }

    pub fn open_path(&mut self, path: &Path) {
        let result = self.state.open(path);
        if result.is_ok() {
            self.pending_edit = None;
        }
        self.report("Open", result);
    }

    pub fn save_path(&mut self, path: &Path) {
        let result = self.state.save(path);
        self.report("Save", result);
    }

    pub fn new_canvas(&mut self) {
        self.pending_edit = None;
        let result = self.state.new_canvas();
        self.report("New canvas", result);
    }

    /// Applies a rename or opacity change that was being edited
    pub(crate) fn finish_pending_edit(&mut self) {
        match self.pending_edit.take() {
            Some(PendingEdit::Rename { layer_id, name }) => {
                self.execute(Command::RenameLayer { layer_id, name });
            }
            Some(PendingEdit::Opacity { layer_id, opacity }) => {
                self.execute(Command::SetOpacity { layer_id, opacity });
            }
            None => {}
        }
    }

    /// Feeds canvas input into the editor
    pub fn handle_input(&mut self, events: Vec<InputEvent>) {
        for event in events {
            match event {
                InputEvent::PointerDown { location } => {
                    self.finish_pending_edit();
                    let result = self.state.pointer_down(location.pixel);
                    self.report("Stroke", result);
                }
                InputEvent::PointerMove { location } => {
                    let result = self.state.pointer_move(location.pixel);
                    self.report("Stroke", result);
                }
                InputEvent::PointerUp { .. } => self.state.pointer_up(),
                InputEvent::Undo => self.undo(),
                InputEvent::Redo => self.redo(),
                InputEvent::Cancel => {
                    self.input_handler.cancel_press();
                    self.state.cancel_stroke();
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        // only the last successfully decoded file is kept
        for (name, result) in self.file_handler.process_dropped_files() {
            match result {
                Ok(stack) => {
                    log::info!("Opened dropped file {}", name);
                    self.pending_edit = None;
                    self.state.replace_stack(stack);
                    self.path_input = name;
                }
                Err(err) => self.report(&format!("Opening {name}"), Err(err)),
            }
        }
    }

    fn error_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else {
            return;
        };
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("Close").clicked() {
                    self.error_message = None;
                }
            });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.state.config());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        menu_bar(self, ctx);
        tools_panel(self, ctx);
        layers_panel(self, ctx);
        central_panel(self, ctx);

        self.error_modal(ctx);
    }
}
