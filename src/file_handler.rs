use eframe::egui;
use std::path::Path;

use crate::error::{CanvasError, CanvasResult};
use crate::file_io::{self, FileKind};
use crate::layer::LayerStack;

/// Collects files dropped onto the window and decodes them into canvases
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up any newly dropped files from the UI context
    /// Returns true if there is something to process
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Decodes the pending dropped files, paired with a display name each
    pub fn process_dropped_files(&mut self) -> Vec<(String, CanvasResult<LayerStack>)> {
        self.dropped_files
            .drain(..)
            .map(|file| {
                let name = display_name(&file);
                let result = load_dropped(&file);
                if let Err(err) = &result {
                    log::warn!("Could not open dropped file {}: {}", name, err);
                }
                (name, result)
            })
            .collect()
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Native drops carry a path; web-style drops carry the bytes and a name
fn load_dropped(file: &egui::DroppedFile) -> CanvasResult<LayerStack> {
    if let Some(bytes) = &file.bytes {
        let kind = FileKind::from_path(Path::new(&file.name))?;
        log::info!("Processing dropped file from memory: {} ({} bytes)", file.name, bytes.len());
        file_io::load_bytes(kind, bytes)
    } else if let Some(path) = &file.path {
        file_io::open_path(path)
    } else {
        Err(CanvasError::UnsupportedFormat(format!(
            "{} has no accessible data",
            display_name(file)
        )))
    }
}
