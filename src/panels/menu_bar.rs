use std::path::PathBuf;

use crate::PaintApp;
use crate::file_io::PROJECT_EXTENSION;

pub fn menu_bar(app: &mut PaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                app.new_canvas();
            }
            ui.separator();

            ui.label("File:");
            ui.add(
                egui::TextEdit::singleline(&mut app.path_input)
                    .hint_text(format!("drawing.{PROJECT_EXTENSION} or image.png"))
                    .desired_width(280.0),
            );

            let path = PathBuf::from(app.path_input.trim());
            let has_path = !app.path_input.trim().is_empty();
            if ui.add_enabled(has_path, egui::Button::new("Open")).clicked() {
                app.open_path(&path);
            }
            if ui
                .add_enabled(has_path, egui::Button::new("Save"))
                .on_hover_text("Saves a project or flattened PNG, by extension")
                .clicked()
            {
                app.save_path(&path);
            }
            if ui
                .add_enabled(has_path, egui::Button::new("Export PNG"))
                .clicked()
            {
                app.save_path(&path.with_extension("png"));
            }
        });
    });
}
