use crate::PaintApp;
use crate::color::Color;
use crate::command::Command;
use crate::renderer::Renderer;
use crate::tools::{TOOL_NAMES, Tool, new_tool};

const SWATCH_SIZE: f32 = 18.0;
const MAX_BRUSH_SIZE: u32 = 16;

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active_tool_name = app.state().tool().name();
            for &tool_name in TOOL_NAMES.iter() {
                if ui.selectable_label(active_tool_name == tool_name, tool_name).clicked() {
                    if let Some(tool) = new_tool(tool_name) {
                        log::info!("Tool selected from UI: {}", tool_name);
                        app.state_mut().select_tool(tool);
                    }
                }
            }
            ui.separator();

            color_section(app, ui);

            let mut size = app.state().brush_size();
            if ui
                .add(egui::Slider::new(&mut size, 1..=MAX_BRUSH_SIZE).text("Size"))
                .changed()
            {
                app.state_mut().set_brush_size(size);
            }
            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let can_undo = app.state().history().can_undo();
                let can_redo = app.state().history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
            });
            let history = app.state().history();
            ui.label(format!(
                "Undo: {}  Redo: {}  (max {})",
                history.undo_len(),
                history.redo_len(),
                history.max_depth()
            ));
            ui.separator();

            canvas_section(app, ui);
            ui.separator();

            ui.label("Preview:");
            let size = Renderer::preview_size(app.state().stack().size());
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            app.renderer().render_preview(ui.painter(), rect);
        });
}

fn color_section(app: &mut PaintApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label("Colour:");
        ui.color_edit_button_srgba_unmultiplied(&mut app.picker_color);
        ui.monospace(Color::from_array(app.picker_color).to_hex());
    });

    // the picker reports every intermediate colour while open
    let picked = Color::from_array(app.picker_color);
    if picked != app.state().color() && !ui.memory(|m| m.any_popup_open()) {
        app.set_color(picked);
    }

    let recent: Vec<Color> = app.state().palette().colors().collect();
    if recent.is_empty() {
        return;
    }
    ui.label("Recent:");
    ui.horizontal_wrapped(|ui| {
        for color in recent {
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::click());
            ui.painter().rect_filled(rect, 2.0, color.to_color32());
            ui.painter()
                .rect_stroke(rect, 2.0, egui::Stroke::new(1.0, egui::Color32::GRAY));
            if response.on_hover_text(color.to_hex()).clicked() {
                app.set_color(color);
            }
        }
    });
}

fn canvas_section(app: &mut PaintApp, ui: &mut egui::Ui) {
    let (width, height) = app.state().stack().size();
    let max_dimension = app.state().config().max_canvas_dimension;
    ui.label(format!("Canvas: {width} x {height}"));

    ui.horizontal(|ui| {
        let can_refine = width.max(height).saturating_mul(2) <= max_dimension;
        if ui
            .add_enabled(can_refine, egui::Button::new("Refine"))
            .on_hover_text("Double the resolution")
            .clicked()
        {
            app.execute(Command::Refine { max_dimension });
        }
        if ui
            .add_enabled(width > 1 || height > 1, egui::Button::new("Coarsen"))
            .on_hover_text("Halve the resolution")
            .clicked()
        {
            app.execute(Command::Coarsen);
        }
    });

    if ui.button("Clear Layer").clicked() {
        app.execute(Command::ClearLayer);
    }

    let mut show_grid = app.renderer().show_grid();
    if ui.checkbox(&mut show_grid, "Grid").changed() {
        app.renderer_mut().set_show_grid(show_grid);
    }
}
