use crate::PaintApp;
use crate::app::PendingEdit;
use crate::command::Command;
use crate::layer::LayerId;

struct LayerRow {
    id: LayerId,
    name: String,
    visible: bool,
    opacity: f32,
    active: bool,
}

pub fn layers_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Layers");

            if ui.button("Add Layer").clicked() {
                app.finish_pending_edit();
                let result = app.state_mut().add_layer();
                app.report("Add layer", result);
            }
            ui.separator();

            let stack = app.state().stack();
            let can_remove = stack.len() > 1;
            let top = stack.len() - 1;
            // topmost layer first, the way it appears on screen
            let rows: Vec<LayerRow> = stack
                .layers()
                .iter()
                .enumerate()
                .rev()
                .map(|(index, layer)| LayerRow {
                    id: layer.id,
                    name: layer.name.clone(),
                    visible: layer.visible,
                    opacity: layer.opacity(),
                    active: index == stack.active_index(),
                })
                .collect();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for (position, row) in rows.iter().enumerate() {
                    let index = top - position;
                    layer_row(app, ui, row, index, top, can_remove);
                    if row.active {
                        active_layer_details(app, ui, row);
                    }
                }
            });
        });
}

fn layer_row(app: &mut PaintApp, ui: &mut egui::Ui, row: &LayerRow, index: usize, top: usize, can_remove: bool) {
    ui.horizontal(|ui| {
        let mut visible = row.visible;
        if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
            app.execute(Command::SetVisible { layer_id: row.id, visible });
        }

        if ui.selectable_label(row.active, row.name.as_str()).clicked() && !row.active {
            app.finish_pending_edit();
            let result = app.state_mut().set_active_layer(row.id);
            app.report("Select layer", result);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(can_remove, egui::Button::new("🗑"))
                .on_hover_text("Delete layer")
                .clicked()
            {
                app.finish_pending_edit();
                app.execute(Command::RemoveLayer { layer_id: row.id });
            }
            if ui.add_enabled(index > 0, egui::Button::new("⏷")).clicked() {
                app.execute(Command::MoveLayerDown { layer_id: row.id });
            }
            if ui.add_enabled(index < top, egui::Button::new("⏶")).clicked() {
                app.execute(Command::MoveLayerUp { layer_id: row.id });
            }
        });
    });
}

/// Name and opacity editors for the active layer. Edits are held in the
/// app until the field loses focus or the slider is released.
fn active_layer_details(app: &mut PaintApp, ui: &mut egui::Ui, row: &LayerRow) {
    let (mut name, mut opacity) = match &app.pending_edit {
        Some(PendingEdit::Rename { layer_id, name }) if *layer_id == row.id => (name.clone(), row.opacity),
        Some(PendingEdit::Opacity { layer_id, opacity }) if *layer_id == row.id => (row.name.clone(), *opacity),
        _ => (row.name.clone(), row.opacity),
    };

    ui.indent(row.id, |ui| {
        ui.horizontal(|ui| {
            ui.label("Name:");
            let response = ui.text_edit_singleline(&mut name);
            if response.changed() {
                app.pending_edit = Some(PendingEdit::Rename {
                    layer_id: row.id,
                    name: name.clone(),
                });
            }
            if response.lost_focus() {
                app.finish_pending_edit();
            }
        });

        let response = ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"));
        if response.changed() {
            app.pending_edit = Some(PendingEdit::Opacity {
                layer_id: row.id,
                opacity,
            });
        }
        // a click or keyboard change finishes immediately, a drag on release
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            app.finish_pending_edit();
        }
    });
}
