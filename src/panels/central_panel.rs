use crate::PaintApp;
use crate::renderer::Renderer;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_rect_before_wrap();
        let canvas_size = app.state().stack().size();
        let canvas_rect = Renderer::canvas_rect(available, canvas_size, app.state().config().view_size);

        // Claim the whole area so drags on the canvas don't move the window
        let (_response, painter) = ui.allocate_painter(available.size(), egui::Sense::drag());

        app.input_handler_mut().set_canvas(canvas_rect, canvas_size);
        let events = app.input_handler_mut().process_input(ctx);
        app.handle_input(events);

        // undo may have changed the canvas size
        let canvas_rect = Renderer::canvas_rect(available, app.state().stack().size(), app.state().config().view_size);
        let revision = app.state().revision();
        let (renderer, state) = app.renderer_and_state();
        renderer.render(ctx, &painter, canvas_rect, state.stack(), revision);
    });
}
