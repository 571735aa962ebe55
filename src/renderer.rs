use eframe::egui::{self, Color32, ColorImage, Rect, Stroke, TextureHandle, TextureOptions};

use crate::layer::LayerStack;

const CHECKER_LIGHT: Color32 = Color32::from_gray(204);
const CHECKER_DARK: Color32 = Color32::from_gray(153);
const GRID_COLOR: Color32 = Color32::from_black_alpha(40);
/// Grid lines are drawn once a canvas pixel is at least this many points wide
const GRID_MIN_CELL: f32 = 8.0;
/// Long side of the preview is never larger than this many points
pub const PREVIEW_MAX_SIZE: f32 = 128.0;

/// Draws the composited canvas. The composite is uploaded as a texture and
/// re-uploaded only when the editor revision changes.
#[derive(Default)]
pub struct Renderer {
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
    show_grid: bool,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("has_texture", &self.texture.is_some())
            .field("uploaded_revision", &self.uploaded_revision)
            .field("show_grid", &self.show_grid)
            .finish()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            show_grid: true,
            ..Default::default()
        }
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    /// Largest rect with the canvas aspect ratio that fits `available`,
    /// capped at `view_size` points on the long side and centred.
    pub fn canvas_rect(available: Rect, canvas_size: (u32, u32), view_size: f32) -> Rect {
        let (w, h) = (canvas_size.0.max(1) as f32, canvas_size.1.max(1) as f32);
        let scale = (available.width() / w)
            .min(available.height() / h)
            .min(view_size / w.max(h))
            .max(0.0);
        Rect::from_center_size(available.center(), egui::vec2(w * scale, h * scale))
    }

    /// Size of the preview: one point per canvas pixel, shrunk to fit
    /// `PREVIEW_MAX_SIZE` for large canvases
    pub fn preview_size(canvas_size: (u32, u32)) -> egui::Vec2 {
        let (w, h) = (canvas_size.0.max(1) as f32, canvas_size.1.max(1) as f32);
        let scale = (PREVIEW_MAX_SIZE / w.max(h)).min(1.0);
        egui::vec2(w * scale, h * scale)
    }

    /// Draws the cached composite at preview size. Nothing is drawn until the
    /// canvas has been rendered once.
    pub fn render_preview(&self, painter: &egui::Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, CHECKER_LIGHT);
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));
    }

    /// Renders the canvas into `rect`
    pub fn render(
        &mut self,
        ctx: &egui::Context,
        painter: &egui::Painter,
        rect: Rect,
        stack: &LayerStack,
        revision: u64,
    ) {
        if self.uploaded_revision != Some(revision) || self.texture.is_none() {
            self.upload(ctx, stack);
            self.uploaded_revision = Some(revision);
        }

        let (w, h) = stack.size();
        let cell = egui::vec2(rect.width() / w as f32, rect.height() / h as f32);

        // transparency checkerboard, one square per canvas pixel
        for y in 0..h {
            for x in 0..w {
                let min = rect.min + egui::vec2(x as f32 * cell.x, y as f32 * cell.y);
                let color = if (x + y) % 2 == 0 { CHECKER_LIGHT } else { CHECKER_DARK };
                painter.rect_filled(Rect::from_min_size(min, cell), 0.0, color);
            }
        }

        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }

        if self.show_grid && cell.x >= GRID_MIN_CELL && cell.y >= GRID_MIN_CELL {
            let stroke = Stroke::new(1.0, GRID_COLOR);
            for x in 1..w {
                let px = rect.min.x + x as f32 * cell.x;
                painter.line_segment([egui::pos2(px, rect.min.y), egui::pos2(px, rect.max.y)], stroke);
            }
            for y in 1..h {
                let py = rect.min.y + y as f32 * cell.y;
                painter.line_segment([egui::pos2(rect.min.x, py), egui::pos2(rect.max.x, py)], stroke);
            }
        }

        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));
    }

    fn upload(&mut self, ctx: &egui::Context, stack: &LayerStack) {
        let image = composite_image(stack);
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        log::trace!("Uploaded canvas texture {}x{}", stack.width(), stack.height());
    }
}

/// The flattened canvas as an egui image
pub fn composite_image(stack: &LayerStack) -> ColorImage {
    let flat = stack.composite();
    let (w, h) = flat.size();
    ColorImage::from_rgba_unmultiplied([w as usize, h as usize], flat.as_raw())
}
