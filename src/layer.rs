use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::color::Color;
use crate::error::{CanvasError, CanvasResult};
use crate::pixel_buffer::{self, PixelBuffer, ResizePolicy};

/// A unique identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Whether the layer is drawn when compositing
    pub visible: bool,
    opacity: f32,
    buffer: PixelBuffer,
}

impl Layer {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self::with_buffer(name, PixelBuffer::new(width, height))
    }

    pub fn with_buffer(name: &str, buffer: PixelBuffer) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            opacity: 1.0,
            buffer,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the opacity, clamped to `[0.0, 1.0]`. NaN is treated as opaque.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub(crate) fn replace_buffer(&mut self, buffer: PixelBuffer) {
        self.buffer = buffer;
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.visible == other.visible
            && self.opacity == other.opacity
            && self.buffer == other.buffer
        // ids are runtime identity only and are not persisted
    }
}

/// Ordered layers of one canvas. Index 0 is the bottom layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: usize,
}

impl LayerStack {
    /// Creates a canvas with a single transparent layer
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        Self::blank(width, height, 1)
    }

    /// Creates a canvas with `layer_count` transparent layers named
    /// `Layer 1..N`, bottom layer active
    pub fn blank(width: u32, height: u32, layer_count: usize) -> CanvasResult<Self> {
        pixel_buffer::check_dimensions(width, height)?;
        let layers = (1..=layer_count.max(1))
            .map(|i| Layer::new(&format!("Layer {i}"), width, height))
            .collect();
        Ok(Self {
            width,
            height,
            layers,
            active: 0,
        })
    }

    /// Builds a stack from existing layers; every buffer must match the
    /// canvas size and at least one layer is required
    pub fn from_layers(width: u32, height: u32, layers: Vec<Layer>, active: usize) -> CanvasResult<Self> {
        pixel_buffer::check_dimensions(width, height)?;
        if layers.is_empty() {
            return Err(CanvasError::corrupt("a canvas needs at least one layer"));
        }
        if let Some(layer) = layers.iter().find(|l| l.buffer.size() != (width, height)) {
            return Err(CanvasError::corrupt(format!(
                "layer {:?} is {}x{}, canvas is {width}x{height}",
                layer.name,
                layer.buffer.width(),
                layer.buffer.height()
            )));
        }
        if active >= layers.len() {
            return Err(CanvasError::corrupt(format!("active layer {active} does not exist")));
        }
        Ok(Self {
            width,
            height,
            layers,
            active,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Layers from bottom to top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn index_of(&self, id: LayerId) -> CanvasResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(CanvasError::UnknownLayer(id))
    }

    pub fn layer(&self, id: LayerId) -> CanvasResult<&Layer> {
        let index = self.index_of(id)?;
        Ok(&self.layers[index])
    }

    pub fn layer_mut(&mut self, id: LayerId) -> CanvasResult<&mut Layer> {
        let index = self.index_of(id)?;
        Ok(&mut self.layers[index])
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active]
    }

    pub fn set_active(&mut self, id: LayerId) -> CanvasResult<()> {
        self.active = self.index_of(id)?;
        Ok(())
    }

    /// Inserts a new transparent layer directly above the active layer and
    /// makes it active
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let layer = Layer::new(name, self.width, self.height);
        let id = layer.id;
        let index = self.active + 1;
        self.layers.insert(index, layer);
        self.active = index;
        log::info!("Added layer {:?} at index {}", name, index);
        id
    }

    /// Removes a layer. The active layer stays the same unless it was the one
    /// removed, in which case the active index stays put, clamped to range.
    pub fn remove_layer(&mut self, id: LayerId) -> CanvasResult<Layer> {
        let index = self.index_of(id)?;
        if self.layers.len() == 1 {
            return Err(CanvasError::LastLayer);
        }
        let removed = self.layers.remove(index);
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.layers.len() {
            self.active = self.layers.len() - 1;
        }
        log::info!("Removed layer {:?}", removed.name);
        Ok(removed)
    }

    /// Moves a layer to `new_index` (clamped), keeping the same layer active
    pub fn reorder(&mut self, id: LayerId, new_index: usize) -> CanvasResult<()> {
        let from = self.index_of(id)?;
        let to = new_index.min(self.layers.len() - 1);
        if from == to {
            return Ok(());
        }
        let active_id = self.layers[self.active].id;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        self.active = self.index_of(active_id)?;
        Ok(())
    }

    /// Moves a layer one step towards the top
    pub fn move_up(&mut self, id: LayerId) -> CanvasResult<()> {
        let index = self.index_of(id)?;
        self.reorder(id, index + 1)
    }

    /// Moves a layer one step towards the bottom
    pub fn move_down(&mut self, id: LayerId) -> CanvasResult<()> {
        let index = self.index_of(id)?;
        self.reorder(id, index.saturating_sub(1))
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> CanvasResult<()> {
        self.layer_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> CanvasResult<()> {
        self.layer_mut(id)?.set_opacity(opacity);
        Ok(())
    }

    pub fn rename(&mut self, id: LayerId, name: &str) -> CanvasResult<()> {
        self.layer_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Blends all visible layers bottom to top into one buffer
    pub fn composite(&self) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width, self.height);
        for layer in self.layers.iter().filter(|l| l.visible) {
            for y in 0..self.height {
                for x in 0..self.width {
                    let dst = out.pixel(x, y);
                    let src = layer.buffer.pixel(x, y);
                    out.put(x, y, blend_over(dst, src, layer.opacity));
                }
            }
        }
        out
    }

    /// Resizes every layer; nothing changes if any layer fails
    pub fn resize(&mut self, width: u32, height: u32, policy: ResizePolicy) -> CanvasResult<()> {
        let buffers = self
            .layers
            .iter()
            .map(|l| l.buffer.resize(width, height, policy))
            .collect::<CanvasResult<Vec<_>>>()?;
        self.swap_buffers(buffers);
        Ok(())
    }

    /// Doubles the canvas resolution. Fails without changes when the result
    /// would exceed the size limit.
    pub fn upscale(&mut self) -> CanvasResult<()> {
        pixel_buffer::check_dimensions(
            self.width.saturating_mul(2),
            self.height.saturating_mul(2),
        )?;
        let buffers = self.layers.iter().map(|l| l.buffer.upscale()).collect();
        self.swap_buffers(buffers);
        Ok(())
    }

    /// Halves the canvas resolution, averaging 2x2 blocks
    pub fn downscale(&mut self) {
        let buffers = self.layers.iter().map(|l| l.buffer.downscale()).collect();
        self.swap_buffers(buffers);
    }

    fn swap_buffers(&mut self, buffers: Vec<PixelBuffer>) {
        if let Some(first) = buffers.first() {
            (self.width, self.height) = first.size();
        }
        for (layer, buffer) in self.layers.iter_mut().zip(buffers) {
            layer.replace_buffer(buffer);
        }
    }
}

/// Straight-alpha "over": `src` scaled by `opacity` drawn on top of `dst`
fn blend_over(dst: Color, src: Color, opacity: f32) -> Color {
    let sa = src.a as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    if dst.a == 0 {
        return Color::rgba(src.r, src.g, src.b, (src.a as f32 * opacity).round() as u8);
    }
    let da = dst.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Color::rgba(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
