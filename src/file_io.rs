//! PNG export, raster import and the `.canvas` multi-layer project format.
//!
//! A `.canvas` file is little-endian throughout:
//!
//! ```text
//! magic "PXCANVAS" | version u16 | width u32 | height u32 | layer count u32 | active index u32
//! per layer, bottom to top:
//!   name length u32 | name (utf-8) | visible u8 | opacity f32 | width*height*4 RGBA bytes
//! ```

use image::ImageFormat;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::color::Color;
use crate::error::{CanvasError, CanvasResult};
use crate::layer::{Layer, LayerStack};
use crate::pixel_buffer::{PixelBuffer, ResizePolicy};

pub const PROJECT_MAGIC: &[u8; 8] = b"PXCANVAS";
pub const PROJECT_VERSION: u16 = 1;
pub const PROJECT_EXTENSION: &str = "canvas";
pub use crate::pixel_buffer::MAX_DIMENSION;

/// Name given to the single layer of an imported raster image
pub const IMPORTED_LAYER_NAME: &str = "Background";

/// Imported images that are not a square power of two are resampled to this
/// many pixels per side
pub const IMPORT_CANVAS_SIZE: u32 = 64;

/// File types recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Flattened PNG; the only raster format we write
    Png,
    /// Other raster formats, import only
    Raster,
    Project,
}

impl FileKind {
    pub fn from_path(path: &Path) -> CanvasResult<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" | "gif" | "bmp" | "webp" => Ok(Self::Raster),
            PROJECT_EXTENSION => Ok(Self::Project),
            _ => Err(CanvasError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Composites the stack and encodes it as an RGBA PNG
pub fn export_png(stack: &LayerStack) -> CanvasResult<Vec<u8>> {
    let flat = stack.composite();
    let mut bytes = Vec::new();
    flat.as_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| CanvasError::Io(std::io::Error::other(err)))?;
    Ok(bytes)
}

/// Decodes a raster image into a single-layer canvas. Square power-of-two
/// images keep their size; anything else is resampled (nearest neighbour) to
/// `IMPORT_CANVAS_SIZE` square. Fully transparent pixels become
/// `Color::TRANSPARENT`.
pub fn load_image(bytes: &[u8]) -> CanvasResult<LayerStack> {
    let mut image = image::load_from_memory(bytes)
        .map_err(|err| CanvasError::corrupt(format!("cannot decode image: {err}")))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!("Decoded image: {}x{}", width, height);

    for px in image.pixels_mut().filter(|px| px[3] == 0) {
        *px = Color::TRANSPARENT.into();
    }

    let mut buffer = PixelBuffer::from_image(image);
    if width != height || !width.is_power_of_two() {
        log::info!(
            "Resampling {}x{} image to {}x{}",
            width,
            height,
            IMPORT_CANVAS_SIZE,
            IMPORT_CANVAS_SIZE
        );
        buffer = buffer.resize(IMPORT_CANVAS_SIZE, IMPORT_CANVAS_SIZE, ResizePolicy::NearestNeighbor)?;
    }
    let (width, height) = buffer.size();
    let layer = Layer::with_buffer(IMPORTED_LAYER_NAME, buffer);
    LayerStack::from_layers(width, height, vec![layer], 0)
}

/// Serialises every layer with its name, visibility, opacity and order
pub fn save_project(stack: &LayerStack) -> Vec<u8> {
    let (width, height) = stack.size();
    let layer_bytes = width as usize * height as usize * 4;
    let mut out = Vec::with_capacity(30 + stack.len() * (layer_bytes + 32));

    out.extend_from_slice(PROJECT_MAGIC);
    out.extend_from_slice(&PROJECT_VERSION.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&(stack.len() as u32).to_le_bytes());
    out.extend_from_slice(&(stack.active_index() as u32).to_le_bytes());

    for layer in stack.layers() {
        let name = layer.name.as_bytes();
        out.extend_from_slice(&(name.len() as u32).to_le_bytes());
        out.extend_from_slice(name);
        out.push(layer.visible as u8);
        out.extend_from_slice(&layer.opacity().to_le_bytes());
        out.extend_from_slice(layer.buffer().as_raw());
    }
    out
}

/// Parses a `.canvas` project. Nothing is returned unless the whole file is
/// well formed.
pub fn load_project(bytes: &[u8]) -> CanvasResult<LayerStack> {
    let mut reader = Reader::new(bytes);

    if reader.take(PROJECT_MAGIC.len(), "magic")? != PROJECT_MAGIC {
        return Err(CanvasError::corrupt("not a .canvas project (bad magic)"));
    }
    let version = reader.u16("version")?;
    if version != PROJECT_VERSION {
        return Err(CanvasError::corrupt(format!("unsupported project version {version}")));
    }
    let width = reader.u32("width")?;
    let height = reader.u32("height")?;
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CanvasError::corrupt(format!("invalid canvas size {width}x{height}")));
    }
    let layer_count = reader.u32("layer count")? as usize;
    if layer_count == 0 {
        return Err(CanvasError::corrupt("project has no layers"));
    }
    let active = reader.u32("active layer")? as usize;
    let pixel_len = width as usize * height as usize * 4;

    let mut layers = Vec::with_capacity(layer_count.min(256));
    for index in 0..layer_count {
        let name_len = reader.u32("layer name length")? as usize;
        let name = std::str::from_utf8(reader.take(name_len, "layer name")?)
            .map_err(|_| CanvasError::corrupt(format!("layer {index} name is not valid utf-8")))?;
        let visible = match reader.u8("visibility")? {
            0 => false,
            1 => true,
            other => {
                return Err(CanvasError::corrupt(format!(
                    "layer {index} has invalid visibility byte {other}"
                )));
            }
        };
        let opacity = reader.f32("opacity")?;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(CanvasError::corrupt(format!("layer {index} has opacity {opacity}")));
        }
        let pixels = reader.take(pixel_len, "pixel data")?.to_vec();

        let mut layer = Layer::with_buffer(name, PixelBuffer::from_rgba(width, height, pixels)?);
        layer.visible = visible;
        layer.set_opacity(opacity);
        layers.push(layer);
    }

    if !reader.is_empty() {
        return Err(CanvasError::corrupt(format!(
            "{} unexpected trailing bytes",
            reader.remaining()
        )));
    }
    LayerStack::from_layers(width, height, layers, active)
}

/// Decodes file contents already in memory
pub fn load_bytes(kind: FileKind, bytes: &[u8]) -> CanvasResult<LayerStack> {
    match kind {
        FileKind::Project => load_project(bytes),
        FileKind::Png | FileKind::Raster => load_image(bytes),
    }
}

/// Reads a file and decodes it according to its extension
pub fn open_path(path: &Path) -> CanvasResult<LayerStack> {
    let kind = FileKind::from_path(path)?;
    let bytes = fs::read(path)?;
    log::info!("Opening {} ({} bytes)", path.display(), bytes.len());
    load_bytes(kind, &bytes)
}

/// Encodes the stack according to the extension of `path` and writes it.
/// The file is only touched once encoding has succeeded.
pub fn save_path(stack: &LayerStack, path: &Path) -> CanvasResult<()> {
    let bytes = match FileKind::from_path(path)? {
        FileKind::Project => save_project(stack),
        FileKind::Png => export_png(stack)?,
        FileKind::Raster => {
            return Err(CanvasError::UnsupportedFormat(format!(
                "{} (only .png and .{PROJECT_EXTENSION} can be saved)",
                path.display()
            )));
        }
    };
    fs::write(path, &bytes)?;
    log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Bounds-checked little-endian cursor over project bytes
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> CanvasResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| CanvasError::corrupt(format!("truncated file while reading {what}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> CanvasResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> CanvasResult<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u16(&mut self, what: &str) -> CanvasResult<u16> {
        Ok(u16::from_le_bytes(self.array(what)?))
    }

    fn u32(&mut self, what: &str) -> CanvasResult<u32> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    fn f32(&mut self, what: &str) -> CanvasResult<f32> {
        Ok(f32::from_le_bytes(self.array(what)?))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.PNG")).unwrap(), FileKind::Png);
        assert_eq!(FileKind::from_path(Path::new("a.canvas")).unwrap(), FileKind::Project);
        assert_eq!(FileKind::from_path(Path::new("a.jpeg")).unwrap(), FileKind::Raster);
        assert!(matches!(
            FileKind::from_path(Path::new("a.txt")),
            Err(CanvasError::UnsupportedFormat(_))
        ));
        assert!(FileKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_header_layout() {
        let stack = LayerStack::new(2, 3).unwrap();
        let bytes = save_project(&stack);
        assert_eq!(&bytes[..8], PROJECT_MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), PROJECT_VERSION);
        assert_eq!(u32::from_le_bytes(bytes[10..14].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(bytes[14..18].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(bytes[18..22].try_into().unwrap()), 1);
        // header, name length + "Layer 1", visibility, opacity, pixels
        assert_eq!(bytes.len(), 26 + 4 + 7 + 1 + 4 + 2 * 3 * 4);
    }
}
