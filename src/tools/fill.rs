use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::raster::PixelPos;
use super::Tool;
use crate::color::Color;
use crate::error::{CanvasError, CanvasResult};
use crate::pixel_buffer::PixelBuffer;

/// How many pixels are visited between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Shared flag used to abort a long-running fill. Clones share the flag, so
/// a caller driving a fill outside the UI frame can keep a clone and cancel
/// from elsewhere. The editor itself fills synchronously and never cancels.
/// A cancelled token stays cancelled until `reset`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Flood-fills the contiguous region under the clicked pixel
#[derive(Debug, Clone, Default)]
pub struct FillTool {
    pub cancel: CancelToken,
}

impl FillTool {
    pub const NAME: &'static str = "Fill";
}

impl PartialEq for FillTool {
    fn eq(&self, _other: &Self) -> bool {
        // the cancel token is transient and not part of the tool's identity
        true
    }
}

impl Tool for FillTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn follows_path(&self) -> bool {
        false
    }

    fn apply_stroke(
        &self,
        buffer: &mut PixelBuffer,
        points: &[PixelPos],
        color: Color,
        _size: u32,
    ) -> CanvasResult<()> {
        let Some(&seed) = points.first() else {
            return Ok(());
        };
        flood_fill(buffer, seed, color, Some(&self.cancel))?;
        Ok(())
    }
}

/// 4-connected flood fill of the region of same-coloured pixels containing
/// `seed`. Works on a copy that replaces `buffer` only on completion, so a
/// cancelled fill leaves `buffer` untouched. Returns the number of pixels
/// filled.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed: PixelPos,
    color: Color,
    cancel: Option<&CancelToken>,
) -> CanvasResult<usize> {
    if !buffer.contains(seed.x as i64, seed.y as i64) {
        return Ok(0);
    }
    let (sx, sy) = (seed.x as u32, seed.y as u32);
    let target = buffer.pixel(sx, sy);
    if target == color {
        return Ok(0);
    }

    let (width, height) = buffer.size();
    let mut work = buffer.clone();
    // pixels are recoloured when pushed, so each is pushed at most once and
    // the stack never outgrows the buffer
    let mut stack = vec![(sx, sy)];
    work.put(sx, sy, color);
    let mut filled = 1;
    let mut visited = 0usize;

    while let Some((x, y)) = stack.pop() {
        if visited % CANCEL_CHECK_INTERVAL == 0 && cancel.is_some_and(CancelToken::is_cancelled) {
            log::debug!("Flood fill cancelled after {} pixels", filled);
            return Err(CanvasError::Cancelled);
        }
        visited += 1;
        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&nx| nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if work.pixel(nx, ny) == target {
                work.put(nx, ny, color);
                filled += 1;
                stack.push((nx, ny));
            }
        }
    }

    *buffer = work;
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled_buffer() -> PixelBuffer {
        // vertical wall at x = 2 splits the buffer into two regions
        let mut buf = PixelBuffer::new(5, 3);
        for y in 0..3 {
            buf.set(2, y, Color::BLACK).unwrap();
        }
        buf
    }

    #[test]
    fn test_fill_stops_at_boundary() {
        let mut buf = walled_buffer();
        let red = Color::rgb(255, 0, 0);
        let filled = flood_fill(&mut buf, PixelPos::new(0, 0), red, None).unwrap();
        assert_eq!(filled, 6);
        assert_eq!(buf.get(1, 2).unwrap(), red);
        assert_eq!(buf.get(2, 1).unwrap(), Color::BLACK);
        assert_eq!(buf.get(3, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_fill_is_four_connected() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(1, 0, Color::BLACK).unwrap();
        buf.set(0, 1, Color::BLACK).unwrap();
        let filled = flood_fill(&mut buf, PixelPos::new(0, 0), Color::WHITE, None).unwrap();
        assert_eq!(filled, 1);
        assert_eq!(buf.get(1, 1).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_fill_same_colour_or_outside_is_noop() {
        let mut buf = walled_buffer();
        let before = buf.clone();
        assert_eq!(flood_fill(&mut buf, PixelPos::new(2, 0), Color::BLACK, None).unwrap(), 0);
        assert_eq!(flood_fill(&mut buf, PixelPos::new(-1, 0), Color::WHITE, None).unwrap(), 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_token_clones_share_cancellation() {
        let tool = FillTool::default();
        let handle = tool.cancel.clone();
        let mut buf = PixelBuffer::new(4, 4);
        handle.cancel();
        let result = tool.apply_stroke(&mut buf, &[PixelPos::new(0, 0)], Color::WHITE, 1);
        assert!(matches!(result, Err(CanvasError::Cancelled)));
        assert_eq!(buf.get(0, 0).unwrap(), Color::TRANSPARENT);

        handle.reset();
        tool.apply_stroke(&mut buf, &[PixelPos::new(0, 0)], Color::WHITE, 1).unwrap();
        assert_eq!(buf.get(3, 3).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_cancelled_fill_leaves_buffer_untouched() {
        let mut buf = PixelBuffer::new(128, 128);
        let before = buf.clone();
        let token = CancelToken::new();
        token.cancel();
        let result = flood_fill(&mut buf, PixelPos::new(0, 0), Color::WHITE, Some(&token));
        assert!(matches!(result, Err(CanvasError::Cancelled)));
        assert_eq!(buf, before);
    }
}
