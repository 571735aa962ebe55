use crate::color::Color;
use crate::pixel_buffer::PixelBuffer;

/// A pixel coordinate on the canvas. May lie outside the buffer while the
/// pointer is dragged past the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Every pixel on the Bresenham line from `start` to `end`, both included
pub fn interpolate(start: PixelPos, end: PixelPos) -> Vec<PixelPos> {
    let (mut x, mut y) = (start.x, start.y);
    let dx = (end.x - x).abs();
    let dy = (end.y - y).abs();
    let sx = if x < end.x { 1 } else { -1 };
    let sy = if y < end.y { 1 } else { -1 };
    let mut err = dx - dy;
    let mut points = Vec::with_capacity(dx.max(dy) as usize + 1);

    loop {
        points.push(PixelPos::new(x, y));
        if x == end.x && y == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// The path through all `points`, consecutive samples joined without gaps
pub fn trace_path(points: &[PixelPos]) -> Vec<PixelPos> {
    match points {
        [] => Vec::new(),
        [single] => vec![*single],
        _ => {
            let mut path = vec![points[0]];
            for pair in points.windows(2) {
                path.extend(interpolate(pair[0], pair[1]).into_iter().skip(1));
            }
            path
        }
    }
}

/// Offsets of a disc with the given diameter, relative to its anchor pixel
pub fn disc_offsets(size: u32) -> Vec<(i32, i32)> {
    let size = size.max(1) as i32;
    let center = (size - 1) as f32 / 2.0;
    let radius_sq = (size as f32 / 2.0).powi(2);
    let anchor = center.floor() as i32;

    let mut offsets = Vec::new();
    for j in 0..size {
        for i in 0..size {
            let dx = i as f32 - center;
            let dy = j as f32 - center;
            if dx * dx + dy * dy <= radius_sq {
                offsets.push((i - anchor, j - anchor));
            }
        }
    }
    offsets
}

/// Writes `color` in a disc at every point of the path. Pixels outside the
/// buffer are skipped. Returns how many pixels changed.
pub fn stamp_path(buffer: &mut PixelBuffer, points: &[PixelPos], color: Color, size: u32) -> usize {
    let offsets = disc_offsets(size);
    let mut changed = 0;
    for p in trace_path(points) {
        for &(ox, oy) in &offsets {
            let (x, y) = (p.x as i64 + ox as i64, p.y as i64 + oy as i64);
            if !buffer.contains(x, y) {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if buffer.pixel(x, y) != color {
                buffer.put(x, y, color);
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_diagonal() {
        let line = interpolate(PixelPos::new(0, 0), PixelPos::new(3, 3));
        assert_eq!(
            line,
            vec![
                PixelPos::new(0, 0),
                PixelPos::new(1, 1),
                PixelPos::new(2, 2),
                PixelPos::new(3, 3)
            ]
        );
    }

    #[test]
    fn test_interpolate_has_no_gaps() {
        let line = interpolate(PixelPos::new(0, 0), PixelPos::new(7, -3));
        assert_eq!(line.first(), Some(&PixelPos::new(0, 0)));
        assert_eq!(line.last(), Some(&PixelPos::new(7, -3)));
        for pair in line.windows(2) {
            assert!((pair[1].x - pair[0].x).abs() <= 1);
            assert!((pair[1].y - pair[0].y).abs() <= 1);
        }
    }

    #[test]
    fn test_interpolate_single_point() {
        let p = PixelPos::new(4, 2);
        assert_eq!(interpolate(p, p), vec![p]);
    }

    #[test]
    fn test_disc_sizes() {
        assert_eq!(disc_offsets(1), vec![(0, 0)]);
        assert_eq!(disc_offsets(0), vec![(0, 0)]);
        assert_eq!(disc_offsets(2).len(), 4);
        assert_eq!(disc_offsets(3).len(), 9);
        // corners are cut from larger discs
        let four = disc_offsets(4);
        assert_eq!(four.len(), 12);
        assert!(!four.contains(&(-1, -1)));
        assert!(four.contains(&(0, 0)));
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let mut buf = PixelBuffer::new(4, 4);
        let changed = stamp_path(&mut buf, &[PixelPos::new(-2, 0), PixelPos::new(1, 0)], Color::BLACK, 1);
        assert_eq!(changed, 2);
        assert_eq!(buf.get(0, 0).unwrap(), Color::BLACK);
        assert_eq!(buf.get(1, 0).unwrap(), Color::BLACK);
        assert_eq!(buf.get(2, 0).unwrap(), Color::TRANSPARENT);
    }
}
