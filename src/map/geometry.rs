use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a thicker line (stroke weight 2 and up)
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Draw a filled circle (circle markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Stipple step for a fill opacity: every `step`-th pixel along a diagonal is set.
/// Braille has no alpha, so a sparser pattern stands in for a lighter fill.
pub fn stipple_step(fill_opacity: f32) -> i32 {
    if fill_opacity >= 0.9 {
        1
    } else if fill_opacity >= 0.5 {
        2
    } else if fill_opacity >= 0.3 {
        3
    } else if fill_opacity >= 0.15 {
        4
    } else {
        6
    }
}

/// Scanline-fill projected rings with the even-odd rule, clipped to the canvas.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(i32, i32)>], step: i32) {
    let step = step.max(1);
    let Some(min_y) = rings.iter().flatten().map(|p| p.1).min() else {
        return;
    };
    let max_y = rings.iter().flatten().map(|p| p.1).max().unwrap_or(min_y);
    let height = canvas.pixel_height() as i32;
    let width = canvas.pixel_width() as i32;

    let mut crossings: Vec<i32> = Vec::new();
    for y in min_y.max(0)..=max_y.min(height - 1) {
        crossings.clear();
        let scan = y as f64 + 0.5;
        for ring in rings {
            for edge in ring.windows(2) {
                let (x0, y0) = (edge[0].0 as f64, edge[0].1 as f64);
                let (x1, y1) = (edge[1].0 as f64, edge[1].1 as f64);
                if (y0 <= scan && y1 > scan) || (y1 <= scan && y0 > scan) {
                    let t = (scan - y0) / (y1 - y0);
                    crossings.push((x0 + t * (x1 - x0)).round() as i32);
                }
            }
        }
        crossings.sort_unstable();

        for span in crossings.chunks_exact(2) {
            for x in span[0].max(0)..=span[1].min(width - 1) {
                if (x + y * 2) % step == 0 {
                    canvas.set_pixel_signed(x, y);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_solid_fill_covers_square() {
        let mut canvas = BrailleCanvas::new(2, 1);
        let square = vec![(0, 0), (3, 0), (3, 4), (0, 4), (0, 0)];
        fill_polygon(&mut canvas, &[square], 1);
        assert_eq!(canvas.to_string(), "⣿⣿");
    }

    #[test]
    fn test_hole_is_left_empty() {
        let mut canvas = BrailleCanvas::new(6, 3);
        let outer = vec![(0, 0), (11, 0), (11, 11), (0, 11), (0, 0)];
        let hole = vec![(4, 4), (8, 4), (8, 8), (4, 8), (4, 4)];
        fill_polygon(&mut canvas, &[outer, hole], 1);
        // Pixel (6, 6) lives in cell (3, 1) at dot (0, 2)
        let glyph = canvas.glyph(3, 1).map(|c| c as u32 - 0x2800).unwrap_or(0);
        assert_eq!(glyph & 0x04, 0);
        assert!(canvas.glyph(0, 0).is_some());
    }

    #[test]
    fn test_stipple_thins_out() {
        assert_eq!(stipple_step(0.95), 1);
        assert_eq!(stipple_step(0.35), 3);
        assert!(stipple_step(0.05) > stipple_step(0.2));
    }
}
