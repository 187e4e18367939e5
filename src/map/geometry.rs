use crate::braille::BrailleCanvas;
use crate::map::projection::Viewport;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, (x0, y0): (i32, i32), (x1, y1): (i32, i32)) {
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

/// Draw the closed outline through `corners`, skipping edges entirely
/// off-canvas
pub fn draw_polygon(canvas: &mut BrailleCanvas, corners: &[(i32, i32)], viewport: &Viewport) {
    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        if viewport.line_might_be_visible(from, to) {
            draw_line(canvas, from, to);
        }
    }
}

/// Draw a filled circle (for place markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
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
        draw_line(&mut canvas, (0, 0), (9, 0));
        // Top dot row of every cell
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, (0, 0), (0, 7));
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_polygon_closes() {
        let mut canvas = BrailleCanvas::new(2, 1);
        let viewport = Viewport::new(0.0, 0.0, 0.0, 4, 4);
        draw_polygon(&mut canvas, &[(0, 0), (3, 0), (3, 3), (0, 3)], &viewport);
        // Every border dot of the 4x4 square, interior empty
        assert_eq!(canvas.to_string(), "⣏⣹");
    }

    #[test]
    fn test_circle_clipped_at_origin() {
        let mut canvas = BrailleCanvas::new(2, 1);
        draw_circle(&mut canvas, 0, 0, 1);
        // (0,0), (1,0) and (0,1) survive clipping
        assert_eq!(canvas.to_string(), "⠋⠀");
    }
}
