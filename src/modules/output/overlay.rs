//! Drawing onto frames with `imageproc`. Everything clips to the frame.

use image::Rgb;
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as PixelRect;

use crate::modules::preprocess::EdgeMap;
use crate::modules::{Frame, Point2D, Quad, Rect};

pub const GREEN: [u8; 3] = [0, 255, 0];
pub const RED: [u8; 3] = [255, 0, 0];
pub const YELLOW: [u8; 3] = [255, 255, 0];

/// Draw a `thickness`-pixel segment. Non-finite endpoints draw nothing.
pub fn draw_line(frame: &mut Frame, a: Point2D, b: Point2D, color: [u8; 3], thickness: u32) {
	if !a.is_finite() || !b.is_finite() || frame.width() == 0 || frame.height() == 0 {
		return;
	}
	// imageproc steps through every point of the segment, so clip it first;
	// the pad keeps the inner half of a thick line running just outside
	let pad = thickness as f64;
	let bounds = (-pad, -pad, frame.width() as f64 - 1. + pad, frame.height() as f64 - 1. + pad);
	let ((ax, ay), (bx, by)) = match clip((a.x as f64, a.y as f64), (b.x as f64, b.y as f64), bounds) {
		Some(segment) => segment,
		None => return,
	};
	let (ax, ay, bx, by) = (ax.round() as f32, ay.round() as f32, bx.round() as f32, by.round() as f32);

	let lo = -((thickness.max(1) as i32 - 1) / 2);
	let hi = lo + thickness.max(1) as i32;
	for dy in lo..hi {
		for dx in lo..hi {
			let (dx, dy) = (dx as f32, dy as f32);
			draw_line_segment_mut(frame.as_rgb_mut(), (ax + dx, ay + dy), (bx + dx, by + dy), Rgb(color));
		}
	}
}

pub fn draw_quad(frame: &mut Frame, quad: &Quad, color: [u8; 3], thickness: u32) {
	let corners = quad.corners();
	for i in 0..4 {
		draw_line(frame, corners[i], corners[(i + 1) % 4], color, thickness);
	}
}

/// One-pixel outline of `rect` along its first and last rows and columns.
pub fn draw_rect(frame: &mut Frame, rect: Rect, color: [u8; 3]) {
	let rect = rect.normalized();
	if rect.is_empty() {
		return;
	}
	let outline = PixelRect::at(rect.x, rect.y).of_size(rect.width as u32, rect.height as u32);
	draw_hollow_rect_mut(frame.as_rgb_mut(), outline, Rgb(color));
}

/// Paint every pixel whose gradient magnitude exceeds `threshold`.
pub fn draw_edges(frame: &mut Frame, magnitude: &EdgeMap, threshold: f32, color: [u8; 3]) {
	if magnitude.dimensions() != frame.as_rgb().dimensions() {
		return;
	}
	for (x, y, m) in magnitude.enumerate_pixels() {
		if f32::from(m.0[0]) > threshold {
			frame.put_pixel(x as i32, y as i32, color);
		}
	}
}

/// Liang-Barsky clip of segment `a`-`b` against `(min_x, min_y, max_x, max_y)`.
fn clip(a: (f64, f64), b: (f64, f64), bounds: (f64, f64, f64, f64)) -> Option<((f64, f64), (f64, f64))> {
	let (min_x, min_y, max_x, max_y) = bounds;
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let mut t0 = 0f64;
	let mut t1 = 1f64;

	for (p, q) in [(-dx, a.0 - min_x), (dx, max_x - a.0), (-dy, a.1 - min_y), (dy, max_y - a.1)] {
		if p == 0. {
			if q < 0. {
				return None;
			}
			continue;
		}
		let r = q / p;
		if p < 0. {
			if r > t1 {
				return None;
			}
			t0 = t0.max(r);
		} else {
			if r < t0 {
				return None;
			}
			t1 = t1.min(r);
		}
	}

	Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
}
