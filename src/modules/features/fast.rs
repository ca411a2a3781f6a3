//! FAST-9 corners with 3x3 non-maximum suppression, kept clear of the border.

use imageproc::corners::{corners_fast9, Corner};
use imageproc::suppress::local_maxima;

use crate::modules::GrayImage;

/// Corners at least `margin` pixels from every border, in raster order.
///
/// Suppression runs before the margin cut so a corner's neighbours are the
/// same whether it was found in a crop or in the full frame.
pub fn detect(image: &GrayImage, threshold: u8, margin: usize) -> Vec<Corner> {
	let (w, h) = (image.width(), image.height());
	if w < 2 * margin + 1 || h < 2 * margin + 1 {
		return Vec::new();
	}

	let corners = corners_fast9(image.as_luma(), threshold);
	let mut kept: Vec<Corner> = local_maxima(&corners, 1)
		.into_iter()
		.filter(|c| {
			let (x, y) = (c.x as usize, c.y as usize);
			x >= margin && y >= margin && x < w - margin && y < h - margin
		})
		.collect();
	kept.sort_by_key(|c| (c.y, c.x));
	kept
}
