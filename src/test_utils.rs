//! Synthetic images for tests. Integration tests pull this file in by path,
//! so it only names items re-exported at the crate root.

use crate::GrayImage;

const BLOCK: i64 = 6;

/// Intensity of an infinite block texture at `(x, y)`.
pub fn texture_value(x: i64, y: i64, seed: u32) -> u8 {
	let bx = x.div_euclid(BLOCK) as u32;
	let by = y.div_euclid(BLOCK) as u32;
	let mut h = bx.wrapping_mul(73_856_093) ^ by.wrapping_mul(19_349_663) ^ seed.wrapping_mul(83_492_791);
	h ^= h >> 13;
	h = h.wrapping_mul(0x5bd1_e995);
	h ^= h >> 15;
	(h & 0xff) as u8
}

/// Random-intensity block texture, rich in FAST corners.
pub fn textured(width: usize, height: usize, seed: u32) -> GrayImage {
	shifted(width, height, seed, 0, 0)
}

/// The same texture moved right by `dx` and down by `dy`.
pub fn shifted(width: usize, height: usize, seed: u32, dx: i64, dy: i64) -> GrayImage {
	GrayImage::from_fn(width, height, |x, y| texture_value(x as i64 - dx, y as i64 - dy, seed))
}
