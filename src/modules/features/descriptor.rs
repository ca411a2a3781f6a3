//! Rotation-normalised gradient histogram descriptor.
//!
//! A 16x16 sample grid around the keypoint is rotated into the keypoint
//! orientation and split into 4x4 cells of 8 orientation bins each.

use std::f32::consts::PI;

use crate::modules::GrayImage;

pub const DESCRIPTOR_LEN: usize = CELLS * CELLS * BINS;

/// Border a keypoint needs so the rotated sample grid and its gradients stay in bounds.
pub const PATCH_RADIUS: usize = 13;

const GRID: usize = 16;
const CELLS: usize = 4;
const BINS: usize = 8;
const ORIENTATION_RADIUS: isize = 7;
const CLIP: f32 = 0.2;

/// Intensity-centroid orientation in radians.
pub fn orientation(image: &GrayImage, x: usize, y: usize) -> f32 {
	let (mut m10, mut m01) = (0f32, 0f32);
	let r2 = ORIENTATION_RADIUS * ORIENTATION_RADIUS;
	for dy in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
		for dx in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
			if dx * dx + dy * dy > r2 {
				continue;
			}
			let v = image.get((x as isize + dx) as usize, (y as isize + dy) as usize) as f32;
			m10 += dx as f32 * v;
			m01 += dy as f32 * v;
		}
	}
	m01.atan2(m10)
}

pub fn describe(image: &GrayImage, x: usize, y: usize, angle: f32) -> Vec<f32> {
	let (sin, cos) = angle.sin_cos();
	let half = (GRID as f32 - 1.) / 2.;
	let sigma2 = 2. * (GRID as f32 / 2.).powi(2);
	let mut hist = vec![0f32; DESCRIPTOR_LEN];

	for v in 0..GRID {
		for u in 0..GRID {
			let lx = u as f32 - half;
			let ly = v as f32 - half;
			let ix = x as isize + (cos * lx - sin * ly).round() as isize;
			let iy = y as isize + (sin * lx + cos * ly).round() as isize;

			let gx = image.get((ix + 1) as usize, iy as usize) as f32 - image.get((ix - 1) as usize, iy as usize) as f32;
			let gy = image.get(ix as usize, (iy + 1) as usize) as f32 - image.get(ix as usize, (iy - 1) as usize) as f32;

			// gradient in the keypoint frame
			let rgx = cos * gx + sin * gy;
			let rgy = -sin * gx + cos * gy;
			let magnitude = rgx.hypot(rgy);
			if magnitude == 0. {
				continue;
			}

			let theta = rgy.atan2(rgx).rem_euclid(2. * PI);
			let bin = ((theta / (2. * PI)) * BINS as f32) as usize % BINS;
			let cell = (v / (GRID / CELLS)) * CELLS + u / (GRID / CELLS);
			let weight = (-(lx * lx + ly * ly) / sigma2).exp();
			hist[cell * BINS + bin] += magnitude * weight;
		}
	}

	normalize(&mut hist);
	for h in hist.iter_mut() {
		*h = h.min(CLIP);
	}
	normalize(&mut hist);
	hist
}

fn normalize(values: &mut [f32]) {
	let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
	if norm > f32::EPSILON {
		values.iter_mut().for_each(|v| *v /= norm);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::textured;

	#[test]
	fn test_descriptor_is_unit_length() {
		let image = textured(64, 64, 1);
		let desc = describe(&image, 32, 32, orientation(&image, 32, 32));
		assert_eq!(desc.len(), DESCRIPTOR_LEN);
		let norm: f32 = desc.iter().map(|v| v * v).sum::<f32>().sqrt();
		assert!((norm - 1.).abs() < 1e-4);
		assert!(desc.iter().all(|&v| v >= 0.));
	}

	#[test]
	fn test_flat_patch_gives_zero_descriptor() {
		let image = GrayImage::filled(40, 40, 90);
		let desc = describe(&image, 20, 20, 0.);
		assert!(desc.iter().all(|&v| v == 0.));
	}

	#[test]
	fn test_orientation_points_towards_bright_side() {
		let image = GrayImage::from_fn(40, 40, |x, _| if x > 20 { 255 } else { 0 });
		assert!(orientation(&image, 20, 20).abs() < 1e-3);

		let image = GrayImage::from_fn(40, 40, |_, y| if y > 20 { 255 } else { 0 });
		assert!((orientation(&image, 20, 20) - PI / 2.).abs() < 1e-3);
	}

	#[test]
	fn test_different_locations_differ() {
		let image = textured(80, 80, 7);
		let a = describe(&image, 30, 30, 0.);
		let b = describe(&image, 50, 45, 0.);
		let dist: f32 = a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum::<f32>().sqrt();
		assert!(dist > 0.1);
	}
}
