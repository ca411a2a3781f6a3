use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::debug;

use super::Homography;
use crate::modules::features::Keypoint;
use crate::modules::matching::Correspondence;
use crate::modules::{Point2D, Quad};
use crate::settings::GeometrySettings;

const SAMPLE_SIZE: usize = 4;
const CONFIDENCE: f64 = 0.995;

#[derive(Debug, Clone, PartialEq)]
pub enum Estimate {
	Located {
		quad: Quad,
		homography: Homography,
		inliers: usize,
	},
	Insufficient,
}

/// Robust homography fit from reference keypoints to scene keypoints.
pub struct GeometryEstimator {
	min_correspondences: usize,
	min_inliers: usize,
	min_inlier_ratio: f64,
	ransac_threshold: f64,
	max_iterations: usize,
	seed: u64,
}

impl GeometryEstimator {
	pub fn new(settings: &GeometrySettings) -> Self {
		Self {
			min_correspondences: settings.min_correspondences.max(SAMPLE_SIZE),
			min_inliers: settings.min_inliers.max(SAMPLE_SIZE),
			min_inlier_ratio: settings.min_inlier_ratio.clamp(0., 1.),
			ransac_threshold: settings.ransac_threshold,
			max_iterations: settings.max_iterations.max(1),
			seed: settings.seed,
		}
	}

	/// `query_index` of each correspondence indexes `reference`, `train_index`
	/// indexes `scene`. `corners` are in reference-patch coordinates.
	///
	/// A fit backed by fewer than `min_inliers` inliers, or by less than
	/// `min_inlier_ratio` of the usable correspondences, is `Insufficient`:
	/// four points always fit some homography, and unrelated texture
	/// lines up a handful more by chance. Beyond that an ill-conditioned
	/// fit is still reported as located; only a non-finite one is not.
	pub fn estimate(&self, correspondences: &[Correspondence], reference: &[Keypoint], scene: &[Keypoint], corners: &Quad) -> Estimate {
		if correspondences.len() < self.min_correspondences {
			return Estimate::Insufficient;
		}

		let (src, dst): (Vec<Point2D>, Vec<Point2D>) = correspondences
			.iter()
			.filter_map(|c| match (reference.get(c.query_index), scene.get(c.train_index)) {
				(Some(r), Some(s)) => Some((r.location, s.location)),
				_ => None,
			})
			.unzip();

		if src.len() < self.min_correspondences {
			return Estimate::Insufficient;
		}

		match self.find_homography(&src, &dst) {
			Some((_, inliers)) if inliers < self.required_inliers(src.len()) => {
				debug!(inliers, total = src.len(), required = self.required_inliers(src.len()), "fit has too little support");
				Estimate::Insufficient
			}
			Some((homography, inliers)) => {
				let quad = homography.project_quad(corners);
				if !quad.is_finite() {
					return Estimate::Insufficient;
				}
				Estimate::Located {
					quad: quad,
					homography: homography,
					inliers: inliers,
				}
			}
			None => Estimate::Insufficient,
		}
	}

	/// RANSAC over minimal four-point fits, then a refit on the best inlier set.
	pub fn find_homography(&self, src: &[Point2D], dst: &[Point2D]) -> Option<(Homography, usize)> {
		let n = src.len();
		if n < SAMPLE_SIZE || n != dst.len() {
			return None;
		}
		if n == SAMPLE_SIZE {
			let h = Homography::fit(src, dst)?;
			let inliers = self.inlier_mask(&h, src, dst).iter().filter(|&&i| i).count();
			return Some((h, inliers));
		}

		let mut rng = StdRng::seed_from_u64(self.seed);
		let mut best: Option<(Homography, Vec<bool>, usize)> = None;
		let mut iterations = self.max_iterations;
		let mut i = 0;

		while i < iterations {
			i += 1;
			let sample = index::sample(&mut rng, n, SAMPLE_SIZE);
			let s_src: Vec<Point2D> = sample.iter().map(|k| src[k]).collect();
			let s_dst: Vec<Point2D> = sample.iter().map(|k| dst[k]).collect();

			let h = match Homography::fit(&s_src, &s_dst) {
				Some(h) => h,
				None => continue,
			};
			let mask = self.inlier_mask(&h, src, dst);
			let count = mask.iter().filter(|&&m| m).count();

			if best.as_ref().map_or(true, |(_, _, c)| count > *c) {
				iterations = iterations.min(required_iterations(count, n, self.max_iterations));
				best = Some((h, mask, count));
			}
		}

		let (model, mask, count) = best?;
		debug!(iterations = i, inliers = count, total = n, "ransac finished");

		if count >= SAMPLE_SIZE {
			let in_src: Vec<Point2D> = src.iter().zip(&mask).filter(|(_, m)| **m).map(|(p, _)| *p).collect();
			let in_dst: Vec<Point2D> = dst.iter().zip(&mask).filter(|(_, m)| **m).map(|(p, _)| *p).collect();
			if let Some(refined) = Homography::fit(&in_src, &in_dst) {
				let refined_count = self.inlier_mask(&refined, src, dst).iter().filter(|&&m| m).count();
				if refined_count >= count {
					return Some((refined, refined_count));
				}
			}
		}
		Some((model, count))
	}

	/// Inliers a fit over `total` correspondences needs to be believed.
	pub fn required_inliers(&self, total: usize) -> usize {
		let share = (self.min_inlier_ratio * total as f64).ceil() as usize;
		self.min_inliers.max(share)
	}

	fn inlier_mask(&self, h: &Homography, src: &[Point2D], dst: &[Point2D]) -> Vec<bool> {
		let t2 = self.ransac_threshold * self.ransac_threshold;
		src.iter().zip(dst.iter()).map(|(s, d)| h.residual(*s, *d) <= t2).collect()
	}
}

/// Iterations needed to draw one all-inlier sample with `CONFIDENCE`.
fn required_iterations(inliers: usize, total: usize, max_iterations: usize) -> usize {
	let ratio = inliers as f64 / total as f64;
	let p_good = ratio.powi(SAMPLE_SIZE as i32);
	if p_good >= 1. - f64::EPSILON {
		return 0;
	}
	if p_good <= f64::EPSILON {
		return max_iterations;
	}
	let k = (1. - CONFIDENCE).ln() / (1. - p_good).ln();
	(k.ceil() as usize).min(max_iterations)
}
