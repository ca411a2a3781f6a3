pub mod descriptor;
pub mod fast;

use itertools::Itertools;

use crate::modules::{GrayImage, Point2D};
use crate::settings::FeatureSettings;

use self::descriptor::PATCH_RADIUS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
	pub location: Point2D,
	pub scale: f32,
	/// Radians, from the patch intensity centroid.
	pub orientation: f32,
	pub response: f32,
}

/// Keypoints and their descriptors, aligned 1:1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorSet {
	keypoints: Vec<Keypoint>,
	descriptors: Vec<Vec<f32>>,
}

impl DescriptorSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			keypoints: Vec::with_capacity(capacity),
			descriptors: Vec::with_capacity(capacity),
		}
	}

	pub fn push(&mut self, keypoint: Keypoint, descriptor: Vec<f32>) {
		self.keypoints.push(keypoint);
		self.descriptors.push(descriptor);
	}

	pub fn len(&self) -> usize {
		self.keypoints.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keypoints.is_empty()
	}

	pub fn keypoints(&self) -> &[Keypoint] {
		&self.keypoints
	}

	pub fn descriptors(&self) -> &[Vec<f32>] {
		&self.descriptors
	}
}

pub trait FeatureExtractor {
	/// Must be deterministic, and return an empty set rather than fail on
	/// empty or featureless images.
	fn extract(&self, image: &GrayImage) -> DescriptorSet;
}

/// FAST corners with rotated gradient-histogram descriptors, at a single scale.
pub struct FastExtractor {
	threshold: u8,
	max_keypoints: usize,
}

impl FastExtractor {
	pub fn new(settings: &FeatureSettings) -> Self {
		Self {
			threshold: settings.threshold,
			max_keypoints: settings.max_keypoints,
		}
	}
}

impl FeatureExtractor for FastExtractor {
	fn extract(&self, image: &GrayImage) -> DescriptorSet {
		let corners = fast::detect(image, self.threshold, PATCH_RADIUS);

		// Strongest first; the stable sort keeps raster order among equal scores.
		let strongest = corners
			.into_iter()
			.sorted_by(|a, b| b.score.total_cmp(&a.score))
			.take(self.max_keypoints);

		let mut set = DescriptorSet::with_capacity(self.max_keypoints.min(1024));
		for corner in strongest {
			let (x, y) = (corner.x as usize, corner.y as usize);
			let angle = descriptor::orientation(image, x, y);
			let desc = descriptor::describe(image, x, y, angle);
			set.push(
				Keypoint {
					location: Point2D::new(x as f32, y as f32),
					scale: 1.,
					orientation: angle,
					response: corner.score,
				},
				desc,
			);
		}
		set
	}
}
