use crate::modules::features::{DescriptorSet, FeatureExtractor};
use crate::modules::selection::Rejection;
use crate::modules::{GrayImage, Quad, Rect};

/// The user-selected region currently being tracked.
#[derive(Debug, Clone)]
pub struct ReferencePatch {
	rect: Rect,
	image: GrayImage,
	features: DescriptorSet,
}

impl ReferencePatch {
	/// Crop `rect` out of `frame` and extract its features. Keypoints are in
	/// patch-local coordinates.
	pub fn new(frame: &GrayImage, rect: Rect, extractor: &dyn FeatureExtractor, min_keypoints: usize) -> Result<Self, Rejection> {
		let rect = rect.normalized().intersect(frame.width() as i32, frame.height() as i32);
		let image = frame.crop(rect);
		let features = extractor.extract(&image);

		if features.len() < min_keypoints {
			return Err(Rejection::InsufficientFeatures {
				found: features.len(),
				required: min_keypoints,
			});
		}

		Ok(Self {
			rect: rect,
			image: image,
			features: features,
		})
	}

	/// Where the patch was cut from, in frame coordinates.
	pub fn rect(&self) -> Rect {
		self.rect
	}

	pub fn image(&self) -> &GrayImage {
		&self.image
	}

	pub fn features(&self) -> &DescriptorSet {
		&self.features
	}

	/// Patch outline in its own coordinates.
	pub fn corners(&self) -> Quad {
		Rect::new(0, 0, self.image.width() as i32, self.image.height() as i32).corners()
	}
}
