//! Key-toggled grayscale conditioning applied before feature extraction.

use image::{ImageBuffer, Luma};
use imageproc::{contrast, filter, gradients};
use itertools::{Itertools, MinMaxResult};
use tracing::info;

use crate::modules::{Command, GrayImage};
use crate::settings::DisplaySettings;

pub type EdgeMap = ImageBuffer<Luma<u16>, Vec<u16>>;

pub struct Preprocessor {
	pub denoise: bool,
	pub contrast: bool,
	pub edges: bool,
	edge_threshold: f32,
}

impl Preprocessor {
	pub fn new(settings: &DisplaySettings) -> Self {
		Self {
			denoise: false,
			contrast: false,
			edges: false,
			edge_threshold: settings.edge_threshold,
		}
	}

	pub fn edge_threshold(&self) -> f32 {
		self.edge_threshold
	}

	/// Flip the toggle `command` names. Returns false for commands it doesn't own.
	pub fn toggle(&mut self, command: Command) -> bool {
		let (name, value) = match command {
			Command::ToggleDenoise => {
				self.denoise = !self.denoise;
				("denoise", self.denoise)
			}
			Command::ToggleContrast => {
				self.contrast = !self.contrast;
				("contrast", self.contrast)
			}
			Command::ToggleEdges => {
				self.edges = !self.edges;
				("edges", self.edges)
			}
			Command::Quit => return false,
		};
		info!(toggle = name, enabled = value, "preprocessing changed");
		true
	}

	pub fn apply(&self, image: GrayImage) -> GrayImage {
		let image = if self.denoise { box_blur(&image) } else { image };
		if self.contrast {
			stretch_contrast(&image)
		} else {
			image
		}
	}
}

/// 3x3 mean filter with edge replication.
pub fn box_blur(image: &GrayImage) -> GrayImage {
	if image.is_empty() {
		return image.clone();
	}
	filter::box_filter(image.as_luma(), 1, 1).into()
}

/// Linear stretch of the occupied intensity range onto 0..=255.
pub fn stretch_contrast(image: &GrayImage) -> GrayImage {
	match image.data().iter().copied().minmax() {
		MinMaxResult::MinMax(min, max) if max > min => contrast::stretch_contrast(image.as_luma(), min, max).into(),
		_ => image.clone(),
	}
}

/// Sobel gradient magnitude per pixel.
pub fn sobel_magnitude(image: &GrayImage) -> EdgeMap {
	gradients::sobel_gradients(image.as_luma())
}
