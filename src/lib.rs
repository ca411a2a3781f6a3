//! # ferrotrack
//!
//! Drag a rectangle over a live frame to mark an object, then keep relocating
//! it in later frames with sparse feature matching and a homography estimate.
//!
//! The core (selection, features, matching, geometry, tracking) is plain Rust.
//! Camera capture and the preview window live behind the `opencv` feature.

pub mod modules;
pub mod pipeline;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::modules::{Frame, GrayImage, Point2D, Quad, Rect};
pub use crate::pipeline::Pipeline;
pub use crate::settings::Settings;

pub use crate::error::{Error, Result};

mod error {
	use thiserror::Error;

	/// Failures that are not part of normal per-frame operation.
	#[derive(Error, Debug)]
	pub enum Error {
		#[error("Invalid configuration: {0}")]
		InvalidConfig(String),

		#[error("Invalid image: {0}")]
		InvalidImage(String),

		#[error("Settings parse error: {0}")]
		SettingsParse(#[from] toml::de::Error),

		#[error("Input unavailable: {0}")]
		InputUnavailable(String),

		#[error("IO error: {0}")]
		Io(#[from] std::io::Error),

		#[cfg(feature = "opencv")]
		#[error("OpenCV error: {0}")]
		OpenCv(#[from] opencv::Error),
	}

	pub type Result<T> = std::result::Result<T, Error>;
}
