use opencv::imgcodecs;
use opencv::prelude::*;

use tracing::info;

use super::mat_to_frame;
use crate::modules::{Frame, InputModule};
use crate::{Error, Result};

/// One image from disk, handed out again on every call so a selection can be
/// made and tracked on it.
pub struct StillImageInput {
	frame: Frame,
}

impl StillImageInput {
	pub fn new(path: &str) -> Result<Self> {
		let mat = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)?;
		if mat.rows() == 0 || mat.cols() == 0 {
			return Err(Error::InputUnavailable(format!("image {} could not be read", path)));
		}
		let frame = mat_to_frame(&mat)?;
		info!(path, width = frame.width(), height = frame.height(), "image loaded");
		Ok(Self { frame: frame })
	}
}

impl InputModule for StillImageInput {
	fn next_frame(&mut self) -> Result<Option<Frame>> {
		Ok(Some(self.frame.clone()))
	}
}
