use opencv::core::{Mat, CV_8U};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use tracing::{info, warn};

use crate::modules::{Frame, InputModule};
use crate::settings::InputSettings;
use crate::{Error, Result};

pub struct CameraInput {
	cap: VideoCapture,
}

impl CameraInput {
	pub fn new(settings: &InputSettings) -> Result<Self> {
		let mut cap = VideoCapture::new(settings.camera_index, videoio::CAP_ANY)?;
		if !cap.is_opened()? {
			return Err(Error::InputUnavailable(format!("camera {} could not be opened", settings.camera_index)));
		}

		let props = [
			(videoio::CAP_PROP_FRAME_WIDTH, settings.width),
			(videoio::CAP_PROP_FRAME_HEIGHT, settings.height),
			(videoio::CAP_PROP_FPS, settings.fps),
		];
		for (prop, value) in props.iter().filter_map(|(p, v)| v.map(|v| (*p, v))) {
			if !cap.set(prop, value as f64)? {
				warn!(prop, value, "camera ignored property");
			}
		}
		info!(index = settings.camera_index, "camera opened");

		Ok(Self { cap: cap })
	}
}

impl InputModule for CameraInput {
	fn next_frame(&mut self) -> Result<Option<Frame>> {
		read_frame(&mut self.cap)
	}
}

pub struct VideoFileInput {
	cap: VideoCapture,
}

impl VideoFileInput {
	pub fn new(path: &str) -> Result<Self> {
		let cap = VideoCapture::from_file(path, videoio::CAP_ANY)?;
		if !cap.is_opened()? {
			return Err(Error::InputUnavailable(format!("video {} could not be opened", path)));
		}
		info!(path, "video opened");
		Ok(Self { cap: cap })
	}
}

impl InputModule for VideoFileInput {
	fn next_frame(&mut self) -> Result<Option<Frame>> {
		read_frame(&mut self.cap)
	}
}

/// A failed read means the device went away or the file ended.
fn read_frame(cap: &mut VideoCapture) -> Result<Option<Frame>> {
	let mut mat = Mat::default();
	if !cap.read(&mut mat)? || mat.rows() == 0 || mat.cols() == 0 {
		return Ok(None);
	}
	mat_to_frame(&mat).map(Some)
}

/// Copy an 8-bit gray, BGR or BGRA `Mat` into an RGB [`Frame`].
pub fn mat_to_frame(mat: &Mat) -> Result<Frame> {
	if mat.depth() != CV_8U {
		return Err(Error::InvalidImage(format!("unsupported mat depth {}", mat.depth())));
	}
	let continuous;
	let mat = if mat.is_continuous() {
		mat
	} else {
		continuous = mat.try_clone()?;
		&continuous
	};

	let (width, height) = (mat.cols() as usize, mat.rows() as usize);
	let bytes = mat.data_bytes()?;
	let data = match mat.channels() {
		1 => bytes.iter().flat_map(|&v| [v, v, v]).collect(),
		3 => bytes.chunks_exact(3).flat_map(|p| [p[2], p[1], p[0]]).collect(),
		4 => bytes.chunks_exact(4).flat_map(|p| [p[2], p[1], p[0]]).collect(),
		n => return Err(Error::InvalidImage(format!("unsupported channel count {}", n))),
	};
	Frame::from_raw(width, height, data)
}
