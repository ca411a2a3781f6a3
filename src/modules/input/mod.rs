mod memory;
pub use self::memory::FrameQueue;

#[cfg(feature = "opencv")]
mod camera;
#[cfg(feature = "opencv")]
pub use self::camera::{mat_to_frame, CameraInput, VideoFileInput};

#[cfg(feature = "opencv")]
mod still;
#[cfg(feature = "opencv")]
pub use self::still::StillImageInput;

#[cfg(feature = "opencv")]
use crate::modules::InputModule;
#[cfg(feature = "opencv")]
use crate::settings::{InputSettings, SourceKind};
#[cfg(feature = "opencv")]
use crate::{Error, Result};

/// Open whichever source `[input]` describes.
#[cfg(feature = "opencv")]
pub fn from_settings(settings: &InputSettings) -> Result<Box<dyn InputModule>> {
	let path = || settings.path.as_deref().ok_or_else(|| Error::InvalidConfig(String::from("input.path is required for video and image sources")));

	let input: Box<dyn InputModule> = match settings.source {
		SourceKind::Camera => Box::new(CameraInput::new(settings)?),
		SourceKind::Video => Box::new(VideoFileInput::new(path()?)?),
		SourceKind::Image => Box::new(StillImageInput::new(path()?)?),
	};
	Ok(input)
}
