//! Image buffers shared by every stage. Pixels live in `image` buffers so the
//! filters and drawing in `imageproc` work on them directly.

use image::{imageops, DynamicImage, Luma, Rgb, RgbImage};

use crate::modules::Rect;
use crate::{Error, Result};

/// 8-bit single channel image.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage(image::GrayImage);

impl GrayImage {
	pub fn new(width: usize, height: usize) -> Self {
		Self(image::GrayImage::new(width as u32, height as u32))
	}

	pub fn filled(width: usize, height: usize, value: u8) -> Self {
		Self(image::GrayImage::from_pixel(width as u32, height as u32, Luma([value])))
	}

	pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
		if data.len() != width * height {
			return Err(Error::InvalidImage(format!("expected {} bytes for {}x{} gray image, got {}", width * height, width, height, data.len())));
		}
		image::GrayImage::from_raw(width as u32, height as u32, data)
			.map(Self)
			.ok_or_else(|| Error::InvalidImage(format!("{}x{} gray image does not fit its buffer", width, height)))
	}

	pub fn from_fn<F: Fn(usize, usize) -> u8>(width: usize, height: usize, f: F) -> Self {
		Self(image::GrayImage::from_fn(width as u32, height as u32, |x, y| Luma([f(x as usize, y as usize)])))
	}

	pub fn width(&self) -> usize {
		self.0.width() as usize
	}

	pub fn height(&self) -> usize {
		self.0.height() as usize
	}

	pub fn data(&self) -> &[u8] {
		self.0.as_raw()
	}

	pub fn is_empty(&self) -> bool {
		self.0.width() == 0 || self.0.height() == 0
	}

	#[inline]
	pub fn get(&self, x: usize, y: usize) -> u8 {
		self.0.get_pixel(x as u32, y as u32).0[0]
	}

	/// Copy out `rect`, clipped to the image first.
	pub fn crop(&self, rect: Rect) -> GrayImage {
		let rect = rect.normalized().intersect(self.width() as i32, self.height() as i32);
		Self(imageops::crop_imm(&self.0, rect.x as u32, rect.y as u32, rect.width as u32, rect.height as u32).to_image())
	}

	pub fn as_luma(&self) -> &image::GrayImage {
		&self.0
	}
}

impl From<image::GrayImage> for GrayImage {
	fn from(image: image::GrayImage) -> Self {
		Self(image)
	}
}

/// 8-bit RGB image as shown on screen. Capture backends that deliver BGR
/// swap channels at their boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(RgbImage);

impl Frame {
	pub fn new(width: usize, height: usize) -> Self {
		Self(RgbImage::new(width as u32, height as u32))
	}

	pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
		if data.len() != width * height * 3 {
			return Err(Error::InvalidImage(format!("expected {} bytes for {}x{} RGB frame, got {}", width * height * 3, width, height, data.len())));
		}
		RgbImage::from_raw(width as u32, height as u32, data)
			.map(Self)
			.ok_or_else(|| Error::InvalidImage(format!("{}x{} frame does not fit its buffer", width, height)))
	}

	pub fn from_gray(gray: &GrayImage) -> Self {
		Self(DynamicImage::ImageLuma8(gray.as_luma().clone()).into_rgb8())
	}

	pub fn width(&self) -> usize {
		self.0.width() as usize
	}

	pub fn height(&self) -> usize {
		self.0.height() as usize
	}

	pub fn data(&self) -> &[u8] {
		self.0.as_raw()
	}

	pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
		self.0.get_pixel(x as u32, y as u32).0
	}

	/// Writes a pixel; coordinates outside the frame are ignored.
	#[inline]
	pub fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 3]) {
		if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
			return;
		}
		self.0.put_pixel(x as u32, y as u32, Rgb(color));
	}

	/// Rec. 709 luma, as `image` computes it.
	pub fn to_gray(&self) -> GrayImage {
		GrayImage(imageops::grayscale(&self.0))
	}

	pub fn as_rgb(&self) -> &RgbImage {
		&self.0
	}

	pub fn as_rgb_mut(&mut self) -> &mut RgbImage {
		&mut self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_gray_roundtrip_through_frame() {
		let gray = GrayImage::from_fn(4, 3, |x, y| (x * 10 + y) as u8);
		let frame = Frame::from_gray(&gray);
		assert_eq!(frame.pixel(2, 1), [21, 21, 21]);
		assert_eq!(frame.to_gray(), gray);
	}

	#[test]
	fn test_to_gray_weights_channels() {
		let luma = |color: [u8; 3]| Frame::from_raw(1, 1, color.to_vec()).unwrap().to_gray().get(0, 0);
		let (red, green, blue) = (luma([255, 0, 0]), luma([0, 255, 0]), luma([0, 0, 255]));
		assert!(green > red && red > blue && blue > 0);
		assert_eq!(luma([255, 255, 255]), 255);
	}

	#[test]
	fn test_crop_copies_region() {
		let gray = GrayImage::from_fn(10, 10, |x, y| (y * 10 + x) as u8);
		let crop = gray.crop(Rect::new(2, 3, 4, 2));
		assert_eq!(crop.width(), 4);
		assert_eq!(crop.height(), 2);
		assert_eq!(crop.data(), &[32, 33, 34, 35, 42, 43, 44, 45]);
	}

	#[test]
	fn test_crop_outside_is_empty() {
		let gray = GrayImage::new(10, 10);
		let crop = gray.crop(Rect::new(20, 20, 5, 5));
		assert!(crop.is_empty());
	}

	#[test]
	fn test_from_raw_checks_length() {
		assert!(GrayImage::from_raw(2, 2, vec![0; 3]).is_err());
		assert!(GrayImage::from_raw(2, 2, vec![0; 5]).is_err());
		assert!(Frame::from_raw(2, 2, vec![0; 12]).is_ok());
		assert!(Frame::from_raw(2, 2, vec![0; 4]).is_err());
	}

	#[test]
	fn test_put_pixel_clips() {
		let mut frame = Frame::new(2, 2);
		frame.put_pixel(-1, 0, [1, 2, 3]);
		frame.put_pixel(5, 5, [1, 2, 3]);
		frame.put_pixel(1, 1, [1, 2, 3]);
		assert_eq!(frame.pixel(1, 1), [1, 2, 3]);
		assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
	}
}
