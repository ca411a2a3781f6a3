pub mod features;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod matching;
pub mod output;
pub mod preprocess;
pub mod selection;
pub mod tracking;

pub use self::frame::{Frame, GrayImage};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
	pub x: f32,
	pub y: f32,
}

impl Point2D {
	pub fn new(x: f32, y: f32) -> Self {
		Self { x: x, y: y }
	}

	pub fn distance(&self, other: &Point2D) -> f32 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Axis-aligned pixel rectangle.
///
/// While a drag is in progress `width`/`height` may be negative; `normalized`
/// moves the origin so both extents are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
}

impl Rect {
	pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
		Self {
			x: x,
			y: y,
			width: width,
			height: height,
		}
	}

	pub fn normalized(&self) -> Rect {
		let mut rect = *self;
		if rect.width < 0 {
			rect.x += rect.width;
			rect.width = -rect.width;
		}
		if rect.height < 0 {
			rect.y += rect.height;
			rect.height = -rect.height;
		}
		rect
	}

	/// Clip a normalized rect to a `frame_width` x `frame_height` frame.
	pub fn intersect(&self, frame_width: i32, frame_height: i32) -> Rect {
		let x0 = self.x.max(0);
		let y0 = self.y.max(0);
		let x1 = (self.x + self.width).min(frame_width);
		let y1 = (self.y + self.height).min(frame_height);
		Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
	}

	pub fn contains(&self, x: i32, y: i32) -> bool {
		x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
	}

	pub fn area(&self) -> i64 {
		self.width as i64 * self.height as i64
	}

	pub fn is_empty(&self) -> bool {
		self.width <= 0 || self.height <= 0
	}

	pub fn corners(&self) -> Quad {
		let (x0, y0) = (self.x as f32, self.y as f32);
		let (x1, y1) = ((self.x + self.width) as f32, (self.y + self.height) as f32);
		Quad([
			Point2D::new(x0, y0),
			Point2D::new(x1, y0),
			Point2D::new(x1, y1),
			Point2D::new(x0, y1),
		])
	}
}

/// Four corners ordered top-left, top-right, bottom-right, bottom-left of the
/// reference patch they were projected from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad(pub [Point2D; 4]);

impl Quad {
	pub fn corners(&self) -> &[Point2D; 4] {
		&self.0
	}

	pub fn is_finite(&self) -> bool {
		self.0.iter().all(Point2D::is_finite)
	}

	/// Largest distance any corner moved between `self` and `other`.
	pub fn max_displacement(&self, other: &Quad) -> f32 {
		self.0.iter().zip(other.0.iter()).map(|(a, b)| a.distance(b)).fold(0., f32::max)
	}

	pub fn bounding_rect(&self) -> Rect {
		let min_x = self.0.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
		let min_y = self.0.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
		let max_x = self.0.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
		let max_y = self.0.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
		let x = min_x.floor() as i32;
		let y = min_y.floor() as i32;
		Rect::new(x, y, max_x.ceil() as i32 - x, max_y.ceil() as i32 - y)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
	Down,
	Move,
	Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
	pub kind: PointerKind,
	pub x: i32,
	pub y: i32,
}

impl PointerEvent {
	pub fn new(kind: PointerKind, x: i32, y: i32) -> Self {
		Self { kind: kind, x: x, y: y }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	Quit,
	ToggleDenoise,
	ToggleContrast,
	ToggleEdges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
	Pointer(PointerEvent),
	Command(Command),
}

/// Supplies frames; `Ok(None)` marks the end of the stream.
pub trait InputModule {
	fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Shows a frame that already carries its overlays.
pub trait OutputModule {
	fn present(&mut self, frame: &Frame) -> Result<()>;

	/// Shows the region a new target was cut from. Outputs without a place
	/// for it keep the default, which drops it.
	fn present_patch(&mut self, _patch: &GrayImage) -> Result<()> {
		Ok(())
	}
}

/// Pointer and key events observed since the previous poll.
pub trait EventModule {
	fn poll(&mut self) -> Result<Vec<InputEvent>>;
}
