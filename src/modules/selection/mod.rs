//! Pointer-driven rectangle selection.
//!
//! `Idle -> Dragging -> Committed -> Idle`. A commit is held until the frame
//! loop takes it with [`SelectionStateMachine::take_committed`], so the patch
//! is always cut from the frame being processed.

use std::fmt;

use tracing::{debug, warn};

use crate::modules::{PointerEvent, PointerKind, Rect};
use crate::settings::SelectionSettings;

/// Why a selection did not become a tracking target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
	OutOfBounds { x: i32, y: i32 },
	TooSmall { width: i32, height: i32, min_size: i32 },
	InsufficientFeatures { found: usize, required: usize },
}

impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Rejection::OutOfBounds { x, y } => write!(f, "pointer at ({}, {}) is outside the frame", x, y),
			Rejection::TooSmall { width, height, min_size } => write!(f, "selection too small: {}x{}, need at least {}x{}", width, height, min_size, min_size),
			Rejection::InsufficientFeatures { found, required } => write!(f, "insufficient features: found {}, need {}", found, required),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Dragging,
	Committed(Rect),
}

/// Snapshot for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
	pub dragging: bool,
	pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
	Ignored,
	Started,
	Updated,
	Committed(Rect),
	Rejected(Rejection),
}

pub struct SelectionStateMachine {
	min_size: i32,
	frame_width: i32,
	frame_height: i32,
	phase: Phase,
	rect: Rect,
}

impl SelectionStateMachine {
	pub fn new(settings: &SelectionSettings) -> Self {
		Self {
			min_size: settings.min_size,
			frame_width: 0,
			frame_height: 0,
			phase: Phase::Idle,
			rect: Rect::default(),
		}
	}

	pub fn set_frame_size(&mut self, width: i32, height: i32) {
		self.frame_width = width;
		self.frame_height = height;
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn is_dragging(&self) -> bool {
		self.phase == Phase::Dragging
	}

	pub fn state(&self) -> SelectionState {
		SelectionState {
			dragging: self.is_dragging(),
			rect: self.rect,
		}
	}

	pub fn dispatch(&mut self, event: PointerEvent) -> SelectionOutcome {
		match event.kind {
			PointerKind::Down => self.on_pointer_down(event.x, event.y),
			PointerKind::Move => self.on_pointer_move(event.x, event.y),
			PointerKind::Up => self.on_pointer_up(event.x, event.y),
		}
	}

	pub fn on_pointer_down(&mut self, x: i32, y: i32) -> SelectionOutcome {
		if x < 0 || y < 0 || x >= self.frame_width || y >= self.frame_height {
			debug!(x, y, "pointer down outside frame");
			return SelectionOutcome::Rejected(Rejection::OutOfBounds { x: x, y: y });
		}
		let (x, y) = self.clamp(x, y);
		self.rect = Rect::new(x, y, 0, 0);
		self.phase = Phase::Dragging;
		SelectionOutcome::Started
	}

	pub fn on_pointer_move(&mut self, x: i32, y: i32) -> SelectionOutcome {
		if self.phase != Phase::Dragging {
			return SelectionOutcome::Ignored;
		}
		let (x, y) = self.clamp(x, y);
		self.rect.width = x - self.rect.x;
		self.rect.height = y - self.rect.y;
		SelectionOutcome::Updated
	}

	pub fn on_pointer_up(&mut self, x: i32, y: i32) -> SelectionOutcome {
		if self.phase != Phase::Dragging {
			return SelectionOutcome::Ignored;
		}
		self.on_pointer_move(x, y);
		self.rect = self.rect.normalized();

		if self.rect.width < self.min_size || self.rect.height < self.min_size {
			let rejection = Rejection::TooSmall {
				width: self.rect.width,
				height: self.rect.height,
				min_size: self.min_size,
			};
			warn!("{}", rejection);
			self.phase = Phase::Idle;
			return SelectionOutcome::Rejected(rejection);
		}

		let rect = self.rect.intersect(self.frame_width, self.frame_height);
		self.rect = rect;
		self.phase = Phase::Committed(rect);
		SelectionOutcome::Committed(rect)
	}

	/// Hand over a pending commit, returning to `Idle`.
	pub fn take_committed(&mut self) -> Option<Rect> {
		match self.phase {
			Phase::Committed(rect) => {
				self.phase = Phase::Idle;
				Some(rect)
			}
			_ => None,
		}
	}

	fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
		(x.clamp(0, self.frame_width.max(0)), y.clamp(0, self.frame_height.max(0)))
	}
}
