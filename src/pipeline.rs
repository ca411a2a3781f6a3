//! One owned object holding selection, tracking and preprocessing state, and
//! the frame loop that drives it.

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::modules::output::overlay;
use crate::modules::preprocess::{sobel_magnitude, Preprocessor};
use crate::modules::selection::{Rejection, SelectionOutcome, SelectionStateMachine};
use crate::modules::tracking::{FrameOutcome, TrackState, TrackingSession};
use crate::modules::{Command, EventModule, Frame, InputEvent, InputModule, OutputModule, PointerKind, Rect};
use crate::settings::Settings;
use crate::Result;

/// What happened while processing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
	/// A selection committed since the previous frame, and whether it became the target.
	pub commit: Option<std::result::Result<Rect, Rejection>>,
	pub outcome: FrameOutcome,
}

pub struct Pipeline {
	selection: SelectionStateMachine,
	session: TrackingSession,
	preprocessor: Preprocessor,
	quit: bool,
}

impl Pipeline {
	pub fn new(settings: &Settings) -> Self {
		Self {
			selection: SelectionStateMachine::new(&settings.selection),
			session: TrackingSession::new(settings),
			preprocessor: Preprocessor::new(&settings.display),
			quit: false,
		}
	}

	pub fn selection(&self) -> &SelectionStateMachine {
		&self.selection
	}

	pub fn session(&self) -> &TrackingSession {
		&self.session
	}

	pub fn preprocessor(&self) -> &Preprocessor {
		&self.preprocessor
	}

	pub fn quit_requested(&self) -> bool {
		self.quit
	}

	pub fn track_state(&self) -> TrackState {
		if self.selection.is_dragging() {
			TrackState::Selecting
		} else {
			self.session.track_state()
		}
	}

	/// Dispatch one event. Returns the rejection if a pointer event was refused.
	pub fn handle_event(&mut self, event: InputEvent) -> Option<Rejection> {
		match event {
			InputEvent::Pointer(pointer) => match self.selection.dispatch(pointer) {
				SelectionOutcome::Rejected(rejection) => {
					warn!(%rejection, "selection rejected");
					Some(rejection)
				}
				SelectionOutcome::Committed(rect) => {
					info!(?rect, "selection committed");
					None
				}
				_ => None,
			},
			InputEvent::Command(Command::Quit) => {
				self.quit = true;
				None
			}
			InputEvent::Command(command) => {
				self.preprocessor.toggle(command);
				None
			}
		}
	}

	/// Track on `frame` and draw the overlays into it.
	pub fn process(&mut self, frame: &mut Frame) -> FrameReport {
		self.selection.set_frame_size(frame.width() as i32, frame.height() as i32);
		let gray = self.preprocessor.apply(frame.to_gray());

		let commit = self.selection.take_committed().map(|rect| -> std::result::Result<Rect, Rejection> {
			let patch = self.session.create_patch(&gray, rect).map_err(|rejection| {
				// previous target, if any, stays active
				warn!(%rejection, "selection rejected");
				rejection
			})?;
			let rect = patch.rect();
			self.session.on_selection_committed(patch);
			Ok(rect)
		});

		let outcome = self.session.on_frame(&gray);
		debug!(?outcome, "frame processed");

		if self.preprocessor.edges {
			overlay::draw_edges(frame, &sobel_magnitude(&gray), self.preprocessor.edge_threshold(), overlay::YELLOW);
		}
		if self.selection.is_dragging() {
			overlay::draw_rect(frame, self.selection.state().rect, overlay::GREEN);
		}
		if let FrameOutcome::Located { quad, .. } = outcome {
			overlay::draw_quad(frame, &quad, overlay::RED, 2);
		}

		FrameReport {
			commit: commit,
			outcome: outcome,
		}
	}
}

/// Drive `pipeline` until quit is requested or `input` runs out of frames.
pub fn run(input: &mut dyn InputModule, output: &mut dyn OutputModule, events: &mut dyn EventModule, pipeline: &mut Pipeline) -> Result<()> {
	let mut frames = 0usize;
	loop {
		for event in coalesce_moves(events.poll()?) {
			pipeline.handle_event(event);
		}
		if pipeline.quit_requested() {
			info!(frames, "quit requested");
			return Ok(());
		}

		let mut frame = match input.next_frame()? {
			Some(frame) => frame,
			None => {
				info!(frames, "input exhausted");
				return Ok(());
			}
		};
		let report = pipeline.process(&mut frame);
		if let (Some(Ok(_)), Some(patch)) = (report.commit, pipeline.session().patch()) {
			output.present_patch(patch.image())?;
		}
		output.present(&frame)?;
		frames += 1;
	}
}

/// Collapse runs of pointer moves to the last one; everything else is kept.
pub fn coalesce_moves(events: Vec<InputEvent>) -> Vec<InputEvent> {
	let is_move = |event: &InputEvent| matches!(event, InputEvent::Pointer(p) if p.kind == PointerKind::Move);
	events
		.into_iter()
		.coalesce(|prev, next| if is_move(&prev) && is_move(&next) { Ok(next) } else { Err((prev, next)) })
		.collect()
}
