use tracing::{debug, info, warn};

use super::{DropReason, FrameOutcome, ReferencePatch, SessionState, TrackState};
use crate::modules::features::{FastExtractor, FeatureExtractor};
use crate::modules::geometry::{Estimate, GeometryEstimator};
use crate::modules::matching::Matcher;
use crate::modules::selection::Rejection;
use crate::modules::{GrayImage, Quad, Rect};
use crate::settings::Settings;

/// Per-frame re-acquisition of a single reference patch.
pub struct TrackingSession {
	extractor: Box<dyn FeatureExtractor>,
	matcher: Matcher,
	estimator: GeometryEstimator,

	min_keypoints: usize,
	miss_limit: u32,
	stale_frame_limit: u32,
	stale_tolerance: f32,

	state: SessionState,
	track: TrackState,
	patch: Option<ReferencePatch>,
	misses: u32,
	stale_frames: u32,
	last_quad: Option<Quad>,
}

impl TrackingSession {
	pub fn new(settings: &Settings) -> Self {
		Self {
			extractor: Box::new(FastExtractor::new(&settings.features)),
			matcher: Matcher::new(&settings.matching),
			estimator: GeometryEstimator::new(&settings.geometry),

			min_keypoints: settings.selection.min_keypoints,
			miss_limit: settings.tracking.miss_limit.max(1),
			stale_frame_limit: settings.tracking.stale_frame_limit,
			stale_tolerance: settings.tracking.stale_tolerance,

			state: SessionState::NoTarget,
			track: TrackState::Idle,
			patch: None,
			misses: 0,
			stale_frames: 0,
			last_quad: None,
		}
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn track_state(&self) -> TrackState {
		self.track
	}

	pub fn patch(&self) -> Option<&ReferencePatch> {
		self.patch.as_ref()
	}

	pub fn misses(&self) -> u32 {
		self.misses
	}

	pub fn create_patch(&self, frame: &GrayImage, rect: Rect) -> Result<ReferencePatch, Rejection> {
		ReferencePatch::new(frame, rect, self.extractor.as_ref(), self.min_keypoints)
	}

	/// Start tracking `patch`, replacing any current target.
	pub fn on_selection_committed(&mut self, patch: ReferencePatch) {
		info!(rect = ?patch.rect(), keypoints = patch.features().len(), "tracking new target");
		self.patch = Some(patch);
		self.state = SessionState::Tracking;
		self.track = TrackState::Lost;
		self.misses = 0;
		self.stale_frames = 0;
		self.last_quad = None;
	}

	pub fn clear(&mut self) {
		self.patch = None;
		self.state = SessionState::NoTarget;
		self.track = TrackState::Idle;
		self.misses = 0;
		self.stale_frames = 0;
		self.last_quad = None;
	}

	pub fn on_frame(&mut self, frame: &GrayImage) -> FrameOutcome {
		let estimate = match &self.patch {
			Some(patch) if self.state == SessionState::Tracking => {
				let scene = self.extractor.extract(frame);
				// reference is always the query side
				let matches = self.matcher.match_sets(patch.features(), &scene);
				debug!(scene_keypoints = scene.len(), matches = matches.len(), "matched frame");
				self.estimator.estimate(&matches, patch.features().keypoints(), scene.keypoints(), &patch.corners())
			}
			_ => return FrameOutcome::Idle,
		};

		match estimate {
			Estimate::Located { quad, inliers, .. } => self.on_located(quad, inliers),
			Estimate::Insufficient => self.on_missed(),
		}
	}

	fn on_located(&mut self, quad: Quad, inliers: usize) -> FrameOutcome {
		self.misses = 0;

		let unchanged = self.last_quad.map_or(false, |last| last.max_displacement(&quad) <= self.stale_tolerance);
		self.stale_frames = if unchanged { self.stale_frames + 1 } else { 0 };
		self.last_quad = Some(quad);

		if self.stale_frame_limit > 0 && self.stale_frames >= self.stale_frame_limit {
			warn!(frames = self.stale_frames, "target has not moved, dropping it");
			self.clear();
			return FrameOutcome::Dropped(DropReason::Stale);
		}

		self.track = TrackState::Located(quad);
		debug!(bounds = ?quad.bounding_rect(), inliers, "target located");
		FrameOutcome::Located {
			quad: quad,
			inliers: inliers,
		}
	}

	fn on_missed(&mut self) -> FrameOutcome {
		self.misses += 1;
		self.stale_frames = 0;

		if self.misses >= self.miss_limit {
			warn!(misses = self.misses, "target lost, dropping it");
			self.clear();
			return FrameOutcome::Dropped(DropReason::TooManyMisses);
		}

		self.track = TrackState::Lost;
		FrameOutcome::NotFound { misses: self.misses }
	}
}
