mod patch;
mod session;

pub use self::patch::ReferencePatch;
pub use self::session::TrackingSession;

use crate::modules::Quad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	NoTarget,
	Tracking,
}

/// What the user sees for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackState {
	Idle,
	Selecting,
	Located(Quad),
	Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
	TooManyMisses,
	/// The quad stopped moving, which usually means a static false match.
	Stale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
	/// No target to track.
	Idle,
	Located { quad: Quad, inliers: usize },
	NotFound { misses: u32 },
	Dropped(DropReason),
}
