use ferrotrack::modules::selection::{Phase, Rejection, SelectionOutcome, SelectionStateMachine};
use ferrotrack::modules::tracking::{DropReason, FrameOutcome, SessionState, TrackState, TrackingSession};
use ferrotrack::modules::{InputEvent, PointerEvent, PointerKind};
use ferrotrack::settings::SelectionSettings;
use ferrotrack::{Frame, GrayImage, Pipeline, Rect, Settings};

#[allow(dead_code)]
#[path = "../src/test_utils.rs"]
mod test_utils;

use test_utils::textured;

fn selection(min_size: i32) -> SelectionStateMachine {
	let mut machine = SelectionStateMachine::new(&SelectionSettings {
		min_size: min_size,
		..Default::default()
	});
	machine.set_frame_size(640, 480);
	machine
}

fn pointer(kind: PointerKind, x: i32, y: i32) -> InputEvent {
	InputEvent::Pointer(PointerEvent::new(kind, x, y))
}

fn tracking_session(settings: &Settings, frame: &GrayImage, rect: Rect) -> TrackingSession {
	let mut session = TrackingSession::new(settings);
	let patch = session.create_patch(frame, rect).unwrap();
	session.on_selection_committed(patch);
	session
}

#[test]
fn scenario_drag_down_right() {
	let mut machine = selection(10);
	machine.on_pointer_down(50, 50);
	machine.on_pointer_move(150, 150);
	assert_eq!(machine.on_pointer_up(150, 150), SelectionOutcome::Committed(Rect::new(50, 50, 100, 100)));
}

#[test]
fn scenario_drag_up_left() {
	let mut machine = selection(10);
	machine.on_pointer_down(50, 50);
	machine.on_pointer_move(10, 10);
	assert_eq!(machine.on_pointer_up(10, 10), SelectionOutcome::Committed(Rect::new(10, 10, 40, 40)));
}

#[test]
fn scenario_too_small_selection() {
	let mut machine = selection(10);
	machine.on_pointer_down(100, 100);
	machine.on_pointer_move(105, 105);
	assert_eq!(
		machine.on_pointer_up(105, 105),
		SelectionOutcome::Rejected(Rejection::TooSmall {
			width: 5,
			height: 5,
			min_size: 10
		})
	);
	assert_eq!(machine.phase(), Phase::Idle);
	assert_eq!(machine.take_committed(), None);
}

#[test]
fn scenario_too_small_selection_creates_no_patch() {
	let mut pipeline = Pipeline::new(&Settings::default());
	let frame = Frame::from_gray(&textured(160, 120, 2));
	pipeline.process(&mut frame.clone());

	pipeline.handle_event(pointer(PointerKind::Down, 40, 40));
	pipeline.handle_event(pointer(PointerKind::Move, 45, 45));
	pipeline.handle_event(pointer(PointerKind::Up, 45, 45));

	let report = pipeline.process(&mut frame.clone());
	assert_eq!(report.commit, None);
	assert!(pipeline.session().patch().is_none());
	assert_eq!(pipeline.track_state(), TrackState::Idle);
}

#[test]
fn scenario_unmatched_frames_drop_target() {
	let mut settings = Settings::default();
	settings.tracking.miss_limit = 4;
	let frame = textured(200, 150, 31);
	let mut session = tracking_session(&settings, &frame, Rect::new(40, 30, 100, 80));
	let blank = GrayImage::filled(200, 150, 60);

	for misses in 1..4 {
		assert_eq!(session.on_frame(&blank), FrameOutcome::NotFound { misses: misses });
		assert_eq!(session.state(), SessionState::Tracking);
	}
	assert_eq!(session.on_frame(&blank), FrameOutcome::Dropped(DropReason::TooManyMisses));
	assert_eq!(session.state(), SessionState::NoTarget);
}

#[test]
fn scenario_unrelated_scenes_drop_target() {
	let mut settings = Settings::default();
	settings.features.max_keypoints = 5000;
	settings.tracking.miss_limit = 4;
	let frame = textured(200, 150, 31);
	let mut session = tracking_session(&settings, &frame, Rect::new(40, 30, 100, 80));

	// plenty of corners and descriptors, none of them from the patch
	for (misses, seed) in (1..4).zip([100, 200, 300]) {
		assert_eq!(session.on_frame(&textured(200, 150, seed)), FrameOutcome::NotFound { misses: misses });
		assert_eq!(session.track_state(), TrackState::Lost);
	}
	assert_eq!(session.on_frame(&textured(200, 150, 400)), FrameOutcome::Dropped(DropReason::TooManyMisses));
	assert_eq!(session.state(), SessionState::NoTarget);
}

#[test]
fn scenario_target_survives_unrelated_frame() {
	let mut settings = Settings::default();
	settings.features.max_keypoints = 5000;
	let frame = textured(200, 150, 31);
	let mut session = tracking_session(&settings, &frame, Rect::new(40, 30, 100, 80));

	assert_eq!(session.on_frame(&textured(200, 150, 500)), FrameOutcome::NotFound { misses: 1 });
	match session.on_frame(&frame) {
		FrameOutcome::Located { quad, .. } => assert!(quad.max_displacement(&Rect::new(40, 30, 100, 80).corners()) < 0.5),
		other => panic!("expected located, got {:?}", other),
	}
	assert_eq!(session.misses(), 0);
}

#[test]
fn scenario_static_frames_go_stale() {
	let mut settings = Settings::default();
	settings.features.max_keypoints = 5000;
	settings.tracking.stale_frame_limit = 5;
	let frame = textured(200, 150, 17);
	let mut session = tracking_session(&settings, &frame, Rect::new(50, 40, 90, 70));

	assert!(matches!(session.on_frame(&frame), FrameOutcome::Located { .. }));
	for _ in 1..5 {
		assert!(matches!(session.on_frame(&frame), FrameOutcome::Located { .. }));
		assert_eq!(session.state(), SessionState::Tracking);
	}
	assert_eq!(session.on_frame(&frame), FrameOutcome::Dropped(DropReason::Stale));
	assert_eq!(session.state(), SessionState::NoTarget);
	assert_eq!(session.track_state(), TrackState::Idle);
}

#[test]
fn scenario_select_and_track_through_pipeline() {
	let mut settings = Settings::default();
	settings.features.max_keypoints = 5000;
	let mut pipeline = Pipeline::new(&settings);
	let frame = Frame::from_gray(&textured(240, 180, 44));
	pipeline.process(&mut frame.clone());

	pipeline.handle_event(pointer(PointerKind::Down, 150, 130));
	pipeline.handle_event(pointer(PointerKind::Move, 60, 40));
	assert_eq!(pipeline.track_state(), TrackState::Selecting);
	pipeline.handle_event(pointer(PointerKind::Up, 60, 40));

	let report = pipeline.process(&mut frame.clone());
	assert_eq!(report.commit, Some(Ok(Rect::new(60, 40, 90, 90))));
	match report.outcome {
		FrameOutcome::Located { quad, inliers } => {
			assert!(inliers >= 8);
			assert!(quad.max_displacement(&Rect::new(60, 40, 90, 90).corners()) < 0.5);
		}
		other => panic!("expected located, got {:?}", other),
	}
}
