use std::sync::mpsc::{self, Receiver};

use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::highgui;
use opencv::prelude::*;

use crate::modules::{Command, EventModule, Frame, GrayImage, InputEvent, OutputModule, PointerEvent, PointerKind};
use crate::settings::DisplaySettings;
use crate::Result;

const KEY_ESC: i32 = 27;

/// Shows frames in a highgui window, and each new target in a second one.
pub struct WindowOutput {
	name: String,
	patch_name: String,
}

/// Mouse events forwarded from the window's callback, plus polled keys.
pub struct WindowEvents {
	rx: Receiver<PointerEvent>,
	wait_ms: i32,
}

/// Create the window and wire its mouse callback to the returned event source.
pub fn open(settings: &DisplaySettings) -> Result<(WindowOutput, WindowEvents)> {
	highgui::named_window(&settings.window, highgui::WINDOW_AUTOSIZE)?;

	let (tx, rx) = mpsc::channel();
	highgui::set_mouse_callback(
		&settings.window,
		Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
			let kind = match event {
				highgui::EVENT_LBUTTONDOWN => PointerKind::Down,
				highgui::EVENT_MOUSEMOVE => PointerKind::Move,
				highgui::EVENT_LBUTTONUP => PointerKind::Up,
				_ => return,
			};
			// receiver gone means the loop is shutting down
			let _ = tx.send(PointerEvent::new(kind, x, y));
		})),
	)?;

	Ok((
		WindowOutput {
			name: settings.window.clone(),
			patch_name: settings.patch_window.clone(),
		},
		WindowEvents {
			rx: rx,
			wait_ms: settings.wait_ms.max(1),
		},
	))
}

impl OutputModule for WindowOutput {
	fn present(&mut self, frame: &Frame) -> Result<()> {
		let mat = frame_to_mat(frame)?;
		highgui::imshow(&self.name, &mat)?;
		Ok(())
	}

	fn present_patch(&mut self, patch: &GrayImage) -> Result<()> {
		// imshow opens the window on first use
		let mat = frame_to_mat(&Frame::from_gray(patch))?;
		highgui::imshow(&self.patch_name, &mat)?;
		Ok(())
	}
}

impl EventModule for WindowEvents {
	fn poll(&mut self) -> Result<Vec<InputEvent>> {
		// wait_key also pumps the GUI, which is what runs the mouse callback
		let key = highgui::wait_key(self.wait_ms)?;

		let mut events: Vec<InputEvent> = self.rx.try_iter().map(InputEvent::Pointer).collect();
		if let Some(command) = key_command(key) {
			events.push(InputEvent::Command(command));
		}
		Ok(events)
	}
}

fn key_command(key: i32) -> Option<Command> {
	if key < 0 {
		return None;
	}
	match key & 0xff {
		KEY_ESC => Some(Command::Quit),
		k if k == 'q' as i32 => Some(Command::Quit),
		k if k == 'n' as i32 => Some(Command::ToggleDenoise),
		k if k == 'c' as i32 => Some(Command::ToggleContrast),
		k if k == 'e' as i32 => Some(Command::ToggleEdges),
		_ => None,
	}
}

/// Copy an RGB [`Frame`] into a BGR `Mat`.
pub fn frame_to_mat(frame: &Frame) -> Result<Mat> {
	let mut mat = Mat::new_rows_cols_with_default(frame.height() as i32, frame.width() as i32, CV_8UC3, Scalar::all(0.))?;
	for (dst, src) in mat.data_bytes_mut()?.chunks_exact_mut(3).zip(frame.data().chunks_exact(3)) {
		dst.copy_from_slice(&[src[2], src[1], src[0]]);
	}
	Ok(mat)
}
