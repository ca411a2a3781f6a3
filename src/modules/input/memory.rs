use std::collections::VecDeque;

use crate::modules::{Frame, InputModule};
use crate::Result;

/// Frames held in memory, handed out in order until the queue runs dry.
#[derive(Debug, Default)]
pub struct FrameQueue {
	frames: VecDeque<Frame>,
}

impl FrameQueue {
	pub fn new<I: IntoIterator<Item = Frame>>(frames: I) -> Self {
		Self {
			frames: frames.into_iter().collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}

impl InputModule for FrameQueue {
	fn next_frame(&mut self) -> Result<Option<Frame>> {
		Ok(self.frames.pop_front())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_frames_come_out_in_order_then_end() {
		let mut queue = FrameQueue::new(vec![Frame::new(1, 1), Frame::new(2, 1), Frame::new(3, 1)]);
		assert_eq!(queue.len(), 3);
		assert_eq!(queue.next_frame().unwrap().map(|f| f.width()), Some(1));
		assert_eq!(queue.next_frame().unwrap().map(|f| f.width()), Some(2));
		assert_eq!(queue.next_frame().unwrap().map(|f| f.width()), Some(3));
		assert!(queue.next_frame().unwrap().is_none());
		assert!(queue.is_empty());
	}
}
