pub mod overlay;

#[cfg(feature = "opencv")]
mod window;
#[cfg(feature = "opencv")]
pub use self::window::{frame_to_mat, open, WindowEvents, WindowOutput};
