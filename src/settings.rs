use serde::Deserialize;

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Smallest number of correspondences a perspective transform can be fit from.
pub const MIN_HOMOGRAPHY_POINTS: usize = 4;

/// Tracking settings, read from a TOML file such as `track.toml`.
///
/// Every section and field is optional; missing values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
	pub input: InputSettings,
	pub selection: SelectionSettings,
	pub features: FeatureSettings,
	pub matching: MatchSettings,
	pub geometry: GeometrySettings,
	pub tracking: TrackingSettings,
	pub display: DisplaySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
	Camera,
	Video,
	Image,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputSettings {
	pub source: SourceKind,
	pub camera_index: i32,
	pub path: Option<String>,
	pub width: Option<u32>,
	pub height: Option<u32>,
	pub fps: Option<u32>,
}

impl Default for InputSettings {
	fn default() -> Self {
		Self {
			source: SourceKind::Camera,
			camera_index: 0,
			path: None,
			width: None,
			height: None,
			fps: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
	/// Smallest accepted selection width and height, in pixels.
	pub min_size: i32,
	/// Fewest keypoints a committed patch must yield.
	pub min_keypoints: usize,
}

impl Default for SelectionSettings {
	fn default() -> Self {
		Self {
			min_size: 10,
			min_keypoints: 4,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
	/// FAST intensity threshold; higher rejects more low-contrast noise.
	pub threshold: u8,
	pub max_keypoints: usize,
}

impl Default for FeatureSettings {
	fn default() -> Self {
		Self {
			threshold: 20,
			max_keypoints: 500,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
	/// Keep correspondences closer than `distance_multiplier * min_distance`.
	pub distance_multiplier: f32,
	/// Lower bound on `min_distance` so the filter never collapses to zero.
	pub min_distance_floor: f32,
}

impl Default for MatchSettings {
	fn default() -> Self {
		Self {
			distance_multiplier: 3.0,
			min_distance_floor: 1e-3,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
	pub min_correspondences: usize,
	/// Fewest inliers a fit needs before it counts as a sighting.
	pub min_inliers: usize,
	/// Smallest share of the filtered correspondences that must be inliers.
	pub min_inlier_ratio: f64,
	/// Maximum reprojection error, in pixels, for a RANSAC inlier.
	pub ransac_threshold: f64,
	pub max_iterations: usize,
	pub seed: u64,
}

impl Default for GeometrySettings {
	fn default() -> Self {
		Self {
			min_correspondences: MIN_HOMOGRAPHY_POINTS,
			min_inliers: 8,
			min_inlier_ratio: 0.25,
			ransac_threshold: 3.0,
			max_iterations: 500,
			seed: 0x5eed,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
	/// Consecutive unchanged located frames before the target is dropped; 0 disables.
	pub stale_frame_limit: u32,
	/// Largest corner movement, in pixels, still counted as unchanged.
	pub stale_tolerance: f32,
	/// Consecutive frames without a fit before the target is dropped.
	pub miss_limit: u32,
}

impl Default for TrackingSettings {
	fn default() -> Self {
		Self {
			stale_frame_limit: 60,
			stale_tolerance: 0.5,
			miss_limit: 30,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
	pub window: String,
	/// Window showing the region each new target was cut from.
	pub patch_window: String,
	/// Milliseconds to wait for keys and pointer events each frame.
	pub wait_ms: i32,
	pub edge_threshold: f32,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			window: String::from("ferrotrack"),
			patch_window: String::from("region of interest"),
			wait_ms: 10,
			edge_threshold: 120.,
		}
	}
}

impl Settings {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	pub fn from_toml(content: &str) -> Result<Self> {
		let settings: Settings = toml::from_str(content)?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn validate(&self) -> Result<()> {
		if self.selection.min_size < 1 {
			return Err(Error::InvalidConfig(format!("selection.min_size must be at least 1, got {}", self.selection.min_size)));
		}
		if !(self.matching.distance_multiplier > 1.) {
			return Err(Error::InvalidConfig(format!("matching.distance_multiplier must be greater than 1, got {}", self.matching.distance_multiplier)));
		}
		if !(self.matching.min_distance_floor > 0.) {
			return Err(Error::InvalidConfig(format!("matching.min_distance_floor must be positive, got {}", self.matching.min_distance_floor)));
		}
		if self.geometry.min_correspondences < MIN_HOMOGRAPHY_POINTS {
			return Err(Error::InvalidConfig(format!(
				"geometry.min_correspondences must be at least {}, got {}",
				MIN_HOMOGRAPHY_POINTS, self.geometry.min_correspondences
			)));
		}
		if self.geometry.min_inliers < MIN_HOMOGRAPHY_POINTS {
			return Err(Error::InvalidConfig(format!(
				"geometry.min_inliers must be at least {}, got {}",
				MIN_HOMOGRAPHY_POINTS, self.geometry.min_inliers
			)));
		}
		if !(0. ..=1.).contains(&self.geometry.min_inlier_ratio) {
			return Err(Error::InvalidConfig(format!("geometry.min_inlier_ratio must be within 0 and 1, got {}", self.geometry.min_inlier_ratio)));
		}
		if !(self.geometry.ransac_threshold > 0.) {
			return Err(Error::InvalidConfig(format!("geometry.ransac_threshold must be positive, got {}", self.geometry.ransac_threshold)));
		}
		if self.tracking.miss_limit == 0 {
			return Err(Error::InvalidConfig(String::from("tracking.miss_limit must be at least 1")));
		}
		if self.input.source != SourceKind::Camera && self.input.path.is_none() {
			return Err(Error::InvalidConfig(String::from("input.path is required for video and image sources")));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.selection.min_size, 10);
		assert_eq!(settings.geometry.min_correspondences, 4);
		assert_eq!(settings.matching.distance_multiplier, 3.0);
	}

	#[test]
	fn test_partial_file_keeps_defaults() {
		let settings = Settings::from_toml(
			r#"
			[selection]
			min_size = 16

			[tracking]
			miss_limit = 5
			"#,
		)
		.unwrap();

		assert_eq!(settings.selection.min_size, 16);
		assert_eq!(settings.selection.min_keypoints, 4);
		assert_eq!(settings.tracking.miss_limit, 5);
		assert_eq!(settings.tracking.stale_frame_limit, 60);
		assert_eq!(settings.input.source, SourceKind::Camera);
	}

	#[test]
	fn test_image_source_needs_path() {
		let err = Settings::from_toml("[input]\nsource = \"image\"\n").unwrap_err();
		assert!(matches!(err, Error::InvalidConfig(_)));

		let settings = Settings::from_toml("[input]\nsource = \"image\"\npath = \"lena.tif\"\n").unwrap();
		assert_eq!(settings.input.path.as_deref(), Some("lena.tif"));
	}

	#[test]
	fn test_rejects_fewer_than_four_correspondences() {
		let err = Settings::from_toml("[geometry]\nmin_correspondences = 3\n").unwrap_err();
		assert!(err.to_string().contains("min_correspondences"));
	}

	#[test]
	fn test_inlier_gate_bounds() {
		let err = Settings::from_toml("[geometry]\nmin_inliers = 3\n").unwrap_err();
		assert!(err.to_string().contains("min_inliers"));
		assert!(Settings::from_toml("[geometry]\nmin_inlier_ratio = 1.5\n").is_err());
		assert!(Settings::from_toml("[geometry]\nmin_inlier_ratio = -0.1\n").is_err());

		let settings = Settings::from_toml("[geometry]\nmin_inliers = 12\nmin_inlier_ratio = 0.5\n").unwrap();
		assert_eq!(settings.geometry.min_inliers, 12);
		assert_eq!(settings.geometry.min_inlier_ratio, 0.5);
	}

	#[test]
	fn test_rejects_non_permissive_multiplier() {
		assert!(Settings::from_toml("[matching]\ndistance_multiplier = 1.0\n").is_err());
		assert!(Settings::from_toml("[matching]\ndistance_multiplier = 5.0\n").is_ok());
	}

	#[test]
	fn test_malformed_toml_is_a_parse_error() {
		let err = Settings::from_toml("[selection\nmin_size = 3").unwrap_err();
		assert!(matches!(err, Error::SettingsParse(_)));
	}
}
