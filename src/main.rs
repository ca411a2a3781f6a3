use anyhow::{Context, Result};

use tracing::info;
use tracing_subscriber::EnvFilter;

use std::env;
use std::path::Path;

use ferrotrack::modules::input;
use ferrotrack::modules::output;
use ferrotrack::pipeline::{self, Pipeline};
use ferrotrack::Settings;

const DEFAULT_SETTINGS: &str = "track.toml";

// Main
fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	//Load Tracking Settings
	let settings = match env::args().nth(1) {
		Some(path) => Settings::load(&path).with_context(|| format!("loading {}", path))?,
		None if Path::new(DEFAULT_SETTINGS).exists() => Settings::load(DEFAULT_SETTINGS).with_context(|| format!("loading {}", DEFAULT_SETTINGS))?,
		None => Settings::default(),
	};

	//Input Module
	let mut input = input::from_settings(&settings.input).context("opening input")?;

	//Output Window
	let (mut window, mut events) = output::open(&settings.display).context("opening window")?;

	let mut pipeline = Pipeline::new(&settings);

	info!("drag a rectangle to select a target; n/c/e toggle denoise/contrast/edges, q or esc quits");

	//Main Tracking Loop
	pipeline::run(input.as_mut(), &mut window, &mut events, &mut pipeline)?;

	Ok(())
}
