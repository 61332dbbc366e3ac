//! CLI logic for the Weft schematic renderer.
//!
//! Reads a scene file, replays it through the Weft core and writes the routed
//! schematic as SVG.

pub mod error_adapter;
pub mod scene;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use weft::{WeftError, export::svg::Svg};

use scene::Scene;

/// Run the Weft CLI application
///
/// # Errors
///
/// Returns `WeftError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid scenes
/// - Rejected diagram operations
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), WeftError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing scene"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let diagram = Scene::parse(&source)?.build(app_config.routing().clone())?;
    Svg::new(&app_config)?.write(&diagram, &args.output)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
