//! Configuration types for wire routing and rendering.
//!
//! All types implement [`serde::Deserialize`] with every field defaulted, so a
//! configuration file only needs to name the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining routing and style settings.
//! - [`RoutingConfig`] - Clearances, hit-test radii and minimum sizes used by the core.
//! - [`StyleConfig`] - Colors used by the SVG renderer.
//!
//! # Example
//!
//! ```
//! # use weft::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.routing().port_spacing(), 20.0);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use weft_core::{color::Color, geometry::Size};

/// Top-level configuration combining routing and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Routing and interaction section.
    #[serde(default)]
    routing: RoutingConfig,

    /// Style section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    pub fn new(routing: RoutingConfig, style: StyleConfig) -> Self {
        Self { routing, style }
    }

    /// Returns the routing configuration.
    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Geometry constants of the routing core.
///
/// Hit-test radii are deliberately larger than the drawn radii: ports and
/// control points are easier to grab than to see.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Minimum clearance of orthogonal routes around a port.
    port_spacing: f32,
    /// Drawn radius of a port anchor.
    port_radius: f32,
    /// Multiplier applied to `port_radius` for hit testing.
    port_detect_factor: f32,
    /// Distance under which a wire endpoint counts as sitting on a port.
    port_match_epsilon: f32,
    /// Axis delta under which a segment counts as horizontal or vertical.
    axis_threshold: f32,
    /// Maximum perpendicular distance for a segment hit.
    segment_detect_distance: f32,
    /// Drawn radius of a control point.
    control_point_radius: f32,
    /// Multiplier applied to `control_point_radius` for hit testing.
    control_point_detect_factor: f32,
    /// Number of samples used when projecting onto a path.
    path_samples: usize,
    /// Edge length of the resize handle square.
    resize_handle_size: f32,
    /// Minimum width a resize gesture may produce.
    resize_min_width: f32,
    /// Minimum height a resize gesture may produce.
    resize_min_height: f32,
    /// Absolute minimum block width.
    block_min_width: f32,
    /// Absolute minimum block height.
    block_min_height: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            port_spacing: 20.0,
            port_radius: 4.0,
            port_detect_factor: 2.5,
            port_match_epsilon: 0.5,
            axis_threshold: 1.0,
            segment_detect_distance: 6.0,
            control_point_radius: 5.0,
            control_point_detect_factor: 2.0,
            path_samples: 100,
            resize_handle_size: 10.0,
            resize_min_width: 40.0,
            resize_min_height: 30.0,
            block_min_width: 60.0,
            block_min_height: 40.0,
        }
    }
}

impl RoutingConfig {
    pub fn port_spacing(&self) -> f32 {
        self.port_spacing
    }

    /// Sets the orthogonal clearance (builder style).
    pub fn with_port_spacing(mut self, port_spacing: f32) -> Self {
        self.port_spacing = port_spacing;
        self
    }

    pub fn port_radius(&self) -> f32 {
        self.port_radius
    }

    /// Radius within which a pointer grabs a port.
    pub fn port_detect_radius(&self) -> f32 {
        self.port_radius * self.port_detect_factor
    }

    pub fn port_match_epsilon(&self) -> f32 {
        self.port_match_epsilon
    }

    pub fn axis_threshold(&self) -> f32 {
        self.axis_threshold
    }

    pub fn segment_detect_distance(&self) -> f32 {
        self.segment_detect_distance
    }

    pub fn control_point_radius(&self) -> f32 {
        self.control_point_radius
    }

    /// Radius within which a pointer grabs a control point.
    pub fn control_point_detect_radius(&self) -> f32 {
        self.control_point_radius * self.control_point_detect_factor
    }

    pub fn path_samples(&self) -> usize {
        self.path_samples.max(1)
    }

    pub fn resize_handle_size(&self) -> f32 {
        self.resize_handle_size
    }

    /// Smallest size a resize gesture may produce.
    pub fn resize_min_size(&self) -> Size {
        Size::new(self.resize_min_width, self.resize_min_height)
    }

    /// Smallest size a block may have.
    pub fn block_min_size(&self) -> Size {
        Size::new(self.block_min_width, self.block_min_height)
    }

    /// Sets the absolute block minimum (builder style).
    pub fn with_block_min_size(mut self, size: Size) -> Self {
        self.block_min_width = size.width();
        self.block_min_height = size.height();
        self
    }
}

/// Colors used by the SVG renderer.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background color, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Wire color for connections without a custom color.
    #[serde(default)]
    wire_color: Option<String>,

    /// Color of unconnected ports.
    #[serde(default)]
    port_color: Option<String>,
}

impl StyleConfig {
    /// Sets the background color string (builder style).
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Sets the default wire color string (builder style).
    pub fn with_wire_color(mut self, color: impl Into<String>) -> Self {
        self.wire_color = Some(color.into());
        self
    }

    /// Sets the neutral port color string (builder style).
    pub fn with_port_color(mut self, color: impl Into<String>) -> Self {
        self.port_color = Some(color.into());
        self
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_optional(self.background_color.as_deref(), "background")
    }

    /// Returns the parsed default wire [`Color`], or `None` if not configured.
    pub fn wire_color(&self) -> Result<Option<Color>, String> {
        parse_optional(self.wire_color.as_deref(), "wire")
    }

    /// Returns the parsed neutral port [`Color`], or `None` if not configured.
    pub fn port_color(&self) -> Result<Option<Color>, String> {
        parse_optional(self.port_color.as_deref(), "port")
    }
}

fn parse_optional(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}
