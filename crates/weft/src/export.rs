//! Rendering of a [`Diagram`](crate::diagram::Diagram) to output formats.
//!
//! The core itself never draws: it exposes block ports, highlighted ports,
//! connection paths, segments, control points and visual states. Exporters
//! in this module consume that geometry read-only.
//!
//! # Available Backends
//!
//! - [`svg`] - SVG output via [`svg::Svg`]

/// SVG export backend.
pub mod svg;
