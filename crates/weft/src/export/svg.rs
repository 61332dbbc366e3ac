//! SVG rendering of a diagram.

use std::{fs, path::Path as FsPath};

use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use weft_core::{
    color::Color,
    geometry::{Bounds, Point},
};

use crate::{
    block::Block,
    config::AppConfig,
    connection::{Connection, VisualState},
    diagram::Diagram,
    error::WeftError,
    ports::{PortRef, PortSide},
};

const MARGIN: f32 = 50.0;
const WIRE_WIDTH: f32 = 2.0;
const GLOW_WIDTH: f32 = 8.0;
const GLOW_OPACITY: f32 = 0.35;
const LOCKED_OPACITY: f32 = 0.6;
const SEGMENT_HANDLE_DISTANCE: f32 = 8.0;
const SEGMENT_HANDLE_SIZE: f32 = 6.0;
const FONT_SIZE: f32 = 12.0;

/// Colors resolved from the style configuration.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    wire: Color,
    port: Color,
    error: Color,
    block_fill: Color,
    block_stroke: Color,
}

impl Palette {
    fn from_config(config: &AppConfig) -> Result<Self, WeftError> {
        let style = config.style();
        Ok(Self {
            background: configured_or(style.background_color(), "white")?,
            wire: configured_or(style.wire_color(), "#333333")?,
            port: configured_or(style.port_color(), "#9e9e9e")?,
            error: configured_or(Ok(None), "#d32f2f")?,
            block_fill: configured_or(Ok(None), "#fafafa")?,
            block_stroke: configured_or(Ok(None), "#424242")?,
        })
    }
}

fn configured_or(configured: Result<Option<Color>, String>, fallback: &str) -> Result<Color, WeftError> {
    match configured.map_err(WeftError::Config)? {
        Some(color) => Ok(color),
        None => Color::new(fallback).map_err(WeftError::Config),
    }
}

/// SVG exporter.
///
/// Draws blocks with their ports and resize handles, then wires with their
/// glow, control points, labels and the selected segment's drag handles.
#[derive(Debug, Clone)]
pub struct Svg {
    palette: Palette,
    port_radius: f32,
    control_point_radius: f32,
    resize_handle_size: f32,
}

impl Svg {
    /// Creates an exporter from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::Config`] if a configured color cannot be parsed.
    pub fn new(config: &AppConfig) -> Result<Self, WeftError> {
        let routing = config.routing();
        Ok(Self {
            palette: Palette::from_config(config)?,
            port_radius: routing.port_radius(),
            control_point_radius: routing.control_point_radius(),
            resize_handle_size: routing.resize_handle_size(),
        })
    }

    /// Renders the whole diagram to an SVG document.
    pub fn render(&self, diagram: &Diagram) -> Document {
        let bounds = Self::content_bounds(diagram).expand(MARGIN);
        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.width(),
                    bounds.height()
                ),
            )
            .set("width", bounds.width())
            .set("height", bounds.height());

        doc = doc.add(
            svg_element::Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", self.palette.background.to_string()),
        );

        for block in diagram.blocks() {
            doc = doc.add(self.render_block(block));
        }
        for connection in diagram.connections() {
            doc = doc.add(self.render_connection(connection));
        }
        for block in diagram.blocks() {
            doc = doc.add(self.render_ports(diagram, block));
        }

        debug!(
            blocks = diagram.blocks().count(),
            connections = diagram.connections().count();
            "SVG document rendered"
        );
        doc
    }

    /// Renders the diagram and returns the SVG markup.
    pub fn render_to_string(&self, diagram: &Diagram) -> String {
        self.render(diagram).to_string()
    }

    /// Renders the diagram and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::Io`] if the file cannot be written.
    pub fn write(&self, diagram: &Diagram, path: impl AsRef<FsPath>) -> Result<(), WeftError> {
        let path = path.as_ref();
        info!(file_name:? = path; "Creating SVG file");
        if let Err(err) = fs::write(path, self.render_to_string(diagram)) {
            error!(file_name:? = path, err:%; "Failed to write SVG content");
            return Err(WeftError::Io(err));
        }
        Ok(())
    }

    fn content_bounds(diagram: &Diagram) -> Bounds {
        let Some(blocks) = diagram
            .blocks()
            .map(Block::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
        else {
            return Bounds::default();
        };
        diagram
            .connections()
            .flat_map(|connection| connection.path().points().iter().copied())
            .fold(blocks, |bounds, point| bounds.include(point))
    }

    fn render_block(&self, block: &Block) -> svg_element::Group {
        let position = block.position();
        let size = block.size();
        let center = block.center();
        let fill = block.color().unwrap_or(self.palette.block_fill);

        let mut group = svg_element::Group::new().set("class", "block");
        if block.rotation() != 0.0 {
            group = group.set(
                "transform",
                format!("rotate({} {} {})", block.rotation(), center.x(), center.y()),
            );
        }

        let body = svg_element::Rectangle::new()
            .set("x", position.x())
            .set("y", position.y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", 4)
            .set("fill", fill.to_string())
            .set("fill-opacity", fill.alpha())
            .set("stroke", self.palette.block_stroke.to_string())
            .set("stroke-width", 1.5);

        let handle_size = self.resize_handle_size;
        let handle = svg_element::Rectangle::new()
            .set("x", position.x() + size.width() - handle_size)
            .set("y", position.y() + size.height() - handle_size)
            .set("width", handle_size)
            .set("height", handle_size)
            .set("fill", self.palette.block_stroke.to_string())
            .set("fill-opacity", if block.is_resizing() { 0.8 } else { 0.3 });

        let name = svg_element::Text::new(block.name().to_string())
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE);

        group = group.add(body).add(handle).add(name);

        if let Some(preview) = block.resize_preview() {
            group = group.add(
                svg_element::Rectangle::new()
                    .set("x", position.x())
                    .set("y", position.y())
                    .set("width", preview.width())
                    .set("height", preview.height())
                    .set("fill", "none")
                    .set("stroke", self.palette.block_stroke.to_string())
                    .set("stroke-dasharray", "4,4"),
            );
        }

        group
    }

    fn render_ports(&self, diagram: &Diagram, block: &Block) -> svg_element::Group {
        let mut group = svg_element::Group::new().set("class", "ports");
        for side in [PortSide::Input, PortSide::Output] {
            let labels = block.ports().declarations(side);
            for (index, anchor) in block.world_ports(side).into_iter().enumerate() {
                let port = PortRef::new(side, index);
                let color =
                    diagram.port_color(block.id(), port, self.palette.wire, self.palette.port);
                let highlighted = block.highlighted_port() == Some(port);
                let radius = if highlighted {
                    self.port_radius * 1.5
                } else {
                    self.port_radius
                };

                let mut circle = svg_element::Circle::new()
                    .set("cx", anchor.x())
                    .set("cy", anchor.y())
                    .set("r", radius)
                    .set("fill", color.to_string());
                if highlighted {
                    circle = circle
                        .set("stroke", self.palette.block_stroke.to_string())
                        .set("stroke-width", 1.5);
                }
                group = group.add(circle);

                if let Some(declaration) = labels.and_then(|labels| labels.get(index)) {
                    group = group.add(Self::port_label(
                        declaration.label(),
                        anchor,
                        side,
                        self.port_radius,
                    ));
                }
            }
        }
        group
    }

    fn port_label(label: String, anchor: Point, side: PortSide, radius: f32) -> svg_element::Text {
        let (dx, text_anchor) = match side {
            PortSide::Input => (radius * 2.0, "start"),
            PortSide::Output => (-radius * 2.0, "end"),
        };
        svg_element::Text::new(label)
            .set("x", anchor.x() + dx)
            .set("y", anchor.y())
            .set("text-anchor", text_anchor)
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE * 0.8)
    }

    fn wire_color(&self, connection: &Connection) -> Color {
        let base = connection.color().unwrap_or(self.palette.wire);
        match connection.state() {
            VisualState::Error => self.palette.error,
            VisualState::Locked => base.with_alpha(LOCKED_OPACITY),
            VisualState::Normal | VisualState::Active => base,
        }
    }

    fn render_connection(&self, connection: &Connection) -> svg_element::Group {
        let color = self.wire_color(connection);
        let data = connection.path().to_svg_data();
        let mut group = svg_element::Group::new()
            .set("class", "connection")
            .set("data-state", connection.state().to_string());

        if connection.glow_enabled() {
            group = group.add(
                svg_element::Path::new()
                    .set("d", data.clone())
                    .set("fill", "none")
                    .set("stroke", color.to_string())
                    .set("stroke-width", GLOW_WIDTH)
                    .set("stroke-opacity", GLOW_OPACITY)
                    .set("stroke-linecap", "round"),
            );
        }

        let width = if connection.gesture().hovered() {
            WIRE_WIDTH * 1.5
        } else {
            WIRE_WIDTH
        };
        let mut wire = svg_element::Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", color.to_string())
            .set("stroke-opacity", color.alpha())
            .set("stroke-width", width);
        if let Some(dasharray) = connection.line_style().to_svg_value() {
            wire = wire.set("stroke-dasharray", dasharray);
        }
        group = group.add(wire);

        for point in connection.control_points() {
            group = group.add(self.control_point(*point, color, 1.0));
        }
        if let Some((_, preview)) = connection.gesture().dragged_control_point() {
            group = group.add(self.control_point(preview, color, 0.5));
        }

        if let Some(label) = connection.label() {
            let at = connection.path().point_at(0.5);
            group = group.add(
                svg_element::Text::new(label.to_string())
                    .set("x", at.x())
                    .set("y", at.y() - FONT_SIZE * 0.5)
                    .set("text-anchor", "middle")
                    .set("font-family", "sans-serif")
                    .set("font-size", FONT_SIZE)
                    .set("fill", color.to_string()),
            );
        }

        let selected = connection
            .gesture()
            .selected_segment()
            .and_then(|index| connection.segments().get(index));
        if let Some(segment) = selected {
            for handle in segment.handles(SEGMENT_HANDLE_DISTANCE) {
                group = group.add(
                    svg_element::Rectangle::new()
                        .set("x", handle.x() - SEGMENT_HANDLE_SIZE / 2.0)
                        .set("y", handle.y() - SEGMENT_HANDLE_SIZE / 2.0)
                        .set("width", SEGMENT_HANDLE_SIZE)
                        .set("height", SEGMENT_HANDLE_SIZE)
                        .set("fill", "white")
                        .set("stroke", color.to_string()),
                );
            }
        }

        group
    }

    fn control_point(&self, point: Point, color: Color, opacity: f32) -> svg_element::Circle {
        svg_element::Circle::new()
            .set("cx", point.x())
            .set("cy", point.y())
            .set("r", self.control_point_radius)
            .set("fill", "white")
            .set("stroke", color.to_string())
            .set("stroke-width", 1.5)
            .set("opacity", opacity)
    }
}
