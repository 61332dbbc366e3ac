//! Scene files.
//!
//! A scene is a TOML document listing blocks and the wires between them.
//! Loading a scene replays it through the [`Diagram`] API, so every wire is
//! routed exactly as an editor would route it.
//!
//! ```toml
//! [[block]]
//! name = "osc"
//! kind = "source"
//! x = 0
//! y = 0
//!
//! [[block]]
//! name = "mux"
//! kind = "filter"
//! x = 300
//! y = 40
//! inputs = [{ name = "a" }, { name = "b" }]
//! outputs = [{ name = "q", bit_width = 8 }]
//!
//! [[connection]]
//! from = "osc"
//! output = 0
//! to = "mux"
//! input = 1
//! mode = "orthogonal"
//! style = "dashed"
//! ```
//!
//! Declaring `inputs` or `outputs` on a block replaces the ports of its kind
//! on both sides; a side left out of the declaration has no ports.

use std::str::FromStr;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use weft::{
    Diagram, DiagramError, DiagramEvent, PersistenceSink, SinkError, WeftError,
    block::BlockId,
    color::Color,
    config::RoutingConfig,
    connection::VisualState,
    geometry::{Point, Size},
    path::RoutingMode,
    ports::{BlockKind, PortDeclaration, PortRef},
    stroke::LineStyle,
};

/// Errors found while loading a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to parse scene: {0}")]
    Parse(String),

    #[error("Duplicate block name `{0}`")]
    DuplicateBlock(String),

    #[error("Connection refers to unknown block `{0}`")]
    UnknownBlock(String),

    #[error("Invalid {field} `{value}`: {message}")]
    InvalidValue {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error(transparent)]
    Diagram(#[from] DiagramError),
}

impl From<SceneError> for WeftError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::Diagram(err) => WeftError::Diagram(err),
            other => WeftError::Input(other.to_string()),
        }
    }
}

/// A parsed scene file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default, rename = "block")]
    blocks: Vec<BlockSpec>,

    #[serde(default, rename = "connection")]
    connections: Vec<ConnectionSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockSpec {
    name: String,
    #[serde(default)]
    kind: Option<String>,
    x: f32,
    y: f32,
    #[serde(default)]
    width: Option<f32>,
    #[serde(default)]
    height: Option<f32>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    rotation: Option<f32>,
    #[serde(default)]
    inputs: Option<Vec<PortSpec>>,
    #[serde(default)]
    outputs: Option<Vec<PortSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortSpec {
    name: String,
    #[serde(default)]
    bit_width: Option<u32>,
}

impl From<PortSpec> for PortDeclaration {
    fn from(spec: PortSpec) -> Self {
        let declaration = PortDeclaration::new(spec.name);
        match spec.bit_width {
            Some(width) => declaration.with_bit_width(width),
            None => declaration,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionSpec {
    from: String,
    #[serde(default)]
    output: usize,
    to: String,
    #[serde(default)]
    input: usize,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    offset: Option<f32>,
    #[serde(default)]
    control_points: Vec<[f32; 2]>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

impl Scene {
    /// Parses a scene from TOML source.
    pub fn parse(source: &str) -> Result<Self, SceneError> {
        toml::from_str(source).map_err(|err| SceneError::Parse(err.to_string()))
    }

    /// Replays the scene into a new [`Diagram`].
    ///
    /// Blocks are placed in file order, then wires are connected in file
    /// order. Wire properties are applied after routing, with the visual
    /// state last so a locked wire still receives its control points.
    pub fn build(self, config: RoutingConfig) -> Result<Diagram, SceneError> {
        let mut diagram = Diagram::new(config).with_sink(EventLog);

        for spec in self.blocks {
            place_block(&mut diagram, spec)?;
        }
        for spec in self.connections {
            connect(&mut diagram, spec)?;
        }

        info!(
            blocks = diagram.blocks().count(),
            connections = diagram.connections().count();
            "Scene loaded"
        );
        Ok(diagram)
    }
}

fn place_block(diagram: &mut Diagram, spec: BlockSpec) -> Result<BlockId, SceneError> {
    if diagram.block_by_name(&spec.name).is_some() {
        return Err(SceneError::DuplicateBlock(spec.name));
    }

    let kind = spec
        .kind
        .as_deref()
        .map_or(BlockKind::default(), BlockKind::from_name);
    let size = match (spec.width, spec.height) {
        (None, None) => None,
        (width, height) => {
            let default = kind.default_size();
            Some(Size::new(
                width.unwrap_or(default.width()),
                height.unwrap_or(default.height()),
            ))
        }
    };

    let id = diagram.add_block(&spec.name, kind, Point::new(spec.x, spec.y), size)?;

    if spec.inputs.is_some() || spec.outputs.is_some() {
        let inputs = declarations(spec.inputs);
        let outputs = declarations(spec.outputs);
        diagram.apply_declared_ports(id, inputs, outputs)?;
    }
    if let Some(color) = spec.color {
        let color = parse_value("block color", &color, Color::new)?;
        diagram.set_block_color(id, Some(color))?;
    }
    if let Some(rotation) = spec.rotation {
        diagram.set_block_rotation(id, rotation)?;
    }

    debug!(block:% = id, name = spec.name; "Placed scene block");
    Ok(id)
}

fn connect(diagram: &mut Diagram, spec: ConnectionSpec) -> Result<(), SceneError> {
    let source = lookup(diagram, &spec.from)?;
    let target = lookup(diagram, &spec.to)?;
    let mode = match spec.mode.as_deref() {
        Some(mode) => parse_value("routing mode", mode, RoutingMode::from_str)?,
        None => RoutingMode::default(),
    };

    let id = diagram.connect(
        source,
        PortRef::output(spec.output),
        target,
        PortRef::input(spec.input),
        mode,
    )?;

    if let Some(offset) = spec.offset {
        diagram.set_offset(id, offset)?;
    }
    for [x, y] in spec.control_points {
        diagram.add_control_point(id, Point::new(x, y))?;
    }
    if let Some(style) = spec.style {
        let style = parse_value("line style", &style, LineStyle::from_str)?;
        diagram.set_line_style(id, style)?;
    }
    if let Some(color) = spec.color {
        let color = parse_value("wire color", &color, Color::new)?;
        diagram.set_connection_color(id, Some(color))?;
    }
    if spec.label.is_some() {
        diagram.set_label(id, spec.label)?;
    }
    if let Some(state) = spec.state {
        let state = parse_value("connection state", &state, VisualState::from_str)?;
        diagram.set_connection_state(id, state)?;
    }
    Ok(())
}

fn lookup(diagram: &Diagram, name: &str) -> Result<BlockId, SceneError> {
    diagram
        .block_by_name(name)
        .map(|block| block.id())
        .ok_or_else(|| SceneError::UnknownBlock(name.to_string()))
}

fn declarations(specs: Option<Vec<PortSpec>>) -> Vec<PortDeclaration> {
    specs
        .unwrap_or_default()
        .into_iter()
        .map(PortDeclaration::from)
        .collect()
}

fn parse_value<T, E: ToString>(
    field: &'static str,
    value: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, SceneError> {
    parse(value).map_err(|err| SceneError::InvalidValue {
        field,
        value: value.to_string(),
        message: err.to_string(),
    })
}

/// Sink that writes every committed change to the debug log.
struct EventLog;

impl PersistenceSink for EventLog {
    fn record(&mut self, event: &DiagramEvent) -> Result<(), SinkError> {
        debug!(event:?; "Diagram changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: &str = r#"
        [[block]]
        name = "osc"
        kind = "source"
        x = 0
        y = 0

        [[block]]
        name = "lpf"
        kind = "filter"
        x = 300
        y = 0
        color = "lightblue"

        [[connection]]
        from = "osc"
        to = "lpf"
        label = "clk"
        state = "locked"
        control_points = [[210, 120]]
    "#;

    #[test]
    fn test_build_pipeline() {
        let diagram = Scene::parse(PIPELINE)
            .unwrap()
            .build(RoutingConfig::default())
            .unwrap();

        assert_eq!(diagram.blocks().count(), 2);
        let connection = diagram.connections().next().unwrap();
        assert_eq!(connection.label(), Some("clk"));
        assert_eq!(connection.state(), VisualState::Locked);
        assert_eq!(connection.control_points(), &[Point::new(210.0, 120.0)]);
        assert!(diagram.block_by_name("lpf").unwrap().color().is_some());
    }

    #[test]
    fn test_partial_size_uses_kind_default() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "x"
            kind = "crossbar"
            x = 0
            y = 0
            height = 200
            "#,
        )
        .unwrap();
        let diagram = scene.build(RoutingConfig::default()).unwrap();
        assert_eq!(
            diagram.block_by_name("x").unwrap().size(),
            Size::new(120.0, 200.0)
        );
    }

    #[test]
    fn test_declared_ports_replace_both_sides() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "reg"
            kind = "filter"
            x = 0
            y = 0
            inputs = [{ name = "d", bit_width = 8 }, { name = "clk" }]
            "#,
        )
        .unwrap();
        let diagram = scene.build(RoutingConfig::default()).unwrap();
        let counts = diagram.block_by_name("reg").unwrap().ports().counts();
        assert_eq!(counts.inputs(), 2);
        assert_eq!(counts.outputs(), 0);
    }

    #[test]
    fn test_unknown_block() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "a"
            kind = "source"
            x = 0
            y = 0

            [[connection]]
            from = "a"
            to = "missing"
            "#,
        )
        .unwrap();
        let err = scene.build(RoutingConfig::default()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownBlock(name) if name == "missing"));
    }

    #[test]
    fn test_duplicate_block() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "a"
            x = 0
            y = 0

            [[block]]
            name = "a"
            x = 200
            y = 0
            "#,
        )
        .unwrap();
        assert!(matches!(
            scene.build(RoutingConfig::default()),
            Err(SceneError::DuplicateBlock(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "a"
            kind = "source"
            x = 0
            y = 0

            [[block]]
            name = "b"
            x = 300
            y = 0

            [[connection]]
            from = "a"
            to = "b"
            mode = "diagonal"
            "#,
        )
        .unwrap();
        let err = scene.build(RoutingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidValue { field: "routing mode", .. }
        ));
    }

    #[test]
    fn test_diagram_errors_pass_through() {
        let scene = Scene::parse(
            r#"
            [[block]]
            name = "a"
            kind = "sink"
            x = 0
            y = 0

            [[block]]
            name = "b"
            x = 300
            y = 0

            [[connection]]
            from = "a"
            to = "b"
            "#,
        )
        .unwrap();
        let err: WeftError = scene.build(RoutingConfig::default()).unwrap_err().into();
        assert!(matches!(err, WeftError::Diagram(DiagramError::NoPort { .. })));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            Scene::parse("[[block]]\nname = \"a\"\nx = 0\ny = 0\nwidht = 5\n"),
            Err(SceneError::Parse(_))
        ));
    }
}
