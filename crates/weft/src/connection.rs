//! Wires between block ports.
//!
//! A [`Connection`] starts out *drawing* (the source is bound to a port, the
//! other end follows the pointer) and becomes *attached* once a target port is
//! resolved. Attached connections carry a [`VisualState`] that affects
//! rendering and edit permission, never topology.
//!
//! Every mutation that changes an input of the route ends in
//! [`Connection::recompute`], so the cached [`Path`] and [`SegmentIndex`]
//! always match what [`PathBuilder`] would produce from the current state.

use std::{fmt, str};

use log::{debug, trace};

use weft_core::{
    color::Color,
    geometry::{GeometryError, Point},
    stroke::LineStyle,
};

use crate::{
    block::BlockId,
    config::RoutingConfig,
    control_points::ControlPointStore,
    error::DiagramError,
    path::{Path, PathBuilder, RoutingMode},
    ports::{PortRef, PortSide},
    segment::SegmentIndex,
};

/// Stable identifier of a connection within its diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u32);

impl ConnectionId {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// One of the two ends of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    Source,
    Target,
}

impl fmt::Display for ConnectionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Target => "target",
        })
    }
}

/// Rendering and edit state of an attached connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    #[default]
    Normal,
    Active,
    Error,
    /// Rerouted automatically but closed to manual edits.
    Locked,
}

impl str::FromStr for VisualState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            "locked" => Ok(Self::Locked),
            _ => Err(format!(
                "invalid connection state `{s}`, valid values: normal, active, error, locked"
            )),
        }
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Active => "active",
            Self::Error => "error",
            Self::Locked => "locked",
        })
    }
}

/// A connection end bound to a block port.
///
/// Besides the world anchor, the endpoint remembers the block-local anchor
/// and the side's port count at the time it was resolved; both are needed to
/// re-resolve the port after the side is redistributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    block: BlockId,
    port: PortRef,
    anchor: Point,
    local: Point,
    side_count: usize,
}

impl Endpoint {
    pub fn new(block: BlockId, port: PortRef, anchor: Point, local: Point, side_count: usize) -> Self {
        Self {
            block,
            port,
            anchor,
            local,
            side_count,
        }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn port(&self) -> PortRef {
        self.port
    }

    /// Anchor position in diagram coordinates.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Anchor position relative to the block's top-left corner.
    pub fn local(&self) -> Point {
        self.local
    }

    pub fn side_count(&self) -> usize {
        self.side_count
    }
}

/// Transient interaction state of one connection, reset when a gesture ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionGesture {
    selected_segment: Option<usize>,
    dragged_control_point: Option<(usize, Point)>,
    hovered: bool,
}

impl ConnectionGesture {
    /// Path index of the selected segment.
    pub fn selected_segment(&self) -> Option<usize> {
        self.selected_segment
    }

    /// Index and preview position of the control point being dragged.
    pub fn dragged_control_point(&self) -> Option<(usize, Point)> {
        self.dragged_control_point
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    fn reset(&mut self) {
        self.selected_segment = None;
        self.dragged_control_point = None;
    }
}

/// A routed wire between two ports.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    source: Endpoint,
    target: Option<Endpoint>,
    pointer: Point,
    mode: RoutingMode,
    offset: f32,
    control_points: ControlPointStore,
    line_style: LineStyle,
    state: VisualState,
    color: Option<Color>,
    label: Option<String>,
    path: Path,
    segments: SegmentIndex,
    gesture: ConnectionGesture,
    builder: PathBuilder,
    path_samples: usize,
}

impl Connection {
    /// Starts drawing a wire from `source` with the free end at `pointer`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Geometry`] if `pointer` is not finite.
    pub fn new_drawing(
        id: ConnectionId,
        source: Endpoint,
        pointer: Point,
        config: &RoutingConfig,
    ) -> Result<Self, DiagramError> {
        let pointer = pointer.validated()?;
        let mut connection = Self {
            id,
            source,
            target: None,
            pointer,
            mode: RoutingMode::default(),
            offset: 0.0,
            control_points: ControlPointStore::new(config.control_point_detect_radius()),
            line_style: LineStyle::default(),
            state: VisualState::default(),
            color: None,
            label: None,
            path: Path::Polyline(vec![source.anchor, pointer]),
            segments: SegmentIndex::new(config.axis_threshold(), config.segment_detect_distance()),
            gesture: ConnectionGesture::default(),
            builder: PathBuilder::new(config.port_spacing()),
            path_samples: config.path_samples(),
        };
        connection.recompute()?;
        Ok(connection)
    }

    /// Creates an attached wire between two resolved ports.
    ///
    /// The ends are swapped if needed so the source sits on an output port.
    pub fn new_attached(
        id: ConnectionId,
        source: Endpoint,
        target: Endpoint,
        mode: RoutingMode,
        config: &RoutingConfig,
    ) -> Result<Self, DiagramError> {
        let mut connection = Self::new_drawing(id, source, target.anchor, config)?;
        connection.mode = mode;
        connection.attach(target)?;
        Ok(connection)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn target(&self) -> Option<&Endpoint> {
        self.target.as_ref()
    }

    pub fn endpoint(&self, end: ConnectionEnd) -> Option<&Endpoint> {
        match end {
            ConnectionEnd::Source => Some(&self.source),
            ConnectionEnd::Target => self.target.as_ref(),
        }
    }

    /// Returns `true` while the free end still follows the pointer.
    pub fn is_drawing(&self) -> bool {
        self.target.is_none()
    }

    /// Returns `true` if either end is bound to `block`.
    pub fn ends_on(&self, block: BlockId) -> bool {
        self.source.block == block || self.target.is_some_and(|target| target.block == block)
    }

    /// Blocks referenced by this connection.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::once(self.source.block).chain(self.target.map(|target| target.block))
    }

    /// End point of the route: the target anchor, or the pointer while drawing.
    pub fn end_point(&self) -> Point {
        self.target.map_or(self.pointer, |target| target.anchor)
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn control_points(&self) -> &[Point] {
        self.control_points.points()
    }

    pub fn line_style(&self) -> &LineStyle {
        &self.line_style
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn segments(&self) -> &SegmentIndex {
        &self.segments
    }

    pub fn gesture(&self) -> &ConnectionGesture {
        &self.gesture
    }

    /// Returns `true` if the wire should be drawn with a glow.
    pub fn glow_enabled(&self) -> bool {
        matches!(self.state, VisualState::Active | VisualState::Error)
    }

    /// Returns `true` if segments and control points may be edited.
    pub fn is_editable(&self) -> bool {
        self.state != VisualState::Locked
    }

    /// Moves the free end while drawing.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::NotDrawing`] once the connection is attached.
    pub fn update_pointer(&mut self, pointer: Point) -> Result<(), DiagramError> {
        if !self.is_drawing() {
            return Err(DiagramError::NotDrawing(self.id));
        }
        self.pointer = pointer.validated()?;
        self.recompute()?;
        Ok(())
    }

    /// Binds the free end to `target`.
    ///
    /// If the drag started on an input port the ends are swapped, so an
    /// attached connection always runs from an output to an input.
    pub fn attach(&mut self, target: Endpoint) -> Result<(), DiagramError> {
        if !self.is_drawing() {
            return Err(DiagramError::NotDrawing(self.id));
        }
        if self.source.port.side() == PortSide::Input {
            debug!(connection:% = self.id; "Normalising wire direction");
            self.target = Some(self.source);
            self.source = target;
        } else {
            self.target = Some(target);
        }
        self.recompute()?;
        Ok(())
    }

    /// Rebinds one end, returning the previous anchor.
    ///
    /// Returns `None` when `end` is the target of a connection still being drawn.
    pub(crate) fn relocate(&mut self, end: ConnectionEnd, endpoint: Endpoint) -> Option<Point> {
        let slot = match end {
            ConnectionEnd::Source => &mut self.source,
            ConnectionEnd::Target => self.target.as_mut()?,
        };
        Some(std::mem::replace(slot, endpoint).anchor)
    }

    /// Rebuilds the path and its segments from the current state.
    ///
    /// Control points, when present, take precedence over the routing mode.
    pub fn recompute(&mut self) -> Result<(), GeometryError> {
        let start = self.source.anchor;
        let end = self.end_point();
        let path = if self.control_points.is_empty() {
            self.builder.build_path(start, end, self.mode, self.offset)?
        } else {
            self.builder
                .build_path_with_waypoints(start, end, self.control_points.points())?
        };
        self.path = path;
        self.segments.rebuild(&self.path);
        if let Some(selected) = self.gesture.selected_segment {
            if self.segments.get(selected).is_none() {
                self.gesture.selected_segment = None;
            }
        }
        trace!(
            connection:% = self.id,
            points = self.path.points().len(),
            segments = self.segments.segments().len();
            "Recomputed connection"
        );
        Ok(())
    }

    pub fn set_mode(&mut self, mode: RoutingMode) -> Result<(), DiagramError> {
        self.mode = mode;
        self.recompute()?;
        Ok(())
    }

    /// Sets the lateral offset of the orthogonal route.
    pub fn set_offset(&mut self, offset: f32) -> Result<(), DiagramError> {
        if !offset.is_finite() {
            return Err(GeometryError::NonFinite { x: offset, y: 0.0 }.into());
        }
        let previous = self.offset;
        self.offset = offset;
        if let Err(err) = self.recompute() {
            self.offset = previous;
            return Err(err.into());
        }
        Ok(())
    }

    pub fn set_line_style(&mut self, line_style: LineStyle) {
        self.line_style = line_style;
    }

    pub fn set_state(&mut self, state: VisualState) {
        self.state = state;
        if state == VisualState::Locked {
            self.gesture.reset();
        }
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.gesture.hovered = hovered;
    }

    /// Index of the control point under `pos`.
    pub fn control_point_at(&self, pos: Point) -> Option<usize> {
        self.control_points.hit_test(pos)
    }

    /// Path index of the segment under `pos`.
    pub fn segment_at(&self, pos: Point) -> Option<usize> {
        self.segments.segment_at(pos)
    }

    /// Appends a control point after the existing ones.
    pub fn add_control_point(&mut self, point: Point) -> Result<usize, DiagramError> {
        self.ensure_editable()?;
        let index = self.control_points.add(point.validated()?);
        self.recompute()?;
        Ok(index)
    }

    /// Inserts a control point on the wire body near `pos`.
    ///
    /// The point is seeded on the current path and placed between the
    /// waypoints it falls between, so the route keeps its order.
    pub fn insert_control_point_near(&mut self, pos: Point) -> Result<usize, DiagramError> {
        self.ensure_editable()?;
        let pos = pos.validated()?;
        let (point, t) = ControlPointStore::nearest_on_path(pos, &self.path, self.path_samples);
        let index = if self.control_points.is_empty() {
            0
        } else {
            self.path.span_at(t)
        };
        let index = self.control_points.insert(index, point);
        self.recompute()?;
        debug!(connection:% = self.id, index, t; "Inserted control point");
        Ok(index)
    }

    /// Removes the control point at `index` and returns it.
    pub fn remove_control_point(&mut self, index: usize) -> Result<Point, DiagramError> {
        self.ensure_editable()?;
        let removed = self
            .control_points
            .remove_at(index)
            .ok_or(DiagramError::UnknownControlPoint {
                connection: self.id,
                index,
            })?;
        self.recompute()?;
        Ok(removed)
    }

    /// Moves the control point at `index`, returning its previous position.
    pub fn move_control_point(&mut self, index: usize, point: Point) -> Result<Point, DiagramError> {
        self.ensure_editable()?;
        let point = point.validated()?;
        let previous = self
            .control_points
            .update(index, point)
            .ok_or(DiagramError::UnknownControlPoint {
                connection: self.id,
                index,
            })?;
        self.recompute()?;
        Ok(previous)
    }

    /// Moves every control point by `delta`.
    pub fn translate(&mut self, delta: Point) -> Result<(), DiagramError> {
        self.ensure_editable()?;
        self.control_points.translate_all(delta.validated()?);
        self.recompute()?;
        Ok(())
    }

    pub fn clear_control_points(&mut self) -> Result<(), DiagramError> {
        self.ensure_editable()?;
        self.control_points.clear();
        self.recompute()?;
        Ok(())
    }

    /// Selects the segment under `pos`, clearing any previous selection.
    pub fn select_segment(&mut self, pos: Point) -> Result<Option<usize>, DiagramError> {
        self.ensure_editable()?;
        self.gesture.selected_segment = self.segments.segment_at(pos);
        Ok(self.gesture.selected_segment)
    }

    /// Drags the selected segment by `drag`.
    ///
    /// Only the segment carrying the lateral offset of an automatic
    /// orthogonal route is adjustable; the offset changes 1:1 with the
    /// drag's perpendicular component. Returns whether anything moved.
    pub fn drag_segment(&mut self, drag: Point) -> Result<bool, DiagramError> {
        self.ensure_editable()?;
        let drag = drag.validated()?;
        let Some(selected) = self.gesture.selected_segment else {
            return Ok(false);
        };
        if self.mode != RoutingMode::Orthogonal || !self.control_points.is_empty() {
            return Ok(false);
        }
        let topology = self
            .builder
            .orthogonal_topology(self.source.anchor, self.end_point());
        if topology.offset_segment() != selected {
            return Ok(false);
        }
        let delta = topology.offset_delta(drag);
        self.set_offset(self.offset + delta)?;
        Ok(delta != 0.0)
    }

    /// Starts dragging the control point under `pos`.
    pub fn begin_control_point_drag(&mut self, pos: Point) -> Result<Option<usize>, DiagramError> {
        self.ensure_editable()?;
        let hit = self.control_points.hit_test(pos);
        self.gesture.dragged_control_point =
            hit.map(|index| (index, self.control_points.points()[index]));
        Ok(hit)
    }

    /// Updates the preview position of the dragged control point.
    ///
    /// The route is left untouched until the drag ends. Returns `false`
    /// when no drag is in progress.
    pub fn drag_control_point(&mut self, pos: Point) -> Result<bool, DiagramError> {
        let pos = pos.validated()?;
        let Some((index, _)) = self.gesture.dragged_control_point else {
            return Ok(false);
        };
        self.gesture.dragged_control_point = Some((index, pos));
        Ok(true)
    }

    /// Commits the dragged control point at its preview position.
    ///
    /// Returns the index that moved, or `None` when no drag was in progress.
    pub fn end_control_point_drag(&mut self) -> Result<Option<usize>, DiagramError> {
        let Some((index, pos)) = self.gesture.dragged_control_point.take() else {
            return Ok(None);
        };
        self.move_control_point(index, pos)?;
        Ok(Some(index))
    }

    /// Drops any segment selection and control-point drag.
    pub fn cancel_gesture(&mut self) {
        self.gesture.reset();
    }

    fn ensure_editable(&self) -> Result<(), DiagramError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(DiagramError::Locked(self.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn source() -> Endpoint {
        Endpoint::new(
            BlockId::new(0),
            PortRef::output(0),
            Point::new(120.0, 40.0),
            Point::new(120.0, 40.0),
            1,
        )
    }

    fn target_at(x: f32, y: f32) -> Endpoint {
        Endpoint::new(
            BlockId::new(1),
            PortRef::input(0),
            Point::new(x, y),
            Point::new(0.0, 40.0),
            1,
        )
    }

    fn attached(x: f32, y: f32) -> Connection {
        Connection::new_attached(
            ConnectionId::new(7),
            source(),
            target_at(x, y),
            RoutingMode::Orthogonal,
            &RoutingConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_display_ids() {
        assert_eq!(ConnectionId::new(3).to_string(), "c3");
        assert_eq!(ConnectionEnd::Target.to_string(), "target");
    }

    #[test]
    fn test_visual_state_from_str() {
        assert_eq!("locked".parse(), Ok(VisualState::Locked));
        assert!("blinking".parse::<VisualState>().is_err());
    }

    #[test]
    fn test_drawing_follows_pointer() {
        let mut wire = Connection::new_drawing(
            ConnectionId::new(1),
            source(),
            Point::new(200.0, 90.0),
            &RoutingConfig::default(),
        )
        .unwrap();
        assert!(wire.is_drawing());
        assert_eq!(wire.path().end(), Point::new(200.0, 90.0));

        wire.update_pointer(Point::new(400.0, 10.0)).unwrap();
        assert_eq!(wire.path().start(), Point::new(120.0, 40.0));
        assert_eq!(wire.path().end(), Point::new(400.0, 10.0));
        assert!(wire.update_pointer(Point::new(f32::NAN, 0.0)).is_err());
        assert_eq!(wire.path().end(), Point::new(400.0, 10.0));
    }

    #[test]
    fn test_attach_stops_drawing() {
        let mut wire = attached(300.0, 40.0);
        assert!(!wire.is_drawing());
        assert_eq!(wire.path().end(), Point::new(300.0, 40.0));
        assert_eq!(
            wire.update_pointer(Point::new(0.0, 0.0)),
            Err(DiagramError::NotDrawing(ConnectionId::new(7)))
        );
        assert!(wire.attach(target_at(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_attach_normalises_direction() {
        let input_end = target_at(300.0, 40.0);
        let mut wire = Connection::new_drawing(
            ConnectionId::new(2),
            input_end,
            Point::new(150.0, 40.0),
            &RoutingConfig::default(),
        )
        .unwrap();
        wire.attach(source()).unwrap();
        assert_eq!(wire.source().port(), PortRef::output(0));
        assert_eq!(wire.target().unwrap().port(), PortRef::input(0));
        assert_eq!(wire.path().start(), Point::new(120.0, 40.0));
        assert_eq!(wire.path().end(), Point::new(300.0, 40.0));
    }

    #[test]
    fn test_control_points_override_routing() {
        let mut wire = attached(300.0, 40.0);
        assert_eq!(wire.path().segment_count(), 3);
        wire.add_control_point(Point::new(200.0, 100.0)).unwrap();
        assert_eq!(
            wire.path().points(),
            &[
                Point::new(120.0, 40.0),
                Point::new(200.0, 100.0),
                Point::new(300.0, 40.0)
            ]
        );
        wire.remove_control_point(0).unwrap();
        assert_eq!(wire.path().segment_count(), 3);
        assert_eq!(
            wire.remove_control_point(0),
            Err(DiagramError::UnknownControlPoint {
                connection: ConnectionId::new(7),
                index: 0
            })
        );
    }

    #[test]
    fn test_insert_control_point_keeps_order() {
        let mut wire = attached(300.0, 40.0);
        wire.set_mode(RoutingMode::Straight).unwrap();
        assert_eq!(wire.insert_control_point_near(Point::new(250.0, 45.0)).unwrap(), 0);
        let first = wire.control_points()[0];
        assert_approx_eq!(f32, first.y(), 40.0);

        // Closer to the source than the existing waypoint: goes first.
        assert_eq!(wire.insert_control_point_near(Point::new(150.0, 42.0)).unwrap(), 0);
        assert_eq!(wire.control_points()[1], first);
        assert!(wire.control_points()[0].x() < first.x());
    }

    #[test]
    fn test_translate_moves_control_points() {
        let mut wire = attached(300.0, 40.0);
        wire.add_control_point(Point::new(200.0, 100.0)).unwrap();
        wire.translate(Point::new(5.0, -5.0)).unwrap();
        assert_eq!(wire.control_points(), &[Point::new(205.0, 95.0)]);
        assert_eq!(wire.path().points()[1], Point::new(205.0, 95.0));
    }

    #[test]
    fn test_segment_drag_changes_offset() {
        let mut wire = attached(300.0, 100.0);
        assert_eq!(wire.path().points()[1].x(), 210.0);

        assert_eq!(wire.select_segment(Point::new(211.0, 70.0)).unwrap(), Some(1));
        assert!(wire.drag_segment(Point::new(15.0, 3.0)).unwrap());
        assert_eq!(wire.offset(), -15.0);
        assert_eq!(wire.path().points()[1].x(), 225.0);
        assert_eq!(wire.gesture().selected_segment(), Some(1));
    }

    #[test]
    fn test_non_offset_segment_is_not_adjustable() {
        let mut wire = attached(300.0, 100.0);
        assert_eq!(wire.select_segment(Point::new(160.0, 41.0)).unwrap(), Some(0));
        assert!(!wire.drag_segment(Point::new(0.0, 10.0)).unwrap());
        assert_eq!(wire.offset(), 0.0);
    }

    #[test]
    fn test_detour_segment_drag_moves_middle_run() {
        let mut wire = attached(140.0, 100.0);
        assert_eq!(wire.path().segment_count(), 5);
        let middle = wire.path().points()[2].midpoint(wire.path().points()[3]);
        assert_eq!(wire.select_segment(middle).unwrap(), Some(2));
        assert!(wire.drag_segment(Point::new(0.0, 12.0)).unwrap());
        assert_eq!(wire.offset(), 12.0);
        assert_eq!(wire.path().points()[2].y(), 82.0);
    }

    #[test]
    fn test_locked_rejects_edits_but_reroutes() {
        let mut wire = attached(300.0, 40.0);
        wire.set_state(VisualState::Locked);
        let locked = Err(DiagramError::Locked(ConnectionId::new(7)));
        assert_eq!(wire.add_control_point(Point::new(1.0, 1.0)).map(|_| ()), locked);
        assert_eq!(wire.select_segment(Point::new(210.0, 40.0)).map(|_| ()), locked);
        assert_eq!(wire.translate(Point::new(1.0, 0.0)), locked);
        assert!(!wire.glow_enabled());

        wire.relocate(ConnectionEnd::Target, target_at(320.0, 80.0));
        wire.recompute().unwrap();
        assert_eq!(wire.path().end(), Point::new(320.0, 80.0));
    }

    #[test]
    fn test_glow_states() {
        let mut wire = attached(300.0, 40.0);
        assert!(!wire.glow_enabled());
        wire.set_state(VisualState::Active);
        assert!(wire.glow_enabled());
        wire.set_state(VisualState::Error);
        assert!(wire.glow_enabled());
    }

    #[test]
    fn test_control_point_drag_previews_until_end() {
        let mut wire = attached(300.0, 40.0);
        wire.add_control_point(Point::new(200.0, 100.0)).unwrap();
        assert_eq!(
            wire.begin_control_point_drag(Point::new(204.0, 103.0)).unwrap(),
            Some(0)
        );
        assert!(wire.drag_control_point(Point::new(220.0, 140.0)).unwrap());
        assert_eq!(wire.path().points()[1], Point::new(200.0, 100.0));

        assert_eq!(wire.end_control_point_drag().unwrap(), Some(0));
        assert_eq!(wire.path().points()[1], Point::new(220.0, 140.0));
        assert_eq!(wire.end_control_point_drag().unwrap(), None);
    }

    #[test]
    fn test_cancelled_control_point_drag_keeps_geometry() {
        let mut wire = attached(300.0, 40.0);
        wire.add_control_point(Point::new(200.0, 100.0)).unwrap();
        wire.begin_control_point_drag(Point::new(200.0, 100.0)).unwrap();
        wire.drag_control_point(Point::new(0.0, 0.0)).unwrap();
        wire.cancel_gesture();
        assert_eq!(wire.end_control_point_drag().unwrap(), None);
        assert_eq!(wire.control_points(), &[Point::new(200.0, 100.0)]);
    }

    #[test]
    fn test_set_offset_rejects_non_finite() {
        let mut wire = attached(300.0, 40.0);
        assert!(wire.set_offset(f32::NAN).is_err());
        assert_eq!(wire.offset(), 0.0);
        wire.set_offset(-30.0).unwrap();
        assert_eq!(wire.path().points()[1].x(), 240.0);
    }
}
