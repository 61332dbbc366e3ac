//! Placed blocks and their geometry.
//!
//! A [`Block`] owns its [`PortLayout`] and [`ResizeController`] and keeps
//! non-owning references to the connections attached to it. Geometry
//! changes go through the [`Diagram`](crate::diagram::Diagram), which
//! re-routes the affected connections afterwards.
//!
//! Rotation turns the whole block, ports included, around its center.

use std::fmt;

use log::debug;

use weft_core::{
    color::Color,
    geometry::{Bounds, GeometryError, Point, Size},
    identifier::Id,
};

use crate::{
    config::RoutingConfig,
    connection::{ConnectionId, Endpoint},
    ports::{BlockKind, PortDeclaration, PortLayout, PortRef, PortSide},
    resize::ResizeController,
};

/// Stable identifier of a block within its diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A resizable unit with input ports on its left edge and output ports on its right.
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    name: Id,
    kind: BlockKind,
    position: Point,
    size: Size,
    rotation: f32,
    color: Option<Color>,
    ports: PortLayout,
    resize: ResizeController,
    connections: Vec<ConnectionId>,
    highlighted_port: Option<PortRef>,
    min_size: Size,
}

impl Block {
    /// Creates a block of `kind` with its top-left corner at `position`.
    ///
    /// `size` defaults to the kind's footprint and is raised to the
    /// configured block minimum.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] for a non-finite position or a size that
    /// is not strictly positive.
    pub fn new(
        id: BlockId,
        name: Id,
        kind: BlockKind,
        position: Point,
        size: Option<Size>,
        config: &RoutingConfig,
    ) -> Result<Self, GeometryError> {
        let position = position.validated()?;
        let min_size = config.block_min_size();
        let size = size
            .unwrap_or_else(|| kind.default_size())
            .validated()?
            .max(min_size);
        Ok(Self {
            id,
            name,
            kind,
            position,
            size,
            rotation: 0.0,
            color: None,
            ports: PortLayout::new(kind, size, config.port_detect_radius()),
            resize: ResizeController::new(config.resize_handle_size(), config.resize_min_size()),
            connections: Vec::new(),
            highlighted_port: None,
            min_size,
        })
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Top-left corner in diagram coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Rotation in degrees, in `[0, 360)`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn ports(&self) -> &PortLayout {
        &self.ports
    }

    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    pub fn highlighted_port(&self) -> Option<PortRef> {
        self.highlighted_port
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_active()
    }

    /// Size shown while a resize gesture is in progress.
    pub fn resize_preview(&self) -> Option<Size> {
        self.resize.preview()
    }

    /// Axis-aligned bounds of the block in diagram coordinates, rotation included.
    pub fn bounds(&self) -> Bounds {
        let [first, rest @ ..] = self.local_corners().map(|corner| self.to_world(corner));
        rest.iter()
            .fold(Bounds::new_from_top_left(first, Size::default()), |bounds, corner| {
                bounds.include(*corner)
            })
    }

    /// Center of the block in diagram coordinates.
    pub fn center(&self) -> Point {
        Bounds::new_from_top_left(self.position, self.size).center()
    }

    /// Returns `true` if diagram point `pos` lies on the block body.
    pub fn contains(&self, pos: Point) -> bool {
        Bounds::new_from_top_left(Point::default(), self.size).contains(self.to_local(pos))
    }

    fn local_corners(&self) -> [Point; 4] {
        let (width, height) = (self.size.width(), self.size.height());
        [
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(0.0, height),
            Point::new(width, height),
        ]
    }

    /// Converts a block-local point to diagram coordinates.
    pub fn to_world(&self, local: Point) -> Point {
        if self.rotation == 0.0 {
            return self.position.add_point(local);
        }
        let half = self.size.to_point().scale(0.5);
        let rotated = rotate(local.sub_point(half), self.rotation);
        self.position.add_point(half).add_point(rotated)
    }

    /// Converts a diagram point to block-local coordinates.
    pub fn to_local(&self, world: Point) -> Point {
        if self.rotation == 0.0 {
            return world.sub_point(self.position);
        }
        let half = self.size.to_point().scale(0.5);
        let unrotated = rotate(world.sub_point(self.center()), -self.rotation);
        unrotated.add_point(half)
    }

    /// Anchor of `port` in diagram coordinates.
    pub fn port_position(&self, port: PortRef) -> Option<Point> {
        self.ports.port(port).map(|local| self.to_world(local))
    }

    /// Port anchors of one side in diagram coordinates.
    pub fn world_ports(&self, side: PortSide) -> Vec<Point> {
        self.ports
            .ports(side)
            .iter()
            .map(|local| self.to_world(*local))
            .collect()
    }

    /// Builds the endpoint a connection stores for `port`.
    pub fn endpoint(&self, port: PortRef) -> Option<Endpoint> {
        let local = self.ports.port(port)?;
        Some(Endpoint::new(
            self.id,
            port,
            self.to_world(local),
            local,
            self.ports.ports(port.side()).len(),
        ))
    }

    /// The port within detection range of diagram point `pos`, with its world anchor.
    pub fn port_near(&self, pos: Point) -> Option<(PortRef, Point)> {
        self.ports
            .port_near(self.to_local(pos))
            .map(|(port, local)| (port, self.to_world(local)))
    }

    /// Returns `true` if diagram point `pos` lies on the resize handle.
    pub fn resize_handle_hit(&self, pos: Point) -> bool {
        self.resize.hit_test(self.to_local(pos), self.size)
    }

    pub(crate) fn set_position(&mut self, position: Point) -> Result<(), GeometryError> {
        self.position = position.validated()?;
        Ok(())
    }

    /// Applies a new size, raised to the block minimum, and redistributes ports.
    pub(crate) fn set_size(&mut self, size: Size) -> Result<Size, GeometryError> {
        let size = size.validated()?.max(self.min_size);
        self.size = size;
        self.ports.set_size(size);
        debug!(
            block:% = self.id,
            width = size.width(),
            height = size.height();
            "Block resized"
        );
        Ok(size)
    }

    pub(crate) fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub(crate) fn set_rotation(&mut self, degrees: f32) -> Result<f32, GeometryError> {
        if !degrees.is_finite() {
            return Err(GeometryError::NonFinite {
                x: degrees,
                y: 0.0,
            });
        }
        self.rotation = degrees.rem_euclid(360.0);
        Ok(self.rotation)
    }

    pub(crate) fn apply_declared_ports(
        &mut self,
        inputs: Vec<PortDeclaration>,
        outputs: Vec<PortDeclaration>,
    ) {
        self.ports.apply_declared_ports(inputs, outputs);
        self.clear_stale_highlight();
    }

    pub(crate) fn clear_declared_ports(&mut self) {
        self.ports.clear_declared_ports();
        self.clear_stale_highlight();
    }

    /// Highlights `port`, or clears the highlight. Returns `false` if the port does not exist.
    pub(crate) fn set_highlighted_port(&mut self, port: Option<PortRef>) -> bool {
        if port.is_some_and(|port| self.ports.port(port).is_none()) {
            return false;
        }
        self.highlighted_port = port;
        true
    }

    pub(crate) fn attach_connection(&mut self, connection: ConnectionId) {
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
    }

    pub(crate) fn detach_connection(&mut self, connection: ConnectionId) {
        self.connections.retain(|id| *id != connection);
    }

    pub(crate) fn begin_resize(&mut self, pos: Point) -> bool {
        let local = self.to_local(pos);
        if !self.resize.hit_test(local, self.size) {
            return false;
        }
        self.resize.begin(local, self.size);
        true
    }

    pub(crate) fn update_resize(&mut self, pos: Point) -> Option<Size> {
        let local = self.to_local(pos);
        self.resize.update(local)
    }

    pub(crate) fn end_resize(&mut self) -> Option<Size> {
        self.resize.end()
    }

    pub(crate) fn cancel_resize(&mut self) {
        self.resize.cancel();
    }

    fn clear_stale_highlight(&mut self) {
        if self
            .highlighted_port
            .is_some_and(|port| self.ports.port(port).is_none())
        {
            self.highlighted_port = None;
        }
    }
}

fn rotate(point: Point, degrees: f32) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(
        point.x() * cos - point.y() * sin,
        point.x() * sin + point.y() * cos,
    )
}
