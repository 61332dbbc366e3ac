//! The diagram arena.
//!
//! [`Diagram`] owns every [`Block`] and [`Connection`], keyed by stable
//! identifiers. Blocks refer to their connections and connections to their
//! blocks only through those identifiers.
//!
//! Every geometry change runs the same cascade before returning:
//!
//! ```text
//! position / size mutation
//!     -> port layout recompute
//!     -> re-route of every attached connection (one at a time)
//!     -> path and segment rebuild
//!     -> persistence events
//! ```
//!
//! Rejected operations return a [`DiagramError`] and leave the diagram
//! unchanged. Problems found while re-routing are contained: the affected
//! connection is logged, skipped and flagged for [`Diagram::purge_stale`].

use std::fmt;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use weft_core::{
    color::Color,
    geometry::{Point, Size},
    identifier::Id,
    stroke::LineStyle,
};

use crate::{
    block::{Block, BlockId},
    config::RoutingConfig,
    connection::{Connection, ConnectionEnd, ConnectionId, VisualState},
    error::DiagramError,
    path::RoutingMode,
    ports::{self, BlockKind, PortDeclaration, PortRef},
    sink::{DiagramEvent, PersistenceSink},
};

/// Result of releasing a wire that was being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The wire was bound to a compatible port and committed.
    Attached(ConnectionId),
    /// The wire was released over empty space or an incompatible port and removed.
    Discarded,
}

/// Owning collection of blocks and connections.
pub struct Diagram {
    config: RoutingConfig,
    blocks: IndexMap<BlockId, Block>,
    connections: IndexMap<ConnectionId, Connection>,
    next_block: u32,
    next_connection: u32,
    stale: Vec<ConnectionId>,
    events: Vec<DiagramEvent>,
    sink: Option<Box<dyn PersistenceSink>>,
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram")
            .field("blocks", &self.blocks.len())
            .field("connections", &self.connections.len())
            .field("stale", &self.stale)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl Diagram {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            blocks: IndexMap::new(),
            connections: IndexMap::new(),
            next_block: 0,
            next_connection: 0,
            stale: Vec::new(),
            events: Vec::new(),
            sink: None,
        }
    }

    /// Attaches a persistence sink (builder style).
    pub fn with_sink(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replaces the persistence sink.
    pub fn set_sink(&mut self, sink: Option<Box<dyn PersistenceSink>>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Blocks in placement order; later blocks are drawn on top.
    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn block_by_name(&self, name: &str) -> Option<&Block> {
        self.blocks.values().find(|block| block.name() == name)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Connections in creation order.
    pub fn connections(&self) -> impl DoubleEndedIterator<Item = &Connection> {
        self.connections.values()
    }

    /// Connections flagged during a re-route because an endpoint block was missing.
    pub fn stale_connections(&self) -> &[ConnectionId] {
        &self.stale
    }

    // Blocks

    /// Places a new block with its top-left corner at `position`.
    ///
    /// `size` defaults to the footprint of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Geometry`] for a non-finite position or a
    /// size that is not strictly positive.
    pub fn add_block(
        &mut self,
        name: &str,
        kind: BlockKind,
        position: Point,
        size: Option<Size>,
    ) -> Result<BlockId, DiagramError> {
        let id = BlockId::new(self.next_block);
        let block = Block::new(id, Id::new(name), kind, position, size, &self.config)?;
        self.next_block += 1;

        info!(block:% = id, name, kind:% = kind; "Block added");
        self.events.push(DiagramEvent::BlockAdded {
            block: id,
            name: block.name(),
            kind,
            position: block.position(),
            size: block.size(),
        });
        self.blocks.insert(id, block);
        self.flush();
        Ok(id)
    }

    /// Deletes a block after detaching and removing every connection on it.
    ///
    /// Returns the removed connections.
    pub fn remove_block(&mut self, id: BlockId) -> Result<Vec<ConnectionId>, DiagramError> {
        let attached = self.block_ref(id)?.connections().to_vec();
        let mut removed = Vec::with_capacity(attached.len());
        for connection_id in attached {
            if self.detach_and_remove(connection_id) {
                removed.push(connection_id);
            }
        }
        self.blocks.shift_remove(&id);
        self.stale.retain(|stale| !removed.contains(stale));

        info!(block:% = id, connections = removed.len(); "Block removed");
        self.events.extend(
            removed
                .iter()
                .map(|&connection| DiagramEvent::ConnectionRemoved { connection }),
        );
        self.events.push(DiagramEvent::BlockRemoved { block: id });
        self.flush();
        Ok(removed)
    }

    /// Moves a block so its top-left corner is at `position`.
    pub fn move_block(&mut self, id: BlockId, position: Point) -> Result<(), DiagramError> {
        let block = self.block_mut(id)?;
        block.set_position(position)?;
        let position = block.position();

        self.events
            .push(DiagramEvent::BlockMoved { block: id, position });
        self.reroute(id);
        self.flush();
        Ok(())
    }

    /// Moves a block by `delta`.
    pub fn translate_block(&mut self, id: BlockId, delta: Point) -> Result<(), DiagramError> {
        let delta = delta.validated()?;
        let position = self.block_ref(id)?.position().add_point(delta);
        self.move_block(id, position)
    }

    /// Resizes a block and returns the size actually applied.
    ///
    /// The size is raised to the block minimum; ports are redistributed and
    /// attached connections re-routed.
    pub fn resize_block(&mut self, id: BlockId, size: Size) -> Result<Size, DiagramError> {
        let size = self.block_mut(id)?.set_size(size)?;

        self.events
            .push(DiagramEvent::BlockResized { block: id, size });
        self.reroute(id);
        self.flush();
        Ok(size)
    }

    /// Starts a resize gesture if `pos` is on the block's handle.
    pub fn begin_resize(&mut self, id: BlockId, pos: Point) -> Result<bool, DiagramError> {
        let pos = pos.validated()?;
        let started = self.block_mut(id)?.begin_resize(pos);
        if started {
            debug!(block:% = id; "Resize gesture started");
        }
        Ok(started)
    }

    /// Updates the resize preview. Nothing is committed until [`Diagram::end_resize`].
    pub fn update_resize(&mut self, id: BlockId, pos: Point) -> Result<Option<Size>, DiagramError> {
        let pos = pos.validated()?;
        Ok(self.block_mut(id)?.update_resize(pos))
    }

    /// Commits the resize gesture, if one is active, through [`Diagram::resize_block`].
    pub fn end_resize(&mut self, id: BlockId) -> Result<Option<Size>, DiagramError> {
        match self.block_mut(id)?.end_resize() {
            Some(size) => self.resize_block(id, size).map(Some),
            None => Ok(None),
        }
    }

    /// Drops the resize gesture; the block keeps its committed size.
    pub fn cancel_resize(&mut self, id: BlockId) -> Result<(), DiagramError> {
        self.block_mut(id)?.cancel_resize();
        Ok(())
    }

    /// Topmost block whose resize handle is under `pos`.
    pub fn resize_handle_at(&self, pos: Point) -> Option<BlockId> {
        self.blocks
            .values()
            .rev()
            .find(|block| block.resize_handle_hit(pos))
            .map(Block::id)
    }

    pub fn set_block_color(&mut self, id: BlockId, color: Option<Color>) -> Result<(), DiagramError> {
        self.block_mut(id)?.set_color(color);
        self.events
            .push(DiagramEvent::BlockRecolored { block: id, color });
        self.flush();
        Ok(())
    }

    /// Rotates a block to `degrees` and returns the normalised rotation.
    pub fn set_block_rotation(&mut self, id: BlockId, degrees: f32) -> Result<f32, DiagramError> {
        let rotation = self.block_mut(id)?.set_rotation(degrees)?;
        self.events
            .push(DiagramEvent::BlockRotated { block: id, rotation });
        self.reroute(id);
        self.flush();
        Ok(rotation)
    }

    /// Overrides the block's port counts with externally declared ports.
    pub fn apply_declared_ports(
        &mut self,
        id: BlockId,
        inputs: Vec<PortDeclaration>,
        outputs: Vec<PortDeclaration>,
    ) -> Result<(), DiagramError> {
        self.block_mut(id)?.apply_declared_ports(inputs, outputs);
        self.reroute(id);
        self.flush();
        Ok(())
    }

    /// Returns the block to the default ports of its kind.
    pub fn clear_declared_ports(&mut self, id: BlockId) -> Result<(), DiagramError> {
        self.block_mut(id)?.clear_declared_ports();
        self.reroute(id);
        self.flush();
        Ok(())
    }

    /// Sets or clears the hovered port of a block.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::NoPort`] if the block has no such port.
    pub fn set_highlighted_port(
        &mut self,
        id: BlockId,
        port: Option<PortRef>,
    ) -> Result<(), DiagramError> {
        let block = self.block_mut(id)?;
        match port {
            Some(port) if block.ports().port(port).is_none() => Err(no_port(id, port)),
            _ => {
                block.set_highlighted_port(port);
                Ok(())
            }
        }
    }

    // Drawing and attaching

    /// Starts drawing a wire from `port` of `block` towards `pointer`.
    pub fn begin_connection(
        &mut self,
        block: BlockId,
        port: PortRef,
        pointer: Point,
    ) -> Result<ConnectionId, DiagramError> {
        let source = self
            .block_ref(block)?
            .endpoint(port)
            .ok_or_else(|| no_port(block, port))?;
        let id = ConnectionId::new(self.next_connection);
        let connection = Connection::new_drawing(id, source, pointer, &self.config)?;
        self.next_connection += 1;

        self.block_mut(block)?.attach_connection(id);
        self.connections.insert(id, connection);
        debug!(connection:% = id, block:% = block, port:% = port; "Started drawing connection");
        Ok(id)
    }

    /// Moves the free end of a wire being drawn.
    pub fn update_pending(&mut self, id: ConnectionId, pointer: Point) -> Result<(), DiagramError> {
        self.connection_mut(id)?.update_pointer(pointer)
    }

    /// Releases a wire being drawn at `pos`.
    ///
    /// The wire attaches if the topmost port under `pos` belongs to another
    /// block and faces the opposite direction; otherwise it is removed.
    pub fn finish_connection(
        &mut self,
        id: ConnectionId,
        pos: Point,
    ) -> Result<AttachOutcome, DiagramError> {
        let connection = self.connection_ref(id)?;
        if !connection.is_drawing() {
            return Err(DiagramError::NotDrawing(id));
        }
        let source = *connection.source();
        let pos = pos.validated()?;

        let target = self.port_at(pos).filter(|(block, port)| {
            *block != source.block() && port.side() == source.port().side().opposite()
        });
        let Some((target_block, target_port)) = target else {
            debug!(connection:% = id; "Released over no compatible port, discarding");
            self.detach_and_remove(id);
            return Ok(AttachOutcome::Discarded);
        };

        let endpoint = self
            .block_ref(target_block)?
            .endpoint(target_port)
            .ok_or_else(|| no_port(target_block, target_port))?;
        self.connection_mut(id)?.attach(endpoint)?;
        self.block_mut(target_block)?.attach_connection(id);
        self.committed(id);
        Ok(AttachOutcome::Attached(id))
    }

    /// Abandons a wire that is still being drawn.
    pub fn cancel_connection(&mut self, id: ConnectionId) -> Result<(), DiagramError> {
        if !self.connection_ref(id)?.is_drawing() {
            return Err(DiagramError::NotDrawing(id));
        }
        self.detach_and_remove(id);
        Ok(())
    }

    /// Creates an attached wire between two ports in one step.
    ///
    /// The ports may be given in either order; the committed wire always
    /// runs from the output to the input.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::IncompatiblePorts`] when both ports are on the
    /// same block or face the same direction.
    pub fn connect(
        &mut self,
        source_block: BlockId,
        source_port: PortRef,
        target_block: BlockId,
        target_port: PortRef,
        mode: RoutingMode,
    ) -> Result<ConnectionId, DiagramError> {
        if source_block == target_block || source_port.side() == target_port.side() {
            return Err(DiagramError::IncompatiblePorts {
                source_block,
                side: source_port.side(),
                target_block,
                target_side: target_port.side(),
            });
        }
        let source = self
            .block_ref(source_block)?
            .endpoint(source_port)
            .ok_or_else(|| no_port(source_block, source_port))?;
        let target = self
            .block_ref(target_block)?
            .endpoint(target_port)
            .ok_or_else(|| no_port(target_block, target_port))?;

        let id = ConnectionId::new(self.next_connection);
        let connection = Connection::new_attached(id, source, target, mode, &self.config)?;
        self.next_connection += 1;

        self.connections.insert(id, connection);
        self.block_mut(source_block)?.attach_connection(id);
        self.block_mut(target_block)?.attach_connection(id);
        self.committed(id);
        Ok(id)
    }

    /// Deletes a connection and detaches it from its blocks.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<(), DiagramError> {
        self.connection_ref(id)?;
        self.detach_and_remove(id);
        self.stale.retain(|stale| *stale != id);
        info!(connection:% = id; "Connection removed");
        self.events
            .push(DiagramEvent::ConnectionRemoved { connection: id });
        self.flush();
        Ok(())
    }

    /// Removes every connection flagged as stale and returns them.
    pub fn purge_stale(&mut self) -> Vec<ConnectionId> {
        let stale = std::mem::take(&mut self.stale);
        for id in &stale {
            if self.detach_and_remove(*id) {
                self.events
                    .push(DiagramEvent::ConnectionRemoved { connection: *id });
            }
        }
        if !stale.is_empty() {
            info!(count = stale.len(); "Purged stale connections");
        }
        self.flush();
        stale
    }

    // Connection properties

    pub fn set_routing_mode(&mut self, id: ConnectionId, mode: RoutingMode) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_mode(mode)?;
        self.route_changed(id);
        Ok(())
    }

    pub fn set_offset(&mut self, id: ConnectionId, offset: f32) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_offset(offset)?;
        self.route_changed(id);
        Ok(())
    }

    pub fn set_line_style(&mut self, id: ConnectionId, style: LineStyle) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_line_style(style);
        Ok(())
    }

    pub fn set_connection_state(
        &mut self,
        id: ConnectionId,
        state: VisualState,
    ) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_state(state);
        Ok(())
    }

    pub fn set_connection_color(
        &mut self,
        id: ConnectionId,
        color: Option<Color>,
    ) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_color(color);
        Ok(())
    }

    pub fn set_label(&mut self, id: ConnectionId, label: Option<String>) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_label(label);
        Ok(())
    }

    pub fn set_connection_hovered(&mut self, id: ConnectionId, hovered: bool) -> Result<(), DiagramError> {
        self.connection_mut(id)?.set_hovered(hovered);
        Ok(())
    }

    // Connection edits

    pub fn add_control_point(&mut self, id: ConnectionId, point: Point) -> Result<usize, DiagramError> {
        let index = self.connection_mut(id)?.add_control_point(point)?;
        self.route_changed(id);
        Ok(index)
    }

    /// Inserts a control point on the wire body near `pos`.
    pub fn insert_control_point_near(
        &mut self,
        id: ConnectionId,
        pos: Point,
    ) -> Result<usize, DiagramError> {
        let index = self.connection_mut(id)?.insert_control_point_near(pos)?;
        self.route_changed(id);
        Ok(index)
    }

    pub fn remove_control_point(&mut self, id: ConnectionId, index: usize) -> Result<Point, DiagramError> {
        let removed = self.connection_mut(id)?.remove_control_point(index)?;
        self.route_changed(id);
        Ok(removed)
    }

    pub fn move_control_point(
        &mut self,
        id: ConnectionId,
        index: usize,
        point: Point,
    ) -> Result<Point, DiagramError> {
        let previous = self.connection_mut(id)?.move_control_point(index, point)?;
        self.route_changed(id);
        Ok(previous)
    }

    /// Nudges a whole connection by moving all of its control points.
    pub fn translate_connection(&mut self, id: ConnectionId, delta: Point) -> Result<(), DiagramError> {
        let connection = self.connection_mut(id)?;
        let moved = !connection.control_points().is_empty();
        connection.translate(delta)?;
        if moved {
            self.route_changed(id);
        }
        Ok(())
    }

    pub fn select_segment(&mut self, id: ConnectionId, pos: Point) -> Result<Option<usize>, DiagramError> {
        self.connection_mut(id)?.select_segment(pos)
    }

    /// Drags the selected segment; returns whether the route changed.
    pub fn drag_segment(&mut self, id: ConnectionId, drag: Point) -> Result<bool, DiagramError> {
        let moved = self.connection_mut(id)?.drag_segment(drag)?;
        if moved {
            self.route_changed(id);
        }
        Ok(moved)
    }

    pub fn begin_control_point_drag(
        &mut self,
        id: ConnectionId,
        pos: Point,
    ) -> Result<Option<usize>, DiagramError> {
        self.connection_mut(id)?.begin_control_point_drag(pos)
    }

    pub fn drag_control_point(&mut self, id: ConnectionId, pos: Point) -> Result<bool, DiagramError> {
        self.connection_mut(id)?.drag_control_point(pos)
    }

    /// Commits a control-point drag at its preview position.
    pub fn end_control_point_drag(&mut self, id: ConnectionId) -> Result<Option<usize>, DiagramError> {
        let moved = self.connection_mut(id)?.end_control_point_drag()?;
        if moved.is_some() {
            self.route_changed(id);
        }
        Ok(moved)
    }

    /// Drops any in-progress segment selection or control-point drag.
    pub fn cancel_connection_gesture(&mut self, id: ConnectionId) -> Result<(), DiagramError> {
        self.connection_mut(id)?.cancel_gesture();
        Ok(())
    }

    // Hit testing and queries

    /// Topmost block whose body covers `pos`.
    pub fn block_at(&self, pos: Point) -> Option<BlockId> {
        self.blocks
            .values()
            .rev()
            .find(|block| block.contains(pos))
            .map(Block::id)
    }

    /// Topmost port within detection range of `pos`.
    pub fn port_at(&self, pos: Point) -> Option<(BlockId, PortRef)> {
        self.blocks
            .values()
            .rev()
            .find_map(|block| block.port_near(pos).map(|(port, _)| (block.id(), port)))
    }

    /// Topmost control point within detection range of `pos`.
    pub fn control_point_at(&self, pos: Point) -> Option<(ConnectionId, usize)> {
        self.connections
            .values()
            .rev()
            .find_map(|connection| connection.control_point_at(pos).map(|i| (connection.id(), i)))
    }

    /// Topmost adjustable segment within detection range of `pos`.
    pub fn segment_at(&self, pos: Point) -> Option<(ConnectionId, usize)> {
        self.connections
            .values()
            .rev()
            .find_map(|connection| connection.segment_at(pos).map(|i| (connection.id(), i)))
    }

    /// The connection whose end sits on `port` of `block`, if any.
    pub fn connection_at_port(&self, block: BlockId, port: PortRef) -> Option<ConnectionId> {
        let block = self.blocks.get(&block)?;
        let anchor = block.port_position(port)?;
        let candidates = block.connections().iter().filter_map(|id| {
            let connection = self.connections.get(id)?;
            [ConnectionEnd::Source, ConnectionEnd::Target]
                .into_iter()
                .filter_map(|end| connection.endpoint(end))
                .find(|endpoint| {
                    endpoint.block() == block.id() && endpoint.port().side() == port.side()
                })
                .map(|endpoint| (*id, endpoint.anchor()))
        });
        ports::find_attached(anchor, candidates, self.config.port_match_epsilon())
    }

    /// Color to draw `port` in: the attached wire's color, `wire_default`
    /// for a wire without one, or `neutral` when nothing is attached.
    pub fn port_color(
        &self,
        block: BlockId,
        port: PortRef,
        wire_default: Color,
        neutral: Color,
    ) -> Color {
        self.connection_at_port(block, port)
            .and_then(|id| self.connections.get(&id))
            .map_or(neutral, |connection| connection.color().unwrap_or(wire_default))
    }

    // Internals

    fn block_ref(&self, id: BlockId) -> Result<&Block, DiagramError> {
        self.blocks.get(&id).ok_or(DiagramError::UnknownBlock(id))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, DiagramError> {
        self.blocks
            .get_mut(&id)
            .ok_or(DiagramError::UnknownBlock(id))
    }

    fn connection_ref(&self, id: ConnectionId) -> Result<&Connection, DiagramError> {
        self.connections
            .get(&id)
            .ok_or(DiagramError::UnknownConnection(id))
    }

    fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut Connection, DiagramError> {
        self.connections
            .get_mut(&id)
            .ok_or(DiagramError::UnknownConnection(id))
    }

    /// Removes a connection from the arena and from its blocks' lists.
    fn detach_and_remove(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.connections.shift_remove(&id) else {
            return false;
        };
        for block_id in connection.blocks() {
            if let Some(block) = self.blocks.get_mut(&block_id) {
                block.detach_connection(id);
            }
        }
        true
    }

    fn committed(&mut self, id: ConnectionId) {
        let Some(connection) = self.connections.get(&id) else {
            return;
        };
        let source = connection.path().start();
        let target = connection.path().end();
        info!(connection:% = id, mode:% = connection.mode(); "Connection attached");
        self.events.push(DiagramEvent::ConnectionAttached {
            connection: id,
            source,
            target,
        });
        self.flush();
    }

    fn route_changed(&mut self, id: ConnectionId) {
        self.events
            .push(DiagramEvent::ConnectionRouteChanged { connection: id });
        self.flush();
    }

    /// Re-resolves the ports of every connection on `block_id` and rebuilds their paths.
    fn reroute(&mut self, block_id: BlockId) {
        let Some(block) = self.blocks.get(&block_id) else {
            return;
        };
        for &connection_id in block.connections() {
            let Some(connection) = self.connections.get_mut(&connection_id) else {
                warn!(block:% = block_id, connection:% = connection_id; "Skipping re-route of missing connection");
                flag_stale(&mut self.stale, connection_id);
                continue;
            };
            if let Some(missing) = connection
                .blocks()
                .find(|other| !self.blocks.contains_key(other))
            {
                warn!(
                    connection:% = connection_id,
                    missing:% = missing;
                    "Skipping re-route of connection with dangling block"
                );
                flag_stale(&mut self.stale, connection_id);
                continue;
            }

            for end in [ConnectionEnd::Source, ConnectionEnd::Target] {
                let Some(endpoint) = connection.endpoint(end).copied() else {
                    continue;
                };
                if endpoint.block() != block_id {
                    continue;
                }
                let resolved = block.ports().resolve(
                    endpoint.port(),
                    endpoint.side_count(),
                    endpoint.local(),
                );
                let Some(updated) = resolved.and_then(|port| block.endpoint(port)) else {
                    debug!(
                        connection:% = connection_id,
                        end:% = end;
                        "No ports on side, keeping last anchor"
                    );
                    continue;
                };
                let Some(old) = connection.relocate(end, updated) else {
                    continue;
                };
                if old != updated.anchor() {
                    self.events.push(DiagramEvent::ConnectionEndpointChanged {
                        connection: connection_id,
                        end,
                        old,
                        new: updated.anchor(),
                    });
                }
            }

            if let Err(err) = connection.recompute() {
                warn!(connection:% = connection_id, err:%; "Failed to recompute connection");
                continue;
            }
            trace!(connection:% = connection_id, block:% = block_id; "Re-routed connection");
        }
    }

    /// Delivers queued events to the sink.
    fn flush(&mut self) {
        let events = std::mem::take(&mut self.events);
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        for event in &events {
            if let Err(err) = sink.record(event) {
                warn!(err:%; "Persistence sink failed");
            }
        }
    }
}

fn flag_stale(stale: &mut Vec<ConnectionId>, id: ConnectionId) {
    if !stale.contains(&id) {
        stale.push(id);
    }
}

fn no_port(block: BlockId, port: PortRef) -> DiagramError {
    DiagramError::NoPort {
        block,
        side: port.side(),
        index: port.index(),
    }
}
