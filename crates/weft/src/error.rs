//! Error types for Weft operations.
//!
//! [`DiagramError`] is returned by the core's mutation entry points when an
//! operation is rejected before any state changes. Recompute problems found
//! while re-routing (dangling references, sides without ports) are not errors:
//! they are logged and the affected connection is skipped.
//!
//! [`WeftError`] is the top-level error for rendering and tooling.

use std::io;

use thiserror::Error;

use weft_core::geometry::GeometryError;

use crate::{block::BlockId, connection::ConnectionId, ports::PortSide};

/// A rejected diagram operation. The diagram is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("unknown block {0}")]
    UnknownBlock(BlockId),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("block {block} has no {side} port {index}")]
    NoPort {
        block: BlockId,
        side: PortSide,
        index: usize,
    },

    #[error("cannot connect {side} port of block {source_block} to {target_side} port of block {target_block}")]
    IncompatiblePorts {
        source_block: BlockId,
        side: PortSide,
        target_block: BlockId,
        target_side: PortSide,
    },

    #[error("connection {0} is locked")]
    Locked(ConnectionId),

    #[error("connection {0} is not being drawn")]
    NotDrawing(ConnectionId),

    #[error("connection {connection} has no control point {index}")]
    UnknownControlPoint {
        connection: ConnectionId,
        index: usize,
    },
}

/// The main error type for rendering and tooling built on the core.
#[derive(Debug, Error)]
pub enum WeftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Diagram error: {0}")]
    Diagram(#[from] DiagramError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Export error: {0}")]
    Export(String),
}
