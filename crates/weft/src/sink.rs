//! Persistence notifications.
//!
//! The diagram reports every committed change as a [`DiagramEvent`] to an
//! optional [`PersistenceSink`]. Events are delivered only after all derived
//! geometry is consistent, in the order the changes were made. A failing sink
//! is logged and otherwise ignored: persistence is an observer, not a
//! dependency of the core.

use std::{cell::RefCell, io, rc::Rc};

use thiserror::Error;

use weft_core::{
    color::Color,
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    block::BlockId,
    connection::{ConnectionEnd, ConnectionId},
    ports::BlockKind,
};

/// A committed change to the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramEvent {
    BlockAdded {
        block: BlockId,
        name: Id,
        kind: BlockKind,
        position: Point,
        size: Size,
    },
    BlockMoved {
        block: BlockId,
        position: Point,
    },
    BlockResized {
        block: BlockId,
        size: Size,
    },
    BlockRecolored {
        block: BlockId,
        color: Option<Color>,
    },
    BlockRotated {
        block: BlockId,
        rotation: f32,
    },
    BlockRemoved {
        block: BlockId,
    },
    ConnectionAttached {
        connection: ConnectionId,
        source: Point,
        target: Point,
    },
    /// One end of a wire moved. Both anchors are given so a stored edge can
    /// be replaced rather than duplicated.
    ConnectionEndpointChanged {
        connection: ConnectionId,
        end: ConnectionEnd,
        old: Point,
        new: Point,
    },
    /// Mode, offset or control points of a wire changed.
    ConnectionRouteChanged {
        connection: ConnectionId,
    },
    ConnectionRemoved {
        connection: ConnectionId,
    },
}

/// Failure reported by a persistence sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("persistence rejected event: {0}")]
    Rejected(String),

    #[error("persistence I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Receiver of committed diagram changes.
pub trait PersistenceSink {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the event could not be stored. The diagram
    /// logs the failure and continues.
    fn record(&mut self, event: &DiagramEvent) -> Result<(), SinkError>;
}

/// A sink that keeps every event in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// another to the diagram.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<DiagramEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    pub fn events(&self) -> Vec<DiagramEvent> {
        self.events.borrow().clone()
    }

    /// Removes and returns the events recorded so far.
    pub fn take(&self) -> Vec<DiagramEvent> {
        self.events.take()
    }
}

impl PersistenceSink for RecordingSink {
    fn record(&mut self, event: &DiagramEvent) -> Result<(), SinkError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
