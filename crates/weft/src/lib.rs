//! Weft - wire routing, port layout and interactive layout core for schematic editors.
//!
//! Blocks with input and output ports are placed in a [`Diagram`] and joined
//! by routed wires. The core keeps every derived piece of geometry (port
//! anchors, wire paths, draggable segments) consistent as blocks move,
//! resize, rotate or have their port counts changed, and reports committed
//! changes to an optional [`PersistenceSink`].
//!
//! # Modules
//!
//! - [`path`] - Straight, orthogonal and Bezier path synthesis
//! - [`segment`] - Axis-aligned, draggable segments of a path
//! - [`control_points`] - User-placed waypoints of a wire
//! - [`ports`] - Port anchors of a block and block kinds
//! - [`resize`] - The interactive resize gesture
//! - [`connection`] - Wires and their state machine
//! - [`block`] - Placed blocks
//! - [`diagram`] - The owning arena and the re-route cascade
//! - [`sink`] - Persistence events
//! - [`export`] - SVG rendering
//!
//! # Example
//!
//! ```
//! use weft::{
//!     Diagram,
//!     geometry::Point,
//!     path::RoutingMode,
//!     ports::{BlockKind, PortRef},
//! };
//!
//! let mut diagram = Diagram::default();
//! let a = diagram.add_block("a", BlockKind::Source, Point::new(0.0, 0.0), None)?;
//! let b = diagram.add_block("b", BlockKind::Filter, Point::new(300.0, 0.0), None)?;
//! let wire = diagram.connect(a, PortRef::output(0), b, PortRef::input(0), RoutingMode::Orthogonal)?;
//!
//! let path = diagram.connection(wire).unwrap().path();
//! assert_eq!(path.segment_count(), 3);
//! assert_eq!(path.points()[1].x(), 210.0);
//! # Ok::<(), weft::DiagramError>(())
//! ```

pub mod block;
pub mod config;
pub mod connection;
pub mod control_points;
pub mod diagram;
pub mod export;
pub mod path;
pub mod ports;
pub mod resize;
pub mod segment;
pub mod sink;

mod error;

pub use weft_core::{color, geometry, identifier, stroke};

pub use diagram::{AttachOutcome, Diagram};
pub use error::{DiagramError, WeftError};
pub use sink::{DiagramEvent, PersistenceSink, RecordingSink, SinkError};
