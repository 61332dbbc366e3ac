//! Port geometry of a block.
//!
//! Ports are recomputed, never moved: whenever a block's size or declared
//! port counts change, [`PortLayout`] redistributes every anchor. Input
//! anchors sit on the left edge (`x = 0`) and output anchors on the right
//! edge (`x = width`), `N` anchors at `height / (N + 1) * (i + 1)`.
//!
//! All positions in this module are block-local (relative to the block's
//! top-left corner).

use std::{convert::Infallible, fmt, str};

use log::debug;

use weft_core::geometry::{Point, Size};

/// Distances closer than this are treated as equal when picking a port.
const TIE_TOLERANCE: f32 = 1e-3;

/// Which edge of a block a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// A port addressed by side and position within that side.
///
/// The index is not a stable identity: it is re-resolved whenever the side
/// is redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    side: PortSide,
    index: usize,
}

impl PortRef {
    pub fn new(side: PortSide, index: usize) -> Self {
        Self { side, index }
    }

    pub fn input(index: usize) -> Self {
        Self::new(PortSide::Input, index)
    }

    pub fn output(index: usize) -> Self {
        Self::new(PortSide::Output, index)
    }

    pub fn side(self) -> PortSide {
        self.side
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.side, self.index)
    }
}

/// Number of ports on each side of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCounts {
    inputs: usize,
    outputs: usize,
}

impl PortCounts {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(self) -> usize {
        self.inputs
    }

    pub fn outputs(self) -> usize {
        self.outputs
    }

    pub fn on(self, side: PortSide) -> usize {
        match side {
            PortSide::Input => self.inputs,
            PortSide::Output => self.outputs,
        }
    }
}

/// Closed set of block kinds with their default port counts and footprint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// No inputs, one output.
    Source,
    /// One input, one output.
    Filter,
    /// One input, two outputs.
    Splitter,
    /// Two inputs, two outputs, taller footprint.
    Crossbar,
    /// Two inputs, no outputs.
    Sink,
    /// Anything else; one input, one output.
    #[default]
    Custom,
}

impl BlockKind {
    /// Maps a kind name to its kind. Unknown names map to [`BlockKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "source" => Self::Source,
            "filter" => Self::Filter,
            "splitter" => Self::Splitter,
            "crossbar" => Self::Crossbar,
            "sink" => Self::Sink,
            _ => Self::Custom,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Filter => "filter",
            Self::Splitter => "splitter",
            Self::Crossbar => "crossbar",
            Self::Sink => "sink",
            Self::Custom => "custom",
        }
    }

    /// Port counts used until a declaration overrides them.
    pub fn default_ports(self) -> PortCounts {
        match self {
            Self::Source => PortCounts::new(0, 1),
            Self::Filter | Self::Custom => PortCounts::new(1, 1),
            Self::Splitter => PortCounts::new(1, 2),
            Self::Crossbar => PortCounts::new(2, 2),
            Self::Sink => PortCounts::new(2, 0),
        }
    }

    /// Size of a freshly placed block of this kind.
    pub fn default_size(self) -> Size {
        match self {
            Self::Crossbar => Size::new(120.0, 120.0),
            _ => Size::new(120.0, 80.0),
        }
    }
}

impl str::FromStr for BlockKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One port as declared by the block's backing source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDeclaration {
    name: String,
    bit_width: Option<u32>,
}

impl PortDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bit_width: None,
        }
    }

    /// Sets the bit-width annotation (builder style).
    pub fn with_bit_width(mut self, bit_width: u32) -> Self {
        self.bit_width = Some(bit_width);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bit_width(&self) -> Option<u32> {
        self.bit_width
    }

    /// Display label, e.g. `data[7:0]` for an 8-bit port.
    pub fn label(&self) -> String {
        match self.bit_width {
            Some(width) if width > 1 => format!("{}[{}:0]", self.name, width - 1),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DeclaredPorts {
    inputs: Vec<PortDeclaration>,
    outputs: Vec<PortDeclaration>,
}

/// Anchor positions of a block's ports.
#[derive(Debug, Clone, PartialEq)]
pub struct PortLayout {
    kind: BlockKind,
    size: Size,
    declared: Option<DeclaredPorts>,
    inputs: Vec<Point>,
    outputs: Vec<Point>,
    detect_radius: f32,
}

impl PortLayout {
    /// Lays out the default ports of `kind` on a block of `size`.
    pub fn new(kind: BlockKind, size: Size, detect_radius: f32) -> Self {
        let mut layout = Self {
            kind,
            size,
            declared: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            detect_radius,
        };
        layout.recompute();
        layout
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Effective port counts: declared counts if present, kind defaults otherwise.
    pub fn counts(&self) -> PortCounts {
        match &self.declared {
            Some(declared) => PortCounts::new(declared.inputs.len(), declared.outputs.len()),
            None => self.kind.default_ports(),
        }
    }

    pub fn input_ports(&self) -> &[Point] {
        &self.inputs
    }

    pub fn output_ports(&self) -> &[Point] {
        &self.outputs
    }

    pub fn ports(&self, side: PortSide) -> &[Point] {
        match side {
            PortSide::Input => &self.inputs,
            PortSide::Output => &self.outputs,
        }
    }

    pub fn port(&self, port: PortRef) -> Option<Point> {
        self.ports(port.side).get(port.index).copied()
    }

    /// Declarations for `side`, if the block's ports were declared externally.
    pub fn declarations(&self, side: PortSide) -> Option<&[PortDeclaration]> {
        self.declared.as_ref().map(|declared| match side {
            PortSide::Input => declared.inputs.as_slice(),
            PortSide::Output => declared.outputs.as_slice(),
        })
    }

    /// Redistributes every anchor for a new block size.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.recompute();
    }

    /// Replaces the kind defaults with externally declared ports.
    pub fn apply_declared_ports(
        &mut self,
        inputs: Vec<PortDeclaration>,
        outputs: Vec<PortDeclaration>,
    ) {
        debug!(
            inputs = inputs.len(),
            outputs = outputs.len();
            "Applying declared ports"
        );
        self.declared = Some(DeclaredPorts { inputs, outputs });
        self.recompute();
    }

    /// Drops declared ports and returns to the kind defaults.
    pub fn clear_declared_ports(&mut self) {
        self.declared = None;
        self.recompute();
    }

    /// Returns the port closest to `pos` within the detection radius.
    ///
    /// Inputs are checked before outputs, lower indexes before higher ones;
    /// the first of several equidistant ports wins.
    pub fn port_near(&self, pos: Point) -> Option<(PortRef, Point)> {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, point)| (PortRef::input(index), *point));
        let outputs = self
            .outputs
            .iter()
            .enumerate()
            .map(|(index, point)| (PortRef::output(index), *point));

        let mut best: Option<(PortRef, Point, f32)> = None;
        for (port, point) in inputs.chain(outputs) {
            let distance = point.distance(pos);
            if distance > self.detect_radius {
                continue;
            }
            if best.is_none_or(|(_, _, best_distance)| {
                distance < best_distance - TIE_TOLERANCE
            }) {
                best = Some((port, point, distance));
            }
        }
        best.map(|(port, point, _)| (port, point))
    }

    /// Returns the port on `side` closest to `pos`, lowest index on ties.
    pub fn nearest_port(&self, side: PortSide, pos: Point) -> Option<PortRef> {
        let mut best: Option<(usize, f32)> = None;
        for (index, point) in self.ports(side).iter().enumerate() {
            let distance = point.distance(pos);
            if best.is_none_or(|(_, best_distance)| {
                distance < best_distance - TIE_TOLERANCE
            }) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| PortRef::new(side, index))
    }

    /// Re-resolves a port after the side may have been redistributed.
    ///
    /// `previous_count` is the side's port count when `previous` was last
    /// resolved and `previous_local` its block-local position at that time.
    /// When the count is unchanged the index is kept; otherwise the port
    /// nearest to the previous position is chosen. Returns `None` when the
    /// side has no ports.
    pub fn resolve(
        &self,
        previous: PortRef,
        previous_count: usize,
        previous_local: Point,
    ) -> Option<PortRef> {
        let count = self.ports(previous.side).len();
        if count == 0 {
            return None;
        }
        if count == previous_count && previous.index < count {
            return Some(previous);
        }
        let resolved = self.nearest_port(previous.side, previous_local);
        debug!(
            side:% = previous.side,
            previous = previous.index,
            previous_count,
            count,
            resolved:? = resolved.map(PortRef::index);
            "Re-resolved port after redistribution"
        );
        resolved
    }

    fn recompute(&mut self) {
        let counts = self.counts();
        self.inputs = distribute(counts.inputs, 0.0, self.size.height());
        self.outputs = distribute(counts.outputs, self.size.width(), self.size.height());
    }
}

fn distribute(count: usize, x: f32, height: f32) -> Vec<Point> {
    let spacing = height / (count + 1) as f32;
    (0..count)
        .map(|i| Point::new(x, spacing * (i + 1) as f32))
        .collect()
}

/// Finds the attached wire whose endpoint sits on `port`.
///
/// `candidates` yields, per wire, its identifier and the position of its
/// endpoint on the port's side. The first candidate within `epsilon` wins.
pub fn find_attached<K, I>(port: Point, candidates: I, epsilon: f32) -> Option<K>
where
    I: IntoIterator<Item = (K, Point)>,
{
    candidates
        .into_iter()
        .find(|(_, anchor)| anchor.distance(port) <= epsilon)
        .map(|(key, _)| key)
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    /// N declared inputs yield N anchors on the left edge, strictly increasing
    /// and evenly spaced.
    fn check_even_spacing(count: usize, width: f32, height: f32) -> Result<(), TestCaseError> {
        let mut ports = PortLayout::new(BlockKind::Custom, Size::new(width, height), 10.0);
        let inputs = (0..count)
            .map(|i| PortDeclaration::new(format!("in{i}")))
            .collect();
        ports.apply_declared_ports(inputs, Vec::new());

        let anchors = ports.input_ports();
        prop_assert_eq!(anchors.len(), count);
        for anchor in anchors {
            prop_assert_eq!(anchor.x(), 0.0);
        }
        if count >= 2 {
            let step = anchors[1].y() - anchors[0].y();
            prop_assert!(step > 0.0);
            for pair in anchors.windows(2) {
                prop_assert!(pair[1].y() > pair[0].y());
                prop_assert!(approx_eq!(f32, pair[1].y() - pair[0].y(), step, epsilon = 0.01));
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn even_spacing(count in 0usize..12, width in 40.0f32..400.0, height in 40.0f32..400.0) {
            check_even_spacing(count, width, height)?;
        }
    }
}
