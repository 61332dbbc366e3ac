//! Draggable segments derived from a wire path.
//!
//! A [`SegmentIndex`] is rebuilt from a connection's [`Path`] every time the
//! path changes. Only axis-aligned spans are kept: diagonal and degenerate
//! spans, and every span of a cubic curve, cannot be adjusted and are dropped.

use weft_core::geometry::Point;

use crate::path::Path;

/// Orientation of an adjustable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAxis {
    Horizontal,
    Vertical,
}

/// One axis-aligned span of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
    index: usize,
    axis: SegmentAxis,
}

impl Segment {
    /// Position of this span in the path: it joins path points `index` and `index + 1`.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn axis(&self) -> SegmentAxis {
        self.axis
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Perpendicular distance from `pos` to this segment, or `None` when the
    /// projection of `pos` falls beyond either end.
    pub fn distance_to(&self, pos: Point) -> Option<f32> {
        let span = self.end.sub_point(self.start);
        let length_sq = span.dot(span);
        if length_sq <= f32::EPSILON {
            return None;
        }
        let t = pos.sub_point(self.start).dot(span) / length_sq;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(pos.distance(self.start.lerp(self.end, t)))
    }

    /// Positions of the two drag handles shown while the segment is selected.
    ///
    /// Handles sit `distance` away from the midpoint on both sides, across the
    /// segment: left and right of a vertical segment, above and below a
    /// horizontal one.
    pub fn handles(&self, distance: f32) -> [Point; 2] {
        let mid = self.midpoint();
        let normal = match self.axis {
            SegmentAxis::Vertical => Point::new(distance, 0.0),
            SegmentAxis::Horizontal => Point::new(0.0, distance),
        };
        [mid.sub_point(normal), mid.add_point(normal)]
    }
}

/// Axis-aligned segments of one path, with hit testing.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: Vec<Segment>,
    axis_threshold: f32,
    detect_distance: f32,
}

impl SegmentIndex {
    pub fn new(axis_threshold: f32, detect_distance: f32) -> Self {
        Self {
            segments: Vec::new(),
            axis_threshold,
            detect_distance,
        }
    }

    /// Replaces the segments with those derived from `path`.
    pub fn rebuild(&mut self, path: &Path) {
        self.segments.clear();
        if path.is_cubic() {
            return;
        }
        for (index, pair) in path.points().windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let delta = end.sub_point(start).abs();
            let axis = if delta.x() < self.axis_threshold && delta.y() >= self.axis_threshold {
                SegmentAxis::Vertical
            } else if delta.y() < self.axis_threshold && delta.x() >= self.axis_threshold {
                SegmentAxis::Horizontal
            } else {
                continue;
            };
            self.segments.push(Segment {
                start,
                end,
                index,
                axis,
            });
        }
    }

    /// All adjustable segments, in path order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the segment spanning path points `index` and `index + 1`, if it is adjustable.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.index == index)
    }

    /// Returns the path index of the segment closest to `pos`, if any lies
    /// within the detection distance. Ties go to the earlier segment.
    pub fn segment_at(&self, pos: Point) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for segment in &self.segments {
            let Some(distance) = segment.distance_to(pos) else {
                continue;
            };
            if distance >= self.detect_distance {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((segment.index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}
