//! User-placed waypoints of a connection.

use weft_core::geometry::Point;

use crate::path::Path;

/// Ordered waypoints inserted by the user between a wire's source and target.
///
/// Whenever the store is non-empty the owning connection routes straight
/// through the points in order instead of using its automatic routing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPointStore {
    points: Vec<Point>,
    detect_radius: f32,
}

impl ControlPointStore {
    /// Creates an empty store that grabs points within `detect_radius`.
    pub fn new(detect_radius: f32) -> Self {
        Self {
            points: Vec::new(),
            detect_radius,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a point after the existing ones and returns its index.
    pub fn add(&mut self, point: Point) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Inserts a point at `index`, shifting later points back. Indexes past
    /// the end append.
    pub fn insert(&mut self, index: usize, point: Point) -> usize {
        let index = index.min(self.points.len());
        self.points.insert(index, point);
        index
    }

    /// Removes and returns the point at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Replaces the point at `index`, returning the previous position.
    pub fn update(&mut self, index: usize, point: Point) -> Option<Point> {
        let slot = self.points.get_mut(index)?;
        Some(std::mem::replace(slot, point))
    }

    /// Moves every point by `delta`.
    pub fn translate_all(&mut self, delta: Point) {
        for point in &mut self.points {
            *point = point.add_point(delta);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Returns the index of the point closest to `pos` within the detection
    /// radius. The boundary itself counts as inside.
    pub fn hit_test(&self, pos: Point) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (index, point.distance(pos)))
            .filter(|(_, distance)| *distance <= self.detect_radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
    }

    /// Returns the sampled point of `path` closest to `pos`, together with its
    /// path parameter.
    ///
    /// The path is sampled at `samples + 1` evenly spaced parameters; ties go
    /// to the earliest sample.
    pub fn nearest_on_path(pos: Point, path: &Path, samples: usize) -> (Point, f32) {
        let samples = samples.max(1);
        let mut best = (path.start(), 0.0, pos.distance(path.start()));
        for step in 1..=samples {
            let t = step as f32 / samples as f32;
            let candidate = path.point_at(t);
            let distance = pos.distance(candidate);
            if distance < best.2 {
                best = (candidate, t, distance);
            }
        }
        (best.0, best.1)
    }
}
