//! Path synthesis between two wire endpoints.
//!
//! [`PathBuilder`] turns a pair of anchors, a [`RoutingMode`] and a lateral
//! offset into a [`Path`]. It holds nothing but the clearance constant, so
//! the same builder can be shared by every connection.
//!
//! # Orthogonal topologies
//!
//! With `c` the clearance and `dx = end.x - start.x`:
//!
//! ```text
//!  dx < -2c          -2c <= dx < 0       0 <= dx <= 2c        dx > 2c
//!  LeftDirect        LeftDetour          RightDetour          RightDirect
//!
//!   +----S            +--S                S--+                S----+
//!   |                 |                      |                     |
//!  E+                 +------+         +-----+                     +----E
//!                            |         |
//!                          E-+         +-E
//! ```
//!
//! Direct routes carry the offset on their vertical run (`midX + offset`
//! going left, `midX - offset` going right, so mirrored routes stay mirrored).
//! Detours carry it on their middle horizontal run (`midY + offset`).

use std::{fmt, str};

use log::trace;

use weft_core::geometry::{GeometryError, Point};

/// Path-synthesis algorithm of a connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    Straight,
    #[default]
    Orthogonal,
    Bezier,
}

impl str::FromStr for RoutingMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straight" => Ok(Self::Straight),
            "orthogonal" => Ok(Self::Orthogonal),
            "bezier" | "curved" => Ok(Self::Bezier),
            _ => Err("Invalid routing mode"),
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Straight => "straight",
            Self::Orthogonal => "orthogonal",
            Self::Bezier => "bezier",
        })
    }
}

/// Geometry of a routed wire.
///
/// The first point is always the source anchor and the last point the target
/// anchor (or the live pointer while the wire is being drawn).
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// Straight segments through every point.
    Polyline(Vec<Point>),
    /// One cubic curve: start, first handle, second handle, end.
    Cubic([Point; 4]),
}

impl Path {
    /// Returns the defining points. For a cubic this includes both handles.
    pub fn points(&self) -> &[Point] {
        match self {
            Self::Polyline(points) => points,
            Self::Cubic(points) => points,
        }
    }

    pub fn start(&self) -> Point {
        self.points()[0]
    }

    pub fn end(&self) -> Point {
        let points = self.points();
        points[points.len() - 1]
    }

    pub fn is_cubic(&self) -> bool {
        matches!(self, Self::Cubic(_))
    }

    /// Number of drawn spans: polyline segments, or 1 for a cubic.
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Polyline(points) => points.len().saturating_sub(1),
            Self::Cubic(_) => 1,
        }
    }

    /// Returns the point at parameter `t` in `[0, 1]`.
    ///
    /// Polylines are parameterised by arc length; cubics by the curve parameter.
    pub fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Cubic([p0, p1, p2, p3]) => {
                let u = 1.0 - t;
                p0.scale(u * u * u)
                    .add_point(p1.scale(3.0 * u * u * t))
                    .add_point(p2.scale(3.0 * u * t * t))
                    .add_point(p3.scale(t * t * t))
            }
            Self::Polyline(points) => {
                let total = self.length();
                if total <= f32::EPSILON {
                    return points[0];
                }
                let mut remaining = total * t;
                for pair in points.windows(2) {
                    let span = pair[0].distance(pair[1]);
                    if remaining <= span && span > 0.0 {
                        return pair[0].lerp(pair[1], remaining / span);
                    }
                    remaining -= span;
                }
                self.end()
            }
        }
    }

    /// Index of the span containing parameter `t`. A cubic has a single span.
    pub fn span_at(&self, t: f32) -> usize {
        let Self::Polyline(points) = self else {
            return 0;
        };
        let mut remaining = self.length() * t.clamp(0.0, 1.0);
        for (index, pair) in points.windows(2).enumerate() {
            let span = pair[0].distance(pair[1]);
            if remaining <= span {
                return index;
            }
            remaining -= span;
        }
        self.segment_count().saturating_sub(1)
    }

    /// Length of the polyline, or of the cubic's control polygon.
    pub fn length(&self) -> f32 {
        self.points()
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Returns the SVG path data for this geometry.
    pub fn to_svg_data(&self) -> String {
        match self {
            Self::Polyline(points) => {
                let mut data = format!("M {} {}", points[0].x(), points[0].y());
                for point in &points[1..] {
                    data.push_str(&format!(" L {} {}", point.x(), point.y()));
                }
                data
            }
            Self::Cubic([p0, p1, p2, p3]) => format!(
                "M {} {} C {} {}, {} {}, {} {}",
                p0.x(),
                p0.y(),
                p1.x(),
                p1.y(),
                p2.x(),
                p2.y(),
                p3.x(),
                p3.y()
            ),
        }
    }
}

/// Shape chosen for an orthogonal route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrthogonalTopology {
    /// Target far to the left: horizontal, vertical, horizontal.
    LeftDirect,
    /// Target to the left within twice the clearance: five segments.
    LeftDetour,
    /// Target to the right within twice the clearance: five segments.
    RightDetour,
    /// Target far to the right: horizontal, vertical, horizontal.
    RightDirect,
}

impl OrthogonalTopology {
    /// Index of the segment whose position is controlled by the lateral offset.
    pub fn offset_segment(self) -> usize {
        match self {
            Self::LeftDirect | Self::RightDirect => 1,
            Self::LeftDetour | Self::RightDetour => 2,
        }
    }

    /// Offset change produced by dragging the offset segment by `drag`.
    ///
    /// Only the component perpendicular to the segment counts.
    pub fn offset_delta(self, drag: Point) -> f32 {
        match self {
            Self::LeftDirect => drag.x(),
            Self::RightDirect => -drag.x(),
            Self::LeftDetour | Self::RightDetour => drag.y(),
        }
    }
}

/// Builds wire paths. Stateless apart from the clearance constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathBuilder {
    clearance: f32,
}

impl PathBuilder {
    /// Creates a builder with the given orthogonal clearance (`PORT_SPACING`).
    pub fn new(clearance: f32) -> Self {
        Self { clearance }
    }

    pub fn clearance(&self) -> f32 {
        self.clearance
    }

    /// Builds the automatic route from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] if an endpoint or the offset is
    /// not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft::{geometry::Point, path::{PathBuilder, RoutingMode}};
    ///
    /// let builder = PathBuilder::new(20.0);
    /// let path = builder
    ///     .build_path(Point::new(120.0, 40.0), Point::new(300.0, 40.0), RoutingMode::Orthogonal, 0.0)
    ///     .unwrap();
    /// assert_eq!(path.segment_count(), 3);
    /// assert_eq!(path.points()[1].x(), 210.0);
    /// ```
    pub fn build_path(
        &self,
        start: Point,
        end: Point,
        mode: RoutingMode,
        offset: f32,
    ) -> Result<Path, GeometryError> {
        let start = start.validated()?;
        let end = end.validated()?;
        Point::new(offset, 0.0).validated()?;

        let path = match mode {
            RoutingMode::Straight => Path::Polyline(vec![start, end]),
            RoutingMode::Bezier => Self::bezier(start, end),
            RoutingMode::Orthogonal => self.orthogonal(start, end, offset),
        };
        trace!(mode:?, points = path.points().len(); "Built path");
        Ok(path)
    }

    /// Builds a straight-line route through `waypoints`, ignoring the routing mode.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] if any point is not finite.
    pub fn build_path_with_waypoints(
        &self,
        start: Point,
        end: Point,
        waypoints: &[Point],
    ) -> Result<Path, GeometryError> {
        let mut points = Vec::with_capacity(waypoints.len() + 2);
        points.push(start.validated()?);
        for waypoint in waypoints {
            points.push(waypoint.validated()?);
        }
        points.push(end.validated()?);
        Ok(Path::Polyline(points))
    }

    /// Decides which orthogonal shape connects `start` to `end`.
    pub fn orthogonal_topology(&self, start: Point, end: Point) -> OrthogonalTopology {
        let dx = end.x() - start.x();
        let limit = 2.0 * self.clearance;
        if dx < -limit {
            OrthogonalTopology::LeftDirect
        } else if dx < 0.0 {
            OrthogonalTopology::LeftDetour
        } else if dx <= limit {
            OrthogonalTopology::RightDetour
        } else {
            OrthogonalTopology::RightDirect
        }
    }

    fn orthogonal(&self, start: Point, end: Point, offset: f32) -> Path {
        let mid = start.midpoint(end);
        let c = self.clearance;
        let points = match self.orthogonal_topology(start, end) {
            OrthogonalTopology::LeftDirect => Self::direct(start, end, mid.x() + offset),
            OrthogonalTopology::RightDirect => Self::direct(start, end, mid.x() - offset),
            OrthogonalTopology::LeftDetour => {
                Self::detour(start, end, start.x() - c, end.x() + c, mid.y() + offset)
            }
            OrthogonalTopology::RightDetour => {
                Self::detour(start, end, start.x() + c, end.x() - c, mid.y() + offset)
            }
        };
        Path::Polyline(points)
    }

    fn direct(start: Point, end: Point, x: f32) -> Vec<Point> {
        vec![start, start.with_x(x), end.with_x(x), end]
    }

    fn detour(start: Point, end: Point, exit_x: f32, entry_x: f32, y: f32) -> Vec<Point> {
        vec![
            start,
            start.with_x(exit_x),
            Point::new(exit_x, y),
            Point::new(entry_x, y),
            end.with_x(entry_x),
            end,
        ]
    }

    fn bezier(start: Point, end: Point) -> Path {
        let delta = end.sub_point(start).abs();
        let handle = delta.x().max(delta.y()) / 2.0;
        Path::Cubic([
            start,
            Point::new(start.x() + handle, start.y()),
            Point::new(end.x() - handle, end.y()),
            end,
        ])
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn builder() -> PathBuilder {
        PathBuilder::new(20.0)
    }

    #[test]
    fn test_routing_mode_from_str() {
        assert_eq!("straight".parse(), Ok(RoutingMode::Straight));
        assert_eq!("orthogonal".parse(), Ok(RoutingMode::Orthogonal));
        assert_eq!("bezier".parse(), Ok(RoutingMode::Bezier));
        assert_eq!("curved".parse(), Ok(RoutingMode::Bezier));
        assert!("zigzag".parse::<RoutingMode>().is_err());
    }

    #[test]
    fn test_straight_is_two_points() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(50.0, 70.0);
        let path = builder()
            .build_path(start, end, RoutingMode::Straight, 15.0)
            .unwrap();
        assert_eq!(path, Path::Polyline(vec![start, end]));
    }

    #[test]
    fn test_bezier_handles() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 40.0);
        let path = builder()
            .build_path(start, end, RoutingMode::Bezier, 0.0)
            .unwrap();
        assert_eq!(
            path,
            Path::Cubic([
                start,
                Point::new(50.0, 0.0),
                Point::new(50.0, 40.0),
                end
            ])
        );
    }

    #[test]
    fn test_bezier_uses_larger_delta() {
        let path = builder()
            .build_path(
                Point::new(0.0, 0.0),
                Point::new(10.0, 200.0),
                RoutingMode::Bezier,
                0.0,
            )
            .unwrap();
        assert_eq!(path.points()[1], Point::new(100.0, 0.0));
        assert_eq!(path.points()[2], Point::new(-90.0, 200.0));
    }

    #[test]
    fn test_orthogonal_right_direct() {
        let path = builder()
            .build_path(
                Point::new(120.0, 40.0),
                Point::new(300.0, 100.0),
                RoutingMode::Orthogonal,
                0.0,
            )
            .unwrap();
        assert_eq!(
            path.points(),
            &[
                Point::new(120.0, 40.0),
                Point::new(210.0, 40.0),
                Point::new(210.0, 100.0),
                Point::new(300.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_orthogonal_offset_moves_vertical_run() {
        let start = Point::new(0.0, 0.0);
        let right = builder()
            .build_path(start, Point::new(200.0, 50.0), RoutingMode::Orthogonal, 10.0)
            .unwrap();
        assert_eq!(right.points()[1].x(), 90.0);

        let left = builder()
            .build_path(start, Point::new(-200.0, 50.0), RoutingMode::Orthogonal, 10.0)
            .unwrap();
        assert_eq!(left.points()[1].x(), -90.0);
    }

    #[test]
    fn test_orthogonal_right_detour() {
        let path = builder()
            .build_path(
                Point::new(120.0, 40.0),
                Point::new(140.0, 100.0),
                RoutingMode::Orthogonal,
                5.0,
            )
            .unwrap();
        assert_eq!(
            path.points(),
            &[
                Point::new(120.0, 40.0),
                Point::new(140.0, 40.0),
                Point::new(140.0, 75.0),
                Point::new(120.0, 75.0),
                Point::new(120.0, 100.0),
                Point::new(140.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_orthogonal_left_detour() {
        let path = builder()
            .build_path(
                Point::new(100.0, 0.0),
                Point::new(90.0, 60.0),
                RoutingMode::Orthogonal,
                0.0,
            )
            .unwrap();
        assert_eq!(path.segment_count(), 5);
        assert_eq!(path.points()[1], Point::new(80.0, 0.0));
        assert_eq!(path.points()[2], Point::new(80.0, 30.0));
        assert_eq!(path.points()[3], Point::new(110.0, 30.0));
        assert_eq!(path.points()[4], Point::new(110.0, 60.0));
    }

    #[test]
    fn test_topology_thresholds() {
        let b = builder();
        let start = Point::new(0.0, 0.0);
        assert_eq!(
            b.orthogonal_topology(start, Point::new(-40.1, 0.0)),
            OrthogonalTopology::LeftDirect
        );
        assert_eq!(
            b.orthogonal_topology(start, Point::new(-40.0, 0.0)),
            OrthogonalTopology::LeftDetour
        );
        assert_eq!(
            b.orthogonal_topology(start, Point::new(0.0, 0.0)),
            OrthogonalTopology::RightDetour
        );
        assert_eq!(
            b.orthogonal_topology(start, Point::new(40.0, 0.0)),
            OrthogonalTopology::RightDetour
        );
        assert_eq!(
            b.orthogonal_topology(start, Point::new(40.1, 0.0)),
            OrthogonalTopology::RightDirect
        );
    }

    #[test]
    fn test_offset_delta_signs() {
        let drag = Point::new(7.0, -3.0);
        assert_eq!(OrthogonalTopology::LeftDirect.offset_delta(drag), 7.0);
        assert_eq!(OrthogonalTopology::RightDirect.offset_delta(drag), -7.0);
        assert_eq!(OrthogonalTopology::RightDetour.offset_delta(drag), -3.0);
        assert_eq!(OrthogonalTopology::RightDirect.offset_segment(), 1);
        assert_eq!(OrthogonalTopology::LeftDetour.offset_segment(), 2);
    }

    #[test]
    fn test_waypoints_override_mode() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 100.0);
        let waypoints = [Point::new(30.0, 70.0), Point::new(60.0, 10.0)];
        let path = builder()
            .build_path_with_waypoints(start, end, &waypoints)
            .unwrap();
        assert_eq!(path.points(), &[start, waypoints[0], waypoints[1], end]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let b = builder();
        let ok = Point::new(0.0, 0.0);
        let bad = Point::new(f32::NAN, 0.0);
        assert!(b.build_path(bad, ok, RoutingMode::Straight, 0.0).is_err());
        assert!(b.build_path(ok, bad, RoutingMode::Orthogonal, 0.0).is_err());
        assert!(
            b.build_path(ok, ok, RoutingMode::Orthogonal, f32::INFINITY)
                .is_err()
        );
        assert!(b.build_path_with_waypoints(ok, ok, &[bad]).is_err());
    }

    #[test]
    fn test_point_at_polyline_arc_length() {
        let path = Path::Polyline(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 30.0),
        ]);
        assert_approx_eq!(f32, path.length(), 40.0);
        assert_eq!(path.point_at(0.0), Point::new(0.0, 0.0));
        assert_eq!(path.point_at(0.25), Point::new(10.0, 0.0));
        assert_eq!(path.point_at(1.0), Point::new(10.0, 30.0));
        let mid = path.point_at(0.5);
        assert_approx_eq!(f32, mid.x(), 10.0);
        assert_approx_eq!(f32, mid.y(), 10.0);
    }

    #[test]
    fn test_span_at() {
        let path = Path::Polyline(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 30.0),
        ]);
        assert_eq!(path.span_at(0.0), 0);
        assert_eq!(path.span_at(0.2), 0);
        assert_eq!(path.span_at(0.5), 1);
        assert_eq!(path.span_at(1.0), 1);
    }

    #[test]
    fn test_point_at_degenerate_polyline() {
        let p = Point::new(3.0, 4.0);
        let path = Path::Polyline(vec![p, p]);
        assert_eq!(path.point_at(0.7), p);
    }

    #[test]
    fn test_point_at_cubic_endpoints() {
        let path = builder()
            .build_path(
                Point::new(0.0, 0.0),
                Point::new(100.0, 40.0),
                RoutingMode::Bezier,
                0.0,
            )
            .unwrap();
        assert_eq!(path.point_at(0.0), Point::new(0.0, 0.0));
        assert_eq!(path.point_at(1.0), Point::new(100.0, 40.0));
        let mid = path.point_at(0.5);
        assert_approx_eq!(f32, mid.x(), 50.0);
        assert_approx_eq!(f32, mid.y(), 20.0);
    }

    #[test]
    fn test_svg_data() {
        let line = Path::Polyline(vec![Point::new(10.0, 20.0), Point::new(100.0, 50.0)]);
        assert_eq!(line.to_svg_data(), "M 10 20 L 100 50");

        let curve = Path::Cubic([
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(10.0, 10.0),
        ]);
        assert_eq!(curve.to_svg_data(), "M 0 0 C 5 0, 5 10, 10 10");
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn mode_strategy() -> impl Strategy<Value = RoutingMode> {
        prop_oneof![
            Just(RoutingMode::Straight),
            Just(RoutingMode::Orthogonal),
            Just(RoutingMode::Bezier),
        ]
    }

    /// Every path starts and ends exactly at its anchors.
    fn check_endpoints_are_exact(
        start: Point,
        end: Point,
        mode: RoutingMode,
        offset: f32,
    ) -> Result<(), TestCaseError> {
        let path = PathBuilder::new(20.0)
            .build_path(start, end, mode, offset)
            .unwrap();

        prop_assert_eq!(path.start(), start);
        prop_assert_eq!(path.end(), end);
        Ok(())
    }

    /// Orthogonal routes only contain axis-aligned segments.
    fn check_orthogonal_is_axis_aligned(
        start: Point,
        end: Point,
        offset: f32,
    ) -> Result<(), TestCaseError> {
        let path = PathBuilder::new(20.0)
            .build_path(start, end, RoutingMode::Orthogonal, offset)
            .unwrap();

        for pair in path.points().windows(2) {
            prop_assert!(pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y());
        }
        Ok(())
    }

    /// Routing A->B leftward mirrors routing B'->A' rightward across the
    /// vertical midline, for the same |dx|, dy and offset.
    fn check_mirror_symmetry(
        start: Point,
        dx: f32,
        dy: f32,
        offset: f32,
    ) -> Result<(), TestCaseError> {
        let builder = PathBuilder::new(20.0);
        let end = Point::new(start.x() - dx, start.y() + dy);
        let axis = start.x() + end.x();
        let mirror = |p: Point| Point::new(axis - p.x(), p.y());

        let leftward = builder
            .build_path(start, end, RoutingMode::Orthogonal, offset)
            .unwrap();
        let rightward = builder
            .build_path(mirror(start), mirror(end), RoutingMode::Orthogonal, offset)
            .unwrap();

        prop_assert_eq!(leftward.points().len(), rightward.points().len());
        for (l, r) in leftward.points().iter().zip(rightward.points()) {
            let m = mirror(*l);
            prop_assert!(approx_eq!(f32, m.x(), r.x(), epsilon = 0.01));
            prop_assert!(approx_eq!(f32, m.y(), r.y(), epsilon = 0.01));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn endpoints_are_exact(
            start in point_strategy(),
            end in point_strategy(),
            mode in mode_strategy(),
            offset in -100.0f32..100.0,
        ) {
            check_endpoints_are_exact(start, end, mode, offset)?;
        }

        #[test]
        fn orthogonal_is_axis_aligned(
            start in point_strategy(),
            end in point_strategy(),
            offset in -100.0f32..100.0,
        ) {
            check_orthogonal_is_axis_aligned(start, end, offset)?;
        }

        #[test]
        fn mirror_symmetry(
            start in point_strategy(),
            dx in 0.5f32..500.0,
            dy in -500.0f32..500.0,
            offset in -50.0f32..50.0,
        ) {
            check_mirror_symmetry(start, dx, dy, offset)?;
        }
    }
}
