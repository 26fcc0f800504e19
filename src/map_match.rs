//! Windowed nearest-edge map matching with off-route hysteresis
//! (spec.md §4.11).
//!
//! # Architecture
//! Matches live GPS fixes against the analyzed route's own polyline
//! (not an external road network — the route the driver is following
//! is exactly the one [`crate::analyzer::analyze`] already walked).
//! Each update searches only a window of edges around the last match
//! first, falling back to a full scan when the window comes up empty
//! or no match exists yet, which keeps steady-state matching cheap
//! without a spatial index.
//!
//! # Hysteresis
//! Off-route is a latched state, not a per-fix decision: the matcher
//! only declares off-route once the cross-track error exceeds
//! `enter_threshold_m`, and only clears it once the error drops below
//! `exit_threshold_m` (strictly smaller than the enter threshold). A
//! fix bouncing around the enter threshold does not chatter the
//! latch.

use crate::geo::{haversine_distance_m, project_point_onto_segment, GeoPoint};

/// Edges either side of the last match to search before falling back
/// to a full scan (spec.md §4.11: `K=200`).
const SEARCH_WINDOW_EDGES: usize = 200;

/// Radius within which a windowed match is accepted without falling
/// back to a full scan (spec.md §4.11: "a generous radius, e.g.
/// 500m"). Independent of `enter_threshold_m` — a fix can be
/// legitimately off-route (error > 100m) while still being the best
/// match the window can offer, in which case the windowed result
/// should still be trusted rather than forcing an O(n) scan.
const WINDOW_FALLBACK_RADIUS_M: f64 = 500.0;

/// Outcome of matching one GPS fix against the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    /// The fix snapped onto the nearest route edge.
    pub snapped_point: GeoPoint,
    /// Cumulative distance along the route to the matched point, in
    /// meters from the route start.
    pub route_progress_m: f64,
    /// Perpendicular distance from the fix to the matched edge.
    pub cross_track_error_m: f64,
    /// Whether the off-route latch is currently engaged.
    pub is_off_route: bool,
    /// Index of the matched edge (`route_points[index], route_points[index + 1]`).
    pub edge_index: usize,
}

/// Matches live positions against a fixed route polyline, holding
/// off-route/on-route hysteresis state across calls.
pub struct MapMatcher {
    route_points: Vec<GeoPoint>,
    cumulative_distance_m: Vec<f64>,
    last_edge_index: Option<usize>,
    is_off_route: bool,
    enter_threshold_m: f64,
    exit_threshold_m: f64,
}

impl MapMatcher {
    /// Builds a matcher over `route_points` with the default
    /// hysteresis thresholds (100m to declare off-route, 50m to clear
    /// it — spec.md §9 open question, resolved as fixed constants).
    ///
    /// # Panics
    /// Panics if `route_points` has fewer than 2 points — there is no
    /// edge to match against.
    pub fn new(route_points: Vec<GeoPoint>) -> Self {
        Self::with_thresholds(route_points, 100.0, 50.0)
    }

    /// As [`MapMatcher::new`], with explicit hysteresis thresholds.
    /// `exit_threshold_m` must be less than `enter_threshold_m` or the
    /// latch could never clear.
    pub fn with_thresholds(route_points: Vec<GeoPoint>, enter_threshold_m: f64, exit_threshold_m: f64) -> Self {
        assert!(route_points.len() >= 2, "route must have at least one edge");
        assert!(exit_threshold_m < enter_threshold_m, "exit threshold must be below enter threshold");

        let mut cumulative_distance_m = Vec::with_capacity(route_points.len());
        let mut total = 0.0;
        cumulative_distance_m.push(0.0);
        for window in route_points.windows(2) {
            total += haversine_distance_m(window[0], window[1]);
            cumulative_distance_m.push(total);
        }

        Self {
            route_points,
            cumulative_distance_m,
            last_edge_index: None,
            is_off_route: false,
            enter_threshold_m,
            exit_threshold_m,
        }
    }

    /// Matches one fix, updating and returning the hysteresis state.
    pub fn match_position(&mut self, fix: GeoPoint) -> MatchOutcome {
        let (edge_index, projection) = self.nearest_edge(fix);
        let distance_m = projection.distance_m;

        if self.is_off_route {
            if distance_m < self.exit_threshold_m {
                self.is_off_route = false;
                log::info!("back on route, cross-track error {distance_m:.0}m");
            }
        } else if distance_m > self.enter_threshold_m {
            self.is_off_route = true;
            log::warn!("off route, cross-track error {distance_m:.0}m");
        }

        self.last_edge_index = Some(edge_index);

        let edge_length_m = self.cumulative_distance_m[edge_index + 1] - self.cumulative_distance_m[edge_index];
        let route_progress_m = self.cumulative_distance_m[edge_index] + projection.t * edge_length_m;

        MatchOutcome {
            snapped_point: projection.snapped_point,
            route_progress_m,
            cross_track_error_m: distance_m,
            is_off_route: self.is_off_route,
            edge_index,
        }
    }

    /// Returns `(edge_index, projection)` of the closest edge to
    /// `fix`, searching the window around the last match first.
    fn nearest_edge(&self, fix: GeoPoint) -> (usize, crate::geo::Projection) {
        let total_edges = self.route_points.len() - 1;

        let search_range: Box<dyn Iterator<Item = usize>> = match self.last_edge_index {
            Some(last) if !self.is_off_route => {
                let lo = last.saturating_sub(SEARCH_WINDOW_EDGES);
                let hi = (last + SEARCH_WINDOW_EDGES).min(total_edges - 1);
                Box::new(lo..=hi)
            }
            _ => Box::new(0..total_edges),
        };

        let windowed_best = search_range
            .map(|i| (i, project_point_onto_segment(fix, self.route_points[i], self.route_points[i + 1])))
            .min_by(|(_, a), (_, b)| a.distance_m.partial_cmp(&b.distance_m).unwrap());

        match windowed_best {
            Some((i, projection)) if projection.distance_m <= WINDOW_FALLBACK_RADIUS_M => (i, projection),
            _ => {
                // Window missed (or there was no prior match); fall
                // back to a full scan.
                (0..total_edges)
                    .map(|i| (i, project_point_onto_segment(fix, self.route_points[i], self.route_points[i + 1])))
                    .min_by(|(_, a), (_, b)| a.distance_m.partial_cmp(&b.distance_m).unwrap())
                    .expect("at least one edge exists")
            }
        }
    }
}
