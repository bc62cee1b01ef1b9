//! Proximity graph between particles.
//!
//! The graph is defined by a distance contract alone: every unordered pair
//! closer than `max_dist` is an edge, drawn with [`edge_alpha`]. How the pairs
//! are found is a [`ProximityStrategy`]; all strategies visit the same edges
//! in the same `(i, j)` order with bit-identical distances.

use holofield_core::{DVec2, FieldError};
use std::collections::HashMap;

/// Peak edge opacity, reached as distance approaches zero.
pub const EDGE_ALPHA_SCALE: f64 = 0.08;

/// Opacity of an edge of length `dist`.
///
/// Strictly decreasing on `[0, max_dist)` and exactly zero from `max_dist` on.
pub fn edge_alpha(dist: f64, max_dist: f64) -> f64 {
    if dist >= 0.0 && dist < max_dist {
        (1.0 - dist / max_dist) * EDGE_ALPHA_SCALE
    } else {
        0.0
    }
}

/// How candidate pairs are enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProximityStrategy {
    /// Every unordered pair: n·(n−1)/2 distance checks. Fine up to a few
    /// hundred particles.
    #[default]
    Pairwise,
    /// Uniform grid with `max_dist` cells; only the 3×3 neighbourhood of
    /// each particle is checked.
    GridBuckets,
}

impl ProximityStrategy {
    pub fn from_name(name: &str) -> Result<Self, FieldError> {
        match name {
            "pairwise" => Ok(ProximityStrategy::Pairwise),
            "grid" => Ok(ProximityStrategy::GridBuckets),
            other => Err(FieldError::config(
                "proximity",
                format!("expected \"pairwise\" or \"grid\", got \"{other}\""),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProximityStrategy::Pairwise => "pairwise",
            ProximityStrategy::GridBuckets => "grid",
        }
    }

    /// Calls `visit(i, j, dist)` for every pair `i < j` with
    /// `dist < max_dist`, ordered by `(i, j)`.
    pub fn for_each_edge(
        &self,
        positions: &[DVec2],
        max_dist: f64,
        visit: &mut dyn FnMut(usize, usize, f64),
    ) {
        if !(max_dist > 0.0) || positions.len() < 2 {
            return;
        }
        match self {
            ProximityStrategy::Pairwise => pairwise(positions, max_dist, visit),
            ProximityStrategy::GridBuckets => grid_buckets(positions, max_dist, visit),
        }
    }
}

fn pairwise(positions: &[DVec2], max_dist: f64, visit: &mut dyn FnMut(usize, usize, f64)) {
    for (i, a) in positions.iter().enumerate() {
        for (j, b) in positions.iter().enumerate().skip(i + 1) {
            let dist = a.distance(*b);
            if dist < max_dist {
                visit(i, j, dist);
            }
        }
    }
}

fn grid_buckets(positions: &[DVec2], max_dist: f64, visit: &mut dyn FnMut(usize, usize, f64)) {
    let cell_of = |p: DVec2| ((p.x / max_dist).floor() as i64, (p.y / max_dist).floor() as i64);

    let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in positions.iter().enumerate() {
        buckets.entry(cell_of(*p)).or_default().push(i);
    }

    let mut edges = Vec::new();
    for (i, a) in positions.iter().enumerate() {
        let (cx, cy) = cell_of(*a);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(members) = buckets.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in members.iter().filter(|&&j| j > i) {
                    let dist = a.distance(positions[j]);
                    if dist < max_dist {
                        edges.push((i, j, dist));
                    }
                }
            }
        }
    }

    edges.sort_unstable_by_key(|&(i, j, _)| (i, j));
    for (i, j, dist) in edges {
        visit(i, j, dist);
    }
}
