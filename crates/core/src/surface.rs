//! Drawing-surface abstraction the fields render through.
//!
//! A field never touches pixels directly; it issues [`Surface`] calls in
//! logical coordinates. Implementations include the browser 2D canvas, a
//! software rasterizer and the [`RecordingSurface`] below, which keeps the
//! calls for inspection.

use crate::color::Srgb;
use crate::viewport::ViewportInfo;
use glam::DVec2;
use serde::Serialize;

/// Dash pattern for a stroke, in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DashPattern {
    #[default]
    Solid,
    Dashed { on: f64, off: f64 },
}

impl DashPattern {
    /// The `[on, off]` pair, or `None` for a solid line.
    pub fn intervals(&self) -> Option<[f64; 2]> {
        match *self {
            DashPattern::Solid => None,
            DashPattern::Dashed { on, off } => Some([on, off]),
        }
    }

    /// Whether the point at arc length `distance` along a path is inked.
    pub fn is_on(&self, distance: f64) -> bool {
        match *self {
            DashPattern::Solid => true,
            DashPattern::Dashed { on, off } => {
                let period = on + off;
                period <= 0.0 || distance.rem_euclid(period) < on
            }
        }
    }
}

/// Line style: color, opacity, width and dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Srgb,
    pub alpha: f64,
    pub width: f64,
    pub dash: DashPattern,
}

impl Stroke {
    pub fn solid(color: Srgb, alpha: f64, width: f64) -> Self {
        Self {
            color,
            alpha,
            width,
            dash: DashPattern::Solid,
        }
    }

    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = dash;
        self
    }
}

/// Fill style for circles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    pub color: Srgb,
    pub alpha: f64,
}

impl Fill {
    pub fn new(color: Srgb, alpha: f64) -> Self {
        Self { color, alpha }
    }
}

/// Output side of a field: something that can be cleared and drawn on.
///
/// Coordinates are logical units; implementations apply the pixel scale
/// themselves. The trait is object-safe.
pub trait Surface {
    /// Adopts a new logical size and pixel scale.
    fn resize(&mut self, viewport: &ViewportInfo);

    /// Erases everything drawn so far.
    fn clear(&mut self);

    fn draw_line(&mut self, from: DVec2, to: DVec2, stroke: &Stroke);

    fn draw_circle(&mut self, center: DVec2, radius: f64, fill: &Fill);

    /// Strokes a connected path. The default issues one line per segment,
    /// which restarts the dash pattern at each vertex; surfaces with native
    /// path support should override it.
    fn draw_polyline(&mut self, points: &[DVec2], stroke: &Stroke) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], stroke);
        }
    }

    /// Composites a row-major RGBA8 image at the logical origin, one image
    /// pixel per logical unit.
    fn draw_pixels(&mut self, width: usize, height: usize, rgba: &[u8]);
}

/// Upper bound on grid lines per axis.
pub const MAX_GRID_LINES: usize = 4096;

/// Strokes a static background grid: vertical lines at `x = 0, spacing, ...`
/// below `size.x`, then horizontal lines likewise. Nothing is drawn for a
/// non-positive spacing, and each axis stops after [`MAX_GRID_LINES`].
pub fn draw_grid(surface: &mut dyn Surface, size: DVec2, spacing: f64, stroke: &Stroke) {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return;
    }
    for x in grid_offsets(size.x, spacing) {
        surface.draw_line(DVec2::new(x, 0.0), DVec2::new(x, size.y), stroke);
    }
    for y in grid_offsets(size.y, spacing) {
        surface.draw_line(DVec2::new(0.0, y), DVec2::new(size.x, y), stroke);
    }
}

fn grid_offsets(extent: f64, spacing: f64) -> impl Iterator<Item = f64> {
    (0_u64..)
        .map(move |k| k as f64 * spacing)
        .take_while(move |&v| v < extent)
        .take(MAX_GRID_LINES)
}

/// A single recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum DrawCommand {
    Line {
        from: DVec2,
        to: DVec2,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<DVec2>,
        stroke: Stroke,
    },
    Circle {
        center: DVec2,
        radius: f64,
        fill: Fill,
    },
    Pixels {
        width: usize,
        height: usize,
        rgba: Vec<u8>,
    },
}

/// Per-kind command counts for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub lines: usize,
    pub polylines: usize,
    pub circles: usize,
    pub pixel_blits: usize,
}

/// Surface that stores every call made since the last `clear()`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    viewport: Option<ViewportInfo>,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the most recent `clear()`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times `clear()` was called.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Last viewport passed to `resize()`.
    pub fn viewport(&self) -> Option<ViewportInfo> {
        self.viewport
    }

    pub fn lines(&self) -> impl Iterator<Item = (DVec2, DVec2, &Stroke)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, stroke } => Some((*from, *to, stroke)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[DVec2], &Stroke)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, stroke } => Some((points.as_slice(), stroke)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (DVec2, f64, &Fill)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                fill,
            } => Some((*center, *radius, fill)),
            _ => None,
        })
    }

    pub fn summary(&self) -> DrawSummary {
        self.commands
            .iter()
            .fold(DrawSummary::default(), |mut s, c| {
                match c {
                    DrawCommand::Line { .. } => s.lines += 1,
                    DrawCommand::Polyline { .. } => s.polylines += 1,
                    DrawCommand::Circle { .. } => s.circles += 1,
                    DrawCommand::Pixels { .. } => s.pixel_blits += 1,
                }
                s
            })
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, viewport: &ViewportInfo) {
        self.viewport = Some(*viewport);
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, stroke: &Stroke) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn draw_circle(&mut self, center: DVec2, radius: f64, fill: &Fill) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill: *fill,
        });
    }

    fn draw_polyline(&mut self, points: &[DVec2], stroke: &Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn draw_pixels(&mut self, width: usize, height: usize, rgba: &[u8]) {
        self.commands.push(DrawCommand::Pixels {
            width,
            height,
            rgba: rgba.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Surface that only implements the required methods, to exercise the
    /// provided `draw_polyline`.
    #[derive(Default)]
    struct SegmentCounter {
        segments: Vec<(DVec2, DVec2)>,
    }

    impl Surface for SegmentCounter {
        fn resize(&mut self, _viewport: &ViewportInfo) {}
        fn clear(&mut self) {}
        fn draw_line(&mut self, from: DVec2, to: DVec2, _stroke: &Stroke) {
            self.segments.push((from, to));
        }
        fn draw_circle(&mut self, _center: DVec2, _radius: f64, _fill: &Fill) {}
        fn draw_pixels(&mut self, _width: usize, _height: usize, _rgba: &[u8]) {}
    }

    #[test]
    fn default_polyline_splits_into_segments() {
        let mut s = SegmentCounter::default();
        let pts = [DVec2::ZERO, DVec2::new(2.0, 0.0), DVec2::new(4.0, 1.0)];
        s.draw_polyline(&pts, &Stroke::solid(Srgb::ACCENT, 1.0, 1.0));
        assert_eq!(s.segments, vec![(pts[0], pts[1]), (pts[1], pts[2])]);
    }

    #[test]
    fn default_polyline_with_single_point_draws_nothing() {
        let mut s = SegmentCounter::default();
        s.draw_polyline(&[DVec2::ONE], &Stroke::solid(Srgb::ACCENT, 1.0, 1.0));
        assert!(s.segments.is_empty());
    }

    #[test]
    fn dash_pattern_alternates_on_and_off() {
        let dash = DashPattern::Dashed { on: 6.0, off: 8.0 };
        assert!(dash.is_on(0.0));
        assert!(dash.is_on(5.9));
        assert!(!dash.is_on(6.0));
        assert!(!dash.is_on(13.9));
        assert!(dash.is_on(14.0));
        assert!(DashPattern::Solid.is_on(1e9));
        assert_eq!(dash.intervals(), Some([6.0, 8.0]));
        assert_eq!(DashPattern::Solid.intervals(), None);
    }

    #[test]
    fn recording_surface_clear_starts_a_new_frame() {
        let mut s = RecordingSurface::new();
        let fill = Fill::new(Srgb::ACCENT, 0.5);
        s.draw_circle(DVec2::ZERO, 1.0, &fill);
        s.clear();
        s.draw_circle(DVec2::ONE, 2.0, &fill);
        assert_eq!(s.clears(), 1);
        assert_eq!(s.commands().len(), 1);
        let (center, radius, _) = s.circles().next().unwrap();
        assert_eq!(center, DVec2::ONE);
        assert!((radius - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_counts_each_kind() {
        let mut s = RecordingSurface::new();
        let stroke = Stroke::solid(Srgb::ACCENT, 0.1, 0.5);
        s.draw_line(DVec2::ZERO, DVec2::ONE, &stroke);
        s.draw_line(DVec2::ONE, DVec2::ZERO, &stroke);
        s.draw_polyline(&[DVec2::ZERO, DVec2::ONE], &stroke);
        s.draw_circle(DVec2::ZERO, 1.0, &Fill::new(Srgb::ACCENT, 1.0));
        s.draw_pixels(1, 1, &[0, 0, 0, 255]);
        assert_eq!(
            s.summary(),
            DrawSummary {
                lines: 2,
                polylines: 1,
                circles: 1,
                pixel_blits: 1
            }
        );
    }

    #[test]
    fn grid_covers_the_surface_at_fixed_spacing() {
        let mut s = RecordingSurface::new();
        let stroke = Stroke::solid(Srgb::ACCENT, 0.015, 0.5);
        draw_grid(&mut s, DVec2::new(130.0, 60.0), 60.0, &stroke);
        let lines: Vec<_> = s.lines().map(|(a, b, _)| (a, b)).collect();
        // verticals at 0, 60, 120; horizontals at 0 only (60 is not < 60)
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], (DVec2::new(120.0, 0.0), DVec2::new(120.0, 60.0)));
        assert_eq!(lines[3], (DVec2::ZERO, DVec2::new(130.0, 0.0)));
    }

    #[test]
    fn grid_with_zero_spacing_draws_nothing() {
        let mut s = RecordingSurface::new();
        draw_grid(&mut s, DVec2::new(10.0, 10.0), 0.0, &Stroke::solid(Srgb::ACCENT, 1.0, 1.0));
        assert!(s.commands().is_empty());
    }

    #[test]
    fn grid_with_tiny_spacing_stops_at_the_line_cap() {
        let mut s = RecordingSurface::new();
        let stroke = Stroke::solid(Srgb::ACCENT, 0.015, 0.5);
        draw_grid(&mut s, DVec2::new(1440.0, 900.0), 1e-20, &stroke);
        assert_eq!(s.summary().lines, 2 * MAX_GRID_LINES);
    }

    #[test]
    fn grid_offsets_are_exact_multiples_of_spacing() {
        let mut s = RecordingSurface::new();
        draw_grid(&mut s, DVec2::new(1.0, 0.0), 0.1, &Stroke::solid(Srgb::ACCENT, 1.0, 1.0));
        let xs: Vec<f64> = s.lines().map(|(a, _, _)| a.x).collect();
        assert_eq!(xs.len(), 10);
        assert_eq!(xs[3], 3.0 * 0.1);
    }

    #[test]
    fn summary_serializes_to_json_object() {
        let v = serde_json::to_value(DrawSummary::default()).unwrap();
        assert_eq!(v["lines"], 0);
        assert_eq!(v["pixel_blits"], 0);
    }
}
