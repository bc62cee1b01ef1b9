#![deny(unsafe_code)]
//! Particle field with pointer repulsion and a proximity-graph overlay.
//!
//! A fixed batch of particles drifts across the surface. Each frame:
//! particles near the pointer are pushed away, velocity is damped, positions
//! are integrated and wrapped toroidally, and a pulse clock advances. Rendering
//! draws a faint grid, an edge between every pair of close particles, and the
//! particles themselves with a slowly pulsing opacity.
//!
//! Damping and impulses are tuned per frame at a 60 Hz reference rate.
//! [`ParticleField::step`] applies them once per call exactly as tuned;
//! [`Animation::advance`] scales them by elapsed reference frames.

pub mod proximity;

pub use proximity::{edge_alpha, ProximityStrategy, EDGE_ALPHA_SCALE};

use holofield_core::params::{
    check_count, check_range, require_bool, require_count, require_finite, require_positive,
    require_str,
};
use holofield_core::surface::draw_grid;
use holofield_core::{
    Animation, DVec2, FieldError, Fill, PointerState, RandomSource, Srgb, Stroke, Surface,
    ViewportInfo, Xorshift64,
};
use serde_json::{json, Value};

/// Particle count on constrained viewports.
pub const CONSTRAINED_COUNT: usize = 60;
/// Particle count on full-size viewports.
pub const FULL_COUNT: usize = 150;
/// Edge cutoff distance on constrained viewports.
pub const CONSTRAINED_MAX_DIST: f64 = 80.0;
/// Edge cutoff distance on full-size viewports.
pub const FULL_MAX_DIST: f64 = 120.0;

const DEFAULT_REPULSION_RADIUS: f64 = 150.0;
const DEFAULT_REPULSION_STRENGTH: f64 = 0.5;
const DEFAULT_DAMPING: f64 = 0.98;
/// Initial velocity components are drawn from `[-MAX, MAX)`.
const DEFAULT_INITIAL_SPEED: f64 = 0.15;
const DEFAULT_PULSE_RATE: f64 = 0.005;
const DEFAULT_GRID_SPACING: f64 = 60.0;

const RADIUS_RANGE: (f64, f64) = (0.5, 2.5);
const BASE_ALPHA_RANGE: (f64, f64) = (0.05, 0.35);
const PULSE_AMPLITUDE: f64 = 0.05;
/// Largest accepted `count`; the proximity pass is quadratic in it.
pub const MAX_COUNT: usize = 2000;
const MAX_REPULSION_STRENGTH: f64 = 5.0;
const MAX_INITIAL_SPEED: f64 = 5.0;
const MAX_PULSE_RATE: f64 = 0.1;
const MIN_GRID_SPACING: f64 = 1.0;

const GRID_ALPHA: f64 = 0.015;
const LINE_WIDTH: f64 = 0.5;

/// Below this pointer distance the push direction is undefined and
/// [`REPULSION_FALLBACK`] is used instead.
pub const REPULSION_EPSILON: f64 = 1e-9;
/// Push direction for a particle sitting exactly under the pointer.
pub const REPULSION_FALLBACK: DVec2 = DVec2::X;

/// One drifting particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Fixed at creation.
    pub radius: f64,
    /// In `[0.05, 0.35)`.
    pub base_alpha: f64,
    /// Pulse phase offset in `[0, 2π)`.
    pub phase: f64,
}

impl Particle {
    /// Scatters a particle uniformly over `bounds`.
    pub fn random(rng: &mut dyn RandomSource, bounds: DVec2, initial_speed: f64) -> Self {
        let x = rng.next_range(0.0, bounds.x);
        let y = rng.next_range(0.0, bounds.y);
        let vx = rng.next_range(-initial_speed, initial_speed);
        let vy = rng.next_range(-initial_speed, initial_speed);
        Self {
            position: DVec2::new(x, y),
            velocity: DVec2::new(vx, vy),
            radius: rng.next_range(RADIUS_RANGE.0, RADIUS_RANGE.1),
            base_alpha: rng.next_range(BASE_ALPHA_RANGE.0, BASE_ALPHA_RANGE.1),
            phase: rng.next_angle(),
        }
    }

    /// Render opacity at pulse clock `time`. Does not feed back into physics.
    pub fn pulse_alpha(&self, time: f64) -> f64 {
        (self.base_alpha + (2.0 * time + self.phase).sin() * PULSE_AMPLITUDE).clamp(0.0, 1.0)
    }
}

/// Velocity impulse a pointer at `pointer` gives a particle at `position`.
///
/// Inside `radius` the particle is pushed straight away from the pointer with
/// magnitude `(radius − d) / radius · strength`; outside, `None`.
pub fn repulsion_impulse(position: DVec2, pointer: DVec2, radius: f64, strength: f64) -> Option<DVec2> {
    let offset = position - pointer;
    let d = offset.length();
    if !(d < radius) {
        return None;
    }
    let direction = if d > REPULSION_EPSILON {
        offset / d
    } else {
        REPULSION_FALLBACK
    };
    Some(direction * ((radius - d) / radius * strength))
}

/// Maps a coordinate into `[0, extent)`, carrying the overshoot across the
/// opposite edge.
pub fn wrap_coordinate(v: f64, extent: f64) -> f64 {
    if v >= 0.0 && v < extent {
        return v;
    }
    if !v.is_finite() {
        return 0.0;
    }
    let wrapped = v.rem_euclid(extent);
    if wrapped < extent {
        wrapped
    } else {
        0.0
    }
}

/// Tunable constants. `None` values are derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub count: Option<usize>,
    pub max_dist: Option<f64>,
    pub repulsion: Option<bool>,
    pub repulsion_radius: f64,
    pub repulsion_strength: f64,
    /// Velocity multiplier per reference frame.
    pub damping: f64,
    pub initial_speed: f64,
    /// Pulse clock increment per reference frame.
    pub pulse_rate: f64,
    pub grid_spacing: f64,
    pub proximity: ProximityStrategy,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: None,
            max_dist: None,
            repulsion: None,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            damping: DEFAULT_DAMPING,
            initial_speed: DEFAULT_INITIAL_SPEED,
            pulse_rate: DEFAULT_PULSE_RATE,
            grid_spacing: DEFAULT_GRID_SPACING,
            proximity: ProximityStrategy::Pairwise,
        }
    }
}

impl ParticleParams {
    /// Extracts parameters from a JSON object, falling back to defaults for
    /// missing keys and rejecting present-but-invalid ones.
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let d = Self::default();
        let count = match params.get("count") {
            None | Some(Value::Null) => None,
            Some(_) => Some(require_count(params, "count", 0)?),
        };
        let max_dist = match params.get("max_dist") {
            None | Some(Value::Null) => None,
            Some(_) => Some(require_positive(params, "max_dist", FULL_MAX_DIST)?),
        };
        let repulsion = require_bool(params, "repulsion")?;
        let proximity = match require_str(params, "proximity")? {
            Some(name) => ProximityStrategy::from_name(name)?,
            None => d.proximity,
        };
        let parsed = Self {
            count,
            max_dist,
            repulsion,
            repulsion_radius: require_positive(params, "repulsion_radius", d.repulsion_radius)?,
            repulsion_strength: require_finite(params, "repulsion_strength", d.repulsion_strength)?,
            damping: require_finite(params, "damping", d.damping)?,
            initial_speed: require_finite(params, "initial_speed", d.initial_speed)?,
            pulse_rate: require_finite(params, "pulse_rate", d.pulse_rate)?,
            grid_spacing: require_positive(params, "grid_spacing", d.grid_spacing)?,
            proximity,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks the ranges advertised by the parameter schema.
    pub fn validate(&self) -> Result<(), FieldError> {
        if let Some(count) = self.count {
            check_count("count", count, MAX_COUNT)?;
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(FieldError::config("damping", "must be in (0, 1]"));
        }
        check_range("repulsion_strength", self.repulsion_strength, 0.0, MAX_REPULSION_STRENGTH)?;
        check_range("initial_speed", self.initial_speed, 0.0, MAX_INITIAL_SPEED)?;
        check_range("pulse_rate", self.pulse_rate, 0.0, MAX_PULSE_RATE)?;
        if let Some(m) = self.max_dist {
            if !(m.is_finite() && m > 0.0) {
                return Err(FieldError::config("max_dist", "must be finite and > 0"));
            }
        }
        if !(self.repulsion_radius.is_finite() && self.repulsion_radius > 0.0) {
            return Err(FieldError::config("repulsion_radius", "must be finite and > 0"));
        }
        check_range("grid_spacing", self.grid_spacing, MIN_GRID_SPACING, f64::MAX)?;
        Ok(())
    }
}

/// Physics-driven particle field.
///
/// Owns its particles, pulse clock, pointer and random source. The particle
/// count is fixed between resizes; a resize discards and re-scatters the whole
/// batch.
pub struct ParticleField {
    params: ParticleParams,
    rng: Xorshift64,
    particles: Vec<Particle>,
    bounds: DVec2,
    constrained: bool,
    pointer: Option<PointerState>,
    time: f64,
}

impl ParticleField {
    /// Creates a field sized to `viewport` and scatters its particles.
    pub fn new(viewport: &ViewportInfo, seed: u64, params: ParticleParams) -> Result<Self, FieldError> {
        params.validate()?;
        let mut field = Self {
            params,
            rng: Xorshift64::new(seed),
            particles: Vec::new(),
            bounds: DVec2::ZERO,
            constrained: viewport.is_constrained(),
            pointer: None,
            time: 0.0,
        };
        field.resize(viewport);
        Ok(field)
    }

    /// Creates a field from a JSON params object.
    pub fn from_json(viewport: &ViewportInfo, seed: u64, params: &Value) -> Result<Self, FieldError> {
        Self::new(viewport, seed, ParticleParams::from_json(params)?)
    }

    /// Replaces the particle set with `count` fresh particles scattered over
    /// `bounds`.
    pub fn init(&mut self, count: usize, bounds: DVec2) {
        self.bounds = bounds;
        let speed = self.params.initial_speed;
        let rng = &mut self.rng;
        self.particles = (0..count).map(|_| Particle::random(&mut *rng, bounds, speed)).collect();
        tracing::debug!(count, width = bounds.x, height = bounds.y, "particles scattered");
    }

    /// One frame of physics, exactly as tuned: repulsion from `pointer`,
    /// damping, integration, wrap, pulse clock.
    pub fn step(&mut self, pointer: Option<PointerState>) {
        self.integrate(pointer, 1.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for callers that place particles by hand.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> DVec2 {
        self.bounds
    }

    /// Pulse clock.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pointer(&self) -> Option<PointerState> {
        self.pointer
    }

    /// Particle count for the current viewport class.
    pub fn resolved_count(&self) -> usize {
        self.params.count.unwrap_or(if self.constrained {
            CONSTRAINED_COUNT
        } else {
            FULL_COUNT
        })
    }

    /// Edge cutoff for the current viewport class.
    pub fn max_dist(&self) -> f64 {
        self.params.max_dist.unwrap_or(if self.constrained {
            CONSTRAINED_MAX_DIST
        } else {
            FULL_MAX_DIST
        })
    }

    /// Whether the pointer pushes particles. Off by default on constrained
    /// (touch) viewports.
    pub fn repulsion_enabled(&self) -> bool {
        self.params.repulsion.unwrap_or(!self.constrained)
    }

    fn is_degenerate(&self) -> bool {
        !(self.bounds.x > 0.0 && self.bounds.y > 0.0)
    }

    fn integrate(&mut self, pointer: Option<PointerState>, frames: f64) {
        if self.is_degenerate() {
            tracing::trace!("particle tick skipped: degenerate bounds");
            return;
        }
        if !(frames.is_finite() && frames > 0.0) {
            return;
        }
        let damping = if frames == 1.0 {
            self.params.damping
        } else {
            self.params.damping.powf(frames)
        };
        let pointer = pointer
            .filter(|_| self.repulsion_enabled())
            .map(|p| p.position());
        let (radius, strength) = (self.params.repulsion_radius, self.params.repulsion_strength);
        let bounds = self.bounds;

        for p in &mut self.particles {
            if let Some(ptr) = pointer {
                if let Some(impulse) = repulsion_impulse(p.position, ptr, radius, strength) {
                    p.velocity += impulse * frames;
                }
            }
            p.velocity *= damping;
            p.position += p.velocity * frames;
            p.position = DVec2::new(
                wrap_coordinate(p.position.x, bounds.x),
                wrap_coordinate(p.position.y, bounds.y),
            );
        }
        self.time += self.params.pulse_rate * frames;
    }
}

impl Animation for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn resize(&mut self, viewport: &ViewportInfo) {
        self.constrained = viewport.is_constrained();
        let count = self.resolved_count();
        self.init(count, viewport.size());
    }

    fn set_pointer(&mut self, pointer: Option<PointerState>) {
        self.pointer = pointer;
    }

    fn advance(&mut self, frames: f64) {
        self.integrate(self.pointer, frames);
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        if self.is_degenerate() {
            return;
        }
        let accent = Srgb::ACCENT;
        draw_grid(
            surface,
            self.bounds,
            self.params.grid_spacing,
            &Stroke::solid(accent, GRID_ALPHA, LINE_WIDTH),
        );

        let positions: Vec<DVec2> = self.particles.iter().map(|p| p.position).collect();
        let max_dist = self.max_dist();
        let mut edges = 0usize;
        self.params
            .proximity
            .for_each_edge(&positions, max_dist, &mut |i, j, dist| {
                let stroke = Stroke::solid(accent, edge_alpha(dist, max_dist), LINE_WIDTH);
                surface.draw_line(positions[i], positions[j], &stroke);
                edges += 1;
            });

        for p in &self.particles {
            surface.draw_circle(p.position, p.radius, &Fill::new(accent, p.pulse_alpha(self.time)));
        }
        tracing::trace!(particles = self.particles.len(), edges, "particles rendered");
    }

    fn params(&self) -> Value {
        json!({
            "count": self.resolved_count(),
            "max_dist": self.max_dist(),
            "repulsion": self.repulsion_enabled(),
            "repulsion_radius": self.params.repulsion_radius,
            "repulsion_strength": self.params.repulsion_strength,
            "damping": self.params.damping,
            "initial_speed": self.params.initial_speed,
            "pulse_rate": self.params.pulse_rate,
            "grid_spacing": self.params.grid_spacing,
            "proximity": self.params.proximity.name(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": FULL_COUNT,
                "min": 0,
                "max": MAX_COUNT,
                "description": "Particle count (60 on viewports up to 1024 wide, 150 otherwise)"
            },
            "max_dist": {
                "type": "number",
                "default": FULL_MAX_DIST,
                "min": 0.0,
                "description": "Edge cutoff distance (80 on constrained viewports, 120 otherwise)"
            },
            "repulsion": {
                "type": "boolean",
                "default": true,
                "description": "Whether the pointer pushes particles (off by default on constrained viewports)"
            },
            "repulsion_radius": {
                "type": "number",
                "default": DEFAULT_REPULSION_RADIUS,
                "min": 0.0,
                "description": "Pointer influence radius"
            },
            "repulsion_strength": {
                "type": "number",
                "default": DEFAULT_REPULSION_STRENGTH,
                "min": 0.0,
                "max": MAX_REPULSION_STRENGTH,
                "description": "Impulse magnitude at the pointer"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "max": 1.0,
                "description": "Velocity multiplier per 60 Hz frame"
            },
            "initial_speed": {
                "type": "number",
                "default": DEFAULT_INITIAL_SPEED,
                "min": 0.0,
                "max": MAX_INITIAL_SPEED,
                "description": "Half-range of initial velocity components"
            },
            "pulse_rate": {
                "type": "number",
                "default": DEFAULT_PULSE_RATE,
                "min": 0.0,
                "max": MAX_PULSE_RATE,
                "description": "Pulse clock increment per 60 Hz frame"
            },
            "grid_spacing": {
                "type": "number",
                "default": DEFAULT_GRID_SPACING,
                "min": MIN_GRID_SPACING,
                "description": "Background grid spacing"
            },
            "proximity": {
                "type": "string",
                "default": "pairwise",
                "enum": ["pairwise", "grid"],
                "description": "Edge search strategy; both draw identical edges"
            }
        })
    }
}
