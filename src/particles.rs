use macroquad::prelude::*;
use ::rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{self, FieldConfig};
use crate::error::ConfigError;
use crate::palette::with_alpha;
use crate::schedule::PeriodicTask;
use crate::surface::Surface;

const STAR_POINTS: usize = config::SPARKLE_SPIKES * 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Leaf,
    Sparkle,
    Bubble,
}

impl ParticleKind {
    pub const ALL: [Self; 3] = [Self::Leaf, Self::Sparkle, Self::Bubble];

    pub fn label(self) -> &'static str {
        match self {
            Self::Leaf => "Leaf",
            Self::Sparkle => "Sparkle",
            Self::Bubble => "Bubble",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "leaf" | "leaves" => Ok(Self::Leaf),
            "sparkle" | "sparkles" | "star" => Ok(Self::Sparkle),
            "bubble" | "bubbles" => Ok(Self::Bubble),
            _ => Err(ConfigError::UnknownKind(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Frames since spawn.
    pub age: u32,
    pub max_age: u32,
    pub size: f32,
    pub color: Color,
    pub kind: ParticleKind,
}

impl Particle {
    /// Linear fade: 1 at spawn, 0 at `max_age`.
    pub fn opacity(&self) -> f32 {
        if self.max_age == 0 {
            return 0.0;
        }
        (1.0 - self.age as f32 / self.max_age as f32).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.age < self.max_age && self.pos.y > -config::PARTICLE_TOP_MARGIN
    }

    fn integrate(&mut self) {
        self.pos += self.velocity;
        self.velocity.y += config::PARTICLE_GRAVITY;
        self.age += 1;
    }
}

/// Spawn a particle just below the bottom edge of a surface of size `bounds`.
pub fn spawn_particle(rng: &mut impl Rng, bounds: Vec2, config: &FieldConfig) -> Particle {
    let palette = config.palette();
    let kinds = config.kinds();
    Particle {
        pos: vec2(
            rng.gen::<f32>() * bounds.x,
            bounds.y + config::PARTICLE_SPAWN_OFFSET,
        ),
        velocity: vec2(
            rng.gen_range(-config::PARTICLE_DRIFT_MAX..config::PARTICLE_DRIFT_MAX),
            -rng.gen_range(config::PARTICLE_RISE_MIN..config::PARTICLE_RISE_MAX),
        ),
        age: 0,
        max_age: rng.gen_range(config::PARTICLE_MIN_AGE..config::PARTICLE_MAX_AGE),
        size: rng.gen_range(config::PARTICLE_SIZE_MIN..config::PARTICLE_SIZE_MAX),
        color: palette[rng.gen_range(0..palette.len())],
        kind: kinds[rng.gen_range(0..kinds.len())],
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParticleShape {
    /// Leaf: ellipse spinning with age.
    Ellipse { center: Vec2, radii: Vec2, rotation: f32 },
    /// Sparkle: star polygon alternating outer and inner radius.
    Star { points: [Vec2; STAR_POINTS] },
    /// Bubble: disc fading out toward its rim.
    Gradient { center: Vec2, radius: f32 },
}

/// Shape and faded color a particle should be painted with this frame.
pub fn particle_shape(p: &Particle) -> (ParticleShape, Color) {
    let color = with_alpha(p.color, p.color.a * p.opacity());
    let shape = match p.kind {
        ParticleKind::Leaf => ParticleShape::Ellipse {
            center: p.pos,
            radii: vec2(p.size, p.size * config::LEAF_ASPECT),
            rotation: p.age as f32 * config::LEAF_SPIN_PER_FRAME,
        },
        ParticleKind::Sparkle => {
            let inner = p.size * config::SPARKLE_INNER_RATIO;
            let mut points = [Vec2::ZERO; STAR_POINTS];
            for (i, point) in points.iter_mut().enumerate() {
                let radius = if i % 2 == 0 { p.size } else { inner };
                let angle = i as f32 * std::f32::consts::PI / config::SPARKLE_SPIKES as f32;
                *point = p.pos + Vec2::from_angle(angle) * radius;
            }
            ParticleShape::Star { points }
        }
        ParticleKind::Bubble => ParticleShape::Gradient {
            center: p.pos,
            radius: p.size,
        },
    };
    (shape, color)
}

/// Ambient emitter: keeps a pool of rising leaves, sparkles and bubbles topped up
/// to the configured count, confined to a host surface.
pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<Particle>,
    rng: ChaCha8Rng,
    bounds: Option<Vec2>,
    frame_task: Option<PeriodicTask>,
    frame_count: u64,
}

impl ParticleField {
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(config.particle_count()),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bounds: None,
            frame_task: None,
            frame_count: 0,
        }
    }

    /// Mount: registers the per-frame task with an empty pool. No-op when running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.particles.clear();
        let task = PeriodicTask::every_frame();
        info!(
            task = task.cadence().label(),
            target_count = self.config.particle_count(),
            kinds = ?self.config.kinds(),
            "particle field started"
        );
        self.frame_task = Some(task);
    }

    /// Teardown: cancels the per-frame task. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(task) = self.frame_task.take() {
            task.cancel();
            info!(frames = self.frame_count, "particle field stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_task.as_ref().is_some_and(|t| t.is_active())
    }

    /// Swap in a new configuration. Excess particles are not culled; they age out.
    pub fn reconfigure(&mut self, config: FieldConfig) {
        debug!(
            target_count = config.particle_count(),
            kinds = ?config.kinds(),
            "particle field reconfigured"
        );
        self.config = config;
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run every frame step that is due. Returns the number of steps taken.
    pub fn update(&mut self, frame_time: f64, surface: &mut impl Surface) -> u32 {
        let due = match self.frame_task.as_mut() {
            Some(task) => task.poll(frame_time),
            None => return 0,
        };
        let mut ran = 0;
        for _ in 0..due {
            if self.frame(surface) {
                ran += 1;
            }
        }
        ran
    }

    /// One display refresh. A detached surface skips the frame entirely.
    fn frame(&mut self, surface: &mut impl Surface) -> bool {
        let Some(size) = surface.size() else {
            return false;
        };
        self.resize(size);

        surface.clear();
        self.advance();
        self.replenish();
        self.draw(surface);
        self.frame_count += 1;
        true
    }

    /// Only future spawns see the new size; live particles keep their coordinates.
    fn resize(&mut self, size: Vec2) {
        if self.bounds != Some(size) {
            debug!(width = size.x, height = size.y, "particle surface resized");
            self.bounds = Some(size);
        }
    }

    fn advance(&mut self) {
        for p in &mut self.particles {
            p.integrate();
        }
        self.particles.retain(Particle::is_alive);
    }

    fn replenish(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        while self.particles.len() < self.config.particle_count() {
            let particle = spawn_particle(&mut self.rng, bounds, &self.config);
            self.particles.push(particle);
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for p in &self.particles {
            match particle_shape(p) {
                (ParticleShape::Ellipse { center, radii, rotation }, color) => {
                    surface.fill_ellipse(center, radii, rotation, color)
                }
                (ParticleShape::Star { points }, color) => surface.fill_polygon(&points, color),
                (ParticleShape::Gradient { center, radius }, color) => {
                    surface.fill_radial_gradient(center, radius, color)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use crate::surface::recording::{Drawn, RecordingSurface};

    const FRAME: f64 = 1.0 / 60.0;

    fn field(count: usize, kinds: &[ParticleKind]) -> ParticleField {
        let cfg = FieldConfig::new(count, vec![palette::GOLD, palette::TOMATO], kinds).unwrap();
        ParticleField::new(cfg, 7)
    }

    fn particle(kind: ParticleKind, age: u32, max_age: u32) -> Particle {
        Particle {
            pos: vec2(50.0, 50.0),
            velocity: vec2(0.0, -1.0),
            age,
            max_age,
            size: 4.0,
            color: palette::GOLD,
            kind,
        }
    }

    #[test]
    fn frame_fills_pool_to_target_before_drawing() {
        let mut f = field(30, &ParticleKind::ALL);
        let mut surface = RecordingSurface::sized(400.0, 300.0);
        f.start();

        assert_eq!(f.update(FRAME, &mut surface), 1);
        assert_eq!(f.len(), 30);
        assert_eq!(surface.drawn.len(), 30);
        assert_eq!(surface.clears, 1);

        for _ in 0..500 {
            f.update(FRAME, &mut surface);
            assert_eq!(f.len(), 30);
        }
    }

    #[test]
    fn expired_particles_are_gone_next_frame() {
        let mut f = field(1, &[ParticleKind::Leaf]);
        let mut surface = RecordingSurface::sized(400.0, 300.0);
        f.start();
        f.update(FRAME, &mut surface);

        f.particles[0] = particle(ParticleKind::Leaf, 9, 10);
        f.update(FRAME, &mut surface);

        // The old particle reached age == max_age and was replaced by a fresh spawn.
        assert_eq!(f.len(), 1);
        assert_eq!(f.particles[0].age, 0);
        assert!(f.particles.iter().all(|p| p.age < p.max_age));
    }

    #[test]
    fn particles_past_the_top_margin_are_culled() {
        let mut p = particle(ParticleKind::Bubble, 0, 100);
        p.pos.y = -config::PARTICLE_TOP_MARGIN + 0.5;
        p.velocity.y = -1.0;
        assert!(p.is_alive());
        p.integrate();
        assert!(!p.is_alive());
    }

    #[test]
    fn opacity_fades_linearly_to_zero() {
        let mut p = particle(ParticleKind::Sparkle, 0, 120);
        let mut last = p.opacity();
        assert_eq!(last, 1.0);
        while p.age < p.max_age {
            p.integrate();
            let now = p.opacity();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn spawns_rise_from_the_bottom_edge() {
        let cfg = FieldConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let bounds = vec2(640.0, 480.0);
        for _ in 0..200 {
            let p = spawn_particle(&mut rng, bounds, &cfg);
            assert!(p.pos.x >= 0.0 && p.pos.x <= bounds.x);
            assert_eq!(p.pos.y, bounds.y + config::PARTICLE_SPAWN_OFFSET);
            assert!(p.velocity.y < 0.0);
            assert!(p.velocity.x.abs() <= config::PARTICLE_DRIFT_MAX);
            assert!((config::PARTICLE_MIN_AGE..config::PARTICLE_MAX_AGE).contains(&p.max_age));
            assert!(p.size >= config::PARTICLE_SIZE_MIN && p.size < config::PARTICLE_SIZE_MAX);
            assert!(cfg.palette().contains(&p.color));
            assert_eq!(p.age, 0);
        }
    }

    #[test]
    fn spawns_only_use_enabled_kinds() {
        let mut f = field(100, &[ParticleKind::Bubble]);
        let mut surface = RecordingSurface::sized(200.0, 200.0);
        f.start();
        f.update(FRAME, &mut surface);
        assert!(f.particles().iter().all(|p| p.kind == ParticleKind::Bubble));
        assert!(surface
            .drawn
            .iter()
            .all(|d| matches!(d, Drawn::Gradient { .. })));
    }

    #[test]
    fn same_seed_gives_same_field() {
        let mut a = field(20, &ParticleKind::ALL);
        let mut b = field(20, &ParticleKind::ALL);
        let mut sa = RecordingSurface::sized(300.0, 300.0);
        let mut sb = RecordingSurface::sized(300.0, 300.0);
        a.start();
        b.start();
        for _ in 0..50 {
            a.update(FRAME, &mut sa);
            b.update(FRAME, &mut sb);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn detached_surface_skips_frame_then_recovers() {
        let mut f = field(10, &ParticleKind::ALL);
        let mut surface = RecordingSurface::default();
        f.start();

        assert_eq!(f.update(FRAME, &mut surface), 0);
        assert_eq!(f.len(), 0);
        assert_eq!(surface.clears, 0);

        surface.size = Some(vec2(100.0, 100.0));
        assert_eq!(f.update(FRAME, &mut surface), 1);
        assert_eq!(f.len(), 10);
    }

    #[test]
    fn resize_affects_only_future_spawns() {
        let mut f = field(5, &[ParticleKind::Leaf]);
        let mut surface = RecordingSurface::sized(100.0, 100.0);
        f.start();
        f.update(FRAME, &mut surface);
        let before: Vec<Vec2> = f.particles().iter().map(|p| p.pos).collect();

        f.particles[0].max_age = 1;
        surface.size = Some(vec2(1000.0, 800.0));
        f.update(FRAME, &mut surface);

        // Survivors only moved by their own velocity.
        for (p, old) in f.particles().iter().take(4).zip(before.iter().skip(1)) {
            assert!((p.pos - (*old + (p.velocity - vec2(0.0, config::PARTICLE_GRAVITY)))).length() < 1e-4);
        }
        let fresh = f.particles().last().unwrap();
        assert_eq!(fresh.pos.y, 800.0 + config::PARTICLE_SPAWN_OFFSET);
    }

    #[test]
    fn stop_is_idempotent_and_freezes_the_pool() {
        let mut f = field(12, &ParticleKind::ALL);
        let mut surface = RecordingSurface::sized(300.0, 200.0);
        f.start();
        f.update(FRAME, &mut surface);
        assert!(f.is_running());

        f.stop();
        f.stop();
        assert!(!f.is_running());

        let snapshot = f.particles().to_vec();
        let frames = f.frame_count();
        for _ in 0..30 {
            assert_eq!(f.update(FRAME, &mut surface), 0);
        }
        assert_eq!(f.particles(), snapshot.as_slice());
        assert_eq!(f.frame_count(), frames);
    }

    #[test]
    fn restart_begins_with_a_fresh_pool() {
        let mut f = field(8, &ParticleKind::ALL);
        let mut surface = RecordingSurface::sized(300.0, 200.0);
        f.start();
        for _ in 0..20 {
            f.update(FRAME, &mut surface);
        }
        f.stop();
        f.start();
        assert_eq!(f.len(), 0);
        f.update(FRAME, &mut surface);
        assert!(f.particles().iter().all(|p| p.age == 0));
    }

    #[test]
    fn leaf_shape_spins_with_age() {
        let p = particle(ParticleKind::Leaf, 40, 80);
        let (shape, color) = particle_shape(&p);
        match shape {
            ParticleShape::Ellipse { center, radii, rotation } => {
                assert_eq!(center, p.pos);
                assert_eq!(radii, vec2(4.0, 4.0 * config::LEAF_ASPECT));
                assert!((rotation - 40.0 * config::LEAF_SPIN_PER_FRAME).abs() < 1e-6);
            }
            other => panic!("expected ellipse, got {other:?}"),
        }
        assert!((color.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sparkle_shape_alternates_radii() {
        let p = particle(ParticleKind::Sparkle, 0, 80);
        let (shape, _) = particle_shape(&p);
        let ParticleShape::Star { points } = shape else {
            panic!("expected star");
        };
        for (i, point) in points.iter().enumerate() {
            let expected = if i % 2 == 0 { 4.0 } else { 4.0 * config::SPARKLE_INNER_RATIO };
            assert!(((*point - p.pos).length() - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn kind_parsing_accepts_plurals_and_rejects_unknown() {
        assert_eq!(ParticleKind::parse("Leaves").unwrap(), ParticleKind::Leaf);
        assert_eq!(ParticleKind::parse(" bubble ").unwrap(), ParticleKind::Bubble);
        assert!(matches!(
            ParticleKind::parse("snow"),
            Err(ConfigError::UnknownKind(_))
        ));
    }
}
