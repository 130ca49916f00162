//! Procedural tree: render parameters derived from growth and score, plus the
//! decorative layers that float around it.
//!
//! Everything that depends on growth or score is recomputed from current
//! inputs on every call. Only the randomized layout of the orb layer and the
//! sparkle cloud is generated once per mount.

use macroquad::prelude::*;
use ::rand::Rng;

use crate::config;
use crate::counter::format_thousands;
use crate::palette;

pub fn trunk_height(growth: f32) -> f32 {
    (growth * 2.0).max(config::MIN_TRUNK_HEIGHT)
}

pub fn foliage_scale(growth: f32) -> f32 {
    growth.max(config::MIN_FOLIAGE_SCALE)
}

pub fn ornament_a_visible(eco_points: f32) -> bool {
    eco_points > config::ORNAMENT_A_POINTS
}

pub fn ornament_b_visible(eco_points: f32) -> bool {
    eco_points > config::ORNAMENT_B_POINTS
}

pub fn sparkles_active(eco_points: f32) -> bool {
    eco_points > config::SPARKLES_POINTS
}

pub fn label_text(eco_points: f32) -> String {
    format!("{} Eco-Points", format_thousands(eco_points.round() as u64))
}

/// Gentle bob and tilt shared by foliage, ornaments and ambient orbs.
///
/// The tilt pivots on the motion's origin, so a point far from it swings
/// further than one close by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatMotion {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
    pub phase: f32,
}

impl FloatMotion {
    pub const fn new(speed: f32, rotation_intensity: f32, float_intensity: f32) -> Self {
        Self {
            speed,
            rotation_intensity,
            float_intensity,
            phase: 0.0,
        }
    }

    fn angle(&self, t: f32) -> f32 {
        (self.phase + t) / 4.0 * self.speed
    }

    pub fn bob(&self, t: f32) -> f32 {
        self.angle(t).sin() / 10.0 * self.float_intensity
    }

    /// Tilt applied as x, then y, then z rotations. Each axis stays within
    /// `rotation_intensity / 8`.
    pub fn wobble(&self, t: f32) -> Quat {
        let (sin, cos) = self.angle(t).sin_cos();
        let k = self.rotation_intensity;
        Quat::from_rotation_x(cos / 8.0 * k)
            * Quat::from_rotation_y(sin / 8.0 * k)
            * Quat::from_rotation_z(sin / 20.0 * k)
    }

    /// Where `local` sits at time `t` once tilted and bobbed.
    pub fn apply(&self, local: Vec3, t: f32) -> Vec3 {
        self.wobble(t) * local + vec3(0.0, self.bob(t), 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub color: Color,
    pub motion: FloatMotion,
}

const FOLIAGE_LAYERS: [(Vec3, f32, f32, FloatMotion); 3] = [
    (Vec3::new(0.0, 0.3, 0.0), 0.8, 1.0, FloatMotion::new(2.0, 0.1, 0.1)),
    (Vec3::new(0.2, 0.5, 0.1), 0.6, 0.7, FloatMotion::new(1.5, 0.05, 0.05)),
    (Vec3::new(-0.1, 0.4, -0.2), 0.5, 0.6, FloatMotion::new(1.8, 0.08, 0.08)),
];
const ORNAMENT_RADIUS: f32 = 0.05;

/// Render parameters for one frame of the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeParams {
    pub growth: f32,
    pub trunk_height: f32,
    pub foliage_scale: f32,
    pub ornament_a: bool,
    pub ornament_b: bool,
    pub sparkles: bool,
    /// Yaw of the whole tree group.
    pub sway: f32,
    /// Vertical offset of the whole tree group.
    pub sink: f32,
    /// Uniform scale of the group (hover spring).
    pub scale: f32,
    pub elapsed: f32,
}

impl TreeParams {
    pub fn derive(growth: f32, eco_points: f32, elapsed: f32, scale: f32) -> Self {
        let growth = growth.clamp(0.0, 1.0);
        Self {
            growth,
            trunk_height: trunk_height(growth),
            foliage_scale: foliage_scale(growth),
            ornament_a: ornament_a_visible(eco_points),
            ornament_b: ornament_b_visible(eco_points),
            sparkles: sparkles_active(eco_points),
            sway: (elapsed * config::TREE_SWAY_SPEED).sin() * config::TREE_SWAY_AMPLITUDE,
            sink: growth * -0.5,
            scale,
            elapsed,
        }
    }

    /// Trunk as (center, height); it stands on the group origin.
    pub fn trunk(&self) -> (Vec3, f32) {
        (vec3(0.0, self.trunk_height / 2.0, 0.0), self.trunk_height)
    }

    pub fn foliage(&self) -> [Sphere; 3] {
        let h = self.trunk_height;
        std::array::from_fn(|i| {
            let (offset, radius, scale, motion) = FOLIAGE_LAYERS[i];
            Sphere {
                center: offset + vec3(0.0, h, 0.0),
                radius: radius * self.foliage_scale * scale,
                color: palette::FOLIAGE[i],
                motion,
            }
        })
    }

    pub fn ornaments(&self) -> Vec<Sphere> {
        let h = self.trunk_height;
        let mut out = Vec::with_capacity(2);
        if self.ornament_a {
            out.push(Sphere {
                center: vec3(0.3, h + 0.2, 0.2),
                radius: ORNAMENT_RADIUS,
                color: palette::GOLD,
                motion: FloatMotion::new(3.0, 0.2, 0.2),
            });
        }
        if self.ornament_b {
            out.push(Sphere {
                center: vec3(-0.2, h + 0.3, 0.1),
                radius: ORNAMENT_RADIUS,
                color: palette::TOMATO,
                motion: FloatMotion::new(2.5, 0.15, 0.15),
            });
        }
        out
    }

    /// Label anchor height above the ground, including its bob.
    pub fn label_height(&self) -> f32 {
        self.growth * 2.0 + 1.0 + self.elapsed.sin() * config::LABEL_BOB_AMPLITUDE
    }

    /// Group-local point to world space (scale, sway, then sink).
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        let rotated = Quat::from_rotation_y(self.sway) * (local * self.scale);
        rotated + vec3(0.0, self.sink, 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientOrb {
    pub position: Vec3,
    pub size: f32,
    pub color: Color,
    pub motion: FloatMotion,
}

/// Fixed set of softly floating orbs around the tree. The layer spins slowly;
/// orbs never expire or respawn.
#[derive(Clone, Debug, Default)]
pub struct AmbientLayer {
    orbs: Vec<AmbientOrb>,
}

impl AmbientLayer {
    pub fn generate(rng: &mut impl Rng, count: usize, colors: &[Color]) -> Self {
        let orbs = (0..count)
            .map(|_| AmbientOrb {
                position: vec3(
                    (rng.gen::<f32>() - 0.5) * 10.0,
                    rng.gen::<f32>() * 5.0,
                    (rng.gen::<f32>() - 0.5) * 10.0,
                ),
                size: rng.gen::<f32>() * 0.05 + 0.02,
                color: if colors.is_empty() {
                    palette::GOLD
                } else {
                    colors[rng.gen_range(0..colors.len())]
                },
                motion: FloatMotion {
                    speed: rng.gen::<f32>() * 2.0 + 1.0,
                    rotation_intensity: rng.gen::<f32>() * 0.5,
                    float_intensity: rng.gen::<f32>() * 2.0 + 1.0,
                    phase: rng.gen::<f32>() * std::f32::consts::TAU,
                },
            })
            .collect();
        Self { orbs }
    }

    pub fn orbs(&self) -> &[AmbientOrb] {
        &self.orbs
    }

    pub fn yaw(elapsed: f32) -> f32 {
        elapsed * config::AMBIENT_SPIN_SPEED
    }

    pub fn world_positions(&self, elapsed: f32) -> impl Iterator<Item = (Vec3, &AmbientOrb)> + '_ {
        let spin = Quat::from_rotation_y(Self::yaw(elapsed));
        self.orbs.iter().map(move |orb| {
            let local = orb.motion.apply(orb.position, elapsed);
            (spin * local, orb)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sparkle {
    base: Vec3,
    phase: f32,
    speed: f32,
}

/// Twinkling points scattered in a box around the tree, shown once the score
/// passes the sparkle milestone.
#[derive(Clone, Debug, Default)]
pub struct SparkleCloud {
    sparkles: Vec<Sparkle>,
}

impl SparkleCloud {
    pub fn generate(rng: &mut impl Rng, count: usize, extent: f32) -> Self {
        let sparkles = (0..count)
            .map(|_| Sparkle {
                base: vec3(
                    (rng.gen::<f32>() - 0.5) * extent,
                    rng.gen::<f32>() * extent,
                    (rng.gen::<f32>() - 0.5) * extent,
                ),
                phase: rng.gen::<f32>() * std::f32::consts::TAU,
                speed: rng.gen_range(0.3..0.7),
            })
            .collect();
        Self { sparkles }
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    /// (position, brightness in 0..=1)
    pub fn points(&self, elapsed: f32) -> impl Iterator<Item = (Vec3, f32)> + '_ {
        self.sparkles.iter().map(move |s| {
            let a = elapsed * s.speed * std::f32::consts::TAU + s.phase;
            let drift = vec3(0.0, a.sin() * 0.05, (a * 0.5).cos() * 0.05);
            (s.base + drift, 0.5 + 0.5 * a.sin())
        })
    }
}

/// Damped spring used for the hover pop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub value: f32,
    pub velocity: f32,
    pub target: f32,
    mass: f32,
    tension: f32,
    friction: f32,
}

const SPRING_SUBSTEP: f32 = 1.0 / 240.0;

impl Spring {
    pub fn new(value: f32, mass: f32, tension: f32, friction: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            mass: mass.max(f32::EPSILON),
            tension,
            friction,
        }
    }

    pub fn hover() -> Self {
        Self::new(
            1.0,
            config::HOVER_SPRING_MASS,
            config::HOVER_SPRING_TENSION,
            config::HOVER_SPRING_FRICTION,
        )
    }

    pub fn step(&mut self, dt: f32) {
        let mut remaining = dt.clamp(0.0, config::MAX_FRAME_TIME as f32);
        while remaining > 0.0 {
            let h = remaining.min(SPRING_SUBSTEP);
            let force = -self.tension * (self.value - self.target) - self.friction * self.velocity;
            self.velocity += force / self.mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
    }
}
