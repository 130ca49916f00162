// All tunable constants in one place.

use std::path::{Path, PathBuf};

use macroquad::prelude::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::palette;
use crate::particles::ParticleKind;
use crate::visual::VisualQuality;

// Particle field (units are surface pixels and frames)
pub const DEFAULT_PARTICLE_COUNT: usize = 50;
pub const MAX_PARTICLE_COUNT: usize = 500;
pub const PARTICLE_GRAVITY: f32 = 0.02;
pub const PARTICLE_TOP_MARGIN: f32 = 10.0;
pub const PARTICLE_SPAWN_OFFSET: f32 = 10.0;
pub const PARTICLE_DRIFT_MAX: f32 = 1.0;
pub const PARTICLE_RISE_MIN: f32 = 1.0;
pub const PARTICLE_RISE_MAX: f32 = 4.0;
pub const PARTICLE_MIN_AGE: u32 = 100;
pub const PARTICLE_MAX_AGE: u32 = 300;
pub const PARTICLE_SIZE_MIN: f32 = 2.0;
pub const PARTICLE_SIZE_MAX: f32 = 6.0;
pub const LEAF_SPIN_PER_FRAME: f32 = 0.05;
pub const LEAF_ASPECT: f32 = 0.6;
pub const SPARKLE_SPIKES: usize = 4;
pub const SPARKLE_INNER_RATIO: f32 = 0.4;

// Growth scene
pub const FULL_GROWTH_POINTS: f32 = 2000.0;
pub const GROWTH_SMOOTHING: f32 = 0.05;
pub const GROWTH_INTERVAL_SECS: f32 = 0.05;
pub const MIN_GROWTH_INTERVAL_SECS: f32 = 0.001;
/// Upper bound on interval steps a single poll may report.
pub const MAX_STEPS_PER_POLL: u32 = 240;
pub const ORNAMENT_A_POINTS: f32 = 500.0;
pub const ORNAMENT_B_POINTS: f32 = 1000.0;
pub const SPARKLES_POINTS: f32 = 800.0;
pub const MIN_TRUNK_HEIGHT: f32 = 0.5;
pub const MIN_FOLIAGE_SCALE: f32 = 0.3;
pub const AMBIENT_ORB_COUNT: usize = 15;
pub const SPARKLE_COUNT: usize = 20;
pub const SPARKLE_BOX: f32 = 3.0;
pub const TREE_SWAY_SPEED: f32 = 0.3;
pub const TREE_SWAY_AMPLITUDE: f32 = 0.05;
pub const AMBIENT_SPIN_SPEED: f32 = 0.1;
pub const LABEL_BOB_AMPLITUDE: f32 = 0.1;
pub const HOVER_SCALE: f32 = 1.1;
pub const HOVER_SPRING_MASS: f32 = 1.0;
pub const HOVER_SPRING_TENSION: f32 = 280.0;
pub const HOVER_SPRING_FRICTION: f32 = 60.0;

// Host
pub const MAX_FRAME_TIME: f64 = 0.1;
pub const COUNTER_DURATION_SECS: f32 = 1.0;
pub const POINTS_STEP: f32 = 100.0;
pub const POINTS_SLIDER_MAX: f32 = 3000.0;
pub const GROWTH_HISTORY_LEN: usize = 600;

// Camera
pub const CAMERA_POSITION: [f32; 3] = [0.0, 2.0, 5.0];
pub const CAMERA_FOV_DEGREES: f32 = 60.0;
pub const CAMERA_ORBIT_SPEED: f32 = 0.01;
pub const CAMERA_SMOOTH_SPEED: f32 = 8.0;
pub const CAMERA_MAX_POLAR: f32 = std::f32::consts::FRAC_PI_2;

// Serde-friendly settings. These are what a settings file or the CLI can touch;
// they become validated configs before any simulation sees them.

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub particle_count: usize,
    pub colors: Vec<String>,
    pub kinds: Vec<ParticleKind>,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            colors: palette::FIELD_PALETTE.iter().map(|c| c.to_string()).collect(),
            kinds: ParticleKind::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub smoothing: f32,
    pub interval_secs: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            smoothing: GROWTH_SMOOTHING,
            interval_secs: GROWTH_INTERVAL_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub eco_points: f32,
    pub seed: u64,
    pub quality: VisualQuality,
    pub field: FieldSettings,
    pub scene: SceneSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            eco_points: 1250.0,
            seed: 42,
            quality: VisualQuality::High,
            field: FieldSettings::default(),
            scene: SceneSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Validated particle field configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    particle_count: usize,
    palette: Vec<Color>,
    kinds: Vec<ParticleKind>,
}

impl FieldConfig {
    pub fn new(
        particle_count: usize,
        palette: Vec<Color>,
        kinds: &[ParticleKind],
    ) -> Result<Self, ConfigError> {
        if particle_count == 0 {
            return Err(ConfigError::ZeroParticleCount);
        }
        if particle_count > MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles {
                requested: particle_count,
                max: MAX_PARTICLE_COUNT,
            });
        }
        if palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let mut unique = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !unique.contains(kind) {
                unique.push(*kind);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoKinds);
        }

        Ok(Self {
            particle_count,
            palette,
            kinds: unique,
        })
    }

    pub fn from_settings(settings: &FieldSettings) -> Result<Self, ConfigError> {
        let palette = palette::parse_palette(&settings.colors)?;
        Self::new(settings.particle_count, palette, &settings.kinds)
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn kinds(&self) -> &[ParticleKind] {
        &self.kinds
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            palette: palette::FIELD_PALETTE
                .iter()
                .filter_map(|c| palette::parse_hex(c).ok())
                .collect(),
            kinds: ParticleKind::ALL.to_vec(),
        }
    }
}

/// Validated growth scene configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    smoothing: f32,
    interval_secs: f32,
}

impl SceneConfig {
    pub fn new(smoothing: f32, interval_secs: f32) -> Result<Self, ConfigError> {
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(smoothing));
        }
        if !(interval_secs.is_finite() && interval_secs > 0.0) {
            return Err(ConfigError::InvalidInterval(interval_secs));
        }
        if interval_secs < MIN_GROWTH_INTERVAL_SECS {
            return Err(ConfigError::IntervalTooShort {
                secs: interval_secs,
                min: MIN_GROWTH_INTERVAL_SECS,
            });
        }
        Ok(Self {
            smoothing,
            interval_secs,
        })
    }

    pub fn from_settings(settings: &SceneSettings) -> Result<Self, ConfigError> {
        Self::new(settings.smoothing, settings.interval_secs)
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn interval_secs(&self) -> f32 {
        self.interval_secs
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            smoothing: GROWTH_SMOOTHING,
            interval_secs: GROWTH_INTERVAL_SECS,
        }
    }
}

/// Command line overrides, applied on top of an optional settings file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub eco_points: Option<f32>,
    pub seed: Option<u64>,
    pub quality: Option<VisualQuality>,
    pub particle_count: Option<usize>,
    pub kinds: Option<Vec<ParticleKind>>,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut opts = Self::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| ConfigError::MissingValue(flag.clone()))
            };
            match flag.as_str() {
                "--config" => opts.config_path = Some(PathBuf::from(value()?)),
                "--points" => opts.eco_points = Some(parse_value(&flag, &value()?)?),
                "--seed" => opts.seed = Some(parse_value(&flag, &value()?)?),
                "--particles" => opts.particle_count = Some(parse_value(&flag, &value()?)?),
                "--kinds" => {
                    let kinds = value()?
                        .split(',')
                        .map(ParticleKind::parse)
                        .collect::<Result<Vec<_>, _>>()?;
                    opts.kinds = Some(kinds);
                }
                "--quality" => {
                    let raw = value()?;
                    let quality = VisualQuality::parse_cli(&raw).ok_or_else(|| {
                        ConfigError::InvalidArgument {
                            flag: flag.clone(),
                            value: raw.clone(),
                        }
                    })?;
                    opts.quality = Some(quality);
                }
                _ => return Err(ConfigError::UnknownFlag(flag.clone())),
            }
        }

        Ok(opts)
    }

    /// Overlay the flags that were given onto `settings`.
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(points) = self.eco_points {
            settings.eco_points = points;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(count) = self.particle_count {
            settings.field.particle_count = count;
        }
        if let Some(kinds) = &self.kinds {
            settings.field.kinds = kinds.clone();
        }
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidArgument {
        flag: flag.to_string(),
        value: raw.to_string(),
    })
}
