use thiserror::Error;

/// Errors raised while building a particle field or growth scene configuration.
///
/// Simulations are only ever constructed from validated configs, so none of these
/// can surface from a per-frame step.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("particle palette is empty")]
    EmptyPalette,
    #[error("particle count must be at least 1")]
    ZeroParticleCount,
    #[error("particle count {requested} exceeds the pool limit of {max}")]
    TooManyParticles { requested: usize, max: usize },
    #[error("no particle kinds enabled")]
    NoKinds,
    #[error("unknown particle kind `{0}`")]
    UnknownKind(String),
    #[error("invalid color `{0}` (expected #rgb or #rrggbb)")]
    InvalidColor(String),
    #[error("smoothing factor {0} must be in (0, 1]")]
    InvalidSmoothing(f32),
    #[error("growth interval {0}s must be positive and finite")]
    InvalidInterval(f32),
    #[error("growth interval {secs}s is shorter than the {min}s minimum")]
    IntervalTooShort { secs: f32, min: f32 },
    #[error("missing value for `{0}`")]
    MissingValue(String),
    #[error("invalid value `{value}` for `{flag}`")]
    InvalidArgument { flag: String, value: String },
    #[error("unknown flag `{0}`")]
    UnknownFlag(String),
    #[error("could not read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
