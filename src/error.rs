//! Error types for Lightbox
//!
//! Only construction-time input is ever rejected. Degenerate geometry during a
//! trace (parallel segments, total internal reflection, dim branches) has a
//! defined outcome and never surfaces here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LightboxError {
    #[error("scene element needs at least two boundary points, got {0}")]
    TooFewPoints(usize),

    #[error("sensor radius must be non-negative, got {0}")]
    NegativeRadius(f32),

    #[error("sensor tolerance must be non-negative, got {0}")]
    NegativeTolerance(f32),

    #[error("refractive index must be positive and finite, got {0}")]
    InvalidIndex(f32),

    #[error("emitter direction must be non-zero")]
    ZeroDirection,

    #[error("emitter has {0} beams, at most {max} allowed", max = crate::consts::MAX_EMITTER_BEAMS)]
    TooManyBeams(u32),

    #[error("{0} must be positive and finite, got {1}")]
    NonPositive(&'static str, f32),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LightboxError>;
