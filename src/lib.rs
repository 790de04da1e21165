//! Lightbox - 2D spectral ray optics
//!
//! Core modules:
//! - `optics`: Deterministic tracer (geometry, materials, elements, rays, sensors)
//! - `config`: Tunable trace parameters
//! - `error`: Construction-time validation errors

pub mod config;
pub mod error;
pub mod optics;

pub use config::TraceConfig;
pub use error::{LightboxError, Result};

use glam::Vec2;

/// Trace configuration defaults
pub mod consts {
    /// Total distance a ray (and its descendants) may travel
    pub const MAX_RAY_DISTANCE: f32 = 6000.0;
    /// Reflect/refract events allowed per ray
    pub const MAX_BOUNCES: u32 = 10;
    /// Loop iterations per traced ray, guards against degenerate geometry
    pub const MAX_TRACE_STEPS: u32 = 20;
    /// Look-ahead segment length used for intersection tests and escapes
    pub const PROBE_LENGTH: f32 = 2000.0;

    /// Minimum hit distance for rays leaving an emitter
    pub const EMISSION_GUARD: f32 = 0.1;
    /// Minimum hit distance for rays spawned on a surface
    pub const SPAWN_GUARD: f32 = 1.0;

    /// Branches carrying less energy than this are dropped
    pub const BRANCH_FLOOR: f32 = 0.01;
    /// Sensors ignore rays dimmer than this
    pub const SENSOR_FLOOR: f32 = 0.2;

    /// Default dielectric (glass) index for the red band
    pub const DIELECTRIC_BASE_INDEX: f32 = 1.5;
    /// Range the customization slider allows for the dielectric base index
    pub const MIN_CUSTOM_INDEX: f32 = 1.1;
    pub const MAX_CUSTOM_INDEX: f32 = 2.0;

    /// Sensor defaults
    pub const SENSOR_RADIUS: f32 = 35.0;
    pub const SENSOR_TOLERANCE: f32 = 40.0;

    /// Light box beam fan (three parallel beams, 12 units apart)
    pub const LIGHT_BOX_BEAMS: u32 = 3;
    pub const LIGHT_BOX_SPACING: f32 = 12.0;
    /// Upper bound on beams per emitter loaded from data
    pub const MAX_EMITTER_BEAMS: u32 = 64;

    /// Depth of the curved mirror dish
    pub const CURVE_DEPTH: f32 = 45.0;
}

/// Unit vector pointing along `degrees` (0 = +x, 90 = +y)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Rotate a point about the origin by `degrees`
#[inline]
pub fn rotate_degrees(p: Vec2, degrees: f32) -> Vec2 {
    direction_from_degrees(degrees).rotate(p)
}
