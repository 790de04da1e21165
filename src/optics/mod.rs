//! Spectral ray optics
//!
//! Everything here is pure and deterministic:
//! - Elements are read-only during a trace pass
//! - Rays are traced depth-first in emitter, then spawn order
//! - Sensors are updated only after every ray is traced
//! - No rendering or platform dependencies

pub mod element;
pub mod emitter;
pub mod geometry;
pub mod material;
pub mod ray;
pub mod scene;
pub mod sensor;
pub mod tracer;

pub use element::{Category, Pose, SceneElement, Shape};
pub use emitter::Emitter;
pub use geometry::{fresnel_reflectance, point_segment_distance, reflect, refract, segment_intersect, segment_normal};
pub use material::{Band, Media, Medium, OpticalMaterial, Rgb, Spectrum};
pub use ray::Ray;
pub use scene::{Frame, Scene, showcase, tick};
pub use sensor::{Sensor, SensorTarget, all_active};
pub use tracer::{Launch, RayTracer, trace_scene};
