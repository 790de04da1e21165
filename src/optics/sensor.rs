//! Color sensors
//!
//! A sensor lights up while some sufficiently bright ray of the right color
//! passes within its radius. Activation edges are tracked so the host can
//! fire feedback exactly once per activation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::point_segment_distance;
use super::material::Rgb;
use super::ray::Ray;
use crate::config::TraceConfig;
use crate::consts::{SENSOR_RADIUS, SENSOR_TOLERANCE};
use crate::error::{LightboxError, Result};

/// What a sensor is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorTarget {
    /// Undispersed white light only
    White,
    /// A band color, matched per channel within the tolerance
    Color(Rgb),
}

/// Serialized form; activation state is never persisted
#[derive(Debug, Clone, Copy, Deserialize)]
struct SensorDesc {
    position: Vec2,
    #[serde(default = "default_radius")]
    radius: f32,
    target: SensorTarget,
    #[serde(default = "default_tolerance")]
    tolerance: f32,
}

fn default_radius() -> f32 {
    SENSOR_RADIUS
}

fn default_tolerance() -> f32 {
    SENSOR_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SensorDesc")]
pub struct Sensor {
    pub position: Vec2,
    radius: f32,
    pub target: SensorTarget,
    tolerance: f32,
    #[serde(skip)]
    active: bool,
    #[serde(skip)]
    was_active: bool,
}

impl TryFrom<SensorDesc> for Sensor {
    type Error = LightboxError;

    fn try_from(desc: SensorDesc) -> Result<Self> {
        Sensor::new(desc.position, desc.radius, desc.target, desc.tolerance)
    }
}

impl Sensor {
    pub fn new(position: Vec2, radius: f32, target: SensorTarget, tolerance: f32) -> Result<Self> {
        if radius.is_nan() || radius < 0.0 {
            return Err(LightboxError::NegativeRadius(radius));
        }
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(LightboxError::NegativeTolerance(tolerance));
        }
        Ok(Self {
            position,
            radius,
            target,
            tolerance,
            active: false,
            was_active: false,
        })
    }

    /// Sensor with the default radius and tolerance
    pub fn with_target(position: Vec2, target: SensorTarget) -> Self {
        Self {
            position,
            radius: SENSOR_RADIUS,
            target,
            tolerance: SENSOR_TOLERANCE,
            active: false,
            was_active: false,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn was_active(&self) -> bool {
        self.was_active
    }

    /// Whether any segment of the ray's path passes within the radius
    pub fn check_hit(&self, ray: &Ray) -> bool {
        ray.path.windows(2).any(|seg| {
            point_segment_distance(self.position, seg[0], seg[1]).is_some_and(|d| d < self.radius)
        })
    }

    /// Whether the ray's color satisfies the target
    pub fn color_match(&self, ray: &Ray) -> bool {
        match self.target {
            SensorTarget::White => ray.is_white(),
            SensorTarget::Color(want) => {
                !ray.is_white() && f32::from(want.max_channel_diff(ray.color())) <= self.tolerance
            }
        }
    }

    /// Re-evaluate against a frame's rays; returns true on a rising edge
    pub fn update(&mut self, rays: &[Ray], config: &TraceConfig) -> bool {
        self.was_active = self.active;
        self.active = rays.iter().any(|ray| {
            ray.effective_intensity(config.max_distance) >= config.sensor_floor
                && self.check_hit(ray)
                && self.color_match(ray)
        });
        self.active && !self.was_active
    }
}

/// Every sensor is lit (vacuously true for none)
pub fn all_active(sensors: &[Sensor]) -> bool {
    sensors.iter().all(Sensor::is_active)
}
