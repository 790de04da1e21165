//! Ray records produced by the tracer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::material::{Medium, Rgb, Spectrum};

/// A single light ray and the polyline it has traced so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Current position (advances with each hit)
    pub origin: Vec2,
    /// Unit direction of travel
    pub direction: Vec2,
    pub spectrum: Spectrum,
    /// Carried energy in [0, 1]; only ever scaled down
    pub intensity: f32,
    /// Visited points, starting at the emission/branch point
    pub path: Vec<Vec2>,
    pub bounces: u32,
    /// Cumulative distance, including the ancestors' share
    pub traveled: f32,
    pub medium: Medium,
    pub active: bool,
    /// White light that has not yet been dispersed
    pub may_split: bool,
}

impl Ray {
    /// Fresh white ray leaving an emitter
    pub fn emitted(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            spectrum: Spectrum::White,
            intensity: 1.0,
            path: vec![origin],
            bounces: 0,
            traveled: 0.0,
            medium: Medium::Ambient,
            active: true,
            may_split: true,
        }
    }

    /// Child ray branching off `self` at its current origin
    ///
    /// Inherits the parent's travel so far and counts the branch as a bounce.
    pub fn branch(&self, direction: Vec2, spectrum: Spectrum, intensity: f32, medium: Medium) -> Self {
        Self {
            origin: self.origin,
            direction: direction.normalize_or_zero(),
            spectrum,
            intensity,
            path: vec![self.origin],
            bounces: self.bounces + 1,
            traveled: self.traveled,
            medium,
            active: true,
            may_split: self.may_split && spectrum.is_white(),
        }
    }

    pub fn is_white(&self) -> bool {
        self.spectrum.is_white()
    }

    pub fn color(&self) -> Rgb {
        self.spectrum.rgb()
    }

    /// Fraction of the travel budget still unused, in [0, 1]
    #[inline]
    pub fn attenuation(&self, max_distance: f32) -> f32 {
        (1.0 - self.traveled / max_distance).clamp(0.0, 1.0)
    }

    /// Stored intensity scaled by distance attenuation
    pub fn effective_intensity(&self, max_distance: f32) -> f32 {
        self.intensity * self.attenuation(max_distance)
    }

    /// Last point of the path
    pub fn endpoint(&self) -> Vec2 {
        self.path.last().copied().unwrap_or(self.origin)
    }

    /// Direction of the final path segment, if the ray moved at all
    pub fn exit_direction(&self) -> Option<Vec2> {
        match self.path.as_slice() {
            [.., a, b] => (*b - *a).try_normalize(),
            _ => None,
        }
    }

    /// Advance to `point`, recording it and the distance covered
    pub(crate) fn advance_to(&mut self, point: Vec2, distance: f32) {
        self.path.push(point);
        self.traveled += distance;
        self.origin = point;
    }

    pub(crate) fn terminate(&mut self) {
        self.active = false;
    }
}
