//! Light sources
//!
//! An emitter fires one or more parallel white beams. The classic light box
//! fires three, spaced 12 units apart across its face.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LIGHT_BOX_BEAMS, LIGHT_BOX_SPACING, MAX_EMITTER_BEAMS};
use crate::direction_from_degrees;
use crate::error::{LightboxError, Result};

/// Serialized form; the direction is normalized on load
#[derive(Debug, Clone, Copy, Deserialize)]
struct EmitterDesc {
    origin: Vec2,
    direction: Vec2,
    #[serde(default = "default_beams")]
    beams: u32,
    #[serde(default)]
    spacing: f32,
}

fn default_beams() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EmitterDesc")]
pub struct Emitter {
    pub origin: Vec2,
    /// Unit direction of every beam
    direction: Vec2,
    /// Number of parallel beams, centred on `origin`
    pub beams: u32,
    /// Gap between neighbouring beams
    pub spacing: f32,
}

impl TryFrom<EmitterDesc> for Emitter {
    type Error = LightboxError;

    fn try_from(desc: EmitterDesc) -> Result<Self> {
        if desc.beams > MAX_EMITTER_BEAMS {
            return Err(LightboxError::TooManyBeams(desc.beams));
        }
        let mut emitter = Emitter::new(desc.origin, desc.direction)?;
        emitter.beams = desc.beams;
        emitter.spacing = desc.spacing;
        Ok(emitter)
    }
}

impl Emitter {
    /// Single beam from `origin` along `direction`
    pub fn new(origin: Vec2, direction: Vec2) -> Result<Self> {
        let direction = direction.try_normalize().ok_or(LightboxError::ZeroDirection)?;
        Ok(Self {
            origin,
            direction,
            beams: 1,
            spacing: 0.0,
        })
    }

    /// Light box at `position` aimed along `angle` degrees
    pub fn light_box(position: Vec2, angle: f32) -> Self {
        Self {
            origin: position,
            direction: direction_from_degrees(angle),
            beams: LIGHT_BOX_BEAMS,
            spacing: LIGHT_BOX_SPACING,
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Re-aim the emitter; zero vectors are ignored
    pub fn aim(&mut self, direction: Vec2) {
        if let Some(d) = direction.try_normalize() {
            self.direction = d;
        }
    }

    /// Origin and direction of each beam, ordered across the face
    pub fn beams(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let perp = self.direction.perp();
        let half = (self.beams.saturating_sub(1)) as f32 / 2.0;
        (0..self.beams).map(move |i| {
            let offset = perp * ((i as f32 - half) * self.spacing);
            (self.origin + offset, self.direction)
        })
    }
}
