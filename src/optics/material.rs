//! Spectral bands and refractive materials
//!
//! A dielectric disperses light because each band sees a slightly different
//! index. All six indices hang off a single base value through a fixed
//! dispersion curve, so red < orange < ... < violet for every base.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CUSTOM_INDEX, MIN_CUSTOM_INDEX};
use crate::error::{LightboxError, Result};

/// 8-bit RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Largest per-channel absolute difference
    pub fn max_channel_diff(self, other: Rgb) -> u8 {
        let dr = self.0.abs_diff(other.0);
        let dg = self.1.abs_diff(other.1);
        let db = self.2.abs_diff(other.2);
        dr.max(dg).max(db)
    }
}

/// One of the six discrete visible bands, ordered by ascending index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
}

impl Band {
    /// Every band, red first
    pub const ALL: [Band; 6] = [
        Band::Red,
        Band::Orange,
        Band::Yellow,
        Band::Green,
        Band::Blue,
        Band::Violet,
    ];

    /// Index offset from the red band (the dispersion curve)
    pub fn dispersion_offset(self) -> f32 {
        match self {
            Band::Red => 0.0,
            Band::Orange => 0.025,
            Band::Yellow => 0.050,
            Band::Green => 0.075,
            Band::Blue => 0.100,
            Band::Violet => 0.125,
        }
    }

    /// Display color of rays in this band
    pub fn rgb(self) -> Rgb {
        match self {
            Band::Red => Rgb(255, 80, 80),
            Band::Orange => Rgb(255, 140, 0),
            Band::Yellow => Rgb(255, 255, 100),
            Band::Green => Rgb(80, 255, 120),
            Band::Blue => Rgb(80, 150, 255),
            Band::Violet => Rgb(180, 100, 255),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Red => "red",
            Band::Orange => "orange",
            Band::Yellow => "yellow",
            Band::Green => "green",
            Band::Blue => "blue",
            Band::Violet => "violet",
        }
    }
}

/// What a ray carries: undispersed white light or a single band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spectrum {
    White,
    Mono(Band),
}

impl Spectrum {
    pub fn is_white(self) -> bool {
        matches!(self, Spectrum::White)
    }

    pub fn rgb(self) -> Rgb {
        match self {
            Spectrum::White => Rgb::WHITE,
            Spectrum::Mono(band) => band.rgb(),
        }
    }
}

/// Refractive index table keyed by band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalMaterial {
    indices: [f32; 6],
}

impl OpticalMaterial {
    /// Open space: index 1.0 for every band
    pub fn ambient() -> Self {
        Self { indices: [1.0; 6] }
    }

    /// Dispersive material whose red band has index `base`
    pub fn dielectric(base: f32) -> Result<Self> {
        let mut material = Self::ambient();
        material.set_base_index(base)?;
        Ok(material)
    }

    /// Regenerate all six indices from the red-band `base`
    pub fn set_base_index(&mut self, base: f32) -> Result<()> {
        if !base.is_finite() || base <= 0.0 {
            return Err(LightboxError::InvalidIndex(base));
        }
        for band in Band::ALL {
            self.indices[band as usize] = base + band.dispersion_offset();
        }
        Ok(())
    }

    /// Clamp a user-chosen base index into the customization range
    pub fn clamp_base(base: f32) -> f32 {
        base.clamp(MIN_CUSTOM_INDEX, MAX_CUSTOM_INDEX)
    }

    #[inline]
    pub fn index(&self, band: Band) -> f32 {
        self.indices[band as usize]
    }

    /// Aggregate index seen by white light: mean of the red and violet ends
    #[inline]
    pub fn white_index(&self) -> f32 {
        (self.index(Band::Red) + self.index(Band::Violet)) / 2.0
    }

    pub fn index_for(&self, spectrum: Spectrum) -> f32 {
        match spectrum {
            Spectrum::White => self.white_index(),
            Spectrum::Mono(band) => self.index(band),
        }
    }
}

/// Which material a ray is currently travelling through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Medium {
    #[default]
    Ambient,
    Dielectric,
}

impl Medium {
    /// The other side of any dielectric boundary
    pub fn opposite(self) -> Self {
        match self {
            Medium::Ambient => Medium::Dielectric,
            Medium::Dielectric => Medium::Ambient,
        }
    }
}

/// The two materials used by one trace pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Media {
    pub ambient: OpticalMaterial,
    pub dielectric: OpticalMaterial,
}

impl Media {
    pub fn new(dielectric_base: f32) -> Result<Self> {
        Ok(Self {
            ambient: OpticalMaterial::ambient(),
            dielectric: OpticalMaterial::dielectric(dielectric_base)?,
        })
    }

    pub fn material(&self, medium: Medium) -> &OpticalMaterial {
        match medium {
            Medium::Ambient => &self.ambient,
            Medium::Dielectric => &self.dielectric,
        }
    }

    /// Index of `medium` as seen by `spectrum`
    pub fn index(&self, medium: Medium, spectrum: Spectrum) -> f32 {
        self.material(medium).index_for(spectrum)
    }
}
