//! Optical elements placed in the scene
//!
//! Each element is a pose plus a shape generator. The generator produces the
//! boundary outline in local space; the pose rotates and translates it into
//! the world. The outline is cached and rebuilt whenever the pose changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CURVE_DEPTH;
use crate::error::{LightboxError, Result};
use crate::rotate_degrees;

/// How an element treats light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Reflects everything
    Mirror,
    /// Straight-edged glass: Fresnel split, refraction, dispersion
    Dielectric,
    /// Curved glass; same optics as `Dielectric`
    Lens,
}

impl Category {
    /// Whether light can pass through (and be split by) this element
    pub fn is_transmissive(self) -> bool {
        !matches!(self, Category::Mirror)
    }
}

/// Shape generator for an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    PlaneMirror,
    /// Dish opening toward +y (local)
    CurvedMirror,
    /// Equilateral prism inscribed in a circle of diameter `width`
    Triangle,
    Rectangle,
    ConcaveLens,
    ConvexLens,
    /// Hand-authored outline in local coordinates
    Custom {
        category: Category,
        points: Vec<Vec2>,
        closed: bool,
    },
}

impl Shape {
    pub fn category(&self) -> Category {
        match self {
            Shape::PlaneMirror | Shape::CurvedMirror => Category::Mirror,
            Shape::Triangle | Shape::Rectangle => Category::Dielectric,
            Shape::ConcaveLens | Shape::ConvexLens => Category::Lens,
            Shape::Custom { category, .. } => *category,
        }
    }

    /// Mirrors are open polylines; glass is a closed loop
    pub fn is_closed(&self) -> bool {
        match self {
            Shape::PlaneMirror | Shape::CurvedMirror => false,
            Shape::Custom { closed, .. } => *closed,
            _ => true,
        }
    }

    /// Outline in local space for a `width` × `height` footprint
    pub fn local_outline(&self, width: f32, height: f32) -> Vec<Vec2> {
        let (w, h) = (width, height);
        match self {
            Shape::PlaneMirror => vec![Vec2::new(-w / 2.0, 0.0), Vec2::new(w / 2.0, 0.0)],
            Shape::CurvedMirror => {
                const STEPS: usize = 15;
                (0..STEPS)
                    .map(|i| {
                        let t = i as f32 / (STEPS - 1) as f32;
                        let y = CURVE_DEPTH * (1.0 - (2.0 * t - 1.0).abs()).powi(2);
                        Vec2::new(-w / 2.0 + w * t, y)
                    })
                    .collect()
            }
            Shape::Triangle => {
                let r = w / 2.0;
                (0..3)
                    .map(|i| {
                        let angle = (i as f32 * 120.0 - 90.0).to_radians();
                        Vec2::new(r * angle.cos(), r * angle.sin())
                    })
                    .collect()
            }
            Shape::Rectangle => vec![
                Vec2::new(-w / 2.0, -h / 2.0),
                Vec2::new(w / 2.0, -h / 2.0),
                Vec2::new(w / 2.0, h / 2.0),
                Vec2::new(-w / 2.0, h / 2.0),
            ],
            // Both faces bow inward by 30% of the width
            Shape::ConcaveLens => lens_outline(w, h, -0.3 * w),
            // Both faces bulge outward by 30% of the height
            Shape::ConvexLens => lens_outline(w, h, 0.3 * h),
            Shape::Custom { points, .. } => points.clone(),
        }
    }
}

/// Two parabolic faces joined at the corners of a `w` × `h` box
///
/// Positive `bulge` pushes each face away from the centre, negative pulls it in.
fn lens_outline(w: f32, h: f32, bulge: f32) -> Vec<Vec2> {
    const STEPS: usize = 6;
    let sag = |t: f32| bulge * (1.0 - (2.0 * t - 1.0).powi(2));

    let top = (0..STEPS).map(|i| {
        let t = i as f32 / (STEPS - 1) as f32;
        Vec2::new(-w / 2.0 + w * t, -h / 2.0 - sag(t))
    });
    let bottom = (0..STEPS).map(|i| {
        let t = i as f32 / (STEPS - 1) as f32;
        Vec2::new(w / 2.0 - w * t, h / 2.0 + sag(t))
    });
    top.chain(bottom).collect()
}

/// Placement of an element in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
}

impl Pose {
    pub fn new(position: Vec2, rotation: f32, width: f32, height: f32) -> Self {
        Self {
            position,
            rotation,
            width,
            height,
        }
    }
}

/// Serialized form of an element; the outline is always derived
#[derive(Debug, Clone, Deserialize)]
struct ElementDesc {
    shape: Shape,
    pose: Pose,
}

/// An optical element with a cached world-space outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementDesc")]
pub struct SceneElement {
    shape: Shape,
    pose: Pose,
    #[serde(skip)]
    outline: Vec<Vec2>,
}

impl TryFrom<ElementDesc> for SceneElement {
    type Error = LightboxError;

    fn try_from(desc: ElementDesc) -> Result<Self> {
        SceneElement::new(desc.shape, desc.pose)
    }
}

impl SceneElement {
    /// Build an element, rejecting outlines with fewer than two points
    pub fn new(shape: Shape, pose: Pose) -> Result<Self> {
        let mut element = Self {
            shape,
            pose,
            outline: Vec::new(),
        };
        element.rebuild()?;
        Ok(element)
    }

    /// Hand-authored outline, `points` relative to `position`
    pub fn custom(category: Category, points: Vec<Vec2>, closed: bool, position: Vec2) -> Result<Self> {
        Self::new(
            Shape::Custom {
                category,
                points,
                closed,
            },
            Pose::new(position, 0.0, 0.0, 0.0),
        )
    }

    fn rebuild(&mut self) -> Result<()> {
        let local = self.shape.local_outline(self.pose.width, self.pose.height);
        if local.len() < 2 {
            return Err(LightboxError::TooFewPoints(local.len()));
        }
        self.outline = local
            .into_iter()
            .map(|p| rotate_degrees(p, self.pose.rotation) + self.pose.position)
            .collect();
        Ok(())
    }

    /// Move/rotate/resize the element and regenerate its outline
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        // Generated and already-validated custom shapes always yield >= 2 points
        if let Err(err) = self.rebuild() {
            log::warn!("Element outline rebuild failed: {err}");
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn category(&self) -> Category {
        self.shape.category()
    }

    /// Reference point used to tell entering from exiting
    pub fn centroid(&self) -> Vec2 {
        self.pose.position
    }

    /// World-space boundary points
    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    /// Boundary segments, including the closing edge for closed shapes
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.outline.len();
        let count = if self.shape.is_closed() { n } else { n - 1 };
        (0..count).map(move |i| (self.outline[i], self.outline[(i + 1) % n]))
    }
}
