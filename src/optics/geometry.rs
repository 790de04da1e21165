//! Geometry kernel for 2D optics
//!
//! Pure functions: segment intersection, reflection, Snell refraction,
//! Schlick reflectance and segment normals. No state, no allocation.

use glam::Vec2;

/// Determinant magnitude below which two segments count as parallel
const PARALLEL_EPSILON: f32 = 1e-4;

/// Squared length below which a segment is treated as a point
const DEGENERATE_LENGTH_SQ: f32 = 1e-4;

/// Intersect segment `p1→p2` with segment `p3→p4`
///
/// Returns the intersection point and its distance from `p1`, or `None` for
/// parallel/degenerate segments and for crossings outside either segment.
pub fn segment_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<(Vec2, f32)> {
    let d = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if d.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / d;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / d;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        let point = p1 + (p2 - p1) * t;
        Some((point, (point - p1).length()))
    } else {
        None
    }
}

/// Mirror `incident` about a surface with the given normal
///
/// Standard reflection: r = i - 2(i·n)n, with both operands normalized.
#[inline]
pub fn reflect(incident: Vec2, normal: Vec2) -> Vec2 {
    let i = incident.normalize_or_zero();
    let n = normal.normalize_or_zero();
    (i - n * (2.0 * i.dot(n))).normalize_or_zero()
}

/// Refract `incident` through a boundary from index `n1` into index `n2`
///
/// The normal may face either way; it is flipped to oppose the incident ray.
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vec2, normal: Vec2, n1: f32, n2: f32) -> Option<Vec2> {
    let i = incident.normalize_or_zero();
    let mut n = normal.normalize_or_zero();
    if n.dot(i) > 0.0 {
        n = -n;
    }

    let ratio = n1 / n2;
    let cos_i = -n.dot(i);
    let sin_t2 = ratio * ratio * (1.0 - cos_i * cos_i);
    if sin_t2 > 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin_t2).sqrt();
    Some((i * ratio + n * (ratio * cos_i - cos_t)).normalize_or_zero())
}

/// Fraction of energy reflected at a boundary (Schlick's approximation)
///
/// `normal` must oppose `incident`. Going from a denser to a lighter medium
/// past the critical angle reflects everything.
pub fn fresnel_reflectance(incident: Vec2, normal: Vec2, n1: f32, n2: f32) -> f32 {
    let i = incident.normalize_or_zero();
    let n = normal.normalize_or_zero();
    let cos_i = -n.dot(i);

    if n1 > n2 {
        let ratio = n1 / n2;
        let sin_t2 = ratio * ratio * (1.0 - cos_i * cos_i);
        if sin_t2 > 1.0 {
            return 1.0;
        }
    }

    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_i).powi(5)
}

/// Unit normal of segment `p1→p2` (left-hand perpendicular)
///
/// A zero-length segment yields +y instead of dividing by zero.
#[inline]
pub fn segment_normal(p1: Vec2, p2: Vec2) -> Vec2 {
    let d = p2 - p1;
    let len = d.length();
    if len > 0.0 {
        Vec2::new(-d.y / len, d.x / len)
    } else {
        Vec2::Y
    }
}

/// Distance from `p` to the closest point of segment `a→b`
///
/// `None` for a degenerate segment, which callers skip.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ {
        return None;
    }

    let t = ((p - a).dot(line) / len_sq).clamp(0.0, 1.0);
    let closest = a + line * t;
    Some((p - closest).length())
}
