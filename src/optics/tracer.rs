//! Recursive ray tracer
//!
//! Every frame the scene is retraced from scratch. A ray marches from surface
//! to surface until it escapes, runs out of travel budget, fades below the
//! branch floor, or hits the bounce cap. Dielectric boundaries split energy
//! into a reflected sibling and a transmitted continuation; the first time a
//! white ray enters glass it disperses into one ray per band.
//!
//! Spawned rays are traced depth-first before their parent continues and are
//! collected, together with the emitted roots, into one output list.

use glam::Vec2;

use super::element::SceneElement;
use super::emitter::Emitter;
use super::geometry::{fresnel_reflectance, reflect, refract, segment_intersect, segment_normal};
use super::material::{Band, Media, Medium, Spectrum};
use super::ray::Ray;
use crate::config::TraceConfig;
use crate::error::Result;

/// Where a ray starts, which decides how close its first hit may be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Leaving an emitter in open space
    Emitted,
    /// Leaving the surface it was spawned on
    Spawned,
}

/// Nearest surface crossing ahead of a ray
#[derive(Debug, Clone, Copy)]
struct Hit {
    point: Vec2,
    distance: f32,
    /// Unit normal facing back against the ray
    normal: Vec2,
    element: usize,
}

/// What happens to a ray at a surface
#[derive(Debug)]
enum Outcome {
    /// Mirror: continue in the reflected direction
    Reflect(Vec2),
    /// Glass: optional reflected sibling plus whatever passes through
    Boundary {
        reflected: Option<Ray>,
        transmitted: Transmitted,
    },
}

#[derive(Debug)]
enum Transmitted {
    /// Continue through the boundary
    Refract {
        direction: Vec2,
        medium: Medium,
        transmittance: f32,
    },
    /// White light splits into band rays; the parent ends here
    Disperse(Vec<Ray>),
    /// Nothing usable gets through
    Absorbed,
}

/// Traces rays against a read-only set of scene elements
pub struct RayTracer<'a> {
    elements: &'a [SceneElement],
    config: &'a TraceConfig,
    media: Media,
    rays: Vec<Ray>,
}

impl<'a> RayTracer<'a> {
    pub fn new(elements: &'a [SceneElement], config: &'a TraceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            elements,
            config,
            media: config.media()?,
            rays: Vec::new(),
        })
    }

    /// Trace every beam of every emitter and return all resulting rays
    pub fn trace_emitters(mut self, emitters: &[Emitter]) -> Vec<Ray> {
        for emitter in emitters {
            for (origin, direction) in emitter.beams() {
                self.trace_ray(Ray::emitted(origin, direction), Launch::Emitted);
            }
        }
        self.rays
    }

    /// Trace one ray (and its descendants), adding all of them to the output
    pub fn trace_ray(&mut self, mut ray: Ray, launch: Launch) {
        self.trace(&mut ray, launch);
        self.rays.push(ray);
    }

    /// Rays traced so far, in completion order
    pub fn into_rays(self) -> Vec<Ray> {
        self.rays
    }

    fn guard(&self, launch: Launch) -> f32 {
        match launch {
            Launch::Emitted => self.config.emission_guard,
            Launch::Spawned => self.config.spawn_guard,
        }
    }

    fn trace(&mut self, ray: &mut Ray, launch: Launch) {
        let cfg = self.config;
        let guard = self.guard(launch);

        for _ in 0..cfg.max_steps {
            if !ray.active || ray.bounces >= cfg.max_bounces || ray.traveled >= cfg.max_distance {
                break;
            }

            let reach = (cfg.max_distance - ray.traveled).min(cfg.probe_length);
            let Some(hit) = self.nearest_hit(ray, reach, guard) else {
                // Escaped: run out to the end of the probe and stop
                if reach > 0.0 {
                    let end = ray.origin + ray.direction * reach;
                    ray.advance_to(end, reach);
                }
                break;
            };

            ray.advance_to(hit.point, hit.distance);
            ray.traveled = ray.traveled.min(cfg.max_distance);
            if ray.attenuation(cfg.max_distance) <= cfg.branch_floor {
                break;
            }

            match self.interact(ray, &hit) {
                Outcome::Reflect(direction) => {
                    ray.direction = direction;
                    ray.bounces += 1;
                }
                Outcome::Boundary {
                    reflected,
                    transmitted,
                } => {
                    if let Some(sibling) = reflected {
                        self.trace_ray(sibling, Launch::Spawned);
                    }
                    match transmitted {
                        Transmitted::Refract {
                            direction,
                            medium,
                            transmittance,
                        } => {
                            ray.direction = direction;
                            ray.medium = medium;
                            ray.intensity *= transmittance;
                            ray.bounces += 1;
                        }
                        Transmitted::Disperse(children) => {
                            ray.terminate();
                            for child in children {
                                self.trace_ray(child, Launch::Spawned);
                            }
                            break;
                        }
                        Transmitted::Absorbed => break,
                    }
                }
            }
        }

        ray.traveled = ray.traveled.min(cfg.max_distance);
        ray.terminate();
    }

    /// Globally nearest segment crossing within `reach`, ignoring hits at or
    /// closer than `guard`
    fn nearest_hit(&self, ray: &Ray, reach: f32, guard: f32) -> Option<Hit> {
        let end = ray.origin + ray.direction * reach;
        let mut best: Option<Hit> = None;

        for (index, element) in self.elements.iter().enumerate() {
            for (a, b) in element.segments() {
                let Some((point, distance)) = segment_intersect(ray.origin, end, a, b) else {
                    continue;
                };
                if distance <= guard || best.is_some_and(|h| distance >= h.distance) {
                    continue;
                }

                let mut normal = segment_normal(a, b);
                if normal.dot(ray.direction) > 0.0 {
                    normal = -normal;
                }
                best = Some(Hit {
                    point,
                    distance,
                    normal,
                    element: index,
                });
            }
        }

        best
    }

    fn interact(&self, ray: &Ray, hit: &Hit) -> Outcome {
        let element = &self.elements[hit.element];
        if element.category().is_transmissive() {
            self.boundary(ray, hit, element.centroid())
        } else {
            Outcome::Reflect(reflect(ray.direction, hit.normal))
        }
    }

    /// Fresnel split at a glass boundary
    fn boundary(&self, ray: &Ray, hit: &Hit, centroid: Vec2) -> Outcome {
        let floor = self.config.branch_floor;
        // The normal faces the ray, so it points away from the centroid on entry
        let entering = hit.normal.dot(centroid - hit.point) < 0.0;

        let next = ray.medium.opposite();
        let n1 = self.media.index(ray.medium, ray.spectrum);
        let n2 = self.media.index(next, ray.spectrum);

        let r = fresnel_reflectance(ray.direction, hit.normal, n1, n2);
        let t = 1.0 - r;

        let reflected = (ray.intensity * r > floor).then(|| {
            ray.branch(
                reflect(ray.direction, hit.normal),
                ray.spectrum,
                ray.intensity * r,
                ray.medium,
            )
        });

        let transmitted = if ray.may_split && ray.is_white() && entering {
            Transmitted::Disperse(self.disperse(ray, hit.normal, t))
        } else if ray.intensity * t > floor {
            match refract(ray.direction, hit.normal, n1, n2) {
                Some(direction) => Transmitted::Refract {
                    direction,
                    medium: next,
                    transmittance: t,
                },
                None => Transmitted::Absorbed,
            }
        } else {
            Transmitted::Absorbed
        };

        Outcome::Boundary {
            reflected,
            transmitted,
        }
    }

    /// One refracted ray per band that has a solution
    ///
    /// Splitting only happens on entry, so every band goes from the ambient
    /// index to its dielectric index and starts inside the glass, whatever
    /// medium the white ray had recorded.
    fn disperse(&self, ray: &Ray, normal: Vec2, transmittance: f32) -> Vec<Ray> {
        let intensity = ray.intensity * transmittance;
        if intensity <= self.config.branch_floor {
            return Vec::new();
        }

        Band::ALL
            .into_iter()
            .filter_map(|band| {
                let n1 = self.media.ambient.index(band);
                let n2 = self.media.dielectric.index(band);
                refract(ray.direction, normal, n1, n2)
                    .map(|direction| ray.branch(direction, Spectrum::Mono(band), intensity, Medium::Dielectric))
            })
            .collect()
    }
}

/// Trace all emitters against `elements` with the given configuration
pub fn trace_scene(elements: &[SceneElement], emitters: &[Emitter], config: &TraceConfig) -> Result<Vec<Ray>> {
    Ok(RayTracer::new(elements, config)?.trace_emitters(emitters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction_from_degrees;
    use crate::optics::element::{Category, Pose, Shape};

    fn prism() -> SceneElement {
        SceneElement::new(Shape::Triangle, Pose::new(Vec2::ZERO, 0.0, 200.0, 200.0)).unwrap()
    }

    fn block(position: Vec2, w: f32, h: f32) -> SceneElement {
        SceneElement::new(Shape::Rectangle, Pose::new(position, 0.0, w, h)).unwrap()
    }

    /// Beam hitting the prism's left face at 50° incidence
    fn prism_beam() -> Emitter {
        let face_mid = Vec2::new(-43.30127, -25.0);
        let dir = direction_from_degrees(-20.0);
        Emitter::new(face_mid - dir * 300.0, dir).unwrap()
    }

    fn trace(elements: &[SceneElement], emitters: &[Emitter]) -> Vec<Ray> {
        trace_scene(elements, emitters, &TraceConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_scene_escapes() {
        let emitter = Emitter::new(Vec2::ZERO, Vec2::X).unwrap();
        let rays = trace(&[], &[emitter]);
        assert_eq!(rays.len(), 1);

        let ray = &rays[0];
        assert!(!ray.active);
        assert_eq!(ray.path.len(), 2);
        assert!((ray.endpoint() - Vec2::new(2000.0, 0.0)).length() < 1e-3);
        assert_eq!(ray.traveled, 2000.0);
    }

    #[test]
    fn test_plane_mirror_reflects() {
        // Mirror along x = 100, beam travelling +x
        let mirror =
            SceneElement::new(Shape::PlaneMirror, Pose::new(Vec2::new(100.0, 0.0), 90.0, 200.0, 0.0)).unwrap();
        let emitter = Emitter::new(Vec2::new(0.0, 10.0), Vec2::X).unwrap();
        let rays = trace(&[mirror], &[emitter]);

        assert_eq!(rays.len(), 1);
        let ray = &rays[0];
        assert_eq!(ray.bounces, 1);
        assert!((ray.path[1] - Vec2::new(100.0, 10.0)).length() < 1e-3);
        let out = ray.exit_direction().unwrap();
        assert!((out - Vec2::NEG_X).length() < 1e-4);
    }

    #[test]
    fn test_white_ray_disperses_once() {
        let rays = trace(&[prism()], &[prism_beam()]);

        let root = rays.last().unwrap();
        assert!(root.is_white());
        assert!(!root.active);
        assert_eq!(root.path.len(), 2, "white ray stops at the first glass surface");

        let entry = root.endpoint();
        let children: Vec<&Ray> = rays
            .iter()
            .filter(|r| !r.is_white() && (r.path[0] - entry).length() < 1e-3)
            .collect();
        assert_eq!(children.len(), 6);

        // Descendants never split again
        assert!(rays.iter().filter(|r| !r.is_white()).all(|r| !r.may_split));
    }

    #[test]
    fn test_dispersion_ordering() {
        let rays = trace(&[prism()], &[prism_beam()]);
        let entry = rays.last().unwrap().endpoint();

        let mut children: Vec<(Band, f32)> = rays
            .iter()
            .filter(|r| (r.path[0] - entry).length() < 1e-3)
            .filter_map(|r| match r.spectrum {
                Spectrum::Mono(band) => {
                    assert_eq!(r.path.len(), 3, "enter, exit, escape");
                    let d = r.exit_direction().unwrap();
                    Some((band, d.y.atan2(d.x)))
                }
                Spectrum::White => None,
            })
            .collect();
        children.sort_by_key(|(band, _)| *band);
        assert_eq!(children.len(), 6);

        // Light bends toward the prism base (+y); violet bends most
        for pair in children.windows(2) {
            assert!(
                pair[1].1 > pair[0].1,
                "{:?} should deviate more than {:?}",
                pair[1].0,
                pair[0].0
            );
        }
    }

    #[test]
    fn test_dispersion_enters_glass_from_inside_another_block() {
        // The beam starts inside block A, leaves it and disperses on B
        let a = block(Vec2::ZERO, 100.0, 100.0);
        let b = block(Vec2::new(300.0, 0.0), 100.0, 100.0);
        let emitter = Emitter::new(Vec2::ZERO, Vec2::new(1.0, 0.1)).unwrap();
        let rays = trace(&[a, b], &[emitter]);

        let root = rays.last().unwrap();
        let entry = root.endpoint();
        assert!((entry.x - 250.0).abs() < 1e-2);
        let incoming = root.exit_direction().unwrap();
        let incoming_slope = incoming.y / incoming.x;

        let bands: Vec<&Ray> = rays
            .iter()
            .filter(|r| !r.is_white() && (r.path[0] - entry).length() < 1e-3)
            .collect();
        assert_eq!(bands.len(), 6);
        for ray in bands {
            // Bends toward the normal on entry, then back out into air
            let inside = (ray.path[1] - ray.path[0]).normalize();
            assert!(inside.y / inside.x < incoming_slope, "{:?} bent away from the normal", ray.spectrum);
            assert!((ray.path[1].x - 350.0).abs() < 1e-2);
            assert_eq!(ray.path.len(), 3);
            assert_eq!(ray.medium, Medium::Ambient);
        }
    }

    #[test]
    fn test_reflected_sibling_spawned_at_glass() {
        let rays = trace(&[prism()], &[prism_beam()]);
        let entry = rays.last().unwrap().endpoint();

        let siblings: Vec<&Ray> = rays
            .iter()
            .filter(|r| r.is_white() && r.bounces == 1 && (r.path[0] - entry).length() < 1e-3)
            .collect();
        assert_eq!(siblings.len(), 1);
        assert!(siblings[0].intensity < 0.5);
        assert!(siblings[0].intensity > 0.01);
    }

    #[test]
    fn test_normal_incidence_through_block() {
        // Dispersion leaves every band travelling straight on
        let glass = block(Vec2::new(200.0, 0.0), 100.0, 100.0);
        let emitter = Emitter::new(Vec2::ZERO, Vec2::X).unwrap();
        let rays = trace(&[glass], &[emitter]);

        let entry = Vec2::new(150.0, 0.0);
        let bands: Vec<&Ray> = rays
            .iter()
            .filter(|r| !r.is_white() && (r.path[0] - entry).length() < 1e-3)
            .collect();
        assert_eq!(bands.len(), 6);
        for ray in bands {
            assert_eq!(ray.path.len(), 3);
            assert!((ray.path[1] - Vec2::new(250.0, 0.0)).length() < 1e-2);
            let d = ray.exit_direction().unwrap();
            assert!((d - Vec2::X).length() < 1e-4);
            assert_eq!(ray.medium, Medium::Ambient);
            assert_eq!(ray.bounces, 2);
        }
    }

    #[test]
    fn test_intensity_never_grows() {
        let rays = trace(&[prism()], &[prism_beam()]);
        for ray in &rays {
            assert!(ray.intensity <= 1.0);
            assert!(ray.intensity > 0.0);
            if !ray.is_white() {
                // Band rays carry at most the transmitted share of the beam
                assert!(ray.intensity < 1.0);
            }
        }
    }

    #[test]
    fn test_mirror_box_terminates() {
        let square = vec![
            Vec2::new(-100.0, -100.0),
            Vec2::new(100.0, -100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(-100.0, 100.0),
        ];
        let walls = SceneElement::custom(Category::Mirror, square, true, Vec2::ZERO).unwrap();
        let emitter = Emitter::light_box(Vec2::new(10.0, -5.0), 33.0);
        let config = TraceConfig::default();
        let rays = trace_scene(&[walls], &[emitter], &config).unwrap();

        assert_eq!(rays.len(), 3);
        for ray in &rays {
            assert!(!ray.active);
            assert_eq!(ray.bounces, config.max_bounces);
            assert!(ray.path.len() as u32 <= config.max_steps + 1);
            assert!(ray.traveled <= config.max_distance);
        }
    }

    #[test]
    fn test_travel_budget_caps_distance() {
        let config = TraceConfig {
            max_distance: 500.0,
            ..TraceConfig::default()
        };
        let emitter = Emitter::new(Vec2::ZERO, Vec2::Y).unwrap();
        let rays = trace_scene(&[], &[emitter], &config).unwrap();
        assert_eq!(rays[0].traveled, 500.0);
        assert!((rays[0].endpoint() - Vec2::new(0.0, 500.0)).length() < 1e-3);
        assert_eq!(rays[0].effective_intensity(config.max_distance), 0.0);
    }

    #[test]
    fn test_total_internal_reflection_keeps_energy_inside() {
        // A ray already inside glass meets the far face beyond the critical angle
        let glass = block(Vec2::ZERO, 400.0, 100.0);
        let config = TraceConfig::default();
        let mut tracer = RayTracer::new(std::slice::from_ref(&glass), &config).unwrap();

        let mut ray = Ray::emitted(Vec2::ZERO, direction_from_degrees(30.0));
        ray.spectrum = Spectrum::Mono(Band::Green);
        ray.medium = Medium::Dielectric;
        ray.may_split = false;
        tracer.trace_ray(ray, Launch::Emitted);

        let rays = tracer.into_rays();
        let parent = rays.last().unwrap();
        // Incidence on the bottom face is 60°: the parent stops there
        assert_eq!(parent.path.len(), 2);
        let sibling = rays
            .iter()
            .find(|r| r.bounces == 1 && r.path[0] == parent.endpoint())
            .expect("reflected sibling");
        assert!((sibling.intensity - 1.0).abs() < 1e-6);
        assert_eq!(sibling.medium, Medium::Dielectric);
    }

    #[test]
    fn test_lens_uses_glass_optics() {
        let lens = SceneElement::new(Shape::ConvexLens, Pose::new(Vec2::new(300.0, 0.0), 90.0, 120.0, 60.0)).unwrap();
        let emitter = Emitter::new(Vec2::ZERO, Vec2::X).unwrap();
        let rays = trace(&[lens], &[emitter]);
        assert!(rays.iter().filter(|r| !r.is_white()).count() >= 6);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TraceConfig {
            dielectric_base_index: 0.0,
            ..TraceConfig::default()
        };
        assert!(RayTracer::new(&[], &config).is_err());

        let config = TraceConfig {
            max_distance: 0.0,
            ..TraceConfig::default()
        };
        let emitter = Emitter::new(Vec2::ZERO, Vec2::X).unwrap();
        assert!(trace_scene(&[], &[emitter], &config).is_err());
    }
}
