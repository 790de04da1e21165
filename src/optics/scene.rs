//! Scene snapshot and the per-frame trace pass

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::element::{Pose, SceneElement, Shape};
use super::emitter::Emitter;
use super::material::Band;
use super::ray::Ray;
use super::sensor::{Sensor, SensorTarget, all_active};
use super::tracer::trace_scene;
use crate::config::TraceConfig;
use crate::error::Result;

/// Everything the tracer needs for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub elements: Vec<SceneElement>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub emitters: Vec<Emitter>,
}

/// Result of one trace pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    /// All traced rays, descendants before their parents
    pub rays: Vec<Ray>,
    /// Indices of sensors that switched on this frame
    pub rising: Vec<usize>,
    /// Every sensor is lit
    pub all_active: bool,
}

impl Scene {
    /// Parse a scene; elements, sensors and emitters are validated as they load
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Retrace the whole scene and update every sensor
///
/// Elements are only read. Sensors are updated after all rays are traced.
pub fn tick(scene: &mut Scene, config: &TraceConfig) -> Result<Frame> {
    let rays = trace_scene(&scene.elements, &scene.emitters, config)?;

    let mut rising = Vec::new();
    for (index, sensor) in scene.sensors.iter_mut().enumerate() {
        if sensor.update(&rays, config) {
            log::info!("Sensor {index} activated ({:?})", sensor.target);
            rising.push(index);
        }
    }

    let all_active = all_active(&scene.sensors);
    log::debug!(
        "Traced {} rays, {} sensors rising, all active: {all_active}",
        rays.len(),
        rising.len()
    );

    Ok(Frame {
        rays,
        rising,
        all_active,
    })
}

/// A light box firing into a prism whose spectrum fans across a row of
/// band sensors; `rotation` spins the prism in degrees
pub fn showcase(rotation: f32) -> Result<Scene> {
    let prism = SceneElement::new(
        Shape::Triangle,
        Pose::new(Vec2::new(640.0, 360.0), rotation, 100.0, 100.0),
    )?;
    let emitter = Emitter::light_box(Vec2::new(150.0, 360.0), 0.0);

    let mut sensors = vec![Sensor::with_target(Vec2::new(1100.0, 360.0), SensorTarget::White)];
    sensors.extend(Band::ALL.into_iter().enumerate().map(|(i, band)| {
        Sensor::with_target(
            Vec2::new(1000.0, 420.0 + i as f32 * 40.0),
            SensorTarget::Color(band.rgb()),
        )
    }));

    Ok(Scene {
        elements: vec![prism],
        sensors,
        emitters: vec![emitter],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::element::Category;
    use crate::optics::material::Spectrum;
    use proptest::prelude::*;

    fn mirror_scene() -> Scene {
        // Beam heads +x, a 45° mirror turns it toward +y onto a white sensor
        let mirror = SceneElement::new(
            Shape::PlaneMirror,
            Pose::new(Vec2::new(300.0, 0.0), 45.0, 100.0, 10.0),
        )
        .unwrap();
        Scene {
            elements: vec![mirror],
            sensors: vec![Sensor::with_target(Vec2::new(300.0, 300.0), SensorTarget::White)],
            emitters: vec![Emitter::new(Vec2::ZERO, Vec2::X).unwrap()],
        }
    }

    #[test]
    fn test_tick_activates_white_sensor() {
        let config = TraceConfig::default();
        let mut scene = mirror_scene();

        let frame = tick(&mut scene, &config).unwrap();
        assert_eq!(frame.rising, vec![0]);
        assert!(frame.all_active);
        assert!(scene.sensors[0].is_active());

        // Still lit, but no new edge
        let frame = tick(&mut scene, &config).unwrap();
        assert!(frame.rising.is_empty());
        assert!(frame.all_active);

        // Move the mirror out of the way: sensor drops
        scene.elements[0].set_pose(Pose::new(Vec2::new(300.0, 500.0), 45.0, 100.0, 10.0));
        let frame = tick(&mut scene, &config).unwrap();
        assert!(!frame.all_active);
        assert!(!scene.sensors[0].is_active());
    }

    #[test]
    fn test_tick_does_not_touch_elements() {
        let config = TraceConfig::default();
        let mut scene = mirror_scene();
        let before = scene.elements.clone();
        tick(&mut scene, &config).unwrap();
        assert_eq!(scene.elements, before);
    }

    #[test]
    fn test_showcase_disperses_every_band() {
        let config = TraceConfig::default();
        let mut scene = showcase(0.0).unwrap();
        let frame = tick(&mut scene, &config).unwrap();

        // The beam disperses into every band at the entry face
        for band in Band::ALL {
            assert!(
                frame
                    .rays
                    .iter()
                    .any(|r| r.spectrum == Spectrum::Mono(band)),
                "{} missing",
                band.as_str()
            );
        }
    }

    #[test]
    fn test_red_sensor_lit_through_prism() {
        // Sensor 0 is white, 1..=6 follow the bands from red to violet.
        // At 65.5° the red band lands on its own sensor and nothing else lights.
        let config = TraceConfig::default();
        let mut scene = showcase(65.5).unwrap();
        let frame = tick(&mut scene, &config).unwrap();

        assert_eq!(frame.rising, vec![1]);
        assert!(scene.sensors[1].is_active());
        assert!(!scene.sensors[0].is_active(), "white sensor sees only dispersed light");
        assert!(!scene.sensors[2].is_active(), "orange sensor must not match red");
        assert!(!frame.all_active);

        let lit_by = frame
            .rays
            .iter()
            .filter(|r| r.spectrum == Spectrum::Mono(Band::Red))
            .any(|r| scene.sensors[1].check_hit(r));
        assert!(lit_by);
    }

    #[test]
    fn test_scene_json_round_trip() {
        let scene = mirror_scene();
        let json = scene.to_json().unwrap();
        let back = Scene::from_json(&json).unwrap();
        assert_eq!(back.elements, scene.elements);
        assert_eq!(back.emitters, scene.emitters);
        assert_eq!(back.sensors.len(), 1);
    }

    #[test]
    fn test_scene_json_rejects_invalid_parts() {
        let json = r#"{"sensors":[{"position":[0.0,0.0],"radius":5.0,"target":"White","tolerance":-1.0}]}"#;
        assert!(Scene::from_json(json).is_err());
    }

    #[test]
    fn test_enclosed_mirror_box_terminates() {
        let config = TraceConfig::default();
        let square = vec![
            Vec2::new(-50.0, -50.0),
            Vec2::new(50.0, -50.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(-50.0, 50.0),
        ];
        let mut scene = Scene {
            elements: vec![SceneElement::custom(Category::Mirror, square, true, Vec2::new(200.0, 200.0)).unwrap()],
            sensors: Vec::new(),
            emitters: vec![Emitter::light_box(Vec2::new(200.0, 200.0), 17.0)],
        };
        let frame = tick(&mut scene, &config).unwrap();
        assert!(frame.rays.iter().all(|r| !r.active));
        assert!(frame.all_active, "no sensors is trivially complete");
    }

    proptest! {
        #[test]
        fn prop_tick_is_deterministic(
            rotation in 0.0f32..360.0,
            x in 400.0f32..900.0,
            y in 200.0f32..500.0,
        ) {
            let config = TraceConfig::default();
            let mut a = showcase(rotation).unwrap();
            a.elements.push(
                SceneElement::new(Shape::ConvexLens, Pose::new(Vec2::new(x, y), rotation, 100.0, 80.0)).unwrap(),
            );
            let mut b = a.clone();

            let fa = tick(&mut a, &config).unwrap();
            let fb = tick(&mut b, &config).unwrap();
            prop_assert_eq!(fa, fb);
        }
    }
}
