//! Lightbox entry point
//!
//! Traces a scene for a number of frames and logs what the sensors see.
//! Without a scene file the showcase prism is spun half a degree per frame.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use lightbox::TraceConfig;
    use lightbox::optics::{Scene, showcase, tick};

    const SHOWCASE_SPIN: f32 = 0.5;

    /// Command line arguments
    #[derive(Parser, Debug)]
    #[command(name = "lightbox")]
    #[command(about = "Trace a 2D optics scene and report which sensors light up")]
    pub struct Args {
        /// Scene JSON file; the spinning prism showcase runs when omitted
        pub scene: Option<PathBuf>,

        /// Trace config JSON file (defaults are used when missing or invalid)
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Number of frames to trace
        #[arg(short, long, default_value = "720")]
        pub frames: u32,
    }

    fn load_scene(path: &Path) -> lightbox::Result<Scene> {
        let json = std::fs::read_to_string(path)?;
        Scene::from_json(&json)
    }

    pub fn run(args: Args) -> lightbox::Result<()> {
        let config = match &args.config {
            Some(path) => TraceConfig::load(path),
            None => TraceConfig::default(),
        };

        let (mut scene, spin) = match &args.scene {
            Some(path) => {
                log::info!("Loading scene from {}", path.display());
                (load_scene(path)?, false)
            }
            None => {
                log::info!("No scene given, running the prism showcase");
                (showcase(0.0)?, true)
            }
        };
        log::info!(
            "{} elements, {} emitters, {} sensors",
            scene.elements.len(),
            scene.emitters.len(),
            scene.sensors.len()
        );

        let mut solved_at = None;
        for frame_index in 0..args.frames {
            if spin && frame_index > 0 {
                let mut pose = *scene.elements[0].pose();
                pose.rotation = (pose.rotation + SHOWCASE_SPIN) % 360.0;
                scene.elements[0].set_pose(pose);
            }

            let frame = tick(&mut scene, &config)?;
            for &i in &frame.rising {
                log::info!("Frame {frame_index}: sensor {i} lit");
            }
            if frame.all_active && !scene.sensors.is_empty() && solved_at.is_none() {
                log::info!("Frame {frame_index}: all sensors lit");
                solved_at = Some(frame_index);
            }
            log::debug!("Frame {frame_index}: {} rays", frame.rays.len());
        }

        let lit = scene.sensors.iter().filter(|s| s.is_active()).count();
        println!(
            "{} frames traced, {lit}/{} sensors lit at the end",
            args.frames,
            scene.sensors.len()
        );
        match solved_at {
            Some(f) => println!("All sensors first lit on frame {f}"),
            None if scene.sensors.is_empty() => {}
            None => println!("Sensors were never all lit"),
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = native::Args::parse();
    log::info!("Lightbox starting...");

    match native::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm
}
