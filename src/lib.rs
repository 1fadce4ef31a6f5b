//! # Voxel Terrain
//!
//! An infinite, procedurally generated voxel terrain core: a lazily
//! expanding graph of fixed-size chunk volumes, each filled from a seeded
//! noise field on its own background thread and converted into a quad
//! surface mesh by per-voxel face culling.
//!
//! ## Key Modules
//!
//! * `terrain` - Block types, dense chunk storage, the quad mesher, and the
//!   noise-driven terrain generator
//! * `graph` - The chunk node lattice, its registry, the background build
//!   coordinator, and the visibility traversal
//! * `render` - The opaque rendering boundary (mesh upload, draw, discard)
//!   and the free-flying observer
//! * `engine` - Frame-level wiring of the above
//! * `config` - JSON-backed engine settings
//!
//! ## Architecture
//!
//! The render thread drives the frame loop: it walks the lattice outward
//! from the observer's chunk, requests a background build for everything in
//! range, draws whatever is already built, and skips the rest until a later
//! frame. Each build thread generates its node's volume plus the four
//! lateral neighbor volumes it needs to mesh its seams correctly, so a
//! built chunk never shows face-culling artifacts at its boundaries.

use cgmath::Point3;
use log::{error, info};

pub mod config;
pub mod core;
pub mod engine;
pub mod graph;
pub mod render;
pub mod terrain;

pub use config::EngineConfig;
pub use engine::{DrawStats, TerrainEngine};
pub use graph::{BuildState, ChunkBuilder, ChunkGraph, ChunkNode, Direction, VisibilitySelector};
pub use render::{HeadlessTarget, MeshHandle, Observer, RenderTarget};
pub use terrain::{
    BlockType, GenerationMethod, NoiseField, QuadMesh, TerrainGenerator, TerrainParams, VoxelChunk,
};

/// Frames the demo flight runs for.
const FLIGHT_FRAMES: u32 = 300;
/// Observer speed in blocks per frame.
const FLIGHT_SPEED: f32 = 4.0;

/// Runs the headless demo flight: a scripted observer crosses the terrain
/// while the engine streams chunks in and out around it.
///
/// An optional command line argument names a JSON config file.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("could not load {path}: {err}");
                return;
            }
        },
        None => EngineConfig::default(),
    };

    info!(
        "starting flight: chunk edge {}, visibility radius {}, seed {}",
        config.chunk_edge, config.visibility_radius, config.seed
    );

    let engine = TerrainEngine::new(config.clone());
    let mut observer = Observer::new(Point3::new(0.0, config.chunk_edge as f32 * 0.75, 0.0));
    let mut target = HeadlessTarget::new();

    for frame in 0..FLIGHT_FRAMES {
        observer.set_yaw(frame as f32 * 0.005);
        let step = observer.forward() * FLIGHT_SPEED;
        observer.translate(step);

        let reachable = engine.update(&observer);
        let stats = engine.draw(&reachable, &mut target);
        engine.maintain(&observer, &mut target);

        if frame % 30 == 0 {
            info!(
                "frame {frame}: {} reachable, {} drawn, {} skipped, {} nodes, {} builds started, {} in flight",
                reachable.len(),
                stats.drawn,
                stats.skipped,
                engine.graph().len(),
                engine.builder().builds_started(),
                engine.builder().in_flight(),
            );
        }
    }

    engine.shutdown();
    info!(
        "flight complete: {} meshes uploaded, {} discarded, {} resident, {} quads drawn",
        target.uploads(),
        target.discards(),
        target.live_meshes(),
        target.quads_drawn()
    );
}
