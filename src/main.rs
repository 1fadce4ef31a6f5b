//! Binary entry point for the headless terrain flight.
//!
//! ```bash
//! RUST_LOG=info cargo run --release [config.json]
//! ```

fn main() {
    voxel_terrain::run();
}
