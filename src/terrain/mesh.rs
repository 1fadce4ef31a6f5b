//! # Quad Mesh Module
//!
//! The face-culling mesher. For every solid block it emits one axis-aligned
//! quad per exposed face, where a face is exposed when the outward neighbor
//! cell is empty. Neighbor cells are resolved through a sampler closure so
//! probes that cross the chunk boundary land in the correct neighbor chunk
//! (or in empty space above and below the single-layer world).
//!
//! The output is a pair of flat `f32` buffers, four vertices and four
//! matching normals per quad, with constant normals per face orientation.
//! Building replaces the previous buffers wholesale, so a reader never sees
//! a mix of old and new quads.

/// Cached quad geometry for one chunk.
///
/// `quad_count() == 0` reads as "stale or absent": either nothing has been
/// built yet, an edit invalidated the previous build, or the chunk is
/// genuinely all air. The owning node tracks which of those applies.
#[derive(Clone, Default)]
pub struct QuadMesh {
    vertices: Vec<f32>,
    normals: Vec<f32>,
    quad_count: usize,
}

impl QuadMesh {
    /// Builds the mesh for a cubic volume with edge length `size`.
    ///
    /// `solid_at` must answer solidity for local coordinates `x, z` in
    /// `[-size/2 - 1, size/2]` and `y` in `[-1, size]`, one step past the
    /// volume on every axis.
    pub fn build(size: i32, solid_at: impl Fn(i32, i32, i32) -> bool) -> Self {
        let mut mesh = QuadMesh::default();
        let hs = size / 2;

        for x in -hs..hs {
            for y in 0..size {
                for z in -hs..hs {
                    if !solid_at(x, y, z) {
                        continue;
                    }

                    let (xf, yf, zf) = (x as f32, y as f32, z as f32);
                    if !solid_at(x - 1, y, z) {
                        mesh.push_quad(
                            [
                                [xf - 0.5, yf - 0.5, zf - 0.5],
                                [xf - 0.5, yf + 0.5, zf - 0.5],
                                [xf - 0.5, yf + 0.5, zf + 0.5],
                                [xf - 0.5, yf - 0.5, zf + 0.5],
                            ],
                            [-1.0, 0.0, 0.0],
                        );
                    }
                    if !solid_at(x + 1, y, z) {
                        mesh.push_quad(
                            [
                                [xf + 0.5, yf - 0.5, zf - 0.5],
                                [xf + 0.5, yf + 0.5, zf - 0.5],
                                [xf + 0.5, yf + 0.5, zf + 0.5],
                                [xf + 0.5, yf - 0.5, zf + 0.5],
                            ],
                            [1.0, 0.0, 0.0],
                        );
                    }
                    if !solid_at(x, y, z - 1) {
                        mesh.push_quad(
                            [
                                [xf - 0.5, yf - 0.5, zf - 0.5],
                                [xf + 0.5, yf - 0.5, zf - 0.5],
                                [xf + 0.5, yf + 0.5, zf - 0.5],
                                [xf - 0.5, yf + 0.5, zf - 0.5],
                            ],
                            [0.0, 0.0, -1.0],
                        );
                    }
                    if !solid_at(x, y, z + 1) {
                        mesh.push_quad(
                            [
                                [xf - 0.5, yf - 0.5, zf + 0.5],
                                [xf + 0.5, yf - 0.5, zf + 0.5],
                                [xf + 0.5, yf + 0.5, zf + 0.5],
                                [xf - 0.5, yf + 0.5, zf + 0.5],
                            ],
                            [0.0, 0.0, 1.0],
                        );
                    }
                    if !solid_at(x, y - 1, z) {
                        mesh.push_quad(
                            [
                                [xf - 0.5, yf - 0.5, zf - 0.5],
                                [xf + 0.5, yf - 0.5, zf - 0.5],
                                [xf + 0.5, yf - 0.5, zf + 0.5],
                                [xf - 0.5, yf - 0.5, zf + 0.5],
                            ],
                            [0.0, -1.0, 0.0],
                        );
                    }
                    if !solid_at(x, y + 1, z) {
                        mesh.push_quad(
                            [
                                [xf - 0.5, yf + 0.5, zf - 0.5],
                                [xf + 0.5, yf + 0.5, zf - 0.5],
                                [xf + 0.5, yf + 0.5, zf + 0.5],
                                [xf - 0.5, yf + 0.5, zf + 0.5],
                            ],
                            [0.0, 1.0, 0.0],
                        );
                    }
                }
            }
        }

        log::debug!(
            "meshed volume: {} quads, {} vertex floats",
            mesh.quad_count,
            mesh.vertices.len()
        );
        mesh
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        for corner in corners {
            self.vertices.extend_from_slice(&corner);
        }
        for _ in 0..4 {
            self.normals.extend_from_slice(&normal);
        }
        self.quad_count += 1;
    }

    /// Flat vertex buffer, three floats per vertex, four vertices per quad.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Flat normal buffer, parallel to `vertices`.
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Number of quads currently held. Zero reads as stale.
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Drops the cached geometry so the next rebuild starts from scratch.
    /// Touches no GPU state.
    pub fn invalidate(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.quad_count = 0;
    }

    /// Counts quads whose per-face normal equals `normal` exactly.
    pub fn quads_with_normal(&self, normal: [f32; 3]) -> usize {
        self.normals
            .chunks_exact(12)
            .filter(|quad| quad[0] == normal[0] && quad[1] == normal[1] && quad[2] == normal[2])
            .count()
    }
}
