//! A render target that records instead of drawing. Backs the demo binary
//! and the test suite; a GPU renderer implements the same trait.

use std::collections::HashMap;

use log::warn;

use super::{MeshHandle, RenderTarget};

/// Counts uploads, draws, and discards without touching a GPU.
#[derive(Default)]
pub struct HeadlessTarget {
    next_handle: u64,
    live: HashMap<MeshHandle, usize>,
    uploads: usize,
    discards: usize,
    draw_calls: usize,
    quads_drawn: usize,
}

impl HeadlessTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of meshes currently resident.
    pub fn live_meshes(&self) -> usize {
        self.live.len()
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn quads_drawn(&self) -> usize {
        self.quads_drawn
    }
}

impl RenderTarget for HeadlessTarget {
    fn upload_mesh(&mut self, vertices: &[f32], normals: &[f32]) -> MeshHandle {
        debug_assert_eq!(vertices.len(), normals.len());
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle, vertices.len() / 12);
        self.uploads += 1;
        handle
    }

    fn draw_quads(&mut self, handle: MeshHandle, quad_count: usize) {
        if !self.live.contains_key(&handle) {
            warn!("draw call for unknown mesh handle {handle:?}");
            return;
        }
        self.draw_calls += 1;
        self.quads_drawn += quad_count;
    }

    fn discard_mesh(&mut self, handle: MeshHandle) {
        if self.live.remove(&handle).is_none() {
            warn!("discard of unknown mesh handle {handle:?}");
        } else {
            self.discards += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_draw_discard_lifecycle_is_tracked() {
        let mut target = HeadlessTarget::new();

        let verts = vec![0.0f32; 24];
        let norms = vec![0.0f32; 24];
        let handle = target.upload_mesh(&verts, &norms);

        assert_eq!(target.live_meshes(), 1);
        target.draw_quads(handle, 2);
        assert_eq!(target.quads_drawn(), 2);

        target.discard_mesh(handle);
        assert_eq!(target.live_meshes(), 0);
        assert_eq!(target.discards(), 1);

        // A second discard of the same handle is ignored.
        target.discard_mesh(handle);
        assert_eq!(target.discards(), 1);
    }
}
