//! # Render Module
//!
//! The boundary between the terrain core and whatever actually draws it.
//! The core only needs three things from a renderer: upload a mesh, draw
//! it by handle, and discard a handle it no longer wants. Everything else
//! about rendering (windowing, shaders, projection) lives on the far side
//! of this trait.

pub mod headless;
pub mod observer;

pub use headless::HeadlessTarget;
pub use observer::Observer;

/// Opaque identifier for an uploaded mesh. The core never inspects it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) u64);

/// External rendering collaborator.
///
/// Called from the render thread only. `upload_mesh` is invoked once per
/// mesh rebuild; the returned handle stays valid until passed to
/// `discard_mesh`.
pub trait RenderTarget {
    /// Uploads flat vertex and normal buffers (four vertices per quad) and
    /// returns an opaque handle for later draws.
    fn upload_mesh(&mut self, vertices: &[f32], normals: &[f32]) -> MeshHandle;

    /// Draws `quad_count` quads from a previously uploaded mesh.
    fn draw_quads(&mut self, handle: MeshHandle, quad_count: usize);

    /// Releases the GPU resources behind `handle`.
    fn discard_mesh(&mut self, handle: MeshHandle);
}
