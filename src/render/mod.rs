//! Drawing: the [`backend::Surface`] capability, its CPU and recording implementations, the
//! caption style renderer and the per-frame compositor.

/// Surface trait and frame/font value types.
pub mod backend;
pub(crate) mod blur;
/// Caption style renderer.
pub mod caption;
/// Cover-fit video plus caption frame composition.
pub mod compositor;
/// Software surface backed by `vello_cpu`.
pub mod cpu;
/// Draw-call recording surface.
pub mod recording;
pub(crate) mod text;
