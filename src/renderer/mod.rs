//! Rendering module
//!
//! Two strategies over the same live particle set:
//! - Immediate: clear the surface and redraw every particle each frame
//!   (Canvas 2D, instanced WebGPU discs, headless recording)
//! - Retained: one persistent node per particle, updated in place (DOM)

pub mod gpu;
pub mod immediate;
pub mod retained;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use gpu::DiscRenderState;
pub use immediate::{ImmediateRenderer, ParticleStyle};
pub use retained::{NodeHost, NodeView, RetainedRenderer};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dSurface;
#[cfg(target_arch = "wasm32")]
pub use dom::DomNodeHost;
