//! Interactive parametric curve sketching.
//!
//! Control points drawn with the pointer become B-spline, Bézier or
//! Catmull-Rom curves that drift and bounce inside the viewport.

pub mod config;
pub mod coord_sys;
pub mod render;
pub mod sketch;

pub use render::vulkan::Renderer;
pub use sketch::Sketch;
