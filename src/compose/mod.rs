//! Render fragment tiling (task builder side) and compositing (dispatcher
//! post-processor side) — §4.3 "Render (split)" and §4.4 "Render" post-processor.

mod compositor;
mod tiling;

pub use compositor::{composite_fragment, CompositeError};
pub use tiling::{build_render_tasks, RenderFragmentPayload};
