//! Render contexts own the per-worker state the quad pipeline borrows.

pub mod block;
pub mod item;
pub mod terrain;

pub use block::BlockRenderContext;
pub use item::{ItemInfo, ItemOutput, ItemRenderContext};
pub use terrain::{TerrainRenderContext, TerrainSession};
