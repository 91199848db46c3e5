//! Block tessellation: per-quad culling, tinting, AO or flat shading, and
//! buffering into chunk vertex arrays or immediate vertex consumers.
#![forbid(unsafe_code)]

pub mod block_info;
pub mod chunk;
pub mod config;
pub mod consumer;
pub mod context;
pub mod error;
pub mod model;
pub mod renderer;
pub mod sprite;
pub mod transform;

pub use block_info::BlockRenderInfo;
pub use chunk::{ChunkBuildBuffers, ChunkModelBuilder, ChunkQuadBufferer, ChunkVertex};
pub use config::RendererConfig;
pub use consumer::{CollectedVertex, VertexCollector, VertexConsumer, VertexConsumerProvider, VertexConsumerQuadBufferer};
pub use context::{BlockRenderContext, ItemInfo, ItemOutput, ItemRenderContext, TerrainRenderContext, TerrainSession};
pub use error::{ConfigError, ModelError, TessellateError};
pub use model::{BakedModel, BlockModel, ItemModel, ModelOutput};
pub use renderer::{QuadBufferer, QuadRenderer};
pub use sprite::{SpriteAtlas, SpriteFinder};
pub use transform::{QuadTransform, TransformStack};
