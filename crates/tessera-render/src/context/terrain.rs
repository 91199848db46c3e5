use std::sync::Arc;

use tessera_geom::{BlockPos, Vec3};
use tessera_light::{AoCalculator, BlockState, BlockView, LightDataCache, ReferenceAo};
use tessera_quad::MutableQuad;

use crate::block_info::BlockRenderInfo;
use crate::chunk::{ChunkBuildBuffers, ChunkQuadBufferer};
use crate::config::RendererConfig;
use crate::error::TessellateError;
use crate::model::{BlockModel, ModelOutput};
use crate::renderer::QuadRenderer;
use crate::sprite::SpriteFinder;
use crate::transform::{QuadTransform, TransformStack};

/// Chunk-section tessellation state for one worker.
///
/// Reused across sections: `prepare` clears the light cache and output
/// buffers without giving back their memory.
pub struct TerrainRenderContext {
    config: RendererConfig,
    block_info: BlockRenderInfo,
    ao: AoCalculator,
    cache: LightDataCache,
    editor: MutableQuad,
    vanilla_editor: MutableQuad,
    transforms: TransformStack,
    buffers: ChunkBuildBuffers,
    sprites: Arc<dyn SpriteFinder>,
}

impl TerrainRenderContext {
    pub fn new(config: &RendererConfig, sprites: Arc<dyn SpriteFinder>) -> Self {
        Self {
            config: config.clone(),
            block_info: BlockRenderInfo::new(config.ambient_occlusion, config.cull_faces),
            ao: AoCalculator::new(config.ao_options()),
            cache: LightDataCache::with_capacity(4096),
            editor: MutableQuad::new(),
            vanilla_editor: MutableQuad::new(),
            transforms: TransformStack::new(),
            buffers: ChunkBuildBuffers::new(),
            sprites,
        }
    }

    pub fn set_reference_ao(&mut self, reference: Box<dyn ReferenceAo>) {
        self.ao = AoCalculator::with_reference(self.config.ao_options(), reference);
    }

    pub fn push_transform(&mut self, transform: Box<dyn QuadTransform>) {
        self.transforms.push(transform);
    }

    pub fn pop_transform(&mut self) -> Option<Box<dyn QuadTransform>> {
        self.transforms.pop()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Light words fetched from the world since the context was created.
    pub fn light_cache_misses(&self) -> u64 {
        self.cache.misses()
    }

    /// Starts a section whose vertices are written relative to `origin`.
    pub fn prepare<'a>(&'a mut self, view: &'a dyn BlockView, origin: BlockPos) -> TerrainSession<'a> {
        self.cache.clear();
        self.buffers.clear();
        self.block_info
            .prepare_for_world(self.config.ambient_occlusion, self.config.cull_faces);
        TerrainSession {
            ctx: self,
            view,
            origin,
        }
    }
}

/// A section being built. Dropping it releases the per-block state.
pub struct TerrainSession<'a> {
    ctx: &'a mut TerrainRenderContext,
    view: &'a dyn BlockView,
    origin: BlockPos,
}

impl TerrainSession<'_> {
    /// Tessellates one block. Returns whether any quad was written.
    pub fn tessellate_block(
        &mut self,
        state: BlockState,
        pos: BlockPos,
        model: &dyn BlockModel,
        model_offset: Vec3,
    ) -> Result<bool, TessellateError> {
        let ctx = &mut *self.ctx;
        let before = ctx.buffers.quad_count();
        ctx.block_info
            .prepare_for_block(self.view, state, pos, model.use_ambient_occlusion());
        ctx.ao.clear();

        let local = Vec3::new(
            (pos.x - self.origin.x) as f32,
            (pos.y - self.origin.y) as f32,
            (pos.z - self.origin.z) as f32,
        );
        let mut bufferer = ChunkQuadBufferer {
            buffers: &mut ctx.buffers,
            sprites: &*ctx.sprites,
            offset: local + model_offset,
        };
        let renderer = QuadRenderer {
            info: &mut ctx.block_info,
            view: self.view,
            ao: &mut ctx.ao,
            cache: &mut ctx.cache,
            transforms: &mut ctx.transforms,
            bufferer: &mut bufferer,
        };
        let mut out = ModelOutput::new(&mut ctx.editor, &mut ctx.vanilla_editor, renderer);
        model
            .emit_block_quads(self.view, state, pos, &mut out)
            .map_err(|source| TessellateError::Block { pos, state, source })?;

        Ok(ctx.buffers.quad_count() > before)
    }

    pub fn buffers(&self) -> &ChunkBuildBuffers {
        &self.ctx.buffers
    }

    /// Moves the section's output out of the context.
    pub fn finish(self) -> ChunkBuildBuffers {
        std::mem::take(&mut self.ctx.buffers)
    }
}

impl Drop for TerrainSession<'_> {
    fn drop(&mut self) {
        self.ctx.block_info.release();
    }
}
