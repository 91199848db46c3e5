use tessera_geom::BlockPos;
use tessera_light::{AoCalculator, BlockState, BlockView, LightDataCache};
use tessera_material::RenderLayer;
use tessera_quad::MutableQuad;

use crate::block_info::BlockRenderInfo;
use crate::config::RendererConfig;
use crate::consumer::VertexConsumerQuadBufferer;
use crate::error::TessellateError;
use crate::model::{BlockModel, ModelOutput};
use crate::renderer::{QuadBufferer, QuadRenderer};
use crate::transform::TransformStack;

/// Draws single blocks outside chunk meshes, e.g. falling or held blocks,
/// straight into vertex consumers.
pub struct BlockRenderContext {
    block_info: BlockRenderInfo,
    ao: AoCalculator,
    cache: LightDataCache,
    editor: MutableQuad,
    vanilla_editor: MutableQuad,
    transforms: TransformStack,
}

struct CountingBufferer<'a> {
    inner: &'a mut dyn QuadBufferer,
    quads: usize,
}

impl QuadBufferer for CountingBufferer<'_> {
    fn buffer_quad(&mut self, quad: &mut MutableQuad, brightness: &[f32; 4], layer: RenderLayer) {
        self.quads += 1;
        self.inner.buffer_quad(quad, brightness, layer);
    }
}

impl BlockRenderContext {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            block_info: BlockRenderInfo::new(config.ambient_occlusion, config.cull_faces),
            ao: AoCalculator::new(config.ao_options()),
            cache: LightDataCache::new(),
            editor: MutableQuad::new(),
            vanilla_editor: MutableQuad::new(),
            transforms: TransformStack::new(),
        }
    }

    pub fn transforms_mut(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }

    /// Renders `model` for the block at `pos`. Returns whether anything was drawn.
    ///
    /// `cull` turns face culling against neighbors on for this call only.
    pub fn render(
        &mut self,
        view: &dyn BlockView,
        model: &dyn BlockModel,
        state: BlockState,
        pos: BlockPos,
        cull: bool,
        output: &mut VertexConsumerQuadBufferer<'_>,
    ) -> Result<bool, TessellateError> {
        self.cache.clear();
        self.ao.clear();
        let use_ao = self.block_info.use_ao();
        self.block_info.prepare_for_world(use_ao, cull);
        self.block_info
            .prepare_for_block(view, state, pos, model.use_ambient_occlusion());

        let mut counting = CountingBufferer { inner: output, quads: 0 };
        let renderer = QuadRenderer {
            info: &mut self.block_info,
            view,
            ao: &mut self.ao,
            cache: &mut self.cache,
            transforms: &mut self.transforms,
            bufferer: &mut counting,
        };
        let mut out = ModelOutput::new(&mut self.editor, &mut self.vanilla_editor, renderer);
        let result = model
            .emit_block_quads(view, state, pos, &mut out)
            .map_err(|source| TessellateError::Block { pos, state, source });
        self.block_info.release();
        result.map(|()| counting.quads > 0)
    }
}
