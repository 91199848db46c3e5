//! Model traits and the per-block output handle models emit into.

use tessera_geom::{BlockPos, Direction};
use tessera_light::{BlockState, BlockView};
use tessera_material::{MaterialFinder, RenderMaterial};
use tessera_quad::{BakedQuad, Mesh, MutableQuad, QuadEmitter};

use crate::context::item::ItemOutput;
use crate::error::ModelError;
use crate::renderer::QuadRenderer;

/// Geometry source for one block.
pub trait BlockModel {
    fn use_ambient_occlusion(&self) -> bool {
        true
    }

    fn emit_block_quads(
        &self,
        view: &dyn BlockView,
        state: BlockState,
        pos: BlockPos,
        out: &mut ModelOutput<'_>,
    ) -> Result<(), ModelError>;
}

/// Geometry source for an item stack.
pub trait ItemModel {
    fn emit_item_quads(&self, out: &mut ItemOutput<'_>) -> Result<(), ModelError>;
}

/// Plain baked quads, bucketed by the face that culls them.
#[derive(Clone, Debug, Default)]
pub struct BakedModel {
    pub culled: [Vec<BakedQuad>; 6],
    pub unculled: Vec<BakedQuad>,
    pub ambient_occlusion: bool,
}

impl BakedModel {
    pub fn new(ambient_occlusion: bool) -> Self {
        Self {
            ambient_occlusion,
            ..Self::default()
        }
    }

    pub fn push(&mut self, cull_face: Option<Direction>, quad: BakedQuad) {
        match cull_face {
            Some(face) => self.culled[face.index()].push(quad),
            None => self.unculled.push(quad),
        }
    }

    pub fn quads(&self, cull_face: Option<Direction>) -> &[BakedQuad] {
        match cull_face {
            Some(face) => &self.culled[face.index()],
            None => &self.unculled,
        }
    }
}

impl BlockModel for BakedModel {
    fn use_ambient_occlusion(&self) -> bool {
        self.ambient_occlusion
    }

    fn emit_block_quads(
        &self,
        _view: &dyn BlockView,
        _state: BlockState,
        _pos: BlockPos,
        out: &mut ModelOutput<'_>,
    ) -> Result<(), ModelError> {
        out.accept_baked(self);
        Ok(())
    }
}

impl BlockModel for Mesh {
    fn emit_block_quads(
        &self,
        _view: &dyn BlockView,
        _state: BlockState,
        _pos: BlockPos,
        out: &mut ModelOutput<'_>,
    ) -> Result<(), ModelError> {
        out.accept_mesh(self);
        Ok(())
    }
}

/// Where a model sends its quads while one block is being tessellated.
pub struct ModelOutput<'a> {
    quad: &'a mut MutableQuad,
    vanilla_quad: &'a mut MutableQuad,
    renderer: QuadRenderer<'a>,
}

impl<'a> ModelOutput<'a> {
    pub fn new(quad: &'a mut MutableQuad, vanilla_quad: &'a mut MutableQuad, renderer: QuadRenderer<'a>) -> Self {
        Self {
            quad,
            vanilla_quad,
            renderer,
        }
    }

    /// Emitter whose quads are rendered as they are emitted.
    pub fn emitter(&mut self) -> QuadEmitter<'_> {
        QuadEmitter::new(self.quad, &mut self.renderer)
    }

    pub fn accept_mesh(&mut self, mesh: &Mesh) {
        let renderer = &mut self.renderer;
        mesh.for_each_mut(self.quad, |q| renderer.render(q, false));
    }

    /// Renders a baked model, skipping culled faces before loading any quad.
    pub fn accept_baked(&mut self, model: &BakedModel) {
        let material = if model.ambient_occlusion {
            RenderMaterial::standard()
        } else {
            MaterialFinder::new().disable_ao(true).find()
        };
        for face in Direction::ALL.map(Some).into_iter().chain([None]) {
            let quads = model.quads(face);
            if quads.is_empty() || self.renderer.is_face_culled(face) {
                continue;
            }
            for baked in quads {
                self.vanilla_quad.from_baked(baked, material, face);
                self.vanilla_quad.compute_geometry();
                self.renderer.render(self.vanilla_quad, true);
            }
        }
    }

    pub fn is_face_culled(&mut self, face: Option<Direction>) -> bool {
        self.renderer.is_face_culled(face)
    }
}
