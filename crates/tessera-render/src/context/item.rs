use tessera_geom::Mat4;
use tessera_material::{BlendMode, RenderLayer, RenderMaterial};
use tessera_quad::color::{MAX_LIGHTMAP, max_brightness, multiply_color};
use tessera_quad::{BakedQuad, Mesh, MutableQuad, QuadEmitter, QuadSink, QuadView};

use crate::consumer::{VertexConsumerProvider, VertexConsumerQuadBufferer};
use crate::error::TessellateError;
use crate::model::ItemModel;
use crate::renderer::QuadBufferer;
use crate::transform::TransformStack;

/// Per-draw inputs for an item.
pub struct ItemInfo<'c> {
    /// ARGB tint for a color index.
    pub colors: &'c dyn Fn(i32) -> u32,
    pub lightmap: u32,
    pub overlay: u32,
    pub matrix: Mat4,
    /// Quads with the default blend mode go to the translucent layer.
    pub default_translucent: bool,
}

/// Draws item models with a fixed lightmap; no AO and no culling.
#[derive(Default)]
pub struct ItemRenderContext {
    editor: MutableQuad,
    transforms: TransformStack,
}

impl ItemRenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transforms_mut(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }

    /// Returns whether any quad was drawn.
    pub fn render(
        &mut self,
        model: &dyn ItemModel,
        item: &ItemInfo<'_>,
        provider: &mut dyn VertexConsumerProvider,
    ) -> Result<bool, TessellateError> {
        let mut out = ItemOutput {
            quad: &mut self.editor,
            sink: ItemSink {
                item,
                transforms: &mut self.transforms,
                bufferer: VertexConsumerQuadBufferer {
                    provider,
                    matrix: item.matrix,
                    normal_matrix: item.matrix.upper3(),
                    overlay: item.overlay,
                },
                quads: 0,
            },
        };
        model.emit_item_quads(&mut out).map_err(TessellateError::Item)?;
        Ok(out.sink.quads > 0)
    }
}

struct ItemSink<'a> {
    item: &'a ItemInfo<'a>,
    transforms: &'a mut TransformStack,
    bufferer: VertexConsumerQuadBufferer<'a>,
    quads: usize,
}

impl ItemSink<'_> {
    fn layer(&self, material: &RenderMaterial) -> RenderLayer {
        let translucent = match material.blend_mode() {
            BlendMode::Default => self.item.default_translucent,
            mode => mode == BlendMode::Translucent,
        };
        if translucent { RenderLayer::Translucent } else { RenderLayer::Cutout }
    }
}

impl QuadSink for ItemSink<'_> {
    fn accept(&mut self, quad: &mut MutableQuad) {
        if !self.transforms.is_empty() {
            if !self.transforms.apply(quad) {
                return;
            }
            if quad.is_geometry_invalid() {
                quad.compute_geometry();
            }
        }
        let material = quad.material();
        let color_index = if material.disable_color_index() { -1 } else { quad.color_index() };
        if color_index != -1 {
            let tint = 0xFF00_0000 | (self.item.colors)(color_index);
            for v in 0..4 {
                quad.set_color(v, multiply_color(tint, quad.color(v)));
            }
        }
        for v in 0..4 {
            let lm = if material.emissive() {
                MAX_LIGHTMAP
            } else {
                max_brightness(quad.lightmap(v), self.item.lightmap)
            };
            quad.set_lightmap(v, lm);
        }
        let layer = self.layer(material);
        self.bufferer.buffer_quad(quad, &[1.0; 4], layer);
        self.quads += 1;
    }
}

/// Where an item model sends its quads.
pub struct ItemOutput<'a> {
    quad: &'a mut MutableQuad,
    sink: ItemSink<'a>,
}

impl ItemOutput<'_> {
    pub fn emitter(&mut self) -> QuadEmitter<'_> {
        QuadEmitter::new(self.quad, &mut self.sink)
    }

    pub fn accept_mesh(&mut self, mesh: &Mesh) {
        let sink = &mut self.sink;
        mesh.for_each_mut(self.quad, |q| sink.accept(q));
    }

    pub fn accept_baked(&mut self, quads: &[BakedQuad]) {
        for baked in quads {
            self.quad.from_baked(baked, RenderMaterial::standard(), None);
            self.quad.compute_geometry();
            self.sink.accept(self.quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_geom::Vec3;
    use tessera_material::MaterialFinder;
    use tessera_quad::color::pack_lightmap;

    use crate::consumer::VertexCollector;
    use crate::error::ModelError;

    struct TwoQuads;

    impl ItemModel for TwoQuads {
        fn emit_item_quads(&self, out: &mut ItemOutput<'_>) -> Result<(), ModelError> {
            let glow = MaterialFinder::new()
                .emissive(true)
                .blend_mode(BlendMode::Translucent)
                .find();
            let mut em = out.emitter();
            for material in [RenderMaterial::standard(), glow] {
                em.set_pos(0, 0.0, 1.0, 0.0)
                    .set_pos(1, 0.0, 0.0, 0.0)
                    .set_pos(2, 1.0, 0.0, 0.0)
                    .set_pos(3, 1.0, 1.0, 0.0)
                    .set_color_all(0xFF80_8080)
                    .set_color_index(0)
                    .set_material(material);
                em.emit();
            }
            Ok(())
        }
    }

    struct Broken;

    impl ItemModel for Broken {
        fn emit_item_quads(&self, _out: &mut ItemOutput<'_>) -> Result<(), ModelError> {
            Err("missing texture".into())
        }
    }

    fn info(colors: &dyn Fn(i32) -> u32) -> ItemInfo<'_> {
        ItemInfo {
            colors,
            lightmap: pack_lightmap(4, 9),
            overlay: 3,
            matrix: Mat4::translation(Vec3::new(0.0, 0.0, -2.0)),
            default_translucent: false,
        }
    }

    #[test]
    fn tints_and_lights_each_quad() {
        let colors = |_: i32| 0x00FF_0000;
        let mut collector = VertexCollector::new();
        let drew = ItemRenderContext::new()
            .render(&TwoQuads, &info(&colors), &mut collector)
            .unwrap();
        assert!(drew);
        assert_eq!(collector.quad_count(), 2);
        let plain = &collector.vertices[0];
        assert_eq!(plain.layer, RenderLayer::Cutout);
        assert_eq!(plain.color, 0xFF80_0000);
        assert_eq!(plain.light, pack_lightmap(4, 9));
        assert_eq!(plain.pos.z, -2.0);
        let glow = &collector.vertices[4];
        assert_eq!(glow.layer, RenderLayer::Translucent);
        assert_eq!(glow.light, MAX_LIGHTMAP);
    }

    #[test]
    fn model_errors_are_wrapped() {
        let colors = |_: i32| u32::MAX;
        let mut collector = VertexCollector::new();
        let err = ItemRenderContext::new()
            .render(&Broken, &info(&colors), &mut collector)
            .unwrap_err();
        assert!(matches!(err, TessellateError::Item(_)));
        assert_eq!(err.to_string(), "tessellating item model");
    }
}
