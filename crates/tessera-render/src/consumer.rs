//! Immediate-mode output for blocks and items drawn outside chunk meshes.

use tessera_geom::{Mat3, Mat4, Vec3};
use tessera_material::RenderLayer;
use tessera_quad::{MutableQuad, QuadView};

use crate::renderer::QuadBufferer;

/// Receives finished vertices one at a time.
pub trait VertexConsumer {
    #[allow(clippy::too_many_arguments)]
    fn vertex(&mut self, pos: Vec3, color: u32, u: f32, v: f32, overlay: u32, light: u32, normal: Vec3);
}

/// Hands out the consumer for a render layer.
pub trait VertexConsumerProvider {
    fn buffer(&mut self, layer: RenderLayer) -> &mut dyn VertexConsumer;
}

/// Transforms quads by a model matrix and streams them to a provider.
pub struct VertexConsumerQuadBufferer<'a> {
    pub provider: &'a mut dyn VertexConsumerProvider,
    pub matrix: Mat4,
    pub normal_matrix: Mat3,
    pub overlay: u32,
}

impl QuadBufferer for VertexConsumerQuadBufferer<'_> {
    fn buffer_quad(&mut self, quad: &mut MutableQuad, _brightness: &[f32; 4], layer: RenderLayer) {
        let use_normals = quad.has_vertex_normals();
        let face_normal = if use_normals {
            quad.populate_missing_normals();
            Vec3::ZERO
        } else {
            self.normal_matrix.transform(quad.face_normal_mut())
        };
        let out = self.provider.buffer(layer);
        for i in 0..4 {
            let normal = match quad.normal(i) {
                Some(n) if use_normals => self.normal_matrix.transform(n),
                _ => face_normal,
            };
            out.vertex(
                self.matrix.transform_point(quad.pos(i)),
                quad.color(i),
                quad.u(i),
                quad.v(i),
                self.overlay,
                quad.lightmap(i),
                normal,
            );
        }
    }
}

/// One vertex as recorded by [`VertexCollector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectedVertex {
    pub layer: RenderLayer,
    pub pos: Vec3,
    pub color: u32,
    pub uv: (f32, f32),
    pub overlay: u32,
    pub light: u32,
    pub normal: Vec3,
}

/// Provider that keeps every vertex in memory.
#[derive(Clone, Debug, Default)]
pub struct VertexCollector {
    pub vertices: Vec<CollectedVertex>,
    layer: RenderLayer,
}

impl VertexCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl VertexConsumer for VertexCollector {
    fn vertex(&mut self, pos: Vec3, color: u32, u: f32, v: f32, overlay: u32, light: u32, normal: Vec3) {
        self.vertices.push(CollectedVertex {
            layer: self.layer,
            pos,
            color,
            uv: (u, v),
            overlay,
            light,
            normal,
        });
    }
}

impl VertexConsumerProvider for VertexCollector {
    fn buffer(&mut self, layer: RenderLayer) -> &mut dyn VertexConsumer {
        self.layer = layer;
        self
    }
}
