//! Chunk-section vertex output.

use std::sync::atomic::{AtomicBool, Ordering};

use bytemuck::{Pod, Zeroable};
use hashbrown::HashSet;
use tessera_geom::{Direction, Vec3};
use tessera_material::RenderLayer;
use tessera_quad::color::swap_red_blue;
use tessera_quad::{MutableQuad, QuadView};

use crate::renderer::QuadBufferer;
use crate::sprite::SpriteFinder;

/// GPU vertex for terrain. Color is ABGR, light is the packed lightmap.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub color: u32,
    pub uv: [f32; 2],
    pub light: u32,
}
const _: [(); 28] = [(); std::mem::size_of::<ChunkVertex>()];

/// Index buckets: one per cull face plus one for quads without a cull face.
pub const FACING_COUNT: usize = 7;
pub const UNASSIGNED: usize = 6;

#[inline]
pub fn facing_index(cull_face: Option<Direction>) -> usize {
    cull_face.map_or(UNASSIGNED, Direction::index)
}

/// Vertices and per-facing index lists for one render layer.
#[derive(Clone, Debug, Default)]
pub struct ChunkModelBuilder {
    pub vertices: Vec<ChunkVertex>,
    pub indices: [Vec<u32>; FACING_COUNT],
    sprites: HashSet<u32>,
}

impl ChunkModelBuilder {
    /// Clears all arrays but retains capacity for the next section.
    pub fn clear(&mut self) {
        self.vertices.clear();
        for idx in &mut self.indices {
            idx.clear();
        }
        self.sprites.clear();
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends four vertices as two clockwise triangles in `facing`'s bucket.
    pub fn push_quad(&mut self, vertices: [ChunkVertex; 4], facing: usize) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&vertices);
        self.indices[facing].extend_from_slice(&[start, start + 1, start + 2, start + 2, start + 3, start]);
    }

    pub fn add_sprite(&mut self, id: u32) {
        self.sprites.insert(id);
    }

    /// Sprites referenced by this layer, for animation tracking.
    pub fn sprites(&self) -> impl Iterator<Item = u32> + '_ {
        self.sprites.iter().copied()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// One [`ChunkModelBuilder`] per render layer.
#[derive(Clone, Debug, Default)]
pub struct ChunkBuildBuffers {
    layers: [ChunkModelBuilder; RenderLayer::ALL.len()],
}

impl ChunkBuildBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, layer: RenderLayer) -> &ChunkModelBuilder {
        &self.layers[layer.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, layer: RenderLayer) -> &mut ChunkModelBuilder {
        &mut self.layers[layer.index()]
    }

    pub fn quad_count(&self) -> usize {
        self.layers.iter().map(ChunkModelBuilder::quad_count).sum()
    }

    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderLayer, &ChunkModelBuilder)> {
        RenderLayer::ALL.into_iter().zip(self.layers.iter())
    }
}

static MISSING_SPRITE_WARNED: AtomicBool = AtomicBool::new(false);

/// Vertex order that splits the quad along its brighter diagonal, keeping
/// AO gradients symmetric.
pub fn orient_by_brightness(brightness: &[f32; 4]) -> [usize; 4] {
    if brightness[0] + brightness[2] < brightness[1] + brightness[3] {
        [1, 2, 3, 0]
    } else {
        [0, 1, 2, 3]
    }
}

/// Writes shaded quads into section-local [`ChunkVertex`] arrays.
pub struct ChunkQuadBufferer<'a> {
    pub buffers: &'a mut ChunkBuildBuffers,
    pub sprites: &'a dyn SpriteFinder,
    /// Block position relative to the section origin plus the model offset.
    pub offset: Vec3,
}

impl QuadBufferer for ChunkQuadBufferer<'_> {
    fn buffer_quad(&mut self, quad: &mut MutableQuad, brightness: &[f32; 4], layer: RenderLayer) {
        let order = orient_by_brightness(brightness);
        let vertices = order.map(|idx| ChunkVertex {
            position: (quad.pos(idx) + self.offset).to_array(),
            color: swap_red_blue(quad.color(idx)),
            uv: [quad.u(idx), quad.v(idx)],
            light: quad.lightmap(idx),
        });
        let builder = self.buffers.get_mut(layer);
        builder.push_quad(vertices, facing_index(quad.cull_face()));

        match quad.cached_sprite().or_else(|| self.sprites.find_quad(quad)) {
            Some(sprite) => builder.add_sprite(sprite.id),
            None => {
                if !MISSING_SPRITE_WARNED.swap(true, Ordering::Relaxed) {
                    log::warn!(
                        "no atlas sprite under quad uv ({}, {}), skipping animation tracking",
                        quad.u(0),
                        quad.v(0)
                    );
                }
            }
        }
    }
}
