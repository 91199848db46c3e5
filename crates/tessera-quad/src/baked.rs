use tessera_geom::Direction;

use crate::encoding::QUAD_STRIDE;
use crate::sprite::Sprite;
use crate::view::QuadView;

/// Pre-baked model quad: vertex words in the shared vertex layout plus the
/// metadata a model bakery attaches.
#[derive(Clone, Debug, PartialEq)]
pub struct BakedQuad {
    pub vertex_data: [u32; QUAD_STRIDE],
    pub color_index: i32,
    pub face: Direction,
    pub sprite: Option<Sprite>,
    /// False for quads that skip diffuse shading.
    pub shade: bool,
}

impl BakedQuad {
    pub fn from_view<Q: QuadView + ?Sized>(
        quad: &Q,
        face: Direction,
        color_index: i32,
        sprite: Option<Sprite>,
        shade: bool,
    ) -> Self {
        let mut vertex_data = [0; QUAD_STRIDE];
        quad.to_vanilla(&mut vertex_data);
        Self {
            vertex_data,
            color_index,
            face,
            sprite,
            shade,
        }
    }
}
