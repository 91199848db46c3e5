//! Host-facing world access used while tessellating a block.

use tessera_geom::{BlockPos, Direction};
use tessera_material::RenderLayer;

use crate::word;

/// Block identity as the host stores it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockState {
    pub id: u16,
    pub state: u16,
}

impl BlockState {
    pub const AIR: BlockState = BlockState { id: 0, state: 0 };

    pub const fn new(id: u16, state: u16) -> Self {
        Self { id, state }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.id == 0
    }
}

/// Source of packed light words (see [`crate::word`]).
pub trait LightDataSource {
    fn light_word(&self, pos: BlockPos) -> u32;
}

/// Read-only view of the blocks around the one being rendered.
pub trait BlockView: LightDataSource {
    fn block_state(&self, pos: BlockPos) -> BlockState;

    /// Diffuse multiplier for a face direction.
    fn directional_brightness(&self, face: Direction, shaded: bool) -> f32;

    /// ARGB tint for `color_index` of the block at `pos`.
    fn block_color(&self, state: BlockState, pos: BlockPos, color_index: i32) -> u32;

    /// Whether the face of `state` at `pos` towards `face` is visible.
    fn should_draw_side(&self, state: BlockState, pos: BlockPos, face: Direction) -> bool;

    /// Layer used for quads whose material does not pick one.
    fn render_layer(&self, state: BlockState) -> RenderLayer;

    fn luminance(&self, pos: BlockPos) -> u8 {
        word::luminance(self.light_word(pos)) as u8
    }

    fn is_full_cube(&self, pos: BlockPos) -> bool {
        word::is_full_cube(self.light_word(pos))
    }
}
