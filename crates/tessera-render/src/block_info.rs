use tessera_geom::{BlockPos, Direction};
use tessera_light::{BlockState, BlockView};
use tessera_material::{BlendMode, RenderLayer};

/// Per-block state shared by every quad of the block being tessellated.
#[derive(Clone, Debug)]
pub struct BlockRenderInfo {
    pub state: BlockState,
    pub pos: BlockPos,
    use_ao: bool,
    default_ao: bool,
    default_layer: RenderLayer,
    cull_enabled: bool,
    cull_completed: u8,
    cull_result: u8,
}

impl BlockRenderInfo {
    pub fn new(use_ao: bool, cull_enabled: bool) -> Self {
        Self {
            state: BlockState::AIR,
            pos: BlockPos::ORIGIN,
            use_ao,
            default_ao: false,
            default_layer: RenderLayer::Solid,
            cull_enabled,
            cull_completed: 0,
            cull_result: 0,
        }
    }

    /// Global toggles may change between chunk builds.
    pub fn prepare_for_world(&mut self, use_ao: bool, cull_enabled: bool) {
        self.use_ao = use_ao;
        self.cull_enabled = cull_enabled;
    }

    pub fn prepare_for_block(&mut self, view: &dyn BlockView, state: BlockState, pos: BlockPos, model_ao: bool) {
        self.state = state;
        self.pos = pos;
        self.default_ao = self.use_ao && model_ao && view.luminance(pos) == 0;
        self.default_layer = view.render_layer(state);
        self.cull_completed = 0;
        self.cull_result = 0;
    }

    pub fn release(&mut self) {
        self.state = BlockState::AIR;
        self.pos = BlockPos::ORIGIN;
        self.cull_completed = 0;
        self.cull_result = 0;
    }

    #[inline]
    pub fn use_ao(&self) -> bool {
        self.use_ao
    }

    /// AO applies unless disabled globally, by the model, or the block glows.
    #[inline]
    pub fn default_ao(&self) -> bool {
        self.default_ao
    }

    #[inline]
    pub fn default_layer(&self) -> RenderLayer {
        self.default_layer
    }

    /// Opaque ARGB tint for `color_index`.
    pub fn block_color(&self, view: &dyn BlockView, color_index: i32) -> u32 {
        0xFF00_0000 | view.block_color(self.state, self.pos, color_index)
    }

    /// Whether a quad culled against `face` is visible. Asks the view at most
    /// once per face per block.
    pub fn should_draw_face(&mut self, view: &dyn BlockView, face: Option<Direction>) -> bool {
        let Some(face) = face else {
            return true;
        };
        if !self.cull_enabled {
            return true;
        }
        let mask = 1u8 << face.index();
        if self.cull_completed & mask == 0 {
            self.cull_completed |= mask;
            if view.should_draw_side(self.state, self.pos, face) {
                self.cull_result |= mask;
            }
        }
        self.cull_result & mask != 0
    }

    pub fn effective_layer(&self, blend: BlendMode) -> RenderLayer {
        blend.render_layer().unwrap_or(self.default_layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tessera_light::LightDataSource;

    struct CountingView {
        asked: Cell<u32>,
        luminance: u8,
    }

    impl LightDataSource for CountingView {
        fn light_word(&self, _pos: BlockPos) -> u32 {
            tessera_light::CellLight {
                luminance: self.luminance,
                ..tessera_light::CellLight::air(0, 15)
            }
            .pack()
        }
    }

    impl BlockView for CountingView {
        fn block_state(&self, _pos: BlockPos) -> BlockState {
            BlockState::AIR
        }

        fn directional_brightness(&self, _face: Direction, _shaded: bool) -> f32 {
            1.0
        }

        fn block_color(&self, _state: BlockState, _pos: BlockPos, _color_index: i32) -> u32 {
            0x0011_2233
        }

        fn should_draw_side(&self, _state: BlockState, _pos: BlockPos, face: Direction) -> bool {
            self.asked.set(self.asked.get() + 1);
            face != Direction::Down
        }

        fn render_layer(&self, _state: BlockState) -> RenderLayer {
            RenderLayer::Cutout
        }
    }

    fn view(luminance: u8) -> CountingView {
        CountingView {
            asked: Cell::new(0),
            luminance,
        }
    }

    #[test]
    fn cull_results_are_memoized_per_block() {
        let view = view(0);
        let mut info = BlockRenderInfo::new(true, true);
        info.prepare_for_block(&view, BlockState::new(1, 0), BlockPos::ORIGIN, true);
        for _ in 0..3 {
            assert!(!info.should_draw_face(&view, Some(Direction::Down)));
            assert!(info.should_draw_face(&view, Some(Direction::Up)));
            assert!(info.should_draw_face(&view, None));
        }
        assert_eq!(view.asked.get(), 2);

        info.prepare_for_block(&view, BlockState::new(1, 0), BlockPos::new(1, 0, 0), true);
        info.should_draw_face(&view, Some(Direction::Down));
        assert_eq!(view.asked.get(), 3);
    }

    #[test]
    fn disabled_culling_draws_everything() {
        let view = view(0);
        let mut info = BlockRenderInfo::new(true, false);
        info.prepare_for_block(&view, BlockState::new(1, 0), BlockPos::ORIGIN, true);
        assert!(info.should_draw_face(&view, Some(Direction::Down)));
        assert_eq!(view.asked.get(), 0);
    }

    #[test]
    fn luminous_blocks_skip_ao() {
        let mut info = BlockRenderInfo::new(true, true);
        info.prepare_for_block(&view(0), BlockState::new(1, 0), BlockPos::ORIGIN, true);
        assert!(info.default_ao());
        info.prepare_for_block(&view(9), BlockState::new(1, 0), BlockPos::ORIGIN, true);
        assert!(!info.default_ao());
        info.prepare_for_block(&view(0), BlockState::new(1, 0), BlockPos::ORIGIN, false);
        assert!(!info.default_ao());
        info.prepare_for_world(false, true);
        info.prepare_for_block(&view(0), BlockState::new(1, 0), BlockPos::ORIGIN, true);
        assert!(!info.default_ao());
    }

    #[test]
    fn layer_and_tint_defaults() {
        let view = view(0);
        let mut info = BlockRenderInfo::new(true, true);
        info.prepare_for_block(&view, BlockState::new(1, 0), BlockPos::ORIGIN, true);
        assert_eq!(info.effective_layer(BlendMode::Default), RenderLayer::Cutout);
        assert_eq!(info.effective_layer(BlendMode::Translucent), RenderLayer::Translucent);
        assert_eq!(info.block_color(&view, 0), 0xFF11_2233);
    }
}
