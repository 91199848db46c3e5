use proptest::prelude::*;
use tessera_geom::{BlockPos, Direction, Vec3};
use tessera_light::{
    AoCalculator, AoContext, AoMode, AoOptions, BlockState, BlockView, CellLight, LightDataCache,
    LightDataSource, corner_brightness,
};
use tessera_material::RenderLayer;
use tessera_quad::MutableQuad;

/// Random light words for the 5x5x5 cells centered on the origin.
struct Neighborhood {
    words: Vec<u32>,
}

impl LightDataSource for Neighborhood {
    fn light_word(&self, pos: BlockPos) -> u32 {
        let idx = |c: i32| (c + 2).clamp(0, 4) as usize;
        self.words[idx(pos.x) + idx(pos.y) * 5 + idx(pos.z) * 25]
    }
}

impl BlockView for Neighborhood {
    fn block_state(&self, _pos: BlockPos) -> BlockState {
        BlockState::AIR
    }

    fn directional_brightness(&self, face: Direction, shaded: bool) -> f32 {
        match (face, shaded) {
            (_, false) => 1.0,
            (Direction::Down, _) => 0.5,
            (Direction::Up, _) => 1.0,
            (Direction::North | Direction::South, _) => 0.8,
            _ => 0.6,
        }
    }

    fn block_color(&self, _: BlockState, _: BlockPos, _: i32) -> u32 {
        u32::MAX
    }

    fn should_draw_side(&self, _: BlockState, _: BlockPos, _: Direction) -> bool {
        true
    }

    fn render_layer(&self, _: BlockState) -> RenderLayer {
        RenderLayer::Solid
    }
}

fn arb_cell() -> impl Strategy<Value = u32> {
    (0u8..16, 0u8..16, 0u8..4, 0.0f32..1.0, any::<[bool; 4]>()).prop_map(|(block, sky, lum, ao, b)| {
        CellLight {
            block,
            sky,
            luminance: if lum == 3 { 7 } else { 0 },
            ao,
            emissive: b[0],
            opaque: b[1],
            full_opaque: b[1] && b[2],
            full_cube: b[3],
        }
        .pack()
    })
}

fn arb_dir() -> impl Strategy<Value = Direction> {
    (0usize..6).prop_map(|i| Direction::from_index(i).unwrap())
}

fn arb_lightmap() -> impl Strategy<Value = u32> {
    (0u32..16, 0u32..16).prop_map(|(b, s)| (b << 4) | (s << 20))
}

fn face_corners(face: Direction) -> [Vec3; 4] {
    let pts: [[f32; 3]; 4] = match face {
        Direction::Down => [[0., 0., 1.], [0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
        Direction::Up => [[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]],
        Direction::North => [[1., 1., 0.], [1., 0., 0.], [0., 0., 0.], [0., 1., 0.]],
        Direction::South => [[0., 1., 1.], [0., 0., 1.], [1., 0., 1.], [1., 1., 1.]],
        Direction::West => [[0., 1., 0.], [0., 0., 0.], [0., 0., 1.], [0., 1., 1.]],
        Direction::East => [[1., 1., 1.], [1., 0., 1.], [1., 0., 0.], [1., 1., 0.]],
    };
    pts.map(Vec3::from)
}

/// Lights the face starting at corner `start`, optionally walking the corners
/// backwards, and returns results in corner order.
fn light_face(world: &Neighborhood, mode: AoMode, face: Direction, start: usize, reversed: bool) -> Vec<(u32, u32)> {
    let corners = face_corners(face);
    let corner_at = |v: usize| if reversed { (start + 4 - v) % 4 } else { (start + v) % 4 };
    let mut quad = MutableQuad::new();
    for v in 0..4 {
        quad.set_pos_vec(v, corners[corner_at(v)]);
    }
    quad.compute_geometry();
    let mut calc = AoCalculator::new(AoOptions {
        mode,
        ..AoOptions::default()
    });
    let mut cache = LightDataCache::new();
    let mut ctx = AoContext {
        view: world,
        cache: &mut cache,
        pos: BlockPos::ORIGIN,
        state: BlockState::AIR,
    };
    calc.compute(&mut ctx, &quad, false);
    let mut by_corner = vec![(0, 0); 4];
    for v in 0..4 {
        by_corner[corner_at(v)] = (calc.ao[v].to_bits(), calc.light[v]);
    }
    by_corner
}

fn channels(lightmap: u32) -> [u32; 2] {
    [lightmap & 0xFFFF, lightmap >> 16]
}

proptest! {
    // An unlit sample never drags a channel below its dimmest lit sample
    #[test]
    fn corner_floor_keeps_lit_minimum(mut samples in prop::array::uniform4(arb_lightmap()), zero in 0usize..4) {
        samples[zero] = 0;
        let out = channels(corner_brightness(samples, [false; 4], true));
        for ch in 0..2 {
            if let Some(min) = samples.iter().map(|s| channels(*s)[ch]).filter(|c| *c != 0).min() {
                prop_assert!(out[ch] >= min, "channel {} {:x?} -> {:x?}", ch, samples, out);
            }
        }
    }

    // Emissive samples count as full bright even when they read zero
    #[test]
    fn emissive_samples_are_never_floored_away(
        samples in prop::array::uniform4(arb_lightmap()),
        emissive in any::<[bool; 4]>(),
    ) {
        let lit = emissive.iter().filter(|e| **e).count() as u32;
        let out = channels(corner_brightness(samples, emissive, true));
        for ch in out {
            prop_assert!(ch >= 240 * lit / 4);
        }
        let plain = channels(corner_brightness(samples, [false; 4], true));
        prop_assert!(out[0] >= plain[0] && out[1] >= plain[1]);
    }

    // Full unit-cube faces light each corner the same whichever vertex comes
    // first and whichever way the corners wind
    #[test]
    fn cube_face_light_ignores_starting_vertex(
        words in prop::collection::vec(arb_cell(), 125),
        face in arb_dir(),
        start in 0usize..4,
        reversed in any::<bool>(),
        mode in prop::sample::select(vec![AoMode::Emulate, AoMode::Enhanced, AoMode::Hybrid]),
    ) {
        let world = Neighborhood { words };
        let canonical = light_face(&world, mode, face, 0, false);
        prop_assert_eq!(canonical, light_face(&world, mode, face, start, reversed));
    }
}
