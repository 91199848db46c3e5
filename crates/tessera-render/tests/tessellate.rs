use std::sync::Arc;

use hashbrown::HashMap;
use tessera_geom::{BlockPos, Direction, Vec3};
use tessera_light::{BlockState, BlockView, CellLight, LightDataSource, word};
use tessera_material::{MaterialFinder, RenderLayer};
use tessera_quad::color::{MAX_LIGHTMAP, pack_lightmap};
use tessera_quad::{BakedQuad, MutableQuad};
use tessera_render::chunk::UNASSIGNED;
use tessera_render::{
    BakedModel, BlockModel, ChunkBuildBuffers, ModelError, ModelOutput, RendererConfig, SpriteAtlas,
    TerrainRenderContext, TessellateError,
};

const STONE: BlockState = BlockState::new(1, 0);

struct World {
    cells: HashMap<BlockPos, u32>,
}

impl World {
    /// Open sky with a single solid block at the origin.
    fn new() -> Self {
        let mut cells = HashMap::new();
        cells.insert(BlockPos::ORIGIN, CellLight::solid(0.2).pack());
        Self { cells }
    }

    fn solid(mut self, x: i32, y: i32, z: i32) -> Self {
        self.cells.insert(BlockPos::new(x, y, z), CellLight::solid(0.2).pack());
        self
    }
}

impl LightDataSource for World {
    fn light_word(&self, pos: BlockPos) -> u32 {
        self.cells
            .get(&pos)
            .copied()
            .unwrap_or_else(|| CellLight::air(0, 15).pack())
    }
}

impl BlockView for World {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        if self.cells.contains_key(&pos) { STONE } else { BlockState::AIR }
    }

    fn directional_brightness(&self, face: Direction, shaded: bool) -> f32 {
        if !shaded {
            return 1.0;
        }
        match face {
            Direction::Down => 0.5,
            Direction::Up => 1.0,
            Direction::North | Direction::South => 0.8,
            Direction::West | Direction::East => 0.6,
        }
    }

    fn block_color(&self, _state: BlockState, _pos: BlockPos, _color_index: i32) -> u32 {
        0x0080_FF40
    }

    fn should_draw_side(&self, _state: BlockState, pos: BlockPos, face: Direction) -> bool {
        !word::is_full_opaque(self.light_word(pos.offset(face)))
    }

    fn render_layer(&self, _state: BlockState) -> RenderLayer {
        RenderLayer::Solid
    }
}

fn face_corners(face: Direction) -> [[f32; 3]; 4] {
    match face {
        Direction::Down => [[0., 0., 1.], [0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
        Direction::Up => [[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]],
        Direction::North => [[1., 1., 0.], [1., 0., 0.], [0., 0., 0.], [0., 1., 0.]],
        Direction::South => [[0., 1., 1.], [0., 0., 1.], [1., 0., 1.], [1., 1., 1.]],
        Direction::West => [[0., 1., 0.], [0., 0., 0.], [0., 0., 1.], [0., 1., 1.]],
        Direction::East => [[1., 1., 1.], [1., 0., 1.], [1., 0., 0.], [1., 1., 0.]],
    }
}

fn cube() -> BakedModel {
    let mut model = BakedModel::new(true);
    for face in Direction::ALL {
        let mut q = MutableQuad::new();
        for (v, p) in face_corners(face).into_iter().enumerate() {
            q.set_pos_vec(v, Vec3::from(p)).set_color(v, u32::MAX).set_uv(v, 0.5, 0.5);
        }
        model.push(Some(face), BakedQuad::from_view(&q, face, -1, None, true));
    }
    model
}

/// Emits a single quad from a closure-built mesh editor.
struct Emit<F: Fn(&mut MutableQuad)>(F);

impl<F: Fn(&mut MutableQuad)> BlockModel for Emit<F> {
    fn emit_block_quads(
        &self,
        _view: &dyn BlockView,
        _state: BlockState,
        _pos: BlockPos,
        out: &mut ModelOutput<'_>,
    ) -> Result<(), ModelError> {
        let mut em = out.emitter();
        (self.0)(&mut *em);
        em.emit();
        Ok(())
    }
}

fn top_face(q: &mut MutableQuad) {
    for (v, p) in face_corners(Direction::Up).into_iter().enumerate() {
        q.set_pos_vec(v, Vec3::from(p)).set_color(v, u32::MAX);
    }
    q.set_cull_face(Some(Direction::Up));
}

fn context(config: RendererConfig) -> TerrainRenderContext {
    TerrainRenderContext::new(&config, Arc::new(SpriteAtlas::grid(1, 1)))
}

fn build(ctx: &mut TerrainRenderContext, world: &World, model: &dyn BlockModel) -> (bool, ChunkBuildBuffers) {
    let mut session = ctx.prepare(world, BlockPos::ORIGIN);
    let drew = session
        .tessellate_block(STONE, BlockPos::ORIGIN, model, Vec3::ZERO)
        .unwrap();
    (drew, session.finish())
}

fn red(abgr: u32) -> u32 {
    abgr & 0xFF
}

#[test]
fn flat_face_without_ao_takes_the_neighbor_light() {
    let model = Emit(|q: &mut MutableQuad| {
        top_face(q);
        q.set_material(MaterialFinder::new().disable_ao(true).find());
    });
    let (drew, out) = build(&mut context(RendererConfig::default()), &World::new(), &model);
    assert!(drew);
    let solid = out.get(RenderLayer::Solid);
    assert_eq!(solid.quad_count(), 1);
    for v in &solid.vertices {
        assert_eq!(v.light, pack_lightmap(0, 15));
        assert_eq!(v.color, 0xFFFF_FFFF);
    }
    assert_eq!(solid.indices[Direction::Up.index()].len(), 6);
}

#[test]
fn emissive_quads_are_full_bright_but_still_occluded() {
    let world = World::new().solid(1, 1, 0);
    let model = Emit(|q: &mut MutableQuad| {
        top_face(q);
        q.set_material(MaterialFinder::new().emissive(true).find());
    });
    let (_, out) = build(&mut context(RendererConfig::default()), &world, &model);
    let vertices = &out.get(RenderLayer::Solid).vertices;
    assert_eq!(vertices.len(), 4);
    assert!(vertices.iter().all(|v| v.light == MAX_LIGHTMAP));
    assert!(vertices.iter().any(|v| red(v.color) < 0xFF));
    assert!(vertices.iter().any(|v| red(v.color) == 0xFF));
}

#[test]
fn diagonal_quads_blend_two_face_shades() {
    let model = Emit(|q: &mut MutableQuad| {
        let pts = [[0.5, 1., 1.], [1., 0.5, 1.], [1., 0.5, 0.], [0.5, 1., 0.]];
        for (v, p) in pts.into_iter().enumerate() {
            q.set_pos_vec(v, Vec3::from(p)).set_color(v, u32::MAX);
        }
    });
    let config = RendererConfig {
        ambient_occlusion: false,
        ..RendererConfig::default()
    };
    let (_, out) = build(&mut context(config), &World::new(), &model);
    let vertices = &out.get(RenderLayer::Solid).vertices;
    // half East (0.6), half Up (1.0)
    for v in vertices {
        assert!((203..=204).contains(&red(v.color)), "{:#x}", v.color);
    }
    assert_eq!(out.get(RenderLayer::Solid).indices[UNASSIGNED].len(), 6);
}

#[test]
fn baked_cubes_skip_hidden_faces() {
    let model = cube();
    let mut ctx = context(RendererConfig::default());

    let (drew, out) = build(&mut ctx, &World::new().solid(0, -1, 0), &model);
    assert!(drew);
    let solid = out.get(RenderLayer::Solid);
    assert_eq!(solid.quad_count(), 5);
    assert!(solid.indices[Direction::Down.index()].is_empty());
    assert_eq!(solid.sprites().collect::<Vec<_>>(), vec![0]);

    let mut buried = World::new();
    for face in Direction::ALL {
        let (dx, dy, dz) = face.offset();
        buried = buried.solid(dx, dy, dz);
    }
    let (drew, out) = build(&mut ctx, &buried, &model);
    assert!(!drew);
    assert_eq!(out.quad_count(), 0);
}

#[test]
fn tinted_baked_quads_use_the_block_color() {
    let mut model = cube();
    for quads in &mut model.culled {
        for q in quads {
            q.color_index = 0;
        }
    }
    let config = RendererConfig {
        ambient_occlusion: false,
        ..RendererConfig::default()
    };
    let (_, out) = build(&mut context(config), &World::new(), &model);
    let solid = out.get(RenderLayer::Solid);
    let up = solid.indices[Direction::Up.index()][0] as usize;
    // ARGB 0xFF80FF40 swapped to ABGR
    assert_eq!(solid.vertices[up].color, 0xFF40_FF80);
}

#[test]
fn model_errors_name_the_block_and_leave_the_context_usable() {
    struct Broken;

    impl BlockModel for Broken {
        fn emit_block_quads(
            &self,
            _view: &dyn BlockView,
            _state: BlockState,
            _pos: BlockPos,
            _out: &mut ModelOutput<'_>,
        ) -> Result<(), ModelError> {
            Err("bad model".into())
        }
    }

    let world = World::new();
    let mut ctx = context(RendererConfig::default());
    {
        let mut session = ctx.prepare(&world, BlockPos::ORIGIN);
        let pos = BlockPos::new(2, 3, 4);
        let err = session.tessellate_block(STONE, pos, &Broken, Vec3::ZERO).unwrap_err();
        match &err {
            TessellateError::Block { pos: at, state, .. } => {
                assert_eq!(*at, pos);
                assert_eq!(*state, STONE);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("(2, 3, 4)"));
    }
    let (drew, _) = build(&mut ctx, &world, &cube());
    assert!(drew);
}

#[test]
fn transforms_can_drop_quads() {
    let mut ctx = context(RendererConfig::default());
    ctx.push_transform(Box::new(|q: &mut MutableQuad| {
        tessera_quad::QuadView::cull_face(q) != Some(Direction::Up)
    }));
    let (_, out) = build(&mut ctx, &World::new(), &cube());
    assert_eq!(out.quad_count(), 5);
    assert!(out.get(RenderLayer::Solid).indices[Direction::Up.index()].is_empty());

    ctx.pop_transform();
    let (_, out) = build(&mut ctx, &World::new(), &cube());
    assert_eq!(out.quad_count(), 6);
}
