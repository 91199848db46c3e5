use std::sync::Arc;

use tessera_geom::{BlockPos, Direction, Vec3};
use tessera_light::{BlockState, BlockView, CellLight, LightDataSource, word};
use tessera_material::RenderLayer;
use tessera_quad::{BakedQuad, MutableQuad};
use tessera_render::{BakedModel, BlockModel, ModelError, ModelOutput, RendererConfig, SpriteAtlas};
use tessera_runtime::{ModelTable, SECTION_SIZE, SectionBuilder, SectionJob};

const STONE: BlockState = BlockState::new(1, 0);
const BROKEN: BlockState = BlockState::new(2, 0);

/// Solid ground below y = 4, with one broken block in section (1, 0, 0).
struct Ground;

impl LightDataSource for Ground {
    fn light_word(&self, pos: BlockPos) -> u32 {
        if pos.y < 4 { CellLight::solid(0.2).pack() } else { CellLight::air(0, 15).pack() }
    }
}

impl BlockView for Ground {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        if pos == BlockPos::new(20, 3, 5) {
            BROKEN
        } else if pos.y < 4 {
            STONE
        } else {
            BlockState::AIR
        }
    }

    fn directional_brightness(&self, _face: Direction, _shaded: bool) -> f32 {
        1.0
    }

    fn block_color(&self, _state: BlockState, _pos: BlockPos, _color_index: i32) -> u32 {
        u32::MAX
    }

    fn should_draw_side(&self, _state: BlockState, pos: BlockPos, face: Direction) -> bool {
        !word::is_full_opaque(self.light_word(pos.offset(face)))
    }

    fn render_layer(&self, _state: BlockState) -> RenderLayer {
        RenderLayer::Solid
    }
}

struct Broken;

impl BlockModel for Broken {
    fn emit_block_quads(
        &self,
        _view: &dyn BlockView,
        _state: BlockState,
        _pos: BlockPos,
        _out: &mut ModelOutput<'_>,
    ) -> Result<(), ModelError> {
        Err("unbaked model".into())
    }
}

fn cube() -> BakedModel {
    let corners: [[[f32; 3]; 4]; 6] = [
        [[0., 0., 1.], [0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
        [[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]],
        [[1., 1., 0.], [1., 0., 0.], [0., 0., 0.], [0., 1., 0.]],
        [[0., 1., 1.], [0., 0., 1.], [1., 0., 1.], [1., 1., 1.]],
        [[0., 1., 0.], [0., 0., 0.], [0., 0., 1.], [0., 1., 1.]],
        [[1., 1., 1.], [1., 0., 1.], [1., 0., 0.], [1., 1., 0.]],
    ];
    let mut model = BakedModel::new(true);
    for face in Direction::ALL {
        let mut q = MutableQuad::new();
        for (v, p) in corners[face.index()].into_iter().enumerate() {
            q.set_pos_vec(v, Vec3::from(p)).set_color(v, u32::MAX).set_uv(v, 0.5, 0.5);
        }
        model.push(Some(face), BakedQuad::from_view(&q, face, -1, None, true));
    }
    model
}

fn builder(threads: usize) -> SectionBuilder {
    let mut models = ModelTable::new();
    models.insert(STONE.id, Box::new(cube()));
    models.insert(BROKEN.id, Box::new(Broken));
    SectionBuilder::new(
        threads,
        RendererConfig::default(),
        Arc::new(SpriteAtlas::grid(1, 1)),
        Arc::new(models),
    )
    .unwrap()
}

#[test]
fn ground_sections_only_show_their_top_faces() {
    let builder = builder(2);
    let jobs = [SectionJob::at_section(0, 0, 0), SectionJob::at_section(0, 1, 0)];
    let out = builder.build_sections(&Ground, &jobs);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].origin, BlockPos::ORIGIN);
    assert_eq!(out[1].origin, BlockPos::new(0, SECTION_SIZE, 0));

    let ground = out[0].buffers.as_ref().unwrap();
    assert_eq!(out[0].blocks, 16 * 16 * 4);
    let solid = ground.get(RenderLayer::Solid);
    assert_eq!(solid.quad_count(), 16 * 16);
    assert_eq!(solid.indices[Direction::Up.index()].len(), 16 * 16 * 6);
    // vertices are section-relative
    assert!(solid.vertices.iter().all(|v| v.position[1] == 4.0));

    let sky = out[1].buffers.as_ref().unwrap();
    assert_eq!(out[1].blocks, 0);
    assert_eq!(sky.quad_count(), 0);
}

#[test]
fn a_broken_model_fails_only_its_section() {
    let builder = builder(2);
    let jobs: Vec<_> = (0..4).map(|sx| SectionJob::at_section(sx, 0, 0)).collect();
    let out = builder.build_sections(&Ground, &jobs);
    for (i, section) in out.iter().enumerate() {
        assert_eq!(section.buffers.is_err(), i == 1, "section {i}");
    }
    let err = out[1].buffers.as_ref().err().unwrap();
    assert!(err.to_string().contains("(20, 3, 5)"));

    // every context came back and stays usable
    assert!(builder.contexts().allocated() <= builder.contexts().max_contexts());
    let again = builder.build_sections(&Ground, &jobs[..1]);
    assert!(again[0].buffers.is_ok());
}

#[test]
fn repeated_builds_reuse_contexts() {
    let builder = builder(1);
    let jobs: Vec<_> = (0..6).map(|sz| SectionJob::at_section(0, 0, sz)).collect();
    builder.build_sections(&Ground, &jobs);
    builder.build_sections(&Ground, &jobs);
    assert_eq!(builder.threads(), 1);
    assert_eq!(builder.contexts().allocated(), 1);
}
