//! Procedural scene used by the demo binary: rolling grass hills dotted with
//! slabs, cross-shaped plants and glowing lamps.

use std::error::Error;

use hashbrown::HashMap;
use serde::Deserialize;
use tessera_geom::{BlockPos, Direction, Vec3};
use tessera_light::{BlockState, BlockView, CellLight, LightDataSource, word};
use tessera_material::{MaterialRegistry, RenderLayer, RenderMaterial};
use tessera_quad::{BakeFlags, BakedQuad, Mesh, MeshBuilder, MutableQuad, Sprite};
use tessera_render::{BakedModel, SpriteAtlas};
use tessera_runtime::{ModelTable, SECTION_SIZE};

pub const STONE: BlockState = BlockState::new(1, 0);
pub const GRASS: BlockState = BlockState::new(2, 0);
pub const SLAB: BlockState = BlockState::new(3, 0);
pub const PLANT: BlockState = BlockState::new(4, 0);
pub const LAMP: BlockState = BlockState::new(5, 0);

const GRASS_TINT: u32 = 0xFF7C_BD6B;

const MATERIALS: &str = r#"
[materials.plant]
blend = "cutout"

[materials.lamp]
emissive = true
disable_diffuse = true
"#;

/// Scene knobs, read from the `[scene]` table of the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Width of the scene in sections along x and z.
    pub sections: i32,
    pub seed: u32,
    /// Mean ground height in blocks.
    pub ground: i32,
    pub hill_height: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            sections: 4,
            seed: 7,
            ground: 12,
            hill_height: 6.0,
        }
    }
}

#[derive(Deserialize, Default)]
struct SceneFile {
    #[serde(default)]
    scene: SceneSettings,
}

impl SceneSettings {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        let file: SceneFile = toml::from_str(toml_str)?;
        Ok(file.scene)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Decoration {
    None,
    Slab,
    Plant,
    Lamp,
}

pub struct DemoWorld {
    settings: SceneSettings,
    heights: HashMap<(i32, i32), i32>,
}

impl DemoWorld {
    pub fn new(settings: SceneSettings) -> Self {
        let extent = settings.sections.max(1) * SECTION_SIZE;
        let mut heights = HashMap::with_capacity((extent * extent) as usize);
        for x in -1..=extent {
            for z in -1..=extent {
                heights.insert((x, z), Self::sample_height(&settings, x, z));
            }
        }
        Self { settings, heights }
    }

    fn sample_height(settings: &SceneSettings, x: i32, z: i32) -> i32 {
        let phase = settings.seed as f32 * 0.37;
        let (fx, fz) = (x as f32, z as f32);
        let h = (fx * 0.11 + phase).sin() * 0.6 + (fz * 0.07 - phase).cos() * 0.4 + ((fx + fz) * 0.19).sin() * 0.2;
        settings.ground + (h * settings.hill_height) as i32
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    fn height(&self, x: i32, z: i32) -> i32 {
        self.heights
            .get(&(x, z))
            .copied()
            .unwrap_or_else(|| Self::sample_height(&self.settings, x, z))
    }

    fn hash(&self, x: i32, z: i32) -> u32 {
        let mut h = (x as u32).wrapping_mul(0x9E37_79B1) ^ (z as u32).wrapping_mul(0x85EB_CA77) ^ self.settings.seed;
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^ (h >> 12)
    }

    fn decoration(&self, x: i32, z: i32) -> Decoration {
        match self.hash(x, z) % 64 {
            0 => Decoration::Lamp,
            1..=3 => Decoration::Slab,
            4..=11 => Decoration::Plant,
            _ => Decoration::None,
        }
    }

    /// Block light from the nearest lamp in the same column neighborhood.
    fn lamp_light(&self, pos: BlockPos) -> u8 {
        let mut best = 0i32;
        for dx in -3..=3 {
            for dz in -3..=3 {
                let (x, z) = (pos.x + dx, pos.z + dz);
                if self.decoration(x, z) != Decoration::Lamp {
                    continue;
                }
                let dy = pos.y - self.height(x, z);
                best = best.max(14 - dx.abs() - dz.abs() - dy.abs());
            }
        }
        best.clamp(0, 15) as u8
    }
}

impl LightDataSource for DemoWorld {
    fn light_word(&self, pos: BlockPos) -> u32 {
        let state = self.block_state(pos);
        let cell = match state {
            STONE | GRASS => CellLight::solid(0.2),
            LAMP => CellLight {
                block: 15,
                luminance: 15,
                emissive: true,
                ..CellLight::solid(1.0)
            },
            SLAB => CellLight {
                sky: 15,
                block: self.lamp_light(pos),
                ao: 0.2,
                opaque: true,
                ..CellLight::default()
            },
            _ => {
                let sky = if pos.y >= self.height(pos.x, pos.z) { 15 } else { 0 };
                CellLight::air(self.lamp_light(pos), sky)
            }
        };
        cell.pack()
    }
}

impl BlockView for DemoWorld {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        let h = self.height(pos.x, pos.z);
        if pos.y < h - 1 {
            STONE
        } else if pos.y == h - 1 {
            GRASS
        } else if pos.y == h {
            match self.decoration(pos.x, pos.z) {
                Decoration::Slab => SLAB,
                Decoration::Plant => PLANT,
                Decoration::Lamp => LAMP,
                Decoration::None => BlockState::AIR,
            }
        } else {
            BlockState::AIR
        }
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

    fn block_color(&self, state: BlockState, _pos: BlockPos, color_index: i32) -> u32 {
        if state == GRASS && color_index == 0 { GRASS_TINT } else { u32::MAX }
    }

    fn should_draw_side(&self, _state: BlockState, pos: BlockPos, face: Direction) -> bool {
        !word::is_full_opaque(self.light_word(pos.offset(face)))
    }

    fn render_layer(&self, state: BlockState) -> RenderLayer {
        if state == PLANT { RenderLayer::Cutout } else { RenderLayer::Solid }
    }
}

// --- Models ---

fn box_face(face: Direction, top: f32) -> [[f32; 3]; 4] {
    match face {
        Direction::Down => [[0., 0., 1.], [0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
        Direction::Up => [[0., top, 0.], [0., top, 1.], [1., top, 1.], [1., top, 0.]],
        Direction::North => [[1., top, 0.], [1., 0., 0.], [0., 0., 0.], [0., top, 0.]],
        Direction::South => [[0., top, 1.], [0., 0., 1.], [1., 0., 1.], [1., top, 1.]],
        Direction::West => [[0., top, 0.], [0., 0., 0.], [0., 0., 1.], [0., top, 1.]],
        Direction::East => [[1., top, 1.], [1., 0., 1.], [1., 0., 0.], [1., top, 0.]],
    }
}

fn load_face(q: &mut MutableQuad, corners: [[f32; 3]; 4], sprite: Sprite) {
    const UVS: [(f32, f32); 4] = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
    for (v, p) in corners.into_iter().enumerate() {
        q.set_pos_vec(v, Vec3::from(p))
            .set_color(v, u32::MAX)
            .set_uv(v, UVS[v].0, UVS[v].1);
    }
    q.sprite_bake(sprite, BakeFlags::NORMALIZED);
}

/// Box model `top` blocks tall; the top face is tinted when `tint_top`.
fn baked_box(top: f32, sprite: Sprite, tint_top: bool) -> BakedModel {
    let mut model = BakedModel::new(true);
    let mut q = MutableQuad::new();
    for face in Direction::ALL {
        q.clear();
        load_face(&mut q, box_face(face, top), sprite);
        let tinted = tint_top && face == Direction::Up;
        let baked = BakedQuad::from_view(&q, face, if tinted { 0 } else { -1 }, Some(sprite), true);
        let cull = (face != Direction::Up || top >= 1.0).then_some(face);
        model.push(cull, baked);
    }
    model
}

/// Two diagonal quads crossing through the cell, each drawn from both sides.
fn cross(material: &'static RenderMaterial, sprite: Sprite) -> Mesh {
    let planes: [[[f32; 3]; 4]; 2] = [
        [[0.15, 1., 0.15], [0.15, 0., 0.15], [0.85, 0., 0.85], [0.85, 1., 0.85]],
        [[0.15, 1., 0.85], [0.15, 0., 0.85], [0.85, 0., 0.15], [0.85, 1., 0.15]],
    ];
    let mut builder = MeshBuilder::new();
    {
        let mut em = builder.emitter();
        for plane in planes {
            let reversed = [plane[3], plane[2], plane[1], plane[0]];
            for corners in [plane, reversed] {
                load_face(&mut em, corners, sprite);
                em.set_material(material);
                em.emit();
            }
        }
    }
    builder.build()
}

fn lamp(material: &'static RenderMaterial, sprite: Sprite) -> Mesh {
    let mut builder = MeshBuilder::new();
    {
        let mut em = builder.emitter();
        for face in Direction::ALL {
            load_face(&mut em, box_face(face, 1.0), sprite);
            em.set_cull_face(Some(face)).set_material(material);
            em.emit();
        }
    }
    builder.build()
}

/// Models for every demo block, with sprites from `atlas`.
pub fn models(atlas: &SpriteAtlas) -> Result<ModelTable, Box<dyn Error>> {
    let materials = MaterialRegistry::from_toml_str(MATERIALS)?;
    let sprite = |id: u32| atlas.get(id).ok_or_else(|| format!("atlas has no sprite {id}"));
    let material = |key: &str| materials.get(key).ok_or_else(|| format!("no material '{key}'"));

    let mut table = ModelTable::new();
    table.insert(STONE.id, Box::new(baked_box(1.0, sprite(0)?, false)));
    table.insert(GRASS.id, Box::new(baked_box(1.0, sprite(1)?, true)));
    table.insert(SLAB.id, Box::new(baked_box(0.5, sprite(2)?, false)));
    table.insert(PLANT.id, Box::new(cross(material("plant")?, sprite(3)?)));
    table.insert(LAMP.id, Box::new(lamp(material("lamp")?, sprite(4)?)));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_stone_under_grass() {
        let world = DemoWorld::new(SceneSettings::default());
        let h = world.height(5, 9);
        assert_eq!(world.block_state(BlockPos::new(5, h - 1, 9)), GRASS);
        assert_eq!(world.block_state(BlockPos::new(5, h - 2, 9)), STONE);
        assert_eq!(world.block_state(BlockPos::new(5, h + 1, 9)), BlockState::AIR);
        let above = world.light_word(BlockPos::new(5, h + 1, 9));
        assert_eq!(word::sky_light(above), 15);
    }

    #[test]
    fn scene_table_overrides_defaults() {
        let s = SceneSettings::from_toml_str("[scene]\nsections = 2\nseed = 99").unwrap();
        assert_eq!((s.sections, s.seed, s.ground), (2, 99, 12));
        assert_eq!(SceneSettings::from_toml_str("ambient_occlusion = true").unwrap().sections, 4);
    }

    #[test]
    fn every_block_has_a_model() {
        let table = models(&SpriteAtlas::grid(4, 4)).unwrap();
        assert_eq!(table.len(), 5);
        assert!(models(&SpriteAtlas::grid(2, 2)).is_err());
    }
}
