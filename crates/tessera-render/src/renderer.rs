//! Per-quad pipeline shared by every render context: cull, tint, shade, buffer.

use tessera_geom::{Direction, Vec3};
use tessera_light::{AoCalculator, AoContext, AoMode, BlockView, LightDataCache, word};
use tessera_material::RenderLayer;
use tessera_quad::color::{MAX_LIGHTMAP, max_brightness, multiply_color, multiply_rgb, pack_lightmap};
use tessera_quad::{GeometryFlags, MutableQuad, QuadSink, QuadView};

use crate::block_info::BlockRenderInfo;
use crate::transform::TransformStack;

/// Final destination of shaded quads.
pub trait QuadBufferer {
    /// `brightness` holds the per-vertex AO factors, or ones for flat quads.
    fn buffer_quad(&mut self, quad: &mut MutableQuad, brightness: &[f32; 4], layer: RenderLayer);
}

const FLAT: [f32; 4] = [1.0; 4];

/// Borrows a context's per-worker state for the quads of one block.
pub struct QuadRenderer<'a> {
    pub info: &'a mut BlockRenderInfo,
    pub view: &'a dyn BlockView,
    pub ao: &'a mut AoCalculator,
    pub cache: &'a mut LightDataCache,
    pub transforms: &'a mut TransformStack,
    pub bufferer: &'a mut dyn QuadBufferer,
}

impl QuadRenderer<'_> {
    pub fn is_face_culled(&mut self, face: Option<Direction>) -> bool {
        !self.info.should_draw_face(self.view, face)
    }

    /// Runs one quad through the pipeline. `is_vanilla` marks quads loaded
    /// from baked models.
    pub fn render(&mut self, quad: &mut MutableQuad, is_vanilla: bool) {
        if !self.transforms.is_empty() {
            if !self.transforms.apply(quad) {
                return;
            }
            if quad.is_geometry_invalid() {
                quad.compute_geometry();
            }
        }
        if self.is_face_culled(quad.cull_face()) {
            return;
        }

        let material = quad.material();
        let color_index = if material.disable_color_index() { -1 } else { quad.color_index() };
        let use_ao = self.info.default_ao() && !material.disable_ao();
        let emissive = material.emissive();
        let layer = self.info.effective_layer(material.blend_mode());

        self.colorize(quad, color_index);
        if use_ao {
            self.shade_smooth(quad, is_vanilla, emissive);
            let brightness = self.ao.ao;
            self.bufferer.buffer_quad(quad, &brightness, layer);
        } else {
            self.shade_flat(quad, is_vanilla, emissive);
            self.bufferer.buffer_quad(quad, &FLAT, layer);
        }
    }

    fn colorize(&self, quad: &mut MutableQuad, color_index: i32) {
        if color_index == -1 {
            return;
        }
        let tint = self.info.block_color(self.view, color_index);
        for v in 0..4 {
            quad.set_color(v, multiply_color(tint, quad.color(v)));
        }
    }

    fn shade_smooth(&mut self, quad: &mut MutableQuad, is_vanilla: bool, emissive: bool) {
        let mut ctx = AoContext {
            view: self.view,
            cache: &mut *self.cache,
            pos: self.info.pos,
            state: self.info.state,
        };
        self.ao.compute(&mut ctx, quad, is_vanilla);
        for v in 0..4 {
            quad.set_color(v, multiply_rgb(quad.color(v), self.ao.ao[v]));
            let lm = if emissive { MAX_LIGHTMAP } else { max_brightness(quad.lightmap(v), self.ao.light[v]) };
            quad.set_lightmap(v, lm);
        }
    }

    fn shade_flat(&mut self, quad: &mut MutableQuad, is_vanilla: bool, emissive: bool) {
        self.shade_diffuse(quad, is_vanilla);
        let flat = if emissive { MAX_LIGHTMAP } else { self.flat_brightness(quad) };
        for v in 0..4 {
            let lm = if emissive { flat } else { max_brightness(quad.lightmap(v), flat) };
            quad.set_lightmap(v, lm);
        }
    }

    /// Directional diffuse shading, matching what smooth lighting applies in
    /// the same mode.
    fn shade_diffuse(&self, quad: &mut MutableQuad, is_vanilla: bool) {
        let shaded = quad.has_shade();
        let interpolated = match self.ao.options().mode {
            AoMode::Enhanced => true,
            AoMode::Hybrid => !is_vanilla,
            AoMode::Vanilla | AoMode::Emulate => false,
        };

        if !interpolated {
            let shade = self.view.directional_brightness(quad.light_face(), shaded);
            scale_rgb(quad, [shade; 4]);
            return;
        }

        if quad.has_all_vertex_normals() {
            let shades = std::array::from_fn(|v| match quad.normal(v) {
                Some(n) => self.normal_shade(n, shaded),
                None => 1.0,
            });
            scale_rgb(quad, shades);
            return;
        }

        let face_shade = if quad.geometry_flags().contains(GeometryFlags::AXIS_ALIGNED) {
            self.view.directional_brightness(quad.light_face(), shaded)
        } else {
            self.normal_shade(quad.face_normal(), shaded)
        };
        if quad.has_vertex_normals() {
            let shades = std::array::from_fn(|v| match quad.normal(v) {
                Some(n) => self.normal_shade(n, shaded),
                None => face_shade,
            });
            scale_rgb(quad, shades);
        } else {
            scale_rgb(quad, [face_shade; 4]);
        }
    }

    /// Mean of the directional shades weighted by each normal component.
    fn normal_shade(&self, n: Vec3, shaded: bool) -> f32 {
        let mut sum = 0.0;
        let mut div = 0.0;
        for (c, pos, neg) in [
            (n.x, Direction::East, Direction::West),
            (n.y, Direction::Up, Direction::Down),
            (n.z, Direction::South, Direction::North),
        ] {
            if c > 0.0 {
                sum += c * self.view.directional_brightness(pos, shaded);
                div += c;
            } else if c < 0.0 {
                sum -= c * self.view.directional_brightness(neg, shaded);
                div -= c;
            }
        }
        if div == 0.0 { 1.0 } else { sum / div }
    }

    /// Light for flat quads: the cull face neighbor, else the light face
    /// neighbor for quads lying on it, else the block's own cell.
    fn flat_brightness(&mut self, quad: &MutableQuad) -> u32 {
        let pos = self.info.pos;
        if let Some(face) = quad.cull_face() {
            return self.offset_lightmap(face);
        }
        let flags = quad.geometry_flags();
        let origin = self.cache.get(self.view, pos);
        if flags.contains(GeometryFlags::LIGHT_FACE)
            || (flags.contains(GeometryFlags::AXIS_ALIGNED) && word::is_full_cube(origin))
        {
            self.offset_lightmap(quad.light_face())
        } else {
            word::emissive_lightmap(origin)
        }
    }

    /// World light of the neighbor, with the origin's emission and luminance.
    fn offset_lightmap(&mut self, face: Direction) -> u32 {
        let pos = self.info.pos;
        let origin = self.cache.get(self.view, pos);
        if word::is_emissive(origin) {
            return MAX_LIGHTMAP;
        }
        let adj = self.cache.get_offset(self.view, pos, face);
        pack_lightmap(word::block_light(adj).max(word::luminance(origin)), word::sky_light(adj))
    }
}

fn scale_rgb(quad: &mut MutableQuad, shades: [f32; 4]) {
    if shades == [1.0; 4] {
        return;
    }
    for (v, shade) in shades.into_iter().enumerate() {
        quad.set_color(v, multiply_rgb(quad.color(v), shade));
    }
}

impl QuadSink for QuadRenderer<'_> {
    fn accept(&mut self, quad: &mut MutableQuad) {
        self.render(quad, false);
    }
}
