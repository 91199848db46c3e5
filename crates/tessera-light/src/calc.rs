//! Smooth lighting for one quad at a time.
//!
//! Face samples are cached per block in 24 slots, one per
//! (direction, outer/inner, shaded/unshaded). Call [`AoCalculator::clear`]
//! when moving to the next block.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use tessera_geom::{Axis, BlockPos, Direction};
use tessera_quad::geometry::approx_eq;
use tessera_quad::{GeometryFlags, MutableQuad, QuadView};

use crate::cache::LightDataCache;
use crate::face::AoFace;
use crate::face_data::{AoFaceData, corner_brightness};
use crate::word;
use crate::world::{BlockState, BlockView};

/// Algorithm used for smooth lighting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum AoMode {
    /// Defer to the host's reference calculator.
    Vanilla,
    /// Reproduce the reference result with the face cache.
    Emulate,
    /// Emulate for quads from plain baked models, Enhanced for the rest.
    Hybrid,
    /// Interpolate by vertex position and normal.
    #[default]
    Enhanced,
}

impl AoMode {
    pub fn name(self) -> &'static str {
        match self {
            AoMode::Vanilla => "vanilla",
            AoMode::Emulate => "emulate",
            AoMode::Hybrid => "hybrid",
            AoMode::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for AoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vanilla" => Ok(AoMode::Vanilla),
            "emulate" => Ok(AoMode::Emulate),
            "hybrid" => Ok(AoMode::Hybrid),
            "enhanced" => Ok(AoMode::Enhanced),
            other => Err(format!("unknown ambient occlusion mode '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AoOptions {
    pub mode: AoMode,
    /// On-face samples whose center cell is a full opaque cube read the
    /// center light from the origin cell instead.
    pub center_origin_quirk: bool,
    /// Raise unlit corner samples to the dimmest lit one.
    pub corner_floor: bool,
}

impl Default for AoOptions {
    fn default() -> Self {
        Self {
            mode: AoMode::default(),
            center_origin_quirk: true,
            corner_floor: true,
        }
    }
}

/// World access for one block, borrowed for the duration of a compute call.
pub struct AoContext<'a> {
    pub view: &'a dyn BlockView,
    pub cache: &'a mut LightDataCache,
    pub pos: BlockPos,
    pub state: BlockState,
}

impl AoContext<'_> {
    #[inline]
    fn word(&mut self, pos: BlockPos) -> u32 {
        self.cache.get(self.view, pos)
    }
}

/// Host-provided reference calculator used by [`AoMode::Vanilla`].
pub trait ReferenceAo: Send {
    /// Writes per-vertex AO and lightmaps for `quad`.
    fn apply(
        &mut self,
        ctx: &mut AoContext<'_>,
        quad: &MutableQuad,
        ao: &mut [f32; 4],
        light: &mut [u32; 4],
    );
}

static MISSING_REFERENCE_WARNED: AtomicBool = AtomicBool::new(false);

const FACE_SLOTS: usize = 24;

pub struct AoCalculator {
    options: AoOptions,
    reference: Option<Box<dyn ReferenceAo>>,
    faces: [AoFaceData; FACE_SLOTS],
    completed: u32,
    /// Per-vertex shade from the last [`compute`](Self::compute).
    pub ao: [f32; 4],
    /// Per-vertex lightmap from the last [`compute`](Self::compute).
    pub light: [u32; 4],
}

impl fmt::Debug for AoCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AoCalculator")
            .field("options", &self.options)
            .field("has_reference", &self.reference.is_some())
            .field("completed", &format_args!("{:#x}", self.completed))
            .finish()
    }
}

impl AoCalculator {
    pub fn new(options: AoOptions) -> Self {
        Self {
            options,
            reference: None,
            faces: [AoFaceData::default(); FACE_SLOTS],
            completed: 0,
            ao: [0.0; 4],
            light: [0; 4],
        }
    }

    pub fn with_reference(options: AoOptions, reference: Box<dyn ReferenceAo>) -> Self {
        let mut calc = Self::new(options);
        calc.reference = Some(reference);
        calc
    }

    pub fn options(&self) -> AoOptions {
        self.options
    }

    /// Forgets cached face samples; call at each new block.
    pub fn clear(&mut self) {
        self.completed = 0;
    }

    /// Fills [`ao`](Self::ao) and [`light`](Self::light) for `quad`.
    ///
    /// `is_vanilla` marks quads from plain baked models, which hybrid mode
    /// lights the same way the reference does.
    pub fn compute(&mut self, ctx: &mut AoContext<'_>, quad: &MutableQuad, is_vanilla: bool) {
        match self.options.mode {
            AoMode::Vanilla => {
                if let Some(reference) = self.reference.as_mut() {
                    reference.apply(ctx, quad, &mut self.ao, &mut self.light);
                } else {
                    if !MISSING_REFERENCE_WARNED.swap(true, Ordering::Relaxed) {
                        log::warn!("no reference ambient occlusion available, emulating it instead");
                    }
                    self.calc_emulated(ctx, quad);
                }
            }
            AoMode::Emulate => self.calc_emulated(ctx, quad),
            AoMode::Hybrid if is_vanilla => self.calc_emulated(ctx, quad),
            AoMode::Hybrid | AoMode::Enhanced => self.calc_enhanced(ctx, quad),
        }
    }

    fn calc_emulated(&mut self, ctx: &mut AoContext<'_>, quad: &MutableQuad) {
        let mut flags = quad.geometry_flags();
        if !flags.contains(GeometryFlags::LIGHT_FACE)
            && flags.contains(GeometryFlags::AXIS_ALIGNED)
            && word::is_full_cube(ctx.word(ctx.pos))
        {
            flags |= GeometryFlags::LIGHT_FACE;
        }
        let on_face = flags.contains(GeometryFlags::LIGHT_FACE);
        let face = quad.light_face();
        if flags.contains(GeometryFlags::CUBIC) {
            self.full_face(ctx, quad, face, on_face);
        } else {
            let data = self.compute_face(ctx, face, on_face, quad.has_shade());
            self.apply_weighted(quad, face, &data);
        }
    }

    fn calc_enhanced(&mut self, ctx: &mut AoContext<'_>, quad: &MutableQuad) {
        let flags = quad.geometry_flags();
        let face = quad.light_face();
        let shade = quad.has_shade();
        if flags.contains(GeometryFlags::AXIS_ALIGNED | GeometryFlags::LIGHT_FACE) {
            let data = self.compute_face(ctx, face, true, shade);
            self.apply_weighted(quad, face, &data);
        } else if flags.contains(GeometryFlags::AXIS_ALIGNED) {
            let data = self.inset_face(ctx, quad, 0, face, shade);
            self.apply_weighted(quad, face, &data);
        } else {
            self.irregular_face(ctx, quad, shade);
        }
    }

    fn full_face(&mut self, ctx: &mut AoContext<'_>, quad: &MutableQuad, face: Direction, on_face: bool) {
        let data = self.compute_face(ctx, face, on_face, quad.has_shade());
        let layout = AoFace::get(face);
        for v in 0..4 {
            let corner = layout.corner_of(quad.pos(v));
            self.ao[v] = data.ao[corner];
            self.light[v] = data.light(corner);
        }
    }

    fn apply_weighted(&mut self, quad: &MutableQuad, face: Direction, data: &AoFaceData) {
        let layout = AoFace::get(face);
        for v in 0..4 {
            let w = layout.weights(quad.pos(v));
            self.ao[v] = data.weighted_ao(&w);
            self.light[v] = data.weighted_combined_light(&w);
        }
    }

    /// Outer and inner face blended by the depth of `vertex`, snapping to
    /// either one when the vertex sits on its plane.
    fn inset_face(
        &mut self,
        ctx: &mut AoContext<'_>,
        quad: &MutableQuad,
        vertex: usize,
        face: Direction,
        shade: bool,
    ) -> AoFaceData {
        let depth = AoFace::get(face).depth(quad.pos(vertex));
        if approx_eq(depth, 0.0) {
            return self.compute_face(ctx, face, true, shade);
        }
        if approx_eq(depth, 1.0) {
            return self.compute_face(ctx, face, false, shade);
        }
        let outer = self.compute_face(ctx, face, true, shade);
        let inner = self.compute_face(ctx, face, false, shade);
        AoFaceData::weighted_mean(&outer, 1.0 - depth, &inner, depth)
    }

    fn irregular_face(&mut self, ctx: &mut AoContext<'_>, quad: &MutableQuad, shade: bool) {
        let face_normal = quad.face_normal();
        for v in 0..4 {
            let normal = quad.normal(v).unwrap_or(face_normal);
            let p = quad.pos(v);
            let (mut ao, mut sky, mut block) = (0.0f32, 0.0f32, 0.0f32);
            let (mut max_ao, mut max_sky, mut max_block) = (0.0f32, 0u32, 0u32);
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                let c = normal.component(axis);
                if approx_eq(c, 0.0) {
                    continue;
                }
                let face = Direction::from_axis(axis, c > 0.0);
                let data = self.inset_face(ctx, quad, v, face, shade);
                let w = AoFace::get(face).weights(p);
                let n = c * c;
                let a = data.weighted_ao(&w);
                let s = data.weighted_sky_light(&w);
                let b = data.weighted_block_light(&w);
                ao += n * a;
                sky += n * s as f32;
                block += n * b as f32;
                max_ao = max_ao.max(a);
                max_sky = max_sky.max(s);
                max_block = max_block.max(b);
            }
            self.ao[v] = (ao + max_ao) * 0.5;
            let sky = ((sky + max_sky as f32) * 0.5) as u32 & 0xF0;
            let block = ((block + max_block as f32) * 0.5) as u32 & 0xF0;
            self.light[v] = (sky << 16) | block;
        }
    }

    fn compute_face(&mut self, ctx: &mut AoContext<'_>, face: Direction, on_face: bool, shade: bool) -> AoFaceData {
        let slot = match (shade, on_face) {
            (true, true) => face.index(),
            (true, false) => face.index() + 6,
            (false, true) => face.index() + 12,
            (false, false) => face.index() + 18,
        };
        let mask = 1u32 << slot;
        if self.completed & mask == 0 {
            self.faces[slot] = self.sample_face(ctx, face, on_face, shade);
            self.completed |= mask;
        }
        self.faces[slot]
    }

    fn sample_face(&self, ctx: &mut AoContext<'_>, face: Direction, on_face: bool, shade: bool) -> AoFaceData {
        let origin = ctx.pos;
        let light_pos = if on_face { origin.offset(face) } else { origin };
        let n = AoFace::get(face).neighbors;

        let mut side_light = [0u32; 4];
        let mut side_ao = [0f32; 4];
        let mut side_opaque = [false; 4];
        let mut side_em = [false; 4];
        for i in 0..4 {
            let w = ctx.word(light_pos.offset(n[i]));
            side_light[i] = word::lightmap(w);
            side_ao[i] = word::ao(w);
            side_opaque[i] = word::is_opaque(w);
            side_em[i] = word::is_emissive(w);
        }

        // (side, side) pairs around each corner; the first one stands in for
        // the corner when both are opaque
        const CORNERS: [(usize, usize); 4] = [(0, 2), (0, 3), (1, 2), (1, 3)];
        let mut corner_light = [0u32; 4];
        let mut corner_ao = [0f32; 4];
        let mut corner_em = [false; 4];
        for (c, (a, b)) in CORNERS.into_iter().enumerate() {
            if side_opaque[a] && side_opaque[b] {
                corner_light[c] = side_light[a];
                corner_ao[c] = side_ao[a];
                corner_em[c] = side_em[a];
            } else {
                let w = ctx.word(light_pos.offset2(n[a], n[b]));
                corner_light[c] = word::lightmap(w);
                corner_ao[c] = word::ao(w);
                corner_em[c] = word::is_emissive(w);
            }
        }

        let center = ctx.word(light_pos);
        let light_source = if on_face && self.options.center_origin_quirk && word::is_full_opaque(center) {
            ctx.word(origin)
        } else {
            center
        };
        let center_light = word::lightmap(light_source);
        let center_em = word::is_emissive(light_source);
        let center_ao = word::ao(center);

        let brightness = ctx.view.directional_brightness(face, shade);
        let floor = self.options.corner_floor;
        let [l0, l1, l2, l3] = side_light;
        let [a0, a1, a2, a3] = side_ao;
        let [e0, e1, e2, e3] = side_em;

        let mut out = AoFaceData {
            ao: [
                (a3 + a0 + corner_ao[1] + center_ao) * 0.25 * brightness,
                (a2 + a0 + corner_ao[0] + center_ao) * 0.25 * brightness,
                (a2 + a1 + corner_ao[2] + center_ao) * 0.25 * brightness,
                (a3 + a1 + corner_ao[3] + center_ao) * 0.25 * brightness,
            ],
            ..AoFaceData::default()
        };
        let corners = [
            ([l3, l0, corner_light[1], center_light], [e3, e0, corner_em[1], center_em]),
            ([l2, l0, corner_light[0], center_light], [e2, e0, corner_em[0], center_em]),
            ([l2, l1, corner_light[2], center_light], [e2, e1, corner_em[2], center_em]),
            ([l3, l1, corner_light[3], center_light], [e3, e1, corner_em[3], center_em]),
        ];
        for (i, (samples, emissive)) in corners.into_iter().enumerate() {
            out.set_light(i, corner_brightness(samples, emissive, floor));
        }
        out
    }
}
