use tessera_geom::{Direction, Vec3};
use tessera_material::RenderMaterial;

use crate::encoding::{self, *};
use crate::geometry::GeometryFlags;
use crate::mutable::MutableQuad;
use crate::normal;

/// Read access to one encoded quad.
///
/// Implementors expose exactly [`TOTAL_STRIDE`] words; every getter is
/// derived from them. Geometry-derived header fields are only meaningful
/// after the geometry has been computed.
pub trait QuadView {
    fn words(&self) -> &[u32];

    fn nominal_face(&self) -> Option<Direction>;

    #[inline]
    fn header(&self) -> u32 {
        self.words()[HEADER_BITS]
    }

    #[inline]
    fn x(&self, vertex: usize) -> f32 {
        f32::from_bits(self.words()[vertex_index(vertex, VERTEX_X)])
    }

    #[inline]
    fn y(&self, vertex: usize) -> f32 {
        f32::from_bits(self.words()[vertex_index(vertex, VERTEX_Y)])
    }

    #[inline]
    fn z(&self, vertex: usize) -> f32 {
        f32::from_bits(self.words()[vertex_index(vertex, VERTEX_Z)])
    }

    #[inline]
    fn pos(&self, vertex: usize) -> Vec3 {
        Vec3::new(self.x(vertex), self.y(vertex), self.z(vertex))
    }

    fn positions(&self) -> [Vec3; 4] {
        [self.pos(0), self.pos(1), self.pos(2), self.pos(3)]
    }

    #[inline]
    fn color(&self, vertex: usize) -> u32 {
        self.words()[vertex_index(vertex, VERTEX_COLOR)]
    }

    #[inline]
    fn u(&self, vertex: usize) -> f32 {
        f32::from_bits(self.words()[vertex_index(vertex, VERTEX_U)])
    }

    #[inline]
    fn v(&self, vertex: usize) -> f32 {
        f32::from_bits(self.words()[vertex_index(vertex, VERTEX_V)])
    }

    #[inline]
    fn lightmap(&self, vertex: usize) -> u32 {
        self.words()[vertex_index(vertex, VERTEX_LIGHTMAP)]
    }

    #[inline]
    fn normal_flags(&self) -> u32 {
        encoding::normal_flags(self.header())
    }

    #[inline]
    fn has_normal(&self, vertex: usize) -> bool {
        self.normal_flags() & (1 << vertex) != 0
    }

    #[inline]
    fn has_vertex_normals(&self) -> bool {
        self.normal_flags() != 0
    }

    #[inline]
    fn has_all_vertex_normals(&self) -> bool {
        self.normal_flags() == 0b1111
    }

    #[inline]
    fn packed_normal(&self, vertex: usize) -> u32 {
        self.words()[vertex_index(vertex, VERTEX_NORMAL)]
    }

    /// Explicit vertex normal, if one was written.
    fn normal(&self, vertex: usize) -> Option<Vec3> {
        self.has_normal(vertex)
            .then(|| normal::unpack_normal(self.packed_normal(vertex)))
    }

    fn face_normal(&self) -> Vec3 {
        normal::compute_face_normal(&self.positions())
    }

    #[inline]
    fn cull_face(&self) -> Option<Direction> {
        encoding::cull_face(self.header())
    }

    #[inline]
    fn light_face(&self) -> Direction {
        encoding::light_face(self.header())
    }

    #[inline]
    fn geometry_flags(&self) -> GeometryFlags {
        encoding::geometry_flags(self.header())
    }

    #[inline]
    fn material(&self) -> &'static RenderMaterial {
        encoding::material(self.header())
    }

    /// True unless the material disables diffuse shading.
    #[inline]
    fn has_shade(&self) -> bool {
        !self.material().disable_diffuse()
    }

    #[inline]
    fn color_index(&self) -> i32 {
        self.words()[HEADER_COLOR_INDEX] as i32
    }

    #[inline]
    fn tag(&self) -> u32 {
        self.words()[HEADER_TAG]
    }

    /// Duplicates this quad, including computed geometry, into `target`.
    fn copy_to(&self, target: &mut MutableQuad) {
        target.copy_from_view(self);
    }

    /// Writes the 32 vertex words in the baked-quad layout.
    fn to_vanilla(&self, out: &mut [u32]) {
        out[..QUAD_STRIDE].copy_from_slice(&self.words()[HEADER_STRIDE..TOTAL_STRIDE]);
    }
}

/// Zero-copy read view over one quad inside a word buffer.
#[derive(Clone, Copy)]
pub struct EncodedQuad<'a> {
    data: &'a [u32],
}

impl<'a> EncodedQuad<'a> {
    /// # Panics
    /// If `words` is shorter than `offset + TOTAL_STRIDE`.
    pub fn new(words: &'a [u32], offset: usize) -> Self {
        Self {
            data: &words[offset..offset + TOTAL_STRIDE],
        }
    }
}

impl QuadView for EncodedQuad<'_> {
    #[inline]
    fn words(&self) -> &[u32] {
        self.data
    }

    /// Stored quads carry no separate nominal face; the light face stands in.
    fn nominal_face(&self) -> Option<Direction> {
        Some(self.light_face())
    }
}
