use tessera_geom::{Direction, Vec3};
use tessera_material::RenderMaterial;

use crate::baked::BakedQuad;
use crate::encoding::{self, *};
use crate::geometry::{self, GeometryFlags};
use crate::normal;
use crate::sprite::{BakeFlags, Sprite, bake_uvs};
use crate::view::QuadView;

/// Editable quad with lazily computed geometry.
///
/// Owns its words, so copying the struct duplicates the quad. The cached
/// sprite is a lookup shortcut and is dropped on every UV write.
#[derive(Clone, Debug)]
pub struct MutableQuad {
    data: [u32; TOTAL_STRIDE],
    geometry_invalid: bool,
    normal_invalid: bool,
    face_normal: Vec3,
    nominal_face: Option<Direction>,
    default_material: &'static RenderMaterial,
    cached_sprite: Option<Sprite>,
}

impl Default for MutableQuad {
    fn default() -> Self {
        Self::new()
    }
}

impl MutableQuad {
    pub fn new() -> Self {
        Self::with_default_material(RenderMaterial::standard())
    }

    /// Editor whose `clear` resets to `material` instead of the standard one.
    pub fn with_default_material(material: &'static RenderMaterial) -> Self {
        let mut quad = Self {
            data: [0; TOTAL_STRIDE],
            geometry_invalid: true,
            normal_invalid: true,
            face_normal: Vec3::UP,
            nominal_face: None,
            default_material: material,
            cached_sprite: None,
        };
        quad.clear();
        quad
    }

    pub fn set_default_material(&mut self, material: &'static RenderMaterial) {
        self.default_material = material;
    }

    /// Resets every field to defaults: no cull face, color index -1, tag 0,
    /// default material, zeroed vertices, geometry invalid.
    pub fn clear(&mut self) {
        self.data = [0; TOTAL_STRIDE];
        self.data[HEADER_BITS] = encoding::with_cull_face(0, None);
        self.data[HEADER_BITS] = encoding::with_material(self.data[HEADER_BITS], self.default_material);
        self.data[HEADER_COLOR_INDEX] = -1i32 as u32;
        self.invalidate_geometry();
        self.nominal_face = None;
        self.cached_sprite = None;
    }

    /// Loads an encoded quad whose header geometry was computed before it was
    /// stored. Only the nominal face is derived here; the face normal stays lazy.
    pub fn load_from(&mut self, words: &[u32], offset: usize) {
        self.data.copy_from_slice(&words[offset..offset + TOTAL_STRIDE]);
        self.geometry_invalid = false;
        self.normal_invalid = true;
        self.nominal_face = Some(encoding::light_face(self.data[HEADER_BITS]));
        self.cached_sprite = None;
    }

    #[inline]
    fn invalidate_geometry(&mut self) {
        self.geometry_invalid = true;
        self.normal_invalid = true;
    }

    pub(crate) fn copy_from_view<Q: QuadView + ?Sized>(&mut self, quad: &Q) {
        self.data.copy_from_slice(&quad.words()[..TOTAL_STRIDE]);
        self.nominal_face = quad.nominal_face();
        self.invalidate_geometry();
        self.cached_sprite = None;
        self.compute_geometry();
    }

    #[inline]
    pub fn words_mut(&mut self) -> &mut [u32; TOTAL_STRIDE] {
        self.invalidate_geometry();
        self.cached_sprite = None;
        &mut self.data
    }

    #[inline]
    pub fn is_geometry_invalid(&self) -> bool {
        self.geometry_invalid
    }

    /// Recomputes face normal, light face and shape flags if positions changed.
    pub fn compute_geometry(&mut self) {
        if !self.geometry_invalid {
            return;
        }
        self.geometry_invalid = false;
        self.normal_invalid = false;
        let positions = self.positions();
        self.face_normal = normal::compute_face_normal(&positions);
        let light_face = geometry::resolve_light_face(&positions, normal::light_face(self.face_normal));
        let flags = geometry::compute_shape_flags(&positions, light_face);
        let header = encoding::with_light_face(self.data[HEADER_BITS], light_face);
        self.data[HEADER_BITS] = encoding::with_geometry_flags(header, flags);
    }

    #[inline]
    fn set_header(&mut self, header: u32) {
        self.data[HEADER_BITS] = header;
    }

    pub fn set_pos(&mut self, vertex: usize, x: f32, y: f32, z: f32) -> &mut Self {
        let i = vertex_index(vertex, VERTEX_X);
        self.data[i] = x.to_bits();
        self.data[i + 1] = y.to_bits();
        self.data[i + 2] = z.to_bits();
        self.invalidate_geometry();
        self
    }

    #[inline]
    pub fn set_pos_vec(&mut self, vertex: usize, p: Vec3) -> &mut Self {
        self.set_pos(vertex, p.x, p.y, p.z)
    }

    pub fn set_color(&mut self, vertex: usize, argb: u32) -> &mut Self {
        self.data[vertex_index(vertex, VERTEX_COLOR)] = argb;
        self
    }

    /// Same color on all four vertices.
    pub fn set_color_all(&mut self, argb: u32) -> &mut Self {
        for v in 0..4 {
            self.set_color(v, argb);
        }
        self
    }

    pub fn set_uv(&mut self, vertex: usize, u: f32, v: f32) -> &mut Self {
        let i = vertex_index(vertex, VERTEX_U);
        self.data[i] = u.to_bits();
        self.data[i + 1] = v.to_bits();
        self.cached_sprite = None;
        self
    }

    pub fn set_lightmap(&mut self, vertex: usize, lightmap: u32) -> &mut Self {
        self.data[vertex_index(vertex, VERTEX_LIGHTMAP)] = lightmap;
        self
    }

    pub fn set_normal(&mut self, vertex: usize, x: f32, y: f32, z: f32) -> &mut Self {
        let flags = encoding::normal_flags(self.data[HEADER_BITS]) | (1 << vertex);
        self.set_header(encoding::with_normal_flags(self.data[HEADER_BITS], flags));
        self.data[vertex_index(vertex, VERTEX_NORMAL)] = normal::pack_normal(x, y, z, 0.0);
        self.invalidate_geometry();
        self
    }

    #[inline]
    pub fn set_normal_vec(&mut self, vertex: usize, n: Vec3) -> &mut Self {
        self.set_normal(vertex, n.x, n.y, n.z)
    }

    /// Sets the cull face; the nominal face follows it.
    pub fn set_cull_face(&mut self, face: Option<Direction>) -> &mut Self {
        self.set_header(encoding::with_cull_face(self.data[HEADER_BITS], face));
        self.nominal_face = face;
        self
    }

    pub fn set_nominal_face(&mut self, face: Option<Direction>) -> &mut Self {
        self.nominal_face = face;
        self
    }

    pub fn set_material(&mut self, material: &'static RenderMaterial) -> &mut Self {
        self.set_header(encoding::with_material(self.data[HEADER_BITS], material));
        self
    }

    pub fn set_color_index(&mut self, index: i32) -> &mut Self {
        self.data[HEADER_COLOR_INDEX] = index as u32;
        self
    }

    pub fn set_tag(&mut self, tag: u32) -> &mut Self {
        self.data[HEADER_TAG] = tag;
        self
    }

    /// Writes the face normal into every vertex lacking an explicit normal.
    pub fn populate_missing_normals(&mut self) {
        let flags = encoding::normal_flags(self.data[HEADER_BITS]);
        if flags == 0b1111 {
            return;
        }
        let packed = normal::pack_normal_vec(self.face_normal_mut());
        for v in 0..4 {
            if flags & (1 << v) == 0 {
                self.data[vertex_index(v, VERTEX_NORMAL)] = packed;
            }
        }
        self.set_header(encoding::with_normal_flags(self.data[HEADER_BITS], 0b1111));
    }

    /// Face normal, computing and caching geometry if needed.
    pub fn face_normal_mut(&mut self) -> Vec3 {
        if self.geometry_invalid {
            self.compute_geometry();
        } else if self.normal_invalid {
            self.face_normal = normal::compute_face_normal(&self.positions());
            self.normal_invalid = false;
        }
        self.face_normal
    }

    /// Replaces the vertex words with baked-quad data.
    pub fn from_vanilla_words(&mut self, words: &[u32]) -> &mut Self {
        self.data[HEADER_STRIDE..TOTAL_STRIDE].copy_from_slice(&words[..QUAD_STRIDE]);
        self.invalidate_geometry();
        self.cached_sprite = None;
        self
    }

    /// Loads a baked quad. Unshaded quads get diffuse disabled on `material`.
    pub fn from_baked(
        &mut self,
        quad: &BakedQuad,
        material: &'static RenderMaterial,
        cull_face: Option<Direction>,
    ) -> &mut Self {
        self.data[HEADER_STRIDE..TOTAL_STRIDE].copy_from_slice(&quad.vertex_data);
        self.data[HEADER_BITS] = encoding::with_cull_face(0, cull_face);
        self.nominal_face = Some(quad.face);
        self.set_color_index(quad.color_index);
        let material = if quad.shade {
            material
        } else {
            material.with_disable_diffuse(true)
        };
        self.set_material(material);
        self.set_tag(0);
        self.invalidate_geometry();
        self.cached_sprite = quad.sprite;
        self
    }

    /// Maps the current UVs into `sprite` and remembers it.
    pub fn sprite_bake(&mut self, sprite: Sprite, flags: BakeFlags) -> &mut Self {
        let mut uvs = [(0.0, 0.0); 4];
        for (i, uv) in uvs.iter_mut().enumerate() {
            *uv = (self.u(i), self.v(i));
        }
        let positions = self.positions();
        bake_uvs(&mut uvs, &positions, self.nominal_face, &sprite, flags);
        for (i, (u, v)) in uvs.into_iter().enumerate() {
            self.set_uv(i, u, v);
        }
        self.cached_sprite = Some(sprite);
        self
    }

    #[inline]
    pub fn cached_sprite(&self) -> Option<Sprite> {
        self.cached_sprite
    }

    pub fn set_cached_sprite(&mut self, sprite: Option<Sprite>) {
        self.cached_sprite = sprite;
    }
}

impl QuadView for MutableQuad {
    #[inline]
    fn words(&self) -> &[u32] {
        &self.data
    }

    fn nominal_face(&self) -> Option<Direction> {
        self.nominal_face
    }

    fn face_normal(&self) -> Vec3 {
        if self.normal_invalid {
            normal::compute_face_normal(&self.positions())
        } else {
            self.face_normal
        }
    }

    fn light_face(&self) -> Direction {
        if self.geometry_invalid {
            normal::light_face(self.face_normal())
        } else {
            encoding::light_face(self.data[HEADER_BITS])
        }
    }

    fn geometry_flags(&self) -> GeometryFlags {
        if self.geometry_invalid {
            geometry::compute_shape_flags(&self.positions(), QuadView::light_face(self))
        } else {
            encoding::geometry_flags(self.data[HEADER_BITS])
        }
    }
}
