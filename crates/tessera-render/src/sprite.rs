use tessera_quad::{MutableQuad, QuadView, Sprite};

/// Resolves which atlas sprite a UV coordinate falls in.
pub trait SpriteFinder: Send + Sync {
    fn find(&self, u: f32, v: f32) -> Option<Sprite>;

    /// Looks up the sprite at the quad's UV centroid.
    fn find_quad(&self, quad: &MutableQuad) -> Option<Sprite> {
        let (mut u, mut v) = (0.0, 0.0);
        for i in 0..4 {
            u += quad.u(i);
            v += quad.v(i);
        }
        self.find(u * 0.25, v * 0.25)
    }
}

/// Flat list of atlas rectangles.
#[derive(Clone, Debug, Default)]
pub struct SpriteAtlas {
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    pub fn from_sprites(sprites: Vec<Sprite>) -> Self {
        Self { sprites }
    }

    /// Uniform `cols` x `rows` atlas; sprite ids run row by row from zero.
    pub fn grid(cols: u32, rows: u32) -> Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        let (w, h) = (1.0 / cols as f32, 1.0 / rows as f32);
        let mut sprites = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let (u, v) = (col as f32 * w, row as f32 * h);
                sprites.push(Sprite::new(row * cols + col, u, v, u + w, v + h));
            }
        }
        Self { sprites }
    }

    pub fn get(&self, id: u32) -> Option<Sprite> {
        self.sprites.iter().find(|s| s.id == id).copied()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteFinder for SpriteAtlas {
    fn find(&self, u: f32, v: f32) -> Option<Sprite> {
        self.sprites.iter().find(|s| s.contains(u, v)).copied()
    }
}
