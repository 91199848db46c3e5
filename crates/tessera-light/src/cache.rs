use hashbrown::HashMap;
use tessera_geom::{BlockPos, Direction};

use crate::world::LightDataSource;

/// Memoizes light words around the block being rendered.
///
/// Entries stay valid until [`clear`](Self::clear), which keeps the
/// allocation for the next chunk.
#[derive(Default, Debug)]
pub struct LightDataCache {
    words: HashMap<u64, u32>,
    misses: u64,
}

impl LightDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: HashMap::with_capacity(capacity),
            misses: 0,
        }
    }

    pub fn get<S: LightDataSource + ?Sized>(&mut self, source: &S, pos: BlockPos) -> u32 {
        let misses = &mut self.misses;
        *self.words.entry(pos.as_long()).or_insert_with(|| {
            *misses += 1;
            source.light_word(pos)
        })
    }

    #[inline]
    pub fn get_offset<S: LightDataSource + ?Sized>(
        &mut self,
        source: &S,
        pos: BlockPos,
        dir: Direction,
    ) -> u32 {
        self.get(source, pos.offset(dir))
    }

    #[inline]
    pub fn get_offset2<S: LightDataSource + ?Sized>(
        &mut self,
        source: &S,
        pos: BlockPos,
        a: Direction,
        b: Direction,
    ) -> u32 {
        self.get(source, pos.offset2(a, b))
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of lookups that went to the source since construction.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
