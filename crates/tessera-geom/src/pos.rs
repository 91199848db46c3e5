use crate::{Direction, Vec3};

/// Integer world position of a block cell.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dir: Direction) -> BlockPos {
        let (dx, dy, dz) = dir.offset();
        BlockPos::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn offset2(self, a: Direction, b: Direction) -> BlockPos {
        self.offset(a).offset(b)
    }

    /// Packs the position into one key: 26 bits x, 12 bits y, 26 bits z.
    #[inline]
    pub fn as_long(self) -> u64 {
        let x = (self.x as i64 as u64) & 0x3FF_FFFF;
        let y = (self.y as i64 as u64) & 0xFFF;
        let z = (self.z as i64 as u64) & 0x3FF_FFFF;
        (x << 38) | (z << 12) | y
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}
