//! Neighbor layout, inset depth and bilinear corner weights for each face.

use tessera_geom::{Direction, Vec3};

use Direction::*;

/// Sampling layout for one light face.
///
/// Corner `c0` lies between `neighbors[0]` and `neighbors[2]`, `c1` between
/// 0 and 3, `c2` between 1 and 2, `c3` between 1 and 3.
pub struct AoFace {
    pub neighbors: [Direction; 4],
    depth: fn(Vec3) -> f32,
    weights: fn(Vec3) -> [f32; 4],
}

static FACES: [AoFace; 6] = [
    AoFace {
        neighbors: [West, East, North, South],
        depth: depth_down,
        weights: weights_down,
    },
    AoFace {
        neighbors: [East, West, North, South],
        depth: depth_up,
        weights: weights_up,
    },
    AoFace {
        neighbors: [Up, Down, East, West],
        depth: depth_north,
        weights: weights_north,
    },
    AoFace {
        neighbors: [West, East, Down, Up],
        depth: depth_south,
        weights: weights_south,
    },
    AoFace {
        neighbors: [Up, Down, North, South],
        depth: depth_west,
        weights: weights_west,
    },
    AoFace {
        neighbors: [Down, Up, North, South],
        depth: depth_east,
        weights: weights_east,
    },
];

impl AoFace {
    #[inline]
    pub fn get(face: Direction) -> &'static AoFace {
        &FACES[face.index()]
    }

    /// Distance of `p` inward from the face's boundary plane, in `0..=1`.
    #[inline]
    pub fn depth(&self, p: Vec3) -> f32 {
        (self.depth)(clamp_unit(p))
    }

    /// Bilinear weights of the four face corners at `p`; they sum to one.
    #[inline]
    pub fn weights(&self, p: Vec3) -> [f32; 4] {
        (self.weights)(clamp_unit(p))
    }

    /// Corner nearest to `p`. Used for full-face quads whose vertices sit
    /// exactly on the corners, so the lookup follows position, not winding.
    pub fn corner_of(&self, p: Vec3) -> usize {
        let w = self.weights(p);
        let mut best = 0;
        for (i, wi) in w.iter().enumerate().skip(1) {
            if *wi > w[best] {
                best = i;
            }
        }
        best
    }
}

fn clamp_unit(p: Vec3) -> Vec3 {
    Vec3::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0), p.z.clamp(0.0, 1.0))
}

fn depth_down(p: Vec3) -> f32 {
    p.y
}

fn depth_up(p: Vec3) -> f32 {
    1.0 - p.y
}

fn depth_north(p: Vec3) -> f32 {
    p.z
}

fn depth_south(p: Vec3) -> f32 {
    1.0 - p.z
}

fn depth_west(p: Vec3) -> f32 {
    p.x
}

fn depth_east(p: Vec3) -> f32 {
    1.0 - p.x
}

fn weights_down(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.x, p.z);
    [(1.0 - u) * v, (1.0 - u) * (1.0 - v), u * (1.0 - v), u * v]
}

fn weights_up(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.x, p.z);
    [u * v, u * (1.0 - v), (1.0 - u) * (1.0 - v), (1.0 - u) * v]
}

fn weights_north(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.y, p.x);
    [u * (1.0 - v), u * v, (1.0 - u) * v, (1.0 - u) * (1.0 - v)]
}

fn weights_south(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.y, p.x);
    [u * (1.0 - v), (1.0 - u) * (1.0 - v), (1.0 - u) * v, u * v]
}

fn weights_west(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.y, p.z);
    [u * v, u * (1.0 - v), (1.0 - u) * (1.0 - v), (1.0 - u) * v]
}

fn weights_east(p: Vec3) -> [f32; 4] {
    let (u, v) = (p.y, p.z);
    [(1.0 - u) * v, (1.0 - u) * (1.0 - v), u * (1.0 - v), u * v]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_inside_the_cell() {
        for face in Direction::ALL {
            let f = AoFace::get(face);
            for p in [Vec3::new(0.25, 0.5, 0.75), Vec3::new(0.0, 1.0, 0.3), Vec3::new(2.0, -1.0, 0.5)] {
                let sum: f32 = f.weights(p).iter().sum();
                assert!((sum - 1.0).abs() < 1e-6, "{face:?} {p:?}");
            }
        }
    }

    #[test]
    fn depth_is_zero_on_the_boundary_plane() {
        for face in Direction::ALL {
            let n = face.normal();
            let on_plane = Vec3::new(0.5, 0.5, 0.5) + n * 0.5;
            assert!(AoFace::get(face).depth(on_plane).abs() < 1e-6);
            let opposite = Vec3::new(0.5, 0.5, 0.5) - n * 0.5;
            assert!((AoFace::get(face).depth(opposite) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn neighbors_lie_in_the_face_plane() {
        for face in Direction::ALL {
            for n in AoFace::get(face).neighbors {
                assert_ne!(n.axis(), face.axis());
            }
        }
    }
}
