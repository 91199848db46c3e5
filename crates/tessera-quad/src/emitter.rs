use std::ops::{Deref, DerefMut};

use crate::mutable::MutableQuad;

/// Receives finished quads from a [`QuadEmitter`].
///
/// The quad is handed over mutably so renderers can shade it in place; the
/// emitter clears it afterwards.
pub trait QuadSink {
    fn accept(&mut self, quad: &mut MutableQuad);
}

/// Writes into an editor quad and hands it to a sink on [`emit`](Self::emit).
pub struct QuadEmitter<'a> {
    quad: &'a mut MutableQuad,
    sink: &'a mut dyn QuadSink,
}

impl<'a> QuadEmitter<'a> {
    /// Binds `quad` to `sink` and resets the quad.
    pub fn new(quad: &'a mut MutableQuad, sink: &'a mut dyn QuadSink) -> Self {
        quad.clear();
        Self { quad, sink }
    }

    /// Computes geometry, passes the quad to the sink, then clears it for reuse.
    pub fn emit(&mut self) -> &mut Self {
        self.quad.compute_geometry();
        self.sink.accept(self.quad);
        self.quad.clear();
        self
    }
}

impl Deref for QuadEmitter<'_> {
    type Target = MutableQuad;

    fn deref(&self) -> &MutableQuad {
        self.quad
    }
}

impl DerefMut for QuadEmitter<'_> {
    fn deref_mut(&mut self) -> &mut MutableQuad {
        self.quad
    }
}

impl<F: FnMut(&mut MutableQuad)> QuadSink for F {
    fn accept(&mut self, quad: &mut MutableQuad) {
        self(quad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::QuadView;
    use tessera_geom::Direction;

    #[test]
    fn emit_hands_over_then_resets() {
        let mut seen = Vec::new();
        let mut sink = |q: &mut MutableQuad| seen.push((q.tag(), q.light_face(), q.is_geometry_invalid()));
        let mut quad = MutableQuad::new();
        {
            let mut em = QuadEmitter::new(&mut quad, &mut sink);
            em.set_pos(0, 0.0, 0.0, 1.0)
                .set_pos(1, 0.0, 0.0, 0.0)
                .set_pos(2, 1.0, 0.0, 0.0)
                .set_pos(3, 1.0, 0.0, 1.0)
                .set_tag(4);
            em.emit();
            assert_eq!(em.tag(), 0);
            assert_eq!(em.color_index(), -1);
            em.set_tag(8);
            em.emit();
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (4, Direction::Down, false));
        assert_eq!(seen[1].0, 8);
    }
}
