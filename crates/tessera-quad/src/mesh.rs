use crate::emitter::{QuadEmitter, QuadSink};
use crate::encoding::TOTAL_STRIDE;
use crate::mutable::MutableQuad;
use crate::view::{EncodedQuad, QuadView};

/// Immutable run of encoded quads with geometry already computed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    data: Vec<u32>,
}

impl Mesh {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.data.len() / TOTAL_STRIDE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn quad(&self, index: usize) -> Option<EncodedQuad<'_>> {
        (index < self.quad_count()).then(|| EncodedQuad::new(&self.data, index * TOTAL_STRIDE))
    }

    pub fn iter(&self) -> impl Iterator<Item = EncodedQuad<'_>> + '_ {
        (0..self.quad_count()).map(move |i| EncodedQuad::new(&self.data, i * TOTAL_STRIDE))
    }

    /// Calls `f` with each quad loaded into a reusable editor.
    pub fn for_each_mut(&self, editor: &mut MutableQuad, mut f: impl FnMut(&mut MutableQuad)) {
        for i in 0..self.quad_count() {
            editor.load_from(&self.data, i * TOTAL_STRIDE);
            f(editor);
        }
    }

    pub fn words(&self) -> &[u32] {
        &self.data
    }
}

#[derive(Default)]
struct MeshSink {
    data: Vec<u32>,
}

impl QuadSink for MeshSink {
    fn accept(&mut self, quad: &mut MutableQuad) {
        self.data.extend_from_slice(quad.words());
    }
}

/// Collects emitted quads into a [`Mesh`].
#[derive(Default)]
pub struct MeshBuilder {
    editor: MutableQuad,
    sink: MeshSink,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitter(&mut self) -> QuadEmitter<'_> {
        QuadEmitter::new(&mut self.editor, &mut self.sink)
    }

    /// Finishes the current mesh and leaves the builder empty.
    pub fn build(&mut self) -> Mesh {
        Mesh {
            data: std::mem::take(&mut self.sink.data),
        }
    }
}
