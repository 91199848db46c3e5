use tessera_quad::MutableQuad;

/// Edits or rejects a quad before it is shaded.
pub trait QuadTransform: Send {
    /// Returns false to drop the quad.
    fn transform(&mut self, quad: &mut MutableQuad) -> bool;
}

impl<F: FnMut(&mut MutableQuad) -> bool + Send> QuadTransform for F {
    fn transform(&mut self, quad: &mut MutableQuad) -> bool {
        self(quad)
    }
}

/// Transforms applied in push order; the first rejection stops the chain.
#[derive(Default)]
pub struct TransformStack {
    stack: Vec<Box<dyn QuadTransform>>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transform: Box<dyn QuadTransform>) {
        self.stack.push(transform);
    }

    pub fn pop(&mut self) -> Option<Box<dyn QuadTransform>> {
        self.stack.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn apply(&mut self, quad: &mut MutableQuad) -> bool {
        self.stack.iter_mut().all(|t| t.transform(quad))
    }
}

impl std::fmt::Debug for TransformStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformStack").field("len", &self.stack.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_quad::QuadView;

    #[test]
    fn rejection_short_circuits() {
        let mut stack = TransformStack::new();
        stack.push(Box::new(|q: &mut MutableQuad| {
            q.set_tag(q.tag() + 1);
            q.tag() < 2
        }));
        stack.push(Box::new(|q: &mut MutableQuad| {
            q.set_tag(q.tag() * 10);
            true
        }));
        let mut quad = MutableQuad::new();
        assert!(stack.apply(&mut quad));
        assert_eq!(quad.tag(), 10);

        quad.set_tag(1);
        assert!(!stack.apply(&mut quad));
        assert_eq!(quad.tag(), 2);

        stack.pop();
        assert_eq!(stack.len(), 1);
    }
}
