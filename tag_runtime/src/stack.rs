/* Containment stack.
 *
 * While a tag is compiled or validated, every struct being visited pushes a
 * frame recording its type tag and the current lengths of its array fields.
 * Index fields look up the innermost frame whose tag matches their target to
 * learn how many elements the indexed array has.
 */

use std::ops::{Deref, DerefMut};

/// Type tag of an emitted struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructTag(pub &'static str);

#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub tag: StructTag,
    pub lengths: Vec<(&'static str, usize)>,
}

#[derive(Debug, Default)]
pub struct ContainmentStack {
    arena: Vec<FrameRecord>,
    stack: Vec<usize>,
}

impl ContainmentStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame; it is popped when the guard drops.
    pub fn enter(&mut self, tag: StructTag, lengths: &[(&'static str, usize)]) -> FrameGuard<'_> {
        self.arena.push(FrameRecord {
            tag,
            lengths: lengths.to_vec(),
        });
        self.stack.push(self.arena.len() - 1);
        FrameGuard { stack: self }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Frames innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &FrameRecord> {
        self.stack.iter().rev().map(move |i| &self.arena[*i])
    }

    /// Length of `member` in the innermost frame whose tag is one of `tags`.
    pub fn array_len(&self, tags: &[StructTag], member: &str) -> Option<usize> {
        self.frames()
            .find(|frame| tags.contains(&frame.tag))
            .and_then(|frame| frame.lengths.iter().find(|(name, _)| *name == member))
            .map(|(_, len)| *len)
    }

    fn pop(&mut self) {
        if let Some(index) = self.stack.pop() {
            self.arena.truncate(index);
        }
    }
}

pub struct FrameGuard<'a> {
    stack: &'a mut ContainmentStack,
}

impl Deref for FrameGuard<'_> {
    type Target = ContainmentStack;

    fn deref(&self) -> &ContainmentStack {
        &*self.stack
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut ContainmentStack {
        &mut *self.stack
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: StructTag = StructTag("Model");
    const NODE: StructTag = StructTag("ModelNode");

    #[test]
    fn innermost_matching_frame_wins() {
        let mut stack = ContainmentStack::new();
        let mut outer = stack.enter(MODEL, &[("nodes", 4)]);
        {
            let mut inner = outer.enter(MODEL, &[("nodes", 2)]);
            let node = inner.enter(NODE, &[]);
            assert_eq!(node.array_len(&[MODEL], "nodes"), Some(2));
            assert_eq!(node.depth(), 3);
        }
        assert_eq!(outer.array_len(&[MODEL], "nodes"), Some(4));
        assert_eq!(outer.array_len(&[NODE], "nodes"), None);
        assert_eq!(outer.array_len(&[MODEL], "regions"), None);
    }

    #[test]
    fn frames_pop_on_early_return() {
        fn fails(stack: &mut ContainmentStack) -> Result<(), ()> {
            let _frame = stack.enter(NODE, &[]);
            Err(())
        }

        let mut stack = ContainmentStack::new();
        assert!(fails(&mut stack).is_err());
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.frames().count(), 0);
    }
}
