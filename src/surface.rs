use std::fmt::Debug;

use crate::error::SurfaceError;

/// A point in the document: a container node plus an offset into it.
///
/// For text containers the offset counts text units, for elements it
/// counts child nodes, the same way a DOM `Range` boundary does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretPosition<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> CaretPosition<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A possibly non-collapsed selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretRange<N> {
    pub start: CaretPosition<N>,
    pub end: CaretPosition<N>,
}

impl<N: Clone> CaretRange<N> {
    pub fn collapsed(at: CaretPosition<N>) -> Self {
        Self {
            start: at.clone(),
            end: at,
        }
    }

    /// Only the start point takes part in undo; the extent is dropped.
    pub fn collapse(self) -> CaretPosition<N> {
        self.start
    }
}

/// What the snapshot machinery needs from an editable region.
pub trait EditableSurface {
    type Node: Clone + PartialEq + Debug;
    /// Deep, independent copy of the editable root.
    type Fragment: Clone;

    fn root(&self) -> Self::Node;

    fn selection(&self) -> Option<CaretRange<Self::Node>>;
    fn set_caret(&mut self, caret: &CaretPosition<Self::Node>) -> Result<(), SurfaceError>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn child_count(&self, node: &Self::Node) -> usize;
    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;
    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn is_text(&self, node: &Self::Node) -> bool;
    fn text_len(&self, node: &Self::Node) -> usize;

    /// Split a text node at `offset`, returning the new trailing half.
    fn split_text(&mut self, node: &Self::Node, offset: usize) -> Result<Self::Node, SurfaceError>;
    /// Append `tail`'s text to `head` and detach `tail`.
    fn merge_text(&mut self, head: &Self::Node, tail: &Self::Node) -> Result<(), SurfaceError>;
    /// Create a detached zero-width marker tagged with `attribute=id`.
    fn create_marker(&mut self, attribute: &str, id: &str) -> Result<Self::Node, SurfaceError>;
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), SurfaceError>;
    fn remove(&mut self, node: &Self::Node) -> Result<(), SurfaceError>;
    /// First node under the root carrying `attribute`, whatever its value.
    fn find_marker(&self, attribute: &str) -> Option<Self::Node>;

    fn clone_content(&self) -> Result<Self::Fragment, SurfaceError>;
    fn replace_content(&mut self, fragment: &Self::Fragment) -> Result<(), SurfaceError>;

    /// Whether `node` is the root or one of its descendants.
    fn contains(&self, node: &Self::Node) -> bool {
        let root = self.root();
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if n == root {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    fn index_in_parent(&self, node: &Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        (0..self.child_count(&parent)).find(|&i| self.child_at(&parent, i).as_ref() == Some(node))
    }

    /// Length of a boundary container: text units or child count.
    fn container_len(&self, node: &Self::Node) -> usize {
        if self.is_text(node) {
            self.text_len(node)
        } else {
            self.child_count(node)
        }
    }
}
