//! Capturing and replaying editable content together with the caret.
//!
//! The caret is encoded as a zero-width marker element inside the copied
//! content. Capture injects the marker at the caret, clones the root and
//! takes the marker out again. Restore swaps the content in, turns the
//! marker back into a caret position and removes it.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use uuid::Uuid;

use crate::error::{SnapshotError, SurfaceError};
use crate::surface::{CaretPosition, CaretRange, EditableSurface};

pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-caret-marker";

/// Captured editable content with its embedded caret marker.
#[derive(Clone, Debug)]
pub struct Snapshot<F> {
    content: F,
    timestamp: DateTime<Utc>,
}

impl<F> Snapshot<F> {
    pub fn new(content: F, timestamp: DateTime<Utc>) -> Self {
        Self { content, timestamp }
    }

    pub fn content(&self) -> &F {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Clone, Debug)]
pub struct SnapshotController {
    marker_attribute: String,
}

impl Default for SnapshotController {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_ATTRIBUTE)
    }
}

impl SnapshotController {
    pub fn new(marker_attribute: impl Into<String>) -> Self {
        Self {
            marker_attribute: marker_attribute.into(),
        }
    }

    pub fn marker_attribute(&self) -> &str {
        &self.marker_attribute
    }

    /// Copy the surface content with a marker at the start of `caret`.
    ///
    /// The live surface ends up with the same structure it started with and
    /// its caret collapsed to the captured point.
    pub fn capture<S: EditableSurface>(
        &self,
        surface: &mut S,
        caret: CaretRange<S::Node>,
    ) -> Result<Snapshot<S::Fragment>, SnapshotError> {
        let point = caret.collapse();
        if !surface.contains(&point.node) {
            return Err(SnapshotError::CaretOutsideEditor);
        }
        let len = surface.container_len(&point.node);
        if point.offset > len {
            return Err(SnapshotError::OffsetOutOfBounds {
                offset: point.offset,
                len,
            });
        }

        let id = Uuid::new_v4().to_string();
        let marker = surface.create_marker(&self.marker_attribute, &id)?;

        let mut guard = MarkerGuard::new(surface, marker);
        guard.place(&point)?;
        let content = guard.surface.clone_content()?;
        guard.release()?;

        surface.set_caret(&point)?;
        debug!("captured snapshot with marker {}", id);
        Ok(Snapshot::new(content, Utc::now()))
    }

    /// Swap the snapshot content into the surface and put the caret back.
    ///
    /// Without a marker the content is still replaced, the caret goes to the
    /// start of the content and `CorruptSnapshot` is returned.
    pub fn restore<S: EditableSurface>(
        &self,
        surface: &mut S,
        snapshot: &Snapshot<S::Fragment>,
    ) -> Result<CaretPosition<S::Node>, SnapshotError> {
        surface.replace_content(snapshot.content())?;

        let Some(marker) = surface.find_marker(&self.marker_attribute) else {
            let fallback = CaretPosition::new(surface.root(), 0);
            surface.set_caret(&fallback)?;
            return Err(SnapshotError::CorruptSnapshot);
        };
        let caret = unwrap_marker(surface, &marker)?;

        // Snapshots from elsewhere may carry more than one marker
        while let Some(stray) = surface.find_marker(&self.marker_attribute) {
            warn!("removing stray caret marker from restored content");
            surface.remove(&stray)?;
        }

        surface.set_caret(&caret)?;
        Ok(caret)
    }
}

/// Remove a marker, joining the text around it, and return where it was.
fn unwrap_marker<S: EditableSurface>(
    surface: &mut S,
    marker: &S::Node,
) -> Result<CaretPosition<S::Node>, SurfaceError> {
    let parent = surface.parent(marker).ok_or(SurfaceError::Detached)?;
    let index = surface.index_in_parent(marker).ok_or(SurfaceError::Detached)?;
    let before = surface
        .previous_sibling(marker)
        .filter(|n| surface.is_text(n));
    let after = surface.next_sibling(marker).filter(|n| surface.is_text(n));
    surface.remove(marker)?;

    let caret = match (before, after) {
        (Some(head), Some(tail)) => {
            let offset = surface.text_len(&head);
            surface.merge_text(&head, &tail)?;
            CaretPosition::new(head, offset)
        }
        (Some(head), None) => {
            let offset = surface.text_len(&head);
            CaretPosition::new(head, offset)
        }
        (None, Some(tail)) => CaretPosition::new(tail, 0),
        (None, None) => CaretPosition::new(parent, index),
    };
    Ok(caret)
}

/// Keeps a capture's marker from outliving the capture.
///
/// Dropping the guard without `release` removes the marker and rejoins a
/// split text node, so an early return never leaves the surface marked.
struct MarkerGuard<'a, S: EditableSurface> {
    surface: &'a mut S,
    marker: S::Node,
    split: Option<(S::Node, S::Node)>,
    armed: bool,
}

impl<'a, S: EditableSurface> MarkerGuard<'a, S> {
    fn new(surface: &'a mut S, marker: S::Node) -> Self {
        Self {
            surface,
            marker,
            split: None,
            armed: true,
        }
    }

    fn place(&mut self, point: &CaretPosition<S::Node>) -> Result<(), SurfaceError> {
        if !self.surface.is_text(&point.node) {
            let reference = self.surface.child_at(&point.node, point.offset);
            return self
                .surface
                .insert_before(&point.node, &self.marker, reference.as_ref());
        }

        let parent = self
            .surface
            .parent(&point.node)
            .ok_or(SurfaceError::Detached)?;
        let len = self.surface.text_len(&point.node);
        let reference = if point.offset == 0 {
            Some(point.node.clone())
        } else if point.offset == len {
            self.surface.next_sibling(&point.node)
        } else {
            let tail = self.surface.split_text(&point.node, point.offset)?;
            self.split = Some((point.node.clone(), tail.clone()));
            Some(tail)
        };
        self.surface
            .insert_before(&parent, &self.marker, reference.as_ref())
    }

    fn release(mut self) -> Result<(), SurfaceError> {
        self.armed = false;
        self.cleanup()
    }

    fn cleanup(&mut self) -> Result<(), SurfaceError> {
        if self.surface.parent(&self.marker).is_some() {
            self.surface.remove(&self.marker)?;
        }
        if let Some((head, tail)) = self.split.take() {
            self.surface.merge_text(&head, &tail)?;
        }
        Ok(())
    }
}

impl<S: EditableSurface> Drop for MarkerGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = self.cleanup() {
                warn!("failed to remove caret marker after aborted capture: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FragmentNode, MemoryDocument, MemoryFragment, NodeId};
    use pretty_assertions::assert_eq;

    fn caret(node: NodeId, offset: usize) -> CaretRange<NodeId> {
        CaretRange::collapsed(CaretPosition::new(node, offset))
    }

    fn controller() -> SnapshotController {
        SnapshotController::default()
    }

    /// `abcd` as a single text node under the root.
    fn abcd() -> (MemoryDocument, NodeId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root_id();
        let text = doc.append_text(root, "abcd");
        (doc, text)
    }

    fn marker_count(fragment: &MemoryFragment) -> usize {
        fn count(node: &FragmentNode) -> usize {
            match node {
                FragmentNode::Text(_) => 0,
                FragmentNode::Element {
                    attributes,
                    children,
                    ..
                } => {
                    let own = attributes
                        .iter()
                        .filter(|(n, _)| n == DEFAULT_MARKER_ATTRIBUTE)
                        .count();
                    own + children.iter().map(count).sum::<usize>()
                }
            }
        }
        fragment.children.iter().map(count).sum()
    }

    #[test]
    fn capture_embeds_marker_between_split_halves() {
        let (mut doc, text) = abcd();
        let snapshot = controller().capture(&mut doc, caret(text, 2)).unwrap();

        let content = snapshot.content();
        assert_eq!(content.children.len(), 3);
        assert_eq!(content.children[0], FragmentNode::Text("ab".to_string()));
        assert_eq!(content.children[2], FragmentNode::Text("cd".to_string()));
        assert_eq!(marker_count(content), 1);
    }

    #[test]
    fn capture_leaves_live_document_unmarked() {
        let (mut doc, text) = abcd();
        let root = doc.root_id();
        controller().capture(&mut doc, caret(text, 2)).unwrap();

        assert_eq!(doc.to_html(), "abcd");
        assert_eq!(doc.children(root), &[text]);
        assert_eq!(doc.find_marker(DEFAULT_MARKER_ATTRIBUTE), None);
        assert_eq!(doc.selection(), Some(caret(text, 2)));
    }

    #[test]
    fn capture_collapses_selection_to_start() {
        let (mut doc, text) = abcd();
        let range = CaretRange {
            start: CaretPosition::new(text, 1),
            end: CaretPosition::new(text, 3),
        };
        let snapshot = controller().capture(&mut doc, range).unwrap();

        assert_eq!(snapshot.content().children[0], FragmentNode::Text("a".to_string()));
        assert_eq!(doc.selection(), Some(caret(text, 1)));
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let (mut doc, text) = abcd();
        let root = doc.root_id();
        let snapshot = controller().capture(&mut doc, caret(text, 4)).unwrap();
        let before = snapshot.content().to_html();

        doc.append_text(root, "efgh");
        assert_eq!(snapshot.content().to_html(), before);
    }

    #[test]
    fn round_trip_restores_content_and_caret() {
        let (mut doc, text) = abcd();
        let root = doc.root_id();
        let snapshot = controller().capture(&mut doc, caret(text, 2)).unwrap();

        // Edit after capture
        let p = doc.append_element(root, "p");
        doc.append_text(p, "typed later");

        let restored = controller().restore(&mut doc, &snapshot).unwrap();

        assert_eq!(doc.to_html(), "abcd");
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.text(restored.node), Some("abcd"));
        assert_eq!(restored.offset, 2);
        assert_eq!(doc.find_marker(DEFAULT_MARKER_ATTRIBUTE), None);
        assert_eq!(doc.selection(), Some(CaretRange::collapsed(restored)));
    }

    #[test]
    fn caret_at_text_start_does_not_split() {
        let (mut doc, text) = abcd();
        let snapshot = controller().capture(&mut doc, caret(text, 0)).unwrap();
        assert_eq!(snapshot.content().children.len(), 2);
        assert_eq!(snapshot.content().children[1], FragmentNode::Text("abcd".to_string()));

        let restored = controller().restore(&mut doc, &snapshot).unwrap();
        assert_eq!(doc.text(restored.node), Some("abcd"));
        assert_eq!(restored.offset, 0);
    }

    #[test]
    fn caret_at_text_end_does_not_split() {
        let (mut doc, text) = abcd();
        let snapshot = controller().capture(&mut doc, caret(text, 4)).unwrap();
        assert_eq!(snapshot.content().children.len(), 2);
        assert_eq!(snapshot.content().children[0], FragmentNode::Text("abcd".to_string()));

        let restored = controller().restore(&mut doc, &snapshot).unwrap();
        assert_eq!(doc.text(restored.node), Some("abcd"));
        assert_eq!(restored.offset, 4);
    }

    #[test]
    fn caret_at_element_boundary() {
        let mut doc = MemoryDocument::new();
        let root = doc.root_id();
        let first = doc.append_element(root, "p");
        doc.append_text(first, "one");
        let second = doc.append_element(root, "p");
        doc.append_text(second, "two");

        let snapshot = controller().capture(&mut doc, caret(root, 1)).unwrap();
        assert_eq!(snapshot.content().children.len(), 3);
        assert_eq!(doc.to_html(), "<p>one</p><p>two</p>");

        let restored = controller().restore(&mut doc, &snapshot).unwrap();
        assert_eq!(restored, CaretPosition::new(root, 1));
        assert_eq!(doc.to_html(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn caret_in_nested_text() {
        let mut doc = MemoryDocument::new();
        let root = doc.root_id();
        let p = doc.append_element(root, "p");
        let b = doc.append_element(p, "b");
        let bold = doc.append_text(b, "bold");
        doc.append_text(p, " tail");

        let snapshot = controller().capture(&mut doc, caret(bold, 3)).unwrap();
        assert_eq!(doc.to_html(), "<p><b>bold</b> tail</p>");

        let restored = controller().restore(&mut doc, &snapshot).unwrap();
        assert_eq!(doc.to_html(), "<p><b>bold</b> tail</p>");
        assert_eq!(doc.text(restored.node), Some("bold"));
        assert_eq!(restored.offset, 3);
    }

    #[test]
    fn caret_outside_editor_is_rejected() {
        let (mut doc, _) = abcd();
        let detached = doc.create_marker("data-other", "x").unwrap();

        let result = controller().capture(&mut doc, caret(detached, 0));
        assert!(matches!(result, Err(SnapshotError::CaretOutsideEditor)));
        assert_eq!(doc.to_html(), "abcd");
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let (mut doc, text) = abcd();
        let result = controller().capture(&mut doc, caret(text, 9));
        assert!(matches!(
            result,
            Err(SnapshotError::OffsetOutOfBounds { offset: 9, len: 4 })
        ));
        assert_eq!(doc.children(doc.root_id()), &[text]);
    }

    #[test]
    fn restore_without_marker_falls_back_to_start() {
        let (mut doc, _) = abcd();
        let root = doc.root_id();
        let foreign = Snapshot::new(
            MemoryFragment {
                children: vec![FragmentNode::Text("foreign".to_string())],
            },
            Utc::now(),
        );

        let result = controller().restore(&mut doc, &foreign);
        assert_eq!(result, Err(SnapshotError::CorruptSnapshot));
        assert_eq!(doc.to_html(), "foreign");
        assert_eq!(doc.selection(), Some(caret(root, 0)));
    }

    #[test]
    fn restore_removes_stray_markers() {
        let mut doc = MemoryDocument::new();
        let marker = |id: &str| FragmentNode::Element {
            tag: "span".to_string(),
            attributes: vec![(DEFAULT_MARKER_ATTRIBUTE.to_string(), id.to_string())],
            children: vec![FragmentNode::Text("\u{200B}".to_string())],
        };
        let snapshot = Snapshot::new(
            MemoryFragment {
                children: vec![
                    FragmentNode::Text("ab".to_string()),
                    marker("1"),
                    FragmentNode::Text("cd".to_string()),
                    marker("2"),
                ],
            },
            Utc::now(),
        );

        let restored = controller().restore(&mut doc, &snapshot).unwrap();
        assert_eq!(doc.to_html(), "abcd");
        assert_eq!(restored.offset, 2);
    }

    #[test]
    fn custom_marker_attribute_is_used() {
        let (mut doc, text) = abcd();
        let controller = SnapshotController::new("data-undo-caret");
        let snapshot = controller.capture(&mut doc, caret(text, 1)).unwrap();
        assert!(snapshot.content().to_html().contains("data-undo-caret=\""));
        assert_eq!(marker_count(snapshot.content()), 0);

        controller.restore(&mut doc, &snapshot).unwrap();
        assert_eq!(doc.find_marker("data-undo-caret"), None);
    }

    /// Delegates to a `MemoryDocument` but refuses to clone.
    struct CloneFails(MemoryDocument);

    impl EditableSurface for CloneFails {
        type Node = NodeId;
        type Fragment = MemoryFragment;

        fn root(&self) -> NodeId {
            self.0.root()
        }
        fn selection(&self) -> Option<CaretRange<NodeId>> {
            self.0.selection()
        }
        fn set_caret(&mut self, caret: &CaretPosition<NodeId>) -> Result<(), SurfaceError> {
            self.0.set_caret(caret)
        }
        fn parent(&self, node: &NodeId) -> Option<NodeId> {
            self.0.parent(node)
        }
        fn child_count(&self, node: &NodeId) -> usize {
            self.0.child_count(node)
        }
        fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
            self.0.child_at(node, index)
        }
        fn previous_sibling(&self, node: &NodeId) -> Option<NodeId> {
            self.0.previous_sibling(node)
        }
        fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
            self.0.next_sibling(node)
        }
        fn is_text(&self, node: &NodeId) -> bool {
            self.0.is_text(node)
        }
        fn text_len(&self, node: &NodeId) -> usize {
            self.0.text_len(node)
        }
        fn split_text(&mut self, node: &NodeId, offset: usize) -> Result<NodeId, SurfaceError> {
            self.0.split_text(node, offset)
        }
        fn merge_text(&mut self, head: &NodeId, tail: &NodeId) -> Result<(), SurfaceError> {
            self.0.merge_text(head, tail)
        }
        fn create_marker(&mut self, attribute: &str, id: &str) -> Result<NodeId, SurfaceError> {
            self.0.create_marker(attribute, id)
        }
        fn insert_before(
            &mut self,
            parent: &NodeId,
            node: &NodeId,
            reference: Option<&NodeId>,
        ) -> Result<(), SurfaceError> {
            self.0.insert_before(parent, node, reference)
        }
        fn remove(&mut self, node: &NodeId) -> Result<(), SurfaceError> {
            self.0.remove(node)
        }
        fn find_marker(&self, attribute: &str) -> Option<NodeId> {
            self.0.find_marker(attribute)
        }
        fn clone_content(&self) -> Result<MemoryFragment, SurfaceError> {
            Err(SurfaceError::Dom("clone refused".to_string()))
        }
        fn replace_content(&mut self, fragment: &MemoryFragment) -> Result<(), SurfaceError> {
            self.0.replace_content(fragment)
        }
    }

    #[test]
    fn failed_clone_still_removes_marker() {
        let (doc, text) = abcd();
        let root = doc.root_id();
        let mut surface = CloneFails(doc);

        let result = controller().capture(&mut surface, caret(text, 2));
        assert_eq!(
            result.map(|_| ()),
            Err(SnapshotError::Surface(SurfaceError::Dom("clone refused".to_string())))
        );
        assert_eq!(surface.0.to_html(), "abcd");
        assert_eq!(surface.0.children(root), &[text]);
        assert_eq!(surface.find_marker(DEFAULT_MARKER_ATTRIBUTE), None);
    }
}
