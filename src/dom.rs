//! `EditableSurface` over a live `contenteditable` element.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CharacterData, Document, HtmlElement, Node, Range, Text};

use crate::error::SurfaceError;
use crate::surface::{CaretPosition, CaretRange, EditableSurface};

const MARKER_TAG: &str = "span";
const ZERO_WIDTH_SPACE: &str = "\u{200B}";

fn dom_err(err: JsValue) -> SurfaceError {
    SurfaceError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn as_text(node: &Node) -> Result<&Text, SurfaceError> {
    node.dyn_ref::<Text>().ok_or(SurfaceError::NotText)
}

pub struct DomSurface {
    document: Document,
    root: HtmlElement,
}

impl DomSurface {
    pub fn new(root: HtmlElement) -> Result<Self, SurfaceError> {
        let document = root
            .owner_document()
            .ok_or_else(|| SurfaceError::Dom("editor element has no document".into()))?;
        Ok(Self { document, root })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }
}

impl EditableSurface for DomSurface {
    type Node = Node;
    type Fragment = Node;

    fn root(&self) -> Node {
        self.root.clone().into()
    }

    fn selection(&self) -> Option<CaretRange<Node>> {
        let selection = self.document.get_selection().ok().flatten()?;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;
        Some(CaretRange {
            start: CaretPosition::new(
                range.start_container().ok()?,
                range.start_offset().ok()? as usize,
            ),
            end: CaretPosition::new(
                range.end_container().ok()?,
                range.end_offset().ok()? as usize,
            ),
        })
    }

    fn set_caret(&mut self, caret: &CaretPosition<Node>) -> Result<(), SurfaceError> {
        let range = Range::new().map_err(dom_err)?;
        range
            .set_start(&caret.node, caret.offset as u32)
            .map_err(dom_err)?;
        range.collapse_with_to_start(true);

        let selection = self
            .document
            .get_selection()
            .map_err(dom_err)?
            .ok_or_else(|| SurfaceError::Dom("document has no selection".into()))?;
        selection.remove_all_ranges().map_err(dom_err)?;
        selection.add_range(&range).map_err(dom_err)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn child_count(&self, node: &Node) -> usize {
        node.child_nodes().length() as usize
    }

    fn child_at(&self, node: &Node, index: usize) -> Option<Node> {
        node.child_nodes().item(index as u32)
    }

    fn previous_sibling(&self, node: &Node) -> Option<Node> {
        node.previous_sibling()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn is_text(&self, node: &Node) -> bool {
        node.node_type() == Node::TEXT_NODE
    }

    fn text_len(&self, node: &Node) -> usize {
        node.dyn_ref::<CharacterData>()
            .map_or(0, |data| data.length() as usize)
    }

    fn split_text(&mut self, node: &Node, offset: usize) -> Result<Node, SurfaceError> {
        let tail = as_text(node)?.split_text(offset as u32).map_err(dom_err)?;
        Ok(tail.into())
    }

    fn merge_text(&mut self, head: &Node, tail: &Node) -> Result<(), SurfaceError> {
        let data = as_text(tail)?.data();
        as_text(head)?.append_data(&data).map_err(dom_err)?;
        self.remove(tail)
    }

    fn create_marker(&mut self, attribute: &str, id: &str) -> Result<Node, SurfaceError> {
        let marker = self.document.create_element(MARKER_TAG).map_err(dom_err)?;
        marker.set_attribute(attribute, id).map_err(dom_err)?;
        marker.set_text_content(Some(ZERO_WIDTH_SPACE));
        Ok(marker.into())
    }

    fn insert_before(
        &mut self,
        parent: &Node,
        node: &Node,
        reference: Option<&Node>,
    ) -> Result<(), SurfaceError> {
        parent.insert_before(node, reference).map_err(dom_err)?;
        Ok(())
    }

    fn remove(&mut self, node: &Node) -> Result<(), SurfaceError> {
        let parent = node.parent_node().ok_or(SurfaceError::Detached)?;
        parent.remove_child(node).map_err(dom_err)?;
        Ok(())
    }

    fn find_marker(&self, attribute: &str) -> Option<Node> {
        self.root
            .query_selector(&format!("[{}]", attribute))
            .ok()
            .flatten()
            .map(Into::into)
    }

    fn clone_content(&self) -> Result<Node, SurfaceError> {
        self.root.clone_node_with_deep(true).map_err(dom_err)
    }

    fn replace_content(&mut self, fragment: &Node) -> Result<(), SurfaceError> {
        let copy = fragment.clone_node_with_deep(true).map_err(dom_err)?;
        while let Some(child) = self.root.first_child() {
            self.root.remove_child(&child).map_err(dom_err)?;
        }
        while let Some(child) = copy.first_child() {
            self.root.append_child(&child).map_err(dom_err)?;
        }
        Ok(())
    }
}
