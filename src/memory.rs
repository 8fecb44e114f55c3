//! In-memory editable surface.
//!
//! An arena of element and text nodes with DOM-like mutation semantics.
//! Detached nodes stay in the arena; ids are never reused.

use crate::error::SurfaceError;
use crate::surface::{CaretPosition, CaretRange, EditableSurface};

const MARKER_TAG: &str = "span";
const ZERO_WIDTH_SPACE: &str = "\u{200B}";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Owned copy of a subtree.
#[derive(Clone, Debug, PartialEq)]
pub enum FragmentNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<FragmentNode>,
    },
    Text(String),
}

/// Deep copy of a document root's children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryFragment {
    pub children: Vec<FragmentNode>,
}

impl MemoryFragment {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_fragment(child, &mut out);
        }
        out
    }
}

fn write_fragment(node: &FragmentNode, out: &mut String) {
    match node {
        FragmentNode::Text(text) => out.push_str(text),
        FragmentNode::Element {
            tag,
            attributes,
            children,
        } => {
            write_open_tag(tag, attributes, out);
            for child in children {
                write_fragment(child, out);
            }
            out.push_str(&format!("</{}>", tag));
        }
    }
}

fn write_open_tag(tag: &str, attributes: &[(String, String)], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attributes {
        out.push_str(&format!(" {}=\"{}\"", name, value));
    }
    out.push('>');
}

fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Headless document for tests and short-lived editing.
///
/// Node storage only grows: every capture allocates a marker and its
/// filler text, and `replace_content` detaches the previous children
/// without freeing them. Not meant to back a long editing session.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    selection: Option<CaretRange<NodeId>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty document with a `div` root.
    pub fn new() -> Self {
        let root = NodeData {
            kind: NodeKind::Element {
                tag: "div".to_string(),
                attributes: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            selection: None,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.alloc(NodeKind::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
        });
        self.attach(parent, id, None);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text(text.to_string()));
        self.attach(parent, id, None);
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Data of a text node, `None` for elements.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    pub fn set_selection(&mut self, range: CaretRange<NodeId>) {
        self.selection = Some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Serialized children of the root.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in &self.nodes[self.root.0].children {
            self.write_html(child, &mut out);
        }
        out
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, node: NodeId, at: Option<usize>) {
        let children = &mut self.nodes[parent.0].children;
        match at {
            Some(index) => children.insert(index, node),
            None => children.push(node),
        }
        self.nodes[node.0].parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let parent = self.nodes[node.0].parent.ok_or(SurfaceError::Detached)?;
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
        Ok(())
    }

    fn text_mut(&mut self, node: NodeId) -> Result<&mut String, SurfaceError> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(text) => Ok(text),
            NodeKind::Element { .. } => Err(SurfaceError::NotText),
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[node.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag, attributes } => {
                write_open_tag(tag, attributes, out);
                for &child in &self.nodes[node.0].children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn snapshot_node(&self, node: NodeId) -> FragmentNode {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => FragmentNode::Text(text.clone()),
            NodeKind::Element { tag, attributes } => FragmentNode::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: self.nodes[node.0]
                    .children
                    .iter()
                    .map(|&c| self.snapshot_node(c))
                    .collect(),
            },
        }
    }

    fn instantiate(&mut self, parent: NodeId, fragment: &FragmentNode) {
        match fragment {
            FragmentNode::Text(text) => {
                self.append_text(parent, text);
            }
            FragmentNode::Element {
                tag,
                attributes,
                children,
            } => {
                let id = self.alloc(NodeKind::Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                });
                self.attach(parent, id, None);
                for child in children {
                    self.instantiate(id, child);
                }
            }
        }
    }

    fn find_with_attribute(&self, node: NodeId, attribute: &str) -> Option<NodeId> {
        if self.attribute(node, attribute).is_some() {
            return Some(node);
        }
        self.nodes[node.0]
            .children
            .iter()
            .find_map(|&c| self.find_with_attribute(c, attribute))
    }

    fn sibling(&self, node: NodeId, step: isize) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let index = siblings.iter().position(|&c| c == node)?;
        let target = index.checked_add_signed(step)?;
        siblings.get(target).copied()
    }
}

impl EditableSurface for MemoryDocument {
    type Node = NodeId;
    type Fragment = MemoryFragment;

    fn root(&self) -> NodeId {
        self.root
    }

    fn selection(&self) -> Option<CaretRange<NodeId>> {
        self.selection.clone()
    }

    fn set_caret(&mut self, caret: &CaretPosition<NodeId>) -> Result<(), SurfaceError> {
        self.selection = Some(CaretRange::collapsed(caret.clone()));
        Ok(())
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn child_count(&self, node: &NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
        self.nodes[node.0].children.get(index).copied()
    }

    fn previous_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, -1)
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, 1)
    }

    fn is_text(&self, node: &NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Text(_))
    }

    fn text_len(&self, node: &NodeId) -> usize {
        self.text(*node).map_or(0, |t| t.chars().count())
    }

    fn split_text(&mut self, node: &NodeId, offset: usize) -> Result<NodeId, SurfaceError> {
        let text = self.text_mut(*node)?;
        let byte = char_to_byte(text, offset);
        let tail = text.split_off(byte);
        let tail_id = self.alloc(NodeKind::Text(tail));
        if let Some(parent) = self.nodes[node.0].parent {
            let index = self.nodes[parent.0]
                .children
                .iter()
                .position(|c| c == node)
                .ok_or(SurfaceError::Detached)?;
            self.attach(parent, tail_id, Some(index + 1));
        }
        Ok(tail_id)
    }

    fn merge_text(&mut self, head: &NodeId, tail: &NodeId) -> Result<(), SurfaceError> {
        let tail_text = self.text(*tail).ok_or(SurfaceError::NotText)?.to_string();
        self.text_mut(*head)?.push_str(&tail_text);
        self.detach(*tail)
    }

    fn create_marker(&mut self, attribute: &str, id: &str) -> Result<NodeId, SurfaceError> {
        let marker = self.alloc(NodeKind::Element {
            tag: MARKER_TAG.to_string(),
            attributes: vec![(attribute.to_string(), id.to_string())],
        });
        let filler = self.alloc(NodeKind::Text(ZERO_WIDTH_SPACE.to_string()));
        self.attach(marker, filler, None);
        Ok(marker)
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        node: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), SurfaceError> {
        if self.nodes[node.0].parent.is_some() {
            self.detach(*node)?;
        }
        let at = match reference {
            Some(reference) => Some(
                self.nodes[parent.0]
                    .children
                    .iter()
                    .position(|c| c == reference)
                    .ok_or_else(|| SurfaceError::Dom("reference is not a child of parent".into()))?,
            ),
            None => None,
        };
        self.attach(*parent, *node, at);
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) -> Result<(), SurfaceError> {
        self.detach(*node)
    }

    fn find_marker(&self, attribute: &str) -> Option<NodeId> {
        self.nodes[self.root.0]
            .children
            .iter()
            .find_map(|&c| self.find_with_attribute(c, attribute))
    }

    fn clone_content(&self) -> Result<MemoryFragment, SurfaceError> {
        Ok(MemoryFragment {
            children: self.nodes[self.root.0]
                .children
                .iter()
                .map(|&c| self.snapshot_node(c))
                .collect(),
        })
    }

    fn replace_content(&mut self, fragment: &MemoryFragment) -> Result<(), SurfaceError> {
        let old = std::mem::take(&mut self.nodes[self.root.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for child in &fragment.children {
            self.instantiate(self.root, child);
        }
        Ok(())
    }
}
