//! Arena-backed document tree.
//!
//! The engine consumes the host tree through a narrow capability surface:
//! child enumeration, attribute access, structural remove/replace/append,
//! selector lookup, subtree cloning, visibility and class-list mutation, and
//! one-way markup serialization.  This module provides that surface over a
//! slot arena — nodes are `NodeId` indices into a `Vec`, so the interpreter
//! can recurse and splice without holding borrows into the tree.
//!
//! Markup *parsing* is deliberately absent; documents are built through this
//! API.  Detached nodes stay in the arena (templates captured by `hs-on`
//! rely on that) and are simply unreachable from the root once removed.

use std::fmt::Write as _;

/// Index of a node in its [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Tag used for text nodes.
pub const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: String,
    hidden: bool,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        NodeData {
            tag: tag.to_owned(),
            attrs: Vec::new(),
            classes: Vec::new(),
            children: Vec::new(),
            parent: None,
            text: String::new(),
            hidden: false,
        }
    }

    fn text_node(text: &str) -> Self {
        let mut n = Self::element(TEXT_TAG);
        n.text = text.to_owned();
        n
    }
}

/// A document: an arena of nodes plus a distinguished root element.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document whose root is an element with the given tag.
    pub fn new(root_tag: &str) -> Self {
        Document {
            nodes: vec![NodeData::element(root_tag)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0 as usize]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    // ── Creation ──────────────────────────────────────────────────────────────

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::text_node(text))
    }

    // ── Basic accessors ───────────────────────────────────────────────────────

    pub fn tag(&self, id: NodeId) -> &str {
        &self.data(id).tag
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.data(id).tag == TEXT_TAG
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// True when the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.data(cur).parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    // ── Attributes ────────────────────────────────────────────────────────────

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.data(id)
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let data = self.data_mut(id);
        match data.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => data.attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let data = self.data_mut(id);
        let before = data.attrs.len();
        data.attrs.retain(|(k, _)| k != name);
        data.attrs.len() != before
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    // ── Visibility and classes ────────────────────────────────────────────────

    pub fn hidden(&self, id: NodeId) -> bool {
        self.data(id).hidden
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.data_mut(id).hidden = hidden;
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let data = self.data_mut(id);
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.data_mut(id).classes.retain(|c| c != class);
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.data(id).classes.iter().any(|c| c == class)
    }

    // ── Text content ──────────────────────────────────────────────────────────

    /// Replace the node's children with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.data_mut(id).children) {
            self.data_mut(child).parent = None;
        }
        let t = self.create_text(text);
        self.data_mut(t).parent = Some(id);
        self.data_mut(id).children.push(t);
    }

    /// Concatenated text of the node and its descendants, document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let data = self.data(id);
        out.push_str(&data.text);
        for &child in &data.children {
            self.collect_text(child, out);
        }
    }

    // ── Structural mutation ───────────────────────────────────────────────────

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.push(child);
    }

    /// Detach a node from its parent.  The node and its subtree stay alive
    /// in the arena but become unreachable from the root.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.data_mut(id).parent.take();
        if let Some(parent) = parent {
            self.data_mut(parent).children.retain(|&c| c != id);
        }
    }

    /// Replace a node with a sequence of nodes, preserving position.
    /// The replacements are detached from wherever they currently sit.
    /// No-op when `id` has no parent.
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) {
        let Some(parent) = self.data(id).parent else {
            return;
        };
        let Some(pos) = self.data(parent).children.iter().position(|&c| c == id) else {
            return;
        };
        self.detach(id);
        for (i, &r) in replacements.iter().enumerate() {
            self.detach(r);
            self.data_mut(r).parent = Some(parent);
            self.data_mut(parent).children.insert(pos + i, r);
        }
    }

    /// Deep-copy a subtree; the copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut data = self.data(id).clone();
        data.parent = None;
        let children = std::mem::take(&mut data.children);
        let copy = self.alloc(data);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.data_mut(child_copy).parent = Some(copy);
            self.data_mut(copy).children.push(child_copy);
        }
        copy
    }

    // ── Selector lookup ───────────────────────────────────────────────────────

    /// True when the node matches a simple selector: `#id`, `.class`,
    /// `[attr]`, or a bare tag name.  Text nodes never match.
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        if self.is_text(id) {
            return false;
        }
        let sel = selector.trim();
        if let Some(want) = sel.strip_prefix('#') {
            self.attr(id, "id") == Some(want)
        } else if let Some(class) = sel.strip_prefix('.') {
            self.has_class(id, class) || self.class_attr_contains(id, class)
        } else if let Some(attr) = sel.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            self.has_attr(id, attr)
        } else {
            self.data(id).tag == sel
        }
    }

    fn class_attr_contains(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|v| v.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// First descendant of `from` (depth-first, document order) matching the
    /// selector.  `from` itself is not considered.
    pub fn query_selector(&self, from: NodeId, selector: &str) -> Option<NodeId> {
        for &child in &self.data(from).children {
            if self.matches(child, selector) {
                return Some(child);
            }
            if let Some(found) = self.query_selector(child, selector) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant matching the selector, document order.
    pub fn query_selector_all(&self, from: NodeId, selector: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_matches(from, selector, &mut out);
        out
    }

    fn collect_matches(&self, from: NodeId, selector: &str, out: &mut Vec<NodeId>) {
        for &child in &self.data(from).children {
            if self.matches(child, selector) {
                out.push(child);
            }
            self.collect_matches(child, selector, out);
        }
    }

    // ── Serialization ─────────────────────────────────────────────────────────

    /// Serialize the node (element + subtree) to markup text.
    pub fn markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    /// Serialize only the node's children.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.data(id).children {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let data = self.data(id);
        if data.tag == TEXT_TAG {
            out.push_str(&data.text);
            return;
        }
        let _ = write!(out, "<{}", data.tag);
        for (k, v) in &data.attrs {
            let _ = write!(out, " {}=\"{}\"", k, v);
        }
        if !data.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", data.classes.join(" "));
        }
        if data.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        for &child in &data.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
