//! Document - arena-backed element tree
//!
//! Owns the node arena and keeps the conventional `html > head + body`
//! scaffold unless built bare. Synthesis and relocation traverse the tree
//! exclusively through the accessors here.

use crate::node::{Node, NodeData};
use crate::selector::{self, SelectorError};
use crate::{ElementData, NodeId};

/// An element tree with document-order queries
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    document_element: NodeId,
    body: NodeId,
}

impl Document {
    /// Create a document with the conventional `html > head + body` scaffold.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.new_node(Node::element("html"));
        doc.attach(NodeId::DOCUMENT, html);
        doc.document_element = html;
        doc.append_element(html, "head");
        doc.body = doc.append_element(html, "body");
        doc
    }

    /// Create a document whose only element is a bare `<tag>` root.
    pub fn bare(tag: &str) -> Self {
        let mut doc = Self::empty();
        let root = doc.new_node(Node::element(tag));
        doc.attach(NodeId::DOCUMENT, root);
        doc.document_element = root;
        doc
    }

    fn empty() -> Self {
        Self {
            nodes: vec![Node::document()],
            document_element: NodeId::NONE,
            body: NodeId::NONE,
        }
    }

    fn new_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Link a detached node as `parent`'s last child.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        self.nodes[child.index()].parent = parent;
        self.nodes[child.index()].prev_sibling = last;
        match last.get() {
            Some(last) => self.nodes[last.index()].next_sibling = child,
            None => self.nodes[parent.index()].first_child = child,
        }
        self.nodes[parent.index()].last_child = child;
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a new element under `parent`, returning its id.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.new_node(Node::element(tag));
        self.attach(parent, id);
        id
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.new_node(Node::text(text.to_string()));
        self.attach(parent, id);
        id
    }

    /// Set an attribute, updating the id/class caches.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.nodes[node.index()].as_element_mut() {
            el.set_attr(name, value);
        }
    }

    /// Remove an attribute, updating the id/class caches.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.nodes[node.index()].as_element_mut() {
            el.remove_attr(name);
        }
    }

    /// Unlink `node` (with its subtree) from its parent.
    pub fn detach(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let n = &self.nodes[node.index()];
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if let Some(prev) = prev.get() {
            self.nodes[prev.index()].next_sibling = next;
        }
        if let Some(next) = next.get() {
            self.nodes[next.index()].prev_sibling = prev;
        }
        if let Some(parent) = parent.get() {
            if self.nodes[parent.index()].first_child == node {
                self.nodes[parent.index()].first_child = next;
            }
            if self.nodes[parent.index()].last_child == node {
                self.nodes[parent.index()].last_child = prev;
            }
        }
        let n = &mut self.nodes[node.index()];
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    /// Move `node` (detaching it first) to be `parent`'s last child.
    pub fn append(&mut self, parent: NodeId, node: NodeId) {
        self.detach(node);
        self.attach(parent, node);
    }

    /// Move `node` (detaching it first) to sit immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        let (parent, prev) = {
            let s = &self.nodes[sibling.index()];
            (s.parent, s.prev_sibling)
        };
        self.nodes[node.index()].parent = parent;
        self.nodes[node.index()].prev_sibling = prev;
        self.nodes[node.index()].next_sibling = sibling;
        self.nodes[sibling.index()].prev_sibling = node;
        match prev.get() {
            Some(prev) => self.nodes[prev.index()].next_sibling = node,
            None => {
                if let Some(parent) = parent.get() {
                    self.nodes[parent.index()].first_child = node;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Structure accessors
    // ------------------------------------------------------------------

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes in the arena (including detached ones).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// The outermost element (`html` for scaffolded documents).
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    /// The body-like container, when the document has one.
    pub fn body(&self) -> Option<NodeId> {
        self.body.get()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent.get()
    }

    /// Parent if it is an element (the document node is not).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        if self.is_element(parent) {
            Some(parent)
        } else {
            None
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(Node::is_element)
    }

    /// Element data, None for non-elements.
    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.get(node)?.as_element()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.element(node)?.id.as_deref()
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.element(node)
            .map(|e| e.classes.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    /// Iterate `parent`'s direct children.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Iterate `parent`'s direct element children.
    pub fn child_elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&c| self.is_element(c))
    }

    /// Nearest preceding sibling that is an element.
    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = self.get(node)?.prev_sibling;
        while let Some(id) = cur.get() {
            if self.is_element(id) {
                return Some(id);
            }
            cur = self.nodes[id.index()].prev_sibling;
        }
        None
    }

    /// Nearest following sibling that is an element.
    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = self.get(node)?.next_sibling;
        while let Some(id) = cur.get() {
            if self.is_element(id) {
                return Some(id);
            }
            cur = self.nodes[id.index()].next_sibling;
        }
        None
    }

    /// 1-based position of an element among its element siblings.
    pub fn element_index(&self, node: NodeId) -> Option<usize> {
        if !self.is_element(node) {
            return None;
        }
        let parent = self.parent(node)?;
        let mut i = 0;
        for child in self.children(parent) {
            if self.is_element(child) {
                i += 1;
            }
            if child == node {
                return Some(i);
            }
        }
        None
    }

    /// Whether `scope` is `node` itself or one of its ancestors.
    pub fn contains(&self, scope: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == scope {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Document-order iterator over `scope`'s descendants, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            scope,
            next: self.get(scope).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Every element in the document, in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(NodeId::DOCUMENT)
            .filter(|&n| self.is_element(n))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn query_selector_all(
        &self,
        selector: &str,
        scope: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        selector::query_all(self, selector, scope)
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector(
        &self,
        selector: &str,
        scope: NodeId,
    ) -> Result<Option<NodeId>, SelectorError> {
        selector::query_first(self, selector, scope)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's direct children.
pub struct Children<'a> {
    doc: &'a Document,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.get()?;
        self.next = self.doc.nodes[current.index()].next_sibling;
        Some(current)
    }
}

/// Preorder iterator over a subtree, excluding the subtree root.
pub struct Descendants<'a> {
    doc: &'a Document,
    scope: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.get()?;
        let node = &self.doc.nodes[current.index()];
        let mut follow = node.first_child;
        if follow == NodeId::NONE {
            let mut at = current;
            loop {
                if at == self.scope {
                    follow = NodeId::NONE;
                    break;
                }
                let n = &self.doc.nodes[at.index()];
                if n.next_sibling != NodeId::NONE {
                    follow = n.next_sibling;
                    break;
                }
                match n.parent.get() {
                    Some(parent) => at = parent,
                    None => {
                        follow = NodeId::NONE;
                        break;
                    }
                }
            }
        }
        self.next = follow;
        Some(current)
    }
}
