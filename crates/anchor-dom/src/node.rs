//! Tree nodes - compact arena representation
//!
//! Nodes carry sibling/child links as `NodeId` indices instead of
//! pointers, so the whole tree lives in one `Vec`.

use crate::NodeId;

/// A single tree node
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or the document node)
    pub(crate) parent: NodeId,
    /// First child
    pub(crate) first_child: NodeId,
    /// Last child (for O(1) append)
    pub(crate) last_child: NodeId,
    /// Previous sibling
    pub(crate) prev_sibling: NodeId,
    /// Next sibling
    pub(crate) next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a new element node
    pub(crate) fn element(tag: &str) -> Self {
        Self::new(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub(crate) fn text(content: String) -> Self {
        Self::new(NodeData::Text(content))
    }

    /// Create a document node
    pub(crate) fn document() -> Self {
        Self::new(NodeData::Document)
    }

    fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name, stored lowercase
    pub tag: String,
    /// Attributes in set order
    pub attrs: Vec<Attribute>,
    /// Cached id attribute; an empty id counts as absent
    pub id: Option<String>,
    /// Cached class list, document order, duplicates removed
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            id: None,
            classes: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, refreshing the id/class caches
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
        if name == "id" {
            self.id = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        } else if name == "class" {
            self.classes.clear();
            for part in value.split_ascii_whitespace() {
                if !self.classes.iter().any(|c| c == part) {
                    self.classes.push(part.to_string());
                }
            }
        }
    }

    /// Remove an attribute, refreshing the id/class caches
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
        if name == "id" {
            self.id = None;
        } else if name == "class" {
            self.classes.clear();
        }
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }
}

/// Attribute name/value pair
#[derive(Debug)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
