//! anchor-dom - Element tree and query collaborator
//!
//! Arena-backed element tree plus the selector dialect that selector
//! synthesis emits and relocation replays: type/id/class/attribute
//! fragments, integer `:nth-child`, descendant and child combinators.

mod document;
mod escape;
mod node;
mod selector;

pub use document::{Children, Descendants, Document};
pub use escape::{escape_attribute_value, escape_identifier};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use selector::{
    AttrSelector, Combinator, ComplexSelector, CompoundSelector, Selector, SelectorError,
};

/// Node identifier (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document node (arena slot 0)
    pub const DOCUMENT: NodeId = NodeId(0);
    /// Absent-link sentinel
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    /// Arena slot index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn get(self) -> Option<NodeId> {
        if self == Self::NONE { None } else { Some(self) }
    }
}
