//! Signature builder - redundant multi-selector descriptions of a node
//!
//! Runs synthesis once per rule configuration at the target and at every
//! ancestor, collecting the distinct results into a chain the relocation
//! engine can verify later. Individual configuration failures are
//! swallowed; redundancy across the survivors is what buys drift
//! tolerance.

use anchor_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::rule_configurations;
use crate::synth::synthesize;

/// One link in a signature chain: the selectors independently derived
/// for a tree position, plus optional sibling context.
///
/// Depths are assigned root-ward: the root-most link carries the
/// smallest depth, the target the largest. A position that yielded no
/// selectors is skipped, leaving a depth gap the relocation walk
/// realigns on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureNode {
    /// Deduplicated selectors in rule-configuration order (id-like first)
    pub selectors: Vec<String>,
    /// Tree-position depth (target = largest)
    pub depth: usize,
    /// Link toward the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<SignatureNode>>,
    /// The previous element sibling's own selector list, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_selectors: Option<Vec<String>>,
    /// The next element sibling's own selector list, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_selectors: Option<Vec<String>>,
}

impl SignatureNode {
    /// The target's own recorded depth, the chain's largest.
    pub fn max_depth(&self) -> usize {
        self.depth
    }
}

/// Build a signature for `node`: one chain link per ancestor position
/// that yielded at least one selector. Returns `None` when even the
/// target yields nothing.
pub fn build_signature(doc: &Document, node: NodeId) -> Option<SignatureNode> {
    if !doc.is_element(node) {
        return None;
    }

    // real chain, target first, up through the document element
    let mut chain = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        chain.push(n);
        current = doc.parent_element(n);
    }
    let len = chain.len();

    let mut entries = Vec::with_capacity(len);
    for (i, &n) in chain.iter().enumerate() {
        let selectors = collect_selectors(doc, n);
        if i == 0 && selectors.is_empty() {
            return None;
        }
        let (previous_selectors, next_selectors) = if selectors.is_empty() {
            (None, None)
        } else {
            (
                sibling_selectors(doc, doc.previous_element_sibling(n)),
                sibling_selectors(doc, doc.next_element_sibling(n)),
            )
        };
        // position i sits at depth len - i; skipped positions still
        // consume their slot
        entries.push((selectors, len - i, previous_selectors, next_selectors));
    }

    // fold root-most first so each link can own its parent
    let mut parent: Option<Box<SignatureNode>> = None;
    for (selectors, depth, previous_selectors, next_selectors) in entries.into_iter().rev() {
        if selectors.is_empty() {
            continue;
        }
        parent = Some(Box::new(SignatureNode {
            selectors,
            depth,
            parent: parent.take(),
            previous_selectors,
            next_selectors,
        }));
    }
    parent.map(|boxed| *boxed)
}

/// Every rule configuration's selector for `node`, deduplicated in first
/// occurrence order. Scope is the document element so the selectors stay
/// valid wherever the caller later relocates from.
fn collect_selectors(doc: &Document, node: NodeId) -> Vec<String> {
    let scope = doc.document_element();
    let mut selectors = Vec::new();
    for config in rule_configurations(doc, node) {
        match synthesize(doc, node, &config.with_root(scope)) {
            Ok(selector) => {
                if !selectors.contains(&selector) {
                    selectors.push(selector);
                }
            }
            Err(err) => {
                debug!(%err, "configuration contributed no selector");
            }
        }
    }
    selectors
}

fn sibling_selectors(doc: &Document, sibling: Option<NodeId>) -> Option<Vec<String>> {
    let selectors = collect_selectors(doc, sibling?);
    if selectors.is_empty() {
        None
    } else {
        Some(selectors)
    }
}
