//! Rule configuration set - the fixed list of synthesis configurations
//! used to derive redundant, independently-built selectors for one node.
//!
//! Redundancy is the point: drift tolerance later means having more than
//! one way to re-find a node, so each configuration isolates a different
//! identity channel (id, stable attributes, single classes, bare tags).

use anchor_dom::{Document, NodeId};

use crate::config::SynthesisOptions;

/// Attribute names considered stable identity carriers. Attributes
/// outside this set never participate in matching.
pub const STABLE_ATTRIBUTES: &[&str] = &[
    "data-for",
    "data-id",
    "data-testid",
    "data-test-id",
    "for",
    "id",
    "name",
    "placeholder",
    "role",
];

fn is_stable_attribute(name: &str) -> bool {
    STABLE_ATTRIBUTES.contains(&name)
}

/// The ordered configuration list for `node`: the fixed set, then one
/// configuration per stable attribute, then one per class on the node
/// with that class isolated (the node's other classes rejected, ancestor
/// classes still eligible).
pub fn rule_configurations(doc: &Document, node: NodeId) -> Vec<SynthesisOptions> {
    let mut configs = vec![
        // id only
        SynthesisOptions::restrictive().with_id_eligible(|_| true),
        // tag + class + stable attribute
        SynthesisOptions::restrictive()
            .with_tag_eligible(|_| true)
            .with_class_eligible(|_| true)
            .with_attr_eligible(|name, _| is_stable_attribute(name)),
        // tag + class
        SynthesisOptions::restrictive()
            .with_tag_eligible(|_| true)
            .with_class_eligible(|_| true),
        // tag only
        SynthesisOptions::restrictive().with_tag_eligible(|_| true),
        // tag + stable attribute
        SynthesisOptions::restrictive()
            .with_tag_eligible(|_| true)
            .with_attr_eligible(|name, _| is_stable_attribute(name)),
    ];

    for attr in STABLE_ATTRIBUTES {
        configs.push(
            SynthesisOptions::restrictive()
                .with_tag_eligible(|_| true)
                .with_attr_eligible(move |name, _| name == *attr),
        );
    }

    let classes = doc.classes(node).to_vec();
    for class in &classes {
        let others: Vec<String> = classes.iter().filter(|c| *c != class).cloned().collect();
        configs.push(
            SynthesisOptions::restrictive()
                .with_class_eligible(move |name| !others.iter().any(|c| c == name)),
        );
    }

    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_configurations_plus_one_per_stable_attribute() {
        let doc = Document::new();
        let configs = rule_configurations(&doc, doc.document_element());
        assert_eq!(configs.len(), 5 + STABLE_ATTRIBUTES.len());
    }

    #[test]
    fn one_extra_configuration_per_class() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let node = doc.append_element(body, "div");
        doc.set_attribute(node, "class", "a b c");
        let configs = rule_configurations(&doc, node);
        assert_eq!(configs.len(), 5 + STABLE_ATTRIBUTES.len() + 3);
    }

    #[test]
    fn id_only_configuration_comes_first() {
        let doc = Document::new();
        let configs = rule_configurations(&doc, doc.document_element());
        let first = &configs[0];
        assert!((first.id_eligible)("anything"));
        assert!(!(first.tag_eligible)("div"));
        assert!(!(first.class_eligible)("card"));
    }

    #[test]
    fn class_isolation_rejects_sibling_classes_only() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let node = doc.append_element(body, "div");
        doc.set_attribute(node, "class", "keep drop");
        let configs = rule_configurations(&doc, node);

        // the configuration isolating "keep" rejects "drop" but accepts
        // names from elsewhere in the tree
        let isolating = &configs[configs.len() - 2];
        assert!((isolating.class_eligible)("keep"));
        assert!(!(isolating.class_eligible)("drop"));
        assert!((isolating.class_eligible)("ancestor-class"));
    }

    #[test]
    fn per_attribute_configuration_matches_exactly_one_name() {
        let doc = Document::new();
        let configs = rule_configurations(&doc, doc.document_element());
        // first per-attribute config targets STABLE_ATTRIBUTES[0]
        let cfg = &configs[5];
        assert!((cfg.attr_eligible)(STABLE_ATTRIBUTES[0], "x"));
        assert!(!(cfg.attr_eligible)(STABLE_ATTRIBUTES[1], "x"));
    }
}
