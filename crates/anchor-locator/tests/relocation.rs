//! Signature and relocation tests
//!
//! Round-trips on unmodified trees, tolerance scoring under drift,
//! recurrence collapse, and the sibling-aware tie-break.

use anchor_dom::{Document, NodeId};
use anchor_locator::{DEFAULT_PRECISION, SignatureNode, build_signature, relocate};

fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let node = doc.append_element(parent, tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value);
    }
    node
}

fn sig(selectors: &[&str], depth: usize, parent: Option<SignatureNode>) -> SignatureNode {
    SignatureNode {
        selectors: selectors.iter().map(|s| s.to_string()).collect(),
        depth,
        parent: parent.map(Box::new),
        previous_selectors: None,
        next_selectors: None,
    }
}

/// Chain of depth 8: html > body > div.zone-a > section > article > nav >
/// span > p#target. The `.zone-a` ancestor has no stable attribute and a
/// positional tag selector, so targeted drift can knock out every one of
/// its recorded selectors.
fn drift_fixture() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    el(&mut doc, body, "div", &[("class", "filler")]);
    let a = el(&mut doc, body, "div", &[("class", "zone-a")]);
    el(&mut doc, body, "div", &[("class", "filler2")]);
    let b = el(&mut doc, a, "section", &[("data-testid", "b")]);
    let c = el(&mut doc, b, "article", &[("data-testid", "c")]);
    let d = el(&mut doc, c, "nav", &[("data-testid", "d")]);
    let e = el(&mut doc, d, "span", &[("data-testid", "e")]);
    let target = el(&mut doc, e, "p", &[("data-testid", "buy"), ("id", "target")]);
    (doc, a, target)
}

/// Rename the ancestor's class and shift its position, so every selector
/// recorded for depth 3 misses while the rest of the chain still verifies.
fn apply_drift(doc: &mut Document, a: NodeId) {
    doc.set_attribute(a, "class", "zone-z");
    let body = doc.body().unwrap();
    let decoy = el(doc, body, "div", &[("class", "decoy")]);
    doc.insert_before(a, decoy);
}

#[test]
fn test_signature_round_trip_on_unmodified_tree() {
    let (doc, _, target) = drift_fixture();
    let scope = doc.document_element();
    let signature = build_signature(&doc, target).expect("target yields selectors");

    assert!(!signature.selectors.is_empty());
    for selector in &signature.selectors {
        assert_eq!(
            doc.query_selector_all(selector, scope).unwrap(),
            vec![target],
            "`{selector}` must resolve to the signed node"
        );
    }
    for precision in [0, DEFAULT_PRECISION, 10] {
        assert_eq!(relocate(&doc, &signature, scope, precision), Some(target));
    }
}

#[test]
fn test_signature_depths_grow_toward_the_target() {
    let (doc, _, target) = drift_fixture();
    let signature = build_signature(&doc, target).unwrap();

    // html(1) body(2) .zone-a(3) section(4) article(5) nav(6) span(7) p(8)
    assert_eq!(signature.max_depth(), 8);
    let mut depths = Vec::new();
    let mut cursor = Some(&signature);
    while let Some(node) = cursor {
        depths.push(node.depth);
        cursor = node.parent.as_deref();
    }
    assert_eq!(depths, vec![8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_signature_serialization_round_trip() {
    let (doc, _, target) = drift_fixture();
    let signature = build_signature(&doc, target).unwrap();

    let json = serde_json::to_string(&signature).unwrap();
    assert!(json.contains("selectors"));
    let back: SignatureNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, signature);
}

#[test]
fn test_drift_far_from_target_is_tolerated_at_low_precision() {
    let (mut doc, a, target) = drift_fixture();
    let signature = build_signature(&doc, target).unwrap();
    apply_drift(&mut doc, a);
    let scope = doc.document_element();

    // failed_depth 3 of max_depth 8: rate (3-1)/8*10 = 2.5
    for precision in 0..=2 {
        assert_eq!(
            relocate(&doc, &signature, scope, precision),
            Some(target),
            "precision {precision} should tolerate a near-root mismatch"
        );
    }
    for precision in 3..=10 {
        assert_eq!(
            relocate(&doc, &signature, scope, precision),
            None,
            "precision {precision} should reject the drifted chain"
        );
    }
}

#[test]
fn test_acceptance_is_monotonic_in_precision() {
    let (mut doc, a, target) = drift_fixture();
    let signature = build_signature(&doc, target).unwrap();
    apply_drift(&mut doc, a);
    let scope = doc.document_element();

    let mut accepted_before = true;
    for precision in 0..=10 {
        let accepted = relocate(&doc, &signature, scope, precision).is_some();
        assert!(
            accepted_before || !accepted,
            "tightening precision to {precision} must not create an acceptance"
        );
        accepted_before = accepted;
    }
}

#[test]
fn test_recurring_hits_collapse_to_the_majority_node() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = el(&mut doc, body, "div", &[("id", "a"), ("class", "x")]);
    el(&mut doc, body, "div", &[("id", "b")]);

    // two selectors converge on `a`, one points at `b`
    let signature = sig(&["#a", ".x", "#b"], 3, None);
    assert_eq!(
        relocate(&doc, &signature, doc.document_element(), 10),
        Some(a)
    );
}

#[test]
fn test_sibling_context_breaks_full_success_ties() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let section_1 = el(&mut doc, body, "section", &[]);
    el(&mut doc, section_1, "span", &[("class", "prev-1")]);
    let p1 = el(&mut doc, section_1, "p", &[]);
    let section_2 = el(&mut doc, body, "section", &[]);
    el(&mut doc, section_2, "span", &[("class", "prev-2")]);
    let p2 = el(&mut doc, section_2, "p", &[]);

    // "p" hits both candidates and "section" verifies both parents, so
    // only the recorded previous-sibling selector separates them
    for (stored, expected) in [(".prev-1", p1), (".prev-2", p2)] {
        let mut head = sig(&["p"], 4, Some(sig(&["section"], 3, None)));
        head.previous_selectors = Some(vec![stored.to_string()]);
        assert_eq!(
            relocate(&doc, &head, doc.document_element(), 10),
            Some(expected),
            "stored sibling `{stored}` should pick its twin"
        );
    }
}

#[test]
fn test_depth_gaps_realign_the_ancestor_walk() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = el(&mut doc, body, "div", &[("id", "a")]);
    let mid = el(&mut doc, a, "div", &[]);
    let target = el(&mut doc, mid, "p", &[("id", "t")]);

    // depth 4 (the unnamed middle div) contributed nothing at build time
    let signature = sig(&["#t"], 5, Some(sig(&["#a"], 3, None)));
    assert_eq!(
        relocate(&doc, &signature, doc.document_element(), 10),
        Some(target)
    );
    let _ = mid;
}

#[test]
fn test_empty_or_hopeless_signatures_relocate_to_none() {
    let (doc, _, _) = drift_fixture();
    let scope = doc.document_element();

    let empty = sig(&[], 1, None);
    assert_eq!(relocate(&doc, &empty, scope, 0), None);

    let hopeless = sig(&["#no-such-node"], 1, None);
    assert_eq!(relocate(&doc, &hopeless, scope, 0), None);
}

#[test]
fn test_unparsable_stored_selectors_are_skipped() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let a = el(&mut doc, body, "div", &[("id", "a")]);

    // a selector from a richer dialect no longer parses; the rest works
    let signature = sig(&["div:hover", "#a"], 3, None);
    assert_eq!(
        relocate(&doc, &signature, doc.document_element(), 10),
        Some(a)
    );
}

#[test]
fn test_build_signature_rejects_non_elements() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let text = doc.append_text(body, "plain");
    assert!(build_signature(&doc, text).is_none());
    assert!(build_signature(&doc, doc.root()).is_none());
}

#[test]
fn test_signature_for_every_node_relocates_on_unmodified_tree() {
    let (doc, _, _) = drift_fixture();
    let scope = doc.document_element();
    for node in doc.descendants(doc.body().unwrap()).collect::<Vec<_>>() {
        if !doc.is_element(node) {
            continue;
        }
        let signature = build_signature(&doc, node)
            .unwrap_or_else(|| panic!("no signature for {:?}", doc.tag(node)));
        assert_eq!(
            relocate(&doc, &signature, scope, 10),
            Some(node),
            "relocation must round-trip for {:?}",
            doc.tag(node)
        );
    }
}
