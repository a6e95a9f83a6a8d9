//! Relocation engine - drift-tolerant recovery of a signed node
//!
//! Replays a signature's leaf selectors against a live (possibly
//! mutated) tree, collapses recurring hits, verifies each candidate's
//! real ancestor chain against the recorded one in lockstep, and scores
//! partial agreement against the caller's precision bar. Never errors:
//! drift is the expected case, so every failure mode is `None`.

use anchor_dom::{Document, NodeId};
use tracing::debug;

use crate::signature::SignatureNode;

/// Default precision, mid-scale.
pub const DEFAULT_PRECISION: u8 = 5;

/// Find the best current match for `signature` inside `root`.
///
/// `precision` runs 0-10: 10 demands a (near-)complete ancestor-chain
/// match, 0 accepts almost any leaf-selector hit.
pub fn relocate(
    doc: &Document,
    signature: &SignatureNode,
    root: NodeId,
    precision: u8,
) -> Option<NodeId> {
    if signature.selectors.is_empty() {
        return None;
    }

    // multiset of leaf hits: no dedup, recurrence is signal
    let mut hits: Vec<NodeId> = Vec::new();
    for selector in &signature.selectors {
        match doc.query_selector_all(selector, root) {
            Ok(matches) => hits.extend(matches),
            Err(err) => debug!(%selector, %err, "stored selector no longer parses"),
        }
    }
    if hits.is_empty() {
        return None;
    }

    let candidates = collapse_recurring(&hits);
    debug!(
        hits = hits.len(),
        candidates = candidates.len(),
        "relocation candidate set"
    );

    let max_depth = signature.max_depth();
    let mut full_successes: Vec<NodeId> = Vec::new();
    let mut best: Option<(NodeId, usize)> = None;
    for &candidate in &candidates {
        let failed_depth = verify_chain(doc, signature, candidate, root, false);
        if failed_depth == 0 {
            full_successes.push(candidate);
        } else if best.is_none_or(|(_, depth)| failed_depth > depth) {
            best = Some((candidate, failed_depth));
        }
    }

    match full_successes.len() {
        1 => return Some(full_successes[0]),
        0 => {}
        _ => return Some(break_tie(doc, signature, &full_successes, root)),
    }

    // no full success: tolerate a root-ward mismatch only if it sits far
    // enough from the target for the requested precision
    let (candidate, failed_depth) = best?;
    let rate = ((failed_depth as f32 - 1.0) / max_depth as f32) * 10.0;
    debug!(failed_depth, max_depth, rate, precision, "partial match");
    if rate >= f32::from(precision) {
        Some(candidate)
    } else {
        None
    }
}

/// When any node recurs in the hit multiset, independently derived
/// selectors converged on it; collapse to the most frequent (first seen
/// among equals). Otherwise keep all distinct hits in first-seen order.
fn collapse_recurring(hits: &[NodeId]) -> Vec<NodeId> {
    let mut counts: Vec<(NodeId, usize)> = Vec::new();
    for &hit in hits {
        match counts.iter_mut().find(|(n, _)| *n == hit) {
            Some((_, count)) => *count += 1,
            None => counts.push((hit, 1)),
        }
    }
    if counts.iter().any(|&(_, count)| count > 1) {
        // strictly-greater replacement keeps the first seen among equals
        let mut winner = counts[0];
        for &entry in &counts[1..] {
            if entry.1 > winner.1 {
                winner = entry;
            }
        }
        vec![winner.0]
    } else {
        counts.into_iter().map(|(n, _)| n).collect()
    }
}

/// Walk the candidate's real ancestors against the signature chain in
/// lockstep, returning the root-most depth that failed to verify
/// (0 = every level matched).
///
/// The walk stops, never mismatching, at the relocation root, the
/// document element, or the body-like container: ancestors at or above
/// those carry no discriminating signal. Depth gaps in the signature
/// (positions skipped at build time) advance only the real cursor.
fn verify_chain(
    doc: &Document,
    signature: &SignatureNode,
    candidate: NodeId,
    root: NodeId,
    with_siblings: bool,
) -> usize {
    let mut failed_depth = 0;

    if with_siblings && !siblings_match(doc, signature, candidate, root) {
        failed_depth = signature.depth;
    }

    let mut sig = signature.parent.as_deref();
    let mut real = doc.parent_element(candidate);
    let mut expected_depth = signature.depth.saturating_sub(1);
    while let (Some(s), Some(r)) = (sig, real) {
        if r == root || r == doc.document_element() || Some(r) == doc.body() {
            break;
        }
        if s.depth == expected_depth {
            let mut ok = selectors_contain(doc, &s.selectors, r, root);
            if ok && with_siblings {
                ok = siblings_match(doc, s, r, root);
            }
            if !ok {
                // overwrite: the final value is the root-most mismatch
                failed_depth = s.depth;
            }
            sig = s.parent.as_deref();
        }
        real = doc.parent_element(r);
        expected_depth = expected_depth.saturating_sub(1);
    }
    failed_depth
}

/// Whether `node` is among the union of the selectors' matches.
fn selectors_contain(doc: &Document, selectors: &[String], node: NodeId, root: NodeId) -> bool {
    for selector in selectors {
        match doc.query_selector_all(selector, root) {
            Ok(matches) if matches.contains(&node) => return true,
            Ok(_) => {}
            Err(err) => debug!(%selector, %err, "stored selector no longer parses"),
        }
    }
    false
}

/// Sibling context check for one chain level: a missing stored list is
/// an automatic pass, a stored list with no such real sibling is not.
fn siblings_match(doc: &Document, sig: &SignatureNode, node: NodeId, root: NodeId) -> bool {
    side_matches(
        doc,
        sig.previous_selectors.as_deref(),
        doc.previous_element_sibling(node),
        root,
    ) && side_matches(
        doc,
        sig.next_selectors.as_deref(),
        doc.next_element_sibling(node),
        root,
    )
}

fn side_matches(
    doc: &Document,
    stored: Option<&[String]>,
    sibling: Option<NodeId>,
    root: NodeId,
) -> bool {
    match stored {
        None => true,
        Some(selectors) => match sibling {
            Some(node) => selectors_contain(doc, selectors, node, root),
            None => false,
        },
    }
}

/// Sibling-aware re-verification over tied full successes: first
/// candidate passing the stricter walk wins, else the one failing
/// closest to the target.
fn break_tie(
    doc: &Document,
    signature: &SignatureNode,
    candidates: &[NodeId],
    root: NodeId,
) -> NodeId {
    let mut best = (candidates[0], 0usize);
    for &candidate in candidates {
        let failed_depth = verify_chain(doc, signature, candidate, root, true);
        if failed_depth == 0 {
            return candidate;
        }
        if failed_depth > best.1 {
            best = (candidate, failed_depth);
        }
    }
    best.0
}
