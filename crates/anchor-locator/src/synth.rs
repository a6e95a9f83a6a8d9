//! Selector synthesis - bottom-up combinatorial search
//!
//! Walks from the target toward the scope root, stacking penalty-scored
//! candidate groups per level, and scans the Cartesian product of the
//! stack (cheapest paths first) for the first one the query engine
//! resolves to exactly the target. Three search modes of decreasing
//! breadth bound the combinatorics; a final pass tries to drop interior
//! levels from the found path.

use std::collections::HashSet;

use anchor_dom::{Document, NodeId, escape_attribute_value, escape_identifier};
use tracing::{debug, trace, warn};

use crate::candidate::{
    Candidate, PENALTY_ATTR, PENALTY_CLASS, PENALTY_ID, PENALTY_TAG, PENALTY_WILDCARD,
    path_penalty, render_path,
};
use crate::config::SynthesisOptions;
use crate::error::LocatorError;

/// Search breadth, escalated `All` -> `Two` -> `One` when a mode's
/// combination count blows past the threshold or exhausts without a
/// unique path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Full candidate groups, nth-qualified twins added.
    All,
    /// One candidate per level, plus its nth-qualified twin.
    Two,
    /// One candidate per level, replaced by its nth-qualified form.
    One,
}

/// Synthesize the cheapest selector matching exactly `node` within the
/// configured scope.
pub fn synthesize(
    doc: &Document,
    node: NodeId,
    options: &SynthesisOptions,
) -> Result<String, LocatorError> {
    if !doc.is_element(node) {
        return Err(LocatorError::InvalidInput(
            "synthesis target is not an element".to_string(),
        ));
    }
    // terminal case: the outermost element is its own selector
    if node == doc.document_element() {
        let tag = doc.tag(node).unwrap_or("*");
        return Ok(escape_identifier(tag));
    }
    let root = options
        .root
        .or(doc.body())
        .unwrap_or(doc.document_element());
    if !doc.contains(root, node) {
        return Err(LocatorError::InvalidInput(
            "synthesis target is outside the scope root".to_string(),
        ));
    }
    // scope queries exclude the scope root itself
    if node == root {
        return Err(LocatorError::NotFound);
    }

    let search = Search {
        doc,
        node,
        root,
        options,
    };
    for mode in [Mode::All, Mode::Two, Mode::One] {
        if let Some(seed) = search.bottom_up(mode)? {
            let best = search.optimize(seed)?;
            return Ok(render_path(&best));
        }
        debug!(?mode, "search mode exhausted, escalating");
    }
    Err(LocatorError::NotFound)
}

/// Per-call search state; discarded on return.
struct Search<'a> {
    doc: &'a Document,
    node: NodeId,
    root: NodeId,
    options: &'a SynthesisOptions,
}

enum Scan {
    /// Unique path found.
    Found(Vec<Candidate>),
    /// Combination count over threshold; abandon this mode.
    Exceeded,
    /// Every combination scanned, none unique.
    Exhausted,
}

impl Search<'_> {
    /// Walk from the target up through the scope root, scanning the
    /// stacked candidate groups after each level.
    fn bottom_up(&self, mode: Mode) -> Result<Option<Vec<Candidate>>, LocatorError> {
        let mut stack: Vec<Vec<Candidate>> = Vec::new();
        let mut level = 0;
        let mut current = Some(self.node);
        while let Some(n) = current {
            stack.push(self.level_candidates(n, level, mode));
            if stack.len() >= self.options.seed_min_length {
                match self.scan_stack(&stack)? {
                    Scan::Found(path) => return Ok(Some(path)),
                    Scan::Exceeded => return Ok(None),
                    Scan::Exhausted => {}
                }
            }
            if n == self.root {
                break;
            }
            current = self.doc.parent_element(n);
            level += 1;
        }
        // if the seed gate kept every scan from running, try the full stack once
        if stack.len() < self.options.seed_min_length {
            if let Scan::Found(path) = self.scan_stack(&stack)? {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Candidate group for one tree level under the given mode, penalty
    /// ascending.
    fn level_candidates(&self, n: NodeId, level: usize, mode: Mode) -> Vec<Candidate> {
        let mut group = self.base_candidates(n, level);
        let nth = self.doc.element_index(n);
        match mode {
            Mode::All | Mode::Two => {
                if mode == Mode::Two {
                    group.truncate(1);
                }
                if let Some(nth) = nth {
                    let twins: Vec<Candidate> = group
                        .iter()
                        .filter(|c| self.dispensable(c))
                        .map(|c| c.with_nth(nth))
                        .collect();
                    group.extend(twins);
                }
            }
            Mode::One => {
                group.truncate(1);
                if let Some(nth) = nth {
                    if group.first().is_some_and(|c| self.dispensable(c)) {
                        group[0] = group[0].with_nth(nth);
                    }
                }
            }
        }
        group.sort_by(|a, b| a.penalty.total_cmp(&b.penalty));
        group
    }

    /// First non-empty fragment group in priority order: id, attributes,
    /// classes, tag, wildcard.
    fn base_candidates(&self, n: NodeId, level: usize) -> Vec<Candidate> {
        let opts = self.options;
        if let Some(id) = self.doc.id(n) {
            if (opts.id_eligible)(id) {
                let text = format!("#{}", escape_identifier(id));
                return vec![Candidate::new(text, PENALTY_ID, level)];
            }
        }
        if let Some(el) = self.doc.element(n) {
            let attrs: Vec<Candidate> = el
                .attrs
                .iter()
                .filter(|a| (opts.attr_eligible)(&a.name, &a.value))
                .map(|a| {
                    let text = format!(
                        "[{}=\"{}\"]",
                        escape_identifier(&a.name),
                        escape_attribute_value(&a.value)
                    );
                    Candidate::new(text, PENALTY_ATTR, level)
                })
                .collect();
            if !attrs.is_empty() {
                return attrs;
            }
        }
        let classes: Vec<Candidate> = self
            .doc
            .classes(n)
            .iter()
            .filter(|c| (opts.class_eligible)(c))
            .map(|c| Candidate::new(format!(".{}", escape_identifier(c)), PENALTY_CLASS, level))
            .collect();
        if !classes.is_empty() {
            return classes;
        }
        if let Some(tag) = self.doc.tag(n) {
            if (opts.tag_eligible)(tag) {
                return vec![Candidate::new(
                    escape_identifier(tag),
                    PENALTY_TAG,
                    level,
                )];
            }
        }
        vec![Candidate::new("*".to_string(), PENALTY_WILDCARD, level)]
    }

    /// Whether a fragment may take a redundant positional qualifier:
    /// the document element's tag name and id fragments are already
    /// maximally specific.
    fn dispensable(&self, c: &Candidate) -> bool {
        !c.text.starts_with('#') && Some(c.text.as_str()) != self.doc.tag(self.doc.document_element())
    }

    /// Scan the stack's Cartesian product, cheapest paths first, for one
    /// the query engine resolves to exactly the target.
    fn scan_stack(&self, stack: &[Vec<Candidate>]) -> Result<Scan, LocatorError> {
        match product_size(stack) {
            Some(size) if size <= self.options.threshold => {}
            _ => {
                debug!(
                    levels = stack.len(),
                    threshold = self.options.threshold,
                    "combination count over threshold"
                );
                return Ok(Scan::Exceeded);
            }
        }
        let mut paths: Vec<Vec<Candidate>> = Combinations::new(stack).collect();
        paths.sort_by(|a, b| path_penalty(a).total_cmp(&path_penalty(b)));
        for path in paths {
            if self.is_unique_target(&path)? {
                return Ok(Scan::Found(path));
            }
        }
        Ok(Scan::Exhausted)
    }

    /// True when the rendered path matches exactly the target in scope.
    /// Zero matches means the tree and the query engine disagree.
    fn is_unique_target(&self, path: &[Candidate]) -> Result<bool, LocatorError> {
        let rendered = render_path(path);
        let matches = self.doc.query_selector_all(&rendered, self.root)?;
        match matches.len() {
            0 => {
                warn!(selector = %rendered, "derived selector matched nothing");
                Err(LocatorError::Inconsistent { selector: rendered })
            }
            1 => Ok(matches[0] == self.node),
            n => {
                trace!(selector = %rendered, matches = n, "path not unique");
                Ok(false)
            }
        }
    }

    /// Try removing interior levels from the seed path, keeping every
    /// reduction that still resolves uniquely to the target; return the
    /// cheapest. Bounded by `max_tries`, memoized on rendered strings.
    fn optimize(&self, seed: Vec<Candidate>) -> Result<Vec<Candidate>, LocatorError> {
        let opts = self.options;
        let mut results: Vec<Vec<Candidate>> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut tries = 0usize;
        let mut work = vec![seed.clone()];
        'budget: while let Some(path) = work.pop() {
            if path.len() <= 2 || path.len() <= opts.optimized_min_length {
                continue;
            }
            // never the leaf, never the outermost
            for i in 1..path.len() - 1 {
                if tries >= opts.max_tries {
                    debug!(tries, "optimization budget exhausted");
                    break 'budget;
                }
                let mut reduced = path.clone();
                reduced.remove(i);
                if !visited.insert(render_path(&reduced)) {
                    continue;
                }
                tries += 1;
                if self.is_unique_target(&reduced)? {
                    results.push(reduced.clone());
                    work.push(reduced);
                }
            }
        }
        debug!(tries, reductions = results.len(), "optimization pass done");
        if results.is_empty() {
            return Ok(seed);
        }
        results.sort_by(|a, b| {
            path_penalty(a)
                .total_cmp(&path_penalty(b))
                .then(a.len().cmp(&b.len()))
        });
        Ok(results.swap_remove(0))
    }
}

/// Cartesian-product size of the stacked groups; `None` on overflow.
fn product_size(stack: &[Vec<Candidate>]) -> Option<usize> {
    stack
        .iter()
        .try_fold(1usize, |acc, group| acc.checked_mul(group.len()))
}

/// Lazy odometer over the per-level candidate groups; yields full-stack
/// paths one at a time so the threshold cutoff bounds memory as well as
/// time.
struct Combinations<'a> {
    stack: &'a [Vec<Candidate>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(stack: &'a [Vec<Candidate>]) -> Self {
        Self {
            stack,
            indices: vec![0; stack.len()],
            done: stack.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<Candidate>;

    fn next(&mut self) -> Option<Vec<Candidate>> {
        if self.done {
            return None;
        }
        let path: Vec<Candidate> = self
            .indices
            .iter()
            .zip(self.stack)
            .map(|(&i, group)| group[i].clone())
            .collect();
        // advance the odometer, leaf level fastest
        self.done = true;
        for (slot, group) in self.indices.iter_mut().zip(self.stack) {
            *slot += 1;
            if *slot < group.len() {
                self.done = false;
                break;
            }
            *slot = 0;
        }
        Some(path)
    }
}
