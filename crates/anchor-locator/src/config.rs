//! Synthesis options - eligibility predicates and search budgets
//!
//! Predicates are boxed function values threaded through each call; no
//! module-level state, so concurrent synthesis calls over a read-only
//! tree never interfere.

use std::fmt;

use anchor_dom::NodeId;

/// Predicate over an id, class, or tag name.
pub type NamePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
/// Predicate over an attribute name/value pair.
pub type AttrPredicate = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Per-call configuration for [`synthesize`](crate::synthesize).
pub struct SynthesisOptions {
    /// Scope boundary; defaults to the body-like container when the
    /// document has one, else the document element.
    pub root: Option<NodeId>,
    /// Whether an id may contribute a candidate.
    pub id_eligible: NamePredicate,
    /// Whether a class name may contribute a candidate.
    pub class_eligible: NamePredicate,
    /// Whether a tag name may contribute a candidate.
    pub tag_eligible: NamePredicate,
    /// Whether an attribute name/value pair may contribute a candidate.
    pub attr_eligible: AttrPredicate,
    /// Minimum stacked levels before uniqueness may be declared.
    pub seed_min_length: usize,
    /// Minimum path length the optimization pass may shrink below.
    pub optimized_min_length: usize,
    /// Max combinations enumerated per search mode before escalating.
    pub threshold: usize,
    /// Optimization-pass attempt budget.
    pub max_tries: usize,
}

impl Default for SynthesisOptions {
    /// id/class/tag always eligible, attributes never.
    fn default() -> Self {
        Self {
            root: None,
            id_eligible: Box::new(|_| true),
            class_eligible: Box::new(|_| true),
            tag_eligible: Box::new(|_| true),
            attr_eligible: Box::new(|_, _| false),
            seed_min_length: 1,
            optimized_min_length: 2,
            threshold: 1000,
            max_tries: 10_000,
        }
    }
}

impl SynthesisOptions {
    /// Everything ineligible; the base rule configurations build on this.
    pub fn restrictive() -> Self {
        Self {
            id_eligible: Box::new(|_| false),
            class_eligible: Box::new(|_| false),
            tag_eligible: Box::new(|_| false),
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_id_eligible(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.id_eligible = Box::new(f);
        self
    }

    pub fn with_class_eligible(
        mut self,
        f: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.class_eligible = Box::new(f);
        self
    }

    pub fn with_tag_eligible(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.tag_eligible = Box::new(f);
        self
    }

    pub fn with_attr_eligible(
        mut self,
        f: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.attr_eligible = Box::new(f);
        self
    }

    pub fn with_seed_min_length(mut self, n: usize) -> Self {
        self.seed_min_length = n;
        self
    }

    pub fn with_optimized_min_length(mut self, n: usize) -> Self {
        self.optimized_min_length = n;
        self
    }

    pub fn with_threshold(mut self, n: usize) -> Self {
        self.threshold = n;
        self
    }

    pub fn with_max_tries(mut self, n: usize) -> Self {
        self.max_tries = n;
        self
    }
}

impl fmt::Debug for SynthesisOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisOptions")
            .field("root", &self.root)
            .field("seed_min_length", &self.seed_min_length)
            .field("optimized_min_length", &self.optimized_min_length)
            .field("threshold", &self.threshold)
            .field("max_tries", &self.max_tries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eligibility() {
        let opts = SynthesisOptions::default();
        assert!((opts.id_eligible)("main"));
        assert!((opts.class_eligible)("card"));
        assert!((opts.tag_eligible)("div"));
        assert!(!(opts.attr_eligible)("data-id", "7"));
        assert_eq!(opts.seed_min_length, 1);
        assert_eq!(opts.optimized_min_length, 2);
        assert_eq!(opts.threshold, 1000);
        assert_eq!(opts.max_tries, 10_000);
    }

    #[test]
    fn restrictive_rejects_everything() {
        let opts = SynthesisOptions::restrictive();
        assert!(!(opts.id_eligible)("main"));
        assert!(!(opts.class_eligible)("card"));
        assert!(!(opts.tag_eligible)("div"));
        assert!(!(opts.attr_eligible)("role", "tab"));
    }

    #[test]
    fn builder_overrides() {
        let opts = SynthesisOptions::restrictive()
            .with_tag_eligible(|_| true)
            .with_threshold(5);
        assert!((opts.tag_eligible)("p"));
        assert_eq!(opts.threshold, 5);
    }
}
