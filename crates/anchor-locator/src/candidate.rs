//! Candidate model - penalty-scored selector fragments
//!
//! A `Candidate` is one rendered fragment (`#id`, `[name="value"]`,
//! `.class`, `tag`, `*`) tied to a tree level; a path is a `Vec<Candidate>`
//! ordered target-first. Paths are transient search state, created and
//! discarded within one synthesis call.

/// One selector fragment with its specificity cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Rendered fragment, already escaped
    pub text: String,
    /// Specificity cost; lower is preferred
    pub penalty: f32,
    /// Tree level the fragment describes (0 = target)
    pub level: usize,
}

/// Penalty of an id fragment.
pub const PENALTY_ID: f32 = 0.0;
/// Penalty of an eligible-attribute fragment.
pub const PENALTY_ATTR: f32 = 0.5;
/// Penalty of a class fragment.
pub const PENALTY_CLASS: f32 = 1.0;
/// Penalty of a tag fragment.
pub const PENALTY_TAG: f32 = 2.0;
/// Penalty of the wildcard fragment.
pub const PENALTY_WILDCARD: f32 = 3.0;
/// Added by a `:nth-child` suffix.
pub const PENALTY_NTH: f32 = 1.0;

impl Candidate {
    pub fn new(text: String, penalty: f32, level: usize) -> Self {
        Self {
            text,
            penalty,
            level,
        }
    }

    /// This fragment with a positional qualifier appended.
    pub fn with_nth(&self, nth: usize) -> Self {
        Self {
            text: format!("{}:nth-child({nth})", self.text),
            penalty: self.penalty + PENALTY_NTH,
            level: self.level,
        }
    }
}

/// Total penalty of a path.
pub fn path_penalty(path: &[Candidate]) -> f32 {
    path.iter().map(|c| c.penalty).sum()
}

/// Render a path as a selector string, outermost fragment first.
///
/// Adjacent levels join with the child combinator; a level gap (left by
/// the optimization pass) becomes a descendant combinator.
pub fn render_path(path: &[Candidate]) -> String {
    let mut out = String::new();
    let mut prev_level: Option<usize> = None;
    for c in path.iter().rev() {
        if let Some(outer) = prev_level {
            if c.level + 1 == outer {
                out.push_str(" > ");
            } else {
                out.push(' ');
            }
        }
        out.push_str(&c.text);
        prev_level = Some(c.level);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(text: &str, penalty: f32, level: usize) -> Candidate {
        Candidate::new(text.to_string(), penalty, level)
    }

    #[test]
    fn nth_suffix_adds_one_to_penalty() {
        let c = cand("li", PENALTY_TAG, 0).with_nth(3);
        assert_eq!(c.text, "li:nth-child(3)");
        assert_eq!(c.penalty, PENALTY_TAG + PENALTY_NTH);
        assert_eq!(c.level, 0);
    }

    #[test]
    fn path_penalty_sums_members() {
        let path = vec![cand("#a", 0.0, 0), cand(".b", 1.0, 1), cand("div", 2.0, 2)];
        assert_eq!(path_penalty(&path), 3.0);
    }

    #[test]
    fn adjacent_levels_render_as_child_combinators() {
        let path = vec![cand("span", 2.0, 0), cand(".b", 1.0, 1), cand("#a", 0.0, 2)];
        assert_eq!(render_path(&path), "#a > .b > span");
    }

    #[test]
    fn level_gaps_render_as_descendant_combinators() {
        let path = vec![cand("span", 2.0, 0), cand("#a", 0.0, 3)];
        assert_eq!(render_path(&path), "#a span");
    }

    #[test]
    fn single_fragment_renders_alone() {
        assert_eq!(render_path(&[cand("#only", 0.0, 0)]), "#only");
    }
}
