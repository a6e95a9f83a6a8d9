//! anchor-locator - unique selector synthesis and drift-tolerant relocation
//!
//! Two coupled engines over an element tree:
//!
//! - [`synthesize`] produces the shortest, cheapest selector matching
//!   exactly one node within a scope, via bottom-up combinatorial search
//!   with penalty scoring, capped enumeration, and a shortening pass.
//! - [`build_signature`] runs synthesis under every [rule
//!   configuration](rule_configurations) at a node and each of its
//!   ancestors, producing a redundant [`SignatureNode`] chain; later,
//!   [`relocate`] replays that chain against a structurally drifted tree
//!   and recovers the best-matching current node under a 0-10 precision
//!   tolerance.
//!
//! Signatures are plain serializable data; callers persist them however
//! they like and present them back unmodified.
//!
//! ```
//! use anchor_locator::{build_signature, relocate, synthesize, SynthesisOptions};
//!
//! let mut doc = anchor_locator::dom::Document::new();
//! let body = doc.body().unwrap();
//! let card = doc.append_element(body, "div");
//! doc.set_attribute(card, "id", "card-7");
//!
//! let selector = synthesize(&doc, card, &SynthesisOptions::default()).unwrap();
//! assert_eq!(selector, "#card-7");
//!
//! let signature = build_signature(&doc, card).unwrap();
//! doc.set_attribute(card, "id", "card-8"); // drift
//! assert_eq!(relocate(&doc, &signature, doc.document_element(), 5), Some(card));
//! ```

pub use anchor_dom as dom;

mod candidate;
mod config;
mod error;
mod relocate;
mod rules;
mod signature;
mod synth;

pub use candidate::{Candidate, path_penalty, render_path};
pub use config::{AttrPredicate, NamePredicate, SynthesisOptions};
pub use error::LocatorError;
pub use relocate::{DEFAULT_PRECISION, relocate};
pub use rules::{STABLE_ATTRIBUTES, rule_configurations};
pub use signature::{SignatureNode, build_signature};
pub use synth::synthesize;
