//! Synthesize a selector for a node, let the page drift, relocate it.
//!
//! Run with `RUST_LOG=anchor_locator=debug` to watch the search and the
//! relocation scoring.

use anchor_dom::{Document, NodeId};
use anchor_locator::{DEFAULT_PRECISION, SynthesisOptions, build_signature, relocate, synthesize};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let node = doc.append_element(parent, tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value);
    }
    node
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // a small product page
    let mut doc = Document::new();
    let body = doc.body().context("scaffolded document has a body")?;
    let main = el(&mut doc, body, "main", &[("class", "content")]);
    let grid = el(&mut doc, main, "section", &[("class", "grid")]);
    for i in 1..=3 {
        let card = el(&mut doc, grid, "div", &[("class", "card")]);
        let title = el(&mut doc, card, "h2", &[]);
        doc.append_text(title, &format!("Product {i}"));
        el(
            &mut doc,
            card,
            "button",
            &[("class", "buy"), ("data-testid", &format!("buy-{i}"))],
        );
    }
    let target = doc
        .query_selector(r#"[data-testid="buy-2"]"#, body)?
        .context("fixture has the target button")?;

    let options = SynthesisOptions::default()
        .with_attr_eligible(|name, _| name.starts_with("data-"));
    let selector = synthesize(&doc, target, &options)?;
    println!("synthesized: {selector}");

    let signature = build_signature(&doc, target).context("target yields a signature")?;
    println!(
        "signature: {} selectors at depth {}",
        signature.selectors.len(),
        signature.max_depth()
    );

    // the page drifts: the grid is restyled and the button loses its test id
    doc.set_attribute(grid, "class", "dense-grid");
    doc.remove_attribute(target, "data-testid");

    let root = doc.document_element();
    for precision in [0, DEFAULT_PRECISION, 10] {
        match relocate(&doc, &signature, root, precision) {
            Some(found) => println!(
                "precision {precision}: relocated <{}> (same node: {})",
                doc.tag(found).unwrap_or("?"),
                found == target
            ),
            None => println!("precision {precision}: no confident match"),
        }
    }

    Ok(())
}
