//! Selector parsing and matching
//!
//! Hand-rolled parser for the dialect synthesis emits. Matching walks
//! right-to-left: the rightmost compound is tested against the candidate
//! node, then combinators climb the ancestor chain.

use std::fmt;

use crate::{Document, NodeId};

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("selector parse error at {position}: {message}")]
    Parse { message: String, position: usize },
    #[error("unsupported selector feature: {feature}")]
    Unsupported { feature: String },
}

/// One compound step; every constraint must hold on a single node.
#[derive(Debug, Clone, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub universal: bool,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
    /// 1-based position among element siblings
    pub nth_child: Option<usize>,
}

/// `[name]` or `[name="value"]`
#[derive(Debug, Clone)]
pub struct AttrSelector {
    pub name: String,
    pub value: Option<String>,
}

/// Relation between a compound and the compound to its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Compounds in source order; entry 0 carries no combinator.
#[derive(Debug, Clone)]
pub struct ComplexSelector {
    pub parts: Vec<(Option<Combinator>, CompoundSelector)>,
}

/// A parsed selector group (comma-separated complex selectors).
#[derive(Debug, Clone)]
pub struct Selector {
    pub complexes: Vec<ComplexSelector>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut p = Parser::new(input);
        let mut complexes = Vec::new();
        loop {
            complexes.push(p.parse_complex()?);
            p.skip_whitespace();
            if !p.eat(',') {
                break;
            }
        }
        if !p.at_end() {
            return Err(p.error("unexpected trailing input"));
        }
        Ok(Self { complexes })
    }

    /// Whether `node` matches any complex in the group.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.complexes.iter().any(|cx| matches_complex(doc, node, cx))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cx) in self.complexes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            for (combinator, compound) in &cx.parts {
                match combinator {
                    None => {}
                    Some(Combinator::Child) => write!(f, " > ")?,
                    Some(Combinator::Descendant) => write!(f, " ")?,
                }
                write!(f, "{compound}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.universal {
            write!(f, "*")?;
        }
        if let Some(tag) = &self.tag {
            write!(f, "{tag}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attrs {
            match &attr.value {
                Some(v) => write!(f, "[{}=\"{}\"]", attr.name, v)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        if let Some(nth) = self.nth_child {
            write!(f, ":nth-child({nth})")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Querying
// ----------------------------------------------------------------------

/// All descendants of `scope` matching `selector`, in document order.
pub(crate) fn query_all(
    doc: &Document,
    selector: &str,
    scope: NodeId,
) -> Result<Vec<NodeId>, SelectorError> {
    let parsed = Selector::parse(selector)?;
    let mut out = Vec::new();
    for node in doc.descendants(scope) {
        if doc.is_element(node) && parsed.matches(doc, node) {
            out.push(node);
        }
    }
    tracing::trace!(selector, matches = out.len(), "query");
    Ok(out)
}

pub(crate) fn query_first(
    doc: &Document,
    selector: &str,
    scope: NodeId,
) -> Result<Option<NodeId>, SelectorError> {
    let parsed = Selector::parse(selector)?;
    for node in doc.descendants(scope) {
        if doc.is_element(node) && parsed.matches(doc, node) {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

fn matches_complex(doc: &Document, node: NodeId, complex: &ComplexSelector) -> bool {
    if complex.parts.is_empty() {
        return false;
    }
    matches_from(doc, node, &complex.parts, complex.parts.len() - 1)
}

/// Match `parts[idx]` at `node`, then climb leftward per the combinator.
fn matches_from(
    doc: &Document,
    node: NodeId,
    parts: &[(Option<Combinator>, CompoundSelector)],
    idx: usize,
) -> bool {
    if !matches_compound(doc, node, &parts[idx].1) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match parts[idx].0 {
        Some(Combinator::Child) | None => match doc.parent_element(node) {
            Some(parent) => matches_from(doc, parent, parts, idx - 1),
            None => false,
        },
        Some(Combinator::Descendant) => {
            let mut cur = doc.parent_element(node);
            while let Some(ancestor) = cur {
                if matches_from(doc, ancestor, parts, idx - 1) {
                    return true;
                }
                cur = doc.parent_element(ancestor);
            }
            false
        }
    }
}

fn matches_compound(doc: &Document, node: NodeId, c: &CompoundSelector) -> bool {
    let Some(el) = doc.element(node) else {
        return false;
    };
    if let Some(tag) = &c.tag {
        if el.tag != *tag {
            return false;
        }
    }
    if let Some(id) = &c.id {
        if el.id.as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    for class in &c.classes {
        if !el.has_class(class) {
            return false;
        }
    }
    for attr in &c.attrs {
        match el.attr(&attr.name) {
            None => return false,
            Some(actual) => {
                if let Some(expected) = &attr.value {
                    if actual != expected {
                        return false;
                    }
                }
            }
        }
    }
    if let Some(nth) = c.nth_child {
        if doc.element_index(node) != Some(nth) {
            return false;
        }
    }
    true
}

// ----------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, message: &str) -> SelectorError {
        SelectorError::Parse {
            message: message.to_string(),
            position: self.pos,
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_whitespace();
        let first = self.parse_compound()?;
        let mut parts = vec![(None, first)];
        loop {
            let ws = self.skip_whitespace();
            if self.at_end() || self.peek() == Some(',') {
                break;
            }
            let combinator = if self.eat('>') {
                self.skip_whitespace();
                Combinator::Child
            } else if ws {
                Combinator::Descendant
            } else {
                return Err(self.error("expected combinator or end of selector"));
            };
            let compound = self.parse_compound()?;
            parts.push((Some(combinator), compound));
        }
        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut c = CompoundSelector::default();
        let mut any = false;
        if self.eat('*') {
            c.universal = true;
            any = true;
        } else if self.at_identifier_start() {
            c.tag = Some(self.parse_identifier()?.to_ascii_lowercase());
            any = true;
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    c.id = Some(self.parse_identifier()?);
                }
                Some('.') => {
                    self.bump();
                    let class = self.parse_identifier()?;
                    c.classes.push(class);
                }
                Some('[') => {
                    self.bump();
                    let attr = self.parse_attr()?;
                    c.attrs.push(attr);
                }
                Some(':') => {
                    self.bump();
                    self.parse_pseudo(&mut c)?;
                }
                _ => break,
            }
            any = true;
        }
        if !any {
            return Err(self.error("expected a selector"));
        }
        Ok(c)
    }

    fn at_identifier_start(&self) -> bool {
        matches!(self.peek(), Some(c)
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '\\' || c >= '\u{80}')
    }

    fn parse_identifier(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.bump();
                out.push(self.parse_escape()?);
            } else if ch.is_alphanumeric() || ch == '-' || ch == '_' || ch >= '\u{80}' {
                out.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(out)
    }

    /// Consume the body of a backslash escape (the backslash is eaten).
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let Some(ch) = self.peek() else {
            return Err(self.error("dangling escape"));
        };
        if ch.is_ascii_hexdigit() {
            let mut hex = String::new();
            while hex.len() < 6 {
                match self.peek() {
                    Some(h) if h.is_ascii_hexdigit() => {
                        hex.push(h);
                        self.bump();
                    }
                    _ => break,
                }
            }
            // one whitespace char terminates a hex escape
            if matches!(self.peek(), Some(' ' | '\t' | '\n')) {
                self.bump();
            }
            let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("bad hex escape"))?;
            Ok(char::from_u32(code).unwrap_or('\u{FFFD}'))
        } else {
            self.bump();
            Ok(ch)
        }
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_identifier()?;
        self.skip_whitespace();
        if self.eat(']') {
            return Ok(AttrSelector { name, value: None });
        }
        if !self.eat('=') {
            if let Some(op) = self.peek() {
                if matches!(op, '~' | '|' | '^' | '$' | '*') {
                    return Err(SelectorError::Unsupported {
                        feature: format!("attribute operator {op}="),
                    });
                }
            }
            return Err(self.error("expected ']' or '=' in attribute selector"));
        }
        self.skip_whitespace();
        let value = self.parse_string_or_identifier()?;
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error("unterminated attribute selector"));
        }
        Ok(AttrSelector {
            name,
            value: Some(value),
        })
    }

    fn parse_string_or_identifier(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut out = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated string")),
                        Some(c) if c == quote => {
                            self.bump();
                            break;
                        }
                        Some('\\') => {
                            self.bump();
                            out.push(self.parse_escape()?);
                        }
                        Some(c) => {
                            out.push(c);
                            self.bump();
                        }
                    }
                }
                Ok(out)
            }
            _ => self.parse_identifier(),
        }
    }

    fn parse_pseudo(&mut self, c: &mut CompoundSelector) -> Result<(), SelectorError> {
        if self.peek() == Some(':') {
            return Err(SelectorError::Unsupported {
                feature: "pseudo-elements".to_string(),
            });
        }
        let name = self.parse_identifier()?;
        if name != "nth-child" {
            return Err(SelectorError::Unsupported {
                feature: format!(":{name}"),
            });
        }
        if !self.eat('(') {
            return Err(self.error("expected '(' after :nth-child"));
        }
        self.skip_whitespace();
        let n = self.parse_integer()?;
        if matches!(self.peek(), Some('n' | 'N')) {
            return Err(SelectorError::Unsupported {
                feature: "An+B nth-child arguments".to_string(),
            });
        }
        self.skip_whitespace();
        if !self.eat(')') {
            return Err(self.error("unterminated :nth-child()"));
        }
        c.nth_child = Some(n);
        Ok(())
    }

    fn parse_integer(&mut self) -> Result<usize, SelectorError> {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(self.error("expected an integer"));
        }
        digits.parse().map_err(|_| self.error("integer out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape_identifier;

    fn compound(input: &str) -> CompoundSelector {
        let sel = Selector::parse(input).unwrap();
        assert_eq!(sel.complexes.len(), 1);
        let mut parts = sel.complexes.into_iter().next().unwrap().parts;
        assert_eq!(parts.len(), 1);
        parts.pop().unwrap().1
    }

    #[test]
    fn parses_simple_fragments() {
        assert_eq!(compound("div").tag.as_deref(), Some("div"));
        assert_eq!(compound("#main").id.as_deref(), Some("main"));
        assert_eq!(compound(".card").classes, vec!["card".to_string()]);
        assert!(compound("*").universal);
    }

    #[test]
    fn parses_compounds_and_nth() {
        let c = compound("div.card:nth-child(3)");
        assert_eq!(c.tag.as_deref(), Some("div"));
        assert_eq!(c.classes, vec!["card".to_string()]);
        assert_eq!(c.nth_child, Some(3));
    }

    #[test]
    fn parses_attribute_selectors() {
        let c = compound(r#"input[name="q"]"#);
        assert_eq!(c.attrs.len(), 1);
        assert_eq!(c.attrs[0].name, "name");
        assert_eq!(c.attrs[0].value.as_deref(), Some("q"));

        let bare = compound("[disabled]");
        assert_eq!(bare.attrs[0].value, None);
    }

    #[test]
    fn parses_combinators() {
        let sel = Selector::parse("ul > li a").unwrap();
        let parts = &sel.complexes[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].0, None);
        assert_eq!(parts[1].0, Some(Combinator::Child));
        assert_eq!(parts[2].0, Some(Combinator::Descendant));
    }

    #[test]
    fn parses_groups() {
        let sel = Selector::parse("a, b > c").unwrap();
        assert_eq!(sel.complexes.len(), 2);
    }

    #[test]
    fn escaped_identifiers_round_trip() {
        let raw = "1st:item";
        let c = compound(&format!("#{}", escape_identifier(raw)));
        assert_eq!(c.id.as_deref(), Some(raw));
    }

    #[test]
    fn rejects_unsupported_features() {
        assert!(matches!(
            Selector::parse("a:hover"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            Selector::parse("li:nth-child(2n+1)"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            Selector::parse(r#"[class~="x"]"#),
            Err(SelectorError::Unsupported { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse("[name=").is_err());
        assert!(Selector::parse("#").is_err());
    }

    #[test]
    fn display_round_trips() {
        for s in ["div.card:nth-child(3)", "#a > .b c", r#"li[data-id="7"]"#] {
            let sel = Selector::parse(s).unwrap();
            assert_eq!(sel.to_string(), s);
        }
    }
}
