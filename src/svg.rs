//! Owned SVG document tree.
//!
//! Template edits used to be string splicing against the raw markup; that
//! required a tag-balance repair pass after heuristic removals. Instead the
//! template is parsed once into this typed tree, mutated through typed
//! operations and serialized back, so the output is well-formed by
//! construction.

use std::fmt::Write as _;

use crate::error::{TeamcardError, TeamcardResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Remove every descendant element (at any depth) matching the predicate.
    pub fn remove_descendants(&mut self, pred: &dyn Fn(&Element) -> bool) {
        self.children.retain(|child| match child {
            Node::Element(el) => !pred(el),
            Node::Text(_) => true,
        });
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.remove_descendants(pred);
            }
        }
    }

    /// Depth-first search for the first descendant matching the predicate.
    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if pred(el) {
                    return Some(el);
                }
                if let Some(found) = el.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if pred(el) {
                    return Some(el);
                }
                if let Some(found) = el.find(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Count descendant elements (self excluded) matching the predicate.
    pub fn count(&self, pred: &dyn Fn(&Element) -> bool) -> usize {
        let mut n = 0usize;
        for child in &self.children {
            if let Node::Element(el) = child {
                if pred(el) {
                    n += 1;
                }
                n += el.count(pred);
            }
        }
        n
    }

    /// Find a direct `defs` child, creating one at the front if absent.
    pub fn ensure_defs(&mut self) -> &mut Element {
        let idx = self.children.iter().position(
            |c| matches!(c, Node::Element(el) if el.name == "defs"),
        );
        let idx = match idx {
            Some(idx) => idx,
            None => {
                self.children.insert(0, Node::Element(Element::new("defs")));
                0
            }
        };
        match &mut self.children[idx] {
            Node::Element(el) => el,
            Node::Text(_) => unreachable!("defs slot holds an element"),
        }
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }
}

/// Parse a complete document (or any single-rooted fragment) into an owned
/// [`Element`]. Namespace declarations in scope at the root are re-emitted as
/// `xmlns`/`xmlns:*` attributes so serialization stays standalone.
pub fn parse(source: &str) -> TeamcardResult<Element> {
    let doc = roxmltree::Document::parse(source)
        .map_err(|e| TeamcardError::template(format!("malformed markup: {e}")))?;
    let root = doc.root_element();
    let mut el = convert(root);

    for ns in root.namespaces() {
        match ns.name() {
            Some(prefix) => {
                if el.attr(&format!("xmlns:{prefix}")).is_none() {
                    el.set_attr(format!("xmlns:{prefix}"), ns.uri());
                }
            }
            None => {
                if el.attr("xmlns").is_none() {
                    el.set_attr("xmlns", ns.uri());
                }
            }
        }
    }
    Ok(el)
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let mut el = Element::new(node.tag_name().name());
    for attr in node.attributes() {
        let name = match attr.namespace() {
            Some(uri) => match node.lookup_prefix(uri) {
                Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
                _ => attr.name().to_string(),
            },
            None => attr.name().to_string(),
        };
        el.attrs.push((name, attr.value().to_string()));
    }
    for child in node.children() {
        if child.is_element() {
            el.children.push(Node::Element(convert(child)));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if !text.trim().is_empty() {
                el.children.push(Node::Text(text.to_string()));
            }
        }
    }
    el
}

fn write_element(out: &mut String, el: &Element) {
    let _ = write!(out, "<{}", el.name);
    for (name, value) in &el.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Element(inner) => write_element(out, inner),
            Node::Text(text) => out.push_str(&escape_text(text)),
        }
    }
    let _ = write!(out, "</{}>", el.name);
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <defs><linearGradient id="g0"/></defs>
        <g id="keep"><rect id="r1" fill="#fff"/></g>
        <g id="drop"><path id="p1" d="M1 1"/></g>
        <text>hi &amp; bye</text>
    </svg>"##;

    #[test]
    fn parse_keeps_root_namespace() {
        let root = parse(DOC).unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attr("xmlns"), Some("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn serialize_round_trips_through_parse() {
        let root = parse(DOC).unwrap();
        let reparsed = parse(&root.serialize()).unwrap();
        assert_eq!(root, reparsed);
    }

    #[test]
    fn serialized_tags_are_balanced_by_construction() {
        let mut root = parse(DOC).unwrap();
        root.remove_descendants(&|el| el.attr("id") == Some("drop"));
        let out = root.serialize();
        assert_eq!(out.matches("<g").count(), out.matches("</g>").count());
        assert!(parse(&out).is_ok());
    }

    #[test]
    fn remove_descendants_reaches_nested_elements() {
        let mut root = parse(DOC).unwrap();
        root.remove_descendants(&|el| el.name == "path");
        assert_eq!(root.count(&|el| el.name == "path"), 0);
        assert_eq!(root.count(&|el| el.name == "g"), 2);
    }

    #[test]
    fn ensure_defs_reuses_existing_section() {
        let mut root = parse(DOC).unwrap();
        root.ensure_defs().push(Element::new("linearGradient").with_attr("id", "g1"));
        assert_eq!(root.count(&|el| el.name == "defs"), 1);
        assert_eq!(root.count(&|el| el.name == "linearGradient"), 2);
    }

    #[test]
    fn ensure_defs_creates_section_when_missing() {
        let mut root = parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        root.ensure_defs();
        assert_eq!(root.count(&|el| el.name == "defs"), 1);
    }

    #[test]
    fn text_and_attr_values_are_escaped() {
        let el = Element::new("text")
            .with_attr("data-note", "a<b \"q\"")
            .with_text("x & y");
        let out = el.serialize();
        assert!(out.contains("a&lt;b &quot;q&quot;"));
        assert!(out.contains("x &amp; y"));
    }
}
