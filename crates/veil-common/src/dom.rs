//! Minimal HTML element tree.
//!
//! Just enough of a DOM to build the notice and embed markup, toggle element
//! visibility, query by tag or class, and serialize to HTML. Attribute order
//! is insertion order, so rendered output is deterministic.

use std::fmt::{self, Write};

use smol_str::SmolStr;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Elements whose text content is emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children
    Element(Element),
    /// Text content
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Node {
    /// The element, if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

/// An HTML element.
///
/// The CSS `display` value is tracked separately from the `style` attribute
/// so visibility can be flipped without rewriting author styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: SmolStr,
    attrs: Vec<(SmolStr, String)>,
    display: Option<SmolStr>,
    children: Vec<Node>,
}

impl Element {
    /// New element with no attributes or children
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            display: None,
            children: Vec::new(),
        }
    }

    /// Tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Builder-style [`Element::set_attr`]
    pub fn with_attr(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style [`Element::append`]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.append(child);
        self
    }

    /// Set an attribute, replacing any previous value.
    ///
    /// An empty value renders as a bare boolean attribute.
    pub fn set_attr(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Whether the `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    /// Set the CSS `display` value
    pub fn set_display(&mut self, display: impl Into<SmolStr>) {
        self.display = Some(display.into());
    }

    /// Hide or show the element
    pub fn set_hidden(&mut self, hidden: bool) {
        self.set_display(if hidden { "none" } else { "block" });
    }

    /// Whether the element itself is displayed
    pub fn is_displayed(&self) -> bool {
        self.display.as_deref() != Some("none")
    }

    /// Child nodes
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Append a child
    pub fn append(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Insert a child before all others
    pub fn prepend(&mut self, child: impl Into<Node>) {
        self.children.insert(0, child.into());
    }

    /// Remove every child, returning how many there were
    pub fn clear_children(&mut self) -> usize {
        let n = self.children.len();
        self.children.clear();
        n
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Descendant elements (not including `self`) matching `pred`, in document order
    pub fn find_all(&self, pred: impl Fn(&Element) -> bool + Copy) -> Vec<&Element> {
        let mut out = Vec::new();
        self.find_into(pred, &mut out);
        out
    }

    fn find_into<'a>(&'a self, pred: impl Fn(&Element) -> bool + Copy, out: &mut Vec<&'a Element>) {
        for el in self.child_elements() {
            if pred(el) {
                out.push(el);
            }
            el.find_into(pred, out);
        }
    }

    /// Descendant elements with the given tag
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.find_all(|el| el.tag() == tag)
    }

    /// Apply `f` to every descendant element matching `pred`; returns the match count
    pub fn for_each_mut(
        &mut self,
        pred: impl Fn(&Element) -> bool + Copy,
        f: &mut impl FnMut(&mut Element),
    ) -> usize {
        let mut count = 0;
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if pred(el) {
                    f(el);
                    count += 1;
                }
                count += el.for_each_mut(pred, &mut *f);
            }
        }
        count
    }

    /// Serialize to an HTML string
    pub fn to_html(&self) -> String {
        self.to_string()
    }

    fn style_value(&self) -> Option<String> {
        let author = self.attr("style").filter(|s| !s.is_empty());
        match (&self.display, author) {
            (None, None) => None,
            (None, Some(s)) => Some(s.to_string()),
            (Some(d), None) => Some(format!("display:{d}")),
            (Some(d), Some(s)) => Some(format!("display:{d};{s}")),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            if name == "style" {
                continue;
            }
            write_attr(f, name, value)?;
        }
        if let Some(style) = self.style_value() {
            write_attr(f, "style", &style)?;
        }
        f.write_char('>')?;
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return Ok(());
        }
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            match child {
                Node::Element(el) => write!(f, "{el}")?,
                Node::Text(t) if raw => f.write_str(t)?,
                Node::Text(t) => write_escaped(f, t, false)?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(el) => fmt::Display::fmt(el, f),
            Node::Text(t) => write_escaped(f, t, false),
        }
    }
}

fn write_attr(f: &mut fmt::Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    write!(f, " {name}")?;
    if value.is_empty() {
        return Ok(());
    }
    f.write_str("=\"")?;
    write_escaped(f, value, true)?;
    f.write_char('"')
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, attr: bool) -> fmt::Result {
    for c in s.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' if attr => f.write_str("&quot;")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_markup() {
        let el = Element::new("blockquote")
            .with_attr("class", "twitter-tweet")
            .with_child(Element::new("a").with_attr("href", "https://twitter.com/a?b=1&c=\"2\""));
        assert_eq!(
            el.to_html(),
            r#"<blockquote class="twitter-tweet"><a href="https://twitter.com/a?b=1&amp;c=&quot;2&quot;"></a></blockquote>"#
        );
    }

    #[test]
    fn escapes_text_but_not_scripts() {
        let p = Element::new("p").with_child("a < b & c");
        assert_eq!(p.to_html(), "<p>a &lt; b &amp; c</p>");
        let style = Element::new("style").with_child("a > b { color: red }");
        assert_eq!(style.to_html(), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn boolean_and_void() {
        let input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("checked", "");
        assert_eq!(input.to_html(), r#"<input type="checkbox" checked>"#);
    }

    #[test]
    fn display_merges_with_author_style() {
        let mut div = Element::new("div").with_attr("style", "border:0");
        assert!(div.is_displayed());
        div.set_hidden(true);
        assert!(!div.is_displayed());
        assert_eq!(div.to_html(), r#"<div style="display:none;border:0"></div>"#);
        div.set_hidden(false);
        assert_eq!(div.to_html(), r#"<div style="display:block;border:0"></div>"#);
    }

    #[test]
    fn set_attr_replaces() {
        let mut el = Element::new("iframe").with_attr("width", "1");
        el.set_attr("width", "2");
        assert_eq!(el.attr("width"), Some("2"));
        assert_eq!(el.remove_attr("width").as_deref(), Some("2"));
        assert_eq!(el.attr("width"), None);
    }

    #[test]
    fn queries_and_mutation() {
        let mut root = Element::new("div")
            .with_child(Element::new("blockquote").with_attr("class", "twitter-tweet x"))
            .with_child(
                Element::new("div").with_child(Element::new("blockquote").with_attr("class", "quote")),
            );
        assert_eq!(root.find_by_tag("blockquote").len(), 2);
        let n = root.for_each_mut(|el| el.has_class("twitter-tweet"), &mut |el: &mut Element| {
            el.set_attr("data-seen", "1")
        });
        assert_eq!(n, 1);
        assert_eq!(root.find_all(|el| el.attr("data-seen").is_some()).len(), 1);
        assert_eq!(root.clear_children(), 2);
        assert!(root.children().is_empty());
    }

    #[test]
    fn text_content_concatenates() {
        let el = Element::new("p")
            .with_child("Hello ")
            .with_child(Element::new("a").with_child("world"))
            .with_child(".");
        assert_eq!(el.text_content(), "Hello world.");
    }
}
