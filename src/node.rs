//! Node access layer
//!
//! The extraction engine never touches a concrete XML library. It works against the
//! [`Node`] trait, and [`XmlNode`] adapts `roxmltree` to it.

use std::fmt::{Debug, Formatter};

/// Read-only navigation over an already-parsed element tree.
///
/// Only element nodes are exposed through `children`; text, comments and processing
/// instructions are reachable only through [`Node::text`] and [`Node::has_own_text`].
pub trait Node: Copy + Send + Sync {
    /// Local tag name of the element.
    fn name(&self) -> &str;

    /// Concatenated text of all descendants, untrimmed.
    fn text(&self) -> String;

    /// Attribute value by local name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Every attribute as `(local name, value)`, in document order.
    fn attributes(&self) -> Vec<(&str, &str)>;

    /// Element children in document order.
    fn children(&self) -> Vec<Self>;

    /// Whether the element carries non-whitespace text directly (not via a child element).
    fn has_own_text(&self) -> bool;

    /// First element child with the given tag.
    fn child(&self, tag: &str) -> Option<Self> {
        self.children().into_iter().find(|c| c.name() == tag)
    }

    /// Every element child with the given tag, in document order.
    fn children_by_tag(&self, tag: &str) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter(|c| c.name() == tag)
            .collect()
    }

    /// Follow a `/`-separated path of child tags, first match at each step.
    fn descend(&self, path: &str) -> Option<Self> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .try_fold(*self, |node, step| node.child(step))
    }
}

/// A parsed XML document held in memory.
pub struct XmlDocument<'a> {
    doc: roxmltree::Document<'a>,
}

impl<'a> XmlDocument<'a> {
    /// Parse XML text. DrugBank exports carry a DOCTYPE, so DTDs are allowed.
    pub fn parse(text: &'a str) -> Result<Self, roxmltree::Error> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        Ok(XmlDocument { doc })
    }

    /// The document element (`<drugbank>` for a DrugBank export).
    pub fn root_element(&'a self) -> XmlNode<'a> {
        XmlNode(self.doc.root_element())
    }

    /// Every `<drug>` record directly under the document element.
    pub fn drugs(&'a self) -> Vec<XmlNode<'a>> {
        self.records("drug")
    }

    /// Every direct child of the document element with the given tag.
    pub fn records(&'a self, tag: &str) -> Vec<XmlNode<'a>> {
        self.root_element().children_by_tag(tag)
    }
}

/// An element of a [`XmlDocument`].
#[derive(Clone, Copy, PartialEq)]
pub struct XmlNode<'a>(roxmltree::Node<'a, 'a>);

impl<'a> Debug for XmlNode<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0.tag_name().name())
    }
}

impl<'a> Node for XmlNode<'a> {
    fn name(&self) -> &str {
        self.0.tag_name().name()
    }

    fn text(&self) -> String {
        self.0
            .descendants()
            .filter(|d| d.is_text())
            .filter_map(|d| d.text())
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.0.attribute(name)
    }

    fn attributes(&self) -> Vec<(&str, &str)> {
        self.0
            .attributes()
            .map(|a| (a.name(), a.value()))
            .collect()
    }

    fn children(&self) -> Vec<Self> {
        self.0
            .children()
            .filter(|c| c.is_element())
            .map(XmlNode)
            .collect()
    }

    fn child(&self, tag: &str) -> Option<Self> {
        self.0
            .children()
            .find(|c| c.is_element() && c.tag_name().name() == tag)
            .map(XmlNode)
    }

    fn children_by_tag(&self, tag: &str) -> Vec<Self> {
        self.0
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == tag)
            .map(XmlNode)
            .collect()
    }

    fn has_own_text(&self) -> bool {
        self.0
            .children()
            .filter(|c| c.is_text())
            .any(|c| c.text().is_some_and(|t| !t.trim().is_empty()))
    }
}
