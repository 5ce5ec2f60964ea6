//! # Node Model
//!
//! The in-memory tree the codec reads and writes: a tag, an ordered set of
//! attributes and one piece of content.
//!
//! Nodes are plain data. Upper layers build them right before encoding and
//! the decoder produces fresh ones for every frame.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Value of a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    Text(String),
    Binary(Vec<u8>),
}

impl AttrValue {
    /// Borrow the value as text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Binary(_) => None,
        }
    }

    /// Borrow the raw bytes of either variant
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttrValue::Text(s) => s.as_bytes(),
            AttrValue::Binary(b) => b,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(b: Vec<u8>) -> Self {
        AttrValue::Binary(b)
    }
}

impl From<&[u8]> for AttrValue {
    fn from(b: &[u8]) -> Self {
        AttrValue::Binary(b.to_vec())
    }
}

/// Ordered attribute map with unique keys.
///
/// Iteration follows insertion order, and equality compares order too, so a
/// decoded node is equal to its source only if the wire kept the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, replacing (in place) any value already under `key`.
    /// Returns the replaced value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append without the uniqueness scan; the caller has already checked.
    pub(crate) fn push_unique(&mut self, key: String, value: AttrValue) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// Content payload of a node. Text and children are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    #[default]
    Absent,
    Text(String),
    Binary(Vec<u8>),
    Children(Vec<Node>),
}

/// A tagged, attributed tree node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub content: Content,
}

impl Node {
    /// Node with the given tag, no attributes and no content
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
            content: Content::Absent,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn with_binary(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.content = Content::Binary(bytes.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.content = Content::Children(children);
        self
    }

    /// Append one child. Text or binary content is replaced by the child list.
    pub fn with_child(mut self, child: Node) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            other => *other = Content::Children(vec![child]),
        }
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Attribute value if present and textual
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    /// Child nodes; empty for any non-children content
    pub fn children(&self) -> &[Node] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children().iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag, in order
    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children().iter().filter(move |c| c.tag == tag)
    }

    /// Text content. Binary content is decoded as lossy UTF-8.
    pub fn text_content(&self) -> Option<Cow<'_, str>> {
        match &self.content {
            Content::Text(s) => Some(Cow::Borrowed(s)),
            Content::Binary(b) => Some(String::from_utf8_lossy(b)),
            Content::Absent | Content::Children(_) => None,
        }
    }

    /// Depth of the deepest node in this tree; a leaf has depth 1.
    ///
    /// Walks with an explicit stack, so hand-built trees of any depth are
    /// measured without growing the call stack. The encoder rejects trees
    /// deeper than its configured limit before recursing.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}
