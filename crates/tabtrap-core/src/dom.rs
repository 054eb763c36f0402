#![forbid(unsafe_code)]

//! DOM-like tree abstraction and an in-memory arena document.
//!
//! [`DomTree`] is the read capability every consumer depends on: node kind,
//! parent/children links, tag name, attributes, and inline/computed style.
//! [`Document`] is an arena-backed implementation that also owns the
//! document-level focus (the "active element").
//!
//! # Invariants
//!
//! 1. A [`NodeId`] is a non-owning handle; it stays valid for the lifetime of
//!    the `Document` that issued it (nodes are never freed, only detached).
//! 2. The parent/children links are always mutually consistent.
//! 3. The tree is acyclic: `append_child` refuses to insert an ancestor
//!    below one of its descendants.
//! 4. Only element nodes have children, attributes, or style.
//!
//! # Failure Modes
//!
//! | Operation | Cause | Result |
//! |-----------|-------|--------|
//! | any mutation | id from another document / out of range | `DomError::UnknownNode` |
//! | `append_child`, `set_attribute` | target is a text node | `DomError::NotAnElement` |
//! | `append_child` | would create a cycle | `DomError::HierarchyRequest` |
//! | read through `DomTree` | unknown id | empty / `None` / initial style |

use std::fmt;

use ahash::AHashMap;
use smallvec::SmallVec;
use tabtrap_style::{ComputedStyle, StyleDecl};

/// Tags that take part in sequential navigation without an explicit `tabindex`.
pub const INTERACTIVE_TAGS: [&str; 5] = ["button", "textarea", "input", "select", "object"];

/// Attribute holding an explicit tab order.
pub const TABINDEX_ATTR: &str = "tabindex";

/// Attribute marking a form control as disabled.
pub const DISABLED_ATTR: &str = "disabled";

/// Attribute that hides an element unless an author style overrides `display`.
pub const HIDDEN_ATTR: &str = "hidden";

/// Handle to a node in a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    /// Build a handle from a raw index.
    ///
    /// Intended for alternative [`DomTree`] implementations; a raw id is only
    /// meaningful to the tree that allocated it.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
}

/// Errors from tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id was not issued by this document.
    UnknownNode(NodeId),
    /// The operation requires an element but the node is text.
    NotAnElement(NodeId),
    /// The insertion would make a node its own ancestor.
    HierarchyRequest { parent: NodeId, child: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::NotAnElement(id) => write!(f, "node {id} is not an element"),
            Self::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child} under its descendant {parent}")
            }
        }
    }
}

impl std::error::Error for DomError {}

/// Read access to a DOM-like tree.
///
/// Implementors provide the structural and style primitives; the provided
/// methods derive tab order, disabled state and propagation paths from them.
pub trait DomTree {
    /// Kind of the node, or `None` for an unknown id.
    fn kind(&self, id: NodeId) -> Option<NodeKind>;

    /// Parent of the node, `None` for roots and detached nodes.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Child nodes in document order (elements and text).
    fn children(&self, id: NodeId) -> &[NodeId];

    /// Lower-case tag name of an element.
    fn tag_name(&self, id: NodeId) -> Option<&str>;

    /// Value of an attribute on an element.
    fn attribute(&self, id: NodeId, name: &str) -> Option<&str>;

    /// The element's own inline declarations.
    fn inline_style(&self, id: NodeId) -> StyleDecl;

    /// The element's resolved style.
    fn computed_style(&self, id: NodeId) -> ComputedStyle;

    #[inline]
    fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Element)
    }

    #[inline]
    fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Whether the element is one of [`INTERACTIVE_TAGS`].
    fn is_interactive(&self, id: NodeId) -> bool {
        self.tag_name(id)
            .is_some_and(|tag| INTERACTIVE_TAGS.contains(&tag))
    }

    /// Effective tab order of an element.
    ///
    /// A parseable `tabindex` attribute wins; otherwise interactive tags get
    /// `0` and everything else `-1`.
    fn tab_index(&self, id: NodeId) -> i32 {
        if let Some(value) = self.attribute(id, TABINDEX_ATTR)
            && let Ok(parsed) = value.trim().parse::<i32>()
        {
            return parsed;
        }
        if self.is_interactive(id) { 0 } else { -1 }
    }

    #[inline]
    fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, DISABLED_ATTR)
    }

    /// Ordered path from `target` up to its root, `target` first.
    fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        if self.kind(target).is_none() {
            return path;
        }
        let mut current = Some(target);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }
        path
    }

    /// Whether `node` is `ancestor` or lies below it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: AHashMap<String, String>,
    inline: StyleDecl,
    sheet: StyleDecl,
}

impl ElementData {
    /// Sheet declarations with the user-agent `[hidden] { display: none }` rule
    /// underneath them.
    fn sheet_with_hidden(&self) -> StyleDecl {
        if self.attributes.contains_key(HIDDEN_ATTR) {
            self.sheet.merge(StyleDecl::hidden())
        } else {
            self.sheet
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    payload: Payload,
}

/// Arena-backed document with a root `<html>` element, a `<body>`, and a
/// single active (focused) element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            active: None,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.link(doc.root, doc.body);
        doc
    }

    /// The document element (`<html>`).
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    #[inline]
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of nodes ever allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Payload::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: AHashMap::new(),
            inline: StyleDecl::new(),
            sheet: StyleDecl::new(),
        }))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Payload::Text(text.into()))
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        self.check_element(parent)?;
        let child = self.create_element(tag);
        self.link(parent, child);
        Ok(child)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, DomError> {
        self.check_element(parent)?;
        let child = self.create_text(text);
        self.link(parent, child);
        Ok(child)
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_element(parent)?;
        self.check(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child)?;
        self.link(parent, child);
        Ok(())
    }

    /// Remove `node` from its parent. Detaching a detached node is a no-op.
    ///
    /// If the active element ends up outside the document it loses focus.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != node);
        }
        if let Some(active) = self.active
            && !self.is_connected(active)
        {
            self.active = None;
        }
        Ok(())
    }

    /// Set an attribute on an element.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.into());
        Ok(())
    }

    /// Remove an attribute; returns whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self
            .element_mut(id)?
            .attributes
            .remove(&name.to_ascii_lowercase())
            .is_some())
    }

    /// Add (`force == true`) or remove a boolean attribute.
    pub fn toggle_attribute(&mut self, id: NodeId, name: &str, force: bool) -> Result<(), DomError> {
        if force {
            let attrs = &mut self.element_mut(id)?.attributes;
            attrs.entry(name.to_ascii_lowercase()).or_default();
        } else {
            self.remove_attribute(id, name)?;
        }
        Ok(())
    }

    /// Replace the inline declarations of an element.
    pub fn set_inline_style(&mut self, id: NodeId, style: StyleDecl) -> Result<(), DomError> {
        self.element_mut(id)?.inline = style;
        Ok(())
    }

    /// Edit the inline declarations of an element in place.
    pub fn update_inline_style(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut StyleDecl),
    ) -> Result<(), DomError> {
        edit(&mut self.element_mut(id)?.inline);
        Ok(())
    }

    /// Replace the stylesheet-derived declarations of an element.
    pub fn set_sheet_style(&mut self, id: NodeId, style: StyleDecl) -> Result<(), DomError> {
        self.element_mut(id)?.sheet = style;
        Ok(())
    }

    /// Text content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.index())?.payload {
            Payload::Text(text) => Some(text),
            Payload::Element(_) => None,
        }
    }

    /// Whether `id` is attached below the document root.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.kind(id).is_some() && self.contains(self.root, id)
    }

    /// Currently focused element, falling back to `<body>` like a browser.
    #[must_use]
    pub fn active_element(&self) -> NodeId {
        self.active.unwrap_or(self.body)
    }

    /// Currently focused element, without the `<body>` fallback.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.active
    }

    /// Move focus to a connected element. Returns whether focus changed.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) || self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Drop focus from `id` if it holds it. Returns whether focus changed.
    pub fn blur(&mut self, id: NodeId) -> bool {
        if self.active == Some(id) {
            self.active = None;
            return true;
        }
        false
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            parent: None,
            children: SmallVec::new(),
            payload,
        });
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    fn check(&self, id: NodeId) -> Result<(), DomError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::UnknownNode(id))
        }
    }

    fn check_element(&self, id: NodeId) -> Result<(), DomError> {
        match self.kind(id) {
            Some(NodeKind::Element) => Ok(()),
            Some(NodeKind::Text) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.index())?.payload {
            Payload::Element(data) => Some(data),
            Payload::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.payload) {
            Some(Payload::Element(data)) => Ok(data),
            Some(Payload::Text(_)) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }
}

impl DomTree for Document {
    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.index()).map(|n| match n.payload {
            Payload::Element(_) => NodeKind::Element,
            Payload::Text(_) => NodeKind::Text,
        })
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index())?.parent
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let attrs = &self.element(id)?.attributes;
        match attrs.get(name) {
            Some(value) => Some(value.as_str()),
            None => attrs.get(&name.to_ascii_lowercase()).map(String::as_str),
        }
    }

    fn inline_style(&self, id: NodeId) -> StyleDecl {
        self.element(id).map(|e| e.inline).unwrap_or_default()
    }

    fn computed_style(&self, id: NodeId) -> ComputedStyle {
        if self.element(id).is_none() {
            return ComputedStyle::INITIAL;
        }
        // Resolve from the topmost ancestor down so inheritance sees parents first.
        let mut chain: SmallVec<[NodeId; 16]> = SmallVec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        let mut computed: Option<ComputedStyle> = None;
        for node in chain.into_iter().rev() {
            if let Some(el) = self.element(node) {
                computed = Some(el.inline.cascade(el.sheet_with_hidden(), computed.as_ref()));
            }
        }
        computed.unwrap_or(ComputedStyle::INITIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabtrap_style::{Display, Visibility};

    #[test]
    fn new_document_has_root_and_body() {
        let doc = Document::new();
        assert_eq!(doc.tag_name(doc.root()), Some("html"));
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert_eq!(doc.children(doc.root()), &[doc.body()]);
    }

    #[test]
    fn append_keeps_document_order() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "div").unwrap();
        let t = doc.append_text(doc.body(), "hello").unwrap();
        let b = doc.append_element(doc.body(), "span").unwrap();
        assert_eq!(doc.children(doc.body()), &[a, t, b]);
        assert_eq!(doc.kind(t), Some(NodeKind::Text));
        assert_eq!(doc.text(t), Some("hello"));
    }

    #[test]
    fn append_child_moves_attached_node() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "div").unwrap();
        let b = doc.append_element(doc.body(), "div").unwrap();
        let c = doc.append_element(a, "p").unwrap();
        doc.append_child(b, c).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[c]);
        assert_eq!(doc.parent(c), Some(b));
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "div").unwrap();
        let b = doc.append_element(a, "div").unwrap();
        assert_eq!(
            doc.append_child(b, a),
            Err(DomError::HierarchyRequest {
                parent: b,
                child: a
            })
        );
        assert_eq!(
            doc.append_child(a, a),
            Err(DomError::HierarchyRequest {
                parent: a,
                child: a
            })
        );
    }

    #[test]
    fn text_nodes_cannot_hold_children_or_attributes() {
        let mut doc = Document::new();
        let t = doc.append_text(doc.body(), "x").unwrap();
        assert_eq!(doc.append_element(t, "div"), Err(DomError::NotAnElement(t)));
        assert_eq!(
            doc.set_attribute(t, "id", "x"),
            Err(DomError::NotAnElement(t))
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut doc = Document::new();
        let bogus = NodeId::from_raw(999);
        assert_eq!(
            doc.append_element(bogus, "div"),
            Err(DomError::UnknownNode(bogus))
        );
        assert!(doc.children(bogus).is_empty());
        assert_eq!(doc.kind(bogus), None);
        assert!(doc.propagation_path(bogus).is_empty());
    }

    #[test]
    fn tab_index_defaults() {
        let mut doc = Document::new();
        let button = doc.append_element(doc.body(), "BUTTON").unwrap();
        let div = doc.append_element(doc.body(), "div").unwrap();
        let explicit = doc.append_element(doc.body(), "div").unwrap();
        doc.set_attribute(explicit, "tabindex", "3").unwrap();
        let garbage = doc.append_element(doc.body(), "input").unwrap();
        doc.set_attribute(garbage, "tabindex", "abc").unwrap();
        let negative = doc.append_element(doc.body(), "button").unwrap();
        doc.set_attribute(negative, "tabindex", "-1").unwrap();

        assert_eq!(doc.tab_index(button), 0);
        assert_eq!(doc.tab_index(div), -1);
        assert_eq!(doc.tab_index(explicit), 3);
        assert_eq!(doc.tab_index(garbage), 0);
        assert_eq!(doc.tab_index(negative), -1);
    }

    #[test]
    fn toggle_attribute_adds_and_removes() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.body(), "div").unwrap();
        doc.toggle_attribute(el, "hidden", true).unwrap();
        assert!(doc.has_attribute(el, "hidden"));
        doc.toggle_attribute(el, "hidden", false).unwrap();
        assert!(!doc.has_attribute(el, "hidden"));
    }

    #[test]
    fn computed_style_inherits_visibility() {
        let mut doc = Document::new();
        let outer = doc.append_element(doc.body(), "div").unwrap();
        let inner = doc.append_element(outer, "button").unwrap();
        doc.set_sheet_style(outer, StyleDecl::new().visibility(Visibility::Hidden))
            .unwrap();
        assert!(doc.computed_style(inner).hides());
        assert!(doc.inline_style(inner).is_empty());

        doc.set_inline_style(inner, StyleDecl::new().visibility(Visibility::Visible))
            .unwrap();
        assert!(!doc.computed_style(inner).hides());
    }

    #[test]
    fn hidden_attribute_yields_to_author_display() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.body(), "div").unwrap();
        doc.toggle_attribute(el, HIDDEN_ATTR, true).unwrap();
        assert!(doc.computed_style(el).hides());
        doc.set_sheet_style(el, StyleDecl::new().display(Display::Flex))
            .unwrap();
        assert!(!doc.computed_style(el).hides());
        doc.set_sheet_style(el, StyleDecl::new()).unwrap();
        doc.toggle_attribute(el, HIDDEN_ATTR, false).unwrap();
        assert!(!doc.computed_style(el).hides());
    }

    #[test]
    fn computed_style_display_is_local() {
        let mut doc = Document::new();
        let outer = doc.append_element(doc.body(), "div").unwrap();
        let inner = doc.append_element(outer, "button").unwrap();
        doc.set_inline_style(outer, StyleDecl::hidden()).unwrap();
        assert_eq!(doc.computed_style(outer).display, Display::None);
        assert_eq!(doc.computed_style(inner).display, Display::Block);
    }

    #[test]
    fn propagation_path_runs_target_to_root() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "div").unwrap();
        let b = doc.append_element(a, "button").unwrap();
        assert_eq!(doc.propagation_path(b), vec![b, a, doc.body(), doc.root()]);
        assert!(doc.contains(a, b));
        assert!(!doc.contains(b, a));
    }

    #[test]
    fn focus_tracks_active_element() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.body(), "button").unwrap();
        let detached = doc.create_element("button");
        assert_eq!(doc.active_element(), doc.body());
        assert!(doc.focus(a));
        assert!(!doc.focus(a));
        assert_eq!(doc.active_element(), a);
        assert!(!doc.focus(detached));
        assert!(doc.blur(a));
        assert_eq!(doc.focused(), None);
        assert_eq!(doc.active_element(), doc.body());
    }

    #[test]
    fn detaching_focused_subtree_drops_focus() {
        let mut doc = Document::new();
        let wrapper = doc.append_element(doc.body(), "div").unwrap();
        let a = doc.append_element(wrapper, "button").unwrap();
        doc.focus(a);
        doc.detach(wrapper).unwrap();
        assert_eq!(doc.focused(), None);
        assert!(!doc.is_connected(a));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Random moves keep links consistent and the tree acyclic.
            #[test]
            fn random_moves_keep_links_consistent(
                ops in prop::collection::vec((0usize..24, 0usize..24), 0..64)
            ) {
                let mut doc = Document::new();
                let mut ids = vec![doc.body()];
                for _ in 0..23 {
                    let id = doc.append_element(doc.body(), "div").unwrap();
                    ids.push(id);
                }
                for (p, c) in ops {
                    let _ = doc.append_child(ids[p], ids[c]);
                }
                for &id in &ids {
                    for &child in doc.children(id) {
                        prop_assert_eq!(doc.parent(child), Some(id));
                    }
                    if let Some(parent) = doc.parent(id) {
                        prop_assert!(doc.children(parent).contains(&id));
                    }
                    let path = doc.propagation_path(id);
                    prop_assert!(path.len() <= doc.len());
                }
            }
        }
    }
}
