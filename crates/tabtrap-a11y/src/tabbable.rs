#![forbid(unsafe_code)]

//! Tabbable-node index.
//!
//! [`tabbable_sequence`] walks a subtree depth-first (pre-order, children in
//! document order) and collects every element a keyboard user can reach with
//! `Tab`, ordered the way a browser orders native sequential navigation.
//!
//! # Ordering
//!
//! | Group | Members | Order within group |
//! |-------|---------|--------------------|
//! | 1 | `tab_order > 0` | ascending `tab_order`, ties in traversal order |
//! | 2 | `tab_order == 0` | traversal order |
//!
//! Elements with a negative tab order never appear. The result equals a
//! stable sort of the traversal-ordered tabbable elements by
//! [`TabbableNode::sort_key`]; it is built by ordered insertion instead.
//!
//! # Visibility
//!
//! An element is visible when neither its inline style nor its computed
//! style sets `display: none` or `visibility: hidden`. The inline block is
//! checked first; the computed style is the authority otherwise. The walk
//! does not descend below an invisible element.
//!
//! # Failure Modes
//!
//! None. Unknown ids, text roots and empty subtrees yield an empty sequence.

use std::cmp::Ordering;

use smallvec::SmallVec;
use tabtrap_core::dom::{DomTree, NodeId};

/// A tabbable element and the tab order it was collected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabbableNode {
    pub element: NodeId,
    pub tab_order: i32,
}

impl TabbableNode {
    #[must_use]
    pub const fn new(element: NodeId, tab_order: i32) -> Self {
        Self { element, tab_order }
    }

    /// Composite ordering key: positive orders first (ascending), then the
    /// natural-order group.
    #[inline]
    #[must_use]
    pub const fn sort_key(&self) -> (u8, i32) {
        if self.tab_order <= 0 {
            (1, 0)
        } else {
            (0, self.tab_order)
        }
    }

    /// Compare by [`sort_key`](Self::sort_key) only.
    #[inline]
    #[must_use]
    pub fn cmp_order(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Tabbable elements in navigation order.
///
/// Built fresh on every scan; never cache one across tree mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabbableSequence {
    nodes: Vec<TabbableNode>,
}

impl TabbableSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TabbableNode> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&TabbableNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&TabbableNode> {
        self.nodes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TabbableNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[TabbableNode] {
        &self.nodes
    }

    /// Element ids in navigation order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.element)
    }

    /// Zero-based position of `element`, if present.
    #[must_use]
    pub fn position(&self, element: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.element == element)
    }

    /// Insert after the last entry that sorts at or before `node`.
    ///
    /// Entries sharing a tab order therefore keep their arrival order.
    pub fn insert(&mut self, node: TabbableNode) {
        let key = node.sort_key();
        let at = self.nodes.partition_point(|n| n.sort_key() <= key);
        self.nodes.insert(at, node);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<TabbableNode> {
        self.nodes
    }
}

impl<'a> IntoIterator for &'a TabbableSequence {
    type Item = &'a TabbableNode;
    type IntoIter = std::slice::Iter<'a, TabbableNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl FromIterator<TabbableNode> for TabbableSequence {
    fn from_iter<I: IntoIterator<Item = TabbableNode>>(iter: I) -> Self {
        let mut seq = Self::new();
        for node in iter {
            seq.insert(node);
        }
        seq
    }
}

/// Whether `element` is rendered (neither `display: none` nor
/// `visibility: hidden`).
pub fn is_visible<T: DomTree + ?Sized>(tree: &T, element: NodeId) -> bool {
    if tree.inline_style(element).hides() {
        return false;
    }
    !tree.computed_style(element).hides()
}

/// Whether `element` can take focus at all: an interactive tag or an
/// explicit non-negative tab order, and not disabled.
pub fn is_focusable<T: DomTree + ?Sized>(tree: &T, element: NodeId) -> bool {
    if !tree.is_element(element) {
        return false;
    }
    (tree.is_interactive(element) || tree.tab_index(element) >= 0) && !tree.is_disabled(element)
}

/// Focusable and visible.
pub fn is_tabbable<T: DomTree + ?Sized>(tree: &T, element: NodeId) -> bool {
    is_focusable(tree, element) && is_visible(tree, element)
}

/// Scan `root` and its element descendants into a [`TabbableSequence`].
pub fn tabbable_sequence<T: DomTree + ?Sized>(tree: &T, root: NodeId) -> TabbableSequence {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("tabbable_sequence", root = root.raw()).entered();

    let mut sequence = TabbableSequence::new();
    let mut stack: SmallVec<[NodeId; 32]> = SmallVec::new();
    stack.push(root);

    while let Some(node) = stack.pop() {
        if !tree.is_element(node) || !is_visible(tree, node) {
            continue;
        }
        if is_focusable(tree, node) {
            let tab_order = tree.tab_index(node);
            if tab_order >= 0 {
                sequence.insert(TabbableNode::new(node, tab_order));
            }
        }
        // Reversed so the first child is popped first.
        stack.extend(tree.children(node).iter().rev().copied());
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(count = sequence.len(), "tabbable scan complete");

    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabtrap_core::dom::Document;
    use tabtrap_style::{StyleDecl, Visibility};

    fn with_tabindex(doc: &mut Document, parent: NodeId, tag: &str, tabindex: i32) -> NodeId {
        let id = doc.append_element(parent, tag).unwrap();
        doc.set_attribute(id, "tabindex", tabindex.to_string())
            .unwrap();
        id
    }

    fn order(doc: &Document, root: NodeId) -> Vec<NodeId> {
        tabbable_sequence(doc, root).elements().collect()
    }

    #[test]
    fn positive_group_precedes_natural_order() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let a = with_tabindex(&mut doc, root, "div", 0);
        let b = with_tabindex(&mut doc, root, "div", 2);
        let c = with_tabindex(&mut doc, root, "div", 0);
        assert_eq!(order(&doc, root), vec![b, a, c]);
    }

    #[test]
    fn equal_positive_orders_keep_traversal_order() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let a = with_tabindex(&mut doc, root, "div", 3);
        let nested = doc.append_element(root, "section").unwrap();
        let b = with_tabindex(&mut doc, nested, "span", 1);
        let c = with_tabindex(&mut doc, nested, "span", 3);
        let d = with_tabindex(&mut doc, root, "div", 1);
        assert_eq!(order(&doc, root), vec![b, d, a, c]);
    }

    #[test]
    fn traversal_is_pre_order() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "form").unwrap();
        let outer = doc.append_element(root, "button").unwrap();
        let inner = with_tabindex(&mut doc, outer, "span", 0);
        let sibling = doc.append_element(root, "input").unwrap();
        assert_eq!(order(&doc, root), vec![outer, inner, sibling]);
    }

    #[test]
    fn root_itself_is_considered() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "button").unwrap();
        assert_eq!(order(&doc, root), vec![root]);
    }

    #[test]
    fn negative_and_plain_elements_are_skipped() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        with_tabindex(&mut doc, root, "button", -1);
        doc.append_element(root, "div").unwrap();
        doc.append_element(root, "a").unwrap();
        let ok = doc.append_element(root, "textarea").unwrap();
        assert_eq!(order(&doc, root), vec![ok]);
    }

    #[test]
    fn disabled_controls_are_skipped() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let disabled = doc.append_element(root, "button").unwrap();
        doc.toggle_attribute(disabled, "disabled", true).unwrap();
        let explicit = with_tabindex(&mut doc, root, "div", 1);
        doc.toggle_attribute(explicit, "disabled", true).unwrap();
        let select = doc.append_element(root, "select").unwrap();
        assert!(!is_focusable(&doc, disabled));
        assert_eq!(order(&doc, root), vec![select]);
    }

    #[test]
    fn hidden_subtrees_are_pruned() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let hidden = doc.append_element(root, "div").unwrap();
        doc.set_inline_style(hidden, StyleDecl::hidden()).unwrap();
        let inside = doc.append_element(hidden, "button").unwrap();
        // Own style says visible, but the ancestor is display: none.
        doc.set_inline_style(inside, StyleDecl::new().visibility(Visibility::Visible))
            .unwrap();
        let shown = doc.append_element(root, "button").unwrap();
        assert_eq!(order(&doc, root), vec![shown]);
    }

    #[test]
    fn computed_visibility_hides_element() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let button = doc.append_element(root, "button").unwrap();
        doc.set_sheet_style(button, StyleDecl::new().visibility(Visibility::Hidden))
            .unwrap();
        assert!(is_focusable(&doc, button));
        assert!(!is_visible(&doc, button));
        assert!(!is_tabbable(&doc, button));
        assert!(order(&doc, root).is_empty());
    }

    #[test]
    fn text_nodes_are_ignored() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let text = doc.append_text(root, "label").unwrap();
        let button = doc.append_element(root, "button").unwrap();
        assert!(!is_focusable(&doc, text));
        assert_eq!(order(&doc, root), vec![button]);
        assert!(order(&doc, text).is_empty());
    }

    #[test]
    fn unknown_root_yields_empty() {
        let doc = Document::new();
        assert!(tabbable_sequence(&doc, NodeId::from_raw(4242)).is_empty());
    }

    #[test]
    fn sequence_reports_positions() {
        let mut doc = Document::new();
        let root = doc.append_element(doc.body(), "div").unwrap();
        let a = doc.append_element(root, "input").unwrap();
        let b = with_tabindex(&mut doc, root, "div", 5);
        let seq = tabbable_sequence(&doc, root);
        assert_eq!(seq.position(b), Some(0));
        assert_eq!(seq.position(a), Some(1));
        assert_eq!(seq.position(root), None);
        assert_eq!(seq.first().map(|n| n.tab_order), Some(5));
        assert_eq!(seq.last().map(|n| n.element), Some(a));
    }

    #[test]
    fn insert_matches_stable_sort() {
        let nodes: Vec<TabbableNode> = [0, 4, 2, 0, 4, 1, 0, 2]
            .iter()
            .enumerate()
            .map(|(i, &t)| TabbableNode::new(NodeId::from_raw(i as u32), t))
            .collect();
        let inserted: TabbableSequence = nodes.iter().copied().collect();
        let mut sorted = nodes.clone();
        sorted.sort_by(TabbableNode::cmp_order);
        assert_eq!(inserted.into_vec(), sorted);
    }
}
