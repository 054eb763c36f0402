#![forbid(unsafe_code)]

//! Input events delivered to focus-aware widgets.
//!
//! Events are plain values. A click carries its full propagation path
//! (target first, root last) so consumers never need to inspect a
//! host-specific event object.

use bitflags::bitflags;

use crate::dom::{DomTree, NodeId};

/// Key identity, independent of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    Tab,
    Escape,
    Enter,
    Space,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Char(char),
    F(u8),
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Press / repeat / release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Press or auto-repeat (the kinds that trigger keydown handlers).
    #[inline]
    #[must_use]
    pub fn is_down(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// A pointer click with its resolved propagation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    path: Vec<NodeId>,
}

impl ClickEvent {
    /// Build from an explicit path (originating target first).
    #[must_use]
    pub fn new(path: Vec<NodeId>) -> Self {
        Self { path }
    }

    /// Build by walking `tree` from `target` to its root.
    #[must_use]
    pub fn at(tree: &impl DomTree, target: NodeId) -> Self {
        Self {
            path: tree.propagation_path(target),
        }
    }

    /// Originating (deepest) target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.path.first().copied()
    }

    /// Full path, target first.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }
}

/// Focus gained or lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusEvent {
    /// Element gaining (focus) or losing (blur) focus.
    pub target: NodeId,
    /// The other side of the transition; `None` when focus comes from or goes
    /// to outside the document.
    pub related_target: Option<NodeId>,
}

impl FocusEvent {
    #[must_use]
    pub const fn new(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self {
            target,
            related_target,
        }
    }
}

/// Every event a dialog controller can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Click(ClickEvent),
    Focus(FocusEvent),
    Blur(FocusEvent),
    /// The rendering collaborator finished an animation on `target`.
    AnimationEnd { target: NodeId },
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<ClickEvent> for Event {
    fn from(click: ClickEvent) -> Self {
        Self::Click(click)
    }
}

bitflags! {
    /// What a handler did to the event it received.
    ///
    /// The host applies these after the handler returns.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Handled: u8 {
        /// Suppress the host's default action (e.g. native tab navigation).
        const PREVENT_DEFAULT = 0b001;
        /// Do not propagate to further targets.
        const STOP_PROPAGATION = 0b010;
        /// Do not call any other listener, including ones on the same target.
        const STOP_IMMEDIATE_PROPAGATION = 0b110;
    }
}
