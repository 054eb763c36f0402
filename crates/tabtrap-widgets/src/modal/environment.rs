#![forbid(unsafe_code)]

//! The collaborator a [`Dialog`](super::Dialog) drives.
//!
//! Everything the controller mutates outside its own state goes through
//! [`Environment`]: document focus, host visibility, attribute reflection,
//! listener registration, the shared scroll lock, and outcome notifications.
//! Hosts implement it against their real tree; tests use the in-memory
//! `HeadlessEnvironment` behind the `test-helpers` feature.

use bitflags::bitflags;
use tabtrap_core::dom::{DomTree, NodeId};

use super::DialogId;

bitflags! {
    /// Listener kinds a dialog registers.
    ///
    /// `KEYDOWN` and `CLICK` are registered on the document (capturing);
    /// `FOCUS`, `BLUR` and `ANIMATION_END` on the dialog instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Listeners: u8 {
        const KEYDOWN = 1 << 0;
        const CLICK = 1 << 1;
        const FOCUS = 1 << 2;
        const BLUR = 1 << 3;
        const ANIMATION_END = 1 << 4;

        /// Registered on the document while open.
        const GLOBAL = Self::KEYDOWN.bits() | Self::CLICK.bits();
        /// Registered on the instance while open.
        const TRAP = Self::FOCUS.bits() | Self::BLUR.bits();
    }
}

/// Outcome notification emitted by a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum DialogEvent {
    Open,
    /// `Some(false)` after confirm, `Some(true)` after cancel, `None` after a
    /// plain close.
    Close { canceled: Option<bool> },
}

impl DialogEvent {
    /// Event name as a host would dispatch it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close { .. } => "close",
        }
    }

    /// `canceled` payload of a close event.
    #[must_use]
    pub const fn canceled(&self) -> Option<bool> {
        match self {
            Self::Open => None,
            Self::Close { canceled } => *canceled,
        }
    }
}

/// Host services required by a dialog controller.
///
/// None of these may fail: stale ids are ignored by implementations.
pub trait Environment {
    type Tree: DomTree + ?Sized;

    /// Read access to the element tree.
    fn tree(&self) -> &Self::Tree;

    /// The generic document body, which never counts as "focused".
    fn body(&self) -> NodeId;

    /// The focused element, if any.
    fn active_element(&self) -> Option<NodeId>;

    /// Move focus to `element`.
    fn focus(&mut self, element: NodeId);

    /// Drop focus from `element` if it holds it.
    fn blur(&mut self, element: NodeId);

    /// Blur whatever holds focus.
    fn blur_active(&mut self) {
        if let Some(active) = self.active_element() {
            self.blur(active);
        }
    }

    /// Show or hide an element.
    fn set_hidden(&mut self, element: NodeId, hidden: bool);

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str);

    fn add_global_listener(&mut self, owner: DialogId, listeners: Listeners);

    fn remove_global_listener(&mut self, owner: DialogId, listeners: Listeners);

    fn add_instance_listener(&mut self, owner: DialogId, listeners: Listeners);

    fn remove_instance_listener(&mut self, owner: DialogId, listeners: Listeners);

    fn add_global_key_listener(&mut self, owner: DialogId) {
        self.add_global_listener(owner, Listeners::KEYDOWN);
    }

    fn remove_global_key_listener(&mut self, owner: DialogId) {
        self.remove_global_listener(owner, Listeners::KEYDOWN);
    }

    /// Suppress scrolling of the shared scrollable ancestor.
    fn lock_scroll(&mut self);

    /// Undo one [`lock_scroll`](Self::lock_scroll).
    fn unlock_scroll(&mut self);

    /// Deliver an outcome notification from `source`.
    fn dispatch(&mut self, source: DialogId, event: DialogEvent);
}
