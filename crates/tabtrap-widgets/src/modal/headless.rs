#![forbid(unsafe_code)]

//! In-memory [`Environment`] backed by a [`Document`].
//!
//! Listener registrations are recorded per owner instead of being wired to
//! real callbacks; the caller feeds events to [`Dialog::handle_event`]
//! itself. Scroll lock sets `overflow: hidden` on the document root and
//! restores the previous inline value when the last lock is released.

use ahash::AHashMap;
use tabtrap_core::dom::{Document, DomError, DomTree, HIDDEN_ATTR, NodeId};
use tabtrap_core::event::{ClickEvent, Event, FocusEvent};
use tabtrap_style::Overflow;
use tracing::debug;

use super::config::DialogConfig;
use super::dialog::{Dialog, DialogId, DialogParts};
use super::environment::{DialogEvent, Environment, Listeners};

/// Tag used for the dialog host built by [`DialogFixture`].
pub const HOST_TAG: &str = "tabtrap-dialog";

/// Headless environment for tests and tooling.
#[derive(Debug, Default)]
pub struct HeadlessEnvironment {
    document: Document,
    global: AHashMap<DialogId, Listeners>,
    instance: AHashMap<DialogId, Listeners>,
    scroll_locks: usize,
    saved_overflow: Option<Overflow>,
    events: Vec<(DialogId, DialogEvent)>,
}

impl HeadlessEnvironment {
    /// Wrap an existing document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Notifications dispatched so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[(DialogId, DialogEvent)] {
        &self.events
    }

    /// Drain the recorded notifications.
    pub fn take_events(&mut self) -> Vec<(DialogId, DialogEvent)> {
        std::mem::take(&mut self.events)
    }

    /// Document-level listeners registered by `owner`.
    #[must_use]
    pub fn global_listeners(&self, owner: DialogId) -> Listeners {
        self.global.get(&owner).copied().unwrap_or_default()
    }

    /// Instance-level listeners registered by `owner`.
    #[must_use]
    pub fn instance_listeners(&self, owner: DialogId) -> Listeners {
        self.instance.get(&owner).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locks > 0
    }

    /// Number of outstanding scroll locks.
    #[must_use]
    pub fn scroll_lock_depth(&self) -> usize {
        self.scroll_locks
    }

    /// A click on `target` carrying its full propagation path.
    #[must_use]
    pub fn click(&self, target: NodeId) -> Event {
        Event::Click(ClickEvent::at(&self.document, target))
    }

    /// Focus `target` and build the matching focus event.
    ///
    /// `related_target` is the element that held focus before, if any.
    pub fn focus_with_event(&mut self, target: NodeId) -> Event {
        let previous = self.document.focused();
        self.document.focus(target);
        Event::Focus(FocusEvent::new(target, previous))
    }

    fn record(map: &mut AHashMap<DialogId, Listeners>, owner: DialogId, listeners: Listeners, add: bool) {
        let entry = map.entry(owner).or_default();
        if add {
            *entry |= listeners;
        } else {
            *entry -= listeners;
        }
        if entry.is_empty() {
            map.remove(&owner);
        }
    }

    fn ignore(result: Result<(), DomError>) {
        if let Err(err) = result {
            debug!(%err, "ignored environment mutation");
        }
    }
}

impl Environment for HeadlessEnvironment {
    type Tree = Document;

    fn tree(&self) -> &Document {
        &self.document
    }

    fn body(&self) -> NodeId {
        self.document.body()
    }

    fn active_element(&self) -> Option<NodeId> {
        Some(self.document.active_element())
    }

    fn focus(&mut self, element: NodeId) {
        self.document.focus(element);
    }

    fn blur(&mut self, element: NodeId) {
        self.document.blur(element);
    }

    fn set_hidden(&mut self, element: NodeId, hidden: bool) {
        Self::ignore(self.document.toggle_attribute(element, HIDDEN_ATTR, hidden));
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        Self::ignore(self.document.set_attribute(element, name, value));
    }

    fn add_global_listener(&mut self, owner: DialogId, listeners: Listeners) {
        Self::record(&mut self.global, owner, listeners, true);
    }

    fn remove_global_listener(&mut self, owner: DialogId, listeners: Listeners) {
        Self::record(&mut self.global, owner, listeners, false);
    }

    fn add_instance_listener(&mut self, owner: DialogId, listeners: Listeners) {
        Self::record(&mut self.instance, owner, listeners, true);
    }

    fn remove_instance_listener(&mut self, owner: DialogId, listeners: Listeners) {
        Self::record(&mut self.instance, owner, listeners, false);
    }

    fn lock_scroll(&mut self) {
        if self.scroll_locks == 0 {
            let root = self.document.root();
            self.saved_overflow = self.document.inline_style(root).overflow;
            Self::ignore(
                self.document
                    .update_inline_style(root, |style| style.overflow = Some(Overflow::Hidden)),
            );
        }
        self.scroll_locks += 1;
    }

    fn unlock_scroll(&mut self) {
        if self.scroll_locks == 0 {
            return;
        }
        self.scroll_locks -= 1;
        if self.scroll_locks == 0 {
            let root = self.document.root();
            let restored = self.saved_overflow.take();
            Self::ignore(
                self.document
                    .update_inline_style(root, |style| style.overflow = restored),
            );
        }
    }

    fn dispatch(&mut self, source: DialogId, event: DialogEvent) {
        debug!(dialog = %source, event = event.name(), "dialog event");
        self.events.push((source, event));
    }
}

/// A document with a dialog skeleton: `body > host > [backdrop, content]`.
#[derive(Debug)]
pub struct DialogFixture {
    pub env: HeadlessEnvironment,
    pub parts: DialogParts,
}

impl DialogFixture {
    /// Build the skeleton in a fresh document.
    pub fn new() -> Result<Self, DomError> {
        let mut document = Document::new();
        let host = document.append_element(document.body(), HOST_TAG)?;
        let backdrop = document.append_element(host, "div")?;
        document.set_attribute(backdrop, "id", "backdrop")?;
        let content = document.append_element(host, "div")?;
        document.set_attribute(content, "id", "dialog")?;
        Ok(Self {
            env: HeadlessEnvironment::new(document),
            parts: DialogParts {
                host,
                backdrop,
                content,
            },
        })
    }

    /// Append an element to the dialog content.
    pub fn add(&mut self, tag: &str) -> Result<NodeId, DomError> {
        self.env.document.append_element(self.parts.content, tag)
    }

    /// Append an element with an explicit `tabindex` below `parent`.
    pub fn add_with_tabindex(
        &mut self,
        parent: NodeId,
        tag: &str,
        tabindex: i32,
    ) -> Result<NodeId, DomError> {
        let id = self.env.document.append_element(parent, tag)?;
        self.env
            .document
            .set_attribute(id, "tabindex", tabindex.to_string())?;
        Ok(id)
    }

    /// Append an element to `<body>`, outside the dialog.
    pub fn add_outside(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let body = self.env.document.body();
        self.env.document.append_element(body, tag)
    }

    /// A dialog over this skeleton.
    #[must_use]
    pub fn dialog(&self, config: DialogConfig) -> Dialog {
        Dialog::with_config(self.parts, config)
    }
}
