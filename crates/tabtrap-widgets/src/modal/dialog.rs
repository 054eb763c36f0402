#![forbid(unsafe_code)]

//! Focus-trap dialog controller.
//!
//! A [`Dialog`] owns the open/closed state of one dialog instance and reacts
//! to the events its [`Environment`] routes to it. It never touches global
//! state directly.
//!
//! # Invariants
//!
//! - `open` and `close` are idempotent; a repeated call is a no-op.
//! - Every listener attached by `open` is detached by the matching `close`
//!   (or by `disconnect`). Scroll is locked exactly once per open cycle.
//! - The saved focus is consumed by the close that follows the open that
//!   captured it.
//! - `cursor == 0` is the sentinel; otherwise `cursor - 1` indexes the
//!   tabbable sequence computed at the last Tab/focus event.
//!
//! # Failure Modes
//!
//! Nothing here fails. Events carrying ids outside the dialog are ignored,
//! and a stale cursor is clamped on the next Tab.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tabtrap_a11y::{TabbableSequence, tabbable_sequence};
use tabtrap_core::dom::{DomTree, NodeId};
use tabtrap_core::event::{ClickEvent, Event, FocusEvent, Handled, KeyCode, KeyEvent};
use tracing::{debug, trace, warn};

use super::config::{CANCEL_MARKER, CONFIRM_MARKER, DialogConfig};
use super::environment::{DialogEvent, Environment, Listeners};

/// Attribute reflecting the open state to assistive technology.
pub const ARIA_HIDDEN_ATTR: &str = "aria-hidden";

/// Global counter for unique dialog IDs.
static DIALOG_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a dialog instance; owner key for its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(u64);

impl DialogId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(DIALOG_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for DialogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

/// Structural elements of a dialog.
///
/// `backdrop` and `content` are expected to be descendants of `host`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogParts {
    pub host: NodeId,
    pub backdrop: NodeId,
    pub content: NodeId,
}

/// Mutable state of one dialog instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogState {
    pub opened: bool,
    /// Trap cursor; `0` is the sentinel.
    pub cursor: usize,
    /// Element focused before the current open cycle.
    pub saved_focus: Option<NodeId>,
    /// Outcome of the current cycle, read by the close notification.
    pub canceled: Option<bool>,
    /// Hiding the host waits for an animation-completion notification.
    pub pending_hide: bool,
}

/// Modal dialog controller with a keyboard focus trap.
#[derive(Debug)]
pub struct Dialog {
    id: DialogId,
    parts: DialogParts,
    config: DialogConfig,
    state: DialogState,
    attached: Listeners,
    connected: bool,
}

impl Dialog {
    /// Create a closed dialog over `parts` with the default configuration.
    #[must_use]
    pub fn new(parts: DialogParts) -> Self {
        Self::with_config(parts, DialogConfig::default())
    }

    #[must_use]
    pub fn with_config(parts: DialogParts, config: DialogConfig) -> Self {
        Self {
            id: DialogId::new(),
            parts,
            config,
            state: DialogState::default(),
            attached: Listeners::empty(),
            connected: false,
        }
    }

    // --- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> DialogId {
        self.id
    }

    #[must_use]
    pub fn parts(&self) -> DialogParts {
        self.parts
    }

    #[must_use]
    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.opened
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Current trap cursor (`0` = sentinel).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Listeners currently registered with the environment.
    #[must_use]
    pub fn attached_listeners(&self) -> Listeners {
        self.attached
    }

    // --- Lifecycle ----------------------------------------------------------

    /// Attach the dialog to its environment.
    ///
    /// Hides a closed host immediately (no closing animation on first paint)
    /// and reflects `role`, `aria-hidden` and the backdrop state.
    pub fn connect<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.connected {
            return;
        }
        self.connected = true;
        let host = self.parts.host;
        if !self.state.opened {
            env.set_hidden(host, true);
        }
        env.set_attribute(host, "role", &self.config.role);
        env.set_attribute(host, ARIA_HIDDEN_ATTR, bool_str(!self.state.opened));
        env.set_hidden(self.parts.backdrop, !self.config.show_backdrop);
        self.attach_instance(env, Listeners::ANIMATION_END);
        debug!(dialog = %self.id, "dialog connected");
    }

    /// Detach the dialog from its environment, releasing every listener.
    ///
    /// An open dialog is torn down silently: scroll is unlocked and the state
    /// becomes closed, but no notification is dispatched.
    pub fn disconnect<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.state.opened {
            self.state.opened = false;
            self.state.saved_focus = None;
            self.state.cursor = 0;
            self.state.pending_hide = false;
            env.unlock_scroll();
        }
        self.detach(env, Listeners::all());
        if self.connected {
            self.connected = false;
            debug!(dialog = %self.id, "dialog disconnected");
        }
    }

    /// Open the dialog. No-op when already open.
    pub fn open<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.state.opened {
            return;
        }
        self.state.opened = true;
        self.state.canceled = None;
        self.state.pending_hide = false;
        self.state.cursor = 0;

        let body = env.body();
        self.state.saved_focus = env.active_element().filter(|&active| active != body);
        if let Some(previous) = self.state.saved_focus {
            env.blur(previous);
        }

        let host = self.parts.host;
        env.set_hidden(host, false);
        env.add_global_key_listener(self.id);
        env.add_global_listener(self.id, Listeners::CLICK);
        self.attached |= Listeners::GLOBAL;
        self.attach_instance(env, Listeners::TRAP | Listeners::ANIMATION_END);
        env.set_attribute(host, ARIA_HIDDEN_ATTR, "false");
        env.lock_scroll();

        debug!(dialog = %self.id, saved_focus = ?self.state.saved_focus, "dialog opened");
        env.dispatch(self.id, DialogEvent::Open);
    }

    /// Close the dialog. No-op when already closed.
    ///
    /// The close notification carries whatever outcome `confirm`/`cancel`
    /// recorded, or `None` for a plain close.
    pub fn close<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if !self.state.opened {
            return;
        }
        self.state.opened = false;

        if let Some(previous) = self.state.saved_focus.take() {
            env.focus(previous);
        }

        let host = self.parts.host;
        if self.has_animation(env.tree()) {
            self.state.pending_hide = true;
        } else {
            env.set_hidden(host, true);
        }
        self.detach(env, Listeners::GLOBAL | Listeners::TRAP);
        env.set_attribute(host, ARIA_HIDDEN_ATTR, "true");
        env.unlock_scroll();
        self.state.cursor = 0;

        let canceled = self.state.canceled;
        debug!(dialog = %self.id, ?canceled, pending_hide = self.state.pending_hide, "dialog closed");
        env.dispatch(self.id, DialogEvent::Close { canceled });
    }

    /// Resolve the dialog positively and close it.
    pub fn confirm<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if !self.state.opened {
            return;
        }
        debug!(dialog = %self.id, "dialog confirmed");
        self.state.canceled = Some(false);
        self.close(env);
    }

    /// Resolve the dialog negatively and close it.
    pub fn cancel<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if !self.state.opened {
            return;
        }
        debug!(dialog = %self.id, "dialog canceled");
        self.state.canceled = Some(true);
        self.close(env);
    }

    // --- Properties ---------------------------------------------------------

    pub fn set_opened<E: Environment + ?Sized>(&mut self, env: &mut E, opened: bool) {
        if opened {
            self.open(env);
        } else {
            self.close(env);
        }
    }

    /// Show or hide the backdrop. The focus trap follows the backdrop.
    pub fn set_show_backdrop<E: Environment + ?Sized>(&mut self, env: &mut E, show: bool) {
        if self.config.show_backdrop == show {
            return;
        }
        self.config.show_backdrop = show;
        env.set_hidden(self.parts.backdrop, !show);
    }

    pub fn set_close_on_escape(&mut self, close: bool) {
        self.config.close_on_escape = close;
    }

    pub fn set_close_on_outside_click(&mut self, close: bool) {
        self.config.close_on_outside_click = close;
    }

    // --- Event handling -----------------------------------------------------

    /// Route an event to its handler if the matching listener is attached.
    ///
    /// Focus, blur and animation-end are instance-scoped and only handled
    /// when their target lies within the host.
    pub fn handle_event<E: Environment + ?Sized>(&mut self, env: &mut E, event: &Event) -> Handled {
        let host = self.parts.host;
        match event {
            Event::Key(key) if self.attached.contains(Listeners::KEYDOWN) => {
                self.on_key_down(env, key)
            }
            Event::Click(click) if self.attached.contains(Listeners::CLICK) => {
                self.on_click(env, click)
            }
            Event::Focus(focus)
                if self.attached.contains(Listeners::FOCUS)
                    && env.tree().contains(host, focus.target) =>
            {
                self.on_focus(&*env, focus);
                Handled::empty()
            }
            Event::Blur(blur)
                if self.attached.contains(Listeners::BLUR)
                    && env.tree().contains(host, blur.target) =>
            {
                self.on_blur(blur);
                Handled::empty()
            }
            Event::AnimationEnd { target }
                if self.attached.contains(Listeners::ANIMATION_END)
                    && env.tree().contains(host, *target) =>
            {
                self.on_animation_end(env);
                Handled::empty()
            }
            _ => Handled::empty(),
        }
    }

    /// Dispatch a key press to the Tab or Escape handler.
    pub fn on_key_down<E: Environment + ?Sized>(&mut self, env: &mut E, key: &KeyEvent) -> Handled {
        if !key.is_down() {
            return Handled::empty();
        }
        match key.code {
            KeyCode::Tab => self.on_tab(env, key.shift()),
            KeyCode::Escape => self.on_esc(env),
            _ => Handled::empty(),
        }
    }

    /// Move trap focus one step forward (or backward with `shift`).
    ///
    /// Inactive while the backdrop is hidden. Otherwise always suppresses the
    /// native navigation.
    pub fn on_tab<E: Environment + ?Sized>(&mut self, env: &mut E, shift: bool) -> Handled {
        if !self.config.show_backdrop {
            return Handled::empty();
        }
        let sequence = self.tabbable(env.tree());
        let from = self.state.cursor;
        self.state.cursor = self.config.wrap.step(from, sequence.len(), !shift);
        trace!(dialog = %self.id, from, to = self.state.cursor, len = sequence.len(), "trap cursor moved");

        match self.state.cursor.checked_sub(1).and_then(|i| sequence.get(i)) {
            Some(node) => env.focus(node.element),
            None => env.blur_active(),
        }
        Handled::PREVENT_DEFAULT
    }

    /// Cancel on Escape and keep other listeners from seeing the key.
    pub fn on_esc<E: Environment + ?Sized>(&mut self, env: &mut E) -> Handled {
        if !self.config.close_on_escape {
            return Handled::empty();
        }
        self.cancel(env);
        Handled::STOP_IMMEDIATE_PROPAGATION
    }

    /// Handle a click anywhere in the document.
    ///
    /// Clicks that never pass through the host are ignored. A click on the
    /// backdrop or the bare host counts as an outside click. Otherwise the
    /// path is walked from the target up to the content boundary looking for
    /// a cancel or confirm marker.
    pub fn on_click<E: Environment + ?Sized>(&mut self, env: &mut E, click: &ClickEvent) -> Handled {
        let Some(target) = click.target() else {
            return Handled::empty();
        };
        let DialogParts {
            host,
            backdrop,
            content,
        } = self.parts;
        let path = click.path();
        if !path.contains(&host) {
            return Handled::empty();
        }

        if target == backdrop || target == host {
            if self.config.close_on_outside_click {
                trace!(dialog = %self.id, %target, "outside click");
                self.cancel(env);
            }
            return Handled::empty();
        }

        for &node in path {
            let tree = env.tree();
            if tree.has_attribute(node, CANCEL_MARKER) {
                self.cancel(env);
                break;
            }
            if tree.has_attribute(node, CONFIRM_MARKER) {
                self.confirm(env);
                break;
            }
            if node == content || node == host {
                break;
            }
        }
        Handled::empty()
    }

    /// Sync the cursor with an element that gained focus.
    pub fn on_focus<E: Environment + ?Sized>(&mut self, env: &E, event: &FocusEvent) {
        let sequence = self.tabbable(env.tree());
        self.state.cursor = sequence.position(event.target).map_or(0, |i| i + 1);
        trace!(dialog = %self.id, target = %event.target, cursor = self.state.cursor, "focus synced");
    }

    /// Reset the cursor when focus leaves the document.
    pub fn on_blur(&mut self, event: &FocusEvent) {
        if event.related_target.is_none() {
            self.state.cursor = 0;
        }
    }

    /// Finish a deferred hide once the closing animation completes.
    pub fn on_animation_end<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.state.opened {
            return;
        }
        self.state.pending_hide = false;
        env.set_hidden(self.parts.host, true);
    }

    /// Whether closing the host plays an animation.
    ///
    /// Any inline `animation-duration` counts as "no animation"; otherwise
    /// the computed duration must be non-zero.
    #[must_use]
    pub fn has_animation<T: DomTree + ?Sized>(&self, tree: &T) -> bool {
        let host = self.parts.host;
        tree.inline_style(host).animation_duration.is_none()
            && tree.computed_style(host).is_animated()
    }

    /// Current tabbable sequence of the dialog content.
    #[must_use]
    pub fn tabbable<T: DomTree + ?Sized>(&self, tree: &T) -> TabbableSequence {
        tabbable_sequence(tree, self.parts.content)
    }

    // --- Internals ----------------------------------------------------------

    fn attach_instance<E: Environment + ?Sized>(&mut self, env: &mut E, listeners: Listeners) {
        let fresh = listeners - self.attached;
        if !fresh.is_empty() {
            env.add_instance_listener(self.id, fresh);
            self.attached |= fresh;
        }
    }

    fn detach<E: Environment + ?Sized>(&mut self, env: &mut E, listeners: Listeners) {
        let global = self.attached & listeners & Listeners::GLOBAL;
        if global.contains(Listeners::KEYDOWN) {
            env.remove_global_key_listener(self.id);
        }
        let global_rest = global - Listeners::KEYDOWN;
        if !global_rest.is_empty() {
            env.remove_global_listener(self.id, global_rest);
        }
        let instance = self.attached & listeners & !Listeners::GLOBAL;
        if !instance.is_empty() {
            env.remove_instance_listener(self.id, instance);
        }
        self.attached -= listeners;
    }
}

impl Drop for Dialog {
    fn drop(&mut self) {
        if !self.attached.is_empty() {
            warn!(
                dialog = %self.id,
                listeners = ?self.attached,
                "dialog dropped with listeners still attached; call disconnect() first"
            );
        }
    }
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::DialogFixture;
    use tracing_test::traced_test;

    #[test]
    fn dialog_ids_are_unique() {
        let a = DialogId::new();
        let b = DialogId::new();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
        assert!(a.to_string().starts_with("dialog#"));
    }

    #[test]
    fn new_dialog_is_closed_and_detached() {
        let parts = DialogParts {
            host: NodeId::from_raw(2),
            backdrop: NodeId::from_raw(3),
            content: NodeId::from_raw(4),
        };
        let dialog = Dialog::new(parts);
        assert!(!dialog.is_open());
        assert!(!dialog.is_connected());
        assert_eq!(dialog.cursor(), 0);
        assert_eq!(dialog.state().canceled, None);
        assert!(dialog.attached_listeners().is_empty());
        assert_eq!(dialog.parts(), parts);
    }

    #[test]
    fn bool_reflection() {
        assert_eq!(bool_str(true), "true");
        assert_eq!(bool_str(false), "false");
    }

    #[traced_test]
    #[test]
    fn lifecycle_is_logged() {
        let mut fx = DialogFixture::new().unwrap();
        let mut dialog = fx.dialog(DialogConfig::default());
        dialog.connect(&mut fx.env);
        dialog.open(&mut fx.env);
        dialog.cancel(&mut fx.env);
        dialog.disconnect(&mut fx.env);
        assert!(logs_contain("dialog opened"));
        assert!(logs_contain("dialog canceled"));
        assert!(logs_contain("dialog closed"));
        assert!(!logs_contain("listeners still attached"));
    }

    #[traced_test]
    #[test]
    fn dropping_attached_dialog_warns() {
        let mut fx = DialogFixture::new().unwrap();
        let mut dialog = fx.dialog(DialogConfig::default());
        dialog.open(&mut fx.env);
        drop(dialog);
        assert!(logs_contain("listeners still attached"));
    }
}
