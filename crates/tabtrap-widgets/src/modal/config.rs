#![forbid(unsafe_code)]

//! Dialog configuration and the Tab wrap-around policy.

/// Attribute that makes a descendant a confirm control.
pub const CONFIRM_MARKER: &str = "confirm-button";

/// Attribute that makes a descendant a cancel control.
pub const CANCEL_MARKER: &str = "cancel-button";

/// Default value reflected into the host's `role` attribute.
pub const DIALOG_ROLE: &str = "dialog";

/// How the trap cursor moves past either end of the tabbable sequence.
///
/// The cursor is 1-indexed against the sequence; `0` is the sentinel
/// ("no trap-managed element focused", focus is blurred).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WrapPolicy {
    /// `last -> sentinel -> first` and `first -> sentinel -> last`.
    #[default]
    ThroughSentinel,
    /// `last -> first` and `first -> last`; the sentinel is only left, never
    /// re-entered (except when nothing is tabbable).
    Direct,
}

impl WrapPolicy {
    /// Next cursor value for a sequence of `len` elements.
    ///
    /// A stale cursor (the tree shrank since it was set) is clamped to `len`
    /// before stepping. Under `ThroughSentinel` a forward step from a stale
    /// cursor therefore lands on the sentinel and blurs, rather than jumping
    /// to the first element; the next Tab reaches the first element.
    #[must_use]
    pub fn step(self, cursor: usize, len: usize, forward: bool) -> usize {
        if len == 0 {
            return 0;
        }
        let cursor = cursor.min(len);
        match self {
            Self::ThroughSentinel => {
                let positions = len + 1;
                if forward {
                    (cursor + 1) % positions
                } else {
                    (cursor + len) % positions
                }
            }
            Self::Direct => {
                if forward {
                    if cursor >= len { 1 } else { cursor + 1 }
                } else if cursor <= 1 {
                    len
                } else {
                    cursor - 1
                }
            }
        }
    }
}

/// Dialog configuration.
///
/// Every flag is observable through [`Dialog::config`](super::Dialog::config)
/// and can be changed at runtime with the dialog's property setters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DialogConfig {
    /// Show the backdrop. The focus trap is only active while it is shown.
    pub show_backdrop: bool,
    /// Escape cancels the dialog.
    pub close_on_escape: bool,
    /// A click on the backdrop or the bare host cancels the dialog.
    pub close_on_outside_click: bool,
    /// Tab wrap-around policy.
    pub wrap: WrapPolicy,
    /// Value reflected into the host's `role` attribute on connect.
    pub role: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            show_backdrop: true,
            close_on_escape: true,
            close_on_outside_click: true,
            wrap: WrapPolicy::default(),
            role: DIALOG_ROLE.to_owned(),
        }
    }
}

impl DialogConfig {
    #[must_use]
    pub fn show_backdrop(mut self, show: bool) -> Self {
        self.show_backdrop = show;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    #[must_use]
    pub fn close_on_outside_click(mut self, close: bool) -> Self {
        self.close_on_outside_click = close;
        self
    }

    #[must_use]
    pub fn wrap(mut self, wrap: WrapPolicy) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}
