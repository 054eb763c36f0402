#![forbid(unsafe_code)]

//! tabtrap public facade.
//!
//! Re-exports the member crates and a [`prelude`] with the types most
//! callers need.

pub use tabtrap_a11y as a11y;
pub use tabtrap_core as core;
pub use tabtrap_style as style;
#[cfg(feature = "widgets")]
pub use tabtrap_widgets as widgets;

pub use tabtrap_a11y::{TabbableNode, TabbableSequence, tabbable_sequence};
pub use tabtrap_core::{Document, DomError, DomTree, Event, Handled, NodeId};

pub mod prelude {
    pub use tabtrap_a11y::{TabbableNode, TabbableSequence, is_tabbable, tabbable_sequence};
    pub use tabtrap_core::{
        ClickEvent, Document, DomError, DomTree, Event, FocusEvent, Handled, KeyCode, KeyEvent,
        Modifiers, NodeId,
    };
    pub use tabtrap_style::{ComputedStyle, Display, StyleDecl, Visibility};

    #[cfg(feature = "widgets")]
    pub use tabtrap_widgets::modal::{
        Dialog, DialogConfig, DialogEvent, DialogParts, Environment, WrapPolicy,
    };

    #[cfg(feature = "test-helpers")]
    pub use tabtrap_widgets::modal::{DialogFixture, HeadlessEnvironment};
}
