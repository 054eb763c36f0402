#![forbid(unsafe_code)]

//! Accessibility layer for tabtrap.
//!
//! The [`tabbable`] module scans a subtree and yields the elements a keyboard
//! user reaches with sequential navigation, in native tab order.

pub mod tabbable;

pub use tabbable::{
    TabbableNode, TabbableSequence, is_focusable, is_tabbable, is_visible, tabbable_sequence,
};
