#![forbid(unsafe_code)]

//! Core: DOM-like tree, focus ownership, and input events.
//!
//! The focus machinery in the higher crates never touches a concrete
//! document. It reads trees through [`dom::DomTree`] and receives input as
//! [`event::Event`] values whose click propagation path has already been
//! resolved into an ordered list of [`dom::NodeId`]s.

pub mod dom;
pub mod event;

pub use dom::{Document, DomError, DomTree, NodeId, NodeKind};
pub use event::{ClickEvent, Event, FocusEvent, Handled, KeyCode, KeyEvent, KeyEventKind, Modifiers};
