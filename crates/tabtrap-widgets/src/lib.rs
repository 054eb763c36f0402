#![forbid(unsafe_code)]

//! Widgets for tabtrap.
//!
//! Currently a single widget family: the modal [`modal::Dialog`] with its
//! focus trap, outside-click and Escape handling, and focus save/restore.

pub mod modal;
