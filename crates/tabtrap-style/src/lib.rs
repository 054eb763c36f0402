#![forbid(unsafe_code)]

//! Style types for tabtrap with CSS-like cascading semantics.
//!
//! This crate provides:
//! - [`StyleDecl`] for a sparse set of declared properties (inline or sheet)
//! - [`ComputedStyle`] for the fully resolved value of every property
//!
//! Only the properties the focus machinery observes are modelled:
//! `display`, `visibility`, `overflow` and `animation-duration`.

pub mod style;

pub use style::{ComputedStyle, Display, Overflow, StyleDecl, Visibility};
