#![forbid(unsafe_code)]

//! Modal dialog with a keyboard focus trap.
//!
//! # Lifecycle
//!
//! ```text
//!            open()                      close() / confirm() / cancel()
//!  Closed ───────────▶ Open ─────────────────────────────────────────▶ Closed
//!    ▲                  │  Tab / Shift+Tab: move trap cursor
//!    │                  │  Escape: cancel()
//!    │                  │  click on backdrop or host: cancel()
//!    │                  │  click inside a [confirm-button]/[cancel-button]
//!    └──────────────────┘
//! ```
//!
//! Opening saves and blurs the focused element, shows the host, attaches
//! listeners, locks scroll and emits [`DialogEvent::Open`]. Closing undoes
//! each of those exactly once and emits [`DialogEvent::Close`] carrying the
//! outcome.
//!
//! # Focus Trap
//!
//! While the backdrop is shown, Tab is intercepted and focus cycles through
//! the content's tabbable sequence, recomputed on every key press. Whether
//! the cycle passes through a "nothing focused" position is selected by
//! [`WrapPolicy`].
//!
//! # Example
//!
//! The headless environment used here needs the `test-helpers` feature.
//!
//! ```
//! use tabtrap_core::event::{Event, KeyCode, KeyEvent};
//! use tabtrap_widgets::modal::{DialogConfig, DialogEvent, DialogFixture};
//!
//! let mut fx = DialogFixture::new().unwrap();
//! let ok = fx.add("button").unwrap();
//! let mut dialog = fx.dialog(DialogConfig::default());
//! dialog.connect(&mut fx.env);
//!
//! dialog.open(&mut fx.env);
//! dialog.handle_event(&mut fx.env, &Event::Key(KeyEvent::new(KeyCode::Tab)));
//! assert_eq!(fx.env.document().focused(), Some(ok));
//!
//! dialog.handle_event(&mut fx.env, &Event::Key(KeyEvent::new(KeyCode::Escape)));
//! assert_eq!(
//!     fx.env.events().last().map(|(_, e)| *e),
//!     Some(DialogEvent::Close { canceled: Some(true) })
//! );
//! dialog.disconnect(&mut fx.env);
//! ```

mod config;
mod dialog;
mod environment;
#[cfg(any(test, feature = "test-helpers"))]
mod headless;

pub use config::{CANCEL_MARKER, CONFIRM_MARKER, DIALOG_ROLE, DialogConfig, WrapPolicy};
pub use dialog::{ARIA_HIDDEN_ATTR, Dialog, DialogId, DialogParts, DialogState};
pub use environment::{DialogEvent, Environment, Listeners};
#[cfg(any(test, feature = "test-helpers"))]
pub use headless::{DialogFixture, HOST_TAG, HeadlessEnvironment};
