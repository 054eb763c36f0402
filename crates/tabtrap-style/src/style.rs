#![forbid(unsafe_code)]

//! Declared and computed styles.
//!
//! A [`StyleDecl`] is sparse: every property is optional, mirroring an inline
//! `style` attribute or the winning declarations of a stylesheet. A
//! [`ComputedStyle`] is dense and is produced by [`StyleDecl::cascade`].
//!
//! # Cascade
//!
//! For each property the first source that declares it wins:
//!
//! 1. inline declaration
//! 2. sheet declaration
//! 3. parent computed value (inherited properties only)
//! 4. initial value
//!
//! | Property | Inherited | Initial |
//! |----------|-----------|---------|
//! | `display` | no | `block` |
//! | `visibility` | yes | `visible` |
//! | `overflow` | no | `visible` |
//! | `animation-duration` | no | `0s` |

use web_time::Duration;

/// The `display` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
}

impl Display {
    /// Whether this value removes the element from rendering.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// The `visibility` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    #[inline]
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// The `overflow` property (used as the scroll-lock switch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

/// Sparse style declaration block.
///
/// `None` means "not declared here"; it is distinct from declaring the
/// initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleDecl {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub overflow: Option<Overflow>,
    pub animation_duration: Option<Duration>,
}

impl StyleDecl {
    /// An empty declaration block.
    pub const EMPTY: Self = Self {
        display: None,
        visibility: None,
        overflow: None,
        animation_duration: None,
    };

    /// Create an empty declaration block.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Declare `display`.
    #[must_use]
    pub fn display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    /// Declare `visibility`.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Declare `overflow`.
    #[must_use]
    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = Some(overflow);
        self
    }

    /// Declare `animation-duration`.
    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = Some(duration);
        self
    }

    /// Shorthand for `display: none`.
    #[must_use]
    pub fn hidden() -> Self {
        Self::new().display(Display::None)
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Whether this block alone hides the element
    /// (`display: none` or `visibility: hidden`).
    #[must_use]
    pub fn hides(&self) -> bool {
        self.display.is_some_and(Display::is_none)
            || self.visibility.is_some_and(Visibility::is_hidden)
    }

    /// Layer `self` over `fallback`: properties declared here win.
    #[must_use]
    pub fn merge(self, fallback: Self) -> Self {
        Self {
            display: self.display.or(fallback.display),
            visibility: self.visibility.or(fallback.visibility),
            overflow: self.overflow.or(fallback.overflow),
            animation_duration: self.animation_duration.or(fallback.animation_duration),
        }
    }

    /// Resolve `self` (inline) over `sheet` against the parent's computed style.
    ///
    /// `parent` is `None` for the document root.
    #[must_use]
    pub fn cascade(self, sheet: Self, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let declared = self.merge(sheet);
        let initial = ComputedStyle::INITIAL;
        ComputedStyle {
            display: declared.display.unwrap_or(initial.display),
            visibility: declared
                .visibility
                .or(parent.map(|p| p.visibility))
                .unwrap_or(initial.visibility),
            overflow: declared.overflow.unwrap_or(initial.overflow),
            animation_duration: declared
                .animation_duration
                .unwrap_or(initial.animation_duration),
        }
    }
}

/// Fully resolved style of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub overflow: Overflow,
    pub animation_duration: Duration,
}

impl ComputedStyle {
    /// Initial values for every property.
    pub const INITIAL: Self = Self {
        display: Display::Block,
        visibility: Visibility::Visible,
        overflow: Overflow::Visible,
        animation_duration: Duration::ZERO,
    };

    /// Whether the resolved style hides the element.
    #[must_use]
    pub fn hides(&self) -> bool {
        self.display.is_none() || self.visibility.is_hidden()
    }

    /// Whether a non-zero animation is in effect.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        !self.animation_duration.is_zero()
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_decl_resolves_to_initial() {
        let computed = StyleDecl::new().cascade(StyleDecl::new(), None);
        assert_eq!(computed, ComputedStyle::INITIAL);
        assert!(!computed.hides());
        assert!(!computed.is_animated());
    }

    #[test]
    fn inline_wins_over_sheet() {
        let inline = StyleDecl::new().display(Display::Flex);
        let sheet = StyleDecl::new().display(Display::None);
        let computed = inline.cascade(sheet, None);
        assert_eq!(computed.display, Display::Flex);
    }

    #[test]
    fn sheet_applies_when_inline_is_silent() {
        let sheet = StyleDecl::new().visibility(Visibility::Hidden);
        let computed = StyleDecl::new().cascade(sheet, None);
        assert!(computed.hides());
    }

    #[test]
    fn visibility_inherits_but_display_does_not() {
        let parent = StyleDecl::new()
            .display(Display::None)
            .visibility(Visibility::Hidden)
            .cascade(StyleDecl::new(), None);
        let child = StyleDecl::new().cascade(StyleDecl::new(), Some(&parent));
        assert_eq!(child.visibility, Visibility::Hidden);
        assert_eq!(child.display, Display::Block);
    }

    #[test]
    fn child_can_override_inherited_visibility() {
        let parent = StyleDecl::new()
            .visibility(Visibility::Hidden)
            .cascade(StyleDecl::new(), None);
        let child = StyleDecl::new()
            .visibility(Visibility::Visible)
            .cascade(StyleDecl::new(), Some(&parent));
        assert!(!child.hides());
    }

    #[test]
    fn hides_checks_only_declared_values() {
        assert!(StyleDecl::hidden().hides());
        assert!(StyleDecl::new().visibility(Visibility::Hidden).hides());
        assert!(!StyleDecl::new().display(Display::Inline).hides());
        assert!(!StyleDecl::new().hides());
    }

    #[test]
    fn animation_duration_is_not_inherited() {
        let parent = StyleDecl::new()
            .animation_duration(Duration::from_millis(300))
            .cascade(StyleDecl::new(), None);
        assert!(parent.is_animated());
        let child = StyleDecl::new().cascade(StyleDecl::new(), Some(&parent));
        assert!(!child.is_animated());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decl_serializes_kebab_case() {
        let decl = StyleDecl::new().display(Display::InlineBlock);
        let json = serde_json::to_string(&decl).unwrap();
        assert!(json.contains("\"inline-block\""));
        let back: StyleDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decl);
    }
}
