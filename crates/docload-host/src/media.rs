//! Media element capability

use crate::event::EventTarget;

/// Attribute that carries a media element's locator
pub const SRC_ATTRIBUTE: &str = "src";

/// An element that starts loading when its `src` locator is assigned
///
/// Mirrors host element semantics: `src()` reads the property (empty string
/// when unset) while `get_attribute` reads the raw attribute (`None` when
/// unset).
pub trait MediaElement: EventTarget {
    /// Value of the `src` property
    fn src(&self) -> String;

    /// Assign the `src` property
    fn set_src(&self, value: &str);

    /// Raw value of attribute `name`
    fn get_attribute(&self, name: &str) -> Option<String>;

    /// Assign attribute `name`
    fn set_attribute(&self, name: &str, value: &str);

    /// Remove attribute `name`
    fn remove_attribute(&self, name: &str);
}

/// Check whether `name` designates the locator attribute
#[inline]
#[must_use]
pub fn is_src_attribute(name: &str) -> bool {
    name.eq_ignore_ascii_case(SRC_ATTRIBUTE)
}
