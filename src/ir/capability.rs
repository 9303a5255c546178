//! Narrow query capabilities shared by otherwise unrelated declarations.
//!
//! Fields and methods can be static; fields, methods and nested types have
//! an enclosing type. Passes that only need one of these questions answered
//! can take `&impl CanBeStatic` instead of a concrete node type.

use super::TypeId;

/// An entity that belongs either to its enclosing type or to its instances.
pub trait CanBeStatic {
    fn is_static(&self) -> bool;
}

/// An entity that can name the declared type containing it.
pub trait HasEnclosingType {
    /// `None` only for top-level declared types.
    fn enclosing_type(&self) -> Option<TypeId>;
}

/// Count the static members among `items`.
pub fn count_static<'a, T>(items: impl IntoIterator<Item = &'a T>) -> usize
where
    T: CanBeStatic + 'a,
{
    items.into_iter().filter(|item| item.is_static()).count()
}
