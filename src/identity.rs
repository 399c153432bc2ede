//! Service identity keys.

use std::fmt;

use crate::type_ref::TypeRef;

/// The resolved key for one graph node.
///
/// Distinguishes a service by type, optional name, and an optional reverse
/// index that separates the Nth of several unnamed registrations of the same
/// type, counted from the most-recently-declared one. The most recent
/// registration of a group carries no reverse index and answers the
/// unqualified request for that (type, name) pair.
///
/// # Examples
///
/// ```
/// use ferrous_graph::{ServiceIdentity, TypeRef};
///
/// let ty = TypeRef::named("app", "Handler");
/// let main = ServiceIdentity::new(ty.clone());
/// assert!(main.is_main_implementation());
///
/// let earlier = ServiceIdentity::indexed(ty.clone(), 1);
/// assert!(!earlier.is_main_implementation());
///
/// let named = ServiceIdentity::named(ty, "primary");
/// assert!(named.is_main_named_implementation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    /// The requested service type.
    pub ty: TypeRef,
    /// Optional registration name.
    pub name: Option<String>,
    /// Distance from the most-recently-declared registration of the same
    /// (type, name) group; `None` for the most recent one.
    pub reverse_index: Option<u32>,
}

impl ServiceIdentity {
    /// The main, unnamed identity for a type.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            name: None,
            reverse_index: None,
        }
    }

    /// The main identity within a name group.
    pub fn named(ty: TypeRef, name: &str) -> Self {
        Self {
            ty,
            name: Some(name.to_string()),
            reverse_index: None,
        }
    }

    /// An earlier unnamed registration, `reverse_index` steps before the
    /// most recent one.
    pub fn indexed(ty: TypeRef, reverse_index: u32) -> Self {
        Self {
            ty,
            name: None,
            reverse_index: Some(reverse_index),
        }
    }

    /// True only for the single registration that answers the unqualified
    /// "give me a T" request.
    pub fn is_main_implementation(&self) -> bool {
        self.name.is_none() && self.reverse_index.is_none()
    }

    /// True for the registration that answers the unindexed request within
    /// its name group.
    pub fn is_main_named_implementation(&self) -> bool {
        self.name.is_some() && self.reverse_index.is_none()
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if let Some(name) = &self.name {
            write!(f, " (name: {})", name)?;
        }
        if let Some(idx) = self.reverse_index {
            write!(f, " (#{})", idx)?;
        }
        Ok(())
    }
}
