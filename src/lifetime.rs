//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior
///
/// Defines how the generated provider creates, caches, and shares service
/// instances. The resolver assigns every call site the lifetime of the
/// registration it was resolved from; the caching and disposal planners key
/// off it.
///
/// # Lifetime Characteristics
///
/// - **Singleton**: one instance per root provider, cached in a root slot
/// - **Scoped**: one instance per scope, cached in a scope slot
/// - **Transient**: fresh instance per request, never cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Lifetime {
    /// Single instance per root provider, cached forever
    ///
    /// Singleton services receive a cache slot on the root provider type.
    /// The slot is filled at most once per provider instance using
    /// double-checked lazy initialization, then shared across all scopes
    /// and threads.
    Singleton,
    /// Single instance per scope, cached for scope lifetime
    ///
    /// Scoped services receive a cache slot on the scope type. Requests for
    /// a scoped service made directly against the root provider are routed
    /// through the lazily created default scope.
    Scoped,
    /// New instance per resolution, never cached
    ///
    /// Transient services get no cache slot. If their disposability is not
    /// definitively "no", each constructed instance is still registered into
    /// the owning provider's dynamic disposables list immediately after
    /// construction.
    Transient,
}
