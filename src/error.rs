//! Crate error type.

/// Failures of the graph construction machinery itself, as opposed to
/// validation findings, which are reported as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A panic escaped the resolution of one provider. The build run
    /// converts this into a diagnostic instead of unwinding further.
    #[error("unexpected failure during graph construction: {0}")]
    Unexpected(String),
}
