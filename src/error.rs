use alloc::string::String;

/// Errors surfaced by window state allocation and statistic lookup.
///
/// "Not enough data" is deliberately absent: a statistic that cannot be
/// computed yet is reported as `None` by the aggregate, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The value buffer could not be allocated or grown.
    ///
    /// The window state that was being created or grown is left exactly as it
    /// was before the failing call.
    #[error("out of memory allocating a window buffer of {requested} values")]
    OutOfMemory {
        /// Number of values the failed allocation was sized for
        requested: usize,
    },
    /// A window buffer was requested with zero capacity
    #[error("window buffer capacity must be greater than zero")]
    ZeroCapacity,
    /// No statistic is registered under the given name
    #[error("unknown statistic `{0}`")]
    UnknownStatistic(String),
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
