// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache store operations.

/// An error from a cache store operation.
///
/// This is an opaque error type that can wrap any underlying error from a
/// store implementation. The cache-aside engine treats every store failure
/// the same way (degrade to direct computation), so the only contract here is
/// [`std::fmt::Display`] and the [`std::error::Error::source()`] chain.
///
/// # Example
///
/// ```
/// use aside_store::Error;
///
/// let error = Error::from_message("connection reset");
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// This is the public API for creating store errors from external crates.
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_store::Error;
    ///
    /// let error = Error::from_message("operation failed");
    /// ```
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }
}

/// A specialized [`Result`] type for cache store operations.
pub type Result<T> = std::result::Result<T, Error>;
