//! Error types returned by the cache's fallible operations.

use thiserror::Error;

/// Returned by a non-replacing [`put`](crate::Cache::put) when the key is
/// already present. The existing entry is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("key already present in cache")]
pub struct AlreadyPresent;

/// Returned by [`delete`](crate::Cache::delete) when the key is absent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("key not found in cache")]
pub struct NotFound;
