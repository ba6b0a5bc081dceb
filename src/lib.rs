//! A bounded, thread-safe Least Frequently Used (LFU) cache with LRU
//! tie-breaking.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │          Which entries get evicted first?                  │
//! ├────────────────────────────────────────────────────────────┤
//! │  Lowest access count wins eviction.                        │
//! │  Tied on count? Least-recently-touched among them goes.     │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use cache_rs::Cache;
//!
//! let cache: Cache<&str, i32> = Cache::new(2);
//! cache.put("a", 1, false).unwrap();
//! cache.put("b", 2, false).unwrap();
//!
//! cache.get(&"a"); // "a" is now the more frequent of the two
//! cache.put("c", 3, false).unwrap(); // "b" evicted
//! assert!(cache.get(&"b").is_none());
//! ```
//!
//! ## Concurrency
//!
//! `Cache` is safe to share across threads behind an `Arc` without any
//! additional wrapping: every method takes `&self`, and a single
//! `parking_lot::RwLock` serializes writers while still allowing concurrent
//! readers of `max_size`/`current_size`. See [`cache`] for the details.
//!
//! ```rust
//! use cache_rs::Cache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(Cache::new(1_000));
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             cache.put(i, i * 10, false).unwrap();
//!             cache.get(&i);
//!         })
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(cache.current_size(), 4);
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the [`Cache`] type and its supporting frequency-bucket core.
//! - [`error`]: the two error conditions the cache can return.

/// The frequency bucket: a group of items sharing one access count.
///
/// **Note**: internal infrastructure, not part of the public API.
pub(crate) mod bucket;

/// The public cache type and the frequency-spine engine behind it.
pub mod cache;

/// Error types returned by the cache's fallible operations.
pub mod error;

/// The item node: one cached key/value pair plus its owning-bucket
/// back-reference.
///
/// **Note**: internal infrastructure, not part of the public API.
pub(crate) mod item;

/// Intrusive doubly linked list used for both the frequency spine and each
/// bucket's item list.
///
/// **Note**: internal infrastructure. Exposes unsafe raw-pointer operations
/// that require careful invariant maintenance; use [`Cache`] instead.
pub(crate) mod list;

pub use cache::Cache;
pub use error::{AlreadyPresent, NotFound};
