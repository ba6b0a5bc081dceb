//! Least Frequently Used (LFU) cache with LRU tie-breaking.
//!
//! An LFU cache evicts the item with the lowest access count first. When more
//! than one item shares the minimum count, the least-recently-touched among
//! them goes - a plain LFU policy has no answer for that tie, so this
//! implementation breaks it the same way an LRU cache would.
//!
//! # How the Algorithm Works
//!
//! ## Data Structure
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │                         Frequency spine (ascending)                       │
//! │                                                                           │
//! │   count=1          count=2              count=5                          │
//! │  ┌────────┐      ┌────────┐          ┌────────┐                          │
//! │  │ [new]◀─┼─MRU  │ [warm]◀┼─MRU      │ [hot] ◀┼─MRU                      │
//! │  │   ▼    │      │   ▼    │          │   ▼    │                          │
//! │  │ [cold] │      │        │          │        │                          │
//! │  │   ▼LRU │      │  LRU   │          │  LRU   │                          │
//! │  └────────┘      └────────┘          └────────┘                          │
//! │       ▲                                                                  │
//! │  next eviction victim: tail item of the lowest-count bucket              │
//! └───────────────────────────────────────────────────────────────────────────┘
//!        ▲
//!  HashMap<K, *mut item node>   -- key index, O(1) lookup into any bucket
//! ```
//!
//! - The **spine** is an intrusive list of buckets sorted by strictly
//!   increasing count.
//! - Each **bucket** is itself an intrusive list of items sharing that count.
//! - The **key index** maps keys directly to item nodes, so a `get` never
//!   walks the spine to find its target.
//!
//! Every structural edit - insert, bump, delete, evict - touches only a
//! constant number of pointers, independent of how many items or distinct
//! frequencies the cache currently holds.
//!
//! # Thread Safety
//!
//! Unlike a plain collection, [`Cache`] takes `&self` (not `&mut self`) on
//! every mutating method: a single [`parking_lot::RwLock`] guards the spine,
//! every bucket, and the key index as one atomic unit, so the type is safe to
//! share across threads via `Arc` without any external synchronization.
//! `get` takes the write lock, not the read lock, because it bumps the
//! item's frequency - it is not a read-only operation on the underlying
//! structure even though it looks like one from the caller's side.
//!
//! # Examples
//!
//! ```
//! use cache_rs::Cache;
//!
//! let cache: Cache<&str, i32> = Cache::new(2);
//! cache.put("a", 1, false).unwrap();
//! cache.put("b", 2, false).unwrap();
//!
//! // Access "a" - its frequency is now higher than "b"'s.
//! assert_eq!(cache.get(&"a"), Some(1));
//!
//! // Inserting a third key evicts "b" (lowest frequency).
//! cache.put("c", 3, false).unwrap();
//! assert_eq!(cache.get(&"b"), None);
//! assert_eq!(cache.get(&"a"), Some(1));
//! ```

use crate::bucket::Bucket;
use crate::error::{AlreadyPresent, NotFound};
use crate::item::Item;
use crate::list::{Entry, List};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// The structure actually guarded by the cache's lock.
///
/// An inner type that does the pointer work under `&mut self`, wrapped by
/// [`Cache`], which turns that into `&self` interior mutability behind a
/// lock.
///
/// # Safety
///
/// `index` holds raw pointers into nodes owned by the buckets on `spine`.
/// Those pointers stay valid as long as the owning node has not been
/// unlinked and deallocated; every method on this type that removes a node
/// removes its index entry in the same breath.
struct CacheCore<K, V, S = DefaultHashBuilder> {
    max_size: usize,
    index: HashMap<K, *mut Entry<Item<K, V>>, S>,
    spine: List<Bucket<K, V>>,
}

// SAFETY: CacheCore owns every node its pointers reference; no aliasing is
// exposed without going through `&mut self`.
unsafe impl<K: Send, V: Send, S: Send> Send for CacheCore<K, V, S> {}
unsafe impl<K: Send, V: Send, S: Sync> Sync for CacheCore<K, V, S> {}

impl<K, V, S> fmt::Debug for CacheCore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("max_size", &self.max_size)
            .field("len", &self.index.len())
            .finish()
    }
}

impl<K, V, S> CacheCore<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn with_hasher(max_size: usize, hash_builder: S) -> Self {
        CacheCore {
            max_size,
            index: HashMap::with_hasher(hash_builder),
            spine: List::new(),
        }
    }

    #[inline]
    fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    fn set_max_size(&mut self, new_max: usize) {
        self.max_size = new_max;
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the bucket with the given `count`, immediately after `pred`
    /// (or at the front of the spine, if `pred` is `None`), creating it if
    /// no such bucket exists yet. Enforces invariant (I3): the spine stays
    /// sorted by strictly increasing count.
    fn ensure_bucket_after(
        &mut self,
        pred: Option<*mut Entry<Bucket<K, V>>>,
        count: u64,
    ) -> *mut Entry<Bucket<K, V>> {
        match pred {
            None => {
                if let Some(head) = self.spine.front() {
                    // SAFETY: head came from `front()`, so it is live.
                    if unsafe { self.spine.value(head) }.count == count {
                        return head;
                    }
                }
                self.spine.push_front(Bucket::new(count))
            }
            Some(pred) => {
                // SAFETY: caller guarantees pred is a live spine node.
                if let Some(next) = unsafe { self.spine.next(pred) } {
                    if unsafe { self.spine.value(next) }.count == count {
                        return next;
                    }
                }
                unsafe { self.spine.insert_after(pred, Bucket::new(count)) }
            }
        }
    }

    /// Enforces invariant (I4): no bucket is left on the spine once its item
    /// list is empty.
    fn drop_bucket_if_empty(&mut self, bucket: *mut Entry<Bucket<K, V>>) {
        // SAFETY: bucket is a live spine node owned by `self.spine`.
        let empty = unsafe { self.spine.value(bucket) }.items.is_empty();
        if empty {
            unsafe {
                self.spine.remove(bucket);
            }
        }
    }

    /// Moves the item at `node` to the bucket one count higher than its
    /// current one, creating that bucket if necessary, and retires its old
    /// bucket if this empties it. O(1): the node is relinked, not
    /// reallocated.
    fn bump(&mut self, node: *mut Entry<Item<K, V>>) {
        unsafe {
            // SAFETY: node comes from `self.index`, which only holds live item nodes.
            let old_bucket = (*node).value().bucket;
            let new_count = (*old_bucket).value().count + 1;
            let new_bucket = self.ensure_bucket_after(Some(old_bucket), new_count);

            (*old_bucket).value_mut().items.unlink(node);
            (*new_bucket).value_mut().items.relink_front(node);
            (*node).value_mut().bucket = new_bucket;

            self.drop_bucket_if_empty(old_bucket);
        }
    }

    /// Inserts a brand-new item for `key`, evicting first if the cache is at
    /// or over capacity. A no-op when `max_size` is zero.
    ///
    /// Looping here (rather than a single evict) is what lets
    /// [`set_max_size`](Cache::set_max_size) shrink lazily: a `put` right
    /// after a large shrink may need to evict more than once to restore
    /// `current_size() <= max_size()`.
    fn insert_new(&mut self, key: K, value: V) {
        if self.max_size == 0 {
            return;
        }
        while self.index.len() >= self.max_size {
            self.evict_one();
        }
        let bucket = self.ensure_bucket_after(None, 1);
        // SAFETY: bucket was just created or found on the spine by `ensure_bucket_after`.
        let node =
            unsafe { (*bucket).value_mut() }.items.push_front(Item::new(key.clone(), value, bucket));
        self.index.insert(key, node);
    }

    fn put(&mut self, key: K, value: V, replace: bool) -> Result<(), AlreadyPresent> {
        if let Some(&node) = self.index.get(&key) {
            if !replace {
                return Err(AlreadyPresent);
            }
            // SAFETY: node comes from `self.index`, which only holds live item nodes.
            unsafe {
                (*node).value_mut().value = value;
            }
            self.bump(node);
            self.assert_invariants();
            return Ok(());
        }
        self.insert_new(key, value);
        self.assert_invariants();
        Ok(())
    }

    fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.index.get(key)?;
        self.bump(node);
        // SAFETY: node comes from `self.index`, which only holds live item nodes.
        let value = unsafe { (*node).value() }.value.clone();
        self.assert_invariants();
        Some(value)
    }

    fn delete<Q>(&mut self, key: &Q) -> Result<(), NotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.index.remove(key).ok_or(NotFound)?;
        // SAFETY: node came from `self.index`, so it is a live node in its bucket's item list.
        let bucket = unsafe { (*node).value().bucket };
        let item = unsafe { (*bucket).value_mut().items.remove(node) };
        drop(item);
        self.drop_bucket_if_empty(bucket);
        self.assert_invariants();
        Ok(())
    }

    /// Removes the tail item of the lowest-count bucket: the least
    /// frequently used item, with ties broken by least-recently-touched.
    fn evict_one(&mut self) -> Option<(K, V)> {
        let bucket = self.spine.front()?;
        // SAFETY: bucket came from `front()`, so it is a live spine node.
        let item = unsafe { (*bucket).value_mut() }.items.pop_back()?;
        self.index.remove(&item.key);
        self.drop_bucket_if_empty(bucket);
        self.assert_invariants();
        Some((item.key, item.value))
    }

    /// Snapshots one bucket's items, tail-to-head (least-recently-touched
    /// first within the frequency class).
    fn snapshot_bucket(&self, bucket: *mut Entry<Bucket<K, V>>) -> Vec<(K, V)> {
        // SAFETY: bucket is a live spine node owned by `self.spine`.
        let items = unsafe { &self.spine.value(bucket).items };
        let mut out = Vec::with_capacity(items.len());
        let mut node = items.back();
        while let Some(n) = node {
            // SAFETY: n came from `back()`/`prev()` on this same list.
            let item = unsafe { items.value(n) };
            out.push((item.key.clone(), item.value.clone()));
            node = unsafe { items.prev(n) };
        }
        out
    }

    /// Snapshots the whole cache, lowest frequency to highest; within each
    /// frequency class, least-recently-touched first.
    fn as_slice(&self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.index.len());
        let mut bucket = self.spine.front();
        while let Some(b) = bucket {
            out.extend(self.snapshot_bucket(b));
            // SAFETY: b came from `front()`/`next()` on `self.spine`.
            bucket = unsafe { self.spine.next(b) };
        }
        out
    }

    fn least_frequency_items(&self) -> Vec<(K, V)> {
        match self.spine.front() {
            Some(b) => self.snapshot_bucket(b),
            None => Vec::new(),
        }
    }

    fn top_frequency_items(&self) -> Vec<(K, V)> {
        match self.spine.back() {
            Some(b) => self.snapshot_bucket(b),
            None => Vec::new(),
        }
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        let mut total = 0usize;
        let mut prev_count: Option<u64> = None;
        let mut bucket = self.spine.front();
        while let Some(b) = bucket {
            // SAFETY: b came from `front()`/`next()` on `self.spine`.
            let value = unsafe { self.spine.value(b) };
            debug_assert!(!value.items.is_empty(), "empty bucket left on the spine");
            if let Some(prev) = prev_count {
                debug_assert!(
                    value.count > prev,
                    "spine counts must be strictly increasing"
                );
            }
            prev_count = Some(value.count);
            total += value.items.len();
            bucket = unsafe { self.spine.next(b) };
        }
        debug_assert_eq!(
            total,
            self.index.len(),
            "key index size must equal the number of items on the spine"
        );
        debug_assert!(
            self.index.len() <= self.max_size || self.max_size == 0,
            "cache holds more items than its configured capacity"
        );
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    fn assert_invariants(&self) {}
}

/// A bounded, concurrent Least Frequently Used cache with LRU tie-breaking.
///
/// See the [module docs](self) for the algorithm and the data structure
/// behind it.
#[derive(Debug)]
pub struct Cache<K, V, S = DefaultHashBuilder> {
    inner: RwLock<CacheCore<K, V, S>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty cache that holds at most `max_size` items.
    ///
    /// `max_size == 0` is legal: the cache will never retain anything,
    /// silently discarding every `put`.
    pub fn new(max_size: usize) -> Self {
        Self::with_hasher(max_size, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Creates an empty cache using a custom hasher.
    pub fn with_hasher(max_size: usize, hash_builder: S) -> Self {
        Cache {
            inner: RwLock::new(CacheCore::with_hasher(max_size, hash_builder)),
        }
    }

    /// The cache's configured capacity.
    pub fn max_size(&self) -> usize {
        self.inner.read().max_size()
    }

    /// The number of items currently held.
    pub fn current_size(&self) -> usize {
        self.inner.read().len()
    }

    /// Alias for [`current_size`](Self::current_size).
    pub fn len(&self) -> usize {
        self.current_size()
    }

    /// `true` if the cache holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Changes the cache's capacity.
    ///
    /// If `new_max` is smaller than [`current_size`](Self::current_size),
    /// the cache does not proactively evict: it will shrink down to
    /// `new_max` items as subsequent `put`s trigger eviction. Call
    /// [`evict`](Self::evict) in a loop if an immediate shrink is needed.
    pub fn set_max_size(&self, new_max: usize) {
        self.inner.write().set_max_size(new_max);
    }

    /// Inserts `key` with `value`.
    ///
    /// If `key` is already present and `replace` is `false`, fails with
    /// [`AlreadyPresent`] and leaves the existing entry untouched. If
    /// `replace` is `true`, the existing value is overwritten and the
    /// item's frequency is bumped, the same as a successful `get`. A
    /// genuinely new key starts at frequency 1, evicting one item first if
    /// the cache is full.
    pub fn put(&self, key: K, value: V, replace: bool) -> Result<(), AlreadyPresent> {
        self.inner.write().put(key, value, replace)
    }

    /// Looks up `key`, bumping its frequency on a hit.
    ///
    /// Returns an owned clone of the value so the caller can use it after
    /// the lock is released.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.write().get(key)
    }

    /// Removes `key`, failing with [`NotFound`] if it is absent.
    pub fn delete<Q>(&self, key: &Q) -> Result<(), NotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.write().delete(key)
    }

    /// Manually evicts one item: the least-recently-touched item of the
    /// lowest-frequency bucket. Returns `None` if the cache is empty.
    pub fn evict(&self) -> Option<(K, V)> {
        self.inner.write().evict_one()
    }

    /// Snapshots the cache, ordered from lowest frequency to highest; within
    /// a frequency class, least-recently-touched first.
    pub fn as_slice(&self) -> Vec<(K, V)> {
        self.inner.write().as_slice()
    }

    /// Snapshots the lowest-frequency bucket (the next eviction candidates),
    /// least-recently-touched first.
    pub fn get_least_frequency_items(&self) -> Vec<(K, V)> {
        self.inner.write().least_frequency_items()
    }

    /// Snapshots the highest-frequency bucket, least-recently-touched first.
    pub fn get_top_frequency_items(&self) -> Vec<(K, V)> {
        self.inner.write().top_frequency_items()
    }
}
