//! The cache's frequency bucket.

use crate::item::Item;
use crate::list::List;

/// A group of items that all share the same access count.
///
/// Buckets live on the frequency spine, strictly ordered by ascending
/// `count`. Within a bucket, `items` keeps the most-recently-touched item at
/// the front and the least-recently-touched at the back - the LRU tie-break
/// applied inside a frequency class.
pub(crate) struct Bucket<K, V> {
    pub(crate) count: u64,
    pub(crate) items: List<Item<K, V>>,
}

impl<K, V> Bucket<K, V> {
    pub(crate) fn new(count: u64) -> Self {
        Bucket {
            count,
            items: List::new(),
        }
    }
}
