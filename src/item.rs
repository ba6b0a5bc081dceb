//! The cache's item node.

use crate::bucket::Bucket;
use crate::list::Entry;

/// One cached key/value pair, plus a back-reference to the frequency bucket
/// that currently owns it.
///
/// The back-reference is what makes a frequency bump O(1): given only the
/// item's node pointer (from the key index), the bump can find the bucket to
/// detach from without walking the spine.
pub(crate) struct Item<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) bucket: *mut Entry<Bucket<K, V>>,
}

impl<K, V> Item<K, V> {
    pub(crate) fn new(key: K, value: V, bucket: *mut Entry<Bucket<K, V>>) -> Self {
        Item { key, value, bucket }
    }
}
