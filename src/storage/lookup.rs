//! Lookup Table - bidirectional tag dictionary
//!
//! Assigns compact `TagId`s to tag identities so tagged containers can store
//! a `u32` per record instead of repeating the tag itself.
//!
//! # Id policy
//! - Ids start at 0 and increase by one in first-intern order.
//! - Ids are never removed or reused; a stored id stays resolvable for the
//!   lifetime of the table.
//! - `rename` keeps the id and changes the tag it resolves to.
//!
//! # Thread Safety
//!
//! Both directions live behind one `RwLock`, so readers always see a
//! consistent pair of maps. `intern` takes the read lock for the common
//! already-present case and re-checks under the write lock before allocating,
//! so two threads racing on the same new tag get the same id.

use crate::storage::error::{StoreError, StoreResult};
use crate::storage::types::TagId;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

#[derive(Debug)]
struct Tables<T> {
    /// tag → id
    by_tag: HashMap<T, TagId>,
    /// id → tag, indexed by `TagId::index`
    by_id: Vec<T>,
}

/// Thread-safe tag ↔ id dictionary
///
/// Usually shared as `Arc<LookupTable<T>>` between every tagged container
/// that encodes against it.
///
/// ```rust
/// use chronostore::storage::LookupTable;
///
/// let table: LookupTable<String> = LookupTable::new();
/// let a = table.intern("temp-sensor-1").unwrap();
/// assert_eq!(table.intern("temp-sensor-1").unwrap(), a);
/// assert_eq!(table.resolve(a).unwrap(), "temp-sensor-1");
/// ```
#[derive(Debug)]
pub struct LookupTable<T> {
    inner: RwLock<Tables<T>>,
}

impl<T> Default for LookupTable<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Tables {
                by_tag: HashMap::new(),
                by_id: Vec::new(),
            }),
        }
    }
}

impl<T> LookupTable<T>
where
    T: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with room for `capacity` tags
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Tables {
                by_tag: HashMap::with_capacity(capacity),
                by_id: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Return the id for `tag`, allocating the next id on first sight
    ///
    /// Fails with `CapacityExhausted` only once every `u32` id is in use.
    pub fn intern<Q>(&self, tag: &Q) -> StoreResult<TagId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        // Fast path: already interned
        if let Some(&id) = self.inner.read().by_tag.get(tag) {
            return Ok(id);
        }

        let mut tables = self.inner.write();

        // Another writer may have interned it between the two locks.
        if let Some(&id) = tables.by_tag.get(tag) {
            return Ok(id);
        }

        let id = next_id(tables.by_id.len())?;
        let owned = tag.to_owned();
        tables.by_tag.insert(owned.clone(), id);
        tables.by_id.push(owned);

        tracing::debug!(?id, tag = ?tables.by_id[id.index()], "interned new tag");
        Ok(id)
    }

    /// Id for `tag` if it has been interned
    pub fn id_of<Q>(&self, tag: &Q) -> Option<TagId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().by_tag.get(tag).copied()
    }

    /// Tag currently assigned to `id`
    pub fn resolve(&self, id: TagId) -> StoreResult<T> {
        self.inner
            .read()
            .by_id
            .get(id.index())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tag id {}", id)))
    }

    /// Reassign `old`'s id to `new`
    ///
    /// Fails with `NotFound` if `old` was never interned and with `Conflict`
    /// if `new` is already interned under a different id. On success `old`
    /// no longer resolves and the id returned now maps to `new`.
    pub fn rename<Q>(&self, old: &Q, new: T) -> StoreResult<TagId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let mut tables = self.inner.write();

        let id = *tables
            .by_tag
            .get(old)
            .ok_or_else(|| StoreError::NotFound(format!("tag {:?}", old)))?;

        match tables.by_tag.get::<T>(&new) {
            Some(&existing) if existing == id => return Ok(id),
            Some(&existing) => {
                return Err(StoreError::Conflict {
                    tag: format!("{:?}", new),
                    existing,
                })
            }
            None => {}
        }

        tables.by_tag.remove(old);
        tables.by_tag.insert(new.clone(), id);
        let previous = std::mem::replace(&mut tables.by_id[id.index()], new);

        tracing::debug!(?id, from = ?previous, to = ?tables.by_id[id.index()], "renamed tag");
        Ok(id)
    }

    pub fn contains<Q>(&self, tag: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().by_tag.contains_key(tag)
    }

    /// Number of interned tags
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every (id, tag) pair in id order
    pub fn tags(&self) -> Vec<(TagId, T)> {
        self.inner
            .read()
            .by_id
            .iter()
            .zip(0u32..)
            .map(|(tag, i)| (TagId(i), tag.clone()))
            .collect()
    }
}

/// Id for the next tag after `issued` have been handed out
fn next_id(issued: usize) -> StoreResult<TagId> {
    u32::try_from(issued)
        .map(TagId)
        .map_err(|_| StoreError::CapacityExhausted("tag"))
}
