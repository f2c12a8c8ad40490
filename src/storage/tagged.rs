//! Tagged Temporal Data - multi-valued records keyed by (tag, moment)
//!
//! Records carry a `TagId` rather than the tag itself. Ids are resolved
//! through a `LookupTable` that the container does not own: it keeps a
//! `Weak` handle, so the table's lifetime is decided by whoever holds the
//! `Arc`. Every operation that needs the table upgrades the handle and fails
//! with `LookupTableReleased` if it is gone.
//!
//! # Example
//! ```rust
//! use chronostore::storage::{LookupTable, Moment, TaggedTemporalData};
//! use std::sync::Arc;
//!
//! let table = Arc::new(LookupTable::<String>::new());
//! let mut data = TaggedTemporalData::new(&table, 1);
//!
//! let t0 = Moment::from_calendar(2024, 1, 1, 0, 0, 0).unwrap();
//! data.append("temp-sensor-1", t0, &[21.5]).unwrap();
//!
//! let rows: Vec<&[f64]> = data.get_all("temp-sensor-1", &t0).unwrap().collect();
//! assert_eq!(rows, vec![&[21.5][..]]);
//! ```

use crate::storage::error::{StoreError, StoreResult};
use crate::storage::lookup::LookupTable;
use crate::storage::moment::Moment;
use crate::storage::multimap::{MultiMap, Rows};
use crate::storage::types::{TagId, TimeKeyed};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

/// Vector records grouped by tag id and moment
#[derive(Debug)]
pub struct TaggedTemporalData<T, V> {
    /// Non-owning handle to the shared dictionary
    table: Weak<LookupTable<T>>,
    /// (id, moment) → vectors
    records: MultiMap<(TagId, Moment), V>,
    /// id → moments that hold at least one record
    moments_by_tag: HashMap<TagId, HashSet<Moment>>,
}

impl<T, V> TaggedTemporalData<T, V>
where
    T: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Create a container that encodes tags against `table`
    pub fn new(table: &Arc<LookupTable<T>>, dimension: usize) -> Self {
        tracing::debug!(dimension, "created tagged temporal data");
        Self {
            table: Arc::downgrade(table),
            records: MultiMap::new(dimension),
            moments_by_tag: HashMap::new(),
        }
    }

    /// Create with room for `keys` (tag, moment) keys before reallocating
    pub fn with_capacity(table: &Arc<LookupTable<T>>, dimension: usize, keys: usize) -> Self {
        tracing::debug!(dimension, keys, "created tagged temporal data");
        Self {
            table: Arc::downgrade(table),
            records: MultiMap::with_capacity(dimension, keys),
            moments_by_tag: HashMap::new(),
        }
    }

    /// Create from an existing handle, checking that the table is still alive
    pub fn from_handle(table: Weak<LookupTable<T>>, dimension: usize) -> StoreResult<Self> {
        if table.strong_count() == 0 {
            return Err(StoreError::LookupTableReleased);
        }
        Ok(Self {
            table,
            records: MultiMap::new(dimension),
            moments_by_tag: HashMap::new(),
        })
    }

    /// Live reference to the lookup table
    pub fn table(&self) -> StoreResult<Arc<LookupTable<T>>> {
        self.table.upgrade().ok_or(StoreError::LookupTableReleased)
    }

    pub fn dimension(&self) -> usize {
        self.records.dimension()
    }

    /// Intern `tag` and store `vector` under (its id, `moment`)
    ///
    /// The dimension is checked before the tag is interned, so a rejected
    /// append leaves both the container and the table untouched.
    pub fn append<Q>(&mut self, tag: &Q, moment: Moment, vector: &[V]) -> StoreResult<TagId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        self.check_dimension(vector)?;
        let id = self.table()?.intern(tag)?;
        self.records.append((id, moment), vector)?;
        self.moments_by_tag.entry(id).or_default().insert(moment);
        Ok(id)
    }

    /// Store `vector` under an id that was interned by the caller
    pub fn append_id(&mut self, id: TagId, moment: Moment, vector: &[V]) -> StoreResult<()> {
        self.check_dimension(vector)?;
        self.table()?
            .resolve(id)
            .map_err(|_| StoreError::DanglingReference(id))?;
        self.records.append((id, moment), vector)?;
        self.moments_by_tag.entry(id).or_default().insert(moment);
        Ok(())
    }

    /// Vectors recorded for `tag` at `moment`
    ///
    /// `NotFound` if the tag was never interned; an empty iterator if it was
    /// interned but has no records at `moment`.
    pub fn get_all<Q>(&self, tag: &Q, moment: &Moment) -> StoreResult<Rows<'_, V>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let id = self.id_for(tag)?;
        Ok(self.get_all_by_id(id, moment))
    }

    /// Vectors recorded for `id` at `moment`
    pub fn get_all_by_id(&self, id: TagId, moment: &Moment) -> Rows<'_, V> {
        self.records.get_all(&(id, *moment))
    }

    /// Remove every vector for `tag` at `moment`
    pub fn remove_all<Q>(&mut self, tag: &Q, moment: &Moment) -> StoreResult<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let id = self.id_for(tag)?;
        let removed = self.records.remove_all(&(id, *moment));

        if removed > 0 {
            if let Some(moments) = self.moments_by_tag.get_mut(&id) {
                moments.remove(moment);
                if moments.is_empty() {
                    self.moments_by_tag.remove(&id);
                }
            }
        }
        Ok(removed)
    }

    /// Every record of `tag`, ordered by moment and then by insertion
    pub fn records_for<Q>(&self, tag: &Q) -> StoreResult<Vec<(Moment, &[V])>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let id = self.id_for(tag)?;

        let mut moments: Vec<Moment> = self
            .moments_by_tag
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        moments.sort_unstable();

        let mut out = Vec::new();
        for moment in moments {
            out.extend(self.get_all_by_id(id, &moment).map(|row| (moment, row)));
        }
        Ok(out)
    }

    /// Ids with at least one stored record, ascending
    pub fn ids_present(&self) -> Vec<TagId> {
        let mut ids: Vec<TagId> = self.moments_by_tag.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Tags with at least one stored record
    ///
    /// An id that no longer resolves is reported as `DanglingReference`.
    pub fn tags_present(&self) -> StoreResult<BTreeSet<T>>
    where
        T: Ord,
    {
        let table = self.table()?;
        let mut tags = BTreeSet::new();

        for id in self.ids_present() {
            match table.resolve(id) {
                Ok(tag) => {
                    tags.insert(tag);
                }
                Err(_) => {
                    tracing::warn!(?id, "stored tag id missing from lookup table");
                    return Err(StoreError::DanglingReference(id));
                }
            }
        }
        Ok(tags)
    }

    /// Every record as (id, moment, vector); unordered
    pub fn iter(&self) -> impl Iterator<Item = (TagId, Moment, &[V])> {
        self.records.iter().map(|(&(id, m), row)| (id, m, row))
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.moments_by_tag.clear();
    }

    /// Drop released slots from the row arena
    pub fn compact(&mut self) -> StoreResult<()> {
        self.records.compact()
    }

    fn id_for<Q>(&self, tag: &Q) -> StoreResult<TagId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.table()?
            .id_of(tag)
            .ok_or_else(|| StoreError::NotFound(format!("tag {:?} was never interned", tag)))
    }

    fn check_dimension(&self, vector: &[V]) -> StoreResult<()> {
        if vector.len() != self.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl<T, V> TimeKeyed for TaggedTemporalData<T, V>
where
    T: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn key_count(&self) -> usize {
        self.moments().len()
    }

    fn contains(&self, moment: &Moment) -> bool {
        self.moments_by_tag.values().any(|set| set.contains(moment))
    }

    fn moments(&self) -> Vec<Moment> {
        let distinct: HashSet<Moment> = self.moments_by_tag.values().flatten().copied().collect();
        distinct.into_iter().collect()
    }
}
