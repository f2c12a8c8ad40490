//! Row Arena - pooled storage for fixed-dimension vectors
//!
//! All rows of a container live back to back in one growable buffer, so an
//! append costs at most one amortised buffer growth instead of a fresh heap
//! allocation per record. Released rows go on a free list and their slots are
//! overwritten by later appends.
//!
//! ```text
//! data: [r0c0 r0c1 r0c2 | r1c0 r1c1 r1c2 | r2c0 r2c1 r2c2 | ...]
//! free: [1]              -> next insert reuses slot 1
//! ```

use crate::storage::error::{StoreError, StoreResult};

/// Index of a row inside a `RowArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u32);

impl RowId {
    /// Id for the slot at `index`
    fn from_slot(index: usize) -> StoreResult<Self> {
        u32::try_from(index)
            .map(RowId)
            .map_err(|_| StoreError::CapacityExhausted("row"))
    }
}

/// Contiguous pool of rows that all have the same dimension
#[derive(Debug, Clone)]
pub struct RowArena<V> {
    /// Flattened row data, `dimension` values per slot
    data: Vec<V>,
    /// Values per row
    dimension: usize,
    /// Slots ever handed out, live or free
    slots: usize,
    /// Released slots available for reuse
    free: Vec<RowId>,
}

impl<V: Clone> RowArena<V> {
    /// Create an arena for rows of `dimension` values
    pub fn new(dimension: usize) -> Self {
        Self::with_capacity(dimension, 0)
    }

    /// Create an arena with room for `rows` rows before reallocating
    pub fn with_capacity(dimension: usize, rows: usize) -> Self {
        Self {
            data: Vec::with_capacity(dimension.saturating_mul(rows)),
            dimension,
            slots: 0,
            free: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live rows
    pub fn len(&self) -> usize {
        self.slots - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of released slots waiting for reuse
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Copy a row into the arena
    ///
    /// Fails without touching the arena if the row has the wrong length.
    pub fn insert(&mut self, row: &[V]) -> StoreResult<RowId> {
        if row.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: row.len(),
            });
        }

        self.store(row)
    }

    /// Copy a row whose length is already known to match
    pub(crate) fn store(&mut self, row: &[V]) -> StoreResult<RowId> {
        debug_assert_eq!(row.len(), self.dimension);

        if let Some(id) = self.free.pop() {
            let start = id.0 as usize * self.dimension;
            self.data[start..start + self.dimension].clone_from_slice(row);
            return Ok(id);
        }

        let id = RowId::from_slot(self.slots)?;
        self.slots += 1;
        self.data.extend_from_slice(row);
        Ok(id)
    }

    /// Borrow a row
    pub fn get(&self, id: RowId) -> &[V] {
        let start = id.0 as usize * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Return a row's slot to the free list
    ///
    /// The caller must not use `id` afterwards.
    pub fn release(&mut self, id: RowId) {
        debug_assert!((id.0 as usize) < self.slots);
        self.free.push(id);
    }

    /// Drop all rows but keep the allocated buffer
    pub fn clear(&mut self) {
        self.data.clear();
        self.free.clear();
        self.slots = 0;
    }

    /// Bytes reserved by the row buffer
    pub fn reserved_bytes(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<V>()
    }
}
