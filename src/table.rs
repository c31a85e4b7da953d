use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::prime::next_prime;

/// Capacity used by [`ProbeTable::new`].
const DEFAULT_CAPACITY: usize = 7;

/// Returns `true` if placing one more key would put `occupied / capacity` at
/// or above the 0.8 resize threshold.
#[inline(always)]
fn reaches_load_limit(occupied: usize, capacity: usize) -> bool {
    occupied as u128 * 5 >= capacity as u128 * 4
}

/// Maximum probe attempts per operation. Bounds worst-case cost and rules
/// out infinite walks over a fully-probed neighborhood.
#[inline(always)]
fn probe_limit(capacity: usize) -> usize {
    (capacity + 1) / 2
}

/// Slot visited on probe attempt `attempt` for a key homed at `home`.
///
/// The square is widened so it cannot overflow for any capacity.
#[inline(always)]
fn probe_index(home: usize, attempt: usize, capacity: usize) -> usize {
    ((home as u128 + attempt as u128 * attempt as u128) % capacity as u128) as usize
}

/// The state of a single table slot.
///
/// A slot starts `Empty`, becomes `Occupied` on insert, and becomes a
/// `Tombstone` on remove. Tombstones keep probe chains walkable for keys
/// placed past them and are only reclaimed by a later insert reusing the
/// slot or by a resize rebuilding the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Never occupied since the table was built or last rebuilt. Terminates
    /// probe walks.
    Empty,
    /// Holds a live key.
    Occupied(i64),
    /// Previously occupied, now removed. Probe walks continue past it.
    Tombstone,
}

impl Slot {
    /// Returns the key if the slot is occupied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::Slot;
    ///
    /// assert_eq!(Slot::Occupied(9).key(), Some(9));
    /// assert_eq!(Slot::Empty.key(), None);
    /// assert_eq!(Slot::Tombstone.key(), None);
    /// ```
    pub fn key(self) -> Option<i64> {
        match self {
            Slot::Occupied(key) => Some(key),
            Slot::Empty | Slot::Tombstone => None,
        }
    }
}

/// Error returned by [`ProbeTable::insert`].
///
/// A failed insert never places the key or changes the element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The key is already present. Occupied slots never share a key.
    #[error("key is already present")]
    DuplicateKey,
    /// No free slot was found within the probe limit.
    ///
    /// Free slots may still exist elsewhere in the table; the bounded walk
    /// gave up before reaching one.
    #[error("no free slot within the probe limit")]
    ProbingExhausted,
}

/// Error returned by [`ProbeTable::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoveError {
    /// The key is not present.
    #[error("key not found")]
    NotFound,
}

/// Occupancy statistics for table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of live keys.
    pub occupied: usize,
    /// Number of tombstoned slots awaiting a resize.
    pub tombstones: usize,
    /// Total slot count. Always prime.
    pub capacity: usize,
    /// Maximum probe attempts per operation at this capacity.
    pub probe_limit: usize,
    /// `occupied / capacity`.
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Table Statistics ===");
        println!(
            "Occupancy: {}/{} ({:.2}% load factor)",
            self.occupied,
            self.capacity,
            self.load_factor * 100.0
        );
        println!("Tombstones: {}", self.tombstones);
        println!("Probe limit: {} attempts", self.probe_limit);
    }
}

/// An open-addressing hash table of `i64` keys using quadratic probing.
///
/// `ProbeTable` stores keys directly in a flat slot array. Collisions walk
/// the probe sequence `(home + i²) mod capacity`; the capacity is always
/// prime so the walk covers a useful fraction of the table. Every operation
/// is bounded by a probe limit of `(capacity + 1) / 2` attempts, trading
/// exhaustive coverage for a hard cost ceiling.
///
/// ## Hashing
///
/// A key's home slot is `key mod capacity`, normalized into `[0, capacity)`
/// with the Euclidean remainder so negative keys probe the same slots
/// regardless of the platform's remainder convention.
///
/// ## Deletion
///
/// Removal marks the slot with a tombstone rather than emptying it, keeping
/// probe chains walkable for keys placed past it. Tombstones are reclaimed
/// by later inserts that reuse the slot, or dropped wholesale when a resize
/// rebuilds the table from live keys.
///
/// ## Example
///
/// ```rust
/// use quad_hash::ProbeTable;
///
/// let mut table = ProbeTable::new();
/// table.insert(10).unwrap();
/// assert_eq!(table.search(10), Some(3));
///
/// table.remove(10).unwrap();
/// assert_eq!(table.search(10), None);
/// ```
#[derive(Clone)]
pub struct ProbeTable {
    slots: Vec<Slot>,
    occupied: usize,
}

impl ProbeTable {
    /// Creates a table with the default capacity of 7.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let table = ProbeTable::new();
    /// assert_eq!(table.capacity(), 7);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table whose capacity is the smallest prime at or above
    /// `capacity`.
    ///
    /// Primes start at 2, so requests of 0 and 1 both yield a capacity
    /// of 2.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// assert_eq!(ProbeTable::with_capacity(7).capacity(), 7);
    /// assert_eq!(ProbeTable::with_capacity(8).capacity(), 11);
    /// assert_eq!(ProbeTable::with_capacity(0).capacity(), 2);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = next_prime(capacity);
        Self {
            slots: vec![Slot::Empty; capacity],
            occupied: 0,
        }
    }

    /// Returns the number of live keys in the table.
    ///
    /// Tombstones are not counted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// assert_eq!(table.len(), 0);
    /// table.insert(1).unwrap();
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the table holds no live keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// assert!(table.is_empty());
    /// table.insert(1).unwrap();
    /// assert!(!table.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the current capacity, i.e. the total slot count.
    ///
    /// The capacity is always prime and only changes when an insert
    /// triggers a resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let table = ProbeTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current load factor, `len / capacity`.
    ///
    /// Immediately after any successful insert this is below 0.8: a pending
    /// insert that would reach the threshold resizes the table first.
    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.slots.len() as f64
    }

    /// Home slot for `key`, normalized into `[0, capacity)` for negative
    /// keys.
    fn home(&self, key: i64) -> usize {
        key.rem_euclid(self.slots.len() as i64) as usize
    }

    /// Searches for `key` and returns its slot index.
    ///
    /// The walk stops at the first `Empty` slot: a live key can never sit
    /// past a true gap in its probe chain. Tombstones and non-matching keys
    /// are skipped. Gives up after the probe limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(10).unwrap();
    ///
    /// assert_eq!(table.search(10), Some(3));
    /// assert_eq!(table.search(11), None);
    /// ```
    pub fn search(&self, key: i64) -> Option<usize> {
        let capacity = self.slots.len();
        let home = self.home(key);

        for attempt in 0..probe_limit(capacity) {
            let index = probe_index(home, attempt, capacity);
            match self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(candidate) if candidate == key => return Some(index),
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }

        None
    }

    /// Returns `true` if the table contains `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(3).unwrap();
    /// assert!(table.contains(3));
    /// assert!(!table.contains(4));
    /// ```
    pub fn contains(&self, key: i64) -> bool {
        self.search(key).is_some()
    }

    /// Inserts `key` into the table.
    ///
    /// A pending insert that would push occupancy to 80% or beyond resizes
    /// the table first; the key is then placed in the first `Empty` or
    /// `Tombstone` slot on its probe sequence.
    ///
    /// # Errors
    ///
    /// [`InsertError::DuplicateKey`] if the key is already present, and
    /// [`InsertError::ProbingExhausted`] if every slot within the probe
    /// limit is occupied. Neither places the key nor changes the element
    /// count; a resize triggered by the load check stands even if the
    /// placement then fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::InsertError;
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// assert_eq!(table.insert(7), Ok(()));
    /// assert_eq!(table.insert(7), Err(InsertError::DuplicateKey));
    /// ```
    ///
    /// Probing is bounded, so an adversarial collision chain can reject an
    /// insert even though free slots remain. A capacity-7 table walks at
    /// most four slots per key:
    ///
    /// ```rust
    /// use quad_hash::InsertError;
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// for key in [0, 7, 14, 21] {
    ///     table.insert(key).unwrap();
    /// }
    /// assert_eq!(table.insert(28), Err(InsertError::ProbingExhausted));
    /// assert_eq!(table.len(), 4);
    /// ```
    pub fn insert(&mut self, key: i64) -> Result<(), InsertError> {
        if self.search(key).is_some() {
            return Err(InsertError::DuplicateKey);
        }

        if reaches_load_limit(self.occupied + 1, self.slots.len()) {
            self.grow();
        }

        let index = self.find_free(key).ok_or(InsertError::ProbingExhausted)?;
        self.slots[index] = Slot::Occupied(key);
        self.occupied += 1;
        Ok(())
    }

    /// First `Empty` or `Tombstone` slot on `key`'s probe sequence.
    fn find_free(&self, key: i64) -> Option<usize> {
        let capacity = self.slots.len();
        let home = self.home(key);

        (0..probe_limit(capacity))
            .map(|attempt| probe_index(home, attempt, capacity))
            .find(|&index| !matches!(self.slots[index], Slot::Occupied(_)))
    }

    /// Removes `key` from the table.
    ///
    /// The slot is marked with a tombstone; its storage is only reclaimed
    /// by a later insert reusing the slot or by a resize.
    ///
    /// # Errors
    ///
    /// [`RemoveError::NotFound`] if the key is not present. The table is
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    /// use quad_hash::RemoveError;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(10).unwrap();
    ///
    /// assert_eq!(table.remove(10), Ok(()));
    /// assert_eq!(table.remove(10), Err(RemoveError::NotFound));
    /// ```
    pub fn remove(&mut self, key: i64) -> Result<(), RemoveError> {
        let index = self.search(key).ok_or(RemoveError::NotFound)?;
        self.slots[index] = Slot::Tombstone;
        self.occupied -= 1;
        Ok(())
    }

    /// Removes every key, resetting all slots to `Empty`.
    ///
    /// The capacity is preserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(1).unwrap();
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 7);
    /// ```
    pub fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.occupied = 0;
    }

    /// Grows to the smallest prime at or above double the current capacity
    /// and rehashes every live key.
    ///
    /// Quadratic probing does not guarantee full-table coverage, so a key
    /// can in principle fail to place even in the doubled table; the
    /// rebuild then doubles again rather than dropping the key. Tombstones
    /// are not carried forward.
    fn grow(&mut self) {
        let mut capacity = next_prime(self.slots.len() * 2);
        loop {
            match rebuild(&self.slots, capacity) {
                Some(slots) => {
                    self.slots = slots;
                    return;
                }
                None => capacity = next_prime(capacity * 2),
            }
        }
    }

    /// Returns an iterator over every slot in index order.
    ///
    /// Yields one [`Slot`] per table position, including empty slots and
    /// tombstones; its length equals [`capacity`](ProbeTable::capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    /// use quad_hash::Slot;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(10).unwrap();
    ///
    /// let slots: Vec<Slot> = table.slots().collect();
    /// assert_eq!(slots.len(), 7);
    /// assert_eq!(slots[3], Slot::Occupied(10));
    /// assert_eq!(slots[0], Slot::Empty);
    /// ```
    pub fn slots(&self) -> Slots<'_> {
        Slots {
            inner: self.slots.iter(),
        }
    }

    /// Returns an iterator over the live keys in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::ProbeTable;
    ///
    /// let mut table = ProbeTable::new();
    /// table.insert(1).unwrap();
    /// table.insert(2).unwrap();
    ///
    /// let keys: Vec<i64> = table.iter().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Returns occupancy statistics for the current table state.
    #[cfg(any(test, feature = "stats"))]
    pub fn stats(&self) -> TableStats {
        let tombstones = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Tombstone))
            .count();

        TableStats {
            occupied: self.occupied,
            tombstones,
            capacity: self.slots.len(),
            probe_limit: probe_limit(self.slots.len()),
            load_factor: self.load_factor(),
        }
    }

    /// Computes a histogram of probe distances for the live keys.
    ///
    /// Bin `i` counts keys that sit `i` probe attempts from their home
    /// slot. The histogram has one bin per allowed attempt, so its length
    /// equals the probe limit.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let capacity = self.slots.len();
        let limit = probe_limit(capacity);
        let mut histogram = vec![0usize; limit];

        for slot in &self.slots {
            let Slot::Occupied(key) = *slot else { continue };
            let home = self.home(key);
            for attempt in 0..limit {
                if self.slots[probe_index(home, attempt, capacity)] == Slot::Occupied(key) {
                    histogram[attempt] += 1;
                    break;
                }
            }
        }

        histogram
    }
}

/// Rehashes every live key of `old` into a fresh all-empty table of
/// `capacity` slots.
///
/// Returns `None` if some key has no free slot within the new probe limit;
/// the caller grows further and retries, so keys are never dropped.
fn rebuild(old: &[Slot], capacity: usize) -> Option<Vec<Slot>> {
    let limit = probe_limit(capacity);
    let mut slots = vec![Slot::Empty; capacity];

    for slot in old {
        let Slot::Occupied(key) = *slot else { continue };
        let home = key.rem_euclid(capacity as i64) as usize;
        let index = (0..limit)
            .map(|attempt| probe_index(home, attempt, capacity))
            .find(|&index| slots[index] == Slot::Empty)?;
        slots[index] = Slot::Occupied(key);
    }

    Some(slots)
}

impl Default for ProbeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ProbeTable {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|key| other.contains(key))
    }
}

impl Eq for ProbeTable {}

impl fmt::Debug for ProbeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTable")
            .field("capacity", &self.slots.len())
            .field("occupied", &self.occupied)
            .field("slots", &self.slots)
            .finish()
    }
}

/// Renders the table in index order: occupied slots print their key, empty
/// slots and tombstones print `-`.
///
/// # Examples
///
/// ```rust
/// use quad_hash::ProbeTable;
///
/// let mut table = ProbeTable::new();
/// table.insert(10).unwrap();
/// assert_eq!(table.to_string(), "- - - 10 - - -");
/// ```
impl fmt::Display for ProbeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, slot) in self.slots.iter().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }
            match slot.key() {
                Some(key) => write!(f, "{key}")?,
                None => f.write_str("-")?,
            }
        }
        Ok(())
    }
}

/// An iterator over every slot of a [`ProbeTable`] in index order.
///
/// Created by [`ProbeTable::slots`].
pub struct Slots<'a> {
    inner: core::slice::Iter<'a, Slot>,
}

impl Iterator for Slots<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Slots<'_> {}

/// An iterator over the live keys of a [`ProbeTable`] in slot order.
///
/// Created by [`ProbeTable::iter`].
pub struct Iter<'a> {
    inner: core::slice::Iter<'a, Slot>,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|slot| slot.key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
