//! The container: ties the bucket array, hash driver, memory source, and
//! rehash controller into the public [`HashTable`] type.

use crate::entry::Entry;
use crate::error::Error;
use crate::hash::{KeyHasher, SipKeyHasher};
use crate::iter::{Cursor, Iter};
use crate::memory::{DefaultMemorySource, MemorySource};
use crate::rehash::{self, MIN_BITS};
use crate::table::Table;

/// Construction-time options for [`HashTable`].
///
/// The only option today is case sensitivity; this is a struct rather than
/// a bitmask of flags so future options can be added without breaking
/// callers who construct it with `..Default::default()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashTableOptions {
    /// When `true`, keys are compared and hashed ASCII-case-insensitively.
    /// Defaults to `false` (case-sensitive).
    pub case_insensitive: bool,
}

/// An open-addressed, power-of-two-sized hash table with Robin Hood
/// displacement, backward-shift deletion, and incremental (amortized)
/// rehashing.
///
/// `'a` bounds the lifetime of borrowed keys: the table never copies or
/// frees key bytes. `V` is an opaque, `Copy` value type -- the idiomatic
/// stand-in for a caller-owned pointer. `H` is the keyed hash driver
/// (defaulted to [`SipKeyHasher`]) and `M` is the pluggable memory source
/// (defaulted to [`DefaultMemorySource`]).
///
/// Single-writer discipline applies: the caller must ensure at most one
/// operation executes against a given table at a time. The table takes no
/// internal locks and offers no suspension points.
pub struct HashTable<'a, V, H = SipKeyHasher, M = DefaultMemorySource>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    tables: [Option<Table<'a, V>>; 2],
    /// Index of the primary table: the one that receives new writes.
    hindex: usize,
    /// Next bucket index to consider in the secondary table during migration.
    hiter: usize,
    count: usize,
    case_insensitive: bool,
    hasher: H,
    memory: M,
}

impl<'a, V> HashTable<'a, V, SipKeyHasher, DefaultMemorySource> {
    /// Creates a case-sensitive table with `2^initial_bits` initial buckets
    /// and a randomly seeded hash driver.
    ///
    /// # Panics
    ///
    /// Panics if `initial_bits` is not in `1..=32`.
    #[must_use]
    pub fn new(initial_bits: u32) -> Result<Self, Error> {
        Self::with_options(initial_bits, HashTableOptions::default())
    }

    /// As [`HashTable::new`], with construction-time options.
    ///
    /// # Panics
    ///
    /// Panics if `initial_bits` is not in `1..=32`.
    pub fn with_options(initial_bits: u32, options: HashTableOptions) -> Result<Self, Error> {
        Self::with_hasher_and_memory(
            initial_bits,
            options,
            SipKeyHasher::new(),
            DefaultMemorySource,
        )
    }
}

impl<'a, V, H, M> HashTable<'a, V, H, M>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    /// Creates a table with an explicit hash driver and memory source.
    ///
    /// # Panics
    ///
    /// Panics if `initial_bits` is not in `1..=32`.
    pub fn with_hasher_and_memory(
        initial_bits: u32,
        options: HashTableOptions,
        hasher: H,
        mut memory: M,
    ) -> Result<Self, Error> {
        assert!(
            (1..=32).contains(&initial_bits),
            "initial_bits must be in 1..=32, got {initial_bits}"
        );
        let primary = Table::new(initial_bits, &mut memory)?;
        Ok(Self {
            tables: [Some(primary), None],
            hindex: 0,
            hiter: 0,
            count: 0,
            case_insensitive: options.case_insensitive,
            hasher,
            memory,
        })
    }

    /// Exposes the container's keyed hash, so callers can hash a key once
    /// and pass the digest to multiple subsequent operations.
    #[inline]
    #[must_use]
    pub fn hash(&self, key: &[u8]) -> u32 {
        self.hasher.hash(key, self.case_insensitive)
    }

    /// Number of live entries across both tables.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// `true` if the table holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` if construction-time options asked for case-insensitive keys.
    #[inline]
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[inline]
    fn secondary_index(&self) -> usize {
        1 - self.hindex
    }

    #[inline]
    fn rehashing_in_progress(&self) -> bool {
        self.tables[self.secondary_index()].is_some()
    }

    fn primary(&self) -> &Table<'a, V> {
        self.tables[self.hindex].as_ref().expect("primary table always present")
    }

    fn primary_mut(&mut self) -> &mut Table<'a, V> {
        self.tables[self.hindex].as_mut().expect("primary table always present")
    }

    fn resolved_hash(&self, hash: Option<u32>, key: &[u8]) -> u32 {
        hash.unwrap_or_else(|| self.hash(key))
    }

    fn check_key_len(key: &[u8]) {
        assert!(
            key.len() <= u16::MAX as usize,
            "keys are bounded to 65535 bytes, got {}",
            key.len()
        );
    }

    /// Performs one unit of migration work: moves a single entry from the
    /// secondary table into the primary, or -- if the secondary table is
    /// fully drained -- frees it and ends migration.
    ///
    /// No-op if no migration is in progress.
    fn rehash_one(&mut self) {
        if !self.rehashing_in_progress() {
            return;
        }
        let secondary_idx = self.secondary_index();
        let next_occupied = self.tables[secondary_idx]
            .as_ref()
            .expect("secondary table present while migrating")
            .first_occupied_from(self.hiter);

        let pos = match next_occupied {
            Some(pos) => pos,
            None => {
                self.tables[secondary_idx] = None;
                self.hiter = 0;
                return;
            }
        };

        let mut entry = self.tables[secondary_idx].as_mut().unwrap().delete_at(pos);
        // The PSL carried over from the secondary table describes a distance
        // from `entry`'s home bucket there, not in the primary; re-insertion
        // must probe from scratch, the same way a fresh `add` does.
        entry.psl = 0;
        let case_insensitive = self.case_insensitive;
        self.tables[self.hindex]
            .as_mut()
            .unwrap()
            .insert(entry, case_insensitive)
            .expect("an entry drained from the secondary table is never a duplicate");

        // Backward-shift in the secondary table may already have slid a
        // different entry into `pos`; re-examine the same index next time
        // rather than advancing past it.
        self.hiter = pos;
    }

    fn start_grow(&mut self) -> Result<(), Error> {
        debug_assert!(!self.rehashing_in_progress());
        let old_bits = self.primary().bits();
        let new_bits = rehash::grow_bits(self.count, old_bits);
        if new_bits > old_bits {
            let new_index = self.secondary_index();
            let new_table = Table::new(new_bits, &mut self.memory)?;
            self.tables[new_index] = Some(new_table);
            self.hindex = new_index;
            self.hiter = 0;
        }
        Ok(())
    }

    fn start_shrink(&mut self) -> Result<(), Error> {
        debug_assert!(!self.rehashing_in_progress());
        let old_bits = self.primary().bits();
        let new_bits = rehash::shrink_bits(old_bits, MIN_BITS);
        if new_bits < old_bits {
            let new_index = self.secondary_index();
            let new_table = Table::new(new_bits, &mut self.memory)?;
            self.tables[new_index] = Some(new_table);
            self.hindex = new_index;
            self.hiter = 0;
        }
        Ok(())
    }

    /// Looks up `key`, returning its value or [`Error::NotFound`].
    ///
    /// `hash` may be a digest already computed by [`HashTable::hash`]; when
    /// `None`, the table computes it.
    pub fn get(&self, hash: Option<u32>, key: &[u8]) -> Result<V, Error>
    where
        V: Copy,
    {
        Self::check_key_len(key);
        let hash = self.resolved_hash(hash, key);
        if let Some(pos) = self.primary().find(hash, key, self.case_insensitive) {
            return Ok(self.primary().get(pos).unwrap().value);
        }
        if self.rehashing_in_progress() {
            let secondary = self.tables[self.secondary_index()].as_ref().unwrap();
            if let Some(pos) = secondary.find(hash, key, self.case_insensitive) {
                return Ok(secondary.get(pos).unwrap().value);
            }
        }
        Err(Error::NotFound)
    }

    /// Inserts `key` -> `value`.
    ///
    /// Performs at most one unit of migration work first (piggybacked onto
    /// this mutation), possibly after starting a grow migration if the
    /// primary table has crossed its load-factor threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exists`] if an entry for `key` (under the table's
    /// case policy) is already present in the primary table, or -- while a
    /// migration is in progress -- in the secondary table. Returns
    /// [`Error::OutOfMemory`] if starting a migration requires an
    /// allocation the memory source refuses; the table is left unmodified.
    pub fn insert(&mut self, hash: Option<u32>, key: &'a [u8], value: V) -> Result<(), Error> {
        Self::check_key_len(key);
        let hash = self.resolved_hash(hash, key);

        if self.rehashing_in_progress() {
            self.rehash_one();
        } else if rehash::should_grow(self.count, self.primary().bits()) {
            self.start_grow()?;
            self.rehash_one();
        }

        if self.rehashing_in_progress() {
            let secondary = self.tables[self.secondary_index()].as_ref().unwrap();
            if secondary.find(hash, key, self.case_insensitive).is_some() {
                return Err(Error::Exists);
            }
        }

        let entry = Entry::new(key, value, hash);
        self.primary_mut().insert(entry, self.case_insensitive)?;
        self.count += 1;
        Ok(())
    }

    /// Removes `key`, returning `Ok(())` or [`Error::NotFound`].
    ///
    /// Performs at most one unit of migration work first; if no migration
    /// is in progress and the primary table has dropped under its
    /// load-factor shrink threshold, starts a shrink migration and performs
    /// one unit of that instead.
    pub fn remove(&mut self, hash: Option<u32>, key: &[u8]) -> Result<(), Error> {
        Self::check_key_len(key);
        let hash = self.resolved_hash(hash, key);

        if self.rehashing_in_progress() {
            self.rehash_one();
        } else if rehash::should_shrink(self.count, self.primary().bits(), MIN_BITS) {
            self.start_shrink()?;
            self.rehash_one();
        }

        if let Some(pos) = self.primary().find(hash, key, self.case_insensitive) {
            self.primary_mut().delete_at(pos);
            self.count -= 1;
            return Ok(());
        }
        if self.rehashing_in_progress() {
            let secondary_idx = self.secondary_index();
            let pos = self.tables[secondary_idx]
                .as_ref()
                .unwrap()
                .find(hash, key, self.case_insensitive);
            if let Some(pos) = pos {
                self.tables[secondary_idx].as_mut().unwrap().delete_at(pos);
                self.count -= 1;
                return Ok(());
            }
        }
        Err(Error::NotFound)
    }

    /// A read-only iterator over every live entry, in unspecified order.
    ///
    /// Never triggers migration work (iteration is read-only); while a
    /// migration is in progress the iterator visits both tables.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, 'a, V, H, M> {
        Iter::new(self)
    }

    /// A mutable cursor supporting delete-while-iterating.
    ///
    /// Unlike `insert`/`remove`, advancing or deleting through a cursor does
    /// not perform migration work -- a long-lived traversal over a large
    /// table should not pay a migration step just for walking past entries
    /// it isn't touching.
    #[must_use]
    pub fn cursor(&mut self) -> Cursor<'_, 'a, V, H, M> {
        Cursor::new(self)
    }

    pub(crate) fn hindex(&self) -> usize {
        self.hindex
    }

    pub(crate) fn table_at(&self, index: usize) -> Option<&Table<'a, V>> {
        self.tables[index].as_ref()
    }

    pub(crate) fn table_at_mut(&mut self, index: usize) -> Option<&mut Table<'a, V>> {
        self.tables[index].as_mut()
    }

    pub(crate) fn decrement_count(&mut self) {
        self.count -= 1;
    }
}
