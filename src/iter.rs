//! Read-only iteration and cursor-based delete-while-iterating.
//!
//! Both types borrow the owning [`HashTable`](crate::HashTable); the borrow
//! checker is what enforces that a container is never dropped or otherwise
//! mutated out from under a live traversal.

use crate::container::HashTable;
use crate::error::Error;
use crate::hash::{KeyHasher, SipKeyHasher};
use crate::memory::{DefaultMemorySource, MemorySource};

/// Which table, and how far into it, a traversal has reached.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Primary(usize),
    Secondary(usize),
    Done,
}

/// A read-only iterator over every live entry, in unspecified order.
///
/// Constructed by [`HashTable::iter`]. Walks the primary table first, then
/// the secondary table if a migration is in progress; never advances a
/// migration itself.
pub struct Iter<'t, 'a, V, H = SipKeyHasher, M = DefaultMemorySource>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    table: &'t HashTable<'a, V, H, M>,
    state: Position,
}

impl<'t, 'a, V, H, M> Iter<'t, 'a, V, H, M>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    pub(crate) fn new(table: &'t HashTable<'a, V, H, M>) -> Self {
        Self {
            table,
            state: Position::Primary(0),
        }
    }
}

impl<'t, 'a, V, H, M> Iterator for Iter<'t, 'a, V, H, M>
where
    V: Copy,
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    type Item = (&'a [u8], V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                Position::Primary(pos) => {
                    let primary = self
                        .table
                        .table_at(self.table.hindex())
                        .expect("primary always present");
                    match primary.first_occupied_from(pos) {
                        Some(found) => {
                            self.state = Position::Primary(found + 1);
                            let entry = primary.get(found).unwrap();
                            return Some((entry.key, entry.value));
                        }
                        None => {
                            self.state = Position::Secondary(0);
                        }
                    }
                }
                Position::Secondary(pos) => {
                    let secondary_index = 1 - self.table.hindex();
                    match self.table.table_at(secondary_index) {
                        None => {
                            self.state = Position::Done;
                        }
                        Some(secondary) => match secondary.first_occupied_from(pos) {
                            Some(found) => {
                                self.state = Position::Secondary(found + 1);
                                let entry = secondary.get(found).unwrap();
                                return Some((entry.key, entry.value));
                            }
                            None => {
                                self.state = Position::Done;
                            }
                        },
                    }
                }
                Position::Done => return None,
            }
        }
    }
}

/// A stateful cursor supporting delete-while-iterating.
///
/// Constructed by [`HashTable::cursor`]. Unlike [`HashTable::insert`] and
/// [`HashTable::remove`], walking or deleting through a cursor never
/// performs migration work: a traversal over a large table shouldn't pay a
/// migration step for every entry it merely visits.
pub struct Cursor<'t, 'a, V, H = SipKeyHasher, M = DefaultMemorySource>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    table: &'t mut HashTable<'a, V, H, M>,
    state: Position,
}

impl<'t, 'a, V, H, M> Cursor<'t, 'a, V, H, M>
where
    H: KeyHasher,
    M: MemorySource<'a, V>,
{
    pub(crate) fn new(table: &'t mut HashTable<'a, V, H, M>) -> Self {
        Self {
            table,
            state: Position::Primary(0),
        }
    }

    fn advance_from(&self, mut state: Position) -> Position {
        loop {
            match state {
                Position::Primary(pos) => {
                    let idx = self.table.hindex();
                    let found = self
                        .table
                        .table_at(idx)
                        .and_then(|t| t.first_occupied_from(pos));
                    match found {
                        Some(found) => return Position::Primary(found),
                        None => state = Position::Secondary(0),
                    }
                }
                Position::Secondary(pos) => {
                    let idx = 1 - self.table.hindex();
                    let found = self
                        .table
                        .table_at(idx)
                        .and_then(|t| t.first_occupied_from(pos));
                    match found {
                        Some(found) => return Position::Secondary(found),
                        None => return Position::Done,
                    }
                }
                Position::Done => return Position::Done,
            }
        }
    }

    /// Positions the cursor at the first live entry, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMore`] if the container is empty.
    pub fn first(&mut self) -> Result<(), Error> {
        self.state = self.advance_from(Position::Primary(0));
        if self.state == Position::Done {
            Err(Error::NoMore)
        } else {
            Ok(())
        }
    }

    /// Advances to the next live entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMore`] if there is no next entry.
    pub fn next(&mut self) -> Result<(), Error> {
        let advance_past = match self.state {
            Position::Primary(pos) => Position::Primary(pos + 1),
            Position::Secondary(pos) => Position::Secondary(pos + 1),
            Position::Done => return Err(Error::NoMore),
        };
        self.state = self.advance_from(advance_past);
        if self.state == Position::Done {
            Err(Error::NoMore)
        } else {
            Ok(())
        }
    }

    /// The key at the cursor's current position.
    ///
    /// # Panics
    ///
    /// Panics if [`Cursor::first`] hasn't been called, or the last call to
    /// `first`/`next`/`delete_current_and_next` returned
    /// [`Error::NoMore`].
    #[must_use]
    pub fn current_key(&self) -> &'a [u8] {
        self.current_entry().key
    }

    /// The value at the cursor's current position.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Cursor::current_key`].
    #[must_use]
    pub fn current_value(&self) -> V
    where
        V: Copy,
    {
        self.current_entry().value
    }

    fn current_entry(&self) -> &crate::entry::Entry<'a, V> {
        let (idx, pos) = match self.state {
            Position::Primary(pos) => (self.table.hindex(), pos),
            Position::Secondary(pos) => (1 - self.table.hindex(), pos),
            Position::Done => panic!("cursor has no current entry"),
        };
        self.table
            .table_at(idx)
            .and_then(|t| t.get(pos))
            .expect("cursor position always points at a live entry")
    }

    /// Deletes the entry at the cursor's current position and advances to
    /// the next live entry in one step, so that no visited position is ever
    /// invalidated out from under the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMore`] if there is no next entry after the
    /// deleted one; the deletion itself still takes effect.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Cursor::current_key`].
    pub fn delete_current_and_next(&mut self) -> Result<(), Error> {
        let (idx, pos) = match self.state {
            Position::Primary(pos) => (self.table.hindex(), pos),
            Position::Secondary(pos) => (1 - self.table.hindex(), pos),
            Position::Done => panic!("cursor has no current entry"),
        };

        self.table
            .table_at_mut(idx)
            .expect("current table is live while deleting through it")
            .delete_at(pos);
        self.table.decrement_count();

        // Backward-shift may have slid the next entry into `pos`; re-scan
        // from the same index rather than `pos + 1`.
        let resume_at = match self.state {
            Position::Primary(_) => Position::Primary(pos),
            Position::Secondary(_) => Position::Secondary(pos),
            Position::Done => unreachable!(),
        };
        self.state = self.advance_from(resume_at);
        if self.state == Position::Done {
            Err(Error::NoMore)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::container::{HashTable, HashTableOptions};
    use std::collections::BTreeSet;

    #[test]
    fn iter_visits_every_entry_exactly_once() {
        let mut table = HashTable::new(2).unwrap();
        let keys: &[&[u8]] = &[b"a", b"b", b"c", b"d", b"e"];
        for (i, key) in keys.iter().enumerate() {
            table.insert(None, key, i as u32).unwrap();
        }
        let mut seen: BTreeSet<Vec<u8>> = BTreeSet::new();
        for (key, _value) in table.iter() {
            assert!(seen.insert(key.to_vec()), "key visited twice");
        }
        assert_eq!(seen.len(), keys.len());
    }

    #[test]
    fn iter_sees_entries_still_pending_migration() {
        let mut table = HashTable::new(1).unwrap();
        for i in 0..50_u32 {
            let key = Box::leak(i.to_string().into_boxed_str()).as_bytes();
            table.insert(None, key, i).unwrap();
        }
        let count = table.iter().count();
        assert_eq!(count, 50);
    }

    #[test]
    fn cursor_walks_and_reports_exhaustion() {
        let mut table = HashTable::new(2).unwrap();
        table.insert(None, b"a", 1).unwrap();
        table.insert(None, b"b", 2).unwrap();

        let mut cursor = table.cursor();
        cursor.first().unwrap();
        let mut count = 1;
        while cursor.next().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn cursor_delete_current_and_next_visits_every_remaining_entry() {
        let mut table = HashTable::new(4).unwrap();
        let keys: Vec<Box<[u8]>> = (0..100_u32)
            .map(|i| i.to_string().into_bytes().into_boxed_slice())
            .collect();
        let leaked: Vec<&'static [u8]> = keys
            .into_iter()
            .map(|k| Box::leak(k) as &'static [u8])
            .collect();
        for (i, key) in leaked.iter().enumerate() {
            table.insert(None, key, i as u32).unwrap();
        }

        let mut cursor = table.cursor();
        cursor.first().unwrap();
        for _ in 0..9 {
            cursor.next().unwrap();
        }
        // At the 10th entry: delete it and keep walking the rest.
        let mut visited = 1;
        loop {
            match cursor.delete_current_and_next() {
                Ok(()) => visited += 1,
                Err(_) => break,
            }
        }
        drop(cursor);
        assert_eq!(table.len(), 99);
        assert_eq!(visited, 99);
    }

    #[test]
    fn case_insensitive_cursor_current_key_preserves_original_case() {
        let mut table = HashTable::with_options(
            4,
            HashTableOptions {
                case_insensitive: true,
            },
        )
        .unwrap();
        table.insert(None, b"Host", 1).unwrap();
        let mut cursor = table.cursor();
        cursor.first().unwrap();
        assert_eq!(cursor.current_key(), b"Host");
        assert_eq!(cursor.current_value(), 1);
    }
}
