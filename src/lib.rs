//! An in-memory, open-addressed hash table for byte-string keys, sized in
//! powers of two and rehashed incrementally across two live tables at once.
//!
//! Two arrays of buckets ever exist at a time: a *primary* table taking all
//! new writes, and -- while a migration is underway -- a *secondary* table
//! being drained one bucket per mutation. There is never a stop-the-world
//! rehash: inserting or deleting the Nth entry after a grow/shrink trigger
//! fires also migrates exactly one surviving entry out of the secondary
//! table, so the cost of resizing is smeared evenly across the mutations
//! that follow it rather than paid in one large pause.
//!
//! ```text
//!          primary table                  secondary table (migrating)
//!         ---------------                 ---------------------------
//!        | occupied    | <-- writes       | entries not yet moved    |
//!        | occupied    |                  | over to the primary;     |
//!        | empty       |                  | `hiter` marks the next   |
//!        | occupied    |                  | bucket to drain          |
//!         ---------------                 ---------------------------
//! ```
//!
//! Within a single table, collisions are resolved by Robin Hood open
//! addressing: probing is linear, but on each step the entry with the
//! larger probe sequence length (PSL, i.e. the one further from its ideal
//! "home" bucket) wins the slot, displacing the other to continue probing.
//! This keeps the variance in probe lengths low and lets lookups exit early
//! the moment the scanned distance exceeds the resident entry's own PSL.
//! Deletion shifts trailing entries backward to close the gap rather than
//! leaving a tombstone, so lookups never need to distinguish "empty" from
//! "deleted".
//!
//! # Example
//!
//! ```
//! use rhmap::HashTable;
//!
//! let mut table = HashTable::new(4).unwrap();
//! table.insert(None, b"example.com", 1_u32).unwrap();
//! assert_eq!(table.get(None, b"example.com"), Ok(1));
//! table.remove(None, b"example.com").unwrap();
//! ```

mod container;
mod entry;
mod error;
mod hash;
mod iter;
mod memory;
mod rehash;
mod table;

pub use container::{HashTable, HashTableOptions};
pub use entry::Entry;
pub use error::Error;
pub use hash::{KeyHasher, SipKeyHasher};
pub use iter::{Cursor, Iter};
pub use memory::{DefaultMemorySource, MemorySource};
