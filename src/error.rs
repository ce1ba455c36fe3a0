//! Error kinds produced by the container's fallible operations.

use core::fmt;

/// The error kinds a [`HashTable`](crate::HashTable) can return.
///
/// Precondition violations -- a key longer than [`u16::MAX`], an
/// out-of-range bit count, destroying a container through a live
/// [`Cursor`](crate::Cursor) -- are programmer bugs and panic rather than
/// surfacing here; this enum only covers the outcomes every caller must
/// handle as part of normal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// [`HashTable::insert`](crate::HashTable::insert) found a key already
    /// present (under the container's case policy).
    Exists,

    /// [`HashTable::get`](crate::HashTable::get) or
    /// [`HashTable::remove`](crate::HashTable::remove) found no matching
    /// entry.
    NotFound,

    /// An iterator or cursor has no more entries to visit.
    NoMore,

    /// The memory source refused an allocation needed to create the
    /// container or to grow it during insertion.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Exists => "key already exists",
            Self::NotFound => "key not found",
            Self::NoMore => "no more entries",
            Self::OutOfMemory => "memory source refused allocation",
        };
        f.write_str(message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_is_distinct_per_variant() {
        let messages = [
            Error::Exists.to_string(),
            Error::NotFound.to_string(),
            Error::NoMore.to_string(),
            Error::OutOfMemory.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for (j, b) in messages.iter().enumerate() {
                assert_eq!(i == j, a == b);
            }
        }
    }
}
