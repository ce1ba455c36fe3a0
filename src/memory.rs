//! The memory source: the container's other required external collaborator.
//!
//! The container never calls a system allocator directly. Instead it asks a
//! [`MemorySource`] for a zeroed bucket array whenever it grows, shrinks, or
//! is first created, and lets the returned `Box` drop normally to reclaim it.
//! This keeps allocation policy (arena-backed, pool-backed, or the default
//! global-allocator-backed implementation here) out of the hot path and
//! pluggable by the caller.

use crate::entry::Entry;
use crate::error::Error;

/// Supplies zeroed bucket arrays on demand.
///
/// "Zeroed" here means every slot starts as `None` (empty) -- the
/// [`DefaultMemorySource`] gets this for free from `vec![None; size]`; a
/// custom implementation backed by raw memory must ensure the same before
/// handing the array back.
pub trait MemorySource<'a, V> {
    /// Allocates a bucket array of `2^bits` empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the allocation cannot be satisfied.
    /// The container aborts the triggering mutation before any bucket is
    /// touched when this happens (§4.7 of the container's design).
    fn alloc_zeroed(&mut self, bits: u32) -> Result<Box<[Option<Entry<'a, V>>]>, Error>;
}

/// The default [`MemorySource`], backed by the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMemorySource;

impl<'a, V> MemorySource<'a, V> for DefaultMemorySource {
    fn alloc_zeroed(&mut self, bits: u32) -> Result<Box<[Option<Entry<'a, V>>]>, Error> {
        debug_assert!((1..=32).contains(&bits));
        let size = 1_usize
            .checked_shl(bits)
            .ok_or(Error::OutOfMemory)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|_| Error::OutOfMemory)?;
        slots.resize_with(size, || None);
        Ok(slots.into_boxed_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_requested_size_all_empty() {
        let mut source = DefaultMemorySource;
        let table: Box<[Option<Entry<'_, u32>>]> = source.alloc_zeroed(4).unwrap();
        assert_eq!(table.len(), 16);
        assert!(table.iter().all(Option::is_none));
    }
}
