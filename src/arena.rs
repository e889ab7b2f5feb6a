//! An add-only bump allocator for document data.
use crate::error::{XmlError, XmlResult};
use tracing::trace;

/// The default capacity of an arena block, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 65536;

/// An add-only arena of byte blocks.
///
/// Allocations bump forward through the newest block; when it cannot fit a request, a new block of
/// `max(size, block_size)` bytes is chained on and the rest of the old block goes unused.
/// There is no way to free a single allocation: memory is only released in bulk by [`Arena::clear`]
/// or by dropping the arena.
///
/// Allocations are addressed by [`ArenaRange`] handles rather than pointers.
#[derive(Debug)]
pub struct Arena {
    blocks: Vec<Block>,
    block_size: usize,
}

#[derive(Debug)]
struct Block {
    data: Box<[u8]>,
    used: usize,
}
impl Block {
    fn try_new(size: usize) -> XmlResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| XmlError::out_of_memory(size))?;
        data.resize(size, 0);

        Ok(Self {
            data: data.into_boxed_slice(),
            used: 0,
        })
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.used
    }
}

/// A handle to a run of bytes allocated from an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaRange {
    block: usize,
    offset: usize,
    len: usize,
}
impl ArenaRange {
    /// The index of the block holding the range.
    #[must_use]
    pub fn block(&self) -> usize {
        self.block
    }

    /// The offset of the first byte of the range within its block.
    #[must_use]
    pub fn start(&self) -> usize {
        self.offset
    }

    /// The offset one past the last byte of the range within its block.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The length of the range in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if len == 0
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Arena {
    /// Creates an empty arena using [`DEFAULT_BLOCK_SIZE`] blocks.
    /// No memory is reserved until the first allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Creates an empty arena whose blocks hold at least `block_size` bytes.
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size: block_size.max(1),
        }
    }

    /// Allocates `size` zeroed bytes.
    ///
    /// # Errors
    /// Returns [`crate::XmlErrorKind::OutOfMemory`] if a new block cannot be obtained.
    pub fn allocate(&mut self, size: usize) -> XmlResult<ArenaRange> {
        if size == 0 {
            return Ok(ArenaRange::default());
        }

        let fits = self.blocks.last().is_some_and(|b| b.remaining() >= size);
        if !fits {
            let block_size = size.max(self.block_size);
            self.blocks.push(Block::try_new(block_size)?);
            trace!(
                block_size,
                blocks = self.blocks.len(),
                "chained new arena block"
            );
        }

        let block = self.blocks.len() - 1;
        let last = &mut self.blocks[block];
        let offset = last.used;
        last.used += size;

        Ok(ArenaRange {
            block,
            offset,
            len: size,
        })
    }

    /// Allocates a copy of `bytes`.
    ///
    /// # Errors
    /// Returns [`crate::XmlErrorKind::OutOfMemory`] if a new block cannot be obtained.
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> XmlResult<ArenaRange> {
        let range = self.allocate(bytes.len())?;
        self.get_mut(range).copy_from_slice(bytes);
        Ok(range)
    }

    /// Returns the bytes of an allocation.
    ///
    /// # Panics
    /// Panics if the range was not allocated by this arena since it was last cleared.
    #[must_use]
    pub fn get(&self, range: ArenaRange) -> &[u8] {
        if range.is_empty() {
            return &[];
        }
        &self.blocks[range.block].data[range.offset..range.end()]
    }

    /// Returns the bytes of an allocation for writing.
    ///
    /// # Panics
    /// Panics if the range was not allocated by this arena since it was last cleared.
    pub fn get_mut(&mut self, range: ArenaRange) -> &mut [u8] {
        if range.is_empty() {
            return &mut [];
        }
        &mut self.blocks[range.block].data[range.offset..range.end()]
    }

    /// Releases every block. All outstanding ranges become invalid.
    pub fn clear(&mut self) {
        trace!(blocks = self.blocks.len(), "releasing arena blocks");
        self.blocks.clear();
    }

    /// Returns the number of blocks in the chain.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the number of bytes handed out by the arena.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.used).sum()
    }

    /// Returns the total capacity of all blocks, in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.blocks.iter().map(|b| b.data.len()).sum()
    }
}
impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocations_do_not_overlap() {
        let mut arena = Arena::new();
        let sizes = [16, 1, 300, 7, 4096];

        let ranges: Vec<ArenaRange> = sizes
            .iter()
            .map(|&size| arena.allocate(size).unwrap())
            .collect();

        assert_eq!(arena.block_count(), 1);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].block(), pair[1].block());
            assert!(pair[0].start() < pair[1].start());
            assert!(pair[0].end() <= pair[1].start());
        }
        assert_eq!(arena.allocated_bytes(), sizes.iter().sum::<usize>());
    }

    #[test]
    fn test_new_block_when_full() {
        let mut arena = Arena::with_block_size(32);
        let first = arena.allocate(24).unwrap();
        let second = arena.allocate(16).unwrap();

        assert_eq!(arena.block_count(), 2);
        assert_eq!(first.block(), 0);
        assert_eq!(second.block(), 1);
        assert_eq!(second.start(), 0);
        assert_eq!(arena.capacity(), 64);
    }

    #[test]
    fn test_oversized_allocation_gets_own_block() {
        let mut arena = Arena::with_block_size(32);
        let big = arena.allocate(100).unwrap();
        assert_eq!(big.len(), 100);
        assert_eq!(arena.capacity(), 100);

        // The oversized block is full, so the next request chains another
        let small = arena.allocate(1).unwrap();
        assert_eq!(small.block(), 1);
        assert_eq!(arena.capacity(), 132);
    }

    #[test]
    fn test_alloc_bytes_round_trip() {
        let mut arena = Arena::new();
        let a = arena.alloc_bytes(b"alpha").unwrap();
        let b = arena.alloc_bytes(b"beta").unwrap();
        assert_eq!(arena.get(a), b"alpha");
        assert_eq!(arena.get(b), b"beta");

        arena.get_mut(a)[0] = b'A';
        assert_eq!(arena.get(a), b"Alpha");
    }

    #[test]
    fn test_zero_size_allocation() {
        let mut arena = Arena::new();
        let empty = arena.allocate(0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.get(empty), b"");
    }

    #[test]
    fn test_clear_releases_blocks() {
        let mut arena = Arena::with_block_size(8);
        arena.alloc_bytes(b"0123456789").unwrap();
        arena.alloc_bytes(b"abc").unwrap();
        assert_eq!(arena.block_count(), 2);

        arena.clear();
        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.allocated_bytes(), 0);

        let again = arena.alloc_bytes(b"xyz").unwrap();
        assert_eq!(again.block(), 0);
        assert_eq!(again.start(), 0);
    }

    #[test]
    fn test_exhaustion_is_reported() {
        let mut arena = Arena::new();
        let err = arena.allocate(usize::MAX).unwrap_err();
        assert!(matches!(
            err.kind,
            crate::XmlErrorKind::OutOfMemory {
                requested: usize::MAX
            }
        ));
    }
}
