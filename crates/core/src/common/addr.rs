//! Line geometry and address decomposition.
//!
//! This module maps byte addresses onto the lines of a single cache level. It provides:
//! 1. **Indexing:** Line index, set index, and tag extraction for an address.
//! 2. **Reconstruction:** Rebuilding a line's base address from its tag and set (for write-backs).
//! 3. **Splitting:** Decomposing an arbitrary `[addr, addr + size)` range into line-aligned chunks.

/// Line size and set count of one cache level.
///
/// Both values are expected to be powers of two; `HierarchyConfig::validate`
/// enforces that before any level is built. The arithmetic itself uses plain
/// division so it stays total for any non-zero geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineGeometry {
    line_bytes: u64,
    sets: u64,
}

impl LineGeometry {
    /// Creates a geometry from a line size in bytes and a number of sets.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Size of one line in bytes (non-zero).
    /// * `sets` - Number of sets (non-zero).
    pub fn new(line_bytes: u64, sets: u64) -> Self {
        debug_assert!(line_bytes > 0 && sets > 0, "zero-sized geometry");
        Self { line_bytes, sets }
    }

    /// Returns the line size in bytes.
    #[inline]
    pub fn line_bytes(&self) -> u64 {
        self.line_bytes
    }

    /// Returns the number of sets.
    #[inline]
    pub fn sets(&self) -> u64 {
        self.sets
    }

    /// Index of the line containing `addr` in the flat line space (`addr / line_bytes`).
    #[inline]
    pub fn line_index(&self, addr: u64) -> u64 {
        addr / self.line_bytes
    }

    /// Set that `addr` maps to.
    #[inline]
    pub fn set_index(&self, addr: u64) -> usize {
        (self.line_index(addr) % self.sets) as usize
    }

    /// Tag identifying the line holding `addr` within its set.
    #[inline]
    pub fn tag(&self, addr: u64) -> u64 {
        self.line_index(addr) / self.sets
    }

    /// Base address of the line holding `addr`.
    #[inline]
    pub fn line_base(&self, addr: u64) -> u64 {
        addr - addr % self.line_bytes
    }

    /// Base address of the line identified by `tag` in set `set`.
    ///
    /// Inverse of [`tag`](Self::tag) and [`set_index`](Self::set_index):
    /// `line_address(tag(a), set_index(a)) == line_base(a)`.
    #[inline]
    pub fn line_address(&self, tag: u64, set: usize) -> u64 {
        tag.wrapping_mul(self.sets)
            .wrapping_add(set as u64)
            .wrapping_mul(self.line_bytes)
    }

    /// Splits `[addr, addr + size)` into chunks that each stay inside one line.
    ///
    /// Chunks come out in increasing address order. A zero `size` yields nothing.
    /// Ranges running past the top of the address space wrap to zero.
    pub fn split(&self, addr: u64, size: u64) -> LineSplit {
        LineSplit {
            line_bytes: self.line_bytes,
            cursor: addr,
            remaining: size,
        }
    }
}

/// A piece of an access that falls entirely inside one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineChunk {
    /// First byte of the chunk.
    pub addr: u64,
    /// Chunk length in bytes, `1..=line_bytes`.
    pub size: u64,
}

/// Iterator over the line-aligned chunks of a byte range.
///
/// Created by [`LineGeometry::split`].
#[derive(Clone, Debug)]
pub struct LineSplit {
    line_bytes: u64,
    cursor: u64,
    remaining: u64,
}

impl Iterator for LineSplit {
    type Item = LineChunk;

    fn next(&mut self) -> Option<LineChunk> {
        if self.remaining == 0 {
            return None;
        }
        let room = self.line_bytes - self.cursor % self.line_bytes;
        let size = room.min(self.remaining);
        let chunk = LineChunk {
            addr: self.cursor,
            size,
        };
        self.cursor = self.cursor.wrapping_add(size);
        self.remaining -= size;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining == 0 {
            return (0, Some(0));
        }
        let head = self.cursor % self.line_bytes;
        let lines = head.saturating_add(self.remaining).div_ceil(self.line_bytes);
        let lines = usize::try_from(lines).unwrap_or(usize::MAX);
        (lines, Some(lines))
    }
}
