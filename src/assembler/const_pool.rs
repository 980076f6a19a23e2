//! 16-byte-aligned, deduplicated constant pool.
//!
//! Grounded directly on `cranelift_codegen::ir::constant::ConstantPool`: a
//! bytes-to-handle map gives O(1) dedup, and a handle-to-bytes map
//! (insertion order preserved) gives stable iteration for final layout.

use std::collections::HashMap;

/// A 16-byte literal as it will appear in the constant pool.
pub type ConstBytes = [u8; 16];

/// A handle into the constant pool. Equal literals always produce equal
/// handles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ConstHandle(u32);

#[derive(Default)]
pub struct ConstPool {
    // Insertion-ordered storage; `ConstHandle(i)` indexes here.
    entries: Vec<ConstBytes>,
    // Dedup index: bytes -> handle.
    by_bytes: HashMap<ConstBytes, ConstHandle>,
}

impl ConstPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a 16-byte literal, returning the (possibly pre-existing)
    /// handle for it. Equal bytes always return the same handle.
    pub fn intern(&mut self, bytes: ConstBytes) -> ConstHandle {
        if let Some(&handle) = self.by_bytes.get(&bytes) {
            log::trace!("const pool dedup hit for {bytes:02x?}");
            return handle;
        }
        let handle = ConstHandle(self.entries.len() as u32);
        self.entries.push(bytes);
        self.by_bytes.insert(bytes, handle);
        handle
    }

    pub fn get(&self, handle: ConstHandle) -> &ConstBytes {
        &self.entries[handle.0 as usize]
    }

    /// Number of distinct literals currently pooled.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Byte offset of `handle`'s literal within the final, 16-byte-aligned
    /// pool layout (each entry is exactly 16 bytes, so this is just an
    /// index multiply - no per-entry size bucketing, since this crate
    /// never pools anything smaller than a full 128-bit lane).
    pub fn offset_of(&self, handle: ConstHandle) -> u32 {
        handle.0 * 16
    }

    /// Iterate entries in insertion order, for final pool emission.
    pub fn iter(&self) -> impl Iterator<Item = &ConstBytes> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_literals_dedup() {
        let mut pool = ConstPool::new();
        let a = pool.intern([1u8; 16]);
        let b = pool.intern([1u8; 16]);
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_literals_get_distinct_handles() {
        let mut pool = ConstPool::new();
        let a = pool.intern([1u8; 16]);
        let b = pool.intern([2u8; 16]);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.offset_of(a), 0);
        assert_eq!(pool.offset_of(b), 16);
    }
}
