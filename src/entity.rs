//! Minimal entity-index newtype, in the spirit of `cranelift_entity::EntityRef`.
//!
//! The teacher crate (`cranelift-entity`) only survived retrieval as a single
//! file (`map.rs`), not enough to vendor faithfully, so the small piece this
//! crate actually needs — a `u32`-backed index usable as a `Vec` key — is
//! reimplemented directly rather than depending on a crate we can't see the
//! whole of.

/// A densely-packed index into a `Vec`-backed table.
pub trait EntityRef: Copy + Eq + Ord {
    fn new(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! entity_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl EntityRef for $name {
            fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize);
                $name(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_index!(
    /// Identity of an IR vector value produced by some earlier opcode.
    VReg
);

entity_index!(
    /// Identity of an IR instruction within a basic block, in emission order.
    InstIdx
);
