//! The x86-64 assembler.
//!
//! `Assembler` owns the growing code buffer and the constant pool; every
//! typed mnemonic method in [`mnemonics`] appends bytes to `buf` and, where
//! a literal operand is needed, interns it into `consts`. Grounded on
//! `cranelift_codegen::MachBuffer` owning its own constant pool in the same
//! way (see DESIGN.md).

mod buffer;
mod const_pool;
mod encode;
mod gpr;
mod mnemonics;
mod stack;

pub use buffer::CodeBuffer;
pub use const_pool::{ConstBytes, ConstHandle, ConstPool};

/// The sole mutable home for emitted machine code and pooled literals.
///
/// `EmitCtx` holds one of these; every `emit::*` function reaches it through
/// `ctx.asm` and never constructs its own buffer — the assembler is owned
/// exclusively by `EmitCtx`.
#[derive(Default)]
pub struct Assembler {
    buf: CodeBuffer,
    consts: ConstPool,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cur_offset(&self) -> u32 {
        self.buf.cur_offset()
    }

    /// Peek at the code emitted so far without consuming the assembler
    /// (used by tests that compare output across multiple `EmitCtx`
    /// instances built with different CPU feature masks).
    pub fn code(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn const_pool(&self) -> &ConstPool {
        &self.consts
    }

    /// Hand back the finished code buffer, consuming the assembler. The
    /// constant pool is finalized separately via [`Assembler::const_pool`]
    /// before this is called.
    pub fn finish(self) -> Vec<u8> {
        self.buf.into_vec()
    }
}
