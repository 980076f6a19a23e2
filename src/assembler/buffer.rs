//! Append-only machine code buffer, owned exclusively by the assembler.

/// A growable byte buffer holding emitted x86-64 machine code.
///
/// Grounded on `cranelift-codegen`'s binemit convention of treating the
/// emitted-code region as a plain, append-only `Vec<u8>`; this crate's
/// opcodes never branch, so none of `MachBuffer`'s relaxation/label-patch
/// machinery is needed here.
#[derive(Default)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cur_offset(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn push_u8(&mut self, b: u8) {
        self.bytes.push(b);
    }

    pub fn push_bytes(&mut self, bs: &[u8]) {
        self.bytes.extend_from_slice(bs);
    }

    pub fn push_u32_le(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_i32_le(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}
