//! A handful of plain GPR-GPR/GPR-immediate mnemonics needed by the
//! pre-SSE4.1 element-access emulation paths. Everything here operates at
//! 32-bit operand size; none of the opcodes this crate lowers need a
//! 64-bit GPR ALU op.

use super::encode::rex;
use super::Assembler;
use crate::reg::Gpr;

impl Assembler {
    /// `mov r/m32, r32` (`89 /r`).
    pub fn mov_gpr_gpr(&mut self, dst: Gpr, src: Gpr) {
        if let Some(r) = rex(false, src, dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x89);
        self.buf.push_u8(0b1100_0000 | (src.low3() << 3) | dst.low3());
    }

    /// `or r/m32, r32` (`09 /r`).
    pub fn or_gpr_gpr(&mut self, dst: Gpr, src: Gpr) {
        if let Some(r) = rex(false, src, dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x09);
        self.buf.push_u8(0b1100_0000 | (src.low3() << 3) | dst.low3());
    }

    /// `and r/m32, imm32` (`81 /4 id`).
    pub fn and_gpr_imm32(&mut self, dst: Gpr, imm: u32) {
        self.alu_imm32(4, dst, imm);
    }

    /// `xor r/m32, imm32` (`81 /6 id`).
    pub fn xor_gpr_imm32(&mut self, dst: Gpr, imm: u32) {
        self.alu_imm32(6, dst, imm);
    }

    /// `test r/m32, r32` (`85 /r`) — used to turn a `pmovmskb` result into a
    /// zero/nonzero flag ahead of `setne_al`.
    pub fn test_gpr_gpr(&mut self, a: Gpr, b: Gpr) {
        if let Some(r) = rex(false, b, a) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x85);
        self.buf.push_u8(0b1100_0000 | (b.low3() << 3) | a.low3());
    }

    /// `setne al` (`0F 95 C0`) — materializes the zero flag from the
    /// preceding `test` as a 0/1 byte, ready to `or_byte_mem_r15` into
    /// `fpsr_qc`.
    pub fn setne_al(&mut self) {
        self.buf.push_u8(0x0F);
        self.buf.push_u8(0x95);
        self.buf.push_u8(0xC0);
    }

    /// `shl r/m32, imm8` (`C1 /4 ib`).
    pub fn shl_gpr_imm8(&mut self, dst: Gpr, imm: u8) {
        self.shift_imm_gpr(4, dst, imm);
    }

    /// `sar r/m64, imm8` (`REX.W C1 /7 ib`) — arithmetic shift right, used to
    /// emulate `ArithmeticShiftRight64` lane-by-lane when AVX-512VL isn't
    /// available, the same GPR-roundtrip idiom used elsewhere in this
    /// crate for lane-at-a-time scalar fallbacks.
    pub fn sar_gpr64_imm8(&mut self, dst: Gpr, imm: u8) {
        if let Some(r) = rex(true, Gpr::new(7), dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0xC1);
        self.buf.push_u8(0b1100_0000 | (7 << 3) | dst.low3());
        self.buf.push_u8(imm);
    }

    /// `imul r64, r/m64` (`REX.W 0F AF /r`) — the `Multiply64` SSE4.1 path's
    /// per-lane `movq/pextrq/imul` unroll.
    pub fn imul_gpr64_gpr64(&mut self, dst: Gpr, src: Gpr) {
        if let Some(r) = rex(true, dst, src) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x0F);
        self.buf.push_u8(0xAF);
        self.buf.push_u8(0b1100_0000 | (dst.low3() << 3) | src.low3());
    }

    fn alu_imm32(&mut self, digit: u8, dst: Gpr, imm: u32) {
        if let Some(r) = rex(false, Gpr::new(digit), dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x81);
        self.buf.push_u8(0b1100_0000 | (digit << 3) | dst.low3());
        self.buf.push_bytes(&imm.to_le_bytes());
    }

    fn shift_imm_gpr(&mut self, digit: u8, dst: Gpr, imm: u8) {
        if let Some(r) = rex(false, Gpr::new(digit), dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0xC1);
        self.buf.push_u8(0b1100_0000 | (digit << 3) | dst.low3());
        self.buf.push_u8(imm);
    }
}
