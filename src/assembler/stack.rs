//! Stack-scratch and host-call glue used by the scalar fallback runtime.
//! These mnemonics sit outside the SSE/AVX/EVEX vector instruction set but
//! are ordinary x86-64 instructions encoded the same bit-exact way.

use super::encode::rex;
use super::Assembler;
use crate::reg::{Gpr, Xmm};

impl Assembler {
    /// `sub rsp, imm32`.
    pub fn sub_rsp_imm32(&mut self, imm: i32) {
        self.buf.push_u8(0x48);
        self.buf.push_u8(0x81);
        self.buf.push_u8(0b1100_0000 | (5 << 3) | Gpr::RSP.low3());
        self.buf.push_i32_le(imm);
    }

    /// `add rsp, imm32`.
    pub fn add_rsp_imm32(&mut self, imm: i32) {
        self.buf.push_u8(0x48);
        self.buf.push_u8(0x81);
        self.buf.push_u8(0b1100_0000 | Gpr::RSP.low3());
        self.buf.push_i32_le(imm);
    }

    /// `lea dst, [rsp + disp32]`.
    pub fn lea_gpr_from_rsp(&mut self, dst: Gpr, disp: i32) {
        if let Some(r) = rex(true, dst, Gpr::RSP) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x8D);
        self.buf.push_u8(0b1000_0000 | (dst.low3() << 3) | 0b100);
        self.buf.push_u8(0x24); // SIB: scale=00 index=100 (none) base=100 (rsp)
        self.buf.push_i32_le(disp);
    }

    /// `movdqu [rsp + disp32], src` — unaligned store, since the fallback
    /// scratch area's 16-byte alignment is a stack-discipline invariant,
    /// not something the assembler can assert locally.
    pub fn movdqu_store_rsp(&mut self, disp: i32, src: Xmm) {
        self.buf.push_u8(0xF3);
        if let Some(r) = rex(false, src, Gpr::RSP) {
            self.buf.push_u8(r);
        }
        self.buf.push_bytes(&[0x0F, 0x7F]);
        self.buf.push_u8(0b1000_0000 | (src.low3() << 3) | 0b100);
        self.buf.push_u8(0x24);
        self.buf.push_i32_le(disp);
    }

    /// `movdqu dst, [rsp + disp32]`.
    pub fn movdqu_load_rsp(&mut self, dst: Xmm, disp: i32) {
        self.buf.push_u8(0xF3);
        if let Some(r) = rex(false, dst, Gpr::RSP) {
            self.buf.push_u8(r);
        }
        self.buf.push_bytes(&[0x0F, 0x6F]);
        self.buf.push_u8(0b1000_0000 | (dst.low3() << 3) | 0b100);
        self.buf.push_u8(0x24);
        self.buf.push_i32_le(disp);
    }

    /// `or byte [r15 + disp32], al` — the only shape `fpsr_qc` updates take:
    /// always an OR into memory, never a write.
    pub fn or_byte_mem_r15(&mut self, disp: i32) {
        if let Some(r) = rex(false, Gpr::RAX, Gpr::R15) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0x08);
        self.buf.push_u8(0b1000_0000 | Gpr::R15.low3());
        self.buf.push_i32_le(disp);
    }

    /// `mov dst, imm64`.
    pub fn mov_gpr_imm64(&mut self, dst: Gpr, imm: u64) {
        if let Some(r) = rex(true, Gpr::RAX, dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0xB8 + dst.low3());
        self.buf.push_bytes(&imm.to_le_bytes());
    }

    /// `call dst` (near, register-indirect).
    pub fn call_reg(&mut self, dst: Gpr) {
        if let Some(r) = rex(false, Gpr::RAX, dst) {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0xFF);
        self.buf.push_u8(0b1100_0000 | (2 << 3) | dst.low3());
    }

    /// `call_function(fn_ptr)` — a host ABI-compliant call to an absolute
    /// address. `rax` carries neither argument nor return value on either
    /// ABI, so it is safe to clobber here unconditionally.
    pub fn call_function(&mut self, fn_ptr: usize) {
        self.mov_gpr_imm64(Gpr::RAX, fn_ptr as u64);
        self.call_reg(Gpr::RAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `fpsr_qc` must be updated with `08 /r` (`OR r/m8, r8`), never `88 /r`
    /// (`MOV r/m8, r8`) — a write would clobber another opcode's saturation
    /// flag from earlier in the same block.
    #[test]
    fn or_byte_mem_r15_encodes_or_not_mov() {
        let mut asm = Assembler::new();
        asm.or_byte_mem_r15(0x10);
        let code = asm.code();
        assert_eq!(code[0] & 0xF8, 0x40, "expects a REX prefix (r15 needs REX.B)");
        assert_eq!(code[1], 0x08, "opcode must be OR r/m8, r8, not MOV's 0x88");
        assert_eq!(code[2] & 0xC7, 0b1000_0111, "ModRM: mod=10, reg=rax, rm=r15&0x7");
        assert_eq!(&code[3..7], &0x10i32.to_le_bytes());
    }
}
