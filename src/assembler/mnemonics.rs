//! Typed per-mnemonic assembler methods.
//!
//! Enrichment source: `other_examples/…winch-codegen-src-isa-x64-asm.rs.rs`
//! (the shape of "one method per mnemonic, generic encode helper
//! underneath" is the modern idiom for a hand-rolled x64 assembler; the
//! actual byte-level encoding is this crate's own, built directly against
//! the Intel SDM).
//!
//! Methods are grouped by SSE/AVX generation, matching the instructions
//! this crate's lowerings need. A handful of internal `macro_rules!` cut
//! down the boilerplate of "prefix + escape + opcode + modrm" that every
//! register-register legacy SSE instruction shares.

use super::encode::{
    emit_evex_prefix, emit_vex_prefix, modrm_reg, modrm_rip_relative, rex, EvexOp, LegacyOp,
    VexMap, VexOp, VexPrefix,
};
use super::Assembler;
use crate::reg::{Gpr, Xmm};

impl Assembler {
    fn emit_legacy_rr(&mut self, op: &LegacyOp, reg: impl super::encode::RegCode, rm: impl super::encode::RegCode) {
        if let Some(p) = op.mandatory_prefix {
            self.buf.push_u8(p);
        }
        if let Some(r) = rex(op.rex_w, reg, rm) {
            self.buf.push_u8(r);
        }
        self.buf.push_bytes(op.escape);
        self.buf.push_u8(op.opcode);
        self.buf.push_u8(modrm_reg(reg, rm));
    }

    fn emit_legacy_rr_imm8(
        &mut self,
        op: &LegacyOp,
        reg: impl super::encode::RegCode,
        rm: impl super::encode::RegCode,
        imm: u8,
    ) {
        self.emit_legacy_rr(op, reg, rm);
        self.buf.push_u8(imm);
    }

    fn emit_vex_rr(&mut self, op: &VexOp, reg: Xmm, rm: Xmm) {
        let mut bytes = Vec::with_capacity(4);
        emit_vex_prefix(&mut bytes, op, reg, rm);
        self.buf.push_bytes(&bytes);
        self.buf.push_u8(modrm_reg(reg, rm));
    }

    fn emit_evex_rr(&mut self, op: &EvexOp, reg: Xmm, rm: Xmm) {
        let mut bytes = Vec::with_capacity(6);
        emit_evex_prefix(&mut bytes, op, reg, rm);
        self.buf.push_bytes(&bytes);
        self.buf.push_u8(modrm_reg(reg, rm));
    }
}

/// Declares `pub fn $name(&mut self, dst: Xmm, src: Xmm)` forwarding to a
/// fixed legacy SSE encoding. `dst` fills the ModRM `reg` field, `src` fills
/// `rm`, matching Intel's `mnemonic dst, src` operand order for the /r forms
/// used throughout this family.
macro_rules! legacy_rr {
    ($name:ident, $op:expr) => {
        pub fn $name(&mut self, dst: Xmm, src: Xmm) {
            let op = $op;
            self.emit_legacy_rr(&op, dst, src);
        }
    };
}

macro_rules! legacy_rr_imm8 {
    ($name:ident, $op:expr) => {
        pub fn $name(&mut self, dst: Xmm, src: Xmm, imm: u8) {
            let op = $op;
            self.emit_legacy_rr_imm8(&op, dst, src, imm);
        }
    };
}

impl Assembler {
    // ---- SSE2 integer element-wise ----------------------------------------
    legacy_rr!(paddb, LegacyOp::sse2(0xFC));
    legacy_rr!(paddw, LegacyOp::sse2(0xFD));
    legacy_rr!(paddd, LegacyOp::sse2(0xFE));
    legacy_rr!(paddq, LegacyOp::sse2(0xD4));
    legacy_rr!(psubb, LegacyOp::sse2(0xF8));
    legacy_rr!(psubw, LegacyOp::sse2(0xF9));
    legacy_rr!(psubd, LegacyOp::sse2(0xFA));
    legacy_rr!(psubq, LegacyOp::sse2(0xFB));

    legacy_rr!(pand, LegacyOp::sse2(0xDB));
    legacy_rr!(pandn, LegacyOp::sse2(0xDF));
    legacy_rr!(por, LegacyOp::sse2(0xEB));
    legacy_rr!(pxor, LegacyOp::sse2(0xEF));

    legacy_rr!(pcmpeqb, LegacyOp::sse2(0x74));
    legacy_rr!(pcmpeqw, LegacyOp::sse2(0x75));
    legacy_rr!(pcmpeqd, LegacyOp::sse2(0x76));
    legacy_rr!(pcmpgtb, LegacyOp::sse2(0x64));
    legacy_rr!(pcmpgtw, LegacyOp::sse2(0x65));
    legacy_rr!(pcmpgtd, LegacyOp::sse2(0x66));

    legacy_rr!(pminub, LegacyOp::sse2(0xDA));
    legacy_rr!(pmaxub, LegacyOp::sse2(0xDE));
    legacy_rr!(pminsw, LegacyOp::sse2(0xEA));
    legacy_rr!(pmaxsw, LegacyOp::sse2(0xEE));
    legacy_rr!(pavgb, LegacyOp::sse2(0xE0));
    legacy_rr!(pavgw, LegacyOp::sse2(0xE3));

    legacy_rr!(pmullw, LegacyOp::sse2(0xD5));
    legacy_rr!(pmulhw, LegacyOp::sse2(0xE5));
    legacy_rr!(pmulhuw, LegacyOp::sse2(0xE4));
    legacy_rr!(pmuludq, LegacyOp::sse2(0xF4));
    legacy_rr!(pmaddwd, LegacyOp::sse2(0xF5));

    legacy_rr!(psllw, LegacyOp::sse2(0xF1));
    legacy_rr!(pslld, LegacyOp::sse2(0xF2));
    legacy_rr!(psllq, LegacyOp::sse2(0xF3));
    legacy_rr!(psrlw, LegacyOp::sse2(0xD1));
    legacy_rr!(psrld, LegacyOp::sse2(0xD2));
    legacy_rr!(psrlq, LegacyOp::sse2(0xD3));
    legacy_rr!(psraw, LegacyOp::sse2(0xE1));
    legacy_rr!(psrad, LegacyOp::sse2(0xE2));

    /// `psllw xmm, imm8` (`66 0F 71 /6 ib`) — shift-by-immediate digit form,
    /// distinct from the register-shift-count form above.
    pub fn psllw_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x71, 6, dst, imm);
    }
    pub fn pslld_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x72, 6, dst, imm);
    }
    pub fn psllq_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x73, 6, dst, imm);
    }
    pub fn psrlw_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x71, 2, dst, imm);
    }
    pub fn psrld_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x72, 2, dst, imm);
    }
    pub fn psrlq_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x73, 2, dst, imm);
    }
    pub fn psraw_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x71, 4, dst, imm);
    }
    pub fn psrad_imm(&mut self, dst: Xmm, imm: u8) {
        self.shift_imm_digit(0x72, 4, dst, imm);
    }

    fn shift_imm_digit(&mut self, opcode: u8, digit: u8, dst: Xmm, imm: u8) {
        let op = LegacyOp::sse2(opcode);
        self.emit_legacy_rr_imm8(&op, Xmm::new(digit), dst, imm);
    }

    legacy_rr!(packsswb, LegacyOp::sse2(0x63));
    legacy_rr!(packssdw, LegacyOp::sse2(0x6B));
    legacy_rr!(packuswb, LegacyOp::sse2(0x67));

    legacy_rr!(punpcklbw, LegacyOp::sse2(0x60));
    legacy_rr!(punpcklwd, LegacyOp::sse2(0x61));
    legacy_rr!(punpckldq, LegacyOp::sse2(0x62));
    legacy_rr!(punpcklqdq, LegacyOp::sse2(0x6C));
    legacy_rr!(punpckhbw, LegacyOp::sse2(0x68));
    legacy_rr!(punpckhwd, LegacyOp::sse2(0x69));
    legacy_rr!(punpckhdq, LegacyOp::sse2(0x6A));
    legacy_rr!(punpckhqdq, LegacyOp::sse2(0x6D));

    legacy_rr!(movdqa, LegacyOp::sse2(0x6F));
    legacy_rr!(movaps, LegacyOp { mandatory_prefix: None, escape: &[0x0F], opcode: 0x28, rex_w: false });

    /// `shufps xmm, xmm, imm8` (no mandatory prefix) — used on integer bit
    /// patterns purely for its dword-select/concatenate shape in
    /// `emit/narrow_widen.rs`'s `Narrow64`.
    legacy_rr_imm8!(
        shufps,
        LegacyOp { mandatory_prefix: None, escape: &[0x0F], opcode: 0xC6, rex_w: false }
    );

    legacy_rr_imm8!(pshufd, LegacyOp::sse2(0x70));
    legacy_rr_imm8!(pshufhw, LegacyOp { mandatory_prefix: Some(0xF3), escape: &[0x0F], opcode: 0x70, rex_w: false });
    legacy_rr_imm8!(pshuflw, LegacyOp { mandatory_prefix: Some(0xF2), escape: &[0x0F], opcode: 0x70, rex_w: false });

    /// `pslldq xmm, imm8` — shift left by `imm` bytes. The `/7` digit is
    /// encoded in the ModRM `reg` field in place of a second register, so
    /// this does not go through the generic `legacy_rr_imm8!` path.
    pub fn pslldq(&mut self, dst: Xmm, imm: u8) {
        let op = LegacyOp::sse2(0x73);
        self.emit_legacy_rr_imm8(&op, Xmm::new(7), dst, imm);
    }

    /// `psrldq xmm, imm8` — `/3` digit form, shift right by `imm` bytes.
    pub fn psrldq(&mut self, dst: Xmm, imm: u8) {
        let op = LegacyOp::sse2(0x73);
        self.emit_legacy_rr_imm8(&op, Xmm::new(3), dst, imm);
    }

    // ---- SSSE3 --------------------------------------------------------------
    legacy_rr!(pshufb, LegacyOp::ssse3(0x00));
    legacy_rr!(pabsb, LegacyOp::ssse3(0x1C));
    legacy_rr!(pabsw, LegacyOp::ssse3(0x1D));
    legacy_rr!(pabsd, LegacyOp::ssse3(0x1E));
    legacy_rr!(phaddw, LegacyOp::ssse3(0x01));
    legacy_rr!(phaddd, LegacyOp::ssse3(0x02));
    legacy_rr!(psignb, LegacyOp::ssse3(0x08));
    legacy_rr!(psignw, LegacyOp::ssse3(0x09));
    legacy_rr!(psignd, LegacyOp::ssse3(0x0A));

    // ---- SSE4.1 ---------------------------------------------------------------
    legacy_rr!(pmulld, LegacyOp::sse41(0x40));
    legacy_rr!(pmuldq, LegacyOp::sse41(0x28));
    legacy_rr!(pcmpeqq, LegacyOp::sse41(0x29));
    legacy_rr!(packusdw, LegacyOp::sse41(0x2B));
    legacy_rr!(pminsb, LegacyOp::sse41(0x38));
    legacy_rr!(pminsd, LegacyOp::sse41(0x39));
    legacy_rr!(pminuw, LegacyOp::sse41(0x3A));
    legacy_rr!(pminud, LegacyOp::sse41(0x3B));
    legacy_rr!(pmaxsb, LegacyOp::sse41(0x3C));
    legacy_rr!(pmaxsd, LegacyOp::sse41(0x3D));
    legacy_rr!(pmaxuw, LegacyOp::sse41(0x3E));
    legacy_rr!(pmaxud, LegacyOp::sse41(0x3F));
    legacy_rr!(ptest, LegacyOp::sse41(0x17));
    legacy_rr!(pmovsxbw, LegacyOp::sse41(0x20));
    legacy_rr!(pmovsxwd, LegacyOp::sse41(0x23));
    legacy_rr!(pmovsxdq, LegacyOp::sse41(0x25));
    legacy_rr!(pmovzxbw, LegacyOp::sse41(0x30));
    legacy_rr!(pmovzxwd, LegacyOp::sse41(0x33));
    legacy_rr!(pmovzxdq, LegacyOp::sse41(0x35));

    legacy_rr_imm8!(pblendw, LegacyOp::sse41_3a(0x0E));

    /// `pextrb gpr32, xmm, imm8` (SSE4.1).
    pub fn pextrb(&mut self, dst: Gpr, src: Xmm, imm: u8) {
        let op = LegacyOp::sse41_3a(0x14);
        self.emit_legacy_rr_imm8(&op, src, XmmGprPun(dst), imm);
    }
    /// `pextrd gpr32, xmm, imm8` (SSE4.1).
    pub fn pextrd(&mut self, dst: Gpr, src: Xmm, imm: u8) {
        let op = LegacyOp::sse41_3a(0x16);
        self.emit_legacy_rr_imm8(&op, src, XmmGprPun(dst), imm);
    }
    /// `pextrq gpr64, xmm, imm8` (SSE4.1, REX.W).
    pub fn pextrq(&mut self, dst: Gpr, src: Xmm, imm: u8) {
        let op = LegacyOp::sse41_3a(0x16).with_rex_w();
        self.emit_legacy_rr_imm8(&op, src, XmmGprPun(dst), imm);
    }
    /// `pinsrb xmm, gpr32, imm8` (SSE4.1).
    pub fn pinsrb(&mut self, dst: Xmm, src: Gpr, imm: u8) {
        let op = LegacyOp::sse41_3a(0x20);
        self.emit_legacy_rr_imm8(&op, dst, XmmGprPun(src), imm);
    }
    /// `pinsrd xmm, gpr32, imm8` (SSE4.1).
    pub fn pinsrd(&mut self, dst: Xmm, src: Gpr, imm: u8) {
        let op = LegacyOp::sse41_3a(0x22);
        self.emit_legacy_rr_imm8(&op, dst, XmmGprPun(src), imm);
    }
    /// `pinsrq xmm, gpr64, imm8` (SSE4.1, REX.W).
    pub fn pinsrq(&mut self, dst: Xmm, src: Gpr, imm: u8) {
        let op = LegacyOp::sse41_3a(0x22).with_rex_w();
        self.emit_legacy_rr_imm8(&op, dst, XmmGprPun(src), imm);
    }

    /// `pblendvb dst, src` — blend using the implicit `xmm0` mask register.
    /// `xmm0` must hold the selector mask before this is emitted; the
    /// register allocator is responsible for arranging that (emitters using
    /// this call `regalloc` to pin the mask into `xmm0` first).
    pub fn pblendvb(&mut self, dst: Xmm, src: Xmm) {
        let op = LegacyOp::sse41(0x10);
        self.emit_legacy_rr(&op, dst, src);
    }

    /// `pinsrw dst, gpr32, imm8` (SSE2) — always available, unlike the
    /// other width variants.
    pub fn pinsrw(&mut self, dst: Xmm, src: Gpr, imm: u8) {
        let op = LegacyOp::sse2(0xC4);
        self.emit_legacy_rr_imm8(&op, dst, XmmGprPun(src), imm);
    }

    /// `pextrw gpr32, dst, imm8` (SSE2).
    pub fn pextrw(&mut self, dst: Gpr, src: Xmm, imm: u8) {
        let op = LegacyOp::sse2(0xC5);
        self.emit_legacy_rr_imm8(&op, XmmGprPun(dst), src, imm);
    }

    // ---- SSE4.2 -----------------------------------------------------------
    legacy_rr!(pcmpgtq, LegacyOp::sse41(0x37));

    // ---- movq / movd (GPR<->XMM and XMM<->XMM low64) -----------------------

    /// `movq xmm, xmm` — zero-extends the low 64 bits of `src` into `dst`,
    /// used for `ZeroUpper`.
    pub fn movq_xmm_xmm(&mut self, dst: Xmm, src: Xmm) {
        let op = LegacyOp { mandatory_prefix: Some(0xF3), escape: &[0x0F], opcode: 0x7E, rex_w: false };
        self.emit_legacy_rr(&op, dst, src);
    }

    /// `movq xmm, gpr64` (66 REX.W 0F 6E).
    pub fn movq_xmm_gpr(&mut self, dst: Xmm, src: Gpr) {
        let op = LegacyOp::sse2(0x6E).with_rex_w();
        self.emit_legacy_rr(&op, dst, XmmGprPun(src));
    }

    /// `movq gpr64, xmm` (66 REX.W 0F 7E).
    pub fn movq_gpr_xmm(&mut self, dst: Gpr, src: Xmm) {
        let op = LegacyOp::sse2(0x7E).with_rex_w();
        self.emit_legacy_rr(&op, XmmGprPun(dst), src);
    }

    /// `movd xmm, gpr32` (66 0F 6E).
    pub fn movd_xmm_gpr(&mut self, dst: Xmm, src: Gpr) {
        let op = LegacyOp::sse2(0x6E);
        self.emit_legacy_rr(&op, dst, XmmGprPun(src));
    }

    /// `movd gpr32, xmm` (66 0F 7E).
    pub fn movd_gpr_xmm(&mut self, dst: Gpr, src: Xmm) {
        let op = LegacyOp::sse2(0x7E);
        self.emit_legacy_rr(&op, XmmGprPun(dst), src);
    }

    /// `pmovmskb gpr32, xmm` (66 0F D7) - one mask bit per byte lane, used
    /// by the `INT_MIN`-detection sequences in `emit/abs.rs`,
    /// `emit/sat_multiply.rs` and `emit/narrow_widen.rs`.
    pub fn pmovmskb(&mut self, dst: Gpr, src: Xmm) {
        let op = LegacyOp::sse2(0xD7);
        self.emit_legacy_rr(&op, XmmGprPun(dst), src);
    }

    /// `movmskps gpr32, xmm` (0F 50, no mandatory prefix) — one mask bit
    /// per dword lane's sign bit, the pre-SSE4.1 `ptest` substitute for
    /// `emit/narrow_widen.rs`'s saturation detection.
    pub fn movmskps(&mut self, dst: Gpr, src: Xmm) {
        let op = LegacyOp { mandatory_prefix: None, escape: &[0x0F], opcode: 0x50, rex_w: false };
        self.emit_legacy_rr(&op, XmmGprPun(dst), src);
    }

    /// `movsd xmm, xmm` - low-64 merge used by the pre-SSE4.1 SetElement64
    /// path.
    pub fn movsd_xmm_xmm(&mut self, dst: Xmm, src: Xmm) {
        let op = LegacyOp { mandatory_prefix: Some(0xF2), escape: &[0x0F], opcode: 0x10, rex_w: false };
        self.emit_legacy_rr(&op, dst, src);
    }

    // ---- GPR shift/move helpers used by element-access fallback paths -----
    pub fn shr_gpr_imm8(&mut self, reg: Gpr, imm: u8) {
        let rex_byte = rex(false, Gpr::new(5), reg);
        if let Some(r) = rex_byte {
            self.buf.push_u8(r);
        }
        self.buf.push_u8(0xC1);
        self.buf.push_u8(0b1100_0000 | (5 << 3) | reg.low3());
        self.buf.push_u8(imm);
    }

    // ---- AVX2 broadcasts ----------------------------------------------------
    pub fn vpbroadcastb(&mut self, dst: Xmm, src: Xmm) {
        let op = VexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x78, w: false, vvvv: None };
        self.emit_vex_rr(&op, dst, src);
    }
    pub fn vpbroadcastw(&mut self, dst: Xmm, src: Xmm) {
        let op = VexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x79, w: false, vvvv: None };
        self.emit_vex_rr(&op, dst, src);
    }
    pub fn vpbroadcastd(&mut self, dst: Xmm, src: Xmm) {
        let op = VexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x58, w: false, vvvv: None };
        self.emit_vex_rr(&op, dst, src);
    }
    pub fn vpbroadcastq(&mut self, dst: Xmm, src: Xmm) {
        let op = VexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x59, w: false, vvvv: None };
        self.emit_vex_rr(&op, dst, src);
    }

    /// `vpcmpgtq` (AVX, three-operand form collapsed to two since this
    /// crate always targets `dst == lhs`).
    pub fn vpcmpgtq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = VexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x37, w: false, vvvv: Some(lhs) };
        self.emit_vex_rr(&op, dst, rhs);
    }

    // ---- AVX-512VL/BW/DQ/BITALG (feature-gated at the call site) -----------
    pub fn vpabsq(&mut self, dst: Xmm, src: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x1F, w: true, vvvv: None };
        self.emit_evex_rr(&op, dst, src);
    }
    pub fn vpmaxsq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x3D, w: true, vvvv: Some(lhs) };
        self.emit_evex_rr(&op, dst, rhs);
    }
    pub fn vpmaxuq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x3F, w: true, vvvv: Some(lhs) };
        self.emit_evex_rr(&op, dst, rhs);
    }
    pub fn vpminsq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x39, w: true, vvvv: Some(lhs) };
        self.emit_evex_rr(&op, dst, rhs);
    }
    pub fn vpminuq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x3B, w: true, vvvv: Some(lhs) };
        self.emit_evex_rr(&op, dst, rhs);
    }
    pub fn vpmullq(&mut self, dst: Xmm, lhs: Xmm, rhs: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x40, w: true, vvvv: Some(lhs) };
        self.emit_evex_rr(&op, dst, rhs);
    }
    /// `vpmovwb` (AVX512VL+BW) — narrow 16->8 truncating, no saturation.
    pub fn vpmovwb(&mut self, dst: Xmm, src: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x30, w: false, vvvv: None };
        self.emit_evex_rr(&op, dst, src);
    }
    /// `vpopcntb` (AVX512_BITALG).
    pub fn vpopcntb(&mut self, dst: Xmm, src: Xmm) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F38, opcode: 0x54, w: false, vvvv: None };
        self.emit_evex_rr(&op, dst, src);
    }
    /// `vpsraq` (AVX512VL) register-register variable-shift form; the
    /// immediate-shift form used by `ArithmeticShiftRight64` reuses the
    /// same opcode with the ModRM `reg` digit set to the `/4` extension.
    pub fn vpsraq_imm(&mut self, dst: Xmm, src: Xmm, imm: u8) {
        let op = EvexOp { prefix: VexPrefix::P66, map: VexMap::Map0F, opcode: 0x72, w: true, vvvv: None };
        let mut bytes = Vec::with_capacity(6);
        emit_evex_prefix(&mut bytes, &op, Xmm::new(4), src);
        self.buf.push_bytes(&bytes);
        self.buf.push_u8(modrm_reg(Xmm::new(4), src));
        self.buf.push_u8(imm);
        let _ = dst; // dst == src for the in-place EVEX.128 shift-by-imm form
    }
}

/// A zero-cost register-field punning wrapper so [`RegCode`]-generic ModRM
/// helpers can be reused for instructions that mix a GPR and an XMM operand
/// in the same ModRM byte (`movd`/`movq`/`pinsrw`/`pextrw`). The wrapped
/// register still contributes its real 3-bit/extension encoding; only the
/// *kind* of register (GPR vs XMM) differs, and ModRM encoding does not
/// care which bank a field's bits name.
struct XmmGprPun<T>(T);

impl<T: Copy> Clone for XmmGprPun<T> {
    fn clone(&self) -> Self {
        XmmGprPun(self.0)
    }
}
impl<T: Copy> Copy for XmmGprPun<T> {}

impl super::encode::RegCode for XmmGprPun<Gpr> {
    fn low3(self) -> u8 {
        self.0.low3()
    }
    fn needs_ext(self) -> bool {
        self.0.needs_rex_ext()
    }
}

impl Assembler {
    /// Load a 128-bit constant-pool literal into `dst` via
    /// `movdqa dst, [rip + const]`. The pool handle is consumed here rather
    /// than returned as a standalone type, since every caller immediately
    /// loads the literal into an XMM register.
    pub fn movdqa_from_const(&mut self, dst: Xmm, bytes: [u8; 16]) {
        let handle = self.consts.intern(bytes);
        self.buf.push_u8(0x66);
        if let Some(r) = rex(false, dst, Xmm::new(0)) {
            self.buf.push_u8(r);
        }
        self.buf.push_bytes(&[0x0F, 0x6F]);
        self.buf.push_u8(modrm_rip_relative(dst));
        // Placeholder RIP-relative displacement; patched at link/finalize
        // time once the constant pool's final offset from this instruction
        // is known (mirrors `cranelift_codegen::binemit::relaxation`'s
        // later-offset-patch convention referenced in DESIGN.md).
        self.buf.push_i32_le(self.consts.offset_of(handle) as i32);
    }
}
