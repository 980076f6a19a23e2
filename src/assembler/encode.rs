//! Bit-exact x86-64 prefix/ModRM/VEX/EVEX encoding helpers, matching the
//! Intel SDM's encodings exactly.
//!
//! These are private to the assembler module; `mnemonics.rs` is the public
//! surface and calls through these helpers once per instruction shape
//! (reg-reg, reg-imm, reg-mem) rather than duplicating encoding logic per
//! mnemonic.

use crate::reg::{Gpr, Xmm};

/// Anything that can appear in a ModRM reg/rm field: a 3-bit low code plus
/// whether bit 4 (REX.R/X/B) must be set.
pub trait RegCode: Copy {
    fn low3(self) -> u8;
    fn needs_ext(self) -> bool;
}

impl RegCode for Xmm {
    fn low3(self) -> u8 {
        Xmm::low3(self)
    }
    fn needs_ext(self) -> bool {
        Xmm::needs_rex_ext(self)
    }
}

impl RegCode for Gpr {
    fn low3(self) -> u8 {
        Gpr::low3(self)
    }
    fn needs_ext(self) -> bool {
        Gpr::needs_rex_ext(self)
    }
}

/// mod=11 ModRM byte for a register-register operand pair.
pub fn modrm_reg(reg: impl RegCode, rm: impl RegCode) -> u8 {
    0b1100_0000 | (reg.low3() << 3) | rm.low3()
}

/// mod=00, rm=101 ModRM byte for a RIP-relative memory operand (the only
/// memory operand shape this crate emits: constant-pool loads).
pub fn modrm_rip_relative(reg: impl RegCode) -> u8 {
    0b0000_0101 | (reg.low3() << 3)
}

/// REX prefix, if this instruction needs one (W bit, or any operand uses
/// registers 8-15). `None` means the legacy encoding needs no REX byte.
pub fn rex(w: bool, reg: impl RegCode, rm: impl RegCode) -> Option<u8> {
    let r = reg.needs_ext();
    let b = rm.needs_ext();
    if !w && !r && !b {
        return None;
    }
    Some(0b0100_0000 | ((w as u8) << 3) | ((r as u8) << 2) | ((b as u8) << 0))
}

/// Emit `66 [REX] 0F op /r` or `66 [REX] 0F38 op /r` / `66 [REX] 0F3A op /r`
/// style legacy SSE encodings for a reg-reg operand pair, with an optional
/// mandatory prefix byte (0x66 for most SSE2+ integer ops, none for a few).
pub struct LegacyOp {
    pub mandatory_prefix: Option<u8>,
    /// Opcode escape bytes after the prefix: `&[0x0F]`, `&[0x0F, 0x38]`, or
    /// `&[0x0F, 0x3A]`.
    pub escape: &'static [u8],
    pub opcode: u8,
    pub rex_w: bool,
}

impl LegacyOp {
    pub const fn sse2(opcode: u8) -> Self {
        LegacyOp {
            mandatory_prefix: Some(0x66),
            escape: &[0x0F],
            opcode,
            rex_w: false,
        }
    }

    pub const fn ssse3(opcode: u8) -> Self {
        LegacyOp {
            mandatory_prefix: Some(0x66),
            escape: &[0x0F, 0x38],
            opcode,
            rex_w: false,
        }
    }

    pub const fn sse41(opcode: u8) -> Self {
        LegacyOp {
            mandatory_prefix: Some(0x66),
            escape: &[0x0F, 0x38],
            opcode,
            rex_w: false,
        }
    }

    /// SSE4.1 instructions encoded under the `0F 3A` three-byte opcode map
    /// (the immediate-taking ones: `pblendw`, `pextrb/d/q`, `pinsrb/d/q`, …).
    pub const fn sse41_3a(opcode: u8) -> Self {
        LegacyOp {
            mandatory_prefix: Some(0x66),
            escape: &[0x0F, 0x3A],
            opcode,
            rex_w: false,
        }
    }

    /// A handful of legacy ops (`pshufw`-family, some MMX-derived ones)
    /// carry no mandatory prefix.
    pub const fn no_prefix(opcode: u8) -> Self {
        LegacyOp {
            mandatory_prefix: None,
            escape: &[0x0F],
            opcode,
            rex_w: false,
        }
    }

    pub const fn with_rex_w(mut self) -> Self {
        self.rex_w = true;
        self
    }
}

/// VEX "pp" mandatory-prefix encoding.
#[derive(Clone, Copy)]
pub enum VexPrefix {
    None,
    P66,
    PF3,
    PF2,
}

impl VexPrefix {
    fn bits(self) -> u8 {
        match self {
            VexPrefix::None => 0b00,
            VexPrefix::P66 => 0b01,
            VexPrefix::PF3 => 0b10,
            VexPrefix::PF2 => 0b11,
        }
    }
}

/// VEX "mmmmm" opcode-map encoding.
#[derive(Clone, Copy)]
pub enum VexMap {
    Map0F,
    Map0F38,
    Map0F3A,
}

impl VexMap {
    fn bits(self) -> u8 {
        match self {
            VexMap::Map0F => 0b00001,
            VexMap::Map0F38 => 0b00010,
            VexMap::Map0F3A => 0b00011,
        }
    }
}

/// A VEX-encoded (AVX/AVX2) instruction shape: `VEX.128.pp.mmmmm.W opcode /r`.
pub struct VexOp {
    pub prefix: VexPrefix,
    pub map: VexMap,
    pub opcode: u8,
    pub w: bool,
    /// VEX.vvvv: the second source register, inverted into the prefix
    /// instead of the ModRM byte. `None` for instructions with no second
    /// source operand (unary ops encoded in VEX form).
    pub vvvv: Option<Xmm>,
}

/// Append a 2- or 3-byte VEX prefix (whichever is shorter while staying
/// correct) for a register-register `VexOp`, followed by the opcode byte.
/// Caller still appends the ModRM byte via [`modrm_reg`].
pub fn emit_vex_prefix(
    out: &mut Vec<u8>,
    op: &VexOp,
    reg: impl RegCode,
    rm: impl RegCode,
) {
    let r_bit = !reg.needs_ext() as u8; // VEX carries ~R
    let x_bit = 1u8; // no SIB index register ever used here
    let b_bit = !rm.needs_ext() as u8; // VEX carries ~B
    let vvvv = op.vvvv.map(|v| v.index()).unwrap_or(0b1111);
    let inverted_vvvv = (!vvvv) & 0b1111;

    let needs_3byte = op.w || rm.needs_ext() || !matches!(op.map, VexMap::Map0F);
    if !needs_3byte {
        // 2-byte VEX: C5 [R vvvv L pp]
        let byte1 = (r_bit << 7) | (inverted_vvvv << 3) | (0 << 2) | op.prefix.bits();
        out.push(0xC5);
        out.push(byte1);
    } else {
        // 3-byte VEX: C4 [R X B mmmmm] [W vvvv L pp]
        let byte1 = (r_bit << 7) | (x_bit << 6) | (b_bit << 5) | op.map.bits();
        let byte2 = ((op.w as u8) << 7) | (inverted_vvvv << 3) | (0 << 2) | op.prefix.bits();
        out.push(0xC4);
        out.push(byte1);
        out.push(byte2);
    }
    out.push(op.opcode);
}

/// An EVEX-encoded (AVX-512) instruction shape:
/// `EVEX.128.pp.mmmmm.W opcode /r` with no opmask / broadcast (this crate
/// never needs either - every AVX-512 path here is a drop-in replacement
/// for an SSE/AVX sequence operating on a full 128-bit register).
pub struct EvexOp {
    pub prefix: VexPrefix,
    pub map: VexMap,
    pub opcode: u8,
    pub w: bool,
    pub vvvv: Option<Xmm>,
}

pub fn emit_evex_prefix(out: &mut Vec<u8>, op: &EvexOp, reg: impl RegCode, rm: impl RegCode) {
    let r_bit = !reg.needs_ext() as u8;
    let x_bit = 1u8;
    let b_bit = !rm.needs_ext() as u8;
    let r_prime = 1u8; // no XMM16-31 use, so R' is always 1 (inverted 0)
    let vvvv = op.vvvv.map(|v| v.index()).unwrap_or(0b1111) & 0b1111;
    let inverted_vvvv = (!vvvv) & 0b1111;
    let v_prime = 1u8; // high bit of vvvv extension, unused (no XMM16-31)

    out.push(0x62);
    // byte1: R X B R' 0 0 mm
    out.push((r_bit << 7) | (x_bit << 6) | (b_bit << 5) | (r_prime << 4) | op.map.bits());
    // byte2: W vvvv 1 pp
    out.push(((op.w as u8) << 7) | (inverted_vvvv << 3) | (1 << 2) | op.prefix.bits());
    // byte3: z L'L b V' aaa - L'L=00 (128-bit), z=0 (merging), b=0 (no broadcast), aaa=0 (no mask)
    out.push((v_prime << 3) | 0b000);
    out.push(op.opcode);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modrm_reg_packs_fields() {
        let byte = modrm_reg(Xmm::new(1), Xmm::new(2));
        assert_eq!(byte, 0b1100_1010);
    }

    #[test]
    fn rex_is_none_for_low_regs_no_w() {
        assert!(rex(false, Xmm::new(0), Xmm::new(1)).is_none());
    }

    #[test]
    fn rex_set_for_extended_reg() {
        let r = rex(false, Xmm::new(9), Xmm::new(0)).unwrap();
        assert_eq!(r & 0b0100_0100, 0b0100_0100);
    }
}
