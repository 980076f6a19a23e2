//! `PopulationCount`, `ReverseBits`, both per-byte-lane.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::consts;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::PopulationCount => population_count(ctx, inst),
        Opcode::ReverseBits => reverse_bits(ctx, inst),
        _ => unreachable!("popcount_reverse::lower called with an unrelated opcode"),
    }
}

/// `vpopcntb` natively; else the standard nibble-LUT `pshufb` trick (split
/// each byte into its two nibbles, look each up in a 0-15 popcount table,
/// add the halves); else the scalar runtime.
fn population_count(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if ctx.features.contains(CpuFeatures::AVX512_BITALG) {
        let v = ctx.regalloc.use_(inst.value_arg(0));
        let dst = ctx.regalloc.scratch();
        ctx.asm.vpopcntb(dst, v);
        return dst;
    }
    if !ctx.features.contains(CpuFeatures::SSSE3) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        return fallback::one_arg(ctx, a, scalar::population_count as usize);
    }
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let (lo_nibbles, hi_nibbles) = split_nibbles(ctx, v);
    let lo_counts = ctx.regalloc.scratch();
    ctx.asm
        .movdqa_from_const(lo_counts, consts::POPCNT_NIBBLE_LUT);
    ctx.asm.pshufb(lo_counts, lo_nibbles);
    let hi_counts = ctx.regalloc.scratch();
    ctx.asm
        .movdqa_from_const(hi_counts, consts::POPCNT_NIBBLE_LUT);
    ctx.asm.pshufb(hi_counts, hi_nibbles);
    ctx.asm.paddb(lo_counts, hi_counts);
    lo_counts
}

/// `v & 0x0F` per byte (low nibble as an index), `(v >> 4) & 0x0F` per byte
/// (high nibble as an index). The mask comes before the shift so the
/// complementary nibble is already zero and the word-granularity
/// `psrlw_imm` can't leak bits across a byte boundary.
fn split_nibbles(ctx: &mut EmitCtx, v: Xmm) -> (Xmm, Xmm) {
    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    let lo_mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(lo_mask, [0x0F; 16]);
    ctx.asm.pand(lo, lo_mask);

    let hi_shifted = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi_shifted, v);
    let hi_nibble_mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(hi_nibble_mask, [0xF0; 16]);
    ctx.asm.pand(hi_shifted, hi_nibble_mask);
    ctx.asm.psrlw_imm(hi_shifted, 4);
    ctx.asm.pand(hi_shifted, lo_mask);
    (lo, hi_shifted)
}

/// SSSE3: two nibble-LUT lookups (one pre-shifted into the top nibble) and
/// an `por`, avoiding any shift of a non-nibble-bounded value across a byte
/// boundary. Otherwise the classic 3-stage SWAR bit-swap (nibbles, then
/// bit-pairs, then single bits), each stage masking before shifting for the
/// same cross-byte-leak reason.
fn reverse_bits(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    if ctx.features.contains(CpuFeatures::SSSE3) {
        let lo_mask = ctx.regalloc.scratch();
        ctx.asm.movdqa_from_const(lo_mask, [0x0F; 16]);
        let lo_nibbles = ctx.regalloc.scratch();
        ctx.asm.movdqa(lo_nibbles, v);
        ctx.asm.pand(lo_nibbles, lo_mask);

        let hi_mask = ctx.regalloc.scratch();
        ctx.asm.movdqa_from_const(hi_mask, [0xF0; 16]);
        let hi_nibbles = ctx.regalloc.scratch();
        ctx.asm.movdqa(hi_nibbles, v);
        ctx.asm.pand(hi_nibbles, hi_mask);
        ctx.asm.psrlw_imm(hi_nibbles, 4);
        ctx.asm.pand(hi_nibbles, lo_mask);

        let rev_lo_hi = ctx.regalloc.scratch();
        ctx.asm
            .movdqa_from_const(rev_lo_hi, consts::REVERSE_NIBBLE_LUT_HI);
        ctx.asm.pshufb(rev_lo_hi, lo_nibbles);

        let rev_hi_lo = ctx.regalloc.scratch();
        ctx.asm
            .movdqa_from_const(rev_hi_lo, consts::REVERSE_NIBBLE_LUT);
        ctx.asm.pshufb(rev_hi_lo, hi_nibbles);

        ctx.asm.por(rev_lo_hi, rev_hi_lo);
        return rev_lo_hi;
    }
    let stage1 = swap_bits(ctx, v, 4, 0xF0, 0x0F);
    let stage2 = swap_bits(ctx, stage1, 2, 0xCC, 0x33);
    swap_bits(ctx, stage2, 1, 0xAA, 0x55)
}

fn swap_bits(ctx: &mut EmitCtx, v: Xmm, shift: u8, hi_mask_byte: u8, lo_mask_byte: u8) -> Xmm {
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, v);
    let hi_mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(hi_mask, [hi_mask_byte; 16]);
    ctx.asm.pand(hi, hi_mask);
    ctx.asm.psrlw_imm(hi, shift);

    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    let lo_mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(lo_mask, [lo_mask_byte; 16]);
    ctx.asm.pand(lo, lo_mask);
    ctx.asm.psllw_imm(lo, shift);

    ctx.asm.por(hi, lo);
    hi
}
