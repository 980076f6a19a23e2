//! `Paired*` horizontal operations.
//!
//! Each op treats `lhs` and `rhs` independently: adjacent lanes within
//! `lhs` combine into the low half of the result, adjacent lanes within
//! `rhs` into the high half — the same shape `phaddw`/`phaddd` give
//! natively, generalized here to widths and reductions (min/max, widen)
//! that have no native horizontal form.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::{consts, minmax};
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::PairedAdd8 => add8(ctx, inst, false),
        Opcode::PairedAddLower8 => add8(ctx, inst, true),
        Opcode::PairedAdd16 => add16(ctx, inst, false),
        Opcode::PairedAddLower16 => add16(ctx, inst, true),
        Opcode::PairedAdd32 => add32(ctx, inst, false),
        Opcode::PairedAddLower32 => add32(ctx, inst, true),
        Opcode::PairedAdd64 => add64(ctx, inst),

        Opcode::PairedAddSignedWiden8 => widen(ctx, inst, scalar::paired_add_widen_s8 as usize),
        Opcode::PairedAddSignedWiden16 => widen(ctx, inst, scalar::paired_add_widen_s16 as usize),
        Opcode::PairedAddSignedWiden32 => widen(ctx, inst, scalar::paired_add_widen_s32 as usize),
        Opcode::PairedAddUnsignedWiden8 => widen(ctx, inst, scalar::paired_add_widen_u8 as usize),
        Opcode::PairedAddUnsignedWiden16 => widen(ctx, inst, scalar::paired_add_widen_u16 as usize),
        Opcode::PairedAddUnsignedWiden32 => widen(ctx, inst, scalar::paired_add_widen_u32 as usize),

        Opcode::PairedMinS8 => widen(ctx, inst, scalar::paired_min_s8 as usize),
        Opcode::PairedMaxS8 => widen(ctx, inst, scalar::paired_max_s8 as usize),
        Opcode::PairedMinU8 => widen(ctx, inst, scalar::paired_min_u8 as usize),
        Opcode::PairedMaxU8 => widen(ctx, inst, scalar::paired_max_u8 as usize),
        Opcode::PairedMinS16 => widen(ctx, inst, scalar::paired_min_s16 as usize),
        Opcode::PairedMaxS16 => widen(ctx, inst, scalar::paired_max_s16 as usize),
        Opcode::PairedMinU16 => widen(ctx, inst, scalar::paired_min_u16 as usize),
        Opcode::PairedMaxU16 => widen(ctx, inst, scalar::paired_max_u16 as usize),

        Opcode::PairedMinS32 => minmax32(ctx, inst, true, true),
        Opcode::PairedMaxS32 => minmax32(ctx, inst, true, false),
        Opcode::PairedMinU32 => minmax32(ctx, inst, false, true),
        Opcode::PairedMaxU32 => minmax32(ctx, inst, false, false),
        _ => unreachable!("paired::lower called with a non-paired opcode"),
    }
}

/// `PairedMin/Max{S,U}8/16` always go through the scalar runtime;
/// `PairedAdd{Signed,Unsigned}Widen{8,16,32}` do too, since the 2-operand
/// "widen pairs from each operand's low 64 bits" shape has no single clean
/// native instruction at any of the three widths.
fn widen(ctx: &mut EmitCtx, inst: &Inst, callback: usize) -> Xmm {
    let lhs = ctx.regalloc.use_(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg(ctx, lhs, rhs, callback)
}

fn zero_upper(ctx: &mut EmitCtx, v: Xmm) {
    ctx.asm.movq_xmm_xmm(v, v);
}

/// `psllw`/`paddw`/`psrlw`/`packuswb` widen-add-narrow: mask each word
/// down to its low byte (the even-indexed original byte), shift the word
/// right 8 to pull the odd byte down into its own word, add, then
/// saturate-pack both operands' sums together in one `packuswb`.
fn add8(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let a = ctx.regalloc.use_scratch(inst.value_arg(0));
    let b = ctx.regalloc.use_scratch(inst.value_arg(1));
    if lower {
        zero_upper(ctx, a);
        zero_upper(ctx, b);
    }
    let sum_a = pair_sum_words(ctx, a, consts::repeated_u16(0x00FF));
    let sum_b = pair_sum_words(ctx, b, consts::repeated_u16(0x00FF));
    ctx.asm.packuswb(sum_a, sum_b);
    sum_a
}

fn pair_sum_words(ctx: &mut EmitCtx, v: Xmm, low_byte_mask: [u8; 16]) -> Xmm {
    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, low_byte_mask);
    ctx.asm.pand(lo, mask);
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, v);
    ctx.asm.psrlw_imm(hi, 8);
    ctx.asm.paddw(lo, hi);
    lo
}

/// SSSE3 `phaddw` natively; else the dword-packed word-pair-sum emulation
/// (mask/shift-by-16/add at dword granularity, then `packssdw` — the sum
/// is re-sign-extended across each dword first so the pack truncates
/// rather than saturates, the same trick `narrow_widen.rs`'s pre-SSE4.1
/// `Narrow32` uses).
fn add16(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let a = ctx.regalloc.use_scratch(inst.value_arg(0));
    let b = ctx.regalloc.use_scratch(inst.value_arg(1));
    if lower {
        zero_upper(ctx, a);
        zero_upper(ctx, b);
    }
    if ctx.features.contains(CpuFeatures::SSSE3) {
        ctx.asm.phaddw(a, b);
        return a;
    }
    let sum_a = pair_sum_dwords_truncating(ctx, a);
    let sum_b = pair_sum_dwords_truncating(ctx, b);
    ctx.asm.packssdw(sum_a, sum_b);
    sum_a
}

fn pair_sum_dwords_truncating(ctx: &mut EmitCtx, v: Xmm) -> Xmm {
    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, consts::repeated_u32(0x0000_FFFF));
    ctx.asm.pand(lo, mask);
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, v);
    ctx.asm.psrld_imm(hi, 16);
    ctx.asm.paddd(lo, hi);
    ctx.asm.pslld_imm(lo, 16);
    ctx.asm.psrad_imm(lo, 16);
    lo
}

/// SSSE3 `phaddd` natively; else the same pattern at qword granularity,
/// combined with `shufps` picking each qword's low dword (immediate
/// `0x88` = `_MM_SHUFFLE(2,0,2,0)`, selecting lane 0 and 2 from each of
/// the two sums) since the sum never needs re-signing before truncation —
/// `shufps` is a pure bit-select, not a saturating pack.
fn add32(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let a = ctx.regalloc.use_scratch(inst.value_arg(0));
    let b = ctx.regalloc.use_scratch(inst.value_arg(1));
    if lower {
        zero_upper(ctx, a);
        zero_upper(ctx, b);
    }
    if ctx.features.contains(CpuFeatures::SSSE3) {
        ctx.asm.phaddd(a, b);
        return a;
    }
    let sum_a = pair_sum_qwords(ctx, a);
    let sum_b = pair_sum_qwords(ctx, b);
    ctx.asm.shufps(sum_a, sum_b, 0x88);
    sum_a
}

fn pair_sum_qwords(ctx: &mut EmitCtx, v: Xmm) -> Xmm {
    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    let mask = ctx.regalloc.scratch();
    ctx.asm
        .movdqa_from_const(mask, consts::repeated_u64(0x0000_0000_FFFF_FFFF));
    ctx.asm.pand(lo, mask);
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, v);
    ctx.asm.psrlq_imm(hi, 32);
    ctx.asm.paddq(lo, hi);
    lo
}

/// `punpckl/hqdq` + `paddq`: `lo = [lhs.q0, rhs.q0]`, `hi = [lhs.q1,
/// rhs.q1]`, `paddq(lo, hi) = [lhs.q0+lhs.q1, rhs.q0+rhs.q1]`.
fn add64(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let lhs = ctx.regalloc.use_(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, lhs);
    ctx.asm.punpcklqdq(lo, rhs);
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, lhs);
    ctx.asm.punpckhqdq(hi, rhs);
    ctx.asm.paddq(lo, hi);
    lo
}

/// `shufps` interleave + SSE4.1 `pm{in,ax}{s,u}d`, else `minmax::greater_than`
/// + `minmax::select`: `pshufd(v, 0x88)` gives `[v0,v2,v0,v2]`, `pshufd(v,
/// 0xDD)` gives `[v1,v3,v1,v3]`; combining them with min/max yields
/// `[min(v0,v1), min(v2,v3), ..]` in the low 64 bits, one pair per lane.
/// `punpcklqdq` then concatenates `lhs`'s low 64 bits with `rhs`'s.
fn minmax32(ctx: &mut EmitCtx, inst: &Inst, signed: bool, want_min: bool) -> Xmm {
    let lhs = ctx.regalloc.use_(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    let lhs_pair = pairwise_minmax(ctx, lhs, signed, want_min);
    let rhs_pair = pairwise_minmax(ctx, rhs, signed, want_min);
    ctx.asm.punpcklqdq(lhs_pair, rhs_pair);
    lhs_pair
}

fn pairwise_minmax(ctx: &mut EmitCtx, v: Xmm, signed: bool, want_min: bool) -> Xmm {
    let a = ctx.regalloc.scratch();
    ctx.asm.pshufd(a, v, 0x88);
    let b = ctx.regalloc.scratch();
    ctx.asm.pshufd(b, v, 0xDD);
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        match (signed, want_min) {
            (true, true) => ctx.asm.pminsd(a, b),
            (true, false) => ctx.asm.pmaxsd(a, b),
            (false, true) => ctx.asm.pminud(a, b),
            (false, false) => ctx.asm.pmaxud(a, b),
        }
        return a;
    }
    let gt_a_b = minmax::greater_than(ctx, a, b, 32, signed);
    let (if_true, if_false) = if want_min { (b, a) } else { (a, b) };
    minmax::select(ctx, gt_a_b, if_true, if_false)
}
