//! `Min{S,U}{8,16,32,64}`, `Max{S,U}{8,16,32,64}`.
//!
//! `pminub`/`pmaxub` (8u) and `pminsw`/`pmaxsw` (16s) are SSE2 baseline;
//! everything else either has an SSE4.1/AVX-512VL native form or falls
//! back to a compare-and-select built from `pcmpgt*` plus a bitwise
//! blend (`pand`/`pandn`/`por` — the same select idiom `emit/abs.rs`
//! uses to clamp `INT_MIN` to `INT_MAX`), since this crate's register
//! allocator has no mechanism to pin a value into the fixed `xmm0`
//! `pblendvb` expects.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::consts;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::MinU8 => native(ctx, inst, |asm, d, s| asm.pminub(d, s)),
        Opcode::MaxU8 => native(ctx, inst, |asm, d, s| asm.pmaxub(d, s)),
        Opcode::MinS16 => native(ctx, inst, |asm, d, s| asm.pminsw(d, s)),
        Opcode::MaxS16 => native(ctx, inst, |asm, d, s| asm.pmaxsw(d, s)),

        Opcode::MinS8 => sse41_or_blend(ctx, inst, 8, true, true, |asm, d, s| asm.pminsb(d, s)),
        Opcode::MaxS8 => sse41_or_blend(ctx, inst, 8, true, false, |asm, d, s| asm.pmaxsb(d, s)),
        Opcode::MinU16 => sse41_or_blend(ctx, inst, 16, false, true, |asm, d, s| asm.pminuw(d, s)),
        Opcode::MaxU16 => sse41_or_blend(ctx, inst, 16, false, false, |asm, d, s| asm.pmaxuw(d, s)),
        Opcode::MinS32 => sse41_or_blend(ctx, inst, 32, true, true, |asm, d, s| asm.pminsd(d, s)),
        Opcode::MaxS32 => sse41_or_blend(ctx, inst, 32, true, false, |asm, d, s| asm.pmaxsd(d, s)),
        Opcode::MinU32 => sse41_or_blend(ctx, inst, 32, false, true, |asm, d, s| asm.pminud(d, s)),
        Opcode::MaxU32 => sse41_or_blend(ctx, inst, 32, false, false, |asm, d, s| asm.pmaxud(d, s)),

        Opcode::MinS64 => minmax64(ctx, inst, true, true),
        Opcode::MaxS64 => minmax64(ctx, inst, true, false),
        Opcode::MinU64 => minmax64(ctx, inst, false, true),
        Opcode::MaxU64 => minmax64(ctx, inst, false, false),
        _ => unreachable!("minmax::lower called with a non-minmax opcode"),
    }
}

fn native(
    ctx: &mut EmitCtx,
    inst: &Inst,
    f: impl FnOnce(&mut crate::assembler::Assembler, Xmm, Xmm),
) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    f(&mut ctx.asm, lhs, rhs);
    lhs
}

/// `want_min` picks which of `a`/`b` is selected when `a` compares
/// greater; `signed` picks the native-vs-bias-trick compare.
fn sse41_or_blend(
    ctx: &mut EmitCtx,
    inst: &Inst,
    bits: u32,
    signed: bool,
    want_min: bool,
    f: impl FnOnce(&mut crate::assembler::Assembler, Xmm, Xmm),
) -> Xmm {
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        return native(ctx, inst, f);
    }
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));
    let gt_a_b = greater_than(ctx, a, b, bits, signed);
    let (if_true, if_false) = if want_min { (b, a) } else { (a, b) };
    select(ctx, gt_a_b, if_true, if_false)
}

/// All-ones per lane where `a > b`, width `bits`; `signed` chooses a
/// native `pcmpgt*` or the XOR-sign-bit bias trick for an unsigned
/// compare.
pub(super) fn greater_than(ctx: &mut EmitCtx, a: Xmm, b: Xmm, bits: u32, signed: bool) -> Xmm {
    let lhs = ctx.regalloc.scratch();
    ctx.asm.movdqa(lhs, a);
    let rhs = ctx.regalloc.scratch();
    ctx.asm.movdqa(rhs, b);
    if !signed {
        let bias = ctx.regalloc.scratch();
        let pattern = match bits {
            8 => consts::SIGN_BIT_8,
            16 => consts::repeated_u16(0x8000),
            32 => consts::repeated_u32(0x8000_0000),
            _ => unreachable!("greater_than bias only defined for 8/16/32-bit lanes"),
        };
        ctx.asm.movdqa_from_const(bias, pattern);
        ctx.asm.pxor(lhs, bias);
        ctx.asm.pxor(rhs, bias);
    }
    match bits {
        8 => ctx.asm.pcmpgtb(lhs, rhs),
        16 => ctx.asm.pcmpgtw(lhs, rhs),
        32 => ctx.asm.pcmpgtd(lhs, rhs),
        _ => unreachable!("greater_than only defined for 8/16/32-bit lanes"),
    }
    lhs
}

/// `mask ? if_true : if_false`, per lane. `mask` and `if_true` are
/// clobbered; the result is returned in `mask`.
pub(super) fn select(ctx: &mut EmitCtx, mask: Xmm, if_true: Xmm, if_false: Xmm) -> Xmm {
    ctx.asm.pand(if_true, mask);
    ctx.asm.pandn(mask, if_false);
    ctx.asm.por(mask, if_true);
    mask
}

fn minmax64(ctx: &mut EmitCtx, inst: &Inst, signed: bool, want_min: bool) -> Xmm {
    if ctx.features.contains(CpuFeatures::AVX512VL) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        let b = ctx.regalloc.use_(inst.value_arg(1));
        let dst = ctx.regalloc.scratch();
        match (signed, want_min) {
            (true, true) => ctx.asm.vpminsq(dst, a, b),
            (true, false) => ctx.asm.vpmaxsq(dst, a, b),
            (false, true) => ctx.asm.vpminuq(dst, a, b),
            (false, false) => ctx.asm.vpmaxuq(dst, a, b),
        }
        return dst;
    }
    if ctx.features.contains(CpuFeatures::AVX) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        let b = ctx.regalloc.use_(inst.value_arg(1));
        let gt = greater_than64(ctx, a, b, signed);
        let (if_true, if_false) = if want_min { (b, a) } else { (a, b) };
        return select(ctx, gt, if_true, if_false);
    }
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));
    let callback = match (signed, want_min) {
        (true, true) => scalar::min_s64 as usize,
        (true, false) => scalar::max_s64 as usize,
        (false, true) => scalar::min_u64 as usize,
        (false, false) => scalar::max_u64 as usize,
    };
    fallback::two_arg(ctx, a, b, callback)
}

fn greater_than64(ctx: &mut EmitCtx, a: Xmm, b: Xmm, signed: bool) -> Xmm {
    let lhs = ctx.regalloc.scratch();
    ctx.asm.movdqa(lhs, a);
    let rhs = ctx.regalloc.scratch();
    ctx.asm.movdqa(rhs, b);
    if !signed {
        let bias = ctx.regalloc.scratch();
        ctx.asm
            .movdqa_from_const(bias, consts::repeated_u64(0x8000_0000_0000_0000));
        ctx.asm.pxor(lhs, bias);
        ctx.asm.pxor(rhs, bias);
    }
    ctx.asm.vpcmpgtq(lhs, lhs, rhs);
    lhs
}
