//! `SignedSaturatedDoublingMultiplyReturnHigh{16,32}`.

use crate::context::EmitCtx;
use crate::emit::{consts, satflag};
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::SignedSaturatedDoublingMultiplyReturnHigh16 => doubling_mulhi16(ctx, inst),
        Opcode::SignedSaturatedDoublingMultiplyReturnHigh32 => doubling_mulhi32(ctx, inst),
        _ => unreachable!("sat_multiply::lower called with a non-sat-multiply opcode"),
    }
}

/// `high16(2ab) = (pmulhw(a,b) << 1) | (pmullw(a,b) >>> 15)`: the low
/// product's top bit is the carry the doubling shift pulls in from
/// below. Then clamp the one input combination (`a=b=INT16_MIN`) whose
/// doubled product overflows back to `INT16_MIN`.
fn doubling_mulhi16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, a);
    ctx.asm.pmulhw(hi, b);
    ctx.asm.psllw_imm(hi, 1);

    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, a);
    ctx.asm.pmullw(lo, b);
    ctx.asm.psrlw_imm(lo, 15);

    ctx.asm.por(hi, lo);

    let mask = satflag::int_min_mask(ctx, hi, 16);
    satflag::or_mask_if_nonzero(ctx, mask, 16);
    let int_max = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(int_max, consts::int_max(16));
    ctx.asm.pand(int_max, mask);
    ctx.asm.pandn(mask, hi);
    ctx.asm.por(mask, int_max);
    mask
}

/// No native 32×32 signed high-multiply pair exists on any SSE/AVX tier
/// (unlike 16-bit's `pmulhw`/`pmullw`), so this always goes through the
/// scalar fallback.
fn doubling_mulhi32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg_saturating(ctx, a, b, scalar::sat_doubling_mulhi32 as usize)
}
