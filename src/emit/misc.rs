//! `ZeroVector`, `ZeroUpper`, `AbsoluteDifference{Signed,Unsigned}{8,16,32}`.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::{abs, minmax};
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::ZeroVector => {
            let dst = ctx.regalloc.scratch();
            ctx.asm.pxor(dst, dst);
            dst
        }
        Opcode::ZeroUpper => {
            let v = ctx.regalloc.use_scratch(inst.value_arg(0));
            ctx.asm.movq_xmm_xmm(v, v);
            v
        }
        Opcode::AbsoluteDifferenceSigned8 => signed_diff(ctx, inst, 8),
        Opcode::AbsoluteDifferenceSigned16 => signed_diff(ctx, inst, 16),
        Opcode::AbsoluteDifferenceSigned32 => signed_diff(ctx, inst, 32),
        Opcode::AbsoluteDifferenceUnsigned8 => unsigned_diff(ctx, inst, 8),
        Opcode::AbsoluteDifferenceUnsigned16 => unsigned_diff(ctx, inst, 16),
        Opcode::AbsoluteDifferenceUnsigned32 => unsigned_diff(ctx, inst, 32),
        _ => unreachable!("misc::lower called with an unrelated opcode"),
    }
}

/// `|a - b|` for signed lanes: subtract, then reuse `abs.rs`'s sign-mask
/// absolute value on the (possibly wrapped) difference — wrapping and then
/// taking the absolute value gives the right magnitude regardless of which
/// operand was larger.
fn signed_diff(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let a = ctx.regalloc.use_scratch(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));
    abs::sub_width(&mut ctx.asm, a, b, bits);
    abs::abs_reg(ctx, a, bits)
}

/// `|a - b|` for unsigned lanes: `max(a,b) - min(a,b)` never underflows,
/// unlike a direct subtract-then-abs on unsigned values.
fn unsigned_diff(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));
    let (hi, lo) = unsigned_minmax(ctx, a, b, bits);
    abs::sub_width(&mut ctx.asm, hi, lo, bits);
    hi
}

fn unsigned_minmax(ctx: &mut EmitCtx, a: Xmm, b: Xmm, bits: u32) -> (Xmm, Xmm) {
    if bits == 8 {
        let hi = ctx.regalloc.scratch();
        ctx.asm.movdqa(hi, a);
        ctx.asm.pmaxub(hi, b);
        let lo = ctx.regalloc.scratch();
        ctx.asm.movdqa(lo, a);
        ctx.asm.pminub(lo, b);
        return (hi, lo);
    }
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        let hi = ctx.regalloc.scratch();
        ctx.asm.movdqa(hi, a);
        let lo = ctx.regalloc.scratch();
        ctx.asm.movdqa(lo, a);
        match bits {
            16 => {
                ctx.asm.pmaxuw(hi, b);
                ctx.asm.pminuw(lo, b);
            }
            32 => {
                ctx.asm.pmaxud(hi, b);
                ctx.asm.pminud(lo, b);
            }
            _ => unreachable!("unsigned_minmax only defined for 8/16/32-bit lanes"),
        }
        return (hi, lo);
    }
    let gt_a_b = minmax::greater_than(ctx, a, b, bits, false);
    let hi = minmax::select(ctx, gt_a_b, a, b);
    let gt_a_b = minmax::greater_than(ctx, a, b, bits, false);
    let lo = minmax::select(ctx, gt_a_b, b, a);
    (hi, lo)
}
