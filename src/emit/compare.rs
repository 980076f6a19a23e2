//! `Equal{8,16,32,64,128}`, `GreaterS{8,16,32,64}`.
//!
//! Every compare here returns an all-ones mask per lane on true, all-zero
//! on false, straight out of the native `pcmpeq`/`pcmpgt` encodings.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::Equal8 => simple(ctx, inst, |asm, d, s| asm.pcmpeqb(d, s)),
        Opcode::Equal16 => simple(ctx, inst, |asm, d, s| asm.pcmpeqw(d, s)),
        Opcode::Equal32 => simple(ctx, inst, |asm, d, s| asm.pcmpeqd(d, s)),
        Opcode::Equal64 => equal64(ctx, inst),
        Opcode::Equal128 => equal128(ctx, inst),
        Opcode::GreaterS8 => simple(ctx, inst, |asm, d, s| asm.pcmpgtb(d, s)),
        Opcode::GreaterS16 => simple(ctx, inst, |asm, d, s| asm.pcmpgtw(d, s)),
        Opcode::GreaterS32 => simple(ctx, inst, |asm, d, s| asm.pcmpgtd(d, s)),
        Opcode::GreaterS64 => greater_s64(ctx, inst),
        _ => unreachable!("compare::lower called with a non-compare opcode"),
    }
}

fn simple(
    ctx: &mut EmitCtx,
    inst: &Inst,
    f: impl FnOnce(&mut crate::assembler::Assembler, Xmm, Xmm),
) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    f(&mut ctx.asm, lhs, rhs);
    lhs
}

fn equal64(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    equal64_reg(ctx, lhs, rhs)
}

/// `Equal64` on two already-bound registers: native `pcmpeqq` on SSE4.1,
/// else `pcmpeqd` + a cross-half `pshufd`/`pand` to fold each 64-bit
/// lane's two dword compares into one. Shared with the `INT_MIN`
/// detection sequences in `emit/abs.rs` and `emit/sat_multiply.rs`, which
/// need the same 64-bit equality test against a constant.
pub(super) fn equal64_reg(ctx: &mut EmitCtx, lhs: Xmm, rhs: Xmm) -> Xmm {
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        ctx.asm.pcmpeqq(lhs, rhs);
        return lhs;
    }
    ctx.asm.pcmpeqd(lhs, rhs);
    let shuf = ctx.regalloc.scratch();
    ctx.asm.pshufd(shuf, lhs, 0xB1);
    ctx.asm.pand(lhs, shuf);
    lhs
}

fn equal128(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let eq64 = equal64(ctx, inst);
    let shuf = ctx.regalloc.scratch();
    ctx.asm.pshufd(shuf, eq64, 0x4E);
    ctx.asm.pand(eq64, shuf);
    eq64
}

fn greater_s64(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if ctx.features.contains(CpuFeatures::SSE4_2) {
        return simple(ctx, inst, |asm, d, s| asm.pcmpgtq(d, s));
    }
    let lhs = ctx.regalloc.use_(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg(ctx, lhs, rhs, scalar::greater_s64 as usize)
}
