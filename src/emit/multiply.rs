//! `Multiply{8,16,32,64}`.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::consts;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::Multiply8 => multiply8(ctx, inst),
        Opcode::Multiply16 => multiply16(ctx, inst),
        Opcode::Multiply32 => multiply32(ctx, inst),
        Opcode::Multiply64 => multiply64(ctx, inst),
        _ => unreachable!("multiply::lower called with a non-multiply opcode"),
    }
}

fn multiply16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    ctx.asm.pmullw(lhs, rhs);
    lhs
}

/// Two `pmullw`s on the even/odd byte lanes (reached by `psrlw 8`),
/// recombined with a `0x00FF`-per-word mask and a `psllw 8`.
fn multiply8(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let even = ctx.regalloc.scratch();
    ctx.asm.movdqa(even, a);
    ctx.asm.pmullw(even, b);
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, consts::repeated_u16(0x00FF));
    ctx.asm.pand(even, mask);

    let a_odd = ctx.regalloc.scratch();
    ctx.asm.movdqa(a_odd, a);
    ctx.asm.psrlw_imm(a_odd, 8);
    let b_odd = ctx.regalloc.scratch();
    ctx.asm.movdqa(b_odd, b);
    ctx.asm.psrlw_imm(b_odd, 8);
    ctx.asm.pmullw(a_odd, b_odd);
    ctx.asm.psllw_imm(a_odd, 8);

    ctx.asm.por(even, a_odd);
    even
}

/// `pmulld` on SSE4.1; else two `pmuludq`s over even/odd dword pairs,
/// recombined via `pshufd`+`punpckldq` (the standard SSE2
/// 32×32→32 multiply emulation).
fn multiply32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
        let rhs = ctx.regalloc.use_(inst.value_arg(1));
        ctx.asm.pmulld(lhs, rhs);
        return lhs;
    }
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let even = ctx.regalloc.scratch();
    ctx.asm.movdqa(even, a);
    ctx.asm.pmuludq(even, b);

    let a_odd = ctx.regalloc.scratch();
    ctx.asm.movdqa(a_odd, a);
    ctx.asm.psrldq(a_odd, 4);
    let b_odd = ctx.regalloc.scratch();
    ctx.asm.movdqa(b_odd, b);
    ctx.asm.psrldq(b_odd, 4);
    ctx.asm.pmuludq(a_odd, b_odd);

    let even_lo = ctx.regalloc.scratch();
    ctx.asm.pshufd(even_lo, even, 0x08);
    let odd_lo = ctx.regalloc.scratch();
    ctx.asm.pshufd(odd_lo, a_odd, 0x08);
    ctx.asm.punpckldq(even_lo, odd_lo);
    even_lo
}

/// `vpmullq` on AVX-512DQ+VL; a per-lane `movq`/`pextrq`/`imul` unroll on
/// SSE4.1 (the only tier with `pextrq` to pull lane 1 into a GPR); else a
/// three-`pmuludq` 64×64 schoolbook multiply.
fn multiply64(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if ctx.features.contains(CpuFeatures::AVX512DQ) && ctx.features.contains(CpuFeatures::AVX512VL)
    {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        let b = ctx.regalloc.use_(inst.value_arg(1));
        let dst = ctx.regalloc.scratch();
        ctx.asm.vpmullq(dst, a, b);
        return dst;
    }
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        return multiply64_sse41(ctx, inst);
    }
    multiply64_schoolbook(ctx, inst)
}

fn multiply64_sse41(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let a0 = ctx.regalloc.scratch_gpr();
    ctx.asm.movq_gpr_xmm(a0, a);
    let b0 = ctx.regalloc.scratch_gpr();
    ctx.asm.movq_gpr_xmm(b0, b);
    ctx.asm.imul_gpr64_gpr64(a0, b0);

    let a1 = ctx.regalloc.scratch_gpr();
    ctx.asm.pextrq(a1, a, 1);
    let b1 = ctx.regalloc.scratch_gpr();
    ctx.asm.pextrq(b1, b, 1);
    ctx.asm.imul_gpr64_gpr64(a1, b1);

    let lane0 = ctx.regalloc.scratch();
    ctx.asm.movq_xmm_gpr(lane0, a0);
    let lane1 = ctx.regalloc.scratch();
    ctx.asm.movq_xmm_gpr(lane1, a1);
    ctx.asm.punpcklqdq(lane0, lane1);
    lane0
}

fn multiply64_schoolbook(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let lo_lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo_lo, a);
    ctx.asm.pmuludq(lo_lo, b);

    let a_hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(a_hi, a);
    ctx.asm.pshufd(a_hi, a_hi, 0xF5);
    let hi_lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi_lo, a_hi);
    ctx.asm.pmuludq(hi_lo, b);

    let b_hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(b_hi, b);
    ctx.asm.pshufd(b_hi, b_hi, 0xF5);
    let lo_hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo_hi, a);
    ctx.asm.pmuludq(lo_hi, b_hi);

    ctx.asm.paddq(hi_lo, lo_hi);
    ctx.asm.psllq_imm(hi_lo, 32);
    ctx.asm.paddq(lo_lo, hi_lo);
    lo_lo
}
