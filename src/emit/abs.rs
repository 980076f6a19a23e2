//! `AbsN`, `SignedSaturatedAbs{8,16,32,64}`, `SignedSaturatedNeg{8,16,32,64}`.

use crate::assembler::Assembler;
use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::shift::asr8_reg;
use crate::emit::{consts, satflag};
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::Abs8 => abs(ctx, inst, 8),
        Opcode::Abs16 => abs(ctx, inst, 16),
        Opcode::Abs32 => abs(ctx, inst, 32),
        Opcode::Abs64 => abs(ctx, inst, 64),
        Opcode::SignedSaturatedAbs8 => saturated_abs(ctx, inst, 8),
        Opcode::SignedSaturatedAbs16 => saturated_abs(ctx, inst, 16),
        Opcode::SignedSaturatedAbs32 => saturated_abs(ctx, inst, 32),
        Opcode::SignedSaturatedAbs64 => saturated_abs(ctx, inst, 64),
        Opcode::SignedSaturatedNeg8 => saturated_neg(ctx, inst, 8),
        Opcode::SignedSaturatedNeg16 => saturated_neg(ctx, inst, 16),
        Opcode::SignedSaturatedNeg32 => saturated_neg(ctx, inst, 32),
        Opcode::SignedSaturatedNeg64 => saturated_neg(ctx, inst, 64),
        _ => unreachable!("abs::lower called with a non-abs opcode"),
    }
}

pub(super) fn sub_width(asm: &mut Assembler, dst: Xmm, src: Xmm, bits: u32) {
    match bits {
        8 => asm.psubb(dst, src),
        16 => asm.psubw(dst, src),
        32 => asm.psubd(dst, src),
        64 => asm.psubq(dst, src),
        _ => unreachable!("sub_width only defined for 8/16/32/64-bit lanes"),
    }
}

/// Arithmetic-shift-by-`bits-1` broadcast of `v`'s sign bit across every
/// lane: all-ones where the lane is negative, all-zero otherwise.
fn sign_mask(ctx: &mut EmitCtx, v: Xmm, bits: u32) -> Xmm {
    let sign = ctx.regalloc.scratch();
    ctx.asm.movdqa(sign, v);
    match bits {
        8 => return asr8_reg(ctx, sign, 7),
        16 => ctx.asm.psraw_imm(sign, 15),
        32 => ctx.asm.psrad_imm(sign, 31),
        64 => {
            ctx.asm.pshufd(sign, sign, 0xF5);
            ctx.asm.psrad_imm(sign, 31);
        }
        _ => unreachable!("sign_mask only defined for 8/16/32/64-bit lanes"),
    }
    sign
}

fn abs(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    abs_reg(ctx, v, bits)
}

/// Native `pabsb/w/d` on SSSE3, `vpabsq` on AVX-512VL for the 64-bit
/// case, else the sign-mask identity `abs(v) = (v ^ sign) - sign`
/// (SSE2-only, and width-uniform since `sign_mask` already handles
/// every width including the 64-bit `pshufd`-duplicated case).
pub(super) fn abs_reg(ctx: &mut EmitCtx, v: Xmm, bits: u32) -> Xmm {
    if bits != 64 && ctx.features.contains(CpuFeatures::SSSE3) {
        match bits {
            8 => ctx.asm.pabsb(v, v),
            16 => ctx.asm.pabsw(v, v),
            32 => ctx.asm.pabsd(v, v),
            _ => unreachable!(),
        }
        return v;
    }
    if bits == 64 && ctx.features.contains(CpuFeatures::AVX512VL) {
        let dst = ctx.regalloc.scratch();
        ctx.asm.movdqa(dst, v);
        ctx.asm.vpabsq(dst, dst);
        return dst;
    }

    let sign = sign_mask(ctx, v, bits);
    let out = ctx.regalloc.scratch();
    ctx.asm.movdqa(out, v);
    ctx.asm.pxor(out, sign);
    sub_width(&mut ctx.asm, out, sign, bits);
    out
}

fn saturated_abs(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    // `use_scratch`, not `use_`: `abs_reg`'s SSSE3 path mutates its operand
    // in place (`pabsb/w/d(v, v)`), and `v` must still read as the original
    // value to any other instruction in the block that also reads it.
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let mask = satflag::int_min_mask(ctx, v, bits);
    satflag::or_mask_if_nonzero(ctx, mask, bits);

    let result = abs_reg(ctx, v, bits);
    clamp_int_min_to_int_max(ctx, result, mask, bits)
}

/// `SignedSaturatedNeg`: `-INT_MIN` overflows for the same reason
/// `abs(INT_MIN)` does, so this shares the detection/clamp tail and
/// only differs in computing `0 - v` instead of `abs(v)`.
fn saturated_neg(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let mask = satflag::int_min_mask(ctx, v, bits);
    satflag::or_mask_if_nonzero(ctx, mask, bits);

    let zero = ctx.regalloc.scratch();
    ctx.asm.pxor(zero, zero);
    sub_width(&mut ctx.asm, zero, v, bits);
    clamp_int_min_to_int_max(ctx, zero, mask, bits)
}

fn clamp_int_min_to_int_max(ctx: &mut EmitCtx, result: Xmm, mask: Xmm, bits: u32) -> Xmm {
    let int_max = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(int_max, consts::int_max(bits));
    ctx.asm.pand(int_max, mask);
    ctx.asm.pandn(mask, result);
    ctx.asm.por(mask, int_max);
    mask
}
