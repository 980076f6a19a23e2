//! `Narrow{16,32,64}`, `SignExtend{8,16,32}`, `ZeroExtend{8,16,32}`, and the
//! saturating narrow family.
//!
//! The saturating narrows recompute a widened reconstruction of the packed
//! result and compare it against the original input: any difference means a
//! lane clamped, and that fact is OR-ed into `fpsr_qc` the same way the
//! `INT_MIN`-detection sequences in `emit/satflag.rs` do. Packing a 64-bit
//! lane down to 32 bits with saturation has no native instruction on any
//! SSE/AVX tier (unlike 16->8 and 32->16, which have `packsswb`/`packuswb`
//! and `packssdw`/`packusdw`), so the three 64-bit-source saturating
//! narrows always go through the scalar fallback.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::consts;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::Narrow16 => narrow16(ctx, inst),
        Opcode::Narrow32 => narrow32(ctx, inst),
        Opcode::Narrow64 => narrow64(ctx, inst),
        Opcode::SignExtend8 => sign_extend(ctx, inst, 8),
        Opcode::SignExtend16 => sign_extend(ctx, inst, 16),
        Opcode::SignExtend32 => sign_extend(ctx, inst, 32),
        Opcode::ZeroExtend8 => zero_extend(ctx, inst, 8),
        Opcode::ZeroExtend16 => zero_extend(ctx, inst, 16),
        Opcode::ZeroExtend32 => zero_extend(ctx, inst, 32),
        Opcode::SignedSaturatedNarrowToSigned16 => narrow_to_signed_16(ctx, inst),
        Opcode::SignedSaturatedNarrowToSigned32 => narrow_to_signed_32(ctx, inst),
        Opcode::SignedSaturatedNarrowToSigned64 => {
            let a = ctx.regalloc.use_(inst.value_arg(0));
            fallback::one_arg_saturating(ctx, a, scalar::narrow64_to_i32_signed_sat as usize)
        }
        Opcode::SignedSaturatedNarrowToUnsigned16 => narrow_to_unsigned_from_signed_16(ctx, inst),
        Opcode::SignedSaturatedNarrowToUnsigned32 => narrow_to_unsigned_from_signed_32(ctx, inst),
        Opcode::SignedSaturatedNarrowToUnsigned64 => {
            let a = ctx.regalloc.use_(inst.value_arg(0));
            fallback::one_arg_saturating(ctx, a, scalar::narrow64_to_u32_from_signed_sat as usize)
        }
        Opcode::UnsignedSaturatedNarrow16 => unsigned_narrow_16(ctx, inst),
        Opcode::UnsignedSaturatedNarrow32 => unsigned_narrow_32(ctx, inst),
        Opcode::UnsignedSaturatedNarrow64 => {
            let a = ctx.regalloc.use_(inst.value_arg(0));
            fallback::one_arg_saturating(ctx, a, scalar::narrow64_to_u32_unsigned_sat as usize)
        }
        _ => unreachable!("narrow_widen::lower called with an unrelated opcode"),
    }
}

fn zero(ctx: &mut EmitCtx) -> Xmm {
    let z = ctx.regalloc.scratch();
    ctx.asm.pxor(z, z);
    z
}

/// `16->8` truncate: `vpmovwb` on AVX-512VL+BW; else mask each word down to
/// its low byte and `packuswb` against zero (the mask makes every word
/// non-negative, so `packuswb`'s saturation is a no-op).
fn narrow16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    if ctx.features.contains(CpuFeatures::AVX512VL) && ctx.features.contains(CpuFeatures::AVX512BW)
    {
        let dst = ctx.regalloc.scratch();
        ctx.asm.vpmovwb(dst, a);
        return dst;
    }
    let masked = ctx.regalloc.use_scratch(inst.value_arg(0));
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, consts::repeated_u16(0x00FF));
    ctx.asm.pand(masked, mask);
    let z = zero(ctx);
    ctx.asm.packuswb(masked, z);
    masked
}

/// `32->16` truncate: clear each dword's high word (SSE4.1 `pblendw`, else
/// sign-extend the low word across the whole dword via `pslld`/`psrad`) so
/// the subsequent saturating pack is a no-op.
fn narrow32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        ctx.asm.pblendw(v, z, 0b1010_1010);
        ctx.asm.packusdw(v, z);
    } else {
        ctx.asm.pslld_imm(v, 16);
        ctx.asm.psrad_imm(v, 16);
        ctx.asm.packssdw(v, z);
    }
    v
}

/// `64->32` truncate: `shufps` picks each lane's low dword (immediate
/// `0x08` = `_MM_SHUFFLE(0,0,2,0)`, the same dword-select pattern
/// `multiply.rs`'s `multiply32` uses to recombine partial products).
fn narrow64(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    ctx.asm.shufps(v, z, 0x08);
    v
}

fn sign_extend(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        let dst = ctx.regalloc.scratch();
        match bits {
            8 => ctx.asm.pmovsxbw(dst, a),
            16 => ctx.asm.pmovsxwd(dst, a),
            32 => ctx.asm.pmovsxdq(dst, a),
            _ => unreachable!("sign_extend only defined for 8/16/32-bit source lanes"),
        }
        return dst;
    }
    let sign = ctx.regalloc.scratch();
    ctx.asm.pxor(sign, sign);
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    match bits {
        8 => {
            ctx.asm.pcmpgtb(sign, v);
            let lo = ctx.regalloc.scratch();
            ctx.asm.movdqa(lo, v);
            ctx.asm.punpcklbw(lo, sign);
            lo
        }
        16 => {
            ctx.asm.pcmpgtw(sign, v);
            let lo = ctx.regalloc.scratch();
            ctx.asm.movdqa(lo, v);
            ctx.asm.punpcklwd(lo, sign);
            lo
        }
        32 => {
            ctx.asm.pcmpgtd(sign, v);
            let lo = ctx.regalloc.scratch();
            ctx.asm.movdqa(lo, v);
            ctx.asm.punpckldq(lo, sign);
            lo
        }
        _ => unreachable!("sign_extend only defined for 8/16/32-bit source lanes"),
    }
}

fn zero_extend(ctx: &mut EmitCtx, inst: &Inst, bits: u32) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        let dst = ctx.regalloc.scratch();
        match bits {
            8 => ctx.asm.pmovzxbw(dst, a),
            16 => ctx.asm.pmovzxwd(dst, a),
            32 => ctx.asm.pmovzxdq(dst, a),
            _ => unreachable!("zero_extend only defined for 8/16/32-bit source lanes"),
        }
        return dst;
    }
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    match bits {
        8 => ctx.asm.punpcklbw(v, z),
        16 => ctx.asm.punpcklwd(v, z),
        32 => ctx.asm.punpckldq(v, z),
        _ => unreachable!("zero_extend only defined for 8/16/32-bit source lanes"),
    }
    v
}

/// `16->8` signed saturation: `packsswb` is exactly this operation natively.
fn narrow_to_signed_16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let packed = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    ctx.asm.packsswb(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| {
        if ctx.features.contains(CpuFeatures::SSE4_1) {
            ctx.asm.pmovsxbw(d, p);
        } else {
            let sign = ctx.regalloc.scratch();
            ctx.asm.pxor(sign, sign);
            ctx.asm.pcmpgtb(sign, p);
            ctx.asm.movdqa(d, p);
            ctx.asm.punpcklbw(d, sign);
        }
    });
    packed
}

/// `32->16` signed saturation: `packssdw` (always available, SSE2).
fn narrow_to_signed_32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let packed = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    ctx.asm.packssdw(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| {
        if ctx.features.contains(CpuFeatures::SSE4_1) {
            ctx.asm.pmovsxwd(d, p);
        } else {
            let sign = ctx.regalloc.scratch();
            ctx.asm.pxor(sign, sign);
            ctx.asm.pcmpgtw(sign, p);
            ctx.asm.movdqa(d, p);
            ctx.asm.punpcklwd(d, sign);
        }
    });
    packed
}

/// `16->8` unsigned-range saturation from a signed source: `packuswb` is
/// exactly this operation natively.
fn narrow_to_unsigned_from_signed_16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let packed = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    ctx.asm.packuswb(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| {
        if ctx.features.contains(CpuFeatures::SSE4_1) {
            ctx.asm.pmovzxbw(d, p);
        } else {
            let z = zero(ctx);
            ctx.asm.movdqa(d, p);
            ctx.asm.punpcklbw(d, z);
        }
    });
    packed
}

/// `32->16` unsigned-range saturation from a signed source: `packusdw`
/// (SSE4.1); pre-SSE4.1 widths without `packusdw` fall back to the scalar
/// runtime rather than hand-rolling the clamp-then-pack sequence.
fn narrow_to_unsigned_from_signed_32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if !ctx.features.contains(CpuFeatures::SSE4_1) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        return fallback::one_arg_saturating(
            ctx,
            a,
            scalar::narrow64_to_u32_from_signed_sat as usize,
        );
    }
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let packed = ctx.regalloc.use_scratch(inst.value_arg(0));
    let z = zero(ctx);
    ctx.asm.packusdw(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| ctx.asm.pmovzxwd(d, p));
    packed
}

/// `16->8` saturation from an *unsigned* source: `packuswb` alone would
/// treat values above `0x7FFF` as negative and wrongly clamp them to `0`,
/// so clamp to `0xFF` with `pminuw` (SSE4.1) first, making every surviving
/// value fit `packuswb`'s signed input range.
fn unsigned_narrow_16(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if !ctx.features.contains(CpuFeatures::SSE4_1) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        return fallback::one_arg_saturating(ctx, a, scalar::narrow64_to_u32_unsigned_sat as usize);
    }
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let clamped = ctx.regalloc.use_scratch(inst.value_arg(0));
    let max = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(max, consts::repeated_u16(0x00FF));
    ctx.asm.pminuw(clamped, max);
    let packed = ctx.regalloc.scratch();
    ctx.asm.movdqa(packed, clamped);
    let z = zero(ctx);
    ctx.asm.packuswb(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| ctx.asm.pmovzxbw(d, p));
    packed
}

/// `32->16` saturation from an unsigned source: clamp to `0xFFFF` with
/// `pminud` (SSE4.1), then `packusdw`.
fn unsigned_narrow_32(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    if !ctx.features.contains(CpuFeatures::SSE4_1) {
        let a = ctx.regalloc.use_(inst.value_arg(0));
        return fallback::one_arg_saturating(ctx, a, scalar::narrow64_to_u32_unsigned_sat as usize);
    }
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let clamped = ctx.regalloc.use_scratch(inst.value_arg(0));
    let max = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(max, consts::repeated_u32(0x0000_FFFF));
    ctx.asm.pminud(clamped, max);
    let packed = ctx.regalloc.scratch();
    ctx.asm.movdqa(packed, clamped);
    let z = zero(ctx);
    ctx.asm.packusdw(packed, z);
    flag_if_narrow_changed_value(ctx, v, packed, |ctx, p, d| ctx.asm.pmovzxwd(d, p));
    packed
}

/// Widens `packed` back out with `widen` and compares it against the
/// original input `original`; OR's `fpsr_qc` iff they differ anywhere.
fn flag_if_narrow_changed_value(
    ctx: &mut EmitCtx,
    original: Xmm,
    packed: Xmm,
    widen: impl FnOnce(&mut EmitCtx, Xmm, Xmm),
) {
    let reconstructed = ctx.regalloc.scratch();
    widen(ctx, packed, reconstructed);
    let diff = ctx.regalloc.scratch();
    ctx.asm.movdqa(diff, original);
    ctx.asm.pxor(diff, reconstructed);
    or_fpsr_if_diff_nonzero(ctx, diff);
}

/// `ptest(diff, diff)` sets `ZF` iff `diff` is all-zero (SSE4.1); else
/// `pcmpeqd` each dword against zero and check `movmskps` came back `0xF`
/// (all four dwords equal zero).
fn or_fpsr_if_diff_nonzero(ctx: &mut EmitCtx, diff: Xmm) {
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        ctx.asm.ptest(diff, diff);
        ctx.asm.setne_al();
        ctx.asm.or_byte_mem_r15(ctx.state.fpsr_qc_offset);
        return;
    }
    let z = zero(ctx);
    let eq = ctx.regalloc.scratch();
    ctx.asm.movdqa(eq, diff);
    ctx.asm.pcmpeqd(eq, z);
    let mask = ctx.regalloc.scratch_gpr();
    ctx.asm.movmskps(mask, eq);
    ctx.asm.xor_gpr_imm32(mask, 0xF);
    fallback::or_fpsr_if_nonzero(ctx, mask);
}
