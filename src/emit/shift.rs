//! Shifts by immediate and dynamic per-lane vector shifts.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::LogicalShiftLeft8 { shift } => lsl8(ctx, inst, shift),
        Opcode::LogicalShiftLeft16 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psllw_imm(v, n), shift)
        }
        Opcode::LogicalShiftLeft32 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.pslld_imm(v, n), shift)
        }
        Opcode::LogicalShiftLeft64 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psllq_imm(v, n), shift)
        }
        Opcode::LogicalShiftRight8 { shift } => lsr8(ctx, inst, shift),
        Opcode::LogicalShiftRight16 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psrlw_imm(v, n), shift)
        }
        Opcode::LogicalShiftRight32 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psrld_imm(v, n), shift)
        }
        Opcode::LogicalShiftRight64 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psrlq_imm(v, n), shift)
        }
        Opcode::ArithmeticShiftRight8 { shift } => asr8(ctx, inst, shift),
        Opcode::ArithmeticShiftRight16 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psraw_imm(v, n), shift)
        }
        Opcode::ArithmeticShiftRight32 { shift } => {
            imm(ctx, inst, |asm, v, n| asm.psrad_imm(v, n), shift)
        }
        Opcode::ArithmeticShiftRight64 { shift } => asr64(ctx, inst, shift),
        Opcode::LogicalVShiftS8 => vshift(ctx, inst, scalar::logical_vshift_s8 as usize),
        Opcode::LogicalVShiftS16 => vshift(ctx, inst, scalar::logical_vshift_s16 as usize),
        Opcode::LogicalVShiftS32 => vshift(ctx, inst, scalar::logical_vshift_s32 as usize),
        Opcode::LogicalVShiftS64 => vshift(ctx, inst, scalar::logical_vshift_s64 as usize),
        Opcode::LogicalVShiftU8 => vshift(ctx, inst, scalar::logical_vshift_u8 as usize),
        Opcode::LogicalVShiftU16 => vshift(ctx, inst, scalar::logical_vshift_u16 as usize),
        Opcode::LogicalVShiftU32 => vshift(ctx, inst, scalar::logical_vshift_u32 as usize),
        Opcode::LogicalVShiftU64 => vshift(ctx, inst, scalar::logical_vshift_u64 as usize),
        _ => unreachable!("shift::lower called with a non-shift opcode"),
    }
}

fn imm(
    ctx: &mut EmitCtx,
    inst: &Inst,
    f: impl FnOnce(&mut crate::assembler::Assembler, Xmm, u8),
    shift: u8,
) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    f(&mut ctx.asm, v, shift);
    v
}

fn vshift(ctx: &mut EmitCtx, inst: &Inst, callback: usize) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let amounts = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg(ctx, v, amounts, callback)
}

/// `LogicalShiftLeft8`: shift 16-bit word lanes, then clear the low `n`
/// bits of every byte to remove cross-byte contamination from the
/// adjacent lane's spillover.
fn lsl8(ctx: &mut EmitCtx, inst: &Inst, n: u8) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    lsl8_reg(ctx, v, n)
}

pub(super) fn lsl8_reg(ctx: &mut EmitCtx, v: Xmm, n: u8) -> Xmm {
    ctx.asm.psllw_imm(v, n);
    let mask_byte = (0xFFu8.wrapping_shl(n as u32)) & 0xFF;
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, [mask_byte; 16]);
    ctx.asm.pand(v, mask);
    v
}

/// `LogicalShiftRight8`: mirror of `lsl8`, masking the high `n` bits of
/// every byte.
fn lsr8(ctx: &mut EmitCtx, inst: &Inst, n: u8) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    lsr8_reg(ctx, v, n)
}

pub(super) fn lsr8_reg(ctx: &mut EmitCtx, v: Xmm, n: u8) -> Xmm {
    ctx.asm.psrlw_imm(v, n);
    let mask_byte = 0xFFu8.checked_shr(n as u32).unwrap_or(0);
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, [mask_byte; 16]);
    ctx.asm.pand(v, mask);
    v
}

/// `ArithmeticShiftRight8`: sign-extend each byte into a 16-bit lane via
/// `punpckl/hbw` against a sign mask, shift by `8+n`, repack.
fn asr8(ctx: &mut EmitCtx, inst: &Inst, n: u8) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    asr8_reg(ctx, v, n)
}

pub(super) fn asr8_reg(ctx: &mut EmitCtx, v: Xmm, n: u8) -> Xmm {
    let zero = ctx.regalloc.scratch();
    ctx.asm.pxor(zero, zero);
    let signmask = ctx.regalloc.scratch();
    ctx.asm.movdqa(signmask, zero);
    ctx.asm.pcmpgtb(signmask, v);

    let lo = ctx.regalloc.scratch();
    ctx.asm.movdqa(lo, v);
    ctx.asm.punpcklbw(lo, signmask);
    let hi = ctx.regalloc.scratch();
    ctx.asm.movdqa(hi, v);
    ctx.asm.punpckhbw(hi, signmask);

    let total = 8u8.saturating_add(n).min(15);
    ctx.asm.psraw_imm(lo, total);
    ctx.asm.psraw_imm(hi, total);
    ctx.asm.packsswb(lo, hi);
    lo
}

/// `ArithmeticShiftRight64` by an immediate clamped to 63. AVX-512VL has a
/// native `vpsraq`; otherwise each 64-bit lane is round-tripped through a
/// GPR `sar`, the same per-lane-scalar idiom `Multiply64`'s SSE4.1 path
/// uses.
fn asr64(ctx: &mut EmitCtx, inst: &Inst, n: u8) -> Xmm {
    let n = n.min(63);
    let v = ctx.regalloc.use_(inst.value_arg(0));

    if ctx.features.contains(CpuFeatures::AVX512VL) {
        let dst = ctx.regalloc.scratch();
        ctx.asm.movdqa(dst, v);
        ctx.asm.vpsraq_imm(dst, dst, n);
        return dst;
    }

    let lane0_gpr = ctx.regalloc.scratch_gpr();
    ctx.asm.movq_gpr_xmm(lane0_gpr, v);
    ctx.asm.sar_gpr64_imm8(lane0_gpr, n);
    let lane0_xmm = ctx.regalloc.scratch();
    ctx.asm.movq_xmm_gpr(lane0_xmm, lane0_gpr);

    let hi_half = ctx.regalloc.scratch();
    ctx.asm.pshufd(hi_half, v, 0xEE);
    let lane1_gpr = ctx.regalloc.scratch_gpr();
    ctx.asm.movq_gpr_xmm(lane1_gpr, hi_half);
    ctx.asm.sar_gpr64_imm8(lane1_gpr, n);
    let lane1_xmm = ctx.regalloc.scratch();
    ctx.asm.movq_xmm_gpr(lane1_xmm, lane1_gpr);

    ctx.asm.punpcklqdq(lane0_xmm, lane1_xmm);
    lane0_xmm
}
