//! `GetElement{8,16,32,64}` / `SetElement{8,16,32,64}`.
//!
//! Scalar lanes extracted by `GetElement` are represented the same way
//! every other IR value is: as an XMM with the lane's bits in the low
//! N bits. `SetElement`'s `scalar` operand arrives in the same shape, so
//! the 64-bit path can splice XMMs directly (`movsd`/`punpcklqdq`) without
//! ever visiting a GPR.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::ir::Inst;
use crate::reg::{Gpr, Xmm};

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    use crate::ir::Opcode::*;
    match inst.op() {
        GetElement8 { index } => get_element(ctx, inst, index, 8),
        GetElement16 { index } => get_element(ctx, inst, index, 16),
        GetElement32 { index } => get_element(ctx, inst, index, 32),
        GetElement64 { index } => get_element(ctx, inst, index, 64),
        SetElement8 { index } => set_element(ctx, inst, index, 8),
        SetElement16 { index } => set_element(ctx, inst, index, 16),
        SetElement32 { index } => set_element(ctx, inst, index, 32),
        SetElement64 { index } => set_element(ctx, inst, index, 64),
        _ => unreachable!("element::lower called with a non-element opcode"),
    }
}

fn get_element(ctx: &mut EmitCtx, inst: &Inst, index: u8, bits: u32) -> Xmm {
    let v = inst.value_arg(0);
    if index == 0 {
        // Lane 0 already occupies the value's low N bits; no code needed.
        return ctx.regalloc.use_(v);
    }
    let src = ctx.regalloc.use_(v);
    let gpr = extract_lane_to_gpr(ctx, src, index, bits);
    let dst = ctx.regalloc.scratch();
    if bits == 64 {
        ctx.asm.movq_xmm_gpr(dst, gpr);
    } else {
        ctx.asm.movd_xmm_gpr(dst, gpr);
    }
    dst
}

fn extract_lane_to_gpr(ctx: &mut EmitCtx, src: Xmm, index: u8, bits: u32) -> Gpr {
    let gpr = ctx.regalloc.scratch_gpr();
    match bits {
        8 if ctx.features.contains(CpuFeatures::SSE4_1) => ctx.asm.pextrb(gpr, src, index),
        8 => {
            ctx.asm.pextrw(gpr, src, index / 2);
            if index % 2 == 1 {
                ctx.asm.shr_gpr_imm8(gpr, 8);
            }
        }
        16 => ctx.asm.pextrw(gpr, src, index),
        32 if ctx.features.contains(CpuFeatures::SSE4_1) => ctx.asm.pextrd(gpr, src, index),
        32 => {
            let tmp = ctx.regalloc.scratch();
            ctx.asm.pshufd(tmp, src, index.wrapping_mul(0x55));
            ctx.asm.movd_gpr_xmm(gpr, tmp);
        }
        64 if ctx.features.contains(CpuFeatures::SSE4_1) => ctx.asm.pextrq(gpr, src, index),
        64 => {
            if index == 1 {
                let tmp = ctx.regalloc.scratch();
                ctx.asm.pshufd(tmp, src, 0xEE);
                ctx.asm.movq_gpr_xmm(gpr, tmp);
            } else {
                ctx.asm.movq_gpr_xmm(gpr, src);
            }
        }
        _ => unreachable!("extract_lane_to_gpr: unsupported lane width {bits}"),
    }
    gpr
}

fn set_element(ctx: &mut EmitCtx, inst: &Inst, index: u8, bits: u32) -> Xmm {
    let v = inst.value_arg(0);
    let scalar = inst.value_arg(1);
    let dst = ctx.regalloc.use_scratch(v);
    let scalar_xmm = ctx.regalloc.use_(scalar);

    if bits == 64 {
        if index == 0 {
            ctx.asm.movsd_xmm_xmm(dst, scalar_xmm);
        } else {
            ctx.asm.punpcklqdq(dst, scalar_xmm);
        }
        return dst;
    }

    let gpr = ctx.regalloc.scratch_gpr();
    ctx.asm.movd_gpr_xmm(gpr, scalar_xmm);

    match bits {
        8 if ctx.features.contains(CpuFeatures::SSE4_1) => ctx.asm.pinsrb(dst, gpr, index),
        8 => {
            let word_idx = index / 2;
            let word_gpr = ctx.regalloc.scratch_gpr();
            ctx.asm.pextrw(word_gpr, dst, word_idx);
            if index % 2 == 0 {
                ctx.asm.and_gpr_imm32(word_gpr, 0xFF00);
            } else {
                ctx.asm.and_gpr_imm32(word_gpr, 0x00FF);
                ctx.asm.shl_gpr_imm8(gpr, 8);
            }
            ctx.asm.or_gpr_gpr(word_gpr, gpr);
            ctx.asm.pinsrw(dst, word_gpr, word_idx);
        }
        16 => ctx.asm.pinsrw(dst, gpr, index),
        32 if ctx.features.contains(CpuFeatures::SSE4_1) => ctx.asm.pinsrd(dst, gpr, index),
        32 => {
            ctx.asm.pinsrw(dst, gpr, index * 2);
            let hi_gpr = ctx.regalloc.scratch_gpr();
            ctx.asm.mov_gpr_gpr(hi_gpr, gpr);
            ctx.asm.shr_gpr_imm8(hi_gpr, 16);
            ctx.asm.pinsrw(dst, hi_gpr, index * 2 + 1);
        }
        _ => unreachable!("set_element: unsupported lane width {bits}"),
    }
    dst
}
