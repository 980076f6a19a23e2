//! Halving add/sub, the SIMD averaging family. Every width and signedness
//! reduces to the same branchless average identity, so there's a single
//! generic lowering rather than one function per width:
//!
//!   floor((a + b) / 2) = (a >> 1) + (b >> 1) + (a & b & lane_lsb)
//!   round((a + b) / 2) = (a >> 1) + (b >> 1) + (a | b & lane_lsb)
//!   floor((a - b) / 2) = (a >> 1) - (b >> 1) - (!a & b & lane_lsb)
//!
//! `>>` is arithmetic for the signed opcodes, logical for the unsigned
//! ones; `lane_lsb` masks out everything but the bottom bit of each
//! lane so the carry/borrow term only ever contributes 0 or 1 per
//! lane. 8-bit shifts have no native per-byte form and go through the
//! same byte-masking emulation `shift.rs` uses for `LogicalShiftLeft8`
//! et al.

use crate::context::EmitCtx;
use crate::emit::shift;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::HalvingAddS8 => add(ctx, inst, Shr::S8, Carry::And),
        Opcode::HalvingAddS16 => add(ctx, inst, Shr::S16, Carry::And),
        Opcode::HalvingAddS32 => add(ctx, inst, Shr::S32, Carry::And),
        Opcode::HalvingAddU8 => add(ctx, inst, Shr::U8, Carry::And),
        Opcode::HalvingAddU16 => add(ctx, inst, Shr::U16, Carry::And),
        Opcode::HalvingAddU32 => add(ctx, inst, Shr::U32, Carry::And),
        Opcode::RoundingHalvingAddS8 => add(ctx, inst, Shr::S8, Carry::Or),
        Opcode::RoundingHalvingAddS16 => add(ctx, inst, Shr::S16, Carry::Or),
        Opcode::RoundingHalvingAddS32 => add(ctx, inst, Shr::S32, Carry::Or),
        Opcode::RoundingHalvingAddU8 => add(ctx, inst, Shr::U8, Carry::Or),
        Opcode::RoundingHalvingAddU16 => add(ctx, inst, Shr::U16, Carry::Or),
        Opcode::RoundingHalvingAddU32 => add(ctx, inst, Shr::U32, Carry::Or),
        Opcode::HalvingSubS8 => sub(ctx, inst, Shr::S8),
        Opcode::HalvingSubS16 => sub(ctx, inst, Shr::S16),
        Opcode::HalvingSubS32 => sub(ctx, inst, Shr::S32),
        Opcode::HalvingSubU8 => sub(ctx, inst, Shr::U8),
        Opcode::HalvingSubU16 => sub(ctx, inst, Shr::U16),
        Opcode::HalvingSubU32 => sub(ctx, inst, Shr::U32),
        _ => unreachable!("halving::lower called with a non-halving opcode"),
    }
}

#[derive(Clone, Copy)]
enum Shr {
    S8,
    S16,
    S32,
    U8,
    U16,
    U32,
}

impl Shr {
    fn lsb_mask(self) -> [u8; 16] {
        match self {
            Shr::S8 | Shr::U8 => [0x01; 16],
            Shr::S16 | Shr::U16 => {
                let mut m = [0u8; 16];
                for i in 0..8 {
                    m[i * 2] = 0x01;
                }
                m
            }
            Shr::S32 | Shr::U32 => {
                let mut m = [0u8; 16];
                for i in 0..4 {
                    m[i * 4] = 0x01;
                }
                m
            }
        }
    }

    fn shr1(self, ctx: &mut EmitCtx, v: Xmm) -> Xmm {
        match self {
            Shr::S8 => shift::asr8_reg(ctx, v, 1),
            Shr::U8 => shift::lsr8_reg(ctx, v, 1),
            Shr::S16 => {
                ctx.asm.psraw_imm(v, 1);
                v
            }
            Shr::U16 => {
                ctx.asm.psrlw_imm(v, 1);
                v
            }
            Shr::S32 => {
                ctx.asm.psrad_imm(v, 1);
                v
            }
            Shr::U32 => {
                ctx.asm.psrld_imm(v, 1);
                v
            }
        }
    }

    fn paddx(self, ctx: &mut EmitCtx, dst: Xmm, src: Xmm) {
        match self {
            Shr::S8 | Shr::U8 => ctx.asm.paddb(dst, src),
            Shr::S16 | Shr::U16 => ctx.asm.paddw(dst, src),
            Shr::S32 | Shr::U32 => ctx.asm.paddd(dst, src),
        }
    }

    fn psubx(self, ctx: &mut EmitCtx, dst: Xmm, src: Xmm) {
        match self {
            Shr::S8 | Shr::U8 => ctx.asm.psubb(dst, src),
            Shr::S16 | Shr::U16 => ctx.asm.psubw(dst, src),
            Shr::S32 | Shr::U32 => ctx.asm.psubd(dst, src),
        }
    }
}

#[derive(Clone, Copy)]
enum Carry {
    And,
    Or,
}

fn add(ctx: &mut EmitCtx, inst: &Inst, width: Shr, carry: Carry) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let a_half = ctx.regalloc.scratch();
    ctx.asm.movdqa(a_half, a);
    let a_half = width.shr1(ctx, a_half);
    let b_half = ctx.regalloc.scratch();
    ctx.asm.movdqa(b_half, b);
    let b_half = width.shr1(ctx, b_half);
    width.paddx(ctx, a_half, b_half);

    let c = ctx.regalloc.scratch();
    ctx.asm.movdqa(c, a);
    match carry {
        Carry::And => ctx.asm.pand(c, b),
        Carry::Or => ctx.asm.por(c, b),
    }
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, width.lsb_mask());
    ctx.asm.pand(c, mask);

    width.paddx(ctx, a_half, c);
    a_half
}

fn sub(ctx: &mut EmitCtx, inst: &Inst, width: Shr) -> Xmm {
    let a = ctx.regalloc.use_(inst.value_arg(0));
    let b = ctx.regalloc.use_(inst.value_arg(1));

    let a_half = ctx.regalloc.scratch();
    ctx.asm.movdqa(a_half, a);
    let a_half = width.shr1(ctx, a_half);
    let b_half = ctx.regalloc.scratch();
    ctx.asm.movdqa(b_half, b);
    let b_half = width.shr1(ctx, b_half);
    width.psubx(ctx, a_half, b_half);

    let borrow = ctx.regalloc.scratch();
    ctx.asm.movdqa(borrow, a);
    ctx.asm.pandn(borrow, b);
    let mask = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(mask, width.lsb_mask());
    ctx.asm.pand(borrow, mask);

    width.psubx(ctx, a_half, borrow);
    a_half
}
