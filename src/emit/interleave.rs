//! `Deinterleave{Even,Odd}`, `Interleave{Lower,Upper}`, `Broadcast*`,
//! `Shuffle*`, `Extract*`.

use crate::context::EmitCtx;
use crate::cpu_feature::CpuFeatures;
use crate::emit::consts;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::DeinterleaveEven8 => deinterleave8(ctx, inst, false),
        Opcode::DeinterleaveOdd8 => deinterleave8(ctx, inst, true),
        Opcode::DeinterleaveEven16 => deinterleave16(ctx, inst, false),
        Opcode::DeinterleaveOdd16 => deinterleave16(ctx, inst, true),
        Opcode::DeinterleaveEven32 => deinterleave32(ctx, inst, false),
        Opcode::DeinterleaveOdd32 => deinterleave32(ctx, inst, true),
        Opcode::DeinterleaveEven64 => {
            let (lhs, rhs) = args2(ctx, inst);
            ctx.asm.punpcklqdq(lhs, rhs);
            lhs
        }
        Opcode::DeinterleaveOdd64 => {
            let (lhs, rhs) = args2(ctx, inst);
            ctx.asm.punpckhqdq(lhs, rhs);
            lhs
        }

        Opcode::InterleaveLower8 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpcklbw(l, r);
            l
        }
        Opcode::InterleaveLower16 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpcklwd(l, r);
            l
        }
        Opcode::InterleaveLower32 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpckldq(l, r);
            l
        }
        Opcode::InterleaveLower64 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpcklqdq(l, r);
            l
        }
        Opcode::InterleaveUpper8 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpckhbw(l, r);
            l
        }
        Opcode::InterleaveUpper16 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpckhwd(l, r);
            l
        }
        Opcode::InterleaveUpper32 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpckhdq(l, r);
            l
        }
        Opcode::InterleaveUpper64 => {
            let (l, r) = args2(ctx, inst);
            ctx.asm.punpckhqdq(l, r);
            l
        }

        Opcode::Broadcast8 => broadcast8(ctx, inst, false),
        Opcode::Broadcast16 => broadcast16(ctx, inst, false),
        Opcode::Broadcast32 => broadcast32(ctx, inst, false),
        Opcode::Broadcast64 => broadcast64(ctx, inst, false),
        Opcode::BroadcastLower8 => broadcast8(ctx, inst, true),
        Opcode::BroadcastLower16 => broadcast16(ctx, inst, true),
        Opcode::BroadcastLower32 => broadcast32(ctx, inst, true),

        Opcode::ShuffleHighHalfwords { imm } => {
            let v = ctx.regalloc.use_(inst.value_arg(0));
            let dst = ctx.regalloc.scratch();
            ctx.asm.pshufhw(dst, v, imm);
            dst
        }
        Opcode::ShuffleLowHalfwords { imm } => {
            let v = ctx.regalloc.use_(inst.value_arg(0));
            let dst = ctx.regalloc.scratch();
            ctx.asm.pshuflw(dst, v, imm);
            dst
        }
        Opcode::ShuffleWords { imm } => {
            let v = ctx.regalloc.use_(inst.value_arg(0));
            let dst = ctx.regalloc.scratch();
            ctx.asm.pshufd(dst, v, imm);
            dst
        }

        Opcode::Extract { pos } => extract(ctx, inst, pos, false),
        Opcode::ExtractLower { pos } => extract(ctx, inst, pos, true),

        _ => unreachable!("interleave::lower called with an unrelated opcode"),
    }
}

fn args2(ctx: &mut EmitCtx, inst: &Inst) -> (Xmm, Xmm) {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    (lhs, rhs)
}

/// Mask each word down to the byte we want (low byte for "even", the
/// high byte shifted down for "odd"), then `packuswb` the two operands
/// together directly — the mask makes every value fit a byte, so the
/// saturating pack is a no-op truncate.
fn deinterleave8(ctx: &mut EmitCtx, inst: &Inst, odd: bool) -> Xmm {
    let (lhs, rhs) = args2(ctx, inst);
    let a = select_byte_per_word(ctx, lhs, odd);
    let b = select_byte_per_word(ctx, rhs, odd);
    ctx.asm.packuswb(a, b);
    a
}

fn select_byte_per_word(ctx: &mut EmitCtx, v: Xmm, odd: bool) -> Xmm {
    if odd {
        ctx.asm.psrlw_imm(v, 8);
        v
    } else {
        let mask = ctx.regalloc.scratch();
        ctx.asm.movdqa_from_const(mask, consts::repeated_u16(0x00FF));
        ctx.asm.pand(v, mask);
        v
    }
}

/// Same idea at dword granularity: mask (or shift) down to the word we
/// want, then combine with `packusdw` (SSE4.1) or the sign-fix +
/// `packssdw` trick (`narrow_widen.rs`'s pre-SSE4.1 `Narrow32` path).
fn deinterleave16(ctx: &mut EmitCtx, inst: &Inst, odd: bool) -> Xmm {
    let (lhs, rhs) = args2(ctx, inst);
    let a = select_word_per_dword(ctx, lhs, odd);
    let b = select_word_per_dword(ctx, rhs, odd);
    if ctx.features.contains(CpuFeatures::SSE4_1) {
        ctx.asm.packusdw(a, b);
    } else {
        ctx.asm.pslld_imm(a, 16);
        ctx.asm.psrad_imm(a, 16);
        ctx.asm.pslld_imm(b, 16);
        ctx.asm.psrad_imm(b, 16);
        ctx.asm.packssdw(a, b);
    }
    a
}

fn select_word_per_dword(ctx: &mut EmitCtx, v: Xmm, odd: bool) -> Xmm {
    if odd {
        ctx.asm.psrld_imm(v, 16);
        v
    } else {
        let mask = ctx.regalloc.scratch();
        ctx.asm
            .movdqa_from_const(mask, consts::repeated_u32(0x0000_FFFF));
        ctx.asm.pand(v, mask);
        v
    }
}

/// `pshufd(v, 0x88)` gives `[v0,v2,v0,v2]` (evens in the low 64 bits),
/// `pshufd(v, 0xDD)` gives `[v1,v3,v1,v3]` (odds); `punpcklqdq` then
/// concatenates `lhs`'s low 64 bits with `rhs`'s.
fn deinterleave32(ctx: &mut EmitCtx, inst: &Inst, odd: bool) -> Xmm {
    let (lhs, rhs) = args2(ctx, inst);
    let imm = if odd { 0xDD } else { 0x88 };
    let a = ctx.regalloc.scratch();
    ctx.asm.pshufd(a, lhs, imm);
    let b = ctx.regalloc.scratch();
    ctx.asm.pshufd(b, rhs, imm);
    ctx.asm.punpcklqdq(a, b);
    a
}

fn broadcast8(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let dst = ctx.regalloc.scratch();
    if ctx.features.contains(CpuFeatures::AVX2) {
        ctx.asm.vpbroadcastb(dst, v);
    } else {
        ctx.asm.movdqa(dst, v);
        ctx.asm.punpcklbw(dst, dst);
        broadcast_low_word_to_all(ctx, dst);
    }
    if lower {
        ctx.asm.movq_xmm_xmm(dst, dst);
    }
    dst
}

fn broadcast16(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let dst = ctx.regalloc.scratch();
    if ctx.features.contains(CpuFeatures::AVX2) {
        ctx.asm.vpbroadcastw(dst, v);
    } else {
        ctx.asm.movdqa(dst, v);
        broadcast_low_word_to_all(ctx, dst);
    }
    if lower {
        ctx.asm.movq_xmm_xmm(dst, dst);
    }
    dst
}

/// `pshuflw(v,v,0)` broadcasts word0 across the low 4 words; `pshufd`
/// then broadcasts that low dword (two copies of word0) across all 4
/// dwords. Always available (SSE2), so this is the pre-AVX2 fallback for
/// both `Broadcast8` (after a `punpcklbw` pre-step) and `Broadcast16`.
fn broadcast_low_word_to_all(ctx: &mut EmitCtx, v: Xmm) {
    ctx.asm.pshuflw(v, v, 0x00);
    ctx.asm.pshufd(v, v, 0x00);
}

fn broadcast32(ctx: &mut EmitCtx, inst: &Inst, lower: bool) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let dst = ctx.regalloc.scratch();
    if ctx.features.contains(CpuFeatures::AVX2) {
        ctx.asm.vpbroadcastd(dst, v);
    } else {
        ctx.asm.pshufd(dst, v, 0x00);
    }
    if lower {
        ctx.asm.movq_xmm_xmm(dst, dst);
    }
    dst
}

fn broadcast64(ctx: &mut EmitCtx, inst: &Inst, _lower: bool) -> Xmm {
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let dst = ctx.regalloc.scratch();
    if ctx.features.contains(CpuFeatures::AVX2) {
        ctx.asm.vpbroadcastq(dst, v);
    } else {
        ctx.asm.pshufd(dst, v, 0x44);
    }
    dst
}

/// A 128-bit window starting at bit `pos` of the 256-bit concatenation
/// `v2:v1`. `byte_shift = pos/8`; `psrldq(v1, byte_shift)` pulls v1's
/// tail down to the bottom, `pslldq(v2, 16-byte_shift)` pulls v2's head
/// up to the top (zero-filled on the side each instruction doesn't
/// reach), and `por` merges them. `pos == 0` degenerates correctly since
/// `pslldq` by 16 is an all-zero shift.
fn extract(ctx: &mut EmitCtx, inst: &Inst, pos: u8, lower_only: bool) -> Xmm {
    let v1 = ctx.regalloc.use_scratch(inst.value_arg(0));
    let v2 = ctx.regalloc.use_scratch(inst.value_arg(1));
    let byte_shift = pos / 8;
    ctx.asm.psrldq(v1, byte_shift);
    ctx.asm.pslldq(v2, 16 - byte_shift);
    ctx.asm.por(v1, v2);
    if lower_only {
        ctx.asm.movq_xmm_xmm(v1, v1);
    }
    v1
}
