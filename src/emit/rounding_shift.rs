//! `RoundingShiftLeft{S,U}{8,16,32,64}`: per-lane dynamic shift rounding the
//! last discarded bit toward +inf. No SSE/AVX tier exposes a rounding
//! variable shift natively, so this always goes through the scalar runtime.

use crate::context::EmitCtx;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let callback = match inst.op() {
        Opcode::RoundingShiftLeftS8 => scalar::rounding_shift_left_s8 as usize,
        Opcode::RoundingShiftLeftS16 => scalar::rounding_shift_left_s16 as usize,
        Opcode::RoundingShiftLeftS32 => scalar::rounding_shift_left_s32 as usize,
        Opcode::RoundingShiftLeftS64 => scalar::rounding_shift_left_s64 as usize,
        Opcode::RoundingShiftLeftU8 => scalar::rounding_shift_left_u8 as usize,
        Opcode::RoundingShiftLeftU16 => scalar::rounding_shift_left_u16 as usize,
        Opcode::RoundingShiftLeftU32 => scalar::rounding_shift_left_u32 as usize,
        Opcode::RoundingShiftLeftU64 => scalar::rounding_shift_left_u64 as usize,
        _ => unreachable!("rounding_shift::lower called with an unrelated opcode"),
    };
    let v = ctx.regalloc.use_(inst.value_arg(0));
    let shift = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg(ctx, v, shift, callback)
}
