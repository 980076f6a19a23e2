//! `Add{8,16,32,64}`, `Sub{8,16,32,64}`.

use crate::context::EmitCtx;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    match inst.op() {
        Opcode::Add8 => ctx.asm.paddb(lhs, rhs),
        Opcode::Add16 => ctx.asm.paddw(lhs, rhs),
        Opcode::Add32 => ctx.asm.paddd(lhs, rhs),
        Opcode::Add64 => ctx.asm.paddq(lhs, rhs),
        Opcode::Sub8 => ctx.asm.psubb(lhs, rhs),
        Opcode::Sub16 => ctx.asm.psubw(lhs, rhs),
        Opcode::Sub32 => ctx.asm.psubd(lhs, rhs),
        Opcode::Sub64 => ctx.asm.psubq(lhs, rhs),
        _ => unreachable!("arith::lower called with a non-arithmetic opcode"),
    }
    lhs
}
