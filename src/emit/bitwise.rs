//! `And`, `Or`, `Eor`, `Not`.

use crate::context::EmitCtx;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::And => binary(ctx, inst, |asm, dst, src| asm.pand(dst, src)),
        Opcode::Or => binary(ctx, inst, |asm, dst, src| asm.por(dst, src)),
        Opcode::Eor => binary(ctx, inst, |asm, dst, src| asm.pxor(dst, src)),
        Opcode::Not => not(ctx, inst),
        _ => unreachable!("bitwise::lower called with a non-bitwise opcode"),
    }
}

fn binary(
    ctx: &mut EmitCtx,
    inst: &Inst,
    f: impl FnOnce(&mut crate::assembler::Assembler, Xmm, Xmm),
) -> Xmm {
    let lhs = ctx.regalloc.use_scratch(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    f(&mut ctx.asm, lhs, rhs);
    lhs
}

fn not(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let v = ctx.regalloc.use_scratch(inst.value_arg(0));
    let ones = ctx.regalloc.scratch();
    ctx.asm.pcmpeqw(ones, ones);
    ctx.asm.pxor(v, ones);
    v
}
