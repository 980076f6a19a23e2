//! `PolynomialMultiply{8,Long8,Long64}`: carry-less (GF(2)[x]) per-lane
//! products. No SSE/AVX tier
//! below AVX-512 VPCLMULQDQ exposes a carry-less multiply, so all three
//! widths go through the scalar runtime unconditionally.

use crate::context::EmitCtx;
use crate::fallback;
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;
use crate::scalar;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    let callback = match inst.op() {
        Opcode::PolynomialMultiply8 => scalar::polynomial_multiply8 as usize,
        Opcode::PolynomialMultiplyLong8 => scalar::polynomial_multiply_long8 as usize,
        Opcode::PolynomialMultiplyLong64 => scalar::polynomial_multiply_long64 as usize,
        _ => unreachable!("polynomial::lower called with an unrelated opcode"),
    };
    let lhs = ctx.regalloc.use_(inst.value_arg(0));
    let rhs = ctx.regalloc.use_(inst.value_arg(1));
    fallback::two_arg(ctx, lhs, rhs, callback)
}
