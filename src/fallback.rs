//! Component D — the scalar fallback runtime.
//!
//! Used when no tractable SIMD sequence exists. Spills one or two 128-bit
//! operands to a 16-aligned stack scratch area, calls a host-ABI scalar
//! callback operating on fixed-size lane arrays, reloads the result, and
//! optionally ORs a returned saturation byte into `fpsr_qc`.
//!
//! There is no teacher analogue for this module since `cranelift-codegen`
//! lowers to native instructions exclusively and never needs a scalar
//! escape hatch mid-block. The host-ABI argument-register convention (first
//! two integer argument registers carry the buffer pointers) is a design
//! decision recorded in `DESIGN.md`.

use crate::context::EmitCtx;
use crate::reg::{Gpr, Xmm};

#[cfg(windows)]
const ABI_SHADOW_SPACE: i32 = 32;
#[cfg(not(windows))]
const ABI_SHADOW_SPACE: i32 = 0;

#[cfg(windows)]
const ARG_GPRS: [Gpr; 2] = [Gpr::RCX, Gpr::RDX];
#[cfg(not(windows))]
const ARG_GPRS: [Gpr; 2] = [Gpr::RDI, Gpr::RSI];

#[cfg(windows)]
const ARG3_GPR: Gpr = Gpr::new(8);
#[cfg(not(windows))]
const ARG3_GPR: Gpr = Gpr::RDX;

/// One-argument fallback: `callback(result_buf, arg1_buf)`.
pub fn one_arg(ctx: &mut EmitCtx, arg: Xmm, callback: usize) -> Xmm {
    emit_one_arg(ctx, arg, callback, false)
}

/// One-argument fallback with a saturation-flag byte returned in `al`,
/// OR-ed into `fpsr_qc`.
pub fn one_arg_saturating(ctx: &mut EmitCtx, arg: Xmm, callback: usize) -> Xmm {
    emit_one_arg(ctx, arg, callback, true)
}

/// Two-argument fallback: `callback(result_buf, arg1_buf, arg2_buf)`.
pub fn two_arg(ctx: &mut EmitCtx, lhs: Xmm, rhs: Xmm, callback: usize) -> Xmm {
    emit_two_arg(ctx, lhs, rhs, callback, false)
}

/// Two-argument fallback with a saturation-flag byte returned in `al`.
pub fn two_arg_saturating(ctx: &mut EmitCtx, lhs: Xmm, rhs: Xmm, callback: usize) -> Xmm {
    emit_two_arg(ctx, lhs, rhs, callback, true)
}

/// ORs `fpsr_qc` with 1 iff `gpr` (a 32-bit mask, typically the already
/// width-masked result of `pmovmskb`) is nonzero. Shared by the native
/// `INT_MIN`-detection sequences (`emit/abs.rs`, `emit/sat_multiply.rs`,
/// `emit/narrow_widen.rs`) that set the saturation flag without going
/// through a scalar callback.
pub fn or_fpsr_if_nonzero(ctx: &mut EmitCtx, gpr: Gpr) {
    ctx.asm.test_gpr_gpr(gpr, gpr);
    ctx.asm.setne_al();
    ctx.asm.or_byte_mem_r15(ctx.state.fpsr_qc_offset);
}

fn emit_one_arg(ctx: &mut EmitCtx, arg: Xmm, callback: usize, saturating: bool) -> Xmm {
    const RESULT_OFF: i32 = 0;
    const ARG1_OFF: i32 = 16;
    const SCRATCH_SIZE: i32 = 32;
    let total = SCRATCH_SIZE + ABI_SHADOW_SPACE;

    log::trace!(
        "scalar fallback: one-arg{} via {:#x}",
        if saturating { " saturating" } else { "" },
        callback
    );

    ctx.asm.sub_rsp_imm32(total);
    ctx.asm.movdqu_store_rsp(ABI_SHADOW_SPACE + ARG1_OFF, arg);
    ctx.asm
        .lea_gpr_from_rsp(ARG_GPRS[0], ABI_SHADOW_SPACE + RESULT_OFF);
    ctx.asm
        .lea_gpr_from_rsp(ARG_GPRS[1], ABI_SHADOW_SPACE + ARG1_OFF);

    ctx.regalloc.host_call();
    ctx.asm.call_function(callback);

    if saturating {
        ctx.asm.or_byte_mem_r15(ctx.state.fpsr_qc_offset);
    }

    let result = ctx.regalloc.scratch();
    ctx.asm.movdqu_load_rsp(result, ABI_SHADOW_SPACE + RESULT_OFF);
    ctx.asm.add_rsp_imm32(total);
    result
}

fn emit_two_arg(ctx: &mut EmitCtx, lhs: Xmm, rhs: Xmm, callback: usize, saturating: bool) -> Xmm {
    const RESULT_OFF: i32 = 0;
    const ARG1_OFF: i32 = 16;
    const ARG2_OFF: i32 = 32;
    const SCRATCH_SIZE: i32 = 48;
    let total = SCRATCH_SIZE + ABI_SHADOW_SPACE;

    log::trace!(
        "scalar fallback: two-arg{} via {:#x}",
        if saturating { " saturating" } else { "" },
        callback
    );

    ctx.asm.sub_rsp_imm32(total);
    ctx.asm.movdqu_store_rsp(ABI_SHADOW_SPACE + ARG1_OFF, lhs);
    ctx.asm.movdqu_store_rsp(ABI_SHADOW_SPACE + ARG2_OFF, rhs);
    ctx.asm
        .lea_gpr_from_rsp(ARG_GPRS[0], ABI_SHADOW_SPACE + RESULT_OFF);
    ctx.asm
        .lea_gpr_from_rsp(ARG_GPRS[1], ABI_SHADOW_SPACE + ARG1_OFF);
    ctx.asm.lea_gpr_from_rsp(ARG3_GPR, ABI_SHADOW_SPACE + ARG2_OFF);

    ctx.regalloc.host_call();
    ctx.asm.call_function(callback);

    if saturating {
        ctx.asm.or_byte_mem_r15(ctx.state.fpsr_qc_offset);
    }

    let result = ctx.regalloc.scratch();
    ctx.asm.movdqu_load_rsp(result, ABI_SHADOW_SPACE + RESULT_OFF);
    ctx.asm.add_rsp_imm32(total);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_arg_emits_nonempty_code_and_reserves_a_result_register() {
        let mut ctx = EmitCtx::builder()
            .cpu_features(crate::cpu_feature::CpuFeatures::empty())
            .build();
        let arg = ctx.regalloc.scratch();
        let before = ctx.asm.cur_offset();
        let _result = one_arg(&mut ctx, arg, 0x1000);
        assert!(ctx.asm.cur_offset() > before);
    }

    #[test]
    fn saturating_variant_emits_more_code_than_plain() {
        let mut ctx1 = EmitCtx::builder()
            .cpu_features(crate::cpu_feature::CpuFeatures::empty())
            .build();
        let arg1 = ctx1.regalloc.scratch();
        let plain_start = ctx1.asm.cur_offset();
        one_arg(&mut ctx1, arg1, 0x1000);
        let plain_len = ctx1.asm.cur_offset() - plain_start;

        let mut ctx2 = EmitCtx::builder()
            .cpu_features(crate::cpu_feature::CpuFeatures::empty())
            .build();
        let arg2 = ctx2.regalloc.scratch();
        let sat_start = ctx2.asm.cur_offset();
        one_arg_saturating(&mut ctx2, arg2, 0x1000);
        let sat_len = ctx2.asm.cur_offset() - sat_start;

        assert!(sat_len > plain_len);
    }
}
