//! `INT_MIN`-detection shared by the native (non-scalar-fallback)
//! saturation sequences: `pcmpeq` against the lane-width `INT_MIN`
//! constant, `pmovmskb`, mask to the relevant bit positions, OR the
//! nonzero-ness into `fpsr_qc`.

use crate::context::EmitCtx;
use crate::emit::compare::equal64_reg;
use crate::emit::consts;
use crate::fallback;
use crate::reg::Xmm;

/// All-ones-per-lane mask where `value`'s lane equals `INT_MIN` for
/// `bits`, all-zero elsewhere. `value` is read, not clobbered.
pub fn int_min_mask(ctx: &mut EmitCtx, value: Xmm, bits: u32) -> Xmm {
    let int_min = ctx.regalloc.scratch();
    ctx.asm.movdqa_from_const(int_min, consts::int_min(bits));
    match bits {
        8 => {
            ctx.asm.pcmpeqb(int_min, value);
            int_min
        }
        16 => {
            ctx.asm.pcmpeqw(int_min, value);
            int_min
        }
        32 => {
            ctx.asm.pcmpeqd(int_min, value);
            int_min
        }
        64 => equal64_reg(ctx, int_min, value),
        _ => unreachable!("int_min_mask only defined for 8/16/32/64-bit lanes"),
    }
}

/// ORs `fpsr_qc` iff any bit of `mask` that `pmovmskb`+`movmskb_lane_mask`
/// would report for `bits` is set, i.e. iff `mask` has any all-ones lane.
pub fn or_mask_if_nonzero(ctx: &mut EmitCtx, mask: Xmm, bits: u32) {
    let mask_gpr = ctx.regalloc.scratch_gpr();
    ctx.asm.pmovmskb(mask_gpr, mask);
    ctx.asm.and_gpr_imm32(mask_gpr, consts::movmskb_lane_mask(bits) as u32);
    fallback::or_fpsr_if_nonzero(ctx, mask_gpr);
}

/// Sets `fpsr_qc` if any lane of `value` equals `INT_MIN` for `bits`.
pub fn or_if_any_lane_is_int_min(ctx: &mut EmitCtx, value: Xmm, bits: u32) {
    let mask = int_min_mask(ctx, value, bits);
    or_mask_if_nonzero(ctx, mask, bits);
}
