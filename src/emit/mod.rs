//! Component E — per-opcode lowering: one submodule per family, an
//! exhaustive [`dispatch`] over every [`Opcode`] variant, and
//! [`lower_block`], the driver that walks a block's instructions in order,
//! feeding each one's result into the register allocator.

mod abs;
mod arith;
mod bitwise;
mod compare;
pub(crate) mod consts;
mod element;
mod halving;
mod interleave;
mod minmax;
mod misc;
mod multiply;
mod narrow_widen;
mod paired;
mod polynomial;
mod popcount_reverse;
mod rounding_shift;
mod sat_multiply;
mod satflag;
mod shift;
mod table_lookup;

use crate::context::EmitCtx;
use crate::entity::{EntityRef, VReg};
use crate::ir::{Inst, Opcode};
use crate::reg::Xmm;

/// Lower one instruction to the XMM register holding its result.
///
/// `VectorTable` is handled by the caller ([`lower_block`]) before this is
/// reached — it never produces a result of its own, only a set of operand
/// registers `VectorTableLookup` reads directly.
pub fn dispatch(ctx: &mut EmitCtx, inst: &Inst) -> Xmm {
    match inst.op() {
        Opcode::GetElement8 { .. }
        | Opcode::GetElement16 { .. }
        | Opcode::GetElement32 { .. }
        | Opcode::GetElement64 { .. }
        | Opcode::SetElement8 { .. }
        | Opcode::SetElement16 { .. }
        | Opcode::SetElement32 { .. }
        | Opcode::SetElement64 { .. } => element::lower(ctx, inst),

        Opcode::And | Opcode::Or | Opcode::Eor | Opcode::Not => bitwise::lower(ctx, inst),

        Opcode::Add8 | Opcode::Add16 | Opcode::Add32 | Opcode::Add64 | Opcode::Sub8
        | Opcode::Sub16 | Opcode::Sub32 | Opcode::Sub64 => arith::lower(ctx, inst),

        Opcode::Equal8
        | Opcode::Equal16
        | Opcode::Equal32
        | Opcode::Equal64
        | Opcode::Equal128
        | Opcode::GreaterS8
        | Opcode::GreaterS16
        | Opcode::GreaterS32
        | Opcode::GreaterS64 => compare::lower(ctx, inst),

        Opcode::LogicalShiftLeft8 { .. }
        | Opcode::LogicalShiftLeft16 { .. }
        | Opcode::LogicalShiftLeft32 { .. }
        | Opcode::LogicalShiftLeft64 { .. }
        | Opcode::LogicalShiftRight8 { .. }
        | Opcode::LogicalShiftRight16 { .. }
        | Opcode::LogicalShiftRight32 { .. }
        | Opcode::LogicalShiftRight64 { .. }
        | Opcode::ArithmeticShiftRight8 { .. }
        | Opcode::ArithmeticShiftRight16 { .. }
        | Opcode::ArithmeticShiftRight32 { .. }
        | Opcode::ArithmeticShiftRight64 { .. }
        | Opcode::LogicalVShiftS8
        | Opcode::LogicalVShiftS16
        | Opcode::LogicalVShiftS32
        | Opcode::LogicalVShiftS64
        | Opcode::LogicalVShiftU8
        | Opcode::LogicalVShiftU16
        | Opcode::LogicalVShiftU32
        | Opcode::LogicalVShiftU64 => shift::lower(ctx, inst),

        Opcode::HalvingAddS8
        | Opcode::HalvingAddS16
        | Opcode::HalvingAddS32
        | Opcode::HalvingAddU8
        | Opcode::HalvingAddU16
        | Opcode::HalvingAddU32
        | Opcode::HalvingSubS8
        | Opcode::HalvingSubS16
        | Opcode::HalvingSubS32
        | Opcode::HalvingSubU8
        | Opcode::HalvingSubU16
        | Opcode::HalvingSubU32
        | Opcode::RoundingHalvingAddS8
        | Opcode::RoundingHalvingAddS16
        | Opcode::RoundingHalvingAddS32
        | Opcode::RoundingHalvingAddU8
        | Opcode::RoundingHalvingAddU16
        | Opcode::RoundingHalvingAddU32 => halving::lower(ctx, inst),

        Opcode::Abs8
        | Opcode::Abs16
        | Opcode::Abs32
        | Opcode::Abs64
        | Opcode::SignedSaturatedAbs8
        | Opcode::SignedSaturatedAbs16
        | Opcode::SignedSaturatedAbs32
        | Opcode::SignedSaturatedAbs64
        | Opcode::SignedSaturatedNeg8
        | Opcode::SignedSaturatedNeg16
        | Opcode::SignedSaturatedNeg32
        | Opcode::SignedSaturatedNeg64 => abs::lower(ctx, inst),

        Opcode::MinS8
        | Opcode::MinS16
        | Opcode::MinS32
        | Opcode::MinS64
        | Opcode::MinU8
        | Opcode::MinU16
        | Opcode::MinU32
        | Opcode::MinU64
        | Opcode::MaxS8
        | Opcode::MaxS16
        | Opcode::MaxS32
        | Opcode::MaxS64
        | Opcode::MaxU8
        | Opcode::MaxU16
        | Opcode::MaxU32
        | Opcode::MaxU64 => minmax::lower(ctx, inst),

        Opcode::Multiply8 | Opcode::Multiply16 | Opcode::Multiply32 | Opcode::Multiply64 => {
            multiply::lower(ctx, inst)
        }
        Opcode::SignedSaturatedDoublingMultiplyReturnHigh16
        | Opcode::SignedSaturatedDoublingMultiplyReturnHigh32 => sat_multiply::lower(ctx, inst),

        Opcode::Narrow16
        | Opcode::Narrow32
        | Opcode::Narrow64
        | Opcode::SignExtend8
        | Opcode::SignExtend16
        | Opcode::SignExtend32
        | Opcode::ZeroExtend8
        | Opcode::ZeroExtend16
        | Opcode::ZeroExtend32
        | Opcode::SignedSaturatedNarrowToSigned16
        | Opcode::SignedSaturatedNarrowToSigned32
        | Opcode::SignedSaturatedNarrowToSigned64
        | Opcode::SignedSaturatedNarrowToUnsigned16
        | Opcode::SignedSaturatedNarrowToUnsigned32
        | Opcode::SignedSaturatedNarrowToUnsigned64
        | Opcode::UnsignedSaturatedNarrow16
        | Opcode::UnsignedSaturatedNarrow32
        | Opcode::UnsignedSaturatedNarrow64 => narrow_widen::lower(ctx, inst),

        Opcode::PairedAdd8
        | Opcode::PairedAdd16
        | Opcode::PairedAdd32
        | Opcode::PairedAdd64
        | Opcode::PairedAddLower8
        | Opcode::PairedAddLower16
        | Opcode::PairedAddLower32
        | Opcode::PairedAddSignedWiden8
        | Opcode::PairedAddSignedWiden16
        | Opcode::PairedAddSignedWiden32
        | Opcode::PairedAddUnsignedWiden8
        | Opcode::PairedAddUnsignedWiden16
        | Opcode::PairedAddUnsignedWiden32
        | Opcode::PairedMinS8
        | Opcode::PairedMinS16
        | Opcode::PairedMinS32
        | Opcode::PairedMinU8
        | Opcode::PairedMinU16
        | Opcode::PairedMinU32
        | Opcode::PairedMaxS8
        | Opcode::PairedMaxS16
        | Opcode::PairedMaxS32
        | Opcode::PairedMaxU8
        | Opcode::PairedMaxU16
        | Opcode::PairedMaxU32 => paired::lower(ctx, inst),

        Opcode::DeinterleaveEven8
        | Opcode::DeinterleaveEven16
        | Opcode::DeinterleaveEven32
        | Opcode::DeinterleaveEven64
        | Opcode::DeinterleaveOdd8
        | Opcode::DeinterleaveOdd16
        | Opcode::DeinterleaveOdd32
        | Opcode::DeinterleaveOdd64
        | Opcode::InterleaveLower8
        | Opcode::InterleaveLower16
        | Opcode::InterleaveLower32
        | Opcode::InterleaveLower64
        | Opcode::InterleaveUpper8
        | Opcode::InterleaveUpper16
        | Opcode::InterleaveUpper32
        | Opcode::InterleaveUpper64
        | Opcode::Broadcast8
        | Opcode::Broadcast16
        | Opcode::Broadcast32
        | Opcode::Broadcast64
        | Opcode::BroadcastLower8
        | Opcode::BroadcastLower16
        | Opcode::BroadcastLower32
        | Opcode::ShuffleHighHalfwords { .. }
        | Opcode::ShuffleLowHalfwords { .. }
        | Opcode::ShuffleWords { .. }
        | Opcode::Extract { .. }
        | Opcode::ExtractLower { .. } => interleave::lower(ctx, inst),

        Opcode::PolynomialMultiply8
        | Opcode::PolynomialMultiplyLong8
        | Opcode::PolynomialMultiplyLong64 => polynomial::lower(ctx, inst),

        Opcode::PopulationCount | Opcode::ReverseBits => popcount_reverse::lower(ctx, inst),

        Opcode::RoundingShiftLeftS8
        | Opcode::RoundingShiftLeftS16
        | Opcode::RoundingShiftLeftS32
        | Opcode::RoundingShiftLeftS64
        | Opcode::RoundingShiftLeftU8
        | Opcode::RoundingShiftLeftU16
        | Opcode::RoundingShiftLeftU32
        | Opcode::RoundingShiftLeftU64 => rounding_shift::lower(ctx, inst),

        Opcode::ZeroVector
        | Opcode::ZeroUpper
        | Opcode::AbsoluteDifferenceSigned8
        | Opcode::AbsoluteDifferenceSigned16
        | Opcode::AbsoluteDifferenceSigned32
        | Opcode::AbsoluteDifferenceUnsigned8
        | Opcode::AbsoluteDifferenceUnsigned16
        | Opcode::AbsoluteDifferenceUnsigned32 => misc::lower(ctx, inst),

        Opcode::VectorTable | Opcode::VectorTableLookup => {
            unreachable!("VectorTable/VectorTableLookup are lowered by lower_block, not dispatch")
        }
    }
}

/// Lower a block's instructions in order into `ctx`'s assembler, one pass,
/// single block. The caller reads the finished code and constant pool back
/// out of `ctx` (`ctx.finish()`, `ctx.asm.const_pool()`).
///
/// `VectorTableLookup` reads its table from the `VectorTable` instruction
/// immediately preceding it — the two are emitted as a single unit, and
/// the `VectorTable` marker itself never reaches `dispatch` or
/// `define_value`: it holds a refcount on its operands and emits nothing on
/// its own.
pub fn lower_block(ctx: &mut EmitCtx, insts: &[Inst]) {
    for (i, inst) in insts.iter().enumerate() {
        if inst.op() == Opcode::VectorTable {
            // Consumed by the following VectorTableLookup; see below.
            continue;
        }

        let result = if inst.op() == Opcode::VectorTableLookup {
            let table_inst = &insts[i - 1];
            debug_assert_eq!(table_inst.op(), Opcode::VectorTable);
            let table: Vec<Xmm> = (0..table_inst.args().len())
                .map(|pos| ctx.regalloc.use_(table_inst.value_arg(pos)))
                .collect();
            table_lookup::lower(ctx, inst, &table)
        } else {
            dispatch(ctx, inst)
        };

        ctx.regalloc.define_value(VReg::new(i), result, inst.use_count());
        ctx.regalloc.end_of_alloc_scope();
    }
}
