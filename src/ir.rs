//! Data model: vector values, IR instruction handles, and the per-opcode
//! argument validation that is the one fallible boundary this crate
//! exposes.
//!
//! Polymorphism over lane width is removed: each lane width is its own
//! [`Opcode`] variant rather than a runtime `esize` parameter, so
//! `emit::dispatch` can exhaustively match without a fallback arm.
//! Internally, families that share a lowering sequence across widths still
//! take a [`LaneWidth`] value, just not as part of the public opcode
//! surface.

use smallvec::SmallVec;

use crate::entity::{EntityRef, VReg};
use crate::error::{LoweringError, Result};

/// A lane width recognised by the data model.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LaneWidth {
    L8,
    L16,
    L32,
    L64,
    L128,
}

impl LaneWidth {
    pub fn bits(self) -> u32 {
        match self {
            LaneWidth::L8 => 8,
            LaneWidth::L16 => 16,
            LaneWidth::L32 => 32,
            LaneWidth::L64 => 64,
            LaneWidth::L128 => 128,
        }
    }

    pub fn lanes(self) -> u32 {
        128 / self.bits()
    }
}

/// An opcode argument: either an immediate or a reference to a prior value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arg {
    Value(VReg),
    Imm8(u8),
    Imm16(u16),
}

impl Arg {
    fn expect_value(self, op: &'static str, pos: usize) -> Result<VReg> {
        match self {
            Arg::Value(v) => Ok(v),
            _ => Err(LoweringError::ExpectedValue { op, pos }),
        }
    }

    fn expect_imm8(self, op: &'static str, pos: usize) -> Result<u8> {
        match self {
            Arg::Imm8(i) => Ok(i),
            _ => Err(LoweringError::ExpectedImmediate { op, pos }),
        }
    }
}

/// One IR opcode per lowerable operation. Each lane width is a distinct
/// variant; immediates are carried inline on the variant once validated by
/// [`Inst::new`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Opcode {
    // -- Element access --------------------------------------------------
    GetElement8 { index: u8 },
    GetElement16 { index: u8 },
    GetElement32 { index: u8 },
    GetElement64 { index: u8 },
    SetElement8 { index: u8 },
    SetElement16 { index: u8 },
    SetElement32 { index: u8 },
    SetElement64 { index: u8 },

    // -- Bitwise ----------------------------------------------------------
    And,
    Or,
    Eor,
    Not,

    // -- Arithmetic ---------------------------------------------------------
    Add8,
    Add16,
    Add32,
    Add64,
    Sub8,
    Sub16,
    Sub32,
    Sub64,

    // -- Compare ------------------------------------------------------------
    Equal8,
    Equal16,
    Equal32,
    Equal64,
    Equal128,
    GreaterS8,
    GreaterS16,
    GreaterS32,
    GreaterS64,

    // -- Shifts by immediate --------------------------------------------------
    LogicalShiftLeft8 { shift: u8 },
    LogicalShiftLeft16 { shift: u8 },
    LogicalShiftLeft32 { shift: u8 },
    LogicalShiftLeft64 { shift: u8 },
    LogicalShiftRight8 { shift: u8 },
    LogicalShiftRight16 { shift: u8 },
    LogicalShiftRight32 { shift: u8 },
    LogicalShiftRight64 { shift: u8 },
    ArithmeticShiftRight8 { shift: u8 },
    ArithmeticShiftRight16 { shift: u8 },
    ArithmeticShiftRight32 { shift: u8 },
    ArithmeticShiftRight64 { shift: u8 },

    // -- Dynamic per-lane vector shifts ---------------------------------------
    LogicalVShiftS8,
    LogicalVShiftS16,
    LogicalVShiftS32,
    LogicalVShiftS64,
    LogicalVShiftU8,
    LogicalVShiftU16,
    LogicalVShiftU32,
    LogicalVShiftU64,

    // -- Halving add/sub ------------------------------------------------------
    HalvingAddS8,
    HalvingAddS16,
    HalvingAddS32,
    HalvingAddU8,
    HalvingAddU16,
    HalvingAddU32,
    HalvingSubS8,
    HalvingSubS16,
    HalvingSubS32,
    HalvingSubU8,
    HalvingSubU16,
    HalvingSubU32,
    RoundingHalvingAddS8,
    RoundingHalvingAddS16,
    RoundingHalvingAddS32,
    RoundingHalvingAddU8,
    RoundingHalvingAddU16,
    RoundingHalvingAddU32,

    // -- Abs / saturated abs --------------------------------------------------
    Abs8,
    Abs16,
    Abs32,
    Abs64,
    SignedSaturatedAbs8,
    SignedSaturatedAbs16,
    SignedSaturatedAbs32,
    SignedSaturatedAbs64,
    SignedSaturatedNeg8,
    SignedSaturatedNeg16,
    SignedSaturatedNeg32,
    SignedSaturatedNeg64,

    // -- Min/Max ----------------------------------------------------------
    MinS8,
    MinS16,
    MinS32,
    MinS64,
    MinU8,
    MinU16,
    MinU32,
    MinU64,
    MaxS8,
    MaxS16,
    MaxS32,
    MaxS64,
    MaxU8,
    MaxU16,
    MaxU32,
    MaxU64,

    // -- Multiply -----------------------------------------------------------
    Multiply8,
    Multiply16,
    Multiply32,
    Multiply64,
    SignedSaturatedDoublingMultiplyReturnHigh16,
    SignedSaturatedDoublingMultiplyReturnHigh32,

    // -- Narrow / widen -------------------------------------------------------
    Narrow16,
    Narrow32,
    Narrow64,
    SignExtend8,
    SignExtend16,
    SignExtend32,
    ZeroExtend8,
    ZeroExtend16,
    ZeroExtend32,
    SignedSaturatedNarrowToSigned16,
    SignedSaturatedNarrowToSigned32,
    SignedSaturatedNarrowToSigned64,
    SignedSaturatedNarrowToUnsigned16,
    SignedSaturatedNarrowToUnsigned32,
    SignedSaturatedNarrowToUnsigned64,
    UnsignedSaturatedNarrow16,
    UnsignedSaturatedNarrow32,
    UnsignedSaturatedNarrow64,

    // -- Paired (horizontal) ops ----------------------------------------------
    PairedAdd8,
    PairedAdd16,
    PairedAdd32,
    PairedAdd64,
    PairedAddLower8,
    PairedAddLower16,
    PairedAddLower32,
    PairedAddSignedWiden8,
    PairedAddSignedWiden16,
    PairedAddSignedWiden32,
    PairedAddUnsignedWiden8,
    PairedAddUnsignedWiden16,
    PairedAddUnsignedWiden32,
    PairedMinS8,
    PairedMinS16,
    PairedMinS32,
    PairedMinU8,
    PairedMinU16,
    PairedMinU32,
    PairedMaxS8,
    PairedMaxS16,
    PairedMaxS32,
    PairedMaxU8,
    PairedMaxU16,
    PairedMaxU32,

    // -- Deinterleave / interleave / broadcast / shuffle / extract ------------
    DeinterleaveEven8,
    DeinterleaveEven16,
    DeinterleaveEven32,
    DeinterleaveEven64,
    DeinterleaveOdd8,
    DeinterleaveOdd16,
    DeinterleaveOdd32,
    DeinterleaveOdd64,
    InterleaveLower8,
    InterleaveLower16,
    InterleaveLower32,
    InterleaveLower64,
    InterleaveUpper8,
    InterleaveUpper16,
    InterleaveUpper32,
    InterleaveUpper64,
    Broadcast8,
    Broadcast16,
    Broadcast32,
    Broadcast64,
    BroadcastLower8,
    BroadcastLower16,
    BroadcastLower32,
    ShuffleHighHalfwords { imm: u8 },
    ShuffleLowHalfwords { imm: u8 },
    ShuffleWords { imm: u8 },
    Extract { pos: u8 },
    ExtractLower { pos: u8 },

    // -- Polynomial multiply (GF(2)[x]) ---------------------------------------
    PolynomialMultiply8,
    PolynomialMultiplyLong8,
    PolynomialMultiplyLong64,

    // -- Population count / reverse bits --------------------------------------
    PopulationCount,
    ReverseBits,

    // -- Rounding shift left --------------------------------------------------
    RoundingShiftLeftS8,
    RoundingShiftLeftS16,
    RoundingShiftLeftS32,
    RoundingShiftLeftS64,
    RoundingShiftLeftU8,
    RoundingShiftLeftU16,
    RoundingShiftLeftU32,
    RoundingShiftLeftU64,

    // -- Table lookup ----------------------------------------------------
    /// Holds a refcount on 1-4 table operands; emits nothing.
    VectorTable,
    VectorTableLookup,

    // -- Misc ---------------------------------------------------------------
    ZeroVector,
    ZeroUpper,
    AbsoluteDifferenceSigned8,
    AbsoluteDifferenceSigned16,
    AbsoluteDifferenceSigned32,
    AbsoluteDifferenceUnsigned8,
    AbsoluteDifferenceUnsigned16,
    AbsoluteDifferenceUnsigned32,
}

impl Opcode {
    /// Name used in error messages and log lines; never user-visible prose,
    /// just the variant's own identity.
    pub fn name(self) -> &'static str {
        // A match on the variant discriminant only (ignoring payloads) is
        // exactly what `mem::discriminant` plus a lookup table would give
        // us; written out directly here since it also doubles as the
        // authoritative opcode list.
        match self {
            Opcode::GetElement8 { .. } => "GetElement8",
            Opcode::GetElement16 { .. } => "GetElement16",
            Opcode::GetElement32 { .. } => "GetElement32",
            Opcode::GetElement64 { .. } => "GetElement64",
            Opcode::SetElement8 { .. } => "SetElement8",
            Opcode::SetElement16 { .. } => "SetElement16",
            Opcode::SetElement32 { .. } => "SetElement32",
            Opcode::SetElement64 { .. } => "SetElement64",
            Opcode::And => "And",
            Opcode::Or => "Or",
            Opcode::Eor => "Eor",
            Opcode::Not => "Not",
            Opcode::Add8 => "Add8",
            Opcode::Add16 => "Add16",
            Opcode::Add32 => "Add32",
            Opcode::Add64 => "Add64",
            Opcode::Sub8 => "Sub8",
            Opcode::Sub16 => "Sub16",
            Opcode::Sub32 => "Sub32",
            Opcode::Sub64 => "Sub64",
            Opcode::Equal8 => "Equal8",
            Opcode::Equal16 => "Equal16",
            Opcode::Equal32 => "Equal32",
            Opcode::Equal64 => "Equal64",
            Opcode::Equal128 => "Equal128",
            Opcode::GreaterS8 => "GreaterS8",
            Opcode::GreaterS16 => "GreaterS16",
            Opcode::GreaterS32 => "GreaterS32",
            Opcode::GreaterS64 => "GreaterS64",
            Opcode::LogicalShiftLeft8 { .. } => "LogicalShiftLeft8",
            Opcode::LogicalShiftLeft16 { .. } => "LogicalShiftLeft16",
            Opcode::LogicalShiftLeft32 { .. } => "LogicalShiftLeft32",
            Opcode::LogicalShiftLeft64 { .. } => "LogicalShiftLeft64",
            Opcode::LogicalShiftRight8 { .. } => "LogicalShiftRight8",
            Opcode::LogicalShiftRight16 { .. } => "LogicalShiftRight16",
            Opcode::LogicalShiftRight32 { .. } => "LogicalShiftRight32",
            Opcode::LogicalShiftRight64 { .. } => "LogicalShiftRight64",
            Opcode::ArithmeticShiftRight8 { .. } => "ArithmeticShiftRight8",
            Opcode::ArithmeticShiftRight16 { .. } => "ArithmeticShiftRight16",
            Opcode::ArithmeticShiftRight32 { .. } => "ArithmeticShiftRight32",
            Opcode::ArithmeticShiftRight64 { .. } => "ArithmeticShiftRight64",
            Opcode::LogicalVShiftS8 => "LogicalVShiftS8",
            Opcode::LogicalVShiftS16 => "LogicalVShiftS16",
            Opcode::LogicalVShiftS32 => "LogicalVShiftS32",
            Opcode::LogicalVShiftS64 => "LogicalVShiftS64",
            Opcode::LogicalVShiftU8 => "LogicalVShiftU8",
            Opcode::LogicalVShiftU16 => "LogicalVShiftU16",
            Opcode::LogicalVShiftU32 => "LogicalVShiftU32",
            Opcode::LogicalVShiftU64 => "LogicalVShiftU64",
            Opcode::HalvingAddS8 => "HalvingAddS8",
            Opcode::HalvingAddS16 => "HalvingAddS16",
            Opcode::HalvingAddS32 => "HalvingAddS32",
            Opcode::HalvingAddU8 => "HalvingAddU8",
            Opcode::HalvingAddU16 => "HalvingAddU16",
            Opcode::HalvingAddU32 => "HalvingAddU32",
            Opcode::HalvingSubS8 => "HalvingSubS8",
            Opcode::HalvingSubS16 => "HalvingSubS16",
            Opcode::HalvingSubS32 => "HalvingSubS32",
            Opcode::HalvingSubU8 => "HalvingSubU8",
            Opcode::HalvingSubU16 => "HalvingSubU16",
            Opcode::HalvingSubU32 => "HalvingSubU32",
            Opcode::RoundingHalvingAddS8 => "RoundingHalvingAddS8",
            Opcode::RoundingHalvingAddS16 => "RoundingHalvingAddS16",
            Opcode::RoundingHalvingAddS32 => "RoundingHalvingAddS32",
            Opcode::RoundingHalvingAddU8 => "RoundingHalvingAddU8",
            Opcode::RoundingHalvingAddU16 => "RoundingHalvingAddU16",
            Opcode::RoundingHalvingAddU32 => "RoundingHalvingAddU32",
            Opcode::Abs8 => "Abs8",
            Opcode::Abs16 => "Abs16",
            Opcode::Abs32 => "Abs32",
            Opcode::Abs64 => "Abs64",
            Opcode::SignedSaturatedAbs8 => "SignedSaturatedAbs8",
            Opcode::SignedSaturatedAbs16 => "SignedSaturatedAbs16",
            Opcode::SignedSaturatedAbs32 => "SignedSaturatedAbs32",
            Opcode::SignedSaturatedAbs64 => "SignedSaturatedAbs64",
            Opcode::SignedSaturatedNeg8 => "SignedSaturatedNeg8",
            Opcode::SignedSaturatedNeg16 => "SignedSaturatedNeg16",
            Opcode::SignedSaturatedNeg32 => "SignedSaturatedNeg32",
            Opcode::SignedSaturatedNeg64 => "SignedSaturatedNeg64",
            Opcode::MinS8 => "MinS8",
            Opcode::MinS16 => "MinS16",
            Opcode::MinS32 => "MinS32",
            Opcode::MinS64 => "MinS64",
            Opcode::MinU8 => "MinU8",
            Opcode::MinU16 => "MinU16",
            Opcode::MinU32 => "MinU32",
            Opcode::MinU64 => "MinU64",
            Opcode::MaxS8 => "MaxS8",
            Opcode::MaxS16 => "MaxS16",
            Opcode::MaxS32 => "MaxS32",
            Opcode::MaxS64 => "MaxS64",
            Opcode::MaxU8 => "MaxU8",
            Opcode::MaxU16 => "MaxU16",
            Opcode::MaxU32 => "MaxU32",
            Opcode::MaxU64 => "MaxU64",
            Opcode::Multiply8 => "Multiply8",
            Opcode::Multiply16 => "Multiply16",
            Opcode::Multiply32 => "Multiply32",
            Opcode::Multiply64 => "Multiply64",
            Opcode::SignedSaturatedDoublingMultiplyReturnHigh16 => {
                "SignedSaturatedDoublingMultiplyReturnHigh16"
            }
            Opcode::SignedSaturatedDoublingMultiplyReturnHigh32 => {
                "SignedSaturatedDoublingMultiplyReturnHigh32"
            }
            Opcode::Narrow16 => "Narrow16",
            Opcode::Narrow32 => "Narrow32",
            Opcode::Narrow64 => "Narrow64",
            Opcode::SignExtend8 => "SignExtend8",
            Opcode::SignExtend16 => "SignExtend16",
            Opcode::SignExtend32 => "SignExtend32",
            Opcode::ZeroExtend8 => "ZeroExtend8",
            Opcode::ZeroExtend16 => "ZeroExtend16",
            Opcode::ZeroExtend32 => "ZeroExtend32",
            Opcode::SignedSaturatedNarrowToSigned16 => "SignedSaturatedNarrowToSigned16",
            Opcode::SignedSaturatedNarrowToSigned32 => "SignedSaturatedNarrowToSigned32",
            Opcode::SignedSaturatedNarrowToSigned64 => "SignedSaturatedNarrowToSigned64",
            Opcode::SignedSaturatedNarrowToUnsigned16 => "SignedSaturatedNarrowToUnsigned16",
            Opcode::SignedSaturatedNarrowToUnsigned32 => "SignedSaturatedNarrowToUnsigned32",
            Opcode::SignedSaturatedNarrowToUnsigned64 => "SignedSaturatedNarrowToUnsigned64",
            Opcode::UnsignedSaturatedNarrow16 => "UnsignedSaturatedNarrow16",
            Opcode::UnsignedSaturatedNarrow32 => "UnsignedSaturatedNarrow32",
            Opcode::UnsignedSaturatedNarrow64 => "UnsignedSaturatedNarrow64",
            Opcode::PairedAdd8 => "PairedAdd8",
            Opcode::PairedAdd16 => "PairedAdd16",
            Opcode::PairedAdd32 => "PairedAdd32",
            Opcode::PairedAdd64 => "PairedAdd64",
            Opcode::PairedAddLower8 => "PairedAddLower8",
            Opcode::PairedAddLower16 => "PairedAddLower16",
            Opcode::PairedAddLower32 => "PairedAddLower32",
            Opcode::PairedAddSignedWiden8 => "PairedAddSignedWiden8",
            Opcode::PairedAddSignedWiden16 => "PairedAddSignedWiden16",
            Opcode::PairedAddSignedWiden32 => "PairedAddSignedWiden32",
            Opcode::PairedAddUnsignedWiden8 => "PairedAddUnsignedWiden8",
            Opcode::PairedAddUnsignedWiden16 => "PairedAddUnsignedWiden16",
            Opcode::PairedAddUnsignedWiden32 => "PairedAddUnsignedWiden32",
            Opcode::PairedMinS8 => "PairedMinS8",
            Opcode::PairedMinS16 => "PairedMinS16",
            Opcode::PairedMinS32 => "PairedMinS32",
            Opcode::PairedMinU8 => "PairedMinU8",
            Opcode::PairedMinU16 => "PairedMinU16",
            Opcode::PairedMinU32 => "PairedMinU32",
            Opcode::PairedMaxS8 => "PairedMaxS8",
            Opcode::PairedMaxS16 => "PairedMaxS16",
            Opcode::PairedMaxS32 => "PairedMaxS32",
            Opcode::PairedMaxU8 => "PairedMaxU8",
            Opcode::PairedMaxU16 => "PairedMaxU16",
            Opcode::PairedMaxU32 => "PairedMaxU32",
            Opcode::DeinterleaveEven8 => "DeinterleaveEven8",
            Opcode::DeinterleaveEven16 => "DeinterleaveEven16",
            Opcode::DeinterleaveEven32 => "DeinterleaveEven32",
            Opcode::DeinterleaveEven64 => "DeinterleaveEven64",
            Opcode::DeinterleaveOdd8 => "DeinterleaveOdd8",
            Opcode::DeinterleaveOdd16 => "DeinterleaveOdd16",
            Opcode::DeinterleaveOdd32 => "DeinterleaveOdd32",
            Opcode::DeinterleaveOdd64 => "DeinterleaveOdd64",
            Opcode::InterleaveLower8 => "InterleaveLower8",
            Opcode::InterleaveLower16 => "InterleaveLower16",
            Opcode::InterleaveLower32 => "InterleaveLower32",
            Opcode::InterleaveLower64 => "InterleaveLower64",
            Opcode::InterleaveUpper8 => "InterleaveUpper8",
            Opcode::InterleaveUpper16 => "InterleaveUpper16",
            Opcode::InterleaveUpper32 => "InterleaveUpper32",
            Opcode::InterleaveUpper64 => "InterleaveUpper64",
            Opcode::Broadcast8 => "Broadcast8",
            Opcode::Broadcast16 => "Broadcast16",
            Opcode::Broadcast32 => "Broadcast32",
            Opcode::Broadcast64 => "Broadcast64",
            Opcode::BroadcastLower8 => "BroadcastLower8",
            Opcode::BroadcastLower16 => "BroadcastLower16",
            Opcode::BroadcastLower32 => "BroadcastLower32",
            Opcode::ShuffleHighHalfwords { .. } => "ShuffleHighHalfwords",
            Opcode::ShuffleLowHalfwords { .. } => "ShuffleLowHalfwords",
            Opcode::ShuffleWords { .. } => "ShuffleWords",
            Opcode::Extract { .. } => "Extract",
            Opcode::ExtractLower { .. } => "ExtractLower",
            Opcode::PolynomialMultiply8 => "PolynomialMultiply8",
            Opcode::PolynomialMultiplyLong8 => "PolynomialMultiplyLong8",
            Opcode::PolynomialMultiplyLong64 => "PolynomialMultiplyLong64",
            Opcode::PopulationCount => "PopulationCount",
            Opcode::ReverseBits => "ReverseBits",
            Opcode::RoundingShiftLeftS8 => "RoundingShiftLeftS8",
            Opcode::RoundingShiftLeftS16 => "RoundingShiftLeftS16",
            Opcode::RoundingShiftLeftS32 => "RoundingShiftLeftS32",
            Opcode::RoundingShiftLeftS64 => "RoundingShiftLeftS64",
            Opcode::RoundingShiftLeftU8 => "RoundingShiftLeftU8",
            Opcode::RoundingShiftLeftU16 => "RoundingShiftLeftU16",
            Opcode::RoundingShiftLeftU32 => "RoundingShiftLeftU32",
            Opcode::RoundingShiftLeftU64 => "RoundingShiftLeftU64",
            Opcode::VectorTable => "VectorTable",
            Opcode::VectorTableLookup => "VectorTableLookup",
            Opcode::ZeroVector => "ZeroVector",
            Opcode::ZeroUpper => "ZeroUpper",
            Opcode::AbsoluteDifferenceSigned8 => "AbsoluteDifferenceSigned8",
            Opcode::AbsoluteDifferenceSigned16 => "AbsoluteDifferenceSigned16",
            Opcode::AbsoluteDifferenceSigned32 => "AbsoluteDifferenceSigned32",
            Opcode::AbsoluteDifferenceUnsigned8 => "AbsoluteDifferenceUnsigned8",
            Opcode::AbsoluteDifferenceUnsigned16 => "AbsoluteDifferenceUnsigned16",
            Opcode::AbsoluteDifferenceUnsigned32 => "AbsoluteDifferenceUnsigned32",
        }
    }

    /// Number of `Arg::Value` operands this opcode consumes, not counting
    /// `VectorTable` operands reached indirectly through a `VectorTable`
    /// instruction reference (those are arity 1..=4 and validated
    /// separately by `emit::table_lookup`).
    fn value_arity(self) -> usize {
        use Opcode::*;
        match self {
            GetElement8 { .. } | GetElement16 { .. } | GetElement32 { .. } | GetElement64 { .. } => 1,
            SetElement8 { .. } | SetElement16 { .. } | SetElement32 { .. } | SetElement64 { .. } => 2,
            Not | Abs8 | Abs16 | Abs32 | Abs64 | SignedSaturatedAbs8 | SignedSaturatedAbs16
            | SignedSaturatedAbs32 | SignedSaturatedAbs64 | SignedSaturatedNeg8
            | SignedSaturatedNeg16 | SignedSaturatedNeg32 | SignedSaturatedNeg64
            | LogicalShiftLeft8 { .. } | LogicalShiftLeft16 { .. } | LogicalShiftLeft32 { .. }
            | LogicalShiftLeft64 { .. } | LogicalShiftRight8 { .. } | LogicalShiftRight16 { .. }
            | LogicalShiftRight32 { .. } | LogicalShiftRight64 { .. }
            | ArithmeticShiftRight8 { .. } | ArithmeticShiftRight16 { .. }
            | ArithmeticShiftRight32 { .. } | ArithmeticShiftRight64 { .. }
            | Narrow16 | Narrow32 | Narrow64 | SignExtend8 | SignExtend16 | SignExtend32
            | ZeroExtend8 | ZeroExtend16 | ZeroExtend32 | SignedSaturatedNarrowToSigned16
            | SignedSaturatedNarrowToSigned32 | SignedSaturatedNarrowToSigned64
            | SignedSaturatedNarrowToUnsigned16 | SignedSaturatedNarrowToUnsigned32
            | SignedSaturatedNarrowToUnsigned64 | UnsignedSaturatedNarrow16
            | UnsignedSaturatedNarrow32 | UnsignedSaturatedNarrow64 | Broadcast8 | Broadcast16
            | Broadcast32 | Broadcast64 | BroadcastLower8 | BroadcastLower16 | BroadcastLower32
            | ShuffleHighHalfwords { .. } | ShuffleLowHalfwords { .. } | ShuffleWords { .. }
            | PolynomialMultiplyLong64 | PopulationCount | ReverseBits | ZeroUpper => 1,
            ZeroVector => 0,
            VectorTable => 0, // arity validated by the table_lookup family instead
            VectorTableLookup => 2, // defaults + indices; table operand is separate
            Extract { .. } | ExtractLower { .. } => 2,
            _ => 2,
        }
    }
}

/// An immutable IR instruction, validated once at construction.
#[derive(Clone, Debug)]
pub struct Inst {
    op: Opcode,
    args: SmallVec<[Arg; 4]>,
    use_count: u32,
}

impl Inst {
    /// Construct and validate an instruction. This is the crate's one
    /// fallible boundary; everything downstream trusts the result.
    pub fn new(op: Opcode, args: &[Arg], use_count: u32) -> Result<Self> {
        let expected = op.value_arity();
        if op != Opcode::VectorTable && args.len() != expected {
            return Err(LoweringError::WrongArgCount {
                op: op.name(),
                expected,
                got: args.len(),
            });
        }
        if op == Opcode::VectorTable && !(1..=4).contains(&args.len()) {
            return Err(LoweringError::InvalidTableSize { count: args.len() });
        }

        // Shape-check the immediates the spec requires for a handful of
        // opcodes (element index bounds); everything else only needs the
        // value/immediate discrimination checked by the accessor helpers
        // used in `args()`.
        match op {
            Opcode::GetElement8 { index } | Opcode::SetElement8 { index } if index >= 16 => {
                return Err(LoweringError::LaneIndexOutOfRange {
                    index: index as u32,
                    width: 8,
                    max: 15,
                });
            }
            Opcode::GetElement16 { index } | Opcode::SetElement16 { index } if index >= 8 => {
                return Err(LoweringError::LaneIndexOutOfRange {
                    index: index as u32,
                    width: 16,
                    max: 7,
                });
            }
            Opcode::GetElement32 { index } | Opcode::SetElement32 { index } if index >= 4 => {
                return Err(LoweringError::LaneIndexOutOfRange {
                    index: index as u32,
                    width: 32,
                    max: 3,
                });
            }
            Opcode::GetElement64 { index } | Opcode::SetElement64 { index } if index >= 2 => {
                return Err(LoweringError::LaneIndexOutOfRange {
                    index: index as u32,
                    width: 64,
                    max: 1,
                });
            }
            _ => {}
        }

        Ok(Inst {
            op,
            args: SmallVec::from_slice(args),
            use_count,
        })
    }

    pub fn op(&self) -> Opcode {
        self.op
    }

    /// How many later instructions in the block will read this
    /// instruction's result. Threaded into `RegAlloc::define_value` so the
    /// allocator can tell a value's last read apart from an earlier one.
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    /// Fetch argument `pos` as a value reference.
    pub fn value_arg(&self, pos: usize) -> VReg {
        self.args[pos]
            .expect_value(self.op.name(), pos)
            .expect("Inst::new validated argument shape")
    }

    /// Fetch argument `pos` as an 8-bit immediate.
    pub fn imm8_arg(&self, pos: usize) -> u8 {
        self.args[pos]
            .expect_imm8(self.op.name(), pos)
            .expect("Inst::new validated argument shape")
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_arity() {
        let err = Inst::new(Opcode::And, &[Arg::Value(VReg::new(0))], 1).unwrap_err();
        assert_eq!(
            err,
            LoweringError::WrongArgCount {
                op: "And",
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn rejects_out_of_range_lane_index() {
        let err = Inst::new(
            Opcode::GetElement32 { index: 4 },
            &[Arg::Value(VReg::new(0))],
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoweringError::LaneIndexOutOfRange {
                index: 4,
                width: 32,
                max: 3,
            }
        );
    }

    #[test]
    fn accepts_well_formed_instruction() {
        let inst = Inst::new(
            Opcode::Add8,
            &[Arg::Value(VReg::new(0)), Arg::Value(VReg::new(1))],
            1,
        )
        .unwrap();
        assert_eq!(inst.op(), Opcode::Add8);
        assert_eq!(inst.value_arg(0), VReg::new(0));
        assert_eq!(inst.value_arg(1), VReg::new(1));
    }

    #[test]
    fn vector_table_allows_one_to_four_operands() {
        for n in 1..=4 {
            let args: Vec<Arg> = (0..n).map(|i| Arg::Value(VReg::new(i))).collect();
            assert!(Inst::new(Opcode::VectorTable, &args, 1).is_ok());
        }
        let err = Inst::new(Opcode::VectorTable, &[], 1).unwrap_err();
        assert_eq!(err, LoweringError::InvalidTableSize { count: 0 });
        let five: Vec<Arg> = (0..5).map(|i| Arg::Value(VReg::new(i))).collect();
        let err = Inst::new(Opcode::VectorTable, &five, 1).unwrap_err();
        assert_eq!(err, LoweringError::InvalidTableSize { count: 5 });
    }
}
