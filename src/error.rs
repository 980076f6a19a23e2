//! Component F — programmer-contract-violation errors.
//!
//! The emitter operates on already-validated IR: once an
//! [`crate::ir::Inst`] is constructed, its internals are trusted and
//! `debug_assert!`/`unreachable!()` are used freely. `LoweringError` exists
//! only at the one fallible boundary, `Inst::new`, where argument shape is
//! checked before an instruction is allowed to exist at all.

use thiserror::Error;

/// A programmer-contract violation, detected once at IR-construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoweringError {
    #[error("opcode {op:?} expects {expected} argument(s), got {got}")]
    WrongArgCount {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("opcode {op:?} requires an immediate argument at position {pos}, found a value reference")]
    ExpectedImmediate { op: &'static str, pos: usize },

    #[error("opcode {op:?} requires a value reference at position {pos}, found an immediate")]
    ExpectedValue { op: &'static str, pos: usize },

    #[error("lane index {index} out of range for a {width}-bit lane width (max {max})")]
    LaneIndexOutOfRange { index: u32, width: u32, max: u32 },

    #[error("unsupported lane width {width} for opcode {op:?}")]
    UnsupportedLaneWidth { op: &'static str, width: u32 },

    #[error("VectorTable operand count must be 1..=4, got {count}")]
    InvalidTableSize { count: usize },
}

pub type Result<T> = core::result::Result<T, LoweringError>;
