//! `vecisel-x64`: lowers a small vector IR straight to x86-64 machine code
//! for a dynamic binary translator's JIT tier — no general instruction
//! selection framework, no intermediate MIR, one opcode in and a run of
//! bytes out per basic block.
//!
//! Component layout: [`ir`] is the data
//! model (Component A), [`assembler`] the byte-level encoder (Component B),
//! [`regalloc`] the per-block register allocator (Component C), [`fallback`]
//! and [`scalar`] the scalar-runtime escape hatch (Component D), [`emit`]
//! the per-opcode lowering (Component E), [`cpu_feature`] the host/forced
//! feature mask (Component F), and [`context`] the per-block `EmitCtx`
//! bundle (Component G).

pub mod assembler;
pub mod context;
pub mod cpu_feature;
pub mod emit;
pub mod entity;
pub mod error;
pub mod fallback;
pub mod ir;
pub mod reg;
pub mod regalloc;
pub mod scalar;

pub use context::{EmitCtx, JitStateLayout};
pub use error::{LoweringError, Result};
pub use ir::{Arg, Inst, LaneWidth, Opcode};
