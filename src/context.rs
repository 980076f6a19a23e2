//! Component G — the per-block emission context and its builder.
//!
//! Grounded on `cranelift-codegen`'s `x86`/`arm64`/`all-arch` feature-gating
//! pattern for the Cargo-feature side (see `DESIGN.md`); the builder shape
//! itself follows the small `XBuilder::new().x(..).build()` convention used
//! throughout the wasmtime workspace's configuration types.

use crate::assembler::Assembler;
use crate::cpu_feature::CpuFeatures;
use crate::regalloc::RegAlloc;

/// JIT state layout: at minimum, the byte offset of the `fpsr_qc`
/// saturation flag relative to the guest-state base register conventionally
/// held in host `r15`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JitStateLayout {
    pub fpsr_qc_offset: i32,
}

impl JitStateLayout {
    pub fn new(fpsr_qc_offset: i32) -> Self {
        JitStateLayout { fpsr_qc_offset }
    }
}

/// Per-basic-block mutable bundle: the register allocator, the assembler,
/// and JIT state layout, plus the CPU feature set every emitter in
/// `src/emit/` queries to pick a lowering strategy.
///
/// Each block gets its own `EmitCtx` — independent allocator/assembler
/// instances are required for blocks emitted in parallel.
pub struct EmitCtx {
    pub asm: Assembler,
    pub regalloc: RegAlloc,
    pub features: CpuFeatures,
    pub state: JitStateLayout,
}

impl EmitCtx {
    pub fn builder() -> EmitCtxBuilder {
        EmitCtxBuilder::default()
    }

    /// Consume the context, handing back the finished code buffer. The
    /// constant pool is read out separately via `ctx.asm.const_pool()`
    /// before this is called, since pool layout determines the `m_const`
    /// RIP-relative offsets already baked into the buffer.
    pub fn finish(self) -> Vec<u8> {
        self.asm.finish()
    }
}

#[derive(Default)]
pub struct EmitCtxBuilder {
    features: Option<CpuFeatures>,
    state: Option<JitStateLayout>,
}

impl EmitCtxBuilder {
    pub fn cpu_features(mut self, features: CpuFeatures) -> Self {
        self.features = Some(features);
        self
    }

    pub fn jit_state_layout(mut self, state: JitStateLayout) -> Self {
        self.state = Some(state);
        self
    }

    /// Build the context. `CpuFeatures::host()` is the default when the
    /// caller does not force a subset (tests force subsets explicitly to
    /// exercise every lowering path on one host).
    pub fn build(self) -> EmitCtx {
        EmitCtx {
            asm: Assembler::new(),
            regalloc: RegAlloc::new(),
            features: self.features.unwrap_or_else(CpuFeatures::host),
            state: self.state.unwrap_or_default(),
        }
    }
}
