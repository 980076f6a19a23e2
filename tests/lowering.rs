//! Integration tests for the lowering pipeline (spec.md §8). These stay at
//! the encoding level — asserting shapes and counts of emitted bytes, not
//! executing the generated code — since this crate has no JIT execution
//! harness and none of its dependencies support one (see DESIGN.md).

use vecisel_x64::context::JitStateLayout;
use vecisel_x64::cpu_feature::CpuFeatures;
use vecisel_x64::entity::{EntityRef, VReg};
use vecisel_x64::{Arg, EmitCtx, Inst, Opcode};

/// Binds input VRegs (at indices past anything a block's own instructions
/// will produce) to fresh scratch registers, simulating the block
/// parameters a real caller would already have live. `total_uses` must
/// match how many times the block built from these inputs actually reads
/// each one — the allocator's `use_`/`use_scratch` enforce this count.
fn seed_inputs(ctx: &mut EmitCtx, count: usize, total_uses: u32) -> Vec<VReg> {
    (0..count)
        .map(|i| {
            let vreg = VReg::new(1000 + i);
            let reg = ctx.regalloc.scratch();
            ctx.regalloc.define_value(vreg, reg, total_uses);
            vreg
        })
        .collect()
}

fn two_arg_inst(op: Opcode, a: VReg, b: VReg) -> Inst {
    Inst::new(op, &[Arg::Value(a), Arg::Value(b)], 1).expect("valid instruction")
}

/// A representative block touching several opcode families, including the
/// `VectorTable`/`VectorTableLookup` adjacency pair. Each input is read 6
/// times: once as an operand to each of the four two-arg instructions,
/// once when `lower_block` builds the table operand list, and once more
/// as a `VectorTableLookup` operand — callers must seed inputs with that
/// exact use count.
fn sample_block(inputs: &[VReg]) -> Vec<Inst> {
    vec![
        two_arg_inst(Opcode::Equal64, inputs[0], inputs[1]),
        two_arg_inst(Opcode::GreaterS64, inputs[0], inputs[1]),
        two_arg_inst(Opcode::HalvingAddU8, inputs[0], inputs[1]),
        two_arg_inst(Opcode::SignedSaturatedDoublingMultiplyReturnHigh16, inputs[0], inputs[1]),
        Inst::new(Opcode::VectorTable, &[Arg::Value(inputs[0]), Arg::Value(inputs[1])], 1)
            .expect("valid table"),
        two_arg_inst(Opcode::VectorTableLookup, inputs[0], inputs[1]),
    ]
}

#[test]
fn lowers_sample_block_under_every_feature_tier() {
    let tiers = [
        CpuFeatures::empty(),
        CpuFeatures::SSSE3,
        CpuFeatures::SSSE3 | CpuFeatures::SSE4_1,
        CpuFeatures::SSSE3 | CpuFeatures::SSE4_1 | CpuFeatures::AVX | CpuFeatures::AVX2,
    ];

    let mut codes = Vec::new();
    for features in tiers {
        let mut ctx = EmitCtx::builder()
            .cpu_features(features)
            .jit_state_layout(JitStateLayout::new(0x40))
            .build();
        let inputs = seed_inputs(&mut ctx, 2, 6);
        let block = sample_block(&inputs);
        vecisel_x64::emit::lower_block(&mut ctx, &block);
        let code = ctx.finish();
        assert!(!code.is_empty(), "block under {features:?} produced no code");
        codes.push(code);
    }

    // The pre-SSE4.1 tier and the AVX2 tier must take different encoding
    // paths for at least one opcode in this block (SignedSaturatedNarrow /
    // SignedSaturatedDoublingMultiplyReturnHigh and friends change shape
    // across tiers) - otherwise the feature gate isn't doing anything.
    assert_ne!(codes[0], codes[3], "scalar-only and AVX2 tiers produced identical code");
}

#[test]
fn define_value_is_called_once_per_instruction() {
    // Relies on the `debug_assert!` in `RegAlloc::define_value` to catch a
    // double-definition; success here is "did not panic".
    let mut ctx = EmitCtx::builder()
        .cpu_features(CpuFeatures::SSSE3 | CpuFeatures::SSE4_1)
        .build();
    let inputs = seed_inputs(&mut ctx, 2, 6);
    let block = sample_block(&inputs);
    vecisel_x64::emit::lower_block(&mut ctx, &block);
}

#[test]
fn repeated_mask_literal_is_deduplicated_across_instructions() {
    // ReverseBits (SSSE3 path) and PopulationCount (SSSE3 path) both intern
    // the `[0x0F; 16]` nibble mask; a single ctx lowering both must not
    // double-count it in the constant pool. `v` is read once by each
    // opcode, so it needs a use count of 2.
    let mut ctx = EmitCtx::builder()
        .cpu_features(CpuFeatures::SSSE3)
        .build();
    let inputs = seed_inputs(&mut ctx, 1, 2);
    let v = inputs[0];

    let block = vec![
        Inst::new(Opcode::PopulationCount, &[Arg::Value(v)], 1).expect("valid instruction"),
        Inst::new(Opcode::ReverseBits, &[Arg::Value(v)], 1).expect("valid instruction"),
    ];
    vecisel_x64::emit::lower_block(&mut ctx, &block);

    // Both opcodes intern the shared `[0x0F; 16]` nibble mask at least once
    // each; a working dedup keeps the pool well under one entry per call
    // site (several call sites, but only a handful of distinct literals).
    let pool_len = ctx.asm.const_pool().len();
    assert!(pool_len > 0);
    assert!(pool_len < 8, "nibble-mask literals were not deduplicated ({pool_len} entries)");
}
