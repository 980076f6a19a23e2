//! `VectorTable` / `VectorTableLookup`.
//!
//! `VectorTable` is a zero-cost marker: it never reaches codegen on its
//! own. `mod.rs`'s block lowering treats the instruction immediately
//! preceding a `VectorTableLookup` as its table and passes the table's 1-4
//! operand registers in here directly, bypassing the normal one-result-
//! per-instruction pipeline.
//!
//! Each table register covers 16 index values. For register `i`, biasing
//! the index by `-16*i` (`psubb`) makes `pshufb` zero the lane on its own
//! once the biased index's top bit is set (`>= 128`, i.e. the original
//! index was below this register's range); the remaining case — an index
//! inside `[16*i, 16*i + 127]` but past this register's 16 entries — needs
//! an explicit unsigned-less-than mask, built the same way `minmax.rs`
//! builds an unsigned compare (no native `pcmpltub`). OR-ing every
//! register's masked lookup together works because at most one register's
//! range can contain a given index. A final unsigned compare against the
//! table's total size selects the accumulated lookup or the caller's
//! default per lane — replacing the fixed-`xmm0` `pblendvb` the original
//! instruction set would reach for, since the register allocator has no
//! way to pin a value into `xmm0` (the same substitution `minmax.rs` and
//! `paired.rs` use).

use crate::context::EmitCtx;
use crate::emit::minmax;
use crate::ir::Inst;
use crate::reg::Xmm;

pub fn lower(ctx: &mut EmitCtx, inst: &Inst, table: &[Xmm]) -> Xmm {
    assert!(
        (1..=4).contains(&table.len()),
        "VectorTableLookup table must have 1-4 registers"
    );
    let defaults = ctx.regalloc.use_(inst.value_arg(0));
    let indices = ctx.regalloc.use_scratch(inst.value_arg(1));

    let acc = ctx.regalloc.scratch();
    ctx.asm.pxor(acc, acc);
    for (i, &table_reg) in table.iter().enumerate() {
        let biased = ctx.regalloc.scratch();
        ctx.asm.movdqa(biased, indices);
        if i > 0 {
            let bias = ctx.regalloc.scratch();
            ctx.asm.movdqa_from_const(bias, [(i * 16) as u8; 16]);
            ctx.asm.psubb(biased, bias);
        }
        let looked_up = ctx.regalloc.scratch();
        ctx.asm.movdqa(looked_up, table_reg);
        ctx.asm.pshufb(looked_up, biased);

        let sixteen = ctx.regalloc.scratch();
        ctx.asm.movdqa_from_const(sixteen, [16u8; 16]);
        let in_this_register = minmax::greater_than(ctx, sixteen, biased, 8, false);
        ctx.asm.pand(looked_up, in_this_register);
        ctx.asm.por(acc, looked_up);
    }

    let size = ctx.regalloc.scratch();
    ctx.asm
        .movdqa_from_const(size, [(table.len() * 16) as u8; 16]);
    let in_range = minmax::greater_than(ctx, size, indices, 8, false);
    minmax::select(ctx, in_range, acc, defaults)
}
