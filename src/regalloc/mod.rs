//! Component C — the per-block register allocator.
//!
//! Grounded on `cranelift_codegen::regalloc::register_set`'s bit-vector-of-
//! units approach, specialised down to two flat 16-slot banks (XMM, GPR)
//! since this crate never needs sub-register aliasing at 128-bit lane
//! granularity. Single-threaded per block and fully deterministic.

mod state;

use std::collections::HashMap;

use crate::entity::VReg;
use crate::reg::{Gpr, Xmm};
use state::{GprBinding, GprSlot, XmmBinding, XmmSlot, CALLER_SAVED_GPRS};

/// One XMM or GPR acquired during the current emission, recorded so
/// `end_of_alloc_scope` can release everything that wasn't promoted to a
/// `define_value` binding.
#[derive(Clone, Copy, Debug)]
enum ScopeEntry {
    Xmm(Xmm),
    Gpr(Gpr),
}

/// The live register allocator for one basic block's emission.
pub struct RegAlloc {
    xmm: [XmmSlot; Xmm::COUNT],
    gpr: [GprSlot; Gpr::COUNT],
    bindings: HashMap<VReg, Xmm>,
    scope: Vec<ScopeEntry>,
}

impl RegAlloc {
    /// `rsp` (stack pointer) and `r15` (guest-state base) are pinned
    /// `Reserved` up front and never handed out by `scratch_gpr`.
    pub fn new() -> Self {
        let mut gpr: [GprSlot; Gpr::COUNT] = Default::default();
        gpr[Gpr::RSP.index() as usize].binding = GprBinding::Reserved;
        gpr[Gpr::R15.index() as usize].binding = GprBinding::Reserved;
        RegAlloc {
            xmm: Default::default(),
            gpr,
            bindings: HashMap::new(),
            scope: Vec::new(),
        }
    }

    fn alloc_free_xmm(&mut self) -> Xmm {
        for i in 0..Xmm::COUNT {
            if self.xmm[i].binding == XmmBinding::Free {
                return Xmm::new(i as u8);
            }
        }
        unreachable!("register allocator exhausted all 16 XMM slots")
    }

    fn alloc_free_gpr(&mut self) -> Gpr {
        for i in 0..Gpr::COUNT {
            if self.gpr[i].binding == GprBinding::Free {
                return Gpr::new(i as u8);
            }
        }
        unreachable!("register allocator exhausted all free GPR slots")
    }

    /// `use` — read-only XMM reserved for the value currently bound to
    /// `value`. Panics if `value` was never `define_value`d, or if it is
    /// read more times than its defining instruction declared via
    /// `Inst::use_count()`.
    pub fn use_(&mut self, value: VReg) -> Xmm {
        let reg = *self
            .bindings
            .get(&value)
            .expect("use of a VReg before its define_value");
        let slot = &mut self.xmm[reg.index() as usize];
        debug_assert!(
            slot.remaining_uses > 0,
            "more uses of {value:?} than its defining instruction's use_count declared"
        );
        slot.remaining_uses -= 1;
        self.scope.push(ScopeEntry::Xmm(reg));
        reg
    }

    /// `use_scratch` — a writable XMM holding `value`'s contents. If this is
    /// the value's last outstanding use (`remaining_uses` reaches zero,
    /// tracking the real use count threaded in at `define_value` rather than
    /// any per-slot incidental state), the original physical register is
    /// reused in place; otherwise a fresh copy is materialised and the
    /// caller is responsible for actually copying the bits (the allocator
    /// only tracks bindings, not code generation).
    pub fn use_scratch(&mut self, value: VReg) -> Xmm {
        let reg = *self
            .bindings
            .get(&value)
            .expect("use_scratch of a VReg before its define_value");
        let slot = &mut self.xmm[reg.index() as usize];
        debug_assert!(
            slot.remaining_uses > 0,
            "more uses of {value:?} than its defining instruction's use_count declared"
        );
        slot.remaining_uses -= 1;
        let is_last_use = slot.remaining_uses == 0;
        if is_last_use {
            self.xmm[reg.index() as usize].binding = XmmBinding::Scratch { writable: true };
            self.bindings.remove(&value);
            self.scope.push(ScopeEntry::Xmm(reg));
            reg
        } else {
            self.scope.push(ScopeEntry::Xmm(reg));
            self.scratch()
        }
    }

    /// `scratch` — a fresh, writable XMM with undefined contents.
    pub fn scratch(&mut self) -> Xmm {
        let reg = self.alloc_free_xmm();
        self.xmm[reg.index() as usize] = XmmSlot {
            binding: XmmBinding::Scratch { writable: true },
            remaining_uses: 0,
        };
        self.scope.push(ScopeEntry::Xmm(reg));
        reg
    }

    /// `scratch_gpr` — a fresh, writable GPR, never `rsp` or `r15`.
    pub fn scratch_gpr(&mut self) -> Gpr {
        let reg = self.alloc_free_gpr();
        self.gpr[reg.index() as usize] = GprSlot {
            binding: GprBinding::Scratch { writable: true },
            use_count: 0,
        };
        self.scope.push(ScopeEntry::Gpr(reg));
        reg
    }

    /// `use_gpr` — reserve a specific, already-meaningful GPR (e.g. `r15`,
    /// the guest-state base) for read-only access within this scope.
    pub fn use_gpr(&mut self, reg: Gpr) -> Gpr {
        self.gpr[reg.index() as usize].use_count += 1;
        self.scope.push(ScopeEntry::Gpr(reg));
        reg
    }

    /// `define_value(value, reg, use_count)` — binds the IR result. May be
    /// called with a register previously acquired as `use_scratch` or
    /// `scratch`, in which case that binding is converted into the new
    /// value's definition. `use_count` is the defining instruction's
    /// `Inst::use_count()` — the number of times this value will still be
    /// read later in the block — and seeds the slot's remaining-use counter
    /// that `use_`/`use_scratch` decrement.
    pub fn define_value(&mut self, value: VReg, reg: Xmm, use_count: u32) {
        debug_assert!(
            !self.bindings.contains_key(&value),
            "define_value called twice for the same VReg"
        );
        self.xmm[reg.index() as usize].binding = XmmBinding::Owned { value, writable: false };
        self.xmm[reg.index() as usize].remaining_uses = use_count;
        self.bindings.insert(value, reg);
        self.scope.retain(|e| !matches!(e, ScopeEntry::Xmm(r) if *r == reg));
    }

    /// `end_of_alloc_scope` — drops all uses acquired in this emission that
    /// were not promoted to a `define_value` binding.
    pub fn end_of_alloc_scope(&mut self) {
        for entry in self.scope.drain(..) {
            match entry {
                ScopeEntry::Xmm(reg) => {
                    let slot = &mut self.xmm[reg.index() as usize];
                    match slot.binding {
                        XmmBinding::Owned { .. } => {}
                        _ => {
                            slot.binding = XmmBinding::Free;
                            slot.remaining_uses = 0;
                        }
                    }
                }
                ScopeEntry::Gpr(reg) => {
                    let slot = &mut self.gpr[reg.index() as usize];
                    if !matches!(slot.binding, GprBinding::Reserved) {
                        slot.binding = GprBinding::Free;
                        slot.use_count = 0;
                    }
                }
            }
        }
    }

    /// `host_call(nullptr)` — reserves the callee-clobbered set per the
    /// active host ABI; any XMM scratch the caller needs to survive the
    /// call must already be spilled to the stack scratch area (component
    /// D), since XMM registers are always caller-saved on both ABIs.
    pub fn host_call(&mut self) {
        for &reg in CALLER_SAVED_GPRS.iter() {
            let slot = &mut self.gpr[reg.index() as usize];
            if matches!(slot.binding, GprBinding::Free) {
                slot.binding = GprBinding::Scratch { writable: true };
                slot.use_count = 0;
                self.scope.push(ScopeEntry::Gpr(reg));
            }
        }
    }

    /// `release(reg)` — early drop of an XMM acquired this scope, before
    /// `end_of_alloc_scope` runs.
    pub fn release(&mut self, reg: Xmm) {
        let slot = &mut self.xmm[reg.index() as usize];
        debug_assert!(
            !matches!(slot.binding, XmmBinding::Owned { .. }),
            "release() must not be used on a defined value's binding"
        );
        slot.binding = XmmBinding::Free;
        slot.remaining_uses = 0;
        self.scope.retain(|e| !matches!(e, ScopeEntry::Xmm(r) if *r == reg));
    }
}

impl Default for RegAlloc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn define_then_use_round_trips_same_register() {
        let mut ra = RegAlloc::new();
        let v = VReg::new(0);
        let reg = ra.scratch();
        ra.define_value(v, reg, 1);
        assert_eq!(ra.use_(v), reg);
    }

    #[test]
    fn use_scratch_keeps_binding_alive_across_non_final_uses() {
        let mut ra = RegAlloc::new();
        let v = VReg::new(0);
        let reg = ra.scratch();
        ra.define_value(v, reg, 2);
        // Not the last use: must not remove v's binding or hand back the
        // original physical register.
        let copy = ra.use_scratch(v);
        assert_ne!(copy, reg);
        assert_eq!(ra.use_(v), reg);
    }

    #[test]
    fn use_scratch_reclaims_original_register_on_last_use() {
        let mut ra = RegAlloc::new();
        let v = VReg::new(0);
        let reg = ra.scratch();
        ra.define_value(v, reg, 1);
        assert_eq!(ra.use_scratch(v), reg);
    }

    #[test]
    fn scratch_never_hands_out_reserved_gprs() {
        let mut ra = RegAlloc::new();
        for _ in 0..(Gpr::COUNT - 2) {
            let g = ra.scratch_gpr();
            assert_ne!(g, Gpr::RSP);
            assert_ne!(g, Gpr::R15);
        }
    }

    #[test]
    fn end_of_scope_frees_unpromoted_scratch() {
        let mut ra = RegAlloc::new();
        let reg = ra.scratch();
        ra.end_of_alloc_scope();
        // Same slot should be available again immediately.
        let reg2 = ra.scratch();
        assert_eq!(reg, reg2);
    }

    #[test]
    #[should_panic(expected = "define_value called twice")]
    fn define_value_twice_panics() {
        let mut ra = RegAlloc::new();
        let v = VReg::new(0);
        let r1 = ra.scratch();
        ra.define_value(v, r1, 1);
        let r2 = ra.scratch();
        ra.define_value(v, r2, 1);
    }
}
