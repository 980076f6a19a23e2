//! Per-slot binding state for both register banks. Kept as a standalone
//! module so `mod.rs` can focus on the allocation contract itself.

use crate::entity::VReg;
use crate::reg::Gpr;

/// Binding state of one XMM slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum XmmBinding {
    Free,
    Owned { value: VReg, writable: bool },
    Scratch { writable: bool },
}

/// Binding state of one GPR slot. `Reserved` is permanent and never
/// surfaces to emitters — `rsp` (stack pointer) and `r15` (guest-state base)
/// are pinned this way at construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum GprBinding {
    Free,
    Reserved,
    Scratch { writable: bool },
}

#[derive(Clone, Copy, Debug)]
pub(super) struct XmmSlot {
    pub binding: XmmBinding,
    /// For an `Owned` slot, how many more times the bound value will be
    /// read before the block is done with it — seeded from the producing
    /// instruction's `Inst::use_count()` at `define_value` time and
    /// decremented by every `use_`/`use_scratch` call. Meaningless (and
    /// left at 0) for `Free`/`Scratch` slots.
    pub remaining_uses: u32,
}

impl Default for XmmSlot {
    fn default() -> Self {
        XmmSlot { binding: XmmBinding::Free, remaining_uses: 0 }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct GprSlot {
    pub binding: GprBinding,
    pub use_count: u32,
}

impl Default for GprSlot {
    fn default() -> Self {
        GprSlot { binding: GprBinding::Free, use_count: 0 }
    }
}

/// Caller-saved GPRs clobbered by `host_call`, per the active host ABI.
/// `r15` is excluded — it is pinned as the guest-state base and never
/// touched by a fallback call in the first place.
#[cfg(windows)]
pub(super) const CALLER_SAVED_GPRS: [Gpr; 7] = [
    Gpr::RAX,
    Gpr::RCX,
    Gpr::RDX,
    Gpr::new(8),
    Gpr::new(9),
    Gpr::new(10),
    Gpr::new(11),
];

#[cfg(not(windows))]
pub(super) const CALLER_SAVED_GPRS: [Gpr; 9] = [
    Gpr::RAX,
    Gpr::RCX,
    Gpr::RDX,
    Gpr::RSI,
    Gpr::RDI,
    Gpr::new(8),
    Gpr::new(9),
    Gpr::new(10),
    Gpr::new(11),
];
