//! Physical x86-64 register identities.
//!
//! Only the flat, no-sub-register-aliasing view the register allocator
//! needs, one entry per physical XMM and GPR; AVX-512's XMM16-31 and mask
//! registers are out of scope — EVEX-encoded opcodes here only ever address
//! XMM0-15.

/// One of the 16 XMM registers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Xmm(u8);

impl Xmm {
    pub const COUNT: usize = 16;

    pub const fn new(index: u8) -> Self {
        assert!(index < 16);
        Xmm(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// 3-bit encoding used directly in legacy/VEX.128 ModRM/SIB fields;
    /// the 4th bit (REX.R/X/B or VEX.~R) is handled by the assembler.
    pub const fn low3(self) -> u8 {
        self.0 & 0b111
    }

    pub const fn needs_rex_ext(self) -> bool {
        self.0 >= 8
    }
}

/// One of the 16 general-purpose registers, in x86-64 numbering
/// (0=rax, 1=rcx, ..., 4=rsp, 5=rbp, ..., 15=r15).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Gpr(u8);

impl Gpr {
    pub const COUNT: usize = 16;

    pub const fn new(index: u8) -> Self {
        assert!(index < 16);
        Gpr(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn low3(self) -> u8 {
        self.0 & 0b111
    }

    pub const fn needs_rex_ext(self) -> bool {
        self.0 >= 8
    }

    pub const RAX: Gpr = Gpr::new(0);
    pub const RCX: Gpr = Gpr::new(1);
    pub const RDX: Gpr = Gpr::new(2);
    pub const RBX: Gpr = Gpr::new(3);
    pub const RSP: Gpr = Gpr::new(4);
    pub const RBP: Gpr = Gpr::new(5);
    pub const RSI: Gpr = Gpr::new(6);
    pub const RDI: Gpr = Gpr::new(7);
    pub const R15: Gpr = Gpr::new(15);
}
