//! Scalar callback bodies for the component D fallback runtime. Each
//! function here is the native Rust body a JIT'd `call_function` invokes:
//! it receives raw pointers to 16-byte-aligned buffers holding fixed-size
//! lane arrays, reads its operands, computes the opcode's lane-wise
//! semantics, and writes the result buffer. Lane order is little-endian,
//! matching the XMM register layout they were spilled from.
//!
//! These are ordinary `extern "C" fn`s, called by address (`as usize`) from
//! `src/emit/*`; nothing here touches the register allocator or assembler.

use std::slice;

unsafe fn read_u8x16(p: *const u8) -> [u8; 16] {
    slice::from_raw_parts(p, 16).try_into().unwrap()
}
unsafe fn write_u8x16(p: *mut u8, v: [u8; 16]) {
    slice::from_raw_parts_mut(p, 16).copy_from_slice(&v);
}
unsafe fn read_u16x8(p: *const u8) -> [u16; 8] {
    let bytes = read_u8x16(p);
    let mut out = [0u16; 8];
    for i in 0..8 {
        out[i] = u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
    }
    out
}
unsafe fn write_u16x8(p: *mut u8, v: [u16; 8]) {
    let mut bytes = [0u8; 16];
    for i in 0..8 {
        bytes[i * 2..i * 2 + 2].copy_from_slice(&v[i].to_le_bytes());
    }
    write_u8x16(p, bytes);
}
unsafe fn read_u32x4(p: *const u8) -> [u32; 4] {
    let bytes = read_u8x16(p);
    let mut out = [0u32; 4];
    for i in 0..4 {
        out[i] = u32::from_le_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap());
    }
    out
}
unsafe fn write_u32x4(p: *mut u8, v: [u32; 4]) {
    let mut bytes = [0u8; 16];
    for i in 0..4 {
        bytes[i * 4..i * 4 + 4].copy_from_slice(&v[i].to_le_bytes());
    }
    write_u8x16(p, bytes);
}
unsafe fn read_u64x2(p: *const u8) -> [u64; 2] {
    let bytes = read_u8x16(p);
    [
        u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
        u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
    ]
}
unsafe fn write_u64x2(p: *mut u8, v: [u64; 2]) {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&v[0].to_le_bytes());
    bytes[8..16].copy_from_slice(&v[1].to_le_bytes());
    write_u8x16(p, bytes);
}

// ---- GreaterS64 (used when SSE4.2 is unavailable) -------------------------

pub extern "C" fn greater_s64(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u64x2(a), read_u64x2(b));
        let mut out = [0u64; 2];
        for i in 0..2 {
            out[i] = if (a[i] as i64) > (b[i] as i64) { u64::MAX } else { 0 };
        }
        write_u64x2(result, out);
    }
}

// ---- Min/Max64 (used when neither AVX nor AVX-512VL is available) --------

macro_rules! minmax64 {
    ($name:ident, $cast:ty, $pick:expr) => {
        pub extern "C" fn $name(result: *mut u8, a: *const u8, b: *const u8) {
            unsafe {
                let (a, b) = (read_u64x2(a), read_u64x2(b));
                let mut out = [0u64; 2];
                for i in 0..2 {
                    let (x, y) = (a[i] as $cast, b[i] as $cast);
                    out[i] = $pick(x, y) as u64;
                }
                write_u64x2(result, out);
            }
        }
    };
}
minmax64!(min_s64, i64, |x: i64, y: i64| x.min(y));
minmax64!(max_s64, i64, |x: i64, y: i64| x.max(y));
minmax64!(min_u64, u64, |x: u64, y: u64| x.min(y));
minmax64!(max_u64, u64, |x: u64, y: u64| x.max(y));

// ---- LogicalVShift{S,U}{8,16,32,64} ---------------------------------------
//
// Contract: per lane, shift amount is a signed byte. `|shift| >= bit_width`
// saturates to 0 (unsigned, and signed right shifts saturate to the
// sign-extended value instead). Positive shifts wrap modulo 2^bit_width.

fn vshift_u<const BITS: u32>(lane: u64, shift: i8) -> u64 {
    let mask = if BITS == 64 { u64::MAX } else { (1u64 << BITS) - 1 };
    if shift <= -(BITS as i32) as i8 || shift >= BITS as i8 {
        return 0;
    }
    if shift >= 0 {
        (lane.wrapping_shl(shift as u32)) & mask
    } else {
        (lane & mask) >> (-shift as u32)
    }
}

fn vshift_s<const BITS: u32>(lane: u64, shift: i8) -> u64 {
    let signed = sign_extend(lane, BITS);
    if shift <= -(BITS as i32) as i8 {
        // Full arithmetic shift: result is the sign bit replicated.
        return (if signed < 0 { -1i64 } else { 0 }) as u64 & lane_mask(BITS);
    }
    if shift >= BITS as i8 {
        return 0;
    }
    if shift >= 0 {
        ((signed.wrapping_shl(shift as u32)) as u64) & lane_mask(BITS)
    } else {
        ((signed >> (-shift as u32)) as u64) & lane_mask(BITS)
    }
}

fn lane_mask(bits: u32) -> u64 {
    if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

fn sign_extend(lane: u64, bits: u32) -> i64 {
    if bits == 64 {
        return lane as i64;
    }
    let shift = 64 - bits;
    ((lane << shift) as i64) >> shift
}

macro_rules! logical_vshift {
    ($name:ident, $bits:expr, $lanes:expr, $read:ident, $write:ident, $f:expr) => {
        pub extern "C" fn $name(result: *mut u8, a: *const u8, shift: *const u8) {
            unsafe {
                let a = $read(a);
                // Shift amounts travel as one signed byte per lane, packed
                // into the low byte of each lane-sized slot of the second
                // operand buffer.
                let raw_shift = read_u8x16(shift);
                let mut out = a;
                for i in 0..$lanes {
                    let lane_bytes = ($bits / 8) as usize;
                    let s = raw_shift[i * lane_bytes] as i8;
                    out[i] = $f(a[i] as u64, s) as _;
                }
                $write(result, out);
            }
        }
    };
}

logical_vshift!(logical_vshift_u8, 8u32, 16, read_u8x16, write_u8x16, vshift_u::<8>);
logical_vshift!(logical_vshift_u16, 16u32, 8, read_u16x8, write_u16x8, vshift_u::<16>);
logical_vshift!(logical_vshift_u32, 32u32, 4, read_u32x4, write_u32x4, vshift_u::<32>);
logical_vshift!(logical_vshift_u64, 64u32, 2, read_u64x2, write_u64x2, vshift_u::<64>);
logical_vshift!(logical_vshift_s8, 8u32, 16, read_u8x16, write_u8x16, vshift_s::<8>);
logical_vshift!(logical_vshift_s16, 16u32, 8, read_u16x8, write_u16x8, vshift_s::<16>);
logical_vshift!(logical_vshift_s32, 32u32, 4, read_u32x4, write_u32x4, vshift_s::<32>);
logical_vshift!(logical_vshift_s64, 64u32, 2, read_u64x2, write_u64x2, vshift_s::<64>);

// ---- RoundingShiftLeft{S,U}{8,16,32,64} ------------------------------------
//
// Per-lane dynamic shift, rounding the last discarded bit toward +inf.

fn rounding_shift_u(lane: u64, bits: u32, shift: i8) -> u64 {
    let mask = lane_mask(bits);
    if shift >= bits as i8 {
        return 0;
    }
    if shift >= 0 {
        (lane.wrapping_shl(shift as u32)) & mask
    } else {
        let n = (-shift) as u32;
        if n >= bits {
            0
        } else {
            let round = (lane >> (n - 1)) & 1;
            ((lane >> n) & mask).wrapping_add(round) & mask
        }
    }
}

fn rounding_shift_s(lane: u64, bits: u32, shift: i8) -> u64 {
    let signed = sign_extend(lane, bits);
    let mask = lane_mask(bits);
    if shift >= bits as i8 {
        return 0;
    }
    if shift >= 0 {
        ((signed.wrapping_shl(shift as u32)) as u64) & mask
    } else {
        let n = (-shift) as u32;
        if n > bits {
            (if signed < 0 { -1i64 } else { 0 }) as u64 & mask
        } else {
            let round = (lane >> (n.saturating_sub(1))) & 1;
            (((signed >> n) as u64).wrapping_add(round)) & mask
        }
    }
}

macro_rules! rounding_shift {
    ($name:ident, $bits:expr, $lanes:expr, $read:ident, $write:ident, $f:expr) => {
        pub extern "C" fn $name(result: *mut u8, a: *const u8, shift: *const u8) {
            unsafe {
                let a = $read(a);
                let raw_shift = read_u8x16(shift);
                let mut out = a;
                for i in 0..$lanes {
                    let lane_bytes = ($bits / 8) as usize;
                    let s = raw_shift[i * lane_bytes] as i8;
                    out[i] = $f(a[i] as u64, $bits, s) as _;
                }
                $write(result, out);
            }
        }
    };
}

rounding_shift!(rounding_shift_left_u8, 8u32, 16, read_u8x16, write_u8x16, rounding_shift_u);
rounding_shift!(rounding_shift_left_u16, 16u32, 8, read_u16x8, write_u16x8, rounding_shift_u);
rounding_shift!(rounding_shift_left_u32, 32u32, 4, read_u32x4, write_u32x4, rounding_shift_u);
rounding_shift!(rounding_shift_left_u64, 64u32, 2, read_u64x2, write_u64x2, rounding_shift_u);
rounding_shift!(rounding_shift_left_s8, 8u32, 16, read_u8x16, write_u8x16, rounding_shift_s);
rounding_shift!(rounding_shift_left_s16, 16u32, 8, read_u16x8, write_u16x8, rounding_shift_s);
rounding_shift!(rounding_shift_left_s32, 32u32, 4, read_u32x4, write_u32x4, rounding_shift_s);
rounding_shift!(rounding_shift_left_s64, 64u32, 2, read_u64x2, write_u64x2, rounding_shift_s);

// ---- Paired{Min,Max}{S,U}{8,16} (sequential pairwise, no native op) -------

macro_rules! paired_minmax_8 {
    ($name:ident, $cast:ty, $pick:expr) => {
        pub extern "C" fn $name(result: *mut u8, a: *const u8, b: *const u8) {
            unsafe {
                let (a, b) = (read_u8x16(a), read_u8x16(b));
                let mut out = [0u8; 16];
                for i in 0..8 {
                    let av = [a[i * 2] as $cast, a[i * 2 + 1] as $cast];
                    let bv = [b[i * 2] as $cast, b[i * 2 + 1] as $cast];
                    out[i] = $pick(av[0], av[1]) as u8;
                    out[i + 8] = $pick(bv[0], bv[1]) as u8;
                }
                write_u8x16(result, out);
            }
        }
    };
}
paired_minmax_8!(paired_min_s8, i8, |x: i8, y: i8| x.min(y));
paired_minmax_8!(paired_max_s8, i8, |x: i8, y: i8| x.max(y));
paired_minmax_8!(paired_min_u8, u8, |x: u8, y: u8| x.min(y));
paired_minmax_8!(paired_max_u8, u8, |x: u8, y: u8| x.max(y));

macro_rules! paired_minmax_16 {
    ($name:ident, $cast:ty, $pick:expr) => {
        pub extern "C" fn $name(result: *mut u8, a: *const u8, b: *const u8) {
            unsafe {
                let (a, b) = (read_u16x8(a), read_u16x8(b));
                let mut out = [0u16; 8];
                for i in 0..4 {
                    let av = [a[i * 2] as $cast, a[i * 2 + 1] as $cast];
                    let bv = [b[i * 2] as $cast, b[i * 2 + 1] as $cast];
                    out[i] = $pick(av[0], av[1]) as u16;
                    out[i + 4] = $pick(bv[0], bv[1]) as u16;
                }
                write_u16x8(result, out);
            }
        }
    };
}
paired_minmax_16!(paired_min_s16, i16, |x: i16, y: i16| x.min(y));
paired_minmax_16!(paired_max_s16, i16, |x: i16, y: i16| x.max(y));
paired_minmax_16!(paired_min_u16, u16, |x: u16, y: u16| x.min(y));
paired_minmax_16!(paired_max_u16, u16, |x: u16, y: u16| x.max(y));

// ---- PairedAdd{Signed,Unsigned}Widen{8,16,32}: pair-sums the low 64 bits
// of each operand into the wider lane width, `lhs`'s pairs filling the
// result's low 64 bits and `rhs`'s filling the high 64 bits (the same
// "half from each operand" shape `PairedAddLower` uses, just widened
// instead of narrowed back down).

pub extern "C" fn paired_add_widen_s8(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u8x16(a), read_u8x16(b));
        let mut out = [0u16; 8];
        for i in 0..4 {
            out[i] = (a[i * 2] as i8 as i16 + a[i * 2 + 1] as i8 as i16) as u16;
            out[i + 4] = (b[i * 2] as i8 as i16 + b[i * 2 + 1] as i8 as i16) as u16;
        }
        write_u16x8(result, out);
    }
}

pub extern "C" fn paired_add_widen_u8(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u8x16(a), read_u8x16(b));
        let mut out = [0u16; 8];
        for i in 0..4 {
            out[i] = a[i * 2] as u16 + a[i * 2 + 1] as u16;
            out[i + 4] = b[i * 2] as u16 + b[i * 2 + 1] as u16;
        }
        write_u16x8(result, out);
    }
}

pub extern "C" fn paired_add_widen_s16(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u16x8(a), read_u16x8(b));
        let mut out = [0u32; 4];
        for i in 0..2 {
            out[i] = (a[i * 2] as i16 as i32 + a[i * 2 + 1] as i16 as i32) as u32;
            out[i + 2] = (b[i * 2] as i16 as i32 + b[i * 2 + 1] as i16 as i32) as u32;
        }
        write_u32x4(result, out);
    }
}

pub extern "C" fn paired_add_widen_u16(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u16x8(a), read_u16x8(b));
        let mut out = [0u32; 4];
        for i in 0..2 {
            out[i] = a[i * 2] as u32 + a[i * 2 + 1] as u32;
            out[i + 2] = b[i * 2] as u32 + b[i * 2 + 1] as u32;
        }
        write_u32x4(result, out);
    }
}

pub extern "C" fn paired_add_widen_s32(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u32x4(a), read_u32x4(b));
        let mut out = [0u64; 2];
        out[0] = (a[0] as i32 as i64 + a[1] as i32 as i64) as u64;
        out[1] = (b[0] as i32 as i64 + b[1] as i32 as i64) as u64;
        write_u64x2(result, out);
    }
}

pub extern "C" fn paired_add_widen_u32(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u32x4(a), read_u32x4(b));
        let mut out = [0u64; 2];
        out[0] = a[0] as u64 + a[1] as u64;
        out[1] = b[0] as u64 + b[1] as u64;
        write_u64x2(result, out);
    }
}

// ---- Polynomial multiply (GF(2)[x]) ---------------------------------------

fn clmul(lhs: u64, rhs: u64, bit_width: u32) -> u128 {
    let mut res: u128 = 0;
    for i in 0..bit_width {
        if (lhs >> i) & 1 == 1 {
            res ^= (rhs as u128) << i;
        }
    }
    res
}

/// `PolynomialMultiply8`: per-byte-lane carry-less product, truncated to 8
/// bits (the low half of the full 16-bit product).
pub extern "C" fn polynomial_multiply8(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u8x16(a), read_u8x16(b));
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = clmul(a[i] as u64, b[i] as u64, 8) as u8;
        }
        write_u8x16(result, out);
    }
}

/// `PolynomialMultiplyLong8`: widening carry-less product, 8x8 -> 16 per
/// lane (8 lanes in, 8 wider lanes out).
pub extern "C" fn polynomial_multiply_long8(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u8x16(a), read_u8x16(b));
        let mut out = [0u16; 8];
        for i in 0..8 {
            out[i] = clmul(a[i] as u64, b[i] as u64, 8) as u16;
        }
        write_u16x8(result, out);
    }
}

/// `PolynomialMultiplyLong64`: the single 64x64 -> 128 carry-less product,
/// split across the two 64-bit halves of the result.
pub extern "C" fn polynomial_multiply_long64(result: *mut u8, a: *const u8, b: *const u8) {
    unsafe {
        let (a, b) = (read_u64x2(a), read_u64x2(b));
        let wide = clmul(a[0], b[0], 64);
        write_u64x2(result, [wide as u64, (wide >> 64) as u64]);
    }
}

// ---- Population count (used when neither AVX512_BITALG nor SSSE3 apply) --

pub extern "C" fn population_count(result: *mut u8, a: *const u8) {
    unsafe {
        let a = read_u8x16(a);
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = a[i].count_ones() as u8;
        }
        write_u8x16(result, out);
    }
}

// ---- SignedSaturatedDoublingMultiplyReturnHigh32 (no native 32x32 signed
// high-multiply pair on any SSE/AVX tier, unlike the 16-bit case which has
// pmulhw/pmullw) ------------------------------------------------------------

pub extern "C" fn sat_doubling_mulhi32(result: *mut u8, a: *const u8, b: *const u8) -> u8 {
    unsafe {
        let (a, b) = (read_u32x4(a), read_u32x4(b));
        let mut out = [0u32; 4];
        let mut saturated = 0u8;
        for i in 0..4 {
            let (av, bv) = (a[i] as i32, b[i] as i32);
            // i128 avoids the i64 overflow at the a=b=i32::MIN edge case,
            // where 2*a*b is exactly 2^63.
            let doubled = (av as i128) * (bv as i128) * 2;
            let mut hi = ((doubled as i64) >> 32) as i32;
            if hi == i32::MIN {
                hi = i32::MAX;
                saturated = 1;
            }
            out[i] = hi as u32;
        }
        write_u32x4(result, out);
        saturated
    }
}

// ---- 64-bit-source saturating narrows (no packed 64->32 saturating pack
// exists pre-AVX-512, so these three always go through the scalar path) ----

pub extern "C" fn narrow64_to_i32_signed_sat(result: *mut u8, a: *const u8) -> u8 {
    unsafe {
        let a = read_u64x2(a);
        let mut out = [0u32; 4];
        let mut saturated = 0u8;
        for i in 0..2 {
            let v = a[i] as i64;
            out[i] = if v > i32::MAX as i64 {
                saturated = 1;
                i32::MAX as u32
            } else if v < i32::MIN as i64 {
                saturated = 1;
                i32::MIN as u32
            } else {
                v as i32 as u32
            };
        }
        write_u32x4(result, out);
        saturated
    }
}

pub extern "C" fn narrow64_to_u32_from_signed_sat(result: *mut u8, a: *const u8) -> u8 {
    unsafe {
        let a = read_u64x2(a);
        let mut out = [0u32; 4];
        let mut saturated = 0u8;
        for i in 0..2 {
            let v = a[i] as i64;
            out[i] = if v > u32::MAX as i64 {
                saturated = 1;
                u32::MAX
            } else if v < 0 {
                saturated = 1;
                0
            } else {
                v as u32
            };
        }
        write_u32x4(result, out);
        saturated
    }
}

pub extern "C" fn narrow64_to_u32_unsigned_sat(result: *mut u8, a: *const u8) -> u8 {
    unsafe {
        let a = read_u64x2(a);
        let mut out = [0u32; 4];
        let mut saturated = 0u8;
        for i in 0..2 {
            out[i] = if a[i] > u32::MAX as u64 {
                saturated = 1;
                u32::MAX
            } else {
                a[i] as u32
            };
        }
        write_u32x4(result, out);
        saturated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call1(f: extern "C" fn(*mut u8, *const u8), a: [u8; 16]) -> [u8; 16] {
        let mut out = [0u8; 16];
        f(out.as_mut_ptr(), a.as_ptr());
        out
    }
    fn call2(
        f: extern "C" fn(*mut u8, *const u8, *const u8),
        a: [u8; 16],
        b: [u8; 16],
    ) -> [u8; 16] {
        let mut out = [0u8; 16];
        f(out.as_mut_ptr(), a.as_ptr(), b.as_ptr());
        out
    }

    #[test]
    fn greater_s64_matches_scenario_2() {
        let mut a = [0u8; 16];
        a[0..8].copy_from_slice(&(-1i64).to_le_bytes());
        a[8..16].copy_from_slice(&1i64.to_le_bytes());
        let mut b = [0u8; 16];
        b[0..8].copy_from_slice(&0i64.to_le_bytes());
        b[8..16].copy_from_slice(&0i64.to_le_bytes());
        let out = call2(greater_s64, a, b);
        let mut expected = [0u8; 16];
        expected[0..8].copy_from_slice(&0xFFFF_FFFF_FFFF_FFFFu64.to_le_bytes());
        assert_eq!(out, expected);
    }

    #[test]
    fn population_count_counts_set_bits_per_byte() {
        let a = [0xFFu8, 0x0F, 0x01, 0, 0xAA, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let out = call1(population_count, a);
        assert_eq!(&out[0..5], &[8, 4, 1, 0, 4]);
    }

    #[test]
    fn polynomial_multiply8_is_carryless() {
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        a[0] = 0b0000_0011;
        b[0] = 0b0000_0101;
        let out = call2(polynomial_multiply8, a, b);
        // 0b11 * 0b101 carryless = 0b11 ^ (0b11 << 2) = 0b1111
        assert_eq!(out[0], 0b0000_1111);
    }

    #[test]
    fn logical_vshift_u8_zeroes_when_shift_at_least_bit_width() {
        let a = [0xFFu8; 16];
        let mut shift = [0u8; 16];
        shift[0] = 8;
        let out = call2(logical_vshift_u8, a, shift);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn logical_vshift_s8_propagates_sign_on_full_negative_shift() {
        let mut a = [0u8; 16];
        a[0] = 0x80; // -128
        let mut shift = [0u8; 16];
        shift[0] = (-8i8) as u8;
        let out = call2(logical_vshift_s8, a, shift);
        assert_eq!(out[0], 0xFF); // arithmetic sign propagation
    }

    #[test]
    fn rounding_shift_left_u8_rounds_half_up() {
        let mut a = [0u8; 16];
        a[0] = 0b0000_0011; // 3
        let mut shift = [0u8; 16];
        shift[0] = (-1i8) as u8; // >>1 with rounding: (3 >> 1) + ((3 >> 0) & 1) = 1 + 1 = 2
        let out = call2(rounding_shift_left_u8, a, shift);
        assert_eq!(out[0], 2);
    }

    fn call1_sat(f: extern "C" fn(*mut u8, *const u8) -> u8, a: [u8; 16]) -> ([u8; 16], u8) {
        let mut out = [0u8; 16];
        let flag = f(out.as_mut_ptr(), a.as_ptr());
        (out, flag)
    }

    #[test]
    fn narrow64_to_i32_signed_sat_clamps_both_directions() {
        let mut a = [0u8; 16];
        a[0..8].copy_from_slice(&(i64::MAX).to_le_bytes());
        a[8..16].copy_from_slice(&(i64::MIN).to_le_bytes());
        let (out, flag) = call1_sat(narrow64_to_i32_signed_sat, a);
        assert_eq!(flag, 1);
        assert_eq!(&out[0..4], &(i32::MAX as u32).to_le_bytes());
        assert_eq!(&out[4..8], &(i32::MIN as u32).to_le_bytes());
        assert_eq!(&out[8..16], &[0u8; 8]);
    }

    #[test]
    fn narrow64_to_i32_signed_sat_passes_through_representable_values() {
        let mut a = [0u8; 16];
        a[0..8].copy_from_slice(&(-5i64).to_le_bytes());
        let (out, flag) = call1_sat(narrow64_to_i32_signed_sat, a);
        assert_eq!(flag, 0);
        assert_eq!(&out[0..4], &(-5i32 as u32).to_le_bytes());
    }

    #[test]
    fn narrow64_to_u32_from_signed_sat_clamps_negative_to_zero() {
        let mut a = [0u8; 16];
        a[0..8].copy_from_slice(&(-1i64).to_le_bytes());
        let (out, flag) = call1_sat(narrow64_to_u32_from_signed_sat, a);
        assert_eq!(flag, 1);
        assert_eq!(&out[0..4], &0u32.to_le_bytes());
    }

    #[test]
    fn narrow64_to_u32_unsigned_sat_clamps_overflow() {
        let mut a = [0u8; 16];
        a[0..8].copy_from_slice(&(u32::MAX as u64 + 1).to_le_bytes());
        let (out, flag) = call1_sat(narrow64_to_u32_unsigned_sat, a);
        assert_eq!(flag, 1);
        assert_eq!(&out[0..4], &u32::MAX.to_le_bytes());
    }
}
