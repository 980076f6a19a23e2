//! Component A — CPU Feature Oracle.
//!
//! A pure static map from feature tags to booleans, initialised once from
//! host CPUID (via `raw-cpuid`, the same crate the sibling `cranelift-native`
//! backend uses to detect host capabilities). No side effects past
//! construction.

use bitflags::bitflags;

bitflags! {
    /// The subset of host SIMD capability this crate's emitters care about.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct CpuFeatures: u32 {
        const SSE3            = 1 << 0;
        const SSSE3           = 1 << 1;
        const SSE4_1          = 1 << 2;
        const SSE4_2          = 1 << 3;
        const AVX             = 1 << 4;
        const AVX2            = 1 << 5;
        const AVX512F         = 1 << 6;
        const AVX512VL        = 1 << 7;
        const AVX512BW        = 1 << 8;
        const AVX512DQ        = 1 << 9;
        const AVX512_BITALG   = 1 << 10;
    }
}

impl CpuFeatures {
    /// Query the host CPU via CPUID and build the feature set actually
    /// usable by this crate's emitters.
    ///
    /// AVX-512 bits are only ever set here when the `avx512` cargo feature
    /// is enabled (see `src/lib.rs`); the oracle degrades the crate to its
    /// AVX2/SSE4 lowering paths otherwise, regardless of what the host
    /// actually supports.
    pub fn host() -> Self {
        let cpuid = raw_cpuid::CpuId::new();
        let mut features = CpuFeatures::empty();

        if let Some(info) = cpuid.get_feature_info() {
            features.set(CpuFeatures::SSE3, info.has_sse3());
            features.set(CpuFeatures::SSSE3, info.has_ssse3());
            features.set(CpuFeatures::SSE4_1, info.has_sse41());
            features.set(CpuFeatures::SSE4_2, info.has_sse42());
            features.set(CpuFeatures::AVX, info.has_avx());
        }

        if let Some(info) = cpuid.get_extended_feature_info() {
            features.set(CpuFeatures::AVX2, info.has_avx2());

            if cfg!(feature = "avx512") {
                features.set(CpuFeatures::AVX512F, info.has_avx512f());
                features.set(CpuFeatures::AVX512VL, info.has_avx512vl());
                features.set(CpuFeatures::AVX512BW, info.has_avx512bw());
                features.set(CpuFeatures::AVX512DQ, info.has_avx512dq());
                features.set(CpuFeatures::AVX512_BITALG, info.has_avx512_bitalg());
            }
        }

        log::debug!("detected host CPU features: {features:?}");
        features
    }

    /// Build a feature set from an explicit bit pattern, bypassing CPUID.
    ///
    /// Used by cross-path-equivalence tests to force emission down every
    /// supported lowering strategy on the same host.
    pub fn from_bits_truncate(bits: u32) -> Self {
        Self::from_bits_truncate_impl(bits)
    }

    fn from_bits_truncate_impl(bits: u32) -> Self {
        <Self as bitflags::Flags>::from_bits_truncate(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_subset_never_implies_unset_prerequisite() {
        // A forced "AVX2 only" mask must not silently imply SSE4.2 unless
        // explicitly included - the oracle makes no feature-implication
        // assumptions, each bit is independent.
        let f = CpuFeatures::from_bits_truncate(CpuFeatures::AVX2.bits());
        assert!(f.contains(CpuFeatures::AVX2));
        assert!(!f.contains(CpuFeatures::SSE4_2));
    }

    #[test]
    fn empty_is_scalar_fallback_only() {
        let f = CpuFeatures::empty();
        assert!(!f.contains(CpuFeatures::SSE3));
        assert!(!f.contains(CpuFeatures::AVX512F));
    }
}
