//! Runtime CPU feature detection
//!
//! Detection runs once and is cached process-wide; every later query is a
//! plain field read. On non-x86_64 targets all vector features report
//! absent and callers fall back to scalar paths.

use std::sync::OnceLock;

/// CPU feature flags relevant to the scan kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    /// SSE2 (16-byte vector compare) available
    pub has_sse2: bool,
    /// AVX2 (32-byte vector compare) available
    pub has_avx2: bool,
}

impl CpuFeatures {
    /// Feature set with everything disabled (scalar only).
    pub const fn none() -> Self {
        Self {
            has_sse2: false,
            has_avx2: false,
        }
    }

    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                has_sse2: std::arch::is_x86_feature_detected!("sse2"),
                has_avx2: std::arch::is_x86_feature_detected!("avx2"),
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            Self::none()
        }
    }
}

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Get the detected CPU features, probing on first call.
pub fn get_cpu_features() -> &'static CpuFeatures {
    CPU_FEATURES.get_or_init(|| {
        let features = CpuFeatures::detect();
        log::debug!(
            "cpu features: sse2={} avx2={}",
            features.has_sse2,
            features.has_avx2
        );
        features
    })
}
