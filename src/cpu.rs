//! CPU Feature Detection
//!
//! Probed once at startup and handed to anything that picks a SIMD code path.
//! Flags can only be cleared after detection, never set, so a `CpuFeatures`
//! value is always safe to dispatch on.

use log::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    sse2: bool,
    sse41: bool,
    sse42: bool,
    avx: bool,
    avx2: bool,
    avx512f: bool,
    avx512bw: bool,
}

impl CpuFeatures {
    /// Probe the running CPU
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        let features = Self {
            sse2: is_x86_feature_detected!("sse2"),
            sse41: is_x86_feature_detected!("sse4.1"),
            sse42: is_x86_feature_detected!("sse4.2"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
            avx512bw: is_x86_feature_detected!("avx512bw"),
        };
        #[cfg(not(target_arch = "x86_64"))]
        let features = Self::none();

        info!("CPU SIMD support: {}", features.status());
        features
    }

    /// No SIMD at all
    pub const fn none() -> Self {
        Self {
            sse2: false,
            sse41: false,
            sse42: false,
            avx: false,
            avx2: false,
            avx512f: false,
            avx512bw: false,
        }
    }

    #[inline]
    pub fn has_sse2(&self) -> bool {
        self.sse2
    }

    #[inline]
    pub fn has_sse41(&self) -> bool {
        self.sse41
    }

    #[inline]
    pub fn has_sse42(&self) -> bool {
        self.sse42
    }

    #[inline]
    pub fn has_avx(&self) -> bool {
        self.avx
    }

    #[inline]
    pub fn has_avx2(&self) -> bool {
        self.avx2
    }

    /// Foundation plus byte/word instructions
    #[inline]
    pub fn has_avx512(&self) -> bool {
        self.avx512f && self.avx512bw
    }

    pub fn without_avx512(mut self) -> Self {
        self.avx512f = false;
        self.avx512bw = false;
        self
    }

    /// Also drops AVX-512, which implies AVX2
    pub fn without_avx2(self) -> Self {
        let mut features = self.without_avx512();
        features.avx2 = false;
        features
    }

    /// Best instruction set available, for logging and UI
    pub fn status(&self) -> &'static str {
        if self.has_avx512() {
            "AVX-512"
        } else if self.avx2 {
            "AVX2"
        } else if self.avx {
            "AVX"
        } else if self.sse42 {
            "SSE4.2"
        } else if self.sse2 {
            "SSE2"
        } else {
            "None"
        }
    }
}
