//! x86_64 gather loops
//!
//! Each step widens palette indices to 32-bit lanes and gathers the matching
//! palette entries straight into the output row.

use std::arch::x86_64::*;

use super::expand_scalar;

/// AVX2 expansion, 32 pixels per step
pub(super) fn expand_avx2(src: &[u8], palette: &[u32; 256], dst: &mut [u32]) {
    debug_assert!(is_x86_feature_detected!("avx2"));
    // SAFETY: only reachable through `Tier::Avx2`, which requires the CPU to
    // report AVX2.
    unsafe { expand_avx2_inner(src, palette, dst) }
}

#[target_feature(enable = "avx2")]
unsafe fn expand_avx2_inner(src: &[u8], palette: &[u32; 256], dst: &mut [u32]) {
    const STEP: usize = 32;
    const LANES: usize = 8;

    let n = src.len().min(dst.len());
    let table = palette.as_ptr() as *const i32;
    let mut i = 0;

    while i + STEP <= n {
        for lane in (0..STEP).step_by(LANES) {
            // SAFETY: `i + lane + LANES <= n`, and every gathered index is a
            // byte so it stays inside the 256-entry table.
            unsafe {
                let indices = _mm_loadl_epi64(src.as_ptr().add(i + lane) as *const __m128i);
                let offsets = _mm256_cvtepu8_epi32(indices);
                let colors = _mm256_i32gather_epi32::<4>(table, offsets);
                _mm256_storeu_si256(dst.as_mut_ptr().add(i + lane) as *mut __m256i, colors);
            }
        }
        i += STEP;
    }

    expand_scalar(&src[i..n], palette, &mut dst[i..n]);
}

/// AVX-512 expansion, 64 pixels per step
#[cfg(feature = "avx512")]
pub(super) fn expand_avx512(src: &[u8], palette: &[u32; 256], dst: &mut [u32]) {
    debug_assert!(is_x86_feature_detected!("avx512f"));
    // SAFETY: only reachable through `Tier::Avx512`, which requires the CPU to
    // report AVX-512F and AVX-512BW.
    unsafe { expand_avx512_inner(src, palette, dst) }
}

#[cfg(feature = "avx512")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn expand_avx512_inner(src: &[u8], palette: &[u32; 256], dst: &mut [u32]) {
    const STEP: usize = 64;
    const LANES: usize = 16;

    let n = src.len().min(dst.len());
    let table = palette.as_ptr() as *const i32;
    let mut i = 0;

    while i + STEP <= n {
        for lane in (0..STEP).step_by(LANES) {
            // SAFETY: as for the AVX2 loop, 16 indices per load.
            unsafe {
                let indices = _mm_loadu_si128(src.as_ptr().add(i + lane) as *const __m128i);
                let offsets = _mm512_cvtepu8_epi32(indices);
                let colors = _mm512_i32gather_epi32::<4>(offsets, table.cast());
                _mm512_storeu_si512(dst.as_mut_ptr().add(i + lane).cast(), colors);
            }
        }
        i += STEP;
    }

    expand_scalar(&src[i..n], palette, &mut dst[i..n]);
}
