// Dot products for embedding search.
// AVX2/FMA on x86_64, NEON on aarch64, two-accumulator scalar loop elsewhere.
// The kernel is picked per call from the vector length and CPU features, so
// the same inputs on the same machine always take the same path.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Below this length the setup cost outweighs the wide loads
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_DIM_SIZE_SIMD: usize = 16;

/// Dot product of two equally sized slices; 0.0 on length mismatch
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = _mm256_setzero_ps();
    let mut sum2 = _mm256_setzero_ps();

    while i + 15 < dim {
        let va1 = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb1 = _mm256_loadu_ps(b.as_ptr().add(i));
        let va2 = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let vb2 = _mm256_loadu_ps(b.as_ptr().add(i + 8));
        sum1 = _mm256_fmadd_ps(va1, vb1, sum1);
        sum2 = _mm256_fmadd_ps(va2, vb2, sum2);
        i += 16;
    }

    let combined = _mm256_add_ps(sum1, sum2);
    let high = _mm256_extractf128_ps(combined, 1);
    let low = _mm256_castps256_ps128(combined);
    let mut sum = _mm_add_ps(high, low);
    sum = _mm_hadd_ps(sum, sum);
    sum = _mm_hadd_ps(sum, sum);
    let mut dot = _mm_cvtss_f32(sum);

    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut sum1 = vdupq_n_f32(0.0);
    let mut sum2 = vdupq_n_f32(0.0);

    while i + 7 < dim {
        sum1 = vfmaq_f32(sum1, vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        sum2 = vfmaq_f32(sum2, vld1q_f32(a.as_ptr().add(i + 4)), vld1q_f32(b.as_ptr().add(i + 4)));
        i += 8;
    }

    let mut dot = vaddvq_f32(vaddq_f32(sum1, sum2));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let a_chunks = a.chunks_exact(2);
    let tail = a_chunks.remainder();
    for (x, y) in a_chunks.zip(b.chunks_exact(2)) {
        dot0 += x[0] * y[0];
        dot1 += x[1] * y[1];
    }
    if let (Some(x), Some(y)) = (tail.first(), b.last()) {
        dot0 += x * y;
    }

    dot0 + dot1
}

/// Euclidean length
#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v).sqrt()
}
