/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! x86_64 membership kernels.
//!
//! Two hardware tiers are supported, mirroring the usual x86 micro-architecture levels:
//!
//! * V3: AVX2. 256-bit main loop, a single 128-bit step, scalar tail.
//! * V4: AVX-512 (`avx512f` + `avx512bw`). 512-bit main loop using native compare masks,
//!   then a single 256-bit step, a single 128-bit step, and a scalar tail.
//!
//! The tier is detected once per process and cached in an atomic; afterwards each call
//! pays one relaxed load and a branch. Machines without AVX2 use the scalar path.
//!
//! The scan itself is written once, generically, over the small per-width register traits
//! below. Each trait instance is a (element kind, register width) pairing: broadcast the
//! target, load a block, compare lane-wise for equality, and reduce the resulting mask to
//! an any-lane-set test. Performance critical - if you change this, compare with the
//! benchmark.

use std::arch::x86_64::*;
use std::sync::atomic::{AtomicU8, Ordering};

use super::fallback;

////////////////////////////
// Architecture Selection //
////////////////////////////

// We cache a single enum indicating the detected tier. Tiers are numbered in ascending
// order of capability so compatibility checks could be done with a `>=` comparison.
static ARCH_NUMBER: AtomicU8 = AtomicU8::new(ARCH_UNINITIALIZED);

const ARCH_UNINITIALIZED: u8 = 0;
const ARCH_SCALAR: u8 = 1;
const ARCH_V3: u8 = 2;
const ARCH_V4: u8 = 3;

#[inline(always)]
fn get_or_resolve_arch() -> u8 {
    let version = ARCH_NUMBER.load(Ordering::Relaxed);
    if version == ARCH_UNINITIALIZED {
        resolve_architecture()
    } else {
        version
    }
}

#[inline(never)]
fn resolve_architecture() -> u8 {
    let arch = if is_x86_feature_detected!("avx2") {
        if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw") {
            ARCH_V4
        } else {
            ARCH_V3
        }
    } else {
        ARCH_SCALAR
    };
    ARCH_NUMBER.store(arch, Ordering::Relaxed);
    arch
}

////////////////////
// Register pairs //
////////////////////

/// One element kind paired with a 128-bit register.
trait Simd128: Copy + PartialEq {
    type Register: Copy;
    const LANES: usize;

    /// Broadcast `value` across all lanes.
    ///
    /// # Safety
    ///
    /// The caller must ensure the CPU supports the instruction set this pairing uses.
    unsafe fn splat(value: Self) -> Self::Register;

    /// Load `LANES` elements from `ptr` and return whether any lane equals `target`.
    ///
    /// # Safety
    ///
    /// A contiguous read of `LANES` elements from `ptr` must be valid, and the caller
    /// must ensure the CPU supports the instruction set this pairing uses.
    unsafe fn any_eq(ptr: *const Self, target: Self::Register) -> bool;
}

/// One element kind paired with a 256-bit register.
trait Simd256: Copy + PartialEq {
    type Register: Copy;
    const LANES: usize;

    /// # Safety
    ///
    /// See [`Simd128::splat`].
    unsafe fn splat(value: Self) -> Self::Register;

    /// # Safety
    ///
    /// See [`Simd128::any_eq`].
    unsafe fn any_eq(ptr: *const Self, target: Self::Register) -> bool;
}

/// One element kind paired with a 512-bit register.
trait Simd512: Copy + PartialEq {
    type Register: Copy;
    const LANES: usize;

    /// # Safety
    ///
    /// See [`Simd128::splat`].
    unsafe fn splat(value: Self) -> Self::Register;

    /// # Safety
    ///
    /// See [`Simd128::any_eq`].
    unsafe fn any_eq(ptr: *const Self, target: Self::Register) -> bool;
}

//////////////////////
// Mask reductions  //
//////////////////////

#[inline(always)]
unsafe fn any_byte_128(comparison: __m128i) -> bool {
    // SAFETY: Caller ensures SSE2.
    unsafe { _mm_movemask_epi8(comparison) != 0 }
}

#[inline(always)]
unsafe fn any_lane32_128(comparison: __m128i) -> bool {
    // SAFETY: Caller ensures SSE2. Cast and compare through the float domain - small
    // latency win.
    unsafe { _mm_movemask_ps(_mm_castsi128_ps(comparison)) != 0 }
}

#[inline(always)]
unsafe fn any_lane64_128(comparison: __m128i) -> bool {
    // SAFETY: Caller ensures SSE2.
    unsafe { _mm_movemask_pd(_mm_castsi128_pd(comparison)) != 0 }
}

#[inline(always)]
unsafe fn any_byte_256(comparison: __m256i) -> bool {
    // SAFETY: Caller ensures AVX2.
    unsafe { _mm256_movemask_epi8(comparison) != 0 }
}

#[inline(always)]
unsafe fn any_lane32_256(comparison: __m256i) -> bool {
    // SAFETY: Caller ensures AVX2. Cast and compare through the float domain - small
    // latency win.
    // https://www.intel.com/content/www/us/en/docs/intrinsics-guide/index.html#text=_mm256_movemask
    unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(comparison)) != 0 }
}

#[inline(always)]
unsafe fn any_lane64_256(comparison: __m256i) -> bool {
    // SAFETY: Caller ensures AVX2.
    unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(comparison)) != 0 }
}

//////////////////////////
// Integer trait stamps //
//////////////////////////

macro_rules! impl_simd128_int {
    ($ty:ty, $lanes:literal, $splat:ident, $cmpeq:ident, $any:ident) => {
        impl Simd128 for $ty {
            type Register = __m128i;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn splat(value: Self) -> __m128i {
                // SAFETY: Caller ensures SSE2/SSE4.1 (implied by the AVX2 tier).
                unsafe { $splat(value as _) }
            }

            #[inline(always)]
            unsafe fn any_eq(ptr: *const Self, target: __m128i) -> bool {
                // SAFETY: Caller guarantees `LANES` readable elements at `ptr` and the
                // required instruction set.
                unsafe {
                    let block = _mm_loadu_si128(ptr as *const __m128i);
                    $any($cmpeq(block, target))
                }
            }
        }
    };
}

macro_rules! impl_simd256_int {
    ($ty:ty, $lanes:literal, $splat:ident, $cmpeq:ident, $any:ident) => {
        impl Simd256 for $ty {
            type Register = __m256i;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn splat(value: Self) -> __m256i {
                // SAFETY: Caller ensures AVX2.
                unsafe { $splat(value as _) }
            }

            #[inline(always)]
            unsafe fn any_eq(ptr: *const Self, target: __m256i) -> bool {
                // SAFETY: Caller guarantees `LANES` readable elements at `ptr` and AVX2.
                unsafe {
                    let block = _mm256_loadu_si256(ptr as *const __m256i);
                    $any($cmpeq(block, target))
                }
            }
        }
    };
}

macro_rules! impl_simd512_int {
    ($ty:ty, $lanes:literal, $splat:ident, $cmpeq:ident) => {
        impl Simd512 for $ty {
            type Register = __m512i;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn splat(value: Self) -> __m512i {
                // SAFETY: Caller ensures AVX-512.
                unsafe { $splat(value as _) }
            }

            #[inline(always)]
            unsafe fn any_eq(ptr: *const Self, target: __m512i) -> bool {
                // SAFETY: Caller guarantees `LANES` readable elements at `ptr` and
                // AVX-512. The compare intrinsics produce a bit mask directly.
                unsafe {
                    let block = _mm512_loadu_si512(ptr as *const _);
                    $cmpeq(block, target) != 0
                }
            }
        }
    };
}

impl_simd128_int!(i8, 16, _mm_set1_epi8, _mm_cmpeq_epi8, any_byte_128);
impl_simd128_int!(u8, 16, _mm_set1_epi8, _mm_cmpeq_epi8, any_byte_128);
impl_simd128_int!(i16, 8, _mm_set1_epi16, _mm_cmpeq_epi16, any_byte_128);
impl_simd128_int!(u16, 8, _mm_set1_epi16, _mm_cmpeq_epi16, any_byte_128);
impl_simd128_int!(i32, 4, _mm_set1_epi32, _mm_cmpeq_epi32, any_lane32_128);
impl_simd128_int!(u32, 4, _mm_set1_epi32, _mm_cmpeq_epi32, any_lane32_128);
impl_simd128_int!(i64, 2, _mm_set1_epi64x, _mm_cmpeq_epi64, any_lane64_128);
impl_simd128_int!(u64, 2, _mm_set1_epi64x, _mm_cmpeq_epi64, any_lane64_128);

impl_simd256_int!(i8, 32, _mm256_set1_epi8, _mm256_cmpeq_epi8, any_byte_256);
impl_simd256_int!(u8, 32, _mm256_set1_epi8, _mm256_cmpeq_epi8, any_byte_256);
impl_simd256_int!(i16, 16, _mm256_set1_epi16, _mm256_cmpeq_epi16, any_byte_256);
impl_simd256_int!(u16, 16, _mm256_set1_epi16, _mm256_cmpeq_epi16, any_byte_256);
impl_simd256_int!(i32, 8, _mm256_set1_epi32, _mm256_cmpeq_epi32, any_lane32_256);
impl_simd256_int!(u32, 8, _mm256_set1_epi32, _mm256_cmpeq_epi32, any_lane32_256);
impl_simd256_int!(i64, 4, _mm256_set1_epi64x, _mm256_cmpeq_epi64, any_lane64_256);
impl_simd256_int!(u64, 4, _mm256_set1_epi64x, _mm256_cmpeq_epi64, any_lane64_256);

impl_simd512_int!(i8, 64, _mm512_set1_epi8, _mm512_cmpeq_epi8_mask);
impl_simd512_int!(u8, 64, _mm512_set1_epi8, _mm512_cmpeq_epi8_mask);
impl_simd512_int!(i16, 32, _mm512_set1_epi16, _mm512_cmpeq_epi16_mask);
impl_simd512_int!(u16, 32, _mm512_set1_epi16, _mm512_cmpeq_epi16_mask);
impl_simd512_int!(i32, 16, _mm512_set1_epi32, _mm512_cmpeq_epi32_mask);
impl_simd512_int!(u32, 16, _mm512_set1_epi32, _mm512_cmpeq_epi32_mask);
impl_simd512_int!(i64, 8, _mm512_set1_epi64, _mm512_cmpeq_epi64_mask);
impl_simd512_int!(u64, 8, _mm512_set1_epi64, _mm512_cmpeq_epi64_mask);

/////////////////////////////
// Floating point pairings //
/////////////////////////////

// Floats use the ordered, non-signaling equality predicate: NaN compares unequal to
// everything (itself included) and signed zeros compare equal, matching scalar `==`.

impl Simd128 for f32 {
    type Register = __m128;
    const LANES: usize = 4;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m128 {
        // SAFETY: Caller ensures SSE.
        unsafe { _mm_set1_ps(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m128) -> bool {
        // SAFETY: Caller guarantees 4 readable `f32`s at `ptr` and SSE support.
        unsafe {
            let block = _mm_loadu_ps(ptr);
            _mm_movemask_ps(_mm_cmpeq_ps(block, target)) != 0
        }
    }
}

impl Simd128 for f64 {
    type Register = __m128d;
    const LANES: usize = 2;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m128d {
        // SAFETY: Caller ensures SSE2.
        unsafe { _mm_set1_pd(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m128d) -> bool {
        // SAFETY: Caller guarantees 2 readable `f64`s at `ptr` and SSE2 support.
        unsafe {
            let block = _mm_loadu_pd(ptr);
            _mm_movemask_pd(_mm_cmpeq_pd(block, target)) != 0
        }
    }
}

impl Simd256 for f32 {
    type Register = __m256;
    const LANES: usize = 8;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m256 {
        // SAFETY: Caller ensures AVX.
        unsafe { _mm256_set1_ps(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m256) -> bool {
        // SAFETY: Caller guarantees 8 readable `f32`s at `ptr` and AVX support.
        unsafe {
            let block = _mm256_loadu_ps(ptr);
            _mm256_movemask_ps(_mm256_cmp_ps::<_CMP_EQ_OQ>(block, target)) != 0
        }
    }
}

impl Simd256 for f64 {
    type Register = __m256d;
    const LANES: usize = 4;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m256d {
        // SAFETY: Caller ensures AVX.
        unsafe { _mm256_set1_pd(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m256d) -> bool {
        // SAFETY: Caller guarantees 4 readable `f64`s at `ptr` and AVX support.
        unsafe {
            let block = _mm256_loadu_pd(ptr);
            _mm256_movemask_pd(_mm256_cmp_pd::<_CMP_EQ_OQ>(block, target)) != 0
        }
    }
}

impl Simd512 for f32 {
    type Register = __m512;
    const LANES: usize = 16;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m512 {
        // SAFETY: Caller ensures AVX-512.
        unsafe { _mm512_set1_ps(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m512) -> bool {
        // SAFETY: Caller guarantees 16 readable `f32`s at `ptr` and AVX-512 support.
        unsafe {
            let block = _mm512_loadu_ps(ptr);
            _mm512_cmp_ps_mask::<_CMP_EQ_OQ>(block, target) != 0
        }
    }
}

impl Simd512 for f64 {
    type Register = __m512d;
    const LANES: usize = 8;

    #[inline(always)]
    unsafe fn splat(value: Self) -> __m512d {
        // SAFETY: Caller ensures AVX-512.
        unsafe { _mm512_set1_pd(value) }
    }

    #[inline(always)]
    unsafe fn any_eq(ptr: *const Self, target: __m512d) -> bool {
        // SAFETY: Caller guarantees 8 readable `f64`s at `ptr` and AVX-512 support.
        unsafe {
            let block = _mm512_loadu_pd(ptr);
            _mm512_cmp_pd_mask::<_CMP_EQ_OQ>(block, target) != 0
        }
    }
}

/////////////////////
// Generic drivers //
/////////////////////

/// 256-bit main loop, one 128-bit step, scalar tail.
///
/// # Safety
///
/// Must only be invoked from a context where AVX2 is known to be available.
#[inline(always)]
unsafe fn find_256<T>(haystack: &[T], target: T) -> bool
where
    T: Simd256 + Simd128,
{
    let mut remaining = haystack;

    if remaining.len() >= <T as Simd256>::LANES {
        // SAFETY: The caller ensures AVX2.
        let wide = unsafe { <T as Simd256>::splat(target) };
        while remaining.len() >= <T as Simd256>::LANES {
            // SAFETY: We are checking the length before doing this.
            if unsafe { <T as Simd256>::any_eq(remaining.as_ptr(), wide) } {
                return true;
            }
            // SAFETY: We are checking the length before doing this.
            remaining = unsafe { remaining.get_unchecked(<T as Simd256>::LANES..) };
        }
    }

    // At most one 128-bit step remains. Note use of `if` instead of `while`.
    if remaining.len() >= <T as Simd128>::LANES {
        // SAFETY: The caller ensures AVX2, which implies what the 128-bit pairing needs.
        let narrow = unsafe { <T as Simd128>::splat(target) };
        // SAFETY: We are checking the length before doing this.
        if unsafe { <T as Simd128>::any_eq(remaining.as_ptr(), narrow) } {
            return true;
        }
        // SAFETY: We are checking the length before doing this.
        remaining = unsafe { remaining.get_unchecked(<T as Simd128>::LANES..) };
    }

    // Check the rest.
    remaining.iter().any(|value| *value == target)
}

/// 512-bit main loop, one 256-bit step, one 128-bit step, scalar tail.
///
/// # Safety
///
/// Must only be invoked from a context where AVX-512 (F and BW) and AVX2 are known to be
/// available.
#[inline(always)]
unsafe fn find_512<T>(haystack: &[T], target: T) -> bool
where
    T: Simd512 + Simd256 + Simd128,
{
    let mut remaining = haystack;

    if remaining.len() >= <T as Simd512>::LANES {
        // SAFETY: The caller ensures AVX-512.
        let widest = unsafe { <T as Simd512>::splat(target) };
        while remaining.len() >= <T as Simd512>::LANES {
            // SAFETY: We are checking the length before doing this.
            if unsafe { <T as Simd512>::any_eq(remaining.as_ptr(), widest) } {
                return true;
            }
            // SAFETY: We are checking the length before doing this.
            remaining = unsafe { remaining.get_unchecked(<T as Simd512>::LANES..) };
        }
    }

    if remaining.len() >= <T as Simd256>::LANES {
        // SAFETY: The caller ensures AVX2.
        let wide = unsafe { <T as Simd256>::splat(target) };
        // SAFETY: We are checking the length before doing this.
        if unsafe { <T as Simd256>::any_eq(remaining.as_ptr(), wide) } {
            return true;
        }
        // SAFETY: We are checking the length before doing this.
        remaining = unsafe { remaining.get_unchecked(<T as Simd256>::LANES..) };
    }

    if remaining.len() >= <T as Simd128>::LANES {
        // SAFETY: The caller ensures AVX2, which implies what the 128-bit pairing needs.
        let narrow = unsafe { <T as Simd128>::splat(target) };
        // SAFETY: We are checking the length before doing this.
        if unsafe { <T as Simd128>::any_eq(remaining.as_ptr(), narrow) } {
            return true;
        }
        // SAFETY: We are checking the length before doing this.
        remaining = unsafe { remaining.get_unchecked(<T as Simd128>::LANES..) };
    }

    remaining.iter().any(|value| *value == target)
}

////////////////////////
// Per-type dispatch  //
////////////////////////

macro_rules! define_contains {
    ($ty:ty, $entry:ident, $v3:ident, $v4:ident) => {
        #[target_feature(enable = "avx2")]
        unsafe fn $v3(haystack: &[$ty], target: $ty) -> bool {
            // SAFETY: The target features of this function satisfy `find_256`.
            unsafe { find_256(haystack, target) }
        }

        #[target_feature(enable = "avx512f,avx512bw,avx2")]
        unsafe fn $v4(haystack: &[$ty], target: $ty) -> bool {
            // SAFETY: The target features of this function satisfy `find_512`.
            unsafe { find_512(haystack, target) }
        }

        pub(crate) fn $entry(haystack: &[$ty], target: $ty) -> bool {
            // Empty slices never touch memory nor the dispatcher.
            if haystack.is_empty() {
                return false;
            }
            match get_or_resolve_arch() {
                // SAFETY: Architecture resolution has determined that the current
                // machine supports AVX-512.
                ARCH_V4 => unsafe { $v4(haystack, target) },
                // SAFETY: Architecture resolution has determined that the current
                // machine supports AVX2.
                ARCH_V3 => unsafe { $v3(haystack, target) },
                _ => fallback::contains(haystack, target),
            }
        }
    };
}

define_contains!(i8, contains_i8, contains_i8_v3, contains_i8_v4);
define_contains!(u8, contains_u8, contains_u8_v3, contains_u8_v4);
define_contains!(i16, contains_i16, contains_i16_v3, contains_i16_v4);
define_contains!(u16, contains_u16, contains_u16_v3, contains_u16_v4);
define_contains!(i32, contains_i32, contains_i32_v3, contains_i32_v4);
define_contains!(u32, contains_u32, contains_u32_v3, contains_u32_v4);
define_contains!(i64, contains_i64, contains_i64_v3, contains_i64_v4);
define_contains!(u64, contains_u64, contains_u64_v3, contains_u64_v4);
define_contains!(f32, contains_f32, contains_f32_v3, contains_f32_v4);
define_contains!(f64, contains_f64, contains_f64_v3, contains_f64_v4);
