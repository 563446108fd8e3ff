/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! aarch64 membership kernels.
//!
//! NEON is baseline on aarch64, so there is a single 128-bit tier and no runtime
//! detection: a 128-bit main loop followed by a scalar tail.
//!
//! NEON equality masks set every bit of a matching lane, so the any-lane reduction is a
//! horizontal unsigned maximum: non-zero iff some lane matched. There is no `vmaxvq` for
//! 64-bit lanes; those masks are reinterpreted as 32-bit lanes first, which is sound
//! because each half of an all-ones or all-zeros 64-bit lane has the same property.

use std::arch::aarch64::*;

/// One element kind paired with a 128-bit NEON register.
trait Simd128: Copy + PartialEq {
    type Register: Copy;
    const LANES: usize;

    /// Broadcast `value` across all lanes.
    ///
    /// # Safety
    ///
    /// NEON must be available (always true on aarch64).
    unsafe fn splat(value: Self) -> Self::Register;

    /// Load `LANES` elements from `ptr` and return whether any lane equals `target`.
    ///
    /// # Safety
    ///
    /// A contiguous read of `LANES` elements from `ptr` must be valid.
    unsafe fn any_eq(ptr: *const Self, target: Self::Register) -> bool;
}

#[inline(always)]
unsafe fn any_mask8(mask: uint8x16_t) -> bool {
    // SAFETY: NEON is baseline on aarch64.
    unsafe { vmaxvq_u8(mask) != 0 }
}

#[inline(always)]
unsafe fn any_mask16(mask: uint16x8_t) -> bool {
    // SAFETY: NEON is baseline on aarch64.
    unsafe { vmaxvq_u16(mask) != 0 }
}

#[inline(always)]
unsafe fn any_mask32(mask: uint32x4_t) -> bool {
    // SAFETY: NEON is baseline on aarch64.
    unsafe { vmaxvq_u32(mask) != 0 }
}

#[inline(always)]
unsafe fn any_mask64(mask: uint64x2_t) -> bool {
    // SAFETY: NEON is baseline on aarch64. See the module docs for why the
    // reinterpretation is sound.
    unsafe { vmaxvq_u32(vreinterpretq_u32_u64(mask)) != 0 }
}

macro_rules! impl_simd128 {
    ($ty:ty, $register:ty, $lanes:literal, $splat:ident, $load:ident, $cmpeq:ident, $any:ident) => {
        impl Simd128 for $ty {
            type Register = $register;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn splat(value: Self) -> $register {
                // SAFETY: NEON is baseline on aarch64.
                unsafe { $splat(value) }
            }

            #[inline(always)]
            unsafe fn any_eq(ptr: *const Self, target: $register) -> bool {
                // SAFETY: The caller guarantees `LANES` readable elements at `ptr`.
                unsafe { $any($cmpeq($load(ptr), target)) }
            }
        }
    };
}

impl_simd128!(i8, int8x16_t, 16, vmovq_n_s8, vld1q_s8, vceqq_s8, any_mask8);
impl_simd128!(u8, uint8x16_t, 16, vmovq_n_u8, vld1q_u8, vceqq_u8, any_mask8);
impl_simd128!(i16, int16x8_t, 8, vmovq_n_s16, vld1q_s16, vceqq_s16, any_mask16);
impl_simd128!(u16, uint16x8_t, 8, vmovq_n_u16, vld1q_u16, vceqq_u16, any_mask16);
impl_simd128!(i32, int32x4_t, 4, vmovq_n_s32, vld1q_s32, vceqq_s32, any_mask32);
impl_simd128!(u32, uint32x4_t, 4, vmovq_n_u32, vld1q_u32, vceqq_u32, any_mask32);
impl_simd128!(i64, int64x2_t, 2, vmovq_n_s64, vld1q_s64, vceqq_s64, any_mask64);
impl_simd128!(u64, uint64x2_t, 2, vmovq_n_u64, vld1q_u64, vceqq_u64, any_mask64);
// `vceqq` on floats has IEEE-754 value semantics: NaN lanes compare unequal, signed
// zeros compare equal - the same as the scalar tail.
impl_simd128!(f32, float32x4_t, 4, vmovq_n_f32, vld1q_f32, vceqq_f32, any_mask32);
impl_simd128!(f64, float64x2_t, 2, vmovq_n_f64, vld1q_f64, vceqq_f64, any_mask64);

/// 128-bit main loop, scalar tail.
#[inline(always)]
fn find_128<T: Simd128>(haystack: &[T], target: T) -> bool {
    let mut remaining = haystack;

    if remaining.len() >= T::LANES {
        // SAFETY: NEON is baseline on aarch64.
        let wide = unsafe { T::splat(target) };
        while remaining.len() >= T::LANES {
            // SAFETY: We are checking the length before doing this.
            if unsafe { T::any_eq(remaining.as_ptr(), wide) } {
                return true;
            }
            // SAFETY: We are checking the length before doing this.
            remaining = unsafe { remaining.get_unchecked(T::LANES..) };
        }
    }

    // Check the rest.
    remaining.iter().any(|value| *value == target)
}

macro_rules! define_contains {
    ($($ty:ty => $entry:ident),* $(,)?) => {$(
        pub(crate) fn $entry(haystack: &[$ty], target: $ty) -> bool {
            if haystack.is_empty() {
                return false;
            }
            find_128(haystack, target)
        }
    )*};
}

define_contains!(
    i8 => contains_i8,
    u8 => contains_u8,
    i16 => contains_i16,
    u16 => contains_u16,
    i32 => contains_i32,
    u32 => contains_u32,
    i64 => contains_i64,
    u64 => contains_u64,
    f32 => contains_f32,
    f64 => contains_f64,
);
