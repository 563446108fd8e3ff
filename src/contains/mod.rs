/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! SIMD accelerated membership tests.
//!
//! One backend is compiled per target architecture; each exposes a `contains_*` entry
//! point per primitive element kind, and [`ContainsSimd`] fans out to them.

// The scalar path doubles as the run-time fallback tier on x86_64 and as the whole story
// on targets without a SIMD backend.
#[cfg_attr(target_arch = "aarch64", allow(dead_code))]
mod fallback;

/// A SIMD-accelerated version of
/// [`std::slice::contains`](https://doc.rust-lang.org/std/primitive.slice.html#method.contains)
///
/// The answer is existence-only and always equals what a naive linear scan would return:
/// floating point equality is IEEE-754 value equality (NaN never matches, `-0.0` matches
/// `0.0`), the empty slice never contains anything, and no memory beyond the slice is
/// ever read.
pub trait ContainsSimd: Sized {
    fn contains_simd(haystack: &[Self], target: Self) -> bool;
}

#[allow(unused_macros)]
macro_rules! impl_contains_simd {
    ($backend:ident) => {
        impl_contains_simd!(@one $backend, i8, contains_i8);
        impl_contains_simd!(@one $backend, u8, contains_u8);
        impl_contains_simd!(@one $backend, i16, contains_i16);
        impl_contains_simd!(@one $backend, u16, contains_u16);
        impl_contains_simd!(@one $backend, i32, contains_i32);
        impl_contains_simd!(@one $backend, u32, contains_u32);
        impl_contains_simd!(@one $backend, i64, contains_i64);
        impl_contains_simd!(@one $backend, u64, contains_u64);
        impl_contains_simd!(@one $backend, f32, contains_f32);
        impl_contains_simd!(@one $backend, f64, contains_f64);
    };
    (@one $backend:ident, $ty:ty, $entry:ident) => {
        impl ContainsSimd for $ty {
            #[inline]
            fn contains_simd(haystack: &[Self], target: Self) -> bool {
                $backend::$entry(haystack, target)
            }
        }
    };
}

#[allow(unused_macros)]
macro_rules! impl_contains_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl ContainsSimd for $ty {
            #[inline]
            fn contains_simd(haystack: &[Self], target: Self) -> bool {
                fallback::contains(haystack, target)
            }
        }
    )*};
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        mod x86_64;
        impl_contains_simd!(x86_64);
    } else if #[cfg(target_arch = "aarch64")] {
        mod aarch64;
        impl_contains_simd!(aarch64);
    } else {
        impl_contains_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);
    }
}
