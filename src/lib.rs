/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # contains-simd
//!
//! SIMD accelerated membership tests for slices of primitive numeric values. The crate
//! answers exactly one question - "does `target` occur anywhere in `haystack`?" - using
//! hardware vector compare instructions to check many elements per instruction, with a
//! scalar sweep over the tail that does not fill a full vector register.
//!
//! The result is always identical to a naive linear scan: floating point equality follows
//! IEEE-754 value semantics (NaN never matches, `-0.0` matches `0.0`), and there is no
//! positional information in the answer.
//!
//! ## Layers
//!
//! * [`ContainsSimd`]: the per-primitive scan kernel, implemented for the 8/16/32/64-bit
//!   signed and unsigned integers plus `f32` and `f64`. On `x86_64` the widest supported
//!   instruction set (AVX-512, AVX2, or scalar) is detected once at run time and cached;
//!   on `aarch64` the NEON path is used unconditionally; everywhere else the scan degrades
//!   to `<[T]>::contains`.
//!
//! * [`Reinterpret`]: a zero-copy view of a slice of a layout-compatible newtype (for
//!   example a `#[repr(transparent)]` identifier wrapping a `u32`) as a slice of the
//!   underlying primitive, so the kernel can run without copying. Layout compatibility is
//!   enforced at compile time through `bytemuck`.
//!
//! The free function [`contains`] composes the two.
#![cfg_attr(
    not(test),
    warn(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::undocumented_unsafe_blocks
    )
)]

pub mod contains;
pub use contains::ContainsSimd;

mod reinterpret;
pub use reinterpret::{Reinterpret, reinterpret};

/// Return `true` if `target` occurs anywhere in `haystack`.
///
/// The haystack is viewed through the [`Reinterpret`] layer and scanned with the SIMD
/// kernel for the underlying primitive. For primitive element types this is equivalent to
/// calling [`ContainsSimd::contains_simd`] directly.
///
/// ```
/// assert!(contains_simd::contains(&[1u32, 2, 3, 4, 5], 3));
/// assert!(!contains_simd::contains(&[1u32, 2, 3, 4, 5], 9));
/// assert!(!contains_simd::contains::<u32>(&[], 9));
/// ```
#[inline]
pub fn contains<T: Reinterpret>(haystack: &[T], target: T) -> bool {
    T::Prim::contains_simd(reinterpret(haystack), bytemuck::must_cast(target))
}
