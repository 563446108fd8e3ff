/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

/// Plain scalar membership scan.
///
/// This is both the path for targets without a SIMD backend and the tail/oracle the
/// vectorized kernels fall back to on hardware lacking vector support.
#[inline]
pub(crate) fn contains<T: PartialEq>(haystack: &[T], target: T) -> bool {
    haystack.contains(&target)
}
