/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Zero-copy reinterpretation of slices of layout-compatible numeric newtypes.
//!
//! Vector compare instructions only exist for primitive element kinds, so a slice of a
//! logically distinct type (an identifier newtype, for example) must be viewed as a slice
//! of its underlying primitive before the kernel can run. That view must not copy, must
//! not change the length, and must be impossible to form for a type whose layout differs
//! from the primitive's.
//!
//! All of the unsafety lives in `bytemuck`: [`Reinterpret`] requires `bytemuck::Pod`, and
//! [`reinterpret`] goes through [`bytemuck::must_cast_slice`], which rejects any size or
//! alignment mismatch at compile time rather than at run time.

use crate::contains::ContainsSimd;

/// An element type whose slices can be scanned as slices of a primitive kind.
///
/// `Prim` names the primitive with the same memory layout as `Self`. For the primitive
/// numeric types themselves, `Prim` is simply `Self`. For a newtype, the implementation
/// asserts that scalar equality on `Self` agrees with scalar equality on `Prim` - true
/// for any `#[repr(transparent)]` wrapper with derived `PartialEq`.
pub trait Reinterpret: bytemuck::Pod {
    type Prim: ContainsSimd + bytemuck::Pod + PartialEq;
}

macro_rules! impl_reinterpret_identity {
    ($($ty:ty),* $(,)?) => {$(
        impl Reinterpret for $ty {
            type Prim = $ty;
        }
    )*};
}

impl_reinterpret_identity!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// View `values` as a slice of the underlying primitive kind.
///
/// Same memory, same length, same lifetime; no allocation. A zero-length slice
/// reinterprets to a zero-length slice.
#[inline]
pub fn reinterpret<T: Reinterpret>(values: &[T]) -> &[T::Prim] {
    bytemuck::must_cast_slice(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contains;

    /// A stand-in for the identifier newtypes callers scan with this crate.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(transparent)]
    struct NodeId(u32);

    // SAFETY: `NodeId` is a transparent wrapper around `u32`; any bit pattern is valid
    // and there is no padding.
    unsafe impl bytemuck::Zeroable for NodeId {}
    // SAFETY: As above.
    unsafe impl bytemuck::Pod for NodeId {}

    impl Reinterpret for NodeId {
        type Prim = u32;
    }

    #[test]
    fn view_preserves_memory_and_length() {
        let ids = [NodeId(3), NodeId(1), NodeId(4), NodeId(1), NodeId(5)];
        let raw = reinterpret(&ids);
        assert_eq!(raw, &[3, 1, 4, 1, 5]);
        assert_eq!(raw.as_ptr() as usize, ids.as_ptr() as usize);
    }

    #[test]
    fn empty_view() {
        let ids: [NodeId; 0] = [];
        assert!(reinterpret(&ids).is_empty());
        assert!(!contains(&ids, NodeId(7)));
    }

    #[test]
    fn newtype_scan_matches_primitive_scan() {
        let raw: Vec<u32> = (0..1000).map(|i| i * 3).collect();
        let ids: Vec<NodeId> = raw.iter().copied().map(NodeId).collect();

        for probe in [0, 3, 1497, 2997, 1, 2, 2998, 3000] {
            assert_eq!(
                contains(&ids, NodeId(probe)),
                contains(&raw, probe),
                "newtype and primitive scans disagree for probe {probe}"
            );
        }
    }
}
