/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */
use contains_simd::ContainsSimd;
use criterion::{Criterion, black_box};
use rand::{Rng, SeedableRng, distr::Uniform, prelude::Distribution, rngs::StdRng};

// Three haystack lengths per type so the vectorized loop, the narrower steps, and the
// scalar tail all show up in the measurement. The probe value is absent, forcing a full
// scan every iteration.

pub(crate) fn benchmark_contains_u32(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains/u32");
    let data1 = random_content::<u32>(73);
    let data2 = random_content::<u32>(31);
    let data3 = random_content::<u32>(97);

    group.bench_function("Contains [Vectorized]", |f| {
        f.iter(|| {
            black_box(u32::contains_simd(black_box(&data1), 101));
            black_box(u32::contains_simd(black_box(&data2), 101));
            black_box(u32::contains_simd(black_box(&data3), 101))
        })
    });
}

pub(crate) fn benchmark_contains_u64(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains/u64");
    let data1 = random_content::<u64>(73);
    let data2 = random_content::<u64>(31);
    let data3 = random_content::<u64>(97);

    group.bench_function("Contains [Vectorized]", |f| {
        f.iter(|| {
            black_box(u64::contains_simd(black_box(&data1), 101));
            black_box(u64::contains_simd(black_box(&data2), 101));
            black_box(u64::contains_simd(black_box(&data3), 101))
        })
    });
}

pub(crate) fn benchmark_contains_u8(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains/u8");
    let data1 = random_content::<u8>(73);
    let data2 = random_content::<u8>(31);
    let data3 = random_content::<u8>(97);

    group.bench_function("Contains [Vectorized]", |f| {
        f.iter(|| {
            black_box(u8::contains_simd(black_box(&data1), 101));
            black_box(u8::contains_simd(black_box(&data2), 101));
            black_box(u8::contains_simd(black_box(&data3), 101))
        })
    });
}

pub(crate) fn benchmark_contains_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains/f32");
    let data1: Box<[f32]> = random_content::<u32>(73).iter().map(|&v| v as f32).collect();
    let data2: Box<[f32]> = random_content::<u32>(31).iter().map(|&v| v as f32).collect();
    let data3: Box<[f32]> = random_content::<u32>(97).iter().map(|&v| v as f32).collect();

    group.bench_function("Contains [Vectorized]", |f| {
        f.iter(|| {
            black_box(f32::contains_simd(black_box(&data1), 101.0));
            black_box(f32::contains_simd(black_box(&data2), 101.0));
            black_box(f32::contains_simd(black_box(&data3), 101.0))
        })
    });
}

fn random_content<T>(seed: u8) -> Box<[T]>
where
    T: TryFrom<u32> + Copy,
    <T as TryFrom<u32>>::Error: std::fmt::Debug,
{
    let seed: [u8; 32] = [seed; 32]; // Constant seed of a random number.
    let mut rng: StdRng = SeedableRng::from_seed(seed);
    let range = Uniform::new(0u32, 100).unwrap();
    let len = rng.random_range(0..100);

    (0..len)
        .map(|_| range.sample(&mut rng).try_into().unwrap())
        .collect::<Vec<T>>()
        .into_boxed_slice()
}
