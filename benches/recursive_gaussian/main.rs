// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use criterion::{criterion_group, criterion_main, Criterion};
use iirblur::{GaussianOrder, RecursiveGaussian, ThreadingPolicy};
use std::hint::black_box;

fn make_image(width: usize, height: usize, channels: usize) -> Vec<f32> {
    (0..width * height * channels)
        .map(|i| ((i * 7919) % 256) as f32 / 255.)
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let width = 1920usize;
    let height = 1080usize;

    let rgba = make_image(width, height, 4);
    let mut dst = vec![0f32; rgba.len()];

    for (name, policy) in [
        ("single", ThreadingPolicy::Single),
        ("adaptive", ThreadingPolicy::Adaptive),
    ] {
        let mut context = RecursiveGaussian::new(
            width as u32,
            height as u32,
            4,
            &[0.; 4],
            &[1.; 4],
            15.,
            GaussianOrder::Smoothing,
            policy,
        )
        .unwrap();

        c.bench_function(&format!("iirblur: RGBA f32 generic, {name}"), |b| {
            b.iter(|| context.blur(black_box(&rgba), &mut dst));
        });

        c.bench_function(&format!("iirblur: RGBA f32 4 channels, {name}"), |b| {
            b.iter(|| context.blur_4c(black_box(&rgba), &mut dst));
        });
    }

    let plane = make_image(width, height, 1);
    let mut plane_dst = vec![0f32; plane.len()];
    for sigma in [2f32, 50.] {
        let mut context = RecursiveGaussian::new(
            width as u32,
            height as u32,
            1,
            &[0.],
            &[1.],
            sigma,
            GaussianOrder::Smoothing,
            ThreadingPolicy::Adaptive,
        )
        .unwrap();
        c.bench_function(&format!("iirblur: Plane f32 sigma {sigma}"), |b| {
            b.iter(|| context.blur(black_box(&plane), &mut plane_dst));
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
