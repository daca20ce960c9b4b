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

#![no_main]

use arbitrary::Arbitrary;
use iirblur::{GaussianOrder, RecursiveGaussian, ThreadingPolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    channels: u8,
    sigma: f32,
    order: u8,
    value: f32,
}

fuzz_target!(|data: Input| {
    fuzz_image(
        data.width as u32,
        data.height as u32,
        data.channels as usize % 5,
        data.sigma,
        GaussianOrder::from(data.order as usize % 3),
        data.value,
    );
});

fn fuzz_image(
    width: u32,
    height: u32,
    channels: usize,
    sigma: f32,
    order: GaussianOrder,
    value: f32,
) {
    let context = RecursiveGaussian::new(
        width,
        height,
        channels,
        &vec![0.; channels],
        &vec![1.; channels],
        sigma,
        order,
        ThreadingPolicy::Single,
    );
    let Ok(mut context) = context else {
        return;
    };

    let src = vec![value; context.buffer_len()];
    let mut dst = vec![0f32; context.buffer_len()];
    context.blur(&src, &mut dst);
    assert!(dst.iter().all(|v| v.is_finite()));
    if channels == 4 {
        let mut dst_4c = vec![0f32; context.buffer_len()];
        context.blur_4c(&src, &mut dst_4c);
        assert!(dst_4c.iter().all(|v| v.is_finite()));
    }
}
