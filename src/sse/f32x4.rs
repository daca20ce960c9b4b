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
use crate::lane::IirLane;
use crate::unsafe_slice::UnsafeSlice;
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;
use std::ops::{Add, Mul, Sub};

/// Four f32 lanes in a SSE register, one interleaved pixel.
///
/// Compiled only when SSE2 is part of the target, so intrinsics need no runtime dispatch.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub(crate) struct F32x4(__m128);

impl Add for F32x4 {
    type Output = F32x4;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        F32x4(unsafe { _mm_add_ps(self.0, rhs.0) })
    }
}

impl Sub for F32x4 {
    type Output = F32x4;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        F32x4(unsafe { _mm_sub_ps(self.0, rhs.0) })
    }
}

impl Mul for F32x4 {
    type Output = F32x4;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        F32x4(unsafe { _mm_mul_ps(self.0, rhs.0) })
    }
}

impl IirLane for F32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        F32x4(unsafe { _mm_set1_ps(v) })
    }

    #[inline(always)]
    fn load(src: &[f32], offset: usize) -> Self {
        let src = &src[offset..offset + 4];
        F32x4(unsafe { _mm_loadu_ps(src.as_ptr()) })
    }

    #[inline(always)]
    unsafe fn load_shared(src: &UnsafeSlice<'_, f32>, offset: usize) -> Self {
        let ptr = src.ptr_at(offset, 4);
        F32x4(unsafe { _mm_loadu_ps(ptr) })
    }

    #[inline(always)]
    unsafe fn store_shared(self, dst: &UnsafeSlice<'_, f32>, offset: usize) {
        let ptr = dst.ptr_at(offset, 4);
        unsafe { _mm_storeu_ps(ptr, self.0) }
    }

    #[inline(always)]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        F32x4(unsafe { _mm_min_ps(hi.0, _mm_max_ps(self.0, lo.0)) })
    }
}
