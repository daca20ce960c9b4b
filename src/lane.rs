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
use crate::unsafe_slice::UnsafeSlice;
use std::ops::{Add, Mul, Sub};

#[cfg(all(target_arch = "aarch64", feature = "neon"))]
pub(crate) use crate::neon::F32x4;
#[cfg(all(
    any(target_arch = "x86_64", target_arch = "x86"),
    target_feature = "sse2",
    feature = "sse"
))]
pub(crate) use crate::sse::F32x4;
#[cfg(not(any(
    all(target_arch = "aarch64", feature = "neon"),
    all(
        any(target_arch = "x86_64", target_arch = "x86"),
        target_feature = "sse2",
        feature = "sse"
    )
)))]
pub(crate) use portable::F32x4;

/// Arithmetic unit the recursive filter runs on.
///
/// A lane covers `WIDTH` consecutive interleaved channels of one pixel.
/// Implementations must only differ in data layout, each operation is a plain
/// IEEE single precision operation per channel.
pub(crate) trait IirLane:
    Copy + Send + Sync + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    const WIDTH: usize;

    fn splat(v: f32) -> Self;

    /// Loads `WIDTH` values starting at `offset`, panics when out of bounds.
    fn load(src: &[f32], offset: usize) -> Self;

    /// # Safety
    /// No other thread may write this range concurrently.
    unsafe fn load_shared(src: &UnsafeSlice<'_, f32>, offset: usize) -> Self;

    /// # Safety
    /// No other thread may access this range concurrently.
    unsafe fn store_shared(self, dst: &UnsafeSlice<'_, f32>, offset: usize);

    /// `min(hi, max(self, lo))` per channel.
    fn clamp(self, lo: Self, hi: Self) -> Self;
}

impl IirLane for f32 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline(always)]
    fn load(src: &[f32], offset: usize) -> Self {
        src[offset]
    }

    #[inline(always)]
    unsafe fn load_shared(src: &UnsafeSlice<'_, f32>, offset: usize) -> Self {
        unsafe { src.read(offset) }
    }

    #[inline(always)]
    unsafe fn store_shared(self, dst: &UnsafeSlice<'_, f32>, offset: usize) {
        unsafe { dst.write(offset, self) }
    }

    #[inline(always)]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }
}

#[cfg(not(any(
    all(target_arch = "aarch64", feature = "neon"),
    all(
        any(target_arch = "x86_64", target_arch = "x86"),
        target_feature = "sse2",
        feature = "sse"
    )
)))]
mod portable {
    use super::IirLane;
    use crate::unsafe_slice::UnsafeSlice;
    use std::ops::{Add, Mul, Sub};

    /// Four f32 lanes without explicit intrinsics, left to auto vectorization.
    #[derive(Copy, Clone, Debug, Default, PartialEq)]
    #[repr(C, align(16))]
    pub(crate) struct F32x4(pub(crate) [f32; 4]);

    impl F32x4 {
        #[inline(always)]
        fn map2(self, rhs: Self, op: impl Fn(f32, f32) -> f32) -> Self {
            F32x4([
                op(self.0[0], rhs.0[0]),
                op(self.0[1], rhs.0[1]),
                op(self.0[2], rhs.0[2]),
                op(self.0[3], rhs.0[3]),
            ])
        }
    }

    impl Add for F32x4 {
        type Output = F32x4;
        #[inline(always)]
        fn add(self, rhs: Self) -> Self::Output {
            self.map2(rhs, |a, b| a + b)
        }
    }

    impl Sub for F32x4 {
        type Output = F32x4;
        #[inline(always)]
        fn sub(self, rhs: Self) -> Self::Output {
            self.map2(rhs, |a, b| a - b)
        }
    }

    impl Mul for F32x4 {
        type Output = F32x4;
        #[inline(always)]
        fn mul(self, rhs: Self) -> Self::Output {
            self.map2(rhs, |a, b| a * b)
        }
    }

    impl IirLane for F32x4 {
        const WIDTH: usize = 4;

        #[inline(always)]
        fn splat(v: f32) -> Self {
            F32x4([v; 4])
        }

        #[inline(always)]
        fn load(src: &[f32], offset: usize) -> Self {
            let mut v = [0f32; 4];
            v.copy_from_slice(&src[offset..offset + 4]);
            F32x4(v)
        }

        #[inline(always)]
        unsafe fn load_shared(src: &UnsafeSlice<'_, f32>, offset: usize) -> Self {
            let ptr = src.ptr_at(offset, 4);
            F32x4(unsafe { (ptr as *const [f32; 4]).read_unaligned() })
        }

        #[inline(always)]
        unsafe fn store_shared(self, dst: &UnsafeSlice<'_, f32>, offset: usize) {
            let ptr = dst.ptr_at(offset, 4);
            unsafe { (ptr as *mut [f32; 4]).write_unaligned(self.0) }
        }

        #[inline(always)]
        fn clamp(self, lo: Self, hi: Self) -> Self {
            self.map2(lo, f32::max).map2(hi, f32::min)
        }
    }
}
