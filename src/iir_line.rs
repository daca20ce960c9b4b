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
use crate::coefficients::IirCoefficients;
use crate::lane::IirLane;
use crate::unsafe_slice::UnsafeSlice;
use std::ops::Range;

/// Recursion coefficients broadcast to every channel of a lane.
#[derive(Copy, Clone)]
pub(crate) struct LaneCoefficients<V> {
    a0: V,
    a1: V,
    a2: V,
    a3: V,
    b1: V,
    b2: V,
    coefp: V,
    coefn: V,
}

impl<V: IirLane> LaneCoefficients<V> {
    pub(crate) fn new(c: &IirCoefficients<f32>) -> LaneCoefficients<V> {
        LaneCoefficients {
            a0: V::splat(c.a0),
            a1: V::splat(c.a1),
            a2: V::splat(c.a2),
            a3: V::splat(c.a3),
            b1: V::splat(c.b1),
            b2: V::splat(c.b2),
            coefp: V::splat(c.coefp),
            coefn: V::splat(c.coefn),
        }
    }
}

/// Shape of an interleaved image buffer.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Layout {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) channels: usize,
}

impl Layout {
    #[inline]
    pub(crate) fn row_stride(&self) -> usize {
        self.width * self.channels
    }
}

/// Runs the causal and anti-causal recursions over one line of `count` samples
/// located `step` items apart, starting at `start`, and stores their sum into `dst`.
///
/// Every tap input is clamped to `[lo, hi]`. Both sweeps are seeded with the
/// steady state of a signal that repeats the edge sample.
///
/// # Safety
/// No other thread may access the line in `dst` while it is filtered.
#[inline(always)]
pub(crate) unsafe fn filter_line<V: IirLane>(
    src: &[f32],
    dst: &UnsafeSlice<'_, f32>,
    start: usize,
    step: usize,
    count: usize,
    c: &LaneCoefficients<V>,
    lo: V,
    hi: V,
) {
    if count == 0 {
        return;
    }

    let mut xp = V::load(src, start).clamp(lo, hi);
    let mut yb = c.coefp * xp;
    let mut yp = yb;

    for n in 0..count {
        let offset = start + n * step;
        let xc = V::load(src, offset).clamp(lo, hi);
        let yc = c.a0 * xc + (c.a1 * xp - (c.b1 * yp + c.b2 * yb));
        unsafe {
            yc.store_shared(dst, offset);
        }
        xp = xc;
        yb = yp;
        yp = yc;
    }

    let last = start + (count - 1) * step;
    let mut xn = V::load(src, last).clamp(lo, hi);
    let mut xa = xn;
    let mut yn = c.coefn * xn;
    let mut ya = yn;

    for n in (0..count).rev() {
        let offset = start + n * step;
        let xc = V::load(src, offset).clamp(lo, hi);
        let yc = c.a2 * xn + (c.a3 * xa - (c.b1 * yn + c.b2 * ya));
        xa = xn;
        xn = xc;
        ya = yn;
        yn = yc;
        unsafe {
            let acc = V::load_shared(dst, offset) + yc;
            acc.store_shared(dst, offset);
        }
    }
}

/// Filters columns `columns` top to bottom, `V::WIDTH` channels at a time.
///
/// # Safety
/// Column ranges handed to concurrent workers must not overlap.
pub(crate) unsafe fn vertical_pass<V: IirLane>(
    src: &[f32],
    dst: &UnsafeSlice<'_, f32>,
    layout: Layout,
    columns: Range<usize>,
    coeffs: &LaneCoefficients<V>,
    clamp_min: &[f32],
    clamp_max: &[f32],
) {
    let stride = layout.row_stride();
    for x in columns {
        for cn in (0..layout.channels).step_by(V::WIDTH) {
            let lo = V::load(clamp_min, cn);
            let hi = V::load(clamp_max, cn);
            unsafe {
                filter_line(
                    src,
                    dst,
                    x * layout.channels + cn,
                    stride,
                    layout.height,
                    coeffs,
                    lo,
                    hi,
                );
            }
        }
    }
}

/// Filters rows `rows` left to right, `V::WIDTH` channels at a time.
///
/// # Safety
/// Row ranges handed to concurrent workers must not overlap.
pub(crate) unsafe fn horizontal_pass<V: IirLane>(
    src: &[f32],
    dst: &UnsafeSlice<'_, f32>,
    layout: Layout,
    rows: Range<usize>,
    coeffs: &LaneCoefficients<V>,
    clamp_min: &[f32],
    clamp_max: &[f32],
) {
    let stride = layout.row_stride();
    for y in rows {
        for cn in (0..layout.channels).step_by(V::WIDTH) {
            let lo = V::load(clamp_min, cn);
            let hi = V::load(clamp_max, cn);
            unsafe {
                filter_line(
                    src,
                    dst,
                    y * stride + cn,
                    layout.channels,
                    layout.width,
                    coeffs,
                    lo,
                    hi,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaussian_order::GaussianOrder;

    fn filter_1d(src: &[f32], sigma: f32, order: GaussianOrder, lo: f32, hi: f32) -> Vec<f32> {
        let c = LaneCoefficients::<f32>::new(&IirCoefficients::new(sigma, order));
        let mut dst = vec![0f32; src.len()];
        let slice = UnsafeSlice::new(&mut dst);
        unsafe {
            filter_line(src, &slice, 0, 1, src.len(), &c, lo, hi);
        }
        dst
    }

    #[test]
    fn test_line_constant_is_preserved() {
        let src = vec![42.5f32; 37];
        let dst = filter_1d(&src, 3., GaussianOrder::Smoothing, 0., 255.);
        for (i, &v) in dst.iter().enumerate() {
            let diff = (v - 42.5).abs();
            assert!(
                diff <= 1e-3,
                "Diff expected to be less than 1e-3 but it was {diff} at {i}"
            );
        }
    }

    #[test]
    fn test_line_single_sample_is_identity() {
        let dst = filter_1d(&[0.73], 5., GaussianOrder::Smoothing, 0., 1.);
        assert!((dst[0] - 0.73).abs() <= 1e-5);
    }

    #[test]
    fn test_line_impulse_response_is_symmetric() {
        let mut src = vec![0f32; 31];
        src[15] = 1.;
        let dst = filter_1d(&src, 2., GaussianOrder::Smoothing, 0., 1.);
        for d in 1..15 {
            let diff = (dst[15 - d] - dst[15 + d]).abs();
            assert!(diff <= 1e-6, "Asymmetry {diff} at distance {d}");
            assert!(dst[15 + d] < dst[15 + d - 1]);
        }
        let sum: f32 = dst.iter().sum();
        assert!((sum - 1.).abs() <= 1e-3, "Energy {sum} is not preserved");
    }

    #[test]
    fn test_line_first_derivative_is_antisymmetric() {
        let mut src = vec![0f32; 31];
        src[15] = 1.;
        let dst = filter_1d(&src, 2., GaussianOrder::FirstDerivative, 0., 1.);
        // Odd around the half sample before the impulse.
        assert!(dst[15] > 0. && dst[14] < 0.);
        for d in 0..15 {
            let diff = (dst[14 - d] + dst[15 + d]).abs();
            assert!(diff <= 1e-6, "Antisymmetry broken by {diff} at distance {d}");
        }
    }

    #[test]
    fn test_strided_line_touches_only_its_samples() {
        let src = vec![1f32; 12];
        let c = LaneCoefficients::<f32>::new(&IirCoefficients::new(1., GaussianOrder::Smoothing));
        let mut dst = vec![-7f32; 12];
        let slice = UnsafeSlice::new(&mut dst);
        unsafe {
            filter_line(&src, &slice, 1, 3, 4, &c, 0., 1.);
        }
        for (i, &v) in dst.iter().enumerate() {
            if i % 3 == 1 {
                assert!((v - 1.).abs() <= 1e-4);
            } else {
                assert_eq!(v, -7.);
            }
        }
    }
}
