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
use crate::aligned_buffer::AlignedBuffer;
use crate::coefficients::IirCoefficients;
use crate::gaussian_order::GaussianOrder;
use crate::iir_line::{horizontal_pass, vertical_pass, LaneCoefficients, Layout};
use crate::lane::{IirLane, F32x4};
use crate::threading_policy::WorkerPool;
use crate::unsafe_slice::UnsafeSlice;
use crate::util::{check_slice_size, image_len};
use crate::{BlurError, MismatchedSize, ThreadingPolicy};

/// Reusable recursive gaussian filter for one image layout.
///
/// Owns scratch memory holding the vertical pass result and per channel clamp bounds.
/// A blur takes `&mut self`, so one context serves one call at a time; use one
/// context per thread to blur concurrently.
///
/// Dropping the context releases all of its memory.
pub struct RecursiveGaussian {
    width: u32,
    height: u32,
    channels: usize,
    sigma: f32,
    order: GaussianOrder,
    clamp_min: Box<[f32]>,
    clamp_max: Box<[f32]>,
    scratch: AlignedBuffer,
    pool: WorkerPool,
}

fn try_copy_bounds(values: &[f32]) -> Result<Box<[f32]>, BlurError> {
    let mut dst = Vec::new();
    dst.try_reserve_exact(values.len())
        .map_err(|_| BlurError::AllocationFailed(values.len()))?;
    dst.extend_from_slice(values);
    Ok(dst.into_boxed_slice())
}

impl RecursiveGaussian {
    /// Creates filter context.
    ///
    /// # Arguments
    /// * `width`, `height` - Image dimensions, must not be zero.
    /// * `channels` - Interleaved channels per pixel, must not be zero.
    /// * `clamp_min`, `clamp_max` - Per channel bounds applied to every filter tap input,
    ///   one value per channel, `clamp_min[k] <= clamp_max[k]`.
    /// * `sigma` - Gaussian standard deviation, must be finite and positive.
    /// * `order` - See [GaussianOrder].
    /// * `threading_policy` - Threads usage policy.
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        clamp_min: &[f32],
        clamp_max: &[f32],
        sigma: f32,
        order: GaussianOrder,
        threading_policy: ThreadingPolicy,
    ) -> Result<RecursiveGaussian, BlurError> {
        let len = image_len(width, height, channels)?;
        if !sigma.is_finite() || sigma <= 0. {
            return Err(BlurError::NegativeOrZeroSigma);
        }
        if !IirCoefficients::new(sigma, order).is_usable() {
            return Err(BlurError::SigmaOutOfRange);
        }
        for bounds in [clamp_min, clamp_max] {
            if bounds.len() != channels {
                return Err(BlurError::ClampBoundsMismatch(MismatchedSize {
                    expected: channels,
                    received: bounds.len(),
                }));
            }
        }
        for (channel, (&lo, &hi)) in clamp_min.iter().zip(clamp_max.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(BlurError::InvalidClampRange { channel });
            }
        }

        let clamp_min = try_copy_bounds(clamp_min)?;
        let clamp_max = try_copy_bounds(clamp_max)?;
        let scratch = AlignedBuffer::try_new(len)?;
        let pool = WorkerPool::new(threading_policy.thread_count(width, height))?;

        log::debug!(
            "Recursive gaussian context {width}x{height}x{channels}, sigma {sigma}, {order:?}, {} thread(s)",
            pool.thread_count()
        );

        Ok(RecursiveGaussian {
            width,
            height,
            channels,
            sigma,
            order,
            clamp_min,
            clamp_max,
            scratch,
            pool,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn order(&self) -> GaussianOrder {
        self.order
    }

    pub fn clamp_min(&self) -> &[f32] {
        &self.clamp_min
    }

    pub fn clamp_max(&self) -> &[f32] {
        &self.clamp_max
    }

    /// Recursion coefficients used by every blur on this context.
    pub fn coefficients(&self) -> IirCoefficients<f32> {
        IirCoefficients::new(self.sigma, self.order)
    }

    /// Number of items a source or destination buffer must hold.
    pub fn buffer_len(&self) -> usize {
        self.scratch.len()
    }

    /// Blurs an image with any channel count, one channel at a time.
    ///
    /// # Arguments
    /// * `src` - Interleaved source, exactly `width * height * channels` items.
    /// * `dst` - Destination of the same size, must be distinct from `src`.
    ///
    /// # Panics
    /// On mismatched buffer sizes.
    pub fn blur(&mut self, src: &[f32], dst: &mut [f32]) {
        self.check_buffers(src, dst);
        log::trace!(
            "Generic recursive gaussian on {}x{}x{}",
            self.width,
            self.height,
            self.channels
        );
        self.execute::<f32>(src, dst);
    }

    /// Blurs a 4 channel image processing a whole pixel per vector operation.
    ///
    /// Produces the same result as [RecursiveGaussian::blur]. Buffers don't need
    /// any particular alignment.
    ///
    /// # Panics
    /// When context channels count is not 4 or on mismatched buffer sizes.
    pub fn blur_4c(&mut self, src: &[f32], dst: &mut [f32]) {
        assert_eq!(
            self.channels, 4,
            "4 channel recursive gaussian requires 4 channels, but context has {}",
            self.channels
        );
        self.check_buffers(src, dst);
        log::trace!(
            "4 channel recursive gaussian on {}x{}",
            self.width,
            self.height
        );
        self.execute::<F32x4>(src, dst);
    }

    /// Uses [RecursiveGaussian::blur_4c] for 4 channel images, [RecursiveGaussian::blur] otherwise.
    pub fn blur_auto(&mut self, src: &[f32], dst: &mut [f32]) {
        if self.channels == 4 {
            self.blur_4c(src, dst);
        } else {
            self.blur(src, dst);
        }
    }

    /// Releases the context, same as dropping it.
    pub fn release(self) {}

    fn check_buffers(&self, src: &[f32], dst: &[f32]) {
        let expected = self.scratch.len();
        assert_eq!(
            src.len(),
            expected,
            "Source must have {expected} items, but it has {}",
            src.len()
        );
        assert_eq!(
            dst.len(),
            expected,
            "Destination must have {expected} items, but it has {}",
            dst.len()
        );
    }

    fn execute<V: IirLane>(&mut self, src: &[f32], dst: &mut [f32]) {
        let coeffs = LaneCoefficients::<V>::new(&self.coefficients());
        let layout = Layout {
            width: self.width as usize,
            height: self.height as usize,
            channels: self.channels,
        };
        let clamp_min = &self.clamp_min[..];
        let clamp_max = &self.clamp_max[..];

        {
            let scratch = UnsafeSlice::new(self.scratch.as_mut_slice());
            self.pool.split_lines(layout.width, |columns| unsafe {
                vertical_pass(src, &scratch, layout, columns, &coeffs, clamp_min, clamp_max);
            });
        }

        let scratch = self.scratch.as_slice();
        let dst = UnsafeSlice::new(dst);
        self.pool.split_lines(layout.height, |rows| unsafe {
            horizontal_pass(scratch, &dst, layout, rows, &coeffs, clamp_min, clamp_max);
        });
    }
}

/// Performs recursive gaussian blur (or its derivative) on an interleaved f32 image.
///
/// Creates a temporary [RecursiveGaussian], for repeated blurs of the same layout
/// keep a context instead.
///
/// # Arguments
/// * `src` - Source image, `width * height * channels` items.
/// * `dst` - Destination image, same size as source.
/// * `clamp_min`, `clamp_max` - Per channel tap input bounds.
/// * `sigma` - Gaussian standard deviation.
/// * `order` - See [GaussianOrder].
/// * `threading_policy` - Threads usage policy.
///
/// # Complexity
/// O(1) per pixel independently of sigma.
pub fn recursive_gaussian_f32(
    src: &[f32],
    dst: &mut [f32],
    width: u32,
    height: u32,
    channels: usize,
    clamp_min: &[f32],
    clamp_max: &[f32],
    sigma: f32,
    order: GaussianOrder,
    threading_policy: ThreadingPolicy,
) -> Result<(), BlurError> {
    let len = image_len(width, height, channels)?;
    check_slice_size(src, len)?;
    check_slice_size(dst, len)?;
    let mut context = RecursiveGaussian::new(
        width,
        height,
        channels,
        clamp_min,
        clamp_max,
        sigma,
        order,
        threading_policy,
    )?;
    context.blur_auto(src, dst);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn context(w: u32, h: u32, cn: usize, sigma: f32, order: GaussianOrder) -> RecursiveGaussian {
        RecursiveGaussian::new(
            w,
            h,
            cn,
            &vec![0.; cn],
            &vec![255.; cn],
            sigma,
            order,
            ThreadingPolicy::Single,
        )
        .unwrap()
    }

    fn pattern(len: usize) -> Vec<f32> {
        let mut state = 0x2545_f491u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 256) as f32
            })
            .collect()
    }

    #[test]
    fn test_create_validates_parameters() {
        let lo = [0f32; 3];
        let hi = [1f32; 3];
        let create = |w, h, cn, lo: &[f32], hi: &[f32], sigma| {
            RecursiveGaussian::new(
                w,
                h,
                cn,
                lo,
                hi,
                sigma,
                GaussianOrder::Smoothing,
                ThreadingPolicy::Single,
            )
            .err()
        };
        assert_eq!(create(0, 4, 3, &lo, &hi, 1.), Some(BlurError::ZeroBaseSize));
        assert_eq!(create(4, 0, 3, &lo, &hi, 1.), Some(BlurError::ZeroBaseSize));
        assert_eq!(create(4, 4, 0, &[], &[], 1.), Some(BlurError::ZeroBaseSize));
        assert_eq!(
            create(4, 4, 3, &lo, &hi, 0.),
            Some(BlurError::NegativeOrZeroSigma)
        );
        assert_eq!(
            create(4, 4, 3, &lo, &hi, -2.),
            Some(BlurError::NegativeOrZeroSigma)
        );
        assert_eq!(
            create(4, 4, 3, &lo, &hi, f32::NAN),
            Some(BlurError::NegativeOrZeroSigma)
        );
        assert_eq!(
            create(4, 4, 3, &lo, &hi, 1e-39),
            Some(BlurError::SigmaOutOfRange)
        );
        assert_eq!(
            create(4, 4, 3, &lo[..2], &hi, 1.),
            Some(BlurError::ClampBoundsMismatch(MismatchedSize {
                expected: 3,
                received: 2,
            }))
        );
        assert_eq!(
            create(4, 4, 3, &[0., 2., 0.], &hi, 1.),
            Some(BlurError::InvalidClampRange { channel: 1 })
        );
        assert_eq!(create(4, 4, 3, &lo, &hi, 1.), None);
    }

    #[test]
    fn test_tiny_sigma_second_derivative_is_rejected() {
        let created = RecursiveGaussian::new(
            8,
            8,
            1,
            &[0.],
            &[255.],
            0.01,
            GaussianOrder::SecondDerivative,
            ThreadingPolicy::Single,
        );
        assert_eq!(created.err(), Some(BlurError::SigmaOutOfRange));
    }

    #[test]
    fn test_created_contexts_produce_finite_output() {
        let width = 13usize;
        let height = 11usize;
        let src = pattern(width * height);
        let mut dst = vec![0f32; src.len()];
        let mut sigma = 1e-3f32;
        while sigma <= 1e3 {
            for order in [
                GaussianOrder::Smoothing,
                GaussianOrder::FirstDerivative,
                GaussianOrder::SecondDerivative,
            ] {
                let Ok(mut ctx) = RecursiveGaussian::new(
                    width as u32,
                    height as u32,
                    1,
                    &[0.],
                    &[255.],
                    sigma,
                    order,
                    ThreadingPolicy::Single,
                ) else {
                    continue;
                };
                assert!(ctx.coefficients().is_usable());
                ctx.blur(&src, &mut dst);
                assert!(
                    dst.iter().all(|v| v.is_finite()),
                    "Non finite output for sigma {sigma}, {order:?}"
                );
            }
            sigma *= 1.25;
        }
    }

    #[test]
    fn test_context_accessors() {
        let ctx = context(7, 5, 3, 1.5, GaussianOrder::SecondDerivative);
        assert_eq!(ctx.width(), 7);
        assert_eq!(ctx.height(), 5);
        assert_eq!(ctx.channels(), 3);
        assert_eq!(ctx.sigma(), 1.5);
        assert_eq!(ctx.order(), GaussianOrder::SecondDerivative);
        assert_eq!(ctx.clamp_min(), &[0., 0., 0.]);
        assert_eq!(ctx.clamp_max(), &[255., 255., 255.]);
        assert_eq!(ctx.buffer_len(), 7 * 5 * 3);
        assert_eq!(
            ctx.coefficients(),
            IirCoefficients::new(1.5f32, GaussianOrder::SecondDerivative)
        );
        ctx.release();
    }

    #[test]
    fn test_recursive_gaussian_constant_f32_plane() {
        let width = 64usize;
        let height = 48usize;
        let src = vec![126.5f32; width * height];
        let mut dst = vec![0f32; width * height];
        let mut ctx = context(width as u32, height as u32, 1, 5., GaussianOrder::Smoothing);
        ctx.blur(&src, &mut dst);
        for (i, &cn) in dst.iter().enumerate() {
            let diff = (cn - 126.5).abs();
            assert!(
                diff <= 1e-3,
                "Diff expected to be less than 1e-3 but it was {diff} at {i}"
            );
        }
    }

    #[test]
    fn test_generic_and_4c_match() {
        let width = 33usize;
        let height = 21usize;
        let src = pattern(width * height * 4);
        for order in [
            GaussianOrder::Smoothing,
            GaussianOrder::FirstDerivative,
            GaussianOrder::SecondDerivative,
        ] {
            let mut ctx = context(width as u32, height as u32, 4, 2.5, order);
            let mut generic = vec![0f32; src.len()];
            let mut vector = vec![0f32; src.len()];
            ctx.blur(&src, &mut generic);
            ctx.blur_4c(&src, &mut vector);
            for (i, (&a, &b)) in generic.iter().zip(vector.iter()).enumerate() {
                let diff = (a - b).abs();
                assert!(
                    diff <= 1e-4 * a.abs().max(1.),
                    "Engines diverged by {diff} at {i} for {order:?}"
                );
            }
        }
    }

    #[test]
    fn test_multithreaded_matches_single() {
        let width = 57u32;
        let height = 40u32;
        let src = pattern(width as usize * height as usize * 3);
        let mut single = vec![0f32; src.len()];
        let mut threaded = vec![0f32; src.len()];
        context(width, height, 3, 3., GaussianOrder::Smoothing).blur(&src, &mut single);
        let mut ctx = RecursiveGaussian::new(
            width,
            height,
            3,
            &[0.; 3],
            &[255.; 3],
            3.,
            GaussianOrder::Smoothing,
            ThreadingPolicy::Fixed(NonZeroUsize::new(4).unwrap()),
        )
        .unwrap();
        ctx.blur(&src, &mut threaded);
        assert_eq!(single, threaded);
    }

    #[test]
    fn test_multithreaded_4c_matches_single() {
        let width = 45u32;
        let height = 38u32;
        let src = pattern(width as usize * height as usize * 4);
        for order in [GaussianOrder::Smoothing, GaussianOrder::SecondDerivative] {
            let mut single = vec![0f32; src.len()];
            let mut threaded = vec![0f32; src.len()];
            context(width, height, 4, 2., order).blur_4c(&src, &mut single);
            let mut ctx = RecursiveGaussian::new(
                width,
                height,
                4,
                &[0.; 4],
                &[255.; 4],
                2.,
                order,
                ThreadingPolicy::Fixed(NonZeroUsize::new(4).unwrap()),
            )
            .unwrap();
            ctx.blur_4c(&src, &mut threaded);
            assert_eq!(single, threaded, "Threaded 4c output differs for {order:?}");
        }
    }

    #[test]
    fn test_context_is_reusable() {
        let width = 16usize;
        let height = 9usize;
        let first = pattern(width * height * 2);
        let second = vec![10f32; width * height * 2];
        let mut ctx = context(width as u32, height as u32, 2, 1.2, GaussianOrder::Smoothing);
        let mut dst_a = vec![0f32; first.len()];
        let mut dst_b = vec![0f32; first.len()];
        ctx.blur(&first, &mut dst_a);
        ctx.blur(&second, &mut dst_b);
        for &v in dst_b.iter() {
            assert!((v - 10.).abs() <= 1e-3);
        }
        let mut dst_c = vec![0f32; first.len()];
        ctx.blur(&first, &mut dst_c);
        assert_eq!(dst_a, dst_c);
    }

    #[test]
    #[should_panic]
    fn test_4c_rejects_other_channel_counts() {
        let mut ctx = context(4, 4, 3, 1., GaussianOrder::Smoothing);
        let src = vec![0f32; 4 * 4 * 3];
        let mut dst = vec![0f32; 4 * 4 * 3];
        ctx.blur_4c(&src, &mut dst);
    }

    #[test]
    #[should_panic]
    fn test_blur_rejects_short_destination() {
        let mut ctx = context(4, 4, 1, 1., GaussianOrder::Smoothing);
        let src = vec![0f32; 16];
        let mut dst = vec![0f32; 15];
        ctx.blur(&src, &mut dst);
    }

    #[test]
    fn test_one_shot_reports_size_mismatch() {
        let src = vec![0f32; 16];
        let mut dst = vec![0f32; 12];
        let result = recursive_gaussian_f32(
            &src,
            &mut dst,
            4,
            4,
            1,
            &[0.],
            &[1.],
            1.,
            GaussianOrder::Smoothing,
            ThreadingPolicy::Single,
        );
        assert_eq!(
            result,
            Err(BlurError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 16,
                received: 12,
            }))
        );
    }
}
