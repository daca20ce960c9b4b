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
use crate::{BlurError, GaussianOrder, RecursiveGaussian, ThreadingPolicy};
use image::{DynamicImage, Rgb32FImage, Rgba32FImage};

/// Performs recursive gaussian blur, or its derivative, on the image
///
/// NOTE: Alpha must be associated if this image with alpha
///
/// Images with alpha are filtered as RGBA f32, all others as RGB f32, tap inputs
/// are clamped to `[0, 1]`. Derivative orders produce signed output, so the result
/// is always an f32 image.
///
/// # Arguments
///
/// * `image`: Dynamic image provided by image crate.
/// * `sigma`: Gaussian standard deviation.
/// * `order`: See [GaussianOrder].
/// * `threading_policy` - Threads usage policy.
pub fn recursive_gaussian_image(
    image: &DynamicImage,
    sigma: f32,
    order: GaussianOrder,
    threading_policy: ThreadingPolicy,
) -> Result<DynamicImage, BlurError> {
    if image.color().has_alpha() {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let mut context = RecursiveGaussian::new(
            width,
            height,
            4,
            &[0.; 4],
            &[1.; 4],
            sigma,
            order,
            threading_policy,
        )?;
        let mut dst = vec![0f32; context.buffer_len()];
        context.blur_4c(rgba.as_raw(), &mut dst);
        let new_image =
            Rgba32FImage::from_raw(width, height, dst).ok_or(BlurError::ExceedingPointerSize)?;
        Ok(DynamicImage::ImageRgba32F(new_image))
    } else {
        let rgb = image.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let mut context = RecursiveGaussian::new(
            width,
            height,
            3,
            &[0.; 3],
            &[1.; 3],
            sigma,
            order,
            threading_policy,
        )?;
        let mut dst = vec![0f32; context.buffer_len()];
        context.blur(rgb.as_raw(), &mut dst);
        let new_image =
            Rgb32FImage::from_raw(width, height, dst).ok_or(BlurError::ExceedingPointerSize)?;
        Ok(DynamicImage::ImageRgb32F(new_image))
    }
}
