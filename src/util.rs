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
use std::error::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BlurError {
    ZeroBaseSize,
    MinimumSliceSizeMismatch(MismatchedSize),
    ClampBoundsMismatch(MismatchedSize),
    InvalidClampRange { channel: usize },
    ExceedingPointerSize,
    NegativeOrZeroSigma,
    /// Sigma is positive but too small or too large for `f32` filter taps.
    SigmaOutOfRange,
    AllocationFailed(usize),
    ThreadPoolCreation,
}

impl Error for BlurError {}

impl std::fmt::Display for BlurError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BlurError::ZeroBaseSize => f.write_str("Image size and channels must not be zero"),
            BlurError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            BlurError::ClampBoundsMismatch(size) => f.write_fmt(format_args!(
                "Clamp bounds must have one value per channel: expected={}, received={}",
                size.expected, size.received
            )),
            BlurError::InvalidClampRange { channel } => f.write_fmt(format_args!(
                "Clamp range for channel {channel} must be finite with min <= max"
            )),
            BlurError::ExceedingPointerSize => {
                f.write_str("Image bounds exceeds pointer capacity")
            }
            BlurError::NegativeOrZeroSigma => {
                f.write_str("Sigma must be finite and greater than zero")
            }
            BlurError::SigmaOutOfRange => {
                f.write_str("Sigma is out of range for finite filter coefficients")
            }
            BlurError::AllocationFailed(size) => f.write_fmt(format_args!(
                "Failed to allocate scratch buffer of {size} elements"
            )),
            BlurError::ThreadPoolCreation => f.write_str("Failed to create thread pool"),
        }
    }
}

/// Number of items an image of the given layout holds.
pub(crate) fn image_len(width: u32, height: u32, channels: usize) -> Result<usize, BlurError> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(BlurError::ZeroBaseSize);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|x| x.checked_mul(channels))
        .ok_or(BlurError::ExceedingPointerSize)
}

pub(crate) fn check_slice_size<T>(arr: &[T], expected: usize) -> Result<(), BlurError> {
    if arr.len() != expected {
        return Err(BlurError::MinimumSliceSizeMismatch(MismatchedSize {
            expected,
            received: arr.len(),
        }));
    }
    Ok(())
}
