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
use crate::gaussian_order::GaussianOrder;
use num_traits::{AsPrimitive, Float};

/// Recursion coefficients of the Deriche-style recursive gaussian.
///
/// Forward sweep: `y[n] = a0 * x[n] + a1 * x[n - 1] - b1 * y[n - 1] - b2 * y[n - 2]`.
///
/// Backward sweep: `y[n] = a2 * x[n + 1] + a3 * x[n + 2] - b1 * y[n + 1] - b2 * y[n + 2]`.
///
/// `coefp` and `coefn` are the steady state gains of the forward and backward
/// sweeps, used to seed each sweep as if the edge pixel were repeated to infinity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IirCoefficients<F> {
    pub a0: F,
    pub a1: F,
    pub a2: F,
    pub a3: F,
    pub b1: F,
    pub b2: F,
    pub coefp: F,
    pub coefn: F,
}

impl<F: Float + 'static> IirCoefficients<F>
where
    f64: AsPrimitive<F>,
{
    /// Computes coefficients for given sigma and order.
    ///
    /// Sigma is not validated here, see [`IirCoefficients::is_usable`].
    pub fn new(sigma: F, order: GaussianOrder) -> IirCoefficients<F> {
        let one = F::one();
        let two: F = 2f64.as_();
        let three: F = 3f64.as_();
        let scale: F = 1.695f64.as_();

        let alpha = scale / sigma;
        let ema = (-alpha).exp();
        let ema2 = (-two * alpha).exp();

        let b1 = -two * ema;
        let b2 = ema2;

        let (a0, a1, a2, a3) = match order {
            GaussianOrder::Smoothing => {
                let k = (one - ema) * (one - ema) / (one + (two * alpha * ema) - ema2);
                (
                    k,
                    k * (alpha - one) * ema,
                    k * (alpha + one) * ema,
                    -k * ema2,
                )
            }
            GaussianOrder::FirstDerivative => {
                let a0 = (one - ema) * (one - ema);
                (a0, F::zero(), -a0, F::zero())
            }
            GaussianOrder::SecondDerivative => {
                let k = -(ema2 - one) / (two * alpha * ema);
                let ema3 = ema * ema * ema;
                let kn = -two * (-one + (three * ema) - (three * ema * ema) + ema3)
                    / ((three * ema) + one + (three * ema * ema) + ema3);
                (
                    kn,
                    -kn * (one + (k * alpha)) * ema,
                    kn * (one - (k * alpha)) * ema,
                    -kn * ema2,
                )
            }
        };

        let denom = one + b1 + b2;

        IirCoefficients {
            a0,
            a1,
            a2,
            a3,
            b1,
            b2,
            coefp: (a0 + a1) / denom,
            coefn: (a2 + a3) / denom,
        }
    }

    /// Sum of forward and backward steady state gains, response to a constant signal.
    #[inline]
    pub fn dc_gain(&self) -> F {
        self.coefp + self.coefn
    }

    /// Every tap is finite and the feedback has a positive steady state denominator.
    /// Extreme sigmas underflow `exp(-alpha)` or overflow `alpha` and fail this.
    pub fn is_usable(&self) -> bool {
        let taps = [
            self.a0, self.a1, self.a2, self.a3, self.b1, self.b2, self.coefp, self.coefn,
        ];
        taps.iter().all(|v| v.is_finite()) && F::one() + self.b1 + self.b2 > F::zero()
    }
}
