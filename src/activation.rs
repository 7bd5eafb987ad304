//! Leaky rectifier nonlinearity.
//!
//! Applied element-wise after each hidden linear stage:
//! `f(x) = x` if `x > 0`, else `negative_slope * x`.

use crate::{Batch, Error, Result};

/// Negative slope used by every hidden block of an [`crate::Mlp`].
pub const LEAKY_RELU_SLOPE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyRelu {
    negative_slope: f32,
}

impl LeakyRelu {
    pub fn new(negative_slope: f32) -> Result<Self> {
        if !(negative_slope.is_finite() && negative_slope >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "leaky ReLU negative_slope must be finite and >= 0, got {negative_slope}"
            )));
        }
        Ok(Self { negative_slope })
    }

    #[inline]
    pub fn negative_slope(&self) -> f32 {
        self.negative_slope
    }

    #[inline]
    pub(crate) fn apply(self, x: f32) -> f32 {
        if x > 0.0 { x } else { self.negative_slope * x }
    }

    /// Element-wise forward pass. The output has the same shape as `input`.
    pub fn forward(&self, input: &Batch) -> Batch {
        let mut out = input.clone();
        for v in out.as_mut_slice() {
            *v = self.apply(*v);
        }
        out
    }
}

impl Default for LeakyRelu {
    fn default() -> Self {
        Self {
            negative_slope: LEAKY_RELU_SLOPE,
        }
    }
}
