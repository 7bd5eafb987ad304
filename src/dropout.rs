//! Dropout regularizer.
//!
//! In [`Mode::Train`] each element is zeroed independently with probability `rate`
//! and survivors are scaled by `1 / (1 - rate)` so the expected value is unchanged.
//! In [`Mode::Eval`] the stage is the identity and the RNG is never touched.

use rand::Rng;

use crate::{Batch, Error, Result};

/// Whether stochastic stages are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Train,
    #[default]
    Eval,
}

impl Mode {
    #[inline]
    pub fn is_training(self) -> bool {
        matches!(self, Mode::Train)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    /// `rate` must be finite and in `[0, 1)`.
    pub fn new(rate: f32) -> Result<Self> {
        if !(rate.is_finite() && (0.0..1.0).contains(&rate)) {
            return Err(Error::InvalidConfig(format!(
                "dropout rate must be finite and in [0,1), got {rate}"
            )));
        }
        Ok(Self { rate })
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn forward<R: Rng + ?Sized>(&self, input: &Batch, mode: Mode, rng: &mut R) -> Batch {
        let mut out = input.clone();
        if !mode.is_training() || self.rate == 0.0 {
            return out;
        }

        let scale = 1.0 / (1.0 - self.rate);
        for v in out.as_mut_slice() {
            if rng.random::<f32>() < self.rate {
                *v = 0.0;
            } else {
                *v *= scale;
            }
        }
        out
    }
}
