//! Typed stages of the layer stack.

use rand::Rng;

use crate::{Batch, Dropout, LeakyRelu, Linear, Mode, Result};

/// Structural descriptor of a stage, independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageKind {
    Linear { in_dim: usize, out_dim: usize },
    Dropout { rate: f32 },
    LeakyRelu { negative_slope: f32 },
}

#[derive(Debug, Clone)]
pub enum Stage {
    Linear(Linear),
    Dropout(Dropout),
    LeakyRelu(LeakyRelu),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Linear(l) => StageKind::Linear {
                in_dim: l.in_dim(),
                out_dim: l.out_dim(),
            },
            Stage::Dropout(d) => StageKind::Dropout { rate: d.rate() },
            Stage::LeakyRelu(a) => StageKind::LeakyRelu {
                negative_slope: a.negative_slope(),
            },
        }
    }

    pub fn forward<R: Rng + ?Sized>(
        &self,
        input: &Batch,
        mode: Mode,
        rng: &mut R,
    ) -> Result<Batch> {
        match self {
            Stage::Linear(l) => l.forward(input),
            Stage::Dropout(d) => Ok(d.forward(input, mode, rng)),
            Stage::LeakyRelu(a) => Ok(a.forward(input)),
        }
    }

    #[inline]
    pub fn as_linear(&self) -> Option<&Linear> {
        match self {
            Stage::Linear(l) => Some(l),
            _ => None,
        }
    }

    #[inline]
    pub fn as_linear_mut(&mut self) -> Option<&mut Linear> {
        match self {
            Stage::Linear(l) => Some(l),
            _ => None,
        }
    }
}
