//! Fully-connected (linear) stage: `y = x W^T + b`.

use rand::Rng;

use crate::matmul::affine_rows;
use crate::{Batch, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Parameter initialization policy for a [`Linear`] stage.
pub enum Init {
    /// Dense-layer default: weights and biases ~ U[-1/sqrt(in_dim), 1/sqrt(in_dim)].
    FanInUniform,
    /// Weights ~ U[-bound, bound], biases zeroed.
    Uniform { bound: f32 },
}

impl Init {
    pub fn validate(self) -> Result<()> {
        match self {
            Init::FanInUniform => Ok(()),
            Init::Uniform { bound } => {
                if !(bound.is_finite() && bound >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "uniform init bound must be finite and >= 0, got {bound}"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Linear {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Linear {
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "linear dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        init.validate()?;

        let mut layer = Self {
            in_dim,
            out_dim,
            weights: vec![0.0; in_dim * out_dim],
            biases: vec![0.0; out_dim],
        };

        match init {
            Init::FanInUniform => {
                let bound = 1.0 / (in_dim as f32).sqrt();
                layer.init_uniform(bound, rng);
                fill_uniform(&mut layer.biases, bound, rng);
            }
            Init::Uniform { bound } => {
                layer.init_uniform(bound, rng);
                layer.zero_biases();
            }
        }

        Ok(layer)
    }

    /// Build a stage from existing parameters.
    ///
    /// Validates shapes and that every parameter is finite.
    pub fn from_parts(
        in_dim: usize,
        out_dim: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "linear dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let expected_w = in_dim
            .checked_mul(out_dim)
            .ok_or_else(|| Error::InvalidShape("linear weight shape overflow".to_owned()))?;
        if weights.len() != expected_w {
            return Err(Error::InvalidShape(format!(
                "weights length {} does not match out_dim * in_dim ({out_dim} * {in_dim})",
                weights.len()
            )));
        }
        if biases.len() != out_dim {
            return Err(Error::InvalidShape(format!(
                "biases length {} does not match out_dim {out_dim}",
                biases.len()
            )));
        }
        if weights.iter().chain(&biases).any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "linear parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            in_dim,
            out_dim,
            weights,
            biases,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Mutable view of the weights, for in-place parameter updates.
    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Refill every weight with an independent draw from U[-bound, bound].
    pub fn init_uniform<R: Rng + ?Sized>(&mut self, bound: f32, rng: &mut R) {
        fill_uniform(&mut self.weights, bound, rng);
    }

    pub fn zero_biases(&mut self) {
        self.biases.fill(0.0);
    }

    /// Forward pass for a batch.
    ///
    /// Shape contract:
    /// - `input.cols() == self.in_dim`, otherwise [`Error::ShapeMismatch`]
    /// - output is `(input.rows(), self.out_dim)`
    pub fn forward(&self, input: &Batch) -> Result<Batch> {
        if input.cols() != self.in_dim {
            return Err(Error::ShapeMismatch {
                expected: self.in_dim,
                got: input.cols(),
            });
        }

        let rows = input.rows();
        let mut out = Batch::zeros(rows, self.out_dim);
        affine_rows(
            input.as_slice(),
            rows,
            self.in_dim,
            &self.weights,
            &self.biases,
            self.out_dim,
            out.as_mut_slice(),
        );
        Ok(out)
    }
}

fn fill_uniform<R: Rng + ?Sized>(values: &mut [f32], bound: f32, rng: &mut R) {
    if bound == 0.0 {
        values.fill(0.0);
        return;
    }
    for v in values {
        *v = rng.random_range(-bound..=bound);
    }
}
