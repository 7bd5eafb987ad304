//! Model configuration.
//!
//! `MlpConfig` fully determines the layer stack. [`MlpConfig::stage_plan`] expands it
//! into the ordered sequence of stage descriptors that [`crate::Mlp::new`] materializes:
//!
//! - `n_layers` hidden blocks: `Linear(width -> nh)`, `Dropout(dropout)` if `dropout > 0`,
//!   `LeakyRelu(0.2)`
//! - one final `Linear(nh -> nout)`

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::LEAKY_RELU_SLOPE;
use crate::{Error, Result, StageKind};

pub const DEFAULT_N_LAYERS: usize = 3;
pub const DEFAULT_DROPOUT: f32 = 0.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MlpConfig {
    /// Input feature dimension.
    pub nin: usize,
    /// Output feature dimension.
    pub nout: usize,
    /// Hidden width.
    pub nh: usize,
    /// Number of hidden blocks.
    #[cfg_attr(feature = "serde", serde(default = "default_n_layers"))]
    pub n_layers: usize,
    /// Dropout probability; `0.0` disables dropout stages entirely.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dropout: f32,
}

#[cfg(feature = "serde")]
fn default_n_layers() -> usize {
    DEFAULT_N_LAYERS
}

impl MlpConfig {
    pub fn new(nin: usize, nout: usize, nh: usize) -> Self {
        Self {
            nin,
            nout,
            nh,
            n_layers: DEFAULT_N_LAYERS,
            dropout: DEFAULT_DROPOUT,
        }
    }

    pub fn with_layers(mut self, n_layers: usize) -> Self {
        self.n_layers = n_layers;
        self
    }

    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    #[inline]
    pub fn has_dropout(&self) -> bool {
        self.dropout > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        if self.nin == 0 {
            return Err(Error::InvalidConfig("nin must be > 0".to_owned()));
        }
        if self.nout == 0 {
            return Err(Error::InvalidConfig("nout must be > 0".to_owned()));
        }
        if self.nh == 0 {
            return Err(Error::InvalidConfig("nh must be > 0".to_owned()));
        }
        if !(self.dropout.is_finite() && (0.0..1.0).contains(&self.dropout)) {
            return Err(Error::InvalidConfig(format!(
                "dropout must be finite and in [0,1), got {}",
                self.dropout
            )));
        }
        if self.num_stages().is_none() {
            return Err(Error::InvalidConfig(format!(
                "n_layers {} overflows the stage count",
                self.n_layers
            )));
        }
        Ok(())
    }

    /// Number of stages the plan expands to, or `None` if it overflows `usize`.
    pub fn num_stages(&self) -> Option<usize> {
        let per_block = if self.has_dropout() { 3 } else { 2 };
        self.n_layers.checked_mul(per_block)?.checked_add(1)
    }

    /// Expand the config into the ordered stage descriptors of the layer stack.
    ///
    /// With `n_layers == 0` the output layer reads `nh` features directly, so inputs
    /// of any other width fail with [`Error::ShapeMismatch`] at forward time.
    pub fn stage_plan(&self) -> Vec<StageKind> {
        let mut plan = Vec::with_capacity(self.num_stages().unwrap_or_default());
        let mut in_dim = self.nin;
        for _ in 0..self.n_layers {
            plan.push(StageKind::Linear {
                in_dim,
                out_dim: self.nh,
            });
            if self.has_dropout() {
                plan.push(StageKind::Dropout { rate: self.dropout });
            }
            plan.push(StageKind::LeakyRelu {
                negative_slope: LEAKY_RELU_SLOPE,
            });
            in_dim = self.nh;
        }
        plan.push(StageKind::Linear {
            in_dim: self.nh,
            out_dim: self.nout,
        });
        plan
    }

    /// Parse and validate a JSON config. `n_layers` and `dropout` may be omitted.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
