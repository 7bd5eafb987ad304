use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::{
    Batch, Dropout, Error, Init, LeakyRelu, Linear, MlpConfig, Mode, Result, Stage, StageKind,
};

/// Bound of the uniform distribution used to reset the output layer's weights.
pub const OUTPUT_INIT_RANGE: f32 = 0.07;

/// Feed-forward network: `n_layers` blocks of `Linear -> [Dropout] -> LeakyRelu(0.2)`
/// followed by one output `Linear`.
///
/// Hidden linear stages use [`Init::FanInUniform`]. The output stage is reset to
/// weights ~ U[-0.07, 0.07] and zero biases, so the model starts with small outputs.
#[derive(Debug, Clone)]
pub struct Mlp {
    config: MlpConfig,
    stages: Box<[Stage]>,
}

impl Mlp {
    pub fn new_with_seed(config: MlpConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    pub fn new<R: Rng + ?Sized>(config: MlpConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let plan = config.stage_plan();
        let last = plan.len() - 1;
        let mut stages = Vec::with_capacity(plan.len());
        for (idx, kind) in plan.into_iter().enumerate() {
            let stage = match kind {
                StageKind::Linear { in_dim, out_dim } => {
                    let init = if idx == last {
                        Init::Uniform {
                            bound: OUTPUT_INIT_RANGE,
                        }
                    } else {
                        Init::FanInUniform
                    };
                    Stage::Linear(Linear::new_with_rng(in_dim, out_dim, init, rng)?)
                }
                StageKind::Dropout { rate } => Stage::Dropout(Dropout::new(rate)?),
                StageKind::LeakyRelu { negative_slope } => {
                    Stage::LeakyRelu(LeakyRelu::new(negative_slope)?)
                }
            };
            stages.push(stage);
        }

        let mlp = Self {
            config,
            stages: stages.into_boxed_slice(),
        };
        debug!(
            nin = config.nin,
            nout = config.nout,
            nh = config.nh,
            n_layers = config.n_layers,
            dropout = config.dropout,
            stages = mlp.stages.len(),
            parameters = mlp.num_parameters(),
            "built mlp"
        );
        Ok(mlp)
    }

    #[inline]
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.config.nin
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.config.nout
    }

    #[inline]
    pub fn hidden_dim(&self) -> usize {
        self.config.nh
    }

    #[inline]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    /// All linear stages in order; the last one is the output layer.
    pub fn linear_layers(&self) -> impl Iterator<Item = &Linear> {
        self.stages.iter().filter_map(Stage::as_linear)
    }

    /// Mutable access for an external trainer applying parameter updates.
    pub fn linear_layers_mut(&mut self) -> impl Iterator<Item = &mut Linear> {
        self.stages.iter_mut().filter_map(Stage::as_linear_mut)
    }

    pub fn output_layer(&self) -> &Linear {
        match self.stages.last() {
            Some(Stage::Linear(l)) => l,
            _ => unreachable!("layer stack always ends with a linear stage"),
        }
    }

    pub fn output_layer_mut(&mut self) -> &mut Linear {
        match self.stages.last_mut() {
            Some(Stage::Linear(l)) => l,
            _ => unreachable!("layer stack always ends with a linear stage"),
        }
    }

    pub fn num_parameters(&self) -> usize {
        self.linear_layers().map(Linear::num_parameters).sum()
    }

    /// Re-apply the output-layer init: weights ~ U[-0.07, 0.07], biases = 0.
    pub fn reset_output_layer<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let out = self.output_layer_mut();
        out.init_uniform(OUTPUT_INIT_RANGE, rng);
        out.zero_biases();
    }

    /// Forward pass for a batch of shape `(rows, nin)`, producing `(rows, nout)`.
    ///
    /// `rng` is only drawn from by dropout stages in [`Mode::Train`].
    ///
    /// Fails with [`Error::ShapeMismatch`] if `input.cols() != nin`.
    pub fn forward<R: Rng + ?Sized>(
        &self,
        input: &Batch,
        mode: Mode,
        rng: &mut R,
    ) -> Result<Batch> {
        trace!(rows = input.rows(), ?mode, "mlp forward");

        let x = self
            .stages
            .iter()
            .try_fold(input.clone(), |x, stage| stage.forward(&x, mode, &mut *rng))?;

        debug_assert_eq!(x.cols(), self.config.nout);
        Ok(x)
    }

    /// Deterministic forward pass with every dropout stage disabled.
    pub fn forward_eval(&self, input: &Batch) -> Result<Batch> {
        // Eval mode never draws from the RNG, so any seed works.
        let mut rng = StdRng::seed_from_u64(0);
        self.forward(input, Mode::Eval, &mut rng)
    }

    /// Install externally stored parameters into the linear stages, in order.
    ///
    /// Each `Linear` must match the dims of the stage it replaces.
    pub(crate) fn with_linear_layers(mut self, layers: Vec<Linear>) -> Result<Self> {
        let expected = self.linear_layers().count();
        if layers.len() != expected {
            return Err(Error::InvalidData(format!(
                "expected {expected} linear layers, got {}",
                layers.len()
            )));
        }

        for (i, (slot, layer)) in self.linear_layers_mut().zip(layers).enumerate() {
            if slot.in_dim() != layer.in_dim() || slot.out_dim() != layer.out_dim() {
                return Err(Error::InvalidData(format!(
                    "linear {i} has shape ({}, {}), expected ({}, {})",
                    layer.out_dim(),
                    layer.in_dim(),
                    slot.out_dim(),
                    slot.in_dim()
                )));
            }
            *slot = layer;
        }
        Ok(self)
    }
}
