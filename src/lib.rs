//! A configurable leaky-ReLU multi-layer perceptron.
//!
//! `leaky-mlp` provides a single feed-forward module meant to be composed inside a larger
//! training pipeline. It owns a fixed stack of typed stages and evaluates it on row-major
//! batches. Training loops, optimizers, losses and data loading live elsewhere.
//!
//! # Layer stack
//!
//! [`MlpConfig`] fully determines the stack. For `n_layers` hidden blocks:
//!
//! - `Linear(width -> nh)`: `nin -> nh` for the first block, `nh -> nh` afterwards
//! - `Dropout(dropout)`, only when `dropout > 0`
//! - `LeakyRelu(0.2)`
//!
//! followed by one output `Linear(nh -> nout)`.
//!
//! Hidden linear stages use the usual dense-layer default init (U[-1/sqrt(fan_in), 1/sqrt(fan_in)]
//! for weights and biases). The output stage is reset to weights ~ U[-0.07, 0.07] and zero
//! biases.
//!
//! # Modes and randomness
//!
//! There is no hidden global train/eval flag: [`Mode`] is passed to [`Mlp::forward`] along
//! with the RNG that dropout draws from. [`Mode::Eval`] never touches the RNG and is
//! bit-for-bit deterministic.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - [`Batch`] stores `(rows, cols)` row-major.
//! - Linear weights are row-major with shape `(out_dim, in_dim)`.
//! - A forward pass maps `(batch, nin)` to `(batch, nout)`; any other input width fails with
//!   [`Error::ShapeMismatch`].
//!
//! # Quick start
//!
//! ```rust
//! use leaky_mlp::{Batch, Mlp, MlpConfig, Mode};
//! use rand::SeedableRng;
//!
//! # fn main() -> leaky_mlp::Result<()> {
//! let config = MlpConfig::new(4, 2, 8).with_layers(2).with_dropout(0.1);
//! let mlp = Mlp::new_with_seed(config, 0)?;
//!
//! let x = Batch::from_rows(&[
//!     vec![0.1, 0.2, 0.3, 0.4],
//!     vec![-1.0, 0.0, 1.0, 2.0],
//!     vec![0.5, 0.5, 0.5, 0.5],
//! ])?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let y_train = mlp.forward(&x, Mode::Train, &mut rng)?;
//! let y_eval = mlp.forward_eval(&x)?;
//! assert_eq!(y_train.shape(), (3, 2));
//! assert_eq!(y_eval.shape(), (3, 2));
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod batch;
pub mod config;
pub mod dropout;
pub mod error;
pub mod layer;
pub(crate) mod matmul;
pub mod mlp;
pub mod stage;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::{LEAKY_RELU_SLOPE, LeakyRelu};
pub use batch::Batch;
pub use config::MlpConfig;
pub use dropout::{Dropout, Mode};
pub use error::{Error, Result};
pub use layer::{Init, Linear};
pub use mlp::{Mlp, OUTPUT_INIT_RANGE};
pub use stage::{Stage, StageKind};
