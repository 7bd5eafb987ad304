//! Model checkpoints (feature: `serde`).
//!
//! A versioned, stable on-disk format for `Mlp`.
//!
//! - The layer stack is not stored; it is rebuilt from the stored config, so the
//!   stage structure always matches it. Only linear parameters are persisted.
//! - Deserialization validates the config, the number and dims of linear stages,
//!   parameter lengths, and that all parameters are finite.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Linear, Mlp, MlpConfig, Result, StageKind};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedMlp {
    pub format_version: u32,
    pub config: MlpConfig,
    pub linears: Vec<SerializedLinear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLinear {
    pub in_dim: usize,
    pub out_dim: usize,
    /// Row-major (out_dim, in_dim).
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

impl SerializedMlp {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        self.config
            .validate()
            .map_err(|e| Error::InvalidData(format!("stored config rejected: {e}")))?;

        // Checked against the stored parameters before the plan is expanded, so an
        // oversized `n_layers` never drives an allocation.
        let expected_linears = self.config.n_layers.checked_add(1);
        if expected_linears != Some(self.linears.len()) {
            return Err(Error::InvalidData(format!(
                "expected n_layers + 1 linear layers for n_layers={}, got {}",
                self.config.n_layers,
                self.linears.len()
            )));
        }

        let expected: Vec<(usize, usize)> = self
            .config
            .stage_plan()
            .into_iter()
            .filter_map(|k| match k {
                StageKind::Linear { in_dim, out_dim } => Some((in_dim, out_dim)),
                _ => None,
            })
            .collect();

        for (i, (layer, &(in_dim, out_dim))) in self.linears.iter().zip(&expected).enumerate() {
            if layer.in_dim != in_dim || layer.out_dim != out_dim {
                return Err(Error::InvalidData(format!(
                    "linear {i} dims ({}, {}) do not match config ({in_dim}, {out_dim})",
                    layer.in_dim, layer.out_dim
                )));
            }
        }

        Ok(())
    }
}

impl From<&Mlp> for SerializedMlp {
    fn from(model: &Mlp) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            config: *model.config(),
            linears: model.linear_layers().map(SerializedLinear::from).collect(),
        }
    }
}

impl From<&Linear> for SerializedLinear {
    fn from(layer: &Linear) -> Self {
        Self {
            in_dim: layer.in_dim(),
            out_dim: layer.out_dim(),
            weights: layer.weights().to_vec(),
            biases: layer.biases().to_vec(),
        }
    }
}

impl TryFrom<SerializedMlp> for Mlp {
    type Error = Error;

    fn try_from(value: SerializedMlp) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let mut layers = Vec::with_capacity(value.linears.len());
        for (i, layer) in value.linears.into_iter().enumerate() {
            // Linear::from_parts performs length validation and finiteness checks.
            let l = Linear::from_parts(layer.in_dim, layer.out_dim, layer.weights, layer.biases)
                .map_err(|e| Error::InvalidData(format!("linear {i} invalid: {e}")))?;
            layers.push(l);
        }

        // Every parameter is overwritten below, so the init seed is irrelevant.
        let mut rng = StdRng::seed_from_u64(0);
        Mlp::new(value.config, &mut rng)?.with_linear_layers(layers)
    }
}

impl Mlp {
    /// Serialize the model to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedMlp::from(self);
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Serialize the model to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedMlp::from(self);
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedMlp = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse model json: {e}")))?;
        ser.try_into()
    }

    /// Save the model to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s).map_err(|source| Error::Io {
            path: p.to_path_buf(),
            source,
        })?;
        info!(path = %p.display(), parameters = self.num_parameters(), "saved mlp checkpoint");
        Ok(())
    }

    /// Load a model from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p).map_err(|source| Error::Io {
            path: p.to_path_buf(),
            source,
        })?;
        let mlp = Self::from_json_str(&s)?;
        info!(path = %p.display(), parameters = mlp.num_parameters(), "loaded mlp checkpoint");
        Ok(mlp)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::Batch;

    fn small_model() -> Mlp {
        Mlp::new_with_seed(MlpConfig::new(3, 2, 4).with_layers(2).with_dropout(0.2), 42).unwrap()
    }

    #[test]
    fn json_restores_identical_eval_outputs() {
        let mlp = small_model();
        let loaded = Mlp::from_json_str(&mlp.to_json_string().unwrap()).unwrap();

        assert_eq!(loaded.config(), mlp.config());
        assert_eq!(loaded.stage_kinds(), mlp.stage_kinds());

        let x = Batch::from_flat(vec![0.1, -0.4, 0.9, 1.0, 0.0, -1.0], 3).unwrap();
        assert_eq!(
            loaded.forward_eval(&x).unwrap(),
            mlp.forward_eval(&x).unwrap()
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let mut ser = SerializedMlp::from(&small_model());
        ser.format_version = 999;
        let err = Mlp::try_from(ser).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_layer_count_mismatch() {
        let mut ser = SerializedMlp::from(&small_model());
        ser.linears.pop();
        assert!(matches!(Mlp::try_from(ser), Err(Error::InvalidData(_))));
    }

    #[test]
    fn rejects_oversized_layer_count_without_panicking() {
        let overflow = r#"{"format_version":1,"config":{"nin":4,"nout":2,"nh":8,"n_layers":18446744073709551615,"dropout":0.0},"linears":[]}"#;
        assert!(matches!(
            Mlp::from_json_str(overflow),
            Err(Error::InvalidData(_))
        ));

        let huge = r#"{"format_version":1,"config":{"nin":4,"nout":2,"nh":8,"n_layers":1000000000,"dropout":0.5},"linears":[]}"#;
        let err = Mlp::from_json_str(huge).unwrap_err();
        assert!(format!("{err}").contains("n_layers=1000000000"));
    }

    #[test]
    fn zero_hidden_blocks_roundtrip_through_json() {
        let mlp = Mlp::new_with_seed(MlpConfig::new(3, 2, 5).with_layers(0), 1).unwrap();
        let loaded = Mlp::from_json_str(&mlp.to_json_string().unwrap()).unwrap();
        assert_eq!(loaded.stage_kinds(), mlp.stage_kinds());
    }

    #[test]
    fn rejects_non_finite_parameters() {
        let mut ser = SerializedMlp::from(&small_model());
        ser.linears[0].weights[0] = f32::NAN;
        let err = Mlp::try_from(ser).unwrap_err();
        assert!(format!("{err}").contains("linear 0 invalid"));
    }

    #[test]
    fn rejects_truncated_weights() {
        let mut ser = SerializedMlp::from(&small_model());
        ser.linears[2].weights.pop();
        assert!(Mlp::try_from(ser).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Mlp::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(format!("{err}").contains("not/here.json"));
    }
}
