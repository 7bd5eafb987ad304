use leaky_mlp::{
    Batch, Error, LEAKY_RELU_SLOPE, Mlp, MlpConfig, Mode, OUTPUT_INIT_RANGE, StageKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_batch(rng: &mut StdRng, rows: usize, cols: usize) -> Batch {
    let data = (0..rows * cols)
        .map(|_| rng.random_range(-2.0_f32..2.0))
        .collect();
    Batch::from_flat(data, cols).unwrap()
}

fn linear_dims(mlp: &Mlp) -> Vec<(usize, usize)> {
    mlp.stage_kinds()
        .into_iter()
        .filter_map(|k| match k {
            StageKind::Linear { in_dim, out_dim } => Some((in_dim, out_dim)),
            _ => None,
        })
        .collect()
}

#[test]
fn output_shape_follows_config_for_many_shapes() {
    let mut rng = StdRng::seed_from_u64(0);
    for nin in [1, 3, 7] {
        for nout in [1, 2, 5] {
            for nh in [1, 4, 16] {
                for n_layers in [1, 2, 4] {
                    for rows in [0, 1, 5] {
                        let cfg = MlpConfig::new(nin, nout, nh).with_layers(n_layers);
                        let mlp = Mlp::new(cfg, &mut rng).unwrap();
                        let x = random_batch(&mut rng, rows, nin);

                        let y = mlp.forward_eval(&x).unwrap();
                        assert_eq!(y.shape(), (rows, nout), "cfg {cfg:?}, rows {rows}");

                        let y = mlp.forward(&x, Mode::Train, &mut rng).unwrap();
                        assert_eq!(y.shape(), (rows, nout), "cfg {cfg:?}, rows {rows}");
                    }
                }
            }
        }
    }
}

#[test]
fn layer_counts_with_and_without_dropout() {
    for n_layers in 1..=5 {
        for dropout in [0.0, 0.3] {
            let cfg = MlpConfig::new(6, 3, 10)
                .with_layers(n_layers)
                .with_dropout(dropout);
            let mlp = Mlp::new_with_seed(cfg, 1).unwrap();
            let kinds = mlp.stage_kinds();

            let dims = linear_dims(&mlp);
            assert_eq!(dims.len(), n_layers + 1);
            assert_eq!(dims.iter().filter(|&&(_, out)| out == 10).count(), n_layers);
            assert_eq!(*dims.last().unwrap(), (10, 3));

            let dropouts: Vec<usize> = kinds
                .iter()
                .enumerate()
                .filter(|(_, k)| matches!(k, StageKind::Dropout { .. }))
                .map(|(i, _)| i)
                .collect();
            if dropout > 0.0 {
                assert_eq!(dropouts.len(), n_layers);
                for i in dropouts {
                    assert!(matches!(kinds[i - 1], StageKind::Linear { out_dim: 10, .. }));
                    assert!(matches!(kinds[i + 1], StageKind::LeakyRelu { .. }));
                }
            } else {
                assert!(dropouts.is_empty());
            }

            assert!(matches!(kinds.last(), Some(StageKind::Linear { .. })));
        }
    }
}

#[test]
fn no_dropout_means_no_residual_randomness() {
    let mlp = Mlp::new_with_seed(MlpConfig::new(5, 3, 12), 2).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let x = random_batch(&mut rng, 4, 5);

    let a = mlp.forward(&x, Mode::Train, &mut rng).unwrap();
    let b = mlp.forward(&x, Mode::Train, &mut rng).unwrap();
    assert_eq!(a.as_slice(), b.as_slice());
    assert_eq!(a, mlp.forward_eval(&x).unwrap());
}

#[test]
fn output_layer_init_is_narrow_uniform_with_zero_bias() {
    for seed in 0..8 {
        let cfg = MlpConfig::new(9, 7, 20).with_dropout(0.5);
        let mlp = Mlp::new_with_seed(cfg, seed).unwrap();
        let out = mlp.output_layer();
        assert_eq!((out.in_dim(), out.out_dim()), (20, 7));
        assert!(
            out.weights()
                .iter()
                .all(|&w| (-OUTPUT_INIT_RANGE..=OUTPUT_INIT_RANGE).contains(&w))
        );
        assert!(out.biases().iter().all(|&b| b == 0.0));
    }
}

#[test]
fn eval_mode_is_deterministic_even_with_dropout() {
    let mlp = Mlp::new_with_seed(MlpConfig::new(4, 2, 32).with_dropout(0.5), 4).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let x = random_batch(&mut rng, 6, 4);

    let a = mlp.forward(&x, Mode::Eval, &mut rng).unwrap();
    let b = mlp.forward(&x, Mode::Eval, &mut StdRng::seed_from_u64(99)).unwrap();
    let c = mlp.forward_eval(&x).unwrap();
    assert_eq!(a.as_slice(), b.as_slice());
    assert_eq!(a.as_slice(), c.as_slice());
}

#[test]
fn reference_scenario_two_blocks_no_dropout() {
    let cfg = MlpConfig::new(4, 2, 8).with_layers(2).with_dropout(0.0);
    let mlp = Mlp::new_with_seed(cfg, 0).unwrap();

    let x = Batch::from_rows(&[
        vec![0.1, 0.2, 0.3, 0.4],
        vec![-1.0, 0.0, 1.0, 2.0],
        vec![3.0, -3.0, 0.5, 0.0],
    ])
    .unwrap();
    let y = mlp.forward_eval(&x).unwrap();
    assert_eq!(y.shape(), (3, 2));

    let slope = LEAKY_RELU_SLOPE;
    assert_eq!(
        mlp.stage_kinds(),
        vec![
            StageKind::Linear {
                in_dim: 4,
                out_dim: 8
            },
            StageKind::LeakyRelu {
                negative_slope: slope
            },
            StageKind::Linear {
                in_dim: 8,
                out_dim: 8
            },
            StageKind::LeakyRelu {
                negative_slope: slope
            },
            StageKind::Linear {
                in_dim: 8,
                out_dim: 2
            },
        ]
    );
}

#[test]
fn wrong_input_width_is_a_shape_mismatch() {
    let mlp = Mlp::new_with_seed(MlpConfig::new(4, 2, 8), 0).unwrap();
    let x = Batch::from_flat(vec![1.0; 10], 5).unwrap();
    let err = mlp.forward_eval(&x).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: 4,
            got: 5
        }
    ));
}

#[test]
fn invalid_configs_fail_fast() {
    let mut rng = StdRng::seed_from_u64(0);
    for cfg in [
        MlpConfig::new(0, 2, 8),
        MlpConfig::new(4, 0, 8),
        MlpConfig::new(4, 2, 0),
        MlpConfig::new(4, 2, 8).with_dropout(-0.5),
        MlpConfig::new(4, 2, 8).with_dropout(1.0),
        MlpConfig::new(4, 2, 8).with_layers(usize::MAX),
    ] {
        assert!(
            matches!(Mlp::new(cfg, &mut rng), Err(Error::InvalidConfig(_))),
            "{cfg:?} should be rejected"
        );
    }
}

#[test]
fn trainer_updates_are_visible_in_forward() {
    let mut mlp = Mlp::new_with_seed(MlpConfig::new(3, 1, 4).with_layers(1), 6).unwrap();
    let x = Batch::from_flat(vec![0.5, -0.5, 1.0], 3).unwrap();

    for layer in mlp.linear_layers_mut() {
        layer.weights_mut().fill(0.0);
        layer.biases_mut().fill(0.0);
    }
    mlp.output_layer_mut().biases_mut()[0] = 1.25;

    assert_eq!(mlp.forward_eval(&x).unwrap().as_slice(), &[1.25]);
}
