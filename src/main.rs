use leaky_mlp::{Batch, Mlp, MlpConfig, Mode, StageKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when embedded; keep going without ours.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

fn main() -> leaky_mlp::Result<()> {
    init_logging();

    let config = MlpConfig::new(4, 2, 8).with_layers(2).with_dropout(0.1);
    let mlp = Mlp::new_with_seed(config, 0)?;

    for (idx, kind) in mlp.stage_kinds().into_iter().enumerate() {
        match kind {
            StageKind::Linear { in_dim, out_dim } => info!(idx, in_dim, out_dim, "linear"),
            StageKind::Dropout { rate } => info!(idx, rate, "dropout"),
            StageKind::LeakyRelu { negative_slope } => info!(idx, negative_slope, "leaky relu"),
        }
    }

    let x = Batch::from_rows(&[
        vec![0.1, 0.2, 0.3, 0.4],
        vec![-1.0, 0.0, 1.0, 2.0],
        vec![0.5, -0.5, 0.5, -0.5],
    ])?;

    let mut rng = StdRng::seed_from_u64(1);
    let train = mlp.forward(&x, Mode::Train, &mut rng)?;
    let eval = mlp.forward_eval(&x)?;

    for row in 0..eval.rows() {
        info!(row, train = ?train.row(row), eval = ?eval.row(row), "output");
    }
    Ok(())
}
