// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn backend insight:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns model on MyInnerBackend (Wgpu)
//   - Validation batcher must also use MyInnerBackend
//   - Dropout is automatically disabled on the inner backend,
//     so validation is deterministic
//
// Accuracy here is per-timestep: every output position of every
// segment counts as one classification.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::EcgBatcher, dataset::EcgDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::network::build_network;

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: EcgDataset,
    val_dataset:   EcgDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: EcgDataset,
    val_dataset:   EcgDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {

    // ── Build and compile the network ─────────────────────────────────────────
    // build_network validates the hyperparameter record and
    // fails here, before any data is touched, if it is unusable
    let compiled = build_network::<MyBackend>(&cfg.network, &device)?;
    let mut model = compiled.model;
    tracing::info!(
        "Network ready: 16 residual blocks, {} categories, stem activation '{}'",
        cfg.network.num_categories,
        cfg.network.conv_activation,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    // Only the learning rate is configurable; β1, β2 and ε stay
    // at the framework defaults.
    let mut optim = compiled.optimizer.init();
    let lr        = compiled.learning_rate;

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = EcgBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = EcgBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.signals, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → EcgResNet<MyInnerBackend>
        let model_valid = model.valid();

        let mut val_loss_sum   = 0.0f64;
        let mut val_batches    = 0usize;
        let mut correct_steps  = 0usize;
        let mut total_steps    = 0usize;

        for batch in val_loader.iter() {
            let targets = batch.targets.clone();
            let (loss, logits) = model_valid.forward_loss(batch.signals, batch.targets);

            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            // Per-timestep accuracy: flatten [batch, steps] and
            // compare the argmax of every output position
            let [batch_size, steps, _] = logits.dims();
            let preds = logits.argmax(2).reshape([batch_size * steps]);
            let flat_targets = targets.reshape([batch_size * steps]);

            let correct: i64 = preds
                .equal(flat_targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            correct_steps += correct as usize;
            total_steps   += batch_size * steps;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_acc      = if total_steps > 0 { correct_steps as f64 / total_steps as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_acc * 100.0,
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_acc))?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}
