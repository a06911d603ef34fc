// ============================================================
// Layer 5 — Residual Network Builder
// ============================================================
// Assembles the deep residual 1D CNN that classifies ECG
// segments sample-block by sample-block:
//
//   stem:    Conv1d(1→32, k=16) → BatchNorm → activation
//   body:    16 residual blocks (schedule below)
//   head:    BatchNorm → ReLU → time-distributed Linear → softmax
//
// Channel / stride schedule across the 16 blocks:
//
//   block    0   1   2   3 |  4   5   6   7 |  8   9  10  11 | 12  13  14  15
//   chans   32  32  32  32 | 64  64  64  64 | 128 128 128 128| 256 256 256 256
//   stride   1   2   1   2 |  1   2   1   2 |  1   2   1   2 |  1   2   1   2
//   zeropad  -   -   -   - | yes  -   -   - | yes  -   -   - | yes  -   -   -
//
// Eight stride-2 blocks → total temporal downsampling of 2^8,
// so a 2048-sample segment produces 8 output timesteps.
//
// The channel doubling at blocks 4, 8 and 12 is parameter-free:
// the pooled shortcut gets an equal number of zero channels
// appended along the channel axis instead of a learned 1x1
// projection.
//
// Reference: He et al. (2016) Identity Mappings in Deep
//              Residual Networks
//            Hannun et al. (2019) Cardiologist-level arrhythmia
//              detection with a deep neural network
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Ignored,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        pool::{MaxPool1d, MaxPool1dConfig},
        loss::CrossEntropyLossConfig,
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Initializer,
        Linear, LinearConfig,
        Relu,
    },
    optim::AdamConfig,
    prelude::*,
};
use burn::tensor::ElementConversion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kernel width of every convolution in the network
pub const KERNEL_SIZE: usize = 16;

/// Channel count of the stem convolution and the first tier
pub const STEM_CHANNELS: usize = 32;

/// Dropout probability inside every residual block (fixed by
/// the architecture, not a tunable hyperparameter)
pub const BLOCK_DROPOUT: f64 = 0.2;

/// Number of residual blocks in the body
pub const NUM_BLOCKS: usize = 16;

/// Product of all stride-2 downsamplings (2^8). Segment lengths
/// must be a multiple of this so every pooled shortcut lines up
/// exactly with its convolution path.
pub const DOWNSAMPLE_FACTOR: usize = 256;

// ─── Errors ───────────────────────────────────────────────────────────────────
/// Construction-time failures of the network builder.
/// Both are fatal — the builder either fully succeeds or fails once.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Unknown activation name, too few categories, or a
    /// non-positive learning rate
    #[error("invalid network configuration: {0}")]
    InvalidConfig(String),

    /// A segment length that cannot pass through the eight
    /// stride-2 blocks without fractional positions
    #[error(
        "segment length {length} is not divisible by the total \
         downsampling factor {factor}"
    )]
    ShapeMismatch { length: usize, factor: usize },
}

// ─── Stem activation ─────────────────────────────────────────────────────────
/// The configurable nonlinearity applied after the stem
/// convolution. Every activation inside the residual blocks is
/// a fixed ReLU regardless of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvActivation {
    Relu,
    Gelu,
    Tanh,
    Sigmoid,
}

impl ConvActivation {
    /// Parse an activation name as given on the command line or
    /// in a saved config. Unknown names are an InvalidConfig error.
    pub fn from_name(name: &str) -> Result<Self, NetworkError> {
        match name.to_ascii_lowercase().as_str() {
            "relu"    => Ok(Self::Relu),
            "gelu"    => Ok(Self::Gelu),
            "tanh"    => Ok(Self::Tanh),
            "sigmoid" => Ok(Self::Sigmoid),
            other => Err(NetworkError::InvalidConfig(format!(
                "unknown activation '{other}' (expected relu, gelu, tanh or sigmoid)"
            ))),
        }
    }

    /// Apply the activation elementwise
    pub fn apply<B: Backend>(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        use burn::tensor::activation;
        match self {
            Self::Relu    => activation::relu(x),
            Self::Gelu    => activation::gelu(x),
            Self::Tanh    => x.tanh(),
            Self::Sigmoid => activation::sigmoid(x),
        }
    }
}

// ─── Network configuration ───────────────────────────────────────────────────
/// The hyperparameter record of the builder. Immutable once
/// passed in; saved alongside checkpoints so inference can
/// rebuild the exact same graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Nonlinearity for the stem layer (residual blocks always use ReLU)
    pub conv_activation: String,

    /// Number of rhythm categories the head predicts per timestep
    pub num_categories: usize,

    /// Adam learning rate — the only optimizer knob exposed
    pub learning_rate: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            conv_activation: "relu".to_string(),
            num_categories:  4,
            learning_rate:   1e-3,
        }
    }
}

impl NetworkConfig {
    pub fn new(
        conv_activation: impl Into<String>,
        num_categories:  usize,
        learning_rate:   f64,
    ) -> Self {
        Self {
            conv_activation: conv_activation.into(),
            num_categories,
            learning_rate,
        }
    }

    /// Check the hyperparameter record before any graph is built.
    pub fn validate(&self) -> Result<(), NetworkError> {
        ConvActivation::from_name(&self.conv_activation)?;
        if self.num_categories < 2 {
            return Err(NetworkError::InvalidConfig(format!(
                "num_categories must be at least 2, got {}",
                self.num_categories
            )));
        }
        if self.learning_rate <= 0.0 {
            return Err(NetworkError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// The (in_channels, out_channels, stride) plan for all 16
    /// residual blocks. Channels double at the first block of
    /// each four-block tier (blocks 4, 8, 12); the stride
    /// alternates 1, 2, 1, 2 within every tier.
    pub fn block_schedule(&self) -> Vec<ResidualBlockConfig> {
        let mut schedule = Vec::with_capacity(NUM_BLOCKS);
        let mut channels = STEM_CHANNELS;

        for index in 0..NUM_BLOCKS {
            let doubles = index > 0 && index % 4 == 0;
            let in_channels = channels;
            if doubles {
                channels *= 2;
            }
            let stride = if index % 2 == 0 { 1 } else { 2 };
            schedule.push(ResidualBlockConfig::new(in_channels, channels, stride));
        }

        schedule
    }

    /// Temporal length of the network output for a segment of
    /// `input_length` samples. Lengths that do not divide evenly
    /// through the eight stride-2 blocks are rejected up front —
    /// the pooled shortcut and the strided convolution would
    /// disagree by one position somewhere in the stack.
    pub fn output_length(&self, input_length: usize) -> Result<usize, NetworkError> {
        if input_length == 0 || input_length % DOWNSAMPLE_FACTOR != 0 {
            return Err(NetworkError::ShapeMismatch {
                length: input_length,
                factor: DOWNSAMPLE_FACTOR,
            });
        }
        Ok(input_length / DOWNSAMPLE_FACTOR)
    }

    /// Build the network on the given device.
    /// Fails with InvalidConfig before touching the device if the
    /// hyperparameters are unusable.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<EcgResNet<B>, NetworkError> {
        self.validate()?;
        let activation = ConvActivation::from_name(&self.conv_activation)?;

        // Stem: 1 input channel → 32, stride 1
        let stem_conv = Conv1dConfig::new(1, STEM_CHANNELS, KERNEL_SIZE)
            .with_initializer(he_normal())
            .init(device);
        let stem_norm = BatchNormConfig::new(STEM_CHANNELS).init(device);

        let blocks: Vec<ResidualBlock<B>> = self
            .block_schedule()
            .iter()
            .map(|cfg| cfg.init(device))
            .collect();

        // Head: the last tier has 8x the stem channels (256)
        let head_channels = STEM_CHANNELS * 8;
        let head_norm = BatchNormConfig::new(head_channels).init(device);
        let head = LinearConfig::new(head_channels, self.num_categories).init(device);

        Ok(EcgResNet {
            stem_conv,
            stem_norm,
            stem_activation: Ignored(activation),
            blocks,
            head_norm,
            head_activation: Relu::new(),
            head,
        })
    }
}

// ─── Compiled network ────────────────────────────────────────────────────────
/// A built model together with its loss/optimizer wiring:
/// categorical cross-entropy and Adam parameterised solely by
/// the configured learning rate. The trainer initialises the
/// optimizer from `optimizer` and drives `model`.
pub struct CompiledNetwork<B: Backend> {
    pub model:         EcgResNet<B>,
    pub optimizer:     AdamConfig,
    pub learning_rate: f64,
}

/// Build and "compile" the classifier in one call — the single
/// entry point the training orchestration uses.
pub fn build_network<B: Backend>(
    config: &NetworkConfig,
    device: &B::Device,
) -> Result<CompiledNetwork<B>, NetworkError> {
    let model = config.init(device)?;
    Ok(CompiledNetwork {
        model,
        optimizer:     AdamConfig::new().with_epsilon(1e-8),
        learning_rate: config.learning_rate,
    })
}

/// He-normal initialisation, scaled for rectified-linear units.
fn he_normal() -> Initializer {
    Initializer::KaimingNormal {
        gain:         2.0_f64.sqrt(),
        fan_out_only: false,
    }
}

// ─── Same-length padding ─────────────────────────────────────────────────────
/// Pad the temporal axis so a Valid convolution reproduces
/// 'same' semantics: output length = ceil(input / stride).
/// With an even kernel the required padding is asymmetric
/// (7 left, 8 right for kernel 16 at stride 1), so it cannot be
/// expressed as a symmetric convolution padding — we pad the
/// tensor explicitly instead and run the convolution unpadded.
fn pad_same<B: Backend>(x: Tensor<B, 3>, kernel_size: usize, stride: usize) -> Tensor<B, 3> {
    let length = x.dims()[2];
    let out    = (length + stride - 1) / stride;
    let total  = ((out - 1) * stride + kernel_size).saturating_sub(length);
    let left   = total / 2;
    let right  = total - left;
    // pad() applies to the last two axes: (left, right) on time,
    // (0, 0) on channels
    x.pad((left, right, 0, 0), 0.0.elem())
}

// ─── Zero-pad channel doubling ───────────────────────────────────────────────
/// The parameter-free shortcut projection: append as many
/// zero-valued channels as the input already has, along the
/// channel axis (not interleaved). [batch, c, t] → [batch, 2c, t]
/// with the upper half identically zero.
pub fn zero_pad_channels<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 3> {
    let zeros = x.zeros_like();
    Tensor::cat(vec![x, zeros], 1)
}

// ─── Residual block ──────────────────────────────────────────────────────────
/// Plan for one residual block. `out_channels` is either equal
/// to `in_channels` or exactly double it (a tier transition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualBlockConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    pub stride:       usize,
}

impl ResidualBlockConfig {
    pub fn new(in_channels: usize, out_channels: usize, stride: usize) -> Self {
        Self { in_channels, out_channels, stride }
    }

    /// True at tier transitions (blocks 4, 8, 12), where the
    /// shortcut needs the zero-pad channel doubling
    pub fn doubles_channels(&self) -> bool {
        self.out_channels == self.in_channels * 2
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ResidualBlock<B> {
        let norm1 = BatchNormConfig::new(self.in_channels).init(device);
        let conv1 = Conv1dConfig::new(self.in_channels, self.out_channels, KERNEL_SIZE)
            .with_stride(self.stride)
            .with_initializer(he_normal())
            .init(device);
        let norm2 = BatchNormConfig::new(self.out_channels).init(device);
        let conv2 = Conv1dConfig::new(self.out_channels, self.out_channels, KERNEL_SIZE)
            .with_initializer(he_normal())
            .init(device);
        // Shortcut pooling: pool width = downsampling factor,
        // so a stride-1 block pools with width 1 (identity)
        let pool = MaxPool1dConfig::new(self.stride)
            .with_stride(self.stride)
            .init();
        let dropout = DropoutConfig::new(BLOCK_DROPOUT).init();

        ResidualBlock {
            norm1,
            conv1,
            norm2,
            dropout,
            conv2,
            pool,
            activation:      Relu::new(),
            stride:          self.stride,
            double_channels: self.doubles_channels(),
        }
    }
}

/// One pre-activation residual block:
///
///   shortcut = maxpool(x)            (+ zero-pad doubling)
///   y = conv(dropout(relu(bn(conv(relu(bn(x)))))))
///   output = shortcut + y
///
/// No activation after the sum — the next block (or the head)
/// normalises and activates first.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    norm1:           BatchNorm<B, 1>,
    conv1:           Conv1d<B>,
    norm2:           BatchNorm<B, 1>,
    dropout:         Dropout,
    conv2:           Conv1d<B>,
    pool:            MaxPool1d,
    activation:      Relu,
    stride:          usize,
    double_channels: bool,
}

impl<B: Backend> ResidualBlock<B> {
    /// Forward pass. Input and output are channels-first:
    /// [batch, channels, time].
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let shortcut = self.pool.forward(x.clone());
        let shortcut = if self.double_channels {
            zero_pad_channels(shortcut)
        } else {
            shortcut
        };

        let y = self.norm1.forward(x);
        let y = self.activation.forward(y);
        let y = self.conv1.forward(pad_same(y, KERNEL_SIZE, self.stride));
        let y = self.norm2.forward(y);
        let y = self.activation.forward(y);
        let y = self.dropout.forward(y);
        let y = self.conv2.forward(pad_same(y, KERNEL_SIZE, 1));

        shortcut + y
    }
}

// ─── The full network ────────────────────────────────────────────────────────
/// The assembled sequence-to-sequence classifier. Accepts
/// batches shaped [batch, time, 1] and emits per-timestep
/// category scores shaped [batch, time / 256, num_categories].
#[derive(Module, Debug)]
pub struct EcgResNet<B: Backend> {
    stem_conv:       Conv1d<B>,
    stem_norm:       BatchNorm<B, 1>,
    stem_activation: Ignored<ConvActivation>,
    blocks:          Vec<ResidualBlock<B>>,
    head_norm:       BatchNorm<B, 1>,
    head_activation: Relu,
    head:            Linear<B>,
}

impl<B: Backend> EcgResNet<B> {
    /// Forward pass producing raw logits [batch, time', categories].
    ///
    /// The softmax is deliberately NOT applied here: the
    /// cross-entropy loss works on logits for numerical
    /// stability. Use `forward_probabilities` for the
    /// probability-distribution output contract.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        // [batch, time, 1] → [batch, 1, time] — Burn convolutions
        // are channels-first
        let x = input.swap_dims(1, 2);

        let x = self.stem_conv.forward(pad_same(x, KERNEL_SIZE, 1));
        let x = self.stem_norm.forward(x);
        let x = self.stem_activation.0.apply(x);

        let x = self
            .blocks
            .iter()
            .fold(x, |x, block| block.forward(x));

        let x = self.head_norm.forward(x);
        let x = self.head_activation.forward(x);

        // [batch, 256, time'] → [batch, time', 256], then the
        // shared projection applies identically at every timestep
        let x = x.swap_dims(1, 2);
        self.head.forward(x)
    }

    /// Per-timestep probability distributions over the
    /// categories; every row sums to 1.
    pub fn forward_probabilities(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        burn::tensor::activation::softmax(self.forward(input), 2)
    }

    /// Forward pass plus categorical cross-entropy against
    /// per-timestep integer targets [batch, time'].
    /// Returns (loss, logits) so the caller can reuse the logits
    /// for accuracy bookkeeping.
    pub fn forward_loss(
        &self,
        input:   Tensor<B, 3>,
        targets: Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(input);
        let [batch, steps, categories] = logits.dims();

        // Every timestep is one classification sample — flatten
        // the batch and time axes together for the loss
        let flat_logits  = logits.clone().reshape([batch * steps, categories]);
        let flat_targets = targets.reshape([batch * steps]);

        let loss = CrossEntropyLossConfig::new()
            .init(&flat_logits.device())
            .forward(flat_logits, flat_targets);

        (loss, logits)
    }

    /// Hard per-timestep class predictions [batch, time'].
    pub fn predict(&self, input: Tensor<B, 3>) -> Tensor<B, 2, Int> {
        let logits = self.forward(input);
        let [batch, steps, _] = logits.dims();
        logits.argmax(2).reshape([batch, steps])
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_schedule_matches_architecture_table() {
        let cfg      = NetworkConfig::default();
        let schedule = cfg.block_schedule();
        assert_eq!(schedule.len(), 16);

        // (out_channels, stride, doubles) per block
        let expected = [
            (32, 1, false), (32, 2, false), (32, 1, false), (32, 2, false),
            (64, 1, true),  (64, 2, false), (64, 1, false), (64, 2, false),
            (128, 1, true), (128, 2, false), (128, 1, false), (128, 2, false),
            (256, 1, true), (256, 2, false), (256, 1, false), (256, 2, false),
        ];

        for (i, (channels, stride, doubles)) in expected.iter().enumerate() {
            assert_eq!(schedule[i].out_channels, *channels, "block {i} channels");
            assert_eq!(schedule[i].stride, *stride, "block {i} stride");
            assert_eq!(schedule[i].doubles_channels(), *doubles, "block {i} doubling");
        }
    }

    #[test]
    fn test_rejects_single_category() {
        let cfg = NetworkConfig::new("relu", 1, 1e-3);
        assert!(matches!(cfg.validate(), Err(NetworkError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let zero = NetworkConfig::new("relu", 4, 0.0);
        assert!(matches!(zero.validate(), Err(NetworkError::InvalidConfig(_))));

        let negative = NetworkConfig::new("relu", 4, -1e-3);
        assert!(matches!(negative.validate(), Err(NetworkError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unknown_activation() {
        let cfg = NetworkConfig::new("swishy", 4, 1e-3);
        assert!(matches!(cfg.validate(), Err(NetworkError::InvalidConfig(_))));
    }

    #[test]
    fn test_activation_names_parse() {
        assert_eq!(ConvActivation::from_name("relu").unwrap(), ConvActivation::Relu);
        assert_eq!(ConvActivation::from_name("ReLU").unwrap(), ConvActivation::Relu);
        assert_eq!(ConvActivation::from_name("gelu").unwrap(), ConvActivation::Gelu);
        assert!(ConvActivation::from_name("").is_err());
    }

    #[test]
    fn test_output_length_follows_downsampling() {
        let cfg = NetworkConfig::default();
        // 2048 / 2^8 = 8 — the canonical training segment
        assert_eq!(cfg.output_length(2048).unwrap(), 8);
        assert_eq!(cfg.output_length(256).unwrap(), 1);
        assert_eq!(cfg.output_length(512).unwrap(), 2);
    }

    #[test]
    fn test_output_length_rejects_unrepresentable_lengths() {
        let cfg = NetworkConfig::default();
        // Odd / non-multiple lengths would desynchronise the
        // shortcut and transform paths partway down the stack
        assert!(matches!(
            cfg.output_length(1000),
            Err(NetworkError::ShapeMismatch { length: 1000, .. })
        ));
        assert!(cfg.output_length(255).is_err());
        assert!(cfg.output_length(0).is_err());
    }

    #[test]
    fn test_zero_pad_doubles_channels_with_zero_upper_half() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 3>::ones([1, 4, 8], &device);
        let padded = zero_pad_channels(x);

        assert_eq!(padded.dims(), [1, 8, 8]);

        // Lower half: the original data, untouched
        let lower: f32 = padded.clone()
            .slice([0..1, 0..4, 0..8])
            .sum()
            .into_scalar();
        assert_eq!(lower, 32.0);

        // Upper half: identically zero
        let upper: f32 = padded
            .slice([0..1, 4..8, 0..8])
            .sum()
            .into_scalar();
        assert_eq!(upper, 0.0);
    }

    #[test]
    fn test_block_preserves_shape_at_stride_one() {
        let device = Default::default();
        let block: ResidualBlock<TestBackend> =
            ResidualBlockConfig::new(32, 32, 1).init(&device);

        let x = Tensor::<TestBackend, 3>::zeros([2, 32, 64], &device);
        assert_eq!(block.forward(x).dims(), [2, 32, 64]);
    }

    #[test]
    fn test_block_halves_resolution_at_stride_two() {
        let device = Default::default();
        let block: ResidualBlock<TestBackend> =
            ResidualBlockConfig::new(32, 32, 2).init(&device);

        let x = Tensor::<TestBackend, 3>::zeros([2, 32, 64], &device);
        assert_eq!(block.forward(x).dims(), [2, 32, 32]);
    }

    #[test]
    fn test_block_doubles_channels_at_tier_transition() {
        let device = Default::default();
        let cfg = ResidualBlockConfig::new(32, 64, 1);
        assert!(cfg.doubles_channels());

        let block: ResidualBlock<TestBackend> = cfg.init(&device);
        let x = Tensor::<TestBackend, 3>::zeros([1, 32, 32], &device);
        assert_eq!(block.forward(x).dims(), [1, 64, 32]);
    }

    #[test]
    fn test_forward_shape_and_probability_rows() {
        let device = Default::default();
        let cfg    = NetworkConfig::new("relu", 4, 1e-3);
        let model: EcgResNet<TestBackend> = cfg.init(&device).unwrap();

        // One 256-sample segment → exactly one output timestep
        let input = Tensor::<TestBackend, 3>::random(
            [2, 256, 1],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let probs = model.forward_probabilities(input);
        assert_eq!(probs.dims(), [2, 1, 4]);

        // Every timestep's distribution sums to 1
        let sums: Vec<f32> = probs
            .sum_dim(2)
            .into_data()
            .to_vec()
            .unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-4, "softmax row summed to {s}");
        }
    }

    #[test]
    fn test_build_network_wires_optimizer() {
        let device   = Default::default();
        let cfg      = NetworkConfig::new("gelu", 5, 5e-4);
        let compiled = build_network::<TestBackend>(&cfg, &device).unwrap();
        assert_eq!(compiled.learning_rate, 5e-4);
    }

    #[test]
    fn test_build_network_surfaces_config_errors() {
        let device = Default::default();
        let cfg    = NetworkConfig::new("relu", 0, 1e-3);
        assert!(build_network::<TestBackend>(&cfg, &device).is_err());
    }
}
