//! Error types for building and training a stacked denoising autoencoder.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Violated preconditions, reported at the call site where they get detected.
///
/// None of these are recoverable by retrying the same call.
#[derive(Debug, Error)]
pub enum Error {
  /// Corruption levels must lie in `[0, 1)`.
  #[error("corruption level must lie in [0, 1), got {0}")]
  CorruptionLevel(f64),

  /// Sampling needs success probabilities in `[0, 1]`.
  #[error("probability must lie in [0, 1], got {0}")]
  Probability(f64),

  /// A stack needs at least one hidden layer.
  #[error("hidden layer schedule is empty")]
  EmptySchedule,

  /// Layers must have at least one unit.
  #[error("layer {layer} has zero width")]
  ZeroWidth {
    /// Position of the layer, counting the input as layer 0.
    layer: usize,
  },

  /// An operand doesn't have the dimensions its consumer expects.
  #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
  ShapeMismatch {
    /// Operand that failed the check.
    context: &'static str,
    /// Expected dimensions. Zero stands for any size.
    expected: Vec<usize>,
    /// Actual dimensions.
    actual: Vec<usize>,
  },

  /// Invalid hyperparameter value.
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  /// Hyperparameters couldn't be parsed from TOML.
  #[error("could not parse hyperparameters: {0}")]
  ConfigParse(#[from] toml::de::Error),

  /// Hyperparameters couldn't be written as TOML.
  #[error("could not write hyperparameters: {0}")]
  ConfigWrite(#[from] toml::ser::Error),

  /// A snapshot couldn't be encoded or decoded.
  #[error("snapshot error: {0}")]
  Snapshot(#[from] postcard::Error),

  /// Reading or writing a snapshot file failed.
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}
