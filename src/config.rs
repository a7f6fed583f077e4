//! Hyperparameters of a full training run.
//!
//! ```toml
//! hidden_layer_sizes = [10, 10]
//! pretrain_learning_rate = 0.2
//! pretraining_epochs = 20
//! corruption_level = 0.1
//! finetune_learning_rate = 0.2
//! finetune_epochs = 20
//! seed = 123
//! ```
//!
//! Missing keys fall back to their defaults.

use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
  /// Width of each hidden layer, shallowest first.
  pub hidden_layer_sizes: Vec<usize>,
  pub pretrain_learning_rate: f64,
  /// Epochs spent on each layer during pretraining.
  pub pretraining_epochs: usize,
  /// Probability of zeroing an input element during pretraining.
  pub corruption_level: f64,
  /// Initial fine-tuning rate, decayed after every epoch.
  pub finetune_learning_rate: f64,
  pub finetune_epochs: usize,
  pub seed: u64,
}

impl Default for Hyperparameters {
  fn default() -> Self {
    Self {
      hidden_layer_sizes: vec![10, 10],
      pretrain_learning_rate: 0.2,
      pretraining_epochs: 20,
      corruption_level: 0.1,
      finetune_learning_rate: 0.2,
      finetune_epochs: 20,
      seed: 123,
    }
  }
}

impl Hyperparameters {
  #[must_use]
  pub fn with_hidden_layer_sizes(mut self, sizes: &[usize]) -> Self {
    self.hidden_layer_sizes = sizes.to_vec();
    self
  }

  #[must_use]
  pub fn with_pretraining(mut self, learning_rate: f64, corruption_level: f64, epochs: usize) -> Self {
    self.pretrain_learning_rate = learning_rate;
    self.corruption_level = corruption_level;
    self.pretraining_epochs = epochs;
    self
  }

  #[must_use]
  pub fn with_finetuning(mut self, learning_rate: f64, epochs: usize) -> Self {
    self.finetune_learning_rate = learning_rate;
    self.finetune_epochs = epochs;
    self
  }

  #[must_use]
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  /// Check every value for consistency without training anything.

  pub fn validate(&self) -> Result<()> {
    if self.hidden_layer_sizes.is_empty() {
      return Err(Error::EmptySchedule)
    }
    if let Some(i) = self.hidden_layer_sizes.iter().position(|&size| size == 0 ) {
      return Err(Error::ZeroWidth { layer: i + 1 })
    }
    for (name, rate) in [
      ("pretrain_learning_rate", self.pretrain_learning_rate),
      ("finetune_learning_rate", self.finetune_learning_rate),
    ] {
      if !(rate.is_finite() && rate > 0.0) {
        return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, rate)))
      }
    }
    if !(0.0..1.0).contains(&self.corruption_level) {
      return Err(Error::CorruptionLevel(self.corruption_level))
    }
    Ok(())
  }

  pub fn from_toml_str(text: &str) -> Result<Self> {
    let hyperparameters: Self = toml::from_str(text)?;
    hyperparameters.validate()?;
    Ok(hyperparameters)
  }

  pub fn to_toml_string(&self) -> Result<String> {
    Ok(toml::to_string_pretty(self)?)
  }

  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
    Self::from_toml_str(&std::fs::read_to_string(path)?)
  }

  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    std::fs::write(path, self.to_toml_string()?)?;
    Ok(())
  }
}
