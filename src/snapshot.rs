use std::fs;

use serde::{ Serialize, Deserialize, de::DeserializeOwned };

use crate::{
  error::{ Error, Result },
  activation::Activation,
  random::Random,
  tensor::Tensor,
  scalar::Real,
  layer::{ DenoisingAutoencoder, HiddenLayer, LogisticRegression },
  stack::StackedDenoisingAutoencoder,
};


/// Detached copy of the parameters of a trained stack.
///
/// Encoder and autoencoder of a level share a single weight and bias,
/// which are therefore stored only once and tied again on restore.
/// Decoding fails with [Error::Snapshot] if a stored tensor's shape
/// doesn't fit its data.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T: Real> {
  pub layers: Vec<LayerSnapshot<T>>,
  pub output_weights: Tensor<T>,
  pub output_bias: Tensor<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot<T: Real> {
  pub weights: Tensor<T>,
  pub hidden_bias: Tensor<T>,
  pub visible_bias: Tensor<T>,
}

impl<T: Real> Snapshot<T> {
  pub fn capture(sda: &StackedDenoisingAutoencoder<T>) -> Self {
    let layers = sda.autoencoders().iter()
      .map(|autoencoder| LayerSnapshot {
        weights: autoencoder.weights().detach(),
        hidden_bias: autoencoder.hidden_bias().detach(),
        visible_bias: autoencoder.visible_bias().detach(),
      })
      .collect();
    Self {
      layers,
      output_weights: sda.output_layer().weights().detach(),
      output_bias: sda.output_layer().bias().detach(),
    }
  }

  /// Rebuild a stack around a copy of the stored parameters.
  ///
  /// `input` and `label` become the stored training data. The stored
  /// inputs of the individual layers are derived from `input` by
  /// deterministic activation, so nothing is drawn from `random`.

  pub fn restore(&self, input: Tensor<T>, label: Tensor<T>, random: &Random) -> Result<StackedDenoisingAutoencoder<T>> {
    if self.layers.is_empty() {
      return Err(Error::EmptySchedule)
    }
    let mut autoencoders = Vec::with_capacity(self.layers.len());
    let mut layer_input = input.clone();
    for layer in &self.layers {
      let autoencoder = DenoisingAutoencoder::from_parameters(
        layer_input.clone(),
        layer.weights.detach(),
        layer.hidden_bias.detach(),
        layer.visible_bias.detach(),
        random,
      )?;
      layer_input = HiddenLayer::tied(&autoencoder, Activation::Sigmoid).activate(&layer_input)?;
      autoencoders.push(autoencoder);
    }
    let output_layer = LogisticRegression::from_parameters(
      layer_input,
      label.clone(),
      self.output_weights.detach(),
      self.output_bias.detach(),
    )?;
    StackedDenoisingAutoencoder::from_layers(input, label, autoencoders, output_layer, random)
  }
}

impl<T> Snapshot<T>
where
  T: Real + Serialize + DeserializeOwned,
{
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(self)?)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    Ok(postcard::from_bytes(bytes)?)
  }

  pub fn save(&self, filename: &str) -> Result<()> {
    fs::write(filename, self.to_bytes()?)?;
    Ok(())
  }

  pub fn load(filename: &str) -> Result<Self> {
    let bytes = fs::read(filename)?;
    Self::from_bytes(&bytes)
  }
}
