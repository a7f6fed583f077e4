use crate::{
  error::{ Error, Result },
  activation::Activation,
  random::Random,
  tensor::Tensor,
  scalar::Real,
  ops::{ BaseOps, NumericOps },
  layer::{ check_batch, initial_weights, DenoisingAutoencoder },
};


/// Forward view onto the encoder half of a [DenoisingAutoencoder].
///
/// Weight and bias are handles to the autoencoder's storage rather than
/// copies, so every training step of the autoencoder is immediately
/// visible here and vice versa.

#[derive(Debug, Clone)]
pub struct HiddenLayer<T: Real> {
  pub n_in: usize,
  pub n_out: usize,
  weights: Tensor<T>,
  bias: Tensor<T>,
  activation: Activation,
  random: Random,
}

impl<T: Real> HiddenLayer<T> {
  /// Standalone layer with freshly drawn weights in `[-1/n_in, 1/n_in)` and zero bias.

  pub fn new(n_in: usize, n_out: usize, activation: Activation, random: &Random) -> Self {
    let weights = initial_weights(n_in, n_out, random);
    Self {
      n_in,
      n_out,
      weights,
      bias: Tensor::zeros(&[n_out]),
      activation,
      random: random.clone(),
    }
  }

  /// Layer sharing weight and hidden bias storage with `autoencoder`.

  pub fn tied(autoencoder: &DenoisingAutoencoder<T>, activation: Activation) -> Self {
    Self {
      n_in: autoencoder.n_visible,
      n_out: autoencoder.n_hidden,
      weights: autoencoder.weights().clone(),
      bias: autoencoder.hidden_bias().clone(),
      activation,
      random: autoencoder.random().clone(),
    }
  }

  /// Layer around existing parameter handles.

  pub fn from_parameters(weights: Tensor<T>, bias: Tensor<T>, activation: Activation, random: &Random) -> Result<Self> {
    if weights.rank() != 2 {
      return Err(Error::ShapeMismatch {
        context: "hidden weights",
        expected: vec![0, 0],
        actual: weights.shape().dims.clone(),
      })
    }
    let n_in = weights.dim(0);
    let n_out = weights.dim(1);
    if bias.shape().dims != [n_out] {
      return Err(Error::ShapeMismatch {
        context: "hidden bias",
        expected: vec![n_out],
        actual: bias.shape().dims.clone(),
      })
    }
    Ok(Self { n_in, n_out, weights, bias, activation, random: random.clone() })
  }

  pub fn weights(&self) -> &Tensor<T> {
    &self.weights
  }

  pub fn bias(&self) -> &Tensor<T> {
    &self.bias
  }

  pub fn activation(&self) -> Activation {
    self.activation
  }

  /// Deterministic forward pass, `activation(input·W + b)`.

  pub fn activate(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    check_batch("hidden layer input", input, self.n_in)?;
    let linear = &input.mm(&self.weights) + &self.bias;
    Ok(self.activation.apply(&linear))
  }

  /// Stochastic forward pass.
  ///
  /// Every unit of every sample fires independently with its activation as
  /// probability, yielding a binary code of the same shape. Activations
  /// outside `[0, 1]`, as produced by [Activation::Tanh] or
  /// [Activation::Identity], fail with [Error::Probability].

  pub fn sample(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    let mean = self.activate(input)?;
    self.random.binomial(&mean)
  }
}
