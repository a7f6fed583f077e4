use crate::{
  error::{ Error, Result },
  random::Random,
  tensor::Tensor,
  scalar::Real,
  ops::{ BaseOps, NumericOps, RealOps, Hops },
  layer::{ check_batch, check_corruption_level, cross_entropy, initial_weights },
};


/// Autoencoder with tied weights, trained to reconstruct its input
/// from a randomly corrupted copy.
///
/// The decoder uses the transpose of the encoder weight. It is taken as a
/// view at the time of use and never stored, so encoder and decoder can't
/// drift apart.

#[derive(Debug, Clone)]
pub struct DenoisingAutoencoder<T: Real> {
  pub n_visible: usize,
  pub n_hidden: usize,
  weights: Tensor<T>,
  hbias: Tensor<T>,
  vbias: Tensor<T>,
  input: Tensor<T>,
  random: Random,
}

impl<T: Real> DenoisingAutoencoder<T> {
  /// Fresh autoencoder with uniformly drawn weights and zero biases.

  pub fn new(input: Tensor<T>, n_visible: usize, n_hidden: usize, random: &Random) -> Result<Self> {
    check_batch("autoencoder input", &input, n_visible)?;
    let weights = initial_weights(n_visible, n_hidden, random);
    Ok(Self {
      n_visible,
      n_hidden,
      weights,
      hbias: Tensor::zeros(&[n_hidden]),
      vbias: Tensor::zeros(&[n_visible]),
      input,
      random: random.clone(),
    })
  }

  /// Autoencoder around existing parameter handles.
  ///
  /// Passing the weight and bias of a [HiddenLayer](crate::layer::HiddenLayer)
  /// ties both together.

  pub fn from_parameters(
    input: Tensor<T>,
    weights: Tensor<T>,
    hbias: Tensor<T>,
    vbias: Tensor<T>,
    random: &Random,
  ) -> Result<Self> {
    if weights.rank() != 2 {
      return Err(Error::ShapeMismatch {
        context: "autoencoder weights",
        expected: vec![0, 0],
        actual: weights.shape().dims.clone(),
      })
    }
    let n_visible = weights.dim(0);
    let n_hidden = weights.dim(1);
    for (context, bias, width) in [("hidden bias", &hbias, n_hidden), ("visible bias", &vbias, n_visible)] {
      if bias.shape().dims != [width] {
        return Err(Error::ShapeMismatch {
          context,
          expected: vec![width],
          actual: bias.shape().dims.clone(),
        })
      }
    }
    check_batch("autoencoder input", &input, n_visible)?;
    Ok(Self { n_visible, n_hidden, weights, hbias, vbias, input, random: random.clone() })
  }

  pub fn weights(&self) -> &Tensor<T> {
    &self.weights
  }

  pub fn hidden_bias(&self) -> &Tensor<T> {
    &self.hbias
  }

  pub fn visible_bias(&self) -> &Tensor<T> {
    &self.vbias
  }

  /// Most recent training input, or the wiring input before the first update.

  pub fn input(&self) -> &Tensor<T> {
    &self.input
  }

  pub fn random(&self) -> &Random {
    &self.random
  }

  /// Zero out each element of `input` independently with probability `level`.

  pub fn corrupt(&self, input: &Tensor<T>, level: T) -> Result<Tensor<T>> {
    check_corruption_level(level)?;
    let mask = self.random.bernoulli(&input.shape().dims, T::one() - level);
    Ok(input * &mask)
  }

  pub fn encode(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    check_batch("autoencoder input", input, self.n_visible)?;
    Ok((&input.mm(&self.weights) + &self.hbias).sigmoid())
  }

  pub fn decode(&self, hidden: &Tensor<T>) -> Result<Tensor<T>> {
    check_batch("autoencoder code", hidden, self.n_hidden)?;
    let decoder = self.weights.transpose(0, 1);
    Ok((&hidden.mm(&decoder) + &self.vbias).sigmoid())
  }

  /// Decode the code of an uncorrupted `input`.

  pub fn reconstruct(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    self.decode(&self.encode(input)?)
  }

  /// One full batch update on `input`, corrupted at `corruption_level`.
  ///
  /// The reconstruction residual `input - z` drives both the decoder and,
  /// backpropagated through the encoder's sigmoid, the encoder side of
  /// the tied weight. Parameters are updated in place.

  pub fn train(&mut self, input: &Tensor<T>, learning_rate: T, corruption_level: T) -> Result<()> {
    check_batch("autoencoder input", input, self.n_visible)?;
    let corrupted = self.corrupt(input, corruption_level)?;
    let code = self.encode(&corrupted)?;
    let reconstruction = self.decode(&code)?;

    let residual = input - &reconstruction;
    let slope = code.vectorize(|y| y * (T::one() - y) );
    let signal = &residual.mm(&self.weights) * &slope;

    let delta_weights = &corrupted.transpose(0, 1).mm(&signal) + &residual.transpose(0, 1).mm(&code);
    let delta_hbias = signal.mean_over(0);
    let delta_vbias = residual.mean_over(0);

    self.weights.assign(&(&self.weights + delta_weights * learning_rate));
    self.hbias.assign(&(&self.hbias + delta_hbias * learning_rate));
    self.vbias.assign(&(&self.vbias + delta_vbias * learning_rate));

    self.input = input.clone();
    Ok(())
  }

  /// Cross-entropy between the stored input and the reconstruction
  /// of a freshly corrupted copy of it.
  ///
  /// Draws a new corruption mask on every call, so repeated calls at fixed
  /// parameters disagree and the random stream advances. Use
  /// [reconstruction_cross_entropy](Self::reconstruction_cross_entropy)
  /// for a repeatable measure.

  pub fn negative_log_likelihood(&self, corruption_level: T) -> Result<T> {
    let corrupted = self.corrupt(&self.input, corruption_level)?;
    let reconstruction = self.reconstruct(&corrupted)?;
    Ok(cross_entropy(&self.input, &reconstruction))
  }

  /// Cross-entropy between `input` and its uncorrupted reconstruction.
  ///
  /// Non-finite once the reconstruction saturates at exactly 0 or 1.

  pub fn reconstruction_cross_entropy(&self, input: &Tensor<T>) -> Result<T> {
    let reconstruction = self.reconstruct(input)?;
    Ok(cross_entropy(input, &reconstruction))
  }
}
