//! Building blocks of a stacked denoising autoencoder.
//!
//! A [DenoisingAutoencoder] owns its encoder weight and biases. The paired
//! [HiddenLayer] holds handles to the very same weight and hidden bias
//! storage, so both always observe identical parameters. The
//! [LogisticRegression] layer classifies the top level representation.

mod denoising;
mod hidden;
mod logistic;

pub use denoising::DenoisingAutoencoder;
pub use hidden::HiddenLayer;
pub use logistic::LogisticRegression;

use crate::{
  error::{ Error, Result },
  random::Random,
  tensor::Tensor,
  scalar::{ Inner, Real },
  ops::{ BaseOps, NumericOps, Hops },
};


/// Independent uniform draws in `[-1/n_in, 1/n_in)`.

pub(crate) fn initial_weights<T: Real>(n_in: usize, n_out: usize, random: &Random) -> Tensor<T> {
  let bound = T::one() / T::from(n_in).unwrap();
  random.uniform(&[n_in, n_out], -bound, bound)
}

/// Make sure `input` is a batch of rows, each `width` elements wide.

pub(crate) fn check_batch<T: Inner>(context: &'static str, input: &Tensor<T>, width: usize) -> Result<()> {
  let dims = &input.shape().dims;
  if dims.len() != 2 || dims[1] != width {
    return Err(Error::ShapeMismatch {
      context,
      expected: vec![0, width],
      actual: dims.clone(),
    })
  }
  Ok(())
}

/// Make sure `targets` provides one row of `width` targets per sample in `input`.

pub(crate) fn check_targets<T: Inner>(input: &Tensor<T>, targets: &Tensor<T>, width: usize) -> Result<()> {
  check_batch("targets", targets, width)?;
  if targets.dim(0) != input.dim(0) {
    return Err(Error::ShapeMismatch {
      context: "targets",
      expected: vec![input.dim(0), width],
      actual: targets.shape().dims.clone(),
    })
  }
  Ok(())
}

pub(crate) fn check_corruption_level<T: Real>(level: T) -> Result<()> {
  if level >= T::zero() && level < T::one() {
    Ok(())
  } else {
    Err(Error::CorruptionLevel(level.to_f64().unwrap_or(f64::NAN)))
  }
}

/// Average over samples of the summed binary cross-entropy between
/// `targets` and `predictions`.
///
/// Not guarded against saturated predictions: a prediction of exactly
/// zero or one yields a non-finite result.

pub(crate) fn cross_entropy<T: Real>(targets: &Tensor<T>, predictions: &Tensor<T>) -> T {
  let one = T::one();
  let terms = targets.zip(predictions, |(x, z)| x * z.ln() + (one - x) * (one - z).ln() );
  -terms.sum(-1).mean(0).item()
}
